pub mod commands;
pub mod error;
pub mod paths;
pub mod planner;
pub mod profile;
pub mod prompt;
pub mod store;
pub mod ui;

#[cfg(test)]
pub mod test_utils;
