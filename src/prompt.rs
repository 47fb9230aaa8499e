//! Interactive profile entry.
//!
//! Asks for the same fields as `envswitch add`, one free-text prompt at a
//! time. Variables and commands are collected in loops that stop at the first
//! empty answer.

use anyhow::{Context, Result, bail};
use inquire::Text;

use crate::profile::NewProfile;

/// Source of answers for the interactive flow
pub trait Prompter {
    /// Ask one question and return the trimmed answer
    fn ask(&mut self, message: &str, help: Option<&str>) -> Result<String>;
}

/// Prompts on the terminal via inquire
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&mut self, message: &str, help: Option<&str>) -> Result<String> {
        let mut prompt = Text::new(message);
        if let Some(help) = help {
            prompt = prompt.with_help_message(help);
        }
        let answer = prompt.prompt().context("Input cancelled")?;
        Ok(answer.trim().to_string())
    }
}

/// Walk through every field of a new profile
pub fn collect_new_profile(prompter: &mut impl Prompter) -> Result<NewProfile> {
    let name = prompter.ask("Name:", None)?;
    if name.is_empty() {
        bail!("Name is required");
    }

    let project_path = prompter.ask("Project path:", None)?;
    if project_path.is_empty() {
        bail!("Project path is required");
    }

    let mut new = NewProfile::new(name, project_path);

    let python = prompter.ask("Python venv path (optional):", Some("Enter to skip"))?;
    if !python.is_empty() {
        new = new.interpreter_env(python);
    }

    let node = prompter.ask("Node version (optional):", Some("Enter to skip"))?;
    if !node.is_empty() {
        new = new.runtime_version(node);
    }

    new = new.description(prompter.ask("Description (optional):", Some("Enter to skip"))?);

    loop {
        let key = prompter.ask("Variable name:", Some("Enter to finish variables"))?;
        if key.is_empty() {
            break;
        }
        let value = prompter.ask(&format!("Value for {key}:"), None)?;
        new = new.variable(key, value);
    }

    loop {
        let command = prompter.ask("Command to run on switch:", Some("Enter to finish commands"))?;
        if command.is_empty() {
            break;
        }
        new = new.command(command);
    }

    Ok(new)
}
