//! High-level command orchestration for the CLI.
//!
//! Each function here corresponds to a subcommand in `main.rs`. Handlers
//! talk to `crate::store` for persistence, `crate::planner` for switch
//! output and `crate::ui` for everything the user sees.

use anstyle::AnsiColor;
use anyhow::{Context, Result, bail};

use crate::error::StoreError;
use crate::planner::{Platform, plan};
use crate::profile::{NewProfile, Profile};
use crate::prompt::{Prompter, collect_new_profile};
use crate::store::ProfileStore;
use crate::ui::Ui;

/// How the switch plan is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutput {
    /// Commented banner plus the lines, for copy and paste
    Banner,
    /// Only the lines, for `eval "$(envswitch switch NAME --script)"`
    Script,
}

/// Initialize the storage directory
pub fn init(store: &ProfileStore, ui: &Ui) -> Result<()> {
    if store.initialize()? {
        ui.ok(format!(
            "Created config at {}",
            store.paths().environments_file.display()
        ));
    }
    ui.ok("Configuration initialized!");
    Ok(())
}

/// Parse a `KEY=VALUE` pair from the command line
pub fn parse_env_pair(raw: &str) -> Result<(String, String)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!(
            "Invalid variable '{}'.\nHint: Use KEY=VALUE, e.g. --env DEBUG=true",
            raw
        );
    };

    let key = key.trim();
    if key.is_empty() {
        bail!("Invalid variable '{}': the name before '=' is empty", raw);
    }

    Ok((key.to_string(), value.trim().to_string()))
}

/// Save a new environment
pub fn add(store: &ProfileStore, ui: &Ui, new: NewProfile) -> Result<()> {
    let name = new.name.clone();
    match store.add_profile(new) {
        Ok(profile) => {
            ui.ok(format!("Added environment '{}'", profile.name));
            ui.newline();
            ui.println("To switch to it:");
            ui.println(format!("  envswitch switch {}", profile.name));
            Ok(())
        }
        Err(StoreError::DuplicateName(_)) => bail!(
            "Environment '{}' already exists.\nHint: Delete it first with 'envswitch delete {}', or choose a different name.",
            name,
            name
        ),
        Err(e) => Err(e).context("Failed to save environment"),
    }
}

/// Collect a new environment interactively, then save it
pub fn interactive(store: &ProfileStore, ui: &Ui, prompter: &mut impl Prompter) -> Result<()> {
    ui.section("Add New Environment");
    ui.newline();

    let new = collect_new_profile(prompter)?;
    add(store, ui, new)
}

/// Record the switch and print the shell lines for it
pub fn switch(
    store: &ProfileStore,
    ui: &Ui,
    name: &str,
    platform: Platform,
    output: SwitchOutput,
) -> Result<()> {
    let profile = match store.record_use(name) {
        Ok(profile) => profile,
        Err(StoreError::NotFound(_)) => bail!(
            "Environment '{}' not found.\nHint: Use 'envswitch list' to see saved environments.",
            name
        ),
        Err(e) => return Err(e).context("Failed to record switch"),
    };

    let lines = plan(&profile, platform);

    match output {
        SwitchOutput::Script => {
            for line in &lines {
                ui.println(line);
            }
        }
        SwitchOutput::Banner => {
            ui.newline();
            for line in banner(&profile.name, platform) {
                ui.println(ui.dim(line));
            }
            ui.newline();
            for line in &lines {
                ui.println(ui.shell_line(line));
            }
            ui.newline();
        }
    }

    Ok(())
}

/// Comment lines printed above the plan in banner mode
fn banner(name: &str, platform: Platform) -> [String; 2] {
    [
        format!("# Switching to environment: {name} ({platform})"),
        format!("# Copy and paste these commands or run: eval \"$(envswitch switch {name} --script)\""),
    ]
}

/// List saved environments
pub fn list(store: &ProfileStore, ui: &Ui, search: Option<&str>) -> Result<()> {
    let profiles = store.list_profiles(search)?;

    if profiles.is_empty() {
        match search {
            Some(filter) if !filter.is_empty() => {
                ui.warn(format!("No environments match '{}'.", filter))
            }
            _ => {
                ui.warn("No environments found.");
                ui.newline();
                ui.println("Create one with:");
                ui.println(format!("  {} add <name> <path>", ui.bold("envswitch")));
            }
        }
        return Ok(());
    }

    let mut table = ui.table();
    table.set_header(vec![
        ui.header_cell("Name"),
        ui.header_cell("Uses"),
        ui.header_cell("Last used"),
        ui.header_cell("Path"),
    ]);

    for profile in &profiles {
        let last_used = match &profile.last_used_at {
            Some(at) => ui.cell(ui.timestamp(at)),
            None => ui.colored_cell("never", AnsiColor::BrightBlack),
        };
        table.add_row(vec![
            ui.cell(&profile.name),
            ui.cell(profile.use_count.to_string()),
            last_used,
            ui.cell(ui.short_path(&profile.project_path.to_string_lossy())),
        ]);
    }

    ui.section("Environments");
    ui.println(table.to_string());
    ui.newline();
    ui.info(format!("Total: {} environment(s)", profiles.len()));

    Ok(())
}

/// Show everything stored for one environment
pub fn get(store: &ProfileStore, ui: &Ui, name: &str) -> Result<()> {
    let Some(profile) = store.get_profile(name)? else {
        bail!(
            "Environment '{}' not found.\nHint: Use 'envswitch list' to see saved environments.",
            name
        );
    };

    show_profile(ui, &profile);
    Ok(())
}

fn show_profile(ui: &Ui, profile: &Profile) {
    ui.section(format!("Environment: {}", profile.name));
    ui.newline();

    let mut table = ui.simple_table();
    table.add_row(vec![
        ui.cell("Path:"),
        ui.cell(profile.project_path.display().to_string()),
    ]);

    if let Some(env) = &profile.interpreter_env {
        table.add_row(vec![ui.cell("Python:"), ui.cell(env.display().to_string())]);
    }
    if let Some(version) = &profile.runtime_version {
        table.add_row(vec![ui.cell("Node:"), ui.cell(version)]);
    }
    if !profile.description.is_empty() {
        table.add_row(vec![ui.cell("Description:"), ui.cell(&profile.description)]);
    }

    table.add_row(vec![ui.cell("Uses:"), ui.cell(profile.use_count.to_string())]);
    table.add_row(vec![
        ui.cell("Created:"),
        ui.cell(ui.timestamp(&profile.created_at)),
    ]);
    table.add_row(vec![
        ui.cell("Last used:"),
        ui.cell(ui.maybe_timestamp(profile.last_used_at.as_ref())),
    ]);

    ui.println(table.to_string());

    if !profile.variables.is_empty() {
        ui.newline();
        ui.section(format!("Variables ({})", profile.variables.len()));
        for (key, value) in &profile.variables {
            ui.println(format!("  {} {}={}", ui.icon_info(), key, value));
        }
    }

    if !profile.commands.is_empty() {
        ui.newline();
        ui.section(format!("Commands ({})", profile.commands.len()));
        for command in &profile.commands {
            ui.println(format!("  {} {}", ui.icon_info(), command));
        }
    }
}

/// Delete an environment, asking first unless `yes` is set
pub fn delete(store: &ProfileStore, ui: &Ui, name: &str, yes: bool) -> Result<()> {
    if !yes {
        let confirm = inquire::Confirm::new(&format!("Delete environment '{}'?", name))
            .with_default(false)
            .with_help_message("This permanently removes the saved environment")
            .prompt()
            .context("Confirmation cancelled")?;

        if !confirm {
            ui.warn("Cancelled.");
            return Ok(());
        }
    }

    match store.delete_profile(name) {
        Ok(removed) => {
            ui.ok(format!("Deleted environment '{}'", removed.name));
            Ok(())
        }
        Err(StoreError::NotFound(_)) => bail!(
            "Environment '{}' not found.\nHint: Use 'envswitch list' to see saved environments.",
            name
        ),
        Err(e) => Err(e).context("Failed to delete environment"),
    }
}

/// Show the most recent switches
pub fn history(store: &ProfileStore, ui: &Ui, limit: usize) -> Result<()> {
    let entries = store.history(limit)?;

    if entries.is_empty() {
        ui.warn("No history yet.");
        return Ok(());
    }

    let mut table = ui.table();
    table.set_header(vec![ui.header_cell("When"), ui.header_cell("Environment")]);
    for entry in &entries {
        table.add_row(vec![
            ui.cell(ui.timestamp(&entry.timestamp)),
            ui.cell(&entry.environment_name),
        ]);
    }

    ui.section("Recent switches");
    ui.println(table.to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_paths;
    use crate::ui::ColorMode;
    use tempfile::TempDir;

    fn test_ui() -> Ui {
        Ui::new(ColorMode::Never, false)
    }

    fn test_store(temp_dir: &TempDir) -> ProfileStore {
        let store = ProfileStore::new(setup_test_paths(temp_dir));
        store.initialize().unwrap();
        store
    }

    struct Answers(Vec<&'static str>);

    impl Prompter for Answers {
        fn ask(&mut self, _message: &str, _help: Option<&str>) -> Result<String> {
            Ok(if self.0.is_empty() {
                String::new()
            } else {
                self.0.remove(0).to_string()
            })
        }
    }

    #[test]
    fn test_parse_env_pair() {
        assert_eq!(
            parse_env_pair("DEBUG=true").unwrap(),
            ("DEBUG".to_string(), "true".to_string())
        );
        assert_eq!(
            parse_env_pair(" URL = http://x?a=b ").unwrap(),
            ("URL".to_string(), "http://x?a=b".to_string())
        );
        assert_eq!(
            parse_env_pair("EMPTY=").unwrap(),
            ("EMPTY".to_string(), String::new())
        );
        assert!(parse_env_pair("NOEQUALS").is_err());
        assert!(parse_env_pair("=value").is_err());
    }

    #[test]
    fn test_init_twice() {
        let temp_dir = TempDir::new().unwrap();
        let store = ProfileStore::new(setup_test_paths(&temp_dir));
        let ui = test_ui();
        init(&store, &ui).unwrap();
        init(&store, &ui).unwrap();
        assert!(store.paths().history_file.exists());
    }

    #[test]
    fn test_list_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let ui = test_ui();
        assert!(list(&store, &ui, None).is_ok());
        assert!(list(&store, &ui, Some("web")).is_ok());
    }

    #[test]
    fn test_add_get_list() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let ui = test_ui();

        add(
            &store,
            &ui,
            NewProfile::new("work", "/tmp/work").variable("A", "1").command("ls"),
        )
        .unwrap();

        assert!(get(&store, &ui, "WORK").is_ok());
        assert!(list(&store, &ui, Some("wor")).is_ok());
        assert!(store.get_profile("work").unwrap().is_some());
    }

    #[test]
    fn test_add_duplicate() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let ui = test_ui();

        add(&store, &ui, NewProfile::new("work", "/tmp/work")).unwrap();
        let err = add(&store, &ui, NewProfile::new("Work", "/tmp/other")).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_get_missing() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let err = get(&store, &test_ui(), "ghost").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_switch_records_use() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let ui = test_ui();
        add(&store, &ui, NewProfile::new("demo", "/tmp/demo")).unwrap();

        switch(&store, &ui, "demo", Platform::Unix, SwitchOutput::Script).unwrap();
        switch(&store, &ui, "DEMO", Platform::Windows, SwitchOutput::Banner).unwrap();

        let profile = store.get_profile("demo").unwrap().unwrap();
        assert_eq!(profile.use_count, 2);
        assert_eq!(store.history(10).unwrap().len(), 2);
        assert!(history(&store, &ui, 10).is_ok());
    }

    #[test]
    fn test_banner_names_platform() {
        let [title, hint] = banner("Demo", Platform::Windows);
        assert_eq!(title, "# Switching to environment: Demo (windows)");
        assert!(hint.contains("envswitch switch Demo --script"));

        let [title, _] = banner("Demo", Platform::Unix);
        assert!(title.ends_with("(unix)"));
    }

    #[test]
    fn test_switch_missing() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let err = switch(
            &store,
            &test_ui(),
            "ghost",
            Platform::Unix,
            SwitchOutput::Script,
        )
        .unwrap_err();
        assert!(err.to_string().contains("not found"));
        assert!(store.history(10).unwrap().is_empty());
    }

    #[test]
    fn test_delete_with_yes() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let ui = test_ui();
        add(&store, &ui, NewProfile::new("old", "/tmp/old")).unwrap();

        delete(&store, &ui, "OLD", true).unwrap();
        assert!(store.get_profile("old").unwrap().is_none());
        assert!(delete(&store, &ui, "old", true).is_err());
    }

    #[test]
    fn test_interactive_adds_profile() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let mut answers = Answers(vec!["scratch", "/tmp/scratch", "", "", "notes", "K", "V"]);

        interactive(&store, &test_ui(), &mut answers).unwrap();

        let profile = store.get_profile("scratch").unwrap().unwrap();
        assert_eq!(profile.description, "notes");
        assert_eq!(profile.variables.get("K").map(String::as_str), Some("V"));
        assert!(profile.commands.is_empty());
    }

    #[test]
    fn test_history_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        assert!(history(&store, &test_ui(), 10).is_ok());
    }
}
