//! Switch planning.
//!
//! Turns a [`Profile`] into the ordered shell lines that recreate it in the
//! caller's shell:
//! 1. Change into the project directory.
//! 2. Activate the interpreter environment, when its activation script exists.
//! 3. Export the profile's variables.
//! 4. Run the profile's custom commands.
//!
//! Nothing here executes the lines. The only filesystem access is the
//! existence check on the interpreter environment and its activation script;
//! anything missing just drops that section.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::profile::Profile;

/// Shell family the plan is formatted for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// cmd.exe conventions: `Scripts\activate.bat`, `set NAME=VALUE`
    Windows,
    /// POSIX shells: `source bin/activate`, `export NAME="VALUE"`
    Unix,
}

impl Platform {
    /// The platform this binary was built for
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }

    /// Location of the activation script inside an interpreter environment.
    ///
    /// On Windows the batch script is preferred, falling back to the
    /// PowerShell script when no batch file is present.
    pub fn activation_script(self, env_root: &Path) -> PathBuf {
        match self {
            Self::Windows => {
                let scripts = env_root.join("Scripts");
                let batch = scripts.join("activate.bat");
                if batch.exists() {
                    batch
                } else {
                    scripts.join("Activate.ps1")
                }
            }
            Self::Unix => env_root.join("bin").join("activate"),
        }
    }

    fn activate(self, script: &Path) -> String {
        match self {
            Self::Windows => script.display().to_string(),
            Self::Unix => format!("source {}", script.display()),
        }
    }

    fn assign(self, key: &str, value: &str) -> String {
        match self {
            Self::Windows => format!("set {key}={value}"),
            Self::Unix => format!("export {key}=\"{value}\""),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Windows => write!(f, "windows"),
            Self::Unix => write!(f, "unix"),
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "windows" | "win" | "cmd" => Ok(Self::Windows),
            "unix" | "linux" | "macos" | "posix" => Ok(Self::Unix),
            _ => Err(format!("invalid platform: {}", s)),
        }
    }
}

/// Build the shell lines that switch to `profile`
pub fn plan(profile: &Profile, platform: Platform) -> Vec<String> {
    let mut lines = vec![format!("cd {}", profile.project_path.display())];

    if let Some(script) = profile
        .interpreter_env
        .as_deref()
        .filter(|env_root| env_root.exists())
        .map(|env_root| platform.activation_script(env_root))
        .filter(|script| script.exists())
    {
        lines.push("# Activate Python environment".to_string());
        lines.push(platform.activate(&script));
    }

    if !profile.variables.is_empty() {
        lines.push("# Set environment variables".to_string());
        lines.extend(
            profile
                .variables
                .iter()
                .map(|(key, value)| platform.assign(key, value)),
        );
    }

    if !profile.commands.is_empty() {
        lines.push("# Custom commands".to_string());
        lines.extend(profile.commands.iter().cloned());
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use indexmap::IndexMap;
    use std::fs;
    use tempfile::TempDir;

    fn profile(path: &str) -> Profile {
        Profile {
            name: "demo".to_string(),
            project_path: PathBuf::from(path),
            interpreter_env: None,
            runtime_version: None,
            variables: IndexMap::new(),
            commands: Vec::new(),
            description: String::new(),
            created_at: Utc::now(),
            last_used_at: None,
            use_count: 0,
        }
    }

    fn venv_with(temp_dir: &TempDir, files: &[&str]) -> PathBuf {
        let root = temp_dir.path().join(".venv");
        for file in files {
            let path = root.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "").unwrap();
        }
        fs::create_dir_all(&root).unwrap();
        root
    }

    #[test]
    fn test_demo_scenario_unix() {
        let mut p = profile("/tmp/demo");
        p.variables.insert("DEBUG".to_string(), "true".to_string());
        p.commands.push("echo hi".to_string());

        assert_eq!(
            plan(&p, Platform::Unix),
            vec![
                "cd /tmp/demo",
                "# Set environment variables",
                "export DEBUG=\"true\"",
                "# Custom commands",
                "echo hi",
            ]
        );
    }

    #[test]
    fn test_cd_always_first() {
        let p = profile("/srv/empty");
        assert_eq!(plan(&p, Platform::Unix), vec!["cd /srv/empty"]);
        assert_eq!(plan(&p, Platform::Windows), vec!["cd /srv/empty"]);
    }

    #[test]
    fn test_unix_activation() {
        let temp_dir = TempDir::new().unwrap();
        let venv = venv_with(&temp_dir, &["bin/activate"]);
        let mut p = profile("/srv/app");
        p.interpreter_env = Some(venv.clone());

        let lines = plan(&p, Platform::Unix);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "cd /srv/app");
        assert_eq!(lines[1], "# Activate Python environment");
        assert_eq!(
            lines[2],
            format!("source {}", venv.join("bin").join("activate").display())
        );
    }

    #[test]
    fn test_windows_prefers_batch_script() {
        let temp_dir = TempDir::new().unwrap();
        let venv = venv_with(&temp_dir, &["Scripts/activate.bat", "Scripts/Activate.ps1"]);
        let mut p = profile("/srv/app");
        p.interpreter_env = Some(venv.clone());

        let lines = plan(&p, Platform::Windows);
        assert_eq!(
            lines[2],
            venv.join("Scripts").join("activate.bat").display().to_string()
        );
    }

    #[test]
    fn test_windows_falls_back_to_powershell() {
        let temp_dir = TempDir::new().unwrap();
        let venv = venv_with(&temp_dir, &["Scripts/Activate.ps1"]);
        let mut p = profile("/srv/app");
        p.interpreter_env = Some(venv.clone());

        let lines = plan(&p, Platform::Windows);
        assert_eq!(lines[1], "# Activate Python environment");
        assert_eq!(
            lines[2],
            venv.join("Scripts").join("Activate.ps1").display().to_string()
        );
    }

    #[test]
    fn test_missing_env_dir_skips_activation() {
        let temp_dir = TempDir::new().unwrap();
        let mut p = profile("/srv/app");
        p.interpreter_env = Some(temp_dir.path().join("does-not-exist"));

        assert_eq!(plan(&p, Platform::Unix), vec!["cd /srv/app"]);
        assert_eq!(plan(&p, Platform::Windows), vec!["cd /srv/app"]);
    }

    #[test]
    fn test_missing_script_skips_activation() {
        let temp_dir = TempDir::new().unwrap();
        let venv = venv_with(&temp_dir, &[]);
        let mut p = profile("/srv/app");
        p.interpreter_env = Some(venv);
        p.commands.push("make".to_string());

        assert_eq!(
            plan(&p, Platform::Unix),
            vec!["cd /srv/app", "# Custom commands", "make"]
        );
    }

    #[test]
    fn test_one_assignment_per_variable_in_order() {
        let mut p = profile("/srv/app");
        for (k, v) in [("ZED", "z"), ("ALPHA", "a b"), ("MID", "say \"hi\"")] {
            p.variables.insert(k.to_string(), v.to_string());
        }

        let unix = plan(&p, Platform::Unix);
        assert_eq!(
            unix[2..],
            [
                "export ZED=\"z\"",
                "export ALPHA=\"a b\"",
                "export MID=\"say \"hi\"\"",
            ]
        );

        let windows = plan(&p, Platform::Windows);
        assert_eq!(
            windows[2..],
            ["set ZED=z", "set ALPHA=a b", "set MID=say \"hi\""]
        );
    }

    #[test]
    fn test_commands_are_verbatim_on_every_platform() {
        let mut p = profile("/srv/app");
        p.commands.push("export PATH=$PATH:./bin".to_string());
        p.commands.push("nvm use 18 && npm ci".to_string());

        for platform in [Platform::Unix, Platform::Windows] {
            let lines = plan(&p, platform);
            assert_eq!(
                lines[1..],
                [
                    "# Custom commands",
                    "export PATH=$PATH:./bin",
                    "nvm use 18 && npm ci",
                ]
            );
        }
    }

    #[test]
    fn test_platform_parse_and_display() {
        assert_eq!("windows".parse::<Platform>().unwrap(), Platform::Windows);
        assert_eq!("CMD".parse::<Platform>().unwrap(), Platform::Windows);
        assert_eq!("linux".parse::<Platform>().unwrap(), Platform::Unix);
        assert!("beos".parse::<Platform>().is_err());
        assert_eq!(Platform::Unix.to_string(), "unix");
        assert_eq!(Platform::Windows.to_string(), "windows");
    }
}
