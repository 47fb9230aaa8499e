use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use envswitch::{
    commands::{self, SwitchOutput},
    paths::Paths,
    planner::Platform,
    profile::NewProfile,
    prompt::TerminalPrompter,
    store::ProfileStore,
    ui::{ColorMode, Ui},
};

/// Environment variable holding a tracing filter, e.g. `envswitch=debug`
const LOG_ENV_VAR: &str = "ENVSWITCH_LOG";

#[derive(Parser)]
#[command(name = "envswitch")]
#[command(about = "Quick Environment Switcher - switch between project environments instantly")]
#[command(version)]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// When to use colors: always, auto, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// Log store activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this directory instead of ~/.envswitch
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Init,

    /// Add a new environment
    Add {
        /// Environment name
        name: String,

        /// Project path
        path: PathBuf,

        /// Python venv path
        #[arg(long, value_name = "PATH")]
        python: Option<PathBuf>,

        /// Node version
        #[arg(long, value_name = "VERSION")]
        node: Option<String>,

        /// Environment variable (repeatable)
        #[arg(long = "env", value_name = "KEY=VALUE")]
        env_vars: Vec<String>,

        /// Shell command to run on switch (repeatable)
        #[arg(long = "cmd", value_name = "COMMAND")]
        commands: Vec<String>,

        /// Description
        #[arg(long)]
        desc: Option<String>,
    },

    /// Print the commands that switch to an environment
    Switch {
        /// Environment name
        name: String,

        /// Print only the shell lines, for eval/source
        #[arg(long)]
        script: bool,

        /// Format for this platform instead of the current one: unix, windows
        #[arg(long, value_name = "PLATFORM")]
        platform: Option<Platform>,
    },

    /// List environments
    List {
        /// Search filter
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Get environment details
    Get {
        /// Environment name
        name: String,
    },

    /// Delete an environment
    Delete {
        /// Environment name
        name: String,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Show recent switches
    History {
        /// Number of entries
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },

    /// Add an environment interactively
    Interactive,

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "envswitch=debug" } else { "warn" })
    });

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let ui = Ui::new(cli.color, cli.no_color);
    init_logging(cli.verbose);

    if let Err(e) = run(cli, &ui) {
        ui.err(format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli, ui: &Ui) -> Result<()> {
    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "envswitch", &mut std::io::stdout());
        return Ok(());
    }

    let paths = match cli.config_dir {
        Some(dir) => Paths::at(dir),
        None => Paths::new()?,
    };
    let store = ProfileStore::new(paths);

    if !matches!(cli.command, Commands::Init) {
        store.initialize()?;
    }

    match cli.command {
        Commands::Init => commands::init(&store, ui),
        Commands::Add {
            name,
            path,
            python,
            node,
            env_vars,
            commands: shell_commands,
            desc,
        } => {
            let mut new = NewProfile::new(name, path);
            new.interpreter_env = python;
            new.runtime_version = node;
            new.commands = shell_commands;
            new.description = desc.unwrap_or_default();
            for raw in &env_vars {
                let (key, value) = commands::parse_env_pair(raw)?;
                new.variables.insert(key, value);
            }
            commands::add(&store, ui, new)
        }
        Commands::Switch {
            name,
            script,
            platform,
        } => {
            let output = if script {
                SwitchOutput::Script
            } else {
                SwitchOutput::Banner
            };
            let platform = platform.unwrap_or_else(Platform::current);
            commands::switch(&store, ui, &name, platform, output)
        }
        Commands::List { search } => commands::list(&store, ui, search.as_deref()),
        Commands::Get { name } => commands::get(&store, ui, &name),
        Commands::Delete { name, yes } => commands::delete(&store, ui, &name, yes),
        Commands::History { limit } => commands::history(&store, ui, limit),
        Commands::Interactive => commands::interactive(&store, ui, &mut TerminalPrompter),
        Commands::Completions { .. } => Ok(()),
    }
}
