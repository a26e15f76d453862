mod platform;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::LevelFilter;
use sentinel_core::Msg;
use sentinel_logging::{LogDestination, DEFAULT_LOG_FILE};

use platform::app::{detect, run_interactive, Session};
use platform::config::{self, AppConfig};

/// Terminal dashboard for the Sentinel coding agent.
#[derive(Parser)]
#[command(name = "sentinel", version)]
struct Cli {
    /// RON config file (default ./sentinel.ron)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to the terminal
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Without a subcommand an interactive session starts
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Guess the language of a file or stdin
    Detect { file: Option<PathBuf> },

    /// Typewriter a file or stdin to the terminal
    Type {
        file: Option<PathBuf>,
        /// Per-character delay in milliseconds
        #[arg(long, allow_hyphen_values = true)]
        speed: Option<i64>,
        /// Delay before the first character in milliseconds
        #[arg(long, allow_hyphen_values = true)]
        delay: Option<i64>,
    },

    /// Scan a project folder through the agent service
    Scan {
        #[arg(default_value = ".")]
        path: String,
    },

    /// Ask for project-wide fixes and print the proposed diffs
    Fix { instruction: String },

    /// Analyze a file, typewriter the repaired code and auto-save it
    Analyze {
        file: PathBuf,
        /// Screenshot for visual repair
        #[arg(long)]
        screenshot: Option<PathBuf>,
    },

    /// Save a file's content through the agent service
    Save { file: PathBuf },

    /// Print the effective configuration as RON
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = config::config_path(cli.config.as_deref());
    let loaded = config::read_config(&config_path);
    let log_to_file = match &loaded {
        Ok(Some(file)) => file.log_to_file,
        _ => AppConfig::default().log_to_file,
    };
    init_logging(log_to_file, cli.verbose);
    let mut config = config::resolve_config(&config_path, cli.config.is_some(), loaded);

    match cli.command {
        None => run_interactive(&config),
        Some(Commands::Detect { file }) => {
            let code = read_input(file.as_deref())?;
            let name = file
                .as_deref()
                .and_then(Path::file_name)
                .and_then(|name| name.to_str());
            println!("{}", detect(&code, name));
            Ok(())
        }
        Some(Commands::Type { file, speed, delay }) => {
            if let Some(speed) = speed {
                config.typewriter.speed_ms = speed;
            }
            if let Some(delay) = delay {
                config.typewriter.start_delay_ms = delay;
            }
            let text = read_input(file.as_deref())?;
            let mut session = Session::new(&config)?;
            session.type_out(text);
            session.shutdown();
            Ok(())
        }
        Some(Commands::Scan { path }) => {
            one_shot(&config, |session| {
                session.dispatch(Msg::ScanRequested { path });
                Ok(())
            })
        }
        Some(Commands::Fix { instruction }) => {
            let mut session = Session::new(&config)?;
            session.dispatch(Msg::InstructionChanged(instruction));
            session.dispatch(Msg::BatchFixRequested);
            session.settle();
            session.show_changes();
            session.shutdown();
            Ok(())
        }
        Some(Commands::Analyze { file, screenshot }) => one_shot(&config, |session| {
            session.load_file(&file)?;
            if let Some(screenshot) = screenshot {
                session.attach_screenshot(&screenshot)?;
            }
            session.dispatch(Msg::AnalyzeRequested);
            Ok(())
        }),
        Some(Commands::Save { file }) => one_shot(&config, |session| {
            session.load_file(&file)?;
            session.dispatch(Msg::SaveRequested);
            Ok(())
        }),
        Some(Commands::Config) => {
            println!("{}", config.to_ron()?);
            Ok(())
        }
    }
}

fn one_shot(
    config: &AppConfig,
    start: impl FnOnce(&mut Session) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    let mut session = Session::new(config)?;
    let started = start(&mut session);
    if started.is_ok() {
        session.settle();
    }
    session.shutdown();
    started
}

fn init_logging(log_to_file: bool, verbose: bool) {
    let file = PathBuf::from(DEFAULT_LOG_FILE);
    let (destination, level) = match (log_to_file, verbose) {
        (true, true) => (LogDestination::Both(file), LevelFilter::Debug),
        (true, false) => (LogDestination::File(file), LevelFilter::Info),
        (false, true) => (LogDestination::Terminal, LevelFilter::Debug),
        (false, false) => (LogDestination::Terminal, LevelFilter::Warn),
    };
    sentinel_logging::initialize(destination, level);
}

fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
        }
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}
