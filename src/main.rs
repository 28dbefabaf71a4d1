//! Loggable - named, colorized loggers
//!
//! CLI entry point: pretty-print data files and demo the logging façades.

// Allow multiple crate versions from dependencies (can't easily control)
#![allow(clippy::multiple_crate_versions)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use loggable::{
    condense_long_lists, pformat, Loggable, LoggableFactory, LoggableSettings, PrettyOptions,
    Scoped,
};

/// Named, colorized loggers with scoped timing and progress bars
#[derive(Parser, Debug)]
#[command(name = "loggable", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pretty-print a JSON or TOML file, condensing long lists
    Pprint {
        /// File to print; `.toml` files are read as TOML, anything else as JSON
        file: PathBuf,

        /// Target line width
        #[arg(long, default_value_t = 80)]
        width: usize,

        /// Nesting depth shown before eliding
        #[arg(long, default_value_t = 10)]
        depth: usize,

        /// Lists longer than this are condensed
        #[arg(long, default_value_t = 20)]
        max_list_len: usize,

        /// Spaces per nesting level
        #[arg(long, default_value_t = 1)]
        indent: usize,

        /// One item per line instead of packing short items
        #[arg(long)]
        expanded: bool,
    },

    /// Run a timed block and a tracked loop
    Demo {
        /// Level to run at; overrides the settings file and LOGGABLE_LEVEL
        #[arg(long)]
        level: Option<String>,

        /// Path to a loggable.toml settings file
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Number of loop steps
        #[arg(long, default_value_t = 20)]
        steps: u64,

        /// Delay per step in milliseconds
        #[arg(long, default_value_t = 50)]
        delay_ms: u64,
    },
}

/// Read a data file as a JSON value, choosing the parser by extension.
fn load_data(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file: {}", path.display()))?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if is_toml {
        let table: toml::Value = toml::from_str(&content).context("Failed to parse TOML")?;
        serde_json::to_value(table).context("Failed to convert TOML")
    } else {
        serde_json::from_str(&content).context("Failed to parse JSON")
    }
}

/// Condense and pretty-print `value`.
fn render(value: &Value, options: &PrettyOptions) -> String {
    pformat(&condense_long_lists(value, options.max_list_len), options)
}

/// Load settings from an optional file, then apply env and CLI level overrides.
fn load_settings(path: Option<&Path>, level: Option<String>) -> Result<LoggableSettings> {
    let settings = match path {
        Some(path) => LoggableSettings::from_path(path)
            .with_context(|| format!("Failed to load settings from '{}'", path.display()))?,
        None => LoggableSettings::default(),
    };
    let mut settings = settings
        .with_env_override()?
        .with_level_override(level)
        .context("Invalid --level")?;
    settings.level.get_or_insert_with(|| "info".to_string());
    Ok(settings)
}

fn run_demo(log: &Loggable, steps: u64, delay: Duration) -> Result<()> {
    log.info(format!("Running {steps} steps"));

    let mut timer = log.timeit("INFO", "demo")?;
    timer.run(|_| -> Result<()> {
        let mut tracker = log.track("INFO", Some(steps), Some("steps"))?;
        tracker.run(|progress| -> Result<()> {
            for step in 1..=steps {
                std::thread::sleep(delay);
                let message = if step % 10 == 0 {
                    format!("step {step}")
                } else {
                    String::new()
                };
                progress.update(1, message)?;
            }
            Ok(())
        })
    })?;

    let summary = json!({
        "steps": steps,
        "squares": (0..steps).map(|n| n * n).collect::<Vec<_>>(),
    });
    log.pprint(&summary, "INFO")?;

    for _ in log.tqdm(0..steps, "DEBUG", Some("debug only"))? {
        std::thread::sleep(delay);
    }
    log.debug("Done");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Pprint {
            file,
            width,
            depth,
            max_list_len,
            indent,
            expanded,
        } => {
            let value = load_data(&file)?;
            let options = PrettyOptions {
                width,
                depth,
                max_list_len,
                compact: !expanded,
                indent,
            };
            println!("{}", render(&value, &options));
        }
        Command::Demo {
            level,
            settings,
            steps,
            delay_ms,
        } => {
            let settings = load_settings(settings.as_deref(), level)?;
            let factory = LoggableFactory::from_settings(&settings)?;
            let log = factory.create("demo");
            run_demo(&log, steps, Duration::from_millis(delay_ms))?;
        }
    }

    Ok(())
}
