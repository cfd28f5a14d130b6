mod config;
mod derive;
mod dispatch;
mod emit;
mod generator;
mod render;
mod sweep;
#[cfg(test)]
mod test_helpers;

use clap::{Args, Parser, Subcommand};
use config::{
    presets::{self, DEFAULT_PRESET, PRESETS},
    ConfigErrors, FailurePolicy, SweepConfig,
};
use generator::Generator;
use std::{path::PathBuf, process::ExitCode};
use sweep::Sweep;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Generate Slurm batch scripts for a benchmark sweep of the traffic simulation
#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log debug information, `RUST_LOG` takes precedence
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Clone, Debug, Subcommand)]
enum Commands {
    /// Render and write one batch script per configuration of the sweep
    Generate {
        #[command(flatten)]
        source: ConfigSource,

        /// Directory the scripts are written to
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Checkout of the simulation on the cluster
        #[arg(short, long)]
        base_dir: Option<PathBuf>,

        /// Write scripts on a pool with this many threads
        #[arg(short, long)]
        threads: Option<usize>,

        /// Stop at the first script that could not be written
        #[arg(long, default_value = "false")]
        fail_fast: bool,

        /// Only print the job names, nothing is written
        #[arg(long, default_value = "false")]
        dry_run: bool,
    },
    /// Print the script of a single job without writing it
    Render {
        #[command(flatten)]
        source: ConfigSource,

        /// Job name as printed by `generate`
        name: String,
    },
    /// List the built-in presets
    Presets,
    /// Print the effective config as YAML
    ShowConfig {
        #[command(flatten)]
        source: ConfigSource,
    },
}

#[derive(Clone, Debug, Args)]
#[group(multiple = false)]
struct ConfigSource {
    /// Name of a built-in sweep
    #[arg(short, long)]
    preset: Option<String>,

    /// YAML file describing the sweep
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ConfigSource {
    fn load(&self) -> Result<SweepConfig, ConfigErrors> {
        match (&self.config, &self.preset) {
            (Some(path), _) => SweepConfig::load(path),
            (None, Some(name)) => presets::preset(name),
            (None, None) => presets::preset(DEFAULT_PRESET),
        }
    }
}

fn setup_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<bool, ConfigErrors> {
    match command {
        Commands::Generate {
            source,
            output_dir,
            base_dir,
            threads,
            fail_fast,
            dry_run,
        } => {
            let mut config = source.load()?;

            if let Some(dir) = output_dir {
                config.output.dir = dir;
            }
            if let Some(dir) = base_dir {
                config.target.base_dir = dir;
            }
            if let Some(threads) = threads {
                config.output.threads = threads;
            }
            if fail_fast {
                config.output.failure_policy = FailurePolicy::Abort;
            }

            let report = Generator::new(config)?.dry_run(dry_run).run()?;

            for failure in report.failed.iter() {
                error!("{failure}");
            }
            println!("{report}");

            Ok(report.is_success())
        }
        Commands::Render { source, name } => {
            let artifacts = Generator::new(source.load()?)?.artifacts()?;

            match artifacts.into_iter().find(|artifact| artifact.name == name) {
                Some(artifact) => {
                    print!("{}", artifact.text);

                    Ok(true)
                }
                None => {
                    error!(name = %name, "The sweep contains no job with this name");

                    Ok(false)
                }
            }
        }
        Commands::Presets => {
            for name in PRESETS {
                let config = presets::preset(name)?;
                let size = Sweep::new(&config.axes)?.cardinality();

                println!("{name:<16} {size:>4} configurations");
            }

            Ok(true)
        }
        Commands::ShowConfig { source } => {
            print!("{}", source.load()?.to_yaml()?);

            Ok(true)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match run(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e}");

            ExitCode::FAILURE
        }
    }
}
