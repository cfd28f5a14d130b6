pub mod presets;

#[cfg(test)]
mod config_test;

use crate::{
    derive::WorkerPolicy,
    render::ScriptVariant,
    sweep::{Axis, Sweep, SweepAxis, SweepError},
};
use serde::{Deserialize, Serialize};
use std::{fs, io, path::PathBuf};
use thiserror::Error;
use tracing::{debug, error};

#[derive(Error, Debug)]
pub enum ConfigErrors {
    #[error("Sweep axes are invalid: {0}")]
    InvalidSweep(#[from] SweepError),
    #[error("Axis {0} is required but not defined")]
    MissingAxis(Axis),
    #[error("Axis workers must not be defined when workers are derived per node")]
    DerivedWorkersAxis,
    #[error("workers.count must be at least 1")]
    ZeroWorkersPerNode,
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
    #[error("variant.tag {0:?} may only contain letters, digits, '_', '.' and '-' and must not be '.' or '..'")]
    InvalidTag(String),
    #[error("{field} {value:?} must not contain whitespace or control characters")]
    UnsafeValue { field: &'static str, value: String },
    #[error("target.base_dir must be an absolute path, got {0:?}")]
    RelativeBaseDir(PathBuf),
    #[error("output.threads must be at least 1")]
    ZeroThreads,
    #[error("Output directory {0:?} does not exist or is not a directory")]
    InvalidOutputDir(PathBuf),
    #[error("Preset {0} is not known, see `batchgen presets`")]
    UnknownPreset(String),
    #[error("Failed to read config file: {0}")]
    ReadFailed(#[from] io::Error),
    #[error("Config is not valid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),
    #[error("Thread pool failed to start")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("Config contains {0} error(s), see log for details")]
    Preflight(usize),
}

/// Everything needed to generate one sweep of batch scripts
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SweepConfig {
    // flags and naming shared by all scripts of the sweep
    pub variant: ScriptVariant,
    // axes in enumeration order, the first one varies slowest
    pub axes: Vec<SweepAxis>,
    pub workers: WorkerPolicy,
    pub scheduler: SchedulerConfig,
    pub target: TargetConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfig {
    #[serde(default = "default_partition")]
    pub partition: String,
    // passed verbatim to `#SBATCH -t`
    pub time_limit: String,
    pub warm_ups: u32,
    pub runs: u32,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// checkout of the simulation on the cluster
    pub base_dir: PathBuf,
    /// relative paths are resolved against `base_dir`
    pub executable: PathBuf,
    #[serde(default = "default_subcommand")]
    pub subcommand: String,
    /// relative paths are resolved against `base_dir`
    pub input: PathBuf,
}

impl TargetConfig {
    pub fn executable_path(&self) -> PathBuf {
        self.base_dir.join(&self.executable)
    }

    pub fn input_path(&self) -> PathBuf {
        self.base_dir.join(&self.input)
    }
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// skip artifacts that failed to write and report them at the end
    #[default]
    Continue,
    /// stop the sweep at the first artifact that failed to write
    Abort,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    // defaults to target.base_dir
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    #[serde(default = "default_threads")]
    pub threads: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            log_dir: None,
            failure_policy: FailurePolicy::default(),
            threads: default_threads(),
        }
    }
}

impl SweepConfig {
    pub fn from_yaml(input: &str) -> Result<Self, ConfigErrors> {
        Ok(serde_yaml::from_str(input)?)
    }

    pub fn load(path: &PathBuf) -> Result<Self, ConfigErrors> {
        debug!(path = ?path, "Loading sweep config");

        Self::from_yaml(&fs::read_to_string(path)?)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigErrors> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// directory the scheduler writes job logs to
    pub fn log_dir(&self) -> PathBuf {
        self.output
            .log_dir
            .clone()
            .unwrap_or_else(|| self.target.base_dir.clone())
    }

    /// validate the config without touching the filesystem
    /// all problems are collected instead of piece-by-piece to make debugging easier for users
    pub fn problems(&self) -> Vec<ConfigErrors> {
        let mut problems = Sweep::check(&self.axes)
            .into_iter()
            .map(ConfigErrors::from)
            .collect::<Vec<_>>();

        let defines = |axis: Axis| self.axes.iter().any(|defined| defined.axis == axis);

        for axis in [Axis::Vehicles, Axis::Nodes] {
            if !defines(axis) {
                problems.push(ConfigErrors::MissingAxis(axis));
            }
        }

        match self.workers {
            WorkerPolicy::Axis if !defines(Axis::Workers) => {
                problems.push(ConfigErrors::MissingAxis(Axis::Workers));
            }
            WorkerPolicy::PerNode { count } => {
                if defines(Axis::Workers) {
                    problems.push(ConfigErrors::DerivedWorkersAxis);
                }

                if count == 0 {
                    problems.push(ConfigErrors::ZeroWorkersPerNode);
                }
            }
            WorkerPolicy::Axis => {}
        }

        for (field, value) in [
            ("scheduler.partition", &self.scheduler.partition),
            ("scheduler.time_limit", &self.scheduler.time_limit),
            ("target.subcommand", &self.target.subcommand),
        ] {
            if value.trim().is_empty() {
                problems.push(ConfigErrors::EmptyField(field));
            } else if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
                problems.push(ConfigErrors::UnsafeValue {
                    field,
                    value: value.clone(),
                });
            }
        }

        match self.variant.tag.as_deref() {
            Some("") => problems.push(ConfigErrors::EmptyField("variant.tag")),
            Some(tag) if !is_valid_tag(tag) => {
                problems.push(ConfigErrors::InvalidTag(tag.to_owned()));
            }
            _ => {}
        }

        if !self.target.base_dir.is_absolute() {
            problems.push(ConfigErrors::RelativeBaseDir(self.target.base_dir.clone()));
        }

        if self.output.threads == 0 {
            problems.push(ConfigErrors::ZeroThreads);
        }

        problems
    }

    pub fn preflight_checks(&self) -> Result<(), ConfigErrors> {
        let problems = self.problems();

        for problem in problems.iter() {
            error!("{problem}");
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigErrors::Preflight(problems.len()))
        }
    }

    /// scripts are never written into a directory created on the fly
    pub fn check_output_dir(&self) -> Result<(), ConfigErrors> {
        if self.output.dir.is_dir() {
            Ok(())
        } else {
            error!(dir = ?self.output.dir, "Output directory is not usable");

            Err(ConfigErrors::InvalidOutputDir(self.output.dir.clone()))
        }
    }
}

/// tags end up in file names and `#SBATCH -o` paths, so they must stay a single path component
fn is_valid_tag(tag: &str) -> bool {
    tag != "."
        && tag != ".."
        && tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

fn default_partition() -> String {
    String::from("medium")
}

fn default_subcommand() -> String {
    String::from("graph-parts")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_threads() -> usize {
    1
}
