use crate::{config::TargetConfig, derive::JobConfiguration};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display},
    path::PathBuf,
};


/// joins the parts of a job name, also used for file and log names
pub const NAME_DELIMITER: &str = "_";

/// Processing mode handed to the target through `-p`
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Parallelism {
    SingleThreaded,
    #[default]
    MultiThreaded,
}

impl Display for Parallelism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SingleThreaded => "single-threaded",
            Self::MultiThreaded => "multi-threaded",
        })
    }
}

/// Shape of the generated scripts that stays fixed over a whole sweep
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ScriptVariant {
    // prefix of every job name, omitted when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default)]
    pub mpi: bool,
    #[serde(default)]
    pub parallelism: Parallelism,
}

/// A shell loop around the target invocation, the bound is inclusive
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Phase {
    pub label: &'static str,
    pub bound: u32,
}

impl Phase {
    pub fn warm_up(bound: u32) -> Self {
        Self {
            label: "warmup",
            bound,
        }
    }

    pub fn run(bound: u32) -> Self {
        Self { label: "run", bound }
    }

    /// `for ((i=0; i<=N; i+=1))` executes its body N+1 times
    pub fn executions(&self) -> u64 {
        u64::from(self.bound) + 1
    }
}

/// Rendered submission script, ready to be written once
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptArtifact {
    pub name: String,
    pub file_name: String,
    pub text: String,
}

/// Build the unique job name: `[tag_]<nodes>_<workers>_<vehicles>`
pub fn job_name(tag: Option<&str>, nodes: u32, workers: u32, vehicles: u32) -> String {
    let counts = [nodes, workers, vehicles].map(|count| count.to_string());

    tag.into_iter()
        .map(str::to_owned)
        .chain(counts)
        .collect::<Vec<_>>()
        .join(NAME_DELIMITER)
}

/// Pure text substitution of a job into the batch script template
#[derive(Clone, Debug)]
pub struct Renderer {
    executable: PathBuf,
    subcommand: String,
    input: PathBuf,
    parallelism: Parallelism,
    phases: [Phase; 2],
}

impl Renderer {
    pub fn new(target: &TargetConfig, variant: &ScriptVariant, warm_ups: u32, runs: u32) -> Self {
        Self {
            executable: target.executable_path(),
            subcommand: target.subcommand.clone(),
            input: target.input_path(),
            parallelism: variant.parallelism,
            phases: [Phase::warm_up(warm_ups), Phase::run(runs)],
        }
    }

    /// target invocations performed by every rendered script
    pub fn executions(&self) -> u64 {
        self.phases.iter().map(Phase::executions).sum()
    }

    pub fn render(&self, job: &JobConfiguration) -> ScriptArtifact {
        let body = self
            .phases
            .iter()
            .map(|phase| self.render_phase(job, phase))
            .collect::<Vec<_>>()
            .join("\n");

        ScriptArtifact {
            name: job.name.clone(),
            file_name: format!("{}.sh", job.name),
            text: format!("{}\n{body}", Self::render_header(job)),
        }
    }

    fn render_header(job: &JobConfiguration) -> String {
        format!(
            "#!/bin/bash
#SBATCH -p {partition}
#SBATCH -n {workers}
#SBATCH -N {nodes}-{nodes}
#SBATCH -t {time_limit}
#SBATCH -o {log}
",
            partition = job.partition,
            workers = job.worker_count,
            nodes = job.node_count,
            time_limit = job.time_limit,
            log = job.output_path.display(),
        )
    }

    fn render_phase(&self, job: &JobConfiguration, phase: &Phase) -> String {
        let mpi = if job.mpi { " --mpi" } else { "" };

        format!(
            "# {label}
for ((i=0; i<={bound}; i+=1)); do
    srun -N {nodes}-{nodes} \\
        -n {workers} {executable} {subcommand} \\
        -n {vehicles}{mpi} -p {parallelism} {input}
done
",
            label = phase.label,
            bound = phase.bound,
            nodes = job.node_count,
            workers = job.worker_count,
            executable = self.executable.display(),
            subcommand = self.subcommand,
            vehicles = job.vehicle_load,
            parallelism = self.parallelism,
            input = self.input.display(),
        )
    }
}
