use crate::{
    config::SweepConfig,
    render::job_name,
    sweep::{Axis, RawConfiguration},
};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display},
    path::PathBuf,
};


/// How the rank count of a job is obtained
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum WorkerPolicy {
    /// taken as is from the `workers` axis
    Axis,
    /// `count` ranks on every requested node, usually the cores per node of the cluster
    PerNode { count: u32 },
}

impl WorkerPolicy {
    pub fn workers(&self, raw: &RawConfiguration, nodes: u32) -> Result<u32, Rejection> {
        match self {
            Self::Axis => raw
                .get(Axis::Workers)
                .ok_or(Rejection::MissingAxis(Axis::Workers)),
            Self::PerNode { count } => nodes
                .checked_mul(*count)
                .ok_or(Rejection::WorkerOverflow { nodes, per_node: *count }),
        }
    }
}

/// A validated, fully derived job, immutable once created
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobConfiguration {
    pub name: String,
    pub vehicle_load: u32,
    pub node_count: u32,
    pub worker_count: u32,
    pub time_limit: String,
    pub partition: String,
    pub mpi: bool,
    // scheduler log of the job
    pub output_path: PathBuf,
}

/// Reason a raw configuration is skipped, never an error for the sweep
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    TooFewWorkers { nodes: u32, workers: u32 },
    MissingAxis(Axis),
    WorkerOverflow { nodes: u32, per_node: u32 },
}

impl Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewWorkers { nodes, workers } => {
                write!(f, "{workers} workers cannot be spread over {nodes} nodes")
            }
            Self::MissingAxis(axis) => write!(f, "axis {axis} is missing"),
            Self::WorkerOverflow { nodes, per_node } => {
                write!(f, "{nodes} nodes with {per_node} workers each overflow")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Derivation {
    Accepted(JobConfiguration),
    Rejected(Rejection),
}

impl Derivation {
    pub fn accepted(self) -> Option<JobConfiguration> {
        match self {
            Self::Accepted(job) => Some(job),
            Self::Rejected(_) => None,
        }
    }
}

/// Turns raw points of a sweep into jobs, deterministic and free of side effects
#[derive(Clone, Debug)]
pub struct Deriver<'a> {
    config: &'a SweepConfig,
    log_dir: PathBuf,
}

impl<'a> Deriver<'a> {
    pub fn new(config: &'a SweepConfig) -> Self {
        Self {
            log_dir: config.log_dir(),
            config,
        }
    }

    pub fn derive(&self, raw: &RawConfiguration) -> Derivation {
        match self.try_derive(raw) {
            Ok(job) => Derivation::Accepted(job),
            Err(rejection) => Derivation::Rejected(rejection),
        }
    }

    fn try_derive(&self, raw: &RawConfiguration) -> Result<JobConfiguration, Rejection> {
        let vehicle_load = raw
            .get(Axis::Vehicles)
            .ok_or(Rejection::MissingAxis(Axis::Vehicles))?;
        let node_count = raw
            .get(Axis::Nodes)
            .ok_or(Rejection::MissingAxis(Axis::Nodes))?;
        let worker_count = self.config.workers.workers(raw, node_count)?;

        // the scheduler cannot place fewer ranks than nodes
        if worker_count < node_count {
            return Err(Rejection::TooFewWorkers {
                nodes: node_count,
                workers: worker_count,
            });
        }

        let name = job_name(
            self.config.variant.tag.as_deref(),
            node_count,
            worker_count,
            vehicle_load,
        );

        Ok(JobConfiguration {
            output_path: self.log_dir.join(format!("{name}.out")),
            name,
            vehicle_load,
            node_count,
            worker_count,
            time_limit: self.config.scheduler.time_limit.clone(),
            partition: self.config.scheduler.partition.clone(),
            mpi: self.config.variant.mpi,
        })
    }
}
