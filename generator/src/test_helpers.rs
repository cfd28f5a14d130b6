//! Shared sweep configs for the unit tests

use crate::{
    config::{OutputConfig, SchedulerConfig, SweepConfig, TargetConfig},
    derive::WorkerPolicy,
    render::{Parallelism, ScriptVariant},
    sweep::{Axis, SweepAxis},
};
use std::path::{Path, PathBuf};

pub const TEST_BASE_DIR: &str = "/cluster/sim";

/// vehicles={1,10}, nodes={2,3}, workers={2,4} with an independent worker axis
pub fn axis_config() -> SweepConfig {
    SweepConfig {
        variant: ScriptVariant {
            tag: None,
            mpi: true,
            parallelism: Parallelism::MultiThreaded,
        },
        axes: vec![
            SweepAxis::new(Axis::Vehicles, vec![1, 10]),
            SweepAxis::new(Axis::Nodes, vec![2, 3]),
            SweepAxis::new(Axis::Workers, vec![2, 4]),
        ],
        workers: WorkerPolicy::Axis,
        scheduler: SchedulerConfig {
            partition: String::from("medium"),
            time_limit: String::from("15:00"),
            warm_ups: 5,
            runs: 100,
        },
        target: TargetConfig {
            base_dir: PathBuf::from(TEST_BASE_DIR),
            executable: PathBuf::from("target/release/traffic-sim"),
            subcommand: String::from("graph-parts"),
            input: PathBuf::from("assets/graph.json"),
        },
        output: OutputConfig::default(),
    }
}

/// vehicles={10}, nodes={2} with 24 workers per node, tagged `opt`
pub fn per_node_config() -> SweepConfig {
    let mut config = axis_config();
    config.variant.tag = Some(String::from("opt"));
    config.axes = vec![
        SweepAxis::new(Axis::Vehicles, vec![10]),
        SweepAxis::new(Axis::Nodes, vec![2]),
    ];
    config.workers = WorkerPolicy::PerNode { count: 24 };
    config.scheduler.time_limit = String::from("120:00");
    config.scheduler.warm_ups = 2;
    config.scheduler.runs = 10;

    config
}

pub fn with_output_dir(mut config: SweepConfig, dir: &Path) -> SweepConfig {
    config.output.dir = dir.to_path_buf();
    config
}
