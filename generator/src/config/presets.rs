use super::{ConfigErrors, OutputConfig, SchedulerConfig, SweepConfig, TargetConfig};
use crate::{
    derive::WorkerPolicy,
    render::{Parallelism, ScriptVariant},
    sweep::{Axis, SweepAxis},
};
use std::path::PathBuf;

/// names accepted by `--preset`, in the order `batchgen presets` lists them
pub const PRESETS: [&str; 4] = ["mpi-sweep", "opt", "cc-multi", "cc-single-node"];

pub const DEFAULT_PRESET: &str = "opt";

const BASE_DIR: &str = "/usr/users/hpctraining57/mpi-traffic-sim-rust";
const RELEASE_EXECUTABLE: &str = "target/release/traffic-sim";
const CC_EXECUTABLE: &str = "target/cc/traffic-sim";
const GRAPH_INPUT: &str = "assets/graph.json";
const CORES_PER_NODE: u32 = 24;

fn vehicles() -> SweepAxis {
    SweepAxis::new(Axis::Vehicles, vec![1, 10, 100, 1000, 10000])
}

fn base(
    tag: Option<&str>,
    mpi: bool,
    axes: Vec<SweepAxis>,
    workers: WorkerPolicy,
    executable: &str,
) -> SweepConfig {
    SweepConfig {
        variant: ScriptVariant {
            tag: tag.map(String::from),
            mpi,
            parallelism: Parallelism::MultiThreaded,
        },
        axes,
        workers,
        scheduler: SchedulerConfig {
            partition: String::from("medium"),
            time_limit: String::from("120:00"),
            warm_ups: 2,
            runs: 10,
        },
        target: TargetConfig {
            base_dir: PathBuf::from(BASE_DIR),
            executable: PathBuf::from(executable),
            subcommand: String::from("graph-parts"),
            input: PathBuf::from(GRAPH_INPUT),
        },
        output: OutputConfig::default(),
    }
}

/// look up one of the compiled in sweeps
pub fn preset(name: &str) -> Result<SweepConfig, ConfigErrors> {
    let config = match name {
        // full distributed sweep with an independent worker axis
        "mpi-sweep" => {
            let mut config = base(
                None,
                true,
                vec![
                    vehicles(),
                    SweepAxis::new(Axis::Workers, vec![2, 4, 8, 16, 32]),
                    SweepAxis::new(Axis::Nodes, vec![2, 3, 4, 5, 10, 15, 19]),
                ],
                WorkerPolicy::Axis,
                RELEASE_EXECUTABLE,
            );
            config.scheduler.time_limit = String::from("15:00");
            config.scheduler.warm_ups = 5;
            config.scheduler.runs = 100;

            config
        }
        // every core of every node gets a rank
        "opt" => base(
            Some("opt"),
            true,
            vec![vehicles(), SweepAxis::new(Axis::Nodes, vec![2, 4, 6, 8])],
            WorkerPolicy::PerNode {
                count: CORES_PER_NODE,
            },
            RELEASE_EXECUTABLE,
        ),
        "cc-multi" => base(
            Some("cc_multi"),
            false,
            vec![vehicles(), SweepAxis::new(Axis::Nodes, vec![1])],
            WorkerPolicy::PerNode {
                count: CORES_PER_NODE,
            },
            CC_EXECUTABLE,
        ),
        "cc-single-node" => base(
            Some("cc_single_node"),
            false,
            vec![
                vehicles(),
                SweepAxis::new(Axis::Nodes, vec![1]),
                SweepAxis::new(Axis::Workers, vec![2, 4, 8, 16, 24]),
            ],
            WorkerPolicy::Axis,
            CC_EXECUTABLE,
        ),
        unknown => return Err(ConfigErrors::UnknownPreset(unknown.to_string())),
    };

    Ok(config)
}
