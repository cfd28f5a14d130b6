use super::{presets, ConfigErrors, FailurePolicy, SweepConfig};
use crate::{
    derive::WorkerPolicy,
    sweep::{Axis, Sweep, SweepAxis, SweepError},
    test_helpers::{axis_config, per_node_config},
};
use std::path::PathBuf;

const OPT_YAML: &str = r#"
variant:
  tag: opt
  mpi: true
axes:
  - axis: vehicles
    values: [10]
  - axis: nodes
    values: [2]
workers:
  mode: per-node
  count: 24
scheduler:
  time_limit: "120:00"
  warm_ups: 2
  runs: 10
target:
  base_dir: /cluster/sim
  executable: target/release/traffic-sim
  input: assets/graph.json
"#;

#[test]
pub fn yaml_defaults_match_helpers() {
    let config = SweepConfig::from_yaml(OPT_YAML).unwrap();

    assert_eq!(config, per_node_config());
    assert_eq!(config.output.dir, PathBuf::from("."));
    assert_eq!(config.output.threads, 1);
    assert_eq!(config.output.failure_policy, FailurePolicy::Continue);
}

#[test]
pub fn yaml_round_trip_keeps_config() {
    let config = axis_config();
    let yaml = config.to_yaml().unwrap();

    assert!(yaml.contains("mode: axis"));
    assert_eq!(SweepConfig::from_yaml(&yaml).unwrap(), config);
}

#[test]
pub fn unknown_fields_are_rejected() {
    let input = OPT_YAML.replace("  runs: 10", "  runs: 10\n  retries: 3");

    assert!(matches!(
        SweepConfig::from_yaml(&input),
        Err(ConfigErrors::InvalidYaml(_))
    ));
}

#[test]
pub fn helpers_pass_preflight() {
    assert!(axis_config().preflight_checks().is_ok());
    assert!(per_node_config().preflight_checks().is_ok());
}

#[test]
pub fn axis_policy_requires_worker_axis() {
    let mut config = axis_config();
    config.axes.pop();

    let problems = config.problems();

    assert_eq!(problems.len(), 1);
    assert!(matches!(
        problems[0],
        ConfigErrors::MissingAxis(Axis::Workers)
    ));
}

#[test]
pub fn per_node_policy_forbids_worker_axis() {
    let mut config = per_node_config();
    config.axes.push(SweepAxis::new(Axis::Workers, vec![2]));
    config.workers = WorkerPolicy::PerNode { count: 0 };

    let problems = config.problems();

    assert_eq!(problems.len(), 2);
    assert!(matches!(problems[0], ConfigErrors::DerivedWorkersAxis));
    assert!(matches!(problems[1], ConfigErrors::ZeroWorkersPerNode));
}

#[test]
pub fn every_problem_is_reported() {
    let mut config = axis_config();
    config.axes[0].values.clear();
    config.scheduler.partition = String::new();
    config.target.base_dir = PathBuf::from("relative/checkout");
    config.output.threads = 0;

    let problems = config.problems();

    assert_eq!(problems.len(), 4);
    assert!(matches!(
        problems[0],
        ConfigErrors::InvalidSweep(SweepError::EmptyAxis(Axis::Vehicles))
    ));
    assert!(matches!(
        config.preflight_checks(),
        Err(ConfigErrors::Preflight(4))
    ));
}

#[test]
pub fn missing_output_dir_is_fatal() {
    let mut config = axis_config();
    config.output.dir = PathBuf::from("/this/path/does/not/exist");

    assert!(matches!(
        config.check_output_dir(),
        Err(ConfigErrors::InvalidOutputDir(_))
    ));
}

#[test]
pub fn presets_are_valid() {
    for name in presets::PRESETS {
        let config = presets::preset(name).unwrap();

        assert!(config.problems().is_empty(), "preset {name} is invalid");
    }
}

#[test]
pub fn preset_sizes() {
    let sizes = presets::PRESETS.map(|name| {
        let config = presets::preset(name).unwrap();
        Sweep::new(&config.axes).unwrap().cardinality()
    });

    assert_eq!(sizes, [175, 20, 5, 25]);
}

#[test]
pub fn unknown_preset() {
    assert!(matches!(
        presets::preset("nope"),
        Err(ConfigErrors::UnknownPreset(name)) if name == "nope"
    ));
}

#[test]
pub fn tag_must_be_a_single_file_name_component() {
    for tag in ["../escaped", "a/b", "with space", ".", "..", "tab\there"] {
        let mut config = per_node_config();
        config.variant.tag = Some(String::from(tag));

        let problems = config.problems();

        assert_eq!(problems.len(), 1, "tag {tag:?}");
        assert!(matches!(&problems[0], ConfigErrors::InvalidTag(t) if t == tag));
    }

    for tag in ["opt", "cc_multi", "v1.2-rc"] {
        let mut config = per_node_config();
        config.variant.tag = Some(String::from(tag));

        assert!(config.problems().is_empty(), "tag {tag:?}");
    }
}

#[test]
pub fn time_limit_must_be_a_single_token() {
    for time_limit in ["1:00\nrm -rf ~", "1:00 ", "1:\u{7}00"] {
        let mut config = per_node_config();
        config.scheduler.time_limit = String::from(time_limit);

        let problems = config.problems();

        assert_eq!(problems.len(), 1, "time limit {time_limit:?}");
        assert!(matches!(
            &problems[0],
            ConfigErrors::UnsafeValue { field, value }
                if *field == "scheduler.time_limit" && value == time_limit
        ));
    }
}

#[test]
pub fn partition_must_be_a_single_token() {
    for partition in ["medium\n#SBATCH -o /tmp/x", "me dium", "medium\r"] {
        let mut config = axis_config();
        config.scheduler.partition = String::from(partition);

        let problems = config.problems();

        assert_eq!(problems.len(), 1, "partition {partition:?}");
        assert!(matches!(
            &problems[0],
            ConfigErrors::UnsafeValue { field, value }
                if *field == "scheduler.partition" && value == partition
        ));
    }
}

#[test]
pub fn unsafe_values_fail_preflight() {
    let mut config = per_node_config();
    config.variant.tag = Some(String::from("../escaped"));
    config.scheduler.time_limit = String::from("1:00\nrm -rf ~");

    assert!(matches!(
        config.preflight_checks(),
        Err(ConfigErrors::Preflight(2))
    ));
}
