use super::{EmitReport, Emitter};
use crate::render::ScriptArtifact;
use std::fs;

fn artifact(name: &str, text: &str) -> ScriptArtifact {
    ScriptArtifact {
        name: name.to_string(),
        file_name: format!("{name}.sh"),
        text: text.to_string(),
    }
}

#[test]
pub fn writes_artifact_under_its_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let emitter = Emitter::new(dir.path().to_path_buf());

    let path = emitter.emit(&artifact("opt_2_48_10", "#!/bin/bash\n")).unwrap();

    assert_eq!(path, dir.path().join("opt_2_48_10.sh"));
    assert_eq!(fs::read_to_string(path).unwrap(), "#!/bin/bash\n");
}

#[test]
pub fn overwrites_previous_run() {
    let dir = tempfile::tempdir().unwrap();
    let emitter = Emitter::new(dir.path().to_path_buf());

    emitter.emit(&artifact("2_4_1", "old contents")).unwrap();
    let path = emitter.emit(&artifact("2_4_1", "new")).unwrap();

    assert_eq!(fs::read_to_string(path).unwrap(), "new");
}

#[test]
pub fn dry_run_leaves_directory_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let emitter = Emitter::dry_run(dir.path().to_path_buf());

    let path = emitter.emit(&artifact("2_4_1", "text")).unwrap();

    assert!(!path.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
pub fn missing_directory_fails_single_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let emitter = Emitter::new(dir.path().join("missing"));

    let error = emitter.emit(&artifact("2_4_1", "text")).unwrap_err();

    assert_eq!(error.name, "2_4_1");
    assert_eq!(error.path, dir.path().join("missing").join("2_4_1.sh"));
}

#[test]
pub fn report_summary() {
    let dir = tempfile::tempdir().unwrap();
    let emitter = Emitter::new(dir.path().to_path_buf());
    let broken = Emitter::new(dir.path().join("missing"));
    let mut report = EmitReport::default();

    report.record(emitter.emit(&artifact("2_2_1", "a")));
    report.record(emitter.emit(&artifact("2_4_1", "b")));
    report.record(broken.emit(&artifact("3_4_1", "c")));
    report.rejected = 2;

    assert!(!report.is_success());
    assert_eq!(
        report.to_string(),
        "generated 2 scripts (2 rejected, 1 failed)"
    );

    report.skipped = 3;
    assert_eq!(
        report.to_string(),
        "generated 2 scripts (2 rejected, 1 failed, 3 skipped after abort)"
    );
}
