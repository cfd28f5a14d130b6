use crate::render::ScriptArtifact;
use std::{
    fmt::{self, Display},
    fs, io,
    path::PathBuf,
};
use thiserror::Error;
use tracing::{info, warn};

#[cfg(test)]
mod emit_test;

#[derive(Error, Debug)]
#[error("Failed to write {name} to {path:?}: {source}")]
pub struct EmitError {
    pub name: String,
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Writes artifacts into the output directory, overwriting earlier runs
#[derive(Clone, Debug)]
pub struct Emitter {
    dir: PathBuf,
    dry_run: bool,
}

impl Emitter {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            dry_run: false,
        }
    }

    /// render-only emitter that never touches the filesystem
    pub fn dry_run(dir: PathBuf) -> Self {
        Self { dir, dry_run: true }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn target(&self, artifact: &ScriptArtifact) -> PathBuf {
        self.dir.join(&artifact.file_name)
    }

    pub fn emit(&self, artifact: &ScriptArtifact) -> Result<PathBuf, EmitError> {
        let path = self.target(artifact);

        if !self.dry_run {
            if let Err(source) = fs::write(&path, &artifact.text) {
                warn!(name = %artifact.name, path = ?path, error = ?source, "Failed to write batch script");

                return Err(EmitError {
                    name: artifact.name.clone(),
                    path,
                    source,
                });
            }
        }

        println!("===== {} =====", artifact.name);
        info!(name = %artifact.name, path = ?path, dry_run = self.dry_run, "Emitted batch script");

        Ok(path)
    }
}

/// Aggregate outcome of a sweep
#[derive(Debug, Default)]
pub struct EmitReport {
    pub written: Vec<PathBuf>,
    pub failed: Vec<EmitError>,
    pub rejected: usize,
    // artifacts never attempted because the sweep aborted
    pub skipped: usize,
    pub dry_run: bool,
}

impl EmitReport {
    pub fn record(&mut self, result: Result<PathBuf, EmitError>) {
        match result {
            Ok(path) => self.written.push(path),
            Err(error) => self.failed.push(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.skipped == 0
    }
}

impl Display for EmitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = if self.dry_run { "rendered" } else { "generated" };

        write!(
            f,
            "{verb} {} scripts ({} rejected, {} failed",
            self.written.len(),
            self.rejected,
            self.failed.len()
        )?;

        if self.skipped > 0 {
            write!(f, ", {} skipped after abort", self.skipped)?;
        }

        write!(f, ")")
    }
}
