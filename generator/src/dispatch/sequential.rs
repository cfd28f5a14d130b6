use crate::{
    config::FailurePolicy,
    emit::{EmitReport, Emitter},
    render::ScriptArtifact,
};
use tracing::{debug, warn};

/// Emits artifacts one after another on the calling thread
#[derive(Debug)]
pub struct SequentialDispatcher {
    pub policy: FailurePolicy,
}

impl SequentialDispatcher {
    pub fn load(policy: FailurePolicy) -> Self {
        Self { policy }
    }

    pub fn dispatch<I>(&self, mut artifacts: I, emitter: &Emitter) -> EmitReport
    where
        I: Iterator<Item = ScriptArtifact>,
    {
        let mut report = EmitReport::default();

        for artifact in artifacts.by_ref() {
            debug!(name = %artifact.name, "Dispatching artifact");

            let result = emitter.emit(&artifact);
            let failed = result.is_err();
            report.record(result);

            if failed && self.policy == FailurePolicy::Abort {
                report.skipped = artifacts.by_ref().count();
                warn!(
                    skipped = report.skipped,
                    "Aborting sweep after the first failed artifact"
                );

                break;
            }
        }

        report
    }
}
