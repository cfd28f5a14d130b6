use crate::{
    config::{ConfigErrors, FailurePolicy},
    emit::{EmitReport, Emitter},
    render::ScriptArtifact,
};
use parking_lot::Mutex;
use rayon::{prelude::*, ThreadPool, ThreadPoolBuilder};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, info, warn};

/// Emits artifacts on a dedicated thread pool, file contents do not depend on the order
pub struct PooledDispatcher {
    pub policy: FailurePolicy,
    pool: ThreadPool,
}

impl std::fmt::Debug for PooledDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledDispatcher")
            .field("policy", &self.policy)
            .field("threads", &self.pool.current_num_threads())
            .finish()
    }
}

impl PooledDispatcher {
    pub fn load(threads: usize, policy: FailurePolicy) -> Result<Self, ConfigErrors> {
        debug!("Starting thread pool with {threads} threads");

        Ok(Self {
            policy,
            pool: ThreadPoolBuilder::new().num_threads(threads).build()?,
        })
    }

    pub fn dispatch<I>(&self, artifacts: I, emitter: &Emitter) -> EmitReport
    where
        I: Iterator<Item = ScriptArtifact> + Send,
    {
        let report = Mutex::new(EmitReport::default());
        let aborted = AtomicBool::new(false);
        let processed = AtomicU64::new(0);
        let skipped = AtomicU64::new(0);

        self.pool.install(|| {
            artifacts.par_bridge().for_each(|artifact| {
                if aborted.load(Ordering::SeqCst) {
                    skipped.fetch_add(1, Ordering::SeqCst);
                    return;
                }

                let result = emitter.emit(&artifact);

                if result.is_err() && self.policy == FailurePolicy::Abort {
                    warn!(name = %artifact.name, "Aborting sweep after a failed artifact");
                    aborted.store(true, Ordering::SeqCst);
                }

                report.lock().record(result);
                debug!(
                    "Done with {} artifacts",
                    processed.fetch_add(1, Ordering::SeqCst) + 1
                );
            });
        });

        let mut report = report.into_inner();
        report.skipped = skipped.into_inner() as usize;
        // the pool finishes artifacts in any order
        report.written.sort();
        report.failed.sort_by(|a, b| a.path.cmp(&b.path));

        info!(
            written = report.written.len(),
            failed = report.failed.len(),
            "Pooled dispatch finished"
        );

        report
    }
}
