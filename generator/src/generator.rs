use crate::{
    config::{ConfigErrors, SweepConfig},
    derive::{Derivation, Deriver},
    dispatch::Dispatchers,
    emit::{EmitReport, Emitter},
    render::{Renderer, ScriptArtifact},
    sweep::Sweep,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, instrument};


/// Drives enumerate -> derive -> render -> emit for one sweep
#[derive(Debug)]
pub struct Generator {
    config: SweepConfig,
    dry_run: bool,
}

impl Generator {
    /// fails if the config does not pass the preflight checks
    pub fn new(config: SweepConfig) -> Result<Self, ConfigErrors> {
        config.preflight_checks()?;

        Ok(Self {
            config,
            dry_run: false,
        })
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    fn renderer(&self) -> Renderer {
        Renderer::new(
            &self.config.target,
            &self.config.variant,
            self.config.scheduler.warm_ups,
            self.config.scheduler.runs,
        )
    }

    /// lazily derive every raw configuration of the sweep, rejections included
    pub fn derivations(&self) -> Result<impl Iterator<Item = Derivation> + '_, ConfigErrors> {
        let sweep = Sweep::new(&self.config.axes)?;
        let deriver = Deriver::new(&self.config);

        Ok(sweep.iter().map(move |raw| {
            let derivation = deriver.derive(&raw);

            if let Derivation::Rejected(ref rejection) = derivation {
                debug!(configuration = %raw, "Skipping configuration: {rejection}");
            }

            derivation
        }))
    }

    /// render every surviving configuration without writing anything
    pub fn artifacts(&self) -> Result<Vec<ScriptArtifact>, ConfigErrors> {
        let renderer = self.renderer();

        Ok(self
            .derivations()?
            .filter_map(Derivation::accepted)
            .map(|job| renderer.render(&job))
            .collect())
    }

    #[instrument(skip(self), level = "info")]
    pub fn run(&self) -> Result<EmitReport, ConfigErrors> {
        let emitter = if self.dry_run {
            Emitter::dry_run(self.config.output.dir.clone())
        } else {
            // invalid output directories abort before any file is written
            self.config.check_output_dir()?;
            Emitter::new(self.config.output.dir.clone())
        };
        let dispatcher = Dispatchers::load(&self.config.output)?;
        let renderer = self.renderer();
        let rejected = AtomicUsize::new(0);

        info!(
            configurations = Sweep::new(&self.config.axes)?.cardinality(),
            executions_per_script = renderer.executions(),
            dir = ?self.config.output.dir,
            "Generating batch scripts"
        );

        let artifacts = self
            .derivations()?
            .filter_map(|derivation| match derivation {
                Derivation::Accepted(job) => Some(job),
                Derivation::Rejected(_) => {
                    rejected.fetch_add(1, Ordering::SeqCst);
                    None
                }
            })
            .map(|job| renderer.render(&job));

        let mut report = dispatcher.dispatch(artifacts, &emitter);
        report.rejected = rejected.into_inner();

        info!("Done with generating: {report}");

        Ok(report)
    }
}
