mod pooled;
mod sequential;


use crate::{
    config::{ConfigErrors, OutputConfig},
    emit::{EmitReport, Emitter},
    render::ScriptArtifact,
};

/// Strategies for handing rendered artifacts to the emitter
#[derive(Debug)]
pub enum Dispatchers {
    Sequential(sequential::SequentialDispatcher),
    Pooled(pooled::PooledDispatcher),
}

impl Dispatchers {
    pub fn load(config: &OutputConfig) -> Result<Self, ConfigErrors> {
        match config.threads {
            0 => Err(ConfigErrors::ZeroThreads),
            1 => Ok(Self::Sequential(sequential::SequentialDispatcher::load(
                config.failure_policy,
            ))),
            threads => Ok(Self::Pooled(pooled::PooledDispatcher::load(
                threads,
                config.failure_policy,
            )?)),
        }
    }

    /// emit every artifact, the report does not count rejections
    pub fn dispatch<I>(&self, artifacts: I, emitter: &Emitter) -> EmitReport
    where
        I: Iterator<Item = ScriptArtifact> + Send,
    {
        let mut report = match self {
            Self::Sequential(dispatcher) => dispatcher.dispatch(artifacts, emitter),
            Self::Pooled(dispatcher) => dispatcher.dispatch(artifacts, emitter),
        };

        report.dry_run = emitter.is_dry_run();
        report
    }
}
