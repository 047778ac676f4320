use crate::domain::common::AnalysisLimits;

/// Request-scoped analysis pipeline.
///
/// The model gateway is resolved once at startup. `None` means it could not be
/// initialized; operations that have a deterministic substitute still succeed.
#[derive(Debug, Clone)]
pub struct Service<G> {
    pub(crate) gateway: Option<G>,
    pub(crate) limits: AnalysisLimits,
}

impl<G> Service<G> {
    pub fn new(gateway: Option<G>, limits: AnalysisLimits) -> Self {
        Self { gateway, limits }
    }
}
