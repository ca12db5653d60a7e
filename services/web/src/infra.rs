use attrition::prediction::ArtifactLoader;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) artifacts: Arc<ArtifactLoader>,
}

impl AppState {
    /// Ready once the listener is bound and the artifacts are cached.
    pub(crate) fn is_ready(&self) -> bool {
        self.readiness.load(Ordering::Relaxed) && self.artifacts.is_loaded()
    }
}
