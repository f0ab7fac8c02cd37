use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use locstat::{set_pipeline_metrics, ExtractError, PipelineConfig, PipelineError, PipelineMetrics};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Shared application state
///
/// Read-only apart from the metrics counters; requests never share workspaces.
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Pipeline configuration derived from `config`
    pub pipeline: Arc<PipelineConfig>,

    /// Pipeline stage counters
    pub metrics: Arc<RequestMetrics>,
}

impl ServerState {
    /// Create new server state
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let pipeline = config.pipeline_config();
        pipeline
            .validate()
            .map_err(|err| ServerError::Config(err.to_string()))?;

        Ok(Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            metrics: Arc::new(RequestMetrics::default()),
        })
    }

    /// Route pipeline observations into this state's counters.
    ///
    /// The recorder is process-wide, so only one state should install it.
    pub fn install_metrics(&self) {
        let recorder: Arc<dyn PipelineMetrics> = self.metrics.clone();
        set_pipeline_metrics(Some(recorder));
    }
}

/// Per-stage outcome counters fed by the pipeline metrics hook.
#[derive(Debug, Default)]
pub struct RequestMetrics {
    extract_ok: AtomicU64,
    extract_failed: AtomicU64,
    extract_micros: AtomicU64,
    scan_ok: AtomicU64,
    scan_client_errors: AtomicU64,
    scan_internal_faults: AtomicU64,
    count_ok: AtomicU64,
    count_client_errors: AtomicU64,
    count_internal_faults: AtomicU64,
    request_micros: AtomicU64,
}

/// Point-in-time view of [`RequestMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub extract_ok: u64,
    pub extract_failed: u64,
    pub extract_micros_total: u64,
    pub scan_ok: u64,
    pub scan_client_errors: u64,
    pub scan_internal_faults: u64,
    pub count_ok: u64,
    pub count_client_errors: u64,
    pub count_internal_faults: u64,
    pub request_micros_total: u64,
}

impl RequestMetrics {
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            extract_ok: self.extract_ok.load(Ordering::Relaxed),
            extract_failed: self.extract_failed.load(Ordering::Relaxed),
            extract_micros_total: self.extract_micros.load(Ordering::Relaxed),
            scan_ok: self.scan_ok.load(Ordering::Relaxed),
            scan_client_errors: self.scan_client_errors.load(Ordering::Relaxed),
            scan_internal_faults: self.scan_internal_faults.load(Ordering::Relaxed),
            count_ok: self.count_ok.load(Ordering::Relaxed),
            count_client_errors: self.count_client_errors.load(Ordering::Relaxed),
            count_internal_faults: self.count_internal_faults.load(Ordering::Relaxed),
            request_micros_total: self.request_micros.load(Ordering::Relaxed),
        }
    }

    fn add_latency(counter: &AtomicU64, latency: Duration) {
        let micros = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX);
        counter.fetch_add(micros, Ordering::Relaxed);
    }

    fn bump_outcome(
        ok: &AtomicU64,
        client: &AtomicU64,
        internal: &AtomicU64,
        result: &Result<(), PipelineError>,
    ) {
        let counter = match result {
            Ok(()) => ok,
            Err(err) if err.is_client_error() => client,
            Err(_) => internal,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

impl PipelineMetrics for RequestMetrics {
    fn record_extract(&self, latency: Duration, result: Result<(), ExtractError>) {
        Self::add_latency(&self.extract_micros, latency);
        let counter = if result.is_ok() {
            &self.extract_ok
        } else {
            &self.extract_failed
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn record_scan(&self, latency: Duration, result: Result<(), PipelineError>) {
        Self::add_latency(&self.request_micros, latency);
        Self::bump_outcome(
            &self.scan_ok,
            &self.scan_client_errors,
            &self.scan_internal_faults,
            &result,
        );
    }

    fn record_count(&self, latency: Duration, result: Result<(), PipelineError>) {
        Self::add_latency(&self.request_micros, latency);
        Self::bump_outcome(
            &self.count_ok,
            &self.count_client_errors,
            &self.count_internal_faults,
            &result,
        );
    }
}
