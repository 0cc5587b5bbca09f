//! Prometheus metrics exposed at `/metrics`. The pipeline crate has no
//! metrics dependency of its own, so the server records job-level counters
//! and timings around each `run_job` call instead of threading a recorder
//! through the orchestrator.

use std::time::Duration;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder")
}

pub fn record_job_enqueued() {
    metrics::counter!("farsub_jobs_enqueued_total").increment(1);
}

pub fn record_job_succeeded(duration: Duration) {
    metrics::counter!("farsub_jobs_succeeded_total").increment(1);
    metrics::histogram!("farsub_job_duration_seconds").record(duration.as_secs_f64());
}

pub fn record_job_failed(duration: Duration) {
    metrics::counter!("farsub_jobs_failed_total").increment(1);
    metrics::histogram!("farsub_job_duration_seconds").record(duration.as_secs_f64());
}
