//! Prometheus metrics for the recipe relay.
//!
//! HTTP request metrics come from the shared middleware through the
//! `metrics` recorder; relay-specific series live in a prometheus registry.
//! Both are rendered together at `/metrics`.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::{Once, OnceLock};

static INIT: Once = Once::new();

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub static ANALYZE_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static PROVIDER_LATENCY_SECONDS: OnceLock<HistogramVec> = OnceLock::new();
pub static PROVIDER_ERRORS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static RECIPES_RETURNED_TOTAL: OnceLock<IntCounter> = OnceLock::new();

/// Initialize all metrics. Safe to call more than once; only the first call
/// installs anything.
pub fn init_metrics() {
    INIT.call_once(|| {
        // Another recorder may already be installed (e.g. by a test harness);
        // the relay series below still work without it.
        match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                let _ = METRICS_HANDLE.set(handle);
            }
            Err(e) => tracing::warn!(error = %e, "Prometheus recorder not installed"),
        }

        let registry = Registry::new();

        let analyze_requests = IntCounterVec::new(
            Opts::new(
                "flavorlens_analyze_requests_total",
                "Total analyze requests by outcome",
            ),
            &["outcome"],
        )
        .expect("Failed to create flavorlens_analyze_requests_total metric");

        let provider_latency = HistogramVec::new(
            HistogramOpts::new(
                "flavorlens_provider_latency_seconds",
                "Upstream completion latency in seconds",
            )
            .buckets(vec![0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0]),
            &["provider", "model"],
        )
        .expect("Failed to create flavorlens_provider_latency_seconds metric");

        let provider_errors = IntCounterVec::new(
            Opts::new(
                "flavorlens_provider_errors_total",
                "Total upstream completion errors",
            ),
            &["provider", "error_type"],
        )
        .expect("Failed to create flavorlens_provider_errors_total metric");

        let recipes_returned = IntCounter::new(
            "flavorlens_recipes_returned_total",
            "Total recipes returned to clients",
        )
        .expect("Failed to create flavorlens_recipes_returned_total metric");

        registry
            .register(Box::new(analyze_requests.clone()))
            .expect("Failed to register flavorlens_analyze_requests_total");
        registry
            .register(Box::new(provider_latency.clone()))
            .expect("Failed to register flavorlens_provider_latency_seconds");
        registry
            .register(Box::new(provider_errors.clone()))
            .expect("Failed to register flavorlens_provider_errors_total");
        registry
            .register(Box::new(recipes_returned.clone()))
            .expect("Failed to register flavorlens_recipes_returned_total");

        let _ = REGISTRY.set(registry);
        let _ = ANALYZE_REQUESTS_TOTAL.set(analyze_requests);
        let _ = PROVIDER_LATENCY_SECONDS.set(provider_latency);
        let _ = PROVIDER_ERRORS_TOTAL.set(provider_errors);
        let _ = RECIPES_RETURNED_TOTAL.set(recipes_returned);

        tracing::info!("Prometheus metrics initialized");
    });
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let mut output = METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_default();

    let registry = match REGISTRY.get() {
        Some(r) => r,
        None => {
            tracing::error!("Metrics registry not initialized");
            output.push_str("# Metrics registry not initialized\n");
            return output;
        }
    };

    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&registry.gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        output.push_str(&format!("# Failed to encode metrics: {}\n", e));
        return output;
    }

    match String::from_utf8(buffer) {
        Ok(s) => output.push_str(&s),
        Err(e) => {
            tracing::error!(error = %e, "Failed to convert metrics to UTF-8");
            output.push_str(&format!("# Failed to convert metrics to UTF-8: {}\n", e));
        }
    }

    output
}

/// Record the outcome of one analyze request.
pub fn record_analyze_outcome(outcome: &str) {
    if let Some(counter) = ANALYZE_REQUESTS_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}

/// Record upstream latency for one model attempt.
pub fn record_provider_latency(provider: &str, model: &str, duration_secs: f64) {
    if let Some(histogram) = PROVIDER_LATENCY_SECONDS.get() {
        histogram
            .with_label_values(&[provider, model])
            .observe(duration_secs);
    }
}

/// Record an upstream error.
pub fn record_provider_error(provider: &str, error_type: &str) {
    if let Some(counter) = PROVIDER_ERRORS_TOTAL.get() {
        counter.with_label_values(&[provider, error_type]).inc();
    }
}

pub fn record_recipes_returned(count: usize) {
    if let Some(counter) = RECIPES_RETURNED_TOTAL.get() {
        counter.inc_by(count as u64);
    }
}
