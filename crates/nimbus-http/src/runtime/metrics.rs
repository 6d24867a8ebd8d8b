//! Prometheus metrics
//!
//! Each runtime owns its own [`Registry`], so several routers can coexist in
//! one process.

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::{sync::Arc, time::Duration};

const NAMESPACE: &str = "nimbus";

/// Latency buckets for prediction timing, in seconds.
const PREDICTION_BUCKETS: &[f64] = &[
    0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Prediction and request counters for the diagnosis service.
#[derive(Debug)]
pub struct RuntimeMetrics {
    registry: Registry,
    predictions_total: IntCounterVec,        // outcome
    prediction_duration_seconds: HistogramVec, // endpoint
    http_requests_total: IntCounterVec,      // route, method, status
}

impl RuntimeMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let predictions_total = IntCounterVec::new(
            Opts::new(
                "predictions_total",
                "Total number of predictions by outcome",
            )
            .namespace(NAMESPACE),
            &["outcome"],
        )?;
        let prediction_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "prediction_duration_seconds",
                "Time spent encoding, evaluating and ranking a prediction",
            )
            .namespace(NAMESPACE)
            .buckets(PREDICTION_BUCKETS.to_vec()),
            &["endpoint"],
        )?;
        let http_requests_total = IntCounterVec::new(
            Opts::new(
                "http_requests_total",
                "Total number of HTTP requests by route, method and status",
            )
            .namespace(NAMESPACE),
            &["route", "method", "status"],
        )?;

        registry.register(Box::new(predictions_total.clone()))?;
        registry.register(Box::new(prediction_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_total.clone()))?;

        Ok(Self {
            registry,
            predictions_total,
            prediction_duration_seconds,
            http_requests_total,
        })
    }

    /// Count one prediction attempt and how long it took.
    pub fn record_prediction(&self, endpoint: &str, outcome: &str, duration: Duration) {
        self.predictions_total.with_label_values(&[outcome]).inc();
        self.prediction_duration_seconds
            .with_label_values(&[endpoint])
            .observe(duration.as_secs_f64());
    }

    pub fn record_http_request(&self, route: &str, method: &str, status: u16) {
        let status = status.to_string();
        self.http_requests_total
            .with_label_values(&[route, method, status.as_str()])
            .inc();
    }

    /// Render all metrics in the Prometheus text format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Middleware counting every response by matched route, method and status.
pub async fn track_requests(
    State(metrics): State<Arc<RuntimeMetrics>>,
    request: Request,
    next: Next,
) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_string(), |path| path.as_str().to_string());
    let method = request.method().clone();

    let response = next.run(request).await;

    metrics.record_http_request(&route, method.as_str(), response.status().as_u16());
    response
}
