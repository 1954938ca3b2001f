//! HTTP request metrics.
//!
//! The collector is registered against a `Registry` passed in by the caller;
//! there is no process-global registry. `render` produces the Prometheus text
//! exposition served on `/metrics`.

use std::time::Duration;

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder,
    register_histogram_with_registry, register_int_counter_vec_with_registry,
};

/// Response time buckets in seconds.
pub const RESPONSE_TIME_BUCKETS: &[f64] = &[0.5, 1.0, 5.0, 10.0, 30.0, 60.0];

/// One finished request, as seen by the metrics middleware.
#[derive(Debug, Clone)]
pub struct RequestObservation<'a> {
    /// Role of the resolved identity, "" when anonymous.
    pub role: &'a str,
    pub status: u16,
    pub method: &'a str,
    pub uri: &'a str,
    pub elapsed: Duration,
}

#[derive(Clone)]
pub struct HttpMetrics {
    registry: Registry,
    response_time: Histogram,
    requests_from_role: IntCounterVec,
    requests_to_uri: IntCounterVec,
    requests: IntCounterVec,
}

impl HttpMetrics {
    pub fn new(registry: Registry) -> Result<Self, prometheus::Error> {
        let response_time = register_histogram_with_registry!(
            HistogramOpts::new("response_time", "http response time.")
                .buckets(RESPONSE_TIME_BUCKETS.to_vec()),
            registry
        )?;

        let requests_from_role = register_int_counter_vec_with_registry!(
            Opts::new("total_http_requests_from_role", "http requests from role"),
            &["role"],
            registry
        )?;

        let requests_to_uri = register_int_counter_vec_with_registry!(
            Opts::new("total_http_requests_to_uri", "http requests to uri"),
            &["code", "uri", "method"],
            registry
        )?;

        let requests = register_int_counter_vec_with_registry!(
            Opts::new("total_http_requests", "http requests by code, and method"),
            &["code", "method"],
            registry
        )?;

        Ok(Self {
            registry,
            response_time,
            requests_from_role,
            requests_to_uri,
            requests,
        })
    }

    pub fn observe(&self, obs: &RequestObservation<'_>) {
        let code = obs.status.to_string();

        self.requests_from_role.with_label_values(&[obs.role]).inc();
        self.requests_to_uri
            .with_label_values(&[code.as_str(), obs.uri, obs.method])
            .inc();
        self.requests
            .with_label_values(&[code.as_str(), obs.method])
            .inc();
        self.response_time.observe(obs.elapsed.as_secs_f64());
    }

    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl std::fmt::Debug for HttpMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMetrics").finish_non_exhaustive()
    }
}
