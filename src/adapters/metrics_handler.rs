use prometheus::{CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder};
use std::sync::Arc;

pub struct MetricsCollector {
    registry: Registry,

    // Query metrics
    pub queries_total: CounterVec,
    pub query_duration: Histogram,
    pub queries_in_flight: Gauge,
    pub query_errors: CounterVec,
}

impl MetricsCollector {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let queries_total = CounterVec::new(
            Opts::new("argus_queries_total", "Total number of queries handled"),
            &["outcome"],
        )?;
        registry.register(Box::new(queries_total.clone()))?;

        let query_duration = Histogram::with_opts(HistogramOpts::new(
            "argus_query_duration_seconds",
            "End-to-end query duration in seconds",
        ))?;
        registry.register(Box::new(query_duration.clone()))?;

        let queries_in_flight = Gauge::new(
            "argus_queries_in_flight",
            "Number of queries currently being processed",
        )?;
        registry.register(Box::new(queries_in_flight.clone()))?;

        let query_errors = CounterVec::new(
            Opts::new("argus_query_errors_total", "Total query errors"),
            &["kind"],
        )?;
        registry.register(Box::new(query_errors.clone()))?;

        Ok(Self {
            registry,
            queries_total,
            query_duration,
            queries_in_flight,
            query_errors,
        })
    }

    pub fn encode(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics collector")
    }
}

pub struct MetricsHandler {
    collector: Arc<MetricsCollector>,
}

impl MetricsHandler {
    pub fn new(collector: Arc<MetricsCollector>) -> Self {
        Self { collector }
    }

    pub async fn metrics(&self) -> String {
        self.collector.encode().unwrap_or_else(|e| {
            tracing::error!("Failed to encode metrics: {}", e);
            String::from("# Error encoding metrics\n")
        })
    }
}
