use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

pub struct MetricsCollector {
    registry: Registry,

    // Request metrics
    pub requests_total: CounterVec,
    pub request_duration: HistogramVec,

    // Upstream metrics
    pub upstream_requests_total: CounterVec,

    // Schema metrics
    pub schema_reloads_total: CounterVec,
}

impl MetricsCollector {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let requests_total = CounterVec::new(
            Opts::new("fakeql_requests_total", "Total number of GraphQL requests"),
            &["mode", "outcome"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "fakeql_request_duration_seconds",
                "GraphQL request duration in seconds",
            ),
            &["mode"],
        )?;
        registry.register(Box::new(request_duration.clone()))?;

        let upstream_requests_total = CounterVec::new(
            Opts::new(
                "fakeql_upstream_requests_total",
                "Total number of queries forwarded upstream",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(upstream_requests_total.clone()))?;

        let schema_reloads_total = CounterVec::new(
            Opts::new("fakeql_schema_reloads_total", "Total schema rebuilds after an SDL change"),
            &["outcome"],
        )?;
        registry.register(Box::new(schema_reloads_total.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            request_duration,
            upstream_requests_total,
            schema_reloads_total,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collector_creation() {
        let collector = MetricsCollector::new();
        assert!(collector.is_ok());
    }

    #[test]
    fn test_metrics_encoding() {
        let collector = MetricsCollector::new().unwrap();

        collector
            .requests_total
            .with_label_values(&["mock", "success"])
            .inc();
        collector
            .schema_reloads_total
            .with_label_values(&["failure"])
            .inc();

        let metrics_text = collector.encode().unwrap();
        assert!(metrics_text.contains("fakeql_requests_total"));
        assert!(metrics_text.contains(r#"fakeql_schema_reloads_total{outcome="failure"} 1"#));
    }

    #[tokio::test]
    async fn test_metrics_handler() {
        let collector = Arc::new(MetricsCollector::new().unwrap());
        let handler = MetricsHandler::new(collector.clone());

        collector
            .upstream_requests_total
            .with_label_values(&["success"])
            .inc();

        let metrics = handler.metrics().await;
        assert!(metrics.contains("fakeql_upstream_requests_total"));
    }
}
