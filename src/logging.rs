use crate::app_env::{self, AppConfig};
use anyhow::Context;
use axum::Router;
use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::{Request, Response};
use opentelemetry::trace::TracerProvider;
use opentelemetry::{KeyValue, global};
use opentelemetry_http::HeaderExtractor;
use opentelemetry_otlp::{MetricExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::Tracer;
use opentelemetry_sdk::{Resource, runtime};
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing::{Span, debug, field, info_span, warn};
use tracing_opentelemetry::{MetricsLayer, OpenTelemetryLayer, OpenTelemetrySpanExt};
use tracing_subscriber::{EnvFilter, prelude::*, registry};
use uuid::Uuid;

/// The name of the service as it should appear in OpenTelemetry collectors
const SERVICE_NAME: &str = "task-digest-api";

struct OtelExporters {
    tracer: Tracer,
    meter: SdkMeterProvider,
}

/// Opens a span per request, named by route template rather than raw path so task and category
/// ids don't fan out into separate series. Incoming W3C trace context becomes the parent.
fn request_span(request: &Request<Body>) -> Span {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map_or("unmatched", MatchedPath::as_str);
    let span = info_span!(
        "request",
        method = %request.method(),
        route,
        caller_id = field::Empty,
        status = field::Empty,
        latency_ms = field::Empty,
    );

    span.set_parent(global::get_text_map_propagator(|propagator| {
        propagator.extract(&HeaderExtractor(request.headers()))
    }));

    span
}

/// Attaches the per-request tracing layer to the given router
pub fn attach_tracing_http<T>(router: Router<T>) -> Router<T>
where
    T: Clone + Send + Sync + 'static,
{
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(request_span)
            .on_response(|response: &Response<Body>, latency: Duration, span: &Span| {
                let status = response.status();
                span.record("status", status.as_u16());
                span.record("latency_ms", latency.as_millis() as u64);
                if status.is_server_error() {
                    warn!("request failed");
                } else {
                    debug!("request complete");
                }
            }),
    )
}

/// Tags the current request span with the authenticated caller
pub fn record_caller(caller_id: Uuid) {
    Span::current().record("caller_id", field::display(caller_id));
}

/// Builds OTLP exporters for spans and metrics, sent over gRPC (typically to a collector sidecar
/// on http://localhost:4317)
fn init_exporters(
    otlp_traces_endpoint: &str,
    otlp_metrics_endpoint: &str,
) -> Result<OtelExporters, anyhow::Error> {
    let span_export = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(otlp_traces_endpoint)
        .build()
        .context("building the span exporter")?;
    let meter_export = MetricExporter::builder()
        .with_tonic()
        .with_endpoint(otlp_metrics_endpoint)
        .build()
        .context("building the metric exporter")?;
    let service = || Resource::new([KeyValue::new("service.name", SERVICE_NAME)]);

    let tracer = opentelemetry_sdk::trace::TracerProvider::builder()
        .with_batch_exporter(span_export, runtime::Tokio)
        .with_resource(service())
        .build()
        .tracer(SERVICE_NAME);
    let meter = SdkMeterProvider::builder()
        .with_reader(PeriodicReader::builder(meter_export, runtime::Tokio).build())
        .with_resource(service())
        .build();

    Ok(OtelExporters { tracer, meter })
}

/// Parses [app_env::LOG_LEVEL] style directives, falling back to "info" for anything unnamed
fn log_filter(directives: Option<&str>) -> Result<EnvFilter, anyhow::Error> {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse(directives.unwrap_or_default())
        .with_context(|| format!("{} holds an invalid filter directive", app_env::LOG_LEVEL))
}

/// Installs the global subscriber. JSON logs go to stdout through the configured filter; when
/// both OTLP endpoints are configured, everything at "debug" and above is exported as well.
pub fn init_telemetry(config: &AppConfig) -> Result<(), anyhow::Error> {
    let stdout_filter = log_filter(config.log_directives.as_deref())?;
    let (otel_traces, otel_metrics) = match &config.otel_endpoints {
        Some((traces_endpoint, metrics_endpoint)) => {
            let exporters = init_exporters(traces_endpoint, metrics_endpoint)?;
            (
                Some(OpenTelemetryLayer::new(exporters.tracer)),
                Some(MetricsLayer::new(exporters.meter)),
            )
        }
        None => (None, None),
    };

    global::set_text_map_propagator(TraceContextPropagator::new());
    registry()
        .with(LevelFilter::DEBUG)
        .with(otel_traces)
        .with(otel_metrics)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_filter(stdout_filter),
        )
        .try_init()
        .context("installing the global tracing subscriber")?;

    Ok(())
}
