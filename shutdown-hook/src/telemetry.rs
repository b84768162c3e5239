//! `OpenTelemetry` export of shutdown spans and metrics.
//!
//! Only available with the `telemetry` feature. When any
//! `OTEL_EXPORTER_OTLP_*` variable is set, the `shutdown` span and the
//! `shutdown_duration_ms` histogram recorded by the hook are exported via
//! OTLP; otherwise only console logging is installed.

use std::env;
use std::time::Duration;

use opentelemetry::trace::TracerProvider;
use opentelemetry::{KeyValue, Value, global};
use opentelemetry_sdk::{
    Resource,
    metrics::{MeterProviderBuilder, PeriodicReader, SdkMeterProvider},
    trace::{RandomIdGenerator, Sampler, SdkTracerProvider},
};
use opentelemetry_semantic_conventions::{SCHEMA_URL, attribute::SERVICE_VERSION};
use tracing_opentelemetry::{MetricsLayer, OpenTelemetryLayer};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Supported OTLP transport protocols.
#[derive(Debug, Clone, Copy)]
enum OtlpProtocol {
    Http,
    Grpc,
}

impl OtlpProtocol {
    /// Returns `None` if OTLP export is not configured.
    fn from_env() -> Option<Self> {
        let configured = ["OTEL_EXPORTER_OTLP_ENDPOINT", "OTEL_EXPORTER_OTLP_HEADERS", "OTEL_EXPORTER_OTLP_PROTOCOL"]
            .iter()
            .any(|key| env::var(key).is_ok());
        configured.then(|| match env::var("OTEL_EXPORTER_OTLP_PROTOCOL").as_deref() {
            Ok("grpc") => Self::Grpc,
            _ => Self::Http,
        })
    }
}

/// Service identity and log filter for the process.
///
/// `OTEL_SERVICE_NAME` / `OTEL_SERVICE_VERSION` override the programmatic
/// values; `RUST_LOG` overrides the log level.
#[derive(Debug, Default)]
pub struct Telemetry {
    name: Option<String>,
    version: Option<String>,
    log_level: Option<String>,
}

impl Telemetry {
    /// Creates a new, empty [`Telemetry`] instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the service name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the service version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the log filter used when `RUST_LOG` is not set.
    #[must_use]
    pub fn with_log_level(mut self, level: Option<String>) -> Self {
        self.log_level = level;
        self
    }

    fn resource(&self) -> Resource {
        let resolve = |key: &str, fallback: Option<&String>| {
            env::var(key)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .or_else(|| fallback.cloned())
        };

        let mut builder = Resource::builder();
        if let Some(name) = resolve("OTEL_SERVICE_NAME", self.name.as_ref()) {
            builder = builder.with_service_name(name);
        }
        if let Some(version) = resolve("OTEL_SERVICE_VERSION", self.version.as_ref()) {
            builder = builder
                .with_schema_url([KeyValue::new(SERVICE_VERSION, Value::from(version))], SCHEMA_URL);
        }
        builder.build()
    }

    fn tracer_provider(&self, protocol: OtlpProtocol) -> Option<SdkTracerProvider> {
        let exporter = match protocol {
            OtlpProtocol::Http => opentelemetry_otlp::SpanExporter::builder().with_http().build(),
            OtlpProtocol::Grpc => opentelemetry_otlp::SpanExporter::builder().with_tonic().build(),
        }
        .ok()?;

        Some(
            SdkTracerProvider::builder()
                .with_sampler(Sampler::AlwaysOn)
                .with_id_generator(RandomIdGenerator::default())
                .with_resource(self.resource())
                .with_batch_exporter(exporter)
                .build(),
        )
    }

    fn meter_provider(&self, protocol: OtlpProtocol) -> Option<SdkMeterProvider> {
        let exporter = match protocol {
            OtlpProtocol::Http => opentelemetry_otlp::MetricExporter::builder().with_http().build(),
            OtlpProtocol::Grpc => opentelemetry_otlp::MetricExporter::builder().with_tonic().build(),
        }
        .ok()?;

        // A pass is short-lived; the guard's shutdown flushes the final reading.
        let reader = PeriodicReader::builder(exporter)
            .with_interval(Duration::from_secs(5))
            .build();
        let provider = MeterProviderBuilder::default()
            .with_resource(self.resource())
            .with_reader(reader)
            .build();
        global::set_meter_provider(provider.clone());
        Some(provider)
    }

    /// Installs the global `tracing` subscriber and OTLP exporters.
    ///
    /// Returns a [`TelemetryGuard`] that flushes exporters on drop.
    pub fn register(self) -> TelemetryGuard {
        let protocol = OtlpProtocol::from_env();
        let (tracer_provider, meter_provider) = protocol.map_or((None, None), |p| {
            (self.tracer_provider(p), self.meter_provider(p))
        });

        let otel_layer = tracer_provider
            .as_ref()
            .map(|tp| OpenTelemetryLayer::new(tp.tracer("shutdown-hook")));
        let metrics_layer = meter_provider
            .as_ref()
            .map(|mp| MetricsLayer::new(mp.clone()));

        let fallback = self.log_level.as_deref().unwrap_or("info");
        tracing_subscriber::registry()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(metrics_layer)
            .with(otel_layer)
            .init();

        if protocol.is_some() {
            tracing::debug!("OpenTelemetry exporters registered");
        }

        TelemetryGuard {
            tracer_provider,
            meter_provider,
        }
    }
}

/// Owns the tracer and meter providers; flushes them on drop.
#[derive(Debug)]
pub struct TelemetryGuard {
    tracer_provider: Option<SdkTracerProvider>,
    meter_provider: Option<SdkMeterProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(ref tp) = self.tracer_provider
            && let Err(err) = tp.shutdown()
        {
            tracing::error!(?err, "tracer provider shutdown error");
        }
        if let Some(ref mp) = self.meter_provider
            && let Err(err) = mp.shutdown()
        {
            tracing::error!(?err, "meter provider shutdown error");
        }
    }
}
