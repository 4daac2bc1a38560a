//! Process-wide tracer construction.
//!
//! The provider is built once at startup and shared read-only across all
//! concurrently handled requests; after span creation it holds no per-span
//! state. Pass a tracer from it explicitly to [`RequestInterceptor`] rather
//! than stashing it in a hidden global.
//!
//! [`RequestInterceptor`]: crate::interceptor::RequestInterceptor

use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::{Sampler, SdkTracerProvider};
use opentelemetry_sdk::Resource;
use thiserror::Error;

/// Failure to assemble the tracer pipeline.
#[derive(Debug, Error)]
pub enum InitError {
    /// The OTLP span exporter could not be built.
    #[error("failed to build otlp span exporter: {0}")]
    Exporter(#[from] opentelemetry_otlp::ExporterBuildError),
}

/// Builds the tracer provider for `service_name`, exporting spans over
/// OTLP/gRPC to the collector at `endpoint`.
///
/// Every span is sampled: the service relies on the interceptor's sampling
/// priority tag and the collector's own policies instead of head sampling.
pub fn init_tracer_provider(
    service_name: impl Into<String>,
    endpoint: impl Into<String>,
) -> Result<SdkTracerProvider, InitError> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint.into())
        .build()?;

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_sampler(Sampler::AlwaysOn)
        .with_resource(
            Resource::builder()
                .with_service_name(service_name.into())
                .build(),
        )
        .build())
}
