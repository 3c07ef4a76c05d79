//! Helpers for wiring the exporter into an OpenTelemetry logger provider.
//!
//! ```no_run
//! use std::sync::Arc;
//! use bytes::Bytes;
//! use http::Response;
//! use otlp_workers_log_exporter::{
//!     create_logger, create_logger_provider, transport_fn, LoggerParams, OtlpWorkersLogExporter,
//!     ServiceIdentifier,
//! };
//!
//! let exporter = OtlpWorkersLogExporter::builder()
//!     .transport(Arc::new(transport_fn(|_request: http::Request<Bytes>| async {
//!         Ok(Response::new(Bytes::new()))
//!     })))
//!     .url("https://collector.example.com/v1/logs")
//!     .build();
//!
//! let service = ServiceIdentifier::new("checkout", "shop");
//! if let Some(provider) = create_logger_provider(&service, exporter) {
//!     let _logger = create_logger(&provider, &LoggerParams::builder().name("orders").build());
//! }
//! ```

use crate::constants::{defaults, resource_attributes};
use crate::exporter::OtlpWorkersLogExporter;
use bon::Builder;
use opentelemetry::logs::LoggerProvider as _;
use opentelemetry::{InstrumentationScope, KeyValue};
use opentelemetry_sdk::logs::{SdkLogger, SdkLoggerProvider};
use opentelemetry_sdk::Resource;

/// Identifies the service emitting logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceIdentifier {
    /// Reported as `service.name`
    pub name: String,
    /// Reported as `service.namespace`
    pub namespace: String,
}

impl ServiceIdentifier {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    fn to_resource(&self) -> Resource {
        Resource::builder()
            .with_service_name(self.name.clone())
            .with_attributes([KeyValue::new(
                resource_attributes::SERVICE_NAMESPACE,
                self.namespace.clone(),
            )])
            .build()
    }
}

/// Instrumentation scope of a logger created with [`create_logger`].
#[derive(Builder, Debug, Clone)]
pub struct LoggerParams {
    #[builder(into)]
    pub name: String,

    #[builder(into, default = defaults::LOGGER_VERSION.to_string())]
    pub version: String,

    #[builder(into)]
    pub schema_url: Option<String>,
}

/// Builds a logger provider that exports through `exporter` with a simple
/// (per-record) processor.
///
/// Returns `None` when the exporter has no endpoint to send to.
pub fn create_logger_provider(
    service: &ServiceIdentifier,
    exporter: OtlpWorkersLogExporter,
) -> Option<SdkLoggerProvider> {
    if exporter.url().is_empty() {
        tracing::error!(
            service = %service.name,
            "Failed to create logger provider: no OTLP logs endpoint configured"
        );
        return None;
    }

    let provider = SdkLoggerProvider::builder()
        .with_resource(service.to_resource())
        .with_simple_exporter(exporter)
        .build();
    Some(provider)
}

/// Returns a logger from `provider` scoped to `params`.
pub fn create_logger(provider: &SdkLoggerProvider, params: &LoggerParams) -> SdkLogger {
    let mut scope = InstrumentationScope::builder(params.name.clone())
        .with_version(params.version.clone());
    if let Some(schema_url) = &params.schema_url {
        scope = scope.with_schema_url(schema_url.clone());
    }
    provider.logger_with_scope(scope.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OtlpEnv;
    use crate::test_utils::capture_logs;
    use crate::transport::transport_fn;
    use bytes::Bytes;
    use http::{Request, Response};
    use opentelemetry::Key;
    use std::sync::Arc;

    fn exporter(url: Option<&str>) -> OtlpWorkersLogExporter {
        let transport = transport_fn(|_request: Request<Bytes>| async {
            Ok(Response::new(Bytes::new()))
        });
        OtlpWorkersLogExporter::builder()
            .transport(Arc::new(transport))
            .maybe_url(url.map(str::to_string))
            .env(OtlpEnv::default())
            .build()
    }

    #[test]
    fn test_service_resource() {
        let resource = ServiceIdentifier::new("checkout", "shop").to_resource();

        assert_eq!(
            resource.get(&Key::new("service.name")),
            Some("checkout".into())
        );
        assert_eq!(
            resource.get(&Key::new(resource_attributes::SERVICE_NAMESPACE)),
            Some("shop".into())
        );
    }

    #[test]
    fn test_provider_requires_endpoint() {
        let service = ServiceIdentifier::new("checkout", "shop");

        let (provider, logs) = capture_logs(|| create_logger_provider(&service, exporter(None)));

        assert!(provider.is_none());
        assert!(logs.contains("ERROR"));
        assert!(logs.contains("Failed to create logger provider"));
    }

    #[test]
    fn test_provider_created() {
        let service = ServiceIdentifier::new("checkout", "shop");

        let provider = create_logger_provider(&service, exporter(Some("http://collector/v1/logs")));

        assert!(provider.is_some());
    }

    #[test]
    fn test_logger_params_defaults() {
        let params = LoggerParams::builder().name("orders").build();

        assert_eq!(params.name, "orders");
        assert_eq!(params.version, "1.0.0");
        assert_eq!(params.schema_url, None);
    }

    #[test]
    fn test_logger_params_overrides() {
        let params = LoggerParams::builder()
            .name("orders")
            .version("2.1.0")
            .schema_url("https://opentelemetry.io/schemas/1.21.0")
            .build();

        assert_eq!(params.version, "2.1.0");
        assert_eq!(
            params.schema_url.as_deref(),
            Some("https://opentelemetry.io/schemas/1.21.0")
        );
    }
}
