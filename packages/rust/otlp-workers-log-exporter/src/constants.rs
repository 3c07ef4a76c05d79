//! Constants for the otlp-workers-log-exporter package.
//!
//! This file centralizes all constants to ensure consistency across the codebase
//! and provide a single source of truth for configuration parameters.

/// Environment variable names for configuration.
pub mod env_vars {
    /// Generic OTLP endpoint. `v1/logs` is appended to it.
    pub const OTLP_ENDPOINT: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

    /// Logs-specific OTLP endpoint (used as-is, takes precedence over OTLP_ENDPOINT).
    pub const OTLP_LOGS_ENDPOINT: &str = "OTEL_EXPORTER_OTLP_LOGS_ENDPOINT";

    /// Global headers for OTLP export.
    pub const OTLP_HEADERS: &str = "OTEL_EXPORTER_OTLP_HEADERS";

    /// Logs-specific headers (takes precedence over OTLP_HEADERS).
    pub const OTLP_LOGS_HEADERS: &str = "OTEL_EXPORTER_OTLP_LOGS_HEADERS";

    /// Global export timeout in milliseconds.
    pub const OTLP_TIMEOUT: &str = "OTEL_EXPORTER_OTLP_TIMEOUT";

    /// Logs-specific export timeout in milliseconds.
    pub const OTLP_LOGS_TIMEOUT: &str = "OTEL_EXPORTER_OTLP_LOGS_TIMEOUT";
}

/// Default values for configuration parameters.
pub mod defaults {
    /// Resource path appended to the generic OTLP endpoint.
    pub const COLLECTOR_RESOURCE_PATH: &str = "v1/logs";

    /// Default export timeout in milliseconds.
    pub const TIMEOUT_MILLIS: u64 = 10_000;

    /// Default version reported for loggers created without one.
    pub const LOGGER_VERSION: &str = "1.0.0";

    /// Headers applied before any configured or environment headers.
    pub const HEADERS: &[(&str, &str)] = &[];
}

/// HTTP header values set by the exporter.
pub mod headers {
    pub const CONTENT_TYPE_JSON: &str = "application/json";
    pub const ENCODING_GZIP: &str = "gzip";

    /// Identifying user agent sent with every export request.
    pub const USER_AGENT_VALUE: &str = concat!(
        "OTel-OTLP-Exporter-Rust-Http-Workers/",
        env!("CARGO_PKG_VERSION")
    );
}

/// Resource attribute keys set by the provider helpers.
pub mod resource_attributes {
    pub const SERVICE_NAMESPACE: &str = "service.namespace";
}
