//! An OTLP/JSON log exporter for runtimes that bring their own HTTP stack.
//!
//! Sandboxed and edge runtimes (Cloudflare Workers, Deno Deploy, Vercel Edge and
//! similar) expose a host-provided `fetch` rather than sockets. This crate lets such
//! a runtime plug its transport into the OpenTelemetry logs SDK: the exporter turns
//! log batches into OTLP `ExportLogsServiceRequest` JSON, optionally gzips it, and
//! hands the request to an injected [`opentelemetry_http::HttpClient`].
//! This crate is part of the
//! [serverless-otlp-forwarder](https://github.com/dev7a/serverless-otlp-forwarder/) project.
//!
//! # Features
//!
//! - Any `HttpClient` works as transport, including plain async closures via [`transport_fn`]
//! - Standard `OTEL_EXPORTER_OTLP_*` endpoint, header and timeout variables
//! - Callback-based [`OtlpWorkersLogExporter::send`] plus the SDK `LogExporter` trait
//! - Shutdown that drains in-flight requests through a shareable [`ExportCoordinator`]
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use bytes::Bytes;
//! use http::{Request, Response};
//! use opentelemetry_sdk::logs::SdkLoggerProvider;
//! use otlp_workers_log_exporter::{transport_fn, OtlpWorkersLogExporter};
//!
//! let transport = transport_fn(|request: Request<Bytes>| async move {
//!     // forward `request` to the host's fetch implementation here
//!     let _ = request;
//!     Ok(Response::new(Bytes::new()))
//! });
//!
//! let exporter = OtlpWorkersLogExporter::builder()
//!     .transport(Arc::new(transport))
//!     .url("https://collector.example.com/v1/logs")
//!     .build();
//!
//! let provider = SdkLoggerProvider::builder()
//!     .with_simple_exporter(exporter)
//!     .build();
//! ```
//!
//! # Environment Variables
//!
//! - `OTEL_EXPORTER_OTLP_LOGS_ENDPOINT`: full logs endpoint, used as-is
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: base endpoint, `v1/logs` is appended
//! - `OTEL_EXPORTER_OTLP_HEADERS` / `OTEL_EXPORTER_OTLP_LOGS_HEADERS`: `key=value` lists
//! - `OTEL_EXPORTER_OTLP_TIMEOUT` / `OTEL_EXPORTER_OTLP_LOGS_TIMEOUT`: milliseconds

pub mod constants;

mod config;
mod console;
mod coordinator;
mod endpoint;
mod error;
mod exporter;
mod provider;
mod transport;

#[cfg(test)]
mod test_utils;

pub use config::{parse_key_pairs, Compression, OtlpEnv};
pub use coordinator::{ExportCoordinator, InFlightGuard, InFlightRequest};
pub use endpoint::default_url;
pub use error::OtlpExporterError;
pub use exporter::OtlpWorkersLogExporter;
pub use provider::{create_logger, create_logger_provider, LoggerParams, ServiceIdentifier};
pub use transport::{transport_fn, TransportFn};
