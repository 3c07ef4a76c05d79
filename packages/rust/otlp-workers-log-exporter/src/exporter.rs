//! The OTLP/JSON log exporter.
//!
//! [`OtlpWorkersLogExporter`] converts a batch of log records into an
//! `ExportLogsServiceRequest` and POSTs it as JSON through the injected
//! transport. It reports the outcome of each send exactly once.
//!
//! # Send lifecycle
//!
//! 1. If shutdown has started, the batch is dropped with a debug diagnostic and
//!    no outcome is reported.
//! 2. The batch is grouped by resource and scope and serialized to JSON, then
//!    gzip-compressed when [`Compression::Gzip`] is configured.
//! 3. The request is issued through the transport and registered with the
//!    [`ExportCoordinator`] before it is awaited.
//! 4. A 2xx status is a success. Any other status, or a transport error, is a
//!    failure. The in-flight entry is removed either way.

use crate::config::{merge_headers, Compression, OtlpEnv};
use crate::console::{ConsoleOutput, StderrOutput};
use crate::constants::{defaults, headers as header_values};
use crate::coordinator::ExportCoordinator;
use crate::endpoint::default_url;
use crate::error::OtlpExporterError;
use bon::bon;
use bytes::Bytes;
use flate2::{write::GzEncoder, Compression as GzipLevel};
use http::header::{HeaderMap, HeaderValue, CONTENT_ENCODING, CONTENT_TYPE};
use http::{Method, Request};
use opentelemetry::logs::LogRecord as _;
use opentelemetry_http::HttpClient;
use opentelemetry_proto::tonic::collector::logs::v1::ExportLogsServiceRequest;
use opentelemetry_proto::tonic::common::v1::InstrumentationScope as ProtoScope;
use opentelemetry_proto::tonic::logs::v1::{LogRecord as ProtoLogRecord, ResourceLogs, ScopeLogs};
use opentelemetry_proto::tonic::resource::v1::Resource as ProtoResource;
use opentelemetry_proto::transform::common::tonic::ResourceAttributesWithSchema;
use opentelemetry_sdk::error::{OTelSdkError, OTelSdkResult};
use opentelemetry_sdk::logs::{LogBatch, LogExporter, SdkLogRecord};
use opentelemetry_sdk::Resource;
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// A log exporter that sends OTLP/JSON through a host-supplied HTTP transport.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use bytes::Bytes;
/// use http::Response;
/// use otlp_workers_log_exporter::{transport_fn, OtlpWorkersLogExporter};
///
/// let exporter = OtlpWorkersLogExporter::builder()
///     .transport(Arc::new(transport_fn(|_request: http::Request<Bytes>| async {
///         Ok(Response::new(Bytes::new()))
///     })))
///     .url("https://collector.example.com/v1/logs")
///     .build();
/// ```
#[derive(Debug)]
pub struct OtlpWorkersLogExporter {
    transport: Arc<dyn HttpClient>,
    url: String,
    headers: HeaderMap,
    compression: Compression,
    timeout: Duration,
    errors_to_console: bool,
    coordinator: Arc<ExportCoordinator>,
    /// Resource attached to every exported batch
    resource: Option<Resource>,
    console: Arc<dyn ConsoleOutput>,
}

#[bon]
impl OtlpWorkersLogExporter {
    /// Creates a new exporter.
    ///
    /// Only `transport` is required. The URL, headers and timeout fall back to
    /// the OTLP environment variables captured in `env`, which defaults to a
    /// snapshot of the process environment. An injected `coordinator` is
    /// shared as-is, so several exporters can drain through one.
    #[builder]
    pub fn new(
        transport: Arc<dyn HttpClient>,
        #[builder(into)] url: Option<String>,
        headers: Option<HashMap<String, String>>,
        compression: Option<Compression>,
        timeout: Option<Duration>,
        errors_to_console: Option<bool>,
        metadata: Option<HashMap<String, String>>,
        env: Option<OtlpEnv>,
        coordinator: Option<Arc<ExportCoordinator>>,
    ) -> Self {
        let env = env.unwrap_or_else(OtlpEnv::from_env);

        if metadata.is_some() {
            tracing::warn!("Metadata cannot be set when using http");
        }

        let exporter = Self {
            transport,
            url: default_url(url.as_deref(), &env),
            headers: merge_headers(defaults::HEADERS, &headers.unwrap_or_default(), &env),
            compression: compression.unwrap_or_default(),
            timeout: timeout.unwrap_or_else(|| env.export_timeout()),
            errors_to_console: errors_to_console.unwrap_or(true),
            coordinator: coordinator.unwrap_or_default(),
            resource: None,
            console: Arc::new(StderrOutput),
        };
        exporter.on_init();
        exporter
    }
}

impl OtlpWorkersLogExporter {
    /// The resolved export URL. Empty when no endpoint could be resolved.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Merged configuration headers sent with every request.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Maximum time [`OtlpWorkersLogExporter::force_flush`] waits for in-flight requests.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The coordinator tracking shutdown and in-flight requests.
    pub fn coordinator(&self) -> Arc<ExportCoordinator> {
        self.coordinator.clone()
    }

    /// Exports `batch` and reports the outcome through exactly one of the
    /// continuations.
    ///
    /// Once shutdown has started neither continuation is invoked.
    pub async fn send<S, E>(&self, batch: LogBatch<'_>, on_success: S, on_error: E)
    where
        S: FnOnce(),
        E: FnOnce(OtlpExporterError),
    {
        match self.dispatch(batch).await {
            Some(Ok(())) => on_success(),
            Some(Err(err)) => on_error(err),
            None => {}
        }
    }

    /// Converts a batch into the OTLP export request, grouped by resource and scope.
    ///
    /// Records are grouped by their target when they carry one, otherwise by
    /// instrumentation scope, in order of first appearance. Scopes keep their
    /// version, attributes and schema URL. Records without an observed
    /// timestamp are stamped with the conversion time.
    ///
    /// Identifiers serialize as hex strings and 64-bit integers use the plain
    /// proto3 JSON form.
    pub fn convert(&self, batch: LogBatch<'_>) -> ExportLogsServiceRequest {
        let resource = self
            .resource
            .clone()
            .unwrap_or_else(|| Resource::builder_empty().build());
        let resource_attrs = ResourceAttributesWithSchema::from(&resource);
        let observed_at = SystemTime::now();

        let mut scope_logs: Vec<ScopeLogs> = Vec::new();
        let mut positions: HashMap<Cow<'static, str>, usize> = HashMap::new();
        for (record, scope) in batch.iter() {
            let target = record.target().cloned();
            let key = target
                .clone()
                .unwrap_or_else(|| Cow::Owned(scope.name().to_owned()));
            let position = *positions.entry(key).or_insert_with(|| {
                scope_logs.push(ScopeLogs {
                    scope: Some(ProtoScope::from((scope, target))),
                    schema_url: scope.schema_url().unwrap_or_default().to_owned(),
                    log_records: Vec::new(),
                });
                scope_logs.len() - 1
            });
            scope_logs[position]
                .log_records
                .push(to_proto_record(record, observed_at));
        }

        ExportLogsServiceRequest {
            resource_logs: vec![ResourceLogs {
                resource: Some(ProtoResource {
                    attributes: resource_attrs.attributes.0.clone(),
                    ..Default::default()
                }),
                scope_logs,
                schema_url: resource_attrs.schema_url.clone().unwrap_or_default(),
            }],
        }
    }

    /// Waits up to the configured timeout for in-flight requests to settle.
    pub fn force_flush(&self) -> OTelSdkResult {
        if self.coordinator.wait_idle(self.timeout) {
            Ok(())
        } else {
            Err(OTelSdkError::Timeout(self.timeout))
        }
    }

    /// Starts shutdown and waits up to `timeout` for in-flight requests to drain.
    ///
    /// Requests issued before shutdown run to completion; new batches are dropped.
    pub fn shutdown_with_timeout(&self, timeout: Duration) -> OTelSdkResult {
        if !self.coordinator.begin_shutdown() {
            return Err(OTelSdkError::AlreadyShutdown);
        }
        self.on_shutdown();

        if self.coordinator.wait_idle(timeout) {
            Ok(())
        } else {
            Err(OTelSdkError::Timeout(timeout))
        }
    }

    /// Runs the send lifecycle. `None` means the batch was dropped because
    /// shutdown has started.
    async fn dispatch(&self, batch: LogBatch<'_>) -> Option<Result<(), OtlpExporterError>> {
        if self.coordinator.is_shutting_down() {
            tracing::debug!("Shutdown already started. Cannot send objects");
            return None;
        }

        let service_request = self.convert(batch);
        let result = match self.build_request(&service_request) {
            Ok(request) => self.transmit(request).await,
            Err(err) => Err(err),
        };

        if let Err(err) = &result {
            if self.errors_to_console {
                self.console
                    .write_line(&format!("Could not send OTLP logs: {}", err));
            }
        }
        Some(result)
    }

    async fn transmit(&self, request: Request<Bytes>) -> Result<(), OtlpExporterError> {
        let pending = self.transport.send_bytes(request);
        let _in_flight = self.coordinator.track();

        let response = pending.await.map_err(OtlpExporterError::Transport)?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(OtlpExporterError::from_status(response.status()))
        }
    }

    fn build_request(
        &self,
        service_request: &ExportLogsServiceRequest,
    ) -> Result<Request<Bytes>, OtlpExporterError> {
        if self.url.is_empty() {
            return Err(OtlpExporterError::MissingEndpoint);
        }

        let json = serde_json::to_vec(service_request)?;
        let body = match self.compression {
            Compression::Gzip => Bytes::from(gzip(&json)?),
            Compression::None => Bytes::from(json),
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static(header_values::CONTENT_TYPE_JSON),
        );
        // configured headers may override the content type
        headers.extend(self.headers.clone());
        if self.compression == Compression::Gzip {
            headers.insert(
                CONTENT_ENCODING,
                HeaderValue::from_static(header_values::ENCODING_GZIP),
            );
        }

        let mut request = Request::builder()
            .method(Method::POST)
            .uri(self.url.as_str())
            .body(body)?;
        *request.headers_mut() = headers;
        Ok(request)
    }

    fn on_init(&self) {
        tracing::debug!(
            url = %self.url,
            compression = ?self.compression,
            "OTLP workers log exporter initialized"
        );
    }

    fn on_shutdown(&self) {
        tracing::debug!("OTLP workers log exporter shutting down");
    }

    #[cfg(test)]
    fn with_console(mut self, console: Arc<dyn ConsoleOutput>) -> Self {
        self.console = console;
        self
    }
}

fn to_proto_record(
    record: &SdkLogRecord,
    observed_at: SystemTime,
) -> ProtoLogRecord {
    if record.observed_timestamp().is_some() {
        return ProtoLogRecord::from(record);
    }
    let mut stamped = record.clone();
    stamped.set_observed_timestamp(observed_at);
    ProtoLogRecord::from(&stamped)
}

fn gzip(payload: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), GzipLevel::default());
    encoder.write_all(payload)?;
    encoder.finish()
}

impl LogExporter for OtlpWorkersLogExporter {
    async fn export(&self, batch: LogBatch<'_>) -> OTelSdkResult {
        match self.dispatch(batch).await {
            Some(Ok(())) => Ok(()),
            Some(Err(err)) => Err(OTelSdkError::InternalFailure(err.to_string())),
            None => Err(OTelSdkError::AlreadyShutdown),
        }
    }

    /// Starts shutdown and waits up to the configured timeout for in-flight
    /// requests to drain.
    fn shutdown(&self) -> OTelSdkResult {
        self.shutdown_with_timeout(self.timeout)
    }

    fn set_resource(&mut self, resource: &Resource) {
        self.resource = Some(resource.clone());
    }
}
