use bytes::Bytes;
use http::{Request, Response, StatusCode};
use opentelemetry::logs::{AnyValue, LogRecord as _, Logger as _, Severity};
use opentelemetry_http::HttpClient;
use otlp_workers_log_exporter::{
    create_logger, create_logger_provider, transport_fn, LoggerParams, OtlpEnv,
    OtlpWorkersLogExporter, ServiceIdentifier,
};
use serde_json::Value;
use std::sync::{Arc, Mutex};

type Captured = Arc<Mutex<Vec<Request<Bytes>>>>;

fn capturing_transport(status: StatusCode) -> (Arc<dyn HttpClient>, Captured) {
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let sink = captured.clone();
    let transport = transport_fn(move |request: Request<Bytes>| {
        sink.lock().unwrap().push(request);
        async move { Ok(Response::builder().status(status).body(Bytes::new()).unwrap()) }
    });
    (Arc::new(transport), captured)
}

fn decode(request: &Request<Bytes>) -> Value {
    serde_json::from_slice(request.body()).unwrap()
}

#[test]
fn test_logs_flow_through_provider() {
    let (transport, captured) = capturing_transport(StatusCode::OK);
    let exporter = OtlpWorkersLogExporter::builder()
        .transport(transport)
        .env(OtlpEnv {
            endpoint: "http://collector:4318/".to_string(),
            ..Default::default()
        })
        .build();
    let coordinator = exporter.coordinator();

    let provider =
        create_logger_provider(&ServiceIdentifier::new("checkout", "shop"), exporter).unwrap();
    let logger = create_logger(
        &provider,
        &LoggerParams::builder()
            .name("orders")
            .schema_url("https://opentelemetry.io/schemas/1.21.0")
            .build(),
    );

    let mut record = logger.create_log_record();
    record.set_body(AnyValue::from("order placed".to_string()));
    record.set_severity_number(Severity::Warn);
    logger.emit(record);

    {
        let requests = captured.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].uri().to_string(),
            "http://collector:4318/v1/logs"
        );

        let body = decode(&requests[0]);
        let resource_logs = &body["resourceLogs"][0];
        let resource = resource_logs["resource"].to_string();
        assert!(resource.contains("service.name"));
        assert!(resource.contains("checkout"));
        assert!(resource.contains("service.namespace"));

        let scope_logs = &resource_logs["scopeLogs"][0];
        assert_eq!(scope_logs["scope"]["name"], "orders");
        assert_eq!(scope_logs["scope"]["version"], "1.0.0");
        assert_eq!(
            scope_logs["schemaUrl"],
            "https://opentelemetry.io/schemas/1.21.0"
        );
        let exported = &scope_logs["logRecords"][0];
        assert_eq!(exported["body"]["stringValue"], "order placed");
        assert_eq!(exported["severityNumber"], 13);
    }
    assert_eq!(coordinator.issued_count(), 1);
    assert_eq!(coordinator.in_flight_len(), 0);

    provider.shutdown().unwrap();
    assert!(coordinator.is_shutting_down());
}

#[test]
fn test_failed_export_does_not_panic() {
    let (transport, captured) = capturing_transport(StatusCode::BAD_GATEWAY);
    let exporter = OtlpWorkersLogExporter::builder()
        .transport(transport)
        .url("http://collector:4318/v1/logs")
        .errors_to_console(false)
        .env(OtlpEnv::default())
        .build();
    let coordinator = exporter.coordinator();

    let provider =
        create_logger_provider(&ServiceIdentifier::new("checkout", "shop"), exporter).unwrap();
    let logger = create_logger(&provider, &LoggerParams::builder().name("orders").build());

    let mut record = logger.create_log_record();
    record.set_body(AnyValue::from("payment declined".to_string()));
    logger.emit(record);

    assert_eq!(captured.lock().unwrap().len(), 1);
    assert_eq!(coordinator.in_flight_len(), 0);
}

#[test]
fn test_provider_not_created_without_endpoint() {
    let (transport, _) = capturing_transport(StatusCode::OK);
    let exporter = OtlpWorkersLogExporter::builder()
        .transport(transport)
        .env(OtlpEnv::default())
        .build();

    assert!(create_logger_provider(&ServiceIdentifier::new("checkout", "shop"), exporter).is_none());
}
