//! Export URL resolution.

use crate::config::OtlpEnv;
use crate::constants::defaults::COLLECTOR_RESOURCE_PATH;
use url::Url;

/// Resolves the logs export URL.
///
/// The first match wins:
/// 1. an explicit URL, used verbatim
/// 2. a non-empty `OTEL_EXPORTER_OTLP_LOGS_ENDPOINT`, normalized to carry a root path
/// 3. a non-empty `OTEL_EXPORTER_OTLP_ENDPOINT` with `v1/logs` appended
///
/// Otherwise an error is logged and an empty string is returned. Callers must
/// treat an empty URL as a configuration failure.
pub fn default_url(explicit: Option<&str>, env: &OtlpEnv) -> String {
    let url = match explicit {
        Some(url) => url.to_string(),
        None if !env.logs_endpoint.is_empty() => {
            normalize_endpoint(&env.logs_endpoint)
        }
        None if !env.endpoint.is_empty() => {
            join_resource_path(&env.endpoint, COLLECTOR_RESOURCE_PATH)
        }
        None => String::new(),
    };

    if url.is_empty() {
        tracing::error!("Failed to get default url");
    }
    url
}

fn normalize_endpoint(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed.to_string(),
        Err(err) => {
            tracing::warn!("Could not parse export URL '{url}': {err}");
            url.to_string()
        }
    }
}

fn join_resource_path(url: &str, path: &str) -> String {
    if url.ends_with('/') {
        format!("{url}{path}")
    } else {
        format!("{url}/{path}")
    }
}
