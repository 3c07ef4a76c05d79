//! Exporter configuration sourced from the standard OTLP environment variables.
//!
//! The environment is read once into an [`OtlpEnv`] snapshot when the exporter is
//! built. Nothing watches the variables afterwards, and tests can hand the
//! exporter a snapshot directly instead of mutating the process environment.
//!
//! Header variables use the `key=value,key2=value2` format. Values may be
//! percent-encoded:
//!
//! ```bash
//! OTEL_EXPORTER_OTLP_HEADERS="authorization=Bearer%20abc,x-team=backend"
//! ```

use crate::constants::{defaults, env_vars, headers as header_names};
use http::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use urlencoding::decode;

/// Compression applied to the serialized export request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Gzip the body and send `Content-Encoding: gzip`
    Gzip,
    /// Send the JSON body as-is
    #[default]
    None,
}

/// Snapshot of the OTLP environment variables the exporter consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtlpEnv {
    /// `OTEL_EXPORTER_OTLP_ENDPOINT`
    pub endpoint: String,
    /// `OTEL_EXPORTER_OTLP_LOGS_ENDPOINT`
    pub logs_endpoint: String,
    /// `OTEL_EXPORTER_OTLP_HEADERS`
    pub headers: String,
    /// `OTEL_EXPORTER_OTLP_LOGS_HEADERS`
    pub logs_headers: String,
    /// `OTEL_EXPORTER_OTLP_TIMEOUT`
    pub timeout: Option<Duration>,
    /// `OTEL_EXPORTER_OTLP_LOGS_TIMEOUT`
    pub logs_timeout: Option<Duration>,
}

impl OtlpEnv {
    /// Reads the OTLP variables from the process environment.
    ///
    /// Unset variables become empty strings, and timeouts that are not a whole
    /// number of milliseconds are ignored.
    pub fn from_env() -> Self {
        let var = |name: &str| env::var(name).unwrap_or_default();
        let millis = |name: &str| {
            env::var(name)
                .ok()
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_millis)
        };

        Self {
            endpoint: var(env_vars::OTLP_ENDPOINT),
            logs_endpoint: var(env_vars::OTLP_LOGS_ENDPOINT),
            headers: var(env_vars::OTLP_HEADERS),
            logs_headers: var(env_vars::OTLP_LOGS_HEADERS),
            timeout: millis(env_vars::OTLP_TIMEOUT),
            logs_timeout: millis(env_vars::OTLP_LOGS_TIMEOUT),
        }
    }

    /// Export timeout: logs-specific, then generic, then the built-in default.
    pub fn export_timeout(&self) -> Duration {
        self.logs_timeout
            .or(self.timeout)
            .unwrap_or(Duration::from_millis(defaults::TIMEOUT_MILLIS))
    }
}

/// Parses a `key=value,key2=value2` list into ordered pairs.
///
/// Keys and values are trimmed and percent-decoded. Anything after a `;` in an
/// entry is treated as property metadata and dropped, as are entries without a
/// key.
pub fn parse_key_pairs(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .filter_map(|entry| {
            let pair = entry.split(';').next()?;
            let (key, value) = pair.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            match (decode(key), decode(value.trim())) {
                (Ok(key), Ok(value)) => Some((key.into_owned(), value.into_owned())),
                _ => {
                    tracing::warn!("Skipping header entry that is not valid UTF-8 after decoding: {pair}");
                    None
                }
            }
        })
        .collect()
}

/// Merges header layers from lowest to highest precedence:
/// defaults, global env headers, user agent, logs env headers, configured headers.
pub(crate) fn merge_headers(
    defaults: &[(&str, &str)],
    configured: &HashMap<String, String>,
    env: &OtlpEnv,
) -> HeaderMap {
    let mut merged = HeaderMap::new();

    let defaults = defaults.iter().map(|(k, v)| (k.to_string(), v.to_string()));
    let global = parse_key_pairs(&env.headers);
    let user_agent = [(
        USER_AGENT.as_str().to_string(),
        header_names::USER_AGENT_VALUE.to_string(),
    )];
    let logs = parse_key_pairs(&env.logs_headers);
    let configured = configured.iter().map(|(k, v)| (k.clone(), v.clone()));

    let layers = defaults
        .chain(global)
        .chain(user_agent)
        .chain(logs)
        .chain(configured);

    for (name, value) in layers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            (Ok(name), Ok(value)) => {
                merged.insert(name, value);
            }
            _ => tracing::warn!("Skipping invalid export header: {name}"),
        }
    }

    merged
}
