//! The injected HTTP transport.
//!
//! The exporter never constructs a network client of its own. The embedding
//! host supplies one as an [`HttpClient`], which is the same seam the OTLP
//! ecosystem uses for pluggable clients. Hosts that only expose a request
//! function (a `fetch` binding, a sandbox bridge, a test stub) can wrap it with
//! [`transport_fn`].
//!
//! ```
//! use bytes::Bytes;
//! use http::Response;
//! use otlp_workers_log_exporter::transport_fn;
//!
//! let transport = transport_fn(|request: http::Request<Bytes>| async move {
//!     // hand the request to the host here
//!     let _ = request;
//!     Ok(Response::new(Bytes::new()))
//! });
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response};
use opentelemetry_http::{HttpClient, HttpError};
use std::fmt::{self, Debug};
use std::future::Future;
use std::marker::PhantomData;

/// An [`HttpClient`] backed by an async request function.
pub struct TransportFn<F, Fut> {
    handler: F,
    _response: PhantomData<fn() -> Fut>,
}

/// Wraps an async request function into a transport the exporter can use.
pub fn transport_fn<F, Fut>(handler: F) -> TransportFn<F, Fut>
where
    F: Fn(Request<Bytes>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response<Bytes>, HttpError>> + Send,
{
    TransportFn {
        handler,
        _response: PhantomData,
    }
}

impl<F, Fut> Debug for TransportFn<F, Fut> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportFn")
            .field("handler", &format_args!("<function>"))
            .finish()
    }
}

#[async_trait]
impl<F, Fut> HttpClient for TransportFn<F, Fut>
where
    F: Fn(Request<Bytes>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response<Bytes>, HttpError>> + Send,
{
    async fn send_bytes(&self, request: Request<Bytes>) -> Result<Response<Bytes>, HttpError> {
        (self.handler)(request).await
    }
}
