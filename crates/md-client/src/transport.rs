//! The transport boundary and its reqwest implementation.

use std::sync::Arc;

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use tracing::{debug, info};

use crate::auth::AuthMode;
use crate::config::ClientConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::request::{ProgressFn, RequestBody, RequestDescriptor, UploadProgress};
use crate::response::{decode_body, error_from_status, Response, ResponseHeaders};

/// Per-call settings passed alongside the descriptor.
#[derive(Debug, Clone, Default)]
pub struct TransportSettings {
    /// Auth mode captured when the call started.
    pub auth: AuthMode,
}

/// Issues one network attempt per `send`.
///
/// Implementations resolve with the response for 2xx statuses and fail with
/// [`ErrorKind::Http`] carrying the status (and decoded body, if any)
/// otherwise. Retries and location-follow are applied by the caller.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: RequestDescriptor,
        settings: TransportSettings,
    ) -> BoxFuture<'_, Result<Response>>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(
        &self,
        request: RequestDescriptor,
        settings: TransportSettings,
    ) -> BoxFuture<'_, Result<Response>> {
        (**self).send(request, settings)
    }
}

/// Transport over a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
    config: ClientConfig,
}

impl ReqwestTransport {
    /// Create a new transport with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        Ok(Self { inner, config })
    }

    /// Create a new transport with default configuration.
    pub fn default_transport() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Get the transport configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn execute(&self, request: RequestDescriptor) -> Result<Response> {
        let mut req = self
            .inner
            .request(request.method.to_reqwest(), &request.url);

        for (name, value) in request.headers.iter() {
            req = req.header(name, value);
        }

        if !request.query.is_empty() {
            req = req.query(&request.query);
        }

        if let Some(body) = request.body {
            req = match (body, request.progress) {
                (RequestBody::Json(text), _) if request.headers.contains("content-type") => {
                    req.body(text)
                }
                (RequestBody::Json(text), _) => req
                    .header(reqwest::header::CONTENT_TYPE, "application/json")
                    .body(text),
                (RequestBody::Bytes(bytes), Some(progress)) => {
                    let total = bytes.len() as u64;
                    req.header(reqwest::header::CONTENT_LENGTH, total)
                        .body(reqwest::Body::wrap_stream(progress_stream(
                            bytes,
                            self.config.upload_chunk_size,
                            progress,
                        )))
                }
                (RequestBody::Bytes(bytes), None) => req.body(bytes),
            };
        }

        if self.config.enable_tracing {
            debug!(method = %request.method, url = %request.url, "Sending request");
        }

        let response = req.send().await?;
        let status = response.status();

        // Repeated field lines (e.g. several `Link`s) are joined, not replaced.
        let mut headers = ResponseHeaders::default();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers.append(name.as_str(), value);
            }
        }
        let bytes = response.bytes().await?;
        let body = decode_body(&bytes);

        if status.is_success() {
            if self.config.enable_tracing {
                debug!(status = status.as_u16(), content_length = bytes.len(), "Response received");
            }
            return Ok(Response::new(status.as_u16(), headers, body));
        }

        if self.config.enable_tracing {
            info!(status = status.as_u16(), content_length = bytes.len(), "Non-success response");
        }
        Err(error_from_status(
            status.as_u16(),
            status.canonical_reason(),
            body,
        ))
    }
}

impl Transport for ReqwestTransport {
    fn send(
        &self,
        request: RequestDescriptor,
        _settings: TransportSettings,
    ) -> BoxFuture<'_, Result<Response>> {
        self.execute(request).boxed()
    }
}

/// Stream `bytes` in chunks, reporting progress as each chunk is polled.
fn progress_stream(
    bytes: Bytes,
    chunk_size: usize,
    progress: ProgressFn,
) -> impl futures::Stream<Item = std::result::Result<Bytes, std::io::Error>> + Send + 'static {
    let total = bytes.len() as u64;
    let chunk_size = chunk_size.max(1);
    let chunks: Vec<Bytes> = (0..bytes.len())
        .step_by(chunk_size)
        .map(|start| bytes.slice(start..(start + chunk_size).min(bytes.len())))
        .collect();

    let mut sent = 0u64;
    futures::stream::iter(chunks).map(move |chunk| {
        sent += chunk.len() as u64;
        progress(UploadProgress { sent, total });
        Ok(chunk)
    })
}
