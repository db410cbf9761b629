//! Request functions built from endpoint descriptors.
//!
//! A [`RequestFactory`] turns an [`Endpoint`] into one of four callables:
//!
//! - [`QueryFn`]: GET with optional query parameters
//! - [`PayloadFn`]: POST/PATCH/PUT with a JSON body, optionally following
//!   the returned `Location`
//! - [`FileFn`]: binary upload
//! - [`PageFn`]: GET of a stored `next`/`previous`/`last` link, with a
//!   single retry on gateway timeout
//!
//! Each call happens in two steps. `prepare*` builds the request descriptor
//! and fails before any network attempt on argument errors;
//! [`PreparedCall::send`] runs it. The `call*` methods do both.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::ClientConfig;
use crate::context::{ClientContext, Settings};
use crate::endpoint::Endpoint;
use crate::error::{Error, ErrorKind, Result};
use crate::headers::{upload_headers, HeaderRules};
use crate::pagination::{Pagination, Rel};
use crate::request::{FileUpload, ProgressFn, RequestDescriptor, RequestMethod};
use crate::response::{Body, Raw, Response, ResponseFilter};
use crate::retry::{RetryConfig, RetryPolicy};
use crate::transport::{ReqwestTransport, Transport, TransportSettings};

/// Builds request functions that share one settings context and transport.
#[derive(Clone)]
pub struct RequestFactory {
    context: ClientContext,
    transport: Arc<dyn Transport>,
    page_retry: RetryConfig,
}

impl std::fmt::Debug for RequestFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestFactory")
            .field("context", &self.context)
            .field("page_retry", &self.page_retry)
            .finish_non_exhaustive()
    }
}

impl RequestFactory {
    pub fn new(context: ClientContext, transport: Arc<dyn Transport>) -> Self {
        Self {
            context,
            transport,
            page_retry: RetryConfig::page_follow(),
        }
    }

    /// Create a factory backed by a [`ReqwestTransport`].
    pub fn with_config(context: ClientContext, config: ClientConfig) -> Result<Self> {
        let page_retry = config.page_retry.clone();
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::new(context, Arc::new(transport)).with_page_retry(page_retry))
    }

    /// Override the retry budget of page-follow calls.
    pub fn with_page_retry(mut self, retry: RetryConfig) -> Self {
        self.page_retry = retry;
        self
    }

    pub fn context(&self) -> &ClientContext {
        &self.context
    }

    /// A GET function passing its trailing argument as query parameters.
    pub fn query(&self, endpoint: Endpoint, pagination: &Pagination) -> Result<QueryFn> {
        Ok(QueryFn {
            inner: self.bind(endpoint, pagination)?,
            _filter: PhantomData,
        })
    }

    /// A function sending its trailing argument as a JSON body.
    pub fn payload(&self, endpoint: Endpoint, pagination: &Pagination) -> Result<PayloadFn> {
        Ok(PayloadFn {
            inner: self.bind(endpoint, pagination)?,
            _filter: PhantomData,
        })
    }

    /// A function uploading a file as the raw request body.
    pub fn file(&self, endpoint: Endpoint, pagination: &Pagination) -> Result<FileFn> {
        Ok(FileFn {
            inner: self.bind(endpoint, pagination)?,
            _filter: PhantomData,
        })
    }

    /// A function following the stored `rel` link of `pagination`.
    pub fn page(&self, rel: Rel, headers: HeaderRules, pagination: &Pagination) -> PageFn {
        PageFn {
            rel,
            headers,
            factory: self.clone(),
            pagination: pagination.clone(),
            _filter: PhantomData,
        }
    }

    fn bind(&self, endpoint: Endpoint, pagination: &Pagination) -> Result<Bound> {
        endpoint.validate()?;
        Ok(Bound {
            factory: self.clone(),
            endpoint: Arc::new(endpoint),
            pagination: pagination.clone(),
        })
    }

    fn prepared<F: ResponseFilter>(
        &self,
        request: RequestDescriptor,
        settings: Settings,
        retry: RetryConfig,
        follow_location: bool,
        pagination: &Pagination,
    ) -> PreparedCall<F> {
        PreparedCall {
            request,
            settings,
            retry,
            follow_location,
            transport: self.transport.clone(),
            pagination: pagination.clone(),
            _filter: PhantomData,
        }
    }
}

/// The endpoint, factory and pagination handle shared by a request function.
#[derive(Clone)]
struct Bound {
    factory: RequestFactory,
    endpoint: Arc<Endpoint>,
    pagination: Pagination,
}

impl Bound {
    /// Snapshot the settings and start a descriptor for `vars`.
    fn start(&self, vars: &[&str], payload: Option<&Value>) -> Result<(Settings, RequestDescriptor)> {
        let path = self.endpoint.path(vars)?;
        let settings = self.factory.context.snapshot();
        let request = RequestDescriptor::new(
            self.endpoint.method(),
            format!("{}{}", settings.base_url, path),
        )
        .headers(self.endpoint.header_rules().compose(payload));
        Ok((settings, request))
    }

    fn finish<F: ResponseFilter>(
        &self,
        settings: Settings,
        request: RequestDescriptor,
    ) -> PreparedCall<F> {
        let request = authorize(request, &settings);
        self.factory.prepared(
            request,
            settings,
            RetryConfig::no_retry(),
            self.endpoint.follows_location(),
            &self.pagination,
        )
    }
}

fn authorize(mut request: RequestDescriptor, settings: &Settings) -> RequestDescriptor {
    if let Some(value) = settings.auth.authorization() {
        request.headers.insert("Authorization", value);
    }
    request
}

macro_rules! filter_conversions {
    ($name:ident) => {
        impl<F: ResponseFilter> $name<F> {
            /// Resolve with the full response instead of the body.
            pub fn raw(self) -> $name<Raw> {
                self.with_filter()
            }

            /// Switch to another response filter.
            pub fn with_filter<G: ResponseFilter>(self) -> $name<G> {
                $name {
                    inner: self.inner,
                    _filter: PhantomData,
                }
            }

            pub fn endpoint(&self) -> &Endpoint {
                &self.inner.endpoint
            }

            pub fn pagination(&self) -> &Pagination {
                &self.inner.pagination
            }
        }

        impl<F> Clone for $name<F> {
            fn clone(&self) -> Self {
                Self {
                    inner: self.inner.clone(),
                    _filter: PhantomData,
                }
            }
        }

        impl<F> std::fmt::Debug for $name<F> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("endpoint", &self.inner.endpoint)
                    .finish_non_exhaustive()
            }
        }
    };
}

/// GET request function with optional query parameters.
pub struct QueryFn<F = Body> {
    inner: Bound,
    _filter: PhantomData<fn() -> F>,
}

filter_conversions!(QueryFn);

impl<F: ResponseFilter> QueryFn<F> {
    pub fn prepare(&self, vars: &[&str]) -> Result<PreparedCall<F>> {
        let (settings, request) = self.inner.start(vars, None)?;
        Ok(self.inner.finish(settings, request))
    }

    pub fn prepare_with<Q: Serialize + ?Sized>(
        &self,
        vars: &[&str],
        params: &Q,
    ) -> Result<PreparedCall<F>> {
        let (settings, request) = self.inner.start(vars, None)?;
        let request = request.query(params)?;
        Ok(self.inner.finish(settings, request))
    }

    pub async fn call(&self, vars: &[&str]) -> Result<F::Output> {
        self.prepare(vars)?.send().await
    }

    pub async fn call_with<Q: Serialize + ?Sized>(
        &self,
        vars: &[&str],
        params: &Q,
    ) -> Result<F::Output> {
        self.prepare_with(vars, params)?.send().await
    }
}

/// Request function sending a JSON body.
pub struct PayloadFn<F = Body> {
    inner: Bound,
    _filter: PhantomData<fn() -> F>,
}

filter_conversions!(PayloadFn);

impl<F: ResponseFilter> PayloadFn<F> {
    pub fn prepare<B: Serialize + ?Sized>(
        &self,
        vars: &[&str],
        body: &B,
    ) -> Result<PreparedCall<F>> {
        let payload = serde_json::to_value(body)?;
        let (settings, request) = self.inner.start(vars, Some(&payload))?;
        let request = request.json(body)?;
        Ok(self.inner.finish(settings, request))
    }

    /// Prepare a call that sends no body at all.
    pub fn prepare_empty(&self, vars: &[&str]) -> Result<PreparedCall<F>> {
        let (settings, request) = self.inner.start(vars, None)?;
        Ok(self.inner.finish(settings, request))
    }

    pub async fn call<B: Serialize + ?Sized>(&self, vars: &[&str], body: &B) -> Result<F::Output> {
        self.prepare(vars, body)?.send().await
    }

    pub async fn call_empty(&self, vars: &[&str]) -> Result<F::Output> {
        self.prepare_empty(vars)?.send().await
    }
}

/// Request function uploading a file.
pub struct FileFn<F = Body> {
    inner: Bound,
    _filter: PhantomData<fn() -> F>,
}

filter_conversions!(FileFn);

impl<F: ResponseFilter> FileFn<F> {
    /// Build the upload of `file`, linked to `link_id` when the endpoint
    /// declares a link type.
    pub fn prepare(
        &self,
        file: &FileUpload,
        link_id: Option<&str>,
        progress: Option<ProgressFn>,
    ) -> Result<PreparedCall<F>> {
        let (settings, mut request) = self.inner.start(&[], None)?;

        let link = self
            .inner
            .endpoint
            .upload_link_type()
            .zip(link_id);
        let mut headers = upload_headers(file, link, &settings.base_url);
        headers.merge(request.headers);
        request.headers = headers;

        let request = request.bytes(file.bytes.clone()).progress(progress);
        Ok(self.inner.finish(settings, request))
    }

    pub async fn call(
        &self,
        file: &FileUpload,
        link_id: Option<&str>,
        progress: Option<ProgressFn>,
    ) -> Result<F::Output> {
        self.prepare(file, link_id, progress)?.send().await
    }
}

/// Request function following a stored pagination link.
pub struct PageFn<F = Body> {
    rel: Rel,
    headers: HeaderRules,
    factory: RequestFactory,
    pagination: Pagination,
    _filter: PhantomData<fn() -> F>,
}

impl<F: ResponseFilter> PageFn<F> {
    pub fn rel(&self) -> Rel {
        self.rel
    }

    pub fn raw(self) -> PageFn<Raw> {
        PageFn {
            rel: self.rel,
            headers: self.headers,
            factory: self.factory,
            pagination: self.pagination,
            _filter: PhantomData,
        }
    }

    /// Fails with [`ErrorKind::NoPaginationLink`] when no link is stored.
    pub fn prepare(&self) -> Result<PreparedCall<F>> {
        let url = self
            .pagination
            .link(self.rel)
            .ok_or_else(|| Error::new(ErrorKind::NoPaginationLink(self.rel.to_string())))?;

        let settings = self.factory.context.snapshot();
        let request = RequestDescriptor::new(RequestMethod::Get, url)
            .headers(self.headers.compose(None));
        let request = authorize(request, &settings);

        Ok(self.factory.prepared(
            request,
            settings,
            self.factory.page_retry.clone(),
            false,
            &self.pagination,
        ))
    }

    pub async fn call(&self) -> Result<F::Output> {
        self.prepare()?.send().await
    }
}

impl<F> Clone for PageFn<F> {
    fn clone(&self) -> Self {
        Self {
            rel: self.rel,
            headers: self.headers.clone(),
            factory: self.factory.clone(),
            pagination: self.pagination.clone(),
            _filter: PhantomData,
        }
    }
}

impl<F> std::fmt::Debug for PageFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageFn")
            .field("rel", &self.rel)
            .finish_non_exhaustive()
    }
}

/// A built request, ready to send.
pub struct PreparedCall<F = Body> {
    request: RequestDescriptor,
    settings: Settings,
    retry: RetryConfig,
    follow_location: bool,
    transport: Arc<dyn Transport>,
    pagination: Pagination,
    _filter: PhantomData<fn() -> F>,
}

impl<F> std::fmt::Debug for PreparedCall<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedCall")
            .field("request", &self.request)
            .field("retry", &self.retry)
            .field("follow_location", &self.follow_location)
            .finish_non_exhaustive()
    }
}

impl<F: ResponseFilter> PreparedCall<F> {
    /// The descriptor that will be sent.
    pub fn request(&self) -> &RequestDescriptor {
        &self.request
    }

    /// Send the request, apply the retry and location-follow policy, update
    /// the pagination state and filter the response.
    #[instrument(
        name = "mendeley.request",
        skip(self),
        fields(method = %self.request.method, url = %self.request.url)
    )]
    pub async fn send(self) -> Result<F::Output> {
        let transport_settings = TransportSettings {
            auth: self.settings.auth.clone(),
        };

        let mut response =
            send_with_retry(&*self.transport, &self.request, &transport_settings, self.retry).await?;

        if self.follow_location {
            if let Some(location) = response.headers.location() {
                let url = resolve_location(&self.settings.base_url, location)?;
                debug!(status = response.status, location = %url, "Following location");
                let follow = authorize(RequestDescriptor::new(RequestMethod::Get, url), &self.settings);
                response = self
                    .transport
                    .send(follow, transport_settings)
                    .await
                    .map_err(Error::into_redirect_failure)?;
            }
        }

        self.pagination.update(&response.headers);
        F::apply(response)
    }
}

async fn send_with_retry(
    transport: &dyn Transport,
    request: &RequestDescriptor,
    settings: &TransportSettings,
    retry: RetryConfig,
) -> Result<Response> {
    let mut policy = RetryPolicy::new(retry);
    loop {
        match transport.send(request.clone(), settings.clone()).await {
            Ok(response) => return Ok(response),
            Err(err) => {
                let Some(delay) = policy.next_delay(&err) else {
                    return Err(err);
                };
                warn!(
                    retry = policy.retries(),
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Request failed, retrying"
                );
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

/// Absolute URL for a `Location` value, resolved against the base URL as an
/// RFC 3986 reference.
fn resolve_location(base_url: &str, location: &str) -> Result<String> {
    Ok(url::Url::parse(base_url)?.join(location)?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    use futures::future::BoxFuture;
    use futures::FutureExt;
    use serde_json::json;

    use crate::auth::AuthMode;
    use crate::response::{error_from_status, ResponseHeaders};

    #[test]
    fn test_resolve_location() {
        assert_eq!(
            resolve_location("https://api.mendeley.com", "https://api.mendeley.com/documents/123")
                .unwrap(),
            "https://api.mendeley.com/documents/123"
        );
        assert_eq!(
            resolve_location("https://api.mendeley.com", "/documents/123").unwrap(),
            "https://api.mendeley.com/documents/123"
        );
        assert_eq!(
            resolve_location("http://127.0.0.1:8080/v1", "/documents/123").unwrap(),
            "http://127.0.0.1:8080/documents/123"
        );
        assert_eq!(
            resolve_location("http://127.0.0.1:8080/v1/", "documents/123").unwrap(),
            "http://127.0.0.1:8080/v1/documents/123"
        );
    }

    const BASE: &str = "https://api.mendeley.com";

    /// Replays scripted outcomes and records every request it sees.
    #[derive(Default)]
    struct StubTransport {
        script: Mutex<VecDeque<Result<Response>>>,
        seen: Mutex<Vec<RequestDescriptor>>,
        echo: bool,
    }

    impl StubTransport {
        fn scripted(outcomes: Vec<Result<Response>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(outcomes.into()),
                ..Default::default()
            })
        }

        fn echoing() -> Arc<Self> {
            Arc::new(Self {
                echo: true,
                ..Default::default()
            })
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }

        fn request(&self, index: usize) -> RequestDescriptor {
            self.seen.lock().unwrap()[index].clone()
        }
    }

    impl Transport for StubTransport {
        fn send(
            &self,
            request: RequestDescriptor,
            _settings: TransportSettings,
        ) -> BoxFuture<'_, Result<Response>> {
            let outcome = if self.echo {
                let body = match &request.body {
                    Some(crate::request::RequestBody::Json(text)) => {
                        serde_json::from_str(text).unwrap()
                    }
                    _ => Value::Null,
                };
                Ok(Response::new(200, ResponseHeaders::new(), body))
            } else {
                self.script
                    .lock()
                    .unwrap()
                    .pop_front()
                    .unwrap_or_else(|| Err(error_from_status(500, None, Value::Null)))
            };
            self.seen.lock().unwrap().push(request);
            async move { outcome }.boxed()
        }
    }

    fn ok(body: Value) -> Result<Response> {
        Ok(Response::new(200, ResponseHeaders::new(), body))
    }

    fn ok_with(headers: &[(&str, &str)], body: Value) -> Result<Response> {
        Ok(Response::new(200, headers.iter().copied().collect(), body))
    }

    fn status(code: u16) -> Result<Response> {
        Err(error_from_status(code, None, Value::Null))
    }

    fn paged_headers() -> Vec<(&'static str, &'static str)> {
        vec![
            ("Mendeley-Count", "155"),
            (
                "Link",
                "<https://api.mendeley.com/documents/?marker=n>; rel=\"next\", \
                 <https://api.mendeley.com/documents/?marker=p>; rel=\"previous\", \
                 <https://api.mendeley.com/documents/?marker=l>; rel=\"last\"",
            ),
        ]
    }

    fn factory(transport: Arc<StubTransport>) -> RequestFactory {
        let settings = Settings::new(BASE, AuthMode::bearer("auth")).unwrap();
        RequestFactory::new(ClientContext::new(settings), transport)
            .with_page_retry(RetryConfig::page_follow().with_initial_delay(Duration::ZERO))
    }

    #[tokio::test]
    async fn test_search_sends_query_without_content_type() {
        let transport = StubTransport::scripted(vec![ok(json!([{"title": "found"}]))]);
        let pagination = Pagination::new();
        let search = factory(transport.clone())
            .query(Endpoint::get("/catalog"), &pagination)
            .unwrap();

        let body = search
            .call_with(&[], &[("filehash", "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d")])
            .await
            .unwrap();

        assert_eq!(body, json!([{"title": "found"}]));
        let request = transport.request(0);
        assert_eq!(request.method, RequestMethod::Get);
        assert_eq!(request.url, "https://api.mendeley.com/catalog");
        assert_eq!(
            request.query_param("filehash"),
            Some("aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d")
        );
        assert!(!request.headers.contains("content-type"));
        assert_eq!(request.headers.get("authorization"), Some("Bearer auth"));
        assert!(request.body.is_none());
    }

    #[tokio::test]
    async fn test_path_variables_are_expanded() {
        let transport = StubTransport::scripted(vec![ok(json!({"id": "abc"}))]);
        let pagination = Pagination::new();
        let retrieve = factory(transport.clone())
            .query(Endpoint::get("/documents/{id}").vars(&["id"]), &pagination)
            .unwrap();

        retrieve.call(&["abc"]).await.unwrap();
        assert_eq!(transport.request(0).url, "https://api.mendeley.com/documents/abc");
    }

    #[tokio::test]
    async fn test_missing_variable_fails_before_any_call() {
        let transport = StubTransport::scripted(vec![]);
        let pagination = Pagination::new();
        let retrieve = factory(transport.clone())
            .query(Endpoint::get("/documents/{id}").vars(&["id"]), &pagination)
            .unwrap();

        let err = retrieve.prepare(&[]).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MissingTemplateVariable(ref v) if v == "id"));
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn test_malformed_endpoint_rejected_at_construction() {
        let transport = StubTransport::scripted(vec![]);
        let err = factory(transport)
            .query(Endpoint::get("/documents/{id}"), &Pagination::new())
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MalformedEndpoint { .. }));
    }

    #[tokio::test]
    async fn test_create_then_fetch_follows_location() {
        let transport = StubTransport::scripted(vec![
            Ok(Response::new(
                201,
                [("Location", "https://api.mendeley.com/documents/123")]
                    .into_iter()
                    .collect(),
                Value::Null,
            )),
            ok(json!({"id": "15", "title": "foo"})),
        ]);
        let pagination = Pagination::new();
        let create = factory(transport.clone())
            .payload(
                Endpoint::post("/documents")
                    .header("Content-Type", "application/vnd.mendeley-document.1+json")
                    .follow_location(),
                &pagination,
            )
            .unwrap();

        let body = create.call(&[], &json!({"title": "foo"})).await.unwrap();

        assert_eq!(body, json!({"id": "15", "title": "foo"}));
        assert_eq!(transport.calls(), 2);

        let post = transport.request(0);
        assert_eq!(post.method, RequestMethod::Post);
        assert_eq!(post.url, "https://api.mendeley.com/documents");
        assert!(matches!(
            post.body,
            Some(crate::request::RequestBody::Json(ref text)) if text == r#"{"title":"foo"}"#
        ));

        let get = transport.request(1);
        assert_eq!(get.method, RequestMethod::Get);
        assert_eq!(get.url, "https://api.mendeley.com/documents/123");
        assert_eq!(get.headers.get("authorization"), Some("Bearer auth"));
    }

    #[tokio::test]
    async fn test_redirect_failure_rejects_operation() {
        let transport = StubTransport::scripted(vec![
            Ok(Response::new(
                201,
                [("Location", "/documents/123")].into_iter().collect(),
                Value::Null,
            )),
            status(404),
        ]);
        let pagination = Pagination::new();
        let create = factory(transport.clone())
            .payload(Endpoint::post("/documents").follow_location(), &pagination)
            .unwrap();

        let err = create.call(&[], &json!({"title": "foo"})).await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::RedirectFollow { status: 404, .. }));
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_create_is_not_retried() {
        let transport = StubTransport::scripted(vec![status(500), ok(json!({}))]);
        let pagination = Pagination::new();
        let create = factory(transport.clone())
            .payload(Endpoint::post("/documents").follow_location(), &pagination)
            .unwrap();

        let err = create.call(&[], &json!({"title": "foo"})).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_plain_calls_do_not_retry_gateway_timeout() {
        let transport = StubTransport::scripted(vec![status(504), ok(json!([]))]);
        let pagination = Pagination::new();
        let list = factory(transport.clone())
            .query(Endpoint::get("/documents/"), &pagination)
            .unwrap();

        let err = list.call(&[]).await.unwrap_err();
        assert_eq!(err.status(), Some(504));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_payload_derived_header() {
        let transport = StubTransport::scripted(vec![ok(json!({}))]);
        let pagination = Pagination::new();
        let update = factory(transport.clone())
            .payload(
                Endpoint::patch("/documents/{id}")
                    .vars(&["id"])
                    .derived_header("X-Title", |payload| {
                        payload
                            .and_then(|p| p["title"].as_str())
                            .unwrap_or_default()
                            .to_string()
                    }),
                &pagination,
            )
            .unwrap();

        update.call(&["abc"], &json!({"title": "bar"})).await.unwrap();
        let request = transport.request(0);
        assert_eq!(request.method, RequestMethod::Patch);
        assert_eq!(request.headers.get("x-title"), Some("bar"));
    }

    #[tokio::test]
    async fn test_payload_round_trip() {
        let transport = StubTransport::echoing();
        let pagination = Pagination::new();
        let create = factory(transport)
            .payload(Endpoint::post("/folders"), &pagination)
            .unwrap();

        let payload = json!({"name": "papers", "tags": ["a", "b"], "nested": {"n": 1}});
        let body = create.call(&[], &payload).await.unwrap();
        assert_eq!(body, payload);
    }

    #[tokio::test]
    async fn test_empty_payload_sends_no_body() {
        let transport = StubTransport::scripted(vec![Ok(Response::new(
            204,
            ResponseHeaders::new(),
            Value::Null,
        ))]);
        let pagination = Pagination::new();
        let trash = factory(transport.clone())
            .payload(Endpoint::post("/documents/{id}/trash").vars(&["id"]), &pagination)
            .unwrap();

        let body = trash.call_empty(&["abc"]).await.unwrap();
        assert_eq!(body, Value::Null);
        assert!(transport.request(0).body.is_none());
    }

    #[tokio::test]
    async fn test_pagination_cursor_update() {
        let transport = StubTransport::scripted(vec![
            ok_with(&paged_headers(), json!([])),
            ok(json!({"id": "1"})),
        ]);
        let pagination = Pagination::new();
        let factory = factory(transport);
        let list = factory
            .query(Endpoint::get("/documents/"), &pagination)
            .unwrap();
        let retrieve = factory
            .query(Endpoint::get("/documents/{id}").vars(&["id"]), &pagination)
            .unwrap();

        list.call_with(&[], &[("limit", "50")]).await.unwrap();
        assert_eq!(pagination.count(), 155);
        assert_eq!(
            pagination.link(Rel::Next).as_deref(),
            Some("https://api.mendeley.com/documents/?marker=n")
        );
        assert_eq!(
            pagination.link(Rel::Previous).as_deref(),
            Some("https://api.mendeley.com/documents/?marker=p")
        );
        assert_eq!(
            pagination.link(Rel::Last).as_deref(),
            Some("https://api.mendeley.com/documents/?marker=l")
        );

        retrieve.call(&["1"]).await.unwrap();
        assert_eq!(pagination.count(), 155);
        assert!(pagination.link(Rel::Next).is_some());
    }

    #[tokio::test]
    async fn test_payload_without_link_leaves_cursor() {
        let transport = StubTransport::scripted(vec![
            ok_with(&paged_headers(), json!([])),
            ok(json!({"id": "new"})),
            Ok(Response::new(204, ResponseHeaders::new(), Value::Null)),
        ]);
        let pagination = Pagination::new();
        let factory = factory(transport);
        let list = factory
            .query(Endpoint::get("/documents/"), &pagination)
            .unwrap();
        let create = factory
            .payload(Endpoint::post("/documents"), &pagination)
            .unwrap();
        let trash = factory
            .payload(Endpoint::post("/documents/{id}/trash").vars(&["id"]), &pagination)
            .unwrap();

        list.call(&[]).await.unwrap();
        let listed = pagination.snapshot();

        create.call(&[], &json!({"title": "t"})).await.unwrap();
        trash.call_empty(&["new"]).await.unwrap();
        assert_eq!(pagination.snapshot(), listed);
    }

    #[tokio::test]
    async fn test_query_is_idempotent_on_pagination() {
        let transport = StubTransport::scripted(vec![
            ok_with(&paged_headers(), json!([])),
            ok_with(&paged_headers(), json!([])),
        ]);
        let pagination = Pagination::new();
        let list = factory(transport)
            .query(Endpoint::get("/documents/"), &pagination)
            .unwrap();

        list.call(&[]).await.unwrap();
        let first = pagination.snapshot();
        list.call(&[]).await.unwrap();
        assert_eq!(pagination.snapshot(), first);
    }

    #[tokio::test]
    async fn test_missing_pagination_link_issues_no_call() {
        let transport = StubTransport::scripted(vec![]);
        let pagination = Pagination::new();
        let previous = factory(transport.clone()).page(Rel::Previous, HeaderRules::new(), &pagination);

        let err = previous.call().await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::NoPaginationLink(ref rel) if rel == "previous"));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_page_follow_retries_once_on_gateway_timeout() {
        let transport = StubTransport::scripted(vec![
            ok_with(&paged_headers(), json!([])),
            status(504),
            ok(json!([{"id": "51"}])),
        ]);
        let pagination = Pagination::new();
        let factory = factory(transport.clone());
        let list = factory
            .query(Endpoint::get("/documents/"), &pagination)
            .unwrap();
        let next = factory.page(Rel::Next, HeaderRules::new(), &pagination);

        list.call(&[]).await.unwrap();
        let body = next.call().await.unwrap();

        assert_eq!(body, json!([{"id": "51"}]));
        assert_eq!(transport.calls(), 3);
        assert_eq!(
            transport.request(1).url,
            "https://api.mendeley.com/documents/?marker=n"
        );
        assert_eq!(transport.request(2).url, transport.request(1).url);
    }

    #[tokio::test]
    async fn test_page_follow_rejects_after_two_gateway_timeouts() {
        let transport = StubTransport::scripted(vec![
            ok_with(&paged_headers(), json!([])),
            status(504),
            status(504),
            ok(json!([])),
        ]);
        let pagination = Pagination::new();
        let factory = factory(transport.clone());
        let list = factory
            .query(Endpoint::get("/documents/"), &pagination)
            .unwrap();
        let next = factory.page(Rel::Next, HeaderRules::new(), &pagination);

        list.call(&[]).await.unwrap();
        let err = next.call().await.unwrap_err();

        assert_eq!(err.status(), Some(504));
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_page_follow_does_not_retry_other_statuses() {
        let transport = StubTransport::scripted(vec![
            ok_with(&paged_headers(), json!([])),
            status(503),
            ok(json!([])),
        ]);
        let pagination = Pagination::new();
        let factory = factory(transport.clone());
        factory
            .query(Endpoint::get("/documents/"), &pagination)
            .unwrap()
            .call(&[])
            .await
            .unwrap();

        let err = factory
            .page(Rel::Last, HeaderRules::new(), &pagination)
            .call()
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_raw_filter_returns_full_response() {
        let transport = StubTransport::scripted(vec![ok_with(
            &[("Mendeley-Count", "3")],
            json!([1, 2, 3]),
        )]);
        let pagination = Pagination::new();
        let list = factory(transport)
            .query(Endpoint::get("/groups"), &pagination)
            .unwrap()
            .raw();

        let response = list.call(&[]).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.headers.count(), Some(3));
        assert_eq!(response.body, json!([1, 2, 3]));
    }

    #[tokio::test]
    async fn test_file_upload_headers() {
        let transport = StubTransport::scripted(vec![ok(json!({"id": "f"}))]);
        let pagination = Pagination::new();
        let upload = factory(transport.clone())
            .file(
                Endpoint::post("/files")
                    .header("Accept", "application/vnd.mendeley-file.1+json")
                    .link_type("document"),
                &pagination,
            )
            .unwrap();

        let file = FileUpload::new("中文file name(1).pdf", &b"%PDF"[..])
            .with_content_type("application/pdf");
        upload.call(&file, Some("doc1"), None).await.unwrap();

        let request = transport.request(0);
        assert_eq!(request.headers.get("content-type"), Some("application/pdf"));
        assert_eq!(
            request.headers.get("content-disposition"),
            Some("attachment; filename*=UTF-8''%E4%B8%AD%E6%96%87file%20name%281%29.pdf")
        );
        assert_eq!(
            request.headers.get("link"),
            Some("<https://api.mendeley.com/documents/doc1>; rel=\"document\"")
        );
        assert_eq!(
            request.headers.get("accept"),
            Some("application/vnd.mendeley-file.1+json")
        );
        assert!(matches!(
            request.body,
            Some(crate::request::RequestBody::Bytes(ref b)) if &b[..] == b"%PDF"
        ));
    }

    #[tokio::test]
    async fn test_settings_change_applies_to_next_call() {
        let transport = StubTransport::scripted(vec![ok(json!([])), ok(json!([]))]);
        let pagination = Pagination::new();
        let factory = factory(transport.clone());
        let list = factory.query(Endpoint::get("/groups"), &pagination).unwrap();

        let prepared = list.prepare(&[]).unwrap();
        factory.context().set_base_url("https://staging.example.com/").unwrap();
        factory.context().set_auth_mode(AuthMode::none());

        prepared.send().await.unwrap();
        list.call(&[]).await.unwrap();

        assert_eq!(transport.request(0).url, "https://api.mendeley.com/groups");
        assert_eq!(
            transport.request(0).headers.get("authorization"),
            Some("Bearer auth")
        );
        assert_eq!(transport.request(1).url, "https://staging.example.com/groups");
        assert!(!transport.request(1).headers.contains("authorization"));
    }

    #[tokio::test]
    async fn test_static_headers_override_upload_headers() {
        let transport = StubTransport::scripted(vec![ok(json!({}))]);
        let pagination = Pagination::new();
        let upload = factory(transport.clone())
            .file(
                Endpoint::post("/documents").header("Content-Type", "application/pdf"),
                &pagination,
            )
            .unwrap();

        let file = FileUpload::new("notes.txt", &b"text"[..]).with_content_type("text/plain");
        upload.call(&file, None, None).await.unwrap();

        let request = transport.request(0);
        assert_eq!(request.headers.get("content-type"), Some("application/pdf"));
        assert!(!request.headers.contains("link"));
    }
}
