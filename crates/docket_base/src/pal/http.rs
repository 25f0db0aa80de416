/* 📖 # Why does the PAL carry HTTP types?

A registered API description is served by an `HttpService`. Keeping request and
response as plain values lets the same service run behind `tiny_http` in `RealPal`
and behind `MockPal::simulate_request` in tests.
*/

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// HTTP methods understood by docket services.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Head,
    Options,
    Post,
    Put,
    Delete,
    Patch,
    Trace,
    Connect,
}

impl HttpMethod {
    /// Parse an HTTP method, case-insensitively.
    pub fn parse(method: &str) -> Option<Self> {
        match method.to_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "HEAD" => Some(Self::Head),
            "OPTIONS" => Some(Self::Options),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            "PATCH" => Some(Self::Patch),
            "TRACE" => Some(Self::Trace),
            "CONNECT" => Some(Self::Connect),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Trace => "TRACE",
            Self::Connect => "CONNECT",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// HTTP headers collection. Lookups ignore ASCII case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpHeaders {
    inner: HashMap<String, String>,
}

impl HttpHeaders {
    pub fn new() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.inner.get(key).or_else(|| {
            self.inner
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(key))
                .map(|(_, value)| value)
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn all(&self) -> &HashMap<String, String> {
        &self.inner
    }
}

/// HTTP body content.
pub enum HttpBody {
    /// Fixed-size body content
    Bytes(Vec<u8>),
    /// Streaming body content
    Stream(Box<dyn std::io::Read + Send>),
}

impl HttpBody {
    pub fn empty() -> Self {
        Self::Bytes(vec![])
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self::Bytes(s.into().into_bytes())
    }

    /// Get content as a string if valid UTF-8 (only works for Bytes variant).
    pub fn as_string(&self) -> Option<String> {
        match self {
            Self::Bytes(bytes) => String::from_utf8(bytes.clone()).ok(),
            Self::Stream(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Bytes(bytes) => bytes.is_empty(),
            Self::Stream(_) => false,
        }
    }

    /// Content length, when known up front.
    pub fn known_len(&self) -> Option<usize> {
        match self {
            Self::Bytes(bytes) => Some(bytes.len()),
            Self::Stream(_) => None,
        }
    }

    /// Convert into a reader suitable for tiny_http.
    pub fn into_reader(self) -> Box<dyn std::io::Read + Send> {
        match self {
            Self::Bytes(bytes) => Box::new(std::io::Cursor::new(bytes)),
            Self::Stream(reader) => reader,
        }
    }
}

impl Default for HttpBody {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for HttpBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Stream(_) => f.debug_tuple("Stream").finish(),
        }
    }
}

impl From<Vec<u8>> for HttpBody {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<String> for HttpBody {
    fn from(s: String) -> Self {
        Self::from_string(s)
    }
}

impl From<&str> for HttpBody {
    fn from(s: &str) -> Self {
        Self::from_string(s)
    }
}

/// HTTP request. `path` is the raw request target, query string included.
#[derive(Debug)]
pub struct HttpRequest {
    method: HttpMethod,
    path: String,
    headers: HttpHeaders,
    body: HttpBody,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HttpHeaders::new(),
            body: HttpBody::empty(),
        }
    }

    pub fn method(&self) -> &HttpMethod {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The request path without its query string.
    pub fn path_only(&self) -> &str {
        self.path
            .split_once('?')
            .map_or(self.path.as_str(), |(path, _)| path)
    }

    /// First value of a query parameter, if present.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        let (_, query) = self.path.split_once('?')?;
        query.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (key == name).then_some(value)
        })
    }

    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    pub fn body(&self) -> &HttpBody {
        &self.body
    }

    pub fn with_body(mut self, body: impl Into<HttpBody>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }
}

/// HTTP status codes used by docket services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpStatusCode {
    Ok = 200,
    BadRequest = 400,
    NotFound = 404,
    MethodNotAllowed = 405,
    InternalServerError = 500,
    /// Reported when a service itself returns an error.
    ServiceError = 599,
}

impl HttpStatusCode {
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }
}

/// HTTP response.
#[derive(Debug)]
pub struct HttpResponse {
    status: HttpStatusCode,
    headers: HttpHeaders,
    body: HttpBody,
}

impl HttpResponse {
    pub fn new(status: HttpStatusCode) -> Self {
        Self {
            status,
            headers: HttpHeaders::new(),
            body: HttpBody::empty(),
        }
    }

    pub fn ok() -> Self {
        Self::new(HttpStatusCode::Ok)
    }

    pub fn bad_request() -> Self {
        Self::new(HttpStatusCode::BadRequest)
    }

    pub fn not_found() -> Self {
        Self::new(HttpStatusCode::NotFound)
    }

    pub fn method_not_allowed() -> Self {
        Self::new(HttpStatusCode::MethodNotAllowed)
    }

    pub fn status(&self) -> HttpStatusCode {
        self.status
    }

    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    pub fn body(&self) -> &HttpBody {
        &self.body
    }

    pub fn into_body(self) -> HttpBody {
        self.body
    }

    pub fn with_body(mut self, body: impl Into<HttpBody>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }

    pub fn with_content_type(self, content_type: impl Into<String>) -> Self {
        self.with_header("Content-Type", content_type)
    }
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on. If None, the OS will assign an available port.
    pub port: Option<u16>,
    /// Server name used in responses.
    pub server_name: String,
}

impl HttpServerConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            server_name: "docket".to_string(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Get the address string (host:port, port 0 when unset).
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port.unwrap_or(0))
    }
}

/// Trait for handling HTTP requests.
///
/// Errors returned from `handle_request` are turned into HTTP 599 responses by the
/// PAL, which keeps them distinguishable from deliberate error statuses.
pub trait HttpService: std::fmt::Debug + Send + Sync + 'static {
    fn handle_request(&self, request: HttpRequest) -> crate::DocketResult<HttpResponse>;
}

impl<S: HttpService + ?Sized> HttpService for Arc<S> {
    fn handle_request(&self, request: HttpRequest) -> crate::DocketResult<HttpResponse> {
        (**self).handle_request(request)
    }
}

/// Handle to a running HTTP server.
///
/// Clones share one server; it shuts down once the last clone is dropped.
#[derive(Debug, Clone)]
pub struct HttpServerHandle {
    port: u16,
    shutdown: Arc<AtomicBool>,
    _guard: Arc<ShutdownOnDrop>,
}

#[derive(Debug)]
struct ShutdownOnDrop(Arc<AtomicBool>);

impl Drop for ShutdownOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl HttpServerHandle {
    pub fn new(port: u16) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        Self {
            port,
            _guard: Arc::new(ShutdownOnDrop(Arc::clone(&shutdown))),
            shutdown,
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// The flag a server loop polls; it does not keep the server alive.
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }
}
