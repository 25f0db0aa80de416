use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, error, instrument, warn};

use crate::error::{DocketError, ErrorKind};
use crate::{DocketResult, err};

use super::FilePath;
use super::http::{
    HttpMethod, HttpRequest, HttpResponse, HttpServerConfig, HttpServerHandle, HttpService,
    HttpStatusCode,
};
use super::traits::{Pal, ReadSeek};

/* 📖 # How does RealPal serve HTTP?

`tiny_http` accepts connections on its own threads; a single dispatch thread pulls
requests with a short timeout so it can notice the shutdown flag, converts them to
`HttpRequest` values and hands them to the service. There is no async runtime.
*/

const ACCEPT_POLL: Duration = Duration::from_millis(100);

/// PAL implementation on the real filesystem, rooted at a base directory.
#[derive(Debug)]
pub struct RealPal {
    base_dir: PathBuf,
}

impl RealPal {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    fn resolve_path(&self, path: &FilePath) -> PathBuf {
        self.base_dir.join(path.as_path())
    }
}

impl Pal for RealPal {
    #[instrument(skip(self), fields(path = %path))]
    fn file_exists(&self, path: &FilePath) -> DocketResult<bool> {
        let resolved = self.resolve_path(path);
        let exists = resolved.is_file();
        debug!(exists, resolved = %resolved.display(), "checked file existence");
        Ok(exists)
    }

    #[instrument(skip(self), fields(path = %path))]
    fn read_file(&self, path: &FilePath) -> DocketResult<Box<dyn ReadSeek + 'static>> {
        let resolved = self.resolve_path(path);
        let file = fs::File::open(&resolved).map_err(|e| {
            debug!(error = %e, "failed to open file");
            Box::new(DocketError::new(ErrorKind::FileError {
                path: resolved,
                source: e,
            }))
        })?;
        Ok(Box::new(file))
    }

    #[instrument(skip(self, service), fields(address = %config.address()))]
    fn start_http_server(
        &self,
        service: Box<dyn HttpService>,
        config: HttpServerConfig,
    ) -> DocketResult<HttpServerHandle> {
        let address = config.address();
        let server = tiny_http::Server::http(&address)
            .map_err(|e| err!("Failed to bind HTTP server to {}: {}", address, e))?;
        let port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .ok_or_else(|| err!("HTTP server on {} is not bound to an IP address", address))?;

        let handle = HttpServerHandle::new(port);
        let shutdown = handle.shutdown_flag();
        let server_name = config.server_name;
        std::thread::Builder::new()
            .name(format!("http-{}", port))
            .spawn(move || serve(server, service, shutdown, server_name))
            .map_err(|e| err!("Failed to spawn HTTP dispatch thread: {}", e))?;

        debug!(port, "HTTP server started");
        Ok(handle)
    }
}

fn serve(
    server: tiny_http::Server,
    service: Box<dyn HttpService>,
    shutdown: Arc<AtomicBool>,
    server_name: String,
) {
    while !shutdown.load(Ordering::SeqCst) {
        match server.recv_timeout(ACCEPT_POLL) {
            Ok(Some(request)) => dispatch(service.as_ref(), request, &server_name),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "failed to receive HTTP request"),
        }
    }
    debug!("HTTP server stopped");
}

fn dispatch(service: &dyn HttpService, mut request: tiny_http::Request, server_name: &str) {
    let response = match convert_request(&mut request) {
        Ok(http_request) => service.handle_request(http_request).unwrap_or_else(|e| {
            error!(error = %e, url = request.url(), "HTTP service failed");
            HttpResponse::new(HttpStatusCode::ServiceError).with_body(e.to_string())
        }),
        Err(e) => HttpResponse::bad_request().with_body(e.to_string()),
    };
    if let Err(e) = request.respond(convert_response(response, server_name)) {
        warn!(error = %e, "failed to send HTTP response");
    }
}

fn convert_request(request: &mut tiny_http::Request) -> DocketResult<HttpRequest> {
    let method_name = request.method().to_string();
    let method = HttpMethod::parse(&method_name)
        .ok_or_else(|| err!("Unsupported HTTP method {}", method_name))?;

    let mut converted = HttpRequest::new(method, request.url());
    for header in request.headers() {
        converted = converted.with_header(header.field.as_str().as_str(), header.value.as_str());
    }

    let mut body = Vec::new();
    request
        .as_reader()
        .read_to_end(&mut body)
        .map_err(|e| err!("Failed to read request body: {}", e))?;
    Ok(converted.with_body(body))
}

fn convert_response(
    response: HttpResponse,
    server_name: &str,
) -> tiny_http::Response<Box<dyn Read + Send>> {
    let status = tiny_http::StatusCode(response.status().as_u16());
    let mut headers: Vec<tiny_http::Header> = response
        .headers()
        .all()
        .iter()
        .filter_map(|(name, value)| {
            tiny_http::Header::from_bytes(name.as_bytes(), value.as_bytes()).ok()
        })
        .collect();
    if let Ok(server) = tiny_http::Header::from_bytes(&b"Server"[..], server_name.as_bytes()) {
        headers.push(server);
    }

    let body = response.into_body();
    let length = body.known_len();
    tiny_http::Response::new(status, headers, body.into_reader(), length, None)
}
