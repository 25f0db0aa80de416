use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::DocketResult;
use crate::error::{DocketError, ErrorKind};

use super::FilePath;
use super::http::{HttpRequest, HttpResponse, HttpServerConfig, HttpServerHandle, HttpService};
use super::traits::{Pal, ReadSeek};

/// In-memory PAL implementation for testing.
///
/// Clones share the same storage. Every file lookup is counted, so tests can
/// assert that a code path performed no I/O at all.
///
/// ```
/// use docket_base::{MockPal, Pal, FilePath};
///
/// let mock = MockPal::new();
/// mock.add_file(FilePath::from("META-INF/openapi.yaml"), b"openapi: 3.0.3".to_vec());
/// assert!(mock.file_exists(&FilePath::from("META-INF/openapi.yaml")).unwrap());
/// assert_eq!(mock.access_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockPal {
    files: Arc<Mutex<HashMap<FilePath, Vec<u8>>>>,
    http_servers: Arc<Mutex<HashMap<u16, Box<dyn HttpService>>>>,
    next_port: Arc<AtomicU16>,
    accesses: Arc<AtomicUsize>,
}

impl MockPal {
    pub fn new() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            http_servers: Arc::new(Mutex::new(HashMap::new())),
            next_port: Arc::new(AtomicU16::new(10000)),
            accesses: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Add a file to the mock storage.
    pub fn add_file(&self, path: FilePath, content: impl Into<Vec<u8>>) {
        self.files.lock().insert(path, content.into());
    }

    /// Number of `file_exists`/`read_file` calls made so far.
    pub fn access_count(&self) -> usize {
        self.accesses.load(Ordering::SeqCst)
    }

    /// Simulate an HTTP request to a server started on this PAL.
    pub fn simulate_request(&self, port: u16, request: HttpRequest) -> DocketResult<HttpResponse> {
        let servers = self.http_servers.lock();
        let service = servers
            .get(&port)
            .ok_or_else(|| crate::err!("No HTTP server registered on port {}", port))?;
        service.handle_request(request)
    }

    pub fn http_server_count(&self) -> usize {
        self.http_servers.lock().len()
    }
}

impl Default for MockPal {
    fn default() -> Self {
        Self::new()
    }
}

impl Pal for MockPal {
    fn file_exists(&self, path: &FilePath) -> DocketResult<bool> {
        self.accesses.fetch_add(1, Ordering::SeqCst);
        Ok(self.files.lock().contains_key(path))
    }

    fn read_file(&self, path: &FilePath) -> DocketResult<Box<dyn ReadSeek + 'static>> {
        self.accesses.fetch_add(1, Ordering::SeqCst);
        let content = self.files.lock().get(path).cloned().ok_or_else(|| {
            Box::new(DocketError::new(ErrorKind::FileError {
                path: path.as_path().to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ),
            }))
        })?;
        Ok(Box::new(Cursor::new(content)))
    }

    fn start_http_server(
        &self,
        service: Box<dyn HttpService>,
        config: HttpServerConfig,
    ) -> DocketResult<HttpServerHandle> {
        let port = config
            .port
            .unwrap_or_else(|| self.next_port.fetch_add(1, Ordering::SeqCst));
        self.http_servers.lock().insert(port, service);
        Ok(HttpServerHandle::new(port))
    }
}
