use std::io::{Read, Seek};
use std::sync::Arc;

use crate::DocketResult;
use crate::error::ErrorKind;

use super::file_path::FilePath;
use super::http::{HttpServerConfig, HttpServerHandle, HttpService};

/// Trait combining Read + Seek for file operations.
pub trait ReadSeek: Read + Seek + Send {}
impl<T: Read + Seek + Send> ReadSeek for T {}

/// Platform Abstraction Layer (PAL) trait providing file and HTTP operations.
///
/// Two implementations are provided:
/// - `RealPal`: the real filesystem via `std::fs`, HTTP via `tiny_http`
/// - `MockPal`: in-memory files and simulated HTTP requests for tests
pub trait Pal: std::fmt::Debug + Send + Sync + 'static {
    /// Check if a file exists at the given path.
    fn file_exists(&self, path: &FilePath) -> DocketResult<bool>;

    /// Open a file for reading.
    fn read_file(&self, path: &FilePath) -> DocketResult<Box<dyn ReadSeek + 'static>>;

    /// Read entire file contents as a UTF-8 string.
    fn read_file_to_string(&self, path: &FilePath) -> DocketResult<String> {
        let mut reader = self.read_file(path)?;
        let mut contents = String::new();
        reader.read_to_string(&mut contents).map_err(|e| {
            Box::new(crate::DocketError::new(ErrorKind::FileError {
                path: path.as_path().to_path_buf(),
                source: e,
            }))
        })?;
        Ok(contents)
    }

    /// Start an HTTP server with the given service.
    ///
    /// The server runs until the returned handle (and all its clones) are dropped
    /// or `shutdown()` is called.
    fn start_http_server(
        &self,
        service: Box<dyn HttpService>,
        config: HttpServerConfig,
    ) -> DocketResult<HttpServerHandle>;
}

/// Shared handle to a PAL implementation.
///
/// ```no_run
/// use docket_base::{RealPal, PalHandle};
///
/// let pal = PalHandle::new(RealPal::new("deployments/orders.war".into()));
/// let pal_clone = pal.clone();
/// ```
#[derive(Debug, Clone)]
pub struct PalHandle(Arc<dyn Pal>);

impl PalHandle {
    pub fn new(pal: impl Pal + 'static) -> Self {
        Self(Arc::new(pal))
    }
}

impl std::ops::Deref for PalHandle {
    type Target = dyn Pal;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}
