use relative_path::{RelativePath, RelativePathBuf};
use std::path::{Path, PathBuf};

/* 📖 # Why are PAL paths relative?

A deployable unit is a file tree with its own root; resources such as
`META-INF/openapi.yaml` are addressed relative to that root, never by absolute
system path. `FilePath` wraps `RelativePathBuf` so that this holds by type.
*/

/// Path relative to a PAL base directory.
///
/// ```
/// use docket_base::FilePath;
///
/// let root = FilePath::from("");
/// assert_eq!(root.join("META-INF/openapi.yaml").to_string(), "META-INF/openapi.yaml");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilePath(RelativePathBuf);

impl FilePath {
    pub fn as_relative(&self) -> &RelativePath {
        &self.0
    }

    /// Converts to a regular Path for use with std::fs operations.
    pub fn as_path(&self) -> &Path {
        Path::new(self.as_relative().as_str())
    }

    pub fn into_path_buf(self) -> PathBuf {
        PathBuf::from(self.0.as_str())
    }

    /// Resolves a child resource below this path.
    pub fn join(&self, child: impl AsRef<RelativePath>) -> FilePath {
        FilePath(self.0.join(child).normalize())
    }
}

impl From<&str> for FilePath {
    fn from(s: &str) -> Self {
        Self(RelativePathBuf::from(s))
    }
}

impl From<String> for FilePath {
    fn from(s: String) -> Self {
        Self(RelativePathBuf::from(s))
    }
}

impl From<RelativePathBuf> for FilePath {
    fn from(p: RelativePathBuf) -> Self {
        Self(p)
    }
}

impl From<&Path> for FilePath {
    fn from(p: &Path) -> Self {
        Self(RelativePathBuf::from(p.to_string_lossy().into_owned()))
    }
}

impl std::fmt::Display for FilePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<RelativePath> for FilePath {
    fn as_ref(&self) -> &RelativePath {
        &self.0
    }
}
