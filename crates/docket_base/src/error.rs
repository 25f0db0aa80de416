use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

use tracing_error::{SpanTrace, SpanTraceStatus};

/* 📖 # How are docket errors structured?

Two layers, as in every crate of this workspace:
- `ErrorKind` names what went wrong and carries the structured facts an operator
  needs (unit name, resource path, hook name).
- `DocketError` wraps a kind with a context chain, an optional cause and the span
  trace that was active when the error was created.

Deployment code only ever aborts with the assembly kinds (`StaticFileDecode`,
`HookFailed`, `HookNotFound`); see `DocketError::is_assembly_failure`.
*/

/// Error variants that can occur in docket operations.
#[derive(Debug)]
pub enum ErrorKind {
    /// File system operation failed
    FileError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A static API description exists but could not be decoded
    StaticFileDecode {
        unit: String,
        path: String,
        source: Box<dyn StdError + Send + Sync>,
    },

    /// A reader or filter hook returned an error
    HookFailed { unit: String, hook: String },

    /// A hook named in the configuration is unknown to the unit's hook loader
    HookNotFound { unit: String, hook: String },

    /// Catch-all for other errors with a message
    Message { message: String },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::FileError { path, source } => {
                write!(f, "File error at {}: {}", path.display(), source)
            }
            ErrorKind::StaticFileDecode { unit, path, source } => {
                write!(
                    f,
                    "Failed to load static file {} for deployment {}: {}",
                    path, unit, source
                )
            }
            ErrorKind::HookFailed { unit, hook } => {
                write!(f, "Hook '{}' failed for deployment {}", hook, unit)
            }
            ErrorKind::HookNotFound { unit, hook } => {
                write!(
                    f,
                    "Hook '{}' configured for deployment {} could not be resolved",
                    hook, unit
                )
            }
            ErrorKind::Message { message } => write!(f, "{}", message),
        }
    }
}

/// Error type wrapping an `ErrorKind` with context, cause and span trace.
pub struct DocketError {
    kind: ErrorKind,
    context: Vec<String>,
    cause: Option<Box<DocketError>>,
    span_trace: SpanTrace,
}

impl DocketError {
    /// Creates a new error from an ErrorKind, capturing the current span trace.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: vec![],
            cause: None,
            span_trace: SpanTrace::capture(),
        }
    }

    /// Creates a message error.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Message {
            message: message.into(),
        })
    }

    /// Attaches context to an error.
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Attaches context using lazy evaluation.
    pub fn with_context<F>(mut self, f: F) -> Self
    where
        F: FnOnce() -> String,
    {
        self.context.push(f());
        self
    }

    /// Records the error that led to this one.
    pub fn caused_by(mut self, cause: impl Into<Box<DocketError>>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn get_context(&self) -> &[String] {
        &self.context
    }

    pub fn cause(&self) -> Option<&DocketError> {
        self.cause.as_deref()
    }

    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// True for the error kinds that make a unit fail to deploy.
    pub fn is_assembly_failure(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::StaticFileDecode { .. }
                | ErrorKind::HookFailed { .. }
                | ErrorKind::HookNotFound { .. }
        )
    }

    /// Returns the innermost error in the chain.
    pub fn root_cause(&self) -> &(dyn StdError + 'static) {
        let mut current: &(dyn StdError + 'static) = self;
        while let Some(next) = current.source() {
            current = next;
        }
        current
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: &str) -> fmt::Result {
        let item_count = self.context.len() + usize::from(self.cause.is_some());
        for (i, ctx) in self.context.iter().enumerate() {
            let branch = if i + 1 == item_count { "└─" } else { "├─" };
            writeln!(f, "{}{} {}", indent, branch, ctx)?;
        }
        if let Some(cause) = &self.cause {
            writeln!(f, "{}└─ cause: {}", indent, cause.kind)?;
            cause.fmt_tree(f, &format!("{}   ", indent))?;
        }
        Ok(())
    }
}

impl From<ErrorKind> for DocketError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl StdError for DocketError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.kind {
            ErrorKind::FileError { source, .. } => Some(source),
            ErrorKind::StaticFileDecode { source, .. } => Some(source.as_ref()),
            _ => self
                .cause
                .as_deref()
                .map(|cause| cause as &(dyn StdError + 'static)),
        }
    }
}

impl fmt::Display for DocketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ctx in &self.context {
            write!(f, "{}: ", ctx)?;
        }
        write!(f, "{}", self.kind)
    }
}

impl fmt::Debug for DocketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.kind)?;
        self.fmt_tree(f, "")?;
        if self.span_trace.status() == SpanTraceStatus::CAPTURED {
            writeln!(f, "Trace: {}", self.span_trace)?;
        }
        Ok(())
    }
}

/// Standard result type for docket operations.
pub type DocketResult<T> = std::result::Result<T, Box<DocketError>>;

/// Extension trait for attaching context to Results.
pub trait ResultExt<T> {
    /// Attaches context to an error, consuming and re-wrapping it.
    fn context(self, context: impl Into<String>) -> DocketResult<T>;

    /// Attaches context using lazy evaluation.
    fn with_context<F>(self, f: F) -> DocketResult<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for DocketResult<T> {
    fn context(self, context: impl Into<String>) -> DocketResult<T> {
        self.map_err(|err| Box::new(err.context(context)))
    }

    fn with_context<F>(self, f: F) -> DocketResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| Box::new(err.with_context(f)))
    }
}

/// Builds a boxed message error from format arguments.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        Box::new($crate::DocketError::message(format!($($arg)*)))
    };
}

/// Returns early with a boxed message error.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::err!($($arg)*))
    };
}
