//! Error handling for the gitolite-mover crate.
use std::{error::Error as StdError, fmt};

/// Error type for the gitolite-mover crate.
#[derive(Debug)]
pub struct GitMoverError {
    /// Inner error.
    inner: Box<Inner>,
}

impl GitMoverError {
    /// Create a new error.
    pub(crate) fn new(kind: GitMoverErrorKind) -> Self {
        Self {
            inner: Box::new(Inner {
                kind,
                source: None,
                repo: None,
            }),
        }
    }

    /// Create a new error of the given kind wrapping a source error.
    pub(crate) fn with_source<E: Into<BoxError>>(kind: GitMoverErrorKind, source: E) -> Self {
        Self {
            inner: Box::new(Inner {
                kind,
                source: Some(source.into()),
                repo: None,
            }),
        }
    }

    /// Create a new error with a source.
    pub(crate) fn with_text(mut self, text: &str) -> Self {
        self.inner.source = Some(Box::new(std::io::Error::other(text)));
        self
    }

    /// Attach the repository being processed.
    pub(crate) fn with_repo(mut self, repo: &str) -> Self {
        self.inner.repo = Some(repo.to_string());
        self
    }

    /// Kind of the error.
    pub fn kind(&self) -> &GitMoverErrorKind {
        &self.inner.kind
    }

    /// Process exit code matching this error
    pub fn exit_code(&self) -> i32 {
        match self.inner.kind {
            GitMoverErrorKind::Usage => 2,
            _ => 1,
        }
    }
}

/// Type alias for a boxed error.
pub(crate) type BoxError = Box<dyn StdError + Send + Sync>;

/// Inner error type for the gitolite-mover crate.
#[derive(Debug)]
struct Inner {
    /// Error kind.
    kind: GitMoverErrorKind,

    /// Repository the error happened on
    repo: Option<String>,

    /// Source error.
    source: Option<BoxError>,
}

/// Kind of error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitMoverErrorKind {
    /// Bad command line usage.
    Usage,

    /// Filesystem error.
    Io,

    /// Error related to the reqwest crate.
    Reqwest,

    /// Error related to serde.
    Serde,

    /// Error related to Git2.
    Git2,

    /// Unable to fetch or read the admin repository.
    ConfigFetch,

    /// Unable to mirror-clone a source repository.
    MirrorFetch,

    /// The destination refused to create the project.
    ProjectCreation,

    /// Unable to mirror-push to the destination.
    Push,

    /// Unable to write the migration record.
    Record,

    /// Two source repositories map to the same destination name.
    NameCollision,

    /// Free-form error.
    Custom,
}

impl fmt::Display for GitMoverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.inner.kind)?;
        if let Some(repo) = &self.inner.repo {
            write!(f, " ({repo})")?;
        }
        if let Some(source) = &self.inner.source {
            write!(f, ": {source}")?;
        }
        Ok(())
    }
}

impl StdError for GitMoverError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source.as_ref().map(|e| &**e as _)
    }
}

impl From<reqwest::Error> for GitMoverError {
    fn from(e: reqwest::Error) -> Self {
        Self::with_source(GitMoverErrorKind::Reqwest, e)
    }
}

impl From<serde_json::Error> for GitMoverError {
    fn from(e: serde_json::Error) -> Self {
        Self::with_source(GitMoverErrorKind::Serde, e)
    }
}

impl From<std::io::Error> for GitMoverError {
    fn from(e: std::io::Error) -> Self {
        Self::with_source(GitMoverErrorKind::Io, e)
    }
}

impl From<git2::Error> for GitMoverError {
    fn from(e: git2::Error) -> Self {
        Self::with_source(GitMoverErrorKind::Git2, e)
    }
}

impl From<String> for GitMoverError {
    fn from(e: String) -> Self {
        Self::new(GitMoverErrorKind::Custom).with_text(&e)
    }
}

impl From<&str> for GitMoverError {
    fn from(e: &str) -> Self {
        Self::new(GitMoverErrorKind::Custom).with_text(e)
    }
}
