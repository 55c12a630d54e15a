pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced through result handles and the bundled runtime.
///
/// `Clone` so that a single failure can be observed by every reader of a
/// shared handle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("task panicked: {message}")]
    Panicked { message: String },

    /// A fallible callable returned `Err`.
    #[error("task failed: {message}")]
    Failed { message: String },

    #[error("continuation already attached to this handle")]
    ContinuationAlreadyAttached,

    #[error("promise dropped before a value was set")]
    BrokenPromise,

    #[error("value already retrieved from this handle")]
    AlreadyRetrieved,

    #[error("executor error: {0}")]
    Executor(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("runtime not initialized")]
    NotInitialized,

    #[error("already initialized")]
    AlreadyInitialized,
}

impl Error {
    pub fn executor<S: Into<String>>(msg: S) -> Self {
        Error::Executor(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    pub fn panicked<S: Into<String>>(message: S) -> Self {
        Error::Panicked {
            message: message.into(),
        }
    }

    pub fn failed<S: Into<String>>(message: S) -> Self {
        Error::Failed {
            message: message.into(),
        }
    }

    /// True when the error came from user code rather than the runtime.
    pub fn is_task_failure(&self) -> bool {
        matches!(self, Error::Panicked { .. } | Error::Failed { .. })
    }
}
