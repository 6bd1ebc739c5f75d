use std::path::Path;

/// Failure classes of a run. Each maps to its own process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The exchange-file header or its expression does not match the grammar.
    Format,
    /// Sample rows are missing, malformed or empty.
    DataFormat,
    /// Trajectory contents disagree with the model (or a bad option value).
    Validation,
    /// An input could not be read or an output could not be written.
    Io,
    /// The plotting backend or the GIF encoder failed.
    Render,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Format => 2,
            ErrorKind::DataFormat => 3,
            ErrorKind::Validation => 4,
            ErrorKind::Io => 5,
            ErrorKind::Render => 6,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Format, message)
    }

    pub fn data_format(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DataFormat, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// An I/O failure on `path`; the path is always part of the message.
    pub fn io(path: &Path, action: &str, err: impl std::fmt::Display) -> Self {
        Self::new(
            ErrorKind::Io,
            format!("Failed to {action} '{}': {err}", path.display()),
        )
    }

    pub fn render(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::new(
            ErrorKind::Render,
            format!("Failed to render '{}': {err}", path.display()),
        )
    }

    /// Prefix the message, keeping the kind (e.g. with the offending file).
    pub fn with_context(self, context: impl std::fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{context}: {}", self.message),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
