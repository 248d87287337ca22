use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("Target directory does not exist: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Target is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Could not find a free port after {attempts} attempts")]
    PortExhausted { attempts: u32 },

    #[error("Server bind failed: {0}")]
    Bind(String),

    #[error("Browser launch failed: {0}")]
    BrowserLaunch(String),

    #[error("Browsing context error: {0}")]
    Context(String),

    #[error("Page error: {0}")]
    Page(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Screenshot capture failed: {0}")]
    Capture(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Invalid file path detected (security restriction): {0}")]
    UnsafePath(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl CaptureError {
    /// Fatal errors abort the run before any capture work begins. Everything
    /// else is contained at the device or page level.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CaptureError::DirectoryNotFound(_)
                | CaptureError::NotADirectory(_)
                | CaptureError::PortExhausted { .. }
                | CaptureError::Bind(_)
                | CaptureError::BrowserLaunch(_)
                | CaptureError::Config(_)
        )
    }
}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        CaptureError::Io(err.to_string())
    }
}

impl From<url::ParseError> for CaptureError {
    fn from(err: url::ParseError) -> Self {
        CaptureError::InvalidUrl(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(CaptureError::DirectoryNotFound(PathBuf::from("/nope")).is_fatal());
        assert!(CaptureError::PortExhausted { attempts: 10 }.is_fatal());
        assert!(CaptureError::BrowserLaunch("no chrome".to_string()).is_fatal());

        assert!(!CaptureError::Navigation("net::ERR_FAILED".to_string()).is_fatal());
        assert!(!CaptureError::UnsafePath("../x.html".to_string()).is_fatal());
        assert!(!CaptureError::Timeout(Duration::from_secs(30)).is_fatal());
    }
}
