//! Process-level error type.
//!
//! Every failure that can abort a run carries the exit code the binary should
//! terminate with:
//!
//! - `2` — input/config error (unreadable CSV, bad schema, unknown poll type)
//! - `3` — insufficient data (no eligible generic-ballot polls, undefined
//!   fallback dispersion, empty race list)
//! - `4` — internal numeric error (non-finite forecast)

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
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
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
