//! Application error type.
//!
//! Every fallible routine in the crate returns `Result<_, AppError>`. The error
//! carries the process exit code alongside the message so `main` can map
//! failures onto a stable contract:
//!
//! - 2: input/configuration problems (bad files, bad binning, bad flags)
//! - 3: data problems (eta outside the binning, missing objects, too few points)
//! - 4: computation/render problems (no usable fit candidate, backend failures)

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
