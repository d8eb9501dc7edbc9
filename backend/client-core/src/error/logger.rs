use common::ErrorLocation;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("Logger Setup Error: {message} {location}")]
    Setup {
        message: String,
        location: ErrorLocation,
    },
}
