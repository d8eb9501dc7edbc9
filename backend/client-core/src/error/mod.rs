pub mod api;
pub mod config;
pub mod credentials;
pub mod logger;
pub mod session;
pub mod sync;
pub mod token;

pub use api::{ApiError, ErrorDetail};
pub use sync::{SyncError, ValidationFailure};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Api(#[from] api::ApiError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Credentials(#[from] credentials::CredentialsError),

    #[error(transparent)]
    Session(#[from] session::SessionError),

    #[error(transparent)]
    Sync(#[from] sync::SyncError),

    #[error(transparent)]
    Token(#[from] token::TokenError),
}
