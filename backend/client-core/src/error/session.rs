use crate::error::api::ApiError;
use crate::error::credentials::CredentialsError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Credentials(#[from] CredentialsError),
}

impl SessionError {
    /// Text safe to show the user on a failed sign-in/sign-up.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Api(api) => api.user_message(),
            SessionError::Credentials(_) => {
                String::from("Could not save your session. Please try again.")
            }
        }
    }
}
