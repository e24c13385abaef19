use gate_core::error::AppError;
use thiserror::Error;

use super::policy::PolicyError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Current PIN is incorrect.")]
    CurrentPinIncorrect,

    #[error("Current password is incorrect.")]
    CurrentPasswordIncorrect,

    #[error("{0}")]
    PolicyViolation(#[from] PolicyError),

    #[error("You don't have permission to {0}")]
    PermissionDenied(String),

    #[error("Member not found")]
    MemberNotFound,

    #[error("Congregation not found")]
    CongregationNotFound,

    #[error("No challenge is active")]
    NoChallenge,

    #[error("PIN verification already in progress")]
    ValidationInProgress,

    #[error("No action awaiting confirmation")]
    NothingToConfirm,

    #[error("Action failed: {0}")]
    ExecutorFailed(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidCredentials => {
                AppError::AuthError(anyhow::anyhow!("Invalid username or password"))
            }
            ServiceError::CurrentPinIncorrect => {
                AppError::BadRequest(anyhow::anyhow!("Current PIN is incorrect."))
            }
            ServiceError::CurrentPasswordIncorrect => {
                AppError::BadRequest(anyhow::anyhow!("Current password is incorrect."))
            }
            ServiceError::PolicyViolation(e) => AppError::BadRequest(anyhow::anyhow!(e)),
            ServiceError::PermissionDenied(what) => AppError::Forbidden(anyhow::anyhow!(
                "You don't have permission to {}",
                what
            )),
            ServiceError::MemberNotFound => {
                AppError::NotFound(anyhow::anyhow!("Member not found"))
            }
            ServiceError::CongregationNotFound => {
                AppError::NotFound(anyhow::anyhow!("Congregation not found"))
            }
            ServiceError::NoChallenge => {
                AppError::Conflict(anyhow::anyhow!("No challenge is active"))
            }
            ServiceError::ValidationInProgress => {
                AppError::Conflict(anyhow::anyhow!("PIN verification already in progress"))
            }
            ServiceError::NothingToConfirm => {
                AppError::Conflict(anyhow::anyhow!("No action awaiting confirmation"))
            }
            ServiceError::ExecutorFailed(msg) => AppError::InternalError(anyhow::anyhow!(msg)),
            ServiceError::Internal(e) => AppError::InternalError(e),
        }
    }
}
