use axum::{
    extract::{FromRequest, Request},
    Json,
};
use gate_core::error::AppError;
use serde::de::DeserializeOwned;
use validator::Validate;

/// `Json` extractor that also runs the DTO's `validator` rules, rejecting
/// with the same `AppError` body every other failure path produces: a
/// parse failure is a 400, a failed validation rule a 422.
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Json parse error: {}", e)))?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}
