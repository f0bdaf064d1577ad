//! JSON body extractor that also runs `validator` rules.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{FromRequest, Request};
use validator::{Validate, ValidationErrors};

use autocatalog_core::error::AppError;

use crate::handlers::crud::RestResource;

/// A request body that deserialized and passed validation.
///
/// Both failures answer 400; validation failures list the messages per
/// JSON field in `details`.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: RestResource,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::validation(rejection.body_text()))?;

        value
            .validate()
            .map_err(|errors| validation_error::<T>(&errors))?;

        Ok(Self(value))
    }
}

fn validation_error<T: RestResource>(errors: &ValidationErrors) -> AppError {
    let fields: BTreeMap<String, Vec<String>> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map_or_else(|| e.code.to_string(), |m| m.to_string())
                })
                .collect();
            (T::wire_field(field.as_ref()).to_string(), messages)
        })
        .collect();

    AppError::validation(format!("{} failed validation", T::NAME)).with_details(
        serde_json::to_value(fields).unwrap_or_default(),
    )
}
