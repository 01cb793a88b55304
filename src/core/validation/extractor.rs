//! Axum extractor for validated record payloads
//!
//! `Validated<T>` runs the record's schema for the operation implied by the
//! HTTP method (POST = create, PUT/PATCH = update) before the handler sees
//! the payload.

use crate::core::entity::{Operation, Record};
use crate::core::error::{BackofficeError, ValidationError};
use axum::{
    Json,
    extract::{FromRequest, Request},
    http::Method,
};
use serde_json::Value;
use std::marker::PhantomData;

/// A filtered and validated JSON payload for record type `T`
///
/// ```rust,ignore
/// pub async fn create(Validated(payload, _): Validated<Client>) -> ... {
///     // payload only contains declared, cleaned fields
/// }
/// ```
pub struct Validated<T>(pub Value, PhantomData<T>);

impl<T> Validated<T> {
    pub fn new(payload: Value) -> Self {
        Self(payload, PhantomData)
    }

    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl<T> std::ops::Deref for Validated<T> {
    type Target = Value;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Operation implied by an HTTP method
pub fn operation_for(method: &Method) -> Operation {
    if method == Method::PUT || method == Method::PATCH {
        Operation::Update
    } else {
        Operation::Create
    }
}

impl<S, T> FromRequest<S> for Validated<T>
where
    S: Send + Sync,
    T: Record,
{
    type Rejection = BackofficeError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let operation = operation_for(req.method());

        let Json(payload): Json<Value> = Json::from_request(req, state).await.map_err(|e| {
            BackofficeError::Validation(ValidationError::InvalidJson {
                message: e.body_text(),
            })
        })?;

        T::validation(operation)
            .validate_and_filter(payload)
            .map(Validated::new)
            .map_err(|errors| BackofficeError::Validation(ValidationError::FieldErrors(errors)))
    }
}
