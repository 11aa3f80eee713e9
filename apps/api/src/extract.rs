//! Request body extractors that reject with [`AppError`].

use axum::extract::FromRequest;

use crate::errors::AppError;

/// `axum::Json` whose rejection is a `VALIDATION_ERROR`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `axum::Form` whose rejection is a `VALIDATION_ERROR`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Form), rejection(AppError))]
pub struct AppForm<T>(pub T);
