use axum::extract::FromRequest;

/// `axum::Json` whose rejections render as `AppError` (400 with the usual
/// error body) instead of axum's plain-text 415/422.
#[derive(Debug, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(crate::errors::AppError))]
pub struct AppJson<T>(pub T);
