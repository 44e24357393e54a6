use axum::extract::FromRequest;

use crate::error::WebError;

/// `Json` whose rejections render as `{"error": ...}` bodies.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(WebError))]
pub struct AppJson<T>(pub T);
