//! Common API types and utilities

use serde::Serialize;
use utoipa::ToSchema;

/// Plain message response
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A request field that is present and non-empty.
///
/// Absent and `""` are treated the same, so field checks stay in the
/// handlers instead of being split between serde rejections and validation.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
