//! Validation errors for domain input.

use thiserror::Error;

/// Errors raised when validating analysis input.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The analysis input text is empty or whitespace-only.
    #[error("文本内容不能为空")]
    EmptyInputText,
}
