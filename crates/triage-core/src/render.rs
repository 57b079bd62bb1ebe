//! Document renderer trait seam.

use std::path::PathBuf;
use thiserror::Error;

use crate::model::{DocumentKind, Invoice};

/// Errors that can occur while rendering a summary document.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for rendering invoice summary documents.
///
/// Implementations return the path of the generated file, or `None` when
/// rendering fails; the caller falls back to a body-only notification.
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, kind: DocumentKind, invoice: &Invoice, context: &str) -> Option<PathBuf>;
}
