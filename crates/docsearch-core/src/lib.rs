//! Core error types shared by every docsearch crate.
//!
//! Kept deliberately small: domain models (`Docset`, `DocSection`, ...) live
//! in `docs-index` since they are specific to this service, not reusable
//! building blocks.
pub mod error;

pub use error::{DocsearchError, Result};
