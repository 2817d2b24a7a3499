//! Core library for the delivery note generator.
//!
//! The library exposes the stages that power the command-line interface as
//! well as the tests. IO adapters live under [`io`]: file discovery, the
//! production order extractor and the delivery note renderer. The value types
//! passed between them live in [`model`], the visual layout in [`template`],
//! and the end-to-end orchestration in [`generate`].

pub mod error;
pub mod generate;
pub mod io;
pub mod model;
pub mod template;

pub use error::{Result, ToolError};
