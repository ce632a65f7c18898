//! Declaration rendering and guarded writes for qk-gen.
//!
//! - [`render`] turns a [`PatternSet`](qk_core::PatternSet) into the artifact
//!   text and its [`Fingerprint`](qk_core::Fingerprint)
//! - [`SelfEditGuard`] decides whether a write is needed and recognises
//!   events caused by our own writes
//! - [`commit`] performs the guarded write
//!
//! # Example
//!
//! ```ignore
//! let rendered = qk_codegen::render(&patterns, "typesafe-query-keys");
//! let mut guard = SelfEditGuard::new(&root, &output_path);
//! match qk_codegen::commit(&mut guard, &rendered).await? {
//!     WriteOutcome::Written => println!("updated"),
//!     WriteOutcome::Skipped => println!("up to date"),
//! }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod error;
mod guard;
mod render;
pub mod template;
mod writer;

pub use error::CodegenError;
pub use guard::{SelfEditGuard, read_fingerprint};
pub use render::{Rendered, render};
pub use writer::{WriteOutcome, commit, write_artifact};
