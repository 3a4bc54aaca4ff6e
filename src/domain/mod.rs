//! Core domain models for spec0-bot
//!
//! This module contains the fundamental types used throughout the application:
//! - Dependency declarations and the syntaxes they are written in
//! - Release history from the package index
//! - The support window and its age arithmetic
//! - Compliance decision results

mod declaration;
mod evaluation;
mod release;
mod window;

pub use declaration::{Declaration, DeclarationSyntax, SourceLocation};
pub use evaluation::{Evaluation, OutdatedEntry, UnresolvedReason};
pub use release::{compare_versions, ReleaseHistory, ReleaseRecord};
pub use window::{SupportWindow, DAYS_PER_YEAR};
