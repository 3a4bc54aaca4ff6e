//! Requirement string parsing shared by all declaration syntaxes

mod requirement;

pub use requirement::{parse_requirement, same_version, ParsedRequirement};
