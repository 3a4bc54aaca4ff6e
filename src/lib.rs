//! spec0-bot - SPEC-0 dependency freshness bot library
//!
//! This library checks the minimum versions a Python project declares against
//! a support window (two years by default) and bumps the ones that fell out
//! of it:
//! - requirements.txt
//! - pyproject.toml (PEP 621 dependency arrays)
//! - setup.py

pub mod cli;
pub mod compliance;
pub mod domain;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod parser;
pub mod progress;
pub mod publish;
pub mod registry;
