//! pylink library - expose modules for testing
//!
//! This library exposes the command handlers and shared types needed for
//! integration tests.

pub mod commands;
pub mod common;
pub mod errors;
