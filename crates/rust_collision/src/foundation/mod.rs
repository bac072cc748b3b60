//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Math types and the world transform capability
//! - Logging utilities

pub mod logging;
pub mod math;
