//! CLI utilities for imgconv
//!
//! Provides shared CLI functionality:
//! - Status messages and error reports
//! - Size, duration and count formatting
//! - Progress spinners and bars

#![warn(missing_docs)]

pub mod output;
pub mod progress;
