//! Command-line interface module
//!
//! Thin shell over the staging core: load an image, invoke the pipeline,
//! save the result and report the resolved background label.

pub mod main;

pub use main::{main, Cli};
