//! Feynman reads C integrand signatures out of source files and derives the
//! integral signatures and integrator code that evaluate them numerically.

pub mod config;
pub mod core;
pub mod error;

pub use error::{FeynmanError, Result};
