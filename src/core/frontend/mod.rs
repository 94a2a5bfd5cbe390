//! Compiler front ends
//!
//! A front end turns one source file into a [`SyntaxNode`] tree. Failing to
//! read or parse the file is reported before anything walks the tree.

mod c;

pub use c::CFrontEnd;

use std::path::Path;

use crate::error::{FeynmanError, Result};
use super::syntax::SyntaxNode;

/// Trait that all front ends must implement
pub trait FrontEnd {
    /// Parse source text into a syntax tree
    fn parse_source(&mut self, content: &str) -> Result<SyntaxNode>;

    /// Read and parse a single file
    fn parse_file(&mut self, file_path: &Path) -> Result<SyntaxNode> {
        let content = std::fs::read_to_string(file_path).map_err(|e| {
            FeynmanError::Parse(format!("Unable to read {}: {}", file_path.display(), e))
        })?;

        self.parse_source(&content).map_err(|e| match e {
            FeynmanError::Parse(message) => {
                FeynmanError::Parse(format!("{}: {}", file_path.display(), message))
            }
            other => other,
        })
    }

    /// Get the file extensions this front end handles
    fn file_extensions(&self) -> &[&str];

    /// Get the language name
    fn language_name(&self) -> &str;
}
