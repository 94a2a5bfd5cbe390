use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{info, warn};

use crate::error::{FeynmanError, Result};
use super::declaration::FunctionDeclaration;
use super::finder::DeclarationFinder;
use super::frontend::{CFrontEnd, FrontEnd};

/// The function declarations found in one C source file
#[derive(Debug, Clone)]
pub struct CFile {
    file_path: PathBuf,
    function_declarations: Vec<FunctionDeclaration>,
}

impl CFile {
    /// Parse `file_path` with the C front end
    pub fn open<P: AsRef<Path>>(file_path: P) -> Result<Self> {
        let mut front_end = CFrontEnd::new()?;
        Self::open_with(file_path, &mut front_end)
    }

    /// Parse `file_path` with a caller-supplied front end
    pub fn open_with<P: AsRef<Path>>(file_path: P, front_end: &mut dyn FrontEnd) -> Result<Self> {
        let file_path = file_path.as_ref();
        validate_file_path(file_path)?;

        let extension = file_path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !front_end.file_extensions().contains(&extension) {
            warn!(
                "{} does not have a {} file extension, parsing it anyway",
                file_path.display(),
                front_end.language_name()
            );
        }

        let root = front_end.parse_file(file_path)?;
        let function_declarations = DeclarationFinder::new(file_path).find(&root)?;

        info!(
            "Loaded {} function declarations from {}",
            function_declarations.len(),
            file_path.display()
        );

        Ok(Self {
            file_path: file_path.to_path_buf(),
            function_declarations,
        })
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn function_declarations(&self) -> &[FunctionDeclaration] {
        &self.function_declarations
    }

    /// First declaration with exactly this name
    pub fn lookup(&self, name: &str) -> Option<&FunctionDeclaration> {
        self.function_declarations
            .iter()
            .find(|decl| decl.name() == name)
    }

    /// Lookup with a key taken from untyped data.
    ///
    /// Null, missing and non-string keys never match.
    pub fn lookup_value(&self, key: Option<&Value>) -> Option<&FunctionDeclaration> {
        key.and_then(Value::as_str).and_then(|name| self.lookup(name))
    }
}

fn validate_file_path(file_path: &Path) -> Result<()> {
    if file_path.as_os_str().is_empty() {
        return Err(FeynmanError::Validation(
            "The file path must not be empty".to_string(),
        ));
    }
    if !file_path.exists() {
        return Err(FeynmanError::Validation(format!(
            "The file path must point to a file which exists: {}",
            file_path.display()
        )));
    }
    if !file_path.is_file() {
        return Err(FeynmanError::Validation(format!(
            "The file path must point to a file: {}",
            file_path.display()
        )));
    }

    Ok(())
}
