use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{FeynmanError, Result};
use super::declaration::FunctionDeclaration;
use super::syntax::{NodeKind, SyntaxNode};
use super::types::resolve_type_name;

/// Collects the function declarations of one source file from its syntax tree
pub struct DeclarationFinder {
    file_path: PathBuf,
}

impl DeclarationFinder {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Function declarations in source order.
    ///
    /// The walk is depth-first and pre-order. A function declaration's own
    /// children are only read for parameter names, so prototypes local to a
    /// function body are not reported.
    pub fn find(&self, root: &SyntaxNode) -> Result<Vec<FunctionDeclaration>> {
        let mut results = Vec::new();
        self.collect(root, &mut results)?;

        debug!(
            "Found {} function declarations in {}",
            results.len(),
            self.file_path.display()
        );
        Ok(results)
    }

    fn collect(&self, root: &SyntaxNode, results: &mut Vec<FunctionDeclaration>) -> Result<()> {
        let mut stack = vec![root];

        while let Some(node) = stack.pop() {
            if node.kind == NodeKind::FunctionDecl {
                results.push(self.record(node)?);
                continue;
            }

            stack.extend(node.children.iter().rev());
        }

        Ok(())
    }

    fn record(&self, node: &SyntaxNode) -> Result<FunctionDeclaration> {
        let ty = node.ty.as_ref();
        let return_type = resolve_type_name(ty.and_then(|t| t.result()));
        let argument_types: Vec<String> = ty
            .map(|t| t.arguments().iter().map(|a| resolve_type_name(Some(a))).collect())
            .unwrap_or_default();
        let argument_names: Vec<String> = node
            .children
            .iter()
            .filter(|child| child.kind == NodeKind::ParmDecl)
            .map(|child| child.spelling.clone())
            .collect();

        if argument_names.len() != argument_types.len() {
            return Err(FeynmanError::Parse(format!(
                "{}: function '{}' has {} parameter declarations for {} argument types",
                self.file_path.display(),
                node.spelling,
                argument_names.len(),
                argument_types.len()
            )));
        }

        let declaration = FunctionDeclaration::new(
            node.spelling.clone(),
            return_type,
            argument_types,
            argument_names,
        )?;

        Ok(declaration.with_source(self.file_path.clone(), node.extent))
    }
}
