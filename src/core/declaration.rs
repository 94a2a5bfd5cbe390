use std::cell::OnceCell;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FeynmanError, Result};

/// Source span of a declaration.
///
/// Lines and columns are 1-based. The end column is exclusive: the text of the
/// last line stops just before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeclarationExtent {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl DeclarationExtent {
    pub fn new(start_line: usize, start_column: usize, end_line: usize, end_column: usize) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// Cut the declaration out of the full file contents.
    ///
    /// Lines before the start line are skipped, whole lines are kept up to the
    /// end line, and the end line is truncated at the end column. The result is
    /// trimmed.
    pub fn slice(&self, source: &str) -> String {
        let mut text = String::new();

        for (index, line) in source.split_inclusive('\n').enumerate() {
            let line_number = index + 1;
            if line_number < self.start_line {
                continue;
            }
            if line_number < self.end_line {
                text.push_str(line);
            } else {
                let mut cut = self.end_column.saturating_sub(1).min(line.len());
                while !line.is_char_boundary(cut) {
                    cut -= 1;
                }
                text.push_str(&line[..cut]);
                break;
            }
        }

        text.trim().to_string()
    }
}

/// Whether captured declaration text is a bare prototype.
///
/// Purely textual: anything ending in `)` or `;` counts as a prototype.
pub fn is_prototype_text(text: &str) -> bool {
    let text = text.trim();
    text.ends_with(')') || text.ends_with(';')
}

/// Where an extracted declaration lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceBinding {
    pub file_path: PathBuf,
    pub extent: DeclarationExtent,
}

/// A C function signature, optionally bound to its place in a source file
#[derive(Debug, Clone)]
pub struct FunctionDeclaration {
    name: String,
    return_type: String,
    argument_types: Vec<String>,
    argument_names: Vec<String>,
    source: Option<SourceBinding>,
    text: OnceCell<String>,
    include_dependencies: Vec<String>,
}

impl FunctionDeclaration {
    /// Create an unbound declaration.
    ///
    /// An empty argument name means the parameter was not named in source.
    pub fn new(
        name: impl Into<String>,
        return_type: impl Into<String>,
        argument_types: Vec<String>,
        argument_names: Vec<String>,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(FeynmanError::Validation(
                "A function declaration must have a name".to_string(),
            ));
        }
        if argument_types.len() != argument_names.len() {
            return Err(FeynmanError::Validation(format!(
                "Function '{}' has {} argument types but {} argument names",
                name,
                argument_types.len(),
                argument_names.len()
            )));
        }

        Ok(Self {
            name,
            return_type: return_type.into(),
            argument_types,
            argument_names,
            source: None,
            text: OnceCell::new(),
            include_dependencies: Vec::new(),
        })
    }

    /// Bind the declaration to its span in `file_path`
    pub fn with_source(mut self, file_path: impl Into<PathBuf>, extent: DeclarationExtent) -> Self {
        self.source = Some(SourceBinding {
            file_path: file_path.into(),
            extent,
        });
        self
    }

    /// Supply the declaration text up front instead of reading it from source
    pub fn with_text(self, text: impl Into<String>) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(text.into());
        Self { text: cell, ..self }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn return_type(&self) -> &str {
        &self.return_type
    }

    pub fn argument_types(&self) -> &[String] {
        &self.argument_types
    }

    pub fn argument_names(&self) -> &[String] {
        &self.argument_names
    }

    pub fn arity(&self) -> usize {
        self.argument_types.len()
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.source.as_ref().map(|s| s.file_path.as_path())
    }

    pub fn extent(&self) -> Option<DeclarationExtent> {
        self.source.as_ref().map(|s| s.extent)
    }

    /// Source text of the declaration, if it can be recovered.
    ///
    /// Read from the bound file on first use and remembered afterwards. An
    /// unbound declaration or an unreadable file gives `None`.
    pub fn text(&self) -> Option<&str> {
        if let Some(text) = self.text.get() {
            return Some(text.as_str());
        }

        let binding = self.source.as_ref()?;
        let source = std::fs::read_to_string(&binding.file_path).ok()?;
        let text = binding.extent.slice(&source);

        Some(self.text.get_or_init(|| text).as_str())
    }

    /// Whether a function body was captured along with the signature
    pub fn has_body(&self) -> bool {
        match self.text() {
            Some(text) if !text.is_empty() => !is_prototype_text(text),
            _ => false,
        }
    }

    /// `<return_type> <name>(<type> <name>, ...)`, leaving out missing names
    pub fn signature(&self) -> String {
        format!("{} {}({})", self.return_type, self.name, self.parameter_list())
    }

    /// The comma-separated parameters of [`signature`](Self::signature)
    pub fn parameter_list(&self) -> String {
        self.argument_types
            .iter()
            .zip(&self.argument_names)
            .map(|(ty, name)| {
                if name.is_empty() {
                    ty.clone()
                } else {
                    format!("{} {}", ty, name)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn include_dependencies(&self) -> &[String] {
        &self.include_dependencies
    }

    /// Record a file to `#include` in generated code.
    ///
    /// Kept verbatim and in order; the same file may appear more than once.
    pub fn add_include_dependency(&mut self, dependency: &str) -> Result<()> {
        if dependency.trim().is_empty() {
            return Err(FeynmanError::Validation(
                "Dependency cannot be empty".to_string(),
            ));
        }

        self.include_dependencies.push(dependency.to_string());
        Ok(())
    }

    /// Record the declaration's own source file as an include dependency.
    ///
    /// The dependency is made of the last `number_of_components` segments of the
    /// file path, joined with `/`. Fewer segments are used when the path is
    /// shorter. Unbound declarations are left untouched.
    pub fn add_source_file_dependency(&mut self, number_of_components: usize) -> Result<()> {
        if number_of_components < 1 {
            return Err(FeynmanError::Validation(
                "You must use at least one path component in an include dependency".to_string(),
            ));
        }

        let Some(file_path) = self.file_path() else {
            return Ok(());
        };

        let segments: Vec<String> = file_path
            .components()
            .filter_map(|component| match component {
                Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        let first = segments.len().saturating_sub(number_of_components);
        let dependency = segments[first..].join("/");

        self.add_include_dependency(&dependency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn area() -> FunctionDeclaration {
        FunctionDeclaration::new(
            "area",
            "double",
            vec!["double".to_string()],
            vec!["radius".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_mismatched_arguments() {
        let err = FunctionDeclaration::new("f", "int", vec!["int".to_string()], vec![]).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_signature_omits_missing_names() {
        let decl = FunctionDeclaration::new(
            "scaled",
            "double",
            vec!["double".to_string(), "int".to_string()],
            vec!["value".to_string(), String::new()],
        )
        .unwrap();
        assert_eq!(decl.signature(), "double scaled(double value, int)");

        let empty = FunctionDeclaration::new("tick", "void", vec![], vec![]).unwrap();
        assert_eq!(empty.signature(), "void tick()");
    }

    #[test]
    fn test_extent_slice_truncates_last_line() {
        let source = "#include <math.h>\n\ndouble area(double radius);\nint other;\n";
        let extent = DeclarationExtent::new(3, 1, 3, 28);
        assert_eq!(extent.slice(source), "double area(double radius);");

        let shorter = DeclarationExtent::new(3, 1, 3, 27);
        assert_eq!(shorter.slice(source), "double area(double radius)");
    }

    #[test]
    fn test_extent_slice_cut_inside_a_character() {
        let source = "ab \u{e9};\n";
        assert_eq!(DeclarationExtent::new(1, 1, 1, 5).slice(source), "ab");
        assert_eq!(DeclarationExtent::new(1, 1, 1, 6).slice(source), "ab \u{e9}");
    }

    #[test]
    fn test_extent_slice_spans_lines() {
        let source = "double area(double radius)\n{\n    return radius;\n}\n";
        let extent = DeclarationExtent::new(1, 1, 4, 2);
        assert_eq!(extent.slice(source), "double area(double radius)\n{\n    return radius;\n}");
    }

    #[test]
    fn test_text_reads_bound_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "double area(double radius)\n{{\n    return radius;\n}}\n").unwrap();

        let decl = area().with_source(file.path(), DeclarationExtent::new(1, 1, 4, 2));
        assert!(decl.text().unwrap().starts_with("double area"));
        assert!(decl.has_body());
    }

    #[test]
    fn test_text_is_soft_without_source() {
        let unbound = area();
        assert_eq!(unbound.text(), None);
        assert!(!unbound.has_body());

        let missing = area().with_source("/nonexistent/feynman/area.h", DeclarationExtent::new(1, 1, 1, 10));
        assert_eq!(missing.text(), None);
        assert!(!missing.has_body());
    }

    #[test]
    fn test_has_body_is_textual() {
        assert!(!area().with_text("double area(double radius);").has_body());
        assert!(!area().with_text("double area(double radius)").has_body());
        assert!(area().with_text("double area(double radius) { return radius; }").has_body());
        // Known limitation: a stray semicolon after the body reads as a prototype
        assert!(!area().with_text("double area(double r) { return r; };").has_body());
    }

    #[test]
    fn test_include_dependencies_are_a_log() {
        let mut decl = area();
        decl.add_include_dependency("math.h").unwrap();
        decl.add_include_dependency("math.h").unwrap();
        decl.add_include_dependency("area.h").unwrap();
        assert_eq!(decl.include_dependencies(), &["math.h", "math.h", "area.h"]);

        assert!(decl.add_include_dependency("").unwrap_err().is_validation());
        assert!(decl.add_include_dependency("   ").unwrap_err().is_validation());
        assert_eq!(decl.include_dependencies().len(), 3);
    }

    #[test]
    fn test_source_file_dependency_components() {
        let extent = DeclarationExtent::new(1, 1, 1, 10);

        let mut single = area().with_source("resources/parsing_test_code.h", extent);
        single.add_source_file_dependency(1).unwrap();
        assert_eq!(single.include_dependencies(), &["parsing_test_code.h"]);

        let mut nested = area().with_source("/home/user/project/include/area.h", extent);
        nested.add_source_file_dependency(2).unwrap();
        assert_eq!(nested.include_dependencies(), &["include/area.h"]);

        let mut short = area().with_source("include/area.h", extent);
        short.add_source_file_dependency(5).unwrap();
        assert_eq!(short.include_dependencies(), &["include/area.h"]);
    }

    #[test]
    fn test_source_file_dependency_edge_cases() {
        let mut unbound = area();
        unbound.add_source_file_dependency(1).unwrap();
        assert!(unbound.include_dependencies().is_empty());

        assert!(unbound.add_source_file_dependency(0).unwrap_err().is_validation());
    }
}
