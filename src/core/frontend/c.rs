use std::collections::HashMap;

use tracing::debug;
use tree_sitter::{Node, Parser};

use crate::error::{FeynmanError, Result};
use super::FrontEnd;
use crate::core::declaration::DeclarationExtent;
use crate::core::syntax::{NodeKind, SyntaxNode, TypeDescriptor, TypeKind};

/// C front end using Tree-sitter
pub struct CFrontEnd {
    parser: Parser,
}

impl CFrontEnd {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let c_language = tree_sitter_c::language();
        parser
            .set_language(&c_language)
            .map_err(|e| FeynmanError::Parse(format!("Failed to set C language: {}", e)))?;

        Ok(Self { parser })
    }
}

impl FrontEnd for CFrontEnd {
    fn parse_source(&mut self, content: &str) -> Result<SyntaxNode> {
        let content = mask_cplusplus_regions(content);
        let tree = self
            .parser
            .parse(&content, None)
            .ok_or_else(|| FeynmanError::Parse("Failed to parse C code".to_string()))?;

        let root = tree.root_node();
        if root.has_error() {
            let line = first_error(root)
                .map(|node| node.start_position().row + 1)
                .unwrap_or(1);
            return Err(FeynmanError::Parse(format!("Syntax error near line {}", line)));
        }

        let mut lowering = Lowering::new(&content);
        let unit = lowering.translation_unit(root);
        debug!(
            "Lowered C translation unit with {} top-level nodes and {} typedefs",
            unit.children.len(),
            lowering.typedefs.len()
        );

        Ok(unit)
    }

    fn file_extensions(&self) -> &[&str] {
        &["c", "h", "cl"]
    }

    fn language_name(&self) -> &str {
        "c"
    }
}

/// Blank out the lines a C preprocessor would skip because `__cplusplus` is
/// undefined, such as the `extern "C" {` / `}` pair of a C++-aware header.
///
/// Directive lines stay in place and masked bytes become spaces, so line and
/// byte column positions are unchanged.
fn mask_cplusplus_regions(source: &str) -> String {
    // One entry per open conditional: whether its current branch is C++-only
    let mut conditionals: Vec<(bool, bool)> = Vec::new();
    let mut masked = String::with_capacity(source.len());
    let mut continued_directive = false;

    for line in source.split_inclusive('\n') {
        let body = line.trim_end_matches(['\n', '\r']);
        let is_directive = continued_directive || body.trim_start().starts_with('#');

        if is_directive {
            if !continued_directive {
                track_conditional(&mut conditionals, body);
            }
            continued_directive = body.ends_with('\\');
            masked.push_str(line);
            continue;
        }

        if conditionals.iter().any(|&(_, cplusplus_only)| cplusplus_only) {
            masked.extend(std::iter::repeat(' ').take(body.len()));
            masked.push_str(&line[body.len()..]);
        } else {
            masked.push_str(line);
        }
    }

    masked
}

/// Update the open conditionals for one preprocessor directive line.
///
/// Entries are `(tests __cplusplus, current branch is C++-only)`.
fn track_conditional(conditionals: &mut Vec<(bool, bool)>, directive: &str) {
    let directive = directive.trim_start().trim_start_matches('#').trim_start();
    let (word, argument) = directive
        .split_once(|c: char| c.is_whitespace() || c == '(')
        .map(|(word, _)| (word, directive[word.len()..].trim()))
        .unwrap_or((directive, ""));
    let condition: String = argument.chars().filter(|c| !c.is_whitespace()).collect();

    match word {
        "ifdef" => {
            let cplusplus = condition == "__cplusplus";
            conditionals.push((cplusplus, cplusplus));
        }
        "ifndef" => conditionals.push((condition == "__cplusplus", false)),
        "if" => {
            let cplusplus = matches!(
                condition.as_str(),
                "__cplusplus" | "defined(__cplusplus)" | "defined__cplusplus"
            );
            conditionals.push((cplusplus, cplusplus));
        }
        "else" => {
            if let Some((true, cplusplus_only)) = conditionals.last_mut() {
                *cplusplus_only = !*cplusplus_only;
            }
        }
        "elif" | "elifdef" | "elifndef" => {
            if let Some((true, cplusplus_only)) = conditionals.last_mut() {
                *cplusplus_only = false;
            }
        }
        "endif" => {
            conditionals.pop();
        }
        _ => {}
    }
}

/// Find the first error or missing node along the error path
fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }

    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error())
        .find_map(first_error)
}

/// Source span of a Tree-sitter node, converted to 1-based lines and columns
fn extent(node: Node) -> DeclarationExtent {
    let start = node.start_position();
    let end = node.end_position();
    DeclarationExtent::new(start.row + 1, start.column + 1, end.row + 1, end.column + 1)
}

/// Typedefs every C toolchain provides, with their LP64 widths
fn builtin_typedef(name: &str) -> Option<TypeKind> {
    let kind = match name {
        "int8_t" => TypeKind::SChar,
        "uint8_t" | "char8_t" => TypeKind::UChar,
        "int16_t" => TypeKind::Short,
        "uint16_t" => TypeKind::UShort,
        "int32_t" => TypeKind::Int,
        "uint32_t" => TypeKind::UInt,
        "int64_t" | "ssize_t" | "ptrdiff_t" | "intptr_t" => TypeKind::Long,
        "uint64_t" | "size_t" | "uintptr_t" => TypeKind::ULong,
        "wchar_t" => TypeKind::WChar,
        _ => return None,
    };

    Some(kind)
}

/// A declarator applied to its specifier type
struct Declared {
    name: String,
    ty: TypeDescriptor,
    /// Parameters of the function declarator nearest the name, if any
    parameters: Vec<SyntaxNode>,
}

/// Lowers a Tree-sitter C tree into a [`SyntaxNode`] tree
struct Lowering<'s> {
    source: &'s str,
    typedefs: HashMap<String, TypeDescriptor>,
}

impl<'s> Lowering<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            typedefs: HashMap::new(),
        }
    }

    fn text(&self, node: Node) -> &'s str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn translation_unit(&mut self, root: Node) -> SyntaxNode {
        let children = self.lower_children(root);
        SyntaxNode::new(NodeKind::TranslationUnit, "", extent(root)).with_children(children)
    }

    fn lower_children(&mut self, node: Node) -> Vec<SyntaxNode> {
        let mut lowered = Vec::new();
        let mut cursor = node.walk();
        let children: Vec<Node> = node.named_children(&mut cursor).collect();

        for child in children {
            match child.kind() {
                "function_definition" => lowered.extend(self.function_definition(child)),
                "declaration" => lowered.extend(self.declaration(child)),
                "type_definition" => lowered.extend(self.type_definition(child)),
                "preproc_if" | "preproc_ifdef" | "preproc_else" | "preproc_elif"
                | "preproc_elifdef" => {
                    let block = self.lower_children(child);
                    lowered.push(
                        SyntaxNode::new(NodeKind::PreprocessorBlock, "", extent(child))
                            .with_children(block),
                    );
                }
                "linkage_specification" | "declaration_list" => {
                    let block = self.lower_children(child);
                    lowered.push(
                        SyntaxNode::new(NodeKind::Unexposed, "", extent(child)).with_children(block),
                    );
                }
                _ => {}
            }
        }

        lowered
    }

    /// A function with its body
    fn function_definition(&self, node: Node) -> Option<SyntaxNode> {
        let base = self.specifier_type(node);
        let declared = self.declare(base, node.child_by_field_name("declarator"), Some(node));
        if declared.name.is_empty() || !declared.ty.canonical().kind().is_function() {
            return None;
        }

        let mut children = self.parameter_nodes(&declared, node);
        if let Some(body) = node.child_by_field_name("body") {
            let prototypes = self.block_prototypes(body);
            children.push(
                SyntaxNode::new(NodeKind::CompoundStmt, "", extent(body)).with_children(prototypes),
            );
        }

        Some(
            SyntaxNode::new(NodeKind::FunctionDecl, declared.name, extent(node))
                .with_type(declared.ty)
                .with_children(children),
        )
    }

    /// Function prototypes in a declaration; variables are dropped
    fn declaration(&self, node: Node) -> Vec<SyntaxNode> {
        let base = self.specifier_type(node);
        let mut cursor = node.walk();
        let declarators: Vec<Node> = node.children_by_field_name("declarator", &mut cursor).collect();

        declarators
            .into_iter()
            .filter_map(|declarator| {
                let declared = self.declare(base.clone(), Some(declarator), None);
                if declared.name.is_empty() || !declared.ty.canonical().kind().is_function() {
                    return None;
                }

                let children = self.parameter_nodes(&declared, node);
                Some(
                    SyntaxNode::new(NodeKind::FunctionDecl, declared.name, extent(node))
                        .with_type(declared.ty)
                        .with_children(children),
                )
            })
            .collect()
    }

    fn type_definition(&mut self, node: Node) -> Vec<SyntaxNode> {
        let base = self.specifier_type(node);
        let mut cursor = node.walk();
        let declarators: Vec<Node> = node.children_by_field_name("declarator", &mut cursor).collect();

        let mut lowered = Vec::new();
        for declarator in declarators {
            let declared = self.declare(base.clone(), Some(declarator), None);
            if declared.name.is_empty() {
                continue;
            }

            let alias = TypeDescriptor::typedef(declared.name.clone(), &declared.ty);
            self.typedefs.insert(declared.name.clone(), alias.clone());
            lowered.push(
                SyntaxNode::new(NodeKind::TypedefDecl, declared.name, extent(node)).with_type(alias),
            );
        }

        lowered
    }

    /// Prototypes declared directly inside a function body
    fn block_prototypes(&self, body: Node) -> Vec<SyntaxNode> {
        let mut cursor = body.walk();
        let statements: Vec<Node> = body.named_children(&mut cursor).collect();

        statements
            .into_iter()
            .filter(|statement| statement.kind() == "declaration")
            .flat_map(|statement| self.declaration(statement))
            .collect()
    }

    /// Parameter declaration nodes for a function.
    ///
    /// A function declared through a typedef'd function type has no parameter
    /// list of its own, so unnamed parameters are synthesized from its type.
    fn parameter_nodes(&self, declared: &Declared, node: Node) -> Vec<SyntaxNode> {
        if !declared.parameters.is_empty() || declared.ty.arguments().is_empty() {
            return declared.parameters.clone();
        }

        declared
            .ty
            .arguments()
            .iter()
            .map(|argument| {
                SyntaxNode::new(NodeKind::ParmDecl, "", extent(node)).with_type(argument.clone())
            })
            .collect()
    }

    /// The type named by a node's specifiers; implicit `int` when absent
    fn specifier_type(&self, node: Node) -> TypeDescriptor {
        match node.child_by_field_name("type") {
            Some(type_node) => self.base_type(type_node),
            None => TypeDescriptor::new(TypeKind::Int, "int"),
        }
    }

    fn base_type(&self, type_node: Node) -> TypeDescriptor {
        let text = self.text(type_node);
        match type_node.kind() {
            "primitive_type" => primitive_type(text),
            "sized_type_specifier" => sized_type(text),
            "type_identifier" => self.named_type(text),
            "struct_specifier" | "union_specifier" | "enum_specifier" => {
                let keyword = type_node.kind().trim_end_matches("_specifier");
                let name = type_node
                    .child_by_field_name("name")
                    .map(|n| self.text(n))
                    .unwrap_or("");
                let kind = if keyword == "enum" {
                    TypeKind::Enum
                } else {
                    TypeKind::Record
                };
                TypeDescriptor::new(kind, format!("{} {}", keyword, name).trim_end().to_string())
            }
            _ => TypeDescriptor::new(TypeKind::Unexposed, text),
        }
    }

    fn named_type(&self, name: &str) -> TypeDescriptor {
        if let Some(alias) = self.typedefs.get(name) {
            return alias.clone();
        }
        // The grammar reads C99 `_Bool` as an identifier
        if name == "_Bool" {
            return TypeDescriptor::new(TypeKind::Bool, name);
        }

        match builtin_typedef(name) {
            Some(kind) => TypeDescriptor::typedef(name, &TypeDescriptor::new(kind, name)),
            None => TypeDescriptor::new(TypeKind::Unexposed, name),
        }
    }

    /// Apply a declarator to `base`, from the outside in.
    ///
    /// `definition` is the enclosing function definition, used to type K&R
    /// parameter lists.
    fn declare(&self, base: TypeDescriptor, declarator: Option<Node>, definition: Option<Node>) -> Declared {
        let mut ty = base;
        let mut name = String::new();
        let mut parameters = Vec::new();
        let mut current = declarator;

        while let Some(node) = current {
            current = match node.kind() {
                "pointer_declarator" | "abstract_pointer_declarator" => {
                    ty = TypeDescriptor::pointer_to(ty);
                    node.child_by_field_name("declarator")
                }
                "array_declarator" | "abstract_array_declarator" => {
                    let sized = node.child_by_field_name("size").is_some();
                    ty = TypeDescriptor::array_of(ty, sized);
                    node.child_by_field_name("declarator")
                }
                "function_declarator" | "abstract_function_declarator" => {
                    let (params, prototyped) =
                        self.parameters(node.child_by_field_name("parameters"), definition);
                    let arguments = params.iter().filter_map(|p| p.ty.clone()).collect();
                    ty = TypeDescriptor::function(ty, arguments, prototyped);
                    parameters = params;
                    node.child_by_field_name("declarator")
                }
                "init_declarator" => node.child_by_field_name("declarator"),
                "parenthesized_declarator" | "abstract_parenthesized_declarator" => {
                    let mut cursor = node.walk();
                    let mut inner = node.named_children(&mut cursor);
                    inner.find(|child| child.kind() != "comment")
                }
                "identifier" | "type_identifier" | "field_identifier" => {
                    name = self.text(node).to_string();
                    None
                }
                _ => None,
            };
        }

        Declared {
            name,
            ty,
            parameters,
        }
    }

    /// Lower a parameter list.
    ///
    /// Returns the parameter declarations and whether the list was a prototype.
    /// `()` is not a prototype; `(void)` is a prototype with no parameters.
    fn parameters(&self, list: Option<Node>, definition: Option<Node>) -> (Vec<SyntaxNode>, bool) {
        let Some(list) = list else {
            return (Vec::new(), false);
        };

        let mut cursor = list.walk();
        let entries: Vec<Node> = list
            .named_children(&mut cursor)
            .filter(|child| child.kind() != "comment")
            .collect();
        if entries.is_empty() {
            return (Vec::new(), false);
        }

        if entries.iter().any(|entry| entry.kind() == "identifier") {
            return (self.knr_parameters(&entries, definition), false);
        }

        let mut lowered = Vec::new();
        for entry in &entries {
            if entry.kind() != "parameter_declaration" {
                // variadic_parameter
                continue;
            }

            let base = self.specifier_type(*entry);
            let declarator = entry.child_by_field_name("declarator");
            if entries.len() == 1 && declarator.is_none() && base.canonical().kind() == TypeKind::Void {
                return (Vec::new(), true);
            }

            let declared = self.declare(base, declarator, None);
            lowered.push(
                SyntaxNode::new(NodeKind::ParmDecl, declared.name, extent(*entry))
                    .with_type(declared.ty.decayed()),
            );
        }

        (lowered, true)
    }

    /// Old-style parameters typed by the declarations before the body
    fn knr_parameters(&self, entries: &[Node], definition: Option<Node>) -> Vec<SyntaxNode> {
        let mut declared_types: HashMap<String, TypeDescriptor> = HashMap::new();

        if let Some(definition) = definition {
            let mut cursor = definition.walk();
            let declarations: Vec<Node> = definition
                .named_children(&mut cursor)
                .filter(|child| child.kind() == "declaration")
                .collect();

            for declaration in declarations {
                let base = self.specifier_type(declaration);
                let mut inner = declaration.walk();
                let declarators: Vec<Node> =
                    declaration.children_by_field_name("declarator", &mut inner).collect();
                for declarator in declarators {
                    let declared = self.declare(base.clone(), Some(declarator), None);
                    declared_types.insert(declared.name, declared.ty.decayed());
                }
            }
        }

        entries
            .iter()
            .filter(|entry| entry.kind() == "identifier")
            .map(|entry| {
                let name = self.text(*entry).to_string();
                let ty = declared_types
                    .get(&name)
                    .cloned()
                    .unwrap_or_else(|| TypeDescriptor::new(TypeKind::Int, "int"));
                SyntaxNode::new(NodeKind::ParmDecl, name, extent(*entry)).with_type(ty)
            })
            .collect()
    }
}

fn primitive_type(text: &str) -> TypeDescriptor {
    let kind = match text {
        "void" => TypeKind::Void,
        "bool" | "_Bool" => TypeKind::Bool,
        "char" => TypeKind::CharS,
        "int" => TypeKind::Int,
        "float" => TypeKind::Float,
        "double" => TypeKind::Double,
        "char16_t" => TypeKind::Char16,
        "char32_t" => TypeKind::Char32,
        "nullptr_t" => TypeKind::NullPtr,
        other => {
            return match builtin_typedef(other) {
                Some(kind) => TypeDescriptor::typedef(other, &TypeDescriptor::new(kind, other)),
                None => TypeDescriptor::new(TypeKind::Unexposed, other),
            };
        }
    };

    TypeDescriptor::new(kind, text)
}

/// Types spelled with `signed`, `unsigned`, `short` or `long`
fn sized_type(text: &str) -> TypeDescriptor {
    let mut unsigned = false;
    let mut signed = false;
    let mut shorts = 0;
    let mut longs = 0;
    let mut base = "";

    for word in text.split_whitespace() {
        match word {
            "unsigned" => unsigned = true,
            "signed" => signed = true,
            "short" => shorts += 1,
            "long" => longs += 1,
            other => base = other,
        }
    }

    let kind = match base {
        "double" if longs > 0 => TypeKind::LongDouble,
        "double" => TypeKind::Double,
        "char" if unsigned => TypeKind::UChar,
        "char" if signed => TypeKind::SChar,
        "char" => TypeKind::CharS,
        "__int128" if unsigned => TypeKind::UInt128,
        "__int128" => TypeKind::Int128,
        _ if shorts > 0 && unsigned => TypeKind::UShort,
        _ if shorts > 0 => TypeKind::Short,
        _ if longs >= 2 && unsigned => TypeKind::ULongLong,
        _ if longs >= 2 => TypeKind::LongLong,
        _ if longs == 1 && unsigned => TypeKind::ULong,
        _ if longs == 1 => TypeKind::Long,
        _ if unsigned => TypeKind::UInt,
        _ => TypeKind::Int,
    };

    TypeDescriptor::new(kind, text)
}
