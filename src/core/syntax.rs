//! Front-end neutral syntax tree
//!
//! Front ends lower whatever their parser produces into this tree: a node kind,
//! the node's spelling, an optional type descriptor, the node's source extent
//! and its ordered children. Nothing downstream of the front end knows which
//! parser built the tree.

use super::declaration::DeclarationExtent;

/// Kind tag of a syntax node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    TranslationUnit,
    FunctionDecl,
    ParmDecl,
    TypedefDecl,
    CompoundStmt,
    /// `#if`/`#ifdef`/`#else` region, e.g. a header's include guard
    PreprocessorBlock,
    Unexposed,
}

/// Canonical kind of a type, mirroring the kinds a C compiler reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Invalid,
    Unexposed,
    Void,
    Bool,
    CharU,
    UChar,
    Char16,
    Char32,
    UShort,
    UInt,
    ULong,
    ULongLong,
    UInt128,
    CharS,
    SChar,
    WChar,
    Short,
    Int,
    Long,
    LongLong,
    Int128,
    Float,
    Double,
    LongDouble,
    NullPtr,
    Pointer,
    Record,
    Enum,
    Typedef,
    ConstantArray,
    IncompleteArray,
    FunctionProto,
    FunctionNoProto,
}

impl TypeKind {
    /// The compiler's own name for the kind
    pub fn name(&self) -> &'static str {
        match self {
            TypeKind::Invalid => "Invalid",
            TypeKind::Unexposed => "Unexposed",
            TypeKind::Void => "Void",
            TypeKind::Bool => "Bool",
            TypeKind::CharU => "Char_U",
            TypeKind::UChar => "UChar",
            TypeKind::Char16 => "Char16",
            TypeKind::Char32 => "Char32",
            TypeKind::UShort => "UShort",
            TypeKind::UInt => "UInt",
            TypeKind::ULong => "ULong",
            TypeKind::ULongLong => "ULongLong",
            TypeKind::UInt128 => "UInt128",
            TypeKind::CharS => "Char_S",
            TypeKind::SChar => "SChar",
            TypeKind::WChar => "WChar",
            TypeKind::Short => "Short",
            TypeKind::Int => "Int",
            TypeKind::Long => "Long",
            TypeKind::LongLong => "LongLong",
            TypeKind::Int128 => "Int128",
            TypeKind::Float => "Float",
            TypeKind::Double => "Double",
            TypeKind::LongDouble => "LongDouble",
            TypeKind::NullPtr => "NullPtr",
            TypeKind::Pointer => "Pointer",
            TypeKind::Record => "Record",
            TypeKind::Enum => "Enum",
            TypeKind::Typedef => "Typedef",
            TypeKind::ConstantArray => "ConstantArray",
            TypeKind::IncompleteArray => "IncompleteArray",
            TypeKind::FunctionProto => "FunctionProto",
            TypeKind::FunctionNoProto => "FunctionNoProto",
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self, TypeKind::FunctionProto | TypeKind::FunctionNoProto)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeKind::ConstantArray | TypeKind::IncompleteArray)
    }
}

/// A type as reported by the front end
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    kind: TypeKind,
    spelling: String,
    canonical: Option<Box<TypeDescriptor>>,
    pointee: Option<Box<TypeDescriptor>>,
    result: Option<Box<TypeDescriptor>>,
    arguments: Vec<TypeDescriptor>,
}

impl TypeDescriptor {
    pub fn new(kind: TypeKind, spelling: impl Into<String>) -> Self {
        Self {
            kind,
            spelling: spelling.into(),
            canonical: None,
            pointee: None,
            result: None,
            arguments: Vec::new(),
        }
    }

    /// A typedef named `name` standing for `underlying`
    pub fn typedef(name: impl Into<String>, underlying: &TypeDescriptor) -> Self {
        let mut ty = Self::new(TypeKind::Typedef, name);
        ty.canonical = Some(Box::new(underlying.canonical().clone()));
        ty
    }

    pub fn pointer_to(pointee: TypeDescriptor) -> Self {
        let mut ty = Self::new(TypeKind::Pointer, format!("{} *", pointee.spelling));
        ty.pointee = Some(Box::new(pointee));
        ty
    }

    pub fn array_of(element: TypeDescriptor, sized: bool) -> Self {
        let kind = if sized {
            TypeKind::ConstantArray
        } else {
            TypeKind::IncompleteArray
        };
        let mut ty = Self::new(kind, format!("{} []", element.spelling));
        ty.pointee = Some(Box::new(element));
        ty
    }

    pub fn function(result: TypeDescriptor, arguments: Vec<TypeDescriptor>, prototyped: bool) -> Self {
        let kind = if prototyped {
            TypeKind::FunctionProto
        } else {
            TypeKind::FunctionNoProto
        };
        let mut ty = Self::new(kind, format!("{} ()", result.spelling));
        ty.result = Some(Box::new(result));
        ty.arguments = arguments;
        ty
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn spelling(&self) -> &str {
        &self.spelling
    }

    /// The type with every typedef layer removed
    pub fn canonical(&self) -> &TypeDescriptor {
        match &self.canonical {
            Some(canonical) => canonical,
            None => self,
        }
    }

    /// Result type of a function type
    pub fn result(&self) -> Option<&TypeDescriptor> {
        self.canonical().result.as_deref()
    }

    /// Formal parameter types of a function type, in declaration order
    pub fn arguments(&self) -> &[TypeDescriptor] {
        &self.canonical().arguments
    }

    /// Parameter type after array-to-pointer and function-to-pointer decay
    pub fn decayed(self) -> TypeDescriptor {
        let canonical = self.canonical();
        if canonical.kind.is_array() {
            let element = canonical
                .pointee
                .as_deref()
                .cloned()
                .unwrap_or_else(|| TypeDescriptor::new(TypeKind::Invalid, ""));
            TypeDescriptor::pointer_to(element)
        } else if canonical.kind.is_function() {
            TypeDescriptor::pointer_to(canonical.clone())
        } else {
            self
        }
    }
}

/// One node of the lowered syntax tree
#[derive(Debug, Clone)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub spelling: String,
    pub ty: Option<TypeDescriptor>,
    pub extent: DeclarationExtent,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind, spelling: impl Into<String>, extent: DeclarationExtent) -> Self {
        Self {
            kind,
            spelling: spelling.into(),
            ty: None,
            extent,
            children: Vec::new(),
        }
    }

    pub fn with_type(mut self, ty: TypeDescriptor) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn with_children(mut self, children: Vec<SyntaxNode>) -> Self {
        self.children = children;
        self
    }
}
