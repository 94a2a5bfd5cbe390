//! Canonical C spellings for front-end type descriptors

use super::syntax::{TypeDescriptor, TypeKind};

/// Standard C spelling for the primitive kinds
fn standard_spelling(kind: TypeKind) -> Option<&'static str> {
    let spelling = match kind {
        TypeKind::CharS => "char",
        TypeKind::SChar => "char",
        TypeKind::Void => "void",
        TypeKind::Bool => "bool",
        TypeKind::CharU => "unsigned char",
        TypeKind::UChar => "unsigned char",
        TypeKind::Char16 => "char16_t",
        TypeKind::Char32 => "char32_t",
        TypeKind::UShort => "unsigned short",
        TypeKind::UInt => "unsigned int",
        TypeKind::ULong => "unsigned long",
        TypeKind::ULongLong => "unsigned long long",
        TypeKind::UInt128 => "uint128_t",
        TypeKind::WChar => "wchar_t",
        TypeKind::Short => "short",
        TypeKind::Int => "int",
        TypeKind::Long => "long",
        TypeKind::LongLong => "long long",
        TypeKind::Int128 => "int128_t",
        TypeKind::Float => "float",
        TypeKind::Double => "double",
        TypeKind::LongDouble => "long double",
        TypeKind::NullPtr => "void *",
        _ => return None,
    };

    Some(spelling)
}

/// Map a type descriptor to its canonical C type name.
///
/// Typedefs are stripped first. Kinds outside the primitive table fall back to
/// the compiler's lowercase kind name (`pointer`, `record`, ...), so an exotic
/// type still yields some signature text. A missing or invalid descriptor
/// yields an empty string.
pub fn resolve_type_name(ty: Option<&TypeDescriptor>) -> String {
    let Some(ty) = ty else {
        return String::new();
    };

    let canonical_kind = ty.canonical().kind();
    if canonical_kind == TypeKind::Invalid {
        return String::new();
    }

    match standard_spelling(canonical_kind) {
        Some(name) => name.to_lowercase(),
        None => canonical_kind.name().to_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(kind: TypeKind) -> TypeDescriptor {
        TypeDescriptor::new(kind, "")
    }

    #[test]
    fn test_primitive_spellings() {
        assert_eq!(resolve_type_name(Some(&ty(TypeKind::Double))), "double");
        assert_eq!(resolve_type_name(Some(&ty(TypeKind::UInt))), "unsigned int");
        assert_eq!(resolve_type_name(Some(&ty(TypeKind::LongDouble))), "long double");
        assert_eq!(resolve_type_name(Some(&ty(TypeKind::SChar))), "char");
        assert_eq!(resolve_type_name(Some(&ty(TypeKind::NullPtr))), "void *");
        assert_eq!(resolve_type_name(Some(&ty(TypeKind::UInt128))), "uint128_t");
    }

    #[test]
    fn test_typedefs_are_stripped() {
        let underlying = ty(TypeKind::ULong);
        let size = TypeDescriptor::typedef("size_t", &underlying);
        assert_eq!(resolve_type_name(Some(&size)), "unsigned long");
    }

    #[test]
    fn test_unknown_kinds_fall_back_to_kind_name() {
        let pointer = TypeDescriptor::pointer_to(ty(TypeKind::Double));
        assert_eq!(resolve_type_name(Some(&pointer)), "pointer");
        assert_eq!(resolve_type_name(Some(&ty(TypeKind::Record))), "record");
        assert_eq!(resolve_type_name(Some(&ty(TypeKind::ConstantArray))), "constantarray");
    }

    #[test]
    fn test_degenerate_descriptors_are_empty() {
        assert_eq!(resolve_type_name(None), "");
        assert_eq!(resolve_type_name(Some(&ty(TypeKind::Invalid))), "");
    }
}
