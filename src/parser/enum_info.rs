use serde::Serialize;

use crate::error::Error;

/// One member of an enum directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumValue {
    /// Symbolic member name, taken verbatim from the directive entry
    pub name: String,
    /// Literal underlying value as rendered into the companion file
    /// (already quoted for textual base types)
    pub value: String,
}

/// Closed set of underlying representations an enum may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseKind {
    Textual,
    Integral,
    Floating,
    Boolean,
}

/// The underlying type of an enum: the identifier as written in the source
/// (the template needs it verbatim, e.g. `int64`) plus its resolved category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaseType {
    pub name: String,
    pub kind: BaseKind,
}

impl BaseType {
    /// Resolves a plain identifier into a base type. Identifiers outside the
    /// recognized scalar set fail with `UnsupportedBaseType`.
    pub fn resolve(type_name: &str, ident: &str) -> Result<Self, Error> {
        let kind = match ident {
            "string" => BaseKind::Textual,
            "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8" | "uint16"
            | "uint32" | "uint64" | "byte" | "rune" | "uintptr" => BaseKind::Integral,
            "float32" | "float64" => BaseKind::Floating,
            "bool" => BaseKind::Boolean,
            _ => {
                return Err(Error::UnsupportedBaseType {
                    type_name: type_name.to_string(),
                    base: ident.to_string(),
                })
            }
        };
        Ok(Self {
            name: ident.to_string(),
            kind,
        })
    }
}

/// Metadata extracted from one annotated type declaration. Built once per
/// run and consumed exactly once by the generator.
#[derive(Debug, Clone, Serialize)]
pub struct EnumInfo {
    /// Name of the annotated type (e.g. "Color")
    pub type_name: String,
    /// Underlying scalar representation
    pub base_type: BaseType,
    /// Members in directive declaration order
    pub values: Vec<EnumValue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_scalar_families() {
        assert_eq!(BaseType::resolve("T", "string").unwrap().kind, BaseKind::Textual);
        assert_eq!(BaseType::resolve("T", "int").unwrap().kind, BaseKind::Integral);
        assert_eq!(BaseType::resolve("T", "uintptr").unwrap().kind, BaseKind::Integral);
        assert_eq!(BaseType::resolve("T", "byte").unwrap().kind, BaseKind::Integral);
        assert_eq!(BaseType::resolve("T", "float32").unwrap().kind, BaseKind::Floating);
        assert_eq!(BaseType::resolve("T", "bool").unwrap().kind, BaseKind::Boolean);
    }

    #[test]
    fn test_resolve_keeps_identifier() {
        let base = BaseType::resolve("Status", "int64").unwrap();
        assert_eq!(base.name, "int64");
        assert_eq!(base.kind, BaseKind::Integral);
    }

    #[test]
    fn test_reject_unknown_identifier() {
        let err = BaseType::resolve("Status", "myAlias").unwrap_err();
        assert!(matches!(err, Error::UnsupportedBaseType { .. }));
    }
}
