//! Debuggee value model
//!
//! A `DebugValue` is a serializable snapshot of one runtime value as the
//! inspection layer sees it: its declared type, its shape (null, primitive,
//! string, object with members, array with dimensions) and, for values that
//! wrap a native COM object, the interface pointer behind the wrapper.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a runtime type, by display name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeRef(String);

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Display name of the type
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Member visibility as reported by the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    NonPublic,
}

/// A field or property of an object value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub declared_type: TypeRef,
    #[serde(default)]
    pub is_property: bool,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub visibility: Visibility,
    pub value: DebugValue,
}

impl Member {
    /// Create a public, writable instance field
    pub fn field(name: impl Into<String>, value: DebugValue) -> Self {
        Self {
            name: name.into(),
            declared_type: value.type_ref.clone(),
            is_property: false,
            is_static: false,
            read_only: false,
            visibility: Visibility::Public,
            value,
        }
    }

    /// Create a public, read-only instance property
    pub fn property(name: impl Into<String>, value: DebugValue) -> Self {
        Self {
            is_property: true,
            read_only: true,
            ..Self::field(name, value)
        }
    }

    pub fn with_declared_type(mut self, declared_type: impl Into<TypeRef>) -> Self {
        self.declared_type = declared_type.into();
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn into_static(mut self) -> Self {
        self.is_static = true;
        self
    }
}

/// One dimension of an array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub length: usize,
    #[serde(default)]
    pub lower_bound: i64,
}

impl Dimension {
    pub fn new(length: usize) -> Self {
        Self {
            length,
            lower_bound: 0,
        }
    }
}

/// Shape of a value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueKind {
    Null,
    Primitive {
        text: String,
    },
    String {
        text: String,
    },
    Object {
        #[serde(default)]
        members: Vec<Member>,
    },
    /// Elements are stored flat, in row-major order. An empty `dimensions`
    /// list means a single zero-based dimension covering every element.
    Array {
        element_type: TypeRef,
        #[serde(default)]
        dimensions: Vec<Dimension>,
        #[serde(default)]
        elements: Vec<DebugValue>,
    },
}

/// A runtime value under inspection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugValue {
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    pub data: ValueKind,
    /// Native interface pointer for runtime-callable wrappers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_com_pointer: Option<u64>,
}

impl DebugValue {
    pub fn new(type_ref: impl Into<TypeRef>, data: ValueKind) -> Self {
        Self {
            type_ref: type_ref.into(),
            data,
            native_com_pointer: None,
        }
    }

    pub fn null(type_ref: impl Into<TypeRef>) -> Self {
        Self::new(type_ref, ValueKind::Null)
    }

    pub fn primitive(type_ref: impl Into<TypeRef>, text: impl Into<String>) -> Self {
        Self::new(type_ref, ValueKind::Primitive { text: text.into() })
    }

    pub fn string(text: impl Into<String>) -> Self {
        Self::new("String", ValueKind::String { text: text.into() })
    }

    pub fn object(type_ref: impl Into<TypeRef>, members: Vec<Member>) -> Self {
        Self::new(type_ref, ValueKind::Object { members })
    }

    /// One-dimensional, zero-based array
    pub fn array(element_type: impl Into<TypeRef>, elements: Vec<DebugValue>) -> Self {
        let element_type = element_type.into();
        let type_ref = TypeRef::new(format!("{}[]", element_type));
        Self::new(
            type_ref,
            ValueKind::Array {
                element_type,
                dimensions: Vec::new(),
                elements,
            },
        )
    }

    /// Multi-dimensional array with explicit bounds
    pub fn multi_array(
        element_type: impl Into<TypeRef>,
        dimensions: Vec<Dimension>,
        elements: Vec<DebugValue>,
    ) -> Self {
        let element_type = element_type.into();
        let commas = ",".repeat(dimensions.len().saturating_sub(1));
        let type_ref = TypeRef::new(format!("{}[{}]", element_type, commas));
        Self::new(
            type_ref,
            ValueKind::Array {
                element_type,
                dimensions,
                elements,
            },
        )
    }

    pub fn with_native_com_pointer(mut self, pointer: u64) -> Self {
        self.native_com_pointer = Some(pointer);
        self
    }

    pub fn is_null(&self) -> bool {
        matches!(self.data, ValueKind::Null)
    }

    /// Members of an object value, empty for every other shape
    pub fn members(&self) -> &[Member] {
        match &self.data {
            ValueKind::Object { members } => members,
            _ => &[],
        }
    }

    /// Effective dimensions of an array value, `None` for other shapes
    pub fn array_dimensions(&self) -> Option<Vec<Dimension>> {
        match &self.data {
            ValueKind::Array {
                dimensions,
                elements,
                ..
            } => {
                if dimensions.is_empty() {
                    Some(vec![Dimension::new(elements.len())])
                } else {
                    Some(dimensions.clone())
                }
            }
            _ => None,
        }
    }

    /// Text a user could edit in place: primitives and strings only
    pub fn editable_text(&self) -> Option<String> {
        match &self.data {
            ValueKind::Primitive { text } => Some(text.clone()),
            ValueKind::String { text } => Some(format!("{:?}", text)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_type_names() {
        let single = DebugValue::array("Int32", vec![]);
        assert_eq!(single.type_ref.name(), "Int32[]");

        let grid = DebugValue::multi_array(
            "Int32",
            vec![Dimension::new(2), Dimension::new(3)],
            vec![],
        );
        assert_eq!(grid.type_ref.name(), "Int32[,]");
    }

    #[test]
    fn test_default_dimensions_cover_elements() {
        let value = DebugValue::array(
            "Int32",
            vec![
                DebugValue::primitive("Int32", "1"),
                DebugValue::primitive("Int32", "2"),
            ],
        );
        assert_eq!(value.array_dimensions(), Some(vec![Dimension::new(2)]));
        assert_eq!(DebugValue::string("x").array_dimensions(), None);
    }

    #[test]
    fn test_deserialize_com_object() {
        let json = r#"{
            "type": "System.__ComObject",
            "data": { "kind": "object" },
            "native_com_pointer": 43981
        }"#;
        let value: DebugValue = serde_json::from_str(json).unwrap();
        assert_eq!(value.native_com_pointer, Some(0xABCD));
        assert!(value.members().is_empty());
    }

    #[test]
    fn test_editable_text() {
        assert_eq!(
            DebugValue::primitive("Int32", "7").editable_text(),
            Some("7".to_string())
        );
        assert_eq!(
            DebugValue::string("a\"b").editable_text(),
            Some("\"a\\\"b\"".to_string())
        );
        assert_eq!(DebugValue::null("Object").editable_text(), None);
    }
}
