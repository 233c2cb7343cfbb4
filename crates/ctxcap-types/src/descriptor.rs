use std::fmt;

use serde::{Serialize, Serializer};

use crate::value::{Value, ValueKind};

/// Type tag recorded in a [`TypeDescriptor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeName {
    Known(ValueKind),
    /// An absent slot with no static type information.
    Unknown,
}

impl TypeName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Known(kind) => kind.as_str(),
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TypeName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl From<ValueKind> for TypeName {
    fn from(kind: ValueKind) -> Self {
        Self::Known(kind)
    }
}

/// Optional-ness plus concrete type tag of a value slot.
///
/// Two descriptors agree only when both fields match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TypeDescriptor {
    pub is_optional: bool,
    pub type_name: TypeName,
}

impl TypeDescriptor {
    /// Describe a value slot, unwrapping exactly one level.
    ///
    /// - present value: not optional, its own tag
    /// - absent with a known wrapped type: optional, the wrapped tag
    /// - absent with nothing known: optional, `unknown`
    pub fn of(slot: &Value) -> Self {
        match slot {
            Value::Null(Some(kind)) => Self::optional(*kind),
            Value::Null(None) => Self {
                is_optional: true,
                type_name: TypeName::Unknown,
            },
            present => Self {
                is_optional: false,
                type_name: present
                    .kind()
                    .map_or(TypeName::Unknown, TypeName::Known),
            },
        }
    }

    pub fn required(kind: ValueKind) -> Self {
        Self {
            is_optional: false,
            type_name: TypeName::Known(kind),
        }
    }

    pub fn optional(kind: ValueKind) -> Self {
        Self {
            is_optional: true,
            type_name: TypeName::Known(kind),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_optional {
            write!(f, "Optional {}", self.type_name)
        } else {
            write!(f, "{}", self.type_name)
        }
    }
}
