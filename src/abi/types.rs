//! Tagged interface description model.
//!
//! Items are tagged by their JSON `type` field. Parameter types are parsed
//! once into [`ParamType`], so deciding whether a parameter is encrypted is a
//! match on the tag rather than a string check at every use site.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Fixed-size wire type of every encrypted value.
pub const WIRE_TYPE: &str = "bytes32";

/// One entry of an interface description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InterfaceItem {
    Function(FunctionItem),
    Constructor(ConstructorItem),
    Event(OtherItem),
    Error(OtherItem),
    Fallback(OtherItem),
    Receive(OtherItem),
}

/// A function descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionItem {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<Param>,
    #[serde(default)]
    pub outputs: Vec<Param>,
    /// `stateMutability` and any other keys, carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A constructor descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorItem {
    #[serde(default)]
    pub inputs: Vec<Param>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Events, errors, fallback and receive entries. Never rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtherItem {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// A typed parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ParamType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Param>,
    /// `internalType`, `indexed` and other keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: &str) -> Self {
        Self {
            name: name.into(),
            ty: ParamType::parse(ty),
            components: Vec::new(),
            extra: Map::new(),
        }
    }
}

/// Family of an encrypted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncryptedKind {
    Bool,
    /// Unsigned integer of the given bit width.
    Uint(u16),
}

/// An encrypted value type, either a stored ciphertext (`euint64`) or an
/// externally supplied input (`externalEuint64`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncryptedType {
    pub kind: EncryptedKind,
    pub external: bool,
}

impl EncryptedType {
    fn parse(base: &str) -> Option<Self> {
        let (external, rest) = match base.strip_prefix("external") {
            Some(rest) => (true, rest.strip_prefix('E')?.to_string()),
            None => (false, base.strip_prefix('e')?.to_string()),
        };

        let kind = if rest == "bool" {
            EncryptedKind::Bool
        } else {
            let bits = rest.strip_prefix("uint")?;
            if bits.is_empty() || !bits.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            // A width beyond u16 names no encrypted type; leave it as written.
            EncryptedKind::Uint(bits.parse().ok()?)
        };

        Some(Self { kind, external })
    }
}

impl fmt::Display for EncryptedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = match self.kind {
            EncryptedKind::Bool => "bool".to_string(),
            EncryptedKind::Uint(bits) => format!("uint{}", bits),
        };
        if self.external {
            write!(f, "externalE{}", body)
        } else {
            write!(f, "e{}", body)
        }
    }
}

/// A parameter type tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ParamType {
    /// Encrypted value, with any array suffix (`[]`, `[3][]`) kept aside.
    Encrypted {
        ty: EncryptedType,
        array_suffix: String,
    },
    /// Any other ABI type, verbatim.
    Plain(String),
}

impl ParamType {
    pub fn parse(raw: &str) -> Self {
        let split = raw.find('[').unwrap_or(raw.len());
        let (base, suffix) = raw.split_at(split);
        match EncryptedType::parse(base) {
            Some(ty) => ParamType::Encrypted {
                ty,
                array_suffix: suffix.to_string(),
            },
            None => ParamType::Plain(raw.to_string()),
        }
    }

    pub fn is_encrypted(&self) -> bool {
        matches!(self, ParamType::Encrypted { .. })
    }

    /// The type used on the wire.
    pub fn wire(&self) -> ParamType {
        match self {
            ParamType::Encrypted { array_suffix, .. } => {
                ParamType::Plain(format!("{}{}", WIRE_TYPE, array_suffix))
            }
            ParamType::Plain(_) => self.clone(),
        }
    }
}

impl From<String> for ParamType {
    fn from(raw: String) -> Self {
        ParamType::parse(&raw)
    }
}

impl From<ParamType> for String {
    fn from(ty: ParamType) -> Self {
        ty.to_string()
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Encrypted { ty, array_suffix } => write!(f, "{}{}", ty, array_suffix),
            ParamType::Plain(raw) => f.write_str(raw),
        }
    }
}
