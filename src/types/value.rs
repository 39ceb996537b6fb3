//! AVM value types
//!
//! [`AvmValue`] is what callers assign to and read from a metadata tree.
//! [`WireValue`] is the XML shape a field takes inside a packet, and
//! [`FieldKey`] names a field on the wire.

use crate::core::namespace::AvmNamespace;
use crate::utils::datetime::AvmDateTime;
use std::fmt;

/// A metadata value
///
/// Values are normalized by the field they are assigned to: string fields
/// hold `String`, float fields `Float`, list fields a `List` of `String`
/// (with `"-"` for an empty slot) or of `Float`/`Null`.
#[derive(Debug, Clone, PartialEq)]
pub enum AvmValue {
    /// No value; inside a list, an empty slot
    Null,
    /// Text value
    String(String),
    /// Floating point value
    Float(f64),
    /// Date/time value, stored as ISO 8601 text once normalized
    DateTime(AvmDateTime),
    /// Ordered sequence of values
    List(Vec<AvmValue>),
}

impl AvmValue {
    /// Get the value as a string, if it is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AvmValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as a float, if it is a float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            AvmValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the list items, if this is a list
    pub fn as_list(&self) -> Option<&[AvmValue]> {
        match self {
            AvmValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get the items of a list of strings
    pub fn as_string_list(&self) -> Option<Vec<&str>> {
        self.as_list()?.iter().map(|item| item.as_str()).collect()
    }

    /// Get the items of a list of floats, with `None` for empty slots
    pub fn as_float_list(&self) -> Option<Vec<Option<f64>>> {
        self.as_list()?
            .iter()
            .map(|item| match item {
                AvmValue::Float(v) => Some(Some(*v)),
                AvmValue::Null => Some(None),
                _ => None,
            })
            .collect()
    }

    /// Whether this is `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, AvmValue::Null)
    }

    /// Whether the value carries nothing: `Null`, an empty string or an empty list
    pub fn is_empty(&self) -> bool {
        match self {
            AvmValue::Null => true,
            AvmValue::String(s) => s.is_empty(),
            AvmValue::List(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Short name of the variant, for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            AvmValue::Null => "null",
            AvmValue::String(_) => "string",
            AvmValue::Float(_) => "float",
            AvmValue::DateTime(_) => "date",
            AvmValue::List(_) => "list",
        }
    }
}

impl fmt::Display for AvmValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvmValue::Null => write!(f, "-"),
            AvmValue::String(s) => write!(f, "{}", s),
            AvmValue::Float(v) => write!(f, "{}", v),
            AvmValue::DateTime(dt) => write!(f, "{}", dt),
            AvmValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(feature = "serde")]
impl serde::ser::Serialize for AvmValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        match self {
            AvmValue::Null => serializer.serialize_none(),
            AvmValue::String(s) => serializer.serialize_str(s),
            AvmValue::Float(v) => serializer.serialize_f64(*v),
            AvmValue::DateTime(dt) => serializer.serialize_str(&dt.format()),
            AvmValue::List(items) => serializer.collect_seq(items),
        }
    }
}

impl From<String> for AvmValue {
    fn from(s: String) -> Self {
        AvmValue::String(s)
    }
}

impl From<&str> for AvmValue {
    fn from(s: &str) -> Self {
        AvmValue::String(s.to_string())
    }
}

impl From<&String> for AvmValue {
    fn from(s: &String) -> Self {
        AvmValue::String(s.clone())
    }
}

impl From<f64> for AvmValue {
    fn from(v: f64) -> Self {
        AvmValue::Float(v)
    }
}

impl From<f32> for AvmValue {
    fn from(v: f32) -> Self {
        AvmValue::Float(f64::from(v))
    }
}

impl From<i32> for AvmValue {
    fn from(v: i32) -> Self {
        AvmValue::Float(f64::from(v))
    }
}

impl From<u32> for AvmValue {
    fn from(v: u32) -> Self {
        AvmValue::Float(f64::from(v))
    }
}

impl From<AvmDateTime> for AvmValue {
    fn from(dt: AvmDateTime) -> Self {
        AvmValue::DateTime(dt)
    }
}

impl<T: Into<AvmValue>> From<Option<T>> for AvmValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(AvmValue::Null, Into::into)
    }
}

impl<T: Into<AvmValue>> From<Vec<T>> for AvmValue {
    fn from(items: Vec<T>) -> Self {
        AvmValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<AvmValue>, const N: usize> From<[T; N]> for AvmValue {
    fn from(items: [T; N]) -> Self {
        AvmValue::List(items.into_iter().map(Into::into).collect())
    }
}

/// The XML shape of a field inside `rdf:Description`
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    /// Plain text leaf element
    Text(String),
    /// `rdf:Alt` with a single `xml:lang="x-default"` item
    LangAlt(String),
    /// `rdf:Bag` of items
    Bag(Vec<String>),
    /// `rdf:Seq` of items
    Seq(Vec<String>),
}

impl WireValue {
    /// The value the parser produces when reading this shape back
    pub fn into_value(self) -> AvmValue {
        match self {
            WireValue::Text(text) => AvmValue::String(text),
            WireValue::LangAlt(text) => AvmValue::List(vec![AvmValue::String(text)]),
            WireValue::Bag(items) | WireValue::Seq(items) => {
                AvmValue::List(items.into_iter().map(AvmValue::String).collect())
            }
        }
    }
}

/// Wire name of a field: namespace plus tag
///
/// Struct members are flattened into a dotted tag, so the `CiEmailWork`
/// member of `Iptc4xmpCore:CreatorContactInfo` is
/// `(Iptc4xmpCore, "CreatorContactInfo.CiEmailWork")`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldKey {
    /// Field namespace
    pub namespace: AvmNamespace,
    /// Tag, dotted for struct members
    pub tag: String,
}

impl FieldKey {
    /// Create a key
    pub fn new(namespace: AvmNamespace, tag: impl Into<String>) -> Self {
        Self {
            namespace,
            tag: tag.into(),
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace.prefix(), self.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avm_value_string() {
        let value = AvmValue::from("eso1723a");
        assert_eq!(value.as_str(), Some("eso1723a"));
        assert_eq!(value.to_string(), "eso1723a");
    }

    #[test]
    fn test_avm_value_lists() {
        let value = AvmValue::from(vec![Some(1.5), None]);
        assert_eq!(value.as_float_list(), Some(vec![Some(1.5), None]));
        assert_eq!(value.to_string(), "1.5, -");

        let value = AvmValue::from(["Hubble", "Chandra"]);
        assert_eq!(value.as_string_list(), Some(vec!["Hubble", "Chandra"]));
        assert_eq!(value.as_float_list(), None);
    }

    #[test]
    fn test_avm_value_emptiness() {
        assert!(AvmValue::Null.is_empty());
        assert!(AvmValue::from("").is_empty());
        assert!(AvmValue::List(Vec::new()).is_empty());
        assert!(!AvmValue::from(0.0).is_empty());
    }

    #[test]
    fn test_wire_value_into_value() {
        let value = WireValue::Seq(vec!["a".to_string(), "-".to_string()]).into_value();
        assert_eq!(value, AvmValue::from(vec!["a", "-"]));
        let value = WireValue::LangAlt("Title".to_string()).into_value();
        assert_eq!(value, AvmValue::from(vec!["Title"]));
    }

    #[test]
    fn test_field_key_display() {
        let key = FieldKey::new(AvmNamespace::Iptc4xmpCore, "CreatorContactInfo.CiUrlWork");
        assert_eq!(key.to_string(), "Iptc4xmpCore:CreatorContactInfo.CiUrlWork");
    }
}
