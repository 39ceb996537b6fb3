//! Field descriptors
//!
//! A [`FieldDescriptor`] declares one AVM field: its logical name, where it
//! lives on the wire, what kind of value it holds and any constraints.
//! [`FieldDescriptor::check_data`] validates and normalizes a value for the
//! field and [`FieldDescriptor::to_wire`] gives its XML shape.
//!
//! Normalized forms:
//!
//! | Kind | Stored as |
//! |---|---|
//! | `PlainString`, `Url`, `Email`, `LocalizedString` | `String` |
//! | `Float` | `Float` |
//! | `UnorderedStringList`, `OrderedList`, `DateTimeList` | `List` of `String`, `"-"` for empty slots |
//! | `OrderedFloatList` | `List` of `Float`, `Null` for empty slots |
//!
//! An empty input (null, empty string, empty list) always normalizes to no
//! value, as does a list in which every slot is empty.

use crate::core::error::{AvmError, AvmResult};
use crate::core::namespace::AvmNamespace;
use crate::core::warning::{raise, AvmWarning};
use crate::schema::vocabulary::Vocabulary;
use crate::types::value::{AvmValue, FieldKey, WireValue};
use regex::Regex;
use std::sync::LazyLock;

/// Placeholder for an empty slot in a text list
pub const EMPTY_SLOT: &str = "-";

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^https?://(?:(?:[A-Z0-9-]+\.)+[A-Z]{2,6}|localhost|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})(?::\d+)?(?:/?|/\S+)$",
    )
    .expect("URL pattern should compile")
});

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)(?:^[-!#$%&'*+/=?^_`{}|~0-9A-Z]+(?:\.[-!#$%&'*+/=?^_`{}|~0-9A-Z]+)*|^"(?:[\x01-\x08\x0b\x0c\x0e-\x1f!#-\[\]-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])*")@(?:[A-Z0-9-]+\.)+[A-Z]{2,6}$"#,
    )
    .expect("email pattern should compile")
});

/// Kind of value a field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Free text; with a vocabulary, one controlled term
    PlainString,
    /// URL, prefixed with `http://` when it has no scheme
    Url,
    /// Email address
    Email,
    /// Text written as an `rdf:Alt` with one `x-default` item
    LocalizedString,
    /// Floating point number
    Float,
    /// `rdf:Bag` of text
    UnorderedStringList,
    /// `rdf:Seq` of text; with a vocabulary, of controlled terms
    OrderedList,
    /// `rdf:Seq` of numbers
    OrderedFloatList,
    /// `rdf:Seq` of ISO 8601 dates
    DateTimeList,
}

impl ValueKind {
    /// Whether values of this kind are lists
    pub fn is_list(self) -> bool {
        matches!(
            self,
            ValueKind::UnorderedStringList
                | ValueKind::OrderedList
                | ValueKind::OrderedFloatList
                | ValueKind::DateTimeList
        )
    }
}

/// Constraint on the number of list items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthConstraint {
    /// Exactly this many items
    Exact(usize),
    /// At most this many items
    Max(usize),
}

impl LengthConstraint {
    fn check(self, field: &str, len: usize) -> AvmResult<()> {
        let message = match self {
            LengthConstraint::Exact(n) if len != n => {
                format!("list should have exactly {} elements, got {}", n, len)
            }
            LengthConstraint::Max(n) if len > n => {
                format!("list should have at most {} elements, got {}", n, len)
            }
            _ => return Ok(()),
        };
        Err(AvmError::ListLengthError {
            field: field.to_string(),
            message,
        })
    }
}

/// Declaration of one AVM field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDescriptor {
    /// Logical name, e.g. `Spatial.Scale`
    pub name: &'static str,
    /// Wire namespace
    pub namespace: AvmNamespace,
    /// Wire tag, dotted for struct members
    pub tag: &'static str,
    /// Kind of value
    pub kind: ValueKind,
    /// Controlled vocabulary for `PlainString` and `OrderedList`
    pub vocabulary: Option<&'static Vocabulary>,
    /// List length constraint
    pub length: Option<LengthConstraint>,
    /// Whether the field is deprecated
    pub deprecated: bool,
}

impl FieldDescriptor {
    /// Declare a field
    pub fn new(
        name: &'static str,
        namespace: AvmNamespace,
        tag: &'static str,
        kind: ValueKind,
    ) -> Self {
        Self {
            name,
            namespace,
            tag,
            kind,
            vocabulary: None,
            length: None,
            deprecated: false,
        }
    }

    /// Restrict values to a controlled vocabulary
    pub fn with_vocabulary(mut self, vocabulary: &'static Vocabulary) -> Self {
        self.vocabulary = Some(vocabulary);
        self
    }

    /// Require exactly `n` list items
    pub fn with_exact_length(mut self, n: usize) -> Self {
        self.length = Some(LengthConstraint::Exact(n));
        self
    }

    /// Allow at most `n` list items
    pub fn with_max_length(mut self, n: usize) -> Self {
        self.length = Some(LengthConstraint::Max(n));
        self
    }

    /// Mark as deprecated
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// Wire key of this field
    pub fn key(&self) -> FieldKey {
        FieldKey::new(self.namespace, self.tag)
    }

    /// Validate and normalize a value
    ///
    /// # Arguments
    ///
    /// * `value` - Value to check
    /// * `warnings` - Receives non-fatal URL/email format warnings
    ///
    /// # Returns
    ///
    /// * `Ok(None)` if the value is empty
    /// * `Ok(Some(value))` with the normalized value
    /// * `Err(AvmError)` on a coercion, length or vocabulary failure
    pub fn check_data(
        &self,
        value: AvmValue,
        warnings: &mut Vec<AvmWarning>,
    ) -> AvmResult<Option<AvmValue>> {
        if value.is_empty() {
            return Ok(None);
        }

        match self.kind {
            ValueKind::UnorderedStringList
            | ValueKind::OrderedList
            | ValueKind::OrderedFloatList
            | ValueKind::DateTimeList => self.check_list(value),
            ValueKind::Float => self.coerce_float(&value).map(|v| Some(AvmValue::Float(v))),
            ValueKind::PlainString => {
                let Some(text) = self.scalar_text(value)? else {
                    return Ok(None);
                };
                match self.vocabulary {
                    Some(vocabulary) => self.check_term(vocabulary, &text).map(Some),
                    None => Ok(Some(AvmValue::String(text))),
                }
            }
            ValueKind::LocalizedString => {
                Ok(self.scalar_text(value)?.map(AvmValue::String))
            }
            ValueKind::Url => {
                let Some(mut url) = self.scalar_text(value)? else {
                    return Ok(None);
                };
                if !url.contains("://") {
                    url.insert_str(0, "http://");
                }
                if !URL_PATTERN.is_match(&url) {
                    raise(
                        warnings,
                        AvmWarning::InvalidUrl {
                            field: self.name.to_string(),
                            value: url.clone(),
                        },
                    );
                }
                Ok(Some(AvmValue::String(url)))
            }
            ValueKind::Email => {
                let Some(email) = self.scalar_text(value)? else {
                    return Ok(None);
                };
                if !EMAIL_PATTERN.is_match(&email) {
                    raise(
                        warnings,
                        AvmWarning::InvalidEmail {
                            field: self.name.to_string(),
                            value: email.clone(),
                        },
                    );
                }
                Ok(Some(AvmValue::String(email)))
            }
        }
    }

    /// XML shape of a normalized value
    pub fn to_wire(&self, value: &AvmValue) -> WireValue {
        match self.kind {
            ValueKind::PlainString | ValueKind::Url | ValueKind::Email | ValueKind::Float => {
                WireValue::Text(wire_text(value))
            }
            ValueKind::LocalizedString => WireValue::LangAlt(wire_text(value)),
            ValueKind::UnorderedStringList => WireValue::Bag(wire_items(value)),
            ValueKind::OrderedList | ValueKind::OrderedFloatList | ValueKind::DateTimeList => {
                WireValue::Seq(wire_items(value))
            }
        }
    }

    fn check_list(&self, value: AvmValue) -> AvmResult<Option<AvmValue>> {
        let items = match value {
            AvmValue::List(items) => items,
            scalar => vec![scalar],
        };
        if items.iter().all(AvmValue::is_null) {
            return Ok(None);
        }
        if let Some(length) = self.length {
            length.check(self.name, items.len())?;
        }

        let normalized = items
            .into_iter()
            .map(|item| self.check_item(item))
            .collect::<AvmResult<Vec<_>>>()?;

        let all_empty = normalized
            .iter()
            .all(|item| item.is_null() || item.as_str() == Some(EMPTY_SLOT));
        if all_empty {
            return Ok(None);
        }
        Ok(Some(AvmValue::List(normalized)))
    }

    fn check_item(&self, item: AvmValue) -> AvmResult<AvmValue> {
        if self.kind == ValueKind::OrderedFloatList {
            return match item {
                AvmValue::Null => Ok(AvmValue::Null),
                AvmValue::String(s) if s.trim().is_empty() || s.trim() == EMPTY_SLOT => {
                    Ok(AvmValue::Null)
                }
                other => self.coerce_float(&other).map(AvmValue::Float),
            };
        }

        let text = match item {
            AvmValue::Null => return Ok(AvmValue::String(EMPTY_SLOT.to_string())),
            AvmValue::String(s) if s.is_empty() => EMPTY_SLOT.to_string(),
            AvmValue::String(s) => s,
            AvmValue::DateTime(dt) if self.kind == ValueKind::DateTimeList => dt.format(),
            other => {
                return Err(self.type_error(&format!(
                    "list elements should be strings, got {}",
                    other.kind_name()
                )))
            }
        };

        match self.vocabulary {
            Some(vocabulary) if text != EMPTY_SLOT => self.check_term(vocabulary, &text),
            _ => Ok(AvmValue::String(text)),
        }
    }

    fn check_term(&self, vocabulary: &Vocabulary, text: &str) -> AvmResult<AvmValue> {
        let term = vocabulary.normalize(text);
        if !vocabulary.contains(&term) {
            return Err(AvmError::NotInControlledVocabulary {
                field: self.name.to_string(),
                value: term,
                allowed: vocabulary.describe(),
            });
        }
        Ok(AvmValue::String(term))
    }

    /// Text of a scalar string field; a one-item list stands for its item
    fn scalar_text(&self, value: AvmValue) -> AvmResult<Option<String>> {
        match value {
            AvmValue::String(s) if s.is_empty() => Ok(None),
            AvmValue::String(s) => Ok(Some(s)),
            AvmValue::DateTime(dt) => Ok(Some(dt.format())),
            AvmValue::Null => Ok(None),
            AvmValue::List(mut items) if items.len() == 1 => {
                self.scalar_text(items.remove(0))
            }
            other => Err(self.type_error(&format!(
                "value should be a string, got {}",
                other.kind_name()
            ))),
        }
    }

    fn coerce_float(&self, value: &AvmValue) -> AvmResult<f64> {
        match value {
            AvmValue::Float(v) => Ok(*v),
            AvmValue::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| self.type_error(&format!("could not convert {:?} to float", s))),
            other => Err(self.type_error(&format!(
                "value should be a number, got {}",
                other.kind_name()
            ))),
        }
    }

    fn type_error(&self, message: &str) -> AvmError {
        AvmError::TypeError {
            field: self.name.to_string(),
            message: message.to_string(),
        }
    }
}

/// Render a float with 16 fixed decimal digits
pub fn format_float(value: f64) -> String {
    format!("{:.16}", value)
}

fn wire_text(value: &AvmValue) -> String {
    match value {
        AvmValue::Null => EMPTY_SLOT.to_string(),
        AvmValue::String(s) => s.clone(),
        AvmValue::Float(v) => format_float(*v),
        AvmValue::DateTime(dt) => dt.format(),
        AvmValue::List(_) => value.to_string(),
    }
}

fn wire_items(value: &AvmValue) -> Vec<String> {
    match value {
        AvmValue::List(items) => items.iter().map(wire_text).collect(),
        scalar => vec![wire_text(scalar)],
    }
}
