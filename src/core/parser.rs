//! XMP XML/RDF parser
//!
//! Reads an XMP packet into a flat map keyed by [`FieldKey`]. Only fields in
//! the five AVM namespaces are collected; anything else in the packet belongs
//! to other XMP schemas and is skipped.
//!
//! Shapes understood for a property element:
//!
//! - a leaf with text: `<avm:ID>eso1723a</avm:ID>`
//! - a single `rdf:Bag`/`rdf:Seq`/`rdf:Alt`: a list of the `rdf:li` texts
//! - a struct: several child properties, a nested `rdf:Description`,
//!   `rdf:parseType="Resource"` or struct fields given as attributes.
//!   Struct members are flattened to `Struct.Member` tags.
//!
//! Properties may also appear as attributes of `rdf:Description`.

use crate::core::error::{AvmError, AvmResult};
use crate::core::namespace::{AvmNamespace, NamespaceScope};
use crate::core::node::{XmlAttribute, XmlElement};
use crate::types::value::{AvmValue, FieldKey};
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;

/// Flat map of the AVM fields found in a packet
pub type FieldMap = BTreeMap<FieldKey, AvmValue>;

/// Parser for XMP Packets
#[derive(Debug, Clone, Copy, Default)]
pub struct XmpParser;

impl XmpParser {
    /// Create a new XMP parser
    pub fn new() -> Self {
        Self
    }

    /// Parse an XMP Packet from bytes
    ///
    /// The bytes must be UTF-8. A leading byte order mark is accepted.
    pub fn parse_bytes(&self, packet: &[u8]) -> AvmResult<FieldMap> {
        let xml = std::str::from_utf8(packet)
            .map_err(|e| AvmError::ParseError(format!("XMP packet is not UTF-8: {}", e)))?;
        self.parse_packet(xml)
    }

    /// Parse an XMP Packet from a string
    ///
    /// Accepts a full packet with its `<?xpacket?>` envelope, a bare
    /// `x:xmpmeta` document or a bare `rdf:RDF` element. Every
    /// `rdf:Description` below `rdf:RDF` is merged into one map.
    ///
    /// # Arguments
    ///
    /// * `xml` - Packet text
    ///
    /// # Returns
    ///
    /// * `Ok(FieldMap)` with every AVM field found
    /// * `Err(AvmError::ParseError)` if the XML is not well formed
    /// * `Err(AvmError::UnexpectedRdfStructure)` if an AVM property has an
    ///   unsupported shape
    pub fn parse_packet(&self, xml: &str) -> AvmResult<FieldMap> {
        let document = self.parse_document(xml)?;

        let mut descriptions = Vec::new();
        document.find_all(&|e: &XmlElement| e.is_description(), &mut descriptions);

        let mut fields = FieldMap::new();
        for description in descriptions {
            self.collect_description(description, "", &mut fields)?;
        }
        Ok(fields)
    }

    /// Parse XML text into an element tree
    ///
    /// The returned element is a synthetic document node whose children are
    /// the top-level elements.
    pub fn parse_document(&self, xml: &str) -> AvmResult<XmlElement> {
        let start = xml.find('<').ok_or_else(|| {
            AvmError::ParseError("Invalid XML content: no element found".to_string())
        })?;
        let mut reader = Reader::from_str(&xml[start..]);

        let mut buf = Vec::new();
        let mut scope = NamespaceScope::new();
        let mut stack = vec![XmlElement::default()];

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let element = Self::open_element(&e, &mut scope);
                    stack.push(element);
                }
                Ok(Event::Empty(e)) => {
                    let element = Self::open_element(&e, &mut scope);
                    scope.pop_frame();
                    Self::append_child(&mut stack, element)?;
                }
                Ok(Event::End(_)) => {
                    scope.pop_frame();
                    if stack.len() < 2 {
                        return Err(AvmError::ParseError(
                            "Unbalanced end tag".to_string(),
                        ));
                    }
                    if let Some(element) = stack.pop() {
                        Self::append_child(&mut stack, element)?;
                    }
                }
                Ok(Event::Text(e)) => {
                    // Decode XML entities (e.g., &quot; -> ")
                    let raw_text = String::from_utf8_lossy(e.as_ref());
                    let text = match unescape(&raw_text) {
                        Ok(unescaped) => unescaped.to_string(),
                        Err(_) => raw_text.to_string(),
                    };
                    Self::push_text(&mut stack, &text);
                }
                Ok(Event::CData(e)) => {
                    let text = String::from_utf8_lossy(&e).to_string();
                    Self::push_text(&mut stack, &text);
                }
                Ok(Event::GeneralRef(e)) => {
                    let name = String::from_utf8_lossy(&e).to_string();
                    let text = Self::resolve_reference(&name);
                    Self::push_text(&mut stack, &text);
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(AvmError::ParseError(format!("XML parsing error: {}", e)));
                }
                _ => {}
            }
            buf.clear();
        }

        if stack.len() != 1 {
            return Err(AvmError::ParseError(format!(
                "Unclosed element {}",
                stack
                    .last()
                    .map(|e| e.qualified_name())
                    .unwrap_or_default()
            )));
        }
        stack
            .pop()
            .ok_or_else(|| AvmError::ParseError("Empty document".to_string()))
    }

    /// Collect the properties of a description-like element
    ///
    /// `path` is the dotted struct path the properties live under, empty at
    /// the top level.
    fn collect_description(
        &self,
        description: &XmlElement,
        path: &str,
        fields: &mut FieldMap,
    ) -> AvmResult<()> {
        for attr in description.data_attributes() {
            let Some(namespace) = attr.namespace.as_deref().and_then(AvmNamespace::from_uri)
            else {
                log::debug!("Ignoring attribute {}:{}", attr.prefix, attr.local);
                continue;
            };
            fields.insert(
                FieldKey::new(namespace, join_path(path, &attr.local)),
                AvmValue::String(attr.value.clone()),
            );
        }

        for child in &description.children {
            self.collect_property(child, path, fields)?;
        }
        Ok(())
    }

    /// Collect one property element
    fn collect_property(
        &self,
        element: &XmlElement,
        path: &str,
        fields: &mut FieldMap,
    ) -> AvmResult<()> {
        if element.is_description() {
            return self.collect_description(element, path, fields);
        }

        let Some(namespace) = element
            .namespace
            .as_deref()
            .and_then(AvmNamespace::from_uri)
        else {
            log::debug!("Ignoring element {}", element.qualified_name());
            return Ok(());
        };
        let tag = join_path(path, &element.local);

        match element.children.as_slice() {
            [] if element.is_resource() || Self::has_field_attributes(element) => {
                self.collect_description(element, &tag, fields)
            }
            [] => {
                fields.insert(
                    FieldKey::new(namespace, tag),
                    AvmValue::String(element.text.trim().to_string()),
                );
                Ok(())
            }
            [only] if only.is_rdf_container() => {
                let items = only
                    .children
                    .iter()
                    .filter(|li| li.is_rdf() && li.local == "li")
                    .map(|li| AvmValue::String(li.text.trim().to_string()))
                    .collect();
                fields.insert(FieldKey::new(namespace, tag), AvmValue::List(items));
                Ok(())
            }
            [only] if only.is_description() => self.collect_description(only, &tag, fields),
            [only] if !element.is_resource() => Err(AvmError::UnexpectedRdfStructure(format!(
                "{} contains a single {} element, expected an RDF container",
                element.qualified_name(),
                only.qualified_name()
            ))),
            children => {
                if let Some(rdf_child) = children.iter().find(|child| child.is_rdf()) {
                    return Err(AvmError::UnexpectedRdfStructure(format!(
                        "{} mixes struct fields with {}",
                        element.qualified_name(),
                        rdf_child.qualified_name()
                    )));
                }
                self.collect_description(element, &tag, fields)
            }
        }
    }

    /// Whether an element carries struct members as attributes
    ///
    /// Attributes outside the AVM namespaces do not count, so a leaf keeps
    /// its text.
    fn has_field_attributes(element: &XmlElement) -> bool {
        element.data_attributes().any(|attr| {
            attr.namespace
                .as_deref()
                .and_then(AvmNamespace::from_uri)
                .is_some()
        })
    }

    /// Build an element from a start tag and open its namespace frame
    fn open_element(e: &BytesStart<'_>, scope: &mut NamespaceScope) -> XmlElement {
        scope.push_frame();
        let attrs = Self::collect_attributes(e);
        for (name, value) in &attrs {
            if name == "xmlns" {
                scope.declare("", value);
            } else if let Some(prefix) = name.strip_prefix("xmlns:") {
                scope.declare(prefix, value);
            }
        }

        let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
        let (prefix, local) = split_qualified(&name);
        let mut element = XmlElement::new(prefix, local);
        element.namespace = scope.resolve(prefix).map(str::to_string);

        for (name, value) in attrs {
            if name == "xmlns" || name.starts_with("xmlns:") {
                continue;
            }
            let (prefix, local) = split_qualified(&name);
            let namespace = if prefix.is_empty() {
                None
            } else {
                scope.resolve(prefix).map(str::to_string)
            };
            element.attributes.push(XmlAttribute {
                prefix: prefix.to_string(),
                local: local.to_string(),
                namespace,
                value,
            });
        }
        element
    }

    /// Collect attributes from XML element
    fn collect_attributes(e: &BytesStart<'_>) -> Vec<(String, String)> {
        e.attributes()
            .flatten()
            .map(|attr| {
                let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
                // Decode XML entities in attribute values (e.g., &quot; -> ")
                let raw_value = String::from_utf8_lossy(attr.value.as_ref());
                let value = match unescape(&raw_value) {
                    Ok(unescaped) => unescaped.to_string(),
                    Err(_) => raw_value.to_string(),
                };
                (key, value)
            })
            .collect()
    }

    fn append_child(stack: &mut [XmlElement], element: XmlElement) -> AvmResult<()> {
        let parent = stack
            .last_mut()
            .ok_or_else(|| AvmError::ParseError("Element outside of document".to_string()))?;
        parent.children.push(element);
        Ok(())
    }

    fn push_text(stack: &mut [XmlElement], text: &str) {
        if let Some(current) = stack.last_mut() {
            current.text.push_str(text);
        }
    }

    /// Resolve `&name;` given its name
    fn resolve_reference(name: &str) -> String {
        if let Some(number) = name.strip_prefix('#') {
            let code = match number.strip_prefix('x') {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => number.parse().ok(),
            };
            if let Some(ch) = code.and_then(char::from_u32) {
                return ch.to_string();
            }
        } else if let Some(resolved) = resolve_predefined_entity(name) {
            return resolved.to_string();
        }
        format!("&{};", name)
    }
}

/// Split `prefix:local`; unprefixed names get an empty prefix
fn split_qualified(name: &str) -> (&str, &str) {
    name.split_once(':').unwrap_or(("", name))
}

fn join_path(path: &str, local: &str) -> String {
    if path.is_empty() {
        local.to_string()
    } else {
        format!("{}.{}", path, local)
    }
}
