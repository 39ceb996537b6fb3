//! XMP XML/RDF serializer
//!
//! Writes AVM fields, already converted to their [`WireValue`] shape, into a
//! single `rdf:Description` inside `x:xmpmeta`, and wraps that document in
//! the `<?xpacket?>` envelope.

use crate::core::error::{AvmError, AvmResult};
use crate::core::namespace::{ns, AvmNamespace};
use crate::types::value::{FieldKey, WireValue};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::HashMap;
use std::io::Cursor;

/// Packet id written in every `<?xpacket begin?>` instruction
pub const PACKET_ID: &str = "W5M0MpCehiHzreSzNTczkc9d";

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// A property element to write, with struct members grouped together
enum Property<'a> {
    Field(&'a FieldKey, &'a WireValue),
    Struct {
        namespace: AvmNamespace,
        name: &'a str,
        members: Vec<(&'a str, &'a WireValue)>,
    },
}

/// Serializer for XMP Packets
#[derive(Debug, Clone, Copy, Default)]
pub struct XmpSerializer;

impl XmpSerializer {
    /// Create a new XMP serializer
    pub fn new() -> Self {
        Self
    }

    /// Serialize fields to an `x:xmpmeta` document
    ///
    /// Fields are written in the given order. Dotted tags in namespaces that
    /// nest them (`Iptc4xmpCore:CreatorContactInfo.CiEmailWork`) are written
    /// as members of one `rdf:parseType="Resource"` struct per struct name,
    /// placed where its first member appears.
    pub fn serialize_rdf(&self, fields: &[(FieldKey, WireValue)]) -> AvmResult<String> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

        let mut meta_start = BytesStart::new("x:xmpmeta");
        meta_start.push_attribute(("xmlns:x", ns::X));
        meta_start.push_attribute(("x:xmptk", concat!("avmkit ", env!("CARGO_PKG_VERSION"))));
        writer.write_event(Event::Start(meta_start))?;

        let mut rdf_start = BytesStart::new("rdf:RDF");
        rdf_start.push_attribute(("xmlns:rdf", ns::RDF));
        writer.write_event(Event::Start(rdf_start))?;

        let mut desc_start = BytesStart::new("rdf:Description");
        desc_start.push_attribute(("rdf:about", ""));
        for namespace in AvmNamespace::ALL {
            let attr = format!("xmlns:{}", namespace.prefix());
            desc_start.push_attribute((attr.as_str(), namespace.uri()));
        }

        let properties = Self::group_properties(fields);
        if properties.is_empty() {
            writer.write_event(Event::Empty(desc_start))?;
        } else {
            writer.write_event(Event::Start(desc_start))?;
            for property in &properties {
                match property {
                    Property::Field(key, value) => {
                        let name = key.to_string();
                        Self::write_property(&mut writer, &name, value)?;
                    }
                    Property::Struct {
                        namespace,
                        name,
                        members,
                    } => Self::write_struct(&mut writer, *namespace, name, members)?,
                }
            }
            writer.write_event(Event::End(BytesEnd::new("rdf:Description")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("rdf:RDF")))?;
        writer.write_event(Event::End(BytesEnd::new("x:xmpmeta")))?;

        let result = writer.into_inner().into_inner();
        String::from_utf8(result)
            .map_err(|e| AvmError::ParseError(format!("UTF-8 encoding error: {}", e)))
    }

    /// Serialize to XMP Packet format
    pub fn serialize_packet(&self, fields: &[(FieldKey, WireValue)]) -> AvmResult<String> {
        let rdf_content = self.serialize_rdf(fields)?;
        Ok(Self::wrap_packet(&rdf_content))
    }

    /// Wrap an `x:xmpmeta` document in the xpacket envelope
    pub fn wrap_packet(content: &str) -> String {
        format!(
            "<?xpacket begin=\"\u{feff}\" id=\"{}\"?>\n{}\n<?xpacket end=\"w\"?>",
            PACKET_ID, content
        )
    }

    fn group_properties(fields: &[(FieldKey, WireValue)]) -> Vec<Property<'_>> {
        let mut properties = Vec::new();
        let mut struct_index: HashMap<(AvmNamespace, &str), usize> = HashMap::new();

        for (key, value) in fields {
            let member = key
                .tag
                .split_once('.')
                .filter(|_| key.namespace.nests_dotted_tags());
            let Some((name, member)) = member else {
                properties.push(Property::Field(key, value));
                continue;
            };

            let index = *struct_index
                .entry((key.namespace, name))
                .or_insert_with(|| {
                    properties.push(Property::Struct {
                        namespace: key.namespace,
                        name,
                        members: Vec::new(),
                    });
                    properties.len() - 1
                });
            if let Some(Property::Struct { members, .. }) = properties.get_mut(index) {
                members.push((member, value));
            }
        }
        properties
    }

    fn write_struct(
        writer: &mut XmlWriter,
        namespace: AvmNamespace,
        name: &str,
        members: &[(&str, &WireValue)],
    ) -> AvmResult<()> {
        let struct_name = format!("{}:{}", namespace.prefix(), name);
        let mut start = BytesStart::new(struct_name.as_str());
        start.push_attribute(("rdf:parseType", "Resource"));
        writer.write_event(Event::Start(start))?;
        for (member, value) in members {
            let member_name = format!("{}:{}", namespace.prefix(), member);
            Self::write_property(writer, &member_name, value)?;
        }
        writer.write_event(Event::End(BytesEnd::new(struct_name.as_str())))?;
        Ok(())
    }

    fn write_property(writer: &mut XmlWriter, name: &str, value: &WireValue) -> AvmResult<()> {
        writer.write_event(Event::Start(BytesStart::new(name)))?;
        match value {
            WireValue::Text(text) => {
                writer.write_event(Event::Text(BytesText::new(text)))?;
            }
            WireValue::LangAlt(text) => {
                writer.write_event(Event::Start(BytesStart::new("rdf:Alt")))?;
                let mut li = BytesStart::new("rdf:li");
                li.push_attribute(("xml:lang", "x-default"));
                writer.write_event(Event::Start(li))?;
                writer.write_event(Event::Text(BytesText::new(text)))?;
                writer.write_event(Event::End(BytesEnd::new("rdf:li")))?;
                writer.write_event(Event::End(BytesEnd::new("rdf:Alt")))?;
            }
            WireValue::Bag(items) => Self::write_container(writer, "rdf:Bag", items)?,
            WireValue::Seq(items) => Self::write_container(writer, "rdf:Seq", items)?,
        }
        writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn write_container(writer: &mut XmlWriter, container: &str, items: &[String]) -> AvmResult<()> {
        if items.is_empty() {
            writer.write_event(Event::Empty(BytesStart::new(container)))?;
            return Ok(());
        }
        writer.write_event(Event::Start(BytesStart::new(container)))?;
        for item in items {
            writer.write_event(Event::Start(BytesStart::new("rdf:li")))?;
            writer.write_event(Event::Text(BytesText::new(item)))?;
            writer.write_event(Event::End(BytesEnd::new("rdf:li")))?;
        }
        writer.write_event(Event::End(BytesEnd::new(container)))?;
        Ok(())
    }
}
