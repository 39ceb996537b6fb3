//! AVM Metadata
//!
//! This module provides the main [`AvmMeta`] struct for working with AVM
//! metadata.
//!
//! Fields are addressed by their logical name, either top-level (`ID`) or
//! dotted (`Spatial.Scale`). Every assignment is validated against the field
//! table of the active metadata version. Changing the version, directly or
//! by assigning `MetadataVersion`, drops fields the new version does not
//! declare and adds the ones it does.

use crate::core::error::{AvmError, AvmResult};
use crate::core::namespace::AvmNamespace;
use crate::core::parser::{FieldMap, XmpParser};
use crate::core::serializer::XmpSerializer;
use crate::core::warning::{raise, AvmWarning};
use crate::files::file::AvmFile;
use crate::files::handler::{EmbedOptions, ExtractOptions};
use crate::files::packet::Embedded;
use crate::schema::descriptor::FieldDescriptor;
use crate::schema::spec::{Spec, SpecVersion};
use crate::types::value::{AvmValue, FieldKey, WireValue};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

mod group;
mod spatial;

pub use group::{Entry, Group};
pub use spatial::{ProjectionConverter, SpatialFields};

const METADATA_VERSION: &str = "MetadataVersion";

/// Main structure for working with AVM metadata
#[derive(Debug, Clone)]
pub struct AvmMeta {
    version: SpecVersion,
    root: BTreeMap<String, Entry>,
    warnings: Vec<AvmWarning>,
}

impl AvmMeta {
    /// Create an empty tree for the latest metadata version
    pub fn new() -> Self {
        Self::with_version(SpecVersion::default())
    }

    /// Create an empty tree for a given metadata version
    pub fn with_version(version: SpecVersion) -> Self {
        let mut meta = Self {
            version,
            root: BTreeMap::new(),
            warnings: Vec::new(),
        };
        meta.populate();
        meta
    }

    /// Active metadata version
    pub fn version(&self) -> SpecVersion {
        self.version
    }

    /// Field table of the active version
    pub fn spec(&self) -> &'static Spec {
        Spec::get(self.version)
    }

    /// Switch to another metadata version
    ///
    /// Fields the new version does not declare are deleted; a
    /// [`AvmWarning::FieldRemovedOnMigration`] is raised for each one that
    /// held a value. Fields new in that version start unset.
    pub fn set_version(&mut self, version: SpecVersion) {
        if version != self.version {
            self.version = version;
            self.populate();
        }
    }

    /// Get a field value
    ///
    /// # Arguments
    ///
    /// * `name` - Logical name, e.g. `"ID"` or `"Spatial.Scale"`
    ///
    /// # Returns
    ///
    /// * `Ok(Some(value))` if the field is set
    /// * `Ok(None)` if the field is declared but unset
    /// * `Err(AvmError::UnknownField)` if the active version does not declare it
    /// * `Err(AvmError::NotAScalarField)` if the name only names a group
    pub fn get(&self, name: &str) -> AvmResult<Option<&AvmValue>> {
        self.descriptor(name)?;
        Ok(self.slot(name).and_then(Option::as_ref))
    }

    /// Set a field value
    ///
    /// The value is validated and normalized by the field's descriptor. An
    /// empty value unsets the field.
    ///
    /// # Arguments
    ///
    /// * `name` - Logical name, e.g. `"Type"` or `"Spatial.Scale"`
    /// * `value` - Anything convertible to [`AvmValue`]
    ///
    /// # Example
    ///
    /// ```rust
    /// use avmkit::AvmMeta;
    ///
    /// let mut meta = AvmMeta::new();
    /// meta.set("Type", "simulation")?;
    /// meta.set("Spatial.Scale", [-0.1, 0.1])?;
    /// assert_eq!(meta.get("Type")?.and_then(|v| v.as_str()), Some("Simulation"));
    /// # Ok::<(), avmkit::AvmError>(())
    /// ```
    pub fn set(&mut self, name: &str, value: impl Into<AvmValue>) -> AvmResult<()> {
        let descriptor = self.descriptor(name)?;
        let value = descriptor.check_data(value.into(), &mut self.warnings)?;

        if descriptor.deprecated && value.is_some() {
            raise(
                &mut self.warnings,
                AvmWarning::DeprecatedField {
                    field: name.to_string(),
                },
            );
        }

        if name == METADATA_VERSION {
            if let Some(version) = value.as_ref().and_then(AvmValue::as_float) {
                self.set_version(SpecVersion::from_f64(version)?);
            }
        }

        if let Some(slot) = self.slot_mut(name) {
            *slot = value;
        }
        Ok(())
    }

    /// Unset a field
    pub fn unset(&mut self, name: &str) -> AvmResult<()> {
        self.set(name, AvmValue::Null)
    }

    /// Top-level entry by name
    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.root.get(name)
    }

    /// Group by name
    pub fn group(&self, name: &str) -> Option<&Group> {
        match self.root.get(name)? {
            Entry::Group(group) => Some(group),
            Entry::Field(_) => None,
        }
    }

    /// All set fields, in declaration order
    pub fn fields(&self) -> Vec<(&'static str, &AvmValue)> {
        self.spec()
            .descriptors()
            .filter_map(|descriptor| {
                let value = self.slot(descriptor.name)?.as_ref()?;
                Some((descriptor.name, value))
            })
            .collect()
    }

    /// Whether no field other than `MetadataVersion` is set
    pub fn is_empty(&self) -> bool {
        self.fields()
            .iter()
            .all(|(name, _)| *name == METADATA_VERSION)
    }

    /// Warnings raised since the last call, oldest first
    pub fn take_warnings(&mut self) -> Vec<AvmWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// Warnings raised so far
    pub fn warnings(&self) -> &[AvmWarning] {
        &self.warnings
    }

    pub(crate) fn prepend_warnings(&mut self, mut warnings: Vec<AvmWarning>) {
        warnings.append(&mut self.warnings);
        self.warnings = warnings;
    }

    /// Build a tree from fields read out of a packet
    ///
    /// The version is taken from `avm:MetadataVersion` when present. Tags in
    /// the AVM namespaces that the version does not declare are skipped with
    /// a [`AvmWarning::TagIgnored`].
    pub fn from_fields(fields: FieldMap) -> AvmResult<Self> {
        let mut warnings = Vec::new();
        let version_key = FieldKey::new(AvmNamespace::Avm, METADATA_VERSION);

        let version = match fields.get(&version_key) {
            None => SpecVersion::default(),
            Some(declared) => {
                let text = declared.to_string();
                text.parse().unwrap_or_else(|_| {
                    let used = SpecVersion::default();
                    raise(
                        &mut warnings,
                        AvmWarning::UnsupportedVersion {
                            declared: text,
                            used: used.to_string(),
                        },
                    );
                    used
                })
            }
        };

        let mut meta = Self::with_version(version);
        meta.warnings = warnings;
        let spec = meta.spec();
        for (key, value) in fields {
            if key == version_key {
                continue;
            }
            match spec.lookup(&key) {
                Some(descriptor) => meta.set(descriptor.name, value)?,
                None => raise(
                    &mut meta.warnings,
                    AvmWarning::TagIgnored {
                        prefix: key.namespace.prefix(),
                        tag: key.tag,
                    },
                ),
            }
        }
        Ok(meta)
    }

    /// Set fields in their wire form, in declaration order
    pub fn to_fields(&self) -> Vec<(FieldKey, WireValue)> {
        self.spec()
            .descriptors()
            .filter_map(|descriptor| {
                let value = self.slot(descriptor.name)?.as_ref()?;
                Some((descriptor.key(), descriptor.to_wire(value)))
            })
            .collect()
    }

    /// Parse AVM metadata from XML text
    ///
    /// Accepts a full XMP packet or a bare `x:xmpmeta`/`rdf:RDF` document.
    pub fn from_xml(xml: &str) -> AvmResult<Self> {
        let fields = XmpParser::new().parse_packet(xml)?;
        Self::from_fields(fields)
    }

    /// Parse AVM metadata from an XML file
    pub fn from_xml_file<P: AsRef<Path>>(path: P) -> AvmResult<Self> {
        let xml = std::fs::read_to_string(path)?;
        Self::from_xml(&xml)
    }

    /// Read AVM metadata embedded in an image file
    pub fn from_image<P: AsRef<Path>>(path: P) -> AvmResult<Self> {
        AvmFile::open(path)?.read_meta(ExtractOptions::default())
    }

    /// Read AVM metadata embedded in image bytes
    ///
    /// Warnings raised while locating the packet are available through
    /// [`take_warnings`](Self::take_warnings).
    pub fn from_image_bytes(data: &[u8], options: ExtractOptions) -> AvmResult<Self> {
        AvmFile::from_bytes(data.to_vec()).read_meta(options)
    }

    /// Serialize to an `x:xmpmeta` document
    pub fn to_xml(&self) -> AvmResult<String> {
        XmpSerializer::new().serialize_rdf(&self.to_fields())
    }

    /// Serialize to a full XMP packet
    pub fn to_xmp(&self) -> AvmResult<String> {
        XmpSerializer::new().serialize_packet(&self.to_fields())
    }

    /// Embed into image bytes, replacing any existing XMP packet
    pub fn embed_bytes(&self, data: &[u8], options: EmbedOptions) -> AvmResult<Embedded> {
        AvmFile::from_bytes(data.to_vec()).embed(self, options)
    }

    /// Embed into an image file and write the result to `output`
    ///
    /// Nothing is written if embedding fails.
    pub fn embed<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
        options: EmbedOptions,
    ) -> AvmResult<Vec<AvmWarning>> {
        let embedded = AvmFile::open(input)?.embed(self, options)?;
        std::fs::write(output, &embedded.data)?;
        Ok(embedded.warnings)
    }

    fn descriptor(&self, name: &str) -> AvmResult<&'static FieldDescriptor> {
        let spec = self.spec();
        if let Some(descriptor) = spec.descriptor(name) {
            return Ok(descriptor);
        }
        if spec.is_group(name) {
            return Err(AvmError::NotAScalarField(name.to_string()));
        }
        Err(AvmError::UnknownField {
            name: name.to_string(),
            version: self.version.to_string(),
        })
    }

    fn slot(&self, name: &str) -> Option<&Option<AvmValue>> {
        match name.split_once('.') {
            Some((top, key)) => match self.root.get(top)? {
                Entry::Group(group) => group.children.get(key),
                Entry::Field(_) => None,
            },
            None => match self.root.get(name)? {
                Entry::Field(value) => Some(value),
                Entry::Group(group) if group.carries_value => Some(&group.value),
                Entry::Group(_) => None,
            },
        }
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Option<AvmValue>> {
        match name.split_once('.') {
            Some((top, key)) => match self.root.get_mut(top)? {
                Entry::Group(group) => group.children.get_mut(key),
                Entry::Field(_) => None,
            },
            None => match self.root.get_mut(name)? {
                Entry::Field(value) => Some(value),
                Entry::Group(group) if group.carries_value => Some(&mut group.value),
                Entry::Group(_) => None,
            },
        }
    }

    /// Reconcile the tree with the active version's field table
    fn populate(&mut self) {
        let spec = self.spec();
        let mut removed = Vec::new();

        self.root.retain(|top, entry| match entry {
            Entry::Field(value) => {
                if spec.is_group(top) {
                    let value = value.take();
                    *entry = Entry::Group(Group {
                        carries_value: spec.contains(top),
                        value,
                        children: BTreeMap::new(),
                    });
                    return true;
                }
                if spec.contains(top) {
                    return true;
                }
                if value.is_some() {
                    removed.push(top.clone());
                }
                false
            }
            Entry::Group(group) => {
                if group.carries_value && !spec.contains(top) {
                    if group.value.take().is_some() {
                        removed.push(top.clone());
                    }
                    group.carries_value = false;
                }
                group.children.retain(|key, value| {
                    let name = format!("{}.{}", top, key);
                    if spec.contains(&name) {
                        return true;
                    }
                    if value.is_some() {
                        removed.push(name);
                    }
                    false
                });
                if spec.is_group(top) {
                    return true;
                }
                if spec.contains(top) {
                    *entry = Entry::Field(group.value.take());
                    return true;
                }
                false
            }
        });

        for field in removed {
            raise(
                &mut self.warnings,
                AvmWarning::FieldRemovedOnMigration {
                    field,
                    version: self.version.to_string(),
                },
            );
        }

        for descriptor in spec.descriptors() {
            let name = descriptor.name;
            match name.split_once('.') {
                Some((top, key)) => {
                    let entry = self
                        .root
                        .entry(top.to_string())
                        .or_insert_with(|| Entry::Group(Group::default()));
                    if let Entry::Group(group) = entry {
                        group.children.entry(key.to_string()).or_insert(None);
                    }
                }
                None if spec.is_group(name) => {
                    let entry = self
                        .root
                        .entry(name.to_string())
                        .or_insert_with(|| Entry::Group(Group::default()));
                    if let Entry::Group(group) = entry {
                        group.carries_value = true;
                    }
                }
                None => {
                    self.root
                        .entry(name.to_string())
                        .or_insert(Entry::Field(None));
                }
            }
        }

        let version = self.version.as_f64();
        if let Some(slot) = self.slot_mut(METADATA_VERSION) {
            *slot = Some(AvmValue::Float(version));
        }
    }
}

impl Default for AvmMeta {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for AvmMeta {
    type Err = AvmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_xml(s)
    }
}

impl fmt::Display for AvmMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, entry) in &self.root {
            match entry {
                Entry::Field(Some(value)) => write_value(f, name, value, 0)?,
                Entry::Field(None) => {}
                Entry::Group(group) if group.is_unset() => {}
                Entry::Group(group) => {
                    writeln!(f, "{}:", name)?;
                    if let Some(value) = group.value() {
                        write_items(f, value, 1)?;
                    }
                    for (key, value) in group.children() {
                        write_value(f, key, value, 1)?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn write_value(f: &mut fmt::Formatter<'_>, label: &str, value: &AvmValue, depth: usize) -> fmt::Result {
    let indent = "   ".repeat(depth);
    match value {
        AvmValue::List(_) => {
            writeln!(f, "{}{}:", indent, label)?;
            write_items(f, value, depth + 1)
        }
        scalar => writeln!(f, "{}{}: {}", indent, label, scalar),
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, value: &AvmValue, depth: usize) -> fmt::Result {
    let indent = "   ".repeat(depth);
    match value {
        AvmValue::List(items) => {
            for item in items {
                writeln!(f, "{}* {}", indent, item)?;
            }
            Ok(())
        }
        scalar => writeln!(f, "{}{}", indent, scalar),
    }
}
