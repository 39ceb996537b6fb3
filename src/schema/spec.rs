//! Versioned field tables
//!
//! Each AVM metadata version declares its own set of fields. Versions are
//! built from one base table plus an explicit [`SpecDiff`], so changing one
//! version never touches another. The tables are built once on first use and
//! are read-only afterwards.

use crate::core::error::{AvmError, AvmResult};
use crate::core::namespace::AvmNamespace::{self, Avm, Dc, Iptc4xmpCore, Photoshop, XapRights};
use crate::schema::descriptor::{FieldDescriptor, ValueKind};
use crate::schema::vocabulary;
use crate::types::value::FieldKey;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

static SPECS: OnceLock<[Spec; 3]> = OnceLock::new();

/// AVM metadata version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum SpecVersion {
    /// Version 1.0
    V1_0,
    /// Version 1.1
    V1_1,
    /// Version 1.2
    #[default]
    V1_2,
}

impl SpecVersion {
    /// All versions with a field table
    pub const ALL: [SpecVersion; 3] = [SpecVersion::V1_0, SpecVersion::V1_1, SpecVersion::V1_2];

    /// Version identifier, e.g. `"1.2"`
    pub fn as_str(self) -> &'static str {
        match self {
            SpecVersion::V1_0 => "1.0",
            SpecVersion::V1_1 => "1.1",
            SpecVersion::V1_2 => "1.2",
        }
    }

    /// Value stored in the `MetadataVersion` field
    pub fn as_f64(self) -> f64 {
        match self {
            SpecVersion::V1_0 => 1.0,
            SpecVersion::V1_1 => 1.1,
            SpecVersion::V1_2 => 1.2,
        }
    }

    /// Version for a `MetadataVersion` number
    pub fn from_f64(value: f64) -> AvmResult<Self> {
        let tenths = value * 10.0;
        if (tenths - tenths.round()).abs() < 1e-6 {
            match tenths.round() as i64 {
                10 => return Ok(SpecVersion::V1_0),
                11 => return Ok(SpecVersion::V1_1),
                12 => return Ok(SpecVersion::V1_2),
                _ => {}
            }
        }
        Err(AvmError::UnknownVersion(value.to_string()))
    }

    fn index(self) -> usize {
        match self {
            SpecVersion::V1_0 => 0,
            SpecVersion::V1_1 => 1,
            SpecVersion::V1_2 => 2,
        }
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpecVersion {
    type Err = AvmError;

    fn from_str(s: &str) -> AvmResult<Self> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| AvmError::UnknownVersion(s.to_string()))?;
        Self::from_f64(value)
    }
}

/// Changes a version makes to the base table
#[derive(Debug, Default)]
pub struct SpecDiff {
    /// Fields added (or redeclared) by this version
    pub added: Vec<FieldDescriptor>,
    /// Logical names removed by this version
    pub removed: &'static [&'static str],
    /// Logical names marked deprecated by this version
    pub deprecated: &'static [&'static str],
}

impl SpecDiff {
    /// Apply to a copy of the base fields
    pub fn apply(self, mut fields: Vec<FieldDescriptor>) -> Vec<FieldDescriptor> {
        fields.retain(|field| !self.removed.contains(&field.name));
        for added in self.added {
            match fields.iter_mut().find(|field| field.name == added.name) {
                Some(existing) => *existing = added,
                None => fields.push(added),
            }
        }
        for field in fields.iter_mut() {
            if self.deprecated.contains(&field.name) {
                field.deprecated = true;
            }
        }
        fields
    }
}

/// Field table of one version, with its inverse wire map
#[derive(Debug)]
pub struct Spec {
    version: SpecVersion,
    fields: Vec<FieldDescriptor>,
    by_name: HashMap<&'static str, usize>,
    by_key: HashMap<FieldKey, usize>,
    groups: HashSet<&'static str>,
}

impl Spec {
    /// Field table for a version
    pub fn get(version: SpecVersion) -> &'static Spec {
        let specs = SPECS.get_or_init(|| SpecVersion::ALL.map(Spec::build));
        &specs[version.index()]
    }

    fn build(version: SpecVersion) -> Spec {
        let fields = match version {
            SpecVersion::V1_0 | SpecVersion::V1_1 => base_fields(),
            SpecVersion::V1_2 => SpecDiff {
                added: vec![
                    field("PublicationID", Avm, "PublicationID", ValueKind::UnorderedStringList),
                    field("ProposalID", Avm, "ProposalID", ValueKind::UnorderedStringList),
                ],
                removed: &[],
                deprecated: &["RelatedResources"],
            }
            .apply(base_fields()),
        };

        let mut by_name = HashMap::new();
        let mut by_key = HashMap::new();
        let mut groups = HashSet::new();
        for (index, descriptor) in fields.iter().enumerate() {
            by_name.insert(descriptor.name, index);
            let previous = by_key.insert(descriptor.key(), index);
            debug_assert!(
                previous.is_none(),
                "duplicate wire tag {} in version {}",
                descriptor.key(),
                version
            );
            if let Some((group, _)) = descriptor.name.split_once('.') {
                groups.insert(group);
            }
        }

        Spec {
            version,
            fields,
            by_name,
            by_key,
            groups,
        }
    }

    /// Version of this table
    pub fn version(&self) -> SpecVersion {
        self.version
    }

    /// All descriptors in declaration order
    pub fn descriptors(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter()
    }

    /// Descriptor for a logical name
    pub fn descriptor(&self, name: &str) -> Option<&FieldDescriptor> {
        self.by_name.get(name).map(|&index| &self.fields[index])
    }

    /// Descriptor for a wire key
    pub fn lookup(&self, key: &FieldKey) -> Option<&FieldDescriptor> {
        self.by_key.get(key).map(|&index| &self.fields[index])
    }

    /// Whether a logical name is declared
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Whether a top-level name has dotted children (`Spatial`, `Distance`)
    pub fn is_group(&self, name: &str) -> bool {
        self.groups.contains(name)
    }

    /// Number of declared fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn field(
    name: &'static str,
    namespace: AvmNamespace,
    tag: &'static str,
    kind: ValueKind,
) -> FieldDescriptor {
    FieldDescriptor::new(name, namespace, tag, kind)
}

/// Shorthand for fields in the `avm` namespace, whose tag is their name
fn avm(name: &'static str, kind: ValueKind) -> FieldDescriptor {
    FieldDescriptor::new(name, Avm, name, kind)
}

/// The AVM 1.1 field table
fn base_fields() -> Vec<FieldDescriptor> {
    use ValueKind::*;

    vec![
        // Creator Metadata
        field("Creator", Photoshop, "Source", PlainString),
        field("CreatorURL", Iptc4xmpCore, "CreatorContactInfo.CiUrlWork", Url),
        field("Contact.Name", Dc, "creator", OrderedList),
        field("Contact.Email", Iptc4xmpCore, "CreatorContactInfo.CiEmailWork", Email),
        field("Contact.Address", Iptc4xmpCore, "CreatorContactInfo.CiAdrExtadr", PlainString),
        field("Contact.Telephone", Iptc4xmpCore, "CreatorContactInfo.CiTelWork", PlainString),
        field("Contact.City", Iptc4xmpCore, "CreatorContactInfo.CiAdrCity", PlainString),
        field("Contact.StateProvince", Iptc4xmpCore, "CreatorContactInfo.CiAdrRegion", PlainString),
        field("Contact.PostalCode", Iptc4xmpCore, "CreatorContactInfo.CiAdrPcode", PlainString),
        field("Contact.Country", Iptc4xmpCore, "CreatorContactInfo.CiAdrCtry", PlainString),
        field("Rights", XapRights, "UsageTerms", LocalizedString),
        // Content Metadata
        field("Title", Dc, "title", LocalizedString),
        field("Headline", Photoshop, "Headline", PlainString),
        field("Description", Dc, "description", LocalizedString),
        avm("Subject.Category", UnorderedStringList),
        field("Subject.Name", Dc, "subject", UnorderedStringList),
        avm("Distance", OrderedFloatList).with_max_length(2),
        avm("Distance.Notes", PlainString),
        avm("ReferenceURL", Url),
        field("Credit", Photoshop, "Credit", PlainString),
        field("Date", Photoshop, "DateCreated", PlainString),
        avm("ID", PlainString),
        avm("Type", PlainString).with_vocabulary(&vocabulary::TYPE),
        avm("Image.ProductQuality", PlainString)
            .with_vocabulary(&vocabulary::IMAGE_PRODUCT_QUALITY),
        // Observation Metadata
        avm("Facility", OrderedList),
        avm("Instrument", OrderedList),
        avm("Spectral.ColorAssignment", OrderedList)
            .with_vocabulary(&vocabulary::SPECTRAL_COLOR_ASSIGNMENT),
        avm("Spectral.Band", OrderedList).with_vocabulary(&vocabulary::SPECTRAL_BAND),
        avm("Spectral.Bandpass", OrderedList),
        avm("Spectral.CentralWavelength", OrderedFloatList),
        avm("Spectral.Notes", LocalizedString),
        avm("Temporal.StartTime", DateTimeList),
        avm("Temporal.IntegrationTime", OrderedFloatList),
        avm("DatasetID", OrderedList),
        // Coordinate Metadata
        avm("Spatial.CoordinateFrame", PlainString)
            .with_vocabulary(&vocabulary::SPATIAL_COORDINATE_FRAME),
        avm("Spatial.Equinox", PlainString),
        avm("Spatial.ReferenceValue", OrderedFloatList).with_exact_length(2),
        avm("Spatial.ReferenceDimension", OrderedFloatList).with_exact_length(2),
        avm("Spatial.ReferencePixel", OrderedFloatList).with_exact_length(2),
        avm("Spatial.Scale", OrderedFloatList).with_exact_length(2),
        avm("Spatial.Rotation", Float),
        avm("Spatial.CoordsystemProjection", PlainString)
            .with_vocabulary(&vocabulary::SPATIAL_COORDSYSTEM_PROJECTION),
        avm("Spatial.Quality", PlainString).with_vocabulary(&vocabulary::SPATIAL_QUALITY),
        avm("Spatial.Notes", LocalizedString),
        avm("Spatial.FITSheader", PlainString),
        avm("Spatial.CDMatrix", OrderedFloatList)
            .with_exact_length(4)
            .deprecated(),
        // Publisher Metadata
        avm("Publisher", PlainString),
        avm("PublisherID", PlainString),
        avm("ResourceID", PlainString),
        avm("ResourceURL", Url),
        avm("RelatedResources", UnorderedStringList),
        avm("MetadataDate", PlainString),
        avm("MetadataVersion", Float),
        // FITS Liberator Metadata
        avm("FL.BackgroundLevel", OrderedFloatList),
        avm("FL.BlackLevel", OrderedFloatList),
        avm("FL.ScaledPeakLevel", OrderedFloatList),
        avm("FL.PeakLevel", OrderedFloatList),
        avm("FL.WhiteLevel", OrderedFloatList),
        avm("FL.ScaledBackgroundLevel", OrderedFloatList),
        avm("FL.StretchFunction", OrderedList),
    ]
}
