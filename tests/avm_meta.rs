//! Tests for AvmMeta
//!
//! These tests verify reading, validating, migrating and writing metadata.

#[path = "fixtures/mod.rs"]
mod fixtures;

use avmkit::{AvmError, AvmMeta, AvmValue, AvmWarning, SpecVersion};
use fixtures::sample_packet;
use pretty_assertions::assert_eq;

mod parse_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_sample_packet() {
        let meta = AvmMeta::from_xml(&sample_packet("eso1723a")).unwrap();

        assert_eq!(meta.version(), SpecVersion::V1_2);
        assert_eq!(meta.get("ID").unwrap(), Some(&AvmValue::from("eso1723a")));
        assert_eq!(meta.get("Type").unwrap(), Some(&AvmValue::from("Observation")));
        assert_eq!(
            meta.get("Title").unwrap(),
            Some(&AvmValue::from("Pillars of Creation"))
        );
        assert_eq!(
            meta.get("Subject.Name").unwrap(),
            Some(&AvmValue::from(vec!["nebula", "star formation"]))
        );
        assert_eq!(meta.get("Credit").unwrap(), Some(&AvmValue::from("ESO")));
        assert_eq!(
            meta.get("Contact.Email").unwrap(),
            Some(&AvmValue::from("pio@eso.org"))
        );
        assert_eq!(
            meta.get("CreatorURL").unwrap(),
            Some(&AvmValue::from("https://www.eso.org"))
        );
        assert_eq!(
            meta.get("Spatial.Scale").unwrap(),
            Some(&AvmValue::from([-0.0002777777777778, 0.0002777777777778]))
        );
        assert_eq!(
            meta.get("Spectral.Band").unwrap(),
            Some(&AvmValue::from(vec!["Optical", "Infrared"]))
        );
    }

    #[test]
    fn parse_via_from_str() {
        let meta: AvmMeta = sample_packet("abc").parse().unwrap();
        assert_eq!(meta.get("ID").unwrap(), Some(&AvmValue::from("abc")));
    }

    #[test]
    fn foreign_namespaces_are_ignored() {
        let mut meta = AvmMeta::from_xml(&sample_packet("abc")).unwrap();
        // xmp:CreatorTool belongs to another schema and raises nothing
        assert!(meta.take_warnings().is_empty());
    }

    #[test]
    fn undeclared_avm_tag_is_ignored_with_warning() {
        let xml = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <rdf:Description xmlns:avm="http://www.communicatingastronomy.org/avm/1.0/">
    <avm:ID>x</avm:ID>
    <avm:Bogus>y</avm:Bogus>
  </rdf:Description>
</rdf:RDF>"#;
        let mut meta = AvmMeta::from_xml(xml).unwrap();
        assert_eq!(meta.get("ID").unwrap(), Some(&AvmValue::from("x")));
        assert_eq!(
            meta.take_warnings(),
            vec![AvmWarning::TagIgnored {
                prefix: "avm",
                tag: "Bogus".to_string()
            }]
        );
    }

    #[test]
    fn non_numeric_float_is_fatal() {
        let xml = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <rdf:Description xmlns:avm="http://www.communicatingastronomy.org/avm/1.0/">
    <avm:Spatial.Rotation>north-up</avm:Spatial.Rotation>
  </rdf:Description>
</rdf:RDF>"#;
        assert!(matches!(
            AvmMeta::from_xml(xml),
            Err(AvmError::TypeError { .. })
        ));
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(AvmMeta::from_xml("<rdf:RDF><rdf:Description>").is_err());
        assert!(AvmMeta::from_xml("no markup at all").is_err());
    }

    #[test]
    fn older_version_packet() {
        let xml = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <rdf:Description xmlns:avm="http://www.communicatingastronomy.org/avm/1.0/"
      avm:MetadataVersion="1.1" avm:ProposalID="25661"/>
</rdf:RDF>"#;
        let mut meta = AvmMeta::from_xml(xml).unwrap();
        assert_eq!(meta.version(), SpecVersion::V1_1);
        assert!(matches!(
            meta.take_warnings()[..],
            [AvmWarning::TagIgnored { .. }]
        ));
    }
}

mod validation_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn controlled_vocabulary_case() {
        let mut meta = AvmMeta::new();
        meta.set("Type", "simulation").unwrap();
        assert_eq!(meta.get("Type").unwrap(), Some(&AvmValue::from("Simulation")));

        let err = meta.set("Type", "bogus").unwrap_err();
        assert!(matches!(err, AvmError::NotInControlledVocabulary { .. }));
    }

    #[test]
    fn controlled_vocabulary_in_lists() {
        let mut meta = AvmMeta::new();
        meta.set("Spectral.Band", vec!["optical", "-", "x-ray"]).unwrap();
        assert_eq!(
            meta.get("Spectral.Band").unwrap(),
            Some(&AvmValue::from(vec!["Optical", "-", "X-ray"]))
        );
        assert!(meta.set("Spectral.Band", vec!["optical", "sound"]).is_err());
    }

    #[test]
    fn strict_length_two() {
        let mut meta = AvmMeta::new();
        meta.set("Spatial.ReferencePixel", [512.0, 512.0]).unwrap();
        for value in [vec![1.0], vec![1.0, 2.0, 3.0]] {
            assert!(matches!(
                meta.set("Spatial.ReferencePixel", value),
                Err(AvmError::ListLengthError { .. })
            ));
        }
        assert_eq!(
            meta.get("Spatial.ReferencePixel").unwrap(),
            Some(&AvmValue::from([512.0, 512.0]))
        );
    }

    #[test]
    fn placeholder_only_list_is_unset() {
        let mut meta = AvmMeta::new();
        meta.set("Facility", vec!["-", "-"]).unwrap();
        assert_eq!(meta.get("Facility").unwrap(), None);
    }

    #[test]
    fn url_gets_scheme_and_bad_email_warns() {
        let mut meta = AvmMeta::new();
        meta.set("ReferenceURL", "www.eso.org/public").unwrap();
        assert_eq!(
            meta.get("ReferenceURL").unwrap(),
            Some(&AvmValue::from("http://www.eso.org/public"))
        );
        assert!(meta.take_warnings().is_empty());

        meta.set("Contact.Email", "not an email").unwrap();
        assert_eq!(
            meta.get("Contact.Email").unwrap(),
            Some(&AvmValue::from("not an email"))
        );
        assert!(matches!(
            meta.take_warnings()[..],
            [AvmWarning::InvalidEmail { .. }]
        ));
    }

    #[test]
    fn numeric_strings_become_floats() {
        let mut meta = AvmMeta::new();
        meta.set("Spatial.Rotation", "-12.5").unwrap();
        assert_eq!(meta.get("Spatial.Rotation").unwrap(), Some(&AvmValue::Float(-12.5)));
        assert!(matches!(
            meta.set("Spatial.Rotation", "twelve"),
            Err(AvmError::TypeError { .. })
        ));
    }

    #[test]
    fn dates_are_stored_as_iso_text() {
        let mut meta = AvmMeta::new();
        let start = avmkit::AvmDateTime::date_time(2017, 3, 1, 22, 5, 0);
        meta.set("Temporal.StartTime", vec![start]).unwrap();
        assert_eq!(
            meta.get("Temporal.StartTime").unwrap(),
            Some(&AvmValue::from(vec![start.format()]))
        );
    }

    #[test]
    fn unknown_and_group_names() {
        let mut meta = AvmMeta::new();
        assert!(matches!(meta.set("Nope", "x"), Err(AvmError::UnknownField { .. })));
        assert!(matches!(meta.set("Contact", "x"), Err(AvmError::NotAScalarField(_))));
        let err = meta.get("Nope").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Nope is not a valid AVM group or tag in the 1.2 standard"
        );
    }
}

mod migration_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn proposal_id_dropped_when_moving_to_1_1() {
        let mut meta = AvmMeta::new();
        meta.set("ProposalID", vec!["25661"]).unwrap();
        meta.set_version(SpecVersion::V1_1);

        let warnings = meta.take_warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].to_string(),
            "ProposalID is not defined in format specification 1.1 and will be deleted"
        );
        assert!(matches!(
            meta.get("ProposalID"),
            Err(AvmError::UnknownField { .. })
        ));
    }

    #[test]
    fn unset_fields_migrate_silently() {
        let mut meta = AvmMeta::new();
        meta.set_version(SpecVersion::V1_0);
        meta.set_version(SpecVersion::V1_2);
        assert!(meta.take_warnings().is_empty());
        assert_eq!(meta.get("PublicationID").unwrap(), None);
    }

    #[test]
    fn common_fields_survive_migration() {
        let mut meta = AvmMeta::new();
        meta.set("ID", "eso1723a").unwrap();
        meta.set("Distance", vec![12.0]).unwrap();
        meta.set_version(SpecVersion::V1_1);
        assert_eq!(meta.get("ID").unwrap(), Some(&AvmValue::from("eso1723a")));
        assert_eq!(meta.get("Distance").unwrap(), Some(&AvmValue::from(vec![12.0])));
    }
}

mod serialize_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn xmp_packet_envelope() {
        let mut meta = AvmMeta::new();
        meta.set("ID", "eso1723a").unwrap();
        let xmp = meta.to_xmp().unwrap();
        assert!(xmp.starts_with("<?xpacket begin=\"\u{feff}\" id=\"W5M0MpCehiHzreSzNTczkc9d\"?>"));
        assert!(xmp.trim_end().ends_with("<?xpacket end=\"w\"?>"));
        assert!(xmp.contains("<avm:ID>eso1723a</avm:ID>"));
    }

    #[test]
    fn floats_use_sixteen_decimals() {
        let mut meta = AvmMeta::new();
        meta.set("Spatial.Scale", [-0.5, 0.25]).unwrap();
        let xml = meta.to_xml().unwrap();
        assert!(xml.contains("<rdf:li>-0.5000000000000000</rdf:li>"));
        assert!(xml.contains("<rdf:li>0.2500000000000000</rdf:li>"));
    }

    #[test]
    fn sample_round_trip() {
        let meta = AvmMeta::from_xml(&sample_packet("eso1723a")).unwrap();
        let again = AvmMeta::from_xml(&meta.to_xmp().unwrap()).unwrap();
        assert_eq!(again.fields(), meta.fields());
        assert_eq!(again.to_xml().unwrap(), meta.to_xml().unwrap());
    }

    #[test]
    fn contact_info_is_one_struct() {
        let mut meta = AvmMeta::new();
        meta.set("Contact.Email", "pio@eso.org").unwrap();
        meta.set("Contact.City", "Garching").unwrap();
        let xml = meta.to_xml().unwrap();
        assert_eq!(xml.matches("<Iptc4xmpCore:CreatorContactInfo").count(), 1);
        assert!(xml.contains("rdf:parseType=\"Resource\""));
    }

    #[test]
    fn display_lists_set_fields() {
        let meta = AvmMeta::from_xml(&sample_packet("eso1723a")).unwrap();
        let text = meta.to_string();
        assert!(text.contains("ID: eso1723a"));
        assert!(text.contains("Subject:\n   Name:\n      * nebula\n      * star formation\n"));
    }

    #[test]
    fn xml_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta.xmp");
        let mut meta = AvmMeta::new();
        meta.set("Title", "Orion").unwrap();
        std::fs::write(&path, meta.to_xmp().unwrap()).unwrap();

        let read = AvmMeta::from_xml_file(&path).unwrap();
        assert_eq!(read.get("Title").unwrap(), Some(&AvmValue::from("Orion")));
        assert!(matches!(
            AvmMeta::from_xml_file(dir.path().join("missing.xmp")),
            Err(AvmError::IoError(_))
        ));
    }
}
