//! Unpack a package, edit it, then validate against the original.

use std::fs;
use std::path::Path;

use slideforge_ooxml::{unpack, OoxmlArchive};
use slideforge_validate::{IssueOrigin, SchemaSet, UnpackedValidator};
use tempfile::TempDir;

const NS: &str = "urn:example:notes";

const NOTES_XSD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns="urn:example:notes"
            targetNamespace="urn:example:notes" elementFormDefault="qualified">
  <xsd:complexType name="CT_Line">
    <xsd:simpleContent>
      <xsd:extension base="xsd:string"/>
    </xsd:simpleContent>
  </xsd:complexType>
  <xsd:complexType name="CT_Notes">
    <xsd:sequence>
      <xsd:element name="t" type="CT_Line" maxOccurs="unbounded"/>
    </xsd:sequence>
    <xsd:attribute name="id" type="xsd:string" use="required"/>
  </xsd:complexType>
  <xsd:element name="notes" type="CT_Notes"/>
</xsd:schema>"#;

const TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="urn:notes" Target="notes/notes1.xml"/></Relationships>"#;

fn notes(body: &str) -> String {
    format!(r#"<n:notes xmlns:n="{}" id="1">{}</n:notes>"#, NS, body)
}

fn write_original(dir: &Path, notes_xml: &str) -> std::path::PathBuf {
    let mut archive = OoxmlArchive::new();
    archive.set_string("[Content_Types].xml", TYPES);
    archive.set_string("_rels/.rels", ROOT_RELS);
    archive.set_string("notes/notes1.xml", notes_xml);
    let path = dir.join("original.pptx");
    archive.write_to_file(&path).unwrap();
    path
}

fn schemas(dir: &Path) -> SchemaSet {
    let schema_dir = dir.join("schemas");
    fs::create_dir_all(&schema_dir).unwrap();
    fs::write(schema_dir.join("notes.xsd"), NOTES_XSD).unwrap();
    SchemaSet::load_dir(&schema_dir).unwrap()
}

#[test]
fn test_clean_original_round_trip_passes() {
    let tmp = TempDir::new().unwrap();
    let original = write_original(tmp.path(), &notes("<n:t>one</n:t>"));
    let unpacked = tmp.path().join("deck");
    unpack(&original, &unpacked).unwrap();

    let report = UnpackedValidator::new(&unpacked, schemas(tmp.path()))
        .with_original(&original)
        .validate()
        .unwrap();
    assert!(report.passed(), "{:?}", report.issues);
    assert!(report.issues.is_empty());
    assert_eq!(report.parts_checked, 3);
}

#[test]
fn test_unpacked_empty_text_run_stays_empty() {
    let tmp = TempDir::new().unwrap();
    let original = write_original(tmp.path(), &notes("<n:t></n:t><n:t>two</n:t>"));
    let unpacked = tmp.path().join("deck");
    unpack(&original, &unpacked).unwrap();

    let part = fs::read_to_string(unpacked.join("notes/notes1.xml")).unwrap();
    assert!(part.contains("<n:t/>"), "{}", part);
    assert!(part.contains("<n:t>two</n:t>"));

    let validator = UnpackedValidator::new(&unpacked, schemas(tmp.path())).with_original(&original);
    let report = validator.validate().unwrap();
    assert!(report.issues.is_empty(), "{:?}", report.issues);
    assert_eq!(validator.repair().unwrap(), 0);
}

#[test]
fn test_edit_introduces_only_new_findings() {
    let tmp = TempDir::new().unwrap();
    // the original already has an unexpected element
    let original = write_original(tmp.path(), &notes("<n:t>one</n:t><n:x/>"));
    let unpacked = tmp.path().join("deck");
    unpack(&original, &unpacked).unwrap();

    let part = unpacked.join("notes/notes1.xml");
    let edited = fs::read_to_string(&part).unwrap().replace(r#" id="1""#, "");
    fs::write(&part, edited).unwrap();

    let report = UnpackedValidator::new(&unpacked, schemas(tmp.path()))
        .with_original(&original)
        .validate()
        .unwrap();
    assert!(!report.passed());

    let pre: Vec<&str> = report.pre_existing().map(|i| i.message.as_str()).collect();
    assert_eq!(pre, vec!["element 'n:x' is not expected in 'n:notes'"]);
    let introduced: Vec<&str> = report.introduced().map(|i| i.message.as_str()).collect();
    assert_eq!(introduced, vec!["missing required attribute 'id' on 'n:notes'"]);
    assert!(report
        .issues
        .iter()
        .any(|r| r.origin == IssueOrigin::PreExisting));
}

#[test]
fn test_auto_repair_then_validate() {
    let tmp = TempDir::new().unwrap();
    let original = write_original(tmp.path(), &notes("<n:t>one</n:t>"));
    let unpacked = tmp.path().join("deck");
    unpack(&original, &unpacked).unwrap();

    let part = unpacked.join("notes/notes1.xml");
    let edited = fs::read_to_string(&part)
        .unwrap()
        .replace("<n:t>one</n:t>", "<n:t>one </n:t><n:t> two</n:t>");
    fs::write(&part, edited).unwrap();

    let validator = UnpackedValidator::new(&unpacked, schemas(tmp.path())).with_original(&original);
    assert_eq!(validator.validate().unwrap().error_count(), 2);
    assert_eq!(validator.repair().unwrap(), 2);
    assert!(validator.validate().unwrap().passed());
    assert_eq!(validator.repair().unwrap(), 0);
}

#[test]
fn test_malformed_part_does_not_stop_other_parts() {
    let tmp = TempDir::new().unwrap();
    let original = write_original(tmp.path(), &notes("<n:t>one</n:t>"));
    let unpacked = tmp.path().join("deck");
    unpack(&original, &unpacked).unwrap();

    fs::write(unpacked.join("notes/notes1.xml"), "<n:notes").unwrap();
    fs::write(
        unpacked.join("_rels/.rels"),
        ROOT_RELS.replace(r#"Type="urn:notes" "#, ""),
    )
    .unwrap();

    let report = UnpackedValidator::new(&unpacked, schemas(tmp.path()))
        .validate()
        .unwrap();
    let parts: Vec<&str> = report.introduced().map(|i| i.part_path.as_str()).collect();
    assert!(parts.contains(&"notes/notes1.xml"));
    assert!(parts.contains(&"_rels/.rels"));
}
