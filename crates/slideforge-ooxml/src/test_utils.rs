//! Shared fixtures for slideforge-ooxml tests

use crate::archive::OoxmlArchive;

const PML: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const DML: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

fn rels(entries: &[(&str, &str, &str)]) -> String {
    let mut xml = format!(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{PKG_REL}">"#);
    for (id, short_type, target) in entries {
        xml.push_str(&format!(
            r#"<Relationship Id="{id}" Type="{REL}/{short_type}" Target="{target}"/>"#
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

/// A one-slide presentation: presentation, master, layout, theme and slide,
/// all wired through relationships and content-type overrides
pub fn minimal_presentation() -> OoxmlArchive {
    let mut archive = OoxmlArchive::new();

    archive.set_string(
        "[Content_Types].xml",
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
  <Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>
  <Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>
  <Override PartName="/ppt/slides/slide1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>
  <Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>
</Types>"#,
    );
    archive.set_string(
        "_rels/.rels",
        rels(&[("rId1", "officeDocument", "ppt/presentation.xml")]),
    );
    archive.set_string(
        "ppt/presentation.xml",
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation xmlns:a="{DML}" xmlns:r="{REL}" xmlns:p="{PML}"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst><p:sldId id="256" r:id="rId2"/></p:sldIdLst><p:sldSz cx="9144000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#
        ),
    );
    archive.set_string(
        "ppt/_rels/presentation.xml.rels",
        rels(&[
            ("rId1", "slideMaster", "slideMasters/slideMaster1.xml"),
            ("rId2", "slide", "slides/slide1.xml"),
            ("rId3", "theme", "theme/theme1.xml"),
        ]),
    );
    archive.set_string(
        "ppt/slideMasters/slideMaster1.xml",
        format!(r#"<p:sldMaster xmlns:a="{DML}" xmlns:r="{REL}" xmlns:p="{PML}"><p:cSld><p:spTree/></p:cSld></p:sldMaster>"#),
    );
    archive.set_string(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        rels(&[
            ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
            ("rId2", "theme", "../theme/theme1.xml"),
        ]),
    );
    archive.set_string(
        "ppt/slideLayouts/slideLayout1.xml",
        format!(r#"<p:sldLayout xmlns:a="{DML}" xmlns:r="{REL}" xmlns:p="{PML}"><p:cSld name="Blank"><p:spTree/></p:cSld></p:sldLayout>"#),
    );
    archive.set_string(
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        rels(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]),
    );
    archive.set_string(
        "ppt/slides/slide1.xml",
        format!(r#"<p:sld xmlns:a="{DML}" xmlns:r="{REL}" xmlns:p="{PML}"><p:cSld><p:spTree/></p:cSld></p:sld>"#),
    );
    archive.set_string(
        "ppt/slides/_rels/slide1.xml.rels",
        rels(&[("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml")]),
    );
    archive.set_string(
        "ppt/theme/theme1.xml",
        format!(r#"<a:theme xmlns:a="{DML}" name="Office"/>"#),
    );

    archive
}
