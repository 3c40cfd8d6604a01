//! Built-in two-master template.
//!
//! Used when no template file is given. Master 0 carries cover slides (a
//! navy band along the bottom edge), master 1 carries content slides (a rule
//! under the title area). Each master has a single blank layout named after
//! `SlideContract::masters::blank_layout`.

use slideforge_ooxml::content_types::CONTENT_TYPES_PART;
use slideforge_ooxml::xml::escape_xml;
use slideforge_ooxml::{ContentTypes, OoxmlArchive, Relationships};

use crate::constants::*;
use crate::slide_contract::SlideContract;

const REL_TYPE_CORE_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
const REL_TYPE_EXTENDED_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
const REL_TYPE_PRES_PROPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/presProps";
const REL_TYPE_VIEW_PROPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/viewProps";
const REL_TYPE_TABLE_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/tableStyles";

const CT_PRESENTATION: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
const CT_PRES_PROPS: &str = "application/vnd.openxmlformats-officedocument.presentationml.presProps+xml";
const CT_VIEW_PROPS: &str = "application/vnd.openxmlformats-officedocument.presentationml.viewProps+xml";
const CT_TABLE_STYLES: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.tableStyles+xml";
const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
const CT_SLIDE_MASTER: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
const CT_SLIDE_LAYOUT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
const CT_CORE: &str = "application/vnd.openxmlformats-package.core-properties+xml";
const CT_APP: &str = "application/vnd.openxmlformats-officedocument.extended-properties+xml";

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Which decoration a master carries
#[derive(Debug, Clone, Copy)]
enum MasterStyle {
    Cover,
    Content,
}

/// Generate the built-in template package
pub fn builtin_package(contract: &SlideContract) -> OoxmlArchive {
    let mut archive = OoxmlArchive::new();

    write_content_types(&mut archive);
    write_root_rels(&mut archive);
    write_app_xml(&mut archive);
    write_core_xml(&mut archive, &contract.meta.name);
    write_presentation(&mut archive);
    write_pres_props(&mut archive);
    write_view_props(&mut archive);
    write_table_styles(&mut archive, &contract.table.style_id);

    for (index, style) in [(1, MasterStyle::Cover), (2, MasterStyle::Content)] {
        write_theme(&mut archive, index, contract);
        write_slide_master(&mut archive, index, style);
        write_blank_layout(&mut archive, index, &contract.masters.blank_layout);
    }

    archive
}

fn write_content_types(archive: &mut OoxmlArchive) {
    let mut types = ContentTypes::new();
    types.ensure_default("rels", "application/vnd.openxmlformats-package.relationships+xml");
    types.ensure_default("xml", "application/xml");
    types.ensure_default("png", "image/png");
    types.ensure_default("jpeg", "image/jpeg");
    types.ensure_default("jpg", "image/jpeg");

    types.set_override("ppt/presentation.xml", CT_PRESENTATION);
    types.set_override("ppt/presProps.xml", CT_PRES_PROPS);
    types.set_override("ppt/viewProps.xml", CT_VIEW_PROPS);
    types.set_override("ppt/tableStyles.xml", CT_TABLE_STYLES);
    for index in 1..=2 {
        types.set_override(&format!("ppt/theme/theme{}.xml", index), CT_THEME);
        types.set_override(
            &format!("ppt/slideMasters/slideMaster{}.xml", index),
            CT_SLIDE_MASTER,
        );
        types.set_override(
            &format!("ppt/slideLayouts/slideLayout{}.xml", index),
            CT_SLIDE_LAYOUT,
        );
    }
    types.set_override("docProps/core.xml", CT_CORE);
    types.set_override("docProps/app.xml", CT_APP);

    archive.set_string(CONTENT_TYPES_PART, types.to_xml());
}

fn write_root_rels(archive: &mut OoxmlArchive) {
    let mut rels = Relationships::new();
    rels.add(Relationships::TYPE_OFFICE_DOCUMENT, "ppt/presentation.xml");
    rels.add(REL_TYPE_CORE_PROPERTIES, "docProps/core.xml");
    rels.add(REL_TYPE_EXTENDED_PROPERTIES, "docProps/app.xml");
    archive.set_string("_rels/.rels", rels.to_xml());
}

fn write_app_xml(archive: &mut OoxmlArchive) {
    let content = format!(
        r#"{}
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
  <TotalTime>0</TotalTime>
  <Application>slideforge</Application>
  <PresentationFormat>On-screen Show (4:3)</PresentationFormat>
  <Slides>0</Slides>
  <Notes>0</Notes>
  <HiddenSlides>0</HiddenSlides>
  <ScaleCrop>false</ScaleCrop>
  <LinksUpToDate>false</LinksUpToDate>
  <SharedDoc>false</SharedDoc>
  <HyperlinksChanged>false</HyperlinksChanged>
  <AppVersion>{}</AppVersion>
</Properties>"#,
        XML_DECL,
        crate::VERSION
    );
    archive.set_string("docProps/app.xml", content);
}

fn write_core_xml(archive: &mut OoxmlArchive, title: &str) {
    let content = format!(
        r#"{}
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <dc:title>{}</dc:title>
  <dc:creator>slideforge</dc:creator>
  <cp:lastModifiedBy>slideforge</cp:lastModifiedBy>
  <cp:revision>1</cp:revision>
</cp:coreProperties>"#,
        XML_DECL,
        escape_xml(title)
    );
    archive.set_string("docProps/core.xml", content);
}

fn write_presentation(archive: &mut OoxmlArchive) {
    let mut rels = Relationships::new();
    let master1 = rels.add(Relationships::TYPE_SLIDE_MASTER, "slideMasters/slideMaster1.xml");
    let master2 = rels.add(Relationships::TYPE_SLIDE_MASTER, "slideMasters/slideMaster2.xml");
    rels.add(REL_TYPE_PRES_PROPS, "presProps.xml");
    rels.add(REL_TYPE_VIEW_PROPS, "viewProps.xml");
    rels.add(Relationships::TYPE_THEME, "theme/theme1.xml");
    rels.add(REL_TYPE_TABLE_STYLES, "tableStyles.xml");

    // Master and layout IDs share one number space above 2^31
    let content = format!(
        r#"{}
<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1">
  <p:sldMasterIdLst>
    <p:sldMasterId id="2147483648" r:id="{}"/>
    <p:sldMasterId id="2147483650" r:id="{}"/>
  </p:sldMasterIdLst>
  <p:sldSz cx="{}" cy="{}" type="screen4x3"/>
  <p:notesSz cx="{}" cy="{}"/>
</p:presentation>"#,
        XML_DECL,
        NS_DRAWING,
        NS_RELATIONSHIPS,
        NS_PRESENTATION,
        master1,
        master2,
        DEFAULT_SLIDE_WIDTH_EMU,
        DEFAULT_SLIDE_HEIGHT_EMU,
        DEFAULT_SLIDE_HEIGHT_EMU, // Notes are rotated
        DEFAULT_SLIDE_WIDTH_EMU
    );
    archive.set_string("ppt/presentation.xml", content);
    archive.set_string("ppt/_rels/presentation.xml.rels", rels.to_xml());
}

fn write_pres_props(archive: &mut OoxmlArchive) {
    let content = format!(
        r#"{}
<p:presentationPr xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"/>"#,
        XML_DECL, NS_DRAWING, NS_RELATIONSHIPS, NS_PRESENTATION
    );
    archive.set_string("ppt/presProps.xml", content);
}

fn write_view_props(archive: &mut OoxmlArchive) {
    let content = format!(
        r#"{}
<p:viewPr xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">
  <p:normalViewPr>
    <p:restoredLeft sz="15620"/>
    <p:restoredTop sz="94660"/>
  </p:normalViewPr>
  <p:slideViewPr>
    <p:cSldViewPr>
      <p:cViewPr>
        <p:scale>
          <a:sx n="100" d="100"/>
          <a:sy n="100" d="100"/>
        </p:scale>
        <p:origin x="0" y="0"/>
      </p:cViewPr>
    </p:cSldViewPr>
  </p:slideViewPr>
</p:viewPr>"#,
        XML_DECL, NS_DRAWING, NS_RELATIONSHIPS, NS_PRESENTATION
    );
    archive.set_string("ppt/viewProps.xml", content);
}

fn write_table_styles(archive: &mut OoxmlArchive, default_style: &str) {
    let content = format!(
        r#"{}
<a:tblStyleLst xmlns:a="{}" def="{}"/>"#,
        XML_DECL,
        NS_DRAWING,
        escape_xml(default_style)
    );
    archive.set_string("ppt/tableStyles.xml", content);
}

fn write_theme(archive: &mut OoxmlArchive, index: usize, contract: &SlideContract) {
    let latin = escape_xml(&contract.fonts.latin);
    let ea = escape_xml(&contract.fonts.east_asian);

    let content = format!(
        r#"{}
<a:theme xmlns:a="{}" name="slideforge {}">
  <a:themeElements>
    <a:clrScheme name="slideforge">
      <a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>
      <a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>
      <a:dk2><a:srgbClr val="072A5E"/></a:dk2>
      <a:lt2><a:srgbClr val="E7E6E6"/></a:lt2>
      <a:accent1><a:srgbClr val="0070C0"/></a:accent1>
      <a:accent2><a:srgbClr val="C00000"/></a:accent2>
      <a:accent3><a:srgbClr val="808080"/></a:accent3>
      <a:accent4><a:srgbClr val="FF7F00"/></a:accent4>
      <a:accent5><a:srgbClr val="00B050"/></a:accent5>
      <a:accent6><a:srgbClr val="7030A0"/></a:accent6>
      <a:hlink><a:srgbClr val="0563C1"/></a:hlink>
      <a:folHlink><a:srgbClr val="954F72"/></a:folHlink>
    </a:clrScheme>
    <a:fontScheme name="slideforge">
      <a:majorFont>
        <a:latin typeface="{latin}"/>
        <a:ea typeface="{ea}"/>
        <a:cs typeface=""/>
      </a:majorFont>
      <a:minorFont>
        <a:latin typeface="{latin}"/>
        <a:ea typeface="{ea}"/>
        <a:cs typeface=""/>
      </a:minorFont>
    </a:fontScheme>
    <a:fmtScheme name="slideforge">
      <a:fillStyleLst>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
      </a:fillStyleLst>
      <a:lnStyleLst>
        <a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
        <a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
        <a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
      </a:lnStyleLst>
      <a:effectStyleLst>
        <a:effectStyle><a:effectLst/></a:effectStyle>
        <a:effectStyle><a:effectLst/></a:effectStyle>
        <a:effectStyle><a:effectLst/></a:effectStyle>
      </a:effectStyleLst>
      <a:bgFillStyleLst>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
      </a:bgFillStyleLst>
    </a:fmtScheme>
  </a:themeElements>
</a:theme>"#,
        XML_DECL, NS_DRAWING, index
    );
    archive.set_string(format!("ppt/theme/theme{}.xml", index), content);
}

fn master_decoration(style: MasterStyle) -> String {
    match style {
        // Navy band along the bottom edge
        MasterStyle::Cover => format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Band"/><p:cNvSpPr/><p:nvPr userDrawn="1"/></p:nvSpPr><p:spPr><a:xfrm><a:off x="0" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:solidFill><a:srgbClr val="072A5E"/></a:solidFill><a:ln><a:noFill/></a:ln></p:spPr><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang="en-US"/></a:p></p:txBody></p:sp>"#,
            DEFAULT_SLIDE_HEIGHT_EMU - 457_200,
            DEFAULT_SLIDE_WIDTH_EMU,
            457_200
        ),
        // Rule under the title area
        MasterStyle::Content => format!(
            r#"<p:cxnSp><p:nvCxnSpPr><p:cNvPr id="2" name="Header Rule"/><p:cNvCxnSpPr/><p:nvPr userDrawn="1"/></p:nvCxnSpPr><p:spPr><a:xfrm><a:off x="179512" y="{}"/><a:ext cx="{}" cy="0"/></a:xfrm><a:prstGeom prst="line"><a:avLst/></a:prstGeom><a:ln w="{}"><a:solidFill><a:srgbClr val="072A5E"/></a:solidFill></a:ln></p:spPr></p:cxnSp>"#,
            650_000,
            DEFAULT_SLIDE_WIDTH_EMU - 2 * 179_512,
            2 * EMU_PER_POINT
        ),
    }
}

fn write_slide_master(archive: &mut OoxmlArchive, index: usize, style: MasterStyle) {
    let mut rels = Relationships::new();
    let layout = rels.add(
        Relationships::TYPE_SLIDE_LAYOUT,
        &format!("../slideLayouts/slideLayout{}.xml", index),
    );
    rels.add(Relationships::TYPE_THEME, &format!("../theme/theme{}.xml", index));

    let layout_id = 2_147_483_649u64 + 2 * (index as u64 - 1);
    let content = format!(
        r#"{}
<p:sldMaster xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">
  <p:cSld>
    <p:bg>
      <p:bgRef idx="1001">
        <a:schemeClr val="bg1"/>
      </p:bgRef>
    </p:bg>
    <p:spTree>
      <p:nvGrpSpPr>
        <p:cNvPr id="1" name=""/>
        <p:cNvGrpSpPr/>
        <p:nvPr/>
      </p:nvGrpSpPr>
      <p:grpSpPr/>
      {}
    </p:spTree>
  </p:cSld>
  <p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>
  <p:sldLayoutIdLst>
    <p:sldLayoutId id="{}" r:id="{}"/>
  </p:sldLayoutIdLst>
</p:sldMaster>"#,
        XML_DECL,
        NS_DRAWING,
        NS_RELATIONSHIPS,
        NS_PRESENTATION,
        master_decoration(style),
        layout_id,
        layout
    );

    archive.set_string(format!("ppt/slideMasters/slideMaster{}.xml", index), content);
    archive.set_string(
        format!("ppt/slideMasters/_rels/slideMaster{}.xml.rels", index),
        rels.to_xml(),
    );
}

fn write_blank_layout(archive: &mut OoxmlArchive, index: usize, name: &str) {
    let content = format!(
        r#"{}
<p:sldLayout xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" type="blank" preserve="1">
  <p:cSld name="{}">
    <p:spTree>
      <p:nvGrpSpPr>
        <p:cNvPr id="1" name=""/>
        <p:cNvGrpSpPr/>
        <p:nvPr/>
      </p:nvGrpSpPr>
      <p:grpSpPr/>
    </p:spTree>
  </p:cSld>
  <p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sldLayout>"#,
        XML_DECL,
        NS_DRAWING,
        NS_RELATIONSHIPS,
        NS_PRESENTATION,
        escape_xml(name)
    );

    let mut rels = Relationships::new();
    rels.add(
        Relationships::TYPE_SLIDE_MASTER,
        &format!("../slideMasters/slideMaster{}.xml", index),
    );

    archive.set_string(format!("ppt/slideLayouts/slideLayout{}.xml", index), content);
    archive.set_string(
        format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", index),
        rels.to_xml(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_package_parts() {
        let archive = builtin_package(&SlideContract::default());

        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "ppt/presentation.xml",
            "ppt/_rels/presentation.xml.rels",
            "ppt/slideMasters/slideMaster1.xml",
            "ppt/slideMasters/slideMaster2.xml",
            "ppt/slideLayouts/slideLayout1.xml",
            "ppt/slideLayouts/_rels/slideLayout2.xml.rels",
            "ppt/theme/theme2.xml",
            "docProps/app.xml",
        ] {
            assert!(archive.contains(part), "missing {}", part);
        }
    }

    #[test]
    fn test_builtin_layouts_use_contract_name() {
        let mut contract = SlideContract::default();
        contract.masters.blank_layout = "Blank".to_string();
        let archive = builtin_package(&contract);

        let layout = archive
            .get_string("ppt/slideLayouts/slideLayout2.xml")
            .unwrap()
            .unwrap();
        assert!(layout.contains(r#"<p:cSld name="Blank">"#));
    }

    #[test]
    fn test_builtin_relationships_resolve() {
        let archive = builtin_package(&SlideContract::default());
        let live = slideforge_ooxml::clean::reachable_parts(&archive).unwrap();

        assert!(live.contains("ppt/slideLayouts/slideLayout1.xml"));
        assert!(live.contains("ppt/theme/theme2.xml"));
        assert!(live.contains("docProps/core.xml"));
    }
}
