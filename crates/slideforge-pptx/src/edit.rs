//! Edits on existing presentations: add a blank slide, duplicate a slide.

use std::path::Path;
use std::sync::Arc;

use slideforge_ooxml::relationships::rels_path_for;
use slideforge_ooxml::{OoxmlArchive, Relationships};
use tracing::info;

use crate::error::{PptxError, Result};
use crate::slide::{DeckStyle, Slide, SlideKind};
use crate::slide_contract::SlideContract;
use crate::template::{load_rels, PotxTemplate};
use crate::writer::{slide_parts, PptxWriter};

/// Append an empty slide of `kind`; returns the new part name
pub fn add_blank_slide(
    archive: OoxmlArchive,
    kind: SlideKind,
    contract: &SlideContract,
) -> Result<(OoxmlArchive, String)> {
    let template = PotxTemplate::from_archive(archive)?;
    let masters = &contract.masters;
    let master = match kind {
        SlideKind::Cover => masters.cover,
        SlideKind::Content => masters.content,
    };
    let layout = template.layout_part(master, &masters.blank_layout)?.to_string();
    let slide = Slide::new(
        Arc::new(DeckStyle::new(contract.clone())?),
        kind,
        layout,
        template.slide_size,
    );

    let mut writer = PptxWriter::new(template.into_archive())?;
    let part = writer.add_slide(&slide)?;
    Ok((writer.finish()?, part))
}

/// Append a copy of slide `index` (1-based).
///
/// The copy shares every target of the source (layout, charts, media,
/// hyperlinks) under the same relationship ids; speaker notes are not
/// carried over.
pub fn duplicate_slide(archive: OoxmlArchive, index: usize) -> Result<(OoxmlArchive, String)> {
    let parts = slide_parts(&archive)?;
    if index < 1 || index > parts.len() {
        return Err(PptxError::SlideOutOfRange {
            index,
            count: parts.len(),
        });
    }
    let source = &parts[index - 1];
    let xml = archive
        .get(source)
        .ok_or_else(|| PptxError::invalid_template(format!("missing {}", source)))?
        .to_vec();
    let source_rels = load_rels(&archive, source)?;

    let mut rels = Relationships::new();
    for rel in source_rels.iter().filter(|r| !r.is_type("notesSlide")) {
        rels.push_with_id(rel.clone());
    }

    let mut writer = PptxWriter::new(archive)?;
    let part = writer.next_slide_part();
    writer.archive_mut().set(part.clone(), xml);
    writer
        .archive_mut()
        .set_string(rels_path_for(&part), rels.to_xml());
    writer.register_slide(&part)?;
    info!(source = %source, copy = %part, "duplicated slide");
    Ok((writer.finish()?, part))
}

/// File-level [`add_blank_slide`]; writes to `output` (or back to `input`)
pub fn add_blank_slide_file(
    input: &Path,
    output: Option<&Path>,
    kind: SlideKind,
    contract: &SlideContract,
) -> Result<String> {
    let archive = OoxmlArchive::open(input)?;
    let (archive, part) = add_blank_slide(archive, kind, contract)?;
    archive.write_to_file(output.unwrap_or(input))?;
    Ok(part)
}

/// File-level [`duplicate_slide`]; writes to `output` (or back to `input`)
pub fn duplicate_slide_file(input: &Path, output: Option<&Path>, index: usize) -> Result<String> {
    let archive = OoxmlArchive::open(input)?;
    let (archive, part) = duplicate_slide(archive, index)?;
    archive.write_to_file(output.unwrap_or(input))?;
    Ok(part)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::Presentation;
    use crate::placement::{PlacementSink, Rect};
    use crate::shapes::{ShapeSpec, ShapeType};

    fn deck_archive() -> OoxmlArchive {
        let mut deck = Presentation::new().unwrap();
        let slide = deck.create_slide().unwrap();
        slide.add_slide_title("Source").unwrap();
        slide
            .place_shape(&ShapeSpec::new(ShapeType::Oval), Rect::new(0, 0, 100, 100))
            .unwrap();
        deck.to_archive().unwrap()
    }

    #[test]
    fn test_add_blank_cover_slide() {
        let (archive, part) =
            add_blank_slide(deck_archive(), SlideKind::Cover, &SlideContract::default()).unwrap();
        assert_eq!(part, "ppt/slides/slide2.xml");
        let rels = archive
            .get_string("ppt/slides/_rels/slide2.xml.rels")
            .unwrap()
            .unwrap();
        assert!(rels.contains("slideLayout1.xml"));
        assert_eq!(slide_parts(&archive).unwrap().len(), 2);
    }

    #[test]
    fn test_duplicate_keeps_content_and_drops_notes() {
        let mut archive = deck_archive();
        let rels_part = "ppt/slides/_rels/slide1.xml.rels";
        let mut rels = Relationships::parse(archive.get(rels_part).unwrap()).unwrap();
        rels.add(Relationships::TYPE_NOTES_SLIDE, "../notesSlides/notesSlide1.xml");
        archive.set_string(rels_part, rels.to_xml());

        let (archive, part) = duplicate_slide(archive, 1).unwrap();
        assert_eq!(part, "ppt/slides/slide2.xml");
        assert_eq!(archive.get("ppt/slides/slide1.xml"), archive.get(&part));

        let copied = archive
            .get_string("ppt/slides/_rels/slide2.xml.rels")
            .unwrap()
            .unwrap();
        assert!(copied.contains(r#"Id="rId1""#));
        assert!(!copied.contains("notesSlide"));
    }

    #[test]
    fn test_duplicate_out_of_range() {
        let err = duplicate_slide(deck_archive(), 3).unwrap_err();
        assert_eq!(err.to_string(), "slide 3 out of range (1-1)");
        assert!(duplicate_slide(deck_archive(), 0).is_err());
    }
}
