//! Removal of parts that nothing references
//!
//! A part is live when it can be reached from the package relationships
//! (`_rels/.rels`) by following internal relationships. Slides that are
//! related from the presentation but missing from its `p:sldIdLst` are
//! dropped first, so editing a deck by deleting `sldId` entries and then
//! cleaning removes the slides together with their charts and media.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::fs;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, info};

use crate::archive::OoxmlArchive;
use crate::content_types::{ContentTypes, CONTENT_TYPES_PART};
use crate::error::{OoxmlError, Result};
use crate::relationships::{rels_path_for, resolve_target, Relationships};

const PRESENTATION_PART: &str = "ppt/presentation.xml";

/// Outcome of a clean pass
#[derive(Debug, Clone, Default)]
pub struct CleanReport {
    /// Parts deleted from the package, sorted
    pub removed: Vec<String>,
    /// Slide relationships dropped because the slide is not listed in the deck
    pub dropped_slides: usize,
    /// Parts whose content changed and must be written back
    pub rewritten: Vec<String>,
}

/// Remove unreachable parts from an in-memory package
pub fn clean(archive: &mut OoxmlArchive) -> Result<CleanReport> {
    let mut report = CleanReport::default();

    report.dropped_slides = drop_unlisted_slides(archive)?;
    if report.dropped_slides > 0 {
        report.rewritten.push(rels_path_for(PRESENTATION_PART));
    }

    let live = reachable_parts(archive)?;
    let mut removed: BTreeSet<String> = BTreeSet::new();
    for name in archive.file_list() {
        if name == CONTENT_TYPES_PART || live.contains(name) {
            continue;
        }
        removed.insert(name.to_string());
    }

    for name in &removed {
        archive.remove(name);
        debug!(part = %name, "removed unreferenced part");
    }

    if let Some(raw) = archive.get(CONTENT_TYPES_PART) {
        let mut types = ContentTypes::parse(raw)?;
        let stale: Vec<String> = types
            .override_parts()
            .filter(|p| !archive.contains(p))
            .map(String::from)
            .collect();
        if !stale.is_empty() {
            for part in &stale {
                types.remove_override(part);
            }
            archive.set_string(CONTENT_TYPES_PART, types.to_xml());
            report.rewritten.push(CONTENT_TYPES_PART.to_string());
        }
    }

    report.removed = removed.into_iter().collect();
    Ok(report)
}

/// Clean an unpacked package directory in place
pub fn clean_dir(dir: &Path) -> Result<CleanReport> {
    let mut archive = OoxmlArchive::from_dir(dir)?;
    let report = clean(&mut archive)?;

    for name in &report.removed {
        fs::remove_file(dir.join(name))?;
    }
    for name in &report.rewritten {
        fs::write(dir.join(name), archive.require(name)?)?;
    }
    remove_empty_dirs(dir)?;

    info!(
        dir = %dir.display(),
        removed = report.removed.len(),
        "cleaned package"
    );
    Ok(report)
}

/// Every part reachable from the package root, including the `.rels` parts
/// that were followed
pub fn reachable_parts(archive: &OoxmlArchive) -> Result<HashSet<String>> {
    let mut live: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<String> = VecDeque::new();
    queue.push_back(String::new());

    while let Some(part) = queue.pop_front() {
        let rels_path = rels_path_for(&part);
        let Some(raw) = archive.get(&rels_path) else {
            continue;
        };
        live.insert(rels_path.clone());

        let rels = Relationships::parse(raw).map_err(|e| match e {
            OoxmlError::Xml(source) => OoxmlError::malformed(rels_path.clone(), source),
            other => other,
        })?;
        for rel in rels.iter().filter(|r| !r.external) {
            let target = resolve_target(&part, &rel.target);
            if archive.contains(&target) && live.insert(target.clone()) {
                queue.push_back(target);
            }
        }
    }

    Ok(live)
}

fn drop_unlisted_slides(archive: &mut OoxmlArchive) -> Result<usize> {
    let rels_path = rels_path_for(PRESENTATION_PART);
    let (Some(presentation), Some(raw_rels)) =
        (archive.get(PRESENTATION_PART), archive.get(&rels_path))
    else {
        return Ok(0);
    };

    let listed = listed_slide_ids(presentation)?;
    let mut rels = Relationships::parse(raw_rels)?;
    let unlisted: Vec<String> = rels
        .iter()
        .filter(|r| r.is_type("slide") && !listed.contains(&r.id))
        .map(|r| r.id.clone())
        .collect();

    for id in &unlisted {
        rels.remove(id);
    }
    if !unlisted.is_empty() {
        archive.set_string(rels_path, rels.to_xml());
    }
    Ok(unlisted.len())
}

/// Relationship IDs referenced from `p:sldIdLst/p:sldId/@r:id`
fn listed_slide_ids(presentation: &[u8]) -> Result<HashSet<String>> {
    let mut reader = Reader::from_reader(presentation);
    reader.config_mut().trim_text(true);

    let mut ids = HashSet::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.local_name().as_ref() == b"sldId" =>
            {
                for attr in e.attributes().filter_map(|a| a.ok()) {
                    let key = attr.key.as_ref();
                    if key != b"id" && key.ends_with(b":id") {
                        ids.insert(attr.unescape_value()?.into_owned());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(OoxmlError::malformed(PRESENTATION_PART, e)),
            _ => {}
        }
        buf.clear();
    }
    Ok(ids)
}

fn remove_empty_dirs(dir: &Path) -> Result<bool> {
    let mut empty = true;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() && remove_empty_dirs(&path)? {
            fs::remove_dir(&path)?;
        } else {
            empty = false;
        }
    }
    Ok(empty)
}
