//! Package graph checks
//!
//! Every internal relationship must point at a part that exists, and every
//! part must have a content type.

use slideforge_ooxml::content_types::CONTENT_TYPES_PART;
use slideforge_ooxml::relationships::resolve_target;
use slideforge_ooxml::{ContentTypes, OoxmlArchive, Relationships};
use tracing::debug;

use crate::issue::ValidationIssue;
use crate::PackageValidator;

pub struct RelationshipValidator;

impl PackageValidator for RelationshipValidator {
    fn code(&self) -> &'static str {
        "REL"
    }

    fn name(&self) -> &'static str {
        "relationships"
    }

    fn validate(&self, package: &OoxmlArchive) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let mut names: Vec<&str> = package.file_list().collect();
        names.sort_unstable();

        match package.get(CONTENT_TYPES_PART).map(ContentTypes::parse) {
            None => issues.push(ValidationIssue::error(
                CONTENT_TYPES_PART,
                "package has no content types part",
            )),
            // malformed XML is reported by the schema check
            Some(Err(e)) => debug!(error = %e, "content types unreadable"),
            Some(Ok(types)) => {
                for name in names.iter().filter(|n| **n != CONTENT_TYPES_PART) {
                    if types.content_type_of(name).is_none() {
                        issues.push(ValidationIssue::error(*name, "part has no content type"));
                    }
                }
            }
        }

        for rels_part in names.iter().filter(|n| n.ends_with(".rels")) {
            let Some(Ok(rels)) = package.get(rels_part).map(Relationships::parse) else {
                continue;
            };
            let source = source_part_for(rels_part);
            for rel in rels.iter().filter(|r| !r.external) {
                let target = resolve_target(&source, &rel.target);
                if !package.contains(&target) {
                    issues.push(ValidationIssue::error(
                        *rels_part,
                        format!("relationship {} targets missing part '{}'", rel.id, target),
                    ));
                }
            }
        }
        issues
    }
}

/// Part a relationship part belongs to; the package root is `""`
pub fn source_part_for(rels_part: &str) -> String {
    let trimmed = rels_part.strip_suffix(".rels").unwrap_or(rels_part);
    match trimmed.rsplit_once("_rels/") {
        Some((dir, file)) => format!("{}{}", dir, file),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slideforge_ooxml::content_types::CT_SLIDE;

    fn package() -> OoxmlArchive {
        let mut archive = OoxmlArchive::new();
        let mut types = ContentTypes::new();
        types.ensure_default("rels", "application/vnd.openxmlformats-package.relationships+xml");
        types.ensure_default("xml", "application/xml");
        types.set_override("ppt/slides/slide1.xml", CT_SLIDE);
        archive.set_string(CONTENT_TYPES_PART, types.to_xml());

        let mut rels = Relationships::new();
        rels.add(Relationships::TYPE_SLIDE, "slides/slide1.xml");
        rels.add_external(Relationships::TYPE_HYPERLINK, "https://example.com");
        archive.set_string("ppt/_rels/presentation.xml.rels", rels.to_xml());
        archive.set_string("ppt/presentation.xml", "<p/>");
        archive.set_string("ppt/slides/slide1.xml", "<s/>");
        archive
    }

    #[test]
    fn test_source_part_for() {
        assert_eq!(source_part_for("_rels/.rels"), "");
        assert_eq!(
            source_part_for("ppt/slides/_rels/slide1.xml.rels"),
            "ppt/slides/slide1.xml"
        );
    }

    #[test]
    fn test_consistent_package_passes() {
        assert!(RelationshipValidator.validate(&package()).is_empty());
    }

    #[test]
    fn test_dangling_target_and_missing_content_type() {
        let mut archive = package();
        archive.remove("ppt/slides/slide1.xml");
        archive.set("ppt/media/image1.emf", vec![1, 2]);

        let issues = RelationshipValidator.validate(&archive);
        let messages: Vec<String> = issues.iter().map(|i| i.to_string()).collect();
        assert_eq!(
            messages,
            vec![
                "ppt/media/image1.emf: error: part has no content type",
                "ppt/_rels/presentation.xml.rels: error: relationship rId1 targets missing part 'ppt/slides/slide1.xml'",
            ]
        );
    }

    #[test]
    fn test_missing_content_types_part() {
        let mut archive = package();
        archive.remove(CONTENT_TYPES_PART);
        let issues = RelationshipValidator.validate(&archive);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].part_path, CONTENT_TYPES_PART);
    }
}
