//! slideforge-validate - Package validation engine
//!
//! Checks the parts of an OOXML package against XSD schemas, repairs
//! whitespace preservation on text runs, and reports findings either in
//! full or relative to a reference document.
//!
//! # Architecture
//!
//! Individual checks implement [`PackageValidator`]. The
//! [`ValidationEngine`] runs every registered validator over a package and,
//! when a reference package is supplied, classifies each finding as
//! pre-existing or introduced. Only introduced errors fail a run.
//!
//! # Example
//!
//! ```
//! use slideforge_ooxml::OoxmlArchive;
//! use slideforge_validate::{SchemaSet, ValidationEngine};
//!
//! let engine = ValidationEngine::with_defaults(SchemaSet::builtin()?);
//! let mut package = OoxmlArchive::new();
//! package.set_string("word/t.xml", "<w:p xmlns:w=\"urn:w\"><w:t> x</w:t></w:p>");
//!
//! assert_eq!(engine.repair(&mut package)?, 1);
//! let report = engine.validate(&package, None);
//! assert!(report.introduced().all(|i| !i.message.contains("xml:space")));
//! # Ok::<(), slideforge_validate::ValidateError>(())
//! ```

mod builtin;
pub mod content;
pub mod differential;
pub mod error;
pub mod issue;
pub mod rels;
pub mod schema;
pub mod unpacked;
pub mod whitespace;
pub mod xsd;

use slideforge_ooxml::OoxmlArchive;
use tracing::{debug, info};

pub use error::{Result, ValidateError};
pub use issue::{IssueOrigin, ReportedIssue, Severity, ValidationIssue, ValidationReport};
pub use rels::RelationshipValidator;
pub use schema::{QName, SchemaSet};
pub use unpacked::UnpackedValidator;
pub use xsd::SchemaValidator;

/// A check over a whole package
///
/// Validators return findings as data; an `Err` from [`repair`] means the
/// package could not be rewritten, not that it is invalid.
///
/// [`repair`]: PackageValidator::repair
pub trait PackageValidator: Send + Sync {
    /// Short code, e.g. `"XSD"`
    fn code(&self) -> &'static str;

    fn name(&self) -> &'static str {
        "unnamed"
    }

    fn validate(&self, package: &OoxmlArchive) -> Vec<ValidationIssue>;

    /// Fix what can be fixed in place; returns the number of repairs
    fn repair(&self, _package: &mut OoxmlArchive) -> Result<usize> {
        Ok(0)
    }
}

/// Runs validators over packages
pub struct ValidationEngine {
    validators: Vec<Box<dyn PackageValidator>>,
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationEngine {
    pub fn new() -> Self {
        Self {
            validators: Vec::new(),
        }
    }

    /// Schema and relationship checks
    pub fn with_defaults(schemas: SchemaSet) -> Self {
        let mut engine = Self::new();
        engine.add_validator(Box::new(SchemaValidator::new(schemas)));
        engine.add_validator(Box::new(RelationshipValidator));
        engine
    }

    pub fn add_validator(&mut self, validator: Box<dyn PackageValidator>) {
        self.validators.push(validator);
    }

    pub fn validator_count(&self) -> usize {
        self.validators.len()
    }

    pub fn validator_names(&self) -> Vec<&'static str> {
        self.validators.iter().map(|v| v.name()).collect()
    }

    /// Run every validator's repair; returns the total number of repairs
    pub fn repair(&self, package: &mut OoxmlArchive) -> Result<usize> {
        let mut total = 0;
        for validator in &self.validators {
            let count = validator.repair(package)?;
            debug!(validator = validator.name(), count, "repair pass");
            total += count;
        }
        Ok(total)
    }

    /// Findings of every validator, in registration order
    pub fn check(&self, package: &OoxmlArchive) -> Vec<ValidationIssue> {
        self.validators
            .iter()
            .flat_map(|v| v.validate(package))
            .collect()
    }

    /// Validate `package`; with a `reference`, findings it shares are
    /// classified as pre-existing
    pub fn validate(&self, package: &OoxmlArchive, reference: Option<&OoxmlArchive>) -> ValidationReport {
        let current = self.check(package);
        let issues = match reference {
            Some(reference) => differential::classify(current, &self.check(reference)),
            None => differential::all_introduced(current),
        };
        let report = ValidationReport {
            parts_checked: package.xml_part_names().len(),
            issues,
            differential: reference.is_some(),
        };
        info!(
            parts = report.parts_checked,
            findings = report.issues.len(),
            errors = report.error_count(),
            "validated package"
        );
        report
    }
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tests::{sample_set, SAMPLE_NS};
    use slideforge_ooxml::content_types::CONTENT_TYPES_PART;
    use slideforge_ooxml::ContentTypes;

    struct Always;

    impl PackageValidator for Always {
        fn code(&self) -> &'static str {
            "T"
        }

        fn validate(&self, _package: &OoxmlArchive) -> Vec<ValidationIssue> {
            vec![ValidationIssue::warning("x.xml", "always")]
        }
    }

    fn package(slide: &str) -> OoxmlArchive {
        let mut archive = OoxmlArchive::new();
        let mut types = ContentTypes::new();
        types.ensure_default("xml", "application/xml");
        archive.set_string(CONTENT_TYPES_PART, types.to_xml());
        archive.set_string("ppt/slides/slide1.xml", slide);
        archive
    }

    fn slide(body: &str) -> String {
        format!(r#"<d:slide xmlns:d="{}"><d:title>T</d:title>{}</d:slide>"#, SAMPLE_NS, body)
    }

    #[test]
    fn test_engine_registration() {
        let mut engine = ValidationEngine::new();
        assert_eq!(engine.validator_count(), 0);
        engine.add_validator(Box::new(Always));
        assert_eq!(engine.validator_names(), vec!["unnamed"]);

        let defaults = ValidationEngine::with_defaults(SchemaSet::new());
        assert_eq!(defaults.validator_names(), vec!["schema", "relationships"]);
    }

    #[test]
    fn test_without_reference_everything_counts() {
        let engine = ValidationEngine::with_defaults(sample_set());
        let report = engine.validate(&package(&slide("<d:oops/>")), None);
        assert!(!report.passed());
        assert!(!report.differential);
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.parts_checked, 2);
    }

    #[test]
    fn test_reference_makes_shared_findings_pre_existing() {
        let engine = ValidationEngine::with_defaults(sample_set());
        let original = package(&slide("<d:oops/>"));
        let edited = package(&slide(r#"<d:oops/><d:sp id="1"/>"#));

        let report = engine.validate(&edited, Some(&original));
        assert!(report.differential);
        assert!(report.passed());
        assert_eq!(report.pre_existing().count(), 1);

        let worse = package(&slide(r#"<d:sp/>"#));
        let report = engine.validate(&worse, Some(&original));
        assert!(!report.passed());
        let introduced: Vec<&str> = report.introduced().map(|i| i.message.as_str()).collect();
        assert_eq!(introduced, vec!["missing required attribute 'id' on 'd:sp'"]);
    }

    #[test]
    fn test_repair_before_validate_excludes_whitespace_findings() {
        let engine = ValidationEngine::with_defaults(sample_set());
        let mut archive = package(&slide(r#"<d:sp id="1"><d:r><d:t>two </d:t></d:r></d:sp>"#));

        assert!(!engine.validate(&archive, None).passed());
        assert_eq!(engine.repair(&mut archive).unwrap(), 1);
        assert!(engine.validate(&archive, None).passed());
        assert_eq!(engine.repair(&mut archive).unwrap(), 0);
    }
}
