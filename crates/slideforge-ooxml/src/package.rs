//! Pack and unpack presentation packages
//!
//! `unpack` extracts a `.pptx` into a directory and pretty-prints its XML;
//! `pack` condenses the XML of an unpacked directory and zips it back. The
//! cosmetic steps of unpack are best effort per file; condensing on pack is
//! not, since a part that cannot be parsed would produce a broken package.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::archive::{is_xml_part, OoxmlArchive};
use crate::error::{OoxmlError, Result};
use crate::xml::{condense, escape_smart_quotes, pretty_print};

/// Outcome of [`unpack`]
#[derive(Debug, Clone, Default)]
pub struct UnpackReport {
    /// Number of XML parts written (`*.xml` and `*.rels`)
    pub xml_files: usize,
    /// Parts left as extracted because pretty-printing failed
    pub skipped: Vec<String>,
}

/// Outcome of [`pack`]
#[derive(Debug, Clone, Default)]
pub struct PackReport {
    pub files: usize,
    pub condensed: usize,
}

/// Whether a path carries the `.pptx` extension (case-insensitive)
pub fn has_pptx_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pptx"))
        .unwrap_or(false)
}

/// Extract `input` into `output_dir`, pretty-printing every XML part and
/// rewriting smart quotes as character references
pub fn unpack(input: &Path, output_dir: &Path) -> Result<UnpackReport> {
    if !input.exists() {
        return Err(OoxmlError::invalid_input(input, "does not exist"));
    }
    if !has_pptx_extension(input) {
        return Err(OoxmlError::invalid_input(input, "must be a .pptx file"));
    }

    let mut archive = OoxmlArchive::open(input).map_err(|e| match e {
        OoxmlError::Archive(_) => OoxmlError::invalid_input(input, "is not a valid PPTX file"),
        other => other,
    })?;

    let mut report = UnpackReport::default();
    for name in archive.xml_part_names() {
        report.xml_files += 1;
        let Some(raw) = archive.get(&name) else {
            continue;
        };

        let pretty = match pretty_print(raw, &name) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(part = %name, error = %e, "pretty-print skipped");
                report.skipped.push(name.clone());
                raw.to_vec()
            }
        };

        match String::from_utf8(pretty) {
            Ok(text) => archive.set_string(name.as_str(), escape_smart_quotes(&text)),
            Err(e) => {
                warn!(part = %name, "smart-quote escaping skipped: not UTF-8");
                archive.set(name.as_str(), e.into_bytes());
            }
        }
    }

    archive.extract_to_dir(output_dir)?;
    info!(
        input = %input.display(),
        output = %output_dir.display(),
        xml_files = report.xml_files,
        "unpacked"
    );
    Ok(report)
}

/// Condense every XML part below `input_dir` and write a deflated `.pptx`.
///
/// The input directory is not modified.
pub fn pack(input_dir: &Path, output: &Path) -> Result<PackReport> {
    if !input_dir.is_dir() {
        return Err(OoxmlError::invalid_input(input_dir, "is not a directory"));
    }
    if !has_pptx_extension(output) {
        return Err(OoxmlError::invalid_input(output, "must be a .pptx file"));
    }

    let mut archive = OoxmlArchive::from_dir(input_dir)?;
    let mut report = PackReport {
        files: archive.len(),
        condensed: 0,
    };

    let names: Vec<String> = archive.file_list().map(String::from).collect();
    for name in names.iter().filter(|n| is_xml_part(n)) {
        let raw = archive.require(name)?;
        let condensed = condense(raw, name)?;
        debug!(part = %name, before = raw.len(), after = condensed.len(), "condensed");
        archive.set(name.as_str(), condensed);
        report.condensed += 1;
    }

    archive.write_to_file(output)?;
    info!(
        input = %input_dir.display(),
        output = %output.display(),
        files = report.files,
        "packed"
    );
    Ok(report)
}

/// Default output directory for an unpacked deck: `<stem>/` next to it
pub fn default_unpack_dir(input: &Path) -> PathBuf {
    input.with_extension("")
}
