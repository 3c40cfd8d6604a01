//! Archive handling for PPTX/POTX packages
//!
//! A package is a ZIP archive of XML parts and binary media. The archive is
//! held fully in memory; it can be loaded from a `.pptx` file or from an
//! unpacked directory tree, and written back to either.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{Read, Seek, Write};
use std::path::{Component, Path};

use tracing::debug;
use zip::read::ZipArchive;
use zip::write::ZipWriter;
use zip::CompressionMethod;

use crate::error::{OoxmlError, Result};

/// Represents an unpacked OOXML package
#[derive(Debug, Default, Clone)]
pub struct OoxmlArchive {
    /// All files in the archive, keyed by forward-slash path
    files: HashMap<String, Vec<u8>>,
}

impl OoxmlArchive {
    /// Create an empty package
    pub fn new() -> Self {
        Self::default()
    }

    /// Open and unpack a PPTX/POTX file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Create from any reader that implements Read + Seek
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut files = HashMap::new();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();

            // Skip directories
            if name.ends_with('/') {
                continue;
            }

            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            files.insert(name, contents);
        }

        debug!(parts = files.len(), "loaded package");
        Ok(Self { files })
    }

    /// Load every file below `dir`, keyed by its path relative to `dir`
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(OoxmlError::invalid_input(dir, "is not a directory"));
        }

        let mut files = HashMap::new();
        collect_dir(dir, dir, &mut files)?;
        debug!(parts = files.len(), dir = %dir.display(), "loaded unpacked package");
        Ok(Self { files })
    }

    /// Get a file's contents by path
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(|v| v.as_slice())
    }

    /// Get a file's contents as a string
    pub fn get_string(&self, path: &str) -> Result<Option<String>> {
        match self.files.get(path) {
            Some(bytes) => {
                let s = String::from_utf8_lossy(bytes).into_owned();
                Ok(Some(s))
            }
            None => Ok(None),
        }
    }

    /// Get a file's contents, failing when it is absent
    pub fn require(&self, path: &str) -> Result<&[u8]> {
        self.get(path)
            .ok_or_else(|| OoxmlError::MissingFile(path.to_string()))
    }

    /// Check if a file exists in the archive
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// List all files in the archive
    pub fn file_list(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(|s| s.as_str())
    }

    /// Sorted names of every XML part (`*.xml` and `*.rels`)
    pub fn xml_part_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .files
            .keys()
            .filter(|name| is_xml_part(name))
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Number of files in the archive
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if the archive holds no files
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Set or update a file's contents
    pub fn set(&mut self, path: impl Into<String>, contents: Vec<u8>) {
        self.files.insert(path.into(), contents);
    }

    /// Set a file's contents from a string
    pub fn set_string(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into().into_bytes());
    }

    /// Remove a file from the archive
    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        self.files.remove(path)
    }

    /// Write the archive to a file
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        self.write_to(file)
    }

    /// Write the archive to any writer
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated);

        // [Content_Types].xml goes first, then sorted keys for deterministic output
        let mut paths: Vec<_> = self.files.keys().collect();
        paths.sort_by(|a, b| {
            let a_ct = a.as_str() == "[Content_Types].xml";
            let b_ct = b.as_str() == "[Content_Types].xml";
            b_ct.cmp(&a_ct).then_with(|| a.cmp(b))
        });

        for path in paths {
            let contents = &self.files[path];
            zip.start_file(path.as_str(), options)?;
            zip.write_all(contents)?;
        }

        zip.finish()?;
        Ok(())
    }

    /// Serialize the archive into an in-memory ZIP
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut cursor = std::io::Cursor::new(Vec::new());
        self.write_to(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Write every file below `dir`, creating intermediate directories
    pub fn extract_to_dir<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        for (name, contents) in &self.files {
            let relative = Path::new(name);
            let escapes = relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)));
            if escapes {
                return Err(OoxmlError::InvalidStructure(format!(
                    "entry escapes the extraction directory: {}",
                    name
                )));
            }

            let target = dir.join(relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, contents)?;
        }

        Ok(())
    }
}

/// Whether a part name is an XML part that normalization applies to
pub fn is_xml_part(name: &str) -> bool {
    name.ends_with(".xml") || name.ends_with(".rels")
}

fn collect_dir(root: &Path, dir: &Path, files: &mut HashMap<String, Vec<u8>>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_dir(root, &path, files)?;
            continue;
        }

        let relative = path
            .strip_prefix(root)
            .map_err(|_| OoxmlError::invalid_input(&path, "is outside the package root"))?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.insert(name, fs::read(&path)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn test_file_operations() {
        let mut archive = OoxmlArchive::new();

        // Test set and get
        archive.set_string("test.xml", "<root/>");
        assert!(archive.contains("test.xml"));
        assert_eq!(
            archive.get_string("test.xml").unwrap(),
            Some("<root/>".to_string())
        );

        // Test remove
        archive.remove("test.xml");
        assert!(!archive.contains("test.xml"));
        assert!(archive.require("test.xml").is_err());
    }

    #[test]
    fn test_roundtrip_through_zip() {
        let mut archive = OoxmlArchive::new();
        archive.set_string("[Content_Types].xml", "<Types/>");
        archive.set_string("ppt/slides/slide1.xml", "<p:sld/>");
        archive.set("ppt/media/image1.png", vec![0x89, b'P', b'N', b'G']);

        let bytes = archive.to_bytes().unwrap();
        let restored = OoxmlArchive::from_reader(Cursor::new(bytes)).unwrap();

        assert_eq!(restored.len(), 3);
        assert_eq!(
            restored.get("ppt/media/image1.png"),
            Some(&[0x89, b'P', b'N', b'G'][..])
        );
    }

    #[test]
    fn test_content_types_written_first() {
        let mut archive = OoxmlArchive::new();
        archive.set_string("_rels/.rels", "<Relationships/>");
        archive.set_string("[Content_Types].xml", "<Types/>");

        let bytes = archive.to_bytes().unwrap();
        let mut zip = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(zip.by_index(0).unwrap().name(), "[Content_Types].xml");
    }

    #[test]
    fn test_xml_part_names_sorted_and_filtered() {
        let mut archive = OoxmlArchive::new();
        archive.set_string("ppt/slides/slide2.xml", "<a/>");
        archive.set_string("ppt/slides/_rels/slide2.xml.rels", "<a/>");
        archive.set_string("ppt/slides/slide1.xml", "<a/>");
        archive.set("ppt/media/image1.png", vec![1, 2, 3]);

        assert_eq!(
            archive.xml_part_names(),
            vec![
                "ppt/slides/_rels/slide2.xml.rels",
                "ppt/slides/slide1.xml",
                "ppt/slides/slide2.xml",
            ]
        );
    }

    #[test]
    fn test_extract_and_reload_dir() {
        let temp = TempDir::new().unwrap();
        let mut archive = OoxmlArchive::new();
        archive.set_string("ppt/slides/slide1.xml", "<p:sld/>");
        archive.set_string("_rels/.rels", "<Relationships/>");

        archive.extract_to_dir(temp.path()).unwrap();
        assert!(temp.path().join("ppt/slides/slide1.xml").is_file());

        let reloaded = OoxmlArchive::from_dir(temp.path()).unwrap();
        assert!(reloaded.contains("ppt/slides/slide1.xml"));
        assert!(reloaded.contains("_rels/.rels"));
    }

    #[test]
    fn test_extract_rejects_parent_components() {
        let temp = TempDir::new().unwrap();
        let mut archive = OoxmlArchive::new();
        archive.set_string("../evil.xml", "<x/>");

        assert!(archive.extract_to_dir(temp.path()).is_err());
    }

    #[test]
    fn test_corrupt_zip_is_an_error() {
        let result = OoxmlArchive::from_reader(Cursor::new(b"not a zip".to_vec()));
        assert!(matches!(result, Err(OoxmlError::Archive(_))));
    }
}
