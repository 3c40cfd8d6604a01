//! Project configuration (`slideforge.toml`)
//!
//! Every section is optional. Relative paths are resolved against the
//! directory of the configuration file.
//!
//! ```toml
//! [contract]
//! path = "house-style.toml"
//!
//! [template]
//! path = "corporate.pptx"
//! sha256 = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
//!
//! [validate]
//! schema_dir = "schemas"
//!
//! [render]
//! dpi = 200
//!
//! [version]
//! files = ["plugin/plugin.json"]
//! ```

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use slideforge_pptx::{PotxTemplate, Presentation, SlideContract};
use slideforge_validate::SchemaSet;
use tracing::{debug, warn};

/// File name looked up in the working directory
pub const CONFIG_FILE: &str = "slideforge.toml";

/// Environment variable overriding `[validate] schema_dir`
pub const SCHEMA_DIR_ENV: &str = "SLIDEFORGE_SCHEMA_DIR";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub contract: ContractSection,
    pub template: TemplateSection,
    pub validate: ValidateSection,
    pub render: RenderConfig,
    pub version: VersionSection,
    #[serde(skip)]
    base_dir: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContractSection {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplateSection {
    pub path: Option<PathBuf>,
    /// Expected SHA-256 of the template file, hex encoded
    pub sha256: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidateSection {
    pub schema_dir: Option<PathBuf>,
}

/// External tools used by `render`
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub dpi: u32,
    pub soffice: String,
    pub pdftoppm: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            dpi: 150,
            soffice: "soffice".to_string(),
            pdftoppm: "pdftoppm".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VersionSection {
    /// JSON manifests whose top-level `"version"` is bumped
    pub files: Vec<PathBuf>,
}

impl CliConfig {
    /// Parse configuration text; relative paths resolve against `base_dir`
    pub fn parse(text: &str, base_dir: &Path) -> Result<Self> {
        let mut config: CliConfig = toml::from_str(text).context("invalid configuration")?;
        config.base_dir = base_dir.to_path_buf();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let base = path.parent().unwrap_or(Path::new("."));
        Self::parse(&text, base).with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Load `explicit`, or `slideforge.toml` from the working directory when
    /// present, or the defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Self::from_file(path)
            }
            None => {
                let candidate = Path::new(CONFIG_FILE);
                if candidate.is_file() {
                    debug!(path = CONFIG_FILE, "using project config");
                    Self::from_file(candidate)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// The configured contract, or the built-in house style
    pub fn contract(&self) -> Result<SlideContract> {
        match &self.contract.path {
            Some(path) => {
                let path = self.resolve(path);
                SlideContract::from_file(&path)
                    .with_context(|| format!("Failed to load contract: {}", path.display()))
            }
            None => Ok(SlideContract::default()),
        }
    }

    /// A new, empty presentation on the configured template and contract
    pub fn presentation(&self) -> Result<Presentation> {
        let contract = self.contract()?;
        let Some(path) = &self.template.path else {
            return Ok(Presentation::with_contract(contract)?);
        };
        let path = self.resolve(path);
        let template = match &self.template.sha256 {
            Some(digest) => PotxTemplate::from_file_verified(&path, digest),
            None => PotxTemplate::from_file(&path),
        }
        .with_context(|| format!("Failed to load template: {}", path.display()))?;
        Ok(Presentation::from_template(template, contract)?)
    }

    /// Schema directory; the environment wins over the file
    pub fn schema_dir(&self) -> Option<PathBuf> {
        self.schema_dir_with(std::env::var_os(SCHEMA_DIR_ENV))
    }

    fn schema_dir_with(&self, env: Option<OsString>) -> Option<PathBuf> {
        match env.filter(|v| !v.is_empty()) {
            Some(dir) => Some(PathBuf::from(dir)),
            None => self.validate.schema_dir.as_deref().map(|d| self.resolve(d)),
        }
    }

    /// Schemas for validation. Without a schema directory only the package
    /// structure schemas are available.
    pub fn schemas(&self) -> Result<SchemaSet> {
        match self.schema_dir() {
            Some(dir) => SchemaSet::load_dir(&dir)
                .with_context(|| format!("Failed to load schemas from {}", dir.display())),
            None => {
                warn!(
                    "no schema directory configured (set {} or [validate] schema_dir); \
                     only package structure is checked",
                    SCHEMA_DIR_ENV
                );
                Ok(SchemaSet::builtin()?)
            }
        }
    }

    /// Manifests to bump, resolved against `root` unless absolute
    pub fn version_files(&self, root: &Path) -> Vec<PathBuf> {
        self.version
            .files
            .iter()
            .map(|f| if f.is_absolute() { f.clone() } else { root.join(f) })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = CliConfig::parse("", Path::new("/work")).unwrap();
        assert_eq!(config.render.dpi, 150);
        assert_eq!(config.render.soffice, "soffice");
        assert_eq!(config.render.pdftoppm, "pdftoppm");
        assert!(config.version.files.is_empty());
        assert!(config.schema_dir_with(None).is_none());
    }

    #[test]
    fn test_relative_paths_resolve_against_config_dir() {
        let config = CliConfig::parse(
            "[validate]\nschema_dir = \"schemas\"\n[contract]\npath = \"/abs/c.toml\"\n",
            Path::new("/work"),
        )
        .unwrap();
        assert_eq!(config.schema_dir_with(None), Some(PathBuf::from("/work/schemas")));
        assert_eq!(
            config.resolve(config.contract.path.as_deref().unwrap()),
            PathBuf::from("/abs/c.toml")
        );
    }

    #[test]
    fn test_environment_overrides_schema_dir() {
        let config = CliConfig::parse("[validate]\nschema_dir = \"schemas\"\n", Path::new("/work")).unwrap();
        assert_eq!(
            config.schema_dir_with(Some(OsString::from("/env/xsd"))),
            Some(PathBuf::from("/env/xsd"))
        );
        // an empty variable counts as unset
        assert_eq!(
            config.schema_dir_with(Some(OsString::new())),
            Some(PathBuf::from("/work/schemas"))
        );
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(CliConfig::parse("[render]\nformat = \"jpg\"\n", Path::new(".")).is_err());
    }

    #[test]
    fn test_missing_explicit_config() {
        let tmp = TempDir::new().unwrap();
        let err = CliConfig::load(Some(&tmp.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_contract_and_presentation_from_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("style.toml"), "[fonts]\nlatin = \"Arial\"\n").unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "[contract]\npath = \"style.toml\"\n[version]\nfiles = [\"a.json\"]\n",
        )
        .unwrap();

        let config = CliConfig::from_file(&tmp.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.contract().unwrap().fonts.latin, "Arial");
        assert_eq!(
            config.version_files(Path::new("/root")),
            vec![PathBuf::from("/root/a.json")]
        );

        let deck = config.presentation().unwrap();
        assert!(deck.is_empty());
    }

    #[test]
    fn test_template_digest_is_checked() {
        let tmp = TempDir::new().unwrap();
        let template = tmp.path().join("t.pptx");
        Presentation::new().unwrap().save(&template).unwrap();

        let config = CliConfig::parse(
            "[template]\npath = \"t.pptx\"\nsha256 = \"00\"\n",
            tmp.path(),
        )
        .unwrap();
        let err = config.presentation().unwrap_err();
        assert!(format!("{:#}", err).contains("t.pptx"));
    }
}
