//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use slideforge_ooxml::package::has_pptx_extension;
use slideforge_ooxml::{clean_dir, pack, unpack, OoxmlArchive};
use slideforge_pptx::{add_blank_slide_file, duplicate_slide_file, SlideKind};
use slideforge_validate::{SchemaSet, UnpackedValidator, ValidationReport};

use crate::config::CliConfig;
use crate::render::{default_output_dir, render_slides};
use crate::version::{bump_version, find_project_root};

/// Environment variable holding the log filter (falls back to `RUST_LOG`)
pub const LOG_ENV: &str = "SLIDEFORGE_LOG";

/// Slide kind for `add-slide`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum AddKind {
    /// Title and content box layout
    #[default]
    Content,
    /// Cover layout
    Cover,
}

impl From<AddKind> for SlideKind {
    fn from(kind: AddKind) -> Self {
        match kind {
            AddKind::Content => SlideKind::Content,
            AddKind::Cover => SlideKind::Cover,
        }
    }
}

#[derive(Parser)]
#[command(name = "slideforge")]
#[command(author, version, about = "Styled PowerPoint decks: build, edit, validate", long_about = None)]
struct Cli {
    /// Debug logging; `validate` also lists pre-existing issues
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (default: ./slideforge.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render slides to PNG images (requires LibreOffice and pdftoppm)
    Render {
        /// Input .pptx file
        pptx: PathBuf,

        /// Output directory (default: <name>_slides/)
        output_dir: Option<PathBuf>,

        /// Image resolution (default: 150, or [render] dpi)
        #[arg(long)]
        dpi: Option<u32>,
    },

    /// Pack an unpacked directory into a .pptx file
    Pack {
        /// Unpacked package directory
        input_directory: PathBuf,

        /// Output .pptx file
        output_file: PathBuf,

        /// Original .pptx for differential validation
        #[arg(long)]
        original: Option<PathBuf>,

        /// Validate with auto-repair before packing
        #[arg(long, value_name = "true|false", default_value_t = true, action = ArgAction::Set)]
        validate: bool,
    },

    /// Unpack a .pptx file for editing
    Unpack {
        /// Input .pptx file
        input_file: PathBuf,

        /// Output directory
        output_directory: PathBuf,
    },

    /// Validate package XML against XSD schemas
    Validate {
        /// Unpacked directory or .pptx file
        path: PathBuf,

        /// Original .pptx; only issues it does not have are reported as errors
        #[arg(long)]
        original: Option<PathBuf>,

        /// Repair whitespace preservation before validating
        #[arg(long)]
        auto_repair: bool,
    },

    /// Remove parts no relationship reaches from an unpacked package
    Clean {
        /// Unpacked package directory
        directory: PathBuf,
    },

    /// Add a blank slide to a .pptx file, or duplicate an existing one
    AddSlide {
        /// Input .pptx file
        pptx: PathBuf,

        /// Slide kind to add; ignored with --duplicate
        #[arg(long, value_enum, default_value = "content")]
        kind: AddKind,

        /// Duplicate slide N (1-based) instead of adding a blank slide
        #[arg(long, value_name = "N")]
        duplicate: Option<usize>,

        /// Output file (default: overwrite the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Set the project version in Cargo.toml and configured manifests
    BumpVersion {
        /// New version (X.Y.Z)
        version: String,

        /// Project root (default: nearest directory with a Cargo.toml)
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

/// Install the stderr log subscriber
///
/// `--verbose` forces `debug`; otherwise `SLIDEFORGE_LOG`, then `RUST_LOG`,
/// then `warn`.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV)
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // a second install (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = CliConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Render {
            pptx,
            output_dir,
            dpi,
        } => {
            render_command(&pptx, output_dir.as_deref(), dpi, &config)?;
        }
        Commands::Pack {
            input_directory,
            output_file,
            original,
            validate,
        } => {
            pack_command(
                &input_directory,
                &output_file,
                original.as_deref(),
                validate,
                &config,
            )?;
        }
        Commands::Unpack {
            input_file,
            output_directory,
        } => {
            unpack_command(&input_file, &output_directory)?;
        }
        Commands::Validate {
            path,
            original,
            auto_repair,
        } => {
            validate_command(
                &path,
                original.as_deref(),
                auto_repair,
                cli.verbose,
                config.schemas()?,
            )?;
        }
        Commands::Clean { directory } => {
            clean_command(&directory)?;
        }
        Commands::AddSlide {
            pptx,
            kind,
            duplicate,
            output,
        } => {
            add_slide_command(&pptx, kind, duplicate, output.as_deref(), &config)?;
        }
        Commands::BumpVersion { version, root } => {
            bump_version_command(&version, root.as_deref(), &config)?;
        }
    }

    Ok(())
}

fn require_pptx(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("{} not found", path.display());
    }
    if !has_pptx_extension(path) {
        anyhow::bail!("{} must be a .pptx file", path.display());
    }
    Ok(())
}

/// Execute the render command
pub fn render_command(
    pptx: &Path,
    output_dir: Option<&Path>,
    dpi: Option<u32>,
    config: &CliConfig,
) -> Result<Vec<PathBuf>> {
    require_pptx(pptx)?;
    let output_dir = output_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_dir(pptx));
    let dpi = dpi.unwrap_or(config.render.dpi);

    println!("Rendering: {} ({} DPI)", pptx.display(), dpi);
    let images = render_slides(pptx, &output_dir, dpi, &config.render)?;

    println!("Rendered {} slides to {}/", images.len(), output_dir.display());
    for image in &images {
        if let Some(name) = image.file_name() {
            println!("  {}", name.to_string_lossy());
        }
    }
    Ok(images)
}

/// Execute the pack command
///
/// With `original` and `validate`, the directory is auto-repaired in place
/// and must pass differential validation before it is packed.
pub fn pack_command(
    input_dir: &Path,
    output: &Path,
    original: Option<&Path>,
    validate: bool,
    config: &CliConfig,
) -> Result<()> {
    if !input_dir.is_dir() {
        anyhow::bail!("{} is not a directory", input_dir.display());
    }
    if !has_pptx_extension(output) {
        anyhow::bail!("{} must be a .pptx file", output.display());
    }

    match original {
        Some(original) if validate && original.exists() => {
            let validator =
                UnpackedValidator::new(input_dir, config.schemas()?).with_original(original);
            let repaired = validator
                .repair()
                .with_context(|| format!("Failed to repair {}", input_dir.display()))?;
            if repaired > 0 {
                println!("Auto-repaired {} issue(s)", repaired);
            }
            let report = validator
                .validate()
                .with_context(|| format!("Failed to validate {}", input_dir.display()))?;
            print_report(&report, false);
            if !report.passed() {
                anyhow::bail!("Validation failed for {}", input_dir.display());
            }
            println!("All validations PASSED!");
        }
        Some(original) if validate => {
            info!(original = %original.display(), "original not found; packing without validation");
        }
        _ => {}
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let report = pack(input_dir, output)
        .with_context(|| format!("Failed to pack {}", input_dir.display()))?;
    println!(
        "Successfully packed {} to {} ({} files)",
        input_dir.display(),
        output.display(),
        report.files
    );
    Ok(())
}

/// Execute the unpack command
pub fn unpack_command(input: &Path, output_dir: &Path) -> Result<()> {
    require_pptx(input)?;
    let report = unpack(input, output_dir)
        .with_context(|| format!("Failed to unpack {}", input.display()))?;
    println!("Unpacked {} ({} XML files)", input.display(), report.xml_files);
    for part in &report.skipped {
        println!("  left as-is (not well-formed): {}", part);
    }
    Ok(())
}

/// Execute the validate command
///
/// A `.pptx` input is extracted into a temporary directory that is removed
/// on every exit path.
pub fn validate_command(
    path: &Path,
    original: Option<&Path>,
    auto_repair: bool,
    verbose: bool,
    schemas: SchemaSet,
) -> Result<ValidationReport> {
    if !path.exists() {
        anyhow::bail!("{} does not exist", path.display());
    }
    if let Some(original) = original {
        if !original.is_file() {
            anyhow::bail!("{} is not a file", original.display());
        }
        if !has_pptx_extension(original) {
            anyhow::bail!("{} must be a .pptx file", original.display());
        }
    }

    let scratch = if path.is_file() && has_pptx_extension(path) {
        let scratch = tempfile::tempdir().context("Failed to create temporary directory")?;
        OoxmlArchive::open(path)
            .and_then(|archive| archive.extract_to_dir(scratch.path()))
            .with_context(|| format!("Failed to extract {}", path.display()))?;
        Some(scratch)
    } else if path.is_dir() {
        None
    } else {
        anyhow::bail!("{} is not a directory or .pptx file", path.display());
    };
    let dir = scratch.as_ref().map(|s| s.path()).unwrap_or(path);

    let mut validator = UnpackedValidator::new(dir, schemas);
    if let Some(original) = original {
        validator = validator.with_original(original);
    }

    if auto_repair {
        let repaired = validator.repair()?;
        if repaired > 0 {
            println!("Auto-repaired {} issue(s)", repaired);
        }
    }

    let report = validator.validate()?;
    print_report(&report, verbose);
    if !report.passed() {
        anyhow::bail!(
            "{} validation error(s) in {}",
            report.error_count(),
            path.display()
        );
    }
    println!("All validations PASSED!");
    Ok(report)
}

fn print_report(report: &ValidationReport, verbose: bool) {
    for issue in report.introduced() {
        println!("{}", issue);
    }
    if verbose && report.differential {
        let pre_existing: Vec<_> = report.pre_existing().collect();
        if !pre_existing.is_empty() {
            println!("{} issue(s) also present in the original:", pre_existing.len());
            for issue in pre_existing {
                println!("  {}", issue);
            }
        }
    }
    if verbose {
        println!(
            "Checked {} part(s), {} finding(s)",
            report.parts_checked,
            report.issues.len()
        );
    }
}

/// Execute the clean command
pub fn clean_command(dir: &Path) -> Result<usize> {
    if !dir.is_dir() {
        anyhow::bail!("{} is not a directory", dir.display());
    }
    let report = clean_dir(dir).with_context(|| format!("Failed to clean {}", dir.display()))?;
    if report.removed.is_empty() {
        println!("No unreferenced files in {}", dir.display());
    } else {
        println!("Removed {} unreferenced file(s):", report.removed.len());
        for name in &report.removed {
            println!("  {}", name);
        }
    }
    Ok(report.removed.len())
}

/// Execute the add-slide command
pub fn add_slide_command(
    pptx: &Path,
    kind: AddKind,
    duplicate: Option<usize>,
    output: Option<&Path>,
    config: &CliConfig,
) -> Result<String> {
    require_pptx(pptx)?;
    let name = pptx
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let part = match duplicate {
        Some(index) => {
            let part = duplicate_slide_file(pptx, output, index)?;
            println!("Duplicated slide {} in {}", index, name);
            part
        }
        None => {
            let contract = config.contract()?;
            let part = add_blank_slide_file(pptx, output, kind.into(), &contract)?;
            let label = match kind {
                AddKind::Content => "content",
                AddKind::Cover => "cover",
            };
            println!("Added {} slide to {}", label, name);
            part
        }
    };

    println!("Saved to {}", output.unwrap_or(pptx).display());
    Ok(part)
}

/// Execute the bump-version command
pub fn bump_version_command(version: &str, root: Option<&Path>, config: &CliConfig) -> Result<()> {
    let root = match root {
        Some(root) => root.to_path_buf(),
        None => {
            let cwd = std::env::current_dir().context("Failed to read working directory")?;
            find_project_root(&cwd)
                .context("Could not find project root (no Cargo.toml found)")?
        }
    };

    let files = bump_version(&root, version, &config.version_files(&root))?;
    for file in &files {
        let shown = file.strip_prefix(&root).unwrap_or(file);
        println!("  Updated {}", shown.display());
    }
    println!();
    println!("Version bumped to {}", version);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_parse_render() {
        let cli = parse(&["slideforge", "render", "deck.pptx", "out", "--dpi", "200"]);
        match cli.command {
            Commands::Render {
                pptx,
                output_dir,
                dpi,
            } => {
                assert_eq!(pptx, PathBuf::from("deck.pptx"));
                assert_eq!(output_dir, Some(PathBuf::from("out")));
                assert_eq!(dpi, Some(200));
            }
            _ => panic!("Expected Render command"),
        }
    }

    #[test]
    fn test_cli_parse_render_defaults() {
        let cli = parse(&["slideforge", "render", "deck.pptx"]);
        match cli.command {
            Commands::Render {
                output_dir, dpi, ..
            } => {
                assert!(output_dir.is_none());
                assert!(dpi.is_none());
            }
            _ => panic!("Expected Render command"),
        }
    }

    #[test]
    fn test_cli_parse_pack() {
        let cli = parse(&["slideforge", "pack", "deck/", "deck.pptx", "--original", "orig.pptx"]);
        match cli.command {
            Commands::Pack {
                input_directory,
                output_file,
                original,
                validate,
            } => {
                assert_eq!(input_directory, PathBuf::from("deck/"));
                assert_eq!(output_file, PathBuf::from("deck.pptx"));
                assert_eq!(original, Some(PathBuf::from("orig.pptx")));
                assert!(validate);
            }
            _ => panic!("Expected Pack command"),
        }
    }

    #[test]
    fn test_cli_parse_pack_validate_false() {
        let cli = parse(&["slideforge", "pack", "d", "o.pptx", "--validate", "false"]);
        match cli.command {
            Commands::Pack { validate, .. } => assert!(!validate),
            _ => panic!("Expected Pack command"),
        }
        assert!(Cli::try_parse_from(["slideforge", "pack", "d", "o.pptx", "--validate", "maybe"]).is_err());
    }

    #[test]
    fn test_cli_parse_unpack() {
        let cli = parse(&["slideforge", "unpack", "deck.pptx", "deck"]);
        match cli.command {
            Commands::Unpack {
                input_file,
                output_directory,
            } => {
                assert_eq!(input_file, PathBuf::from("deck.pptx"));
                assert_eq!(output_directory, PathBuf::from("deck"));
            }
            _ => panic!("Expected Unpack command"),
        }
        assert!(Cli::try_parse_from(["slideforge", "unpack", "deck.pptx"]).is_err());
    }

    #[test]
    fn test_cli_parse_validate() {
        let cli = parse(&[
            "slideforge",
            "validate",
            "deck",
            "--original",
            "deck.pptx",
            "--auto-repair",
            "-v",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Validate {
                path,
                original,
                auto_repair,
            } => {
                assert_eq!(path, PathBuf::from("deck"));
                assert_eq!(original, Some(PathBuf::from("deck.pptx")));
                assert!(auto_repair);
            }
            _ => panic!("Expected Validate command"),
        }
    }

    #[test]
    fn test_cli_parse_validate_plain() {
        let cli = parse(&["slideforge", "validate", "deck.pptx"]);
        assert!(!cli.verbose);
        match cli.command {
            Commands::Validate {
                original,
                auto_repair,
                ..
            } => {
                assert!(original.is_none());
                assert!(!auto_repair);
            }
            _ => panic!("Expected Validate command"),
        }
    }

    #[test]
    fn test_cli_parse_clean() {
        let cli = parse(&["slideforge", "clean", "deck"]);
        match cli.command {
            Commands::Clean { directory } => assert_eq!(directory, PathBuf::from("deck")),
            _ => panic!("Expected Clean command"),
        }
    }

    #[test]
    fn test_cli_parse_add_slide() {
        let cli = parse(&["slideforge", "add-slide", "deck.pptx", "--kind", "cover"]);
        match cli.command {
            Commands::AddSlide {
                pptx,
                kind,
                duplicate,
                output,
            } => {
                assert_eq!(pptx, PathBuf::from("deck.pptx"));
                assert_eq!(kind, AddKind::Cover);
                assert!(duplicate.is_none());
                assert!(output.is_none());
            }
            _ => panic!("Expected AddSlide command"),
        }
    }

    #[test]
    fn test_cli_parse_add_slide_duplicate() {
        let cli = parse(&[
            "slideforge",
            "add-slide",
            "deck.pptx",
            "--duplicate",
            "3",
            "-o",
            "new.pptx",
        ]);
        match cli.command {
            Commands::AddSlide {
                kind,
                duplicate,
                output,
                ..
            } => {
                assert_eq!(kind, AddKind::Content);
                assert_eq!(duplicate, Some(3));
                assert_eq!(output, Some(PathBuf::from("new.pptx")));
            }
            _ => panic!("Expected AddSlide command"),
        }
        assert!(Cli::try_parse_from(["slideforge", "add-slide", "d.pptx", "--kind", "title"]).is_err());
    }

    #[test]
    fn test_cli_parse_bump_version() {
        let cli = parse(&["slideforge", "--config", "sf.toml", "bump-version", "1.3.0", "--root", "/p"]);
        assert_eq!(cli.config, Some(PathBuf::from("sf.toml")));
        match cli.command {
            Commands::BumpVersion { version, root } => {
                assert_eq!(version, "1.3.0");
                assert_eq!(root, Some(PathBuf::from("/p")));
            }
            _ => panic!("Expected BumpVersion command"),
        }
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["slideforge"]).is_err());
    }

    #[test]
    fn test_add_kind_maps_to_slide_kind() {
        assert_eq!(SlideKind::from(AddKind::Cover), SlideKind::Cover);
        assert_eq!(SlideKind::from(AddKind::Content), SlideKind::Content);
    }

    #[test]
    fn test_require_pptx_messages() {
        let tmp = tempfile::TempDir::new().unwrap();
        let missing = tmp.path().join("gone.pptx");
        assert!(require_pptx(&missing).unwrap_err().to_string().ends_with("not found"));

        let text = tmp.path().join("deck.txt");
        fs::write(&text, "x").unwrap();
        assert!(require_pptx(&text)
            .unwrap_err()
            .to_string()
            .ends_with("must be a .pptx file"));
    }
}
