use anyhow::{Context, Result, anyhow};
use clap::Parser;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thumbforge::category::Category;
use thumbforge::cli::BackendOptions;
use thumbforge::config::setup_logging;
use thumbforge::constants::{DEFAULT_SEO_SCORE, DOWNLOAD_FILENAME};
use thumbforge::content::generate_design;
use thumbforge::design::DesignIntent;

/// Render a thumbnail to disk.
///
/// Minimal UX:
///   render_thumbnail --design design.json --title "Kahvaltı rutini"
#[derive(Parser, Debug)]
#[command(name = "render_thumbnail")]
#[command(about = "Render a 1280x720 YouTube thumbnail from a design document")]
struct Args {
    /// Design document (JSON). Generated from the title when omitted, which
    /// needs an OpenAI API key.
    #[arg(long)]
    design: Option<PathBuf>,

    /// Video category, steers the stock photo search
    #[arg(long, default_value = "Diğer")]
    category: Category,

    /// Video title
    #[arg(long, default_value = "")]
    title: String,

    /// Video description
    #[arg(long, default_value = "")]
    description: String,

    /// Where to write the JPEG
    #[arg(long, short, default_value = DOWNLOAD_FILENAME)]
    output: PathBuf,

    /// Also write the base64 text to this file
    #[arg(long)]
    base64_output: Option<PathBuf>,

    /// Replace existing output files
    #[arg(long)]
    force: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    #[command(flatten)]
    backends: BackendOptions,
}

fn check_writable(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(anyhow!(
            "Output already exists: {} (use --force)",
            path.display()
        ));
    }
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}

async fn load_design(args: &Args) -> Result<Value> {
    if let Some(path) = &args.design {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        return serde_json::from_str(&raw)
            .with_context(|| format!("Invalid design JSON in {}", path.display()));
    }

    if args.title.trim().is_empty() {
        return Err(anyhow!("Either --design or --title is required"));
    }
    let generator = args
        .backends
        .content_generator()
        .ok_or_else(|| anyhow!("--design is required without an OpenAI API key"))?;
    let design = generate_design(
        generator.as_ref(),
        args.category,
        args.title.trim(),
        DEFAULT_SEO_SCORE,
    )
    .await
    .context("Design generation failed")?;
    Ok(design)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.debug).map_err(|err| anyhow!("Failed to set up logging: {err}"))?;

    check_writable(&args.output, args.force)?;
    if let Some(path) = &args.base64_output {
        check_writable(path, args.force)?;
    }

    let design = load_design(&args).await?;
    let intent = DesignIntent::from_value(&design);
    let composer = args.backends.composer();
    let (category, title, description) = (args.category, args.title.clone(), args.description.clone());
    let rendered = tokio::task::spawn_blocking(move || {
        composer.compose(&intent, category.as_str(), &title, &description)
    })
    .await
    .context("Render task failed")??;

    fs::write(&args.output, &rendered.jpeg)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    if let Some(path) = &args.base64_output {
        fs::write(path, &rendered.base64)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    eprintln!("Saved: {}", args.output.display());
    Ok(())
}
