#![doc = include_str!("../README.md")]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use docmark::{ConvertOptions, DocumentConverter, Format, Result, ZipArchive, load_bundle};
use futures::executor::block_on;

/// Converts a document bundle to HTML or Markdown.
#[derive(Debug, Clone, Parser)]
#[clap(name = "docmark", version)]
pub struct ConvertArgs {
    /// Path to the document bundle
    #[clap(value_name = "INPUT")]
    pub input: PathBuf,

    /// Path to output file, or `-` for stdout
    #[clap(value_name = "OUTPUT", default_value = None)]
    pub output: Option<String>,

    /// Output format, `html` or `md`. Inferred from the output path when
    /// omitted
    #[clap(long, value_name = "FORMAT")]
    pub format: Option<Format>,

    /// TOML file mapping document styles to insertion paths
    #[clap(long, value_name = "FILE")]
    pub style_map: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = ConvertArgs::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    block_on(run(args))
}

async fn run(args: ConvertArgs) -> Result<()> {
    let options = match &args.style_map {
        Some(path) => ConvertOptions::load(path)?,
        None => ConvertOptions::default(),
    };

    let is_stdout = args.output.as_deref() == Some("-");
    let output = args.output.filter(|_| !is_stdout).map(PathBuf::from);
    let format = args
        .format
        .or_else(|| output.as_deref().and_then(format_of))
        .unwrap_or_default();
    let output_path = output.unwrap_or_else(|| args.input.with_extension(format.extension()));

    let archive = Arc::new(ZipArchive::load(&args.input)?);
    let document = load_bundle(archive).await?;
    let conversion = DocumentConverter::new(options)
        .convert(&document, format)
        .await?;

    if is_stdout {
        std::io::stdout().write_all(conversion.output.as_bytes())?;
    } else if let Err(err) = std::fs::write(&output_path, conversion.output) {
        return Err(format!("failed to write file {output_path:?}: {err}").into());
    }

    Ok(())
}

fn format_of(path: &Path) -> Option<Format> {
    path.extension()?.to_str()?.parse().ok()
}
