//! Generate one mandala from the command line and save it as a PNG.
//!
//! Minimal UX:
//!   mandala_generate ocean --color '#1E3CFF'

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use mandala::cli::GenerationOptions;
use mandala::color::{Color, name_color};
use mandala::config::setup_logging;
use mandala::constants::{DEFAULT_COLOR, DEFAULT_OUT_DIR};
use mandala::generation::GenerationClient;
use mandala::submission::{GenerationRequest, Phase, label_for_mode, submit, suggested_filename};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mandala_generate")]
#[command(about = "Generate a mandala from a word of inspiration and a color via the Images API")]
struct Args {
    /// Word of inspiration (e.g. forest, ocean, galaxy)
    inspiration: String,

    /// Favorite color as #RRGGBB
    #[arg(long, default_value_t = DEFAULT_COLOR)]
    color: Color,

    /// OpenAI API key
    #[arg(required = true, long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: String,

    /// Output directory (the image goes in <dir>/mandala_<inspiration>[_<color>].png)
    #[arg(long, default_value = DEFAULT_OUT_DIR, env = "MANDALA_OUT_DIR")]
    out_dir: PathBuf,

    /// Replace an existing image with the same name
    #[arg(long)]
    overwrite: bool,

    /// Debug logging, and write the prompt next to the image
    #[arg(long, env = "MANDALA_DEBUG")]
    debug: bool,

    #[command(flatten)]
    generation: GenerationOptions,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.debug).context("Failed to set up logging")?;

    let mode = args.generation.prompt_mode;
    let label = name_color(args.color);
    eprintln!("Selected color: {label}");

    let request = GenerationRequest::new(args.inspiration.trim(), args.color, args.openai_api_key)
        .with_label(label);
    request.validate()?;

    let output_filename = args.out_dir.join(suggested_filename(
        &request.inspiration,
        label_for_mode(&request, mode).as_ref(),
    ));
    if output_filename.exists() && !args.overwrite {
        return Err(anyhow!(
            "Image already exists: {} (pass --overwrite to replace it)",
            output_filename.display()
        ));
    }
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create {}", args.out_dir.display()))?;

    let client = GenerationClient::new(&args.generation)?;
    let mandala = submit(&client, &request, mode, |phase| {
        if phase == Phase::Requesting {
            eprintln!("Generating your mandala... This may take a moment.");
        }
    })
    .await?;

    fs::write(&output_filename, &mandala.png)
        .with_context(|| format!("Failed to write {}", output_filename.display()))?;

    if args.debug {
        let prompt_path = output_filename.with_extension("prompt.txt");
        fs::write(&prompt_path, &mandala.prompt)
            .with_context(|| format!("Failed to write {}", prompt_path.display()))?;
    }

    eprintln!("{}", mandala.caption);
    if let Some(url) = mandala.source.url() {
        eprintln!("Source: {url}");
    }
    eprintln!("Saved: {}", output_filename.display());
    Ok(())
}
