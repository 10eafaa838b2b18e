use std::{path::PathBuf, process::ExitCode};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{FieldPath, FieldUpdate, FlowOutcome, RequestSequencer, UploadFile};
use shared::domain::{ImageId, VariantId};
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::load_settings;

#[derive(Parser, Debug)]
#[command(name = "imageops", about = "Upload images and run server-side transforms")]
struct Args {
    /// Settings file (defaults to ./client.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Overrides the configured service address.
    #[arg(long, global = true)]
    api_base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List uploaded images and their variants.
    List,
    /// Upload an image file.
    Upload { path: PathBuf },
    /// Apply operations to an image.
    Process {
        /// Image to process; defaults to the first listed image.
        #[arg(long)]
        image: Option<String>,
        #[arg(long)]
        grayscale: bool,
        /// Field assignment such as `resize.width=800` or `brightness=1.2`.
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,
        /// Print the payload without sending it.
        #[arg(long)]
        dry_run: bool,
    },
    /// Download an original image.
    FetchOriginal { image_id: String, out: PathBuf },
    /// Download a processed variant.
    FetchVariant { variant_id: String, out: PathBuf },
}

fn parse_assignment(raw: &str) -> Result<FieldUpdate> {
    let Some((path, value)) = raw.split_once('=') else {
        bail!("expected FIELD=VALUE, got '{raw}'");
    };
    let path: FieldPath = path.parse()?;
    Ok(path.with_value(value)?)
}

fn exit_code(outcome: &FlowOutcome) -> ExitCode {
    if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn print_session(sequencer: &RequestSequencer) {
    let state = sequencer.snapshot().await;
    print!("{}", render::status(&state));
    print!("{}", render::images(&state));
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref());
    if let Some(base) = args.api_base_url {
        settings.api_base_url = base;
    }
    let sequencer = RequestSequencer::connect(settings.gateway_config()?)
        .context("failed to set up image service client")?;

    match args.command {
        Command::List => {
            let outcome = sequencer.refresh_images().await;
            print_session(&sequencer).await;
            Ok(exit_code(&outcome))
        }
        Command::Upload { path } => {
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload".to_string());
            let mut file = UploadFile::new(filename, bytes);
            if let Some(mime) = mime_guess::from_path(&path).first_raw() {
                file = file.with_mime_type(mime);
            }

            sequencer.refresh_images().await;
            sequencer.choose_file(Some(file)).await;
            let outcome = sequencer.upload().await;
            print_session(&sequencer).await;
            Ok(exit_code(&outcome))
        }
        Command::Process {
            image,
            grayscale,
            set,
            dry_run,
        } => {
            let updates = set
                .iter()
                .map(|raw| parse_assignment(raw))
                .collect::<Result<Vec<_>>>()?;

            sequencer.refresh_images().await;
            if let Some(image) = image {
                if !sequencer.select_image(ImageId::new(image.clone())).await {
                    print_session(&sequencer).await;
                    bail!("image '{image}' is not in the current listing");
                }
            }
            if grayscale {
                sequencer.update_field(FieldUpdate::Grayscale(true)).await;
            }
            for update in updates {
                sequencer.update_field(update).await;
            }

            let operations = sequencer.snapshot().await.operations;
            println!("{}", serde_json::to_string_pretty(&operations)?);
            if dry_run {
                return Ok(ExitCode::SUCCESS);
            }

            let outcome = sequencer.process().await;
            print_session(&sequencer).await;
            Ok(exit_code(&outcome))
        }
        Command::FetchOriginal { image_id, out } => {
            let bytes = sequencer
                .fetch_original_bytes(&ImageId::new(image_id.clone()))
                .await
                .map_err(|err| anyhow::anyhow!(err.user_message("Download")))?;
            tokio::fs::write(&out, &bytes)
                .await
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Saved {image_id} to {} ({} bytes)", out.display(), bytes.len());
            Ok(ExitCode::SUCCESS)
        }
        Command::FetchVariant { variant_id, out } => {
            let bytes = sequencer
                .fetch_variant_bytes(&VariantId::new(variant_id.clone()))
                .await
                .map_err(|err| anyhow::anyhow!(err.user_message("Download")))?;
            tokio::fs::write(&out, &bytes)
                .await
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Saved {variant_id} to {} ({} bytes)", out.display(), bytes.len());
            Ok(ExitCode::SUCCESS)
        }
    }
}
