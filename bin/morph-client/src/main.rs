//! morph-client – command-line front-end.
//!
//! Drives an [`UploadSession`] end to end: load the two images, submit
//! them to a running morph-server, print the resulting artifact URL, and
//! optionally download the artifact to a local file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;

use morph_client::{HttpRelay, SelectedImage, UploadSession};
use morph_types::AnimationStyle;

#[derive(Debug, Parser)]
#[command(
    name = "morph-client",
    about = "Generate an animation from two images via a morph-server"
)]
struct Cli {
    /// First input image.
    first: PathBuf,

    /// Second input image.
    second: PathBuf,

    /// Animation style: morph, transition, or dissolve.
    #[arg(long, default_value_t = AnimationStyle::Morph)]
    style: AnimationStyle,

    /// Base URL of the relay service.
    #[arg(long, default_value = "http://localhost:3001")]
    server: String,

    /// Download the generated animation to this path.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut session = UploadSession::new();
    session.set_style(cli.style);
    session.add_images([
        load_image(&cli.first).await?,
        load_image(&cli.second).await?,
    ]);

    println!(
        "Submitting {} + {} (style: {})...",
        cli.first.display(),
        cli.second.display(),
        session.style()
    );

    let relay = HttpRelay::new(cli.server.clone());
    session.submit(&relay).await;

    if let Some(message) = session.error() {
        bail!("{message}");
    }
    let animation_url = session
        .result()
        .context("relay returned no animation URL")?;

    println!("Animation ready: {}{}", cli.server.trim_end_matches('/'), animation_url);

    if let Some(output) = &cli.output {
        let written = relay.download(animation_url, output).await?;
        println!("Saved {written} bytes to {}", output.display());
    }

    Ok(())
}

/// Read an image off disk into a [`SelectedImage`], guessing the content
/// type from the file extension.
async fn load_image(path: &Path) -> Result<SelectedImage> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_owned();
    let content_type = mime_guess::from_path(path).first_or_octet_stream().to_string();

    Ok(SelectedImage {
        file_name,
        content_type,
        bytes: bytes.into(),
    })
}
