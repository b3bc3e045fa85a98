//! Text-only generation example.
//!
//! Run with: `cargo run --example rainbow`
//!
//! Requires `GOOGLE_CLOUD_PROJECT` (or `DEVSHELL_PROJECT_ID`) and either
//! `GOOGLE_ACCESS_TOKEN` or an authenticated `gcloud` CLI.

use vertexgen::{GenerationConfig, GenerationRequester, Modality, VertexTransport};

#[tokio::main]
async fn main() -> vertexgen::Result<()> {
    let requester = GenerationRequester::new(VertexTransport::builder().build());
    let config = GenerationConfig::new().with_modalities([Modality::Text]);

    let result = requester
        .generate("What are the colors in a rainbow?", &config)
        .await?;

    println!("{}", result.text);
    if let Some(path) = result.image_path {
        println!("Image: {}", path.display());
    }

    Ok(())
}
