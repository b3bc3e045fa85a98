//! CLI for vertexgen - Gemini text and image generation on Vertex AI.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use vertexgen::config::{DEFAULT_MODEL, DEFAULT_OUTPUT_PATH};
use vertexgen::{
    GeneratedResult, GenerationConfig, GenerationRequester, Modality, VertexTransport,
};

const TUTOR_QUESTIONS: [&str; 2] = [
    "Hello! What are all the colors in a rainbow?",
    "What is Prism?",
];

#[derive(Parser)]
#[command(name = "vertexgen")]
#[command(about = "Ask Gemini on Vertex AI for text and an optional image")]
#[command(version)]
struct Cli {
    /// Prompt to send (defaults to the rainbow/prism tutoring prompt)
    prompt: Option<String>,

    /// Cloud project id (falls back to GOOGLE_CLOUD_PROJECT, DEVSHELL_PROJECT_ID)
    #[arg(long)]
    project: Option<String>,

    /// Cloud region (falls back to GOOGLE_CLOUD_REGION, REGION, us-central1)
    #[arg(long)]
    location: Option<String>,

    /// Model identifier
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Sampling temperature
    #[arg(long, default_value_t = 0.7)]
    temperature: f32,

    /// Maximum number of output tokens
    #[arg(long, default_value_t = 1024)]
    max_output_tokens: u32,

    /// Output kinds to request (repeatable)
    #[arg(long = "modality", value_enum, default_values_t = [ModalityArg::Text, ModalityArg::Image])]
    modalities: Vec<ModalityArg>,

    /// Where to save the first generated image
    #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModalityArg {
    Text,
    Image,
}

impl From<ModalityArg> for Modality {
    fn from(arg: ModalityArg) -> Self {
        match arg {
            ModalityArg::Text => Modality::Text,
            ModalityArg::Image => Modality::Image,
        }
    }
}

#[derive(serde::Serialize)]
struct JsonOutput<'a> {
    #[serde(flatten)]
    result: &'a GeneratedResult,
    model: &'a str,
    project: &'a str,
    location: &'a str,
}

fn tutor_prompt() -> String {
    format!(
        "You are a science tutoring assistant. Answer the questions clearly for a student.\n\n\
         Q1: {}\n\
         Q2: {}\n\n\
         After answering, generate an AI image that illustrates a prism splitting white light into a rainbow.\n\
         Keep the image simple, educational, and labeled.",
        TUTOR_QUESTIONS[0], TUTOR_QUESTIONS[1]
    )
}

impl Cli {
    fn config(&self) -> GenerationConfig {
        let mut config = GenerationConfig::new()
            .with_model(&self.model)
            .with_temperature(self.temperature)
            .with_max_output_tokens(self.max_output_tokens)
            .with_modalities(self.modalities.iter().copied().map(Modality::from))
            .with_output_path(&self.output);
        if let Some(ref project) = self.project {
            config = config.with_project_id(project);
        }
        if let Some(ref location) = self.location {
            config = config.with_location(location);
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config();
    let prompt = cli.prompt.clone().unwrap_or_else(tutor_prompt);

    // Resolve up front so a missing project id never reaches gcloud or the network
    let target = config.resolve_target()?;

    let requester = GenerationRequester::new(VertexTransport::builder().build());
    let result = requester.generate_for(&prompt, &config, &target).await?;

    if cli.json {
        let output = JsonOutput {
            result: &result,
            model: &target.model,
            project: &target.project_id,
            location: &target.location,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", result.text);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["vertexgen"]).unwrap();
        let config = cli.config();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.modalities, vec![Modality::Text, Modality::Image]);
        assert_eq!(config.output_path, PathBuf::from("gemini_output.png"));
        assert!(config.project_id.is_none());
        assert!(cli.prompt.is_none());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "vertexgen",
            "What is Prism?",
            "--project",
            "p1",
            "--location",
            "europe-west4",
            "--modality",
            "text",
            "--temperature",
            "0.1",
            "-o",
            "out.png",
        ])
        .unwrap();
        let config = cli.config();
        assert_eq!(cli.prompt.as_deref(), Some("What is Prism?"));
        assert_eq!(config.project_id.as_deref(), Some("p1"));
        assert_eq!(config.location.as_deref(), Some("europe-west4"));
        assert_eq!(config.modalities, vec![Modality::Text]);
        assert_eq!(config.temperature, 0.1);
        assert_eq!(config.output_path, PathBuf::from("out.png"));
    }

    #[test]
    fn test_json_output_shape() {
        let result = GeneratedResult {
            text: "A prism.\n[Image saved to: out.png]".into(),
            image_path: Some(PathBuf::from("out.png")),
        };
        let output = JsonOutput {
            result: &result,
            model: "gemini-2.5-flash",
            project: "p1",
            location: "us-central1",
        };
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["text"], "A prism.\n[Image saved to: out.png]");
        assert_eq!(json["image_path"], "out.png");
        assert_eq!(json["model"], "gemini-2.5-flash");
        assert_eq!(json["project"], "p1");
        assert_eq!(json["location"], "us-central1");

        let text_only = GeneratedResult {
            text: "hi".into(),
            image_path: None,
        };
        let json = serde_json::to_value(JsonOutput {
            result: &text_only,
            ..output
        })
        .unwrap();
        assert!(json["image_path"].is_null());
    }

    #[test]
    fn test_tutor_prompt_mentions_both_questions() {
        let prompt = tutor_prompt();
        assert!(prompt.contains("Q1: Hello! What are all the colors in a rainbow?"));
        assert!(prompt.contains("Q2: What is Prism?"));
        assert!(prompt.ends_with("labeled."));
    }
}
