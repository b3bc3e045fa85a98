//! Generation configuration and project/location resolution.

use crate::error::{GenError, Result};
use crate::types::Modality;
use std::path::PathBuf;

/// Environment variables consulted for the project id, highest priority first.
pub const PROJECT_ID_VARS: &[&str] = &["GOOGLE_CLOUD_PROJECT", "DEVSHELL_PROJECT_ID"];

/// Environment variables consulted for the location, highest priority first.
pub const LOCATION_VARS: &[&str] = &["GOOGLE_CLOUD_REGION", "REGION"];

/// Location used when neither the config nor the resolver supplies one.
pub const DEFAULT_LOCATION: &str = "us-central1";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Where the first generated image is written by default.
pub const DEFAULT_OUTPUT_PATH: &str = "gemini_output.png";

/// Tunable parameters for a single generation call.
///
/// Explicit values always win over anything the resolver finds.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    /// Cloud project id. Resolved from [`PROJECT_ID_VARS`] when unset.
    pub project_id: Option<String>,
    /// Cloud region. Resolved from [`LOCATION_VARS`] when unset.
    pub location: Option<String>,
    /// Model identifier, e.g. `gemini-2.5-flash`.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Cap on generated tokens.
    pub max_output_tokens: u32,
    /// Output kinds requested from the model.
    pub modalities: Vec<Modality>,
    /// File the first returned image is written to.
    pub output_path: PathBuf,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            location: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_output_tokens: 1024,
            modalities: vec![Modality::Text, Modality::Image],
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }
}

impl GenerationConfig {
    /// Creates a config with default generation parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the project id explicitly.
    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Sets the location explicitly.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the output token cap.
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    /// Replaces the requested modalities.
    pub fn with_modalities(mut self, modalities: impl IntoIterator<Item = Modality>) -> Self {
        self.modalities = modalities.into_iter().collect();
        self
    }

    /// Sets where the first generated image is saved.
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Resolves the model target from the process environment.
    pub fn resolve_target(&self) -> Result<ModelTarget> {
        self.resolve_target_with(|key| std::env::var(key).ok())
    }

    /// Resolves the model target using `lookup` for anything not set explicitly.
    ///
    /// Empty values count as unset. Fails with [`GenError::Configuration`]
    /// when no project id can be found.
    pub fn resolve_target_with<F>(&self, lookup: F) -> Result<ModelTarget>
    where
        F: Fn(&str) -> Option<String>,
    {
        let project_id = non_empty(self.project_id.clone())
            .or_else(|| first_match(PROJECT_ID_VARS, &lookup))
            .ok_or_else(|| {
                GenError::Configuration(format!(
                    "missing project id; set {} or pass one explicitly",
                    PROJECT_ID_VARS.join(" or ")
                ))
            })?;

        let location = non_empty(self.location.clone())
            .or_else(|| first_match(LOCATION_VARS, &lookup))
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string());

        Ok(ModelTarget {
            project_id,
            location,
            model: self.model.clone(),
        })
    }
}

/// The resolved (project, location, model) a call is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelTarget {
    /// Cloud project id.
    pub project_id: String,
    /// Cloud region.
    pub location: String,
    /// Model identifier.
    pub model: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn first_match<F>(keys: &[&str], lookup: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    keys.iter().find_map(|key| non_empty(lookup(key)))
}
