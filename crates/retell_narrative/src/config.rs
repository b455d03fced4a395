//! Layered configuration for the pipeline.
//!
//! Sources, later overriding earlier:
//! 1. Bundled defaults (`retell.toml` shipped with the library)
//! 2. `~/.config/retell/retell.toml`
//! 3. `./retell.toml`
//! 4. An explicit file passed by the caller
//! 5. `RETELL_*` environment variables, `__` separating sections
//!    (e.g. `RETELL_GENERATION__MODEL=gemini-2.5-pro`)

use crate::{Blocklist, GenerationSettings, PipelineOptions, PipelineOptionsBuilder};
use config::{Config, Environment, File, FileFormat};
use retell_error::{BuilderError, ConfigError, RetellError, RetellResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../../../retell.toml");

/// Generation call settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Model name passed to the provider
    pub model: String,
    /// Sampling temperature
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Output token limit per call
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

/// Blocklist composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlocklistConfig {
    /// Start from the built-in source vocabulary
    pub use_default: bool,
    /// Terms added on top
    #[serde(default)]
    pub extra_terms: Vec<String>,
    /// File of additional terms, one per line
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Output and report settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the run's artifacts
    pub dir: PathBuf,
    /// Title printed at the top of the story
    pub title: String,
    /// Characters of context around each violation
    pub snippet_radius: usize,
}

/// Complete Retell configuration.
///
/// # Example
///
/// ```no_run
/// use retell_narrative::RetellConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = RetellConfig::load(None)?;
/// println!("Model: {}", config.generation.model);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetellConfig {
    /// Generation call settings
    pub generation: GenerationConfig,
    /// Blocklist composition
    pub blocklist: BlocklistConfig,
    /// Output settings
    pub output: OutputConfig,
}

fn config_error(context: &str, e: config::ConfigError) -> RetellError {
    RetellError::from(ConfigError::new(format!("{}: {}", context, e)))
}

impl RetellConfig {
    /// Load configuration from all layers.
    #[instrument(skip(explicit), fields(explicit = ?explicit.map(Path::display)))]
    pub fn load(explicit: Option<&Path>) -> RetellResult<Self> {
        debug!("Loading layered configuration");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/retell/retell.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("retell").required(false));

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::new(format!(
                    "Configuration file not found: {}",
                    path.display()
                ))
                .into());
            }
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("RETELL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("blocklist.extra_terms"),
        );

        builder
            .build()
            .map_err(|e| config_error("Failed to build configuration", e))?
            .try_deserialize()
            .map_err(|e| config_error("Failed to parse configuration", e))
    }

    /// Bundled defaults alone.
    pub fn bundled() -> RetellResult<Self> {
        Self::from_toml(DEFAULT_CONFIG)
    }

    /// Bundled defaults overlaid with a TOML document.
    pub fn from_toml(overrides: &str) -> RetellResult<Self> {
        Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from_str(overrides, FileFormat::Toml))
            .build()
            .map_err(|e| config_error("Failed to build configuration", e))?
            .try_deserialize()
            .map_err(|e| config_error("Failed to parse configuration", e))
    }

    /// The blocklist described by this configuration.
    pub fn blocklist(&self) -> RetellResult<Blocklist> {
        let mut blocklist = if self.blocklist.use_default {
            Blocklist::default_terms()
        } else {
            Blocklist::default()
        };
        blocklist.extend(&self.blocklist.extra_terms);
        if let Some(path) = &self.blocklist.file {
            blocklist.extend(Blocklist::from_file(path)?.iter());
        }
        Ok(blocklist)
    }

    /// Generation settings for every call of a run.
    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            model: Some(self.generation.model.clone()),
            temperature: self.generation.temperature,
            max_tokens: self.generation.max_tokens,
        }
    }

    /// Pipeline options derived from this configuration.
    pub fn pipeline_options(&self, resume: bool) -> RetellResult<PipelineOptions> {
        Ok(PipelineOptionsBuilder::default()
            .generation(self.generation_settings())
            .snippet_radius(self.output.snippet_radius)
            .title(self.output.title.clone())
            .resume(resume)
            .build()
            .map_err(|e| BuilderError::from(e.to_string()))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_SNIPPET_RADIUS;

    #[test]
    fn test_bundled_defaults() {
        let config = RetellConfig::bundled().unwrap();
        assert_eq!(config.generation.model, "gemini-2.5-flash");
        assert!(config.blocklist.use_default);
        assert_eq!(config.output.snippet_radius, DEFAULT_SNIPPET_RADIUS);
        assert_eq!(config.output.dir, PathBuf::from("output"));
    }

    #[test]
    fn test_overrides_merge_over_defaults() {
        let config = RetellConfig::from_toml(
            r#"
[generation]
model = "gemini-2.5-pro"

[blocklist]
use_default = false
extra_terms = ["ledger", "LEDGER", "ticker"]
"#,
        )
        .unwrap();
        assert_eq!(config.generation.model, "gemini-2.5-pro");
        assert_eq!(config.output.snippet_radius, DEFAULT_SNIPPET_RADIUS);

        let blocklist = config.blocklist().unwrap();
        assert_eq!(blocklist.terms(), ["ledger", "ticker"]);
    }

    #[test]
    fn test_default_blocklist_with_extras() {
        let config =
            RetellConfig::from_toml("[blocklist]\nextra_terms = [\"thane\", \"ledger\"]").unwrap();
        let blocklist = config.blocklist().unwrap();
        assert_eq!(blocklist.len(), crate::DEFAULT_TERMS.len() + 1);
        assert!(blocklist.contains("ledger"));
    }

    #[test]
    fn test_pipeline_options_carry_settings() {
        let config = RetellConfig::bundled().unwrap();
        let options = config.pipeline_options(true).unwrap();
        assert!(*options.resume());
        assert_eq!(options.generation().model.as_deref(), Some("gemini-2.5-flash"));
    }

    #[test]
    fn test_missing_explicit_file_is_config_error() {
        let err = RetellConfig::load(Some(Path::new("/nonexistent/retell.toml"))).unwrap_err();
        assert!(format!("{}", err).contains("Configuration file not found"));
    }
}
