//! The `retell run` command.

use super::RunArgs;
use retell::{RetellConfig, RetellResult, StorageError, StorageErrorKind};
use std::path::Path;

#[cfg_attr(not(feature = "gemini"), allow(dead_code))]
fn read_input(path: &Path) -> RetellResult<String> {
    std::fs::read_to_string(path).map_err(|e| {
        StorageError::new(StorageErrorKind::FileRead(format!(
            "{}: {}",
            path.display(),
            e
        )))
        .into()
    })
}

/// Target context from `--context` or `--context-file`.
#[cfg_attr(not(feature = "gemini"), allow(dead_code))]
fn target_context(args: &RunArgs) -> RetellResult<String> {
    match (&args.context, &args.context_file) {
        (Some(context), _) => Ok(context.clone()),
        (None, Some(path)) => read_input(path),
        (None, None) => {
            Err(retell::ConfigError::new("Either --context or --context-file is required").into())
        }
    }
}

/// Configuration with the command-line overrides applied.
#[cfg_attr(not(feature = "gemini"), allow(dead_code))]
fn apply_overrides(args: &RunArgs, config: &RetellConfig) -> RetellConfig {
    let mut config = config.clone();
    if let Some(model) = &args.model {
        config.generation.model = model.clone();
    }
    if let Some(title) = &args.title {
        config.output.title = title.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.output.dir = dir.clone();
    }
    config
}

/// Run the full pipeline against the Gemini driver and print the report.
///
/// Violations and per-scene anomalies are reported, not treated as failure.
#[cfg(feature = "gemini")]
#[tracing::instrument(skip_all, fields(source = %args.source.display()))]
pub async fn run_pipeline(args: &RunArgs, config: &RetellConfig) -> RetellResult<()> {
    use super::blocklist::effective_blocklist;
    use retell::{FileSystemArtifactStore, GeminiClient, Pipeline, render_report};

    let config = apply_overrides(args, config);
    let source = read_input(&args.source)?;
    let context = target_context(args)?;
    let blocklist = effective_blocklist(&args.blocklist, &config)?;

    let driver = GeminiClient::with_model(&config.generation.model)?;
    let store = FileSystemArtifactStore::new(&config.output.dir)?;
    let pipeline = Pipeline::new(driver, store).with_options(config.pipeline_options(args.resume)?);

    tracing::info!(
        model = %config.generation.model,
        output_dir = %config.output.dir.display(),
        terms = blocklist.len(),
        resume = args.resume,
        "Starting run"
    );

    let output = pipeline.run(&source, &context, &blocklist).await?;

    print!("{}", render_report(output.report()));
    println!(
        "\nStory written to {}",
        config.output.dir.join("story_output.txt").display()
    );
    Ok(())
}

/// Without a provider the pipeline cannot run.
#[cfg(not(feature = "gemini"))]
pub async fn run_pipeline(args: &RunArgs, config: &RetellConfig) -> RetellResult<()> {
    let _ = (args, config);
    Err(retell::ConfigError::new(
        "retell was built without a generation provider; enable the `gemini` feature",
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::io::Write;

    fn run_args(extra: &[&str]) -> RunArgs {
        let mut argv = vec!["retell", "run", "--source", "macbeth.txt"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Run(args) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_context_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "A Mars mining colony").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let args = run_args(&["--context-file", path.as_str()]);
        assert_eq!(target_context(&args).unwrap(), "A Mars mining colony");
    }

    #[test]
    fn test_overrides_replace_configuration() {
        let args = run_args(&[
            "--context",
            "x",
            "--model",
            "gemini-2.5-pro",
            "--title",
            "Zero Sum Game",
            "--output-dir",
            "runs/one",
        ]);
        let config = apply_overrides(&args, &RetellConfig::bundled().unwrap());
        assert_eq!(config.generation.model, "gemini-2.5-pro");
        assert_eq!(config.output.title, "Zero Sum Game");
        assert_eq!(config.output.dir, Path::new("runs/one"));
    }
}
