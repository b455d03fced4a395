//! The `retell validate` command.

use super::ValidateArgs;
use super::blocklist::effective_blocklist;
use retell::{
    RetellConfig, RetellResult, StorageError, StorageErrorKind, ValidationReport,
    render_validation, validate,
};
use std::path::Path;

/// Validate a text file against a blocklist.
pub fn validate_file(
    path: &Path,
    blocklist: &retell::Blocklist,
    snippet_radius: usize,
) -> RetellResult<ValidationReport> {
    let prose = std::fs::read_to_string(path).map_err(|e| {
        StorageError::new(StorageErrorKind::FileRead(format!(
            "{}: {}",
            path.display(),
            e
        )))
    })?;
    Ok(validate(&prose, blocklist, snippet_radius))
}

/// Run the validator over an existing text and print the report.
///
/// Violations are reported, not treated as failure.
#[tracing::instrument(skip_all, fields(prose = %args.prose.display()))]
pub fn validate_prose(args: &ValidateArgs, config: &RetellConfig) -> RetellResult<()> {
    let blocklist = effective_blocklist(&args.blocklist, config)?;
    let report = validate_file(&args.prose, &blocklist, config.output.snippet_radius)?;
    tracing::info!(passed = report.passed(), violations = report.violations().len(), "Validated");
    print!("{}", render_validation(&report));
    Ok(())
}
