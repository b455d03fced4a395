//! Plain-text rendering of the narrative and its reports.

use crate::prompts::render_world_bible;
use crate::{GeneratedScene, RunReport, SceneStatus, ValidationReport, WorldBible};
use std::fmt::Write;

const RULE: &str = "================================================================================";

/// Scenes in beat order, each under a `--- SCENE N ---` header.
///
/// Empty and failed scenes keep their position with a flag line in place of
/// prose.
pub fn render_narrative(scenes: &[GeneratedScene]) -> String {
    scenes
        .iter()
        .map(|scene| {
            let body = match scene.status() {
                SceneStatus::Written => scene.prose().clone(),
                SceneStatus::Empty => "[FLAGGED: generation returned no text]".to_string(),
                SceneStatus::Failed { reason } => format!("[FLAGGED: generation failed: {}]", reason),
            };
            format!("--- SCENE {} ---\n{}\n", scene.beat_index(), body)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Human-readable validation section.
///
/// # Examples
///
/// ```
/// use retell_narrative::{render_validation, validate, Blocklist};
///
/// let report = validate("All quiet on the trading floor.", &Blocklist::new(["castle"]), 40);
/// assert!(render_validation(&report).contains("Status: PASSED"));
/// ```
pub fn render_validation(report: &ValidationReport) -> String {
    let mut out = String::from("CONSISTENCY VALIDATION REPORT\n-----------------------------\n");
    let status = if report.passed() {
        "PASSED"
    } else {
        "WARNINGS DETECTED"
    };
    let _ = writeln!(out, "Status: {}", status);
    let _ = writeln!(out, "Terms Checked: {}", report.terms_checked());
    let _ = writeln!(
        out,
        "Violations Found: {} term(s), {} occurrence(s)",
        report.violations().len(),
        report.total_matches()
    );

    if !report.passed() {
        let terms: Vec<&str> = report.violations().iter().map(|v| v.term().as_str()).collect();
        let _ = writeln!(
            out,
            "\nWarning: source vocabulary survived into the retelling: {}",
            terms.join(", ")
        );
        out.push_str("\nViolation Details:\n");
        for violation in report.violations() {
            let _ = writeln!(out, "  - '{}' ({}):", violation.term(), violation.count());
            for snippet in violation.snippets() {
                let _ = writeln!(out, "      ...{}...", snippet);
            }
        }
    }
    out
}

/// Human-readable run report: validation, anomalies and metadata.
pub fn render_report(report: &RunReport) -> String {
    let mut out = render_validation(report.validation());

    out.push_str("\nAnomalies:\n");
    if report.anomalies().is_empty() {
        out.push_str("  none\n");
    }
    for anomaly in report.anomalies() {
        let _ = writeln!(out, "  - {}", anomaly);
    }

    let metadata = report.metadata();
    let _ = write!(
        out,
        "\n{RULE}\nPipeline Metadata:\n  Version: {}\n  Provider: {}\n  Model: {}\n  \
         Beats: {}\n  Blocklist Terms Checked: {}\n  Generated At: {}\n{RULE}\n",
        metadata.pipeline_version(),
        metadata.provider(),
        metadata.model(),
        metadata.beats(),
        metadata.terms_checked(),
        metadata.generated_at().to_rfc3339(),
    );
    out
}

/// The `story_output.txt` artifact: title block, world bible summary,
/// narrative and report.
pub fn render_story(title: &str, bible: &WorldBible, narrative: &str, report: &RunReport) -> String {
    format!(
        "{title}\n\n{RULE}\n\nWORLD BIBLE SUMMARY\n-------------------\n{bible}\n{RULE}\n\n\
         THE STORY\n---------\n{narrative}\n{RULE}\n\n{report}",
        bible = render_world_bible(bible),
        report = render_report(report),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Anomaly, Blocklist, RunMetadata, validate};

    #[test]
    fn test_narrative_keeps_flagged_scenes_in_position() {
        let scenes = vec![
            GeneratedScene::written(1, "The market opens."),
            GeneratedScene::written(2, ""),
            GeneratedScene::failed(3, "HTTP 500"),
        ];
        let narrative = render_narrative(&scenes);
        assert_eq!(
            narrative,
            "--- SCENE 1 ---\nThe market opens.\n\n\
             --- SCENE 2 ---\n[FLAGGED: generation returned no text]\n\n\
             --- SCENE 3 ---\n[FLAGGED: generation failed: HTTP 500]\n"
        );
    }

    #[test]
    fn test_report_lists_snippets_and_anomalies() {
        let validation = validate("A sword on the desk.", &Blocklist::new(["sword"]), 5);
        let report = RunReport::new(
            validation,
            vec![Anomaly::EmptyScene { beat_index: 2 }],
            RunMetadata::new("mock", "test-model", 1, 3),
        );
        let rendered = render_report(&report);
        assert!(rendered.contains("Status: WARNINGS DETECTED"));
        assert!(rendered.contains("  - 'sword' (1):\n      ...A sword on t...\n"));
        assert!(rendered.contains("  - Scene 2 came back empty\n"));
        assert!(rendered.contains("  Model: test-model\n"));
    }
}
