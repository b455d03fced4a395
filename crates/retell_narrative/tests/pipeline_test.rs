//! End-to-end pipeline tests against a scripted driver.

mod test_utils;

use retell_core::ResponseFormat;
use retell_error::{PipelineErrorKind, PipelineStage, ServiceErrorKind};
use retell_narrative::{
    Anomaly, Blocklist, GenerationSettings, Pipeline, PipelineOptionsBuilder, SceneStatus,
};
use retell_storage::{Artifact, FileSystemArtifactStore, InMemoryArtifactStore};
use test_utils::*;

fn pipeline(driver: ScriptedDriver) -> Pipeline<ScriptedDriver, InMemoryArtifactStore> {
    Pipeline::new(driver, InMemoryArtifactStore::new())
}

fn happy_script(beats: usize) -> Vec<String> {
    let mut script = vec![bible_json(), beats_json(beats)];
    script.extend((1..=beats).map(prose));
    script
}

#[tokio::test]
async fn test_full_run_produces_ordered_scenes_and_artifacts() {
    let pipeline = pipeline(ScriptedDriver::texts(happy_script(3)));
    let blocklist = Blocklist::new(["sword", "castle", "king"]);

    let output = pipeline.run(SOURCE, CONTEXT, &blocklist).await.unwrap();

    assert_eq!(pipeline.driver().call_count(), 5);
    let indices: Vec<usize> = output.scenes().iter().map(|s| *s.beat_index()).collect();
    assert_eq!(indices, [1, 2, 3]);
    assert!(output.scenes().iter().all(|s| s.is_written()));

    let first = output.narrative().find("--- SCENE 1 ---").unwrap();
    let third = output.narrative().find("--- SCENE 3 ---").unwrap();
    assert!(first < third);

    assert!(output.report().passed());
    assert!(output.report().anomalies().is_empty());
    assert_eq!(*output.report().metadata().beats(), 3);
    assert_eq!(output.report().metadata().provider(), "scripted");
    assert_eq!(output.report().metadata().model(), "scripted-model");

    let store = pipeline.store();
    assert_eq!(
        store.artifacts(),
        vec![
            Artifact::WorldBible,
            Artifact::Beats,
            Artifact::Scene(1),
            Artifact::Scene(2),
            Artifact::Scene(3),
            Artifact::ValidationReport,
            Artifact::Story,
        ]
    );
    assert_eq!(store.get(&Artifact::Scene(2)).unwrap(), prose(2));

    let story = store.get(&Artifact::Story).unwrap();
    assert!(story.starts_with("A Modern Retelling\n"));
    assert!(story.contains("Macbeth -> Marcus Chen (Head of Quant Strategy)"));
    assert!(story.contains("Status: PASSED"));

    let report: serde_json::Value =
        serde_json::from_str(&store.get(&Artifact::ValidationReport).unwrap()).unwrap();
    assert_eq!(report["metadata"]["beats"], 3);
    assert_eq!(report["validation"]["terms_checked"], 3);
}

#[tokio::test]
async fn test_requests_carry_format_hints_and_settings() {
    let options = PipelineOptionsBuilder::default()
        .generation(GenerationSettings {
            model: Some("gemini-2.5-pro".to_string()),
            temperature: Some(0.3),
            max_tokens: Some(512),
        })
        .build()
        .unwrap();
    let pipeline = pipeline(ScriptedDriver::texts(happy_script(1))).with_options(options);

    let output = pipeline
        .run(SOURCE, CONTEXT, &Blocklist::new(["king"]))
        .await
        .unwrap();

    let requests = pipeline.driver().requests();
    let formats: Vec<ResponseFormat> = requests.iter().map(|r| *r.response_format()).collect();
    assert_eq!(
        formats,
        [ResponseFormat::Json, ResponseFormat::Json, ResponseFormat::Text]
    );
    for request in &requests {
        assert_eq!(request.model().as_deref(), Some("gemini-2.5-pro"));
        assert_eq!(*request.temperature(), Some(0.3));
        assert_eq!(*request.max_tokens(), Some(512));
    }
    assert_eq!(output.report().metadata().model(), "gemini-2.5-pro");

    let prose_prompt = requests[2].user_text();
    assert!(prose_prompt.contains("Beat number 1"));
    assert!(prose_prompt.contains("write \"CEO Duncan\", never \"King Duncan\""));
    assert!(prose_prompt.contains("Never use any of these words"));
}

#[tokio::test]
async fn test_zero_beats_aborts_before_prose() {
    let pipeline = pipeline(ScriptedDriver::texts([bible_json(), r#"{"beats": []}"#.to_string()]));

    let err = pipeline
        .run(SOURCE, CONTEXT, &Blocklist::default_terms())
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(PipelineStage::Beats));
    assert_eq!(err.pipeline_kind(), Some(&PipelineErrorKind::EmptyExtraction));
    assert_eq!(pipeline.driver().call_count(), 2);
    assert_eq!(pipeline.driver().calls_with_system(PROSE_CALL), 0);
    assert_eq!(pipeline.store().artifacts(), vec![Artifact::WorldBible]);
}

#[tokio::test]
async fn test_malformed_beats_is_fatal() {
    let pipeline = pipeline(ScriptedDriver::texts([
        bible_json(),
        "Act one: a storm. Act two: a murder.".to_string(),
    ]));

    let err = pipeline
        .run(SOURCE, CONTEXT, &Blocklist::default_terms())
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(PipelineStage::Beats));
    assert!(matches!(
        err.pipeline_kind(),
        Some(PipelineErrorKind::MalformedBeats(_))
    ));
}

#[tokio::test]
async fn test_empty_scene_keeps_position_and_run_succeeds() {
    let mut script = vec![bible_json(), beats_json(5)];
    script.extend((1..=5).map(|i| if i == 3 { "   ".to_string() } else { prose(i) }));
    let pipeline = pipeline(ScriptedDriver::texts(script));

    let output = pipeline
        .run(SOURCE, CONTEXT, &Blocklist::default_terms())
        .await
        .unwrap();

    let written = output.scenes().iter().filter(|s| s.is_written()).count();
    assert_eq!(written, 4);
    assert_eq!(*output.scenes()[2].status(), SceneStatus::Empty);
    assert_eq!(*output.scenes()[2].beat_index(), 3);
    assert_eq!(
        output.report().anomalies(),
        &[Anomaly::EmptyScene { beat_index: 3 }]
    );
    assert!(
        output
            .narrative()
            .contains("--- SCENE 3 ---\n[FLAGGED: generation returned no text]")
    );
    assert!(pipeline.store().get(&Artifact::Story).is_some());
}

#[tokio::test]
async fn test_failed_scene_is_not_fatal() {
    let script = vec![
        Scripted::Text(bible_json()),
        Scripted::Text(beats_json(2)),
        Scripted::Error(ServiceErrorKind::HttpError {
            status_code: 503,
            message: "overloaded".to_string(),
        }),
        Scripted::Text(prose(2)),
    ];
    let pipeline = pipeline(ScriptedDriver::new(script));

    let output = pipeline
        .run(SOURCE, CONTEXT, &Blocklist::default_terms())
        .await
        .unwrap();

    assert!(matches!(
        output.scenes()[0].status(),
        SceneStatus::Failed { reason } if reason.contains("503")
    ));
    assert!(output.scenes()[1].is_written());
    assert!(matches!(
        &output.report().anomalies()[..],
        [Anomaly::FailedScene { beat_index: 1, .. }]
    ));
    assert!(pipeline.store().get(&Artifact::Scene(1)).is_none());
    assert!(pipeline.store().get(&Artifact::Scene(2)).is_some());
}

#[tokio::test]
async fn test_world_bible_retry_recovers() {
    let mut script = vec!["Sure! Here is your world bible.".to_string()];
    script.extend(happy_script(1));
    let pipeline = pipeline(ScriptedDriver::texts(script));

    let output = pipeline
        .run(SOURCE, CONTEXT, &Blocklist::default_terms())
        .await
        .unwrap();

    assert_eq!(pipeline.driver().calls_with_system(WORLD_BIBLE_CALL), 2);
    assert!(matches!(
        &output.report().anomalies()[..],
        [Anomaly::WorldBibleRetried { .. }]
    ));
    let retry = &pipeline.driver().requests()[1];
    assert!(retry.user_text().contains("could not be used"));
}

#[tokio::test]
async fn test_world_bible_fails_after_two_attempts() {
    let pipeline = pipeline(ScriptedDriver::texts([
        "no json here",
        r#"{"characters": {"Macbeth": ""}}"#,
        "unused",
    ]));

    let err = pipeline
        .run(SOURCE, CONTEXT, &Blocklist::default_terms())
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(PipelineStage::WorldBible));
    assert!(matches!(
        err.pipeline_kind(),
        Some(PipelineErrorKind::MalformedMapping { attempts: 2, .. })
    ));
    assert_eq!(pipeline.driver().call_count(), 2);
    assert_eq!(pipeline.driver().calls_with_system(BEATS_CALL), 0);
    assert!(pipeline.store().artifacts().is_empty());
}

#[tokio::test]
async fn test_ambiguous_bible_is_not_retried() {
    let pipeline = pipeline(ScriptedDriver::texts([
        r#"{"objects": {"Crown": "CEO seat"}, "concepts": {"crown": "board control"}}"#,
    ]));

    let err = pipeline
        .run(SOURCE, CONTEXT, &Blocklist::default_terms())
        .await
        .unwrap_err();

    assert!(matches!(
        err.pipeline_kind(),
        Some(PipelineErrorKind::AmbiguousMapping { .. })
    ));
    assert_eq!(pipeline.driver().call_count(), 1);
}

#[tokio::test]
async fn test_service_error_in_world_bible_is_fatal() {
    let pipeline = pipeline(ScriptedDriver::new(vec![Scripted::Error(
        ServiceErrorKind::MissingApiKey("GEMINI_API_KEY"),
    )]));

    let err = pipeline
        .run(SOURCE, CONTEXT, &Blocklist::default_terms())
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(PipelineStage::WorldBible));
    assert!(err.is_service_error());
    assert_eq!(pipeline.driver().call_count(), 1);
}

#[tokio::test]
async fn test_empty_input_fails_before_any_call() {
    let pipeline = pipeline(ScriptedDriver::texts(happy_script(1)));

    let err = pipeline
        .run(SOURCE, "  \n", &Blocklist::default_terms())
        .await
        .unwrap_err();

    assert_eq!(
        err.pipeline_kind(),
        Some(&PipelineErrorKind::EmptyInput("target_context".to_string()))
    );
    assert_eq!(pipeline.driver().call_count(), 0);
}

#[tokio::test]
async fn test_unmapped_entities_are_reported() {
    let beats = r#"[{"summary": "A feast", "entities": ["macbeth", "Fleance"]}]"#;
    let pipeline = pipeline(ScriptedDriver::texts([bible_json(), beats.to_string(), prose(1)]));

    let output = pipeline
        .run(SOURCE, CONTEXT, &Blocklist::default_terms())
        .await
        .unwrap();

    assert_eq!(
        output.report().anomalies(),
        &[Anomaly::UnmappedEntity {
            beat_index: 1,
            name: "Fleance".to_string(),
        }]
    );
    assert!(output.scenes()[0].is_written());
}

#[tokio::test]
async fn test_leaked_vocabulary_is_reported_without_failing() {
    let pipeline = pipeline(ScriptedDriver::texts([
        bible_json(),
        beats_json(1),
        "The CEO entered the Server Farm wielding a Sword.".to_string(),
    ]));
    let blocklist = Blocklist::new(["sword", "castle", "king"]);

    let output = pipeline.run(SOURCE, CONTEXT, &blocklist).await.unwrap();

    let violations = output.report().validation().violations();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].term(), "sword");
    let story = pipeline.store().get(&Artifact::Story).unwrap();
    assert!(story.contains("Status: WARNINGS DETECTED"));
    assert!(story.contains("'sword' (1)"));
}

#[tokio::test]
async fn test_resume_reuses_stored_artifacts() {
    let first = pipeline(ScriptedDriver::texts(happy_script(2)));
    first
        .run(SOURCE, CONTEXT, &Blocklist::default_terms())
        .await
        .unwrap();

    let store = first.store().clone();
    let edited = store
        .get(&Artifact::WorldBible)
        .unwrap()
        .replace("CEO Duncan", "Chairman Kessler");
    retell_storage::ArtifactStore::write(&store, &Artifact::WorldBible, &edited)
        .await
        .unwrap();

    let options = PipelineOptionsBuilder::default().resume(true).build().unwrap();
    let resumed = Pipeline::new(ScriptedDriver::texts([prose(1), prose(2)]), store)
        .with_options(options);
    let output = resumed
        .run(SOURCE, CONTEXT, &Blocklist::default_terms())
        .await
        .unwrap();

    assert_eq!(resumed.driver().call_count(), 2);
    assert_eq!(resumed.driver().calls_with_system(PROSE_CALL), 2);
    assert_eq!(
        output.world_bible().lookup("king duncan").unwrap().replacement(),
        "Chairman Kessler"
    );
    assert_eq!(output.beats().len(), 2);
}

#[tokio::test]
async fn test_resume_clears_scenes_from_earlier_run() {
    let first = pipeline(ScriptedDriver::texts(happy_script(3)));
    first
        .run(SOURCE, CONTEXT, &Blocklist::default_terms())
        .await
        .unwrap();

    let store = first.store().clone();
    assert!(store.get(&Artifact::Scene(3)).is_some());
    retell_storage::ArtifactStore::write(&store, &Artifact::Beats, &beats_json(2))
        .await
        .unwrap();

    let script = vec![
        Scripted::Error(ServiceErrorKind::HttpError {
            status_code: 500,
            message: "internal".to_string(),
        }),
        Scripted::Text(prose(2)),
    ];
    let options = PipelineOptionsBuilder::default().resume(true).build().unwrap();
    let resumed = Pipeline::new(ScriptedDriver::new(script), store.clone()).with_options(options);
    let output = resumed
        .run(SOURCE, CONTEXT, &Blocklist::default_terms())
        .await
        .unwrap();

    assert_eq!(output.scenes().len(), 2);
    assert!(store.get(&Artifact::Scene(1)).is_none());
    assert_eq!(store.get(&Artifact::Scene(2)), Some(prose(2)));
    assert!(store.get(&Artifact::Scene(3)).is_none());
}

#[tokio::test]
async fn test_filesystem_artifacts_written() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSystemArtifactStore::new(dir.path().join("run")).unwrap();
    let pipeline = Pipeline::new(ScriptedDriver::texts(happy_script(2)), store);

    pipeline
        .run(SOURCE, CONTEXT, &Blocklist::default_terms())
        .await
        .unwrap();

    for name in [
        "world_bible.json",
        "beats.json",
        "scene_001.txt",
        "scene_002.txt",
        "validation_report.json",
        "story_output.txt",
    ] {
        assert!(dir.path().join("run").join(name).exists(), "missing {name}");
    }
}
