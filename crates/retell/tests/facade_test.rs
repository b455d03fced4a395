//! Tests of the facade re-exports.

use async_trait::async_trait;
use retell::{
    Artifact, Blocklist, GenerateRequest, GenerateResponse, InMemoryArtifactStore, Pipeline,
    RetellDriver, RetellResult, SceneStatus,
};
use std::sync::Mutex;

/// Replies with canned text chosen by the kind of call.
struct CannedDriver {
    calls: Mutex<usize>,
}

#[async_trait]
impl RetellDriver for CannedDriver {
    async fn generate(&self, req: &GenerateRequest) -> RetellResult<GenerateResponse> {
        *self.calls.lock().unwrap() += 1;
        let system = req.system_text().unwrap_or_default();
        let text = if system.contains("narrative architect") {
            r#"{"characters": {"Banquo": "Ben Okafor"}, "locations": {"Castle": "Server Farm"}}"#
        } else if system.contains("story analyst") {
            r#"{"beats": [{"summary": "Ben checks the Server Farm", "entities": ["Banquo"]}]}"#
        } else {
            "Ben Okafor walked the cold aisles of the Server Farm."
        };
        Ok(GenerateResponse::new(text))
    }

    fn provider_name(&self) -> &'static str {
        "canned"
    }

    fn model_name(&self) -> &str {
        "canned-model"
    }
}

#[tokio::test]
async fn test_pipeline_through_facade() {
    let driver = CannedDriver {
        calls: Mutex::new(0),
    };
    let pipeline = Pipeline::new(driver, InMemoryArtifactStore::new());

    let output = pipeline
        .run("Banquo walks the castle.", "A data center", &Blocklist::default_terms())
        .await
        .unwrap();

    assert_eq!(*pipeline.driver().calls.lock().unwrap(), 3);
    assert_eq!(*output.scenes()[0].status(), SceneStatus::Written);
    assert!(output.report().passed());
    assert!(pipeline.store().get(&Artifact::Story).is_some());
}

#[cfg(feature = "gemini")]
#[test]
fn test_gemini_driver_is_reexported() {
    let client = retell::GeminiClient::from_api_key("test-key", "gemini-2.5-flash");
    assert_eq!(client.provider_name(), "gemini");
    assert_eq!(client.model_name(), "gemini-2.5-flash");
}

#[cfg(feature = "gemini")]
#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn test_live_run_produces_story() {
    let _ = dotenvy::dotenv();

    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(
        retell::GeminiClient::new().expect("GEMINI_API_KEY must be set"),
        retell::FileSystemArtifactStore::new(dir.path()).unwrap(),
    );

    let output = pipeline
        .run(
            "Macbeth, urged by his wife, murders King Duncan in his castle and takes the crown.",
            "A 2030 high-frequency trading firm in Manhattan",
            &Blocklist::default_terms(),
        )
        .await
        .unwrap();

    assert!(!output.scenes().is_empty());
    assert!(dir.path().join("story_output.txt").exists());
}
