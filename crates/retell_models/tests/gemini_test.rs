#![cfg(feature = "gemini")]

//! Live Gemini API tests. Require GEMINI_API_KEY and the `api` feature.

use retell_core::{GenerateRequest, ResponseFormat};
use retell_interface::RetellDriver;
use retell_models::GeminiClient;

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn test_gemini_text_generation() {
    let _ = dotenvy::dotenv();

    let client = GeminiClient::new().expect("Failed to create client");
    let request = GenerateRequest::from_prompt(
        "Answer in one short sentence.",
        "Describe a server room at night.",
        ResponseFormat::Text,
    )
    .expect("Failed to build request");

    let response = client.generate(&request).await.expect("Generation failed");
    assert!(!response.is_blank());
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn test_gemini_json_mode_returns_json() {
    let _ = dotenvy::dotenv();

    let client = GeminiClient::new().expect("Failed to create client");
    let request = GenerateRequest::from_prompt(
        "Return only valid JSON.",
        r#"Return {"characters": {"Macbeth": "<a modern name>"}}"#,
        ResponseFormat::Json,
    )
    .expect("Failed to build request");

    let response = client.generate(&request).await.expect("Generation failed");
    assert!(response.text().trim_start().starts_with('{'));
}
