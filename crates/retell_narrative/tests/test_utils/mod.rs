//! Scripted generation driver for pipeline tests.

#![allow(dead_code)]

use async_trait::async_trait;
use retell_core::{GenerateRequest, GenerateResponse, Role};
use retell_error::{RetellResult, ServiceError, ServiceErrorKind};
use retell_interface::RetellDriver;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A single scripted reply.
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Return this text
    Text(String),
    /// Fail with this service error
    Error(ServiceErrorKind),
}

/// Driver replaying a fixed sequence of replies and recording every request.
///
/// Once the script is exhausted every call fails, so an unexpected extra
/// call shows up as a failed scene or a service error.
pub struct ScriptedDriver {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedDriver {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Script made only of successful text replies.
    pub fn texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(texts.into_iter().map(|t| Scripted::Text(t.into())).collect())
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of recorded requests whose system message contains `marker`.
    pub fn calls_with_system(&self, marker: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                r.messages()
                    .iter()
                    .any(|m| m.role == Role::System && m.text.contains(marker))
            })
            .count()
    }
}

#[async_trait]
impl RetellDriver for ScriptedDriver {
    async fn generate(&self, req: &GenerateRequest) -> RetellResult<GenerateResponse> {
        self.requests.lock().unwrap().push(req.clone());
        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Text(text)) => Ok(GenerateResponse::new(text)),
            Some(Scripted::Error(kind)) => Err(ServiceError::new(kind).into()),
            None => Err(ServiceError::new(ServiceErrorKind::ApiRequest(
                "script exhausted".to_string(),
            ))
            .into()),
        }
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}

/// System-message markers identifying each call type.
pub const WORLD_BIBLE_CALL: &str = "narrative architect";
pub const BEATS_CALL: &str = "story analyst";
pub const PROSE_CALL: &str = "novelist";

pub const SOURCE: &str = "Macbeth meets three witches on a heath. He kills King Duncan \
in his castle with a dagger. Macduff defeats him at Dunsinane.";

pub const CONTEXT: &str = "A 2030 high-frequency trading firm in Manhattan";

pub fn bible_json() -> String {
    r#"```json
{
  "setting": "Meridian Capital, Manhattan, 2030",
  "characters": {
    "Macbeth": {"new_name": "Marcus Chen", "role": "Head of Quant Strategy"},
    "King Duncan": "CEO Duncan",
    "Macduff": "Sarah Martinez",
    "Witches": "The Oracle"
  },
  "objects": {"Dagger": {"new_form": "Root access token"}},
  "locations": {"Castle": "Server Farm", "Dunsinane": "Hudson Yards"},
  "themes": {"Ambition": "alpha"}
}
```"#
        .to_string()
}

pub fn beats_json(count: usize) -> String {
    let beats: Vec<String> = (1..=count)
        .map(|i| format!(r#"{{"summary": "Beat number {i}", "entities": ["Macbeth"]}}"#))
        .collect();
    format!("[{}]", beats.join(", "))
}

pub fn prose(index: usize) -> String {
    format!("Marcus Chen studied the order book for the {index}th time.")
}
