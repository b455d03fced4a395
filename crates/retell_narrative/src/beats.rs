//! Beats: the ordered scene summaries a source narrative is reduced to.

use crate::extraction::extract_and_parse;
use retell_error::{PipelineError, PipelineErrorKind};
use serde::{Deserialize, Serialize};

/// One structured scene summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct Beat {
    /// 1-based narrative position
    index: usize,
    /// What happens in the scene
    summary: String,
    /// Names of the characters, objects and places the scene involves
    #[serde(default)]
    entities: Vec<String>,
}

impl Beat {
    /// Create a beat.
    pub fn new(index: usize, summary: impl Into<String>, entities: Vec<String>) -> Self {
        Self {
            index,
            summary: summary.into(),
            entities,
        }
    }
}

/// Parse a beat list from a generated (or hand-edited) response.
///
/// Accepts a JSON array of beats or an object with a `beats` array. Each beat
/// is a plain string or an object whose summary may be named `summary`,
/// `description` or `text`. Indices follow list position, starting at 1.
///
/// # Errors
///
/// `EmptyExtraction` when the list is empty; `MalformedBeats` when the
/// response is not a beat list or a summary is blank.
///
/// # Examples
///
/// ```
/// use retell_narrative::parse_beats;
///
/// let beats = parse_beats(r#"{"beats": [{"description": "A storm", "entities": ["Witches"]}, "A battle"]}"#)
///     .unwrap();
/// assert_eq!(beats.len(), 2);
/// assert_eq!(*beats[1].index(), 2);
/// assert_eq!(beats[1].summary(), "A battle");
/// ```
pub fn parse_beats(response: &str) -> Result<Vec<Beat>, PipelineError> {
    let raw: RawBeatList = extract_and_parse(response)
        .map_err(|e| PipelineError::new(PipelineErrorKind::MalformedBeats(e.message)))?;

    let raw_beats = match raw {
        RawBeatList::List(beats) | RawBeatList::Wrapped { beats } => beats,
    };

    if raw_beats.is_empty() {
        return Err(PipelineError::new(PipelineErrorKind::EmptyExtraction));
    }

    raw_beats
        .into_iter()
        .enumerate()
        .map(|(position, raw)| {
            let index = position + 1;
            raw.into_beat(index).ok_or_else(|| {
                PipelineError::new(PipelineErrorKind::MalformedBeats(format!(
                    "beat {} has a blank summary",
                    index
                )))
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawBeatList {
    List(Vec<RawBeat>),
    Wrapped { beats: Vec<RawBeat> },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawBeat {
    Plain(String),
    Detailed {
        #[serde(default)]
        summary: Option<String>,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        entities: Vec<String>,
    },
}

impl RawBeat {
    fn into_beat(self, index: usize) -> Option<Beat> {
        let (summary, entities) = match self {
            RawBeat::Plain(summary) => (Some(summary), Vec::new()),
            RawBeat::Detailed {
                summary,
                description,
                text,
                entities,
            } => {
                let summary = [summary, description, text]
                    .into_iter()
                    .flatten()
                    .find(|s| !s.trim().is_empty());
                (summary, entities)
            }
        };

        let summary = summary?.trim().to_string();
        if summary.is_empty() {
            return None;
        }

        let entities = entities
            .into_iter()
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();

        Some(Beat::new(index, summary, entities))
    }
}
