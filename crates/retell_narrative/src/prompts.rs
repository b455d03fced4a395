//! Prompt construction for the three generation calls.
//!
//! Every function here is pure: prompts depend only on their inputs, never on
//! the generation client, so they can be inspected and tested offline.

use crate::{Beat, Blocklist, EntityCategory, WorldBible};
use std::fmt::Write;
use strum::IntoEnumIterator;

/// System instruction for world bible generation.
pub const WORLD_BIBLE_SYSTEM: &str = "You are a narrative architect. You map every \
character, object, location and concept of a source story onto a new setting, \
keeping each mapping consistent and one-to-one. Return ONLY valid JSON.";

/// System instruction for beat extraction.
pub const BEATS_SYSTEM: &str = "You are a story analyst. You reduce a narrative to \
its ordered dramatic beats without adding or skipping events. Return ONLY valid JSON.";

/// System instruction for prose generation.
pub const PROSE_SYSTEM: &str = "You are a novelist writing one scene of a modern \
retelling. You follow the world bible exactly and never use forbidden vocabulary.";

/// Prompt requesting the world bible.
pub fn world_bible_prompt(source_text: &str, target_context: &str) -> String {
    format!(
        r#"Create a World Bible that maps the source story below onto this target context:
{target_context}

Return a JSON object with this structure:
{{
  "setting": "<one-line description of the new setting>",
  "characters": {{ "<original name>": {{ "replacement": "<new name>", "note": "<role>" }} }},
  "objects": {{ "<original object>": {{ "replacement": "<modern equivalent>" }} }},
  "locations": {{ "<original place>": {{ "replacement": "<new place>" }} }},
  "concepts": {{ "<original term>": {{ "replacement": "<new term>" }} }}
}}

Rules:
- Every replacement must be a non-empty string.
- List each original term exactly once, in a single category.

SOURCE STORY:
{source_text}"#
    )
}

/// Stricter prompt issued after the first world bible response failed to parse.
pub fn world_bible_retry_prompt(source_text: &str, target_context: &str, failure: &str) -> String {
    format!(
        "{}\n\nYour previous answer could not be used: {}\n\
         Respond with the JSON object alone: no markdown fences, no commentary, \
         no empty replacements.",
        world_bible_prompt(source_text, target_context),
        failure
    )
}

/// Prompt requesting the ordered beat list.
pub fn beats_prompt(source_text: &str) -> String {
    format!(
        r#"Break the story below into its scene-by-scene beats, in narrative order.

Return a JSON array:
[
  {{ "summary": "<what happens, one or two sentences>", "entities": ["<names of characters, objects and places involved>"] }}
]

STORY:
{source_text}"#
    )
}

/// The world bible as structured text, one mapping per line grouped by
/// category.
pub fn render_world_bible(bible: &WorldBible) -> String {
    let mut out = String::new();
    if let Some(setting) = bible.setting() {
        let _ = writeln!(out, "Setting: {}", setting);
    }
    for category in EntityCategory::iter() {
        let mut mappings = bible.mappings_in(category).peekable();
        if mappings.peek().is_none() {
            continue;
        }
        let _ = writeln!(out, "{}:", capitalize(category.as_ref()));
        for mapping in mappings {
            match mapping.note() {
                Some(note) => {
                    let _ = writeln!(
                        out,
                        "  - {} -> {} ({})",
                        mapping.original(),
                        mapping.replacement(),
                        note
                    );
                }
                None => {
                    let _ = writeln!(out, "  - {} -> {}", mapping.original(), mapping.replacement());
                }
            }
        }
    }
    out
}

/// The negative constraint: every blocklist term as forbidden, plus a
/// "write X, never Y" line per bible mapping.
///
/// # Examples
///
/// ```
/// use retell_narrative::{negative_constraint, Blocklist, WorldBible};
///
/// let bible = WorldBible::parse(r#"{"objects": {"Castle": "Server Farm"}}"#).unwrap();
/// let constraint = negative_constraint(&Blocklist::new(["castle", "sword"]), &bible);
///
/// assert!(constraint.contains("castle, sword"));
/// assert!(constraint.contains("write \"Server Farm\", never \"Castle\""));
/// ```
pub fn negative_constraint(blocklist: &Blocklist, bible: &WorldBible) -> String {
    let mut out = String::from("FORBIDDEN VOCABULARY\n");
    if blocklist.is_empty() {
        out.push_str("No words are forbidden outright.\n");
    } else {
        let _ = writeln!(
            out,
            "Never use any of these words, in any capitalization or as part of another word: {}",
            blocklist.terms().join(", ")
        );
    }

    out.push_str("Substitutions:\n");
    for mapping in bible.mappings() {
        let _ = writeln!(
            out,
            "  - write \"{}\", never \"{}\"",
            mapping.replacement(),
            mapping.original()
        );
    }
    out
}

/// Prompt for the prose of one beat. Holds no earlier scenes.
pub fn prose_prompt(
    target_context: &str,
    beat: &Beat,
    bible: &WorldBible,
    blocklist: &Blocklist,
) -> String {
    let entities = if beat.entities().is_empty() {
        "(none listed)".to_string()
    } else {
        beat.entities().join(", ")
    };

    format!(
        "TARGET CONTEXT:\n{target_context}\n\n\
         WORLD BIBLE:\n{bible}\n\
         {constraint}\n\
         SCENE {index}:\n{summary}\n\n\
         Entities in this scene: {entities}\n\n\
         Write this scene as vivid prose in the target context. Use only the \
         replacement names from the world bible. Return the prose alone, with no \
         heading.",
        bible = render_world_bible(bible),
        constraint = negative_constraint(blocklist, bible),
        index = beat.index(),
        summary = beat.summary(),
    )
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
