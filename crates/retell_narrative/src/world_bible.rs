//! The World Bible: a validated mapping from source-world terms to their
//! replacements in the target context.

use crate::extraction::extract_and_parse;
use retell_error::{PipelineError, PipelineErrorKind};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use strum::IntoEnumIterator;

/// Category of a mapped entity.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::EnumIter,
    strum::Display,
    strum::AsRefStr,
)]
pub enum EntityCategory {
    /// People and named beings
    #[serde(rename = "characters")]
    #[strum(serialize = "characters")]
    Character,
    /// Artifacts and props
    #[serde(rename = "objects")]
    #[strum(serialize = "objects")]
    Object,
    /// Places
    #[serde(rename = "locations")]
    #[strum(serialize = "locations")]
    Location,
    /// Ideas, titles and period vocabulary
    #[serde(rename = "concepts")]
    #[strum(serialize = "concepts")]
    Concept,
}

/// One original term and its replacement.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct Mapping {
    /// Category the term was listed under
    category: EntityCategory,
    /// Term as it appears in the source
    original: String,
    /// Term to use in the target context
    replacement: String,
    /// Optional role or rationale supplied with the mapping
    note: Option<String>,
}

/// Immutable, validated entity mapping for one run.
///
/// Every replacement is non-empty, every original term (trimmed, compared
/// case-insensitively) appears once across all categories, and at least one
/// mapping exists.
///
/// # Examples
///
/// ```
/// use retell_narrative::{EntityCategory, WorldBible};
///
/// let bible = WorldBible::parse(
///     r#"{"characters": {"King Duncan": "CEO Duncan"}, "themes": {"Ambition": "alpha"}}"#,
/// )
/// .unwrap();
///
/// let mapping = bible.lookup("king duncan").unwrap();
/// assert_eq!(mapping.replacement(), "CEO Duncan");
/// assert_eq!(*mapping.category(), EntityCategory::Character);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWorldBible", into = "RawWorldBible")]
pub struct WorldBible {
    setting: Option<String>,
    mappings: Vec<Mapping>,
}

impl WorldBible {
    /// Parse a generated (or hand-edited) response into a bible.
    ///
    /// Markdown fences and surrounding prose are tolerated. Shape problems
    /// yield `MalformedMapping` with `attempts: 1`; a term mapped twice yields
    /// `AmbiguousMapping`.
    pub fn parse(response: &str) -> Result<Self, PipelineError> {
        let raw: RawWorldBible = extract_and_parse(response).map_err(|e| {
            PipelineError::new(PipelineErrorKind::MalformedMapping {
                attempts: 1,
                reason: e.message,
            })
        })?;
        Self::try_from(raw)
    }

    /// One-line description of the target setting, if provided.
    pub fn setting(&self) -> Option<&str> {
        self.setting.as_deref()
    }

    /// All mappings, grouped by category in declaration order.
    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    /// Mappings of one category.
    pub fn mappings_in(&self, category: EntityCategory) -> impl Iterator<Item = &Mapping> {
        self.mappings
            .iter()
            .filter(move |m| m.category == category)
    }

    /// Find the mapping of an original term, ignoring case and surrounding
    /// whitespace.
    pub fn lookup(&self, term: &str) -> Option<&Mapping> {
        let key = normalize(term);
        self.mappings.iter().find(|m| normalize(&m.original) == key)
    }

    /// Whether `name` is mapped, either as an original term or as a
    /// replacement.
    pub fn covers(&self, name: &str) -> bool {
        let key = normalize(name);
        self.mappings
            .iter()
            .any(|m| normalize(&m.original) == key || normalize(&m.replacement) == key)
    }

    /// Number of mappings.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Whether the bible holds no mappings.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Pretty JSON in the same shape the service is asked for.
    pub fn to_json(&self) -> Result<String, retell_error::JsonError> {
        serde_json::to_string_pretty(self).map_err(|e| {
            retell_error::JsonError::new(format!("Failed to serialize world bible: {}", e))
        })
    }
}

fn normalize(term: &str) -> String {
    term.trim().to_lowercase()
}

#[track_caller]
fn malformed(reason: impl Into<String>) -> PipelineError {
    PipelineError::new(PipelineErrorKind::MalformedMapping {
        attempts: 1,
        reason: reason.into(),
    })
}

impl TryFrom<RawWorldBible> for WorldBible {
    type Error = PipelineError;

    fn try_from(raw: RawWorldBible) -> Result<Self, Self::Error> {
        let mut mappings = Vec::new();
        let mut seen: HashMap<String, EntityCategory> = HashMap::new();

        for category in EntityCategory::iter() {
            for (original, entry) in raw.entries(category) {
                let original = original.trim();
                if original.is_empty() {
                    return Err(malformed(format!("blank term listed under '{}'", category)));
                }

                let (replacement, note) = entry.resolve();
                let Some(replacement) = replacement else {
                    return Err(malformed(format!(
                        "'{}' under '{}' has no replacement",
                        original, category
                    )));
                };

                if let Some(first) = seen.insert(normalize(original), category) {
                    return Err(PipelineError::new(PipelineErrorKind::AmbiguousMapping {
                        term: original.to_string(),
                        first: first.to_string(),
                        second: category.to_string(),
                    }));
                }

                mappings.push(Mapping {
                    category,
                    original: original.to_string(),
                    replacement,
                    note,
                });
            }
        }

        if mappings.is_empty() {
            return Err(malformed("world bible holds no mappings"));
        }

        Ok(Self {
            setting: raw.setting.and_then(RawSetting::resolve),
            mappings,
        })
    }
}

impl From<WorldBible> for RawWorldBible {
    fn from(bible: WorldBible) -> Self {
        let mut raw = RawWorldBible {
            setting: bible.setting.map(RawSetting::Text),
            ..Default::default()
        };
        for mapping in bible.mappings {
            let entry = RawEntry::Detailed(RawEntryDetail {
                replacement: Some(mapping.replacement),
                note: mapping.note,
                ..Default::default()
            });
            raw.category_mut(mapping.category)
                .0
                .push((mapping.original, entry));
        }
        raw
    }
}

/// Wire shape of a world bible. Unknown keys (such as `themes`) are ignored.
#[derive(Debug, Default, Serialize, Deserialize)]
struct RawWorldBible {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    setting: Option<RawSetting>,
    #[serde(default, skip_serializing_if = "RawCategory::is_empty")]
    characters: RawCategory,
    #[serde(default, skip_serializing_if = "RawCategory::is_empty")]
    objects: RawCategory,
    #[serde(default, skip_serializing_if = "RawCategory::is_empty")]
    locations: RawCategory,
    #[serde(default, skip_serializing_if = "RawCategory::is_empty")]
    concepts: RawCategory,
    /// Older key for concepts; merged into them on validation.
    #[serde(default, skip_serializing)]
    vocabulary_mappings: RawCategory,
}

impl RawWorldBible {
    fn entries(&self, category: EntityCategory) -> impl Iterator<Item = &(String, RawEntry)> {
        let (listed, legacy) = match category {
            EntityCategory::Character => (&self.characters, None),
            EntityCategory::Object => (&self.objects, None),
            EntityCategory::Location => (&self.locations, None),
            EntityCategory::Concept => (&self.concepts, Some(&self.vocabulary_mappings)),
        };
        listed
            .0
            .iter()
            .chain(legacy.into_iter().flat_map(|c| c.0.iter()))
    }

    fn category_mut(&mut self, category: EntityCategory) -> &mut RawCategory {
        match category {
            EntityCategory::Character => &mut self.characters,
            EntityCategory::Object => &mut self.objects,
            EntityCategory::Location => &mut self.locations,
            EntityCategory::Concept => &mut self.concepts,
        }
    }
}

/// Entries of one category in listed order. Repeated keys are kept so
/// validation can reject them as ambiguous.
#[derive(Debug, Default)]
struct RawCategory(Vec<(String, RawEntry)>);

impl RawCategory {
    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for RawCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (original, entry) in &self.0 {
            map.serialize_entry(original, entry)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RawCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CategoryVisitor;

        impl<'de> Visitor<'de> for CategoryVisitor {
            type Value = RawCategory;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of original terms to replacements")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<RawCategory, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((original, entry)) = access.next_entry::<String, RawEntry>()? {
                    entries.push((original, entry));
                }
                Ok(RawCategory(entries))
            }
        }

        deserializer.deserialize_map(CategoryVisitor)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum RawSetting {
    Text(String),
    Detailed {
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        transformed: Option<String>,
        #[serde(default)]
        primary_location: Option<String>,
    },
}

impl RawSetting {
    fn resolve(self) -> Option<String> {
        let text = match self {
            RawSetting::Text(text) => Some(text),
            RawSetting::Detailed {
                description,
                transformed,
                primary_location,
            } => {
                let base = non_blank(description).or(non_blank(transformed));
                match (base, non_blank(primary_location)) {
                    (Some(base), Some(place)) => Some(format!("{} ({})", base, place)),
                    (base, place) => base.or(place),
                }
            }
        };
        non_blank(text)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Plain(String),
    Detailed(RawEntryDetail),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RawEntryDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    replacement: Option<String>,
    #[serde(default, skip_serializing)]
    new_name: Option<String>,
    #[serde(default, skip_serializing)]
    new_form: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    note: Option<String>,
    #[serde(default, skip_serializing)]
    role: Option<String>,
    #[serde(default, skip_serializing)]
    significance: Option<String>,
}

impl RawEntry {
    /// Replacement (if non-blank) and note of an entry.
    fn resolve(&self) -> (Option<String>, Option<String>) {
        match self {
            RawEntry::Plain(text) => (non_blank(Some(text.clone())), None),
            RawEntry::Detailed(detail) => {
                let replacement = non_blank(detail.replacement.clone())
                    .or_else(|| non_blank(detail.new_name.clone()))
                    .or_else(|| non_blank(detail.new_form.clone()));
                let note = non_blank(detail.note.clone())
                    .or_else(|| non_blank(detail.role.clone()))
                    .or_else(|| non_blank(detail.significance.clone()));
                (replacement, note)
            }
        }
    }
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}
