//! Artifact names.

/// A named output of one pipeline stage.
///
/// # Examples
///
/// ```
/// use retell_storage::Artifact;
///
/// assert_eq!(Artifact::WorldBible.file_name(), "world_bible.json");
/// assert_eq!(Artifact::Scene(7).file_name(), "scene_007.txt");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum Artifact {
    /// The serialized world bible
    #[display("world bible")]
    WorldBible,
    /// The ordered beat list
    #[display("beats")]
    Beats,
    /// Prose generated for one beat, keyed by beat index
    #[display("scene {}", _0)]
    Scene(usize),
    /// Machine-readable run report
    #[display("validation report")]
    ValidationReport,
    /// Final narrative with the human-readable report appended
    #[display("story")]
    Story,
}

impl Artifact {
    /// File name of this artifact inside a storage root.
    pub fn file_name(&self) -> String {
        match self {
            Artifact::WorldBible => "world_bible.json".to_string(),
            Artifact::Beats => "beats.json".to_string(),
            Artifact::Scene(index) => format!("scene_{:03}.txt", index),
            Artifact::ValidationReport => "validation_report.json".to_string(),
            Artifact::Story => "story_output.txt".to_string(),
        }
    }
}
