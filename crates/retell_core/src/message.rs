//! Prompt message types.

use crate::Role;
use serde::{Deserialize, Serialize};

/// One message of a prompt.
///
/// # Examples
///
/// ```
/// use retell_core::{Message, Role};
///
/// let message = Message::user("Summarize the scene.");
/// assert_eq!(message.role, Role::User);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message author
    pub role: Role,
    /// The message text
    pub text: String,
}

impl Message {
    /// Create a system message.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            text: text.into(),
        }
    }

    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }
}
