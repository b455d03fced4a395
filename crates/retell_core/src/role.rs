//! Role types for prompt messages.

use serde::{Deserialize, Serialize};

/// Author of a prompt message.
///
/// # Examples
///
/// ```
/// use retell_core::Role;
///
/// assert_ne!(Role::System, Role::User);
/// assert_eq!(format!("{}", Role::System), "System");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub enum Role {
    /// System messages provide standing instructions
    System,
    /// User messages carry the task
    User,
}
