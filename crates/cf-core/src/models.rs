//! # Domain Models
//!
//! These structs represent the core entities of the community forum.
//! Field names serialize in camelCase so a persisted posts blob keeps the
//! layout the mobile client has always written.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Direction of the current viewer's vote on a post or comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    /// Contribution of this vote to a tally.
    pub fn weight(self) -> i64 {
        match self {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }
}

impl fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteDirection::Up => f.write_str("up"),
            VoteDirection::Down => f.write_str("down"),
        }
    }
}

impl FromStr for VoteDirection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(VoteDirection::Up),
            "down" => Ok(VoteDirection::Down),
            other => Err(AppError::ValidationError(format!(
                "vote direction must be 'up' or 'down', got '{other}'"
            ))),
        }
    }
}

/// A topic space (e.g., "Pregnancy & Bump Chat") that posts belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Community {
    pub id: String,
    pub name: String,
    pub description: String,
    pub rules: Vec<String>,
    /// Display-only; joining or leaving does not move it.
    pub member_count: u32,
    #[serde(default)]
    pub is_joined: bool,
}

/// A reply inside a post. `parent_id == None` marks a top-level comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumComment {
    pub id: String,
    pub parent_id: Option<String>,
    pub author_name: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub vote_count: i64,
    #[serde(default)]
    pub user_vote: Option<VoteDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_uri: Option<String>,
}

impl ForumComment {
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// The fundamental unit of conversation inside a community.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumPost {
    pub id: String,
    pub community_id: String,
    pub title: String,
    pub body: String,
    /// Display name captured when the post was written
    pub author_name: String,
    pub created_at: DateTime<Utc>,
    pub vote_count: i64,
    /// Kept equal to `comments.len()` by every store mutation
    pub comment_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_uri: Option<String>,
    #[serde(default)]
    pub user_vote: Option<VoteDirection>,
    #[serde(default)]
    pub comments: Vec<ForumComment>,
}

impl ForumPost {
    pub fn has_media(&self) -> bool {
        self.media_uri.is_some()
    }

    pub fn comment(&self, comment_id: &str) -> Option<&ForumComment> {
        self.comments.iter().find(|c| c.id == comment_id)
    }
}
