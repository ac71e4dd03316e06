//! Topic tags inferred from post text.

use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostTag {
    General,
    Newborn,
    Sleep,
    Feeding,
    Postpartum,
    MentalHealth,
}

/// Tags offered when writing a post, in display order.
pub const POST_TAGS: [PostTag; 6] = [
    PostTag::General,
    PostTag::Newborn,
    PostTag::Sleep,
    PostTag::Feeding,
    PostTag::Postpartum,
    PostTag::MentalHealth,
];

/// Keyword lists checked in this order; `General` is the fallback.
const KEYWORDS: [(PostTag, &[&str]); 5] = [
    (PostTag::Newborn, &["newborn", "new baby", "weeks old"]),
    (PostTag::Sleep, &["sleep", "nap", "night", "bedtime"]),
    (PostTag::Feeding, &["feed", "breast", "bottle", "formula"]),
    (PostTag::Postpartum, &["postpartum", "post-partum", "ppd"]),
    (
        PostTag::MentalHealth,
        &["mental", "anxiety", "overwhelmed", "stress"],
    ),
];

impl PostTag {
    pub fn label(self) -> &'static str {
        match self {
            PostTag::General => "General",
            PostTag::Newborn => "Newborn",
            PostTag::Sleep => "Sleep",
            PostTag::Feeding => "Feeding",
            PostTag::Postpartum => "Postpartum",
            PostTag::MentalHealth => "Mental Health",
        }
    }
}

impl fmt::Display for PostTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PostTag {
    type Err = AppError;

    /// Accepts the display label in any case, with `-` or `_` for the space.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        POST_TAGS
            .iter()
            .copied()
            .find(|tag| tag.label().to_ascii_lowercase() == wanted)
            .ok_or_else(|| AppError::ValidationError(format!("unknown tag '{s}'")))
    }
}

/// Returns every tag whose keywords appear in the title or body.
/// Never empty: untagged text yields `[General]`.
pub fn infer_tags(title: &str, body: &str) -> Vec<PostTag> {
    let text = format!("{title} {body}").to_lowercase();
    let mut tags: Vec<PostTag> = KEYWORDS
        .iter()
        .filter(|(_, words)| words.iter().any(|w| text.contains(w)))
        .map(|(tag, _)| *tag)
        .collect();

    if tags.is_empty() {
        tags.push(PostTag::General);
    }
    tags
}

/// The tag shown on a post card.
pub fn primary_tag(title: &str, body: &str) -> PostTag {
    infer_tags(title, body)
        .first()
        .copied()
        .unwrap_or(PostTag::General)
}
