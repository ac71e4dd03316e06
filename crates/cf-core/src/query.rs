//! Filtering and ordering for a community's post list.

use std::cmp::Reverse;
use std::str::FromStr;

use crate::error::AppError;
use crate::models::ForumPost;
use crate::tags::{infer_tags, PostTag};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentFilter {
    #[default]
    All,
    Text,
    Photo,
    /// Posts carry no link attachments yet, so this matches nothing.
    Link,
}

impl ContentFilter {
    fn matches(self, post: &ForumPost) -> bool {
        match self {
            ContentFilter::All => true,
            ContentFilter::Text => !post.has_media(),
            ContentFilter::Photo => post.has_media(),
            ContentFilter::Link => false,
        }
    }
}

impl FromStr for ContentFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(ContentFilter::All),
            "text" => Ok(ContentFilter::Text),
            "photo" => Ok(ContentFilter::Photo),
            "link" => Ok(ContentFilter::Link),
            other => Err(AppError::ValidationError(format!(
                "unknown content filter '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostSort {
    #[default]
    Newest,
    Top,
    MostCommented,
}

impl FromStr for PostSort {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" => Ok(PostSort::Newest),
            "top" => Ok(PostSort::Top),
            "most-commented" | "most_commented" | "most commented" => Ok(PostSort::MostCommented),
            other => Err(AppError::ValidationError(format!("unknown sort '{other}'"))),
        }
    }
}

/// Listing options for a community feed. `tag == None` means all tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQuery {
    pub tag: Option<PostTag>,
    pub content: ContentFilter,
    pub sort: PostSort,
}

impl PostQuery {
    /// Number of options that differ from the defaults, for a filter badge.
    pub fn active_filter_count(&self) -> usize {
        usize::from(self.tag.is_some())
            + usize::from(self.content != ContentFilter::All)
            + usize::from(self.sort != PostSort::Newest)
    }

    /// Filters then stably sorts `posts`.
    pub fn apply<'a, I>(&self, posts: I) -> Vec<ForumPost>
    where
        I: IntoIterator<Item = &'a ForumPost>,
    {
        let mut out: Vec<ForumPost> = posts
            .into_iter()
            .filter(|p| match self.tag {
                Some(tag) => infer_tags(&p.title, &p.body).contains(&tag),
                None => true,
            })
            .filter(|p| self.content.matches(p))
            .cloned()
            .collect();

        match self.sort {
            PostSort::Newest => out.sort_by_key(|p| Reverse(p.created_at)),
            PostSort::Top => out.sort_by_key(|p| Reverse(p.vote_count)),
            PostSort::MostCommented => out.sort_by_key(|p| Reverse(p.comment_count)),
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::seeded_posts;

    fn ids(posts: &[ForumPost]) -> Vec<&str> {
        posts.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_default_query_sorts_newest_first() {
        let posts = seeded_posts();
        let out = PostQuery::default().apply(&posts);
        assert_eq!(ids(&out), vec!["p1", "p2", "p3"]);
    }

    #[test]
    fn test_top_and_most_commented() {
        let posts = seeded_posts();
        let top = PostQuery { sort: PostSort::Top, ..Default::default() }.apply(&posts);
        assert_eq!(ids(&top), vec!["p2", "p1", "p3"]);

        let busy = PostQuery { sort: PostSort::MostCommented, ..Default::default() }.apply(&posts);
        assert_eq!(ids(&busy), vec!["p2", "p1", "p3"]);
    }

    #[test]
    fn test_content_filters() {
        let mut posts = seeded_posts();
        posts[1].media_uri = None;

        let text = PostQuery { content: ContentFilter::Text, ..Default::default() }.apply(&posts);
        assert_eq!(ids(&text), vec!["p2"]);

        let photo = PostQuery { content: ContentFilter::Photo, ..Default::default() }.apply(&posts);
        assert_eq!(ids(&photo), vec!["p1", "p3"]);

        let link = PostQuery { content: ContentFilter::Link, ..Default::default() }.apply(&posts);
        assert!(link.is_empty());
    }

    #[test]
    fn test_tag_filter() {
        let posts = seeded_posts();
        let sleep = PostQuery { tag: Some(PostTag::Sleep), ..Default::default() }.apply(&posts);
        assert_eq!(ids(&sleep), vec!["p2"]);
    }

    #[test]
    fn test_active_filter_count() {
        assert_eq!(PostQuery::default().active_filter_count(), 0);
        let q = PostQuery {
            tag: Some(PostTag::Feeding),
            content: ContentFilter::Photo,
            sort: PostSort::Newest,
        };
        assert_eq!(q.active_filter_count(), 2);
    }

    #[test]
    fn test_parse_options() {
        assert_eq!("Most-Commented".parse::<PostSort>().unwrap(), PostSort::MostCommented);
        assert_eq!("photo".parse::<ContentFilter>().unwrap(), ContentFilter::Photo);
        assert!("oldest".parse::<PostSort>().is_err());
    }
}
