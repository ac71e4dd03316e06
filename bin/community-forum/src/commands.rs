//! Subcommands and their plain-text rendering.

use cf_core::error::AppError;
use cf_core::models::{Community, ForumPost, VoteDirection};
use cf_core::query::{ContentFilter, PostQuery, PostSort};
use cf_core::store::ForumStateStore;
use cf_core::tags::{primary_tag, PostTag};
use cf_core::thread::{comment_tree, orphan_comments, CommentNode};
use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List communities.
    Communities,

    /// Join a community, or leave it if already joined. Membership lasts for this run only.
    Join { community: String },

    /// List a community's posts.
    Posts {
        community: String,
        /// Only posts tagged with this topic (e.g. sleep, mental-health).
        #[arg(long)]
        tag: Option<PostTag>,
        /// all, text, photo or link.
        #[arg(long, default_value = "all")]
        content: ContentFilter,
        /// newest, top or most-commented.
        #[arg(long, default_value = "newest")]
        sort: PostSort,
    },

    /// Show a post with its comment thread.
    Show { post: String },

    /// Write a new post.
    Post {
        community: String,
        title: String,
        body: String,
        #[arg(long)]
        author: Option<String>,
        /// Image URI to attach.
        #[arg(long)]
        media: Option<String>,
    },

    /// Reply to a post, or to one of its comments with --parent.
    Reply {
        post: String,
        text: String,
        #[arg(long)]
        parent: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        media: Option<String>,
    },

    /// Toggle your vote on a post, or on a comment with --comment.
    Vote {
        post: String,
        direction: VoteDirection,
        #[arg(long)]
        comment: Option<String>,
    },
}

/// Rendered output plus whether the posts collection may have changed.
pub struct Outcome {
    pub text: String,
    pub mutated: bool,
}

impl Outcome {
    fn read(text: String) -> Self {
        Self { text, mutated: false }
    }

    fn wrote(text: String) -> Self {
        Self { text, mutated: true }
    }
}

pub fn run(store: &ForumStateStore, command: Command) -> Result<Outcome, AppError> {
    match command {
        Command::Communities => Ok(Outcome::read(render_communities(&store.communities()))),

        Command::Join { community } => {
            require_community(store, &community)?;
            store.toggle_join_community(&community);
            let c = require_community(store, &community)?;
            let verb = if c.is_joined { "Joined" } else { "Left" };
            // membership is not persisted, so nothing to save
            Ok(Outcome::read(format!("{verb} {} (this session only)\n", c.name)))
        }

        Command::Posts {
            community,
            tag,
            content,
            sort,
        } => {
            let c = require_community(store, &community)?;
            let query = PostQuery { tag, content, sort };
            let posts = store.query_posts(&c.id, &query);
            let header = format!("{} ({} posts)\n", c.name, posts.len());
            let lines: String = posts.iter().map(|p| summary_line(p) + "\n").collect();
            Ok(Outcome::read(header + &lines))
        }

        Command::Show { post } => {
            let post = require_post(store, &post)?;
            Ok(Outcome::read(render_post(&post)))
        }

        Command::Post {
            community,
            title,
            body,
            author,
            media,
        } => {
            require_community(store, &community)?;
            let author = author.unwrap_or_else(|| store.options().default_author.clone());
            let id = store.add_post(&community, &title, &body, &author, media.as_deref());
            if id.is_empty() {
                return Err(AppError::ValidationError(
                    "a post needs a title and a body".into(),
                ));
            }
            Ok(Outcome::wrote(format!("Created post {id}\n")))
        }

        Command::Reply {
            post,
            text,
            parent,
            author,
            media,
        } => {
            require_post(store, &post)?;
            let id = store
                .add_reply(&post, parent.as_deref(), &text, author.as_deref(), media.as_deref())
                .ok_or_else(|| {
                    AppError::ValidationError(
                        "reply was empty or its parent is not in this post".into(),
                    )
                })?;
            Ok(Outcome::wrote(format!("Added comment {id}\n")))
        }

        Command::Vote {
            post,
            direction,
            comment,
        } => {
            require_post(store, &post)?;
            let (count, vote) = match comment {
                Some(comment_id) => {
                    store.toggle_comment_vote(&post, &comment_id, direction);
                    let updated = require_post(store, &post)?;
                    let c = updated
                        .comment(&comment_id)
                        .ok_or_else(|| AppError::NotFound("Comment".into(), comment_id.clone()))?;
                    (c.vote_count, c.user_vote)
                }
                None => {
                    store.toggle_post_vote(&post, direction);
                    let updated = require_post(store, &post)?;
                    (updated.vote_count, updated.user_vote)
                }
            };
            let yours = vote.map_or_else(|| "none".to_string(), |v| v.to_string());
            Ok(Outcome::wrote(format!("Votes: {count} (your vote: {yours})\n")))
        }
    }
}

fn require_community(store: &ForumStateStore, id: &str) -> Result<Community, AppError> {
    store
        .get_community_by_id(id)
        .ok_or_else(|| AppError::NotFound("Community".into(), id.to_string()))
}

fn require_post(store: &ForumStateStore, id: &str) -> Result<ForumPost, AppError> {
    store
        .get_post_by_id(id)
        .ok_or_else(|| AppError::NotFound("Post".into(), id.to_string()))
}

fn render_communities(communities: &[Community]) -> String {
    communities
        .iter()
        .map(|c| {
            let joined = if c.is_joined { " [joined]" } else { "" };
            format!("{:<10} {} ({} members){joined}\n", c.id, c.name, c.member_count)
        })
        .collect()
}

fn summary_line(post: &ForumPost) -> String {
    let photo = if post.has_media() { " [photo]" } else { "" };
    format!(
        "{:>4} {}  {} by {} ({} comments, #{}){photo}",
        post.vote_count,
        post.id,
        post.title,
        post.author_name,
        post.comment_count,
        primary_tag(&post.title, &post.body),
    )
}

fn render_post(post: &ForumPost) -> String {
    let mut out = format!(
        "{}\nby {} on {} in {}\n\n{}\n\n",
        post.title,
        post.author_name,
        post.created_at.format("%Y-%m-%d %H:%M"),
        post.community_id,
        post.body,
    );
    if let Some(uri) = &post.media_uri {
        out.push_str(&format!("[image] {uri}\n"));
    }
    out.push_str(&format!("{} votes, {} comments\n", post.vote_count, post.comment_count));

    for node in comment_tree(post) {
        render_node(&mut out, &node);
    }
    let orphans = orphan_comments(post);
    if !orphans.is_empty() {
        out.push_str("-- replies to missing comments --\n");
        for c in orphans {
            out.push_str(&format!("  {} ({}): {}\n", c.author_name, c.id, c.text));
        }
    }
    out
}

fn render_node(out: &mut String, node: &CommentNode<'_>) {
    let indent = "  ".repeat(node.depth + 1);
    let c = node.comment;
    out.push_str(&format!(
        "{indent}[{:+}] {} ({}): {}\n",
        c.vote_count, c.author_name, c.id, c.text
    ));
    for reply in &node.replies {
        render_node(out, reply);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_storage_memory::MemoryKvStore;
    use std::sync::Arc;

    fn store() -> ForumStateStore {
        ForumStateStore::new(Arc::new(MemoryKvStore::new()))
    }

    #[test]
    fn test_communities_listing() {
        let out = run(&store(), Command::Communities).unwrap();
        assert!(!out.mutated);
        assert!(out.text.contains("pregnancy"));
        assert!(out.text.contains("[joined]"));
        assert_eq!(out.text.lines().count(), 3);
    }

    #[test]
    fn test_show_renders_thread() {
        let out = run(&store(), Command::Show { post: "p2".into() }).unwrap();
        let text = out.text;
        assert!(text.contains("4 comments"));
        let c4 = text.find("(c4)").unwrap();
        let c5 = text.find("(c5)").unwrap();
        let c6 = text.find("(c6)").unwrap();
        assert!(c4 < c5 && c5 < c6);
        assert!(text.contains("    [+3] Sara (c5)"));
    }

    #[test]
    fn test_post_then_list() {
        let store = store();
        let created = run(
            &store,
            Command::Post {
                community: "newborn".into(),
                title: "Bedtime routine".into(),
                body: "What works for you?".into(),
                author: None,
                media: None,
            },
        )
        .unwrap();
        assert!(created.mutated);

        let listing = run(
            &store,
            Command::Posts {
                community: "newborn".into(),
                tag: Some(PostTag::Sleep),
                content: ContentFilter::Text,
                sort: PostSort::Newest,
            },
        )
        .unwrap();
        assert!(listing.text.contains("Bedtime routine by You"));
        assert!(!listing.text.contains("p2"));
    }

    #[test]
    fn test_empty_post_is_an_error() {
        let err = run(
            &store(),
            Command::Post {
                community: "newborn".into(),
                title: " ".into(),
                body: "x".into(),
                author: None,
                media: None,
            },
        )
        .err()
        .unwrap();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn test_vote_reports_tally() {
        let store = store();
        let out = run(
            &store,
            Command::Vote {
                post: "p1".into(),
                direction: VoteDirection::Up,
                comment: Some("c3".into()),
            },
        )
        .unwrap();
        assert_eq!(out.text, "Votes: 5 (your vote: up)\n");
    }

    #[test]
    fn test_join_says_membership_is_not_kept() {
        let store = store();
        let out = run(&store, Command::Join { community: "newborn".into() }).unwrap();
        assert!(!out.mutated);
        assert_eq!(out.text, "Joined Newborn & Sleep Support (this session only)\n");

        let out = run(&store, Command::Join { community: "newborn".into() }).unwrap();
        assert!(out.text.starts_with("Left "));
        assert!(out.text.ends_with("(this session only)\n"));
    }

    #[test]
    fn test_show_lists_orphaned_replies() {
        let store = store();
        store.add_reply("p3", Some("ghost"), "Anyone?", Some("Tia"), None);
        let text = run(&store, Command::Show { post: "p3".into() }).unwrap().text;
        let (thread, orphans) = text.split_once("-- replies to missing comments --\n").unwrap();
        assert!(thread.contains("(c8)"));
        assert!(orphans.starts_with("  Tia ("));
        assert!(orphans.trim_end().ends_with(": Anyone?"));
    }

    #[test]
    fn test_unknown_ids_are_reported() {
        let store = store();
        assert!(matches!(
            run(&store, Command::Show { post: "nope".into() }),
            Err(AppError::NotFound(_, _))
        ));
        assert!(matches!(
            run(&store, Command::Join { community: "nope".into() }),
            Err(AppError::NotFound(_, _))
        ));
    }
}
