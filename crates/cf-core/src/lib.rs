//! community-forum/crates/cf-core/src/lib.rs
//!
//! The central domain logic and interface definitions for the community
//! forum: models, vote arithmetic, comment threads, feed queries, and the
//! `ForumStateStore` that ties them to a key-value storage port.

pub mod error;
pub mod models;
pub mod query;
pub mod seed;
pub mod store;
pub mod tags;
pub mod thread;
pub mod traits;
pub mod vote;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use query::{ContentFilter, PostQuery, PostSort};
pub use store::{
    decode_posts, ForumStateStore, ReplyParentPolicy, StoreOptions, DEFAULT_REPLY_AUTHOR,
    POSTS_STORAGE_KEY,
};
pub use tags::{infer_tags, primary_tag, PostTag, POST_TAGS};
pub use thread::{comment_tree, orphan_comments, replies_to, top_level_comments, CommentNode};
pub use traits::*;
