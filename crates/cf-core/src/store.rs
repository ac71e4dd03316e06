//! # ForumStateStore
//!
//! Owns the communities, posts and comment trees of the community forum and
//! applies every mutation to them. Mutations are synchronous: each one takes
//! the state lock, swaps in a new posts collection (copy-on-write through
//! `Arc::make_mut`) and returns, so readers only ever see whole transitions.
//!
//! ## Persistence
//!
//! The posts collection (never the communities) is mirrored into a
//! [`KvStore`] under a single key:
//! - [`ForumStateStore::hydrate`] reads it once. A missing, unreadable or
//!   non-list blob leaves the seeded defaults in place.
//! - Hydration writes the resulting collection back once. After that,
//!   every posts mutation publishes its snapshot on a
//!   `watch` channel drained by one background writer. Bursts coalesce and
//!   the newest snapshot is always the last one written.
//! - Write failures are logged and dropped. In-memory state stays
//!   authoritative for the life of the process.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Community, ForumComment, ForumPost, VoteDirection};
use crate::query::PostQuery;
use crate::seed::{seeded_communities, seeded_posts};
use crate::traits::KvStore;
use crate::vote::Votable;

/// Storage key the posts blob lives under.
pub const POSTS_STORAGE_KEY: &str = "community_forum_posts_v2";

/// Author recorded on replies that do not name one.
pub const DEFAULT_REPLY_AUTHOR: &str = "You";

/// How `add_reply` treats a `parent_id` that names no comment in the post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyParentPolicy {
    /// Accept the reply as-is; it renders as an orphan.
    #[default]
    Permissive,
    /// Drop the reply.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    pub posts_key: String,
    pub default_author: String,
    pub reply_parents: ReplyParentPolicy,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            posts_key: POSTS_STORAGE_KEY.to_string(),
            default_author: DEFAULT_REPLY_AUTHOR.to_string(),
            reply_parents: ReplyParentPolicy::default(),
        }
    }
}

type PostsSnapshot = Arc<Vec<ForumPost>>;

struct ForumState {
    communities: Vec<Community>,
    posts: PostsSnapshot,
}

impl ForumState {
    fn post_index(&self, post_id: &str) -> Option<usize> {
        self.posts.iter().position(|p| p.id == post_id)
    }
}

pub struct ForumStateStore {
    kv: Arc<dyn KvStore>,
    options: StoreOptions,
    state: RwLock<ForumState>,
    hydration_started: AtomicBool,
    /// Set once hydration finishes; its presence gates all writes.
    writer: OnceLock<watch::Sender<PostsSnapshot>>,
}

impl ForumStateStore {
    /// Creates a store holding the seeded defaults. Nothing is read or
    /// written until [`hydrate`](Self::hydrate) runs.
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self::with_options(kv, StoreOptions::default())
    }

    pub fn with_options(kv: Arc<dyn KvStore>, options: StoreOptions) -> Self {
        Self {
            kv,
            options,
            state: RwLock::new(ForumState {
                communities: seeded_communities(),
                posts: Arc::new(seeded_posts()),
            }),
            hydration_started: AtomicBool::new(false),
            writer: OnceLock::new(),
        }
    }

    /// Constructs and hydrates in one step.
    pub async fn open(kv: Arc<dyn KvStore>, options: StoreOptions) -> Self {
        let store = Self::with_options(kv, options);
        store.hydrate().await;
        store
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    pub fn is_hydrated(&self) -> bool {
        self.writer.get().is_some()
    }

    /// Loads persisted posts once and starts the background writer.
    ///
    /// Must run inside a Tokio runtime. Later calls return immediately.
    pub async fn hydrate(&self) {
        if self.hydration_started.swap(true, Ordering::AcqRel) {
            debug!("forum store already hydrated");
            return;
        }

        let restored = match self.load_persisted().await {
            Ok(Some(posts)) => {
                info!(count = posts.len(), key = %self.options.posts_key, "restored persisted forum posts");
                Some(posts)
            }
            Ok(None) => {
                info!(key = %self.options.posts_key, "no persisted forum posts, keeping seeded defaults");
                None
            }
            Err(e) => {
                warn!(error = %e, "failed to load community forum posts from storage");
                None
            }
        };

        let mut state = self.write_state();
        if let Some(posts) = restored {
            state.posts = Arc::new(posts);
        }
        let (tx, mut rx) = watch::channel(Arc::clone(&state.posts));
        // the hydrated collection is written once even if nothing changes
        rx.mark_changed();
        tokio::spawn(write_loop(
            Arc::clone(&self.kv),
            self.options.posts_key.clone(),
            rx,
        ));
        // hydration_started guarantees a single caller reaches this point
        let _ = self.writer.set(tx);
    }

    async fn load_persisted(&self) -> Result<Option<Vec<ForumPost>>> {
        match self.kv.get(&self.options.posts_key).await? {
            Some(blob) => decode_posts(&blob),
            None => Ok(None),
        }
    }

    /// Writes the current posts snapshot now and reports the outcome.
    pub async fn save(&self) -> Result<()> {
        let snapshot = self.posts();
        write_posts(self.kv.as_ref(), &self.options.posts_key, &snapshot).await
    }

    /// The posts collection as the JSON blob [`hydrate`](Self::hydrate) reads.
    pub fn export_posts(&self) -> Result<String> {
        Ok(serde_json::to_string(self.posts().as_slice())?)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn communities(&self) -> Vec<Community> {
        self.read_state().communities.clone()
    }

    pub fn joined_communities(&self) -> Vec<Community> {
        self.read_state()
            .communities
            .iter()
            .filter(|c| c.is_joined)
            .cloned()
            .collect()
    }

    /// Cheap snapshot of every post, newest-created first.
    pub fn posts(&self) -> Arc<Vec<ForumPost>> {
        Arc::clone(&self.read_state().posts)
    }

    pub fn get_community_by_id(&self, id: &str) -> Option<Community> {
        self.read_state()
            .communities
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    /// Posts of one community in collection order.
    pub fn get_posts_for_community(&self, community_id: &str) -> Vec<ForumPost> {
        self.posts()
            .iter()
            .filter(|p| p.community_id == community_id)
            .cloned()
            .collect()
    }

    pub fn get_post_by_id(&self, id: &str) -> Option<ForumPost> {
        self.posts().iter().find(|p| p.id == id).cloned()
    }

    /// A community feed filtered and sorted by `query`.
    pub fn query_posts(&self, community_id: &str, query: &PostQuery) -> Vec<ForumPost> {
        let posts = self.posts();
        query.apply(posts.iter().filter(|p| p.community_id == community_id))
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Flips membership for the implicit viewer. `member_count` is untouched.
    pub fn toggle_join_community(&self, community_id: &str) {
        let mut state = self.write_state();
        match state.communities.iter_mut().find(|c| c.id == community_id) {
            Some(community) => {
                community.is_joined = !community.is_joined;
                debug!(community_id, joined = community.is_joined, "community membership toggled");
            }
            None => debug!(community_id, "join toggle on unknown community ignored"),
        }
    }

    pub fn toggle_post_vote(&self, post_id: &str, direction: VoteDirection) {
        let mut state = self.write_state();
        let Some(idx) = state.post_index(post_id) else {
            debug!(post_id, "vote on unknown post ignored");
            return;
        };

        let post = &mut Arc::make_mut(&mut state.posts)[idx];
        post.toggle_vote(direction);
        debug!(post_id, %direction, vote_count = post.vote_count, "post vote toggled");
        self.publish(&state);
    }

    pub fn toggle_comment_vote(&self, post_id: &str, comment_id: &str, direction: VoteDirection) {
        let mut state = self.write_state();
        let found = state.post_index(post_id).and_then(|p| {
            state.posts[p]
                .comments
                .iter()
                .position(|c| c.id == comment_id)
                .map(|c| (p, c))
        });
        let Some((p, c)) = found else {
            debug!(post_id, comment_id, "vote on unknown comment ignored");
            return;
        };

        let comment = &mut Arc::make_mut(&mut state.posts)[p].comments[c];
        comment.toggle_vote(direction);
        debug!(post_id, comment_id, %direction, vote_count = comment.vote_count, "comment vote toggled");
        self.publish(&state);
    }

    /// Creates a post at the front of the collection and returns its id.
    ///
    /// Returns an empty string, and changes nothing, when the trimmed title
    /// or body is empty.
    pub fn add_post(
        &self,
        community_id: &str,
        title: &str,
        body: &str,
        author_name: &str,
        media_uri: Option<&str>,
    ) -> String {
        let (title, body) = (title.trim(), body.trim());
        if title.is_empty() || body.is_empty() {
            debug!(community_id, "post with empty title or body rejected");
            return String::new();
        }

        let post = ForumPost {
            id: generate_id("local-post"),
            community_id: community_id.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            author_name: author_name.to_string(),
            created_at: Utc::now(),
            vote_count: 0,
            comment_count: 0,
            media_uri: media_uri.map(str::to_string),
            user_vote: None,
            comments: Vec::new(),
        };
        let id = post.id.clone();

        let mut state = self.write_state();
        Arc::make_mut(&mut state.posts).insert(0, post);
        info!(post_id = %id, community_id, "post created");
        self.publish(&state);
        id
    }

    /// Appends a comment to a post; `parent_id == None` makes it top-level.
    ///
    /// Returns the new comment id, or `None` when the trimmed text is empty,
    /// the post is unknown, or a strict parent check fails.
    pub fn add_reply(
        &self,
        post_id: &str,
        parent_id: Option<&str>,
        text: &str,
        author_name: Option<&str>,
        media_uri: Option<&str>,
    ) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            debug!(post_id, "empty reply rejected");
            return None;
        }

        let mut state = self.write_state();
        let Some(idx) = state.post_index(post_id) else {
            debug!(post_id, "reply to unknown post ignored");
            return None;
        };

        if let (ReplyParentPolicy::Strict, Some(parent)) = (self.options.reply_parents, parent_id) {
            if state.posts[idx].comment(parent).is_none() {
                warn!(post_id, parent_id = parent, "reply to a comment outside this post rejected");
                return None;
            }
        }

        let comment = ForumComment {
            id: generate_id("local"),
            parent_id: parent_id.map(str::to_string),
            author_name: author_name
                .unwrap_or(&self.options.default_author)
                .to_string(),
            text: text.to_string(),
            created_at: Utc::now(),
            vote_count: 0,
            user_vote: None,
            media_uri: media_uri.map(str::to_string),
        };
        let id = comment.id.clone();

        let post = &mut Arc::make_mut(&mut state.posts)[idx];
        post.comments.push(comment);
        post.comment_count += 1;
        debug!(post_id, comment_id = %id, comment_count = post.comment_count, "reply added");
        self.publish(&state);
        Some(id)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Hands the committed posts to the writer. Called with the state lock
    /// held so snapshots are published in commit order.
    fn publish(&self, state: &ForumState) {
        if let Some(tx) = self.writer.get() {
            tx.send_replace(Arc::clone(&state.posts));
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, ForumState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, ForumState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Decodes a persisted posts blob.
///
/// An empty blob or JSON that is not a list means "nothing persisted";
/// a list whose entries are not posts is an error.
pub fn decode_posts(blob: &[u8]) -> Result<Option<Vec<ForumPost>>> {
    if blob.is_empty() {
        return Ok(None);
    }
    let value: serde_json::Value = serde_json::from_slice(blob)?;
    if !value.is_array() {
        warn!("persisted forum posts are not a list, ignoring");
        return Ok(None);
    }
    Ok(Some(serde_json::from_value(value)?))
}

async fn write_posts(kv: &dyn KvStore, key: &str, posts: &[ForumPost]) -> Result<()> {
    let blob = serde_json::to_vec(posts)?;
    kv.set(key, &blob).await
}

async fn write_loop(kv: Arc<dyn KvStore>, key: String, mut rx: watch::Receiver<PostsSnapshot>) {
    while rx.changed().await.is_ok() {
        let snapshot = Arc::clone(&rx.borrow_and_update());
        match write_posts(kv.as_ref(), &key, &snapshot).await {
            Ok(()) => debug!(count = snapshot.len(), "forum posts persisted"),
            Err(e) => warn!(error = %e, "failed to save community forum posts to storage"),
        }
    }
    debug!("forum posts writer stopped");
}

/// `<prefix>-<unix millis>-<5 random chars>`
fn generate_id(prefix: &str) -> String {
    let mut suffix = Uuid::new_v4().simple().to_string();
    suffix.truncate(5);
    format!("{prefix}-{}-{suffix}", Utc::now().timestamp_millis())
}
