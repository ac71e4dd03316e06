//! Helpers shared by the integration tests.

use std::time::Duration;

use cf_core::models::ForumPost;
use cf_core::{decode_posts, KvStore, POSTS_STORAGE_KEY};

/// Polls `kv` until the persisted posts satisfy `done`, then returns them.
///
/// Panics after roughly two seconds; the background writer is asynchronous
/// so tests cannot read storage right after a mutation.
pub async fn wait_for_posts<F>(kv: &dyn KvStore, done: F) -> Vec<ForumPost>
where
    F: Fn(&[ForumPost]) -> bool,
{
    for _ in 0..200 {
        if let Some(blob) = kv.get(POSTS_STORAGE_KEY).await.unwrap() {
            if let Some(posts) = decode_posts(&blob).unwrap() {
                if done(&posts) {
                    return posts;
                }
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("persisted posts never reached the expected state");
}

pub fn find<'a>(posts: &'a [ForumPost], id: &str) -> &'a ForumPost {
    posts
        .iter()
        .find(|p| p.id == id)
        .unwrap_or_else(|| panic!("post {id} missing"))
}
