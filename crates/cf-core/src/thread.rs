//! Comment tree views over a single post.
//!
//! Comments are stored flat, in insertion order, with `parent_id` edges.
//! These helpers rebuild the nested shape the post screen renders.

use std::collections::{HashMap, HashSet};

use crate::models::{ForumComment, ForumPost};

/// One comment with its nested replies, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentNode<'a> {
    pub comment: &'a ForumComment,
    /// 0 for top-level comments
    pub depth: usize,
    pub replies: Vec<CommentNode<'a>>,
}

impl CommentNode<'_> {
    /// Size of this subtree, counting the node itself.
    pub fn subtree_len(&self) -> usize {
        1 + self.replies.iter().map(CommentNode::subtree_len).sum::<usize>()
    }
}

pub fn top_level_comments(post: &ForumPost) -> Vec<&ForumComment> {
    post.comments.iter().filter(|c| c.is_top_level()).collect()
}

pub fn replies_to<'a>(post: &'a ForumPost, comment_id: &str) -> Vec<&'a ForumComment> {
    post.comments
        .iter()
        .filter(|c| c.parent_id.as_deref() == Some(comment_id))
        .collect()
}

/// Builds the reply forest rooted at the top-level comments.
///
/// Comments whose parent chain never reaches a top-level comment are left
/// out; see [`orphan_comments`].
pub fn comment_tree(post: &ForumPost) -> Vec<CommentNode<'_>> {
    let mut children: HashMap<&str, Vec<&ForumComment>> = HashMap::new();
    for comment in &post.comments {
        if let Some(parent) = comment.parent_id.as_deref() {
            children.entry(parent).or_default().push(comment);
        }
    }

    top_level_comments(post)
        .into_iter()
        .map(|root| build_node(root, 0, &children))
        .collect()
}

fn build_node<'a>(
    comment: &'a ForumComment,
    depth: usize,
    children: &HashMap<&str, Vec<&'a ForumComment>>,
) -> CommentNode<'a> {
    let replies = children
        .get(comment.id.as_str())
        .map(|kids| {
            kids.iter()
                .map(|kid| build_node(*kid, depth + 1, children))
                .collect()
        })
        .unwrap_or_default();

    CommentNode {
        comment,
        depth,
        replies,
    }
}

/// Comments not reachable from any top-level comment, in insertion order.
pub fn orphan_comments(post: &ForumPost) -> Vec<&ForumComment> {
    fn collect<'a>(node: &CommentNode<'a>, seen: &mut HashSet<&'a str>) {
        seen.insert(node.comment.id.as_str());
        for reply in &node.replies {
            collect(reply, seen);
        }
    }

    let mut seen = HashSet::new();
    for node in comment_tree(post) {
        collect(&node, &mut seen);
    }
    post.comments
        .iter()
        .filter(|c| !seen.contains(c.id.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::seeded_posts;

    fn p2() -> ForumPost {
        seeded_posts().remove(1)
    }

    #[test]
    fn test_top_level_and_direct_replies() {
        let post = p2();
        let top: Vec<_> = top_level_comments(&post).iter().map(|c| c.id.as_str()).collect();
        assert_eq!(top, vec!["c4", "c6"]);

        let replies: Vec<_> = replies_to(&post, "c6").iter().map(|c| c.id.as_str()).collect();
        assert_eq!(replies, vec!["c7"]);
        assert!(replies_to(&post, "c7").is_empty());
    }

    #[test]
    fn test_tree_depths() {
        let post = p2();
        let tree = comment_tree(&post);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].comment.id, "c4");
        assert_eq!(tree[0].replies[0].comment.id, "c5");
        assert_eq!(tree[0].replies[0].depth, 1);
        assert_eq!(tree.iter().map(CommentNode::subtree_len).sum::<usize>(), post.comments.len());
    }

    #[test]
    fn test_dangling_parent_is_orphaned() {
        let mut post = p2();
        let mut stray = post.comments[1].clone();
        stray.id = "stray".into();
        stray.parent_id = Some("missing".into());
        post.comments.push(stray);

        let tree = comment_tree(&post);
        assert_eq!(tree.iter().map(CommentNode::subtree_len).sum::<usize>(), 4);

        let orphans: Vec<_> = orphan_comments(&post).iter().map(|c| c.id.as_str()).collect();
        assert_eq!(orphans, vec!["stray"]);
    }

    #[test]
    fn test_self_parent_does_not_loop() {
        let mut post = p2();
        post.comments[0].parent_id = Some("c4".into());

        let tree = comment_tree(&post);
        assert_eq!(tree.len(), 1);
        let orphans: Vec<_> = orphan_comments(&post).iter().map(|c| c.id.as_str()).collect();
        assert_eq!(orphans, vec!["c4", "c5"]);
    }
}
