//! Vote toggling shared by posts and comments.

use crate::models::{ForumComment, ForumPost, VoteDirection};

/// Computes the tally and viewer vote after pressing `direction`.
///
/// Pressing the active direction withdraws it, pressing the opposite one
/// swings the tally by two, and pressing with no vote applies one step.
pub fn tally(
    count: i64,
    current: Option<VoteDirection>,
    direction: VoteDirection,
) -> (i64, Option<VoteDirection>) {
    match current {
        Some(prev) if prev == direction => (count - direction.weight(), None),
        Some(prev) => (count - prev.weight() + direction.weight(), Some(direction)),
        None => (count + direction.weight(), Some(direction)),
    }
}

/// Anything carrying a tally and a single viewer vote.
pub trait Votable {
    fn vote_state(&self) -> (i64, Option<VoteDirection>);
    fn set_vote_state(&mut self, count: i64, vote: Option<VoteDirection>);

    fn toggle_vote(&mut self, direction: VoteDirection) {
        let (count, current) = self.vote_state();
        let (count, vote) = tally(count, current, direction);
        self.set_vote_state(count, vote);
    }
}

impl Votable for ForumPost {
    fn vote_state(&self) -> (i64, Option<VoteDirection>) {
        (self.vote_count, self.user_vote)
    }

    fn set_vote_state(&mut self, count: i64, vote: Option<VoteDirection>) {
        self.vote_count = count;
        self.user_vote = vote;
    }
}

impl Votable for ForumComment {
    fn vote_state(&self) -> (i64, Option<VoteDirection>) {
        (self.vote_count, self.user_vote)
    }

    fn set_vote_state(&mut self, count: i64, vote: Option<VoteDirection>) {
        self.vote_count = count;
        self.user_vote = vote;
    }
}
