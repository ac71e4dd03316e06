//! Built-in communities and posts the store starts from before (or instead
//! of) any persisted data.

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{Community, ForumComment, ForumPost};

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}

fn community(
    id: &str,
    name: &str,
    description: &str,
    rules: [&str; 3],
    member_count: u32,
    is_joined: bool,
) -> Community {
    Community {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        rules: rules.iter().map(|r| r.to_string()).collect(),
        member_count,
        is_joined,
    }
}

fn comment(
    id: &str,
    parent_id: Option<&str>,
    author: &str,
    text: &str,
    created_at: DateTime<Utc>,
    vote_count: i64,
) -> ForumComment {
    ForumComment {
        id: id.to_string(),
        parent_id: parent_id.map(str::to_string),
        author_name: author.to_string(),
        text: text.to_string(),
        created_at,
        vote_count,
        user_vote: None,
        media_uri: None,
    }
}

#[allow(clippy::too_many_arguments)]
fn post(
    id: &str,
    community_id: &str,
    title: &str,
    body: &str,
    author: &str,
    created_at: DateTime<Utc>,
    vote_count: i64,
    media_uri: &str,
    comments: Vec<ForumComment>,
) -> ForumPost {
    ForumPost {
        id: id.to_string(),
        community_id: community_id.to_string(),
        title: title.to_string(),
        body: body.to_string(),
        author_name: author.to_string(),
        created_at,
        vote_count,
        comment_count: comments.len(),
        media_uri: Some(media_uri.to_string()),
        user_vote: None,
        comments,
    }
}

pub fn seeded_communities() -> Vec<Community> {
    vec![
        community(
            "pregnancy",
            "Pregnancy & Bump Chat",
            "Share how you're feeling during pregnancy, ask questions, and get support from moms in the same phase.",
            [
                "Be kind and respectful in all conversations.",
                "No medical advice in place of a professional consultation.",
                "Keep personal details private and avoid sharing sensitive data.",
            ],
            1284,
            true,
        ),
        community(
            "newborn",
            "Newborn & Sleep Support",
            "Night feeds, naps, and everything in between for the first 12 months.",
            [
                "No shaming around sleep choices or feeding methods.",
                "Mark sensitive topics with a quick content warning.",
                "Remember every baby is different, so share what worked for you.",
            ],
            932,
            false,
        ),
        community(
            "nutrition",
            "Feeding & First Foods",
            "Talk about breastfeeding, formula, pumping, and starting solids in a judgment-free zone.",
            [
                "Fed is best. No guilt, no pressure.",
                "Avoid promoting restrictive or unsafe diets.",
                "Always defer to your pediatrician for medical concerns.",
            ],
            756,
            false,
        ),
    ]
}

pub fn seeded_posts() -> Vec<ForumPost> {
    vec![
        post(
            "p1",
            "pregnancy",
            "32 weeks and so tired, any gentle energy boosters?",
            "I'm 32 weeks and feeling completely wiped out by lunchtime. What helped you get through the last trimester without overdoing it?",
            "Amelia",
            at(2026, 2, 10, 9, 0),
            24,
            "https://images.unsplash.com/photo-1546549032-9571cd6b27df?q=80&w=800&auto=format&fit=crop",
            vec![
                comment(
                    "c1",
                    None,
                    "Lena",
                    "Short walks and a big water bottle helped me a ton. Also lowered my expectations for how much I could get done in a day.",
                    at(2026, 2, 10, 10, 0),
                    6,
                ),
                comment(
                    "c2",
                    Some("c1"),
                    "Amelia",
                    "Love this reminder. I keep trying to power through like I used to.",
                    at(2026, 2, 10, 10, 20),
                    2,
                ),
                comment(
                    "c3",
                    None,
                    "Maya",
                    "Snacks with protein every couple of hours helped balance my energy. Greek yogurt, nuts, and cheese sticks were my go-to.",
                    at(2026, 2, 10, 11, 0),
                    4,
                ),
            ],
        ),
        post(
            "p2",
            "newborn",
            "Baby only contact naps, is this a phase?",
            "My 3-week-old will only sleep on me during the day. As soon as I put her down, she wakes up. Is this normal and does it get better?",
            "Sara",
            at(2026, 2, 9, 14, 30),
            31,
            "https://images.unsplash.com/photo-1529688530646-6dc7840c0542?q=80&w=800&auto=format&fit=crop",
            vec![
                comment(
                    "c4",
                    None,
                    "Jo",
                    "Totally normal. Their nervous systems are still figuring things out. I used a wrap during the day and it saved me.",
                    at(2026, 2, 9, 15, 0),
                    10,
                ),
                comment(
                    "c5",
                    Some("c4"),
                    "Sara",
                    "Thank you, this makes me feel so much better.",
                    at(2026, 2, 9, 15, 20),
                    3,
                ),
                comment(
                    "c6",
                    None,
                    "Elena",
                    "It was a phase for us around 8 to 10 weeks. We practiced one crib nap a day with lots of cuddles before and after.",
                    at(2026, 2, 9, 16, 10),
                    5,
                ),
                comment(
                    "c7",
                    Some("c6"),
                    "Maya",
                    "Same here. One practice nap a day felt manageable.",
                    at(2026, 2, 9, 16, 40),
                    1,
                ),
            ],
        ),
        post(
            "p3",
            "nutrition",
            "Best first finger foods for baby-led weaning?",
            "We're starting solids next week and planning to try baby-led weaning. What were your baby's favorite first finger foods?",
            "Chloe",
            at(2026, 2, 9, 9, 15),
            18,
            "https://images.unsplash.com/photo-1504753793650-d4a2b783c15e?q=80&w=800&auto=format&fit=crop",
            vec![
                comment(
                    "c8",
                    None,
                    "Rina",
                    "Steamed sweet potato wedges and avocado slices were a hit here. Super soft and easy to grip.",
                    at(2026, 2, 9, 10, 0),
                    7,
                ),
                comment(
                    "c9",
                    None,
                    "Nora",
                    "Banana spears and soft scrambled eggs (cut into strips) worked really well for us.",
                    at(2026, 2, 9, 10, 30),
                    3,
                ),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_counts_match_comments() {
        for post in seeded_posts() {
            assert_eq!(post.comment_count, post.comments.len(), "post {}", post.id);
        }
    }

    #[test]
    fn test_seeded_posts_reference_seeded_communities() {
        let communities = seeded_communities();
        for post in seeded_posts() {
            assert!(communities.iter().any(|c| c.id == post.community_id));
        }
    }

    #[test]
    fn test_seed_timestamps_are_real() {
        let p1 = &seeded_posts()[0];
        assert_eq!(p1.created_at.to_rfc3339(), "2026-02-10T09:00:00+00:00");
    }
}
