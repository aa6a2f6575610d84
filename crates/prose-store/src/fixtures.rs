//! Fixture content loaded into a fresh store.
//!
//! Gives the feed, profile, and post pages something to show before any
//! real content exists. Timestamps are relative to the seeding time.

use chrono::{Duration, Utc};

use prose_shared::{Identity, PostId};

use crate::models::{Comment, NewPost};
use crate::store::ContentStore;

struct FixtureUser {
    username: &'static str,
    email: &'static str,
    bio: &'static str,
    joined_days_ago: i64,
    likes_count: u64,
}

struct FixturePost {
    author: usize,
    content: &'static str,
    hours_ago: i64,
    likes: u64,
}

struct FixtureComment {
    post: usize,
    author: usize,
    content: &'static str,
    minutes_after_post: i64,
}

const USERS: &[FixtureUser] = &[
    FixtureUser {
        username: "elena",
        email: "elena@prose.app",
        bio: "Writer, walker, collector of small moments.",
        joined_days_ago: 412,
        likes_count: 1_284,
    },
    FixtureUser {
        username: "marcus",
        email: "marcus@prose.app",
        bio: "Software by day, short fiction by night.",
        joined_days_ago: 203,
        likes_count: 567,
    },
    FixtureUser {
        username: "sofia",
        email: "sofia@prose.app",
        bio: "Poetry is just compressed attention.",
        joined_days_ago: 98,
        likes_count: 2_045,
    },
];

const POSTS: &[FixturePost] = &[
    FixturePost {
        author: 0,
        content: "The best ideas arrive when you stop chasing them. Today I left my notebook at home and wrote three paragraphs in my head on the walk to the station.",
        hours_ago: 2,
        likes: 42,
    },
    FixturePost {
        author: 1,
        content: "Shipped a feature, deleted twice as many lines as I added. Good day.",
        hours_ago: 5,
        likes: 18,
    },
    FixturePost {
        author: 2,
        content: "morning light / on the kettle's curve / the day decides to begin",
        hours_ago: 9,
        likes: 96,
    },
    FixturePost {
        author: 0,
        content: "Reading old letters is a strange kind of time travel. The handwriting changes before the voice does.",
        hours_ago: 30,
        likes: 57,
    },
    FixturePost {
        author: 1,
        content: "Constraint is a gift. Five hundred characters forces you to decide what you actually mean.",
        hours_ago: 52,
        likes: 3,
    },
];

const COMMENTS: &[FixtureComment] = &[
    FixtureComment {
        post: 0,
        author: 2,
        content: "This happens to me every single time.",
        minutes_after_post: 12,
    },
    FixtureComment {
        post: 0,
        author: 1,
        content: "Walking is underrated as a writing tool.",
        minutes_after_post: 40,
    },
    FixtureComment {
        post: 2,
        author: 0,
        content: "Beautiful. The kettle detail makes it.",
        minutes_after_post: 25,
    },
    FixtureComment {
        post: 4,
        author: 2,
        content: "Agreed. The limit is the point.",
        minutes_after_post: 90,
    },
];

/// Populate `store` with the fixture users, posts, and comments.
pub fn seed(store: &mut ContentStore) {
    let now = Utc::now();

    let users: Vec<Identity> = USERS
        .iter()
        .map(|u| {
            let posts_count = POSTS
                .iter()
                .filter(|p| USERS[p.author].username == u.username)
                .count() as u64;
            let comments_count = COMMENTS
                .iter()
                .filter(|c| USERS[c.author].username == u.username)
                .count() as u64;
            Identity {
                bio: u.bio.to_string(),
                joined_at: now - Duration::days(u.joined_days_ago),
                posts_count,
                likes_count: u.likes_count,
                comments_count,
                ..Identity::new(u.username, u.email)
            }
        })
        .collect();

    for user in &users {
        store.upsert_user(user.clone());
    }

    let mut post_ids: Vec<PostId> = Vec::with_capacity(POSTS.len());
    for p in POSTS {
        let new_post = NewPost {
            id: PostId::new(),
            content: p.content.to_string(),
            author_id: users[p.author].id,
            created_at: now - Duration::hours(p.hours_ago),
            likes_count: p.likes,
        };
        match store.insert_post(new_post) {
            Ok(post) => post_ids.push(post.id),
            Err(e) => {
                tracing::warn!(error = %e, "skipping fixture post");
                return;
            }
        }
    }

    for c in COMMENTS {
        let post_created = now - Duration::hours(POSTS[c.post].hours_ago);
        let comment = Comment {
            created_at: post_created + Duration::minutes(c.minutes_after_post),
            ..Comment::new(post_ids[c.post], users[c.author].clone(), c.content)
        };
        if let Err(e) = store.insert_comment(comment) {
            tracing::warn!(error = %e, "skipping fixture comment");
        }
    }
}
