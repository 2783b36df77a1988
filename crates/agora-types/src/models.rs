use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            /// Builds the id for the `n`th entity of this kind (`user_1`, `post_7`, ...).
            pub fn nth(n: u64) -> Self {
                Self(format!("{}_{}", Self::PREFIX, n))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identity-domain user id, `user_N`.
    UserId,
    "user"
);
string_id!(PostId, "post");
string_id!(
    /// Comment ids are unique across every post in the content domain.
    CommentId,
    "comment"
);
string_id!(MessageId, "dm");

// -- Identity --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// May go negative.
    pub karma: i64,
    pub created_at: DateTime<Utc>,
}

// -- Community --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Community {
    /// Unique; doubles as the community id.
    pub name: String,
    pub members: BTreeSet<UserId>,
    pub moderators: BTreeSet<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Community {
    pub fn new(name: String, creator: UserId, created_at: DateTime<Utc>) -> Self {
        Self {
            name,
            members: BTreeSet::new(),
            moderators: BTreeSet::from([creator]),
            created_at,
        }
    }

    pub fn is_moderator(&self, user_id: &UserId) -> bool {
        self.moderators.contains(user_id)
    }
}

// -- Votes --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    Up,
    Down,
}

impl VoteKind {
    /// Karma applied to the author of the voted item.
    pub fn karma_delta(self) -> i64 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

impl From<bool> for VoteKind {
    fn from(is_upvote: bool) -> Self {
        if is_upvote { Self::Up } else { Self::Down }
    }
}

/// Voter sets of a post or comment. A user sits in at most one of the two.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Votes {
    pub upvoters: BTreeSet<UserId>,
    pub downvoters: BTreeSet<UserId>,
}

impl Votes {
    pub fn cast(&mut self, user_id: UserId, kind: VoteKind) {
        match kind {
            VoteKind::Up => {
                self.downvoters.remove(&user_id);
                self.upvoters.insert(user_id);
            }
            VoteKind::Down => {
                self.upvoters.remove(&user_id);
                self.downvoters.insert(user_id);
            }
        }
    }

    pub fn score(&self) -> i64 {
        self.upvoters.len() as i64 - self.downvoters.len() as i64
    }
}

// -- Content --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author_id: UserId,
    pub community: String,
    pub title: String,
    pub content: String,
    pub votes: Votes,
    /// Top-level comments, in insertion order.
    pub comments: Vec<CommentId>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn score(&self) -> i64 {
        self.votes.score()
    }
}

/// What a comment hangs off: a post directly, or another comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ParentId {
    Post(PostId),
    Comment(CommentId),
}

impl fmt::Display for ParentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Post(id) => id.fmt(f),
            Self::Comment(id) => id.fmt(f),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    /// Root of the tree this comment belongs to.
    pub post_id: PostId,
    pub author_id: UserId,
    pub parent: ParentId,
    pub content: String,
    pub votes: Votes,
    /// Direct replies, in insertion order.
    pub replies: Vec<CommentId>,
    pub created_at: DateTime<Utc>,
}

/// One line of a thread listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadEntry {
    /// 0 for a top-level comment.
    pub depth: usize,
    pub comment: Comment,
}

/// A post and every comment under it, flattened depth-first: each comment
/// is followed by its replies, in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostThread {
    pub post: Post,
    pub comments: Vec<ThreadEntry>,
}

// -- Messaging --

/// Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectMessage {
    pub id: MessageId,
    pub from: UserId,
    pub to: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

// -- Simulation --

/// Counters kept by the load simulator from the successes it observes.
/// Every field only ever grows during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStats {
    pub registered_users: u64,
    pub active_communities: u64,
    pub total_posts: u64,
    pub total_comments: u64,
    pub total_messages: u64,
    pub votes_cast: u64,
    pub failed_actions: u64,
}
