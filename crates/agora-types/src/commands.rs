//! The closed set of operations each domain accepts, and what it answers with.
//!
//! Every domain is driven exclusively through its command enum; replies come
//! back as the matching outcome variant or an [`EngineError`](crate::EngineError).

use crate::models::{
    Comment, CommentId, Community, DirectMessage, MessageId, Post, PostId, PostThread, User,
    UserId, VoteKind,
};

// -- Identity --

#[derive(Debug, Clone)]
pub enum IdentityCommand {
    Register { username: String },
    /// Unknown users are ignored.
    AdjustKarma { user_id: UserId, vote: VoteKind },
    GetUser { user_id: UserId },
    FindByUsername { username: String },
}

#[derive(Debug, Clone)]
pub enum IdentityOutcome {
    Registered(UserId),
    KarmaAdjusted,
    User(User),
}

// -- Community --

#[derive(Debug, Clone)]
pub enum CommunityCommand {
    Create { name: String, creator_id: UserId },
    Join { name: String, user_id: UserId },
    Leave { name: String, user_id: UserId },
    Get { name: String },
    Exists { name: String },
    MembershipsOf { user_id: UserId },
}

#[derive(Debug, Clone)]
pub enum CommunityOutcome {
    Created(String),
    Joined,
    Left,
    Community(Community),
    Exists(bool),
    Memberships(Vec<String>),
}

// -- Content --

#[derive(Debug, Clone)]
pub enum ContentCommand {
    CreatePost {
        community: String,
        author_id: UserId,
        title: String,
        content: String,
    },
    /// `parent_id` names either a post or a comment.
    CreateComment {
        parent_id: String,
        author_id: UserId,
        content: String,
    },
    /// `item_id` names either a post or a comment.
    Vote {
        item_id: String,
        user_id: UserId,
        vote: VoteKind,
    },
    GetPost { post_id: PostId },
    GetComment { comment_id: CommentId },
    Thread { post_id: PostId },
    PostsIn { communities: Vec<String> },
}

#[derive(Debug, Clone)]
pub enum ContentOutcome {
    PostCreated(PostId),
    CommentCreated(CommentId),
    Voted,
    Post(Post),
    Comment(Comment),
    Thread(PostThread),
    Posts(Vec<Post>),
}

// -- Messaging --

#[derive(Debug, Clone)]
pub enum MessagingCommand {
    SendDirect {
        from: UserId,
        to: UserId,
        content: String,
    },
    ListInbox { user_id: UserId },
}

#[derive(Debug, Clone)]
pub enum MessagingOutcome {
    Sent(MessageId),
    /// Newest first.
    Inbox(Vec<DirectMessage>),
}
