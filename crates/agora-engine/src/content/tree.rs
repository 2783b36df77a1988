//! Arena-backed comment trees.
//!
//! Every comment of every post lives in one map keyed by id. Each record knows
//! its parent and keeps its direct replies as an ordered id list, so locating
//! any comment is a single lookup no matter how deep it sits.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use agora_types::models::{Comment, CommentId, ParentId, PostId, ThreadEntry, UserId, Votes};

#[derive(Debug, Default)]
pub struct CommentTree {
    nodes: HashMap<CommentId, Comment>,
    next_id: u64,
}

impl CommentTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Comment> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Comment> {
        self.nodes.get_mut(id)
    }

    /// Store a top-level comment of `post_id`. Attaching the returned id to
    /// the post's own comment list is the caller's job, since posts live
    /// outside the arena.
    pub fn insert_top_level(
        &mut self,
        post_id: PostId,
        author_id: UserId,
        content: String,
        created_at: DateTime<Utc>,
    ) -> CommentId {
        let parent = ParentId::Post(post_id.clone());
        self.allocate(post_id, parent, author_id, content, created_at)
    }

    /// Store a reply under comment `parent_id` and append it to the parent's
    /// replies. Returns `None`, leaving the tree untouched, if the parent is
    /// unknown.
    pub fn insert_reply(
        &mut self,
        parent_id: &str,
        author_id: UserId,
        content: String,
        created_at: DateTime<Utc>,
    ) -> Option<CommentId> {
        let (post_id, parent) = {
            let parent = self.nodes.get(parent_id)?;
            (parent.post_id.clone(), ParentId::Comment(parent.id.clone()))
        };

        let id = self.allocate(post_id, parent, author_id, content, created_at);
        if let Some(parent) = self.nodes.get_mut(parent_id) {
            parent.replies.push(id.clone());
        }
        Some(id)
    }

    fn allocate(
        &mut self,
        post_id: PostId,
        parent: ParentId,
        author_id: UserId,
        content: String,
        created_at: DateTime<Utc>,
    ) -> CommentId {
        self.next_id += 1;
        let id = CommentId::nth(self.next_id);
        self.nodes.insert(
            id.clone(),
            Comment {
                id: id.clone(),
                post_id,
                author_id,
                parent,
                content,
                votes: Votes::default(),
                replies: Vec::new(),
                created_at,
            },
        );
        id
    }

    /// Flatten the subtrees rooted at `roots` depth-first, each comment
    /// followed by its replies in insertion order. Iterative, so depth is
    /// bounded only by memory.
    pub fn thread(&self, roots: &[CommentId]) -> Vec<ThreadEntry> {
        let mut entries = Vec::new();
        let mut stack: Vec<(usize, &CommentId)> = roots.iter().rev().map(|id| (0, id)).collect();

        while let Some((depth, id)) = stack.pop() {
            let Some(comment) = self.nodes.get(id) else {
                continue;
            };
            stack.extend(comment.replies.iter().rev().map(|reply| (depth + 1, reply)));
            entries.push(ThreadEntry {
                depth,
                comment: comment.clone(),
            });
        }
        entries
    }
}
