mod tree;

pub use tree::CommentTree;

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info};

use agora_types::EngineError;
use agora_types::commands::{
    CommunityCommand, CommunityOutcome, ContentCommand, ContentOutcome, IdentityCommand,
};
use agora_types::models::{CommentId, Post, PostId, PostThread, UserId, VoteKind, Votes};

use crate::community::CommunityStore;
use crate::identity::IdentityStore;
use crate::mailbox::{Domain, Mailbox};

/// Owns posts and every post's comment tree.
///
/// Author ids are trusted as supplied. Community existence is checked with an
/// awaited request to the community domain before a post is created; karma
/// for votes is pushed to the identity domain as a one-way send.
pub struct ContentStore {
    posts: HashMap<PostId, Post>,
    /// Post ids in creation order.
    order: Vec<PostId>,
    comments: CommentTree,
    next_post: u64,
    identity: Mailbox<IdentityStore>,
    communities: Mailbox<CommunityStore>,
    lookup_timeout: Duration,
}

impl ContentStore {
    pub fn new(
        identity: Mailbox<IdentityStore>,
        communities: Mailbox<CommunityStore>,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            posts: HashMap::new(),
            order: Vec::new(),
            comments: CommentTree::new(),
            next_post: 0,
            identity,
            communities,
            lookup_timeout,
        }
    }

    async fn ensure_community(&self, name: &str) -> Result<(), EngineError> {
        let command = CommunityCommand::Exists {
            name: name.to_string(),
        };
        match self.communities.request(command, self.lookup_timeout).await? {
            CommunityOutcome::Exists(true) => Ok(()),
            CommunityOutcome::Exists(false) => Err(EngineError::not_found("community", name)),
            _ => Err(EngineError::Unhandled {
                domain: CommunityStore::NAME,
            }),
        }
    }

    fn insert_post(
        &mut self,
        community: String,
        author_id: UserId,
        title: String,
        content: String,
    ) -> PostId {
        self.next_post += 1;
        let id = PostId::nth(self.next_post);
        info!("{} posted {} in {}", author_id, id, community);

        self.posts.insert(
            id.clone(),
            Post {
                id: id.clone(),
                author_id,
                community,
                title,
                content,
                votes: Votes::default(),
                comments: Vec::new(),
                created_at: Utc::now(),
            },
        );
        self.order.push(id.clone());
        id
    }

    /// Posts are searched first, then comments of every post.
    fn insert_comment(
        &mut self,
        parent_id: &str,
        author_id: UserId,
        content: String,
    ) -> Result<CommentId, EngineError> {
        let now = Utc::now();

        if let Some(post) = self.posts.get_mut(parent_id) {
            let id = self
                .comments
                .insert_top_level(post.id.clone(), author_id, content, now);
            post.comments.push(id.clone());
            debug!("{} added under post {}", id, parent_id);
            return Ok(id);
        }

        let id = self
            .comments
            .insert_reply(parent_id, author_id, content, now)
            .ok_or_else(|| EngineError::not_found("parent", parent_id))?;
        debug!("{} added under comment {}", id, parent_id);
        Ok(id)
    }

    /// Record the vote and return the author whose karma it affects.
    fn apply_vote(
        &mut self,
        item_id: &str,
        user_id: UserId,
        vote: VoteKind,
    ) -> Result<UserId, EngineError> {
        if let Some(post) = self.posts.get_mut(item_id) {
            post.votes.cast(user_id, vote);
            return Ok(post.author_id.clone());
        }
        if let Some(comment) = self.comments.get_mut(item_id) {
            comment.votes.cast(user_id, vote);
            return Ok(comment.author_id.clone());
        }
        Err(EngineError::not_found("item", item_id))
    }

    fn post(&self, post_id: &PostId) -> Result<&Post, EngineError> {
        self.posts
            .get(post_id)
            .ok_or_else(|| EngineError::not_found("post", post_id.as_str()))
    }

    /// Highest score first; equal scores newest first.
    fn posts_in(&self, communities: &[String]) -> Vec<Post> {
        let wanted: HashSet<&str> = communities.iter().map(String::as_str).collect();
        let mut posts: Vec<Post> = self
            .order
            .iter()
            .rev()
            .filter_map(|id| self.posts.get(id))
            .filter(|post| wanted.contains(post.community.as_str()))
            .cloned()
            .collect();
        posts.sort_by(|a, b| {
            b.score()
                .cmp(&a.score())
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        posts
    }
}

impl Domain for ContentStore {
    const NAME: &'static str = "content";

    type Command = ContentCommand;
    type Outcome = ContentOutcome;

    async fn handle(&mut self, command: ContentCommand) -> Result<ContentOutcome, EngineError> {
        match command {
            ContentCommand::CreatePost {
                community,
                author_id,
                title,
                content,
            } => {
                self.ensure_community(&community).await?;
                let id = self.insert_post(community, author_id, title, content);
                Ok(ContentOutcome::PostCreated(id))
            }
            ContentCommand::CreateComment {
                parent_id,
                author_id,
                content,
            } => self
                .insert_comment(&parent_id, author_id, content)
                .map(ContentOutcome::CommentCreated),
            ContentCommand::Vote {
                item_id,
                user_id,
                vote,
            } => {
                let author_id = self.apply_vote(&item_id, user_id, vote)?;
                // Applied on every vote, even a repeat of the voter's current
                // vote; prior deltas from the same voter are never reversed.
                self.identity
                    .send(IdentityCommand::AdjustKarma { user_id: author_id, vote });
                Ok(ContentOutcome::Voted)
            }
            ContentCommand::GetPost { post_id } => {
                self.post(&post_id).cloned().map(ContentOutcome::Post)
            }
            ContentCommand::GetComment { comment_id } => self
                .comments
                .get(comment_id.as_str())
                .cloned()
                .map(ContentOutcome::Comment)
                .ok_or_else(|| EngineError::not_found("comment", comment_id.as_str())),
            ContentCommand::Thread { post_id } => {
                let post = self.post(&post_id)?.clone();
                let comments = self.comments.thread(&post.comments);
                Ok(ContentOutcome::Thread(PostThread { post, comments }))
            }
            ContentCommand::PostsIn { communities } => {
                Ok(ContentOutcome::Posts(self.posts_in(&communities)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_types::commands::IdentityOutcome;

    const WAIT: Duration = Duration::from_secs(2);

    struct Fixture {
        store: ContentStore,
        identity: Mailbox<IdentityStore>,
        alice: UserId,
        bob: UserId,
    }

    async fn fixture() -> Fixture {
        let (identity, _) = Mailbox::spawn(IdentityStore::new());
        let (communities, _) = Mailbox::spawn(CommunityStore::new());

        let mut ids = Vec::new();
        for name in ["alice", "bob"] {
            let command = IdentityCommand::Register { username: name.into() };
            match identity.request(command, WAIT).await.unwrap() {
                IdentityOutcome::Registered(id) => ids.push(id),
                other => panic!("unexpected outcome: {:?}", other),
            }
        }
        let bob = ids.pop().unwrap();
        let alice = ids.pop().unwrap();

        communities
            .request(
                CommunityCommand::Create {
                    name: "golang".into(),
                    creator_id: alice.clone(),
                },
                WAIT,
            )
            .await
            .unwrap();

        Fixture {
            store: ContentStore::new(identity.clone(), communities, WAIT),
            identity,
            alice,
            bob,
        }
    }

    async fn karma(identity: &Mailbox<IdentityStore>, user_id: &UserId) -> i64 {
        let command = IdentityCommand::GetUser { user_id: user_id.clone() };
        match identity.request(command, WAIT).await.unwrap() {
            IdentityOutcome::User(user) => user.karma,
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    async fn create_post(store: &mut ContentStore, community: &str, author: &UserId) -> Result<PostId, EngineError> {
        let command = ContentCommand::CreatePost {
            community: community.into(),
            author_id: author.clone(),
            title: "Hi".into(),
            content: "Hello".into(),
        };
        match store.handle(command).await? {
            ContentOutcome::PostCreated(id) => Ok(id),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    async fn comment(store: &mut ContentStore, parent: &str, author: &UserId) -> Result<String, EngineError> {
        let command = ContentCommand::CreateComment {
            parent_id: parent.into(),
            author_id: author.clone(),
            content: "Nice".into(),
        };
        match store.handle(command).await? {
            ContentOutcome::CommentCreated(id) => Ok(id.to_string()),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    async fn vote(store: &mut ContentStore, item: &str, voter: &UserId, up: bool) -> Result<(), EngineError> {
        let command = ContentCommand::Vote {
            item_id: item.into(),
            user_id: voter.clone(),
            vote: up.into(),
        };
        store.handle(command).await.map(|_| ())
    }

    #[tokio::test]
    async fn post_requires_an_existing_community() {
        let mut f = fixture().await;
        let err = create_post(&mut f.store, "nowhere", &f.alice).await.unwrap_err();
        assert_eq!(err, EngineError::not_found("community", "nowhere"));

        let id = create_post(&mut f.store, "golang", &f.alice).await.unwrap();
        assert_eq!(id.as_str(), "post_1");
    }

    #[tokio::test]
    async fn community_lookup_timeout_reaches_the_caller() {
        let mut f = fixture().await;
        // The community domain cannot answer before a zero deadline elapses.
        f.store.lookup_timeout = Duration::ZERO;

        let err = create_post(&mut f.store, "golang", &f.alice).await.unwrap_err();
        assert!(matches!(err, EngineError::Timeout { domain: "community", .. }));
        assert!(err.is_ambiguous());
        assert!(f.store.posts.is_empty());
        assert!(f.store.order.is_empty());

        f.store.lookup_timeout = WAIT;
        let id = create_post(&mut f.store, "golang", &f.alice).await.unwrap();
        assert_eq!(id.as_str(), "post_1");
    }

    #[tokio::test]
    async fn stopped_community_domain_fails_the_post() {
        let (identity, _) = Mailbox::spawn(IdentityStore::new());
        let (communities, task) = Mailbox::spawn(CommunityStore::new());
        task.abort();
        let _ = task.await;

        let mut store = ContentStore::new(identity, communities, WAIT);
        let err = create_post(&mut store, "golang", &UserId::from("user_1")).await.unwrap_err();
        assert_eq!(err, EngineError::Closed { domain: "community" });
        assert!(store.posts.is_empty());
    }

    #[tokio::test]
    async fn author_is_not_validated() {
        let mut f = fixture().await;
        let ghost = UserId::from("user_404");
        assert!(create_post(&mut f.store, "golang", &ghost).await.is_ok());
    }

    #[tokio::test]
    async fn comments_attach_to_posts_and_to_comments() {
        let mut f = fixture().await;
        let post = create_post(&mut f.store, "golang", &f.alice).await.unwrap();

        let top = comment(&mut f.store, post.as_str(), &f.bob).await.unwrap();
        let reply = comment(&mut f.store, &top, &f.alice).await.unwrap();

        assert_eq!(f.store.posts[&post].comments.len(), 1);
        assert_eq!(f.store.posts[&post].comments[0].as_str(), top);
        let top_comment = f.store.comments.get(&top).unwrap();
        assert_eq!(top_comment.replies[0].as_str(), reply);
    }

    #[tokio::test]
    async fn comment_under_unknown_parent_fails() {
        let mut f = fixture().await;
        create_post(&mut f.store, "golang", &f.alice).await.unwrap();

        let err = comment(&mut f.store, "comment_9", &f.bob).await.unwrap_err();
        assert_eq!(err, EngineError::not_found("parent", "comment_9"));
        assert!(f.store.comments.get("comment_1").is_none());
    }

    #[tokio::test]
    async fn vote_flip_moves_voter_between_sets() {
        let mut f = fixture().await;
        let post = create_post(&mut f.store, "golang", &f.alice).await.unwrap();

        vote(&mut f.store, post.as_str(), &f.bob, true).await.unwrap();
        vote(&mut f.store, post.as_str(), &f.bob, false).await.unwrap();

        let votes = &f.store.posts[&post].votes;
        assert!(votes.upvoters.is_empty());
        assert!(votes.downvoters.contains(&f.bob));
    }

    #[tokio::test]
    async fn every_vote_reaches_the_authors_karma() {
        let mut f = fixture().await;
        let post = create_post(&mut f.store, "golang", &f.alice).await.unwrap();
        let top = comment(&mut f.store, post.as_str(), &f.bob).await.unwrap();

        vote(&mut f.store, post.as_str(), &f.bob, true).await.unwrap();
        vote(&mut f.store, post.as_str(), &f.bob, true).await.unwrap();
        vote(&mut f.store, &top, &f.alice, false).await.unwrap();

        // Karma sends are queued ahead of these reads on the identity mailbox.
        assert_eq!(karma(&f.identity, &f.alice).await, 2);
        assert_eq!(karma(&f.identity, &f.bob).await, -1);
        assert_eq!(f.store.posts[&post].votes.upvoters.len(), 1);
    }

    #[tokio::test]
    async fn vote_on_unknown_item_fails() {
        let mut f = fixture().await;
        let err = vote(&mut f.store, "post_7", &f.bob, true).await.unwrap_err();
        assert_eq!(err, EngineError::not_found("item", "post_7"));
    }

    #[tokio::test]
    async fn posts_sorted_by_score_then_recency() {
        let mut f = fixture().await;
        let first = create_post(&mut f.store, "golang", &f.alice).await.unwrap();
        let second = create_post(&mut f.store, "golang", &f.alice).await.unwrap();
        let third = create_post(&mut f.store, "golang", &f.alice).await.unwrap();
        vote(&mut f.store, first.as_str(), &f.bob, true).await.unwrap();

        let ids: Vec<PostId> = f
            .store
            .posts_in(&["golang".to_string()])
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![first, third, second]);
        assert!(f.store.posts_in(&["rust".to_string()]).is_empty());
    }
}
