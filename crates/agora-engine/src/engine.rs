use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::info;

use agora_types::EngineError;
use agora_types::commands::{
    CommunityCommand, CommunityOutcome, ContentCommand, ContentOutcome, IdentityCommand,
    IdentityOutcome, MessagingCommand, MessagingOutcome,
};
use agora_types::models::{
    Comment, CommentId, Community, DirectMessage, MessageId, Post, PostId, PostThread, User,
    UserId, VoteKind,
};

use crate::community::CommunityStore;
use crate::content::ContentStore;
use crate::identity::IdentityStore;
use crate::mailbox::{Domain, Mailbox};
use crate::messaging::MessagingStore;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Handles to the four running domains plus the timeout used for requests.
///
/// Cloning is cheap and every clone talks to the same domains. The domains
/// stop once the last clone is dropped.
#[derive(Debug, Clone)]
pub struct Engine {
    identity: Mailbox<IdentityStore>,
    communities: Mailbox<CommunityStore>,
    content: Mailbox<ContentStore>,
    messaging: Mailbox<MessagingStore>,
    timeout: Duration,
}

/// Join handles of the domain tasks, in case the caller wants to await them.
#[derive(Debug)]
pub struct EngineTasks {
    pub identity: JoinHandle<()>,
    pub communities: JoinHandle<()>,
    pub content: JoinHandle<()>,
    pub messaging: JoinHandle<()>,
}

fn unexpected<D: Domain>() -> EngineError {
    EngineError::Unhandled { domain: D::NAME }
}

impl Engine {
    /// Spawn all four domains on the current runtime.
    ///
    /// Content's community lookups use the same `timeout` as the facade.
    pub fn start(timeout: Duration) -> (Self, EngineTasks) {
        let (identity, identity_task) = Mailbox::spawn(IdentityStore::new());
        let (communities, communities_task) = Mailbox::spawn(CommunityStore::new());
        let (content, content_task) = Mailbox::spawn(ContentStore::new(
            identity.clone(),
            communities.clone(),
            timeout,
        ));
        let (messaging, messaging_task) = Mailbox::spawn(MessagingStore::new());

        info!(timeout_ms = timeout.as_millis() as u64, "engine started");

        let engine = Self {
            identity,
            communities,
            content,
            messaging,
            timeout,
        };
        let tasks = EngineTasks {
            identity: identity_task,
            communities: communities_task,
            content: content_task,
            messaging: messaging_task,
        };
        (engine, tasks)
    }

    /// Same domains, different request timeout.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            timeout,
            ..self.clone()
        }
    }

    // -- Identity --

    pub async fn register(&self, username: impl Into<String>) -> Result<UserId, EngineError> {
        let command = IdentityCommand::Register {
            username: username.into(),
        };
        match self.identity.request(command, self.timeout).await? {
            IdentityOutcome::Registered(id) => Ok(id),
            _ => Err(unexpected::<IdentityStore>()),
        }
    }

    pub async fn user(&self, user_id: &UserId) -> Result<User, EngineError> {
        let command = IdentityCommand::GetUser {
            user_id: user_id.clone(),
        };
        match self.identity.request(command, self.timeout).await? {
            IdentityOutcome::User(user) => Ok(user),
            _ => Err(unexpected::<IdentityStore>()),
        }
    }

    pub async fn find_user(&self, username: &str) -> Result<User, EngineError> {
        let command = IdentityCommand::FindByUsername {
            username: username.to_string(),
        };
        match self.identity.request(command, self.timeout).await? {
            IdentityOutcome::User(user) => Ok(user),
            _ => Err(unexpected::<IdentityStore>()),
        }
    }

    // -- Community --

    pub async fn create_community(
        &self,
        name: impl Into<String>,
        creator_id: &UserId,
    ) -> Result<String, EngineError> {
        let command = CommunityCommand::Create {
            name: name.into(),
            creator_id: creator_id.clone(),
        };
        match self.communities.request(command, self.timeout).await? {
            CommunityOutcome::Created(name) => Ok(name),
            _ => Err(unexpected::<CommunityStore>()),
        }
    }

    pub async fn join(&self, name: &str, user_id: &UserId) -> Result<(), EngineError> {
        let command = CommunityCommand::Join {
            name: name.to_string(),
            user_id: user_id.clone(),
        };
        match self.communities.request(command, self.timeout).await? {
            CommunityOutcome::Joined => Ok(()),
            _ => Err(unexpected::<CommunityStore>()),
        }
    }

    /// Fire-and-forget join; failures are only logged by the domain.
    pub fn join_later(&self, name: &str, user_id: &UserId) {
        self.communities.send(CommunityCommand::Join {
            name: name.to_string(),
            user_id: user_id.clone(),
        });
    }

    pub async fn leave(&self, name: &str, user_id: &UserId) -> Result<(), EngineError> {
        let command = CommunityCommand::Leave {
            name: name.to_string(),
            user_id: user_id.clone(),
        };
        match self.communities.request(command, self.timeout).await? {
            CommunityOutcome::Left => Ok(()),
            _ => Err(unexpected::<CommunityStore>()),
        }
    }

    pub async fn community(&self, name: &str) -> Result<Community, EngineError> {
        let command = CommunityCommand::Get {
            name: name.to_string(),
        };
        match self.communities.request(command, self.timeout).await? {
            CommunityOutcome::Community(community) => Ok(community),
            _ => Err(unexpected::<CommunityStore>()),
        }
    }

    pub async fn memberships(&self, user_id: &UserId) -> Result<Vec<String>, EngineError> {
        let command = CommunityCommand::MembershipsOf {
            user_id: user_id.clone(),
        };
        match self.communities.request(command, self.timeout).await? {
            CommunityOutcome::Memberships(names) => Ok(names),
            _ => Err(unexpected::<CommunityStore>()),
        }
    }

    // -- Content --

    pub async fn create_post(
        &self,
        community: &str,
        author_id: &UserId,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<PostId, EngineError> {
        let command = ContentCommand::CreatePost {
            community: community.to_string(),
            author_id: author_id.clone(),
            title: title.into(),
            content: content.into(),
        };
        match self.content.request(command, self.timeout).await? {
            ContentOutcome::PostCreated(id) => Ok(id),
            _ => Err(unexpected::<ContentStore>()),
        }
    }

    pub async fn create_comment(
        &self,
        parent_id: &str,
        author_id: &UserId,
        content: impl Into<String>,
    ) -> Result<CommentId, EngineError> {
        let command = ContentCommand::CreateComment {
            parent_id: parent_id.to_string(),
            author_id: author_id.clone(),
            content: content.into(),
        };
        match self.content.request(command, self.timeout).await? {
            ContentOutcome::CommentCreated(id) => Ok(id),
            _ => Err(unexpected::<ContentStore>()),
        }
    }

    pub async fn vote(
        &self,
        item_id: &str,
        user_id: &UserId,
        vote: VoteKind,
    ) -> Result<(), EngineError> {
        match self
            .content
            .request(vote_command(item_id, user_id, vote), self.timeout)
            .await?
        {
            ContentOutcome::Voted => Ok(()),
            _ => Err(unexpected::<ContentStore>()),
        }
    }

    /// Fire-and-forget vote; an unknown item is only logged by the domain.
    pub fn vote_later(&self, item_id: &str, user_id: &UserId, vote: VoteKind) {
        self.content.send(vote_command(item_id, user_id, vote));
    }

    pub async fn post(&self, post_id: &PostId) -> Result<Post, EngineError> {
        let command = ContentCommand::GetPost {
            post_id: post_id.clone(),
        };
        match self.content.request(command, self.timeout).await? {
            ContentOutcome::Post(post) => Ok(post),
            _ => Err(unexpected::<ContentStore>()),
        }
    }

    pub async fn comment(&self, comment_id: &CommentId) -> Result<Comment, EngineError> {
        let command = ContentCommand::GetComment {
            comment_id: comment_id.clone(),
        };
        match self.content.request(command, self.timeout).await? {
            ContentOutcome::Comment(comment) => Ok(comment),
            _ => Err(unexpected::<ContentStore>()),
        }
    }

    pub async fn thread(&self, post_id: &PostId) -> Result<PostThread, EngineError> {
        let command = ContentCommand::Thread {
            post_id: post_id.clone(),
        };
        match self.content.request(command, self.timeout).await? {
            ContentOutcome::Thread(thread) => Ok(thread),
            _ => Err(unexpected::<ContentStore>()),
        }
    }

    pub async fn posts_in(&self, communities: Vec<String>) -> Result<Vec<Post>, EngineError> {
        let command = ContentCommand::PostsIn { communities };
        match self.content.request(command, self.timeout).await? {
            ContentOutcome::Posts(posts) => Ok(posts),
            _ => Err(unexpected::<ContentStore>()),
        }
    }

    /// Posts from every community the user belongs to, best first.
    ///
    /// Two requests, so the result is not a snapshot: posts or memberships
    /// may change in between.
    pub async fn feed(&self, user_id: &UserId) -> Result<Vec<Post>, EngineError> {
        let communities = self.memberships(user_id).await?;
        if communities.is_empty() {
            return Ok(Vec::new());
        }
        self.posts_in(communities).await
    }

    // -- Messaging --

    pub async fn send_message(
        &self,
        from: &UserId,
        to: &UserId,
        content: impl Into<String>,
    ) -> Result<MessageId, EngineError> {
        let command = MessagingCommand::SendDirect {
            from: from.clone(),
            to: to.clone(),
            content: content.into(),
        };
        match self.messaging.request(command, self.timeout).await? {
            MessagingOutcome::Sent(id) => Ok(id),
            _ => Err(unexpected::<MessagingStore>()),
        }
    }

    /// Newest first.
    pub async fn inbox(&self, user_id: &UserId) -> Result<Vec<DirectMessage>, EngineError> {
        let command = MessagingCommand::ListInbox {
            user_id: user_id.clone(),
        };
        match self.messaging.request(command, self.timeout).await? {
            MessagingOutcome::Inbox(messages) => Ok(messages),
            _ => Err(unexpected::<MessagingStore>()),
        }
    }
}

fn vote_command(item_id: &str, user_id: &UserId, vote: VoteKind) -> ContentCommand {
    ContentCommand::Vote {
        item_id: item_id.to_string(),
        user_id: user_id.clone(),
        vote,
    }
}
