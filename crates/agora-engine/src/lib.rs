//! The message-driven core: four domains, each owning its state behind an
//! ordered mailbox, and a facade for talking to them.

pub mod community;
pub mod content;
pub mod engine;
pub mod identity;
pub mod mailbox;
pub mod messaging;

pub use community::CommunityStore;
pub use content::{CommentTree, ContentStore};
pub use engine::{DEFAULT_REQUEST_TIMEOUT, Engine, EngineTasks};
pub use identity::IdentityStore;
pub use mailbox::{Domain, Mailbox};
pub use messaging::MessagingStore;
