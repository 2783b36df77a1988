use std::collections::HashMap;

use chrono::Utc;
use tracing::debug;

use agora_types::EngineError;
use agora_types::commands::{MessagingCommand, MessagingOutcome};
use agora_types::models::{DirectMessage, MessageId, UserId};

use crate::mailbox::Domain;

/// Per-user inboxes of direct messages. Participants are not validated.
#[derive(Debug, Default)]
pub struct MessagingStore {
    inboxes: HashMap<UserId, Vec<DirectMessage>>,
    next_id: u64,
}

impl MessagingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The message lands in the recipient's and the sender's inbox. A message
    /// to oneself is therefore listed twice.
    fn send_direct(&mut self, from: UserId, to: UserId, content: String) -> MessageId {
        self.next_id += 1;
        let id = MessageId::nth(self.next_id);
        let message = DirectMessage {
            id: id.clone(),
            from: from.clone(),
            to: to.clone(),
            content,
            created_at: Utc::now(),
        };

        debug!("{} from {} to {}", id, from, to);
        self.inboxes.entry(to).or_default().push(message.clone());
        self.inboxes.entry(from).or_default().push(message);
        id
    }

    /// Newest first; messages stamped with the same instant keep reverse
    /// arrival order.
    fn inbox(&self, user_id: &UserId) -> Vec<DirectMessage> {
        let mut messages: Vec<DirectMessage> = self
            .inboxes
            .get(user_id)
            .map(|inbox| inbox.iter().rev().cloned().collect())
            .unwrap_or_default();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        messages
    }
}

impl Domain for MessagingStore {
    const NAME: &'static str = "messaging";

    type Command = MessagingCommand;
    type Outcome = MessagingOutcome;

    async fn handle(&mut self, command: MessagingCommand) -> Result<MessagingOutcome, EngineError> {
        match command {
            MessagingCommand::SendDirect { from, to, content } => {
                Ok(MessagingOutcome::Sent(self.send_direct(from, to, content)))
            }
            MessagingCommand::ListInbox { user_id } => {
                Ok(MessagingOutcome::Inbox(self.inbox(&user_id)))
            }
        }
    }
}
