use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, info};

use agora_types::EngineError;
use agora_types::commands::{CommunityCommand, CommunityOutcome};
use agora_types::models::{Community, UserId};

use crate::mailbox::Domain;

/// Owns communities and their member/moderator sets, keyed by name.
#[derive(Debug, Default)]
pub struct CommunityStore {
    communities: HashMap<String, Community>,
}

impl CommunityStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn create(&mut self, name: String, creator_id: UserId) -> Result<String, EngineError> {
        if self.communities.contains_key(&name) {
            return Err(EngineError::already_exists("community", name));
        }

        info!("community {} created by {}", name, creator_id);
        let community = Community::new(name.clone(), creator_id, Utc::now());
        self.communities.insert(name.clone(), community);
        Ok(name)
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut Community, EngineError> {
        self.communities
            .get_mut(name)
            .ok_or_else(|| EngineError::not_found("community", name))
    }

    /// Idempotent: re-joining leaves the member set unchanged.
    fn join(&mut self, name: &str, user_id: UserId) -> Result<(), EngineError> {
        let community = self.get_mut(name)?;
        if community.members.insert(user_id.clone()) {
            debug!("{} joined {}", user_id, name);
        }
        Ok(())
    }

    /// Idempotent: leaving without being a member is a success.
    fn leave(&mut self, name: &str, user_id: &UserId) -> Result<(), EngineError> {
        let community = self.get_mut(name)?;
        if community.members.remove(user_id) {
            debug!("{} left {}", user_id, name);
        }
        Ok(())
    }

    fn memberships_of(&self, user_id: &UserId) -> Vec<String> {
        let mut names: Vec<String> = self
            .communities
            .values()
            .filter(|c| c.members.contains(user_id))
            .map(|c| c.name.clone())
            .collect();
        names.sort();
        names
    }
}

impl Domain for CommunityStore {
    const NAME: &'static str = "community";

    type Command = CommunityCommand;
    type Outcome = CommunityOutcome;

    async fn handle(&mut self, command: CommunityCommand) -> Result<CommunityOutcome, EngineError> {
        match command {
            CommunityCommand::Create { name, creator_id } => {
                self.create(name, creator_id).map(CommunityOutcome::Created)
            }
            CommunityCommand::Join { name, user_id } => {
                self.join(&name, user_id).map(|()| CommunityOutcome::Joined)
            }
            CommunityCommand::Leave { name, user_id } => {
                self.leave(&name, &user_id).map(|()| CommunityOutcome::Left)
            }
            CommunityCommand::Get { name } => self
                .communities
                .get(&name)
                .cloned()
                .map(CommunityOutcome::Community)
                .ok_or_else(|| EngineError::not_found("community", name)),
            CommunityCommand::Exists { name } => {
                Ok(CommunityOutcome::Exists(self.communities.contains_key(&name)))
            }
            CommunityCommand::MembershipsOf { user_id } => {
                Ok(CommunityOutcome::Memberships(self.memberships_of(&user_id)))
            }
        }
    }
}
