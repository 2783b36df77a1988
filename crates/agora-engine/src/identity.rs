use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, info, trace};

use agora_types::EngineError;
use agora_types::commands::{IdentityCommand, IdentityOutcome};
use agora_types::models::{User, UserId, VoteKind};

use crate::mailbox::Domain;

/// Owns every user record. Usernames are unique, case-sensitive.
#[derive(Debug, Default)]
pub struct IdentityStore {
    users: HashMap<UserId, User>,
    by_username: HashMap<String, UserId>,
    next_id: u64,
}

impl IdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&mut self, username: String) -> Result<UserId, EngineError> {
        if self.by_username.contains_key(&username) {
            debug!("rejecting duplicate username {}", username);
            return Err(EngineError::DuplicateUsername(username));
        }

        self.next_id += 1;
        let id = UserId::nth(self.next_id);
        let user = User {
            id: id.clone(),
            username: username.clone(),
            karma: 0,
            created_at: Utc::now(),
        };

        info!("registered {} as {}", username, id);
        self.by_username.insert(username, id.clone());
        self.users.insert(id.clone(), user);
        Ok(id)
    }

    /// Best-effort courtesy call from other domains: unknown ids are ignored.
    fn adjust_karma(&mut self, user_id: &UserId, vote: VoteKind) {
        match self.users.get_mut(user_id) {
            Some(user) => {
                user.karma += vote.karma_delta();
                trace!(user = %user_id, karma = user.karma, "karma adjusted");
            }
            None => trace!(user = %user_id, "karma adjustment for unknown user ignored"),
        }
    }

    fn user(&self, user_id: &UserId) -> Result<User, EngineError> {
        self.users
            .get(user_id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("user", user_id.as_str()))
    }

    fn find_by_username(&self, username: &str) -> Result<User, EngineError> {
        self.by_username
            .get(username)
            .and_then(|id| self.users.get(id))
            .cloned()
            .ok_or_else(|| EngineError::not_found("user", username))
    }
}

impl Domain for IdentityStore {
    const NAME: &'static str = "identity";

    type Command = IdentityCommand;
    type Outcome = IdentityOutcome;

    async fn handle(&mut self, command: IdentityCommand) -> Result<IdentityOutcome, EngineError> {
        match command {
            IdentityCommand::Register { username } => {
                self.register(username).map(IdentityOutcome::Registered)
            }
            IdentityCommand::AdjustKarma { user_id, vote } => {
                self.adjust_karma(&user_id, vote);
                Ok(IdentityOutcome::KarmaAdjusted)
            }
            IdentityCommand::GetUser { user_id } => self.user(&user_id).map(IdentityOutcome::User),
            IdentityCommand::FindByUsername { username } => {
                self.find_by_username(&username).map(IdentityOutcome::User)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_assigned_in_registration_order() {
        let mut store = IdentityStore::new();
        assert_eq!(store.register("alice".into()).unwrap().as_str(), "user_1");
        assert_eq!(store.register("bob".into()).unwrap().as_str(), "user_2");
        assert_eq!(store.user(&UserId::from("user_1")).unwrap().karma, 0);
    }

    #[test]
    fn duplicate_username_is_rejected_without_burning_an_id() {
        let mut store = IdentityStore::new();
        store.register("alice".into()).unwrap();

        let err = store.register("alice".into()).unwrap_err();
        assert_eq!(err, EngineError::DuplicateUsername("alice".into()));

        assert_eq!(store.register("carol".into()).unwrap().as_str(), "user_2");
    }

    #[test]
    fn usernames_are_case_sensitive() {
        let mut store = IdentityStore::new();
        store.register("alice".into()).unwrap();
        assert!(store.register("Alice".into()).is_ok());
    }

    #[test]
    fn karma_moves_both_ways_and_may_go_negative() {
        let mut store = IdentityStore::new();
        let id = store.register("alice".into()).unwrap();

        store.adjust_karma(&id, VoteKind::Up);
        store.adjust_karma(&id, VoteKind::Down);
        store.adjust_karma(&id, VoteKind::Down);
        assert_eq!(store.user(&id).unwrap().karma, -1);
    }

    #[test]
    fn karma_for_unknown_user_is_a_no_op() {
        let mut store = IdentityStore::new();
        store.adjust_karma(&UserId::from("user_99"), VoteKind::Up);
        assert!(store.users.is_empty());
    }

    #[test]
    fn lookup_by_username() {
        let mut store = IdentityStore::new();
        let id = store.register("alice".into()).unwrap();
        assert_eq!(store.find_by_username("alice").unwrap().id, id);
        assert!(matches!(
            store.find_by_username("nobody"),
            Err(EngineError::NotFound { kind: "user", .. })
        ));
    }

    #[tokio::test]
    async fn unknown_user_karma_still_succeeds_through_handle() {
        let mut store = IdentityStore::new();
        let outcome = store
            .handle(IdentityCommand::AdjustKarma {
                user_id: UserId::from("user_5"),
                vote: VoteKind::Down,
            })
            .await
            .unwrap();
        assert!(matches!(outcome, IdentityOutcome::KarmaAdjusted));
    }
}
