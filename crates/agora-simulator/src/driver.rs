use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info_span};
use uuid::Uuid;

use agora_engine::Engine;
use agora_types::EngineError;
use agora_types::models::{CommentId, PostId, SimulationStats, UserId, VoteKind};

use crate::config::SimulationConfig;
use crate::logging::{SimulationEvent, SimulationLog, SimulationLogger, TracingLogger};

const SNAPSHOT_EVERY: u64 = 50;

#[derive(Debug)]
struct SimUser {
    id: UserId,
    connected: bool,
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Join,
    Post,
    Comment,
    Vote,
    Message,
}

const ACTIONS: [Action; 5] = [
    Action::Join,
    Action::Post,
    Action::Comment,
    Action::Vote,
    Action::Message,
];

/// Synthetic load against a running [`Engine`].
///
/// All bookkeeping (known ids, connectivity, counters) is private to the
/// driver and only touched from its own task.
pub struct Simulator {
    engine: Engine,
    config: SimulationConfig,
    logger: Arc<dyn SimulationLogger>,
    rng: StdRng,
    run_id: Uuid,
    users: Vec<SimUser>,
    communities: Vec<String>,
    posts: Vec<PostId>,
    comments: Vec<CommentId>,
    stats: SimulationStats,
}

impl Simulator {
    pub fn new(engine: Engine, config: SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            engine,
            config,
            logger: Arc::new(TracingLogger),
            rng,
            run_id: Uuid::new_v4(),
            users: Vec::new(),
            communities: Vec::new(),
            posts: Vec::new(),
            comments: Vec::new(),
            stats: SimulationStats::default(),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn SimulationLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Register users, create communities, then generate traffic until the
    /// configured duration has passed or `cancel` fires.
    pub async fn run(mut self, cancel: CancellationToken) -> SimulationStats {
        let span = info_span!("simulation", run_id = %self.run_id);
        async move {
            let deadline = Instant::now() + self.config.duration;
            self.emit(SimulationEvent::Started {
                users: self.config.users,
                duration_ms: self.config.duration.as_millis() as u64,
            });

            self.register_users(&cancel).await;
            if self.users.is_empty() {
                self.emit(SimulationEvent::NoUsers);
                return self.stats;
            }

            self.create_communities().await;
            let (ticks, cancelled) = self.steady_state(deadline, &cancel).await;

            self.emit(SimulationEvent::Finished {
                ticks,
                cancelled,
                stats: self.stats.clone(),
            });
            self.stats
        }
        .instrument(span)
        .await
    }

    fn emit(&self, event: SimulationEvent) {
        self.logger.log(SimulationLog {
            run_id: self.run_id,
            event,
        });
    }

    fn chance(&mut self, probability: f64) -> bool {
        self.rng.random::<f64>() < probability
    }

    // -- Registration --

    async fn register_users(&mut self, cancel: &CancellationToken) {
        let engine = self.engine.with_timeout(self.config.registration_timeout);
        let policy = self.config.registration_retry;

        for i in 0..self.config.users {
            if cancel.is_cancelled() {
                break;
            }

            let username = format!("simuser_{}", i);
            let logger = Arc::clone(&self.logger);
            let run_id = self.run_id;
            let result = policy
                .run(
                    |_| engine.register(username.clone()),
                    |attempt, e: &EngineError| {
                        logger.log(SimulationLog {
                            run_id,
                            event: SimulationEvent::RegistrationFailed {
                                username: username.clone(),
                                attempt,
                                ambiguous: e.is_ambiguous(),
                                error: e.to_string(),
                            },
                        })
                    },
                )
                .await;

            match result {
                Ok(id) => {
                    self.users.push(SimUser { id, connected: true });
                    self.stats.registered_users += 1;
                }
                Err(_) => self.emit(SimulationEvent::UserAbandoned {
                    username,
                    attempts: policy.attempts.max(1),
                }),
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.config.registration_spacing) => {}
            }
        }

        self.emit(SimulationEvent::RegistrationComplete {
            registered: self.users.len(),
            requested: self.config.users,
        });
    }

    // -- Setup --

    async fn create_communities(&mut self) {
        let engine = self.engine.with_timeout(self.config.request_timeout);

        for i in 0..self.config.community_count() {
            let name = format!("community_{}", i);
            let Some(creator) = self.users.choose(&mut self.rng).map(|u| u.id.clone()) else {
                return;
            };

            match engine.create_community(name, &creator).await {
                Ok(name) => {
                    self.emit(SimulationEvent::CommunityCreated {
                        name: name.clone(),
                        creator: creator.to_string(),
                    });
                    self.communities.push(name);
                    self.stats.active_communities += 1;
                }
                Err(e) => self.failed("create_community", e),
            }
        }
    }

    // -- Steady state --

    async fn steady_state(&mut self, deadline: Instant, cancel: &CancellationToken) -> (u64, bool) {
        let mut interval = tokio::time::interval(self.config.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks = 0u64;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return (ticks, true),
                _ = tokio::time::sleep_until(deadline) => return (ticks, false),
                _ = interval.tick() => {}
            }

            ticks += 1;
            // A tick stuck behind a backed-up domain must not outlive the run.
            tokio::select! {
                _ = cancel.cancelled() => return (ticks, true),
                _ = tokio::time::sleep_until(deadline) => return (ticks, false),
                _ = self.tick() => {}
            }

            if ticks % SNAPSHOT_EVERY == 0 {
                self.emit(SimulationEvent::Snapshot {
                    tick: ticks,
                    connected: self.connected_count(),
                    stats: self.stats.clone(),
                });
            }
        }
    }

    fn connected_count(&self) -> usize {
        self.users.iter().filter(|u| u.connected).count()
    }

    async fn tick(&mut self) {
        for i in 0..self.users.len() {
            if self.chance(self.config.connectivity_flip) {
                self.users[i].connected = !self.users[i].connected;
            }
        }

        for i in 0..self.users.len() {
            if !self.users[i].connected {
                continue;
            }
            let Some(&action) = ACTIONS.choose(&mut self.rng) else {
                continue;
            };
            self.act(i, action).await;
        }
    }

    async fn act(&mut self, user: usize, action: Action) {
        let user_id = self.users[user].id.clone();
        match action {
            Action::Join => self.join(&user_id),
            Action::Post => self.post(&user_id).await,
            Action::Comment => self.comment(&user_id).await,
            Action::Vote => self.vote(&user_id),
            Action::Message => self.message(user).await,
        }
    }

    fn failed(&mut self, action: &'static str, error: EngineError) {
        self.stats.failed_actions += 1;
        self.emit(SimulationEvent::ActionFailed {
            action,
            error: error.to_string(),
        });
    }

    fn join(&mut self, user_id: &UserId) {
        if let Some(name) = self.communities.choose(&mut self.rng) {
            self.engine.join_later(name, user_id);
        }
    }

    async fn post(&mut self, user_id: &UserId) {
        let Some(community) = self.communities.choose(&mut self.rng).cloned() else {
            return;
        };
        let title = format!("Post by {}", user_id);
        let content = format!("Content {}", self.rng.random::<u32>());

        match self
            .engine
            .with_timeout(self.config.request_timeout)
            .create_post(&community, user_id, title, content)
            .await
        {
            Ok(id) => {
                self.posts.push(id);
                self.stats.total_posts += 1;
            }
            Err(e) => self.failed("create_post", e),
        }
    }

    async fn comment(&mut self, user_id: &UserId) {
        let Some(post) = self.posts.choose(&mut self.rng).cloned() else {
            return;
        };
        let parent = if !self.comments.is_empty() && self.chance(self.config.reply_to_comment) {
            match self.comments.choose(&mut self.rng) {
                Some(comment) => comment.to_string(),
                None => post.to_string(),
            }
        } else {
            post.to_string()
        };
        let content = format!("Comment {}", self.rng.random::<u32>());

        match self
            .engine
            .with_timeout(self.config.request_timeout)
            .create_comment(&parent, user_id, content)
            .await
        {
            Ok(id) => {
                self.comments.push(id);
                self.stats.total_comments += 1;
            }
            Err(e) => self.failed("create_comment", e),
        }
    }

    fn vote(&mut self, user_id: &UserId) {
        let on_post = !self.posts.is_empty()
            && (self.comments.is_empty() || self.chance(self.config.vote_on_post));
        let item = if on_post {
            self.posts.choose(&mut self.rng).map(|id| id.to_string())
        } else {
            self.comments.choose(&mut self.rng).map(|id| id.to_string())
        };
        let Some(item) = item else {
            return;
        };

        let vote = VoteKind::from(self.chance(self.config.upvote));
        self.engine.vote_later(&item, user_id, vote);
        self.stats.votes_cast += 1;
    }

    /// Direct message to a uniformly chosen other user.
    async fn message(&mut self, from: usize) {
        let n = self.users.len();
        if n < 2 {
            return;
        }
        let mut to = self.rng.random_range(0..n - 1);
        if to >= from {
            to += 1;
        }

        let from_id = self.users[from].id.clone();
        let to_id = self.users[to].id.clone();
        let content = format!("Message {}", self.rng.random::<u32>());

        match self
            .engine
            .with_timeout(self.config.request_timeout)
            .send_message(&from_id, &to_id, content)
            .await
        {
            Ok(_) => self.stats.total_messages += 1,
            Err(e) => self.failed("send_message", e),
        }
    }
}
