use std::time::Duration;

use crate::retry::RetryPolicy;

/// Knobs for one simulation run.
///
/// Probabilities are compared against a uniform draw in `[0, 1)`, so values
/// at or below 0 never fire and values at or above 1 always do.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Users to register. Also sets the community count: one per 20 users,
    /// at least one.
    pub users: usize,
    /// Total run time, registration included.
    pub duration: Duration,
    pub tick_interval: Duration,
    /// Timeout for every steady-state request.
    pub request_timeout: Duration,
    /// Timeout for each registration attempt.
    pub registration_timeout: Duration,
    pub registration_retry: RetryPolicy,
    /// Pause between consecutive users during registration.
    pub registration_spacing: Duration,
    /// Chance per tick that a user toggles between connected and not.
    pub connectivity_flip: f64,
    /// Chance that a new comment replies to a comment instead of a post.
    pub reply_to_comment: f64,
    pub upvote: f64,
    /// Chance of voting on a post when comments exist too.
    pub vote_on_post: f64,
    /// Fixed seed for a reproducible workload; fresh entropy otherwise.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            users: 10,
            duration: Duration::from_secs(60),
            tick_interval: Duration::from_millis(100),
            request_timeout: Duration::from_secs(5),
            registration_timeout: Duration::from_secs(10),
            registration_retry: RetryPolicy::new(3, Duration::from_secs(1)),
            registration_spacing: Duration::from_millis(100),
            connectivity_flip: 0.1,
            reply_to_comment: 0.3,
            upvote: 0.7,
            vote_on_post: 0.7,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn with_users(users: usize, duration: Duration) -> Self {
        Self {
            users,
            duration,
            ..Self::default()
        }
    }

    pub fn community_count(&self) -> usize {
        (self.users / 20).max(1)
    }
}
