//! Simulation event reporting.
//!
//! The driver reports lifecycle and failure events through a
//! [`SimulationLogger`], which may trace them, capture them, or drop them.

use std::fmt;

use uuid::Uuid;

use agora_types::models::SimulationStats;

/// Structured log entry for one simulation run.
#[derive(Debug, Clone)]
pub struct SimulationLog {
    pub run_id: Uuid,
    pub event: SimulationEvent,
}

/// Simulation events that can be logged.
#[derive(Debug, Clone)]
pub enum SimulationEvent {
    /// Run started
    Started {
        users: usize,
        duration_ms: u64,
    },
    /// One registration attempt failed
    RegistrationFailed {
        username: String,
        attempt: u32,
        /// The request timed out, so it may still have been applied
        ambiguous: bool,
        error: String,
    },
    /// Registration retries exhausted; the user is skipped
    UserAbandoned {
        username: String,
        attempts: u32,
    },
    /// Registration phase over
    RegistrationComplete {
        registered: usize,
        requested: usize,
    },
    /// Nobody registered, nothing to simulate
    NoUsers,
    CommunityCreated {
        name: String,
        creator: String,
    },
    /// A counted action failed and was skipped
    ActionFailed {
        action: &'static str,
        error: String,
    },
    /// Periodic counters
    Snapshot {
        tick: u64,
        connected: usize,
        stats: SimulationStats,
    },
    /// Run over, by deadline or cancellation
    Finished {
        ticks: u64,
        cancelled: bool,
        stats: SimulationStats,
    },
}

struct StatsDisplay<'a>(&'a SimulationStats);

impl fmt::Display for StatsDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0;
        write!(
            f,
            "users={} communities={} posts={} comments={} messages={} votes={} failed={}",
            s.registered_users,
            s.active_communities,
            s.total_posts,
            s.total_comments,
            s.total_messages,
            s.votes_cast,
            s.failed_actions,
        )
    }
}

impl fmt::Display for SimulationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started { users, duration_ms } => {
                write!(f, "started users={} duration_ms={}", users, duration_ms)
            }
            Self::RegistrationFailed { username, attempt, ambiguous, error } => write!(
                f,
                "registration_failed username={} attempt={} ambiguous={}: {}",
                username, attempt, ambiguous, error
            ),
            Self::UserAbandoned { username, attempts } => {
                write!(f, "user_abandoned username={} attempts={}", username, attempts)
            }
            Self::RegistrationComplete { registered, requested } => {
                write!(f, "registration_complete registered={}/{}", registered, requested)
            }
            Self::NoUsers => write!(f, "no users registered, stopping"),
            Self::CommunityCreated { name, creator } => {
                write!(f, "community_created name={} creator={}", name, creator)
            }
            Self::ActionFailed { action, error } => {
                write!(f, "action_failed action={}: {}", action, error)
            }
            Self::Snapshot { tick, connected, stats } => {
                write!(f, "snapshot tick={} connected={} {}", tick, connected, StatsDisplay(stats))
            }
            Self::Finished { ticks, cancelled, stats } => {
                write!(f, "finished ticks={} cancelled={} {}", ticks, cancelled, StatsDisplay(stats))
            }
        }
    }
}

/// Trait for simulation logging. Implementations can write to tracing,
/// collect entries, or discard them.
pub trait SimulationLogger: Send + Sync {
    fn log(&self, entry: SimulationLog);
}

/// Logger that uses the `tracing` crate.
pub struct TracingLogger;

impl SimulationLogger for TracingLogger {
    fn log(&self, entry: SimulationLog) {
        let run = entry.run_id;
        match &entry.event {
            SimulationEvent::UserAbandoned { .. }
            | SimulationEvent::NoUsers
            | SimulationEvent::RegistrationFailed { ambiguous: true, .. } => {
                tracing::warn!(run_id = %run, "{}", entry.event);
            }
            SimulationEvent::RegistrationFailed { .. } | SimulationEvent::ActionFailed { .. } => {
                tracing::debug!(run_id = %run, "{}", entry.event);
            }
            _ => {
                tracing::info!(run_id = %run, "{}", entry.event);
            }
        }
    }
}

/// No-op logger that discards all log entries.
pub struct NullLogger;

impl SimulationLogger for NullLogger {
    fn log(&self, _entry: SimulationLog) {}
}
