//! Agora load simulator: drives synthetic users against a running engine.
//!
//! Registration retries with a fixed backoff, then a ticking loop in which
//! each connected user performs one random action per tick. Joins and votes
//! are one-way sends; posts, comments and messages are awaited and counted.

pub mod config;
pub mod driver;
pub mod logging;
pub mod retry;

pub use config::SimulationConfig;
pub use driver::Simulator;
pub use logging::{NullLogger, SimulationEvent, SimulationLog, SimulationLogger, TracingLogger};
pub use retry::RetryPolicy;
