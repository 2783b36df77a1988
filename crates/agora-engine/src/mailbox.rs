use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, debug_span, trace, warn};

use agora_types::EngineError;

/// An isolated partition of state, driven one command at a time by its mailbox.
///
/// `handle` owns the state exclusively for the duration of one command. It may
/// await a secondary request to another domain before mutating, but every
/// mutation must happen in a single synchronous stretch after the last await.
pub trait Domain: Send + 'static {
    const NAME: &'static str;

    type Command: fmt::Debug + Send + 'static;
    type Outcome: Send + 'static;

    fn handle(
        &mut self,
        command: Self::Command,
    ) -> impl Future<Output = Result<Self::Outcome, EngineError>> + Send;
}

type Reply<D> = oneshot::Sender<Result<<D as Domain>::Outcome, EngineError>>;

enum Envelope<D: Domain> {
    /// Fire-and-forget; the outcome is discarded.
    Tell(D::Command),
    /// Request/response; the outcome is sent back on the oneshot.
    Ask(D::Command, Reply<D>),
}

/// Handle to a domain's ordered inbox. Cheap to clone; the domain task stops
/// once every handle is dropped.
pub struct Mailbox<D: Domain> {
    tx: mpsc::UnboundedSender<Envelope<D>>,
}

impl<D: Domain> Clone for Mailbox<D> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<D: Domain> fmt::Debug for Mailbox<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mailbox")
            .field("domain", &D::NAME)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl<D: Domain> Mailbox<D> {
    /// Start the domain's processing task and return its mailbox.
    pub fn spawn(domain: D) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_domain(domain, rx));
        (Self { tx }, task)
    }

    /// One-way delivery. Never blocks and never reports the outcome; if the
    /// domain has stopped the command is dropped.
    pub fn send(&self, command: D::Command) {
        if let Err(mpsc::error::SendError(Envelope::Tell(command))) =
            self.tx.send(Envelope::Tell(command))
        {
            warn!(domain = D::NAME, ?command, "domain stopped, dropping command");
        }
    }

    /// Deliver `command` and wait up to `timeout` for the outcome.
    ///
    /// On `Timeout` the command may or may not have been applied; the handler
    /// is never cancelled once it has started.
    pub async fn request(
        &self,
        command: D::Command,
        timeout: Duration,
    ) -> Result<D::Outcome, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Envelope::Ask(command, reply_tx))
            .map_err(|_| EngineError::Closed { domain: D::NAME })?;

        match tokio::time::timeout(timeout, reply_rx).await {
            Ok(Ok(result)) => result,
            // Reply sender dropped without answering: the domain task is gone.
            Ok(Err(_)) => Err(EngineError::Closed { domain: D::NAME }),
            Err(_) => Err(EngineError::Timeout {
                domain: D::NAME,
                after: timeout,
            }),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

async fn run_domain<D: Domain>(mut domain: D, mut rx: mpsc::UnboundedReceiver<Envelope<D>>) {
    debug!(domain = D::NAME, "domain started");
    let mut seq: u64 = 0;

    while let Some(envelope) = rx.recv().await {
        seq += 1;
        let span = debug_span!("handle", domain = D::NAME, seq);

        match envelope {
            Envelope::Tell(command) => {
                trace!(parent: &span, ?command, "tell");
                if let Err(e) = domain.handle(command).instrument(span.clone()).await {
                    debug!(parent: &span, "one-way command rejected: {}", e);
                }
            }
            Envelope::Ask(command, reply) => {
                trace!(parent: &span, ?command, "ask");
                let result = domain.handle(command).instrument(span.clone()).await;
                if reply.send(result).is_err() {
                    trace!(parent: &span, "requester gave up before the reply");
                }
            }
        }
    }

    debug!(domain = D::NAME, handled = seq, "domain stopped");
}
