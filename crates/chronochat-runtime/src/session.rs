//! Chat session lifecycle and event loop
//!
//! A [`ChatSession`] owns the substrate connection, the fetch scheduler, and
//! the identifying prefixes. After [`initialize`](ChatSession::initialize) it
//! runs a single `select!` loop: substrate events feed the scheduler,
//! scheduled fetch requests go back out to the substrate, and operator
//! commands arrive over the session command channel. That command channel is
//! the only cross-task synchronization point; everything else happens
//! sequentially on the loop.

use std::io::Write;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use chronochat_core::{
    create_fetch_request_channel, ChatConfig, ChronoChatError, ChronoChatResult, FetchRequestReceiver,
    FetchScheduler, Name, SyncEvent, SyncEventReceiver, SyncSubstrate,
};

// ----------------------------------------------------------------------------
// Session Commands
// ----------------------------------------------------------------------------

/// Operator commands dispatched into the session event loop
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// Publish one chat line under our own sequence
    Publish(String),
    /// Stop the event loop and tear down the subscription
    Leave,
}

pub type SessionCommandSender = mpsc::UnboundedSender<SessionCommand>;
pub type SessionCommandReceiver = mpsc::UnboundedReceiver<SessionCommand>;

pub fn create_session_command_channel() -> (SessionCommandSender, SessionCommandReceiver) {
    mpsc::unbounded_channel()
}

// ----------------------------------------------------------------------------
// Chat Session
// ----------------------------------------------------------------------------

/// One participant's connection to the chat
pub struct ChatSession<S: SyncSubstrate, W: Write> {
    substrate: S,
    scheduler: FetchScheduler<W>,
    config: ChatConfig,
    user_prefix: Name,
    publish_name: Name,
    events: Option<SyncEventReceiver>,
    fetch_requests: FetchRequestReceiver,
    commands: SessionCommandReceiver,
}

impl<S: SyncSubstrate, W: Write> ChatSession<S, W> {
    /// Create a session publishing under `user_prefix`
    ///
    /// Returns the session together with the command sender the input
    /// activity uses to publish and to leave.
    pub fn new(
        substrate: S,
        config: ChatConfig,
        user_prefix: Name,
        output: Arc<Mutex<W>>,
    ) -> (Self, SessionCommandSender) {
        let (request_sender, fetch_requests) = create_fetch_request_channel();
        let scheduler = FetchScheduler::new(&config, request_sender, output);
        let (command_sender, commands) = create_session_command_channel();

        let session = Self {
            substrate,
            scheduler,
            config,
            user_prefix,
            publish_name: Name::new(),
            events: None,
            fetch_requests,
            commands,
        };
        (session, command_sender)
    }

    /// Establish the substrate connection
    ///
    /// Builds the routable publish name (routing prefix first, then the
    /// user's own prefix) and subscribes to the sync scope. Must be called
    /// exactly once, before [`run`](Self::run); a second call fails.
    pub async fn initialize(&mut self) -> ChronoChatResult<()> {
        if self.events.is_some() {
            return Err(ChronoChatError::AlreadyInitialized);
        }

        self.publish_name = self.config.routing_prefix.join(&self.user_prefix);
        let events = self
            .substrate
            .subscribe(&self.config.sync_scope, &self.publish_name)
            .await?;
        self.events = Some(events);

        info!(publish_name = %self.publish_name, sync_scope = %self.config.sync_scope, "session initialized");
        Ok(())
    }

    /// The routable name this session publishes under
    pub fn publish_name(&self) -> &Name {
        &self.publish_name
    }

    /// Run the session event loop until leave or substrate teardown
    ///
    /// Steady-state failures (a fetch the substrate refuses, a render error)
    /// are logged and absorbed so the feed stays responsive; only missing
    /// initialization is fatal here.
    pub async fn run(&mut self) -> ChronoChatResult<()> {
        let mut events = self.events.take().ok_or(ChronoChatError::NotInitialized)?;

        info!("chat session started");
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(SyncEvent::Updates(batch)) => {
                        if let Err(e) = self.scheduler.on_update(&batch) {
                            error!("failed to schedule fetches: {}", e);
                        }
                    }
                    Some(SyncEvent::DataFetched { name, payload }) => {
                        if let Err(e) = self.scheduler.on_fetch_complete(&name, &payload) {
                            error!("failed to render fetched message: {}", e);
                        }
                    }
                    None => {
                        debug!("substrate event stream closed");
                        break;
                    }
                },
                Some(request) = self.fetch_requests.recv() => {
                    // Best effort: a refused fetch is one lost message
                    if let Err(e) = self.substrate.fetch(request).await {
                        warn!("fetch issue failed: {}", e);
                    }
                }
                command = self.commands.recv() => match command {
                    Some(SessionCommand::Publish(body)) => {
                        // Fire-and-forget; the substrate owns sequence and
                        // freshness bookkeeping
                        if let Err(e) = self
                            .substrate
                            .publish(body.as_bytes(), self.config.freshness())
                            .await
                        {
                            warn!("publish failed: {}", e);
                        }
                    }
                    Some(SessionCommand::Leave) | None => {
                        self.substrate.shutdown();
                        break;
                    }
                },
            }
        }
        info!("chat session stopped");
        Ok(())
    }
}
