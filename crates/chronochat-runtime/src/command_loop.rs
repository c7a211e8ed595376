//! Interactive command loop and termination protocol
//!
//! Two concurrent activities share one session: the event activity runs
//! [`ChatSession::run`] and processes everything the substrate delivers; the
//! input activity reads operator lines and dispatches them as session
//! commands. The exit command is the sole termination trigger: it makes the
//! event activity's loop return, and the driver waits for both activities
//! before giving control back.

use std::io::Write;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use chronochat_core::{ChronoChatError, ChronoChatResult, SyncSubstrate};

use crate::session::{ChatSession, SessionCommand, SessionCommandSender};

// ----------------------------------------------------------------------------
// Line Dispatch
// ----------------------------------------------------------------------------

/// What one operator line means
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// Publish the trimmed line as a chat message (possibly empty)
    Publish(String),
    /// Terminate the session
    Leave,
}

/// Classify one raw input line
///
/// The exit commands are exact, case-sensitive matches after trimming.
/// Everything else is a message, including a line that trims down to
/// nothing, which is published as an empty message.
pub fn dispatch_line(line: &str) -> InputAction {
    let trimmed = line.trim();
    if trimmed == "leave" || trimmed == "exit" {
        InputAction::Leave
    } else {
        InputAction::Publish(trimmed.to_string())
    }
}

// ----------------------------------------------------------------------------
// Input Activity
// ----------------------------------------------------------------------------

/// Reads operator lines and dispatches them into the session
pub struct CommandLoop<W: Write> {
    commands: SessionCommandSender,
    output: Arc<Mutex<W>>,
}

impl<W: Write> CommandLoop<W> {
    pub fn new(commands: SessionCommandSender, output: Arc<Mutex<W>>) -> Self {
        Self { commands, output }
    }

    /// Consume `input` line by line until the exit command or end of input
    ///
    /// Each published line is echoed locally as `me : <line>` before being
    /// handed to the session; the echo and received-message rendering share
    /// one output lock, so lines never interleave.
    pub async fn run<R>(&mut self, input: R) -> ChronoChatResult<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        loop {
            match lines.next_line().await? {
                Some(line) => match dispatch_line(&line) {
                    InputAction::Leave => {
                        self.send(SessionCommand::Leave)?;
                        return Ok(());
                    }
                    InputAction::Publish(body) => {
                        {
                            let mut output = self
                                .output
                                .lock()
                                .map_err(|_| ChronoChatError::channel("output lock poisoned"))?;
                            writeln!(output, "me : {}", body)?;
                        }
                        self.send(SessionCommand::Publish(body))?;
                    }
                },
                None => {
                    // A closed input stream can never produce the exit
                    // command, so treat it as one
                    debug!("input stream closed, leaving");
                    self.send(SessionCommand::Leave)?;
                    return Ok(());
                }
            }
        }
    }

    fn send(&self, command: SessionCommand) -> ChronoChatResult<()> {
        self.commands
            .send(command)
            .map_err(|_| ChronoChatError::channel("session command receiver dropped"))
    }
}

// ----------------------------------------------------------------------------
// Top-Level Driver
// ----------------------------------------------------------------------------

/// Run one chat session to completion
///
/// Initializes the session, spawns its event loop, and runs the input loop
/// on the calling task. Returns only after both activities have finished; if
/// the input loop fails, the event activity is still told to leave rather
/// than being abandoned.
pub async fn run_chat<S, W, R>(
    mut session: ChatSession<S, W>,
    commands: SessionCommandSender,
    output: Arc<Mutex<W>>,
    input: R,
) -> ChronoChatResult<()>
where
    S: SyncSubstrate + 'static,
    W: Write + Send + 'static,
    R: AsyncBufRead + Unpin,
{
    session.initialize().await?;

    let event_activity = tokio::spawn(async move { session.run().await });

    let mut input_loop = CommandLoop::new(commands.clone(), output);
    let input_result = input_loop.run(input).await;
    if input_result.is_err() {
        let _ = commands.send(SessionCommand::Leave);
    }

    let event_result = event_activity
        .await
        .map_err(|e| ChronoChatError::channel(format!("event activity failed: {}", e)))?;
    input_result.and(event_result)
}
