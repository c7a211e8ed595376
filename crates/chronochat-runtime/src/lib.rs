//! ChronoChat Runtime
//!
//! Session orchestration for the ChronoChat client: the [`ChatSession`]
//! event loop, the interactive [`CommandLoop`] with its termination
//! protocol, and the in-process [`MemorySubstrate`] used by tests and the
//! standalone CLI.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod command_loop;
pub mod memory;
pub mod session;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use command_loop::{dispatch_line, run_chat, CommandLoop, InputAction};
pub use memory::MemorySubstrate;
pub use session::{
    create_session_command_channel, ChatSession, SessionCommand, SessionCommandReceiver,
    SessionCommandSender,
};
