//! Core types for the chat client
//!
//! Participants, sequence numbers, notification ranges, and the ephemeral
//! fetch-request value handed to the substrate.

use core::fmt;
use serde::{Deserialize, Serialize};

use crate::config::SPEAKER_COMPONENT_INDEX;
use crate::errors::{ChronoChatError, ChronoChatResult};
use crate::name::Name;

// ----------------------------------------------------------------------------
// Participant Identifier
// ----------------------------------------------------------------------------

/// Unique identifier for a chat participant: their routable publish prefix
///
/// The human-readable label is the username component of that prefix, located
/// at a fixed structural position ([`SPEAKER_COMPONENT_INDEX`]). That index
/// assumes the standard three-component routing prefix; deployments with a
/// different routing depth will extract the wrong component. Known fragility,
/// kept rather than guessed around.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticipantId(Name);

impl ParticipantId {
    /// Wrap a routable publish prefix
    pub fn new(name: Name) -> Self {
        Self(name)
    }

    /// Derive the participant from a fetched item's full data name
    ///
    /// The data name is the publish prefix followed by sequencing components
    /// (`/ndn/edu/colostate/alice/7`); everything past the username is
    /// dropped. Names too short to carry a username are rejected.
    pub fn from_data_name(name: &Name) -> ChronoChatResult<Self> {
        let prefix = name.prefix(SPEAKER_COMPONENT_INDEX + 1).ok_or_else(|| {
            ChronoChatError::invalid_name(name.to_string(), "data name too short for a speaker")
        })?;
        Ok(Self(prefix))
    }

    /// The underlying publish prefix
    pub fn name(&self) -> &Name {
        &self.0
    }

    /// Human-readable label: the username component of the publish prefix
    pub fn label(&self) -> &str {
        self.0.component(SPEAKER_COMPONENT_INDEX).unwrap_or("unknown")
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ----------------------------------------------------------------------------
// Sequencing
// ----------------------------------------------------------------------------

/// Per-participant message sequence number
///
/// Starts at 1 and increases by exactly one per published message. The
/// substrate owns the bookkeeping; the client only windows over ranges.
pub type SequenceNumber = u64;

/// Sequence numbers newly visible for one participant since the previous
/// notification, inclusive on both ends (`low <= high`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingRange {
    pub participant: ParticipantId,
    pub low: SequenceNumber,
    pub high: SequenceNumber,
}

impl MissingRange {
    pub fn new(participant: ParticipantId, low: SequenceNumber, high: SequenceNumber) -> Self {
        debug_assert!(low <= high, "inverted missing range");
        Self {
            participant,
            low,
            high,
        }
    }
}

// ----------------------------------------------------------------------------
// Messages and Fetches
// ----------------------------------------------------------------------------

/// One decoded chat line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub speaker: ParticipantId,
    pub body: String,
}

impl ChatMessage {
    /// Decode a fetched item into a displayable message
    ///
    /// Payloads that are not valid UTF-8, and names too short to carry a
    /// speaker, are decode failures; callers drop those items.
    pub fn decode(name: &Name, payload: &[u8]) -> ChronoChatResult<Self> {
        let speaker = ParticipantId::from_data_name(name)?;
        let body = String::from_utf8(payload.to_vec()).map_err(|_| {
            ChronoChatError::MalformedPayload {
                reason: format!("non-UTF-8 payload under {}", name),
            }
        })?;
        Ok(Self { speaker, body })
    }
}

/// One bounded-retry fetch handed to the substrate
///
/// Ephemeral: exists only while the fetch is in flight. The substrate retries
/// internally up to `retry_budget` attempts, then gives up silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub participant: ParticipantId,
    pub sequence: SequenceNumber,
    pub retry_budget: u32,
}
