//! Update-driven fetch scheduling
//!
//! The scheduler consumes notification batches, windows each range down to
//! the most recent items, and issues bounded-retry fetch requests. Completed
//! fetches are rendered straight to the output stream in completion order.
//!
//! ## Windowing policy
//!
//! A participant that has been publishing while this client was offline can
//! show up with an arbitrarily large range. Fetching all of it would make
//! work and memory per notification unbounded, so only the most recent
//! [`FETCH_WINDOW`](crate::config::FETCH_WINDOW) sequence numbers of each
//! range are fetched; older items are permanently skipped. Recency wins over
//! completeness, deliberately: there is no backfill and no deferral queue.
//!
//! ## Statelessness
//!
//! Nothing is retained across notifications. The substrate alone is
//! responsible for not re-delivering acknowledged ranges; a re-delivered
//! batch is fetched again.

use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing::{debug, trace};

use crate::config::ChatConfig;
use crate::errors::{ChronoChatError, ChronoChatResult};
use crate::events::FetchRequestSender;
use crate::name::Name;
use crate::types::{ChatMessage, FetchRequest, MissingRange};

// ----------------------------------------------------------------------------
// Fetch Scheduler
// ----------------------------------------------------------------------------

/// Windows notification batches into bounded-retry fetch requests and renders
/// completed fetches
///
/// The output writer is shared with the input loop (which echoes the
/// operator's own lines), so all line writes go through one mutex.
pub struct FetchScheduler<W: Write> {
    window: u64,
    retry_budget: u32,
    requests: FetchRequestSender,
    output: Arc<Mutex<W>>,
}

impl<W: Write> FetchScheduler<W> {
    pub fn new(config: &ChatConfig, requests: FetchRequestSender, output: Arc<Mutex<W>>) -> Self {
        Self {
            window: config.window.max(1),
            retry_budget: config.retries,
            requests,
            output,
        }
    }

    /// Issue windowed fetches for one notification batch
    ///
    /// Ranges are processed independently, in batch order. An empty batch is
    /// a no-op. Never blocks: requests go into an unbounded channel.
    pub fn on_update(&self, batch: &[MissingRange]) -> ChronoChatResult<()> {
        for range in batch {
            let start = range.high.saturating_sub(self.window - 1).max(range.low);
            if start > range.low {
                debug!(
                    participant = %range.participant,
                    skipped = start - range.low,
                    "range exceeds fetch window, skipping older items"
                );
            }

            for sequence in start..=range.high {
                let request = FetchRequest {
                    participant: range.participant.clone(),
                    sequence,
                    retry_budget: self.retry_budget,
                };
                self.requests
                    .send(request)
                    .map_err(|_| ChronoChatError::channel("fetch request receiver dropped"))?;
            }
            trace!(
                participant = %range.participant,
                low = range.low,
                high = range.high,
                fetched_from = start,
                "issued fetches for range"
            );
        }
        Ok(())
    }

    /// Render one completed fetch
    ///
    /// Display order is completion order; no reordering toward sequence
    /// order is attempted. Items that fail to decode are dropped, matching
    /// the silent-drop semantics of exhausted fetches.
    pub fn on_fetch_complete(&self, name: &Name, payload: &[u8]) -> ChronoChatResult<()> {
        let message = match ChatMessage::decode(name, payload) {
            Ok(message) => message,
            Err(error) => {
                debug!(%name, %error, "dropping undecodable fetched item");
                return Ok(());
            }
        };

        let mut output = self
            .output
            .lock()
            .map_err(|_| ChronoChatError::channel("output lock poisoned"))?;
        writeln!(output, "{} : {}", message.speaker, message.body)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{create_fetch_request_channel, FetchRequestReceiver};
    use crate::types::ParticipantId;

    fn participant(user: &str) -> ParticipantId {
        ParticipantId::new(Name::from_uri(&format!("/ndn/edu/colostate/{}", user)).unwrap())
    }

    fn range(user: &str, low: u64, high: u64) -> MissingRange {
        MissingRange::new(participant(user), low, high)
    }

    fn scheduler() -> (FetchScheduler<Vec<u8>>, FetchRequestReceiver, Arc<Mutex<Vec<u8>>>) {
        let (sender, receiver) = create_fetch_request_channel();
        let output = Arc::new(Mutex::new(Vec::new()));
        let scheduler = FetchScheduler::new(&ChatConfig::default(), sender, output.clone());
        (scheduler, receiver, output)
    }

    fn drain(receiver: &mut FetchRequestReceiver) -> Vec<FetchRequest> {
        let mut requests = Vec::new();
        while let Ok(request) = receiver.try_recv() {
            requests.push(request);
        }
        requests
    }

    fn rendered(output: &Arc<Mutex<Vec<u8>>>) -> String {
        String::from_utf8(output.lock().unwrap().clone()).unwrap()
    }

    #[test]
    fn test_small_range_fetches_everything_ascending() {
        let (scheduler, mut receiver, _) = scheduler();
        scheduler.on_update(&[range("alice", 5, 7)]).unwrap();

        let requests = drain(&mut receiver);
        assert_eq!(
            requests.iter().map(|r| r.sequence).collect::<Vec<_>>(),
            vec![5, 6, 7]
        );
        assert!(requests.iter().all(|r| r.participant == participant("alice")));
    }

    #[test]
    fn test_large_range_fetches_only_most_recent_window() {
        let (scheduler, mut receiver, _) = scheduler();
        scheduler.on_update(&[range("bob", 1, 25)]).unwrap();

        let requests = drain(&mut receiver);
        assert_eq!(
            requests.iter().map(|r| r.sequence).collect::<Vec<_>>(),
            (16..=25).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_exact_window_sized_range_fetches_everything() {
        let (scheduler, mut receiver, _) = scheduler();
        scheduler.on_update(&[range("alice", 1, 10)]).unwrap();

        let sequences: Vec<_> = drain(&mut receiver).iter().map(|r| r.sequence).collect();
        assert_eq!(sequences, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_batch_issues_nothing() {
        let (scheduler, mut receiver, _) = scheduler();
        scheduler.on_update(&[]).unwrap();
        assert!(drain(&mut receiver).is_empty());
    }

    #[test]
    fn test_multiple_participants_windowed_independently_in_batch_order() {
        let (scheduler, mut receiver, _) = scheduler();
        scheduler
            .on_update(&[range("alice", 5, 7), range("bob", 1, 25)])
            .unwrap();

        let requests = drain(&mut receiver);
        let alice: Vec<_> = requests
            .iter()
            .filter(|r| r.participant == participant("alice"))
            .map(|r| r.sequence)
            .collect();
        let bob: Vec<_> = requests
            .iter()
            .filter(|r| r.participant == participant("bob"))
            .map(|r| r.sequence)
            .collect();

        assert_eq!(alice, vec![5, 6, 7]);
        assert_eq!(bob, (16..=25).collect::<Vec<_>>());
        // Batch order: all of alice's requests precede bob's
        assert_eq!(requests[0].participant, participant("alice"));
        assert_eq!(requests[3].participant, participant("bob"));
    }

    #[test]
    fn test_every_request_carries_the_fixed_retry_budget() {
        let (scheduler, mut receiver, _) = scheduler();
        scheduler.on_update(&[range("alice", 1, 25)]).unwrap();
        assert!(drain(&mut receiver).iter().all(|r| r.retry_budget == 2));
    }

    #[test]
    fn test_repeated_batches_are_fetched_again() {
        // Statelessness across notifications is a property, not a bug: the
        // substrate owns dedup.
        let (scheduler, mut receiver, _) = scheduler();
        let batch = [range("alice", 5, 7)];
        scheduler.on_update(&batch).unwrap();
        scheduler.on_update(&batch).unwrap();
        assert_eq!(drain(&mut receiver).len(), 6);
    }

    #[test]
    fn test_completed_fetch_renders_speaker_and_body() {
        let (scheduler, _receiver, output) = scheduler();
        let name = Name::from_uri("/ndn/edu/colostate/alice/7").unwrap();
        scheduler.on_fetch_complete(&name, b"hello there").unwrap();
        assert_eq!(rendered(&output), "alice : hello there\n");
    }

    #[test]
    fn test_undecodable_payload_is_dropped_without_error() {
        let (scheduler, _receiver, output) = scheduler();
        let name = Name::from_uri("/ndn/edu/colostate/alice/7").unwrap();
        scheduler.on_fetch_complete(&name, &[0xff, 0xfe]).unwrap();
        assert_eq!(rendered(&output), "");
    }

    #[test]
    fn test_short_data_name_is_dropped_without_error() {
        let (scheduler, _receiver, output) = scheduler();
        let name = Name::from_uri("/ndn/edu").unwrap();
        scheduler.on_fetch_complete(&name, b"body").unwrap();
        assert_eq!(rendered(&output), "");
    }
}
