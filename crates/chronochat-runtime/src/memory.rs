//! In-process synchronization substrate
//!
//! A loopback [`SyncSubstrate`] holding everything in shared memory. It backs
//! the standalone CLI mode and gives tests full control over the substrate
//! side of the protocol: seed items for remote participants, deliver
//! notification batches, and observe every fetch and publish the client
//! issues. A networked substrate implements the same trait out of tree.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, trace};

use chronochat_core::{
    create_sync_event_channel, ChronoChatError, ChronoChatResult, FetchRequest, MissingRange, Name,
    SequenceNumber, SyncEvent, SyncEventReceiver, SyncEventSender, SyncSubstrate,
};

// ----------------------------------------------------------------------------
// Memory Substrate
// ----------------------------------------------------------------------------

/// Shared-memory substrate double
///
/// Clonable handle over shared state, so a test (or the CLI) can keep a
/// handle for driving and observation after moving the substrate into a
/// session.
#[derive(Clone, Default)]
pub struct MemorySubstrate {
    state: Arc<Mutex<SubstrateState>>,
}

#[derive(Default)]
struct SubstrateState {
    events: Option<SyncEventSender>,
    publish_prefix: Option<Name>,
    shut_down: bool,
    /// Our own sequence counter; the first published item is sequence 1
    last_sequence: SequenceNumber,
    /// Stored items, keyed by publish prefix and sequence number
    items: HashMap<(Name, SequenceNumber), Vec<u8>>,
    issued: Vec<FetchRequest>,
    published: Vec<(String, Duration)>,
}

impl MemorySubstrate {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, SubstrateState> {
        self.state.lock().unwrap()
    }

    /// Store an item under a (remote) participant's publish prefix
    pub fn seed(&self, prefix: &Name, sequence: SequenceNumber, payload: &[u8]) {
        self.state()
            .items
            .insert((prefix.clone(), sequence), payload.to_vec());
    }

    /// Deliver one notification batch to the subscriber, if any
    pub fn notify(&self, batch: Vec<MissingRange>) {
        if let Some(events) = &self.state().events {
            let _ = events.send(SyncEvent::Updates(batch));
        }
    }

    /// Every fetch request the client has issued, in issue order
    pub fn issued_fetches(&self) -> Vec<FetchRequest> {
        self.state().issued.clone()
    }

    /// Every published body with its freshness hint, in publish order
    pub fn published(&self) -> Vec<(String, Duration)> {
        self.state().published.clone()
    }

    /// The publish prefix of the active subscription, if one exists
    pub fn subscribed_prefix(&self) -> Option<Name> {
        self.state().publish_prefix.clone()
    }

    pub fn is_shut_down(&self) -> bool {
        self.state().shut_down
    }
}

#[async_trait]
impl SyncSubstrate for MemorySubstrate {
    async fn subscribe(
        &mut self,
        sync_scope: &Name,
        publish_prefix: &Name,
    ) -> ChronoChatResult<SyncEventReceiver> {
        let mut state = self.state();
        if state.events.is_some() {
            return Err(ChronoChatError::Subscribe {
                reason: format!("already subscribed to {}", sync_scope),
            });
        }

        let (sender, receiver) = create_sync_event_channel();
        state.events = Some(sender);
        state.publish_prefix = Some(publish_prefix.clone());
        debug!(%sync_scope, %publish_prefix, "memory substrate subscribed");
        Ok(receiver)
    }

    async fn fetch(&self, request: FetchRequest) -> ChronoChatResult<()> {
        let data_name = request
            .participant
            .name()
            .clone()
            .append(request.sequence.to_string())?;

        let mut state = self.state();
        state.issued.push(request.clone());

        let key = (request.participant.name().clone(), request.sequence);
        match (&state.events, state.items.get(&key)) {
            (Some(events), Some(payload)) => {
                let _ = events.send(SyncEvent::DataFetched {
                    name: data_name,
                    payload: payload.clone(),
                });
            }
            // Missing item or torn-down subscription: the retry budget is
            // spent off-screen and the fetch drops silently
            _ => trace!(%data_name, "fetch found nothing, dropping"),
        }
        Ok(())
    }

    async fn publish(&self, body: &[u8], freshness: Duration) -> ChronoChatResult<()> {
        let mut state = self.state();
        let prefix = state
            .publish_prefix
            .clone()
            .ok_or(ChronoChatError::NotInitialized)?;

        state.last_sequence += 1;
        let sequence = state.last_sequence;
        state.items.insert((prefix, sequence), body.to_vec());
        state
            .published
            .push((String::from_utf8_lossy(body).into_owned(), freshness));
        trace!(sequence, "published item");
        Ok(())
    }

    fn shutdown(&self) {
        let mut state = self.state();
        // Dropping the sender closes the subscriber's event stream
        state.events = None;
        state.shut_down = true;
        debug!("memory substrate shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronochat_core::ParticipantId;

    fn prefix(user: &str) -> Name {
        Name::from_uri(&format!("/ndn/edu/colostate/{}", user)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_serves_seeded_items() {
        let mut substrate = MemorySubstrate::new();
        let mut events = substrate
            .subscribe(&Name::from_uri("/scope").unwrap(), &prefix("alice"))
            .await
            .unwrap();

        substrate.seed(&prefix("bob"), 4, b"hi");
        substrate
            .fetch(FetchRequest {
                participant: ParticipantId::new(prefix("bob")),
                sequence: 4,
                retry_budget: 2,
            })
            .await
            .unwrap();

        match events.try_recv().unwrap() {
            SyncEvent::DataFetched { name, payload } => {
                assert_eq!(name.to_string(), "/ndn/edu/colostate/bob/4");
                assert_eq!(payload, b"hi");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_of_absent_item_drops_silently() {
        let mut substrate = MemorySubstrate::new();
        let mut events = substrate
            .subscribe(&Name::from_uri("/scope").unwrap(), &prefix("alice"))
            .await
            .unwrap();

        substrate
            .fetch(FetchRequest {
                participant: ParticipantId::new(prefix("bob")),
                sequence: 9,
                retry_budget: 2,
            })
            .await
            .unwrap();

        assert!(events.try_recv().is_err());
        assert_eq!(substrate.issued_fetches().len(), 1);
    }

    #[tokio::test]
    async fn test_publish_assigns_sequence_numbers_from_one() {
        let mut substrate = MemorySubstrate::new();
        let _events = substrate
            .subscribe(&Name::from_uri("/scope").unwrap(), &prefix("alice"))
            .await
            .unwrap();

        substrate
            .publish(b"first", Duration::from_millis(4000))
            .await
            .unwrap();
        substrate
            .publish(b"second", Duration::from_millis(4000))
            .await
            .unwrap();

        let state = substrate.state();
        assert!(state.items.contains_key(&(prefix("alice"), 1)));
        assert!(state.items.contains_key(&(prefix("alice"), 2)));
    }

    #[tokio::test]
    async fn test_publish_before_subscribe_fails() {
        let substrate = MemorySubstrate::new();
        assert!(substrate
            .publish(b"early", Duration::from_millis(4000))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_shutdown_closes_the_event_stream() {
        let mut substrate = MemorySubstrate::new();
        let mut events = substrate
            .subscribe(&Name::from_uri("/scope").unwrap(), &prefix("alice"))
            .await
            .unwrap();

        substrate.shutdown();
        assert!(substrate.is_shut_down());
        assert!(events.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_double_subscribe_fails() {
        let mut substrate = MemorySubstrate::new();
        let scope = Name::from_uri("/scope").unwrap();
        let _events = substrate.subscribe(&scope, &prefix("alice")).await.unwrap();
        assert!(substrate.subscribe(&scope, &prefix("alice")).await.is_err());
    }
}
