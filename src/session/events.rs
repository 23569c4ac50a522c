use super::types::SessionEvent;
use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, MutexGuard,
};
use tokio::sync::mpsc as tokio_mpsc;
use tracing::info;

type SubscriptionId = u64;

/// Filter criteria for event subscriptions
#[derive(Debug, Clone, Copy)]
enum SubscriptionFilter {
    All,
    Errors,
}

impl SubscriptionFilter {
    fn matches(&self, event: &SessionEvent) -> bool {
        match self {
            SubscriptionFilter::All => true,
            SubscriptionFilter::Errors => matches!(event, SessionEvent::Error(_)),
        }
    }
}

struct Subscription {
    filter: SubscriptionFilter,
    tx: tokio_mpsc::UnboundedSender<SessionEvent>,
}

type Subscriptions = Arc<Mutex<HashMap<SubscriptionId, Subscription>>>;

fn lock(subscriptions: &Subscriptions) -> MutexGuard<'_, HashMap<SubscriptionId, Subscription>> {
    subscriptions.lock().unwrap_or_else(|e| e.into_inner())
}

/// Fans session events out to UI subscribers
#[derive(Clone)]
pub struct EventHandle {
    subscriptions: Subscriptions,
    next_id: Arc<AtomicU64>,
}

impl EventHandle {
    /// Create a new event handle and spawn the background task dispatching events
    pub fn new(
        mut events_rx: tokio_mpsc::UnboundedReceiver<SessionEvent>,
        runtime_handle: tokio::runtime::Handle,
    ) -> Self {
        let subscriptions: Subscriptions = Arc::new(Mutex::new(HashMap::new()));
        let subscriptions_clone = subscriptions.clone();

        runtime_handle.spawn(async move {
            while let Some(event) = events_rx.recv().await {
                let mut subs = lock(&subscriptions_clone);

                // If send fails, receiver was dropped
                subs.retain(|_, subscription| {
                    !subscription.filter.matches(&event) || subscription.tx.send(event.clone()).is_ok()
                });
            }
            info!("Event channel closed, exiting");
        });

        Self {
            subscriptions,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    fn subscribe(&self, filter: SubscriptionFilter) -> tokio_mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = tokio_mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        lock(&self.subscriptions).insert(id, Subscription { filter, tx });
        rx
    }

    /// Every event emitted after this call, in emission order; earlier events
    /// are not replayed.
    /// Subscription is automatically removed when the receiver is dropped
    pub fn subscribe_all(&self) -> tokio_mpsc::UnboundedReceiver<SessionEvent> {
        self.subscribe(SubscriptionFilter::All)
    }

    /// Only user-facing error messages
    pub fn subscribe_errors(&self) -> tokio_mpsc::UnboundedReceiver<SessionEvent> {
        self.subscribe(SubscriptionFilter::Errors)
    }
}
