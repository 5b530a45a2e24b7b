//! Ordered writes to the draft on the backend.
//!
//! Keystrokes are debounced into at most one pending write. Every write,
//! debounced or immediate, goes through one send lock, and a debounced write
//! only goes out if nothing newer was scheduled in the meantime. Together
//! this makes the last scheduled write the last one the backend sees.

use mestermind_client::{ApiError, MarketplaceApi};
use mestermind_types::{Answers, CustomerRequest, CustomerRequestUpdate};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(450);

struct PendingTimer {
    handle: JoinHandle<()>,
    /// Set once the timer fired and the write is committed to being sent
    sending: Arc<AtomicBool>,
}

struct Shared {
    api: Arc<dyn MarketplaceApi>,
    request_id: i64,
    generation: AtomicU64,
    latest: Mutex<Option<(u64, Answers)>>,
    send_lock: tokio::sync::Mutex<()>,
    active: AtomicBool,
}

impl Shared {
    fn take_latest_if(&self, generation: u64) -> Option<Answers> {
        let mut latest = self.latest.lock().ok()?;
        match latest.as_ref() {
            Some((g, _)) if *g == generation => latest.take().map(|(_, answers)| answers),
            _ => None,
        }
    }

    fn clear_latest(&self) {
        if let Ok(mut latest) = self.latest.lock() {
            *latest = None;
        }
    }
}

pub struct Autosaver {
    shared: Arc<Shared>,
    delay: Duration,
    pending: Mutex<Option<PendingTimer>>,
}

impl Autosaver {
    pub fn new(api: Arc<dyn MarketplaceApi>, request_id: i64, delay: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                api,
                request_id,
                generation: AtomicU64::new(0),
                latest: Mutex::new(None),
                send_lock: tokio::sync::Mutex::new(()),
                active: AtomicBool::new(true),
            }),
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn request_id(&self) -> i64 {
        self.shared.request_id
    }

    pub fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::SeqCst)
    }

    /// Queue `answers` to be saved once edits pause for the debounce delay.
    /// Replaces any write still waiting on its timer.
    pub fn schedule(&self, answers: Answers) {
        if !self.is_active() {
            tracing::debug!(request_id = self.request_id(), "Autosave ignored after shutdown");
            return;
        }

        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut latest) = self.shared.latest.lock() {
            *latest = Some((generation, answers));
        }

        let sending = Arc::new(AtomicBool::new(false));
        let handle = tokio::spawn(Self::run_timer(
            self.shared.clone(),
            self.delay,
            generation,
            sending.clone(),
        ));

        self.replace_pending(Some(PendingTimer { handle, sending }));
    }

    async fn run_timer(shared: Arc<Shared>, delay: Duration, generation: u64, sending: Arc<AtomicBool>) {
        tokio::time::sleep(delay).await;
        sending.store(true, Ordering::SeqCst);

        let _guard = shared.send_lock.lock().await;
        if !shared.active.load(Ordering::SeqCst) {
            return;
        }
        let Some(answers) = shared.take_latest_if(generation) else {
            tracing::debug!(generation, "Autosave superseded before sending");
            return;
        };

        let update = CustomerRequestUpdate::new().answers(answers);
        match shared.api.update_customer_request(shared.request_id, &update).await {
            Ok(_) => {
                tracing::debug!(request_id = shared.request_id, generation, "Draft answers autosaved");
            }
            Err(e) => {
                tracing::warn!(
                    request_id = shared.request_id,
                    error = %e,
                    "Autosave failed; the next save will carry the answers"
                );
            }
        }
    }

    /// Aborts the pending timer unless its write is already under way
    fn replace_pending(&self, next: Option<PendingTimer>) {
        let Ok(mut pending) = self.pending.lock() else {
            return;
        };
        if let Some(previous) = pending.take() {
            if !previous.sending.load(Ordering::SeqCst) {
                previous.handle.abort();
            }
        }
        *pending = next;
    }

    /// Drops the debounced write, if any, without sending it
    pub fn cancel(&self) {
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        self.shared.clear_latest();
        self.replace_pending(None);
    }

    /// Sends the debounced write now instead of waiting for its timer.
    /// Returns `None` when nothing was pending.
    pub async fn flush(&self) -> Result<Option<CustomerRequest>, ApiError> {
        let answers = self
            .shared
            .latest
            .lock()
            .ok()
            .and_then(|mut latest| latest.take())
            .map(|(_, answers)| answers);
        self.replace_pending(None);

        let Some(answers) = answers else {
            return Ok(None);
        };
        if !self.is_active() {
            return Ok(None);
        }

        let _guard = self.shared.send_lock.lock().await;
        let update = CustomerRequestUpdate::new().answers(answers);
        let request = self
            .shared
            .api
            .update_customer_request(self.shared.request_id, &update)
            .await?;
        tracing::debug!(request_id = self.request_id(), "Pending autosave flushed");
        Ok(Some(request))
    }

    /// Drops any debounced write and sends `update` right away, after any
    /// write already in flight.
    pub async fn write_through(
        &self,
        update: CustomerRequestUpdate,
    ) -> Result<CustomerRequest, ApiError> {
        self.cancel();

        let _guard = self.shared.send_lock.lock().await;
        self.shared
            .api
            .update_customer_request(self.shared.request_id, &update)
            .await
    }

    /// Discards pending writes and refuses new ones
    pub fn shutdown(&self) {
        self.shared.active.store(false, Ordering::SeqCst);
        self.shared.clear_latest();
        self.replace_pending(None);
    }
}

impl Drop for Autosaver {
    fn drop(&mut self) {
        self.shutdown();
    }
}
