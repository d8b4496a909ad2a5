// SPDX-License-Identifier: MPL-2.0
//! Toast lifecycle management.
//!
//! The `ToastStore` owns the ordered live set of toasts, the id counter,
//! and a single shared sweep timer. It notifies subscribers on every
//! committed state change so a UI can re-render reactively.

use crate::toast::{Kind, Toast, ToastId};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

/// Lifetime applied when a caller doesn't request one.
pub const DEFAULT_DURATION: Duration = Duration::from_millis(5000);

/// Cadence of the shared sweep timer.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Handle identifying a registered subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Listener = Arc<dyn Fn(&[Toast]) + Send + Sync + 'static>;

/// Shared state behind the store's mutex.
struct State {
    /// Live toasts, insertion order = display order.
    items: Vec<Toast>,
    /// Last-assigned toast id; strictly increasing, never reset.
    next_id: u64,
    /// Handle of the running sweep task, if any.
    ///
    /// Invariant: `Some` whenever `items` is non-empty, `None` whenever it
    /// is empty.
    ticker: Option<JoinHandle<()>>,
    listeners: Vec<(SubscriberId, Listener)>,
    next_subscriber_id: u64,
}

impl State {
    fn listeners(&self) -> Vec<Listener> {
        self.listeners
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }

    /// Aborts and drops the sweep task. Used on the explicit-removal paths;
    /// the sweep task itself exits cooperatively instead.
    fn release_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
            tracing::debug!("sweep timer released");
        }
    }
}

impl Drop for State {
    fn drop(&mut self) {
        // Teardown: the timer must not outlive its store.
        self.release_ticker();
    }
}

/// Owns the live set of toasts and their time-to-live.
///
/// Cloning is cheap and clones share one collection and one timer.
/// Independent `ToastStore::new()` instances share nothing, so tests can
/// run isolated stores side by side.
///
/// `add` and its convenience wrappers spawn the sweep task on the ambient
/// tokio runtime, so they must be called within a runtime context.
#[derive(Clone)]
pub struct ToastStore {
    state: Arc<Mutex<State>>,
}

impl Default for ToastStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ToastStore {
    /// Creates a new empty store. No timer runs until the first insert.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                items: Vec::new(),
                next_id: 0,
                ticker: None,
                listeners: Vec::new(),
                next_subscriber_id: 0,
            })),
        }
    }

    /// Appends a new toast and returns its id, so the caller can later
    /// `remove` it explicitly (e.g. on a dismiss click).
    ///
    /// `duration` of `None` (or zero) means the toast is persistent and is
    /// only ever removed explicitly. If the collection was empty, the sweep
    /// timer is armed. Cannot fail.
    pub fn add(
        &self,
        message: impl Into<String>,
        kind: Kind,
        duration: Option<Duration>,
    ) -> ToastId {
        let (id, snapshot, listeners) = {
            let mut state = lock(&self.state);
            state.next_id += 1;
            let id = ToastId::from_raw(state.next_id);
            let toast = Toast::new(id, message.into(), kind, duration, Instant::now());
            tracing::trace!(id = id.get(), kind = kind.as_str(), "toast added");
            state.items.push(toast);
            if state.ticker.is_none() {
                state.ticker = Some(tokio::spawn(run_ticker(Arc::downgrade(&self.state))));
                tracing::debug!("sweep timer armed");
            }
            (id, state.items.clone(), state.listeners())
        };
        notify(&listeners, &snapshot);
        id
    }

    /// `add` with the success tag and the default duration.
    pub fn success(&self, message: impl Into<String>) -> ToastId {
        self.add(message, Kind::Success, Some(DEFAULT_DURATION))
    }

    /// `add` with the error tag and the default duration.
    pub fn error(&self, message: impl Into<String>) -> ToastId {
        self.add(message, Kind::Error, Some(DEFAULT_DURATION))
    }

    /// `add` with the warning tag and the default duration.
    pub fn warning(&self, message: impl Into<String>) -> ToastId {
        self.add(message, Kind::Warning, Some(DEFAULT_DURATION))
    }

    /// `add` with the info tag and the default duration.
    pub fn info(&self, message: impl Into<String>) -> ToastId {
        self.add(message, Kind::Info, Some(DEFAULT_DURATION))
    }

    /// Removes the toast with the given id if present; silent no-op if
    /// absent. Survivor order is preserved. Releases the sweep timer if the
    /// collection became empty.
    pub fn remove(&self, id: ToastId) {
        let (snapshot, listeners) = {
            let mut state = lock(&self.state);
            let Some(pos) = state.items.iter().position(|t| t.id() == id) else {
                return;
            };
            state.items.remove(pos);
            tracing::trace!(id = id.get(), "toast removed");
            if state.items.is_empty() {
                state.release_ticker();
            }
            (state.items.clone(), state.listeners())
        };
        notify(&listeners, &snapshot);
    }

    /// Removes all toasts unconditionally and releases the sweep timer.
    ///
    /// Subscribers are notified only if the collection was non-empty.
    pub fn clear(&self) {
        let (snapshot, listeners) = {
            let mut state = lock(&self.state);
            if state.items.is_empty() {
                return;
            }
            state.items.clear();
            state.release_ticker();
            tracing::trace!("store cleared");
            (state.items.clone(), state.listeners())
        };
        notify(&listeners, &snapshot);
    }

    /// Returns a snapshot of the live toasts, in display order.
    #[must_use]
    pub fn toasts(&self) -> Vec<Toast> {
        lock(&self.state).items.clone()
    }

    /// Returns a snapshot of the toast with the given id, if live.
    #[must_use]
    pub fn get(&self, id: ToastId) -> Option<Toast> {
        lock(&self.state)
            .items
            .iter()
            .find(|t| t.id() == id)
            .cloned()
    }

    /// Returns the number of live toasts.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.state).items.len()
    }

    /// Returns whether the store holds no toasts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.state).items.is_empty()
    }

    /// Returns whether the sweep timer is currently armed.
    ///
    /// True exactly while the store is non-empty; a leaked timer after the
    /// store empties is a correctness bug.
    #[must_use]
    pub fn is_ticking(&self) -> bool {
        lock(&self.state).ticker.is_some()
    }

    /// Registers a listener invoked with the full current snapshot after
    /// every committed mutation: add, removal, clear, expiry batch, and the
    /// per-tick countdown update of timed toasts.
    ///
    /// Listeners are invoked outside the store lock, so they may call back
    /// into the store. Returns a handle for [`unsubscribe`](Self::unsubscribe).
    pub fn subscribe(&self, listener: impl Fn(&[Toast]) + Send + Sync + 'static) -> SubscriberId {
        let mut state = lock(&self.state);
        state.next_subscriber_id += 1;
        let id = SubscriberId(state.next_subscriber_id);
        state.listeners.push((id, Arc::new(listener)));
        id
    }

    /// Stops delivery to the given subscriber; silent no-op if unknown.
    pub fn unsubscribe(&self, id: SubscriberId) {
        lock(&self.state).listeners.retain(|(sid, _)| *sid != id);
    }
}

/// The critical sections here are short and never cross an await point, so
/// a poisoned lock only means a listener-owning thread panicked; the state
/// itself is still coherent.
fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn notify(listeners: &[Listener], snapshot: &[Toast]) {
    for listener in listeners {
        listener(snapshot);
    }
}

/// The shared sweep task: one per store, armed while the store is
/// non-empty. Holds only a weak reference so a dropped store ends the task
/// on its own.
async fn run_ticker(state: Weak<Mutex<State>>) {
    let mut interval = time::interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
    loop {
        interval.tick().await;
        let Some(shared) = state.upgrade() else {
            break;
        };
        let now = Instant::now();
        let (notification, stop) = {
            let mut state = lock(&shared);
            let mut changed = false;
            for toast in &mut state.items {
                if !toast.is_persistent() {
                    toast.refresh_remaining(now);
                    changed = true;
                }
            }
            // Batch sweep: everything past its deadline leaves in this one
            // state transition, preserving survivor order.
            let before = state.items.len();
            state.items.retain(|t| !t.is_past_deadline(now));
            let expired = before - state.items.len();
            if expired > 0 {
                tracing::trace!(expired, "swept expired toasts");
            }
            let stop = state.items.is_empty();
            if stop {
                // We are the ticker; dropping the handle is enough.
                state.ticker = None;
                tracing::debug!("sweep timer released");
            }
            let notification =
                changed.then(|| (state.items.clone(), state.listeners()));
            (notification, stop)
        };
        if let Some((snapshot, listeners)) = notification {
            notify(&listeners, &snapshot);
        }
        if stop {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_store_is_empty() {
        let store = ToastStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert!(!store.is_ticking());
    }

    #[tokio::test(start_paused = true)]
    async fn add_uses_info_and_default_duration() {
        let store = ToastStore::new();
        store.add("x", Kind::default(), Some(DEFAULT_DURATION));

        let toasts = store.toasts();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].message(), "x");
        assert_eq!(toasts[0].kind(), Kind::Info);
        assert_eq!(toasts[0].remaining(), Duration::from_millis(5000));
    }

    #[tokio::test(start_paused = true)]
    async fn ids_are_strictly_increasing_and_never_reused() {
        let store = ToastStore::new();
        let a = store.info("a");
        let b = store.info("b");
        store.remove(a);
        store.clear();
        let c = store.add("c", Kind::Info, Some(Duration::from_millis(100)));
        // Let "c" expire before the next allocation.
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(store.is_empty());
        let d = store.info("d");

        assert!(a < b && b < c && c < d);
        assert_eq!(a.get(), 1);
        assert_eq!(d.get(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn first_insert_arms_the_timer() {
        let store = ToastStore::new();
        assert!(!store.is_ticking());
        store.info("a");
        assert!(store.is_ticking());
    }

    #[tokio::test(start_paused = true)]
    async fn remove_of_unknown_id_is_a_no_op() {
        let store = ToastStore::new();
        let id = store.info("a");
        store.remove(id);
        // Second removal must be silent.
        store.remove(id);
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn remove_preserves_survivor_order() {
        let store = ToastStore::new();
        let a = store.info("a");
        let b = store.info("b");
        let c = store.info("c");
        store.remove(b);

        let ids: Vec<_> = store.toasts().iter().map(Toast::id).collect();
        assert_eq!(ids, vec![a, c]);
    }

    #[tokio::test(start_paused = true)]
    async fn emptying_the_store_releases_the_timer() {
        let store = ToastStore::new();
        let id = store.info("a");
        store.remove(id);
        assert!(!store.is_ticking());

        store.info("b");
        assert!(store.is_ticking());
        store.clear();
        assert!(!store.is_ticking());
    }

    #[tokio::test(start_paused = true)]
    async fn clear_on_empty_store_does_not_notify() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let store = ToastStore::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.clear();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_receive_full_snapshots() {
        let store = ToastStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        store.subscribe(move |toasts| {
            let messages: Vec<String> = toasts.iter().map(|t| t.message().to_string()).collect();
            lock_vec(&sink).push(messages);
        });

        store.info("a");
        let b = store.info("b");
        store.remove(b);

        let seen: Vec<Vec<String>> = lock_vec(&seen).clone();
        assert_eq!(
            seen,
            vec![
                vec!["a".to_string()],
                vec!["a".to_string(), "b".to_string()],
                vec!["a".to_string()],
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unsubscribed_listener_stops_receiving() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let store = ToastStore::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let sub = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.info("a");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        store.unsubscribe(sub);
        store.info("b");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // Unknown handles are ignored.
        store.unsubscribe(sub);
    }

    #[tokio::test(start_paused = true)]
    async fn multiple_subscribers_are_independent() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let store = ToastStore::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let c1 = Arc::clone(&first);
        let c2 = Arc::clone(&second);
        let sub1 = store.subscribe(move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        });
        store.subscribe(move |_| {
            c2.fetch_add(1, Ordering::SeqCst);
        });

        store.info("a");
        store.unsubscribe(sub1);
        store.info("b");

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn independent_stores_share_nothing() {
        let left = ToastStore::new();
        let right = ToastStore::new();
        let a = left.info("a");
        let b = right.info("b");

        // Separate id spaces and separate timers.
        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 1);
        left.clear();
        assert!(!left.is_ticking());
        assert!(right.is_ticking());
    }

    #[tokio::test(start_paused = true)]
    async fn clones_share_state() {
        let store = ToastStore::new();
        let clone = store.clone();
        let id = store.info("a");
        clone.remove(id);
        assert!(store.is_empty());
        assert!(!store.is_ticking());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_store_ends_the_ticker() {
        {
            let store = ToastStore::new();
            store.add("a", Kind::Info, Some(Duration::from_secs(60)));
        }
        // The task holds only a weak reference; advancing time past several
        // ticks must not panic or leak work.
        tokio::time::sleep(Duration::from_millis(1000)).await;
    }

    fn lock_vec<T>(v: &Mutex<Vec<T>>) -> MutexGuard<'_, Vec<T>> {
        v.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
