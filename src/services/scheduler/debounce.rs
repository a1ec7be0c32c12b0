use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::debug;

/// The live delayed action for one key
struct PendingSlot {
    token: u64,
    anchor: Option<i64>,
    handle: JoinHandle<()>,
}

/// Handed to a firing action so it can check, right before any visible side
/// effect, that it has not been superseded by a newer `arm` for the same key.
pub struct SlotGuard<K>
where
    K: Eq + Hash,
{
    key: K,
    token: u64,
    slots: Arc<DashMap<K, PendingSlot>>,
}

impl<K> SlotGuard<K>
where
    K: Eq + Hash,
{
    /// True while this action is still the registered slot for its key
    pub fn is_current(&self) -> bool {
        self.slots
            .get(&self.key)
            .map(|slot| slot.token == self.token)
            .unwrap_or(false)
    }
}

/// Single-slot delayed-action registry keyed by `K`.
///
/// Arming a key replaces whatever was pending for it, so a burst of events
/// collapses into one action fired `delay` after the last event and anchored
/// to that event. Slots for different keys are independent.
pub struct DebounceScheduler<K>
where
    K: Eq + Hash,
{
    slots: Arc<DashMap<K, PendingSlot>>,
    next_token: AtomicU64,
}

impl<K> DebounceScheduler<K>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            slots: Arc::new(DashMap::new()),
            next_token: AtomicU64::new(1),
        }
    }

    /// Schedule `action(anchor, guard)` to run after `delay` of quiet for `key`,
    /// cancelling any action already pending for it.
    ///
    /// The previous task is aborted, and its guard stops reporting current, so
    /// an action that already woke up suppresses its output.
    pub fn arm<F, Fut>(&self, key: K, delay: Duration, anchor: Option<i64>, action: F)
    where
        F: FnOnce(Option<i64>, SlotGuard<K>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let slots = Arc::clone(&self.slots);
        let guard = SlotGuard {
            key: key.clone(),
            token,
            slots: Arc::clone(&self.slots),
        };

        // Holding the entry keeps install/cancel for this key atomic
        let entry = self.slots.entry(key.clone());

        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            if !guard.is_current() {
                debug!("Slot {:?} superseded before firing", task_key);
                return;
            }

            debug!("Slot {:?} firing", task_key);
            action(anchor, guard).await;

            // Only remove the slot if no newer arm replaced it meanwhile
            slots.remove_if(&task_key, |_, slot| slot.token == token);
        });

        let slot = PendingSlot {
            token,
            anchor,
            handle,
        };
        let previous = match entry {
            Entry::Occupied(mut occupied) => Some(occupied.insert(slot)),
            Entry::Vacant(vacant) => {
                vacant.insert(slot);
                None
            }
        };

        match previous {
            Some(previous) => {
                debug!(
                    "Slot {:?} re-armed: anchor {:?} -> {:?}",
                    key, previous.anchor, anchor
                );
                previous.handle.abort();
            }
            None => debug!("Slot {:?} armed with anchor {:?}", key, anchor),
        }
    }

    /// Cancel the pending action for `key`. Returns whether one existed.
    pub fn cancel(&self, key: &K) -> bool {
        match self.slots.remove(key) {
            Some((_, slot)) => {
                slot.handle.abort();
                debug!("Slot {:?} cancelled", key);
                true
            }
            None => false,
        }
    }

    /// Cancel every pending action whose key matches `predicate`
    pub fn cancel_where(&self, predicate: impl Fn(&K) -> bool) -> usize {
        let keys: Vec<K> = self
            .slots
            .iter()
            .filter(|entry| predicate(entry.key()))
            .map(|entry| entry.key().clone())
            .collect();

        keys.iter().filter(|key| self.cancel(key)).count()
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.slots.contains_key(key)
    }

    /// Anchor the pending action for `key` will reply to
    pub fn anchor_of(&self, key: &K) -> Option<i64> {
        self.slots.get(key).and_then(|slot| slot.anchor)
    }

    pub fn pending_count(&self) -> usize {
        self.slots.len()
    }
}

impl<K> Default for DebounceScheduler<K>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::time::{sleep, Instant};

    type Fired = Arc<Mutex<Vec<(Option<i64>, u64)>>>;

    /// Arm `key` with an action that records its anchor and fire time
    fn arm_recording(
        scheduler: &DebounceScheduler<u32>,
        fired: &Fired,
        start: Instant,
        key: u32,
        delay: u64,
        anchor: i64,
    ) {
        let fired = Arc::clone(fired);
        scheduler.arm(key, Duration::from_secs(delay), Some(anchor), move |anchor, guard| {
            async move {
                if guard.is_current() {
                    fired.lock().unwrap().push((anchor, start.elapsed().as_secs()));
                }
            }
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_fires_once_with_last_anchor() {
        let scheduler = DebounceScheduler::new();
        let fired: Fired = Arc::default();
        let start = Instant::now();

        arm_recording(&scheduler, &fired, start, 1, 10, 100);
        sleep(Duration::from_secs(3)).await;
        arm_recording(&scheduler, &fired, start, 1, 10, 200);
        assert_eq!(scheduler.anchor_of(&1), Some(200));

        sleep(Duration::from_secs(30)).await;

        let fired = fired.lock().unwrap();
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0], (Some(200), 13));
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_single_fire() {
        let scheduler = DebounceScheduler::new();
        let fired: Fired = Arc::default();
        let start = Instant::now();

        for anchor in 1..=6 {
            arm_recording(&scheduler, &fired, start, 7, 5, anchor);
            sleep(Duration::from_secs(2)).await;
        }
        sleep(Duration::from_secs(20)).await;

        let fired = fired.lock().unwrap();
        assert_eq!(fired.len(), 1);
        // Last arm happened at +10s
        assert_eq!(fired[0], (Some(6), 15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_coalescing_across_completed_fire() {
        let scheduler = DebounceScheduler::new();
        let fired: Fired = Arc::default();
        let start = Instant::now();

        arm_recording(&scheduler, &fired, start, 1, 5, 1);
        sleep(Duration::from_secs(6)).await;
        assert!(!scheduler.is_pending(&1));

        arm_recording(&scheduler, &fired, start, 1, 5, 2);
        sleep(Duration::from_secs(6)).await;

        let anchors: Vec<_> = fired.lock().unwrap().iter().map(|(a, _)| *a).collect();
        assert_eq!(anchors, vec![Some(1), Some(2)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let scheduler = DebounceScheduler::new();
        let fired: Fired = Arc::default();
        let start = Instant::now();

        arm_recording(&scheduler, &fired, start, 1, 10, 1);
        arm_recording(&scheduler, &fired, start, 2, 5, 2);
        assert_eq!(scheduler.pending_count(), 2);

        sleep(Duration::from_secs(11)).await;

        let fired = fired.lock().unwrap();
        assert_eq!(*fired, vec![(Some(2), 5), (Some(1), 10)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_fire() {
        let scheduler = DebounceScheduler::new();
        let fired: Fired = Arc::default();
        let start = Instant::now();

        arm_recording(&scheduler, &fired, start, 1, 5, 1);
        arm_recording(&scheduler, &fired, start, 2, 5, 2);
        assert!(scheduler.cancel(&1));
        assert!(!scheduler.cancel(&1));
        assert_eq!(scheduler.cancel_where(|k| *k == 2), 1);

        sleep(Duration::from_secs(10)).await;
        assert!(fired.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_action_mid_flight_stays_silent() {
        let scheduler = Arc::new(DebounceScheduler::new());
        let outputs = Arc::new(Mutex::new(Vec::new()));

        // First action is slow (like a generator call) and re-checks before output
        let out = Arc::clone(&outputs);
        scheduler.arm(1u32, Duration::from_secs(1), Some(1), move |anchor, guard| {
            async move {
                sleep(Duration::from_secs(5)).await;
                if guard.is_current() {
                    out.lock().unwrap().push(anchor);
                }
            }
        });

        // Let it start firing, then supersede it
        sleep(Duration::from_secs(2)).await;
        let out = Arc::clone(&outputs);
        scheduler.arm(1u32, Duration::from_secs(1), Some(2), move |anchor, guard| {
            async move {
                if guard.is_current() {
                    out.lock().unwrap().push(anchor);
                }
            }
        });

        sleep(Duration::from_secs(10)).await;
        assert_eq!(*outputs.lock().unwrap(), vec![Some(2)]);
        assert_eq!(scheduler.pending_count(), 0);
    }
}
