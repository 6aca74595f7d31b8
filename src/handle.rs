//! The playback primitive the widget drives.
//!
//! A [`PlaybackHandle`] exposes the handful of properties and commands the
//! player mirrors into its UI, plus a signal hub that reports when metadata is
//! known and when the position moves.

use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// Signals published by a playback handle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaSignal {
    /// Duration became known. Fires once per media load.
    MetadataReady { duration: f64 },
    /// Playback position moved. Fires repeatedly while playing and after seeks.
    TimeUpdate { current_time: f64 },
}

/// Callback invoked for every signal a handle emits.
///
/// Listeners may run on the handle's worker thread.
pub type Listener = Arc<dyn Fn(&MediaSignal) + Send + Sync>;

/// The external playback primitive.
///
/// Commands are fire-and-forget: they are accepted in any readiness state and
/// failures are swallowed by the implementation.
pub trait PlaybackHandle {
    fn paused(&self) -> bool;
    /// Position in seconds.
    fn current_time(&self) -> f64;
    fn set_current_time(&self, seconds: f64);
    /// Duration in seconds, `0.0` until metadata is ready.
    fn duration(&self) -> f64;
    fn volume(&self) -> f64;
    fn set_volume(&self, volume: f64);
    fn playback_rate(&self) -> f64;
    fn set_playback_rate(&self, rate: f64);
    fn play(&self);
    fn pause(&self);
    /// Attach a listener. It stays attached until the returned guard is dropped.
    fn subscribe(&self, listener: Listener) -> Subscription;
}

#[derive(Default)]
struct HubInner {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
    duration: Option<f64>,
}

/// Listener registry shared between a handle and its subscriptions.
#[derive(Clone, Default)]
pub struct SignalHub(Arc<Mutex<HubInner>>);

impl std::fmt::Debug for SignalHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.0.lock();
        f.debug_struct("SignalHub")
            .field("listeners", &inner.listeners.len())
            .field("duration", &inner.duration)
            .finish()
    }
}

impl SignalHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener.
    ///
    /// `MetadataReady` is sticky: if it was already emitted, the new listener
    /// receives it before this call returns.
    pub fn subscribe(&self, listener: Listener) -> Subscription {
        let (id, replay) = {
            let mut inner = self.0.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.push((id, Arc::clone(&listener)));
            (id, inner.duration)
        };

        if let Some(duration) = replay {
            listener(&MediaSignal::MetadataReady { duration });
        }

        Subscription {
            hub: Arc::downgrade(&self.0),
            id,
        }
    }

    /// Deliver a signal to every attached listener.
    ///
    /// A second `MetadataReady` for the same load is dropped.
    pub fn emit(&self, signal: MediaSignal) {
        let listeners: Vec<Listener> = {
            let mut inner = self.0.lock();
            if let MediaSignal::MetadataReady { duration } = signal {
                if inner.duration.is_some() {
                    return;
                }
                inner.duration = Some(duration);
            }
            inner.listeners.iter().map(|(_, l)| Arc::clone(l)).collect()
        };

        // Called without the lock so listeners may subscribe or detach.
        for listener in listeners {
            listener(&signal);
        }
    }

    /// Whether `MetadataReady` has been emitted for the current load.
    pub fn metadata_ready(&self) -> bool {
        self.0.lock().duration.is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.0.lock().listeners.len()
    }
}

/// Keeps a listener attached. Dropping it detaches the listener.
#[must_use = "the listener is detached as soon as the subscription is dropped"]
pub struct Subscription {
    hub: Weak<Mutex<HubInner>>,
    id: u64,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.lock().listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting() -> (Listener, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let count_ref = Arc::clone(&count);
        let listener: Listener = Arc::new(move |_: &MediaSignal| {
            count_ref.fetch_add(1, Ordering::SeqCst);
        });
        (listener, count)
    }

    #[test]
    fn dropping_subscription_detaches_listener() {
        let hub = SignalHub::new();
        let (listener, count) = counting();

        let sub = hub.subscribe(listener);
        hub.emit(MediaSignal::TimeUpdate { current_time: 1.0 });
        assert_eq!(hub.listener_count(), 1);

        drop(sub);
        hub.emit(MediaSignal::TimeUpdate { current_time: 2.0 });
        assert_eq!(hub.listener_count(), 0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn metadata_is_replayed_to_late_listeners_once() {
        let hub = SignalHub::new();
        hub.emit(MediaSignal::MetadataReady { duration: 42.0 });
        hub.emit(MediaSignal::MetadataReady { duration: 43.0 });

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_ref = Arc::clone(&seen);
        let _sub = hub.subscribe(Arc::new(move |signal: &MediaSignal| {
            seen_ref.lock().push(*signal)
        }));

        assert_eq!(
            *seen.lock(),
            vec![MediaSignal::MetadataReady { duration: 42.0 }]
        );
    }

    #[test]
    fn subscription_outliving_hub_is_harmless() {
        let hub = SignalHub::new();
        let (listener, _) = counting();
        let sub = hub.subscribe(listener);
        drop(hub);
        drop(sub);
    }
}
