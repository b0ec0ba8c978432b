/*
 * Signals Module
 *
 * The backdrop reacts to two signals it does not own: whether the trigger
 * element (the hero heading) is in view, and which theme is active. Both are
 * modelled as a SignalSource capability with explicit subscribe/unsubscribe,
 * so the simulation never depends on a particular windowing or browser API.
 *
 * Subscribers may be called from any thread. The backdrop's callbacks only
 * write the latest value into a PendingSignals mailbox, which the frame tick
 * drains; all simulation state stays on the thread that ticks.
 */

use std::sync::{Arc, Mutex, PoisonError};

use crate::colour::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type Callback<T> = Box<dyn FnMut(T) + Send>;

/// A value that changes over time and notifies subscribers when it does.
pub trait SignalSource<T> {
    fn current(&self) -> T;
    fn subscribe(&self, callback: Callback<T>) -> SubscriptionId;
    fn unsubscribe(&self, id: SubscriptionId);
}

/// Is the trigger element intersecting the viewport.
pub type VisibilitySource = dyn SignalSource<bool> + Send + Sync;

/// Which theme class is on the root element.
pub type ThemeSource = dyn SignalSource<Theme> + Send + Sync;

type SharedCallback<T> = Arc<Mutex<Callback<T>>>;

struct HubInner<T> {
    value: T,
    next_id: u64,
    subscribers: Vec<(SubscriptionId, SharedCallback<T>)>,
}

/// In-process signal source. Setting a different value notifies every
/// subscriber; setting the same value again is a no-op.
///
/// Callbacks run after the hub's lock is released, so they may read the hub
/// or (un)subscribe. A callback must not `set` the hub that is notifying it.
pub struct SignalHub<T> {
    inner: Mutex<HubInner<T>>,
}

impl<T: Clone + PartialEq> SignalHub<T> {
    pub fn new(value: T) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(HubInner { value, next_id: 0, subscribers: Vec::new() }),
        })
    }

    pub fn set(&self, value: T) {
        let subscribers: Vec<SharedCallback<T>> = {
            let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            if inner.value == value {
                return;
            }
            inner.value = value.clone();
            inner.subscribers.iter().map(|(_, callback)| Arc::clone(callback)).collect()
        };

        for callback in subscribers {
            let mut callback = callback.lock().unwrap_or_else(PoisonError::into_inner);
            (*callback)(value.clone());
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).subscribers.len()
    }
}

impl<T: Clone + PartialEq> SignalSource<T> for SignalHub<T> {
    fn current(&self) -> T {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).value.clone()
    }

    fn subscribe(&self, callback: Callback<T>) -> SubscriptionId {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.subscribers.push((id, Arc::new(Mutex::new(callback))));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.subscribers.retain(|(sub, _)| *sub != id);
    }
}

/// Latest signal values not yet applied by a frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PendingSignals {
    pub trigger_visible: Option<bool>,
    pub theme: Option<Theme>,
}

pub type Mailbox = Arc<Mutex<PendingSignals>>;

impl PendingSignals {
    pub fn mailbox() -> Mailbox {
        Arc::new(Mutex::new(PendingSignals::default()))
    }

    /// Take everything pending, leaving the mailbox empty.
    pub fn drain(mailbox: &Mailbox) -> PendingSignals {
        std::mem::take(&mut *mailbox.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn post_visibility(mailbox: &Mailbox, visible: bool) {
        mailbox.lock().unwrap_or_else(PoisonError::into_inner).trigger_visible = Some(visible);
    }

    pub fn post_theme(mailbox: &Mailbox, theme: Theme) {
        mailbox.lock().unwrap_or_else(PoisonError::into_inner).theme = Some(theme);
    }
}
