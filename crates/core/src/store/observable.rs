//! Observable single-value cell.
//!
//! Holds one value and notifies registered listeners whenever it is replaced.
//! Async consumers can use [`Observable::watch`] instead of callbacks.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use super::Subscription;

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Listeners<T> {
    next_id: u64,
    entries: Vec<(u64, Listener<T>)>,
}

/// Notification pass bookkeeping. Changes made while a pass is running are
/// delivered by that pass once it finishes the current round.
#[derive(Default)]
struct Dispatch {
    running: bool,
    pending: bool,
}

struct Inner<T> {
    value: watch::Sender<T>,
    listeners: Mutex<Listeners<T>>,
    dispatch: Mutex<Dispatch>,
}

impl<T> Inner<T> {
    fn listeners(&self) -> MutexGuard<'_, Listeners<T>> {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn dispatch(&self) -> MutexGuard<'_, Dispatch> {
        self.dispatch.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remove(&self, id: u64) {
        self.listeners().entries.retain(|(entry_id, _)| *entry_id != id);
    }
}

/// A shared, observable mutable slot.
///
/// Clones share the same slot. Listeners run outside the internal locks, in
/// registration order, and always receive the value current at the start of
/// their round. A change made while listeners are running (including from a
/// listener) is delivered in a follow-up round, so every listener's last
/// observed value is the slot's latest value.
pub struct Observable<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Observable<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a new slot holding `value`.
    pub fn new(value: T) -> Self {
        let (sender, _) = watch::channel(value);
        Self {
            inner: Arc::new(Inner {
                value: sender,
                listeners: Mutex::new(Listeners {
                    next_id: 0,
                    entries: Vec::new(),
                }),
                dispatch: Mutex::new(Dispatch::default()),
            }),
        }
    }

    /// Returns a snapshot of the current value.
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Replaces the value and notifies every listener.
    pub fn set(&self, value: T) {
        self.inner.value.send_replace(value);
        self.notify();
    }

    /// Mutates the value in place and notifies every listener.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.inner.value.send_modify(f);
        self.notify();
    }

    /// Runs `f` on the value under the slot's write lock and notifies
    /// listeners only if it returns `true`.
    ///
    /// Use this to make a check and a write atomic with respect to other
    /// writers.
    pub fn update_if(&self, f: impl FnOnce(&mut T) -> bool) -> bool {
        let modified = self.inner.value.send_if_modified(f);
        if modified {
            self.notify();
        }
        modified
    }

    /// Registers `callback`. It runs immediately with the current value and
    /// again after every change until the returned [`Subscription`] is
    /// released.
    pub fn subscribe(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let listener: Listener<T> = Arc::new(callback);
        let id = {
            let mut listeners = self.inner.listeners();
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.entries.push((id, listener.clone()));
            id
        };

        listener(&self.get());

        let inner = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.remove(id);
            }
        })
    }

    /// Returns a receiver that observes every change to the value.
    pub fn watch(&self) -> watch::Receiver<T> {
        self.inner.value.subscribe()
    }

    /// Number of callback listeners currently registered.
    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners().entries.len()
    }

    fn notify(&self) {
        {
            let mut dispatch = self.inner.dispatch();
            if dispatch.running {
                dispatch.pending = true;
                return;
            }
            dispatch.running = true;
        }
        let _running = DispatchGuard(&self.inner.dispatch);

        loop {
            let listeners: Vec<Listener<T>> = self
                .inner
                .listeners()
                .entries
                .iter()
                .map(|(_, listener)| listener.clone())
                .collect();

            if !listeners.is_empty() {
                let current = self.get();
                for listener in listeners {
                    listener(&current);
                }
            }

            let mut dispatch = self.inner.dispatch();
            if !dispatch.pending {
                return;
            }
            dispatch.pending = false;
        }
    }
}

/// Ends a notification pass, even if a listener panics.
struct DispatchGuard<'a>(&'a Mutex<Dispatch>);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        let mut dispatch = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        dispatch.running = false;
        dispatch.pending = false;
    }
}

impl<T> Default for Observable<T>
where
    T: Clone + Default + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> std::fmt::Debug for Observable<T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("value", &*self.inner.value.borrow())
            .finish()
    }
}
