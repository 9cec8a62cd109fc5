//! Single-slot result handoff.
//!
//! A [`ResultSlot`] carries the return value of a native call from the point
//! where the engine dispatches it back to the stub that asked for it. It is a
//! rendezvous of capacity one: a second [`ResultSlot::publish`] blocks until
//! the pending value has been taken.

use parking_lot::{Condvar, Mutex};

pub struct ResultSlot<T> {
    value: Mutex<Option<T>>,
    /// Signalled whenever the slot changes between empty and full.
    changed: Condvar,
}

impl<T> ResultSlot<T> {
    pub fn new() -> Self {
        Self {
            value: Mutex::new(None),
            changed: Condvar::new(),
        }
    }

    /// Stores `value`, waiting first for any pending value to be taken.
    pub fn publish(&self, value: T) {
        let mut guard = self.value.lock();
        while guard.is_some() {
            self.changed.wait(&mut guard);
        }
        *guard = Some(value);
        self.changed.notify_all();
    }

    /// Waits for a value and removes it.
    pub fn take(&self) -> T {
        let mut guard = self.value.lock();
        loop {
            if let Some(value) = guard.take() {
                self.changed.notify_all();
                return value;
            }
            self.changed.wait(&mut guard);
        }
    }

    /// Removes the pending value, if any, without waiting.
    pub fn try_take(&self) -> Option<T> {
        let value = self.value.lock().take();
        if value.is_some() {
            self.changed.notify_all();
        }
        value
    }

    pub fn is_pending(&self) -> bool {
        self.value.lock().is_some()
    }
}

impl<T> Default for ResultSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn publish_then_take() {
        let slot = ResultSlot::new();
        assert!(!slot.is_pending());
        slot.publish(1);
        assert!(slot.is_pending());
        assert_eq!(slot.take(), 1);
        assert_eq!(slot.try_take(), None);
    }

    #[test]
    fn second_publish_waits_for_consumption() {
        let slot = Arc::new(ResultSlot::new());
        slot.publish(1);

        let published = Arc::new(AtomicBool::new(false));
        let handle = {
            let slot = Arc::clone(&slot);
            let published = Arc::clone(&published);
            thread::spawn(move || {
                slot.publish(2);
                published.store(true, Ordering::SeqCst);
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!published.load(Ordering::SeqCst));
        assert_eq!(slot.take(), 1);
        handle.join().unwrap();
        assert!(published.load(Ordering::SeqCst));
        assert_eq!(slot.take(), 2);
    }

    #[test]
    fn take_waits_for_publish() {
        let slot = Arc::new(ResultSlot::new());
        let handle = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || slot.take())
        };
        thread::sleep(Duration::from_millis(20));
        slot.publish("late");
        assert_eq!(handle.join().unwrap(), "late");
    }
}
