//! Single-slot handoff from the capture thread to the UI thread.

use std::sync::Mutex;

/// A capacity-one mailbox where newer values overwrite older ones.
///
/// The producer learns from [`post`](Self::post) whether the slot was
/// empty, and only then needs to wake the consumer. The consumer
/// [`take`](Self::take)s the newest value, so a redraw never renders a
/// stale frame twice and the mailbox never grows.
#[derive(Debug)]
pub struct LatestValue<T> {
    slot: Mutex<Option<T>>,
}

impl<T> Default for LatestValue<T> {
    fn default() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }
}

impl<T> LatestValue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value`, replacing any value not yet taken.
    ///
    /// Returns `true` when the slot was empty, i.e. the consumer has not
    /// been notified about a pending value yet.
    pub fn post(&self, value: T) -> bool {
        match self.slot.lock() {
            Ok(mut slot) => slot.replace(value).is_none(),
            Err(poisoned) => poisoned.into_inner().replace(value).is_none(),
        }
    }

    /// Remove and return the newest value, if any.
    pub fn take(&self) -> Option<T> {
        match self.slot.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self.slot.lock() {
            Ok(slot) => slot.is_none(),
            Err(poisoned) => poisoned.into_inner().is_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_first_post_notifies() {
        let mailbox = LatestValue::new();
        assert!(mailbox.post(1));
        assert!(!mailbox.is_empty());
    }

    #[test]
    fn test_second_post_overwrites_without_notifying() {
        let mailbox = LatestValue::new();
        assert!(mailbox.post(1));
        assert!(!mailbox.post(2));
        assert_eq!(mailbox.take(), Some(2));
        assert_eq!(mailbox.take(), None);
    }

    #[test]
    fn test_post_after_take_notifies_again() {
        let mailbox = LatestValue::new();
        mailbox.post("a");
        mailbox.take();
        assert!(mailbox.post("b"));
    }

    #[test]
    fn test_concurrent_producer_never_grows() {
        let mailbox = Arc::new(LatestValue::new());
        let producer = {
            let mailbox = Arc::clone(&mailbox);
            thread::spawn(move || {
                let mut notifications = 0;
                for i in 0..1000u32 {
                    if mailbox.post(i) {
                        notifications += 1;
                    }
                }
                notifications
            })
        };
        let mut taken = 0;
        while !producer.is_finished() {
            if mailbox.take().is_some() {
                taken += 1;
            }
        }
        if mailbox.take().is_some() {
            taken += 1;
        }
        let notifications = producer.join().unwrap();
        // Every notification corresponds to exactly one value taken.
        assert_eq!(notifications, taken);
    }
}
