use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Tag handed out when a request is submitted.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct RequestTicket(u64);

/// Issues increasing tickets so a caller can drop results of superseded requests.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    last_issued: AtomicU64,
}

impl RequestSequencer {
    pub fn issue(&self) -> RequestTicket {
        RequestTicket(self.last_issued.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_latest(&self, ticket: RequestTicket) -> bool {
        self.last_issued.load(Ordering::Acquire) == ticket.0
    }
}

/// Holds the result of the most recently issued request only.
#[derive(Debug)]
pub struct LatestSlot<T> {
    sequencer: RequestSequencer,
    value: Mutex<Option<(RequestTicket, T)>>,
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self {
            sequencer: RequestSequencer::default(),
            value: Mutex::new(None),
        }
    }
}

impl<T: Clone> LatestSlot<T> {
    pub fn begin(&self) -> RequestTicket {
        self.sequencer.issue()
    }

    /// Stores `value` if `ticket` is still the latest; returns whether it was kept.
    pub fn publish(&self, ticket: RequestTicket, value: T) -> bool {
        let mut slot = match self.value.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !self.sequencer.is_latest(ticket) {
            return false;
        }
        *slot = Some((ticket, value));
        true
    }

    pub fn current(&self) -> Option<T> {
        let slot = match self.value.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        slot.as_ref().map(|(_, value)| value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn tickets_increase_and_only_last_is_latest() {
        let sequencer = RequestSequencer::default();
        let first = sequencer.issue();
        let second = sequencer.issue();

        assert!(second > first);
        assert!(!sequencer.is_latest(first));
        assert!(sequencer.is_latest(second));
    }

    #[test]
    fn stale_completion_is_discarded() {
        let slot = LatestSlot::default();
        let slow = slot.begin();
        let fast = slot.begin();

        assert!(slot.publish(fast, "fresh"));
        assert!(!slot.publish(slow, "stale"));
        assert_eq!(slot.current(), Some("fresh"));
    }

    #[test]
    fn concurrent_issuers_never_share_a_ticket() {
        let sequencer = Arc::new(RequestSequencer::default());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let sequencer = Arc::clone(&sequencer);
                std::thread::spawn(move || (0..100).map(|_| sequencer.issue()).collect::<Vec<_>>())
            })
            .collect();

        let mut tickets: Vec<_> = handles
            .into_iter()
            .flat_map(|handle| handle.join().expect("thread completes"))
            .collect();
        tickets.sort();
        tickets.dedup();
        assert_eq!(tickets.len(), 800);
        assert!(sequencer.is_latest(RequestTicket(800)));
    }
}
