//! # Save Coordination
//!
//! Single-flight discipline for save attempts.
//!
//! Every attempt takes a ticket. Taking a ticket supersedes whatever ticket
//! was current, so an earlier attempt that finishes late finds it is no
//! longer the owner and its result is dropped. Nothing is queued and nothing
//! is retried: the newest attempt wins.

/// Ownership token for one save attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SaveTicket {
    generation: u64,
}

impl SaveTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Hands out tickets and remembers which one currently owns the outcome
#[derive(Debug, Default)]
pub struct SaveCoordinator {
    /// Last generation handed out
    generation: u64,

    /// Generation that is allowed to apply its result
    current: Option<u64>,
}

impl SaveCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an attempt, superseding the current one.
    ///
    /// Returns the new ticket and, when there was one, the ticket it
    /// displaced.
    pub fn begin(&mut self) -> (SaveTicket, Option<SaveTicket>) {
        let superseded = self.cancel();
        self.generation += 1;
        self.current = Some(self.generation);

        (
            SaveTicket {
                generation: self.generation,
            },
            superseded,
        )
    }

    /// Is this ticket still the owner?
    pub fn is_current(&self, ticket: &SaveTicket) -> bool {
        self.current == Some(ticket.generation)
    }

    /// Finish an attempt.
    ///
    /// Returns `true` when the ticket still owned the outcome; ownership is
    /// released either way.
    pub fn settle(&mut self, ticket: &SaveTicket) -> bool {
        if self.is_current(ticket) {
            self.current = None;
            true
        } else {
            false
        }
    }

    /// Drop ownership without starting a new attempt (teardown, re-initialise)
    pub fn cancel(&mut self) -> Option<SaveTicket> {
        self.current
            .take()
            .map(|generation| SaveTicket { generation })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_ticket_is_current() {
        let mut coordinator = SaveCoordinator::new();
        let (ticket, superseded) = coordinator.begin();

        assert!(superseded.is_none());
        assert!(coordinator.is_current(&ticket));
    }

    #[test]
    fn test_newer_ticket_supersedes_older() {
        let mut coordinator = SaveCoordinator::new();
        let (first, _) = coordinator.begin();
        let (second, superseded) = coordinator.begin();

        assert_eq!(superseded, Some(first));
        assert!(!coordinator.is_current(&first));
        assert!(coordinator.is_current(&second));

        // Late result from the first attempt is dropped
        assert!(!coordinator.settle(&first));
        assert!(coordinator.settle(&second));
        assert_eq!(coordinator.cancel(), None);
    }

    #[test]
    fn test_settle_only_once() {
        let mut coordinator = SaveCoordinator::new();
        let (ticket, _) = coordinator.begin();

        assert!(coordinator.settle(&ticket));
        assert!(!coordinator.settle(&ticket));
    }

    #[test]
    fn test_cancel_orphans_current_ticket() {
        let mut coordinator = SaveCoordinator::new();
        let (ticket, _) = coordinator.begin();

        assert_eq!(coordinator.cancel(), Some(ticket));
        assert!(!coordinator.is_current(&ticket));
        assert_eq!(coordinator.cancel(), None);
    }

    #[test]
    fn test_generations_are_distinct() {
        let mut coordinator = SaveCoordinator::new();
        let (a, _) = coordinator.begin();
        coordinator.cancel();
        let (b, _) = coordinator.begin();

        assert_ne!(a.generation(), b.generation());
    }
}
