use std::cell::Cell;

/// Sequence number handed out when a request is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Ticket(u64);

/// Orders responses of one request kind.
///
/// A response may be applied only when its ticket is newer than every ticket applied before
/// it, so a slow early response can never overwrite the result of a later request.
#[derive(Debug, Default)]
pub(crate) struct SequenceGate {
    issued: Cell<u64>,
    applied: Cell<u64>,
}

impl SequenceGate {
    pub(crate) fn issue(&self) -> Ticket {
        let next = self.issued.get() + 1;
        self.issued.set(next);
        Ticket(next)
    }

    /// Claims the right to apply the response for `ticket`. Returns `false` for stale tickets.
    pub(crate) fn try_apply(&self, ticket: Ticket) -> bool {
        if ticket.0 > self.applied.get() {
            self.applied.set(ticket.0);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_order_responses_all_apply() {
        let gate = SequenceGate::default();
        let first = gate.issue();
        let second = gate.issue();
        assert!(gate.try_apply(first));
        assert!(gate.try_apply(second));
    }

    #[test]
    fn test_late_response_is_stale() {
        let gate = SequenceGate::default();
        let first = gate.issue();
        let second = gate.issue();
        assert!(gate.try_apply(second));
        assert!(!gate.try_apply(first));
    }

    #[test]
    fn test_ticket_applies_once() {
        let gate = SequenceGate::default();
        let ticket = gate.issue();
        assert!(gate.try_apply(ticket));
        assert!(!gate.try_apply(ticket));
    }
}
