use btree_core::DeterministicRng;

use crate::LottoError;

/// One-shot weighted draw: a participant holding `t` tickets occupies `t` of
/// the total slots, and a single slot is picked uniformly.
#[derive(Debug, Clone)]
pub struct LottoDraw<T> {
    participants: Vec<(T, u32)>,
}

impl<T> Default for LottoDraw<T> {
    fn default() -> Self {
        Self {
            participants: Vec::new(),
        }
    }
}

impl<T> LottoDraw<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, participant: T, tickets: u32) -> &mut Self {
        self.participants.push((participant, tickets));
        self
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn total_tickets(&self) -> u64 {
        self.participants.iter().map(|(_, t)| u64::from(*t)).sum()
    }

    /// Consume the draw and return the winner.
    pub fn draw(self, rng: &mut impl DeterministicRng) -> Result<T, LottoError> {
        if self.participants.is_empty() {
            return Err(LottoError::NoParticipants);
        }

        let total = self.total_tickets();
        if total == 0 {
            return Err(LottoError::NoTickets);
        }

        let mut slot = rng.next_below(total);
        for (participant, tickets) in self.participants {
            let tickets = u64::from(tickets);
            if slot < tickets {
                return Ok(participant);
            }
            slot -= tickets;
        }

        // `slot < total` and the loop walked every ticket.
        Err(LottoError::NoTickets)
    }
}
