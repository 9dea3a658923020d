//! Seating order and whose turn it is.

/// A cyclic queue of player names with exactly one current entry.
///
/// The seating order never changes after the deal. A reverse flips the
/// direction of travel instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnQueue {
    order: Vec<String>,
    current: usize,
    reversed: bool,
}

impl TurnQueue {
    /// Creates a queue whose first entry is current.
    ///
    /// `order` must not be empty.
    pub fn new(order: Vec<String>) -> Self {
        debug_assert!(!order.is_empty(), "turn queue needs at least one player");
        Self {
            order,
            current: 0,
            reversed: false,
        }
    }

    /// Creates a queue with `current` as the current player.
    ///
    /// Returns `None` if `current` is not seated.
    pub fn starting_at(order: Vec<String>, current: &str) -> Option<Self> {
        let mut queue = Self::new(order);
        queue.set_current(current).then_some(queue)
    }

    pub fn current(&self) -> &str {
        &self.order[self.current]
    }

    /// Seating order as dealt, independent of direction.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    pub fn contains(&self, player: &str) -> bool {
        self.order.iter().any(|p| p == player)
    }

    /// The player who would be current after one [`advance`](Self::advance).
    pub fn peek_next(&self) -> &str {
        &self.order[self.step_from(self.current)]
    }

    /// Moves to the next player in the current direction.
    pub fn advance(&mut self) {
        self.current = self.step_from(self.current);
    }

    /// Passes over the next player.
    pub fn skip(&mut self) {
        self.advance();
        self.advance();
    }

    /// Flips direction and moves on.
    ///
    /// With two players this does nothing: the player who reversed goes
    /// again.
    pub fn reverse(&mut self) {
        if self.order.len() == 2 {
            return;
        }
        self.reversed = !self.reversed;
        self.advance();
    }

    /// Makes `player` current. Returns `false` (and changes nothing) if
    /// they are not seated.
    pub fn set_current(&mut self, player: &str) -> bool {
        match self.order.iter().position(|p| p == player) {
            Some(index) => {
                self.current = index;
                true
            }
            None => false,
        }
    }

    /// The seating order starting at `player`, or as dealt if `player` is
    /// not seated.
    pub fn rotated_from(&self, player: &str) -> Vec<String> {
        let start = self.order.iter().position(|p| p == player).unwrap_or(0);
        self.order[start..]
            .iter()
            .chain(&self.order[..start])
            .cloned()
            .collect()
    }

    fn step_from(&self, index: usize) -> usize {
        let len = self.order.len();
        if self.reversed {
            (index + len - 1) % len
        } else {
            (index + 1) % len
        }
    }
}
