//! The participant registry: who holds which seat.
//!
//! `ParticipantRegistry` is NOT thread-safe by itself. It is owned by
//! the host's table actor and only mutated from that task, so every
//! join and leave is applied one at a time.

use std::collections::HashMap;

use crate::{Nickname, SessionConfig, SessionError};

/// Registered participants, keyed by nickname.
///
/// `S` is whatever the host uses to reach a participant (typically an
/// outbound channel sender). The host itself is *not* stored here; its
/// nickname is only reserved.
///
/// ## Lifecycle
///
/// ```text
/// register() ──→ [seated] ──→ remove()
///     │
///     ├─ InvalidNickname  (malformed, taken, or the host's name)
///     └─ SessionFull      (every remote seat taken)
/// ```
pub struct ParticipantRegistry<S> {
    /// Participant handles by nickname.
    seats: HashMap<Nickname, S>,

    /// Join order, kept in sync with `seats`.
    order: Vec<Nickname>,

    config: SessionConfig,
}

impl<S> ParticipantRegistry<S> {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            seats: HashMap::new(),
            order: Vec::new(),
            config,
        }
    }

    /// Seats a participant.
    ///
    /// The name check comes first, so a duplicate is reported as
    /// `InvalidNickname` even when the table is also full.
    ///
    /// # Errors
    /// - [`SessionError::InvalidNickname`]: malformed, already seated
    ///   (exact, case-sensitive match), or equal to the host's name.
    /// - [`SessionError::SessionFull`]: no remote seat left.
    pub fn register(&mut self, raw: &str, handle: S) -> Result<Nickname, SessionError> {
        let nickname = Nickname::parse(raw)?;

        if nickname == *self.config.host_nickname() || self.seats.contains_key(&nickname) {
            return Err(SessionError::InvalidNickname(nickname.into_inner()));
        }
        if self.is_full() {
            return Err(SessionError::SessionFull);
        }

        self.order.push(nickname.clone());
        self.seats.insert(nickname.clone(), handle);

        tracing::info!(
            %nickname,
            seated = self.seats.len(),
            seats = self.config.remote_seats(),
            "participant registered"
        );
        Ok(nickname)
    }

    /// Frees a seat and returns the participant's handle.
    ///
    /// # Errors
    /// [`SessionError::NotFound`] if nobody holds that nickname.
    pub fn remove(&mut self, nickname: &str) -> Result<S, SessionError> {
        let handle = self
            .seats
            .remove(nickname)
            .ok_or_else(|| SessionError::NotFound(nickname.to_string()))?;
        self.order.retain(|n| n != nickname);

        tracing::info!(%nickname, seated = self.seats.len(), "participant removed");
        Ok(handle)
    }

    pub fn get(&self, nickname: &str) -> Option<&S> {
        self.seats.get(nickname)
    }

    pub fn contains(&self, nickname: &str) -> bool {
        self.seats.contains_key(nickname)
    }

    /// True when every remote seat is taken.
    pub fn is_full(&self) -> bool {
        self.seats.len() >= self.config.remote_seats()
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn host_nickname(&self) -> &Nickname {
        self.config.host_nickname()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Every player at the table in join order, host first.
    pub fn table_nicknames(&self) -> Vec<String> {
        std::iter::once(self.config.host_nickname())
            .chain(self.order.iter())
            .map(|n| n.to_string())
            .collect()
    }

    /// Registered participants in join order, paired with their handles.
    pub fn iter(&self) -> impl Iterator<Item = (&Nickname, &S)> {
        self.order.iter().filter_map(|n| self.seats.get(n).map(|s| (n, s)))
    }

    /// Empties the registry, returning every handle in join order.
    pub fn drain(&mut self) -> Vec<(Nickname, S)> {
        let order = std::mem::take(&mut self.order);
        order
            .into_iter()
            .filter_map(|n| self.seats.remove(&n).map(|s| (n, s)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(capacity: usize) -> ParticipantRegistry<u32> {
        ParticipantRegistry::new(SessionConfig::new(capacity, "Host").unwrap())
    }

    #[test]
    fn test_register_valid_nickname_seats_participant() {
        let mut reg = registry(3);
        let nick = reg.register("Ann", 1).unwrap();
        assert_eq!(nick, "Ann");
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get("Ann"), Some(&1));
    }

    #[test]
    fn test_register_duplicate_returns_invalid_nickname() {
        let mut reg = registry(4);
        reg.register("Ann", 1).unwrap();
        assert_eq!(
            reg.register("Ann", 2),
            Err(SessionError::InvalidNickname("Ann".into()))
        );
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get("Ann"), Some(&1));
    }

    #[test]
    fn test_register_duplicate_on_full_table_is_still_invalid_nickname() {
        let mut reg = registry(2);
        reg.register("Ann", 1).unwrap();
        assert!(reg.is_full());
        assert!(matches!(
            reg.register("Ann", 2),
            Err(SessionError::InvalidNickname(_))
        ));
    }

    #[test]
    fn test_register_host_name_returns_invalid_nickname() {
        let mut reg = registry(3);
        assert!(matches!(
            reg.register("Host", 1),
            Err(SessionError::InvalidNickname(_))
        ));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_register_trailing_space_is_invalid_even_when_name_is_free() {
        let mut reg = registry(4);
        assert_eq!(
            reg.register("Ann ", 1),
            Err(SessionError::InvalidNickname("Ann ".into()))
        );
        reg.register("Ann", 1).unwrap();
        assert!(reg.register("Ann Lee", 2).is_ok());
    }

    #[test]
    fn test_register_case_differs_is_accepted() {
        let mut reg = registry(4);
        reg.register("ann", 1).unwrap();
        assert!(reg.register("Ann", 2).is_ok());
    }

    #[test]
    fn test_register_beyond_capacity_returns_session_full() {
        let mut reg = registry(3);
        reg.register("Ann", 1).unwrap();
        reg.register("Bob", 2).unwrap();
        assert_eq!(reg.register("Cid", 3), Err(SessionError::SessionFull));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_remove_frees_seat() {
        let mut reg = registry(2);
        reg.register("Ann", 1).unwrap();
        assert_eq!(reg.remove("Ann"), Ok(1));
        assert!(!reg.is_full());
        assert!(reg.register("Bob", 2).is_ok());
    }

    #[test]
    fn test_remove_unknown_returns_not_found() {
        let mut reg = registry(2);
        assert_eq!(reg.remove("Zed"), Err(SessionError::NotFound("Zed".into())));
    }

    #[test]
    fn test_table_nicknames_host_first_then_join_order() {
        let mut reg = registry(4);
        reg.register("Cid", 3).unwrap();
        reg.register("Ann", 1).unwrap();
        reg.register("Bob", 2).unwrap();
        reg.remove("Ann").unwrap();

        assert_eq!(reg.table_nicknames(), ["Host", "Cid", "Bob"]);
        let handles: Vec<u32> = reg.iter().map(|(_, s)| *s).collect();
        assert_eq!(handles, [3, 2]);
    }

    #[test]
    fn test_drain_empties_registry() {
        let mut reg = registry(3);
        reg.register("Ann", 1).unwrap();
        reg.register("Bob", 2).unwrap();

        let drained = reg.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].0, "Ann");
        assert!(reg.is_empty());
    }
}
