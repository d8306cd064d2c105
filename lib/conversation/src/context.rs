//! Bounded per-user conversation buffers.
//!
//! Buffers are created lazily on first use and live until explicitly
//! cleared; there is no time-based expiry. Memory is bounded per user
//! by the turn cap, not globally.

use crate::turn::{ConversationTurn, TurnRole};
use gemini_relay_core::UserId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Maximum turns retained per user: 10 user/model exchange pairs.
pub const MAX_TURNS: usize = 20;

/// Bounded ordered history of turns for one user, oldest first.
///
/// A user turn is always immediately followed by its model turn;
/// eviction removes whole pairs from the oldest end, so the pairing is
/// never split.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationBuffer {
    turns: Vec<ConversationTurn>,
}

impl ConversationBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the turns, oldest first.
    #[must_use]
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Returns the number of turns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Returns true if no turns are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Appends one user/model exchange, then evicts whole pairs from
    /// the front until the buffer is within [`MAX_TURNS`].
    fn push_exchange(&mut self, user_text: &str, model_text: &str) {
        self.turns.push(ConversationTurn::user(user_text));
        self.turns.push(ConversationTurn::model(model_text));

        while self.turns.len() > MAX_TURNS {
            self.turns.drain(0..2);
        }
    }

    /// Returns true if every user turn is immediately followed by its
    /// model turn.
    #[must_use]
    pub fn is_paired(&self) -> bool {
        self.turns.len() % 2 == 0
            && self.turns.chunks(2).all(|pair| {
                pair[0].role == TurnRole::User && pair[1].role == TurnRole::Model
            })
    }
}

/// Keyed store of per-user conversation buffers.
///
/// The outer map lock is held only long enough to look up or insert a
/// buffer handle; buffer mutation takes that buffer's own lock, so
/// appends for different users never contend. Appends for the same
/// user are serialized by the per-buffer lock, which preserves the
/// pairing invariant under concurrent exchanges.
#[derive(Debug, Default)]
pub struct ContextStore {
    buffers: Mutex<HashMap<UserId, Arc<Mutex<ConversationBuffer>>>>,
}

impl ContextStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, user_id: &UserId) -> Arc<Mutex<ConversationBuffer>> {
        let mut buffers = self
            .buffers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            buffers
                .entry(user_id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(ConversationBuffer::new()))),
        )
    }

    /// Returns a snapshot of the user's buffer, creating an empty one
    /// if the user has no history yet. Never fails.
    #[must_use]
    pub fn get(&self, user_id: &UserId) -> ConversationBuffer {
        let buffer = self.entry(user_id);
        let guard = buffer.lock().unwrap_or_else(PoisonError::into_inner);
        guard.clone()
    }

    /// Records one user/model exchange atomically for `user_id`, then
    /// applies the eviction bound.
    pub fn append(&self, user_id: &UserId, user_text: &str, model_text: &str) {
        let buffer = self.entry(user_id);
        let mut guard = buffer.lock().unwrap_or_else(PoisonError::into_inner);
        guard.push_exchange(user_text, model_text);
    }

    /// Removes the user's buffer entirely. Idempotent: clearing a
    /// never-seen user is not an error.
    pub fn clear(&self, user_id: &UserId) -> bool {
        let mut buffers = self
            .buffers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        buffers.remove(user_id);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::new(id)
    }

    #[test]
    fn get_creates_empty_buffer_lazily() {
        let store = ContextStore::new();
        let buffer = store.get(&user("alice"));
        assert!(buffer.is_empty());
    }

    #[test]
    fn first_exchange_records_pair_in_order() {
        let store = ContextStore::new();
        store.append(&user("alice"), "hello", "hi there");

        let buffer = store.get(&user("alice"));
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.turns()[0].role, TurnRole::User);
        assert_eq!(buffer.turns()[0].text, "hello");
        assert_eq!(buffer.turns()[1].role, TurnRole::Model);
        assert_eq!(buffer.turns()[1].text, "hi there");
    }

    #[test]
    fn buffer_never_exceeds_max_turns() {
        let store = ContextStore::new();
        let alice = user("alice");
        for i in 0..50 {
            store.append(&alice, &format!("q{i}"), &format!("a{i}"));
            assert!(store.get(&alice).len() <= MAX_TURNS);
        }
    }

    #[test]
    fn eviction_drops_oldest_whole_pairs() {
        let store = ContextStore::new();
        let alice = user("alice");
        // 11 exchanges with a cap of 10 pairs: the first pair is evicted.
        for i in 1..=11 {
            store.append(&alice, &format!("q{i}"), &format!("a{i}"));
        }

        let buffer = store.get(&alice);
        assert_eq!(buffer.len(), MAX_TURNS);
        assert!(buffer.is_paired());
        assert_eq!(buffer.turns()[0].text, "q2");
        assert_eq!(buffer.turns()[MAX_TURNS - 1].text, "a11");
    }

    #[test]
    fn clear_is_idempotent() {
        let store = ContextStore::new();
        let alice = user("alice");
        store.append(&alice, "hello", "hi");

        assert!(store.clear(&alice));
        assert!(store.get(&alice).is_empty());
        assert!(store.clear(&alice));
        assert!(store.clear(&user("never-seen")));
    }

    #[test]
    fn users_are_isolated() {
        let store = ContextStore::new();
        let alice = user("alice");
        let bob = user("bob");

        store.append(&alice, "alice says", "reply to alice");
        store.append(&bob, "bob says", "reply to bob");
        store.clear(&alice);

        let bob_buffer = store.get(&bob);
        assert_eq!(bob_buffer.len(), 2);
        assert_eq!(bob_buffer.turns()[0].text, "bob says");
        assert!(store.get(&alice).is_empty());
    }

    #[test]
    fn concurrent_appends_preserve_pairing() {
        let store = Arc::new(ContextStore::new());
        let alice = user("alice");

        let handles: Vec<_> = (0..8)
            .map(|thread| {
                let store = Arc::clone(&store);
                let alice = alice.clone();
                std::thread::spawn(move || {
                    for i in 0..25 {
                        store.append(&alice, &format!("q{thread}-{i}"), &format!("a{thread}-{i}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("thread");
        }

        let buffer = store.get(&alice);
        assert_eq!(buffer.len(), MAX_TURNS);
        assert!(buffer.is_paired());
    }
}
