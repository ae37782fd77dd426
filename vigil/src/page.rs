//! Bounded forward/backward pagination over a service's samples.
//!
//! A [`Paginator`] is a one-shot lazy sequence: it is built for a single
//! query, its direction is fixed at construction, and it yields at most
//! `limit` samples (0 meaning no limit). The limit is checked before the
//! cursor moves, so collecting `N` samples touches `N` entries regardless of
//! how many the namespace holds.

use crate::cursor::Cursor;
use crate::error::Result;
use crate::sample::Sample;

/// Traversal direction of a page query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Order {
    /// Oldest first.
    #[default]
    Ascending,
    /// Newest first.
    Descending,
}

impl Order {
    /// Maps a `reverse` flag to an order.
    pub fn from_reverse(reverse: bool) -> Self {
        if reverse {
            Order::Descending
        } else {
            Order::Ascending
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Unstarted,
    Positioned,
    Exhausted,
}

/// Lazy, limited iterator over the samples under a cursor.
///
/// Yields `Result<Sample>`; the first error ends the sequence.
pub struct Paginator<'s, C> {
    cursor: C,
    service_id: &'s str,
    order: Order,
    limit: usize,
    count: usize,
    state: State,
}

impl<'s, C: Cursor> Paginator<'s, C> {
    /// Creates a paginator; the cursor is not touched until the first `next`.
    pub fn new(cursor: C, service_id: &'s str, limit: usize, order: Order) -> Self {
        Self {
            cursor,
            service_id,
            order,
            limit,
            count: 0,
            state: State::Unstarted,
        }
    }

    fn step(&mut self) -> Result<()> {
        match (self.state, self.order) {
            (State::Unstarted, Order::Ascending) => self.cursor.first(),
            (State::Unstarted, Order::Descending) => self.cursor.last(),
            (_, Order::Ascending) => self.cursor.advance(),
            (_, Order::Descending) => self.cursor.retreat(),
        }
    }
}

impl<C: Cursor> Iterator for Paginator<'_, C> {
    type Item = Result<Sample>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == State::Exhausted {
            return None;
        }
        if self.limit != 0 && self.count >= self.limit {
            self.state = State::Exhausted;
            return None;
        }

        if let Err(e) = self.step() {
            self.state = State::Exhausted;
            return Some(Err(e));
        }
        self.state = State::Positioned;

        let Some((key, value)) = self.cursor.entry() else {
            self.state = State::Exhausted;
            return None;
        };

        let sample = Sample::from_entry(self.service_id, key, value);
        match sample {
            Ok(_) => self.count += 1,
            Err(_) => self.state = State::Exhausted,
        }
        Some(sample)
    }
}
