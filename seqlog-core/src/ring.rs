//! Fixed-capacity ring buffer indexed by `sequence % capacity`.

use crate::event::{Event, Sequence};

/// Retention window holding the most recent `capacity` events.
///
/// Slots are addressed purely by sequence number; inserting an event
/// overwrites whatever older event shared its slot.
pub(crate) struct RingBuffer<P> {
    slots: Vec<Option<Event<P>>>,
}

impl<P: Clone> RingBuffer<P> {
    /// Create an empty buffer. `capacity` must be non-zero.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> u64 {
        self.slots.len() as u64
    }

    fn index(&self, sequence: Sequence) -> usize {
        (sequence % self.capacity()) as usize
    }

    /// Store an event in its slot.
    pub fn insert(&mut self, event: Event<P>) {
        let index = self.index(event.sequence);
        self.slots[index] = Some(event);
    }

    /// The event stored for `sequence`, if its slot has not been reused.
    #[cfg(test)]
    fn get(&self, sequence: Sequence) -> Option<&Event<P>> {
        self.slots[self.index(sequence)]
            .as_ref()
            .filter(|event| event.sequence == sequence)
    }

    /// Append `count` consecutive slots starting at `from` to `out`.
    ///
    /// When the range crosses the end of the backing array the tail segment
    /// is copied first, then the head. `count` must not exceed the capacity.
    pub fn read_into(&self, from: Sequence, count: u64, out: &mut Vec<Event<P>>) {
        debug_assert!(count <= self.capacity());
        if count == 0 {
            return;
        }

        let first = self.index(from);
        let end = first + count as usize;
        out.reserve(count as usize);

        if end <= self.slots.len() {
            extend_from(out, &self.slots[first..end]);
        } else {
            extend_from(out, &self.slots[first..]);
            extend_from(out, &self.slots[..end - self.slots.len()]);
        }
    }
}

fn extend_from<P: Clone>(out: &mut Vec<Event<P>>, slots: &[Option<Event<P>>]) {
    out.extend(slots.iter().flatten().cloned());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(capacity: usize, sequences: std::ops::RangeInclusive<u64>) -> RingBuffer<u64> {
        let mut ring = RingBuffer::with_capacity(capacity);
        for seq in sequences {
            ring.insert(Event::new(seq, 100 + seq));
        }
        ring
    }

    fn sequences(events: &[Event<u64>]) -> Vec<u64> {
        events.iter().map(|e| e.sequence).collect()
    }

    #[test]
    fn insert_overwrites_oldest_slot() {
        let ring = filled(4, 1..=6);

        assert!(ring.get(1).is_none());
        assert!(ring.get(2).is_none());
        assert_eq!(ring.get(5).map(|e| e.payload), Some(105));
        assert_eq!(ring.get(6).map(|e| e.payload), Some(106));
    }

    #[test]
    fn read_without_wrap() {
        let ring = filled(8, 1..=12);
        let mut out = Vec::new();

        ring.read_into(9, 3, &mut out);

        assert_eq!(sequences(&out), vec![9, 10, 11]);
    }

    #[test]
    fn read_concatenates_across_wrap() {
        let ring = filled(8, 1..=12);
        let mut out = Vec::new();

        // Slots 6, 7 then 0..4.
        ring.read_into(6, 7, &mut out);

        assert_eq!(sequences(&out), vec![6, 7, 8, 9, 10, 11, 12]);
    }

    #[test]
    fn read_full_window() {
        let ring = filled(8, 1..=12);
        let mut out = Vec::new();

        ring.read_into(5, 8, &mut out);

        assert_eq!(sequences(&out), (5..=12).collect::<Vec<_>>());
    }

    #[test]
    fn read_zero_count_is_empty() {
        let ring = filled(8, 1..=12);
        let mut out = Vec::new();

        ring.read_into(13, 0, &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn read_appends_to_existing_contents() {
        let ring = filled(8, 1..=3);
        let mut out = vec![Event::new(0, 0)];

        ring.read_into(1, 3, &mut out);

        assert_eq!(sequences(&out), vec![0, 1, 2, 3]);
    }
}
