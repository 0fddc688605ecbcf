//! Sorted, read-only sequences of timed elements with binary-search lookup.
//!
//! A [`Timeline`] is built once per difficulty load from an unordered list and
//! then only read. Lookups run every frame for every channel, so everything
//! here is `O(log n)` apart from the forward scan in [`Timeline::first_index_from`].

pub mod event;

pub use event::{EventPayload, EventType, LightValue, TimedEvent};

use std::ops::Index;

/// Anything positioned on the map timeline.
pub trait Timed {
    /// Musical position, in beats.
    fn beat(&self) -> f32;
    /// Playback position, in seconds. Derived from [`Timed::beat`].
    fn time(&self) -> f32;
}

/// A sequence of timed elements sorted by ascending beat.
///
/// Elements sharing a beat keep their authoring order, so the last one
/// authored wins a same-beat lookup.
#[derive(Debug, Clone)]
pub struct Timeline<T> {
    items: Vec<T>,
}

impl<T: Timed> Timeline<T> {
    /// Create an empty timeline.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a timeline from elements in any order.
    ///
    /// Uses a stable sort so simultaneous elements preserve insertion order.
    pub fn from_unsorted(mut items: Vec<T>) -> Self {
        items.sort_by(|a, b| a.beat().total_cmp(&b.beat()));
        Self { items }
    }

    /// Index of the last element with `time <= time`, or `None` when the
    /// timeline is empty or `time` precedes the first element.
    pub fn last_index_at(&self, time: f32) -> Option<usize> {
        self.items
            .partition_point(|e| e.time() <= time)
            .checked_sub(1)
    }

    /// Index of the last element with `beat <= beat`.
    pub fn last_index_at_beat(&self, beat: f32) -> Option<usize> {
        self.items
            .partition_point(|e| e.beat() <= beat)
            .checked_sub(1)
    }

    /// The element active at `time` (the last one at or before it).
    pub fn active(&self, time: f32) -> Option<&T> {
        self.last_index_at(time).map(|i| &self.items[i])
    }

    /// The element following `index`, if any. `None` means "before the first
    /// element", so its successor is the first element.
    pub fn next_after(&self, index: Option<usize>) -> Option<&T> {
        match index {
            Some(i) => self.items.get(i + 1),
            None => self.items.first(),
        }
    }

    /// First index at or after `start` satisfying `pred`.
    ///
    /// The scan stops once elements pass `horizon`, since none of those can
    /// satisfy a spawn-window predicate bounded by it.
    pub fn first_index_from(
        &self,
        start: usize,
        horizon: f32,
        pred: impl FnMut(&T) -> bool,
    ) -> Option<usize> {
        self.items
            .get(start..)?
            .iter()
            .take_while(|e| e.time() <= horizon)
            .position(pred)
            .map(|offset| start + offset)
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the timeline holds no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Mutable access for the one-time population passes.
    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    /// Whether every adjacent pair is ordered by time.
    pub fn is_time_ordered(&self) -> bool {
        self.items.windows(2).all(|w| w[0].time() <= w[1].time())
    }
}

impl<T: Timed> Default for Timeline<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for Timeline<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<T: Timed> FromIterator<T> for Timeline<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_unsorted(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Mark {
        beat: f32,
        tag: &'static str,
    }

    impl Timed for Mark {
        fn beat(&self) -> f32 {
            self.beat
        }
        fn time(&self) -> f32 {
            self.beat * 0.5
        }
    }

    fn mark(beat: f32, tag: &'static str) -> Mark {
        Mark { beat, tag }
    }

    fn timeline() -> Timeline<Mark> {
        Timeline::from_unsorted(vec![
            mark(4.0, "d"),
            mark(0.0, "a"),
            mark(2.0, "b"),
            mark(2.0, "c"),
        ])
    }

    #[test]
    fn empty_timeline_has_no_active() {
        let tl: Timeline<Mark> = Timeline::new();
        assert!(tl.is_empty());
        assert_eq!(tl.last_index_at(10.0), None);
        assert!(tl.active(0.0).is_none());
        assert!(tl.next_after(None).is_none());
    }

    #[test]
    fn sorted_and_stable() {
        let tl = timeline();
        let tags: Vec<_> = tl.iter().map(|m| m.tag).collect();
        assert_eq!(tags, vec!["a", "b", "c", "d"]);
        assert!(tl.is_time_ordered());
    }

    #[test]
    fn before_first_is_none() {
        let tl = Timeline::from_unsorted(vec![mark(2.0, "a")]);
        assert_eq!(tl.last_index_at(0.99), None);
        assert_eq!(tl.last_index_at(1.0), Some(0));
    }

    #[test]
    fn after_last_is_last() {
        let tl = timeline();
        assert_eq!(tl.last_index_at(1000.0), Some(3));
    }

    #[test]
    fn ties_resolve_to_last() {
        let tl = timeline();
        // beat 2 == time 1
        assert_eq!(tl.last_index_at(1.0), Some(2));
        assert_eq!(tl.active(1.5).map(|m| m.tag), Some("c"));
        assert_eq!(tl.last_index_at_beat(2.0), Some(2));
    }

    #[test]
    fn lookup_matches_linear_scan() {
        let tl = Timeline::from_unsorted(
            (0..50).map(|i| mark((i / 3) as f32, "x")).collect::<Vec<_>>(),
        );
        for step in 0..200 {
            let t = step as f32 * 0.05 - 0.5;
            let expected = tl.iter().rposition(|m| m.time() <= t);
            assert_eq!(tl.last_index_at(t), expected, "t = {t}");
        }
    }

    #[test]
    fn next_after_walks_forward() {
        let tl = timeline();
        assert_eq!(tl.next_after(None).map(|m| m.tag), Some("a"));
        assert_eq!(tl.next_after(Some(0)).map(|m| m.tag), Some("b"));
        assert!(tl.next_after(Some(3)).is_none());
    }

    #[test]
    fn first_index_from_scans_forward() {
        let tl = Timeline::from_unsorted((0..10).map(|i| mark(i as f32 * 2.0, "x")).collect());
        // times 0..9
        assert_eq!(tl.first_index_from(0, 8.0, |m| m.time() > 6.5), Some(7));
        assert_eq!(tl.first_index_from(8, 9.0, |m| m.time() > 3.0), Some(8));
    }

    #[test]
    fn first_index_from_respects_horizon() {
        let tl = Timeline::from_unsorted((0..10).map(|i| mark(i as f32 * 2.0, "x")).collect());
        assert_eq!(tl.first_index_from(2, 5.0, |m| m.time() > 6.5), None);
        assert_eq!(tl.first_index_from(10, 100.0, |_| true), None);
        assert_eq!(tl.first_index_from(42, 100.0, |_| true), None);
        let empty: Timeline<Mark> = Timeline::new();
        assert_eq!(empty.first_index_from(0, 10.0, |_| true), None);
    }
}
