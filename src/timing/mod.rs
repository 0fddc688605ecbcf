//! Beat to seconds conversion.
//!
//! Map data is authored in beats; everything the engines interpolate runs on
//! real seconds. The conversion itself is supplied by the host through
//! [`BeatClock`]; [`BpmMap`] is the piecewise-constant tempo map most hosts want.

/// Two timestamps closer than this are treated as simultaneous.
pub const SAME_TIME_LEEWAY: f32 = 0.001;

/// Lowest tempo accepted by [`BpmMap`]. Zero or negative tempos are clamped here.
const MIN_BPM: f32 = 0.001;

/// Converts musical beats to playback seconds.
pub trait BeatClock {
    fn time_from_beat(&self, beat: f32) -> f32;
}

impl<F: Fn(f32) -> f32> BeatClock for F {
    fn time_from_beat(&self, beat: f32) -> f32 {
        self(beat)
    }
}

/// Whether two times (in seconds) land on the same moment.
pub fn same_time(a: f32, b: f32) -> bool {
    (a - b).abs() <= SAME_TIME_LEEWAY
}

/// Whether two beats land on the same moment once converted through `clock`.
pub fn same_beat(clock: &dyn BeatClock, a: f32, b: f32) -> bool {
    same_time(clock.time_from_beat(a), clock.time_from_beat(b))
}

/// A tempo change taking effect at `beat`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BpmChange {
    pub beat: f32,
    pub bpm: f32,
}

/// A tempo map: a base BPM plus ordered tempo changes.
#[derive(Debug, Clone)]
pub struct BpmMap {
    /// Segments sorted by beat, each with the time at which it starts.
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    beat: f32,
    time: f32,
    bpm: f32,
}

impl BpmMap {
    /// A map with a single constant tempo.
    pub fn constant(bpm: f32) -> Self {
        Self::new(bpm, Vec::new())
    }

    /// Build a map from a base tempo and a list of changes (any order).
    ///
    /// Changes at or before beat 0 replace the base tempo.
    pub fn new(base_bpm: f32, mut changes: Vec<BpmChange>) -> Self {
        changes.sort_by(|a, b| a.beat.total_cmp(&b.beat));

        let mut segments = vec![Segment {
            beat: 0.0,
            time: 0.0,
            bpm: base_bpm.max(MIN_BPM),
        }];
        for change in changes {
            let bpm = change.bpm.max(MIN_BPM);
            let beat = change.beat.max(0.0);
            let Some(last) = segments.last_mut() else {
                continue;
            };
            if beat <= last.beat {
                last.bpm = bpm;
                continue;
            }
            let time = last.time + (beat - last.beat) * 60.0 / last.bpm;
            segments.push(Segment { beat, time, bpm });
        }
        Self { segments }
    }

    /// Tempo in effect at `beat`.
    pub fn bpm_at(&self, beat: f32) -> f32 {
        self.segment_for(beat).bpm
    }

    fn segment_for(&self, beat: f32) -> &Segment {
        let idx = self
            .segments
            .partition_point(|s| s.beat <= beat)
            .saturating_sub(1);
        &self.segments[idx]
    }
}

impl BeatClock for BpmMap {
    fn time_from_beat(&self, beat: f32) -> f32 {
        let seg = self.segment_for(beat);
        seg.time + (beat - seg.beat) * 60.0 / seg.bpm
    }
}
