//! Ring rotation and zoom.
//!
//! Ring spin and zoom events do not carry absolute angles or distances.
//! Each event starts wherever the previous event's motion had brought the
//! rings by the time it fires, so a population pass resolves every event's
//! start and target once per difficulty load. See [`chain`].

pub mod chain;

pub use chain::{populate_rotations, populate_zooms};

use log::debug;
use rand::Rng;

use crate::easing;
use crate::timeline::{EventType, Timed, TimedEvent, Timeline};

/// Progress speed of ring rotations.
pub const ROTATION_SPEED: f32 = 2.0;
/// Progress speed of ring zoom.
pub const ZOOM_SPEED: f32 = 1.5;
/// Each ring starts following a rotation this many seconds after the ring before it.
pub const RING_DELAY: f32 = 1.0 / 60.0;
/// Zoom parity before the first zoom event (`true` = far).
pub const START_ZOOM_PARITY: bool = true;
/// Zoom distance before the first zoom event.
pub const START_ZOOM_POSITION: f32 = if START_ZOOM_PARITY { 1.0 } else { 0.0 };

/// Shape of one ring group's rotations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingGroup {
    pub start_angle: f32,
    pub rotation_amount: f32,
    pub max_step: f32,
    pub start_step: f32,
}

pub const SMALL_RINGS: RingGroup = RingGroup {
    start_angle: -45.0,
    rotation_amount: 90.0,
    max_step: 5.0,
    start_step: 3.0,
};

pub const BIG_RINGS: RingGroup = RingGroup {
    start_angle: -45.0,
    rotation_amount: 45.0,
    max_step: 5.0,
    start_step: 0.0,
};

/// Which ring group an update is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RingSize {
    Small,
    Big,
}

impl RingSize {
    pub fn group(self) -> RingGroup {
        match self {
            RingSize::Small => SMALL_RINGS,
            RingSize::Big => BIG_RINGS,
        }
    }
}

/// Resolved endpoints of a ring rotation event.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RingRotation {
    pub start_angle: f32,
    pub target_angle: f32,
    pub start_step: f32,
    /// Target angular offset between neighbouring rings.
    pub step: f32,
}

impl RingRotation {
    pub fn angle(&self, progress: f32) -> f32 {
        easing::lerp(self.start_angle, self.target_angle, progress)
    }

    pub fn step_angle(&self, progress: f32) -> f32 {
        easing::lerp(self.start_step, self.step, progress)
    }
}

/// Resolved endpoints of a ring zoom event.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RingZoom {
    pub far_parity: bool,
    pub start_distance: f32,
}

impl RingZoom {
    pub fn target_distance(&self) -> f32 {
        if self.far_parity {
            1.0
        } else {
            0.0
        }
    }
}

/// Time at which a rotation event starts moving ring `ring`.
pub fn influence_start(event: &TimedEvent, ring: usize) -> f32 {
    event.time() + RING_DELAY * ring as f32
}

/// Angle of ring `ring` at `time` under rotation event `event`.
///
/// Includes the per-ring step offset. An unpopulated event reads as angle 0.
pub fn ring_angle(event: &TimedEvent, time: f32, ring: usize) -> f32 {
    let rotation = event.ring_rotation();
    debug_assert!(rotation.is_some(), "ring rotation queried before population");
    let Some(rotation) = rotation else {
        return 0.0;
    };
    let elapsed = (time - influence_start(event, ring)).max(0.0);
    let progress = easing::exp_progress(elapsed, ROTATION_SPEED);
    rotation.angle(progress) + rotation.step_angle(progress) * ring as f32
}

/// Ring distance at `time` under zoom event `event`.
pub fn zoom_distance(event: &TimedEvent, time: f32) -> f32 {
    let zoom = event.ring_zoom();
    debug_assert!(zoom.is_some(), "ring zoom queried before population");
    let Some(zoom) = zoom else {
        return START_ZOOM_POSITION;
    };
    let progress = easing::exp_progress(time - event.time(), ZOOM_SPEED);
    easing::lerp(zoom.start_distance, zoom.target_distance(), progress)
}

/// Rotation state of one ring group for a frame.
#[derive(Debug, Clone, Copy)]
pub struct RingRotationUpdate<'a> {
    pub size: RingSize,
    pub events: &'a Timeline<TimedEvent>,
    /// Index of the active rotation event, `None` before the first.
    pub current: Option<usize>,
}

/// Receives ring results once per tick.
pub trait RingSink {
    fn ring_rotation_changed(&mut self, update: &RingRotationUpdate<'_>);
    fn ring_zoom_changed(&mut self, position: f32);
}

/// Ring rotation and zoom timelines for one difficulty.
#[derive(Debug, Clone, Default)]
pub struct RingEngine {
    small: Timeline<TimedEvent>,
    big: Timeline<TimedEvent>,
    zoom: Timeline<TimedEvent>,
}

impl RingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all ring timelines and run the population passes.
    ///
    /// Ring spin events drive both ring groups; each group draws its own
    /// random directions and steps.
    pub fn load(&mut self, events: &[TimedEvent], rng: &mut impl Rng) {
        let spins: Vec<TimedEvent> = events
            .iter()
            .filter(|e| e.kind == EventType::RingSpin)
            .cloned()
            .collect();
        let zooms: Vec<TimedEvent> = events
            .iter()
            .filter(|e| e.kind == EventType::RingZoom)
            .cloned()
            .collect();

        self.small = Timeline::from_unsorted(spins.clone());
        self.big = Timeline::from_unsorted(spins);
        self.zoom = Timeline::from_unsorted(zooms);

        populate_rotations(self.small.as_mut_slice(), &SMALL_RINGS, rng);
        populate_rotations(self.big.as_mut_slice(), &BIG_RINGS, rng);
        populate_zooms(self.zoom.as_mut_slice());

        debug!(
            "loaded rings: {} rotation events, {} zoom events",
            self.small.len(),
            self.zoom.len()
        );
    }

    /// Drop every event, leaving the rings at rest.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn rotations(&self, size: RingSize) -> &Timeline<TimedEvent> {
        match size {
            RingSize::Small => &self.small,
            RingSize::Big => &self.big,
        }
    }

    pub fn zooms(&self) -> &Timeline<TimedEvent> {
        &self.zoom
    }

    /// Ring distance at `time`; the resting position before any zoom event.
    pub fn zoom_position(&self, time: f32) -> f32 {
        self.zoom
            .active(time)
            .map(|e| zoom_distance(e, time))
            .unwrap_or(START_ZOOM_POSITION)
    }

    /// Angle of ring `ring` of group `size` at `time`.
    ///
    /// Outer rings lag behind, so a ring may still be following an earlier
    /// event than the active one.
    pub fn ring_angle(&self, size: RingSize, ring: usize, time: f32) -> f32 {
        let events = self.rotations(size);
        let mut index = events.last_index_at(time);
        while let Some(i) = index {
            if influence_start(&events[i], ring) <= time {
                return ring_angle(&events[i], time, ring);
            }
            index = i.checked_sub(1);
        }
        let group = size.group();
        group.start_angle + group.start_step * ring as f32
    }

    /// Emit the zoom position and both rotation groups.
    pub fn update(&self, time: f32, sink: &mut dyn RingSink) {
        sink.ring_zoom_changed(self.zoom_position(time));
        for size in [RingSize::Small, RingSize::Big] {
            let events = self.rotations(size);
            sink.ring_rotation_changed(&RingRotationUpdate {
                size,
                events,
                current: events.last_index_at(time),
            });
        }
    }
}
