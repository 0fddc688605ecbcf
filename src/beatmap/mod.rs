//! Raw difficulty records as handed over by the host's map parser.
//!
//! Field names follow the v3 difficulty schema so a host can deserialize a
//! difficulty document straight into [`RawDifficulty`]. Everything is
//! defaulted; a record with missing fields still loads.

use log::debug;
use serde::Deserialize;

use crate::color::Rgba;
use crate::lighting::BoostEvent;
use crate::timeline::{EventType, LightValue, TimedEvent};
use crate::timing::BeatClock;

/// Optional per-object custom data.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawCustomData {
    /// Explicit grid coordinates, overriding lane and row.
    pub coordinates: Option<Vec<f32>>,
    /// RGB(A) colour override.
    pub color: Option<Vec<f32>>,
}

impl RawCustomData {
    pub fn coordinates(&self) -> Option<[f32; 2]> {
        match self.coordinates.as_deref() {
            Some([x, y, ..]) => Some([*x, *y]),
            _ => None,
        }
    }

    /// Colour override; alpha defaults to 1 when only RGB is given.
    pub fn color(&self) -> Option<Rgba> {
        match self.color.as_deref() {
            Some([r, g, b, a, ..]) => Some(Rgba::new(*r, *g, *b, *a)),
            Some([r, g, b]) => Some(Rgba::new(*r, *g, *b, 1.0)),
            _ => None,
        }
    }
}

fn one() -> f32 {
    1.0
}

/// A basic environment event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawBasicEvent {
    #[serde(default)]
    pub b: f32,
    /// Event type code.
    #[serde(default)]
    pub et: i32,
    /// Value code.
    #[serde(default)]
    pub i: i32,
    /// Float value (brightness multiplier).
    #[serde(default = "one")]
    pub f: f32,
}

impl RawBasicEvent {
    /// Convert to a timed event. Unknown type codes yield `None`; light
    /// value codes out of range are clamped here, once.
    pub fn to_event(&self, clock: &dyn BeatClock) -> Option<TimedEvent> {
        let Some(kind) = EventType::from_code(self.et) else {
            debug!("skipping event with unknown type {} at beat {}", self.et, self.b);
            return None;
        };
        let mut value = self.i;
        if kind.is_light() {
            value = LightValue::clamp_code(self.i);
            if value != self.i {
                debug!("light value {} at beat {} out of range, clamped to {value}", self.i, self.b);
            }
        }
        Some(TimedEvent::new(clock, self.b, kind, value, self.f))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawBoostEvent {
    pub b: f32,
    /// Boost on.
    pub o: bool,
}

impl RawBoostEvent {
    pub fn to_boost(&self, clock: &dyn BeatClock) -> BoostEvent {
        BoostEvent::new(clock, self.b, self.o)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawColorNote {
    pub b: f32,
    pub x: f32,
    pub y: f32,
    /// Colour: 0 left, 1 right.
    pub c: i32,
    /// Cut direction.
    pub d: i32,
    /// Angle offset, degrees.
    pub a: i32,
    #[serde(rename = "customData")]
    pub custom_data: Option<RawCustomData>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawBombNote {
    pub b: f32,
    pub x: f32,
    pub y: f32,
    #[serde(rename = "customData")]
    pub custom_data: Option<RawCustomData>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawObstacle {
    pub b: f32,
    pub x: f32,
    pub y: f32,
    /// Duration in beats.
    pub d: f32,
    /// Width in lanes.
    pub w: f32,
    /// Height in rows.
    pub h: f32,
    #[serde(rename = "customData")]
    pub custom_data: Option<RawCustomData>,
}

/// An arc (slider) between a head and a tail.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawArc {
    pub b: f32,
    pub c: i32,
    pub x: f32,
    pub y: f32,
    pub d: i32,
    /// Head control point multiplier.
    pub mu: f32,
    pub tb: f32,
    pub tx: f32,
    pub ty: f32,
    pub tc: i32,
    /// Tail control point multiplier.
    pub tmu: f32,
    /// Mid-anchor mode.
    pub m: i32,
}

/// A chain (burst slider).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawChain {
    pub b: f32,
    pub c: i32,
    pub x: f32,
    pub y: f32,
    pub d: i32,
    pub tb: f32,
    pub tx: f32,
    pub ty: f32,
    /// Segment count.
    pub sc: i32,
    /// Squish factor.
    pub s: f32,
}

/// One parsed difficulty.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawDifficulty {
    pub color_notes: Vec<RawColorNote>,
    pub bomb_notes: Vec<RawBombNote>,
    pub obstacles: Vec<RawObstacle>,
    pub sliders: Vec<RawArc>,
    pub burst_sliders: Vec<RawChain>,
    pub basic_beatmap_events: Vec<RawBasicEvent>,
    pub color_boost_beatmap_events: Vec<RawBoostEvent>,
    /// Whether the map requires mapping extensions (precision placement).
    #[serde(skip)]
    pub mapping_extensions: bool,
}

impl RawDifficulty {
    /// Every basic event with a known type, in authoring order.
    pub fn events(&self, clock: &dyn BeatClock) -> Vec<TimedEvent> {
        self.basic_beatmap_events
            .iter()
            .filter_map(|e| e.to_event(clock))
            .collect()
    }

    pub fn boosts(&self, clock: &dyn BeatClock) -> Vec<BoostEvent> {
        self.color_boost_beatmap_events
            .iter()
            .map(|e| e.to_boost(clock))
            .collect()
    }
}
