//! Basic beatmap events: the single timed-event record shared by lighting,
//! laser speed and ring channels.

use super::Timed;
use crate::lighting::laser::LaserRotation;
use crate::rings::{RingRotation, RingZoom};
use crate::timing::BeatClock;

/// Environment event type codes, as authored in the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    BackLasers,
    Rings,
    LeftRotatingLasers,
    RightRotatingLasers,
    CenterLights,
    LeftSideExtra,
    RightSideExtra,
    RingSpin,
    RingZoom,
    BillieLeftLasers,
    BillieRightLasers,
    LeftRotationSpeed,
    RightRotationSpeed,
    InterscopeHydraulicsDown,
    InterscopeHydraulicsUp,
    GagaLeftTowerHeight,
    GagaRightTowerHeight,
}

impl EventType {
    /// Decode a raw type code. Codes the previewer has no channel for yield `None`.
    pub fn from_code(code: i32) -> Option<Self> {
        let kind = match code {
            0 => Self::BackLasers,
            1 => Self::Rings,
            2 => Self::LeftRotatingLasers,
            3 => Self::RightRotatingLasers,
            4 => Self::CenterLights,
            6 => Self::LeftSideExtra,
            7 => Self::RightSideExtra,
            8 => Self::RingSpin,
            9 => Self::RingZoom,
            10 => Self::BillieLeftLasers,
            11 => Self::BillieRightLasers,
            12 => Self::LeftRotationSpeed,
            13 => Self::RightRotationSpeed,
            16 => Self::InterscopeHydraulicsDown,
            17 => Self::InterscopeHydraulicsUp,
            18 => Self::GagaLeftTowerHeight,
            19 => Self::GagaRightTowerHeight,
            _ => return None,
        };
        Some(kind)
    }

    /// Whether the event's value is a [`LightValue`] code.
    pub fn is_light(self) -> bool {
        matches!(
            self,
            Self::BackLasers
                | Self::Rings
                | Self::LeftRotatingLasers
                | Self::RightRotatingLasers
                | Self::CenterLights
                | Self::LeftSideExtra
                | Self::RightSideExtra
                | Self::BillieLeftLasers
                | Self::BillieRightLasers
        )
    }
}

/// The colour/behaviour of a lighting event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightValue {
    Off,
    BlueOn,
    BlueFlash,
    BlueFade,
    BlueTransition,
    RedOn,
    RedFlash,
    RedFade,
    RedTransition,
    WhiteOn,
    WhiteFlash,
    WhiteFade,
    WhiteTransition,
}

/// Which palette slot a light value draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightHue {
    Red,
    Blue,
    White,
}

/// How a light value behaves over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightBehavior {
    Off,
    On,
    Flash,
    Fade,
    Transition,
}

impl LightValue {
    const ALL: [LightValue; 13] = [
        Self::Off,
        Self::BlueOn,
        Self::BlueFlash,
        Self::BlueFade,
        Self::BlueTransition,
        Self::RedOn,
        Self::RedFlash,
        Self::RedFade,
        Self::RedTransition,
        Self::WhiteOn,
        Self::WhiteFlash,
        Self::WhiteFade,
        Self::WhiteTransition,
    ];

    /// Nearest valid value code.
    pub fn clamp_code(code: i32) -> i32 {
        code.clamp(0, Self::ALL.len() as i32 - 1)
    }

    /// Decode a value code, clamping out-of-range codes to the nearest valid one.
    pub fn from_code(code: i32) -> Self {
        Self::ALL[Self::clamp_code(code) as usize]
    }

    pub fn hue(self) -> Option<LightHue> {
        match self {
            Self::Off => None,
            Self::BlueOn | Self::BlueFlash | Self::BlueFade | Self::BlueTransition => {
                Some(LightHue::Blue)
            }
            Self::RedOn | Self::RedFlash | Self::RedFade | Self::RedTransition => {
                Some(LightHue::Red)
            }
            Self::WhiteOn | Self::WhiteFlash | Self::WhiteFade | Self::WhiteTransition => {
                Some(LightHue::White)
            }
        }
    }

    pub fn behavior(self) -> LightBehavior {
        match self {
            Self::Off => LightBehavior::Off,
            Self::BlueOn | Self::RedOn | Self::WhiteOn => LightBehavior::On,
            Self::BlueFlash | Self::RedFlash | Self::WhiteFlash => LightBehavior::Flash,
            Self::BlueFade | Self::RedFade | Self::WhiteFade => LightBehavior::Fade,
            Self::BlueTransition | Self::RedTransition | Self::WhiteTransition => {
                LightBehavior::Transition
            }
        }
    }

    pub fn is_transition(self) -> bool {
        self.behavior() == LightBehavior::Transition
    }
}

/// Per-kind data resolved during a population pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EventPayload {
    #[default]
    None,
    LaserSpeed(Vec<LaserRotation>),
    RingRotation(RingRotation),
    RingZoom(RingZoom),
}

/// One timed environment event.
///
/// `time` is always derived from `beat` through the difficulty's [`BeatClock`];
/// use [`TimedEvent::set_beat`] to move an event.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedEvent {
    beat: f32,
    time: f32,
    pub kind: EventType,
    /// Raw value code. A [`LightValue`] for light channels, a speed for laser speed channels.
    pub value: i32,
    pub float_value: f32,
    pub payload: EventPayload,
}

impl TimedEvent {
    pub fn new(
        clock: &dyn BeatClock,
        beat: f32,
        kind: EventType,
        value: i32,
        float_value: f32,
    ) -> Self {
        Self {
            beat,
            time: clock.time_from_beat(beat),
            kind,
            value,
            float_value,
            payload: EventPayload::None,
        }
    }

    /// Move the event, recomputing its time.
    pub fn set_beat(&mut self, clock: &dyn BeatClock, beat: f32) {
        self.beat = beat;
        self.time = clock.time_from_beat(beat);
    }

    pub fn light_value(&self) -> LightValue {
        LightValue::from_code(self.value)
    }

    pub fn laser_rotations(&self) -> &[LaserRotation] {
        match &self.payload {
            EventPayload::LaserSpeed(rotations) => rotations,
            _ => &[],
        }
    }

    pub fn ring_rotation(&self) -> Option<&RingRotation> {
        match &self.payload {
            EventPayload::RingRotation(r) => Some(r),
            _ => None,
        }
    }

    pub fn ring_zoom(&self) -> Option<&RingZoom> {
        match &self.payload {
            EventPayload::RingZoom(z) => Some(z),
            _ => None,
        }
    }
}

impl Timed for TimedEvent {
    fn beat(&self) -> f32 {
        self.beat
    }

    fn time(&self) -> f32 {
        self.time
    }
}
