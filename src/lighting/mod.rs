//! Lighting engine: per-channel colour resolution, boost palette swaps and
//! rotating laser speed lookup.
//!
//! Nothing here keeps per-frame state. Every [`LightingEngine::resolve`] call
//! recomputes each channel from its immutable event timeline, the query time
//! and a [`LightContext`] snapshot of palette, boost flag and settings.

pub mod laser;
pub mod resolve;

pub use laser::{LaserRotation, LASER_COUNT};
pub use resolve::LightContext;

use log::debug;
use rand::Rng;

use crate::color::{ColorPalette, Rgba};
use crate::config::{LightTuning, Settings, SettingsChange};
use crate::timeline::{EventType, LightValue, Timed, TimedEvent, Timeline};
use crate::timing::BeatClock;

/// Setting keys the lighting output depends on.
pub const LIGHT_SETTINGS: &[&str] = &["lightglowbrightness"];

/// The light groups a difficulty can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightChannel {
    BackLasers,
    Rings,
    LeftRotatingLasers,
    RightRotatingLasers,
    CenterLights,
}

impl LightChannel {
    pub const ALL: [LightChannel; 5] = [
        Self::BackLasers,
        Self::Rings,
        Self::LeftRotatingLasers,
        Self::RightRotatingLasers,
        Self::CenterLights,
    ];

    pub fn from_event_type(kind: EventType) -> Option<Self> {
        match kind {
            EventType::BackLasers => Some(Self::BackLasers),
            EventType::Rings => Some(Self::Rings),
            EventType::LeftRotatingLasers => Some(Self::LeftRotatingLasers),
            EventType::RightRotatingLasers => Some(Self::RightRotatingLasers),
            EventType::CenterLights => Some(Self::CenterLights),
            _ => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Which rotating laser group a speed update is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpeedChannel {
    Left,
    Right,
}

/// A colour boost toggle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoostEvent {
    beat: f32,
    time: f32,
    pub on: bool,
}

impl BoostEvent {
    pub fn new(clock: &dyn BeatClock, beat: f32, on: bool) -> Self {
        Self {
            beat,
            time: clock.time_from_beat(beat),
            on,
        }
    }
}

impl Timed for BoostEvent {
    fn beat(&self) -> f32 {
        self.beat
    }

    fn time(&self) -> f32 {
        self.time
    }
}

/// Resolved material values for one light channel on one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingUpdate {
    pub channel: LightChannel,
    /// Full-strength colour used for glow sprites. Alpha may exceed 1.
    pub glow_color: Rgba,
    /// Glow alpha after the brightness setting.
    pub glow_alpha: f32,
    /// Desaturated base colour for the light mesh.
    pub light_color: Rgba,
    /// HDR emission colour.
    pub emission_color: Rgba,
    /// Emission intensity, `light_emission * max(alpha, 1)`.
    pub emission: f32,
}

/// The active speed event of a rotating laser group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaserSpeedUpdate<'a> {
    pub channel: SpeedChannel,
    pub event: Option<&'a TimedEvent>,
}

/// Everything the lighting engine produces for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct LightingFrame<'a> {
    pub boost: bool,
    pub lights: Vec<LightingUpdate>,
    pub speeds: [LaserSpeedUpdate<'a>; 2],
}

/// Receives lighting results, once per channel per tick.
pub trait LightingSink {
    fn light_changed(&mut self, update: &LightingUpdate);
    fn laser_speed_changed(&mut self, update: &LaserSpeedUpdate<'_>);
}

/// Per-difficulty lighting timelines.
#[derive(Debug, Clone)]
pub struct LightingEngine {
    channels: [Timeline<TimedEvent>; 5],
    left_speed: Timeline<TimedEvent>,
    right_speed: Timeline<TimedEvent>,
    boosts: Timeline<BoostEvent>,
    tuning: LightTuning,
}

impl LightingEngine {
    /// An engine showing the static layout.
    pub fn new(clock: &dyn BeatClock, tuning: LightTuning) -> Self {
        let mut engine = Self {
            channels: Default::default(),
            left_speed: Timeline::new(),
            right_speed: Timeline::new(),
            boosts: Timeline::new(),
            tuning,
        };
        engine.set_static_layout(clock);
        engine
    }

    /// Replace every timeline from a difficulty's basic and boost events.
    ///
    /// Events of non-lighting types are ignored, so channels without events
    /// stay dark. Difficulties that author no basic events at all use
    /// [`LightingEngine::load_static_layout`] instead.
    pub fn load(
        &mut self,
        clock: &dyn BeatClock,
        events: &[TimedEvent],
        boosts: Vec<BoostEvent>,
        rng: &mut impl Rng,
    ) {
        self.boosts = Timeline::from_unsorted(boosts);

        let mut channels: [Vec<TimedEvent>; 5] = Default::default();
        let mut left_speed = Vec::new();
        let mut right_speed = Vec::new();
        for event in events {
            match event.kind {
                EventType::LeftRotationSpeed => left_speed.push(event.clone()),
                EventType::RightRotationSpeed => right_speed.push(event.clone()),
                kind => {
                    if let Some(channel) = LightChannel::from_event_type(kind) {
                        channels[channel.index()].push(event.clone());
                    }
                }
            }
        }

        self.channels = channels.map(Timeline::from_unsorted);
        self.left_speed = Timeline::from_unsorted(left_speed);
        self.right_speed = Timeline::from_unsorted(right_speed);
        laser::pair_laser_rotations(
            self.left_speed.as_mut_slice(),
            self.right_speed.as_mut_slice(),
            rng,
        );

        debug!(
            "loaded lighting: {} light events, {} left speed, {} right speed, {} boost",
            self.channels.iter().map(Timeline::len).sum::<usize>(),
            self.left_speed.len(),
            self.right_speed.len(),
            self.boosts.len()
        );
    }

    /// Replace every timeline with the static layout, keeping `boosts`.
    pub fn load_static_layout(&mut self, clock: &dyn BeatClock, boosts: Vec<BoostEvent>) {
        debug!("no basic events, using static light layout");
        self.boosts = Timeline::from_unsorted(boosts);
        self.set_static_layout(clock);
    }

    /// Fixed lighting for maps without events: blue back lasers, rings and
    /// center lights, rotating lasers off.
    fn set_static_layout(&mut self, clock: &dyn BeatClock) {
        self.channels = LightChannel::ALL.map(|channel| {
            let (kind, value) = match channel {
                LightChannel::BackLasers => (EventType::BackLasers, LightValue::BlueOn),
                LightChannel::Rings => (EventType::Rings, LightValue::BlueOn),
                LightChannel::LeftRotatingLasers => {
                    (EventType::LeftRotatingLasers, LightValue::Off)
                }
                LightChannel::RightRotatingLasers => {
                    (EventType::RightRotatingLasers, LightValue::Off)
                }
                LightChannel::CenterLights => (EventType::CenterLights, LightValue::BlueOn),
            };
            Timeline::from_unsorted(vec![TimedEvent::new(
                clock,
                0.0,
                kind,
                value as i32,
                1.0,
            )])
        });
        self.left_speed = Timeline::new();
        self.right_speed = Timeline::new();
    }

    pub fn set_tuning(&mut self, tuning: LightTuning) {
        self.tuning = tuning;
    }

    pub fn channel(&self, channel: LightChannel) -> &Timeline<TimedEvent> {
        &self.channels[channel.index()]
    }

    pub fn speed_events(&self, channel: SpeedChannel) -> &Timeline<TimedEvent> {
        match channel {
            SpeedChannel::Left => &self.left_speed,
            SpeedChannel::Right => &self.right_speed,
        }
    }

    /// Whether boost colours are active at `beat`.
    pub fn boost_at(&self, beat: f32) -> bool {
        self.boosts
            .last_index_at_beat(beat)
            .map(|i| self.boosts[i].on)
            .unwrap_or(false)
    }

    /// Resolve every channel at the given playback position.
    pub fn resolve(
        &self,
        beat: f32,
        time: f32,
        palette: &ColorPalette,
        settings: &Settings,
    ) -> LightingFrame<'_> {
        let boost = self.boost_at(beat);
        let ctx = LightContext {
            palette,
            boost,
            glow_brightness: settings.get_float("lightglowbrightness"),
            tuning: &self.tuning,
        };

        let lights = LightChannel::ALL
            .iter()
            .map(|&channel| {
                let timeline = &self.channels[channel.index()];
                let index = timeline.last_index_at(time);
                let current = index.map(|i| &timeline[i]);
                let next = index.and_then(|i| timeline.get(i + 1));
                let base = resolve::event_color(&ctx, current, next, time);
                resolve::channel_update(&ctx, channel, base)
            })
            .collect();

        let speeds = [
            LaserSpeedUpdate {
                channel: SpeedChannel::Left,
                event: self.left_speed.active(time),
            },
            LaserSpeedUpdate {
                channel: SpeedChannel::Right,
                event: self.right_speed.active(time),
            },
        ];

        LightingFrame {
            boost,
            lights,
            speeds,
        }
    }

    /// Resolve and hand every channel to `sink`.
    pub fn update(
        &self,
        beat: f32,
        time: f32,
        palette: &ColorPalette,
        settings: &Settings,
        sink: &mut dyn LightingSink,
    ) {
        let frame = self.resolve(beat, time, palette, settings);
        for update in &frame.lights {
            sink.light_changed(update);
        }
        for update in &frame.speeds {
            sink.laser_speed_changed(update);
        }
    }

    /// Re-emit after a settings change, if lighting depends on it.
    ///
    /// Returns whether anything was emitted.
    pub fn settings_changed(
        &self,
        change: &SettingsChange,
        beat: f32,
        time: f32,
        palette: &ColorPalette,
        settings: &Settings,
        sink: &mut dyn LightingSink,
    ) -> bool {
        if !change.affects(LIGHT_SETTINGS) {
            return false;
        }
        self.update(beat, time, palette, settings, sink);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::BpmMap;
    use assert_approx_eq::assert_approx_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[derive(Default)]
    struct Recorder {
        lights: Vec<LightingUpdate>,
        speeds: Vec<(SpeedChannel, Option<f32>)>,
    }

    impl LightingSink for Recorder {
        fn light_changed(&mut self, update: &LightingUpdate) {
            self.lights.push(*update);
        }
        fn laser_speed_changed(&mut self, update: &LaserSpeedUpdate<'_>) {
            self.speeds
                .push((update.channel, update.event.map(|e| e.beat())));
        }
    }

    fn clock() -> BpmMap {
        BpmMap::constant(60.0)
    }

    fn event(kind: EventType, beat: f32, value: LightValue) -> TimedEvent {
        TimedEvent::new(&clock(), beat, kind, value as i32, 1.0)
    }

    fn engine_with(events: Vec<TimedEvent>, boosts: Vec<BoostEvent>) -> LightingEngine {
        let clock = clock();
        let mut engine = LightingEngine::new(&clock, LightTuning::default());
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        engine.load(&clock, &events, boosts, &mut rng);
        engine
    }

    fn light(frame: &LightingFrame<'_>, channel: LightChannel) -> LightingUpdate {
        frame.lights[channel.index()]
    }

    #[test]
    fn static_layout_without_events() {
        let mut engine = engine_with(
            vec![event(EventType::BackLasers, 0.0, LightValue::RedOn)],
            Vec::new(),
        );
        engine.load_static_layout(&clock(), Vec::new());
        let palette = ColorPalette::default();
        let frame = engine.resolve(0.0, 0.0, &palette, &Settings::default());
        assert_eq!(
            light(&frame, LightChannel::BackLasers).glow_color,
            palette.light_color2
        );
        assert_eq!(
            light(&frame, LightChannel::LeftRotatingLasers).glow_color,
            Rgba::TRANSPARENT
        );
        assert!(frame.speeds.iter().all(|s| s.event.is_none()));
    }

    #[test]
    fn loading_no_light_events_goes_dark() {
        let engine = engine_with(Vec::new(), Vec::new());
        let frame = engine.resolve(5.0, 5.0, &ColorPalette::default(), &Settings::default());
        for channel in LightChannel::ALL {
            assert_eq!(light(&frame, channel).glow_color, Rgba::TRANSPARENT);
        }
    }

    #[test]
    fn routes_events_by_channel() {
        let engine = engine_with(
            vec![
                event(EventType::Rings, 2.0, LightValue::RedOn),
                event(EventType::BackLasers, 0.0, LightValue::BlueOn),
                event(EventType::RingSpin, 1.0, LightValue::Off),
                event(EventType::Rings, 1.0, LightValue::Off),
            ],
            Vec::new(),
        );
        assert_eq!(engine.channel(LightChannel::Rings).len(), 2);
        assert_eq!(engine.channel(LightChannel::BackLasers).len(), 1);
        assert!(engine.channel(LightChannel::CenterLights).is_empty());
        assert!(engine.channel(LightChannel::Rings).is_time_ordered());
    }

    #[test]
    fn before_first_event_is_off() {
        let engine = engine_with(
            vec![event(EventType::CenterLights, 4.0, LightValue::RedOn)],
            Vec::new(),
        );
        let frame = engine.resolve(1.0, 1.0, &ColorPalette::default(), &Settings::default());
        assert_eq!(
            light(&frame, LightChannel::CenterLights).glow_color,
            Rgba::TRANSPARENT
        );
    }

    #[test]
    fn boost_swaps_colours() {
        let palette = ColorPalette {
            boost_light_color1: Rgba::new(0.0, 1.0, 0.0, 1.0),
            ..ColorPalette::default()
        };
        let engine = engine_with(
            vec![event(EventType::BackLasers, 0.0, LightValue::RedOn)],
            vec![
                BoostEvent::new(&clock(), 2.0, true),
                BoostEvent::new(&clock(), 4.0, false),
            ],
        );
        let settings = Settings::default();
        let before = engine.resolve(1.0, 1.0, &palette, &settings);
        let during = engine.resolve(3.0, 3.0, &palette, &settings);
        let after = engine.resolve(5.0, 5.0, &palette, &settings);
        assert!(!before.boost && during.boost && !after.boost);
        assert_eq!(
            light(&during, LightChannel::BackLasers).glow_color,
            Rgba::new(0.0, 1.0, 0.0, 1.0)
        );
        assert_eq!(
            light(&after, LightChannel::BackLasers).glow_color,
            palette.light_color1
        );
    }

    #[test]
    fn glow_alpha_follows_brightness_setting() {
        let engine = engine_with(
            vec![event(EventType::BackLasers, 0.0, LightValue::BlueOn)],
            Vec::new(),
        );
        let settings = Settings {
            light_glow_brightness: 0.25,
            ..Settings::default()
        };
        let frame = engine.resolve(1.0, 1.0, &ColorPalette::default(), &settings);
        assert_approx_eq!(light(&frame, LightChannel::BackLasers).glow_alpha, 0.25);
    }

    #[test]
    fn update_emits_every_channel() {
        let engine = engine_with(
            vec![
                event(EventType::BackLasers, 0.0, LightValue::BlueOn),
                TimedEvent::new(&clock(), 1.0, EventType::LeftRotationSpeed, 3, 1.0),
            ],
            Vec::new(),
        );
        let mut sink = Recorder::default();
        engine.update(2.0, 2.0, &ColorPalette::default(), &Settings::default(), &mut sink);
        assert_eq!(sink.lights.len(), LightChannel::ALL.len());
        assert_eq!(
            sink.speeds,
            vec![(SpeedChannel::Left, Some(1.0)), (SpeedChannel::Right, None)]
        );
    }

    #[test]
    fn speed_events_are_paired_on_load() {
        let engine = engine_with(
            vec![
                TimedEvent::new(&clock(), 1.0, EventType::LeftRotationSpeed, 3, 1.0),
                TimedEvent::new(&clock(), 1.0, EventType::RightRotationSpeed, 3, 1.0),
            ],
            Vec::new(),
        );
        let left = &engine.speed_events(SpeedChannel::Left)[0];
        let right = &engine.speed_events(SpeedChannel::Right)[0];
        assert_eq!(left.laser_rotations().len(), LASER_COUNT);
        assert_eq!(left.laser_rotations(), right.laser_rotations());
    }

    #[test]
    fn settings_change_filtering() {
        let engine = engine_with(Vec::new(), Vec::new());
        let palette = ColorPalette::default();
        let settings = Settings::default();
        let mut sink = Recorder::default();
        assert!(!engine.settings_changed(
            &SettingsChange::key("simplenotes"),
            0.0,
            0.0,
            &palette,
            &settings,
            &mut sink
        ));
        assert!(sink.lights.is_empty());
        assert!(engine.settings_changed(
            &SettingsChange::key("lightglowbrightness"),
            0.0,
            0.0,
            &palette,
            &settings,
            &mut sink
        ));
        assert_eq!(sink.lights.len(), 5);
    }
}
