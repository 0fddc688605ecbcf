//! Colour of a single light channel at a point in time.

use super::{LightChannel, LightingUpdate};
use crate::color::{ColorPalette, Rgba};
use crate::config::LightTuning;
use crate::easing;
use crate::timeline::event::LightBehavior;
use crate::timeline::{Timed, TimedEvent};

const FLASH_INTENSITY: f32 = 1.5;
const FLASH_FADE_TIME: f32 = 0.5;
const FADE_INTENSITY: f32 = 1.2;
const FADE_TIME: f32 = 0.8;

/// Everything a channel resolution reads besides its own events.
#[derive(Debug, Clone, Copy)]
pub struct LightContext<'a> {
    pub palette: &'a ColorPalette,
    pub boost: bool,
    pub glow_brightness: f32,
    pub tuning: &'a LightTuning,
}

/// The steady colour an event settles on: palette colour at the event's
/// float value. Flashes, fades and off resolve to transparent, since a
/// transition never targets them.
fn steady_color(ctx: &LightContext<'_>, event: &TimedEvent) -> Rgba {
    let value = event.light_value();
    match (value.behavior(), value.hue()) {
        (LightBehavior::On | LightBehavior::Transition, Some(hue)) => ctx
            .palette
            .light(hue, ctx.boost)
            .with_alpha(event.float_value),
        _ => Rgba::TRANSPARENT,
    }
}

/// Base colour of a channel whose active event is `current` and whose next
/// event is `next`, at playback `time`.
pub fn event_color(
    ctx: &LightContext<'_>,
    current: Option<&TimedEvent>,
    next: Option<&TimedEvent>,
    time: f32,
) -> Rgba {
    let Some(event) = current else {
        return Rgba::TRANSPARENT;
    };
    let value = event.light_value();
    let Some(hue) = value.hue() else {
        return Rgba::TRANSPARENT;
    };
    let base = ctx.palette.light(hue, ctx.boost);
    let elapsed = time - event.time();

    match value.behavior() {
        LightBehavior::Off => Rgba::TRANSPARENT,
        LightBehavior::On | LightBehavior::Transition => {
            let color = base.with_alpha(event.float_value);
            match next {
                Some(next) if next.light_value().is_transition() => {
                    let span = next.time() - event.time();
                    let t = if span > 0.0 { elapsed / span } else { 1.0 };
                    color.lerp(steady_color(ctx, next), easing::quad_in_out(t))
                }
                _ => color,
            }
        }
        LightBehavior::Flash => {
            let v = event.float_value;
            base.with_alpha(easing::decay_alpha(
                v * FLASH_INTENSITY,
                v,
                FLASH_FADE_TIME,
                elapsed,
            ))
        }
        LightBehavior::Fade => {
            let v = event.float_value;
            base.with_alpha(easing::decay_alpha(
                v * FADE_INTENSITY,
                0.0,
                FADE_TIME,
                elapsed,
            ))
        }
    }
}

/// Derive the material values for `channel` from its base colour.
pub fn channel_update(ctx: &LightContext<'_>, channel: LightChannel, base: Rgba) -> LightingUpdate {
    let tuning = ctx.tuning;
    // Alpha below 1 already dims the light; only overdrive boosts emission.
    let emission = tuning.light_emission * base.a.max(1.0);
    let alpha = base.a.clamp(0.0, 1.0);
    let (h, s, _) = base.to_hsv();

    LightingUpdate {
        channel,
        glow_color: base,
        glow_alpha: base.a * ctx.glow_brightness,
        light_color: base.desaturate(tuning.light_saturation),
        emission_color: Rgba::from_hsv(h, s * tuning.light_emission_saturation, emission, alpha),
        emission,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{EventType, LightValue};
    use crate::timing::BpmMap;
    use assert_approx_eq::assert_approx_eq;

    fn event(beat: f32, value: LightValue, float_value: f32) -> TimedEvent {
        TimedEvent::new(
            &BpmMap::constant(60.0),
            beat,
            EventType::BackLasers,
            value as i32,
            float_value,
        )
    }

    fn with_ctx<R>(f: impl FnOnce(&LightContext<'_>) -> R) -> R {
        let palette = ColorPalette::default();
        let tuning = LightTuning::default();
        let ctx = LightContext {
            palette: &palette,
            boost: false,
            glow_brightness: 1.0,
            tuning: &tuning,
        };
        f(&ctx)
    }

    #[test]
    fn no_event_or_off_is_transparent() {
        with_ctx(|ctx| {
            assert_eq!(event_color(ctx, None, None, 1.0), Rgba::TRANSPARENT);
            let off = event(0.0, LightValue::Off, 1.0);
            assert_eq!(event_color(ctx, Some(&off), None, 1.0), Rgba::TRANSPARENT);
        });
    }

    #[test]
    fn steady_on_uses_float_value() {
        with_ctx(|ctx| {
            let on = event(0.0, LightValue::RedOn, 0.6);
            let c = event_color(ctx, Some(&on), None, 5.0);
            assert_eq!(c, ctx.palette.light_color1.with_alpha(0.6));
        });
    }

    #[test]
    fn transition_blends_towards_next() {
        with_ctx(|ctx| {
            let on = event(0.0, LightValue::RedOn, 1.0);
            let next = event(2.0, LightValue::BlueTransition, 1.0);
            let start = event_color(ctx, Some(&on), Some(&next), 0.0);
            let mid = event_color(ctx, Some(&on), Some(&next), 1.0);
            let end = event_color(ctx, Some(&on), Some(&next), 2.0);
            assert_eq!(start, ctx.palette.light_color1);
            assert_eq!(end, ctx.palette.light_color2);
            let expected = ctx.palette.light_color1.lerp(ctx.palette.light_color2, 0.5);
            assert_approx_eq!(mid.r, expected.r);
            assert_approx_eq!(mid.b, expected.b);
        });
    }

    #[test]
    fn non_transition_next_does_not_blend() {
        with_ctx(|ctx| {
            let on = event(0.0, LightValue::RedOn, 1.0);
            let next = event(2.0, LightValue::BlueOn, 1.0);
            let mid = event_color(ctx, Some(&on), Some(&next), 1.0);
            assert_eq!(mid, ctx.palette.light_color1);
        });
    }

    #[test]
    fn same_time_transition_snaps_to_target() {
        with_ctx(|ctx| {
            let on = event(1.0, LightValue::RedOn, 1.0);
            let next = event(1.0, LightValue::WhiteTransition, 0.5);
            let c = event_color(ctx, Some(&on), Some(&next), 1.0);
            assert_eq!(c, ctx.palette.white_light_color.with_alpha(0.5));
        });
    }

    #[test]
    fn flash_decays_to_value() {
        with_ctx(|ctx| {
            let flash = event(1.0, LightValue::BlueFlash, 0.8);
            let at = |t| event_color(ctx, Some(&flash), None, t).a;
            assert_approx_eq!(at(1.0), 1.2);
            assert_eq!(at(1.5), 0.8);
            assert_eq!(at(9.0), 0.8);
            assert!(at(1.25) < 1.2 && at(1.25) > 0.8);
        });
    }

    #[test]
    fn fade_decays_to_zero() {
        with_ctx(|ctx| {
            let fade = event(1.0, LightValue::WhiteFade, 1.0);
            let at = |t| event_color(ctx, Some(&fade), None, t).a;
            assert_approx_eq!(at(1.0), 1.2);
            assert_eq!(at(1.8), 0.0);
            assert_eq!(at(0.99), 0.0);
        });
    }

    #[test]
    fn emission_scales_with_overdriven_alpha() {
        with_ctx(|ctx| {
            let dim = channel_update(ctx, LightChannel::Rings, ctx.palette.light_color1.with_alpha(0.5));
            let hot = channel_update(ctx, LightChannel::Rings, ctx.palette.light_color1.with_alpha(1.5));
            assert_approx_eq!(dim.emission, ctx.tuning.light_emission);
            assert_approx_eq!(hot.emission, ctx.tuning.light_emission * 1.5);
            assert_approx_eq!(hot.light_color.a, 1.0);
            assert_approx_eq!(hot.emission_color.a, 1.0);
            assert_approx_eq!(dim.glow_alpha, 0.5);
            assert_eq!(dim.channel, LightChannel::Rings);
        });
    }

    #[test]
    fn light_colour_is_desaturated() {
        with_ctx(|ctx| {
            let base = ctx.palette.light_color1;
            let update = channel_update(ctx, LightChannel::Rings, base);
            let (_, s_base, v_base) = base.to_hsv();
            let (_, s, v) = update.light_color.to_hsv();
            assert_approx_eq!(s, s_base * ctx.tuning.light_saturation, 1e-4);
            assert_approx_eq!(v, v_base, 1e-4);
        });
    }
}
