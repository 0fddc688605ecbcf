//! Rotating laser speed events and left/right pairing.
//!
//! Each speed event carries a start angle and spin direction for every
//! physical laser unit. Left and right speed events that fire together must
//! spin identically, so the right channel copies the left channel's draws
//! whenever their times match.

use rand::Rng;

use crate::timeline::{EventPayload, Timed, TimedEvent};
use crate::timing::same_time;

/// Physical laser units per rotating laser group.
pub const LASER_COUNT: usize = 4;

/// Degrees per second per unit of speed value.
pub const DEGREES_PER_SPEED: f32 = 20.0;

/// Where one laser unit starts and which way it spins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaserRotation {
    /// Start angle in degrees, `[0, 360)`.
    pub start_position: f32,
    /// `true` spins towards increasing angles.
    pub direction: bool,
}

/// Rotation speed of a speed event, in degrees per second.
pub fn rotation_speed(event: &TimedEvent) -> f32 {
    event.value as f32 * DEGREES_PER_SPEED
}

/// Fresh per-unit rotation data for a speed event with `speed`.
///
/// Stopped lasers (speed 0 or below) all rest at angle 0.
pub fn random_rotations(speed: i32, rng: &mut impl Rng) -> Vec<LaserRotation> {
    (0..LASER_COUNT)
        .map(|_| {
            if speed > 0 {
                LaserRotation {
                    start_position: rng.gen_range(0.0..360.0),
                    direction: rng.gen_bool(0.5),
                }
            } else {
                LaserRotation {
                    start_position: 0.0,
                    direction: false,
                }
            }
        })
        .collect()
}

/// Populate rotation data for both speed channels.
///
/// Left events draw independently. Right events are merge-joined against the
/// left list: a left event at the same time (within the shared leeway) hands
/// over its data verbatim, otherwise the right event draws its own. The left
/// cursor only moves past events whose beat precedes the current right event,
/// so later right events can still match them.
pub fn pair_laser_rotations(
    left: &mut [TimedEvent],
    right: &mut [TimedEvent],
    rng: &mut impl Rng,
) {
    for event in left.iter_mut() {
        event.payload = EventPayload::LaserSpeed(random_rotations(event.value, rng));
    }

    let left: &[TimedEvent] = left;
    let mut cursor = 0;
    for event in right.iter_mut() {
        let rotations = loop {
            match left.get(cursor) {
                Some(l) if same_time(event.time(), l.time()) => {
                    break l.laser_rotations().to_vec();
                }
                Some(l) if l.beat() >= event.beat() => {
                    break random_rotations(event.value, rng);
                }
                Some(_) => cursor += 1,
                None => break random_rotations(event.value, rng),
            }
        };
        event.payload = EventPayload::LaserSpeed(rotations);
    }
}

/// Angle of laser `unit` at `time` under speed event `event`, in `[0, 360)`.
///
/// Units without rotation data, or times before the event, sit at the start angle.
pub fn laser_angle(event: &TimedEvent, unit: usize, time: f32) -> f32 {
    let Some(rotation) = event.laser_rotations().get(unit) else {
        return 0.0;
    };
    let elapsed = (time - event.time()).max(0.0);
    let sign = if rotation.direction { 1.0 } else { -1.0 };
    (rotation.start_position + sign * rotation_speed(event) * elapsed).rem_euclid(360.0)
}
