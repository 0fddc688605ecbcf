//! Chained population of ring events.
//!
//! Event `i` starts from event `i - 1`'s curve evaluated at event `i`'s own
//! time, which keeps ring motion continuous however densely events are placed.
//! Re-run after any change to the event list.

use rand::Rng;

use super::{
    ring_angle, zoom_distance, RingGroup, RingRotation, RingZoom, START_ZOOM_PARITY,
    START_ZOOM_POSITION,
};
use crate::timeline::{EventPayload, Timed, TimedEvent};

/// Resolve start and target values for a group's rotation events.
///
/// Targets step a fixed rotation amount, in a random direction, from the
/// previous event's target so the rings stay on the group's angle grid.
pub fn populate_rotations(events: &mut [TimedEvent], group: &RingGroup, rng: &mut impl Rng) {
    for i in 0..events.len() {
        let (start_angle, start_step, base) = if i == 0 {
            (group.start_angle, group.start_step, group.start_angle)
        } else {
            let previous = &events[i - 1];
            let time = events[i].time();
            let target = previous.ring_rotation().copied().unwrap_or_default().target_angle;
            (
                ring_angle(previous, time, 0),
                step_at(previous, time),
                target,
            )
        };

        let rotation = if rng.gen_bool(0.5) {
            group.rotation_amount
        } else {
            -group.rotation_amount
        };
        let step = if group.max_step > 0.0 {
            rng.gen_range(-group.max_step..group.max_step)
        } else {
            0.0
        };

        events[i].payload = EventPayload::RingRotation(RingRotation {
            start_angle,
            target_angle: base + rotation,
            start_step,
            step,
        });
    }
}

/// Per-ring step offset of a rotation event at `time`.
fn step_at(event: &TimedEvent, time: f32) -> f32 {
    let Some(rotation) = event.ring_rotation() else {
        return 0.0;
    };
    let progress = crate::easing::exp_progress(time - event.time(), super::ROTATION_SPEED);
    rotation.step_angle(progress)
}

/// Resolve parity and start distance for zoom events.
///
/// Parity flips on every event; the first event flips away from the resting parity.
pub fn populate_zooms(events: &mut [TimedEvent]) {
    for i in 0..events.len() {
        let zoom = if i == 0 {
            RingZoom {
                far_parity: !START_ZOOM_PARITY,
                start_distance: START_ZOOM_POSITION,
            }
        } else {
            let previous = &events[i - 1];
            let far_parity = !previous.ring_zoom().copied().unwrap_or_default().far_parity;
            RingZoom {
                far_parity,
                start_distance: zoom_distance(previous, events[i].time()),
            }
        };
        events[i].payload = EventPayload::RingZoom(zoom);
    }
}
