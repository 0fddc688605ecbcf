//! The five map object kinds and their spawn windows.

use super::geometry::{object_angle, LANE_WIDTH, WALL_H_SCALE};
use super::lifecycle::{Placement, Spawnable};
use super::window::{SpawnContext, REPLAY_LOOKAHEAD};
use crate::color::{ColorPalette, Rgba};
use crate::easing;
use std::f32::consts::PI;
use crate::timeline::Timed;
use crate::timing::BeatClock;

/// Beat and derived time of a map object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectTime {
    beat: f32,
    time: f32,
}

impl ObjectTime {
    pub fn new(clock: &dyn BeatClock, beat: f32) -> Self {
        Self {
            beat,
            time: clock.time_from_beat(beat),
        }
    }
}

macro_rules! impl_timed {
    ($($kind:ty),*) => {
        $(impl Timed for $kind {
            fn beat(&self) -> f32 {
                self.at.beat
            }
            fn time(&self) -> f32 {
                self.at.time
            }
        })*
    };
}

impl_timed!(Note, Bomb, Wall, Arc, Chain);

/// Whether a hit-sound emitter's visual should outlive its window.
fn hit_sound_lingers(time: f32, ctx: &SpawnContext, audio_playing: bool) -> bool {
    audio_playing || (ctx.replay_mode && time > ctx.now && time < ctx.now + REPLAY_LOOKAHEAD)
}

/// Position of a point object, with the jump-in rise when move animations are on.
fn point_position(position: [f32; 2], start_y: f32, time: f32, ctx: &SpawnContext) -> [f32; 3] {
    let mut y = position[1] + ctx.player_height_offset;
    if ctx.move_animations {
        y = ctx.object_y(start_y, y, time);
    }
    [position[0], y, ctx.z_position(time)]
}

/// A colour note.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub(super) at: ObjectTime,
    /// 0 left, 1 right.
    pub color: i32,
    pub cut_direction: i32,
    /// Final rotation in degrees.
    pub angle: f32,
    pub position: [f32; 2],
    /// Height the note rises from during the jump.
    pub start_y: f32,
    pub is_chain_head: bool,
    /// Dodge height while swapping sides with its partner; zero when the
    /// note does not flip.
    pub flip_y_height: f32,
    /// X position the flip starts from (the partner's lane).
    pub flip_start_x: f32,
    /// Replay data: the note was cut.
    pub was_hit: bool,
    pub custom_color: Option<Rgba>,
}

impl Note {
    /// The note's displayed colour.
    pub fn display_color(&self, palette: &ColorPalette, chroma_colors: bool) -> Rgba {
        match self.custom_color {
            Some(color) if chroma_colors => color,
            _ => palette.note(self.color),
        }
    }

    /// Rotation at `ctx.now`. With rotate animations, the note turns from
    /// neutral to its cut direction just after jumping in.
    pub fn current_angle(&self, ctx: &SpawnContext) -> f32 {
        if !ctx.rotate_animations || ctx.rotation_animation_time <= 0.0 {
            return self.angle;
        }
        let jump_time = ctx.now + ctx.jump.reaction_time;
        let progress = (jump_time - self.at.time) / ctx.rotation_animation_time;
        easing::lerp(0.0, self.angle, easing::quad_out(progress))
    }

    /// X position and extra height while swapping sides, or `None` once the
    /// swap is over (or when the note does not flip).
    ///
    /// The swap runs over the first half of the jump: x eases from the
    /// partner's lane to the note's own while y bumps out by the flip height.
    pub fn flip_offset(&self, ctx: &SpawnContext) -> Option<(f32, f32)> {
        if !ctx.flip_animations || self.flip_y_height == 0.0 || ctx.jump.reaction_time <= 0.0 {
            return None;
        }
        let progress = 1.0 - (self.at.time - ctx.now) / ctx.jump.reaction_time;
        if progress >= 0.5 {
            return None;
        }
        if progress < 0.0 {
            return Some((self.flip_start_x, 0.0));
        }
        let x = easing::lerp(
            self.flip_start_x,
            self.position[0],
            easing::quad_in_out(progress * 2.0),
        );
        let lift = self.flip_y_height * (0.5 - 0.5 * (progress * 4.0 * PI).cos());
        Some((x, lift))
    }
}

impl Spawnable for Note {
    fn in_spawn_range(&self, ctx: &SpawnContext) -> bool {
        ctx.in_spawn_range(self.at.time, !self.was_hit, true)
    }

    fn lingers(&self, ctx: &SpawnContext, audio_playing: bool) -> bool {
        hit_sound_lingers(self.at.time, ctx, audio_playing)
    }

    fn placement(&self, ctx: &SpawnContext) -> Placement {
        let mut position = point_position(self.position, self.start_y, self.at.time, ctx);
        if let Some((x, lift)) = self.flip_offset(ctx) {
            position[0] = x;
            position[1] += lift;
        }
        Placement {
            angle: self.current_angle(ctx),
            ..Placement::at(position)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bomb {
    pub(super) at: ObjectTime,
    pub position: [f32; 2],
    pub start_y: f32,
    pub was_hit: bool,
    pub custom_color: Option<Rgba>,
}

impl Spawnable for Bomb {
    fn in_spawn_range(&self, ctx: &SpawnContext) -> bool {
        ctx.in_spawn_range(self.at.time, !self.was_hit, true)
    }

    fn lingers(&self, ctx: &SpawnContext, audio_playing: bool) -> bool {
        hit_sound_lingers(self.at.time, ctx, audio_playing)
    }

    fn placement(&self, ctx: &SpawnContext) -> Placement {
        Placement::at(point_position(self.position, self.start_y, self.at.time, ctx))
    }
}

/// An obstacle.
#[derive(Debug, Clone, PartialEq)]
pub struct Wall {
    pub(super) at: ObjectTime,
    /// Length in seconds, never negative.
    pub duration: f32,
    pub position: [f32; 2],
    /// Width in lanes.
    pub width: f32,
    /// Height in rows.
    pub height: f32,
    pub custom_color: Option<Rgba>,
}

impl Wall {
    pub fn display_color(&self, palette: &ColorPalette, chroma_colors: bool) -> Rgba {
        match self.custom_color {
            Some(color) if chroma_colors => color,
            _ => palette.wall_color,
        }
    }
}

impl Spawnable for Wall {
    fn end_time(&self) -> f32 {
        self.at.time + self.duration
    }

    fn in_spawn_range(&self, ctx: &SpawnContext) -> bool {
        ctx.duration_in_spawn_range(self.at.time, self.end_time(), true, true)
    }

    /// Front face position; the mesh extends `scale[2]` along the track.
    fn placement(&self, ctx: &SpawnContext) -> Placement {
        let [x, y] = self.position;
        Placement {
            position: [x, y + ctx.player_height_offset, ctx.z_position(self.at.time)],
            angle: 0.0,
            scale: [
                self.width * LANE_WIDTH,
                self.height * WALL_H_SCALE,
                ctx.world_from_time(self.duration),
            ],
        }
    }
}

/// A slider arc from head to tail.
#[derive(Debug, Clone, PartialEq)]
pub struct Arc {
    pub(super) at: ObjectTime,
    pub(super) tail: ObjectTime,
    pub color: i32,
    pub position: [f32; 2],
    pub tail_position: [f32; 2],
    pub head_direction: i32,
    pub tail_direction: i32,
    pub head_magnitude: f32,
    pub tail_magnitude: f32,
    pub mid_anchor: i32,
    pub head_start_y: f32,
    pub tail_start_y: f32,
    pub has_head_attachment: bool,
    pub has_tail_attachment: bool,
}

impl Arc {
    pub fn tail_beat(&self) -> f32 {
        self.tail.beat
    }

    pub fn tail_time(&self) -> f32 {
        self.tail.time
    }

    /// Direction the arc leaves its head in.
    pub fn head_angle(&self, mapping_extensions: bool) -> f32 {
        object_angle(self.head_direction, 0.0, mapping_extensions)
    }

    /// Direction the arc arrives at its tail from.
    pub fn tail_angle(&self, mapping_extensions: bool) -> f32 {
        object_angle(self.tail_direction, 0.0, mapping_extensions)
    }
}

impl Spawnable for Arc {
    fn end_time(&self) -> f32 {
        self.tail.time
    }

    fn in_spawn_range(&self, ctx: &SpawnContext) -> bool {
        ctx.duration_in_spawn_range(self.at.time, self.tail.time, true, true)
    }

    fn placement(&self, ctx: &SpawnContext) -> Placement {
        let head = point_position(self.position, self.head_start_y, self.at.time, ctx);
        Placement {
            scale: [1.0, 1.0, ctx.z_position(self.tail.time) - head[2]],
            ..Placement::at(head)
        }
    }
}

/// A burst slider: a head note followed by squished segments.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub(super) at: ObjectTime,
    pub(super) tail: ObjectTime,
    pub color: i32,
    pub position: [f32; 2],
    pub tail_position: [f32; 2],
    pub cut_direction: i32,
    pub angle: f32,
    pub segments: i32,
    pub squish: f32,
}

impl Chain {
    pub fn tail_time(&self) -> f32 {
        self.tail.time
    }
}

impl Spawnable for Chain {
    fn end_time(&self) -> f32 {
        self.tail.time
    }

    fn in_spawn_range(&self, ctx: &SpawnContext) -> bool {
        ctx.duration_in_spawn_range(self.at.time, self.tail.time, true, true)
    }

    fn placement(&self, ctx: &SpawnContext) -> Placement {
        let head = point_position(self.position, self.position[1], self.at.time, ctx);
        Placement {
            position: head,
            angle: self.angle,
            scale: [1.0, 1.0, ctx.z_position(self.tail.time) - head[2]],
        }
    }
}
