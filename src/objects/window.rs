//! The spawn window: which objects need a visual at the current time, and
//! where along the approach path they are.

use crate::config::{ObjectAnimation, Settings};

/// How long a hit-sound visual lingers ahead of the playhead in replay mode.
pub const REPLAY_LOOKAHEAD: f32 = 0.5;

/// Difficulty-level approach parameters, supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpSettings {
    /// Note jump speed, world units per second.
    pub njs: f32,
    /// Seconds an object is visible before it reaches the player.
    pub reaction_time: f32,
    /// World distance covered during the reaction time, both halves.
    pub jump_distance: f32,
}

impl JumpSettings {
    /// Derive jump distance from speed and reaction time.
    pub fn new(njs: f32, reaction_time: f32) -> Self {
        Self {
            njs,
            reaction_time,
            jump_distance: njs * reaction_time * 2.0,
        }
    }
}

/// A frame's view of the spawn window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnContext {
    /// Current playback time in seconds.
    pub now: f32,
    pub jump: JumpSettings,
    pub move_z: f32,
    pub move_time: f32,
    pub rotation_animation_time: f32,
    pub behind_camera_z: f32,
    pub object_floor_offset: f32,
    pub player_height_offset: f32,
    pub move_animations: bool,
    pub rotate_animations: bool,
    /// Crossed note pairs swap sides during the jump.
    pub flip_animations: bool,
    pub mapping_extensions: bool,
    pub replay_mode: bool,
}

impl SpawnContext {
    pub fn new(now: f32, jump: JumpSettings, animation: &ObjectAnimation, settings: &Settings) -> Self {
        Self {
            now,
            jump,
            move_z: animation.move_z,
            move_time: animation.move_time,
            rotation_animation_time: animation.rotation_animation_time,
            behind_camera_z: animation.behind_camera_z,
            object_floor_offset: animation.object_floor_offset,
            player_height_offset: animation.player_height_offset,
            move_animations: settings.move_animations,
            rotate_animations: settings.rotate_animations,
            flip_animations: settings.flip_animations,
            mapping_extensions: false,
            replay_mode: false,
        }
    }

    /// The same context at another playback time.
    pub fn at(&self, now: f32) -> Self {
        Self { now, ..*self }
    }

    pub fn world_from_time(&self, time: f32) -> f32 {
        time * self.jump.njs
    }

    pub fn time_from_world(&self, z: f32) -> f32 {
        if self.jump.njs == 0.0 {
            0.0
        } else {
            z / self.jump.njs
        }
    }

    /// Seconds (negative) an object stays visible after passing the player.
    pub fn behind_camera_time(&self) -> f32 {
        self.time_from_world(self.behind_camera_z)
    }

    /// Earliest end time an object can have and still be in the window.
    /// A span ending before this has passed the camera for good.
    pub fn trailing_bound(&self) -> f32 {
        self.now + self.behind_camera_time().min(0.0)
    }

    /// Latest object time that can be in the window right now.
    pub fn spawn_horizon(&self) -> f32 {
        self.now + self.jump.reaction_time + self.move_time
    }

    /// Point-object window: `time <= now + reaction (+ move)` and
    /// `time > now (+ behind-camera time when extended)`.
    pub fn in_spawn_range(&self, time: f32, extend_behind_camera: bool, include_move_time: bool) -> bool {
        let despawn = if extend_behind_camera {
            self.now + self.behind_camera_time()
        } else {
            self.now
        };
        let mut spawn = self.now + self.jump.reaction_time;
        if include_move_time {
            spawn += self.move_time;
        }
        time <= spawn && time > despawn
    }

    /// Window for objects spanning `[start, end]`: in range while the playhead
    /// is inside the span, or while the start is in the point window.
    pub fn duration_in_spawn_range(
        &self,
        start: f32,
        end: f32,
        extend_behind_camera: bool,
        include_move_time: bool,
    ) -> bool {
        let end = if extend_behind_camera {
            end - self.behind_camera_time()
        } else {
            end
        };
        let in_span = self.now >= start && self.now <= end;
        in_span || self.in_spawn_range(start, extend_behind_camera, include_move_time)
    }

    /// Distance along the track of an object at `object_time`.
    ///
    /// Jumped-in objects move at NJS; objects still flying in cover `move_z`
    /// over `move_time` before reaching the jump point at half the jump distance.
    pub fn z_position(&self, object_time: f32) -> f32 {
        let jump_time = self.now + self.jump.reaction_time;
        if object_time <= jump_time {
            self.world_from_time(object_time - self.now)
        } else {
            let progress = if self.move_time > 0.0 {
                (object_time - jump_time) / self.move_time
            } else {
                0.0
            };
            self.jump.jump_distance / 2.0 + self.move_z * progress
        }
    }

    /// Height of an object rising from `start_y` to `target_y` as it jumps in.
    pub fn object_y(&self, start_y: f32, target_y: f32, object_time: f32) -> f32 {
        let jump_time = self.now + self.jump.reaction_time;
        if object_time > jump_time {
            start_y
        } else if object_time < self.now {
            target_y
        } else {
            spawn_parabola(
                target_y,
                start_y,
                self.jump.jump_distance / 2.0,
                self.z_position(object_time),
            )
        }
    }
}

/// Downward-opening parabola through `base` at `z = half_jump_distance`
/// and peaking at `target` at `z = 0`.
pub fn spawn_parabola(target: f32, base: f32, half_jump_distance: f32, z: f32) -> f32 {
    if half_jump_distance == 0.0 {
        return target;
    }
    let range = target - base;
    -(range / (half_jump_distance * half_jump_distance)) * z * z + target
}
