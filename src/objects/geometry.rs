//! Grid placement and cut-direction angles.

/// Bottom-left lane/row origin in world units.
pub const GRID_BOTTOM_LEFT: [f32; 2] = [-0.9, 0.0];
pub const LANE_WIDTH: f32 = 0.6;
pub const ROW_HEIGHT: f32 = 0.55;
pub const START_Y_SPACING: f32 = 0.6;
pub const WALL_H_SCALE: f32 = 0.6;
pub const PRECISION_UNITS: f32 = 0.6;

/// Cut direction code of a dot note.
pub const DOT_DIRECTION: i32 = 8;
/// Largest gap (degrees) between a cut direction and the line through a
/// same-colour pair for the pair to snap onto that line.
pub const SNAP_TOLERANCE: f32 = 45.0;
/// Dodge heights of a crossed note pair swapping sides during the jump.
pub const FLIP_UP_HEIGHT: f32 = 0.45;
pub const FLIP_DOWN_HEIGHT: f32 = 0.15;

/// Rotation (degrees) for each cut direction code 0..=8.
const DIRECTION_ANGLES: [f32; 9] = [180.0, 0.0, -90.0, 90.0, -135.0, 135.0, -45.0, 45.0, 0.0];

/// The opposite cut direction for each code 0..=8. Dot (8) stays a dot.
const REVERSE_CUT_DIRECTION: [i32; 9] = [1, 0, 3, 2, 7, 6, 5, 4, 8];

/// Clamp a raw cut direction into the table range.
fn direction_index(cut_direction: i32) -> usize {
    cut_direction.clamp(0, 8) as usize
}

/// Mapping-extension precision coordinates: values at least 1000 away from
/// zero sit on a grid a thousand times finer.
pub fn precision_coordinate(value: f32) -> f32 {
    if value.abs() >= 1000.0 {
        (value - 1000.0 * value.signum()) / 1000.0
    } else {
        value
    }
}

/// Mapping-extension angle for cut directions of 1000 and up.
pub fn precision_angle(cut_direction: i32) -> Option<f32> {
    if cut_direction < 1000 {
        return None;
    }
    let mut angle = ((cut_direction - 1000) % 360) as f32;
    if angle > 180.0 {
        angle -= 360.0;
    }
    Some(-angle)
}

/// Local position of an object in grid lane `x`, row `y`.
///
/// Explicit `coordinates` (custom data) win over the grid; with mapping
/// extensions the lane and row may be fractional precision values; otherwise
/// both are clamped to the 4×3 vanilla grid.
pub fn object_position(x: f32, y: f32, coordinates: Option<[f32; 2]>, mapping_extensions: bool) -> [f32; 2] {
    let [ox, oy] = GRID_BOTTOM_LEFT;
    if let Some([cx, cy]) = coordinates {
        return [ox + (cx + 2.0) * PRECISION_UNITS, oy + cy * PRECISION_UNITS];
    }
    if mapping_extensions {
        return [
            ox + precision_coordinate(x) * PRECISION_UNITS,
            oy + precision_coordinate(y) * PRECISION_UNITS,
        ];
    }
    let lane = x.clamp(0.0, 3.0).trunc();
    let row = y.clamp(0.0, 2.0).trunc();
    [ox + lane * LANE_WIDTH, oy + row * ROW_HEIGHT]
}

/// Rotation of a note with the given cut direction.
pub fn object_angle(cut_direction: i32, angle_offset: f32, mapping_extensions: bool) -> f32 {
    if mapping_extensions {
        if let Some(angle) = precision_angle(cut_direction) {
            return angle;
        }
    }
    DIRECTION_ANGLES[direction_index(cut_direction)] + angle_offset
}

pub fn reverse_cut_direction(cut_direction: i32) -> i32 {
    REVERSE_CUT_DIRECTION[direction_index(cut_direction)]
}

/// Unit vector a note with rotation `angle` (degrees) points along.
pub fn direction_vector(angle: f32) -> [f32; 2] {
    let rad = angle.to_radians();
    [rad.sin(), -rad.cos()]
}

/// Wrap an angle into `(-180, 180]`.
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Rotation pointing from `from` to `to`, measured on the lane/row grid.
pub fn angle_between(from: [f32; 2], to: [f32; 2]) -> f32 {
    let dx = (to[0] - from[0]) / LANE_WIDTH;
    let dy = (to[1] - from[1]) / ROW_HEIGHT;
    dx.atan2(-dy).to_degrees()
}

/// Rotation a same-colour pair at `a` and `b` snaps to: the line through
/// both, facing the side nearer `cut_angle`, if within [`SNAP_TOLERANCE`].
pub fn snap_angle(cut_angle: f32, a: [f32; 2], b: [f32; 2]) -> Option<f32> {
    if a == b {
        return None;
    }
    let line = angle_between(a, b);
    let snapped = if normalize_angle(line - cut_angle).abs() > 90.0 {
        normalize_angle(line + 180.0)
    } else {
        line
    };
    (normalize_angle(snapped - cut_angle).abs() <= SNAP_TOLERANCE + 1e-3).then_some(snapped)
}

/// Dodge height of a note at `own` swapping sides with one at `other`.
/// The note ending on the right arcs over, unless it sits lower.
pub fn flip_height(own: [f32; 2], other: [f32; 2]) -> f32 {
    let right = own[0] > other[0];
    let lower = own[1] < other[1];
    let higher = own[1] > other[1];
    let over = if right { !lower } else { higher };
    if over {
        FLIP_UP_HEIGHT
    } else {
        -FLIP_DOWN_HEIGHT
    }
}
