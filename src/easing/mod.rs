//! Progress-shaping functions.
//!
//! The polynomial easings map a normalized progress in `[0.0, 1.0]` to an
//! eased progress in the same range. [`exp_progress`] is different: it maps an
//! elapsed time to an asymptotic approach towards 1.

/// Clamp progress into `[0.0, 1.0]`. NaN maps to 0.
fn unit(t: f32) -> f32 {
    if t.is_nan() {
        0.0
    } else {
        t.clamp(0.0, 1.0)
    }
}

/// Quadratic ease-in: slow start.
pub fn quad_in(t: f32) -> f32 {
    let t = unit(t);
    t * t
}

/// Quadratic ease-out: slow finish.
pub fn quad_out(t: f32) -> f32 {
    let t = unit(t);
    t * (2.0 - t)
}

/// Quadratic ease-in-out: slow start and finish, symmetric about 0.5.
pub fn quad_in_out(t: f32) -> f32 {
    let t = unit(t);
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

/// Linear interpolation with `t` clamped to `[0.0, 1.0]`.
///
/// Exact at both endpoints.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    let t = unit(t);
    a * (1.0 - t) + b * t
}

/// Exponential approach: `1 - 2^(-dt * speed * 2)`.
///
/// 0 at `dt == 0`, rising monotonically towards (never past) 1.
/// Negative elapsed time is treated as no progress.
pub fn exp_progress(dt: f32, speed: f32) -> f32 {
    if dt <= 0.0 {
        return 0.0;
    }
    (1.0 - (-(dt * speed * 2.0)).exp2()).clamp(0.0, 1.0)
}

/// Alpha of a decaying flash or fade `elapsed` seconds after it fired.
///
/// Starts at `start`, eases out to `end` over `duration`, then holds `end`.
/// Before the event fires the light contributes nothing.
pub fn decay_alpha(start: f32, end: f32, duration: f32, elapsed: f32) -> f32 {
    if elapsed >= duration {
        end
    } else if elapsed >= 0.0 {
        lerp(start, end, quad_out(elapsed / duration))
    } else {
        0.0
    }
}
