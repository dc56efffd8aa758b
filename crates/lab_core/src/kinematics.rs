//! Closed-form kinematics. Pure functions of elapsed time `t` in seconds.
//!
//! Heights are measured upward from the ground; `g` is positive and acts
//! downward.

pub const DEFAULT_GRAVITY: f64 = 9.8;

/// `x = x0 + v*t`
pub fn linear_position(x0: f64, velocity: f64, t: f64) -> f64 {
    x0 + velocity * t
}

/// `x = x0 + v0*t + a*t²/2`
pub fn accelerated_position(x0: f64, v0: f64, acceleration: f64, t: f64) -> f64 {
    x0 + v0 * t + 0.5 * acceleration * t * t
}

/// `v = v0 + a*t`
pub fn accelerated_velocity(v0: f64, acceleration: f64, t: f64) -> f64 {
    v0 + acceleration * t
}

/// `y = y0 + v0*t - g*t²/2`
pub fn vertical_position(y0: f64, v0: f64, gravity: f64, t: f64) -> f64 {
    accelerated_position(y0, v0, -gravity, t)
}

/// `v = v0 - g*t`
pub fn vertical_velocity(v0: f64, gravity: f64, t: f64) -> f64 {
    accelerated_velocity(v0, -gravity, t)
}

/// Position `(x, y)` of a projectile launched from `(0, y0)` at `speed` and
/// `angle_rad` above the horizontal.
pub fn projectile_position(speed: f64, angle_rad: f64, y0: f64, gravity: f64, t: f64) -> (f64, f64) {
    let (vx, vy) = velocity_components(speed, angle_rad);
    (vx * t, vertical_position(y0, vy, gravity, t))
}

pub fn velocity_components(speed: f64, angle_rad: f64) -> (f64, f64) {
    (speed * angle_rad.cos(), speed * angle_rad.sin())
}

/// `t = √(2h/g)` for a drop from rest.
pub fn fall_time(height: f64, gravity: f64) -> f64 {
    (2.0 * height / gravity).sqrt()
}

/// Highest height reached. Equals `y0` unless the launch is upward.
pub fn apex_height(y0: f64, v0: f64, gravity: f64) -> f64 {
    if v0 > 0.0 {
        y0 + v0 * v0 / (2.0 * gravity)
    } else {
        y0
    }
}

/// Positive root of `y0 + v0*t - g*t²/2 = 0`, or `None` if the body never
/// reaches the ground (`y0 < 0` with no real root).
pub fn time_to_ground(y0: f64, v0: f64, gravity: f64) -> Option<f64> {
    let discriminant = v0 * v0 + 2.0 * gravity * y0;
    if discriminant < 0.0 {
        return None;
    }
    let t = (v0 + discriminant.sqrt()) / gravity;
    (t >= 0.0).then_some(t)
}

/// Horizontal distance at ground impact.
pub fn projectile_range(speed: f64, angle_rad: f64, y0: f64, gravity: f64) -> f64 {
    let (vx, vy) = velocity_components(speed, angle_rad);
    time_to_ground(y0, vy, gravity).map_or(0.0, |t| vx * t)
}

pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees.to_radians()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_linear_position() {
        assert!((linear_position(2.0, 3.0, 4.0) - 14.0).abs() < EPS);
        assert!((linear_position(5.0, -1.0, 2.0) - 3.0).abs() < EPS);
    }

    #[test]
    fn test_accelerated_motion() {
        assert!((accelerated_position(0.0, 2.0, 4.0, 3.0) - 24.0).abs() < EPS);
        assert!((accelerated_velocity(2.0, 4.0, 3.0) - 14.0).abs() < EPS);
    }

    #[test]
    fn test_vertical_drop_from_rest() {
        let y = vertical_position(20.0, 0.0, 9.8, 1.0);
        assert!((y - 15.1).abs() < EPS);
        assert!((vertical_velocity(0.0, 9.8, 1.0) + 9.8).abs() < EPS);
    }

    #[test]
    fn test_fall_time_matches_vertical_position() {
        let t = fall_time(100.0, 9.8);
        assert!((t - 4.5175).abs() < 1e-4);
        assert!(vertical_position(100.0, 0.0, 9.8, t).abs() < 1e-9);
    }

    #[test]
    fn test_apex_height_upward_launch() {
        // v0² / 2g = 196 / 19.6
        assert!((apex_height(0.0, 14.0, 9.8) - 10.0).abs() < EPS);
        // downward launch keeps the release height
        assert!((apex_height(5.0, -3.0, 9.8) - 5.0).abs() < EPS);
    }

    #[test]
    fn test_time_to_ground_upward_launch() {
        // 14 m/s up returns to ground after 2*v0/g
        let t = time_to_ground(0.0, 14.0, 9.8).unwrap();
        assert!((t - 2.857_142_857).abs() < 1e-6);
    }

    #[test]
    fn test_time_to_ground_below_ground_without_root() {
        assert!(time_to_ground(-10.0, 0.0, 9.8).is_none());
    }

    #[test]
    fn test_projectile_range_at_45_degrees() {
        // v² / g on flat ground
        let range = projectile_range(20.0, degrees_to_radians(45.0), 0.0, 9.8);
        assert!((range - 400.0 / 9.8).abs() < 1e-9);
    }

    #[test]
    fn test_projectile_position_horizontal_launch() {
        let (x, y) = projectile_position(10.0, 0.0, 20.0, 9.8, 2.0);
        assert!((x - 20.0).abs() < EPS);
        assert!((y - 0.4).abs() < 1e-9);
    }
}
