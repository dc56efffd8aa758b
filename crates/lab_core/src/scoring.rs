//! Scoring policy shared by every mission: precision → stars → points.

pub const MAX_STARS: u8 = 3;

const THREE_STAR_PRECISION: f64 = 0.95;
const TWO_STAR_PRECISION: f64 = 0.80;
const ONE_STAR_PRECISION: f64 = 0.70;

/// Bonus added on top of the doubled base for a perfect attempt.
const PERFECT_BONUS: u32 = 50;

pub fn base_points(difficulty: u8) -> u32 {
    u32::from(difficulty) * 100
}

/// Normalized closeness of `value` to `target`, in `[0, 1]`.
///
/// The difference is scaled by the tolerance, or by `|target|` when the
/// tolerance is zero, or by `1.0` when both are zero.
pub fn calculate_precision(value: f64, target: f64, tolerance: f64) -> f64 {
    let difference = (value - target).abs();
    let divisor = if tolerance > 0.0 {
        tolerance
    } else if target.abs() > 0.0 {
        target.abs()
    } else {
        1.0
    };
    (1.0 - difference / divisor).clamp(0.0, 1.0)
}

pub fn stars_for_precision(precision: f64) -> u8 {
    if precision >= THREE_STAR_PRECISION {
        3
    } else if precision >= TWO_STAR_PRECISION {
        2
    } else if precision >= ONE_STAR_PRECISION {
        1
    } else {
        0
    }
}

/// Points for a star count; 1.5× is truncated.
pub fn points_for_stars(base_points: u32, stars: u8) -> u32 {
    match stars {
        0 => 0,
        1 => base_points,
        2 => base_points * 3 / 2,
        _ => base_points * 2 + PERFECT_BONUS,
    }
}

/// Three-glyph indicator, e.g. `★★☆`.
pub fn stars_display(stars: u8) -> String {
    (0..MAX_STARS)
        .map(|i| if i < stars { '★' } else { '☆' })
        .collect()
}

pub fn difficulty_label(difficulty: u8) -> &'static str {
    match difficulty {
        1 => "Easy",
        2 => "Normal",
        3 => "Medium",
        4 => "Hard",
        5 => "Very hard",
        _ => "?",
    }
}
