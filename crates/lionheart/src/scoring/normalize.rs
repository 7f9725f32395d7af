//! Linear rescaling of raw scores onto the display scale.
//!
//! Both formulas round half to even so that displayed scores match the
//! published norms exactly (12.5 displays as 12, 13.5 as 14).

const SUBTRAIT_SCALE: f64 = 6.25;
const TRAIT_SCALE: f64 = 100.0 / 96.0;

pub fn normalize_subtrait(raw_score: f64, floor: f64) -> f64 {
    (SUBTRAIT_SCALE * (raw_score - floor)).round_ties_even()
}

pub fn normalize_trait(raw_score: f64, floor: f64) -> f64 {
    (TRAIT_SCALE * (raw_score - floor)).round_ties_even()
}

/// Lowest attainable raw score for each trait letter.
pub const fn trait_floor(letter: char) -> f64 {
    match letter {
        'A' => -66.0,
        'C' => -36.0,
        'E' => 6.0,
        'N' => -66.0,
        'O' => -78.0,
        _ => 0.0,
    }
}
