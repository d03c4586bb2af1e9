/// Experience and level progression.
///
/// The threshold curve is linear in the level:
/// `next_level_xp(level) = round(level_xp_base * level * level_xp_multiplier)`
/// with `next_level_xp(0) = 0`, so level 1 with the defaults ends at 1500 XP.

use crate::domain::EngineConfig;

/// Total XP at which the given level ends. Level 0 is defined as 0 so the
/// progress formula holds for level 1.
pub fn next_level_xp(level: u32, config: &EngineConfig) -> u64 {
    if level == 0 {
        return 0;
    }
    let raw = config.level_xp_base.saturating_mul(level as u64) as f64
        * config.level_xp_multiplier;
    raw.round() as u64
}

/// Smallest level >= 1 whose threshold the XP total has not yet reached.
/// A degenerate curve (zero base or multiplier) pins everyone at level 1.
pub fn level_for_xp(xp: u64, config: &EngineConfig) -> u32 {
    if next_level_xp(1, config) == 0 {
        return 1;
    }
    let mut level = 1;
    while xp >= next_level_xp(level, config) {
        level += 1;
    }
    level
}

/// Fraction of the current level completed, clamped to [0, 1].
pub fn experience_progress(xp: u64, level: u32, config: &EngineConfig) -> f64 {
    let floor = next_level_xp(level.saturating_sub(1), config);
    let ceiling = next_level_xp(level, config);
    if ceiling <= floor {
        return 0.0;
    }
    let progress = (xp.saturating_sub(floor)) as f64 / (ceiling - floor) as f64;
    progress.clamp(0.0, 1.0)
}
