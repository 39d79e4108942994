//! Score and speed ramp

use crate::config::GameConfig;
use crate::consts::TIME_SCORE_DIVISOR_MS;

/// Score from distance, jumps and time alive:
/// `floor(distance * multiplier) + jumps * bonus + floor(time_ms / 100)`
pub fn score(config: &GameConfig, distance_traveled: f32, jumps: u32, time_alive_ms: f64) -> u64 {
    let distance_score = (distance_traveled.max(0.0) * config.distance_multiplier).floor() as u64;
    let jump_bonus = jumps as u64 * config.jump_bonus;
    let time_bonus = (time_alive_ms.max(0.0) / TIME_SCORE_DIVISOR_MS).floor() as u64;
    distance_score + jump_bonus + time_bonus
}

/// Scroll speed for a given score, stepping up every `speed_increase_interval`
/// points and capped at `max_speed`
pub fn speed_for_score(config: &GameConfig, score: u64) -> f32 {
    let steps = score / config.speed_increase_interval;
    (config.base_speed + steps as f32 * config.speed_step).min(config.max_speed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_score() {
        assert_eq!(score(&GameConfig::default(), 0.0, 0, 0.0), 0);
    }

    #[test]
    fn test_score_components() {
        let config = GameConfig::default();
        // 1234 * 0.1 = 123, 3 jumps * 5 = 15, 2550ms / 100 = 25
        assert_eq!(score(&config, 1234.0, 3, 2550.0), 123 + 15 + 25);
    }

    #[test]
    fn test_speed_ramp() {
        let config = GameConfig::default();
        assert_eq!(speed_for_score(&config, 0), 4.0);
        assert_eq!(speed_for_score(&config, 999), 4.0);
        assert_eq!(speed_for_score(&config, 1000), 4.5);
        assert_eq!(speed_for_score(&config, 3500), 5.5);
        assert_eq!(speed_for_score(&config, 8000), 8.0);
        assert_eq!(speed_for_score(&config, 1_000_000), 8.0);
    }

    proptest! {
        #[test]
        fn score_monotonic_in_each_argument(
            d in 0.0f32..100_000.0, dd in 0.0f32..1000.0,
            j in 0u32..1000, dj in 0u32..10,
            t in 0.0f64..10_000_000.0, dt in 0.0f64..10_000.0,
        ) {
            let config = GameConfig::default();
            let base = score(&config, d, j, t);
            prop_assert!(score(&config, d + dd, j, t) >= base);
            prop_assert!(score(&config, d, j + dj, t) >= base);
            prop_assert!(score(&config, d, j, t + dt) >= base);
        }

        #[test]
        fn speed_monotonic_and_bounded(a in 0u64..50_000, b in 0u64..50_000) {
            let config = GameConfig::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let slow = speed_for_score(&config, lo);
            let fast = speed_for_score(&config, hi);
            prop_assert!(slow <= fast);
            prop_assert!(fast <= config.max_speed);
            prop_assert!(slow >= config.base_speed);
        }
    }
}
