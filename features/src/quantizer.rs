//! Bucket functions for the binary layout. Each maps a raw magnitude to the index of the
//! indicator to set, or `None` when no indicator is set for that value.

use log::warn;

pub use catan::reduce_number_range;

pub type Quantizer = fn(i32) -> Option<usize>;

/// Counts starting at one: `n → n - 1`, folding everything past the last bucket into it.
fn one_based(value: i32, buckets: usize, what: &str) -> Option<usize> {
    if value < 0 {
        warn!("{} {} is below its domain, clamped to 0", what, value);
    }

    if value <= 0 {
        return None;
    }

    Some((value as usize).min(buckets) - 1)
}

fn scaled(value: i32, divisor: i32, buckets: usize, what: &str) -> Option<usize> {
    if value < 0 {
        warn!("{} {} is below its domain, clamped to 0", what, value);
    }

    Some(((value.max(0) / divisor) as usize).min(buckets - 1))
}

/// Dice class: 1 for a seven, 2-6 for the reduced number, 0 before the roll.
pub fn dice_class(dice: i32) -> i32 {
    match dice {
        d if d <= 0 => 0,
        7 => 1,
        d => reduce_number_range(d),
    }
}

pub fn dice(class: i32) -> Option<usize> {
    one_based(class, 6, "dice class")
}

pub fn total_settlements(total: i32) -> Option<usize> {
    scaled(total, 5, 5, "settlements on board")
}

pub fn total_roads(total: i32) -> Option<usize> {
    scaled(total, 15, 5, "roads on board")
}

pub fn total_cities(total: i32) -> Option<usize> {
    scaled(total, 4, 5, "cities on board")
}

/// Reduced number (2-6) under the robber.
pub fn number_blocked(reduced: i32) -> Option<usize> {
    if !(0..=6).contains(&reduced) {
        warn!("blocked number {} is outside 2..=6, clamped", reduced);
    }

    match reduced.clamp(0, 6) {
        n if n < 2 => None,
        n => Some((n - 2) as usize),
    }
}

pub fn board_position(position: i32) -> Option<usize> {
    if position <= 0 {
        warn!("board position {} is below 1, clamped to 1", position);
        return Some(0);
    }

    one_based(position, 4, "board position")
}

pub fn score(score: i32) -> Option<usize> {
    one_based(score, 10, "score")
}

pub fn longest_road(length: i32) -> Option<usize> {
    one_based(length, 15, "longest road")
}

pub fn roads(count: i32) -> Option<usize> {
    scaled(count, 3, 5, "roads")
}

pub fn settlements(count: i32) -> Option<usize> {
    one_based(count, 5, "settlements")
}

pub fn cities(count: i32) -> Option<usize> {
    one_based(count, 4, "cities")
}

pub fn in_hand(count: i32) -> Option<usize> {
    one_based(count, 5, "resource in hand")
}

pub fn access(count: i32) -> Option<usize> {
    one_based(count, 8, "access")
}

/// Summed reduced numbers, capped at 40, in steps of five.
pub fn production(sum: i32) -> Option<usize> {
    if sum < 0 {
        warn!("production {} is below its domain, clamped to 0", sum);
    }

    (sum > 0).then(|| (sum.min(40) / 5) as usize)
}

pub fn pieces_affected(count: i32) -> Option<usize> {
    one_based(count, 6, "pieces affected")
}

pub fn players_affected(count: i32) -> Option<usize> {
    one_based(count, 3, "players affected")
}

pub fn knights(count: i32) -> Option<usize> {
    one_based(count, 5, "played knights")
}

pub fn played_special(count: i32) -> Option<usize> {
    one_based(count, 2, "played dev cards")
}

pub fn vp_cards(count: i32) -> Option<usize> {
    one_based(count, 5, "victory point cards")
}

pub fn opponent_score(score: i32) -> Option<usize> {
    Some(match score {
        s if s < 4 => 0,
        s if s < 7 => 1,
        s if s < 10 => 2,
        _ => 3,
    })
}

pub fn opponent_knights(count: i32) -> Option<usize> {
    match count {
        c if c <= 0 => None,
        c if c < 3 => Some(0),
        _ => Some(1),
    }
}

pub fn opponent_longest_road(length: i32) -> Option<usize> {
    match length {
        l if l <= 0 => None,
        l if l < 7 => Some(((l - 1) / 2) as usize),
        _ => Some(3),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dice_class() {
        assert_eq!(dice_class(-1), 0);
        assert_eq!(dice_class(0), 0);
        assert_eq!(dice_class(7), 1);
        assert_eq!(dice_class(6), 6);
        assert_eq!(dice_class(8), 6);
        assert_eq!(dice_class(12), 2);
        assert_eq!(dice(dice_class(7)), Some(0));
        assert_eq!(dice(dice_class(8)), Some(5));
        assert_eq!(dice(0), None);
    }

    #[test]
    fn test_dice_class_is_symmetric() {
        for n in 2..=12 {
            assert_eq!(dice_class(n), dice_class(14 - n));
        }
    }

    #[test]
    fn test_score_folds_eleven_and_up() {
        assert_eq!(score(0), None);
        assert_eq!(score(1), Some(0));
        assert_eq!(score(10), Some(9));
        assert_eq!(score(12), Some(9));
    }

    #[test]
    fn test_totals() {
        assert_eq!(total_settlements(0), Some(0));
        assert_eq!(total_settlements(12), Some(2));
        assert_eq!(total_settlements(40), Some(4));
        assert_eq!(total_roads(15), Some(1));
        assert_eq!(total_cities(16), Some(4));
    }

    #[test]
    fn test_roads_include_zero() {
        assert_eq!(roads(0), Some(0));
        assert_eq!(roads(5), Some(1));
        assert_eq!(roads(15), Some(4));
    }

    #[test]
    fn test_hand_caps_at_five() {
        assert_eq!(in_hand(0), None);
        assert_eq!(in_hand(4), Some(3));
        assert_eq!(in_hand(9), Some(4));
    }

    #[test]
    fn test_production() {
        assert_eq!(production(0), None);
        assert_eq!(production(4), Some(0));
        assert_eq!(production(17), Some(3));
        assert_eq!(production(40), Some(8));
        assert_eq!(production(55), Some(8));
    }

    #[test]
    fn test_negative_values_clamp() {
        assert_eq!(in_hand(-2), None);
        assert_eq!(roads(-1), Some(0));
        assert_eq!(board_position(0), Some(0));
        assert_eq!(number_blocked(9), Some(4));
    }

    #[test]
    fn test_opponent_buckets() {
        assert_eq!(opponent_score(0), Some(0));
        assert_eq!(opponent_score(6), Some(1));
        assert_eq!(opponent_score(9), Some(2));
        assert_eq!(opponent_score(11), Some(3));
        assert_eq!(opponent_knights(0), None);
        assert_eq!(opponent_knights(2), Some(0));
        assert_eq!(opponent_knights(3), Some(1));
        assert_eq!(opponent_longest_road(1), Some(0));
        assert_eq!(opponent_longest_road(6), Some(2));
        assert_eq!(opponent_longest_road(9), Some(3));
    }
}
