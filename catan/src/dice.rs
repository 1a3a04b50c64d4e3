/// Folds a dice number onto its probability class: 6/8 → 6, 5/9 → 5, 4/10 → 4,
/// 3/11 → 3, 2/12 → 2. Sevens, zero and anything off the dice map to 0.
pub fn reduce_number_range(number: i32) -> i32 {
    match number {
        6 | 8 => 6,
        5 | 9 => 5,
        4 | 10 => 4,
        3 | 11 => 3,
        2 | 12 => 2,
        _ => 0,
    }
}

/// Probability that two dice sum to `number`, using the rounded table of the
/// logged corpus.
pub fn roll_probability(number: i32) -> f64 {
    if number == 7 {
        return 0.167;
    }

    match reduce_number_range(number) {
        6 => 0.139,
        5 => 0.111,
        4 => 0.083,
        3 => 0.056,
        2 => 0.028,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_reduce_is_symmetric_around_seven() {
        for n in 2..=12 {
            assert_eq!(reduce_number_range(n), reduce_number_range(14 - n));
        }
    }

    #[test]
    fn test_reduce_seven_and_out_of_range() {
        assert_eq!(reduce_number_range(7), 0);
        assert_eq!(reduce_number_range(0), 0);
        assert_eq!(reduce_number_range(-1), 0);
        assert_eq!(reduce_number_range(13), 0);
    }

    #[test]
    fn test_reduce_classes() {
        assert_eq!(reduce_number_range(8), 6);
        assert_eq!(reduce_number_range(9), 5);
        assert_eq!(reduce_number_range(10), 4);
        assert_eq!(reduce_number_range(11), 3);
        assert_eq!(reduce_number_range(12), 2);
    }

    #[test]
    fn test_roll_probability() {
        assert_approx_eq!(roll_probability(6), 0.139);
        assert_approx_eq!(roll_probability(8), 0.139);
        assert_approx_eq!(roll_probability(2), 0.028);
        assert_approx_eq!(roll_probability(7), 0.167);
        assert_approx_eq!(roll_probability(0), 0.0);
    }
}
