/// Default gap below which two neighbouring positions are considered collapsed
pub const REBALANCE_GAP_THRESHOLD: f64 = 0.0001;

/// Calculates fractional positions for placing a page among its siblings
///
/// Midpoint insertion keeps every other sibling untouched, so a move writes
/// exactly one row. Repeated insertion between the same two neighbours halves
/// the gap each time; `needs_rebalancing` detects when it has become too
/// small and `rebalance` produces fresh evenly spaced positions.
pub struct FractionalOrderCalculator;

impl FractionalOrderCalculator {
    /// Position for appending after the current maximum
    ///
    /// # Examples
    /// ```
    /// use pagespace_core::db::FractionalOrderCalculator;
    ///
    /// assert_eq!(FractionalOrderCalculator::append_after(None), 0.0);
    /// assert_eq!(FractionalOrderCalculator::append_after(Some(4.0)), 5.0);
    /// ```
    pub fn append_after(max_position: Option<f64>) -> f64 {
        match max_position {
            Some(max) => max + 1.0,
            None => 0.0,
        }
    }

    /// Position for inserting before `target`, with `prev` the sibling above it
    ///
    /// # Examples
    /// ```
    /// use pagespace_core::db::FractionalOrderCalculator;
    ///
    /// assert_eq!(FractionalOrderCalculator::before(Some(0.0), 1.0), 0.5);
    /// assert_eq!(FractionalOrderCalculator::before(None, 1.0), 0.0);
    /// ```
    pub fn before(prev: Option<f64>, target: f64) -> f64 {
        match prev {
            Some(prev) => midpoint(prev, target),
            None => target - 1.0,
        }
    }

    /// Position for inserting after `target`, with `next` the sibling below it
    ///
    /// # Examples
    /// ```
    /// use pagespace_core::db::FractionalOrderCalculator;
    ///
    /// assert_eq!(FractionalOrderCalculator::after(1.0, Some(2.0)), 1.5);
    /// assert_eq!(FractionalOrderCalculator::after(2.0, None), 3.0);
    /// ```
    pub fn after(target: f64, next: Option<f64>) -> f64 {
        match next {
            Some(next) => midpoint(target, next),
            None => target + 1.0,
        }
    }

    /// Check if rebalancing is needed (gap too small)
    ///
    /// `orders` must already be sorted ascending.
    pub fn needs_rebalancing(orders: &[f64], threshold: f64) -> bool {
        orders.windows(2).any(|pair| pair[1] - pair[0] < threshold)
    }

    /// Evenly spaced positions `0, 1, .., count - 1`
    ///
    /// # Example
    /// Input:  4 siblings at [1.0, 1.00001, 1.00002, 1.00003]
    /// Output: [0.0, 1.0, 2.0, 3.0]
    pub fn rebalance(count: usize) -> Vec<f64> {
        (0..count).map(|i| i as f64).collect()
    }
}

/// Halves before adding so neighbours near `f64::MAX` cannot overflow
fn midpoint(a: f64, b: f64) -> f64 {
    a / 2.0 + b / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_to_empty_group() {
        assert_eq!(FractionalOrderCalculator::append_after(None), 0.0);
    }

    #[test]
    fn test_before_first() {
        assert_eq!(FractionalOrderCalculator::before(None, 2.0), 1.0);
    }

    #[test]
    fn test_after_last() {
        assert_eq!(FractionalOrderCalculator::after(3.0, None), 4.0);
    }

    #[test]
    fn test_between() {
        assert_eq!(FractionalOrderCalculator::before(Some(1.0), 3.0), 2.0);
        assert_eq!(FractionalOrderCalculator::after(1.0, Some(3.0)), 2.0);
    }

    #[test]
    fn test_midpoint_of_huge_neighbours_is_finite() {
        let between = FractionalOrderCalculator::before(Some(1.0e308), 1.5e308);
        assert!(between.is_finite());
        assert!(between > 1.0e308 && between < 1.5e308);

        let between = FractionalOrderCalculator::after(-f64::MAX, Some(f64::MAX));
        assert_eq!(between, 0.0);
    }

    #[test]
    fn test_needs_rebalancing() {
        assert!(!FractionalOrderCalculator::needs_rebalancing(
            &[1.0, 2.0, 3.0],
            REBALANCE_GAP_THRESHOLD
        ));
        assert!(FractionalOrderCalculator::needs_rebalancing(
            &[1.0, 1.00001, 1.00002],
            REBALANCE_GAP_THRESHOLD
        ));
        assert!(!FractionalOrderCalculator::needs_rebalancing(
            &[1.0],
            REBALANCE_GAP_THRESHOLD
        ));
    }

    #[test]
    fn test_repeated_midpoint_eventually_collapses() {
        let (low, mut high) = (0.0_f64, 1.0_f64);
        let mut steps = 0;
        while FractionalOrderCalculator::before(Some(low), high) != low && steps < 2000 {
            high = FractionalOrderCalculator::before(Some(low), high);
            steps += 1;
        }
        // f64 runs out of room between 0.0 and 1.0 long before 2000 halvings
        assert!(steps < 2000);
        assert!(FractionalOrderCalculator::needs_rebalancing(
            &[low, high],
            REBALANCE_GAP_THRESHOLD
        ));
    }

    #[test]
    fn test_rebalance() {
        assert_eq!(
            FractionalOrderCalculator::rebalance(4),
            vec![0.0, 1.0, 2.0, 3.0]
        );
    }
}
