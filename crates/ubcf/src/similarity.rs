//! Pearson similarity between two users
//!
//! ## Algorithm
//! Over the movies both vectors rate (the intersection of their keys):
//! 1. n, the two sums, the two sums of squares and the sum of products
//! 2. numerator = pSum - sum1·sum2/n
//! 3. denominator = sqrt((sum1Sq - sum1²/n)·(sum2Sq - sum2²/n))
//! 4. no overlap or zero variance on either side gives 0, not an error
//!
//! The score is symmetric. Round-off can push it a hair outside [-1, 1],
//! so it is clamped.

use data_loader::{MovieId, RatingValue, User};

/// Round-off allowance per co-rated movie, relative to the sum of squares.
/// A variance at or below it counts as zero.
const VARIANCE_TOLERANCE: f64 = f64::EPSILON;

/// Anything that can be compared with Pearson: a sparse movie -> value map
pub trait RatingVector {
    /// Value for one movie, `None` if it isn't part of the vector
    fn rating(&self, movie_id: MovieId) -> Option<f64>;

    /// Every (movie, value) in the vector
    fn ratings(&self) -> impl Iterator<Item = (MovieId, f64)>;
}

/// A user's observed ratings; missing cells are not part of the vector
impl RatingVector for User {
    fn rating(&self, movie_id: MovieId) -> Option<f64> {
        self.ratings.get(&movie_id).and_then(|v| v.known())
    }

    fn ratings(&self) -> impl Iterator<Item = (MovieId, f64)> {
        self.known_ratings()
    }
}

/// A user seen through the legacy table encoding, where a missing cell is
/// a real rating of 0.0
#[derive(Debug, Clone, Copy)]
pub struct SentinelView<'a>(pub &'a User);

impl RatingVector for SentinelView<'_> {
    fn rating(&self, movie_id: MovieId) -> Option<f64> {
        self.0.rating(movie_id).map(RatingValue::sentinel_value)
    }

    fn ratings(&self) -> impl Iterator<Item = (MovieId, f64)> {
        self.0
            .ratings
            .iter()
            .map(|(&movie_id, value)| (movie_id, value.sentinel_value()))
    }
}

/// A throwaway vector holding exactly one rating
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SingleRating {
    pub movie_id: MovieId,
    pub value: f64,
}

impl SingleRating {
    pub fn new(movie_id: MovieId, value: f64) -> Self {
        Self { movie_id, value }
    }
}

impl RatingVector for SingleRating {
    fn rating(&self, movie_id: MovieId) -> Option<f64> {
        (movie_id == self.movie_id).then_some(self.value)
    }

    fn ratings(&self) -> impl Iterator<Item = (MovieId, f64)> {
        std::iter::once((self.movie_id, self.value))
    }
}

/// Pearson correlation of `a` and `b` over their co-rated movies
pub fn pearson<A: RatingVector, B: RatingVector>(a: &A, b: &B) -> f64 {
    let mut n = 0usize;
    let (mut sum1, mut sum2) = (0.0, 0.0);
    let (mut sum1_sq, mut sum2_sq) = (0.0, 0.0);
    let mut p_sum = 0.0;

    for (movie_id, r1) in a.ratings() {
        if let Some(r2) = b.rating(movie_id) {
            n += 1;
            sum1 += r1;
            sum2 += r2;
            sum1_sq += r1 * r1;
            sum2_sq += r2 * r2;
            p_sum += r1 * r2;
        }
    }

    if n == 0 {
        return 0.0;
    }

    let n = n as f64;
    let var1 = sum1_sq - (sum1 * sum1) / n;
    let var2 = sum2_sq - (sum2 * sum2) / n;
    if var1 <= VARIANCE_TOLERANCE * n * sum1_sq || var2 <= VARIANCE_TOLERANCE * n * sum2_sq {
        return 0.0;
    }

    let num = p_sum - (sum1 * sum2 / n);
    let den = (var1 * var2).sqrt();
    if den == 0.0 || !den.is_finite() {
        return 0.0;
    }

    let score = num / den;
    if score.is_nan() {
        0.0
    } else {
        score.clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: u32, ratings: &[(MovieId, f64)]) -> User {
        let mut user = User::new(id);
        for &(movie_id, value) in ratings {
            user.ratings.insert(movie_id, RatingValue::from_raw(value));
        }
        user
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_perfect_positive_correlation() {
        let a = user(1, &[(1, 1.0), (2, 2.0), (3, 3.0)]);
        let b = user(2, &[(1, 2.0), (2, 3.0), (3, 4.0)]);
        assert!(close(pearson(&a, &b), 1.0));
    }

    #[test]
    fn test_perfect_negative_correlation() {
        let a = user(1, &[(1, 1.0), (2, 3.0), (3, 5.0)]);
        let b = user(2, &[(1, 5.0), (2, 3.0), (3, 1.0)]);
        assert!(close(pearson(&a, &b), -1.0));
    }

    #[test]
    fn test_known_value() {
        // x = [4, 2, 5, 1], y = [5, 3, 4, 2] -> r = 6 / sqrt(10 * 5)
        let a = user(1, &[(1, 4.0), (2, 2.0), (3, 5.0), (4, 1.0)]);
        let b = user(2, &[(1, 5.0), (2, 3.0), (3, 4.0), (4, 2.0)]);
        assert!(close(pearson(&a, &b), 6.0 / 50f64.sqrt()));
    }

    #[test]
    fn test_symmetry() {
        let a = user(1, &[(1, 4.5), (2, 2.0), (3, 3.5), (5, 1.0), (8, 5.0)]);
        let b = user(2, &[(1, 3.0), (3, 4.0), (4, 2.0), (5, 2.5), (8, 4.5)]);
        assert!(close(pearson(&a, &b), pearson(&b, &a)));
    }

    #[test]
    fn test_identity() {
        let a = user(1, &[(1, 1.0), (2, 4.0), (3, 2.5)]);
        assert!(close(pearson(&a, &a), 1.0));
    }

    #[test]
    fn test_bounds_on_noisy_data() {
        let a = user(1, &[(1, 0.1), (2, 0.2), (3, 0.3), (4, 0.7), (5, 0.9)]);
        let b = user(2, &[(1, 0.3), (2, 0.6), (3, 0.9), (4, 2.1), (5, 2.7)]);
        let score = pearson(&a, &b);
        assert!((-1.0..=1.0).contains(&score));
        assert!(close(score, 1.0));
    }

    #[test]
    fn test_no_overlap_is_zero() {
        let a = user(1, &[(1, 4.0), (2, 3.0)]);
        let b = user(2, &[(3, 4.0), (4, 3.0)]);
        assert_eq!(pearson(&a, &b), 0.0);
    }

    #[test]
    fn test_zero_variance_is_zero() {
        let a = user(1, &[(1, 3.0), (2, 3.0), (3, 3.0)]);
        let b = user(2, &[(1, 1.0), (2, 4.0), (3, 5.0)]);
        assert_eq!(pearson(&a, &b), 0.0);
        assert_eq!(pearson(&b, &a), 0.0);
    }

    #[test]
    fn test_constant_fractions_are_zero_variance() {
        // 0.1 is not exact in binary; the variance comes out as a few ulps
        let b = user(2, &[(1, 1.0), (2, 2.0), (3, 3.0), (4, 4.0), (5, 5.0)]);
        for value in [0.1, 0.3, 0.7, 1.1, 3.3, 1000.1] {
            let a = user(1, &[(1, value), (2, value), (3, value), (4, value), (5, value)]);
            assert_eq!(pearson(&a, &b), 0.0, "constant {value}");
            assert_eq!(pearson(&b, &a), 0.0, "constant {value}");
        }
        let a = user(1, &[(1, 0.1), (2, 0.1), (3, 0.1)]);
        assert_eq!(pearson(&a, &b), 0.0);
    }

    #[test]
    fn test_large_offset_small_spread_still_correlates() {
        let a = user(1, &[(1, 1000.0), (2, 1000.001), (3, 1000.002)]);
        let b = user(2, &[(1, 1.0), (2, 2.0), (3, 3.0)]);
        let score = pearson(&a, &b);
        assert!((score - 1.0).abs() < 1e-3, "score = {score}");
        assert!((pearson(&b, &a) - score).abs() < 1e-12);
    }

    #[test]
    fn test_single_rating_always_degenerates() {
        let a = user(1, &[(1, 5.0), (2, 1.0), (3, 0.0)]);
        assert_eq!(pearson(&a, &SingleRating::new(1, 2.0)), 0.0);
        assert_eq!(pearson(&SentinelView(&a), &SingleRating::new(3, 4.0)), 0.0);
    }

    #[test]
    fn test_missing_cells_only_count_in_sentinel_view() {
        // Movie 3 is missing for `a`
        let a = user(1, &[(1, 5.0), (2, 1.0), (3, 0.0)]);
        let b = user(2, &[(1, 4.0), (2, 2.0), (3, 5.0)]);

        assert_eq!(a.ratings().count(), 2);
        assert_eq!(SentinelView(&a).ratings().count(), 3);
        assert!(close(pearson(&a, &b), 1.0));
        assert!(pearson(&SentinelView(&a), &b) < 1.0);
    }
}
