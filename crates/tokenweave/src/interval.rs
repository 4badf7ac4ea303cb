//! Inclusive integer ranges used to address spans of characters and tokens.

use core::fmt;

/// Largest `a` for which the single-point interval `a..a` lives in the
/// shared pool.
pub const INTERVAL_POOL_MAX_VALUE: isize = 1000;

#[allow(clippy::cast_possible_wrap)]
static POOL: [Interval; INTERVAL_POOL_MAX_VALUE as usize + 1] = {
    let mut pool = [Interval::INVALID; INTERVAL_POOL_MAX_VALUE as usize + 1];
    let mut i = 0;
    while i < pool.len() {
        pool[i] = Interval {
            a: i as isize,
            b: i as isize,
        };
        i += 1;
    }
    pool
};

/// An immutable inclusive range `[a, b]`.
///
/// Intervals with `b < a` are empty; [`Interval::INVALID`] is the canonical
/// empty value. Equality and ordering compare `(a, b)` lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval {
    a: isize,
    b: isize,
}

impl Interval {
    /// The empty interval `-1..-2`.
    pub const INVALID: Interval = Interval { a: -1, b: -2 };

    /// Creates the interval `[a, b]`.
    #[must_use]
    pub const fn of(a: isize, b: isize) -> Self {
        Interval { a, b }
    }

    /// Returns the pooled single-point interval `[a, a]`.
    ///
    /// Every call with the same `a` in `0..=1000` yields the same reference;
    /// values outside that range are not pooled.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn pooled(a: isize) -> Option<&'static Interval> {
        if (0..=INTERVAL_POOL_MAX_VALUE).contains(&a) {
            Some(&POOL[a as usize])
        } else {
            None
        }
    }

    /// Lower bound.
    #[inline]
    #[must_use]
    pub const fn a(&self) -> isize {
        self.a
    }

    /// Upper bound, inclusive.
    #[inline]
    #[must_use]
    pub const fn b(&self) -> isize {
        self.b
    }

    /// Number of elements covered, zero when `b < a`.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn length(&self) -> usize {
        if self.b < self.a {
            0
        } else {
            (self.b - self.a + 1) as usize
        }
    }

    /// Does `self` start and end before `other` starts?
    #[must_use]
    pub const fn starts_before_disjoint(&self, other: &Interval) -> bool {
        self.a < other.a && self.b < other.a
    }

    /// Does `self` start at or before `other` and reach into it?
    #[must_use]
    pub const fn starts_before_non_disjoint(&self, other: &Interval) -> bool {
        self.a <= other.a && self.b >= other.a
    }

    /// Does `self` start after `other` starts?
    #[must_use]
    pub const fn starts_after(&self, other: &Interval) -> bool {
        self.a > other.a
    }

    /// Does `self` start after `other` ends?
    #[must_use]
    pub const fn starts_after_disjoint(&self, other: &Interval) -> bool {
        self.a > other.b
    }

    /// Does `self` start inside `other` (but not at its start)?
    #[must_use]
    pub const fn starts_after_non_disjoint(&self, other: &Interval) -> bool {
        self.a > other.a && self.a <= other.b
    }

    /// Do the two intervals share no element?
    #[must_use]
    pub const fn disjoint(&self, other: &Interval) -> bool {
        self.starts_before_disjoint(other) || self.starts_after_disjoint(other)
    }

    /// Are the two intervals back to back with no gap and no overlap?
    #[must_use]
    pub const fn adjacent(&self, other: &Interval) -> bool {
        (other.b < isize::MAX && self.a == other.b + 1)
            || (other.a > isize::MIN && self.b == other.a - 1)
    }

    /// Does `self` contain every element of `other`?
    #[must_use]
    pub const fn properly_contains(&self, other: &Interval) -> bool {
        other.a >= self.a && other.b <= self.b
    }

    /// Smallest interval covering both.
    #[must_use]
    pub fn union(&self, other: &Interval) -> Interval {
        Interval::of(self.a.min(other.a), self.b.max(other.b))
    }

    /// Overlap of the two intervals; empty when they are disjoint.
    #[must_use]
    pub fn intersection(&self, other: &Interval) -> Interval {
        Interval::of(self.a.max(other.a), self.b.min(other.b))
    }

    /// Returns the part of `self` not covered by `other`.
    ///
    /// Only meaningful when `other` does not properly contain `self` from the
    /// inside: if `other` sits strictly within `self` the true difference has
    /// two pieces, and this returns the single piece the overlap rules pick
    /// (or `None`). Callers must check containment first.
    #[must_use]
    pub fn difference_not_properly_contained(&self, other: &Interval) -> Option<Interval> {
        if other.starts_before_non_disjoint(self) {
            Some(Interval::of(self.a.max(other.b.saturating_add(1)), self.b))
        } else if other.starts_after_non_disjoint(self) {
            Some(Interval::of(self.a, other.a.saturating_sub(1)))
        } else {
            None
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.a, self.b)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use quickcheck_macros::quickcheck;
    use rstest::rstest;

    use super::*;

    #[test]
    fn pooled_points_are_shared() {
        for a in [0, 1, 17, 999, 1000] {
            let first = Interval::pooled(a).unwrap();
            let second = Interval::pooled(a).unwrap();
            assert!(core::ptr::eq(first, second));
            assert_eq!(*first, Interval::of(a, a));
        }
        assert!(Interval::pooled(-1).is_none());
        assert!(Interval::pooled(1001).is_none());
    }

    #[test]
    fn invalid_is_empty() {
        assert_eq!(Interval::INVALID.length(), 0);
        assert_eq!(Interval::INVALID.to_string(), "-1..-2");
    }

    #[rstest]
    #[case(Interval::of(0, 2), Interval::of(3, 5), true, false, true)]
    #[case(Interval::of(0, 3), Interval::of(3, 5), false, true, false)]
    #[case(Interval::of(4, 9), Interval::of(3, 5), false, false, false)]
    #[case(Interval::of(2, 2), Interval::of(5, 6), true, false, false)]
    fn overlap_predicates(
        #[case] x: Interval,
        #[case] y: Interval,
        #[case] before_disjoint: bool,
        #[case] before_non_disjoint: bool,
        #[case] adjacent: bool,
    ) {
        assert_eq!(x.starts_before_disjoint(&y), before_disjoint);
        assert_eq!(x.starts_before_non_disjoint(&y), before_non_disjoint);
        assert_eq!(x.adjacent(&y), adjacent);
        assert_eq!(x.disjoint(&y), y.disjoint(&x));
    }

    #[test]
    fn union_and_intersection() {
        let x = Interval::of(2, 6);
        let y = Interval::of(4, 9);
        assert_eq!(x.union(&y), Interval::of(2, 9));
        assert_eq!(x.intersection(&y), Interval::of(4, 6));
        assert_eq!(Interval::of(0, 1).intersection(&Interval::of(5, 6)).length(), 0);
    }

    #[test]
    fn difference_trims_the_overlapping_side() {
        let this = Interval::of(5, 10);
        assert_eq!(
            this.difference_not_properly_contained(&Interval::of(3, 7)),
            Some(Interval::of(8, 10))
        );
        assert_eq!(
            this.difference_not_properly_contained(&Interval::of(8, 12)),
            Some(Interval::of(5, 7))
        );
        assert_eq!(
            this.difference_not_properly_contained(&Interval::of(20, 30)),
            None
        );
    }

    #[test]
    fn difference_with_inner_interval_keeps_left_piece() {
        // The right-hand piece 8..10 is dropped.
        let this = Interval::of(5, 10);
        assert_eq!(
            this.difference_not_properly_contained(&Interval::of(6, 7)),
            Some(Interval::of(5, 5))
        );
    }

    #[test]
    fn extreme_bounds_do_not_overflow() {
        let all = Interval::of(0, isize::MAX);
        assert_eq!(
            all.difference_not_properly_contained(&Interval::of(-5, isize::MAX)),
            Some(Interval::of(isize::MAX, isize::MAX))
        );
        let low = Interval::of(isize::MIN, 10);
        assert_eq!(
            Interval::of(isize::MIN, 20).difference_not_properly_contained(&low),
            Some(Interval::of(11, 20))
        );
        assert_eq!(
            low.difference_not_properly_contained(&Interval::of(isize::MIN, 5)),
            Some(Interval::of(6, 10))
        );
        assert!(!all.adjacent(&Interval::of(-5, isize::MAX)));
        assert!(!low.adjacent(&Interval::of(isize::MIN, isize::MIN)));
        assert!(Interval::of(11, 12).adjacent(&low));
    }

    #[quickcheck]
    fn length_matches_inclusive_width(a: i16, b: i16) -> bool {
        let i = Interval::of(isize::from(a), isize::from(b));
        let expected = (isize::from(b) - isize::from(a) + 1).max(0);
        i.length() == expected.unsigned_abs()
    }

    #[quickcheck]
    fn union_properly_contains_both(a: i16, b: i16, c: i16, d: i16) -> bool {
        let x = Interval::of(isize::from(a.min(b)), isize::from(a.max(b)));
        let y = Interval::of(isize::from(c.min(d)), isize::from(c.max(d)));
        let u = x.union(&y);
        u.properly_contains(&x) && u.properly_contains(&y)
    }
}
