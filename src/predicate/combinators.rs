//! Core predicate trait and logical combinators

/// A composable retry condition over values of type `T`.
///
/// Conditions combine with logical operators:
/// - `and`: both conditions must hold
/// - `or`: either condition must hold
/// - `not`: inverts the condition
///
/// # Example
///
/// ```rust
/// use retry_heed::predicate::*;
/// use retry_heed::testing::MockResponse;
/// use retry_heed::HttpResponse;
///
/// let throttled = |r: &MockResponse| r.status() == 429;
/// assert!(throttled.check(&MockResponse::new(429)));
/// assert!(!throttled.check(&MockResponse::new(503)));
/// ```
pub trait Predicate<T: ?Sized>: Send + Sync {
    /// Check whether the value satisfies this condition.
    fn check(&self, value: &T) -> bool;
}

// Blanket impl for closures
impl<T: ?Sized, F> Predicate<T> for F
where
    F: Fn(&T) -> bool + Send + Sync,
{
    #[inline]
    fn check(&self, value: &T) -> bool {
        self(value)
    }
}

/// Extension trait for predicate combinators.
///
/// All methods return concrete types, so a composed predicate costs no more
/// than the hand-written boolean expression.
pub trait PredicateExt<T: ?Sized>: Predicate<T> + Sized {
    /// Combine with AND logic.
    ///
    /// The right-hand side is not evaluated when the left-hand side is false.
    ///
    /// # Example
    ///
    /// ```rust
    /// use retry_heed::predicate::*;
    /// use retry_heed::testing::MockResponse;
    /// use retry_heed::{LimitRetryAfter, RetryStatusCodes};
    ///
    /// let p = RetryStatusCodes::idempotent().and(LimitRetryAfter::maximum_millis(10_000));
    /// assert!(p.check(&MockResponse::new(503).with_retry_after("5")));
    /// assert!(!p.check(&MockResponse::new(503).with_retry_after("60")));
    /// assert!(!p.check(&MockResponse::new(404)));
    /// ```
    fn and<P: Predicate<T>>(self, other: P) -> And<Self, P> {
        And(self, other)
    }

    /// Combine with OR logic.
    ///
    /// # Example
    ///
    /// ```rust
    /// use retry_heed::predicate::*;
    /// use retry_heed::testing::MockResponse;
    /// use retry_heed::{HttpResponse, RetryStatusCodes};
    ///
    /// let not_found = |r: &MockResponse| r.status() == 404;
    /// let p = RetryStatusCodes::non_idempotent().or(not_found);
    /// assert!(p.check(&MockResponse::new(404)));
    /// assert!(p.check(&MockResponse::new(429)));
    /// assert!(!p.check(&MockResponse::new(500)));
    /// ```
    fn or<P: Predicate<T>>(self, other: P) -> Or<Self, P> {
        Or(self, other)
    }

    /// Invert the predicate.
    ///
    /// # Example
    ///
    /// ```rust
    /// use retry_heed::predicate::*;
    /// use retry_heed::testing::MockResponse;
    /// use retry_heed::RetryStatusCodes;
    ///
    /// let p = RetryStatusCodes::idempotent().not();
    /// assert!(p.check(&MockResponse::new(200)));
    /// assert!(!p.check(&MockResponse::new(503)));
    /// ```
    fn not(self) -> Not<Self> {
        Not(self)
    }
}

impl<T: ?Sized, P: Predicate<T>> PredicateExt<T> for P {}

// Inherent copies of the `PredicateExt` methods for predicates that are
// generic over the checked type. Going through the trait would leave that
// type uninferred until the composed predicate is used.
macro_rules! combinator_methods {
    () => {
        /// Combine with AND logic. See [`PredicateExt::and`](crate::predicate::PredicateExt::and).
        pub fn and<Q>(self, other: Q) -> $crate::predicate::And<Self, Q> {
            $crate::predicate::And(self, other)
        }

        /// Combine with OR logic. See [`PredicateExt::or`](crate::predicate::PredicateExt::or).
        pub fn or<Q>(self, other: Q) -> $crate::predicate::Or<Self, Q> {
            $crate::predicate::Or(self, other)
        }

        /// Invert the predicate. See [`PredicateExt::not`](crate::predicate::PredicateExt::not).
        #[allow(clippy::should_implement_trait)]
        pub fn not(self) -> $crate::predicate::Not<Self> {
            $crate::predicate::Not(self)
        }
    };
}

pub(crate) use combinator_methods;

/// AND combinator - both predicates must be true.
#[derive(Clone, Copy, Debug)]
pub struct And<P1, P2>(pub P1, pub P2);

impl<P1, P2> And<P1, P2> {
    combinator_methods!();
}

impl<T: ?Sized, P1: Predicate<T>, P2: Predicate<T>> Predicate<T> for And<P1, P2> {
    #[inline]
    fn check(&self, value: &T) -> bool {
        self.0.check(value) && self.1.check(value)
    }
}

/// OR combinator - either predicate must be true.
#[derive(Clone, Copy, Debug)]
pub struct Or<P1, P2>(pub P1, pub P2);

impl<P1, P2> Or<P1, P2> {
    combinator_methods!();
}

impl<T: ?Sized, P1: Predicate<T>, P2: Predicate<T>> Predicate<T> for Or<P1, P2> {
    #[inline]
    fn check(&self, value: &T) -> bool {
        self.0.check(value) || self.1.check(value)
    }
}

/// NOT combinator - inverts the predicate.
#[derive(Clone, Copy, Debug)]
pub struct Not<P>(pub P);

impl<P> Not<P> {
    combinator_methods!();
}

impl<T: ?Sized, P: Predicate<T>> Predicate<T> for Not<P> {
    #[inline]
    fn check(&self, value: &T) -> bool {
        !self.0.check(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn status_is(code: u16) -> impl Predicate<u16> {
        move |s: &u16| *s == code
    }

    #[test]
    fn test_and() {
        let p = (|s: &u16| *s >= 500).and(|s: &u16| *s != 501);
        assert!(p.check(&503));
        assert!(!p.check(&501));
        assert!(!p.check(&404));
    }

    #[test]
    fn test_and_short_circuits() {
        let calls = AtomicUsize::new(0);
        let counting = |_: &u16| {
            calls.fetch_add(1, Ordering::SeqCst);
            true
        };
        let p = status_is(429).and(counting);
        assert!(!p.check(&200));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(p.check(&429));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_or() {
        let p = status_is(408).or(status_is(429));
        assert!(p.check(&408));
        assert!(p.check(&429));
        assert!(!p.check(&500));
    }

    #[test]
    fn test_not() {
        let p = status_is(200).not();
        assert!(p.check(&500));
        assert!(!p.check(&200));
    }

    #[test]
    fn test_complex_chain() {
        // not (5xx and not 501) or 429
        let server_error = (|s: &u16| (500..600).contains(s)).and(status_is(501).not());
        let p = server_error.or(status_is(429)).not();
        assert!(p.check(&200));
        assert!(p.check(&501));
        assert!(!p.check(&503));
        assert!(!p.check(&429));
    }

    #[test]
    fn test_inherent_combinators_chain_from_not() {
        let even = |x: &i32| x % 2 == 0;
        let big = |x: &i32| *x > 10;
        let odd_and_big = Not(even).and(big);
        assert!(odd_and_big.check(&11));
        assert!(!odd_and_big.check(&12));
        assert!(!odd_and_big.check(&9));

        let odd_or_big = Not(even).or(big);
        assert!(odd_or_big.check(&3));
        assert!(odd_or_big.check(&12));
        assert!(!odd_or_big.check(&4));

        let chained = And(even, big).or(Not(big)).not();
        assert!(chained.check(&11));
        assert!(!chained.check(&12));
        assert!(!chained.check(&5));
    }

    #[test]
    fn test_predicates_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>(_: &T) {}
        let p = status_is(1).and(status_is(2)).or(status_is(3)).not();
        assert_send_sync(&p);
    }

    #[test]
    fn test_unsized_target() {
        let p = (|s: &str| s.is_empty()).not();
        assert!(p.check("503"));
        assert!(!p.check(""));
    }
}
