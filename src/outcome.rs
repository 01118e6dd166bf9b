//! What the previous attempt produced.
//!
//! An attempt either fails before producing a response (connection refused,
//! timeout) or produces a response that the retry predicate rejected. Interval
//! functions receive an [`Outcome`] so they can tell the two apart: only a
//! response can carry a `Retry-After` header.
//!
//! # Examples
//!
//! ```rust
//! use retry_heed::testing::MockResponse;
//! use retry_heed::Outcome;
//!
//! let result: Result<MockResponse, std::io::Error> = Ok(MockResponse::new(503));
//! let outcome = Outcome::from(&result);
//! assert!(outcome.is_response());
//!
//! let label = outcome.fold(|err| format!("failed: {err}"), |_| "responded".to_string());
//! assert_eq!(label, "responded");
//! ```

use std::fmt;

/// A borrowed failure or response.
///
/// Both variants borrow, so building an outcome never moves or clones the
/// caller's data. It is `Copy` regardless of `R` and `E`.
pub enum Outcome<'a, R: ?Sized, E: ?Sized> {
    /// The attempt failed without a response.
    Failure(&'a E),
    /// The attempt produced a response.
    Response(&'a R),
}

impl<'a, R: ?Sized, E: ?Sized> Outcome<'a, R, E> {
    /// Create a failure outcome.
    #[inline]
    pub fn failure(error: &'a E) -> Self {
        Outcome::Failure(error)
    }

    /// Create a response outcome.
    #[inline]
    pub fn response(response: &'a R) -> Self {
        Outcome::Response(response)
    }

    /// Whether the attempt failed without a response.
    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    /// Whether the attempt produced a response.
    #[inline]
    pub fn is_response(&self) -> bool {
        matches!(self, Outcome::Response(_))
    }

    /// The failure, if any.
    #[inline]
    pub fn as_failure(&self) -> Option<&'a E> {
        match *self {
            Outcome::Failure(error) => Some(error),
            Outcome::Response(_) => None,
        }
    }

    /// The response, if any.
    #[inline]
    pub fn as_response(&self) -> Option<&'a R> {
        match *self {
            Outcome::Failure(_) => None,
            Outcome::Response(response) => Some(response),
        }
    }

    /// Apply one of two functions depending on the variant.
    ///
    /// # Example
    ///
    /// ```rust
    /// use retry_heed::Outcome;
    ///
    /// let outcome: Outcome<'_, u16, str> = Outcome::failure("timed out");
    /// assert_eq!(outcome.fold(|e| e.len(), |_| 0), 9);
    /// ```
    #[inline]
    pub fn fold<T, FE, FR>(self, on_failure: FE, on_response: FR) -> T
    where
        FE: FnOnce(&'a E) -> T,
        FR: FnOnce(&'a R) -> T,
    {
        match self {
            Outcome::Failure(error) => on_failure(error),
            Outcome::Response(response) => on_response(response),
        }
    }
}

impl<R: ?Sized, E: ?Sized> Clone for Outcome<'_, R, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: ?Sized, E: ?Sized> Copy for Outcome<'_, R, E> {}

impl<R: fmt::Debug + ?Sized, E: fmt::Debug + ?Sized> fmt::Debug for Outcome<'_, R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Failure(error) => f.debug_tuple("Failure").field(error).finish(),
            Outcome::Response(response) => f.debug_tuple("Response").field(response).finish(),
        }
    }
}

impl<'a, R, E> From<&'a Result<R, E>> for Outcome<'a, R, E> {
    fn from(result: &'a Result<R, E>) -> Self {
        match result {
            Ok(response) => Outcome::Response(response),
            Err(error) => Outcome::Failure(error),
        }
    }
}
