//! The response-like view the predicates and parsers read from.
//!
//! Everything in this crate only needs two things from a response: its status
//! code and the raw value of a named header. [`HttpResponse`] captures exactly
//! that, so any client's response type can be plugged in with a few lines.
//! An implementation for [`http::Response`] is provided.

/// The `Retry-After` header name.
pub const RETRY_AFTER: &str = "retry-after";

/// Read-only view of an HTTP response.
///
/// # Absent responses
///
/// `Option<R>` is itself an `HttpResponse`: `None` reports status `0` and no
/// headers. Status `0` is outside every retry table, and a missing header is
/// never parsed, so an absent response yields "no decision" rather than an
/// error.
///
/// # Example
///
/// ```rust
/// use retry_heed::HttpResponse;
///
/// let response = http::Response::builder()
///     .status(503)
///     .header("Retry-After", "120")
///     .body(())
///     .unwrap();
///
/// assert_eq!(response.status(), 503);
/// assert_eq!(response.retry_after(), Some("120"));
/// ```
pub trait HttpResponse {
    /// The numeric status code.
    fn status(&self) -> u16;

    /// The value of the named header, if present and valid text.
    ///
    /// Names are matched case-insensitively.
    fn header(&self, name: &str) -> Option<&str>;

    /// The raw `Retry-After` header value.
    fn retry_after(&self) -> Option<&str> {
        self.header(RETRY_AFTER)
    }
}

impl<B> HttpResponse for http::Response<B> {
    fn status(&self) -> u16 {
        http::Response::status(self).as_u16()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers().get(name)?.to_str().ok()
    }
}

impl HttpResponse for http::response::Parts {
    fn status(&self) -> u16 {
        self.status.as_u16()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

impl<R: HttpResponse + ?Sized> HttpResponse for &R {
    fn status(&self) -> u16 {
        (**self).status()
    }

    fn header(&self, name: &str) -> Option<&str> {
        (**self).header(name)
    }
}

impl<R: HttpResponse> HttpResponse for Option<R> {
    fn status(&self) -> u16 {
        self.as_ref().map_or(0, |r| r.status())
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.as_ref()?.header(name)
    }
}
