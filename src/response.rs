//! The response under construction on a [`Context`](crate::Context).
//!
//! Middlewares and handlers write into the same [`Response`] in chain order.
//! Nothing is sent until the whole chain has settled; the [`App`](crate::App)
//! then turns whatever was written into an `http::Response`.

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};
use http_body_util::Full;

/// Content types [`Response`] writes. Anything else goes through
/// [`Response::set_header`] after [`Response::bytes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Json,
    OctetStream,
    Text,
}

impl ContentType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Text => "text/plain; charset=utf-8",
        }
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response, filled in while the chain runs.
///
/// Until something sets a status the effective status is derived: `200 OK`
/// once a body is present, `404 Not Found` while it is not. That is how an
/// unmatched request ends up as a 404 without anyone writing one.
///
/// ```rust
/// use waymark::{ContentType, Response};
/// use http::StatusCode;
///
/// let mut res = Response::default();
/// assert_eq!(res.status(), StatusCode::NOT_FOUND);
///
/// res.text("hello");
/// assert_eq!(res.status(), StatusCode::OK);
///
/// res.set_status(StatusCode::CREATED);
/// res.bytes(ContentType::OctetStream, vec![0xca, 0xfe]);
/// assert_eq!(res.status(), StatusCode::CREATED);
/// ```
#[derive(Debug, Default)]
pub struct Response {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl Response {
    /// The effective status.
    pub fn status(&self) -> StatusCode {
        match (self.status, &self.body) {
            (Some(status), _) => status,
            (None, Some(_)) => StatusCode::OK,
            (None, None) => StatusCode::NOT_FOUND,
        }
    }

    /// Whether a status was set explicitly.
    pub fn has_status(&self) -> bool { self.status.is_some() }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.headers }

    /// Sets a header, replacing any previous value under `name`.
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    pub fn body(&self) -> Option<&Bytes> { self.body.as_ref() }

    /// `text/plain; charset=utf-8` body.
    pub fn text(&mut self, body: impl Into<String>) {
        self.bytes(ContentType::Text, body.into().into_bytes());
    }

    /// `application/json` body.
    ///
    /// Pass bytes from your serialiser directly:
    /// - serde_json: `serde_json::to_vec(&val)?`
    /// - hand-built: `format!(r#"{{"id":{id}}}"#).into_bytes()`
    pub fn json(&mut self, body: Vec<u8>) {
        self.bytes(ContentType::Json, body);
    }

    /// Body with an explicit content type.
    pub fn bytes(&mut self, content_type: ContentType, body: impl Into<Bytes>) {
        self.headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type.as_str()));
        self.body = Some(body.into());
    }

    /// Converts into the wire response.
    ///
    /// A response without a body gets the status' reason phrase, except for
    /// statuses that must not carry one. HEAD responses are sent bodiless.
    pub(crate) fn into_http(mut self, head: bool) -> http::Response<Full<Bytes>> {
        let status = self.status();
        let body = match self.body.take() {
            Some(body) => body,
            None if status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED => {
                Bytes::new()
            }
            None => {
                self.text(status.canonical_reason().unwrap_or_default());
                self.body.take().unwrap_or_default()
            }
        };
        let body = if head { Bytes::new() } else { body };

        let mut res = http::Response::new(Full::new(body));
        *res.status_mut() = status;
        *res.headers_mut() = self.headers;
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_follows_body_until_set() {
        let mut res = Response::default();
        assert!(!res.has_status());
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        res.json(br#"{"ok":true}"#.to_vec());
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[CONTENT_TYPE], "application/json");

        res.set_status(StatusCode::ACCEPTED);
        assert_eq!(res.status(), StatusCode::ACCEPTED);
    }

    #[test]
    fn empty_response_renders_reason_phrase() {
        let mut res = Response::default();
        res.set_status(StatusCode::METHOD_NOT_ALLOWED);
        let http = res.into_http(false);
        assert_eq!(http.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(http.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
    }

    #[test]
    fn bytes_overrides_earlier_content_type() {
        let mut res = Response::default();
        res.text("draft");
        res.bytes(ContentType::OctetStream, vec![1, 2, 3]);
        assert_eq!(res.headers()[CONTENT_TYPE], "application/octet-stream");
        assert_eq!(res.body().map(|b| b.len()), Some(3));
    }

    #[test]
    fn no_content_stays_empty() {
        let mut res = Response::default();
        res.set_status(StatusCode::NO_CONTENT);
        let http = res.into_http(false);
        assert_eq!(http.status(), StatusCode::NO_CONTENT);
        assert!(http.headers().get(CONTENT_TYPE).is_none());
    }
}
