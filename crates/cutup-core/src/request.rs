#![forbid(unsafe_code)]

//! Generation request validation, transport boundary and response decoding.

use crate::model::{GenerateRequest, GenerationResult, PhraseRecord};

/// Requested count outside the accepted range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountError {
    OutOfRange { value: i64, min: u32, max: u32 },
}

impl std::fmt::Display for CountError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange { value, min, max } => {
                write!(f, "count {value} outside {min}..={max}")
            }
        }
    }
}

impl std::error::Error for CountError {}

/// Failure of the transport itself (no HTTP response at all).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError(pub String);

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for TransportError {}

/// Generation failures, one variant per surfaced category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    /// Another generation is still in flight.
    Busy,
    Validation(CountError),
    /// Non-2xx HTTP status.
    Http { status: u16, body: String },
    Network(String),
    /// 2xx body that is not a generation result.
    Decode(String),
    /// The service reported `error`.
    Application(String),
}

impl std::fmt::Display for GenerateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Busy => write!(f, "generation already in progress"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Http { status, body } if body.is_empty() => {
                write!(f, "HTTP error! status: {status}")
            }
            Self::Http { status, body } => write!(f, "HTTP error! status: {status} - {body}"),
            Self::Network(msg) => f.write_str(msg),
            Self::Decode(msg) => write!(f, "invalid response: {msg}"),
            Self::Application(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for GenerateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

/// Raw HTTP outcome handed back by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Response whose body may have failed to read. The status is kept
    /// and an unreadable body becomes empty.
    pub fn from_read(status: u16, body: Result<String, TransportError>) -> Self {
        let body = body.unwrap_or_else(|err| {
            tracing::warn!(status, error = %err, "response body unreadable");
            String::new()
        });
        Self { status, body }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// The generation service boundary: one POST per call, no retries.
#[allow(async_fn_in_trait)]
pub trait GenerationTransport {
    async fn post_generate(
        &self,
        request: &GenerateRequest,
    ) -> Result<TransportResponse, TransportError>;
}

/// Read the count the way a browser `parseInt` does: skip leading
/// whitespace, accept one sign, then take leading decimal digits.
///
/// Returns `None` when no digits follow. Overlong values saturate.
#[must_use]
pub fn parse_count(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude = digits[..end].bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}

/// Accept `value` when it lies in `min..=max`.
pub fn validate_count(value: i64, min: u32, max: u32) -> Result<u32, CountError> {
    if value >= i64::from(min) && value <= i64::from(max) {
        // Range check above bounds the value by a u32.
        Ok(value as u32)
    } else {
        Err(CountError::OutOfRange { value, min, max })
    }
}

/// Decode a transport outcome into the new batch.
///
/// Status is checked before the body; a 2xx body with a non-empty `error`
/// is an application failure.
pub fn decode_response(
    outcome: Result<TransportResponse, TransportError>,
) -> Result<Vec<PhraseRecord>, GenerateError> {
    let response = outcome.map_err(|TransportError(msg)| GenerateError::Network(msg))?;
    if !response.is_success() {
        return Err(GenerateError::Http {
            status: response.status,
            body: response.body.trim().to_string(),
        });
    }
    let result: GenerationResult = serde_json::from_str(&response.body)
        .map_err(|e| GenerateError::Decode(e.to_string()))?;
    if let Some(message) = result.failure() {
        return Err(GenerateError::Application(message.to_string()));
    }
    if let Some(count) = result.count.filter(|&c| c != result.phrases.len()) {
        tracing::warn!(
            reported = count,
            received = result.phrases.len(),
            "response count disagrees with phrase list"
        );
    }
    Ok(result.phrases)
}

/// In-flight tracking and count policy for generation requests.
#[derive(Debug, Clone)]
pub struct RequestController {
    min: u32,
    max: u32,
    default_count: u32,
    in_flight: bool,
    issued: u64,
}

impl RequestController {
    #[must_use]
    pub const fn new(min: u32, max: u32, default_count: u32) -> Self {
        Self {
            min,
            max,
            default_count,
            in_flight: false,
            issued: 0,
        }
    }

    /// Validate the raw input and claim the in-flight slot.
    pub fn begin(&mut self, raw_count: &str) -> Result<GenerateRequest, GenerateError> {
        if self.in_flight {
            return Err(GenerateError::Busy);
        }
        let value = parse_count(raw_count).unwrap_or(i64::from(self.default_count));
        let count =
            validate_count(value, self.min, self.max).map_err(GenerateError::Validation)?;
        self.in_flight = true;
        self.issued = self.issued.wrapping_add(1);
        Ok(GenerateRequest { count })
    }

    /// Release the in-flight slot.
    pub fn finish(&mut self) {
        self.in_flight = false;
    }

    #[must_use]
    pub const fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Requests issued so far.
    #[must_use]
    pub const fn issued(&self) -> u64 {
        self.issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_count_prefix_semantics() {
        assert_eq!(parse_count("42"), Some(42));
        assert_eq!(parse_count("  7"), Some(7));
        assert_eq!(parse_count("12abc"), Some(12));
        assert_eq!(parse_count("3.9"), Some(3));
        assert_eq!(parse_count("-5"), Some(-5));
        assert_eq!(parse_count("+8"), Some(8));
        assert_eq!(parse_count("0"), Some(0));
    }

    #[test]
    fn parse_count_rejects_non_numeric() {
        assert_eq!(parse_count(""), None);
        assert_eq!(parse_count("abc"), None);
        assert_eq!(parse_count("-"), None);
        assert_eq!(parse_count(" + 3"), None);
    }

    #[test]
    fn parse_count_saturates() {
        assert_eq!(parse_count("99999999999999999999999"), Some(i64::MAX));
    }

    #[test]
    fn validate_bounds_inclusive() {
        assert_eq!(validate_count(1, 1, 100), Ok(1));
        assert_eq!(validate_count(100, 1, 100), Ok(100));
        assert!(validate_count(0, 1, 100).is_err());
        assert!(validate_count(101, 1, 100).is_err());
        assert!(validate_count(-3, 1, 100).is_err());
    }

    #[test]
    fn begin_defaults_unparsable_input() {
        let mut rc = RequestController::new(1, 100, 50);
        assert_eq!(rc.begin("lots"), Ok(GenerateRequest { count: 50 }));
    }

    #[test]
    fn zero_is_out_of_range_not_default() {
        let mut rc = RequestController::new(1, 100, 50);
        assert!(matches!(rc.begin("0"), Err(GenerateError::Validation(_))));
        assert!(!rc.in_flight());
    }

    #[test]
    fn begin_claims_slot_until_finish() {
        let mut rc = RequestController::new(1, 100, 50);
        rc.begin("10").unwrap();
        assert_eq!(rc.begin("10"), Err(GenerateError::Busy));
        rc.finish();
        assert_eq!(rc.begin("20"), Ok(GenerateRequest { count: 20 }));
        assert_eq!(rc.issued(), 2);
    }

    #[test]
    fn decode_http_error_carries_status_and_body() {
        let err = decode_response(Ok(TransportResponse::new(500, "boom\n"))).unwrap_err();
        assert_eq!(
            err,
            GenerateError::Http {
                status: 500,
                body: "boom".into()
            }
        );
        assert_eq!(err.to_string(), "HTTP error! status: 500 - boom");
    }

    #[test]
    fn decode_http_error_without_body() {
        let err = decode_response(Ok(TransportResponse::new(404, ""))).unwrap_err();
        assert_eq!(err.to_string(), "HTTP error! status: 404");
    }

    #[test]
    fn unreadable_body_keeps_http_status() {
        let response = TransportResponse::from_read(502, Err(TransportError("body stream aborted".into())));
        let err = decode_response(Ok(response)).unwrap_err();
        assert_eq!(
            err,
            GenerateError::Http {
                status: 502,
                body: String::new()
            }
        );
        assert_eq!(err.to_string(), "HTTP error! status: 502");
    }

    #[test]
    fn unreadable_body_on_success_is_a_decode_error() {
        let response = TransportResponse::from_read(200, Err(TransportError("aborted".into())));
        assert!(matches!(decode_response(Ok(response)), Err(GenerateError::Decode(_))));
    }

    #[test]
    fn decode_application_error_on_success_status() {
        let err =
            decode_response(Ok(TransportResponse::new(200, r#"{"error":"no words"}"#))).unwrap_err();
        assert_eq!(err, GenerateError::Application("no words".into()));
    }

    #[test]
    fn decode_garbage_body() {
        let err = decode_response(Ok(TransportResponse::new(200, "<html>"))).unwrap_err();
        assert!(matches!(err, GenerateError::Decode(_)));
    }

    #[test]
    fn decode_network_failure() {
        let err = decode_response(Err(TransportError("Failed to fetch".into()))).unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch");
    }

    #[test]
    fn decode_success_keeps_phrases() {
        let body = r#"{"phrases":[{"text":"aa","sources":[]},{"text":"bb","sources":[]}],"count":2}"#;
        let phrases = decode_response(Ok(TransportResponse::new(200, body))).unwrap();
        assert_eq!(phrases.len(), 2);
        assert_eq!(phrases[1].text, "bb");
    }
}
