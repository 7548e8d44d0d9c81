//! Upstream vehicle lookup.
//!
//! One GET with a `regno` query parameter. The response is an envelope
//! `{"data": {"success": bool, "message": "...", "detail": {...}}}`; only
//! `detail` is handed on. No retries: any failure goes straight back to the
//! user as [`LookupError::Upstream`].

use serde::Deserialize;
use serde_json::Value;

use crate::error::{LookupError, DEFAULT_UPSTREAM_MESSAGE};
use crate::http::{self, Timeouts};
use crate::regno::RegNo;
use crate::vehicle::VehicleRecord;

/// Anything that can turn a registration number into a vehicle record.
pub trait VehicleLookup: Send + Sync {
    fn fetch(&self, regno: &RegNo) -> Result<VehicleRecord, LookupError>;
}

impl<T: VehicleLookup + ?Sized> VehicleLookup for std::sync::Arc<T> {
    fn fetch(&self, regno: &RegNo) -> Result<VehicleRecord, LookupError> {
        (**self).fetch(regno)
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    data: Option<EnvelopeData>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeData {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detail: Option<Value>,
}

/// Parse an upstream response body into the vehicle detail.
pub fn parse_envelope(body: &[u8]) -> Result<VehicleRecord, LookupError> {
    let envelope: Envelope = serde_json::from_slice(body).map_err(|e| {
        tracing::warn!(error = %e, "upstream returned malformed JSON");
        LookupError::upstream(DEFAULT_UPSTREAM_MESSAGE)
    })?;
    let data = envelope
        .data
        .ok_or_else(|| LookupError::upstream(DEFAULT_UPSTREAM_MESSAGE))?;

    if !data.success {
        let message = data
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_UPSTREAM_MESSAGE.to_string());
        return Err(LookupError::Upstream(message));
    }

    match data.detail {
        Some(detail @ Value::Object(_)) => Ok(VehicleRecord::new(detail)),
        _ => Err(LookupError::upstream(DEFAULT_UPSTREAM_MESSAGE)),
    }
}

/// curl-backed client for the lookup API.
#[derive(Debug, Clone)]
pub struct RcApiClient {
    api_url: String,
    timeouts: Timeouts,
}

impl RcApiClient {
    pub fn new(api_url: impl Into<String>, timeouts: Timeouts) -> Self {
        Self {
            api_url: api_url.into(),
            timeouts,
        }
    }

    /// `{api_url}?regno={regno}` with any existing query kept.
    pub fn request_url(&self, regno: &RegNo) -> Result<String, LookupError> {
        let mut url = url::Url::parse(&self.api_url).map_err(|e| {
            tracing::error!(api_url = %self.api_url, error = %e, "invalid upstream URL");
            LookupError::upstream(DEFAULT_UPSTREAM_MESSAGE)
        })?;
        url.query_pairs_mut().append_pair("regno", regno.as_str());
        Ok(url.into())
    }
}

impl VehicleLookup for RcApiClient {
    fn fetch(&self, regno: &RegNo) -> Result<VehicleRecord, LookupError> {
        let url = self.request_url(regno)?;
        tracing::debug!(%regno, "upstream lookup");

        let resp = http::get(&url, self.timeouts).map_err(|e| {
            tracing::warn!(%regno, error = %format!("{e:#}"), "upstream unreachable");
            LookupError::upstream(DEFAULT_UPSTREAM_MESSAGE)
        })?;

        // The API reports failures inside the envelope, often with a non-2xx
        // status too. Prefer its message when there is one.
        match parse_envelope(&resp.body) {
            Ok(record) if resp.is_success() => Ok(record),
            Ok(_) => {
                tracing::warn!(%regno, status = resp.status, "upstream HTTP error");
                Err(LookupError::upstream(DEFAULT_UPSTREAM_MESSAGE))
            }
            Err(e) => {
                tracing::info!(%regno, status = resp.status, error = %e, "upstream lookup failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regno;

    #[test]
    fn success_envelope_yields_detail() {
        let body = br#"{"data":{"success":true,"detail":{"registrationNumber":"JK03N1234"}}}"#;
        let rec = parse_envelope(body).unwrap();
        assert_eq!(rec.registration_number().as_deref(), Some("JK03N1234"));
    }

    #[test]
    fn failure_envelope_surfaces_message() {
        let body = br#"{"data":{"success":false,"message":"Invalid registration number"}}"#;
        match parse_envelope(body) {
            Err(LookupError::Upstream(m)) => assert_eq!(m, "Invalid registration number"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn failure_without_message_uses_default() {
        let body = br#"{"data":{"success":false,"message":""}}"#;
        match parse_envelope(body) {
            Err(LookupError::Upstream(m)) => assert_eq!(m, DEFAULT_UPSTREAM_MESSAGE),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn malformed_or_partial_envelopes_are_upstream_errors() {
        let bodies: [&[u8]; 4] = [
            b"<html>502</html>",
            br#"{}"#,
            br#"{"data":{"success":true}}"#,
            br#"{"data":{"success":true,"detail":"nope"}}"#,
        ];
        for body in bodies {
            assert!(
                matches!(parse_envelope(body), Err(LookupError::Upstream(_))),
                "{}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn request_url_appends_regno() {
        let client = RcApiClient::new("https://example.com/api/rc.php", Timeouts::default());
        let reg = regno::validate("JK03N1234").unwrap();
        assert_eq!(
            client.request_url(&reg).unwrap(),
            "https://example.com/api/rc.php?regno=JK03N1234"
        );

        let client = RcApiClient::new("https://example.com/rc?key=abc", Timeouts::default());
        assert_eq!(
            client.request_url(&reg).unwrap(),
            "https://example.com/rc?key=abc&regno=JK03N1234"
        );
    }
}
