//! Integration test: curl-backed lookup client against a local stand-in API,
//! then through the shaper and both renderers.

mod common;

use rcinfo_core::error::LookupError;
use rcinfo_core::http::Timeouts;
use rcinfo_core::lookup::{RcApiClient, VehicleLookup};
use rcinfo_core::regno;
use rcinfo_core::render::chat::details_html;
use rcinfo_core::render::html::{render_page, PageView};
use rcinfo_core::shape::{shape_record, Layout, MaskMode};
use std::time::Duration;

const SUCCESS: &str = r#"{"data":{"success":true,"detail":{
    "registrationNumber":"JK03N1234",
    "rc_owner_name":"RAHUL",
    "brand":{"make_display":"Maruti"},
    "model":{"model_display":"Swift"},
    "engineNo":"K12MXX1234",
    "full_details":{"engineNo":"K12M001234"},
    "insuranceUpTo":"2025-01-31",
    "rtoNocIssued":true
}}}"#;

fn timeouts() -> Timeouts {
    Timeouts {
        connect: Duration::from_secs(2),
        total: Duration::from_secs(5),
    }
}

#[test]
fn fetches_and_shapes_record() {
    let (url, recorded) = common::upstream_server::start(200, SUCCESS);
    let client = RcApiClient::new(url, timeouts());
    let reg = regno::validate("JK03N1234").unwrap();

    let record = client.fetch(&reg).unwrap();
    assert_eq!(recorded.targets(), vec!["/api/rc.php?regno=JK03N1234"]);
    assert_eq!(record.make_and_model(), "Maruti Swift");

    let chat = details_html(&shape_record(&record, Layout::Chat, MaskMode::Substitute));
    assert!(chat.contains("Engine Number: <b>K12M001234</b>"), "{chat}");
    assert!(chat.contains("Valid Till: <b>31 Jan 2025</b>"), "{chat}");

    let cards = shape_record(&record, Layout::Card, MaskMode::Suppress);
    let noc = cards
        .iter()
        .find_map(|s| s.get("RTO NOC Issued"))
        .unwrap();
    assert_eq!(noc, "No");
    let page = render_page(&PageView {
        query: "JK03N1234",
        record: Some(&record),
        sections: &cards,
        ..Default::default()
    });
    assert!(!page.contains("K12MXX1234"));
}

#[test]
fn upstream_failure_message_is_passed_through() {
    let (url, _) = common::upstream_server::start(
        404,
        r#"{"data":{"success":false,"message":"No record found"}}"#,
    );
    let client = RcApiClient::new(url, timeouts());
    let reg = regno::validate("MH12AB1234").unwrap();

    match client.fetch(&reg) {
        Err(LookupError::Upstream(m)) => assert_eq!(m, "No record found"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn server_error_without_envelope_uses_default_message() {
    let (url, _) = common::upstream_server::start(500, "upstream exploded");
    let client = RcApiClient::new(url, timeouts());
    let reg = regno::validate("MH12AB1234").unwrap();

    let err = client.fetch(&reg).unwrap_err();
    assert_eq!(err.to_string(), "Failed to fetch vehicle details");
}

#[test]
fn unreachable_upstream_is_an_upstream_error() {
    // Port 9 (discard) on localhost is almost never listening.
    let client = RcApiClient::new("http://127.0.0.1:9/api/rc.php", timeouts());
    let reg = regno::validate("MH12AB1234").unwrap();
    assert!(matches!(client.fetch(&reg), Err(LookupError::Upstream(_))));
}
