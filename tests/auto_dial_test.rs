//! Auto-dial integration tests
//!
//! Dial strings such as `*714*1*2#` answer the first screens in advance.

mod helpers;

use assert_matches::assert_matches;
use helpers::*;
use ussd_framework::{Ussd, UssdError, UssdRequest};

fn create_engine(controller: &str, depth: usize) -> Ussd {
    Ussd::builder(create_test_store(), create_test_registry())
        .initiation(controller, "start")
        .max_auto_dial_depth(depth)
        .build()
        .expect("valid engine")
}

#[test]
fn test_replay_stops_at_veto() {
    let engine = create_engine("Picky", 3);
    let mut session = TestSession::new(&engine, "veto-1");

    let response = session.dial("*714*1*9*2#");

    assert_eq!(response.message, "Seen 1,9");
    assert!(!response.auto_dial_on);
    assert_eq!(session.bag_field("seen").as_deref(), Some("1,9"));
    assert_eq!(session.next_route().as_deref(), Some("Picky.step"));

    // The vetoed screen still accepts the next manual reply.
    assert_eq!(session.reply("2").message, "Seen 1,9,2");
}

#[test]
fn test_replay_respects_depth() {
    let engine = create_engine("Picky", 2);
    let mut session = TestSession::new(&engine, "depth-1");

    let response = session.dial("*714*1*2*3#");

    assert_eq!(response.message, "Seen 1,2");
    assert_eq!(session.bag_field("seen").as_deref(), Some("1,2"));
}

#[test]
fn test_replay_stops_at_release() {
    let engine = create_engine("Picky", 5);
    let mut session = TestSession::new(&engine, "release-1");

    let response = session.dial("*714*1*0*5#");

    assert!(response.is_release());
    assert_eq!(response.message, "Bye");
    assert!(session.next_route().is_none());
}

#[test]
fn test_disabled_replay_ignores_buffered_choices() {
    let engine = create_engine("Picky", 0);
    let mut session = TestSession::new(&engine, "off-1");

    let response = session.dial("*714*1*2#");

    assert_eq!(response.message, "Pick");
    assert_eq!(session.bag_field("seen").as_deref(), Some(""));
}

#[test]
fn test_plain_service_code_has_nothing_to_replay() {
    let engine = create_engine("Picky", 3);

    let response = TestSession::new(&engine, "plain-1").dial("*714#");

    assert_eq!(response.message, "Pick");
    assert!(response.error.is_none());
}

#[test]
fn test_service_code_mismatch_ends_dialog() {
    let engine = create_engine("Picky", 3);
    let mut session = TestSession::new(&engine, "mismatch-1");

    let response = session.dial("*999*1*2#");

    assert!(response.is_release());
    assert_matches!(
        response.error.as_deref(),
        Some(UssdError::AutoDialServiceCodeMismatch { .. })
    );
    assert!(session.next_route().is_none());
}

#[test]
fn test_replay_through_menu_and_form() {
    let engine = create_engine("Bank", 5);
    let mut session = TestSession::new(&engine, "bank-1");

    let response = session.dial("*714*2*0244123456*2#");

    assert!(response.is_release());
    assert_eq!(response.message, "Sent to 0244123456 on vod");
}

#[test]
fn test_invalid_option_stops_replay() {
    let engine = create_engine("Bank", 5);
    let mut session = TestSession::new(&engine, "bank-2");

    let response = session.dial("*714*2*0244123456*7*1#");

    assert_eq!(response.message, "Choose Network:\n1. MTN\n2. Vodafone\n");
    assert!(!response.auto_dial_on);
    assert_eq!(session.next_route().as_deref(), Some("Bank.formProcessor"));

    assert_eq!(session.reply("1").message, "Sent to 0244123456 on mtn");
}

#[test]
fn test_replay_at_last_sequence_number() {
    let engine = create_engine("Picky", 2);
    let request = UssdRequest::initiation("max-seq-1", TEST_SERVICE_CODE, "*714*1#")
        .with_sequence(u32::MAX);

    let response = engine.process_request(request);

    assert!(response.error.is_none());
    assert_eq!(response.message, "Seen 1");
}
