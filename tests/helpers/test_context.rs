//! Session driver for integration tests
//!
//! Plays the part of the gateway: sends an initiation for a dial string,
//! then numbered replies carrying the session id and the last client state.

use std::sync::Arc;
use std::time::Duration;
use ussd_framework::{
    state::{InMemorySessionStore, SessionStore},
    RequestType, Ussd, UssdRequest, UssdResponse,
};

pub const TEST_SERVICE_CODE: &str = "*714#";
pub const TEST_MOBILE: &str = "233244000111";

/// Store with a lifetime long enough that nothing expires mid-test
pub fn create_test_store() -> Arc<dyn SessionStore> {
    Arc::new(InMemorySessionStore::new(Duration::from_secs(60)).expect("valid lifetime"))
}

pub fn next_route_key(session_id: &str) -> String {
    format!("{}.NextRoute", session_id)
}

pub fn data_bag_key(session_id: &str) -> String {
    format!("{}.DataBag", session_id)
}

/// One simulated phone session against an engine
pub struct TestSession<'a> {
    pub engine: &'a Ussd,
    pub session_id: String,
    pub sequence: u32,
    pub client_state: Option<String>,
}

impl<'a> TestSession<'a> {
    pub fn new(engine: &'a Ussd, session_id: impl Into<String>) -> Self {
        Self {
            engine,
            session_id: session_id.into(),
            sequence: 0,
            client_state: None,
        }
    }

    /// Dial `dial` to open the session
    pub fn dial(&mut self, dial: &str) -> UssdResponse {
        self.sequence = 1;
        let request = UssdRequest::initiation(self.session_id.clone(), TEST_SERVICE_CODE, dial)
            .with_mobile(TEST_MOBILE);
        self.send(request)
    }

    /// Answer the current screen with `message`
    pub fn reply(&mut self, message: &str) -> UssdResponse {
        self.sequence += 1;
        let request = UssdRequest::new(self.session_id.clone(), RequestType::Response, message)
            .with_service_code(TEST_SERVICE_CODE)
            .with_mobile(TEST_MOBILE)
            .with_sequence(self.sequence)
            .with_client_state(self.client_state.clone());
        self.send(request)
    }

    /// Gateway-side end of the session
    pub fn hang_up(&mut self, request_type: RequestType) -> UssdResponse {
        self.sequence += 1;
        let request = UssdRequest::new(self.session_id.clone(), request_type, "")
            .with_sequence(self.sequence);
        self.send(request)
    }

    fn send(&mut self, request: UssdRequest) -> UssdResponse {
        let response = self.engine.process_request(request);
        self.client_state = response.client_state.clone();
        response
    }

    pub fn next_route(&self) -> Option<String> {
        self.engine.store().get_value(&next_route_key(&self.session_id))
    }

    pub fn bag_field(&self, field: &str) -> Option<String> {
        self.engine.store().get_hash_field(&data_bag_key(&self.session_id), field)
    }
}
