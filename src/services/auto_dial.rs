//! Auto-dial replay
//!
//! A user may dial `*714*1*2#` to answer the first screens in advance. After
//! the initiation request is answered, each buffered choice after the service
//! code is fed back through the engine as if the user had typed it, until the
//! dialog ends, a screen vetoes replay, or the depth limit is reached.

use crate::models::{RequestType, UssdResponse};
use crate::state::UssdContext;
use crate::utils::errors::{UssdError, Result};
use crate::utils::helpers::dial_segments;
use crate::utils::logging::log_auto_dial;

/// Choices buffered in `message` after `service_code`.
///
/// `#` counts as a separator so `*714#` matches the start of `*714*1*2#`.
pub fn buffered_choices(message: &str, service_code: &str) -> Result<Vec<String>> {
    let mismatch = || UssdError::AutoDialServiceCodeMismatch {
        service_code: service_code.to_string(),
        message: message.to_string(),
    };

    let dial = message.trim().replace('#', "*");
    let code = service_code.trim().replace('#', "*");
    if dial_segments(&code).is_empty() {
        return Err(mismatch());
    }

    let start = dial.find(&code).ok_or_else(mismatch)?;
    Ok(dial_segments(&dial[start + code.len()..]))
}

/// Replays buffered dial string choices
#[derive(Debug, Clone, Copy)]
pub struct AutoDial {
    max_depth: usize,
}

impl AutoDial {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn is_enabled(&self) -> bool {
        self.max_depth > 0
    }

    /// Replay the choices buffered in the context's initiation request.
    ///
    /// `first` is the response already produced for the initiation request.
    /// `continuation` runs one continuation step for the context's current
    /// request and is called once per replayed choice.
    pub fn replay<F>(&self, context: &mut UssdContext, first: UssdResponse, mut continuation: F) -> Result<UssdResponse>
    where
        F: FnMut(&UssdContext) -> Result<UssdResponse>,
    {
        if !self.is_enabled() || first.is_release() || !first.auto_dial_on {
            return Ok(first);
        }

        let initiation = context.request().clone();
        let choices = buffered_choices(&initiation.message, &initiation.service_code)?;
        let session_id = initiation.session_id.clone();

        let mut response = first;
        for (step, choice) in choices.iter().take(self.max_depth).enumerate() {
            let mut request = initiation.clone();
            request.request_type = RequestType::Response;
            request.message = choice.clone();
            request.client_state = response.client_state.clone();
            request.sequence = initiation.sequence.saturating_add(step as u32 + 1);
            request.auto_dial_originated = true;
            context.set_request(request);

            response = continuation(&*context)?;

            if response.is_release() {
                log_auto_dial(&session_id, step + 1, choice, "released");
                break;
            }
            if !response.auto_dial_on {
                log_auto_dial(&session_id, step + 1, choice, "vetoed");
                break;
            }
            log_auto_dial(&session_id, step + 1, choice, "continued");
        }

        Ok(response)
    }
}
