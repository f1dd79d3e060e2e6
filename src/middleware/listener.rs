//! Request listener seam

use crate::models::{UssdRequest, UssdResponse};

/// Observer notified around every request the engine handles.
///
/// `response_leaving` sees the final response, after errors have been turned
/// into release responses; the error, if any, is in [`UssdResponse::error`].
pub trait RequestListener: Send + Sync {
    fn request_entering(&self, request: &UssdRequest);

    fn response_leaving(&self, request: &UssdRequest, response: &UssdResponse);
}
