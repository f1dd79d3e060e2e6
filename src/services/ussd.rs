//! Continuation engine
//!
//! Answers one gateway request at a time. Initiation requests reset the
//! session and run the initiation route; other requests run the route stored
//! by the previous screen. Redirects are followed within the same request up
//! to a fixed ceiling. Every error ends the dialog with a release response.

use std::fmt;
use std::sync::Arc;
use crate::config::UssdConfig;
use crate::handlers::{ControllerRegistry, HandlerResult, Route, SharedData};
use crate::middleware::RequestListener;
use crate::models::{RequestType, UssdRequest, UssdResponse};
use crate::state::{SessionStore, UssdContext};
use crate::utils::errors::{UssdError, Result};
use crate::utils::logging::{log_dispatch, log_engine_error, log_session_event};
use super::auto_dial::AutoDial;

/// Redirects followed per request unless configured otherwise
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

/// The USSD dialog engine
pub struct Ussd {
    store: Arc<dyn SessionStore>,
    registry: Arc<ControllerRegistry>,
    initiation_route: Route,
    error_message: Option<String>,
    auto_dial: AutoDial,
    max_redirects: usize,
    shared_data: Option<SharedData>,
    listener: Option<Arc<dyn RequestListener>>,
}

impl Ussd {
    pub fn builder(store: Arc<dyn SessionStore>, registry: ControllerRegistry) -> UssdBuilder {
        UssdBuilder::new(store, registry)
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn registry(&self) -> &ControllerRegistry {
        &self.registry
    }

    pub fn initiation_route(&self) -> &Route {
        &self.initiation_route
    }

    pub fn max_redirects(&self) -> usize {
        self.max_redirects
    }

    /// Answer one gateway request.
    ///
    /// Never fails: errors become a release response carrying the configured
    /// error message (or the error text) with the error attached.
    pub fn process_request(&self, request: UssdRequest) -> UssdResponse {
        if let Some(listener) = &self.listener {
            listener.request_entering(&request);
        }

        let original = request.clone();
        let mut context = UssdContext::new(Arc::clone(&self.store), request);

        let response = match self.route_request(&mut context) {
            Ok(response) => response,
            Err(err) => {
                log_engine_error(context.session_id(), &err);
                context.close();
                let message = self.error_message.clone().unwrap_or_else(|| err.to_string());
                UssdResponse::from_error(message, err)
            }
        };

        if let Some(listener) = &self.listener {
            listener.response_leaving(&original, &response);
        }
        response
    }

    fn route_request(&self, context: &mut UssdContext) -> Result<UssdResponse> {
        if context.session_id().trim().is_empty() {
            return Err(UssdError::InvalidInput("Request has no session id".to_string()));
        }

        let request_type = context.request().request_type;
        if request_type == RequestType::Initiation {
            return self.process_initiation(context);
        }
        if request_type.ends_session() {
            let event = match request_type {
                RequestType::Timeout => "timed_out_by_gateway",
                _ => "released_by_gateway",
            };
            log_session_event(context.session_id(), event, None);
        }
        self.process_continuation(context)
    }

    fn process_initiation(&self, context: &mut UssdContext) -> Result<UssdResponse> {
        let route = self.initiation_route.to_string();
        context.close();
        context.set_next_route(&route);
        log_session_event(context.session_id(), "started", Some(route.as_str()));

        let first = self.process_continuation(context)?;
        self.auto_dial
            .replay(context, first, |ctx| self.process_continuation(ctx))
    }

    /// Run the stored route, following redirects, and store what comes next
    fn process_continuation(&self, context: &UssdContext) -> Result<UssdResponse> {
        let data_bag = context.data_bag();

        for redirects in 0..self.max_redirects {
            let stored = context.next_route().ok_or_else(|| UssdError::SessionNotFound {
                session_id: context.session_id().to_string(),
            })?;
            let route: Route = stored.parse()?;
            log_dispatch(context.session_id(), &stored, &route.controller, redirects);

            let result = self.registry.dispatch(
                &route,
                context.request(),
                &data_bag,
                self.shared_data.clone(),
            )?;

            match result {
                HandlerResult::Release { message, client_state } => {
                    context.close();
                    log_session_event(context.session_id(), "released", Some(stored.as_str()));
                    return Ok(UssdResponse::release(message).with_client_state(client_state));
                }
                HandlerResult::Continue { message, next_route, auto_dial, client_state } => {
                    let next = next_route.to_string();
                    context.set_next_route(&next);
                    let mut response = UssdResponse::continue_with(message, next).with_client_state(client_state);
                    response.auto_dial_on = auto_dial;
                    return Ok(response);
                }
                HandlerResult::Redirect { route: target } => {
                    context.set_next_route(&target.to_string());
                }
            }
        }

        Err(UssdError::RedirectCeilingExceeded { redirects: self.max_redirects })
    }
}

impl fmt::Debug for Ussd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ussd")
            .field("store", &self.store)
            .field("registry", &self.registry)
            .field("initiation_route", &self.initiation_route.to_string())
            .field("error_message", &self.error_message)
            .field("auto_dial", &self.auto_dial)
            .field("max_redirects", &self.max_redirects)
            .field("has_shared_data", &self.shared_data.is_some())
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}

/// Builder for [`Ussd`]
pub struct UssdBuilder {
    store: Arc<dyn SessionStore>,
    registry: ControllerRegistry,
    initiation_controller: Option<String>,
    initiation_action: Option<String>,
    error_message: Option<String>,
    max_auto_dial_depth: usize,
    max_redirects: usize,
    shared_data: Option<SharedData>,
    listener: Option<Arc<dyn RequestListener>>,
}

impl UssdBuilder {
    pub fn new(store: Arc<dyn SessionStore>, registry: ControllerRegistry) -> Self {
        Self {
            store,
            registry,
            initiation_controller: None,
            initiation_action: None,
            error_message: None,
            max_auto_dial_depth: 0,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            shared_data: None,
            listener: None,
        }
    }

    /// Apply the engine section of the settings, including controller namespaces
    pub fn from_config(config: &UssdConfig, store: Arc<dyn SessionStore>, mut registry: ControllerRegistry) -> Self {
        registry.set_namespaces(config.controller_namespaces.iter().cloned());
        let builder = Self::new(store, registry)
            .initiation(config.initiation_controller.clone(), config.initiation_action.clone())
            .max_auto_dial_depth(config.max_auto_dial_depth)
            .max_redirects(config.max_redirects);

        match &config.error_message {
            Some(message) => builder.error_message(message.clone()),
            None => builder,
        }
    }

    /// Controller and action run on every initiation request
    pub fn initiation(mut self, controller: impl Into<String>, action: impl Into<String>) -> Self {
        self.initiation_controller = Some(controller.into());
        self.initiation_action = Some(action.into());
        self
    }

    /// Message shown instead of the error text when a dialog fails
    pub fn error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Buffered dial string choices to replay; 0 disables auto-dial
    pub fn max_auto_dial_depth(mut self, depth: usize) -> Self {
        self.max_auto_dial_depth = depth;
        self
    }

    pub fn max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Value handed to every controller at initialization
    pub fn shared_data(mut self, data: SharedData) -> Self {
        self.shared_data = Some(data);
        self
    }

    pub fn listener(mut self, listener: Arc<dyn RequestListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn build(self) -> Result<Ussd> {
        let controller = self
            .initiation_controller
            .filter(|controller| !controller.trim().is_empty())
            .ok_or_else(|| UssdError::Config("Initiation controller is required".to_string()))?;
        let action = self
            .initiation_action
            .filter(|action| !action.trim().is_empty())
            .ok_or_else(|| UssdError::Config("Initiation action is required".to_string()))?;
        if action.contains('.') {
            return Err(UssdError::Config(format!("Initiation action \"{}\" must not contain '.'", action)));
        }
        if self.max_redirects == 0 {
            return Err(UssdError::Config("max_redirects must be at least 1".to_string()));
        }

        Ok(Ussd {
            store: self.store,
            registry: Arc::new(self.registry),
            initiation_route: Route::new(controller, action),
            error_message: self.error_message,
            auto_dial: AutoDial::new(self.max_auto_dial_depth),
            max_redirects: self.max_redirects,
            shared_data: self.shared_data,
            listener: self.listener,
        })
    }
}
