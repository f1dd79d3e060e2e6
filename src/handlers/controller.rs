//! Controller contract
//!
//! Application code implements [`Controller`] for each screen group. A fresh
//! controller is built for every dispatched action from a [`ControllerBase`]
//! carrying the request, the session's data bag and the engine's shared data.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use crate::models::{UssdForm, UssdMenu, UssdRequest};
use crate::state::DataBag;
use crate::utils::errors::{UssdError, Result};
use super::processors::{FORM_DATA_KEY, FORM_PROCESSOR_DATA_KEY, FORM_PROCESSOR_ACTION,
    MENU_PROCESSOR_DATA_KEY, MENU_PROCESSOR_ACTION};
use super::route::{HandlerResult, Route};

/// Opaque value configured once on the engine and handed to every controller
pub type SharedData = Arc<dyn Any + Send + Sync>;

/// A controller action
pub type Action<C> = fn(&mut C) -> Result<HandlerResult>;

/// Named actions of one controller type
pub struct ActionSet<C> {
    actions: HashMap<String, Action<C>>,
}

impl<C> ActionSet<C> {
    pub fn new() -> Self {
        Self { actions: HashMap::new() }
    }

    /// Register an action, replacing any earlier action of the same name
    pub fn add(&mut self, name: &str, action: Action<C>) -> &mut Self {
        self.actions.insert(name.to_string(), action);
        self
    }

    pub fn get(&self, name: &str) -> Option<Action<C>> {
        self.actions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Registered action names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<C> Default for ActionSet<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for ActionSet<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionSet").field("actions", &self.names()).finish()
    }
}

/// A group of related dialog screens
pub trait Controller: Sized + Send + 'static {
    /// Build the controller for one action invocation
    fn new(base: ControllerBase) -> Result<Self>;

    /// Register this controller's actions
    fn actions(actions: &mut ActionSet<Self>);

    fn base(&self) -> &ControllerBase;

    /// Called by the menu processor when the reply matches no item.
    /// Shows the same menu again without auto-dial.
    fn handle_invalid_menu_choice(&mut self, menu: UssdMenu, _choice: &str) -> Result<HandlerResult> {
        Ok(self.base().render_menu(&menu)?.without_auto_dial())
    }

    /// Called by the form processor when the reply picks no option.
    /// Shows the same input again without auto-dial.
    fn handle_invalid_form_option(&mut self, form: UssdForm, _option: &str) -> Result<HandlerResult> {
        Ok(self.base().render_form(&form)?.without_auto_dial())
    }
}

/// State every controller is built from
#[derive(Clone)]
pub struct ControllerBase {
    name: String,
    request: UssdRequest,
    data_bag: DataBag,
    shared_data: Option<SharedData>,
    form_data: HashMap<String, String>,
}

impl ControllerBase {
    /// Build the base for controller `name`, loading any form data handed off
    /// by a completed form
    pub fn new(
        name: impl Into<String>,
        request: UssdRequest,
        data_bag: DataBag,
        shared_data: Option<SharedData>,
    ) -> Result<Self> {
        let form_data = data_bag
            .get_data(FORM_DATA_KEY)
            .map_err(|e| UssdError::Framework(format!("An error occurred while getting form data: {}", e)))?
            .unwrap_or_default();

        Ok(Self {
            name: name.into(),
            request,
            data_bag,
            shared_data,
            form_data,
        })
    }

    /// Registered name of the controller, used as the controller part of its routes
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn request(&self) -> &UssdRequest {
        &self.request
    }

    pub fn data_bag(&self) -> &DataBag {
        &self.data_bag
    }

    /// Values collected by the last completed form
    pub fn form_data(&self) -> &HashMap<String, String> {
        &self.form_data
    }

    /// The engine's shared data, if it is a `T`
    pub fn shared_data<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.shared_data.as_deref().and_then(|data| data.downcast_ref::<T>())
    }

    /// Route to `action` on this controller
    pub fn route(&self, action: &str) -> Route {
        Route::new(self.name.clone(), action)
    }

    /// End the dialog with `message`
    pub fn render(&self, message: impl Into<String>) -> HandlerResult {
        HandlerResult::release(message)
    }

    /// Show `message` and let `action` on this controller handle the reply
    pub fn render_next(&self, message: impl Into<String>, action: &str) -> HandlerResult {
        HandlerResult::continue_to(message, self.route(action))
    }

    /// Show `message` and let `action` on `controller` handle the reply
    pub fn render_next_to(&self, message: impl Into<String>, action: &str, controller: &str) -> HandlerResult {
        HandlerResult::continue_to(message, Route::new(controller, action))
    }

    pub fn redirect(&self, action: &str) -> HandlerResult {
        HandlerResult::redirect(self.route(action))
    }

    pub fn redirect_to(&self, action: &str, controller: &str) -> HandlerResult {
        HandlerResult::redirect(Route::new(controller, action))
    }

    /// Route to `action` on `controller`, or on this controller when none is given
    pub fn route_to(&self, action: &str, controller: Option<&str>) -> Route {
        match controller {
            Some(controller) => Route::new(controller, action),
            None => self.route(action),
        }
    }

    /// Show a menu; the reply goes to the menu processor
    pub fn render_menu(&self, menu: &UssdMenu) -> Result<HandlerResult> {
        self.data_bag.set_data(MENU_PROCESSOR_DATA_KEY, menu)?;
        Ok(self.render_next(menu.render(), MENU_PROCESSOR_ACTION))
    }

    /// Show the form's current input; the reply goes to the form processor
    pub fn render_form(&self, form: &UssdForm) -> Result<HandlerResult> {
        let message = form.render()?;
        self.data_bag.set_data(FORM_PROCESSOR_DATA_KEY, form)?;
        Ok(self.render_next(message, FORM_PROCESSOR_ACTION))
    }
}

impl fmt::Debug for ControllerBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerBase")
            .field("name", &self.name)
            .field("session_id", &self.request.session_id)
            .field("data_bag", &self.data_bag)
            .field("form_data", &self.form_data)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use assert_matches::assert_matches;
    use crate::models::{RequestType, UssdMenuItem};
    use crate::state::{InMemorySessionStore, SessionStore};

    fn create_test_base(shared_data: Option<SharedData>) -> ControllerBase {
        let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new(Duration::from_secs(60)).unwrap());
        let request = UssdRequest::new("s1", RequestType::Response, "1");
        ControllerBase::new("demo.Main", request, DataBag::new(store, "s1.DataBag"), shared_data).unwrap()
    }

    #[test]
    fn test_route_helpers() {
        let base = create_test_base(None);

        assert_eq!(base.render("Bye"), HandlerResult::release("Bye"));
        assert_eq!(
            base.render_next("Enter name", "greeting"),
            HandlerResult::continue_to("Enter name", Route::new("demo.Main", "greeting"))
        );
        assert_eq!(
            base.redirect_to("show", "Account"),
            HandlerResult::redirect(Route::new("Account", "show"))
        );
        assert_eq!(base.route_to("time", None).to_string(), "demo.Main.time");
    }

    #[test]
    fn test_render_menu_stores_descriptor() {
        let base = create_test_base(None);
        let menu = UssdMenu::new().header("Welcome").push_item(UssdMenuItem::new("1", "Time", "time"));

        let result = base.render_menu(&menu).unwrap();
        assert_matches!(
            result,
            HandlerResult::Continue { ref next_route, auto_dial: true, .. }
                if next_route.action == MENU_PROCESSOR_ACTION
        );

        let stored: Option<UssdMenu> = base.data_bag().get_data(MENU_PROCESSOR_DATA_KEY).unwrap();
        assert_eq!(stored, Some(menu));
    }

    #[test]
    fn test_form_data_loaded_at_init() {
        let base = create_test_base(None);
        let data = HashMap::from([("Name".to_string(), "Akosua".to_string())]);
        base.data_bag().set_data(FORM_DATA_KEY, &data).unwrap();

        let reloaded = ControllerBase::new("demo.Main", base.request().clone(), base.data_bag().clone(), None).unwrap();
        assert_eq!(reloaded.form_data().get("Name").map(String::as_str), Some("Akosua"));
    }

    #[test]
    fn test_corrupt_form_data_is_a_framework_error() {
        let base = create_test_base(None);
        base.data_bag().set(FORM_DATA_KEY, "not json");

        let reloaded = ControllerBase::new("demo.Main", base.request().clone(), base.data_bag().clone(), None);
        assert_matches!(reloaded, Err(UssdError::Framework(_)));
    }

    #[test]
    fn test_shared_data_downcast() {
        let base = create_test_base(Some(Arc::new(42u32)));
        assert_eq!(base.shared_data::<u32>(), Some(&42));
        assert_eq!(base.shared_data::<String>(), None);
    }
}
