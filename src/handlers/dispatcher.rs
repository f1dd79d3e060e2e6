//! Controller registry and dispatch
//!
//! Controllers are registered by name at startup. A route's controller part
//! is looked up verbatim first, then under each configured namespace, with
//! and without a `Controller`/`Handler` suffix.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::debug;
use crate::models::UssdRequest;
use crate::state::DataBag;
use crate::utils::errors::{UssdError, Result};
use super::controller::{ActionSet, Controller, ControllerBase, SharedData};
use super::processors::register_processors;
use super::route::{HandlerResult, Route};

const NAME_SUFFIXES: [&str; 2] = ["Controller", "Handler"];

/// Builds a controller of one type and runs one of its actions
trait ControllerFactory: Send + Sync {
    fn has_action(&self, action: &str) -> bool;
    fn action_names(&self) -> Vec<&str>;
    fn invoke(&self, base: ControllerBase, action: &str) -> Result<HandlerResult>;
}

struct TypedFactory<C: Controller> {
    actions: ActionSet<C>,
    _controller: PhantomData<fn() -> C>,
}

impl<C: Controller> TypedFactory<C> {
    fn new() -> Self {
        let mut actions = ActionSet::new();
        register_processors(&mut actions);
        C::actions(&mut actions);
        Self {
            actions,
            _controller: PhantomData,
        }
    }
}

impl<C: Controller> ControllerFactory for TypedFactory<C> {
    fn has_action(&self, action: &str) -> bool {
        self.actions.contains(action)
    }

    fn action_names(&self) -> Vec<&str> {
        self.actions.names()
    }

    fn invoke(&self, base: ControllerBase, action: &str) -> Result<HandlerResult> {
        let run = self.actions.get(action).ok_or_else(|| {
            UssdError::RouteResolution(format!("Action \"{}\" not found on \"{}\"", action, base.name()))
        })?;
        let mut controller = C::new(base)?;
        run(&mut controller)
    }
}

/// Registry of named controllers
#[derive(Clone, Default)]
pub struct ControllerRegistry {
    factories: HashMap<String, Arc<dyn ControllerFactory>>,
    namespaces: Vec<String>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register controller type `C` under `name`
    pub fn register<C: Controller>(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        debug!(controller = %name, "Registering controller");
        self.factories.insert(name, Arc::new(TypedFactory::<C>::new()));
        self
    }

    /// Namespaces searched when a controller name is not registered verbatim
    pub fn set_namespaces<I, S>(&mut self, namespaces: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespaces = namespaces.into_iter().map(Into::into).collect();
        self
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered controller names, sorted
    pub fn controller_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Names tried, in order, when resolving `controller`
    pub fn candidate_names(&self, controller: &str) -> Vec<String> {
        let mut candidates = vec![controller.to_string()];
        let has_suffix = NAME_SUFFIXES.iter().any(|suffix| controller.ends_with(suffix));
        for namespace in &self.namespaces {
            let qualified = format!("{}.{}", namespace, controller);
            let suffixed: Vec<String> = if has_suffix {
                Vec::new()
            } else {
                NAME_SUFFIXES.iter().map(|suffix| format!("{}{}", qualified, suffix)).collect()
            };
            candidates.push(qualified);
            candidates.extend(suffixed);
        }
        candidates
    }

    /// Resolve a controller name to its registered name
    pub fn resolve(&self, controller: &str) -> Result<String> {
        let candidates = self.candidate_names(controller);
        candidates
            .iter()
            .find(|candidate| self.factories.contains_key(candidate.as_str()))
            .cloned()
            .ok_or_else(|| {
                UssdError::RouteResolution(format!(
                    "Controller \"{}\" not found; tried {}",
                    controller,
                    candidates.join(", ")
                ))
            })
    }

    /// Build a fresh controller for `route` and run its action
    pub fn dispatch(
        &self,
        route: &Route,
        request: &UssdRequest,
        data_bag: &DataBag,
        shared_data: Option<SharedData>,
    ) -> Result<HandlerResult> {
        let name = self.resolve(&route.controller)?;
        let factory = self
            .factories
            .get(&name)
            .ok_or_else(|| UssdError::RouteResolution(format!("Controller \"{}\" not found", name)))?;

        if !factory.has_action(&route.action) {
            return Err(UssdError::RouteResolution(format!(
                "Action \"{}\" not found on \"{}\"; available: {}",
                route.action,
                name,
                factory.action_names().join(", ")
            )));
        }

        let base = ControllerBase::new(name.as_str(), request.clone(), data_bag.clone(), shared_data)?;

        panic::catch_unwind(AssertUnwindSafe(|| factory.invoke(base, &route.action)))
            .unwrap_or_else(|payload| {
                Err(UssdError::HandlerPanicked {
                    route: route.to_string(),
                    message: panic_message(payload.as_ref()),
                })
            })
    }
}

impl fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerRegistry")
            .field("controllers", &self.controller_names())
            .field("namespaces", &self.namespaces)
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use assert_matches::assert_matches;
    use crate::models::RequestType;
    use crate::state::{InMemorySessionStore, SessionStore};

    struct Greeter {
        base: ControllerBase,
    }

    impl Greeter {
        fn hello(&mut self) -> Result<HandlerResult> {
            Ok(self.base.render(format!("Hello from {}", self.base.name())))
        }

        fn fail(&mut self) -> Result<HandlerResult> {
            Err(anyhow::anyhow!("database unavailable").into())
        }

        fn explode(&mut self) -> Result<HandlerResult> {
            panic!("greeter exploded")
        }
    }

    impl Controller for Greeter {
        fn new(base: ControllerBase) -> Result<Self> {
            Ok(Self { base })
        }

        fn actions(actions: &mut ActionSet<Self>) {
            actions
                .add("hello", Self::hello)
                .add("fail", Self::fail)
                .add("explode", Self::explode);
        }

        fn base(&self) -> &ControllerBase {
            &self.base
        }
    }

    fn dispatch(registry: &ControllerRegistry, route: &str) -> Result<HandlerResult> {
        let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new(Duration::from_secs(60)).unwrap());
        let request = UssdRequest::new("s1", RequestType::Response, "");
        let bag = DataBag::new(store, "s1.DataBag");
        registry.dispatch(&route.parse().unwrap(), &request, &bag, None)
    }

    #[test]
    fn test_candidate_order() {
        let mut registry = ControllerRegistry::new();
        registry.set_namespaces(["app", "app.legacy"]);

        assert_eq!(
            registry.candidate_names("Main"),
            vec![
                "Main",
                "app.Main",
                "app.MainController",
                "app.MainHandler",
                "app.legacy.Main",
                "app.legacy.MainController",
                "app.legacy.MainHandler",
            ]
        );
        assert_eq!(
            registry.candidate_names("MainController"),
            vec!["MainController", "app.MainController", "app.legacy.MainController"]
        );
    }

    #[test]
    fn test_resolution_through_namespace_and_suffix() {
        let mut registry = ControllerRegistry::new();
        registry
            .register::<Greeter>("app.GreeterController")
            .set_namespaces(["app"]);

        assert_eq!(registry.resolve("Greeter").unwrap(), "app.GreeterController");
        assert_eq!(registry.resolve("app.GreeterController").unwrap(), "app.GreeterController");
        assert_eq!(
            dispatch(&registry, "Greeter.hello").unwrap(),
            HandlerResult::release("Hello from app.GreeterController")
        );
    }

    #[test]
    fn test_unresolved_routes() {
        let mut registry = ControllerRegistry::new();
        registry.register::<Greeter>("Greeter");

        assert_matches!(dispatch(&registry, "Missing.hello"), Err(UssdError::RouteResolution(_)));
        assert_matches!(dispatch(&registry, "Greeter.missing"), Err(UssdError::RouteResolution(ref message)) if message.contains("hello"));
    }

    #[test]
    fn test_processors_are_preregistered() {
        let mut registry = ControllerRegistry::new();
        registry.register::<Greeter>("Greeter");

        // Registered, but no menu is stored for this session.
        assert_matches!(dispatch(&registry, "Greeter.menuProcessor"), Err(UssdError::Framework(_)));
    }

    #[test]
    fn test_handler_errors_and_panics_are_contained() {
        let mut registry = ControllerRegistry::new();
        registry.register::<Greeter>("Greeter");

        assert_matches!(dispatch(&registry, "Greeter.fail"), Err(UssdError::HandlerInvocation(_)));
        assert_matches!(
            dispatch(&registry, "Greeter.explode"),
            Err(UssdError::HandlerPanicked { ref message, .. }) if message == "greeter exploded"
        );
    }
}
