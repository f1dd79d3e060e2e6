//! Controllers and listeners used by the integration tests

use std::sync::Mutex;
use anyhow::anyhow;
use ussd_framework::{
    handlers::{ActionSet, Controller, ControllerBase, ControllerRegistry, HandlerResult},
    middleware::RequestListener,
    models::{InputOption, UssdForm, UssdInput, UssdMenu},
    Result, UssdRequest, UssdResponse,
};

/// Shared data handed to the bank controller
#[derive(Debug, Clone)]
pub struct Branding {
    pub currency: String,
}

/// A small banking dialog: menu, two-input form, client state echo
pub struct Bank {
    base: ControllerBase,
}

impl Bank {
    fn start(&mut self) -> Result<HandlerResult> {
        let menu = UssdMenu::new()
            .header("Bank")
            .add_item("Balance", "balance")
            .add_item("Transfer", "transferForm")
            .add_item("Echo", "echo")
            .add_item_to("Survey", "start", "Picky");
        self.base.render_menu(&menu)
    }

    fn balance(&mut self) -> Result<HandlerResult> {
        let currency = self
            .base
            .shared_data::<Branding>()
            .map(|branding| branding.currency.as_str())
            .unwrap_or("GHS");
        Ok(self.base.render(format!("Balance: {} 10.00", currency)))
    }

    fn transfer_form(&mut self) -> Result<HandlerResult> {
        let form = UssdForm::new("transfer")
            .add_input(UssdInput::new("Recipient"))
            .add_input(
                UssdInput::new("Network")
                    .option(InputOption::new("MTN", "mtn"))
                    .option(InputOption::new("Vodafone", "vod")),
            );
        self.base.render_form(&form)
    }

    fn transfer(&mut self) -> Result<HandlerResult> {
        let data = self.base.form_data();
        let recipient = data.get("Recipient").ok_or_else(|| anyhow!("no recipient"))?;
        let network = data.get("Network").ok_or_else(|| anyhow!("no network"))?;
        Ok(self.base.render(format!("Sent to {} on {}", recipient, network)))
    }

    fn echo(&mut self) -> Result<HandlerResult> {
        Ok(self
            .base
            .render_next("Say something", "echoReply")
            .with_client_state("echo-1"))
    }

    fn echo_reply(&mut self) -> Result<HandlerResult> {
        let request = self.base.request();
        let state = request.client_state.as_deref().unwrap_or("none");
        Ok(self.base.render(format!("You said {} ({})", request.message, state)))
    }

    fn broken(&mut self) -> Result<HandlerResult> {
        Err(anyhow!("core banking unavailable").into())
    }
}

impl Controller for Bank {
    fn new(base: ControllerBase) -> Result<Self> {
        Ok(Self { base })
    }

    fn actions(actions: &mut ActionSet<Self>) {
        actions
            .add("start", Self::start)
            .add("balance", Self::balance)
            .add("transferForm", Self::transfer_form)
            .add("transfer", Self::transfer)
            .add("echo", Self::echo)
            .add("echoReply", Self::echo_reply)
            .add("broken", Self::broken);
    }

    fn base(&self) -> &ControllerBase {
        &self.base
    }
}

/// Records every reply it sees in the data bag; stops auto-dial on "9"
/// and ends the dialog on "0" or when the gateway ends it
pub struct Picky {
    base: ControllerBase,
}

impl Picky {
    fn start(&mut self) -> Result<HandlerResult> {
        self.base.data_bag().set("seen", "");
        Ok(self.base.render_next("Pick", "step"))
    }

    fn step(&mut self) -> Result<HandlerResult> {
        let request = self.base.request();
        if request.request_type.ends_session() {
            let seen = self.base.data_bag().get("seen").unwrap_or_default();
            return Ok(self.base.render(format!("Ended by {} after {}", request.request_type, seen)));
        }

        let reply = request.trimmed_message().to_string();
        if reply == "0" {
            return Ok(self.base.render("Bye"));
        }

        let bag = self.base.data_bag();
        let seen = match bag.get("seen").filter(|seen| !seen.is_empty()) {
            Some(seen) => format!("{},{}", seen, reply),
            None => reply.clone(),
        };
        bag.set("seen", &seen);

        let result = self.base.render_next(format!("Seen {}", seen), "step");
        if reply == "9" {
            Ok(result.without_auto_dial())
        } else {
            Ok(result)
        }
    }
}

impl Controller for Picky {
    fn new(base: ControllerBase) -> Result<Self> {
        Ok(Self { base })
    }

    fn actions(actions: &mut ActionSet<Self>) {
        actions.add("start", Self::start).add("step", Self::step);
    }

    fn base(&self) -> &ControllerBase {
        &self.base
    }
}

/// Redirects to itself forever
pub struct Spinner {
    base: ControllerBase,
}

impl Spinner {
    fn spin(&mut self) -> Result<HandlerResult> {
        Ok(self.base.redirect("spin"))
    }

    fn hop(&mut self) -> Result<HandlerResult> {
        Ok(self.base.redirect_to("balance", "Bank"))
    }
}

impl Controller for Spinner {
    fn new(base: ControllerBase) -> Result<Self> {
        Ok(Self { base })
    }

    fn actions(actions: &mut ActionSet<Self>) {
        actions.add("spin", Self::spin).add("hop", Self::hop);
    }

    fn base(&self) -> &ControllerBase {
        &self.base
    }
}

/// Registry with every test controller under its plain name
pub fn create_test_registry() -> ControllerRegistry {
    let mut registry = ControllerRegistry::new();
    registry
        .register::<Bank>("Bank")
        .register::<Picky>("Picky")
        .register::<Spinner>("Spinner");
    registry
}

/// Listener that keeps a line per hook call
#[derive(Default)]
pub struct RecordingListener {
    pub events: Mutex<Vec<String>>,
}

impl RecordingListener {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().expect("listener lock").clone()
    }
}

impl RequestListener for RecordingListener {
    fn request_entering(&self, request: &UssdRequest) {
        self.events
            .lock()
            .expect("listener lock")
            .push(format!("enter {} {}", request.request_type, request.message));
    }

    fn response_leaving(&self, request: &UssdRequest, response: &UssdResponse) {
        self.events.lock().expect("listener lock").push(format!(
            "leave {} {:?} error={}",
            request.request_type,
            response.response_type,
            response.error.is_some()
        ));
    }
}
