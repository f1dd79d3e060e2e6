//! Demo dialog: a welcome menu, a two-step greeting form and a clock

use anyhow::anyhow;
use chrono::{Local, Timelike};
use crate::handlers::{ActionSet, Controller, ControllerBase, HandlerResult};
use crate::models::{InputOption, UssdForm, UssdInput, UssdMenu, UssdMenuItem};
use crate::utils::errors::Result;

const DEFAULT_FOOTER: &str = "\nPowered by USSD Framework";
const FORM_HEADER: &str = "Greet Me!";

/// Optional demo branding passed to the engine as shared data
#[derive(Debug, Clone)]
pub struct DemoSettings {
    pub footer: String,
}

pub struct MainController {
    base: ControllerBase,
}

impl MainController {
    fn start(&mut self) -> Result<HandlerResult> {
        let footer = self
            .base
            .shared_data::<DemoSettings>()
            .map(|settings| settings.footer.clone())
            .unwrap_or_else(|| DEFAULT_FOOTER.to_string());

        let menu = UssdMenu::new()
            .header("Welcome")
            .add_item("Greet me", "greetingForm")
            .add_item("What's the time?", "time")
            .push_item(UssdMenuItem::new("0", "Exit", "exit"))
            .footer(footer);
        self.base.render_menu(&menu)
    }

    fn greeting_form(&mut self) -> Result<HandlerResult> {
        let form = UssdForm::new("greeting")
            .add_input(UssdInput::new("Name").header(FORM_HEADER))
            .add_input(
                UssdInput::new("Gender")
                    .header(FORM_HEADER)
                    .option(InputOption::new("Male", "M"))
                    .option(InputOption::new("Female", "F")),
            );
        self.base.render_form(&form)
    }

    fn greeting(&mut self) -> Result<HandlerResult> {
        let data = self.base.form_data();
        let name = data.get("Name").ok_or_else(|| anyhow!("greeting form did not collect a name"))?;
        let gender = data.get("Gender").ok_or_else(|| anyhow!("greeting form did not collect a gender"))?;

        let message = greeting_message(Local::now().hour(), gender, name);
        Ok(self.base.render(message))
    }

    fn time(&mut self) -> Result<HandlerResult> {
        Ok(self.base.render(Local::now().format("%H:%M").to_string()))
    }

    fn exit(&mut self) -> Result<HandlerResult> {
        Ok(self.base.render("Bye bye!"))
    }
}

impl Controller for MainController {
    fn new(base: ControllerBase) -> Result<Self> {
        Ok(Self { base })
    }

    fn actions(actions: &mut ActionSet<Self>) {
        actions
            .add("start", Self::start)
            .add("greetingForm", Self::greeting_form)
            .add("greeting", Self::greeting)
            .add("time", Self::time)
            .add("exit", Self::exit);
    }

    fn base(&self) -> &ControllerBase {
        &self.base
    }
}

/// Time-of-day greeting addressed by gender code
pub fn greeting_message(hour: u32, gender: &str, name: &str) -> String {
    let greeting = match hour {
        0..=11 => "Good morning",
        12..=15 => "Good afternoon",
        16..=20 => "Good evening",
        _ => "Good night",
    };
    let title = if gender == "M" { "Master" } else { "Madam" };
    format!("{}, {} {}", greeting, title, name)
}
