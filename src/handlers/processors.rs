//! Menu and form processors
//!
//! Actions registered on every controller. They read back the menu or form
//! that was rendered on the previous round trip and interpret the user's reply
//! against it.

use crate::models::{UssdForm, UssdMenu};
use crate::utils::errors::{UssdError, Result};
use super::controller::{ActionSet, Controller};
use super::route::HandlerResult;

pub const MENU_PROCESSOR_ACTION: &str = "menuProcessor";
pub const FORM_PROCESSOR_ACTION: &str = "formProcessor";

/// Data bag field holding the menu on screen
pub const MENU_PROCESSOR_DATA_KEY: &str = "ussd_framework.MenuProcessorData";
/// Data bag field holding the form in progress
pub const FORM_PROCESSOR_DATA_KEY: &str = "ussd_framework.FormProcessorData";
/// Data bag field holding the values of the last completed form
pub const FORM_DATA_KEY: &str = "ussd_framework.FormData";

/// Add the processor actions; controller actions registered later may override them
pub fn register_processors<C: Controller>(actions: &mut ActionSet<C>) {
    actions
        .add(MENU_PROCESSOR_ACTION, menu_processor::<C>)
        .add(FORM_PROCESSOR_ACTION, form_processor::<C>);
}

/// Redirect to the action of the chosen menu item
pub fn menu_processor<C: Controller>(controller: &mut C) -> Result<HandlerResult> {
    let menu = load_menu(controller)?;
    let choice = controller.base().request().trimmed_message().to_string();

    let chosen = menu
        .find_item(&choice)
        .map(|item| (item.action.clone(), item.controller.clone()));
    let Some((action, target)) = chosen else {
        return controller.handle_invalid_menu_choice(menu, &choice);
    };

    let base = controller.base();
    base.data_bag().delete(MENU_PROCESSOR_DATA_KEY);
    Ok(HandlerResult::redirect(base.route_to(&action, target.as_deref())))
}

/// Record the reply to the current input and show the next one, or hand the
/// collected data to the form's action after the last input
pub fn form_processor<C: Controller>(controller: &mut C) -> Result<HandlerResult> {
    let mut form = load_form(controller)?;
    let reply = controller.base().request().trimmed_message().to_string();

    let input = form.current_input()?;
    let name = input.name.clone();
    let value = if input.has_options() {
        input.choose(&reply).map(|option| option.value.clone())
    } else {
        Some(reply.clone())
    };
    let Some(value) = value else {
        return controller.handle_invalid_form_option(form, &reply);
    };
    form.data.insert(name, value);

    let base = controller.base();
    let bag = base.data_bag();
    if form.is_last_input() {
        bag.delete(FORM_PROCESSOR_DATA_KEY);
        bag.set_data(FORM_DATA_KEY, &form.data)?;
        return Ok(HandlerResult::redirect(
            base.route_to(&form.action, form.controller.as_deref()),
        ));
    }

    form.processing_position += 1;
    base.render_form(&form)
}

fn load_menu<C: Controller>(controller: &C) -> Result<UssdMenu> {
    controller
        .base()
        .data_bag()
        .get_data(MENU_PROCESSOR_DATA_KEY)
        .map_err(|e| UssdError::Framework(format!("An error occurred while getting the menu: {}", e)))?
        .ok_or_else(|| UssdError::Framework("Menu could not be found in the data bag".to_string()))
}

fn load_form<C: Controller>(controller: &C) -> Result<UssdForm> {
    controller
        .base()
        .data_bag()
        .get_data(FORM_PROCESSOR_DATA_KEY)
        .map_err(|e| UssdError::Framework(format!("An error occurred while getting the form: {}", e)))?
        .ok_or_else(|| UssdError::Framework("Form could not be found in the data bag".to_string()))
}
