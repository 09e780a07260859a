use cursive::{
    Cursive,
    views::{Dialog, EditView},
    traits::{Nameable, Resizable},
};

use crate::{
    error::FormError,
    form::{FormController, FormState},
    service::ConfigService,
};

use super::{Intent, TuiState, view::form_view};

const BROWSE_INPUT: &str = "browse_path";

/// Run `f` against the controller stored in `siv`.
pub(crate) fn with_controller<S, R>(
    siv: &mut Cursive,
    f: impl FnOnce(&mut FormController<S>) -> R,
) -> Option<R>
where
    S: ConfigService + 'static,
{
    siv.with_user_data(|state: &mut TuiState<S>| f(&mut state.controller))
}

/// Show a failed operation in a dialog; returns the success value.
pub(crate) fn report<T>(siv: &mut Cursive, result: Option<Result<T, FormError>>) -> Option<T> {
    match result? {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("{e}");
            siv.add_layer(Dialog::info(e.to_string()).title("Error"));
            None
        }
    }
}

/// Rebuild the form layer from the model.
pub(crate) fn refresh<S: ConfigService + 'static>(siv: &mut Cursive) {
    let view = siv
        .with_user_data(|state: &mut TuiState<S>| {
            state
                .controller
                .form()
                .map(|form| form_view::<S>(form, state.status.as_deref()))
        })
        .flatten();
    if let Some(view) = view {
        siv.pop_layer();
        siv.add_fullscreen_layer(view);
    }
}

/// Leave the event loop, confirming first when there are unsaved edits.
pub fn handle_quit<S: ConfigService + 'static>(siv: &mut Cursive) {
    let editing = with_controller(siv, |c: &mut FormController<S>| c.state() == FormState::Editing)
        .unwrap_or(false);
    if !editing {
        quit_with::<S>(siv, Intent::Quit);
        return;
    }
    siv.add_layer(
        Dialog::text("Discard unsaved changes?")
            .title("Quit")
            .button("Discard", |s| quit_with::<S>(s, Intent::Quit))
            .dismiss_button("Back"),
    );
}

pub fn handle_save<S: ConfigService + 'static>(siv: &mut Cursive) {
    let writable = with_controller(siv, |c: &mut FormController<S>| {
        c.form().is_some_and(|f| f.is_writable())
    })
    .unwrap_or(false);
    if writable {
        quit_with::<S>(siv, Intent::Save);
    } else {
        report::<()>(siv, Some(Err(FormError::NotWritable)));
    }
}

pub fn handle_cancel<S: ConfigService + 'static>(siv: &mut Cursive) {
    let result = with_controller(siv, |c: &mut FormController<S>| c.cancel());
    if report(siv, result).is_some() {
        refresh::<S>(siv);
    }
}

pub fn handle_toggle_advanced<S: ConfigService + 'static>(siv: &mut Cursive) {
    let result = with_controller(siv, |c: &mut FormController<S>| c.toggle_advanced());
    if report(siv, result).is_some() {
        refresh::<S>(siv);
    }
}

fn quit_with<S: ConfigService + 'static>(siv: &mut Cursive, intent: Intent) {
    siv.with_user_data(|state: &mut TuiState<S>| state.intent = intent);
    siv.quit();
}

pub(crate) fn on_add<S: ConfigService + 'static>(siv: &mut Cursive, group_id: &str, after: &str) {
    let result = with_controller(siv, |c: &mut FormController<S>| c.add_instance(group_id, after));
    if report(siv, result).is_some() {
        refresh::<S>(siv);
    }
}

pub(crate) fn on_remove<S: ConfigService + 'static>(
    siv: &mut Cursive,
    group_id: &str,
    instance_id: &str,
) {
    let result = with_controller(siv, |c: &mut FormController<S>| {
        c.remove_instance(group_id, instance_id)
    });
    if report(siv, result).is_some() {
        refresh::<S>(siv);
    }
}

pub(crate) fn on_edit<S: ConfigService + 'static>(siv: &mut Cursive, control_id: &str, text: &str) {
    let result = with_controller(siv, |c: &mut FormController<S>| c.set_value(control_id, text));
    report(siv, result);
}

pub(crate) fn on_select<S: ConfigService + 'static>(siv: &mut Cursive, item_id: &str, value: &str) {
    let result = with_controller(siv, |c: &mut FormController<S>| c.select(item_id, value));
    report(siv, result);
}

/// Prompt for a path and store it in `control_id`.
pub(crate) fn on_browse<S: ConfigService + 'static>(siv: &mut Cursive, control_id: &str) {
    let current = with_controller(siv, |c: &mut FormController<S>| {
        c.form()
            .and_then(|f| f.control_value(control_id))
            .map(str::to_string)
    })
    .flatten()
    .unwrap_or_default();

    let submit_id = control_id.to_string();
    let ok_id = control_id.to_string();
    siv.add_layer(
        Dialog::around(
            EditView::new()
                .content(current)
                .on_submit(move |s, path| apply_browse::<S>(s, &submit_id, path))
                .with_name(BROWSE_INPUT)
                .fixed_width(60),
        )
        .title(format!("Path for {control_id}"))
        .button("OK", move |s| {
            let path = s
                .call_on_name(BROWSE_INPUT, |v: &mut EditView| v.get_content())
                .map(|c| c.to_string())
                .unwrap_or_default();
            apply_browse::<S>(s, &ok_id, &path);
        })
        .dismiss_button("Cancel"),
    );
}

fn apply_browse<S: ConfigService + 'static>(siv: &mut Cursive, control_id: &str, path: &str) {
    siv.pop_layer();
    let result = with_controller(siv, |c: &mut FormController<S>| c.set_value(control_id, path));
    if report(siv, result).is_some() {
        refresh::<S>(siv);
    }
}
