pub use cursive;
use cursive::{Cursive, CursiveExt};

use crate::{
    form::FormController,
    service::ConfigService,
    ui::{Intent, TuiState, handle_quit, handle_save, handle_toggle_advanced, view::form_view},
};

/// Run the terminal editor until the user quits.
///
/// The form is loaded first if the controller has not been loaded yet.
/// Saving leaves the Cursive loop, awaits the update and re-enters with the
/// outcome shown above the form. Returns the controller so callers can
/// inspect the final state.
///
/// # Errors
///
/// Returns errors when loading fails. Edit and save errors are shown in the
/// UI instead.
pub async fn run<S: ConfigService + 'static>(
    mut controller: FormController<S>,
) -> anyhow::Result<FormController<S>> {
    if controller.form().is_none() {
        controller.load().await?;
    }

    #[cfg(feature = "logging")]
    {
        cursive::logger::init();
        cursive::logger::set_filter_levels_from_env();
    }

    let mut status = None;
    loop {
        let state = show(TuiState {
            controller,
            intent: Intent::Quit,
            status,
        })?;
        controller = state.controller;

        match state.intent {
            Intent::Quit => return Ok(controller),
            Intent::Save => {
                status = Some(match controller.save().await {
                    Ok(()) => "Configuration saved.".to_string(),
                    Err(e) => format!("Save failed: {e}"),
                });
            }
        }
    }
}

fn show<S: ConfigService + 'static>(state: TuiState<S>) -> anyhow::Result<TuiState<S>> {
    let view = state
        .controller
        .form()
        .map(|form| form_view::<S>(form, state.status.as_deref()))
        .ok_or_else(|| anyhow::anyhow!("form has not been rendered"))?;

    let mut siv = Cursive::default();
    siv.set_user_data(state);

    siv.add_global_callback('q', handle_quit::<S>);
    siv.add_global_callback('Q', handle_quit::<S>);
    siv.add_global_callback('s', handle_save::<S>);
    siv.add_global_callback('S', handle_save::<S>);
    siv.add_global_callback('a', handle_toggle_advanced::<S>);
    siv.add_global_callback('~', Cursive::toggle_debug_console);
    siv.add_fullscreen_layer(view);

    siv.run();

    siv.take_user_data::<TuiState<S>>()
        .ok_or_else(|| anyhow::anyhow!("editor state lost"))
}
