use cursive::{
    theme::{BaseColor, Color, ColorStyle, Effect},
    traits::{Resizable, Scrollable},
    utils::markup::StyledString,
    views::{Button, Dialog, DummyView, EditView, LinearLayout, Panel, SelectView, TextView},
};

use crate::{
    form::{ActionBar, Affordance, Form, FormAction, InputControl, ItemBlock, ItemBody, SelectControl},
    service::ConfigService,
};

use super::handlers::{
    handle_cancel, handle_quit, handle_save, handle_toggle_advanced, on_add, on_browse, on_edit,
    on_remove, on_select,
};

const LABEL_WIDTH: usize = 24;
const DEFAULT_INPUT_WIDTH: u32 = 30;

/// Build the full-screen layer for `form`.
pub fn form_view<S: ConfigService + 'static>(form: &Form, status: Option<&str>) -> Dialog {
    let mut body = LinearLayout::vertical();

    if let Some(status) = status {
        body.add_child(TextView::new(StyledString::styled(status, Effect::Bold)));
    }
    if let ActionBar::ReadOnly { warning } = &form.actions {
        body.add_child(TextView::new(StyledString::styled(
            warning.as_str(),
            ColorStyle::front(Color::Light(BaseColor::Yellow)),
        )));
    }

    for section in &form.sections {
        let mut panel = LinearLayout::vertical();
        if let Some(path) = &section.config_path {
            panel.add_child(TextView::new(format!(
                "{:<width$}{path}",
                "Config File",
                width = LABEL_WIDTH
            )));
        }
        for block in section.items.iter().filter(|b| !b.hidden) {
            panel.add_child(item_view::<S>(block));
        }
        body.add_child(Panel::new(panel).title(section.name.clone()));
    }

    let toggle = if form.show_advanced {
        "Hide advanced"
    } else {
        "Show advanced"
    };
    let mut dialog = Dialog::around(body.scrollable())
        .title("Firefly configuration")
        .button(toggle, handle_toggle_advanced::<S>);

    if let ActionBar::Editable { buttons } = &form.actions {
        for action in buttons {
            dialog = match action {
                FormAction::Save => dialog.button("Save", handle_save::<S>),
                FormAction::Cancel => dialog.button("Cancel", handle_cancel::<S>),
            };
        }
    }
    dialog.button("Quit", handle_quit::<S>)
}

fn item_view<S: ConfigService + 'static>(block: &ItemBlock) -> LinearLayout {
    match &block.body {
        ItemBody::Input(input) => input_row::<S>(input),
        ItemBody::Select(select) => select_row::<S>(&block.item_id, select),
        ItemBody::Group(group) => {
            let mut column = LinearLayout::vertical();
            for instance in &group.instances {
                column.add_child(input_row::<S>(&instance.input));
            }
            if let Affordance::Add { group_id, label } = &group.add {
                let group_id = group_id.clone();
                let after = group
                    .instances
                    .last()
                    .map(|i| i.input.id.clone())
                    .unwrap_or_default();
                let label = if label.is_empty() { "Add" } else { label.as_str() };
                let mut button = Button::new(label, move |s| on_add::<S>(s, &group_id, &after));
                button.set_enabled(!group.disabled);
                column.add_child(
                    LinearLayout::horizontal()
                        .child(DummyView.fixed_width(LABEL_WIDTH))
                        .child(button),
                );
            }
            column
        }
        ItemBody::Fault { message } => LinearLayout::vertical().child(TextView::new(
            StyledString::styled(
                format!("{}: {message}", block.item_id),
                ColorStyle::front(Color::Light(BaseColor::Red)),
            ),
        )),
    }
}

fn input_row<S: ConfigService + 'static>(input: &InputControl) -> LinearLayout {
    let id = input.id.clone();
    let mut edit = EditView::new()
        .content(input.value.clone())
        .on_edit(move |s, text, _cursor| on_edit::<S>(s, &id, text));
    edit.set_enabled(!input.disabled);
    let width = input.size.unwrap_or(DEFAULT_INPUT_WIDTH).clamp(8, 60) as usize;

    let mut row = LinearLayout::horizontal()
        .child(TextView::new(input.label.clone()).fixed_width(LABEL_WIDTH))
        .child(edit.fixed_width(width));

    for affordance in &input.affordances {
        let mut button = match affordance {
            Affordance::Remove {
                group_id,
                instance_id,
            } => {
                let (group_id, instance_id) = (group_id.clone(), instance_id.clone());
                Button::new("Remove", move |s| on_remove::<S>(s, &group_id, &instance_id))
            }
            Affordance::Browse { control_id } => {
                let control_id = control_id.clone();
                Button::new("Browse", move |s| on_browse::<S>(s, &control_id))
            }
            Affordance::Add { .. } => continue,
        };
        button.set_enabled(!input.disabled);
        row.add_child(button);
    }

    if !input.description.is_empty() {
        row.add_child(TextView::new(format!(" {}", input.description)));
    }
    row
}

/// Shown when the current value is empty and matches no option.
const UNSET_LABEL: &str = "(not set)";

/// Popup entries for `select` and the index to show as selected.
///
/// A value that matches no option gets a leading entry of its own so the
/// popup shows what Save will send.
fn select_entries(select: &SelectControl) -> (Vec<(String, String)>, usize) {
    let options = select
        .options
        .iter()
        .map(|o| (o.label.clone(), o.value.clone()));
    match select.selected_index() {
        Some(i) => (options.collect(), i),
        None => {
            let label = if select.selected.is_empty() {
                UNSET_LABEL.to_string()
            } else {
                format!("{} (not an option)", select.selected)
            };
            let entries = std::iter::once((label, select.selected.clone()))
                .chain(options)
                .collect();
            (entries, 0)
        }
    }
}

fn select_row<S: ConfigService + 'static>(item_id: &str, select: &SelectControl) -> LinearLayout {
    let item_id = item_id.to_string();
    let unmatched = select
        .selected_index()
        .is_none()
        .then(|| select.selected.clone());
    let (entries, selected) = select_entries(select);
    let mut view = SelectView::<String>::new()
        .popup()
        .with_all(entries)
        .selected(selected);
    view.set_on_submit(move |s, value: &String| {
        if unmatched.as_ref() != Some(value) {
            on_select::<S>(s, &item_id, value);
        }
    });
    view.set_enabled(!select.disabled);

    let mut row = LinearLayout::horizontal()
        .child(TextView::new(select.label.clone()).fixed_width(LABEL_WIDTH))
        .child(view);
    if !select.description.is_empty() {
        row.add_child(TextView::new(format!(" {}", select.description)));
    }
    row
}
