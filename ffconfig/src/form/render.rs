//! Item rendering: schema item + current value → item block.

use crate::data::{ItemKind, ItemSchema, SchemaFault, ValueEntry};

use super::tree::{
    Affordance, ControlGroup, GroupInstance, InputControl, InstanceTemplate, ItemBlock, ItemBody,
    SelectControl,
};

/// Form-wide inputs to rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext {
    pub writable: bool,
    pub show_advanced: bool,
}

/// Build the block for `item` from its current `value`.
pub fn render_item(item: &ItemSchema, value: Option<&ValueEntry>, ctx: RenderContext) -> ItemBlock {
    let disabled = !ctx.writable;
    let body = match &item.kind {
        ItemKind::Text(text) if text.multiple => {
            let template = InstanceTemplate {
                label: item.name.clone(),
                description: item.short_description.clone(),
                size: item.size,
                browse: text.browse,
                disabled,
            };
            let instances = sequence_value(value)
                .into_iter()
                .enumerate()
                .map(|(i, v)| group_instance(&item.id, &template, i as u32, v))
                .collect();
            ItemBody::Group(ControlGroup {
                base_id: item.id.clone(),
                instances,
                add: Affordance::Add {
                    group_id: item.id.clone(),
                    label: text.add_item_label.clone(),
                },
                disabled,
                template,
            })
        }
        ItemKind::Text(text) => {
            let mut affordances = Vec::new();
            if text.browse {
                affordances.push(Affordance::Browse {
                    control_id: item.id.clone(),
                });
            }
            ItemBody::Input(InputControl {
                id: item.id.clone(),
                label: item.name.clone(),
                description: item.short_description.clone(),
                value: scalar_value(item, value),
                size: item.size,
                disabled,
                affordances,
            })
        }
        ItemKind::Select(select) => ItemBody::Select(SelectControl {
            id: item.id.clone(),
            label: item.name.clone(),
            description: item.short_description.clone(),
            options: select.options.clone(),
            selected: select_value(item, value),
            disabled,
        }),
    };

    debug!("rendered item {}", item.id);
    ItemBlock {
        item_id: item.id.clone(),
        advanced: item.advanced,
        hidden: item.advanced && !ctx.show_advanced,
        body,
    }
}

/// Block shown in place of an item the schema registry rejected.
pub fn render_fault(item_id: &str, fault: &SchemaFault) -> ItemBlock {
    error!("cannot render {item_id}: {fault}");
    ItemBlock {
        item_id: item_id.to_string(),
        advanced: false,
        hidden: false,
        body: ItemBody::Fault {
            message: fault.to_string(),
        },
    }
}

/// Control id of instance `suffix` of group `base_id`.
pub fn instance_id(base_id: &str, suffix: u32) -> String {
    format!("{base_id}{suffix}")
}

/// Build one group instance with its affordances attached.
pub(crate) fn group_instance(
    base_id: &str,
    template: &InstanceTemplate,
    suffix: u32,
    value: String,
) -> GroupInstance {
    let id = instance_id(base_id, suffix);
    let mut affordances = vec![Affordance::Remove {
        group_id: base_id.to_string(),
        instance_id: id.clone(),
    }];
    if template.browse {
        affordances.push(Affordance::Browse {
            control_id: id.clone(),
        });
    }
    GroupInstance {
        suffix,
        input: InputControl {
            id,
            label: template.label.clone(),
            description: template.description.clone(),
            value,
            size: template.size,
            disabled: template.disabled,
            affordances,
        },
    }
}

/// Scalar text value: current value, else default, else empty.
pub(crate) fn scalar_value(item: &ItemSchema, value: Option<&ValueEntry>) -> String {
    value
        .map(ValueEntry::as_scalar)
        .or_else(|| item.default_value.clone())
        .unwrap_or_default()
}

/// Select value: an empty current value also falls back to the default.
pub(crate) fn select_value(item: &ItemSchema, value: Option<&ValueEntry>) -> String {
    value
        .map(ValueEntry::as_scalar)
        .filter(|v| !v.is_empty())
        .or_else(|| item.default_value.clone())
        .unwrap_or_default()
}

/// Values for a repeated item; never empty.
pub(crate) fn sequence_value(value: Option<&ValueEntry>) -> Vec<String> {
    let values = value.map(ValueEntry::as_sequence).unwrap_or_default();
    if values.is_empty() {
        vec![String::new()]
    } else {
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SelectItem, SelectOption, TextItem};

    const EDIT: RenderContext = RenderContext {
        writable: true,
        show_advanced: false,
    };

    fn text_item(id: &str, multiple: bool) -> ItemSchema {
        ItemSchema {
            id: id.into(),
            name: "Label".into(),
            short_description: String::new(),
            default_value: Some("fallback".into()),
            size: Some(20),
            advanced: false,
            kind: ItemKind::Text(TextItem {
                multiple,
                browse: true,
                add_item_label: "Add".into(),
            }),
        }
    }

    #[test]
    fn test_scalar_text_falls_back_to_default() {
        let block = render_item(&text_item("a", false), None, EDIT);
        let ItemBody::Input(input) = &block.body else {
            panic!("expected input");
        };
        assert_eq!(input.value, "fallback");
        assert_eq!(
            input.affordances,
            [Affordance::Browse {
                control_id: "a".into()
            }]
        );
    }

    #[test]
    fn test_group_has_one_instance_per_value() {
        let value = ValueEntry::Sequence(vec!["x".into(), "y".into()]);
        let block = render_item(&text_item("dir", true), Some(&value), EDIT);
        let ItemBody::Group(group) = &block.body else {
            panic!("expected group");
        };
        assert_eq!(group.values(), ["x", "y"]);
        assert_eq!(group.instances[1].input.id, "dir1");
        assert!(matches!(
            &group.instances[1].input.affordances[0],
            Affordance::Remove { instance_id, .. } if instance_id == "dir1"
        ));

        let empty = render_item(&text_item("dir", true), None, EDIT);
        let ItemBody::Group(group) = &empty.body else {
            panic!("expected group");
        };
        assert_eq!(group.values(), [""]);
    }

    #[test]
    fn test_read_only_select_and_advanced_hidden() {
        let item = ItemSchema {
            id: "loglevel".into(),
            name: "Log Level".into(),
            short_description: String::new(),
            default_value: Some("1".into()),
            size: None,
            advanced: true,
            kind: ItemKind::Select(SelectItem {
                options: vec![
                    SelectOption {
                        value: "1".into(),
                        label: "Error".into(),
                    },
                    SelectOption {
                        value: "4".into(),
                        label: "Debug".into(),
                    },
                ],
            }),
        };
        let ctx = RenderContext {
            writable: false,
            show_advanced: false,
        };
        let block = render_item(&item, Some(&ValueEntry::Scalar(String::new())), ctx);
        assert!(block.hidden);
        let ItemBody::Select(select) = &block.body else {
            panic!("expected select");
        };
        assert!(select.disabled);
        assert_eq!(select.selected_index(), Some(0));
    }
}
