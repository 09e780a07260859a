use serde::Serialize;

use crate::data::SelectOption;

/// Host-independent model of the rendered configuration form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Form {
    pub sections: Vec<SectionBlock>,
    pub actions: ActionBar,
    /// Whether advanced items are currently shown.
    pub show_advanced: bool,
}

/// Header plus item blocks for one schema section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionBlock {
    pub name: String,
    /// Config file path, shown on the `Server` section only.
    pub config_path: Option<String>,
    pub items: Vec<ItemBlock>,
}

/// Everything rendered for one schema item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemBlock {
    pub item_id: String,
    pub advanced: bool,
    pub hidden: bool,
    pub body: ItemBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum ItemBody {
    Input(InputControl),
    Select(SelectControl),
    Group(ControlGroup),
    /// The schema node could not be rendered.
    Fault { message: String },
}

/// A labeled text input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputControl {
    pub id: String,
    pub label: String,
    pub description: String,
    pub value: String,
    pub size: Option<u32>,
    pub disabled: bool,
    pub affordances: Vec<Affordance>,
}

/// A labeled drop-down.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectControl {
    pub id: String,
    pub label: String,
    pub description: String,
    pub options: Vec<SelectOption>,
    pub selected: String,
    pub disabled: bool,
}

impl SelectControl {
    /// Index of the selected option, if it is one of the options.
    pub fn selected_index(&self) -> Option<usize> {
        self.options.iter().position(|o| o.value == self.selected)
    }
}

/// Live instances of a multi-valued item. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlGroup {
    pub base_id: String,
    pub instances: Vec<GroupInstance>,
    pub add: Affordance,
    pub disabled: bool,
    #[serde(skip)]
    pub(crate) template: InstanceTemplate,
}

impl ControlGroup {
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Position of the instance with control id `instance_id`.
    pub fn position(&self, instance_id: &str) -> Option<usize> {
        self.instances.iter().position(|i| i.input.id == instance_id)
    }

    /// Current values, one per instance.
    pub fn values(&self) -> Vec<String> {
        self.instances.iter().map(|i| i.input.value.clone()).collect()
    }
}

/// One repeated input inside a [`ControlGroup`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupInstance {
    /// Numeric suffix appended to the group's base id.
    pub suffix: u32,
    pub input: InputControl,
}

/// Everything needed to build a fresh group instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct InstanceTemplate {
    pub label: String,
    pub description: String,
    pub size: Option<u32>,
    pub browse: bool,
    pub disabled: bool,
}

/// Actions attached to a control; front-ends turn these into buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Affordance {
    Browse { control_id: String },
    Remove { group_id: String, instance_id: String },
    Add { group_id: String, label: String },
}

/// Save/Cancel buttons, or the read-only warning that replaces them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionBar {
    Editable { buttons: [FormAction; 2] },
    ReadOnly { warning: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormAction {
    Save,
    Cancel,
}

/// Host platform, decides the Save/Cancel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Other
        }
    }

    pub fn button_order(self) -> [FormAction; 2] {
        match self {
            Platform::MacOs => [FormAction::Cancel, FormAction::Save],
            Platform::Other => [FormAction::Save, FormAction::Cancel],
        }
    }
}

impl Form {
    /// All item blocks in document order.
    pub fn blocks(&self) -> impl Iterator<Item = &ItemBlock> {
        self.sections.iter().flat_map(|s| s.items.iter())
    }

    pub(crate) fn blocks_mut(&mut self) -> impl Iterator<Item = &mut ItemBlock> {
        self.sections.iter_mut().flat_map(|s| s.items.iter_mut())
    }

    pub fn block(&self, item_id: &str) -> Option<&ItemBlock> {
        self.blocks().find(|b| b.item_id == item_id)
    }

    pub(crate) fn block_mut(&mut self, item_id: &str) -> Option<&mut ItemBlock> {
        self.blocks_mut().find(|b| b.item_id == item_id)
    }

    pub fn group(&self, item_id: &str) -> Option<&ControlGroup> {
        match &self.block(item_id)?.body {
            ItemBody::Group(g) => Some(g),
            _ => None,
        }
    }

    pub(crate) fn group_mut(&mut self, item_id: &str) -> Option<&mut ControlGroup> {
        match &mut self.block_mut(item_id)?.body {
            ItemBody::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn is_writable(&self) -> bool {
        matches!(self.actions, ActionBar::Editable { .. })
    }

    /// Current value of the input or select with id `control_id`.
    ///
    /// Item controls are matched before group instances with the same id.
    pub fn control_value(&self, control_id: &str) -> Option<&str> {
        self.blocks()
            .find_map(|b| match &b.body {
                ItemBody::Input(i) if i.id == control_id => Some(i.value.as_str()),
                ItemBody::Select(s) if s.id == control_id => Some(s.selected.as_str()),
                _ => None,
            })
            .or_else(|| {
                self.blocks().find_map(|b| match &b.body {
                    ItemBody::Group(g) => g
                        .instances
                        .iter()
                        .find(|i| i.input.id == control_id)
                        .map(|i| i.input.value.as_str()),
                    _ => None,
                })
            })
    }

    pub(crate) fn input_mut(&mut self, control_id: &str) -> Option<&mut InputControl> {
        let item_control = self.blocks().any(|b| match &b.body {
            ItemBody::Input(i) => i.id == control_id,
            ItemBody::Select(s) => s.id == control_id,
            _ => false,
        });
        self.blocks_mut().find_map(|b| match &mut b.body {
            ItemBody::Input(i) if i.id == control_id => Some(i),
            ItemBody::Group(g) if !item_control => g
                .instances
                .iter_mut()
                .map(|i| &mut i.input)
                .find(|i| i.id == control_id),
            _ => None,
        })
    }

    /// Ids of every control whose block is not hidden.
    pub fn visible_control_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        for block in self.blocks().filter(|b| !b.hidden) {
            match &block.body {
                ItemBody::Input(i) => ids.push(i.id.as_str()),
                ItemBody::Select(s) => ids.push(s.id.as_str()),
                ItemBody::Group(g) => ids.extend(g.instances.iter().map(|i| i.input.id.as_str())),
                ItemBody::Fault { .. } => {}
            }
        }
        ids
    }

    /// Show or hide every advanced block.
    pub(crate) fn set_advanced_visible(&mut self, visible: bool) {
        self.show_advanced = visible;
        for block in self.blocks_mut().filter(|b| b.advanced) {
            block.hidden = !visible;
        }
    }
}
