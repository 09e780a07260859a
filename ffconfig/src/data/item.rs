use serde::Serialize;

use crate::xml::Element;

/// Input width implied by the `short_text` family of legacy types.
pub const SHORT_TEXT_SIZE: u32 = 20;
/// Input width implied by the `long_text` family of legacy types.
pub const LONG_TEXT_SIZE: u32 = 80;

/// One configurable field described by the schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSchema {
    /// Unique id, also the key sent back on save.
    pub id: String,
    /// Display label.
    pub name: String,
    pub short_description: String,
    pub default_value: Option<String>,
    /// Suggested input width in characters.
    pub size: Option<u32>,
    /// Hidden unless the advanced preference is on.
    pub advanced: bool,
    pub kind: ItemKind,
}

/// Closed set of item kinds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    Text(TextItem),
    Select(SelectItem),
}

/// Free text input, optionally repeated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextItem {
    pub multiple: bool,
    /// Offer a browse affordance next to the input.
    pub browse: bool,
    /// Label of the "add" affordance of a repeated group.
    pub add_item_label: String,
}

/// Drop-down with a fixed option list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectItem {
    /// Never empty.
    pub options: Vec<SelectOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectItem {
    pub fn contains(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }
}

impl ItemSchema {
    pub fn is_multiple(&self) -> bool {
        matches!(&self.kind, ItemKind::Text(t) if t.multiple)
    }

    /// Parse an `<item>` node.
    ///
    /// Returns a [`SchemaFault`] for nodes the engine cannot render.
    pub fn from_element(node: &Element) -> Result<Self, SchemaFault> {
        let id = node
            .attr("id")
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| SchemaFault::new(None, "item has no id"))?
            .to_string();

        let text = |name: &str| node.child_text(name).unwrap_or_default();
        let flag = |name: &str| node.child_text(name).is_some_and(|v| parse_flag(&v));

        let type_name = text("type");
        let (mut kind, implied_size) = match type_name.as_str() {
            "text" => (ItemKind::Text(TextItem::default()), None),
            "short_text" => (ItemKind::Text(TextItem::default()), Some(SHORT_TEXT_SIZE)),
            "long_text" => (ItemKind::Text(TextItem::default()), Some(LONG_TEXT_SIZE)),
            "short_text_multiple" => (
                ItemKind::Text(TextItem {
                    multiple: true,
                    ..Default::default()
                }),
                Some(SHORT_TEXT_SIZE),
            ),
            "long_text_multiple" => (
                ItemKind::Text(TextItem {
                    multiple: true,
                    ..Default::default()
                }),
                Some(LONG_TEXT_SIZE),
            ),
            "select" => {
                let options: Vec<SelectOption> = node
                    .children_named("option")
                    .map(|o| SelectOption {
                        value: o.attr("value").unwrap_or_default().to_string(),
                        label: o.text().trim().to_string(),
                    })
                    .collect();
                if options.is_empty() {
                    return Err(SchemaFault::new(
                        Some(id),
                        "select item declares no options",
                    ));
                }
                (ItemKind::Select(SelectItem { options }), None)
            }
            "" => return Err(SchemaFault::new(Some(id), "item has no type")),
            other => {
                return Err(SchemaFault::new(
                    Some(id),
                    format!("unknown item type {other:?}"),
                ));
            }
        };

        if let ItemKind::Text(t) = &mut kind {
            t.multiple |= flag("multiple");
            t.browse = flag("browse");
            t.add_item_label = text("add_item_text");
        } else if node.child("multiple").is_some_and(|m| parse_flag(&m.text())) {
            warn!("select item {id} is marked multiple, treating it as scalar");
        }

        let size = node
            .child_text("size")
            .and_then(|s| s.parse::<u32>().ok())
            .or(implied_size);

        Ok(ItemSchema {
            name: text("name"),
            short_description: text("short_description"),
            default_value: node.child("default_value").map(|d| d.text()),
            size,
            advanced: flag("advanced"),
            kind,
            id,
        })
    }
}

/// A schema node the engine refused to register, or an id clash.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaFault {
    pub item_id: Option<String>,
    pub message: String,
}

impl SchemaFault {
    pub fn new(item_id: Option<String>, message: impl Into<String>) -> Self {
        Self {
            item_id,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SchemaFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.item_id {
            Some(id) => write!(f, "item {id}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml;

    fn item(src: &str) -> Result<ItemSchema, SchemaFault> {
        ItemSchema::from_element(&xml::parse(src).unwrap())
    }

    #[test]
    fn test_legacy_multiple_type() {
        let it = item(
            r#"<item id="general:mp3_dir"><type>long_text_multiple</type>
               <name>Music Folder</name><add_item_text>Add folder</add_item_text>
               <browse>1</browse></item>"#,
        )
        .unwrap();
        assert_eq!(it.size, Some(LONG_TEXT_SIZE));
        assert!(it.is_multiple());
        let ItemKind::Text(t) = &it.kind else {
            panic!("expected text item");
        };
        assert!(t.browse);
        assert_eq!(t.add_item_label, "Add folder");
    }

    #[test]
    fn test_explicit_size_overrides_implied() {
        let it = item(r#"<item id="a"><type>short_text</type><size>5</size></item>"#).unwrap();
        assert_eq!(it.size, Some(5));
        assert!(!it.advanced);
        assert_eq!(it.default_value, None);
    }

    #[test]
    fn test_select_options_in_order() {
        let it = item(
            r#"<item id="loglevel"><type>select</type><default_value>1</default_value>
               <option value="1">Error</option><option value="4">Debug</option></item>"#,
        )
        .unwrap();
        let ItemKind::Select(s) = &it.kind else {
            panic!("expected select item");
        };
        assert_eq!(s.options[0].label, "Error");
        assert_eq!(s.options[1].value, "4");
        assert_eq!(it.default_value.as_deref(), Some("1"));
    }

    #[test]
    fn test_faults() {
        let fault = item(r#"<item id="x"><type>checkbox</type></item>"#).unwrap_err();
        assert_eq!(fault.item_id.as_deref(), Some("x"));
        assert!(fault.message.contains("checkbox"));

        assert!(item(r#"<item id="s"><type>select</type></item>"#).is_err());
        assert!(item(r#"<item><type>text</type></item>"#).is_err());
    }
}
