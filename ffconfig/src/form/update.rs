//! Serialization of the live form into an `updateconfig` request body.

use super::tree::{Form, ItemBody};

/// Field values collected from a form, in document order.
///
/// Multi-valued items become one field whose instance values are joined
/// with `,` on the wire. A value that itself contains a comma cannot be told
/// apart from two values by the server; that is a limitation of the
/// `updateconfig` format and is left as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateRequest {
    fields: Vec<(String, Vec<String>)>,
}

impl UpdateRequest {
    pub fn from_form(form: &Form) -> Self {
        let mut fields = Vec::new();
        for block in form.blocks() {
            match &block.body {
                ItemBody::Input(input) => fields.push((input.id.clone(), vec![input.value.clone()])),
                ItemBody::Select(select) => {
                    fields.push((select.id.clone(), vec![select.selected.clone()]))
                }
                ItemBody::Group(group) => fields.push((group.base_id.clone(), group.values())),
                ItemBody::Fault { .. } => {}
            }
        }
        Self { fields }
    }

    /// Wire value of `key` (comma-joined for multi-valued items).
    pub fn get(&self, key: &str) -> Option<String> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.join(","))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `application/x-www-form-urlencoded` body.
    pub fn encode(&self) -> String {
        self.fields
            .iter()
            .map(|(key, values)| {
                let value = values
                    .iter()
                    .map(|v| urlencoding::encode(v).into_owned())
                    .collect::<Vec<_>>()
                    .join(",");
                format!("{}={}", urlencoding::encode(key), value)
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}
