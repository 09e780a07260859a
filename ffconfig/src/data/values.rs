use std::collections::HashMap;

use serde::Serialize;

use crate::{error::XmlError, xml};

/// Current value of one configuration field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ValueEntry {
    Scalar(String),
    /// A repeated field, one element per child node.
    Sequence(Vec<String>),
}

impl ValueEntry {
    /// The value as a single string, joining sequences with `,`.
    pub fn as_scalar(&self) -> String {
        match self {
            ValueEntry::Scalar(s) => s.clone(),
            ValueEntry::Sequence(v) => v.join(","),
        }
    }

    /// The value as a sequence; a scalar counts as one element.
    pub fn as_sequence(&self) -> Vec<String> {
        match self {
            ValueEntry::Scalar(s) => vec![s.clone()],
            ValueEntry::Sequence(v) => v.clone(),
        }
    }
}

/// Snapshot of the server's current configuration, keyed `section:field`.
#[derive(Debug, Clone, Default)]
pub struct ValueStore {
    entries: HashMap<String, ValueEntry>,
    /// Keys in document order, used to resolve bare field names.
    order: Vec<String>,
}

impl ValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all entries with the contents of `document`.
    ///
    /// Sections are the children of the `config` element when the document
    /// has one, otherwise the children of the root.
    pub fn parse_values(&mut self, document: &str) -> Result<(), XmlError> {
        let root = xml::parse(document)?;
        self.entries.clear();
        self.order.clear();

        let base = root.find("config").unwrap_or(&root);
        for section in base.elements() {
            for field in section.elements() {
                let value = if field.has_element_children() {
                    ValueEntry::Sequence(field.elements().map(|e| e.text()).collect())
                } else {
                    ValueEntry::Scalar(field.text())
                };
                let key = format!("{}:{}", section.name, field.name);
                if self.entries.insert(key.clone(), value).is_none() {
                    self.order.push(key);
                } else {
                    debug!("value {key} listed twice, keeping the last one");
                }
            }
        }

        info!("values loaded: {} fields", self.entries.len());
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&ValueEntry> {
        self.entries.get(key)
    }

    /// Resolve a schema item id to its value.
    ///
    /// Qualified ids (`section:field`) are looked up directly. A bare field
    /// name matches the first field with that name in document order.
    pub fn lookup(&self, item_id: &str) -> Option<&ValueEntry> {
        if item_id.contains(':') {
            return self.get(item_id);
        }
        self.order
            .iter()
            .find(|key| key.rsplit(':').next() == Some(item_id))
            .and_then(|key| self.entries.get(key))
    }

    /// Keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALUES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
        <response><status>200</status><config>
            <general>
                <servername>Firefly</servername>
                <mp3_dir><item>/music/a</item><item>/music/b</item></mp3_dir>
                <empty></empty>
            </general>
            <scanning><process_m3u>1</process_m3u></scanning>
        </config></response>"#;

    #[test]
    fn test_scalar_and_sequence_fields() {
        let mut store = ValueStore::new();
        store.parse_values(VALUES).unwrap();
        assert_eq!(
            store.get("general:servername"),
            Some(&ValueEntry::Scalar("Firefly".into()))
        );
        assert_eq!(
            store.get("general:mp3_dir"),
            Some(&ValueEntry::Sequence(vec!["/music/a".into(), "/music/b".into()]))
        );
        assert_eq!(store.get("general:empty"), Some(&ValueEntry::Scalar(String::new())));
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_lookup_bridges_bare_names() {
        let mut store = ValueStore::new();
        store.parse_values(VALUES).unwrap();
        assert_eq!(store.lookup("process_m3u").unwrap().as_scalar(), "1");
        assert_eq!(store.lookup("scanning:process_m3u").unwrap().as_scalar(), "1");
        assert!(store.lookup("general:process_m3u").is_none());
        assert!(store.lookup("missing").is_none());
    }

    #[test]
    fn test_root_without_config_wrapper() {
        let mut store = ValueStore::new();
        store.parse_values(VALUES).unwrap();
        store
            .parse_values("<values><daap><port>3689</port></daap></values>")
            .unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.lookup("daap:port").unwrap().as_scalar(), "3689");
    }
}
