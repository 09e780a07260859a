use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::{
    data::item::{ItemSchema, SchemaFault},
    error::XmlError,
    xml,
};

/// A named section and the ids of its items in document order.
///
/// Ids of faulty items are kept so the form can show where they were.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SectionSchema {
    pub name: String,
    pub item_ids: Vec<String>,
}

/// Catalog of sections and items parsed from `/config.xml`.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    sections: Vec<SectionSchema>,
    /// Items in document order.
    items: Vec<ItemSchema>,
    index: HashMap<String, usize>,
    faults: Vec<SchemaFault>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the catalog with the contents of `document`.
    ///
    /// Only malformed XML is an error. Item nodes that cannot be rendered are
    /// logged and recorded in [`faults`](Self::faults).
    pub fn parse_schema(&mut self, document: &str) -> Result<(), XmlError> {
        let root = xml::parse(document)?;
        self.clear();
        // Every id met so far, rejected ones included.
        let mut seen = HashSet::new();

        for section in root.children_named("section") {
            let mut schema = SectionSchema {
                name: section.attr("name").unwrap_or_default().to_string(),
                item_ids: Vec::new(),
            };

            for node in section.children_named("item") {
                match ItemSchema::from_element(node) {
                    Ok(item) if !seen.insert(item.id.clone()) => {
                        self.fault(SchemaFault::new(
                            Some(item.id.clone()),
                            "duplicate item id, keeping the first definition",
                        ));
                    }
                    Ok(item) => {
                        schema.item_ids.push(item.id.clone());
                        self.index.insert(item.id.clone(), self.items.len());
                        self.items.push(item);
                    }
                    Err(fault) => {
                        if let Some(id) = &fault.item_id
                            && seen.insert(id.clone())
                        {
                            schema.item_ids.push(id.clone());
                        }
                        self.fault(fault);
                    }
                }
            }
            self.sections.push(schema);
        }
        self.check_instance_collisions();

        info!(
            "schema loaded: {} sections, {} items, {} faults",
            self.sections.len(),
            self.items.len(),
            self.faults.len()
        );
        Ok(())
    }

    /// Instances of a multi item `dir` are `dir0`, `dir1`, ... so an item
    /// named like one of them shares its control id. The item keeps its id
    /// and wins lookups; the clash is reported as a fault.
    fn check_instance_collisions(&mut self) {
        let clashes: Vec<_> = self
            .items
            .iter()
            .filter_map(|item| {
                let base = self.items.iter().find(|multi| {
                    multi.is_multiple()
                        && item.id.strip_prefix(multi.id.as_str()).is_some_and(|suffix| {
                            !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit())
                        })
                })?;
                Some(SchemaFault::new(
                    Some(item.id.clone()),
                    format!("id collides with an instance of multi-valued item {}", base.id),
                ))
            })
            .collect();
        for fault in clashes {
            self.fault(fault);
        }
    }

    fn fault(&mut self, fault: SchemaFault) {
        error!("schema fault: {fault}");
        self.faults.push(fault);
    }

    fn clear(&mut self) {
        self.sections.clear();
        self.items.clear();
        self.index.clear();
        self.faults.clear();
    }

    pub fn get_item(&self, id: &str) -> Option<&ItemSchema> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    /// All registered items in document order.
    pub fn all_items(&self) -> impl Iterator<Item = (&str, &ItemSchema)> {
        self.items.iter().map(|item| (item.id.as_str(), item))
    }

    pub fn sections(&self) -> &[SectionSchema] {
        &self.sections
    }

    pub fn faults(&self) -> &[SchemaFault] {
        &self.faults
    }

    /// First fault recorded for `id`. Rejected items render from this.
    pub fn fault_for(&self, id: &str) -> Option<&SchemaFault> {
        self.faults
            .iter()
            .find(|f| f.item_id.as_deref() == Some(id))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"<config>
        <section name="Server">
            <item id="general:servername"><type>short_text</type><name>Server Name</name></item>
            <item id="general:port"><type>text</type><name>Port</name><advanced>1</advanced></item>
        </section>
        <section name="Music Files">
            <item id="general:mp3_dir"><type>long_text_multiple</type><name>Music Folder</name></item>
            <item id="general:bogus"><type>checkbox</type></item>
        </section>
    </config>"#;

    #[test]
    fn test_all_items_keyed_in_document_order() {
        let mut reg = SchemaRegistry::new();
        reg.parse_schema(SCHEMA).unwrap();
        let ids: Vec<_> = reg.all_items().map(|(id, _)| id).collect();
        assert_eq!(
            ids,
            ["general:servername", "general:port", "general:mp3_dir"]
        );
        assert_eq!(reg.len(), 3);
        assert_eq!(reg.sections().len(), 2);
        assert_eq!(reg.sections()[1].item_ids.len(), 2);
        assert!(reg.get_item("general:port").unwrap().advanced);
        assert!(reg.fault_for("general:bogus").is_some());
    }

    #[test]
    fn test_reparse_replaces_catalog() {
        let mut reg = SchemaRegistry::new();
        reg.parse_schema(SCHEMA).unwrap();
        reg.parse_schema(
            r#"<config><section name="Other"><item id="x"><type>text</type></item></section></config>"#,
        )
        .unwrap();
        assert_eq!(reg.len(), 1);
        assert!(reg.get_item("general:port").is_none());
        assert!(reg.faults().is_empty());
    }

    #[test]
    fn test_duplicate_id_keeps_first() {
        let mut reg = SchemaRegistry::new();
        reg.parse_schema(
            r#"<config><section name="A">
                <item id="x"><type>text</type><name>First</name></item>
                <item id="x"><type>text</type><name>Second</name></item>
            </section></config>"#,
        )
        .unwrap();
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get_item("x").unwrap().name, "First");
        assert_eq!(reg.sections()[0].item_ids, ["x"]);
        assert_eq!(reg.faults().len(), 1);
    }

    #[test]
    fn test_duplicate_of_rejected_id_is_rejected() {
        let mut reg = SchemaRegistry::new();
        reg.parse_schema(
            r#"<config><section name="A">
                <item id="x"><type>slider</type></item>
                <item id="x"><type>text</type><name>Second</name></item>
            </section></config>"#,
        )
        .unwrap();
        assert!(reg.is_empty());
        assert_eq!(reg.sections()[0].item_ids, ["x"]);
        assert_eq!(reg.faults().len(), 2);
        assert!(reg.fault_for("x").unwrap().message.contains("slider"));
    }

    #[test]
    fn test_instance_id_collision_is_reported() {
        let mut reg = SchemaRegistry::new();
        reg.parse_schema(
            r#"<config><section name="A">
                <item id="dir"><type>text</type><multiple>1</multiple></item>
                <item id="dir1"><type>text</type></item>
                <item id="directory"><type>text</type></item>
            </section></config>"#,
        )
        .unwrap();
        assert_eq!(reg.len(), 3);
        assert_eq!(reg.faults().len(), 1);
        assert!(reg.fault_for("dir1").unwrap().message.contains("dir"));
        assert!(reg.fault_for("directory").is_none());
    }
}
