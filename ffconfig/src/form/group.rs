//! Add/remove lifecycle of repeated group instances.

use crate::error::FormError;

use super::{render::group_instance, tree::ControlGroup};

/// Operations on a [`ControlGroup`].
///
/// A group never drops below one instance: removing the last one clears it.
pub struct GroupManager;

impl GroupManager {
    /// Maximum number of repair passes in [`reconcile_to_count`](Self::reconcile_to_count).
    pub const RECONCILE_LIMIT: usize = 10;

    /// Insert an empty instance right after `after` and return its id.
    ///
    /// The new suffix is one past the highest suffix in the group, so
    /// repeated adds never collide with existing ids.
    pub fn add_instance(group: &mut ControlGroup, after: &str) -> Result<String, FormError> {
        let position = group
            .position(after)
            .ok_or_else(|| FormError::UnknownControl(after.to_string()))?;
        let id = Self::insert_at(group, position + 1);
        debug!("group {}: added {id} after {after}", group.base_id);
        Ok(id)
    }

    /// Remove `instance_id`, or clear it when it is the only instance.
    pub fn remove_instance(group: &mut ControlGroup, instance_id: &str) -> Result<(), FormError> {
        let position = group
            .position(instance_id)
            .ok_or_else(|| FormError::UnknownControl(instance_id.to_string()))?;
        if group.instances.len() > 1 {
            group.instances.remove(position);
            debug!("group {}: removed {instance_id}", group.base_id);
        } else {
            group.instances[position].input.value.clear();
            debug!("group {}: cleared last instance {instance_id}", group.base_id);
        }
        Ok(())
    }

    /// Add or remove trailing instances until the group has `target` of them.
    pub fn reconcile_to_count(group: &mut ControlGroup, target: usize) -> Result<(), FormError> {
        for _ in 0..Self::RECONCILE_LIMIT {
            let len = group.instances.len();
            if len == target {
                return Ok(());
            }
            if len < target {
                for _ in len..target {
                    Self::insert_at(group, group.instances.len());
                }
            } else {
                for _ in target..len {
                    let Some(last) = group.instances.last() else {
                        break;
                    };
                    let last = last.input.id.clone();
                    Self::remove_instance(group, &last)?;
                }
            }
        }

        if group.instances.len() == target {
            return Ok(());
        }
        Err(FormError::ReconcileOverrun {
            group: group.base_id.clone(),
            expected: target,
            actual: group.instances.len(),
        })
    }

    /// Resize the group to `values` (at least one instance) and assign them
    /// positionally.
    pub fn set_values(group: &mut ControlGroup, values: &[String]) -> Result<(), FormError> {
        Self::reconcile_to_count(group, values.len().max(1))?;
        for (i, instance) in group.instances.iter_mut().enumerate() {
            instance.input.value = values.get(i).cloned().unwrap_or_default();
        }
        Ok(())
    }

    fn insert_at(group: &mut ControlGroup, position: usize) -> String {
        let suffix = group
            .instances
            .iter()
            .map(|i| i.suffix + 1)
            .max()
            .unwrap_or(0);
        let instance = group_instance(&group.base_id, &group.template, suffix, String::new());
        let id = instance.input.id.clone();
        group.instances.insert(position, instance);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::{ItemKind, ItemSchema, TextItem, ValueEntry},
        form::{
            render::{RenderContext, render_item},
            tree::ItemBody,
        },
    };

    fn group(values: &[&str]) -> ControlGroup {
        let item = ItemSchema {
            id: "dir".into(),
            name: "Folder".into(),
            short_description: String::new(),
            default_value: None,
            size: None,
            advanced: false,
            kind: ItemKind::Text(TextItem {
                multiple: true,
                browse: false,
                add_item_label: "Add folder".into(),
            }),
        };
        let value = ValueEntry::Sequence(values.iter().map(|v| v.to_string()).collect());
        let ctx = RenderContext {
            writable: true,
            show_advanced: true,
        };
        match render_item(&item, Some(&value), ctx).body {
            ItemBody::Group(g) => g,
            _ => panic!("expected group"),
        }
    }

    #[test]
    fn test_add_uses_next_unused_suffix() {
        let mut g = group(&["a", "b"]);
        let first = GroupManager::add_instance(&mut g, "dir0").unwrap();
        let second = GroupManager::add_instance(&mut g, "dir0").unwrap();
        assert_eq!(first, "dir2");
        assert_eq!(second, "dir3");

        let ids: Vec<_> = g.instances.iter().map(|i| i.input.id.as_str()).collect();
        assert_eq!(ids, ["dir0", "dir3", "dir2", "dir1"]);
        assert_eq!(g.values(), ["a", "", "", "b"]);
    }

    #[test]
    fn test_added_instance_has_fresh_affordances() {
        let mut g = group(&["a"]);
        let id = GroupManager::add_instance(&mut g, "dir0").unwrap();
        let instance = &g.instances[g.position(&id).unwrap()];
        assert!(instance.input.affordances.iter().any(|a| matches!(
            a,
            crate::form::Affordance::Remove { instance_id, .. } if *instance_id == id
        )));
    }

    #[test]
    fn test_remove_never_empties_group() {
        let mut g = group(&["a", "b"]);
        GroupManager::remove_instance(&mut g, "dir0").unwrap();
        assert_eq!(g.values(), ["b"]);
        GroupManager::remove_instance(&mut g, "dir1").unwrap();
        assert_eq!(g.len(), 1);
        assert_eq!(g.values(), [""]);
        assert!(GroupManager::remove_instance(&mut g, "dir0").is_err());
    }

    #[test]
    fn test_set_values_restores_count_and_order() {
        let mut g = group(&["a", "b"]);
        GroupManager::add_instance(&mut g, "dir1").unwrap();
        GroupManager::add_instance(&mut g, "dir2").unwrap();
        GroupManager::set_values(&mut g, &["x".into(), "y".into()]).unwrap();
        assert_eq!(g.values(), ["x", "y"]);

        GroupManager::set_values(&mut g, &[]).unwrap();
        assert_eq!(g.values(), [""]);
    }

    #[test]
    fn test_reconcile_to_zero_overruns() {
        let mut g = group(&["a", "b"]);
        let err = GroupManager::reconcile_to_count(&mut g, 0).unwrap_err();
        assert!(matches!(
            err,
            FormError::ReconcileOverrun {
                expected: 0,
                actual: 1,
                ..
            }
        ));
    }
}
