use std::fmt;

use crate::{
    data::{
        ItemKind, PreferenceStore, SchemaRegistry, ServerStats, ValueStore,
        prefs::SHOW_ADVANCED_KEY,
    },
    error::FormError,
    service::ConfigService,
    xml,
};

use super::{
    group::GroupManager,
    render::{self, RenderContext},
    tree::{ActionBar, Form, ItemBody, Platform, SectionBlock},
    update::UpdateRequest,
};

/// Section that also shows the server's config file path.
pub const SERVER_SECTION: &str = "Server";

/// Shown instead of Save/Cancel when the server refuses updates.
pub const READ_ONLY_WARNING: &str =
    "The configuration file is not writable. Changes cannot be saved from here.";

/// Lifecycle of a [`FormController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    LoadingSchema,
    LoadingStats,
    LoadingValues,
    Rendered,
    Editing,
    Saving,
    Cancelling,
}

impl fmt::Display for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FormState::LoadingSchema => "loading the schema",
            FormState::LoadingStats => "loading server stats",
            FormState::LoadingValues => "loading values",
            FormState::Rendered => "rendered",
            FormState::Editing => "editing",
            FormState::Saving => "saving",
            FormState::Cancelling => "cancelling",
        };
        f.write_str(s)
    }
}

/// Loads schema, stats and values from a [`ConfigService`], renders the
/// form and applies edits, Save, Cancel and the advanced toggle.
///
/// # Example
///
/// ```rust,no_run
/// use ffconfig::{FormController, HttpService, PreferenceStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let service = HttpService::new("http://localhost:3689", None)?;
/// let mut controller = FormController::new(service, PreferenceStore::in_memory());
/// controller.load().await?;
/// controller.set_value("general:servername", "Living Room")?;
/// controller.save().await?;
/// # Ok(())
/// # }
/// ```
pub struct FormController<S> {
    service: S,
    prefs: PreferenceStore,
    platform: Platform,
    state: FormState,
    schema: SchemaRegistry,
    values: ValueStore,
    stats: ServerStats,
    form: Option<Form>,
}

impl<S: ConfigService> FormController<S> {
    pub fn new(service: S, prefs: PreferenceStore) -> Self {
        Self {
            service,
            prefs,
            platform: Platform::current(),
            state: FormState::LoadingSchema,
            schema: SchemaRegistry::new(),
            values: ValueStore::new(),
            stats: ServerStats::default(),
            form: None,
        }
    }

    /// Override the host platform used for button order.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    /// The rendered form, once loading has finished.
    pub fn form(&self) -> Option<&Form> {
        self.form.as_ref()
    }

    pub fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    pub fn values(&self) -> &ValueStore {
        &self.values
    }

    pub fn stats(&self) -> &ServerStats {
        &self.stats
    }

    pub fn prefs(&self) -> &PreferenceStore {
        &self.prefs
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Fetch schema, stats and values in that order, then render.
    ///
    /// On failure the controller stays in the loading state that failed.
    pub async fn load(&mut self) -> Result<(), FormError> {
        self.form = None;

        self.state = FormState::LoadingSchema;
        let schema = self.service.fetch_schema().await?;
        self.schema
            .parse_schema(&schema)
            .map_err(|e| FormError::xml("schema", e))?;

        self.state = FormState::LoadingStats;
        let stats = self.service.fetch_stats().await?;
        self.stats = ServerStats::parse(&stats).map_err(|e| FormError::xml("stats", e))?;
        info!(
            "config file {} ({})",
            self.stats.config_path,
            if self.stats.writable {
                "writable"
            } else {
                "read-only"
            }
        );

        self.state = FormState::LoadingValues;
        let values = self.service.fetch_values().await?;
        self.values
            .parse_values(&values)
            .map_err(|e| FormError::xml("values", e))?;

        self.render();
        Ok(())
    }

    fn render(&mut self) {
        let ctx = RenderContext {
            writable: self.stats.writable,
            show_advanced: self.prefs.get_bool(SHOW_ADVANCED_KEY).unwrap_or(false),
        };

        let mut sections = Vec::new();
        for section in self.schema.sections() {
            let items = section
                .item_ids
                .iter()
                .filter_map(|id| match self.schema.get_item(id) {
                    Some(item) => Some(render::render_item(item, self.values.lookup(id), ctx)),
                    None => self
                        .schema
                        .fault_for(id)
                        .map(|fault| render::render_fault(id, fault)),
                })
                .collect();
            sections.push(SectionBlock {
                name: section.name.clone(),
                config_path: (section.name == SERVER_SECTION)
                    .then(|| self.stats.config_path.clone()),
                items,
            });
        }

        let actions = if ctx.writable {
            ActionBar::Editable {
                buttons: self.platform.button_order(),
            }
        } else {
            ActionBar::ReadOnly {
                warning: READ_ONLY_WARNING.to_string(),
            }
        };

        self.form = Some(Form {
            sections,
            actions,
            show_advanced: ctx.show_advanced,
        });
        self.state = FormState::Rendered;
        info!("form rendered: {} sections", self.schema.sections().len());
    }

    fn loaded_form(&mut self, operation: &'static str) -> Result<&mut Form, FormError> {
        match (self.state, self.form.as_mut()) {
            (FormState::Rendered | FormState::Editing, Some(form)) => Ok(form),
            (state, _) => Err(FormError::InvalidState { operation, state }),
        }
    }

    fn editable_form(&mut self, operation: &'static str) -> Result<&mut Form, FormError> {
        let form = self.loaded_form(operation)?;
        if !form.is_writable() {
            return Err(FormError::NotWritable);
        }
        Ok(form)
    }

    fn edited(&mut self) {
        self.state = FormState::Editing;
    }

    /// Set the value of a text input or group instance.
    pub fn set_value(&mut self, control_id: &str, value: &str) -> Result<(), FormError> {
        let form = self.editable_form("edit")?;
        let input = form
            .input_mut(control_id)
            .ok_or_else(|| FormError::UnknownControl(control_id.to_string()))?;
        input.value = value.to_string();
        debug!("{control_id} = {value:?}");
        self.edited();
        Ok(())
    }

    /// Choose `value` in the drop-down of `item_id`.
    pub fn select(&mut self, item_id: &str, value: &str) -> Result<(), FormError> {
        let form = self.editable_form("edit")?;
        let Some(ItemBody::Select(select)) = form.block_mut(item_id).map(|b| &mut b.body) else {
            return Err(FormError::UnknownItem(item_id.to_string()));
        };
        if !select.options.iter().any(|o| o.value == value) {
            return Err(FormError::UnknownOption {
                item: item_id.to_string(),
                value: value.to_string(),
            });
        }
        select.selected = value.to_string();
        debug!("{item_id} = {value:?}");
        self.edited();
        Ok(())
    }

    /// Add an empty instance to `item_id` after `after`; returns its id.
    pub fn add_instance(&mut self, item_id: &str, after: &str) -> Result<String, FormError> {
        let form = self.editable_form("add an instance")?;
        let group = form
            .group_mut(item_id)
            .ok_or_else(|| FormError::NotMultiple(item_id.to_string()))?;
        let id = GroupManager::add_instance(group, after)?;
        self.edited();
        Ok(id)
    }

    pub fn remove_instance(&mut self, item_id: &str, instance_id: &str) -> Result<(), FormError> {
        let form = self.editable_form("remove an instance")?;
        let group = form
            .group_mut(item_id)
            .ok_or_else(|| FormError::NotMultiple(item_id.to_string()))?;
        GroupManager::remove_instance(group, instance_id)?;
        self.edited();
        Ok(())
    }

    /// Replace every value of a multi-valued item.
    pub fn set_item_values(&mut self, item_id: &str, values: &[String]) -> Result<(), FormError> {
        let form = self.editable_form("edit")?;
        let group = form
            .group_mut(item_id)
            .ok_or_else(|| FormError::NotMultiple(item_id.to_string()))?;
        GroupManager::set_values(group, values)?;
        self.edited();
        Ok(())
    }

    /// Flip and persist the advanced preference, then show or hide every
    /// advanced block. Returns the new visibility.
    pub fn toggle_advanced(&mut self) -> Result<bool, FormError> {
        let visible = !self.loaded_form("toggle advanced items")?.show_advanced;
        self.prefs.set_bool(SHOW_ADVANCED_KEY, visible)?;
        self.loaded_form("toggle advanced items")?
            .set_advanced_visible(visible);
        info!(
            "{} advanced items",
            if visible { "showing" } else { "hiding" }
        );
        Ok(visible)
    }

    /// The request [`save`](Self::save) would send for the current form.
    pub fn update_request(&self) -> Option<UpdateRequest> {
        self.form.as_ref().map(UpdateRequest::from_form)
    }

    /// Send every rendered control's value in one update.
    ///
    /// The value snapshot is not touched; a reload shows the saved state.
    /// Success ends in `Rendered`. A failed or rejected update returns to the
    /// state the save started from, so unsaved edits stay flagged.
    pub async fn save(&mut self) -> Result<(), FormError> {
        let body = UpdateRequest::from_form(self.editable_form("save")?).encode();

        let before = self.state;
        self.state = FormState::Saving;
        let result = self.send_update(&body).await;
        self.state = if result.is_ok() {
            FormState::Rendered
        } else {
            before
        };
        result
    }

    async fn send_update(&self, body: &str) -> Result<(), FormError> {
        let reply = self.service.update_config(body).await?;
        let status = xml::parse(&reply)
            .ok()
            .and_then(|doc| doc.find("status").map(|s| s.text().trim().to_string()));
        match status.as_deref() {
            Some("200") => {
                info!("configuration saved");
                Ok(())
            }
            _ => {
                warn!("configuration update rejected: {status:?}");
                Err(FormError::SaveRejected(status))
            }
        }
    }

    /// Discard edits: restore every control to the loaded snapshot.
    pub fn cancel(&mut self) -> Result<(), FormError> {
        self.editable_form("cancel")?;
        self.state = FormState::Cancelling;
        let result = self.restore_snapshot();
        self.state = FormState::Rendered;
        result
    }

    fn restore_snapshot(&mut self) -> Result<(), FormError> {
        let Some(form) = self.form.as_mut() else {
            return Ok(());
        };
        for (id, item) in self.schema.all_items() {
            let value = self.values.lookup(id);
            let Some(block) = form.block_mut(id) else {
                continue;
            };
            match (&item.kind, &mut block.body) {
                (ItemKind::Text(_), ItemBody::Group(group)) => {
                    GroupManager::set_values(group, &render::sequence_value(value))?;
                }
                (ItemKind::Text(_), ItemBody::Input(input)) => {
                    input.value = render::scalar_value(item, value);
                }
                (ItemKind::Select(_), ItemBody::Select(select)) => {
                    select.selected = render::select_value(item, value);
                }
                _ => warn!("block {id} does not match its schema item"),
            }
        }
        info!("edits discarded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{form::FormAction, service::MemoryService};

    const SCHEMA: &str = r#"<config><section name="Server">
        <item id="general:servername"><type>text</type><name>Name</name></item>
    </section></config>"#;

    fn service(writable: bool) -> MemoryService {
        MemoryService::new(
            SCHEMA,
            format!(
                "<status><config_path>/etc/ff.conf</config_path><writable_config>{}</writable_config></status>",
                u8::from(writable)
            ),
            "<config><general><servername>Box</servername></general></config>",
        )
    }

    #[tokio::test]
    async fn test_load_walks_states_in_order() {
        let mut c = FormController::new(service(true), PreferenceStore::in_memory());
        assert_eq!(c.state(), FormState::LoadingSchema);
        c.load().await.unwrap();
        assert_eq!(c.state(), FormState::Rendered);
        let form = c.form().unwrap();
        assert_eq!(form.sections[0].config_path.as_deref(), Some("/etc/ff.conf"));
        assert_eq!(form.control_value("general:servername"), Some("Box"));
    }

    #[tokio::test]
    async fn test_failed_fetch_stays_loading() {
        let mut svc = service(true);
        svc.values = None;
        let mut c = FormController::new(svc, PreferenceStore::in_memory());
        assert!(c.load().await.is_err());
        assert_eq!(c.state(), FormState::LoadingValues);
        assert!(c.form().is_none());
        assert!(matches!(
            c.set_value("general:servername", "x"),
            Err(FormError::InvalidState { .. })
        ));
    }

    #[tokio::test]
    async fn test_edit_then_save_returns_to_rendered() {
        let mut c = FormController::new(service(true), PreferenceStore::in_memory());
        c.load().await.unwrap();
        c.set_value("general:servername", "Den").unwrap();
        assert_eq!(c.state(), FormState::Editing);
        c.save().await.unwrap();
        assert_eq!(c.state(), FormState::Rendered);
        assert_eq!(c.service().updates(), ["general%3Aservername=Den"]);
        assert_eq!(
            c.values().lookup("general:servername").unwrap().as_scalar(),
            "Box"
        );
    }

    #[tokio::test]
    async fn test_rejected_save() {
        let svc = service(true).with_update_reply(Some("<results><status>500</status></results>"));
        let mut c = FormController::new(svc, PreferenceStore::in_memory());
        c.load().await.unwrap();
        let err = c.save().await.unwrap_err();
        assert!(matches!(err, FormError::SaveRejected(Some(ref s)) if s == "500"));
        assert_eq!(c.state(), FormState::Rendered);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_edits_flagged() {
        let svc = service(true).with_update_reply(Some("<results><status>500</status></results>"));
        let mut c = FormController::new(svc, PreferenceStore::in_memory());
        c.load().await.unwrap();
        c.set_value("general:servername", "Den").unwrap();
        assert!(c.save().await.is_err());
        assert_eq!(c.state(), FormState::Editing);
        assert_eq!(c.form().unwrap().control_value("general:servername"), Some("Den"));

        let svc = service(true).with_update_reply(None);
        let mut c = FormController::new(svc, PreferenceStore::in_memory());
        c.load().await.unwrap();
        c.set_value("general:servername", "Den").unwrap();
        assert!(matches!(c.save().await, Err(FormError::Transport(_))));
        assert_eq!(c.state(), FormState::Editing);
    }

    #[tokio::test]
    async fn test_toggle_keeps_form_when_prefs_cannot_be_written() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = PreferenceStore::load(dir.path().join("missing").join("prefs.toml")).unwrap();
        let mut c = FormController::new(service(true), prefs);
        c.load().await.unwrap();

        assert!(matches!(c.toggle_advanced(), Err(FormError::Prefs(_))));
        assert!(!c.form().unwrap().show_advanced);
        assert_eq!(c.prefs().get_bool(SHOW_ADVANCED_KEY), None);
    }

    #[tokio::test]
    async fn test_read_only_rejects_edits() {
        let mut c = FormController::new(service(false), PreferenceStore::in_memory());
        c.load().await.unwrap();
        assert!(matches!(
            c.set_value("general:servername", "x"),
            Err(FormError::NotWritable)
        ));
        assert!(matches!(c.save().await, Err(FormError::NotWritable)));
        assert!(c.service().updates().is_empty());
    }

    #[tokio::test]
    async fn test_button_order_follows_platform() {
        let mut c = FormController::new(service(true), PreferenceStore::in_memory())
            .with_platform(Platform::MacOs);
        c.load().await.unwrap();
        assert_eq!(
            c.form().unwrap().actions,
            ActionBar::Editable {
                buttons: [FormAction::Cancel, FormAction::Save]
            }
        );
    }
}
