//! Command handlers.
//!
//! - `edit` opens the terminal editor
//! - `show` prints the rendered form
//! - `set` applies `KEY=VALUE` edits and saves them in one update

use anyhow::{Context, Result, bail};
use colored::Colorize;
use ffconfig::{
    FormController,
    data::ItemKind,
    form::{ActionBar, Form, ItemBody},
};

use crate::ctx::{AdminContext, AdminService};

/// Parses a `KEY=VALUE` argument.
pub fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {s:?}"))?;
    if key.is_empty() {
        return Err(format!("empty key in {s:?}"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Handler for the CLI commands.
pub struct CommandHandler;

impl CommandHandler {
    /// Opens the interactive editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded.
    pub async fn handle_edit(ctx: &AdminContext) -> Result<()> {
        let controller = ctx.load().await?;
        info!("Editing configuration from {}", ctx.source());
        let controller = ffconfig::run(controller).await?;
        if controller.state() == ffconfig::FormState::Editing {
            println!("{}", "Unsaved changes were discarded".yellow());
        }
        Ok(())
    }

    /// Prints the rendered form as text or JSON.
    pub async fn handle_show(ctx: &AdminContext, json: bool, advanced: bool) -> Result<()> {
        let controller = ctx.load().await?;
        let form = controller
            .form()
            .context("configuration form was not rendered")?;
        if json {
            println!("{}", serde_json::to_string_pretty(form)?);
        } else {
            print_form(form, advanced);
        }
        Ok(())
    }

    /// Applies `assignments` and saves them in a single update.
    ///
    /// Multi-valued items take comma-separated values.
    pub async fn handle_set(ctx: &AdminContext, assignments: &[(String, String)]) -> Result<()> {
        if assignments.is_empty() {
            bail!("nothing to set");
        }
        let mut controller = ctx.load().await?;
        for (key, value) in assignments {
            apply(&mut controller, key, value)?;
        }
        controller
            .save()
            .await
            .with_context(|| format!("Failed to save configuration to {}", ctx.source()))?;
        println!(
            "{}",
            format!("Saved {} setting(s) to {}", assignments.len(), ctx.source())
                .green()
                .bold()
        );
        Ok(())
    }
}

fn apply(controller: &mut FormController<AdminService>, key: &str, value: &str) -> Result<()> {
    let Some(item) = controller.schema().get_item(key) else {
        bail!("unknown setting: {key}");
    };
    let is_select = matches!(item.kind, ItemKind::Select(_));
    if item.is_multiple() {
        let values: Vec<String> = value.split(',').map(str::to_string).collect();
        controller.set_item_values(key, &values)?;
    } else if is_select {
        controller.select(key, value)?;
    } else {
        controller.set_value(key, value)?;
    }
    debug!("{key} set to {value:?}");
    Ok(())
}

fn print_form(form: &Form, advanced: bool) {
    if let ActionBar::ReadOnly { warning } = &form.actions {
        println!("{}", warning.yellow());
    }
    for section in &form.sections {
        println!("\n{}", section.name.bold().purple());
        if let Some(path) = &section.config_path {
            println!("  {:<24} {}", "Config File", path);
        }
        for block in section.items.iter().filter(|b| advanced || !b.hidden) {
            let marker = if block.advanced { "*" } else { " " };
            match &block.body {
                ItemBody::Input(input) => {
                    println!("{marker} {:<24} {}", input.label, input.value.cyan());
                }
                ItemBody::Select(select) => {
                    let label = select
                        .selected_index()
                        .map(|i| select.options[i].label.as_str())
                        .unwrap_or("?");
                    println!(
                        "{marker} {:<24} {} ({})",
                        select.label,
                        label.cyan(),
                        select.selected
                    );
                }
                ItemBody::Group(group) => {
                    for instance in &group.instances {
                        println!(
                            "{marker} {:<24} {}",
                            instance.input.label,
                            instance.input.value.cyan()
                        );
                    }
                }
                ItemBody::Fault { message } => {
                    println!("! {}", format!("{}: {message}", block.item_id).red());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("general:port=3689").unwrap(),
            ("general:port".to_string(), "3689".to_string())
        );
        assert_eq!(
            parse_assignment("dir=a,b=c").unwrap(),
            ("dir".to_string(), "a,b=c".to_string())
        );
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=x").is_err());
    }
}
