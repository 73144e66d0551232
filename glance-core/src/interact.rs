//! Carrying out click, fill and select against a resolved element.
//!
//! Every action reports success as a sentence. Failures come back as
//! [`GlanceError`] so the session can prefix them with the operation name.
use crate::pointer::VirtualPointer;
use crate::snapshot::ElementDescriptor;
use glance_common::{GlanceError, Result};
use glance_config::InteractionConfig;
use glance_drivers::{
    pause, DocumentAccess, DriverError, EditCommand, FieldKind, HitTarget, KeyPhase, OptionNode,
    OptionQuery, Point, ScrollOp, SyntheticEvent,
};
use tracing::{debug, info, warn};

pub struct Executor<'a, D: ?Sized> {
    doc: &'a D,
    pointer: &'a mut VirtualPointer,
    config: &'a InteractionConfig,
}

impl<'a, D: DocumentAccess + ?Sized> Executor<'a, D> {
    pub fn new(doc: &'a D, pointer: &'a mut VirtualPointer, config: &'a InteractionConfig) -> Self {
        Self {
            doc,
            pointer,
            config,
        }
    }

    /// Scroll the element into view when the snapshot saw it outside the
    /// viewport or its centre has since left it, then return the centre in
    /// client coordinates.
    async fn bring_into_view(&mut self, element: &ElementDescriptor) -> Result<Point> {
        let center = element.geometry.center;
        let vp = self.doc.viewport().await?;
        let at = vp.to_client(center);
        if element.geometry.in_viewport && vp.contains_client(at) {
            return Ok(at);
        }

        debug!(target: "glance.interact", id = element.id, ?at, "scrolling element into view");
        self.doc.scroll(ScrollOp::IntoView(center)).await?;
        pause(self.config.settle.after_scroll_into_view_ms).await;
        let vp = self.doc.viewport().await?;
        Ok(vp.to_client(center))
    }

    /// Glide to `at` and press there, if anything is there to press.
    async fn pointer_click(&mut self, at: Point) -> std::result::Result<Option<HitTarget>, DriverError> {
        self.pointer.glide_to(self.doc, at).await?;
        self.pointer.press_and_release(self.doc).await
    }

    /// Pointer click with a programmatic click as the fallback. Form
    /// controls are focused afterwards.
    async fn click_point(&mut self, at: Point) -> Result<()> {
        match self.pointer_click(at).await {
            Ok(Some(target)) => {
                debug!(target: "glance.interact", tag = %target.tag, "pointer landed");
                if target.is_form_control {
                    self.doc.focus_at(at).await?;
                }
                Ok(())
            }
            Ok(None) => Err(GlanceError::Interaction(format!(
                "No element under the pointer at ({}, {})",
                at.x, at.y
            ))),
            Err(err) => {
                warn!(target: "glance.interact", error = %err, "pointer click failed, clicking programmatically");
                self.doc.click_at(at).await?;
                Ok(())
            }
        }
    }

    pub async fn click(&mut self, element: &ElementDescriptor) -> Result<String> {
        let at = self.bring_into_view(element).await?;
        self.click_point(at).await?;
        info!(target: "glance.interact", id = element.id, "clicked");
        Ok(format!(
            "Clicked on element: {} with text '{}'",
            element.semantic_type, element.text
        ))
    }

    pub async fn fill(&mut self, element: &ElementDescriptor, value: &str) -> Result<String> {
        let at = self.bring_into_view(element).await?;
        if let Err(err) = self.pointer.glide_to(self.doc, at).await {
            warn!(target: "glance.interact", error = %err, "could not move pointer to field");
        }

        let filled = format!(
            "Filled input field: {} with text '{}' with value: '{}'",
            element.semantic_type, element.text, value
        );
        let selector = element.css_selector.as_str();
        match self.enter_text(selector, value).await {
            Ok(()) => {
                info!(target: "glance.interact", id = element.id, chars = value.chars().count(), "field filled");
                Ok(filled)
            }
            Err(err) => {
                warn!(target: "glance.interact", id = element.id, error = %err, "text entry failed, assigning value");
                match self.doc.assign_value(selector, value).await {
                    Ok(()) => Ok(format!("{filled} (using fallback)")),
                    Err(fallback) => {
                        warn!(target: "glance.interact", error = %fallback, "value assignment failed");
                        Err(err)
                    }
                }
            }
        }
    }

    async fn enter_text(&mut self, selector: &str, value: &str) -> Result<()> {
        match self.doc.field_kind(selector).await? {
            FieldKind::TextEntry => {
                self.doc.set_native_value(selector, value).await?;
                let mut events = vec![SyntheticEvent::Input, SyntheticEvent::Change];
                events.extend(keystrokes(value));
                self.doc.dispatch_events(selector, &events).await?;
            }
            FieldKind::ContentEditable => {
                self.doc.edit(selector, &edit_commands(value)).await?;
                self.doc
                    .dispatch_events(selector, &[SyntheticEvent::Input])
                    .await?;
            }
            FieldKind::Other(tag) => {
                return Err(GlanceError::Interaction(format!(
                    "Unsupported element type: {tag}"
                )));
            }
            FieldKind::Missing => {
                return Err(DriverError::MissingElement(selector.to_string()).into());
            }
        }
        Ok(())
    }

    pub async fn select(&mut self, element: &ElementDescriptor, value: &str) -> Result<String> {
        if element.tag_kind.eq_ignore_ascii_case("select") {
            self.select_native(element, value).await
        } else {
            self.select_custom(element, value).await
        }
    }

    async fn select_native(&mut self, element: &ElementDescriptor, value: &str) -> Result<String> {
        self.bring_into_view(element).await?;
        let selector = element.css_selector.as_str();
        let text = &element.text;

        if self
            .doc
            .select_native(selector, &OptionQuery::Label(value.to_string()))
            .await?
        {
            return Ok(format!(
                "Selected option '{value}' from dropdown: {text} by visible text"
            ));
        }
        if self
            .doc
            .select_native(selector, &OptionQuery::Value(value.to_string()))
            .await?
        {
            return Ok(format!(
                "Selected option with value '{value}' from dropdown: {text}"
            ));
        }
        if let Ok(index) = value.trim().parse::<usize>() {
            if self
                .doc
                .select_native(selector, &OptionQuery::Index(index))
                .await?
            {
                return Ok(format!(
                    "Selected option at index {index} from dropdown: {text}"
                ));
            }
        }
        Ok(format!(
            "Failed to select option '{value}' from dropdown: no option matched by label, value or index"
        ))
    }

    async fn select_custom(&mut self, element: &ElementDescriptor, value: &str) -> Result<String> {
        let at = self.bring_into_view(element).await?;
        self.click_point(at).await?;
        pause(self.config.settle.dropdown_open_ms).await;

        let options = self.doc.option_nodes().await?;
        debug!(target: "glance.interact", count = options.len(), "dropdown options listed");
        match pick_option(&options, value) {
            Some(option) => {
                self.click_point(option.center).await?;
                Ok(format!(
                    "Clicked on option '{}' in dropdown: {}",
                    option.text, element.text
                ))
            }
            None => Ok(format!(
                "Could not find option '{value}' in the opened dropdown: {}",
                element.text
            )),
        }
    }
}

/// Exact text or value first, then text containment.
pub fn pick_option<'o>(options: &'o [OptionNode], wanted: &str) -> Option<&'o OptionNode> {
    let wanted = wanted.trim();
    options
        .iter()
        .find(|o| o.text.trim() == wanted || o.value.as_deref() == Some(wanted))
        .or_else(|| options.iter().find(|o| o.text.contains(wanted)))
}

/// keydown, keypress, keyup for every character; newlines type Enter.
pub fn keystrokes(value: &str) -> Vec<SyntheticEvent> {
    value
        .chars()
        .flat_map(|c| {
            let key = if c == '\n' {
                "Enter".to_string()
            } else {
                c.to_string()
            };
            [KeyPhase::Down, KeyPhase::Press, KeyPhase::Up].map(|phase| SyntheticEvent::Key {
                phase,
                key: key.clone(),
            })
        })
        .collect()
}

/// Replace the editable content with `value`, one paragraph per line.
pub fn edit_commands(value: &str) -> Vec<EditCommand> {
    let mut commands = vec![EditCommand::SelectAll, EditCommand::Delete];
    for (i, line) in value.split('\n').enumerate() {
        if i > 0 {
            commands.push(EditCommand::InsertParagraph);
        }
        if !line.is_empty() {
            commands.push(EditCommand::InsertText(line.to_string()));
        }
    }
    commands
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(text: &str, value: Option<&str>) -> OptionNode {
        OptionNode {
            text: text.into(),
            value: value.map(str::to_string),
            center: Point::new(10.0, 10.0),
        }
    }

    #[test]
    fn keystrokes_cover_every_character() {
        let events = keystrokes("a\n");
        assert_eq!(events.len(), 6);
        assert_eq!(
            events[0],
            SyntheticEvent::Key {
                phase: KeyPhase::Down,
                key: "a".into()
            }
        );
        assert_eq!(
            events[5],
            SyntheticEvent::Key {
                phase: KeyPhase::Up,
                key: "Enter".into()
            }
        );
    }

    #[test]
    fn edit_commands_break_paragraphs() {
        assert_eq!(
            edit_commands("one\ntwo"),
            vec![
                EditCommand::SelectAll,
                EditCommand::Delete,
                EditCommand::InsertText("one".into()),
                EditCommand::InsertParagraph,
                EditCommand::InsertText("two".into()),
            ]
        );
    }

    #[test]
    fn options_prefer_exact_matches() {
        let options = vec![
            option("Canada (French)", None),
            option("Canada", Some("ca")),
            option("Cameroon", Some("cm")),
        ];
        assert_eq!(pick_option(&options, "Canada").map(|o| o.value.as_deref()), Some(Some("ca")));
        assert_eq!(pick_option(&options, "cm").map(|o| o.text.as_str()), Some("Cameroon"));
        assert_eq!(pick_option(&options, "Fren").map(|o| o.text.as_str()), Some("Canada (French)"));
        assert!(pick_option(&options, "Chile").is_none());
    }
}
