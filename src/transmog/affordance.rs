//! Keeps the inspection menu's transmog trigger and description in step with the item being
//! shown.

use std::cell::RefCell;

use crate::{
    host::{Item, ItemId, ItemMenu, ItemRef},
    meta::{
        language::MessageKey,
        settings::{DescriptionNote, Options},
    },
};

use super::{category, record};

/// Opening of the description line added for transmogged items.
const NOTE_OPEN: &str = "\n\n<color=#00FFFF>";
const NOTE_CLOSE: &str = "</color>";

/// Returned when the trigger was shown for a newly displayed item. The game sometimes rewrites
/// the label during its own first frame, so the controller puts it back one frame later.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shown {
    pub item: ItemId,
    pub label: String,
}

#[derive(Default)]
pub struct Affordance {
    last_displayed: RefCell<Option<ItemRef>>,
}

impl Affordance {
    /// The item the trigger currently belongs to.
    pub fn last_displayed(&self) -> Option<ItemRef> {
        self.last_displayed.borrow().clone()
    }

    pub fn forget(&self) {
        self.last_displayed.replace(None);
    }

    /// Runs once per frame. The menu is only touched when the displayed item changes.
    pub fn tick(&self, menu: &dyn ItemMenu, options: &Options) -> Option<Shown> {
        let displaying = match menu.displaying_item() {
            Some(item) if menu.is_shown() => item,
            _ => {
                if self.last_displayed.replace(None).is_some() {
                    menu.set_trigger(None);
                }

                return None;
            }
        };

        let changed = self
            .last_displayed
            .borrow()
            .as_ref()
            .map_or(true, |last| last.id() != displaying.id());

        if !changed {
            return None;
        }

        self.last_displayed.replace(Some(displaying.clone()));

        if category::classify(&*displaying).is_none() {
            menu.set_trigger(None);
            return None;
        }

        let label = self.update_menu(menu, &*displaying, options);

        Some(Shown {
            item: displaying.id(),
            label,
        })
    }

    /// Sets the trigger label and description for `item`. Returns the label.
    pub fn update_menu(&self, menu: &dyn ItemMenu, item: &dyn Item, options: &Options) -> String {
        let label = trigger_label(item);
        menu.set_trigger(Some(&label));

        if let Some(description) = menu.description() {
            let note = match options.description_note {
                DescriptionNote::Shown if record::has_overlay(item) => Some(
                    record::donor_name(item).unwrap_or_else(|| {
                        MessageKey::UnknownAppearance
                            .to_message()
                            .translate()
                            .into_owned()
                    }),
                ),

                _ => None,
            };

            menu.set_description(&annotate(&description, note.as_deref()));
        }

        label
    }
}

/// "Remove Transmog" for transmogged items, "Transmog" for everything else.
pub fn trigger_label(item: &dyn Item) -> String {
    let key = if record::has_overlay(item) {
        MessageKey::TriggerRemove
    } else {
        MessageKey::TriggerApply
    };

    key.to_message().translate().into_owned()
}

/// Strips any previous transmog line from `description` and, given a donor name, adds a fresh
/// one.
pub fn annotate(description: &str, donor_name: Option<&str>) -> String {
    let marker = format!(
        "{NOTE_OPEN}{}",
        MessageKey::DescriptionNote.with_name("").translate()
    );

    let base = match description.find(&marker) {
        Some(index) => &description[..index],
        None => description,
    };

    match donor_name {
        Some(name) => format!(
            "{base}{NOTE_OPEN}{}{NOTE_CLOSE}",
            MessageKey::DescriptionNote.with_name(name).translate()
        ),

        None => base.to_string(),
    }
}
