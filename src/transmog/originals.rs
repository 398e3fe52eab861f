//! Remembers what items looked like before they were transmogged, so the look can be put back.
//!
//! The cache only lives for one scene. Every scene load throws the whole map away and starts a
//! new one: the "original" look of an item is whatever it looked like when the current scene
//! first saw it.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
};

use crate::host::{Binding, Icon, Item, ItemId};

use super::EQUIPMENT_MODEL;

/// The look of an item before its first transmog in this scene.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Originals {
    pub icon: Option<Icon>,
    pub binding: Option<Binding>,
}

impl Originals {
    fn capture(item: &dyn Item) -> Originals {
        Originals {
            icon: item.icon(),
            binding: item
                .agents()
                .and_then(|agents| agents.binding(EQUIPMENT_MODEL)),
        }
    }
}

#[derive(Default)]
pub struct OriginalsCache {
    entries: RefCell<HashMap<ItemId, Originals>>,

    /// Counts scene sessions, for the log.
    session: Cell<u64>,
}

impl OriginalsCache {
    /// Saves the item's current look unless a snapshot already exists. Returns whether a new
    /// snapshot was taken.
    pub fn snapshot_if_absent(&self, item: &dyn Item) -> bool {
        let mut entries = self.entries.borrow_mut();

        if entries.contains_key(&item.id()) {
            return false;
        }

        let originals = Originals::capture(item);

        log::info!(
            "Saved original look of {}: icon {:?}, model {:?}",
            item.display_name(),
            originals.icon,
            originals.binding
        );

        entries.insert(item.id(), originals);
        true
    }

    pub fn has_snapshot(&self, id: ItemId) -> bool {
        self.entries.borrow().contains_key(&id)
    }

    pub fn get(&self, id: ItemId) -> Option<Originals> {
        self.entries.borrow().get(&id).cloned()
    }

    /// Puts the saved look back onto the item and forgets it. Returns `false` if there was
    /// nothing saved.
    pub fn restore(&self, item: &dyn Item) -> bool {
        // Take the entry out before touching the item so no borrow is held while the game runs.
        let originals = match self.entries.borrow_mut().remove(&item.id()) {
            Some(originals) => originals,
            None => {
                log::info!(
                    "No saved look for {}, nothing to restore",
                    item.display_name()
                );

                return false;
            }
        };

        item.set_icon(originals.icon);

        if let Some(binding) = originals.binding {
            match item.agents() {
                Some(agents) => {
                    if !agents.set_binding(EQUIPMENT_MODEL, binding) {
                        log::warn!("{} has no {EQUIPMENT_MODEL} entry", item.display_name());
                    }

                    agents.invalidate_cache();
                }
                None => log::warn!("{} has no agent table", item.display_name()),
            }
        }

        log::info!("Restored original look of {}", item.display_name());
        true
    }

    /// Starts a new session, dropping every snapshot.
    pub fn clear_all(&self) {
        let old = self.entries.replace(HashMap::new());
        self.session.set(self.session.get() + 1);

        log::info!(
            "Originals session {} started, dropped {} snapshot(s)",
            self.session.get(),
            old.len()
        );
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
