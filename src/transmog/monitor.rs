//! Watches the character's equipment slots. The game rebuilds an item's model from its own data
//! whenever the item is equipped, which loses the transmog, so every change to a slot holding a
//! transmogged item has to be answered by applying the transmog again.

use std::cell::RefCell;

use crate::host::{ItemRef, ListenerId, Slot, SlotListener, SlotRef};

use super::{
    record::{self, OverlayRecord},
    refresh::RefreshTrigger,
};

#[derive(Default)]
pub struct SlotMonitor {
    listeners: RefCell<Vec<(SlotRef, ListenerId)>>,
}

impl SlotMonitor {
    /// Subscribes `listener` to every slot, empty ones included. Any earlier subscriptions are
    /// dropped first so each slot has at most one listener from us.
    pub fn attach(&self, slots: Vec<SlotRef>, listener: SlotListener) {
        self.detach_all();

        let mut listeners = self.listeners.borrow_mut();

        for slot in slots {
            let id = slot.add_listener(listener.clone());
            log::debug!("Listening to slot {}", slot.key());
            listeners.push((slot, id));
        }

        log::info!("Monitoring {} equipment slot(s)", listeners.len());
    }

    /// Returns how many subscriptions were removed.
    pub fn detach_all(&self) -> usize {
        let listeners: Vec<(SlotRef, ListenerId)> = self.listeners.borrow_mut().drain(..).collect();

        for (slot, id) in &listeners {
            slot.remove_listener(*id);
        }

        if !listeners.is_empty() {
            log::debug!("Stopped listening to {} slot(s)", listeners.len());
        }

        listeners.len()
    }

    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decides whether a slot change needs the transmog put back. Changes caused by our own model
/// refresh are ignored, as are empty slots and items without a usable record.
pub fn needs_reapply(refresh: &RefreshTrigger, slot: &dyn Slot) -> Option<(ItemRef, OverlayRecord)> {
    if refresh.is_refreshing() {
        log::trace!("Ignoring change to {} during refresh", slot.key());
        return None;
    }

    let item = slot.content()?;
    let record = record::read(&*item)?;

    log::info!(
        "{} was equipped in {} with transmog {}",
        item.display_name(),
        slot.key(),
        record.donor_name
    );

    Some((item, record))
}
