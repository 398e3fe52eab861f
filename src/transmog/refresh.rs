//! Forces the game to rebuild an equipped item's 3D model by pulling the item out of its slot and
//! putting it straight back.
//!
//! Doing that fires the slot's change notification, which the slot monitor also listens to. The
//! monitor checks [`RefreshTrigger::is_refreshing`] and ignores changes made from here.

use std::cell::Cell;

use crate::host::Item;

#[derive(Default)]
pub struct RefreshTrigger {
    refreshing: Cell<bool>,
}

/// Sets the flag for as long as it lives, and puts the old value back when dropped (including
/// when unwinding).
struct RefreshGuard<'a> {
    flag: &'a Cell<bool>,
    previous: bool,
}

impl<'a> RefreshGuard<'a> {
    fn set(flag: &'a Cell<bool>) -> RefreshGuard<'a> {
        RefreshGuard {
            flag,
            previous: flag.replace(true),
        }
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}

impl RefreshTrigger {
    pub fn is_refreshing(&self) -> bool {
        self.refreshing.get()
    }

    /// Unplugs and re-plugs `item`. Returns `false` if the item isn't in a slot or the game
    /// refused to put it back.
    pub fn refresh(&self, item: &dyn Item) -> bool {
        let slot = match item.slot() {
            Some(slot) => slot,
            None => {
                log::warn!(
                    "{} is not equipped, can't refresh its model",
                    item.display_name()
                );

                return false;
            }
        };

        let key = slot.key();
        log::debug!("Refreshing {} in slot {key}", item.display_name());

        let _guard = RefreshGuard::set(&self.refreshing);

        let unplugged = match slot.unplug() {
            Some(unplugged) => unplugged,
            None => {
                log::warn!("Slot {key} was empty when unplugging");
                return false;
            }
        };

        let plugged = slot.plug(unplugged);

        if plugged {
            log::debug!("Re-equipped {} in {key}", item.display_name());
        } else {
            log::error!("Failed to re-equip {} in {key}", item.display_name());
        }

        plugged
    }
}
