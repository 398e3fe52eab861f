//! The boundary between the mod and the game. Everything the transmog systems need from the
//! game's item, inventory, UI and asset systems is expressed as a trait here, and the game side
//! hands implementations to [`crate::Transmog`] when it is created.

use std::{fmt, rc::Rc};

use futures::future::LocalBoxFuture;

#[cfg(test)]
pub mod fake;

/// Stable identity of an item instance. Two handles to the same item always report the same id.
pub type ItemId = u64;

/// The game's numeric identifier for an item type (what the asset pipeline instantiates from).
pub type ItemTypeId = i32;

/// An icon sprite owned by the game. We only ever move these around, so all we keep is the asset
/// name for logging.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Icon(pub String);

/// A 3D presentation prefab bound to an item under a named role.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Binding(pub String);

impl fmt::Display for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-item string key/value store. The game saves these with the item.
pub trait Variables {
    fn get_string(&self, key: &str) -> Option<String>;
    fn set_string(&self, key: &str, value: &str);

    /// Removes the entry for `key`, returning whether there was one.
    fn remove(&self, key: &str) -> bool;
}

/// Table mapping role names (e.g. `"EquipmentModel"`) to presentation bindings.
pub trait AgentTable {
    fn binding(&self, role: &str) -> Option<Binding>;

    /// Replaces the binding for an existing role. Returns `false` if the table has no entry for
    /// `role`; entries are never created by this call.
    fn set_binding(&self, role: &str, binding: Binding) -> bool;

    /// Drops any lookup cache built from the table so the next lookup sees the current bindings.
    fn invalidate_cache(&self);
}

pub trait Item {
    fn id(&self) -> ItemId;
    fn type_id(&self) -> ItemTypeId;
    fn display_name(&self) -> String;

    fn icon(&self) -> Option<Icon>;
    fn set_icon(&self, icon: Option<Icon>);

    fn tags(&self) -> Vec<String>;

    /// The slot the item is currently plugged into, if any.
    fn slot(&self) -> Option<SlotRef>;

    fn variables(&self) -> Option<&dyn Variables>;
    fn agents(&self) -> Option<&dyn AgentTable>;
}

pub type ItemRef = Rc<dyn Item>;

/// Token returned when a listener is added to a slot, used to remove it again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Called with the slot whose content just changed.
pub type SlotListener = Rc<dyn Fn(&dyn Slot)>;

/// An equipment slot on a character.
pub trait Slot {
    fn key(&self) -> String;
    fn content(&self) -> Option<ItemRef>;

    /// Takes the content out of the slot. Listeners are notified.
    fn unplug(&self) -> Option<ItemRef>;

    /// Puts `item` into the slot. Listeners are notified. Returns `false` if the game refused.
    fn plug(&self, item: ItemRef) -> bool;

    fn add_listener(&self, listener: SlotListener) -> ListenerId;
    fn remove_listener(&self, id: ListenerId);
}

pub type SlotRef = Rc<dyn Slot>;

pub trait Character {
    fn slots(&self) -> Option<Vec<SlotRef>>;

    /// Shows a short text bubble above the character.
    fn pop_text(&self, text: &str);
}

/// The game's item inspection menu.
pub trait ItemMenu {
    /// The item the menu is showing, or is about to show on this frame. `None` once the menu
    /// has been closed.
    fn displaying_item(&self) -> Option<ItemRef>;
    fn is_shown(&self) -> bool;
    fn close(&self);

    fn description(&self) -> Option<String>;
    fn set_description(&self, text: &str);

    /// Shows the transmog trigger with the given label, or hides it when `label` is `None`.
    fn set_trigger(&self, label: Option<&str>);
}

/// The game's item asset pipeline.
pub trait ItemFactory {
    /// Starts creating a fresh instance of `type_id`. The returned future resolves once the
    /// pipeline has finished loading.
    fn instantiate(&self, type_id: ItemTypeId) -> LocalBoxFuture<'static, eyre::Result<ItemRef>>;

    /// Disposes of an instance created by `instantiate`.
    fn destroy(&self, item: ItemRef);
}

pub trait Host {
    fn main_character(&self) -> Option<Rc<dyn Character>>;
    fn item_menu(&self) -> Option<Rc<dyn ItemMenu>>;
    fn items(&self) -> &dyn ItemFactory;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum LoadMode {
    Single,
    Additive,
}

/// Information passed with a scene load notification.
#[derive(Clone, Debug)]
pub struct Scene {
    pub name: String,
    pub mode: LoadMode,
}
