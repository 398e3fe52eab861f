//! Equipment transmog: one item takes on the look (icon and 3D model) of another item in the same
//! category, while keeping its own stats.
//!
//! [`Transmog`] owns everything and is driven by the game through three entry points: a scene
//! load notification, a per-frame update, and the trigger button in the inspection menu.

use std::rc::{Rc, Weak};

use crate::{
    host::{Host, Item, ItemId, ItemRef, ItemTypeId, Scene, Slot, SlotListener},
    meta::{
        language::{Message, MessageKey},
        settings::{Options, PopupMode},
    },
};

pub mod affordance;
pub mod category;
pub mod engine;
pub mod lifecycle;
pub mod monitor;
pub mod originals;
pub mod record;
pub mod refresh;
pub mod selection;
pub mod tasks;

use affordance::Affordance;
use engine::Engine;
use monitor::SlotMonitor;
use selection::Selection;
use tasks::Tasks;

/// Agent table role of the 3D model shown when an item is equipped.
pub const EQUIPMENT_MODEL: &str = "EquipmentModel";

#[derive(Debug, thiserror::Error)]
pub enum TransmogError {
    #[error("the main character could not be found")]
    NoCharacter,

    #[error("the main character has no equipment slots")]
    NoSlots,

    #[error("{0} has no variable store")]
    NoVariables(String),

    #[error("{0} does not belong to any equipment category")]
    Unclassified(String),

    #[error("{donor} is not the same kind of equipment as {item}")]
    CategoryMismatch { item: String, donor: String },

    #[error("{0} can't be its own appearance")]
    SameItem(String),

    #[error("unable to create appearance item {type_id}: {reason}")]
    Instantiate { type_id: ItemTypeId, reason: String },

    #[error("{item} has no {role} binding")]
    MissingBinding { item: String, role: &'static str },
}

/// Shows text bubbles above the player's character.
pub struct Notifier {
    host: Rc<dyn Host>,
    popups: PopupMode,
}

impl Notifier {
    pub fn new(host: Rc<dyn Host>, options: &Options) -> Notifier {
        Notifier {
            host,
            popups: options.popups,
        }
    }

    pub fn notify(&self, message: Message) {
        let text = message.translate();
        log::info!("Notification ({}): {text}", message.key().key_str());

        if self.popups == PopupMode::Hidden {
            return;
        }

        match self.host.main_character() {
            Some(character) => character.pop_text(&text),
            None => log::warn!("Can't show notification: {}", TransmogError::NoCharacter),
        }
    }
}

struct Shared {
    host: Rc<dyn Host>,
    options: Options,
    engine: Rc<Engine>,
    selection: Selection,
    affordance: Affordance,
    monitor: SlotMonitor,
    tasks: Tasks,
    notifier: Notifier,
}

impl Shared {
    fn on_slot_changed(&self, slot: &dyn Slot) {
        let (item, record) = match monitor::needs_reapply(self.engine.refresh(), slot) {
            Some(found) => found,
            None => return,
        };

        let (host, engine) = (self.host.clone(), self.engine.clone());

        self.tasks.spawn("reapply transmog", async move {
            if let Err(err) = lifecycle::reapply(host, engine, item, record).await {
                log::error!("Failed to reapply transmog after equip: {err}");
            }
        });
    }
}

pub struct Transmog {
    shared: Rc<Shared>,
}

impl Transmog {
    /// Sets everything up and runs the same pass a scene load does, so items that are already
    /// equipped get their transmog back.
    pub fn new(host: Rc<dyn Host>, options: Options) -> Transmog {
        log::info!("Transmog starting with options {:?}", options);

        let transmog = Transmog {
            shared: Rc::new(Shared {
                notifier: Notifier::new(host.clone(), &options),
                host,
                options,
                engine: Rc::new(Engine::default()),
                selection: Selection::default(),
                affordance: Affordance::default(),
                monitor: SlotMonitor::default(),
                tasks: Tasks::new(),
            }),
        };

        transmog.start_session();
        transmog
    }

    /// Called by the game after a scene has loaded. Everything tied to the old scene is thrown
    /// away before the new scene is looked at.
    pub fn on_scene_loaded(&self, scene: &Scene) {
        log::info!("===== Scene loaded: {} ({}) =====", scene.name, scene.mode);
        self.start_session();
    }

    fn start_session(&self) {
        let shared = &self.shared;

        shared.tasks.cancel_all();
        shared.monitor.detach_all();
        shared.engine.cache().clear_all();
        shared.affordance.forget();

        if shared.selection.cancel() {
            log::info!("Appearance selection was interrupted by the scene change");
        }

        self.attach_monitor();

        let (host, engine) = (shared.host.clone(), shared.engine.clone());

        shared.tasks.spawn("restore transmogs", async move {
            lifecycle::recover_all(host, engine).await;
        });
    }

    fn attach_monitor(&self) {
        let character = match self.shared.host.main_character() {
            Some(character) => character,
            None => {
                log::warn!("Not monitoring slots: {}", TransmogError::NoCharacter);
                return;
            }
        };

        let slots = match character.slots() {
            Some(slots) => slots,
            None => {
                log::warn!("Not monitoring slots: {}", TransmogError::NoSlots);
                return;
            }
        };

        let shared: Weak<Shared> = Rc::downgrade(&self.shared);

        let listener: SlotListener = Rc::new(move |slot: &dyn Slot| {
            if let Some(shared) = shared.upgrade() {
                shared.on_slot_changed(slot);
            }
        });

        self.shared.monitor.attach(slots, listener);
    }

    /// Called by the game once per frame.
    pub fn update(&self) {
        let shared = &self.shared;
        shared.tasks.pump();

        let menu = match shared.host.item_menu() {
            Some(menu) => menu,
            None => return,
        };

        if let Some(outcome) =
            shared
                .selection
                .intercept(&*menu, &shared.engine, &shared.notifier)
        {
            log::info!("Appearance selection finished: {outcome:?}");
            shared.affordance.forget();
            return;
        }

        if let Some(shown) = shared.affordance.tick(&*menu, &shared.options) {
            self.reassert_label(shown);
        }
    }

    fn reassert_label(&self, shown: affordance::Shown) {
        let host = self.shared.host.clone();
        let frame = self.shared.tasks.next_frame();

        self.shared.tasks.spawn("trigger label", async move {
            frame.await;

            let menu = match host.item_menu() {
                Some(menu) => menu,
                None => return,
            };

            let still_showing = menu.is_shown()
                && menu.displaying_item().map(|item| item.id()) == Some(shown.item);

            if still_showing {
                menu.set_trigger(Some(&shown.label));
            }
        });
    }

    /// Called by the game when the player presses the transmog trigger.
    pub fn on_trigger_pressed(&self) {
        let shared = &self.shared;

        let item = match shared.affordance.last_displayed() {
            Some(item) => item,
            None => {
                log::warn!("Transmog trigger pressed with no item on display");
                return;
            }
        };

        log::info!("Transmog trigger pressed for {}", item.display_name());

        if category::classify(&*item).is_none() {
            log::warn!("Ignoring trigger: {}", TransmogError::Unclassified(item.display_name()));
            return;
        }

        let menu = shared.host.item_menu();

        if record::has_overlay(&*item) {
            match shared.engine.remove(&*item) {
                Ok(_) => shared
                    .notifier
                    .notify(MessageKey::TransmogRemoved.to_message()),
                Err(err) => log::error!("Failed to remove transmog: {err}"),
            }

            if let Some(menu) = &menu {
                shared
                    .affordance
                    .update_menu(&**menu, &*item, &shared.options);
            }
        } else {
            shared.selection.begin(item);
            shared
                .notifier
                .notify(MessageKey::ChooseAppearance.to_message());
        }

        if let Some(menu) = menu {
            menu.close();
        }
    }

    /// Applies `donor`'s look to `source` directly, bypassing the menu.
    pub fn apply(&self, source: &dyn Item, donor: &dyn Item) -> Result<(), TransmogError> {
        if !category::is_same_category(source, donor) {
            return Err(TransmogError::CategoryMismatch {
                item: source.display_name(),
                donor: donor.display_name(),
            });
        }

        self.shared.engine.apply(source, donor)
    }

    /// Returns whether there was a transmog to remove.
    pub fn remove(&self, item: &dyn Item) -> Result<bool, TransmogError> {
        self.shared.engine.remove(item)
    }

    pub fn has_overlay(&self, item: &dyn Item) -> bool {
        record::has_overlay(item)
    }

    pub fn has_snapshot(&self, id: ItemId) -> bool {
        self.shared.engine.cache().has_snapshot(id)
    }

    /// The item an appearance is currently being chosen for.
    pub fn selecting(&self) -> Option<ItemRef> {
        self.shared.selection.source()
    }

    pub fn tasks_in_flight(&self) -> usize {
        self.shared.tasks.in_flight()
    }

    /// Stops everything and lets go of the game. Safe to call more than once.
    pub fn unload(&self) {
        let shared = &self.shared;

        shared.tasks.cancel_all();
        shared.monitor.detach_all();
        shared.selection.cancel();
        shared.engine.cache().clear_all();

        if shared.affordance.last_displayed().is_some() {
            if let Some(menu) = shared.host.item_menu() {
                menu.set_trigger(None);
            }
        }

        shared.affordance.forget();
        log::info!("Transmog unloaded");
    }
}

impl Drop for Transmog {
    fn drop(&mut self) {
        self.unload();
    }
}
