//! In-memory stand-ins for the game, used by the unit tests.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::{Rc, Weak},
};

use eyre::eyre;
use futures::{channel::oneshot, future::LocalBoxFuture, FutureExt};

use super::*;

thread_local! {
    static NEXT_ID: Cell<ItemId> = Cell::new(1);
}

fn next_id() -> ItemId {
    NEXT_ID.with(|id| {
        let value = id.get();
        id.set(value + 1);
        value
    })
}

#[derive(Default)]
pub struct FakeVariables {
    pub map: RefCell<HashMap<String, String>>,
}

impl Variables for FakeVariables {
    fn get_string(&self, key: &str) -> Option<String> {
        self.map.borrow().get(key).cloned()
    }

    fn set_string(&self, key: &str, value: &str) {
        self.map.borrow_mut().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) -> bool {
        self.map.borrow_mut().remove(key).is_some()
    }
}

#[derive(Default)]
pub struct FakeAgents {
    pub entries: RefCell<Vec<(String, Binding)>>,
    pub invalidations: Cell<usize>,
}

impl AgentTable for FakeAgents {
    fn binding(&self, role: &str) -> Option<Binding> {
        self.entries
            .borrow()
            .iter()
            .find(|(key, _)| key == role)
            .map(|(_, binding)| binding.clone())
    }

    fn set_binding(&self, role: &str, binding: Binding) -> bool {
        match self.entries.borrow_mut().iter_mut().find(|(key, _)| key == role) {
            Some(entry) => {
                entry.1 = binding;
                true
            }
            None => false,
        }
    }

    fn invalidate_cache(&self) {
        self.invalidations.set(self.invalidations.get() + 1);
    }
}

pub struct FakeItem {
    pub id: ItemId,
    pub type_id: ItemTypeId,
    pub name: String,
    pub icon: RefCell<Option<Icon>>,
    pub tags: Vec<String>,
    pub slot: RefCell<Option<Weak<FakeSlot>>>,
    pub variables: Option<FakeVariables>,
    pub agents: Option<FakeAgents>,

    /// Stand-in for the functional data that must never be touched.
    pub durability: Cell<u32>,
}

impl FakeItem {
    /// An item with an icon named `<name>.icon` and an `EquipmentModel` binding named
    /// `<name>.model`.
    pub fn new(type_id: ItemTypeId, name: &str, tags: &[&str]) -> Rc<FakeItem> {
        let agents = FakeAgents::default();
        agents.entries.borrow_mut().push((
            "EquipmentModel".to_string(),
            Binding(format!("{name}.model")),
        ));
        agents
            .entries
            .borrow_mut()
            .push(("Pickup".to_string(), Binding(format!("{name}.pickup"))));

        Rc::new(FakeItem {
            id: next_id(),
            type_id,
            name: name.to_string(),
            icon: RefCell::new(Some(Icon(format!("{name}.icon")))),
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            slot: RefCell::new(None),
            variables: Some(FakeVariables::default()),
            agents: Some(agents),
            durability: Cell::new(100),
        })
    }

    /// An item with no agent table entry for the equipment model.
    pub fn without_model(type_id: ItemTypeId, name: &str, tags: &[&str]) -> Rc<FakeItem> {
        let item = FakeItem::new(type_id, name, tags);

        if let Some(agents) = &item.agents {
            agents
                .entries
                .borrow_mut()
                .retain(|(key, _)| key != "EquipmentModel");
        }

        item
    }

    pub fn without_variables(type_id: ItemTypeId, name: &str, tags: &[&str]) -> Rc<FakeItem> {
        let item = FakeItem::new(type_id, name, tags);
        let entries = item
            .agents
            .as_ref()
            .map(|agents| agents.entries.borrow().clone())
            .unwrap_or_default();

        Rc::new(FakeItem {
            id: item.id,
            type_id,
            name: name.to_string(),
            icon: RefCell::new(item.icon()),
            tags: item.tags.clone(),
            slot: RefCell::new(None),
            variables: None,
            agents: Some(FakeAgents {
                entries: RefCell::new(entries),
                invalidations: Cell::new(0),
            }),
            durability: Cell::new(100),
        })
    }

    pub fn model(&self) -> Option<Binding> {
        self.agents.as_ref()?.binding("EquipmentModel")
    }

    pub fn var(&self, key: &str) -> Option<String> {
        self.variables.as_ref()?.get_string(key)
    }

    pub fn set_var(&self, key: &str, value: &str) {
        self.variables.as_ref().unwrap().set_string(key, value);
    }

    pub fn handle(self: &Rc<Self>) -> ItemRef {
        self.clone()
    }
}

impl Item for FakeItem {
    fn id(&self) -> ItemId {
        self.id
    }

    fn type_id(&self) -> ItemTypeId {
        self.type_id
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn icon(&self) -> Option<Icon> {
        self.icon.borrow().clone()
    }

    fn set_icon(&self, icon: Option<Icon>) {
        *self.icon.borrow_mut() = icon;
    }

    fn tags(&self) -> Vec<String> {
        self.tags.clone()
    }

    fn slot(&self) -> Option<SlotRef> {
        let slot = self.slot.borrow().as_ref()?.upgrade()?;
        Some(slot as SlotRef)
    }

    fn variables(&self) -> Option<&dyn Variables> {
        self.variables.as_ref().map(|vars| vars as &dyn Variables)
    }

    fn agents(&self) -> Option<&dyn AgentTable> {
        self.agents.as_ref().map(|agents| agents as &dyn AgentTable)
    }
}

pub struct FakeSlot {
    pub key: String,
    pub content: RefCell<Option<ItemRef>>,
    pub listeners: RefCell<Vec<(ListenerId, SlotListener)>>,
    pub next_listener: Cell<u64>,
    pub unplugs: Cell<usize>,
    pub plugs: Cell<usize>,
}

impl FakeSlot {
    pub fn new(key: &str) -> Rc<FakeSlot> {
        Rc::new(FakeSlot {
            key: key.to_string(),
            content: RefCell::new(None),
            listeners: RefCell::new(vec![]),
            next_listener: Cell::new(0),
            unplugs: Cell::new(0),
            plugs: Cell::new(0),
        })
    }

    /// Equips `item` the way the player would, notifying listeners.
    pub fn equip(self: &Rc<Self>, item: &Rc<FakeItem>) {
        *item.slot.borrow_mut() = Some(Rc::downgrade(self));
        *self.content.borrow_mut() = Some(item.clone() as ItemRef);
        self.notify();
    }

    /// Equips without notifying anybody, as if the item was already there when the scene
    /// loaded.
    pub fn preload(self: &Rc<Self>, item: &Rc<FakeItem>) {
        *item.slot.borrow_mut() = Some(Rc::downgrade(self));
        *self.content.borrow_mut() = Some(item.clone() as ItemRef);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    fn notify(&self) {
        let listeners: Vec<SlotListener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in listeners {
            listener(self);
        }
    }
}

impl Slot for FakeSlot {
    fn key(&self) -> String {
        self.key.clone()
    }

    fn content(&self) -> Option<ItemRef> {
        self.content.borrow().clone()
    }

    fn unplug(&self) -> Option<ItemRef> {
        self.unplugs.set(self.unplugs.get() + 1);
        let item = self.content.borrow_mut().take();
        self.notify();
        item
    }

    fn plug(&self, item: ItemRef) -> bool {
        self.plugs.set(self.plugs.get() + 1);
        *self.content.borrow_mut() = Some(item);
        self.notify();
        true
    }

    fn add_listener(&self, listener: SlotListener) -> ListenerId {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|(other, _)| *other != id);
    }
}

#[derive(Default)]
pub struct FakeCharacter {
    pub slots: Vec<Rc<FakeSlot>>,
    pub popups: RefCell<Vec<String>>,
}

impl FakeCharacter {
    pub fn with_slots(keys: &[&str]) -> Rc<FakeCharacter> {
        Rc::new(FakeCharacter {
            slots: keys.iter().map(|key| FakeSlot::new(key)).collect(),
            popups: RefCell::new(vec![]),
        })
    }

    pub fn slot(&self, key: &str) -> Rc<FakeSlot> {
        self.slots
            .iter()
            .find(|slot| slot.key == key)
            .cloned()
            .expect("no such slot")
    }

    pub fn last_popup(&self) -> Option<String> {
        self.popups.borrow().last().cloned()
    }
}

impl Character for FakeCharacter {
    fn slots(&self) -> Option<Vec<SlotRef>> {
        Some(
            self.slots
                .iter()
                .map(|slot| slot.clone() as SlotRef)
                .collect(),
        )
    }

    fn pop_text(&self, text: &str) {
        self.popups.borrow_mut().push(text.to_string());
    }
}

#[derive(Default)]
pub struct FakeMenu {
    pub displaying: RefCell<Option<ItemRef>>,
    pub shown: Cell<bool>,
    pub closes: Cell<usize>,
    pub trigger: RefCell<Option<String>>,
    pub trigger_sets: Cell<usize>,
    pub description: RefCell<Option<String>>,
}

impl FakeMenu {
    /// Opens the menu on `item`, the way clicking an item in the inventory does.
    pub fn open(&self, item: &Rc<FakeItem>) {
        *self.displaying.borrow_mut() = Some(item.clone() as ItemRef);
        *self.description.borrow_mut() = Some(format!("{} description", item.name));
        self.shown.set(true);
    }

    pub fn trigger_label(&self) -> Option<String> {
        self.trigger.borrow().clone()
    }
}

impl ItemMenu for FakeMenu {
    fn displaying_item(&self) -> Option<ItemRef> {
        self.displaying.borrow().clone()
    }

    fn is_shown(&self) -> bool {
        self.shown.get()
    }

    fn close(&self) {
        self.closes.set(self.closes.get() + 1);
        self.shown.set(false);
        *self.displaying.borrow_mut() = None;
    }

    fn description(&self) -> Option<String> {
        self.description.borrow().clone()
    }

    fn set_description(&self, text: &str) {
        *self.description.borrow_mut() = Some(text.to_string());
    }

    fn set_trigger(&self, label: Option<&str>) {
        self.trigger_sets.set(self.trigger_sets.get() + 1);
        *self.trigger.borrow_mut() = label.map(str::to_string);
    }
}

/// Asset pipeline that knows a fixed catalogue of item types. When `deferred` is set, every
/// instantiation waits until the test calls `resolve_pending`.
#[derive(Default)]
pub struct FakeFactory {
    pub catalogue: RefCell<HashMap<ItemTypeId, (String, Vec<String>)>>,
    pub deferred: Cell<bool>,
    pub pending: RefCell<Vec<(ItemTypeId, oneshot::Sender<eyre::Result<ItemRef>>)>>,
    pub requested: RefCell<Vec<ItemTypeId>>,
    pub destroyed: RefCell<Vec<ItemId>>,
}

impl FakeFactory {
    pub fn register(&self, type_id: ItemTypeId, name: &str, tags: &[&str]) {
        self.catalogue.borrow_mut().insert(
            type_id,
            (
                name.to_string(),
                tags.iter().map(|tag| tag.to_string()).collect(),
            ),
        );
    }

    fn create(&self, type_id: ItemTypeId) -> eyre::Result<ItemRef> {
        let catalogue = self.catalogue.borrow();
        let (name, tags) = catalogue
            .get(&type_id)
            .ok_or_else(|| eyre!("unknown item type {type_id}"))?;

        let tags: Vec<&str> = tags.iter().map(String::as_str).collect();
        Ok(FakeItem::new(type_id, name, &tags))
    }

    /// Completes every pending instantiation.
    pub fn resolve_pending(&self) {
        let pending: Vec<_> = self.pending.borrow_mut().drain(..).collect();

        for (type_id, sender) in pending {
            let _ = sender.send(self.create(type_id));
        }
    }
}

impl ItemFactory for FakeFactory {
    fn instantiate(&self, type_id: ItemTypeId) -> LocalBoxFuture<'static, eyre::Result<ItemRef>> {
        self.requested.borrow_mut().push(type_id);

        if !self.deferred.get() {
            return futures::future::ready(self.create(type_id)).boxed_local();
        }

        let (sender, receiver) = oneshot::channel();
        self.pending.borrow_mut().push((type_id, sender));

        async move { receiver.await.map_err(|_| eyre!("instantiation dropped"))? }.boxed_local()
    }

    fn destroy(&self, item: ItemRef) {
        self.destroyed.borrow_mut().push(item.id());
    }
}

#[derive(Default)]
pub struct FakeHost {
    pub character: RefCell<Option<Rc<FakeCharacter>>>,
    pub menu: RefCell<Option<Rc<FakeMenu>>>,
    pub factory: FakeFactory,
}

impl FakeHost {
    /// A host with a character wearing nothing in the usual equipment slots, and an open-able
    /// inspection menu.
    pub fn new() -> Rc<FakeHost> {
        let host = FakeHost::default();
        *host.character.borrow_mut() = Some(FakeCharacter::with_slots(&[
            "Helmat", "Armor", "FaceMask", "Headset", "Backpack", "Weapon",
        ]));
        *host.menu.borrow_mut() = Some(Rc::new(FakeMenu::default()));
        Rc::new(host)
    }

    pub fn character(&self) -> Rc<FakeCharacter> {
        self.character.borrow().clone().expect("no character")
    }

    pub fn menu(&self) -> Rc<FakeMenu> {
        self.menu.borrow().clone().expect("no menu")
    }
}

impl Host for FakeHost {
    fn main_character(&self) -> Option<Rc<dyn Character>> {
        let character = self.character.borrow().clone()?;
        Some(character as Rc<dyn Character>)
    }

    fn item_menu(&self) -> Option<Rc<dyn ItemMenu>> {
        let menu = self.menu.borrow().clone()?;
        Some(menu as Rc<dyn ItemMenu>)
    }

    fn items(&self) -> &dyn ItemFactory {
        &self.factory
    }
}
