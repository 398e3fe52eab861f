//! Works out which equipment category an item belongs to. Transmogs are only allowed between
//! items of the same category, and weapons are never part of the system.

use std::str::FromStr;

use itertools::Itertools;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::host::Item;

/// Equipment categories that can be transmogged. The serialised names are the game's slot keys
/// (including its spelling of "Helmat").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
pub enum Category {
    #[strum(serialize = "Helmat")]
    Helmet,
    Armor,
    FaceMask,
    Headset,
    Backpack,
}

/// Key of the slot that holds weapons.
pub const WEAPON_SLOT: &str = "Weapon";

/// Tag groups used to classify items that aren't equipped. Checked in order; the first group
/// with a matching tag wins.
const TAG_GROUPS: &[(&[&str], Category)] = &[
    (&["Helmat", "Helmet"], Category::Helmet),
    (&["Armor", "Body"], Category::Armor),
    (&["FaceMask", "Mask"], Category::FaceMask),
    (&["Headset"], Category::Headset),
    (&["Backpack", "Bag"], Category::Backpack),
];

impl Category {
    /// Maps a slot key to a category. The weapon slot and any slot we don't know about have no
    /// category.
    pub fn from_slot_key(key: &str) -> Option<Category> {
        if key == WEAPON_SLOT {
            return None;
        }

        Category::from_str(key).ok()
    }

    /// Finds the category for a set of item tags.
    pub fn from_tags<S: AsRef<str>>(tags: &[S]) -> Option<Category> {
        TAG_GROUPS.iter().find_map(|(group, category)| {
            tags.iter()
                .any(|tag| group.contains(&tag.as_ref()))
                .then_some(*category)
        })
    }

    /// The game's slot key for this category.
    pub fn slot_key(self) -> &'static str {
        self.into()
    }
}

/// Returns the category of `item`, or `None` if it can't take part in transmogs.
///
/// An equipped item is classified by its slot alone, even when its tags would say otherwise.
/// Items in the inventory fall back to their tags.
pub fn classify(item: &dyn Item) -> Option<Category> {
    if let Some(slot) = item.slot() {
        let key = slot.key();
        let category = Category::from_slot_key(&key);

        if category.is_none() {
            log::debug!("{} is in slot {key}, which has no category", item.display_name());
        }

        return category;
    }

    let tags = item.tags();
    let category = Category::from_tags(&tags);

    if category.is_none() {
        log::warn!(
            "Unable to classify {}, tags: {}",
            item.display_name(),
            tags.iter().join(", ")
        );
    }

    category
}

/// `true` if both items have a category and it is the same one.
pub fn is_same_category(a: &dyn Item, b: &dyn Item) -> bool {
    let (first, second) = (classify(a), classify(b));

    log::debug!(
        "Comparing categories: {} ({:?}) vs {} ({:?})",
        a.display_name(),
        first,
        b.display_name(),
        second
    );

    first.is_some() && first == second
}
