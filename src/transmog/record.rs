//! Reads and writes the transmog record that is saved with an item. The record is two string
//! variables; the presence of the name variable is what marks an item as transmogged.

use crate::host::{Item, ItemTypeId};

use super::TransmogError;

/// Variable holding the display name of the appearance item.
pub const NAME_KEY: &str = "TransmogItemName";

/// Variable holding the type ID of the appearance item, as a decimal string.
pub const ID_KEY: &str = "TransmogItemID";

/// The persisted description of an item's transmog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverlayRecord {
    pub donor_name: String,
    pub donor_type: ItemTypeId,
}

impl OverlayRecord {
    pub fn for_donor(donor: &dyn Item) -> OverlayRecord {
        OverlayRecord {
            donor_name: donor.display_name(),
            donor_type: donor.type_id(),
        }
    }
}

/// `true` if the item carries a transmog record.
pub fn has_overlay(item: &dyn Item) -> bool {
    item.variables()
        .map_or(false, |vars| vars.get_string(NAME_KEY).is_some())
}

/// The name stored in the record, if there is one.
pub fn donor_name(item: &dyn Item) -> Option<String> {
    item.variables()?.get_string(NAME_KEY)
}

/// Reads the record needed to rebuild the transmog appearance. Returns `None` if the item has no
/// record, or if the stored type ID is missing or unusable.
pub fn read(item: &dyn Item) -> Option<OverlayRecord> {
    let vars = item.variables()?;
    let donor_name = vars.get_string(NAME_KEY)?;

    let id_str = match vars.get_string(ID_KEY) {
        Some(id) if !id.is_empty() => id,
        _ => {
            log::debug!(
                "{} has a transmog record without a type ID",
                item.display_name()
            );

            return None;
        }
    };

    match id_str.trim().parse::<ItemTypeId>() {
        Ok(donor_type) => Some(OverlayRecord {
            donor_name,
            donor_type,
        }),

        Err(err) => {
            log::warn!(
                "Ignoring transmog record on {}: bad type ID '{id_str}' ({err})",
                item.display_name()
            );

            None
        }
    }
}

/// Writes `record` onto `item`, replacing any previous record.
pub fn write(item: &dyn Item, record: &OverlayRecord) -> Result<(), TransmogError> {
    let vars = item
        .variables()
        .ok_or_else(|| TransmogError::NoVariables(item.display_name()))?;

    vars.set_string(NAME_KEY, &record.donor_name);
    vars.set_string(ID_KEY, &record.donor_type.to_string());

    Ok(())
}

/// Deletes both record variables.
pub fn clear(item: &dyn Item) -> Result<(), TransmogError> {
    let vars = item
        .variables()
        .ok_or_else(|| TransmogError::NoVariables(item.display_name()))?;

    vars.remove(NAME_KEY);
    vars.remove(ID_KEY);

    Ok(())
}
