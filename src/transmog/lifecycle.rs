//! Restores transmog appearances from saved records. Icons and model bindings aren't saved by the
//! game, only our two variables are, so after a load every transmog has to be rebuilt from a
//! freshly created copy of the appearance item.

use std::rc::Rc;

use crate::host::{Host, ItemRef};

use super::{
    engine::Engine,
    record::{self, OverlayRecord},
    TransmogError,
};

/// Recreates the appearance item described by `record` and applies it to `item`. The temporary
/// appearance item is destroyed afterwards whether or not applying worked.
///
/// Returns `false` without touching `item` if its record no longer matches `record` once the
/// appearance item exists, because the transmog was removed or replaced in the meantime.
pub async fn reapply(
    host: Rc<dyn Host>,
    engine: Rc<Engine>,
    item: ItemRef,
    record: OverlayRecord,
) -> Result<bool, TransmogError> {
    log::debug!(
        "Creating appearance item {} ({}) for {}",
        record.donor_name,
        record.donor_type,
        item.display_name()
    );

    let donor = host
        .items()
        .instantiate(record.donor_type)
        .await
        .map_err(|err| TransmogError::Instantiate {
            type_id: record.donor_type,
            reason: format!("{err:#}"),
        })?;

    if record::read(&*item).as_ref() != Some(&record) {
        log::info!(
            "Transmog on {} changed while {} was being created, leaving it alone",
            item.display_name(),
            record.donor_name
        );

        host.items().destroy(donor);
        return Ok(false);
    }

    let result = engine.apply(&*item, &*donor);
    host.items().destroy(donor);
    result?;

    log::info!(
        "Restored transmog on {}: {}",
        item.display_name(),
        record.donor_name
    );

    Ok(true)
}

/// Goes through every equipment slot and rebuilds the transmog of each item that has one. Items
/// are handled one at a time; a failure is logged and the next item is tried. Returns how many
/// transmogs were restored.
pub async fn recover_all(host: Rc<dyn Host>, engine: Rc<Engine>) -> usize {
    let character = match host.main_character() {
        Some(character) => character,
        None => {
            log::warn!("Skipping transmog restore: {}", TransmogError::NoCharacter);
            return 0;
        }
    };

    let slots = match character.slots() {
        Some(slots) => slots,
        None => {
            log::warn!("Skipping transmog restore: {}", TransmogError::NoSlots);
            return 0;
        }
    };

    let mut restored = 0;

    for slot in slots {
        let item = match slot.content() {
            Some(item) => item,
            None => continue,
        };

        let record = match record::read(&*item) {
            Some(record) => record,
            None => continue,
        };

        log::info!(
            "Found transmog {} on {} in {}",
            record.donor_name,
            item.display_name(),
            slot.key()
        );

        match reapply(host.clone(), engine.clone(), item, record).await {
            Ok(true) => restored += 1,
            Ok(false) => {}
            Err(err) => log::error!("Failed to restore transmog: {err}"),
        }
    }

    log::info!("Restored {restored} transmog(s)");
    restored
}
