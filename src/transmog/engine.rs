//! Applies and removes transmogs. Only the icon and the `EquipmentModel` binding of an item are
//! ever changed here; stats, modifiers, durability and the item's name are never read or written.

use crate::host::Item;

use super::{
    originals::OriginalsCache,
    record::{self, OverlayRecord},
    refresh::RefreshTrigger,
    TransmogError, EQUIPMENT_MODEL,
};

#[derive(Default)]
pub struct Engine {
    cache: OriginalsCache,
    refresh: RefreshTrigger,
}

impl Engine {
    pub fn cache(&self) -> &OriginalsCache {
        &self.cache
    }

    pub fn refresh(&self) -> &RefreshTrigger {
        &self.refresh
    }

    /// Gives `source` the look of `donor`. The caller is responsible for checking that both are
    /// in the same category.
    ///
    /// Failing to find a model binding on either item is only a warning: the icon is still
    /// copied and the record is still saved.
    pub fn apply(&self, source: &dyn Item, donor: &dyn Item) -> Result<(), TransmogError> {
        if source.id() == donor.id() {
            return Err(TransmogError::SameItem(source.display_name()));
        }

        record::write(source, &OverlayRecord::for_donor(donor))?;

        self.cache.snapshot_if_absent(source);

        if let Some(icon) = donor.icon() {
            log::debug!("Copying icon {icon} onto {}", source.display_name());
            source.set_icon(Some(icon));
        }

        if let Err(err) = rebind_model(source, donor) {
            log::warn!("{err}");
        }

        if source.slot().is_some() {
            self.refresh.refresh(source);
        }

        log::info!(
            "Transmog applied: {} -> {}",
            source.display_name(),
            donor.display_name()
        );

        Ok(())
    }

    /// Takes the transmog off `source` and puts its saved look back. Returns `Ok(false)` if the
    /// item had no transmog.
    pub fn remove(&self, source: &dyn Item) -> Result<bool, TransmogError> {
        if !record::has_overlay(source) {
            log::debug!("{} has no transmog to remove", source.display_name());
            return Ok(false);
        }

        record::clear(source)?;
        self.cache.restore(source);

        if source.slot().is_some() {
            self.refresh.refresh(source);
        }

        log::info!("Transmog removed from {}", source.display_name());
        Ok(true)
    }
}

/// Points the source's model entry at the donor's model.
fn rebind_model(source: &dyn Item, donor: &dyn Item) -> Result<(), TransmogError> {
    let missing = |item: &dyn Item| TransmogError::MissingBinding {
        item: item.display_name(),
        role: EQUIPMENT_MODEL,
    };

    let binding = donor
        .agents()
        .and_then(|agents| agents.binding(EQUIPMENT_MODEL))
        .ok_or_else(|| missing(donor))?;

    let agents = source.agents().ok_or_else(|| missing(source))?;

    let rebound = agents.set_binding(EQUIPMENT_MODEL, binding.clone());

    // Lookups are cached by the game, so the cache has to go either way.
    agents.invalidate_cache();

    if !rebound {
        return Err(missing(source));
    }

    log::debug!("Rebound {} model to {binding}", source.display_name());
    Ok(())
}
