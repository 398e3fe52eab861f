//! The "choose an appearance" step. After the player presses the trigger on an item, the next
//! item they open in the inspection menu is taken as the appearance for it instead of being
//! inspected.

use std::cell::RefCell;

use crate::{
    host::{ItemMenu, ItemRef},
    meta::language::MessageKey,
};

use super::{category, engine::Engine, Notifier, TransmogError};

/// What happened to a selection session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Applied,

    /// The player picked the item they were choosing an appearance for.
    RejectedSelf,

    /// The picked item is a different kind of equipment.
    RejectedCategory,

    /// Both items were fine but applying failed; details are in the log.
    Failed,
}

enum State {
    Idle,
    Selecting { source: ItemRef },
}

impl Default for State {
    fn default() -> Self {
        State::Idle
    }
}

#[derive(Default)]
pub struct Selection {
    state: RefCell<State>,
}

impl Selection {
    /// Starts choosing an appearance for `source`, replacing any session already running.
    pub fn begin(&self, source: ItemRef) {
        log::info!("Choosing an appearance for {}", source.display_name());
        *self.state.borrow_mut() = State::Selecting { source };
    }

    pub fn is_selecting(&self) -> bool {
        matches!(*self.state.borrow(), State::Selecting { .. })
    }

    pub fn source(&self) -> Option<ItemRef> {
        match &*self.state.borrow() {
            State::Selecting { source } => Some(source.clone()),
            State::Idle => None,
        }
    }

    /// Drops the current session. Returns `false` if there wasn't one.
    pub fn cancel(&self) -> bool {
        match self.state.replace(State::Idle) {
            State::Selecting { source } => {
                log::info!("Stopped choosing an appearance for {}", source.display_name());
                true
            }

            State::Idle => false,
        }
    }

    /// Checks whether the menu is opening on a candidate appearance. If a session is running and
    /// the menu has an item, the menu is closed and the candidate is judged; every outcome ends
    /// the session. Returns `None` when there was nothing to intercept.
    pub fn intercept(
        &self,
        menu: &dyn ItemMenu,
        engine: &Engine,
        notifier: &Notifier,
    ) -> Option<Outcome> {
        let source = self.source()?;
        let candidate = menu.displaying_item()?;

        menu.close();
        self.state.replace(State::Idle);

        log::info!(
            "Picked {} as the appearance for {}",
            candidate.display_name(),
            source.display_name()
        );

        if candidate.id() == source.id() {
            log::warn!("{}", TransmogError::SameItem(source.display_name()));
            notifier.notify(MessageKey::CannotSelectSelf.to_message());
            return Some(Outcome::RejectedSelf);
        }

        let (wanted, offered) = (
            category::classify(&*source),
            category::classify(&*candidate),
        );

        if wanted.is_none() || wanted != offered {
            let err = match wanted {
                None => TransmogError::Unclassified(source.display_name()),
                Some(_) => TransmogError::CategoryMismatch {
                    item: source.display_name(),
                    donor: candidate.display_name(),
                },
            };

            log::warn!("{err}");
            notifier.notify(MessageKey::CategoryMismatch.to_message());
            return Some(Outcome::RejectedCategory);
        }

        match engine.apply(&*source, &*candidate) {
            Ok(()) => {
                notifier.notify(MessageKey::TransmogApplied.with_name(candidate.display_name()));
                Some(Outcome::Applied)
            }

            Err(err) => {
                log::error!("Failed to apply transmog: {err}");
                Some(Outcome::Failed)
            }
        }
    }
}
