//! Player-facing text. Every string the player sees goes through a [`MessageKey`] so that a
//! translation table can be slotted in later; for now there is one built-in English table.

use std::borrow::Cow;

use strum::{EnumIter, EnumString, IntoStaticStr};

/// Identifies a translated message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
    Message(MessageKey),

    /// A message with the name of an item substituted in.
    Named(MessageKey, String),
}

impl Message {
    /// Translates the message into the player's language.
    pub fn translate(&self) -> Cow<'static, str> {
        match self {
            Message::Message(key) => Cow::Borrowed(key.english()),
            Message::Named(key, name) => Cow::Owned(key.english().replace("{name}", name)),
        }
    }

    pub fn key(&self) -> MessageKey {
        match self {
            Message::Message(key) | Message::Named(key, _) => *key,
        }
    }
}

impl MessageKey {
    pub fn to_message(self) -> Message {
        Message::Message(self)
    }

    pub fn with_name(self, name: impl Into<String>) -> Message {
        Message::Named(self, name.into())
    }

    /// Returns the lookup key for this message.
    pub fn key_str(self) -> &'static str {
        self.into()
    }

    fn english(self) -> &'static str {
        match self {
            MessageKey::TriggerApply => "Transmog",
            MessageKey::TriggerRemove => "Remove Transmog",
            MessageKey::ChooseAppearance => "Choose an appearance",
            MessageKey::TransmogApplied => "Transmog applied: {name}",
            MessageKey::TransmogRemoved => "Transmog removed",
            MessageKey::CannotSelectSelf => "Cannot use an item as its own appearance",
            MessageKey::CategoryMismatch => "Item categories do not match",
            MessageKey::DescriptionNote => "Transmog: {name}",
            MessageKey::UnknownAppearance => "Unknown",
        }
    }
}

#[derive(Clone, Copy, Debug, EnumString, EnumIter, IntoStaticStr, PartialEq, Eq, Hash)]
#[strum(serialize_all = "kebab-case")]
pub enum MessageKey {
    TriggerApply,
    TriggerRemove,

    ChooseAppearance,
    TransmogApplied,
    TransmogRemoved,

    CannotSelectSelf,
    CategoryMismatch,

    DescriptionNote,
    UnknownAppearance,
}
