//! Tri-state field for partial updates.
//!
//! `Option<T>` with `skip_serializing_if` can only express "unset" or "set".
//! Update bodies also need "explicitly cleared", which the server reads as a
//! JSON `null`. [`Patch`] keeps the three states apart so the encoder can
//! reproduce them exactly:
//!
//! | state        | wire form        |
//! |--------------|------------------|
//! | `Unset`      | key omitted      |
//! | `Clear`      | `"key": null`    |
//! | `Set(value)` | `"key": value`   |
//!
//! Fields of this type must be annotated with
//! `#[serde(default, skip_serializing_if = "Patch::is_unset")]`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Patch<T> {
    /// Leave the current value unchanged.
    #[default]
    Unset,
    /// Remove the current value.
    Clear,
    /// Replace the current value.
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_unset(&self) -> bool {
        matches!(self, Patch::Unset)
    }

    pub fn is_clear(&self) -> bool {
        matches!(self, Patch::Clear)
    }

    /// The replacement value, if any.
    pub fn as_set(&self) -> Option<&T> {
        match self {
            Patch::Set(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    /// `Some(v)` sets, `None` clears.
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Set(v),
            None => Patch::Clear,
        }
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Only reached when the field attribute is missing.
            Patch::Unset | Patch::Clear => serializer.serialize_none(),
            Patch::Set(value) => serializer.serialize_some(value),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // A missing key never reaches here; `#[serde(default)]` yields `Unset`.
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}
