//! Unique identifiers for calendar entities
//!
//! Identifiers are opaque strings. New ones are uuid v4 in simple hex form,
//! but any non-empty string read from a data file is kept as it is.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Rejected identifier text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("identifier must not be empty")]
pub struct EmptyIdError;

/// Unique identifier for a calendar item
///
/// Generated once when a task or event is created and never reused, even
/// after the item is deleted. Pasting from a register always mints a new one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(Arc<str>);

/// Unique identifier for a subcalendar
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubcalId(Arc<str>);

macro_rules! opaque_id {
    ($name:ident) => {
        impl $name {
            /// Creates a new random ID (uuid v4, simple hex)
            pub fn new() -> Self {
                Self(Arc::from(Uuid::new_v4().simple().to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = EmptyIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if s.is_empty() {
                    return Err(EmptyIdError);
                }
                Ok(Self(Arc::from(s)))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

opaque_id!(ItemId);
opaque_id!(SubcalId);
