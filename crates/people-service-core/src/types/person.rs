//! Typed view over person records.
//!
//! The store itself is schema-free; this is what the people service stores
//! in it. Fields the view does not know about survive a round trip.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use crate::types::{Error, Record, Result};

/// A person's name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Name {
    /// Given name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given: Option<String>,
    /// Family name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    /// Middle names, suffixes, ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional: Option<String>,
}

/// A way of reaching a person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactMethod {
    /// `mobile`, `phone`, `email`, ...
    pub method: String,
    /// Number or address for the method
    pub address: String,
    /// Whether the address has been confirmed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed: Option<bool>,
}

/// Last reported location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lon: f64,
    /// When the location was reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<DateTime<Utc>>,
}

/// A person as stored by the people service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// Store-assigned identity
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Login email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_email: Option<String>,
    /// `invitee`, `active`, ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_status: Option<String>,
    /// Name parts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Name>,
    /// Locale such as `en_US`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// IANA time zone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    /// Ways to contact the person
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contact_methods: Vec<ContactMethod>,
    /// Last known location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_known_loc: Option<Location>,
    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Person {
    /// Decode a stored record
    pub fn from_record(record: Record) -> Result<Self> {
        Ok(serde_json::from_value(record.into())?)
    }

    /// Encode for storage
    pub fn into_record(self) -> Result<Record> {
        Record::try_from(serde_json::to_value(self)?)
    }

    /// Display name for the person's own locale
    pub fn full_name(&self) -> Result<String> {
        let locale = self.locale.as_deref().unwrap_or("en_US");
        match &self.name {
            Some(name) => full_name(locale, name),
            None => Ok(String::new()),
        }
    }
}

/// Join the name parts in the order the locale expects.
///
/// Missing parts are skipped.
pub fn full_name(locale: &str, name: &Name) -> Result<String> {
    let parts = match locale {
        "en_US" | "es_US" | "fr_FR" => [&name.given, &name.family],
        "ja_JP" => [&name.family, &name.given],
        other => {
            return Err(Error::bad_request(format!("full_name doesnt support locale={}", other)))
        }
    };
    Ok(parts.iter().filter_map(|part| part.as_deref()).collect::<Vec<_>>().join(" "))
}
