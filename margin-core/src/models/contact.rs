use serde::{Deserialize, Serialize};

use crate::parse::only_digits;

/// Country calling code prepended to every full-format phone number.
pub const COUNTRY_CODE: &str = "55";

/// A captured lead contact.
///
/// `phone` always holds national digits (area code + subscriber number,
/// no country code, no punctuation).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub phone: String,
    pub email: String,
}

/// Which contact fields currently pass validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactValidity {
    pub name: bool,
    pub phone: bool,
    pub email: bool,
}

impl ContactValidity {
    pub fn all(&self) -> bool {
        self.name && self.phone && self.email
    }
}

/// Editable contact fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Name,
    Phone,
    Email,
}

impl Contact {
    /// Builds a contact from raw form text, trimming and normalizing.
    pub fn from_raw(
        name: &str,
        phone: &str,
        email: &str,
    ) -> Self {
        Self {
            name: name.trim().to_string(),
            phone: normalize_phone_national(phone),
            email: email.trim().to_string(),
        }
    }

    /// Updates one field from raw form text.
    pub fn set(
        &mut self,
        field: ContactField,
        raw: &str,
    ) {
        match field {
            ContactField::Name => self.name = raw.trim().to_string(),
            ContactField::Phone => self.phone = normalize_phone_national(raw),
            ContactField::Email => self.email = raw.trim().to_string(),
        }
    }

    pub fn validity(&self) -> ContactValidity {
        ContactValidity {
            name: self.name.chars().count() >= 2,
            phone: normalize_phone_full(&self.phone).is_some(),
            email: is_valid_email(&self.email),
        }
    }

    /// Copies fields from `other`.
    ///
    /// With `force` every field is overwritten; otherwise only fields that
    /// are currently empty are filled.
    pub fn fill_from(
        &mut self,
        other: &Contact,
        force: bool,
    ) {
        if force || self.name.is_empty() {
            self.name = other.name.clone();
        }
        if force || self.phone.is_empty() {
            self.phone = other.phone.clone();
        }
        if force || self.email.is_empty() {
            self.email = other.email.clone();
        }
    }

    /// Full international phone (`55` + 11 digits), empty when invalid.
    pub fn full_phone(&self) -> String {
        normalize_phone_full(&self.phone).unwrap_or_default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Reduces a phone to national digits.
///
/// Drops punctuation, leading zeros (trunk prefix) and a leading `55`
/// country code.
pub fn normalize_phone_national(raw: &str) -> String {
    let digits = only_digits(raw);
    let digits = digits.trim_start_matches('0');
    digits.strip_prefix(COUNTRY_CODE).unwrap_or(digits).to_string()
}

/// Produces the 13-digit `55DDXXXXXXXXX` form, or `None` when the number
/// cannot be a mobile number.
///
/// Ten-digit numbers (area code + 8 digits) get the mobile `9` inserted
/// after the area code.
///
/// ```
/// use margin_core::models::normalize_phone_full;
///
/// assert_eq!(normalize_phone_full("1187654321").as_deref(), Some("5511987654321"));
/// assert_eq!(normalize_phone_full("123"), None);
/// ```
pub fn normalize_phone_full(raw: &str) -> Option<String> {
    let mut national = normalize_phone_national(raw);
    if national.is_empty() {
        return None;
    }

    if national.len() == 10 {
        national.insert(2, '9');
    }

    if national.len() != 11 {
        return None;
    }

    Some(format!("{COUNTRY_CODE}{national}"))
}

/// Lightweight email check: contains `@` and `.` and is at least 6 chars.
///
/// Deliberately not RFC 5322; it only filters obvious typos.
pub fn is_valid_email(email: &str) -> bool {
    let e = email.trim();
    e.contains('@') && e.contains('.') && e.chars().count() >= 6
}
