// ABOUTME: Registrant model and the inbound registration payload
// ABOUTME: Applies the storage length bounds by clipping, never by rejecting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::field_limits;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Clip `value` to at most `max` characters
///
/// Counts Unicode scalar values, so multi-byte names are never split mid-character.
#[must_use]
pub fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Registration data as delivered by the request layer
///
/// Presence of required fields is checked upstream; the length bounds are
/// enforced here regardless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationPayload {
    /// Free token being redeemed
    pub token: String,
    /// Contact email
    pub email: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Gender as entered
    #[serde(default)]
    pub gender: String,
    /// Street and house number
    #[serde(default)]
    pub address: String,
    /// Postal code
    #[serde(default)]
    pub post_code: String,
    /// City
    #[serde(default)]
    pub city: String,
    /// Mobile phone number
    #[serde(default)]
    pub mobile: String,
    /// Date of birth as entered
    #[serde(default)]
    pub birthday: String,
    /// Field of study
    #[serde(default)]
    pub study: String,
    /// Dietary preference
    #[serde(default)]
    pub veggie_level: String,
    /// Free-text comment
    #[serde(default)]
    pub comment: String,
}

impl RegistrationPayload {
    /// Build the registrant record that will be stored for `year`
    ///
    /// The address parts are joined with `", "` before clipping.
    #[must_use]
    pub fn to_registrant(&self, year: i32, registered_at: DateTime<Utc>) -> Registrant {
        let address = [
            self.address.as_str(),
            self.post_code.as_str(),
            self.city.as_str(),
        ]
        .join(", ");

        Registrant {
            token: self.token.clone(),
            year,
            email: truncate_chars(&self.email, field_limits::EMAIL),
            first_name: truncate_chars(&self.first_name, field_limits::FIRST_NAME),
            last_name: truncate_chars(&self.last_name, field_limits::LAST_NAME),
            gender: self.gender.clone(),
            address: truncate_chars(&address, field_limits::ADDRESS),
            phone: truncate_chars(&self.mobile, field_limits::PHONE),
            birthday: self.birthday.clone(),
            study: self.study.clone(),
            food: self.veggie_level.clone(),
            comment: truncate_chars(&self.comment, field_limits::COMMENT),
            previous_token: None,
            registered_at: Some(registered_at),
        }
    }
}

/// A registrant attached to a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registrant {
    /// Token the registration was made with
    pub token: String,
    /// Event year
    pub year: i32,
    /// Contact email
    pub email: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Gender
    pub gender: String,
    /// Combined address
    pub address: String,
    /// Phone number
    pub phone: String,
    /// Date of birth
    pub birthday: String,
    /// Field of study
    pub study: String,
    /// Dietary preference
    pub food: String,
    /// Free-text comment
    pub comment: String,
    /// Predecessor token when registered through a waitlist promotion
    pub previous_token: Option<String>,
    /// Time of registration
    pub registered_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> RegistrationPayload {
        RegistrationPayload {
            token: "k3j9x0aa".into(),
            email: "ada@example.org".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            gender: "f".into(),
            address: "Hauptstr. 1".into(),
            post_code: "12345".into(),
            city: "Berlin".into(),
            mobile: "0151 1234567".into(),
            birthday: "1815-12-10".into(),
            study: "Mathematik".into(),
            veggie_level: "vegetarian".into(),
            comment: String::new(),
        }
    }

    #[test]
    fn test_comment_clipped_to_500() {
        let mut p = payload();
        p.comment = "x".repeat(600);
        let registrant = p.to_registrant(2024, Utc::now());
        assert_eq!(registrant.comment.chars().count(), 500);
    }

    #[test]
    fn test_address_joined_before_clipping() {
        let registrant = payload().to_registrant(2024, Utc::now());
        assert_eq!(registrant.address, "Hauptstr. 1, 12345, Berlin");

        let mut p = payload();
        p.address = "a".repeat(250);
        assert_eq!(p.to_registrant(2024, Utc::now()).address.len(), 200);
    }

    #[test]
    fn test_name_and_email_bounds() {
        let mut p = payload();
        p.first_name = "ö".repeat(60);
        p.last_name = "L".repeat(46);
        p.email = format!("{}@example.org", "m".repeat(50));
        p.mobile = "0".repeat(30);
        let registrant = p.to_registrant(2024, Utc::now());
        assert_eq!(registrant.first_name.chars().count(), 45);
        assert_eq!(registrant.last_name.len(), 45);
        assert_eq!(registrant.email.len(), 45);
        assert_eq!(registrant.phone.len(), 20);
    }

    #[test]
    fn test_short_values_untouched() {
        assert_eq!(truncate_chars("short", 45), "short");
        assert_eq!(truncate_chars("", 45), "");
    }
}
