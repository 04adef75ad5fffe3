//! Persisted student record types
//!
//! Field names on the wire are PascalCase, matching the stored JSON
//! documents. The roster uses its own upper-case naming convention
//! (see [`crate::roster`]); normalization between the two schemas
//! happens at the roster boundary.

use serde::{Deserialize, Serialize};

/// Required length of a student id (fixed-length numeric identifier)
pub const STUDENT_ID_LEN: usize = 6;

/// Profile fields a client may submit in a request payload.
///
/// Everything in [`StudentRecord`] except `StudentId` (the lookup key,
/// removed before this check) and `Token` (never accepted inbound).
pub const ALLOWED_PROFILE_FIELDS: &[&str] = &[
    "FirstName",
    "LastName",
    "Blog",
    "Twitter",
    "Wikipedia",
    "Video",
    "Post1",
    "Post2",
    "Post3",
];

/// Check the syntactic format of a claimed student id.
///
/// The format check runs before any roster lookup or store access:
/// exactly [`STUDENT_ID_LEN`] ASCII digits.
pub fn is_valid_student_id(student_id: &str) -> bool {
    student_id.len() == STUDENT_ID_LEN && student_id.bytes().all(|b| b.is_ascii_digit())
}

/// Mask a student id for inclusion in a response.
///
/// Responses that carry the token must never echo the full id; only
/// the last two digits survive. Counts characters rather than bytes
/// so arbitrary callers cannot hit a char-boundary panic.
pub fn mask_student_id(student_id: &str) -> String {
    let total = student_id.chars().count();
    let keep = total.min(2);
    let visible: String = student_id.chars().skip(total - keep).collect();
    format!("{}{}", "*".repeat(total - keep), visible)
}

/// One persisted document per student, keyed by student id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    #[serde(rename = "FirstName")]
    pub first_name: String,
    #[serde(rename = "LastName")]
    pub last_name: String,
    #[serde(rename = "StudentId")]
    pub student_id: String,
    #[serde(rename = "Token")]
    pub token: String,
    #[serde(rename = "Blog", default)]
    pub blog: String,
    #[serde(rename = "Twitter", default)]
    pub twitter: String,
    #[serde(rename = "Wikipedia", default)]
    pub wikipedia: String,
    #[serde(rename = "Video", default)]
    pub video: String,
    #[serde(rename = "Post1", default)]
    pub post1: String,
    #[serde(rename = "Post2", default)]
    pub post2: String,
    #[serde(rename = "Post3", default)]
    pub post3: String,
}

impl StudentRecord {
    /// Create a fresh record for a first-time registration.
    ///
    /// All optional profile fields and the token start empty; the
    /// token is assigned by the issuer immediately after creation.
    pub fn new(
        student_id: impl Into<String>,
        last_name: impl Into<String>,
        first_name: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            student_id: student_id.into(),
            token: String::new(),
            blog: String::new(),
            twitter: String::new(),
            wikipedia: String::new(),
            video: String::new(),
            post1: String::new(),
            post2: String::new(),
            post3: String::new(),
        }
    }

    /// Display name used for template rendering ("LastName, FirstName")
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }

    /// Strip the student id for inclusion in a token-bearing response
    pub fn into_profile(self) -> ProfileRecord {
        ProfileRecord {
            first_name: self.first_name,
            last_name: self.last_name,
            token: self.token,
            blog: self.blog,
            twitter: self.twitter,
            wikipedia: self.wikipedia,
            video: self.video,
            post1: self.post1,
            post2: self.post2,
            post3: self.post3,
        }
    }
}

/// A student record with the `StudentId` field removed.
///
/// This is the only record shape ever returned alongside a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    #[serde(rename = "FirstName")]
    pub first_name: String,
    #[serde(rename = "LastName")]
    pub last_name: String,
    #[serde(rename = "Token")]
    pub token: String,
    #[serde(rename = "Blog", default)]
    pub blog: String,
    #[serde(rename = "Twitter", default)]
    pub twitter: String,
    #[serde(rename = "Wikipedia", default)]
    pub wikipedia: String,
    #[serde(rename = "Video", default)]
    pub video: String,
    #[serde(rename = "Post1", default)]
    pub post1: String,
    #[serde(rename = "Post2", default)]
    pub post2: String,
    #[serde(rename = "Post3", default)]
    pub post3: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_id_format() {
        assert!(is_valid_student_id("123456"));
        assert!(is_valid_student_id("000000"));
        assert!(!is_valid_student_id("12345"));
        assert!(!is_valid_student_id("1234567"));
        assert!(!is_valid_student_id("12345a"));
        assert!(!is_valid_student_id(""));
        assert!(!is_valid_student_id("12 456"));
    }

    #[test]
    fn masking_keeps_only_last_two_digits() {
        assert_eq!(mask_student_id("123456"), "****56");
        assert_eq!(mask_student_id("12"), "12");
        assert_eq!(mask_student_id("1"), "1");
        assert_eq!(mask_student_id(""), "");
    }

    #[test]
    fn mask_counts_characters_not_bytes() {
        assert_eq!(mask_student_id("１２３４５６"), "****５６");
        assert_eq!(mask_student_id("12345é"), "****5é");
    }

    #[test]
    fn record_serializes_with_pascal_case_names() {
        let record = StudentRecord::new("123456", "Rossi", "Mario");
        let value = serde_json::to_value(&record).unwrap();
        let object = value.as_object().unwrap();

        for key in [
            "FirstName",
            "LastName",
            "StudentId",
            "Token",
            "Blog",
            "Twitter",
            "Wikipedia",
            "Video",
            "Post1",
            "Post2",
            "Post3",
        ] {
            assert!(object.contains_key(key), "missing field {key}");
        }
        assert_eq!(object.len(), 11);
        assert_eq!(object["Token"], "");
    }

    #[test]
    fn profile_drops_student_id() {
        let mut record = StudentRecord::new("123456", "Rossi", "Mario");
        record.token = "sometoken".to_string();

        let profile = record.into_profile();
        let value = serde_json::to_value(&profile).unwrap();
        let object = value.as_object().unwrap();

        assert!(!object.contains_key("StudentId"));
        assert_eq!(object["Token"], "sometoken");
        assert_eq!(object["LastName"], "Rossi");
    }

    #[test]
    fn display_name_is_last_comma_first() {
        let record = StudentRecord::new("123456", "Rossi", "Mario");
        assert_eq!(record.display_name(), "Rossi, Mario");
    }
}
