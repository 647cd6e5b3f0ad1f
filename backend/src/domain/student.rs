//! Student records: identity, class placement, roll and registration numbers.

use serde::{Deserialize, Serialize};

use super::{ClassKey, StudentId};

/// Prefix shared by every registration number issued by the centre.
pub const REGISTRATION_PREFIX: &str = "E.T.";

/// A student's profile as held by the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub full_name: String,
    pub class_key: ClassKey,
    pub roll_number: i32,
    pub registration_no: String,
}

/// Validation failures for [`NewStudent`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StudentValidationError {
    #[error("full name must not be empty")]
    EmptyName,
    #[error("email address is not valid")]
    InvalidEmail,
}

/// Admission details for a student who is not yet on the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    full_name: String,
    email: String,
    class_key: ClassKey,
}

impl NewStudent {
    /// Validate admission details, trimming surrounding whitespace.
    ///
    /// # Examples
    /// ```
    /// use tutorhub::domain::{ClassKey, NewStudent};
    ///
    /// let student = NewStudent::try_new(" Asha Rao ", "asha@example.com", ClassKey::Ten)
    ///     .expect("valid admission");
    /// assert_eq!(student.full_name(), "Asha Rao");
    /// ```
    pub fn try_new(
        full_name: impl AsRef<str>,
        email: impl AsRef<str>,
        class_key: ClassKey,
    ) -> Result<Self, StudentValidationError> {
        let full_name = full_name.as_ref().trim();
        if full_name.is_empty() {
            return Err(StudentValidationError::EmptyName);
        }
        let email = email.as_ref().trim();
        let valid_email = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !valid_email {
            return Err(StudentValidationError::InvalidEmail);
        }
        Ok(Self {
            full_name: full_name.to_owned(),
            email: email.to_lowercase(),
            class_key,
        })
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn class_key(&self) -> ClassKey {
        self.class_key
    }
}

/// Format a registration number such as `E.T.11S(007)`.
pub fn registration_number(class_key: ClassKey, serial: u32) -> String {
    format!(
        "{REGISTRATION_PREFIX}{}({serial:03})",
        class_key.registration_code()
    )
}

/// Extract the serial from a registration number issued for `class_key`.
///
/// Returns `None` for numbers issued to another class or malformed values.
pub fn registration_serial(class_key: ClassKey, registration_no: &str) -> Option<u32> {
    registration_no
        .strip_prefix(REGISTRATION_PREFIX)?
        .strip_prefix(class_key.registration_code())?
        .strip_prefix('(')?
        .strip_suffix(')')?
        .parse()
        .ok()
}
