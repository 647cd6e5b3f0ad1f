//! UUID-backed identifiers for the records the centre keeps.
//!
//! Each identifier is a distinct type so a due id can never be passed where a
//! student id is expected. All of them serialise as plain UUID strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a new random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Access the underlying UUID.
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(value).map(Self)
            }
        }
    };
}

uuid_identifier! {
    /// Identifier shared by a student's user account and profile.
    StudentId
}

uuid_identifier! {
    /// Identifier of a monthly due.
    DueId
}

uuid_identifier! {
    /// Identifier of a payment submitted against a due.
    PaymentId
}

uuid_identifier! {
    /// Identifier of a class test.
    TestId
}

uuid_identifier! {
    /// Identifier of a published study PDF.
    PdfId
}

uuid_identifier! {
    /// Identifier of a shared study link.
    ResourceId
}

uuid_identifier! {
    /// Identifier of a persisted notification.
    NotificationId
}

uuid_identifier! {
    /// Identifier of a dropout request.
    DropoutId
}

impl StudentId {
    /// Real-time room that only this student's connections join.
    ///
    /// # Examples
    /// ```
    /// use tutorhub::domain::StudentId;
    /// use uuid::Uuid;
    ///
    /// let id = StudentId::from_uuid(Uuid::nil());
    /// assert_eq!(id.room(), "student_00000000-0000-0000-0000-000000000000");
    /// ```
    pub fn room(&self) -> String {
        format!("student_{}", self.0)
    }
}
