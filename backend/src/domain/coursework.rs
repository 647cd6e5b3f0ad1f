//! Class tests, marks and study PDFs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::{Audience, PdfId, ResourceId, StudentId, TestId};

/// A test set for an audience.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassTest {
    pub id: TestId,
    pub name: String,
    pub audience: Audience,
    pub held_on: NaiveDate,
    pub total_marks: u32,
}

/// Validation failures for coursework input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CourseworkValidationError {
    #[error("{field} must not be empty")]
    Blank { field: &'static str },
    #[error("total marks must be greater than zero")]
    ZeroTotalMarks,
    #[error("marks obtained {obtained} exceed the test total of {total}")]
    MarksOutOfRange { obtained: u32, total: u32 },
    #[error("link must be an absolute http or https URL")]
    InvalidLink,
}

impl ClassTest {
    /// Build a new test, rejecting blank names and zero totals.
    pub fn try_new(
        name: &str,
        audience: Audience,
        held_on: NaiveDate,
        total_marks: u32,
    ) -> Result<Self, CourseworkValidationError> {
        let name = non_blank(name, "name")?;
        if total_marks == 0 {
            return Err(CourseworkValidationError::ZeroTotalMarks);
        }
        Ok(Self {
            id: TestId::random(),
            name,
            audience,
            held_on,
            total_marks,
        })
    }

    /// Check an obtained score against this test's total.
    pub fn check_marks(&self, obtained: u32) -> Result<u32, CourseworkValidationError> {
        if obtained > self.total_marks {
            return Err(CourseworkValidationError::MarksOutOfRange {
                obtained,
                total: self.total_marks,
            });
        }
        Ok(obtained)
    }
}

/// A student's score in one test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mark {
    pub student_id: StudentId,
    pub test_id: TestId,
    pub marks_obtained: u32,
    pub updated_at: DateTime<Utc>,
}

/// Metadata for an uploaded study PDF. The file itself lives elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pdf {
    pub id: PdfId,
    pub title: String,
    pub file_path: String,
    pub audience: Audience,
    pub uploaded_at: DateTime<Utc>,
}

impl Pdf {
    pub fn try_new(
        title: &str,
        file_path: &str,
        audience: Audience,
        uploaded_at: DateTime<Utc>,
    ) -> Result<Self, CourseworkValidationError> {
        Ok(Self {
            id: PdfId::random(),
            title: non_blank(title, "title")?,
            file_path: non_blank(file_path, "filePath")?,
            audience,
            uploaded_at,
        })
    }
}

/// A study link shared with an audience, such as a video or a worksheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    pub link: String,
    pub description: Option<String>,
    pub audience: Audience,
    pub created_at: DateTime<Utc>,
}

impl Resource {
    /// Build a resource. Blank descriptions are dropped; the link must parse
    /// as an absolute `http` or `https` URL.
    pub fn try_new(
        name: &str,
        link: &str,
        description: Option<&str>,
        audience: Audience,
        created_at: DateTime<Utc>,
    ) -> Result<Self, CourseworkValidationError> {
        let name = non_blank(name, "name")?;
        let link = non_blank(link, "link")?;
        let parsed = url::Url::parse(&link).map_err(|_| CourseworkValidationError::InvalidLink)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CourseworkValidationError::InvalidLink);
        }
        let description = description
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_owned);
        Ok(Self {
            id: ResourceId::random(),
            name,
            link,
            description,
            audience,
            created_at,
        })
    }
}

fn non_blank(value: &str, field: &'static str) -> Result<String, CourseworkValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CourseworkValidationError::Blank { field });
    }
    Ok(trimmed.to_owned())
}
