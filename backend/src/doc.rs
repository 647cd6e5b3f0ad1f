//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST handler in the inbound layer together with
//! the error wrappers from [`crate::inbound::http::schemas`]. Request and
//! response DTOs are collected from the handler annotations. The document is
//! served by Swagger UI in debug builds.

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::{
    coursework, dropouts, dues, health, leaderboard, notifications, payments, settings, students,
};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "tutorhub API",
        description = "Dues ledger, roster, leaderboard and notifications for a tutoring centre. \
            Admin routes expect authorisation to be enforced by the fronting gateway."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        dues::assign_monthly_dues,
        dues::add_dues,
        dues::update_due,
        dues::delete_due,
        dues::toggle_due_paid,
        dues::fee_status,
        payments::pending_payments,
        payments::approve_payment,
        payments::reject_payment,
        payments::confirm_cash_payment,
        payments::submit_payment,
        students::register_student,
        students::remove_student,
        students::class_roster,
        students::resequence_class,
        dropouts::list_dropouts,
        dropouts::approve_dropout,
        dropouts::reject_dropout,
        dropouts::request_dropout,
        notifications::broadcast,
        notifications::purge_expired,
        notifications::notifications_for,
        notifications::mark_read,
        coursework::create_test,
        coursework::record_mark,
        coursework::delete_mark,
        coursework::publish_pdf,
        coursework::publish_resource,
        leaderboard::classes_with_data,
        leaderboard::leaderboard_for_class,
        leaderboard::leaderboard_position,
        settings::get_monthly_due,
        settings::set_monthly_due,
        settings::get_upi_settings,
        settings::update_upi_settings,
        settings::payment_details,
        health::ready,
        health::live,
    ),
    components(schemas(ErrorSchema, ErrorCodeSchema)),
    tags(
        (name = "dues", description = "Monthly dues and the fee engine"),
        (name = "payments", description = "Payment submission and review"),
        (name = "roster", description = "Student registration and roll numbers"),
        (name = "dropouts", description = "Dropout requests"),
        (name = "notifications", description = "Announcements and student notices"),
        (name = "coursework", description = "Class tests, marks, PDFs and study links"),
        (name = "leaderboard", description = "Per-class rankings"),
        (name = "settings", description = "Centre-wide settings"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated OpenAPI document.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    #[test]
    fn openapi_error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        match error_schema {
            RefOr::T(Schema::Object(obj)) => {
                for field in ["code", "message"] {
                    assert!(
                        obj.properties.contains_key(field),
                        "schema should have field '{field}'"
                    );
                }
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("/api/v1/admin/dues/monthly")]
    #[case("/api/v1/admin/classes/{classKey}/resequence")]
    #[case("/api/v1/students/{studentId}/dues")]
    #[case("/api/v1/leaderboard/{classKey}")]
    #[case("/api/v1/payment-details")]
    #[case("/api/v1/admin/tests/{testId}/marks/{studentId}")]
    #[case("/api/v1/admin/resources")]
    #[case("/health/ready")]
    fn document_lists_core_paths(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(
            doc.paths.paths.contains_key(path),
            "OpenAPI document should describe {path}"
        );
    }
}
