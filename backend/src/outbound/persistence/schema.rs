//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Login accounts. Students and administrators share this table.
    users (id) {
        id -> Uuid,
        email -> Varchar,
        is_admin -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Student profile; one per non-admin user.
    profiles (user_id) {
        user_id -> Uuid,
        full_name -> Varchar,
        /// Class identifier such as `10` or `11_science`.
        student_class -> Varchar,
        /// Unique within `student_class`.
        roll_number -> Int4,
        reg_no -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Monthly dues. `(user_id, month)` is unique.
    fees (id) {
        id -> Uuid,
        user_id -> Uuid,
        /// Month label such as `March 2025`.
        month -> Varchar,
        amount_due -> Int4,
        is_paid -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    payments (id) {
        id -> Uuid,
        fee_id -> Uuid,
        user_id -> Uuid,
        method -> Varchar,
        reference -> Nullable<Varchar>,
        status -> Varchar,
        requested_at -> Timestamptz,
        processed_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Class tests. Named `class_tests` in Rust to keep `tests` free for
    /// test modules.
    #[sql_name = "tests"]
    class_tests (id) {
        id -> Uuid,
        name -> Varchar,
        class_for -> Varchar,
        held_on -> Date,
        total_marks -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One score per `(user_id, test_id)`.
    marks (id) {
        id -> Uuid,
        user_id -> Uuid,
        test_id -> Uuid,
        marks_obtained -> Int4,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    pdfs (id) {
        id -> Uuid,
        title -> Varchar,
        file_path -> Varchar,
        class_for -> Varchar,
        uploaded_at -> Timestamptz,
    }
}

diesel::table! {
    /// Shared study links.
    resources (id) {
        id -> Uuid,
        name -> Varchar,
        link -> Varchar,
        description -> Nullable<Text>,
        class_for -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Personal rows set `user_id`; announcements set `class_for` instead.
    notifications (id) {
        id -> Uuid,
        user_id -> Nullable<Uuid>,
        class_for -> Nullable<Varchar>,
        message -> Text,
        is_read -> Bool,
        seen -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    settings (key) {
        key -> Varchar,
        value -> Text,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    dropout_requests (id) {
        id -> Uuid,
        user_id -> Uuid,
        reason -> Text,
        status -> Varchar,
        admin_response -> Nullable<Text>,
        requested_at -> Timestamptz,
        processed_at -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(profiles -> users (user_id));
diesel::joinable!(fees -> users (user_id));
diesel::joinable!(payments -> fees (fee_id));
diesel::joinable!(marks -> class_tests (test_id));
diesel::joinable!(dropout_requests -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    profiles,
    fees,
    payments,
    class_tests,
    marks,
    pdfs,
    resources,
    notifications,
    settings,
    dropout_requests,
);
