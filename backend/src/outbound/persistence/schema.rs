//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; Diesel uses them for
//! compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Registered accounts, admins and members alike.
    users (id) {
        /// Primary key: UUID v4.
        id -> Uuid,
        /// Unique login name.
        username -> Varchar,
        /// Argon2id hash in PHC string format.
        password_hash -> Text,
        /// `admin` or `member`.
        role -> Varchar,
        /// Display name.
        full_name -> Varchar,
        /// Hostel room assignment.
        room_number -> Varchar,
        /// Notification address.
        email -> Varchar,
        /// Optional contact number.
        phone -> Nullable<Varchar>,
        /// Account creation time.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Finalised fee payments. A partial unique index on
    /// (user_id, month, year) where status = 'paid' enforces one payment per
    /// member per period.
    payments (id) {
        /// Primary key: UUID v4.
        id -> Uuid,
        /// Paying user.
        user_id -> Uuid,
        /// Month ordinal in 1..=12.
        month -> Integer,
        /// Calendar year.
        year -> Integer,
        /// Amount in major currency units.
        amount -> Int8,
        /// Always 'paid'.
        status -> Varchar,
        /// Gateway payment identifier.
        payment_ref -> Varchar,
        /// Reconciliation time.
        paid_at -> Timestamptz,
    }
}

diesel::table! {
    /// Provisional checkout attempts awaiting gateway confirmation.
    payment_intents (id) {
        /// Primary key: UUID v4.
        id -> Uuid,
        /// Paying user.
        user_id -> Uuid,
        /// Month ordinal in 1..=12.
        month -> Integer,
        /// Calendar year.
        year -> Integer,
        /// Amount in major currency units.
        amount -> Int8,
        /// Gateway order identifier, unique per intent.
        order_id -> Varchar,
        /// Gateway payment identifier, set once the callback verifies.
        payment_ref -> Nullable<Varchar>,
        /// 'created' or 'paid'.
        status -> Varchar,
        /// Creation time.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(payments -> users (user_id));
diesel::joinable!(payment_intents -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, payments, payment_intents);
