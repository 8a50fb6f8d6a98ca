//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a
//! migration changes the table, regenerate with `diesel print-schema` or edit
//! by hand.

diesel::table! {
    /// User accounts.
    ///
    /// `email` carries the `users_email_key` unique constraint.
    users (id) {
        /// Primary key assigned by the `BIGSERIAL` sequence.
        id -> Int8,
        /// Unique, syntactically valid email address.
        email -> Varchar,
        /// Display name, at least two characters.
        name -> Varchar,
        /// Password as submitted; only the list route reads it back.
        password -> Varchar,
    }
}
