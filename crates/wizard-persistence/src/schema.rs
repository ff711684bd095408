//! Esquema Diesel. Reemplazable con `diesel print-schema`.

diesel::table! {
    wizards (id) {
        id -> BigInt,
        wizard_type -> Text,
        data -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}
