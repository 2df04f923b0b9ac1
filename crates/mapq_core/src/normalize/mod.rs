pub mod entities;

pub use entities::{is_truthy, normalize, string_items, FieldValue, IntentPayload};
