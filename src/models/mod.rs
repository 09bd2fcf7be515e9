// Module exports for models

pub mod collection;
pub mod event;
pub mod occurrence;
pub mod recurrence;
pub mod settings;
