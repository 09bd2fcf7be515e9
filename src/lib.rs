// KAlarm scheduling core
// Recurrence evaluation, event status tagging and collection storage

pub mod error;
pub mod models;
pub mod services;
pub mod utils;
