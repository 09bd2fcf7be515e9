// Service module exports

pub mod attribute;
pub mod collection;
pub mod database;
pub mod occurrence;
pub mod settings;
pub mod status;
