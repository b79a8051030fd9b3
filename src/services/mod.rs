// Service module exports
// Reference record store and settings persistence used by the drag engine

pub mod database;
pub mod item;
pub mod record_store;
pub mod settings;
