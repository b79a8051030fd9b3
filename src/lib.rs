// Schedule Drag Library
// Drag-to-schedule and reorder engine with optimistic persistence

pub mod commands;
pub mod drag;
pub mod models;
pub mod mutation;
pub mod services;
pub mod utils;
