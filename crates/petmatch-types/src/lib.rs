pub mod api;
pub mod attributes;
pub mod models;
pub mod validation;
