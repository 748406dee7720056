pub mod admin;
pub mod announcement;
pub mod auth;
pub mod exam;
pub mod preset;
pub mod settings;
