pub mod admins;
pub mod announcements;
pub mod auth;
pub mod exam;
pub mod health;
pub mod presets;
pub mod settings;
pub mod websocket;
