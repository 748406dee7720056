pub mod auth;
pub mod countdown;
pub mod display;
pub mod events;
pub mod presets;
