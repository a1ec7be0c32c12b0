pub mod admin;
pub mod event_handler;
