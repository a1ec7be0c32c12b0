pub mod decision;
pub mod mute_service;
