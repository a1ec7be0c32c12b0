pub mod file;
pub mod models;
pub mod mutes;
pub mod users;

pub use mutes::MuteStore;
pub use users::UserDirectory;
