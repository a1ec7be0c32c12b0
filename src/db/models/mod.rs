mod chat_user;
mod known_user;
mod mute_record;

pub use chat_user::ChatUser;
pub use known_user::KnownUser;
pub use mute_record::MuteRecord;
