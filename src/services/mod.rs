pub mod generator;
pub mod moderation;
pub mod scheduler;
