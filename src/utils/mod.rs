pub mod forbidden;
pub mod formatting;
