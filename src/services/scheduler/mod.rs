pub mod debounce;

pub use debounce::{DebounceScheduler, SlotGuard};
