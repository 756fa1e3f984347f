pub mod time;
pub mod timer;

pub use timer::Debounce;
