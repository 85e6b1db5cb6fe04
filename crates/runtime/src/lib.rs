pub mod debounce;
pub mod sequence;
pub mod status;

pub use debounce::Debouncer;
pub use sequence::{Generation, SearchSequence};
pub use status::{StatusBus, StatusRegion};
