pub mod display;

pub use display::{compact_status, detailed_status, DisplayHelper};
