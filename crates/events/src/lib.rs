//! Domain events shared by the wallet crates.

pub mod event;

pub use event::Event;
