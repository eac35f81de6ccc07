//! Domain models for the clinic record store.

mod appointment;
mod patient;
mod record;
mod validation;
mod wire;

pub use appointment::*;
pub use patient::*;
pub use record::*;
pub use validation::*;
pub use wire::*;
