pub mod common;
pub mod domain;
pub mod modules;
pub mod numerics;

pub use domain::{LweError, LweErrorCategory, LweErrorKind, LweResult};
pub use modules::result::{LoadOptions, SimulationResult, load};
