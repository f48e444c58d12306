pub mod analysis;
pub mod batch;
pub mod decode;
pub mod fusion;
pub mod grid;
pub mod manifest;
pub mod result;
pub mod serialization;
