//! Gallery services: the encoder and its host strategies, the persistence
//! adapter over both stores, and the controller that ties them together.

pub mod encoder;
pub mod gallery;
pub mod persistence;
