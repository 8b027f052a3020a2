//! Core data models for the photo gallery.
//!
//! `PhotoRecord` and `PhotoCollection` are what the presentation layer sees
//! and what gets serialized into the key-value store. Capture types describe
//! the contract with the capture service.

pub mod capture;
pub mod payload;
pub mod photo;
