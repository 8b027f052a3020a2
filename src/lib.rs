//! State and persistence core of a photo gallery.
//!
//! The [`GalleryController`](services::gallery::GalleryController) keeps an
//! ordered, newest-first collection of photos. Payloads go to a file-backed
//! blob store and metadata to a key-value store; on startup the collection is
//! rehydrated from both. Hosts that cannot address local files by URI get the
//! payload inlined into each record.

pub mod capture;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod stores;
