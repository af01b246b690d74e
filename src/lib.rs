//! Interactive state-level country maps.
//!
//! Loads a region dataset, masks out the rest of the world, and serves a
//! Leaflet page where clicking a region highlights it and frames it.

pub mod assemble;
pub mod camera;
pub mod config;
pub mod error;
pub mod mask;
pub mod page;
pub mod regions;
#[cfg(feature = "remote")]
pub mod remote;
pub mod render;
pub mod selection;
pub mod server;
pub mod setup;
