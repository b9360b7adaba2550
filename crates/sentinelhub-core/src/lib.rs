//! Sentinel Hub Core - Data model, settings, and OGC request building
//!
//! This crate contains the domain records, the persisted `Settings` state, and the
//! pure functions that turn that state into WMS/WMTS/WFS/WCS request URLs and names.
//! Network and CRS concerns are reached through the traits in [`ports`].

pub mod clock;
pub mod config;
pub mod constants;
pub mod cooldown;
pub mod error;
pub mod extent;
pub mod models;
pub mod naming;
pub mod ogc;
pub mod ports;
pub mod settings;
pub mod store;
pub mod time;
pub mod validation;

pub use error::{MessageType, Result, ShError};
pub use settings::{Settings, SettingsState};
