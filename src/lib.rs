//! Choropleth of per-country GDP and population.
//!
//! [`data`] loads the boundary GeoJSON and the two economic tables,
//! [`dataset`] joins and classifies them into a read-only [`Dataset`],
//! [`session`] holds selection state on top of it, and [`map`] renders
//! the result as a Braille choropleth.

pub mod braille;
pub mod config;
pub mod data;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod map;
pub mod session;

pub use crate::dataset::{Dataset, DatasetBuilder};
pub use crate::error::{DatasetError, Result};
pub use crate::session::{Session, SessionEvent};
