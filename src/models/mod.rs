//! Data models for the community locator
//!
//! - Location: coordinates and the user's resolved position
//! - Community: community rows from the data backend

pub mod community;
pub mod location;

pub use community::Community;
pub use location::{Coordinates, LocationSource, UserLocation};
