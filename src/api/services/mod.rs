pub mod location;

pub use location::{LocationService, location_routes};
