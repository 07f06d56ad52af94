pub mod geolocation;
pub mod lookup;

pub use geolocation::{GeoProvider, IpstackProvider, LocationRecord};
pub use lookup::LookupService;
