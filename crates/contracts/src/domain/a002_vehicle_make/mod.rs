pub mod aggregate;

pub use aggregate::{VehicleMake, VehicleMakeStatus};
