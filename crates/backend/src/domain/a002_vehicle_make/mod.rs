pub mod import_schema;

pub use import_schema::{VehicleMakeColumn, VehicleMakeImport};
