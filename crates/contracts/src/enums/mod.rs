pub mod import_target;

pub use import_target::ImportTarget;
