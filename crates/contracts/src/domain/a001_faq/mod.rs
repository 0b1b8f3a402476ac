pub mod aggregate;

pub use aggregate::FaqEntry;
