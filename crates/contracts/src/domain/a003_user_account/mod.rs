pub mod aggregate;

pub use aggregate::{UserAccount, UserRole};
