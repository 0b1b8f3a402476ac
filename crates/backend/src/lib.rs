#![allow(clippy::type_complexity, clippy::derivable_impls)]

pub mod api;
pub mod domain;
pub mod routes;
pub mod shared;
pub mod system;
pub mod usecases;
