//! Reference collections and their CSV loaders

mod data;
pub mod loader;

pub use data::{Carrier, CspEvent, Customer, ReferenceData};
