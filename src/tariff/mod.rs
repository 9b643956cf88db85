//! Tariff records and snapshot loading

mod data;
pub mod loader;

pub use data::{default_expiry, OwnershipType, Tariff, TariffStatus, DEFAULT_TERM_MONTHS};
pub use loader::{load_tariffs, load_tariffs_from_reader};
