//! Family grouping engine: filters, search, pins, and nested views
//!
//! Everything here is a pure derivation over the latest fetched snapshot;
//! nothing is cached between passes.

mod engine;
mod family;
mod filter;
mod pins;

pub use engine::{
    sort_versions, GroupSortKey, GroupView, GroupingConfig, GroupingEngine, SortDirection,
    VersionSort, VersionSortKey, UNKNOWN_GROUP_KEY,
};
pub use family::FamilyView;
pub use filter::{status_rank, SearchQuery, StatusFilter};
pub use pins::{PinRecord, PinSet, PinType};
