//! Facade crate for the Place City venue reassignment engine.
//!
//! This crate re-exports the core API. Fixture builders are available behind
//! the `test-support` feature.

#![forbid(unsafe_code)]

pub use place_city_core::{
    ApplyError, ApplyLog, ApplyReport, ApplyRequest, City, CityId, CityNameMatch,
    EmptyStreetInfo, EmptyStreetResolver, EmptyStreetStrategy, HostDataApi, HostError,
    KeyValueStore, MemoryHost, OutcomeTally, PlaceCity, RecentCities, RecentCity, RecentsStore,
    SelectionProvider, SelectionStatus, Street, StreetId, VenueAddress, VenueId,
    resolve_selection,
};

#[cfg(feature = "test-support")]
pub use place_city_core::test_support;
