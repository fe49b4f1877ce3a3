//! Core engine for moving map venues into another city.
//!
//! The engine talks to the map editor through the capability traits in
//! [`host`]. Optional host calls default to [`HostError::Unsupported`], so a
//! deployment only implements what it actually offers and the resolvers fall
//! back across the remaining shapes. [`PlaceCity::apply`] drives a whole
//! invocation: it resolves the destination city and its empty street once,
//! then reassigns each selected venue while preserving its street name and
//! house number.
//!
//! # Examples
//!
//! ```
//! use place_city_core::{ApplyRequest, MemoryHost, PlaceCity, VenueId};
//!
//! let mut host = MemoryHost::default();
//! let origin = host.insert_city("Shelbyville", None);
//! let street = host.insert_street(origin.id, Some("Elm St"));
//! host.insert_venue(VenueId::from("v1"), Some("12"), Some(street.id), None);
//!
//! let report = PlaceCity::new()
//!     .apply(&mut host, &ApplyRequest::new("Springfield"), &[VenueId::from("v1")])
//!     .expect("city resolves");
//! assert_eq!(report.tally.changed, 1);
//! assert_eq!(report.city.name, "Springfield");
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod apply;
pub mod host;
pub mod memory;
pub mod model;
pub mod reassign;
pub mod recents;
pub mod report;
pub mod resolve;
pub mod selection;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use apply::{ApplyError, ApplyReport, ApplyRequest, PlaceCity};
pub use host::{
    CityData, CityQuery, CountryData, HostDataApi, HostError, HostResult, NewCity, NewStreet,
    StateData, StreetData, StreetNameField, StreetQuery, VenueData,
};
pub use memory::{CallCounts, HostCapabilities, MemoryHost, VenueRecord};
pub use model::{
    AddressCity, AddressUpdate, City, CityId, Country, CountryId, State, StateId, Street,
    StreetId, VenueAddress, VenueId,
};
pub use reassign::{CityNameMatch, Reassigner, VenueError, VenueOutcome};
pub use recents::{
    KeyValueStore, MAX_RECENTS, MemoryKeyValueStore, RECENTS_KEY, RecentCities, RecentCity,
    RecentsError, RecentsStore,
};
pub use report::{ApplyLog, LogEntry, LogLevel, OutcomeTally};
pub use resolve::{
    BlankNameQuery, CityResolutionError, CreateEmptyStreet, CreationShape, DirectGetter,
    EmptyMarkerQuery, EmptyStreetInfo, EmptyStreetResolver, EmptyStreetStrategy, StreetScan,
    StreetResolutionError, find_state_by_name, resolve_city, resolve_named_street,
};
pub use selection::{
    Selection, SelectionListener, SelectionProvider, SelectionStatus, resolve_selection,
};
