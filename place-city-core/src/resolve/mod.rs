//! Lookup-or-create resolution of destination entities.
//!
//! - [`find_state_by_name`] matches an optional state disambiguator.
//! - [`resolve_city`] finds or creates the destination city.
//! - [`resolve_named_street`] finds or creates a same-named street.
//! - [`EmptyStreetResolver`] asks the host for the city's blank street.

mod city;
mod empty_street;
mod state;
mod street;

pub use city::{CityResolutionError, resolve_city};
pub use empty_street::{
    BlankNameQuery, CreateEmptyStreet, CreationShape, DirectGetter, EmptyMarkerQuery,
    EmptyStreetInfo, EmptyStreetResolver, EmptyStreetStrategy, StreetScan,
};
pub use state::find_state_by_name;
pub use street::{StreetResolutionError, resolve_named_street};
