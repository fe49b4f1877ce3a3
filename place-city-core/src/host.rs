//! Capability traits for the host map-data API.
//!
//! Host deployments expose different subsets of the map-data API. Every
//! optional capability is a trait method whose default body returns
//! [`HostError::Unsupported`], so an implementation only overrides what it
//! actually offers and callers work around the gaps.

use thiserror::Error;

use crate::model::{
    AddressUpdate, City, CityId, Country, CountryId, State, StateId, Street, VenueAddress, VenueId,
};

/// Errors reported by a host capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The host does not offer this capability.
    #[error("host does not support {0}")]
    Unsupported(&'static str),
    /// A referenced entity does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of entity that was looked up.
        entity: &'static str,
        /// Identifier that failed to resolve.
        id: String,
    },
    /// The host refused the call.
    #[error("host rejected the call: {0}")]
    Rejected(String),
}

impl HostError {
    /// Whether the error only signals a missing capability.
    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }
}

/// Result alias for host calls.
pub type HostResult<T> = Result<T, HostError>;

/// How a street name is passed to the host.
///
/// Hosts distinguish an omitted name from an explicit null and from text, so
/// the creation attempts need all three shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreetNameField {
    /// The name is not supplied at all.
    Absent,
    /// The name is supplied as an explicit null.
    Null,
    /// The name is supplied as text, possibly blank.
    Text(String),
}

impl StreetNameField {
    /// Text of the name, when supplied.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Absent | Self::Null => None,
        }
    }
}

/// Street lookup filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreetQuery {
    /// City to search within.
    pub city_id: CityId,
    /// Exact street name to match.
    pub name: StreetNameField,
    /// Explicit empty-street marker to match.
    pub is_empty: Option<bool>,
}

impl StreetQuery {
    /// Query for a street with an exact name.
    #[must_use]
    pub fn named(city_id: CityId, name: &str) -> Self {
        Self {
            city_id,
            name: StreetNameField::Text(name.to_owned()),
            is_empty: None,
        }
    }
}

/// Street creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStreet {
    /// City the street is created in.
    pub city_id: CityId,
    /// Street name as passed to the host.
    pub name: StreetNameField,
    /// Explicit empty-street marker.
    pub is_empty: Option<bool>,
}

/// City lookup filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityQuery {
    /// Exact city name.
    pub name: String,
    /// Country context, when known.
    pub country_id: Option<CountryId>,
    /// State disambiguator, when supplied.
    pub state_id: Option<StateId>,
}

/// City creation request.
pub type NewCity = CityQuery;

/// Venue address reads and writes.
pub trait VenueData {
    /// Read a venue's current address. `Ok(None)` when the host has none.
    fn venue_address(&self, venue: &VenueId) -> HostResult<Option<VenueAddress>>;

    /// Replace a venue's street and house number.
    fn update_venue_address(&mut self, update: &AddressUpdate) -> HostResult<()>;
}

/// Street queries and creation.
pub trait StreetData {
    /// Return the city's empty street through a dedicated getter.
    fn empty_street(&self, _city: CityId) -> HostResult<Option<Street>> {
        Err(HostError::Unsupported("empty street getter"))
    }

    /// Find a single street matching `query`.
    fn find_street(&self, _query: &StreetQuery) -> HostResult<Option<Street>> {
        Err(HostError::Unsupported("street query"))
    }

    /// Every street the host currently has loaded.
    fn all_streets(&self) -> HostResult<Vec<Street>> {
        Err(HostError::Unsupported("street listing"))
    }

    /// Create the city's empty street through a dedicated constructor.
    fn add_empty_street(&mut self, _city: CityId) -> HostResult<Option<Street>> {
        Err(HostError::Unsupported("empty street constructor"))
    }

    /// Create a street. `Ok(None)` when the host accepted the call but
    /// returned no record.
    fn add_street(&mut self, _street: &NewStreet) -> HostResult<Option<Street>> {
        Err(HostError::Unsupported("street constructor"))
    }
}

/// City queries and creation.
pub trait CityData {
    /// Find a city by exact name, country and state.
    fn find_city(&self, _query: &CityQuery) -> HostResult<Option<City>> {
        Err(HostError::Unsupported("city query"))
    }

    /// Create a city.
    fn add_city(&mut self, city: &NewCity) -> HostResult<Option<City>>;
}

/// State listings.
pub trait StateData {
    /// All states, excluding the host's "no state" placeholder.
    fn states_without_default(&self) -> HostResult<Vec<State>> {
        Err(HostError::Unsupported("state listing without default"))
    }

    /// All states, possibly including the "no state" placeholder.
    fn all_states(&self) -> HostResult<Vec<State>> {
        Err(HostError::Unsupported("state listing"))
    }
}

/// Country context.
pub trait CountryData {
    /// The top-level country new cities are created in.
    fn top_country(&self) -> HostResult<Option<Country>> {
        Err(HostError::Unsupported("top country"))
    }
}

/// Full host map-data API.
///
/// Implemented automatically for anything offering the five capability
/// groups, and usable as a trait object.
pub trait HostDataApi: VenueData + StreetData + CityData + StateData + CountryData {}

impl<T> HostDataApi for T where
    T: VenueData + StreetData + CityData + StateData + CountryData + ?Sized
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct Bare;

    impl StreetData for Bare {}
    impl CountryData for Bare {}

    #[rstest]
    fn optional_capabilities_default_to_unsupported() {
        let host = Bare;
        let err = host.empty_street(CityId(1)).expect_err("unsupported");
        assert!(err.is_unsupported());
        let err = host.top_country().expect_err("unsupported");
        assert_eq!(err, HostError::Unsupported("top country"));
    }

    #[rstest]
    fn rejected_is_not_unsupported() {
        assert!(!HostError::Rejected("locked".into()).is_unsupported());
    }
}
