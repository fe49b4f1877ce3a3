//! Map entities read and written through the host.
//!
//! The host owns every entity. Values here are snapshots handed out by
//! [`HostDataApi`](crate::HostDataApi) implementations and are never
//! persisted by this crate.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a [`City`].
    CityId
);
numeric_id!(
    /// Identifier of a [`State`].
    StateId
);
numeric_id!(
    /// Identifier of a [`Country`].
    CountryId
);
numeric_id!(
    /// Identifier of a [`Street`].
    StreetId
);

/// Identifier of a venue.
///
/// Hosts hand venue identifiers out as opaque strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VenueId(pub String);

impl VenueId {
    /// Borrow the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VenueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VenueId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for VenueId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A country known to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// Unique identifier.
    pub id: CountryId,
    /// Display name.
    pub name: String,
}

/// A state (or province) used to disambiguate cities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    /// Unique identifier.
    pub id: StateId,
    /// Display name.
    pub name: String,
}

/// A city that streets and venues belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    /// Unique identifier.
    pub id: CityId,
    /// Display name.
    pub name: String,
    /// Owning state, when the host tracks one.
    #[serde(default)]
    pub state_id: Option<StateId>,
    /// Owning country, when the host tracks one.
    #[serde(default)]
    pub country_id: Option<CountryId>,
}

/// A street within a city.
///
/// Hosts disagree on how the blank "empty street" is represented: some set an
/// explicit marker, others leave the name or display name blank. All three
/// are honoured by [`Street::reports_empty`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Street {
    /// Unique identifier.
    pub id: StreetId,
    /// City the street belongs to.
    pub city_id: CityId,
    /// Street name. `None` when the host exposes a null name.
    #[serde(default)]
    pub name: Option<String>,
    /// Name as rendered by the host, when it differs from `name`.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Explicit empty-street marker, when the host exposes one.
    #[serde(default)]
    pub is_empty: Option<bool>,
}

impl Street {
    /// Construct a named street without display name or marker.
    #[must_use]
    pub fn named(id: StreetId, city_id: CityId, name: impl Into<String>) -> Self {
        Self {
            id,
            city_id,
            name: Some(name.into()),
            display_name: None,
            is_empty: None,
        }
    }

    /// Whether the record describes itself as its city's empty street.
    ///
    /// # Examples
    /// ```
    /// use place_city_core::{CityId, Street, StreetId};
    ///
    /// let blank = Street::named(StreetId(1), CityId(7), "");
    /// assert!(blank.reports_empty());
    /// let main = Street::named(StreetId(2), CityId(7), "Main St");
    /// assert!(!main.reports_empty());
    /// ```
    #[must_use]
    pub fn reports_empty(&self) -> bool {
        self.is_empty == Some(true)
            || self.name.as_deref().is_some_and(is_blank)
            || self.display_name.as_deref().is_some_and(is_blank)
    }

    /// The street name when it is present and not blank.
    #[must_use]
    pub fn non_blank_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !is_blank(name))
    }
}

/// City text recorded on a venue's address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressCity {
    /// City identifier, when the host resolved one.
    #[serde(default)]
    pub id: Option<CityId>,
    /// Free-text city name.
    pub name: String,
}

/// A venue's address as reported by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueAddress {
    /// House number, if any.
    #[serde(default)]
    pub house_number: Option<String>,
    /// Linked street, if any.
    #[serde(default)]
    pub street: Option<Street>,
    /// Recorded city.
    #[serde(default)]
    pub city: Option<AddressCity>,
}

impl VenueAddress {
    /// Name of the linked street when it is present and not blank.
    #[must_use]
    pub fn street_name(&self) -> Option<&str> {
        self.street.as_ref().and_then(Street::non_blank_name)
    }

    /// House number with blank values treated as absent.
    #[must_use]
    pub fn house_number(&self) -> Option<&str> {
        self.house_number.as_deref().filter(|hn| !is_blank(hn))
    }
}

/// Replacement address written back to the host for one venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressUpdate {
    /// Venue being updated.
    pub venue_id: VenueId,
    /// House number to keep on the venue.
    pub house_number: Option<String>,
    /// Street to link the venue to.
    pub street_id: StreetId,
}

pub(crate) fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
