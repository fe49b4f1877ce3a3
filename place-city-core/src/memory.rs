//! In-memory host used by the CLI and by tests.
//!
//! [`MemoryHost`] is a serde-serialisable snapshot of map data. Its
//! [`HostCapabilities`] switch individual host calls off so deployments with
//! partial API support can be reproduced. Lookup calls on the street API are
//! counted in [`CallCounts`].

use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::host::{
    CityData, CityQuery, CountryData, HostError, HostResult, NewCity, NewStreet, StateData,
    StreetData, StreetNameField, StreetQuery, VenueData,
};
use crate::model::{
    AddressCity, AddressUpdate, City, CityId, Country, State, StateId, Street, StreetId,
    VenueAddress, VenueId, is_blank,
};
use crate::selection::{Selection, SelectionListener, SelectionProvider};

/// Host calls a [`MemoryHost`] answers. Everything is on by default.
#[expect(
    clippy::struct_excessive_bools,
    reason = "each flag toggles one independent host capability"
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostCapabilities {
    /// Venue address updates.
    pub venue_updates: bool,
    /// Top-level country lookup.
    pub top_country: bool,
    /// City lookup by name.
    pub city_query: bool,
    /// City creation.
    pub city_creation: bool,
    /// State listing without the "no state" entry.
    pub states_without_default: bool,
    /// Full state listing.
    pub all_states: bool,
    /// Dedicated empty-street getter.
    pub empty_street_getter: bool,
    /// Street lookup by filter.
    pub street_query: bool,
    /// Street lookup honours the empty marker.
    pub empty_marker_filter: bool,
    /// Listing every loaded street.
    pub street_listing: bool,
    /// Dedicated empty-street constructor.
    pub empty_street_constructor: bool,
    /// Generic street constructor.
    pub street_constructor: bool,
    /// Generic constructor honours the empty marker.
    pub empty_marker_on_create: bool,
    /// Generic constructor accepts blank names.
    pub blank_street_names: bool,
    /// Generic constructor accepts null names.
    pub null_street_names: bool,
    /// Generic constructor accepts requests that omit the name.
    pub nameless_streets: bool,
    /// Selection snapshot query.
    pub selection_snapshot: bool,
    /// Selection change notifications.
    pub selection_events: bool,
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self {
            venue_updates: true,
            top_country: true,
            city_query: true,
            city_creation: true,
            states_without_default: true,
            all_states: true,
            empty_street_getter: true,
            street_query: true,
            empty_marker_filter: true,
            street_listing: true,
            empty_street_constructor: true,
            street_constructor: true,
            empty_marker_on_create: true,
            blank_street_names: true,
            null_street_names: true,
            nameless_streets: true,
            selection_snapshot: true,
            selection_events: true,
        }
    }
}

impl HostCapabilities {
    /// Venue updates, city lookup and creation, and the selection snapshot.
    /// No street call is answered.
    #[must_use]
    pub const fn minimal() -> Self {
        Self {
            venue_updates: true,
            top_country: false,
            city_query: true,
            city_creation: true,
            states_without_default: false,
            all_states: false,
            empty_street_getter: false,
            street_query: false,
            empty_marker_filter: false,
            street_listing: false,
            empty_street_constructor: false,
            street_constructor: false,
            empty_marker_on_create: false,
            blank_street_names: false,
            null_street_names: false,
            nameless_streets: false,
            selection_snapshot: true,
            selection_events: false,
        }
    }

    /// Named streets can be looked up and created, but nothing yields an
    /// empty street.
    #[must_use]
    pub const fn without_empty_streets() -> Self {
        Self {
            empty_street_getter: false,
            empty_marker_filter: false,
            street_listing: false,
            empty_street_constructor: false,
            empty_marker_on_create: false,
            blank_street_names: false,
            null_street_names: false,
            nameless_streets: false,
            ..Self::minimal()
        }
        .with_named_streets()
    }

    const fn with_named_streets(mut self) -> Self {
        self.street_query = true;
        self.street_constructor = true;
        self
    }
}

/// Number of street API calls answered, per capability.
#[derive(Debug, Clone, Default)]
pub struct CallCounts {
    /// Empty-street getter calls.
    pub empty_street: Cell<usize>,
    /// Street filter queries.
    pub find_street: Cell<usize>,
    /// Street listings.
    pub all_streets: Cell<usize>,
    /// Empty-street constructor calls.
    pub add_empty_street: Cell<usize>,
    /// Generic street constructor calls.
    pub add_street: Cell<usize>,
}

fn bump(counter: &Cell<usize>) {
    counter.set(counter.get() + 1);
}

/// Stored venue record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueRecord {
    /// House number.
    #[serde(default)]
    pub house_number: Option<String>,
    /// Linked street.
    #[serde(default)]
    pub street_id: Option<StreetId>,
    /// Recorded city text, used only while no street is linked.
    #[serde(default)]
    pub city: Option<String>,
}

#[derive(Default)]
struct Listeners(Vec<SelectionListener>);

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} listener(s)", self.0.len())
    }
}

/// Map data held in memory.
///
/// # Examples
/// ```
/// use place_city_core::{MemoryHost, VenueData, VenueId};
///
/// let mut host = MemoryHost::default();
/// let city = host.insert_city("Springfield", None);
/// let street = host.insert_street(city.id, Some("Elm St"));
/// let venue = VenueId::from("v1");
/// host.insert_venue(venue.clone(), Some("5"), Some(street.id), None);
///
/// let address = host.venue_address(&venue).unwrap().unwrap();
/// assert_eq!(address.street_name(), Some("Elm St"));
/// assert_eq!(address.city.unwrap().name, "Springfield");
/// ```
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryHost {
    /// Calls this host answers.
    pub capabilities: HostCapabilities,
    /// Country new cities are created in.
    pub top_country: Option<Country>,
    /// Known states.
    pub states: Vec<State>,
    /// Known cities.
    pub cities: Vec<City>,
    /// Known streets.
    pub streets: Vec<Street>,
    /// Venues keyed by id.
    pub venues: BTreeMap<VenueId, VenueRecord>,
    /// Currently selected venues.
    pub selection: Vec<VenueId>,
    /// Venues whose address updates are refused.
    pub locked_venues: BTreeSet<VenueId>,
    #[serde(skip)]
    calls: CallCounts,
    #[serde(skip)]
    listeners: Listeners,
}

impl MemoryHost {
    /// An empty host answering only the given capabilities.
    #[must_use]
    pub fn with_capabilities(capabilities: HostCapabilities) -> Self {
        Self {
            capabilities,
            ..Self::default()
        }
    }

    /// Calls answered so far.
    #[must_use]
    pub const fn calls(&self) -> &CallCounts {
        &self.calls
    }

    /// Set the top-level country.
    pub fn set_top_country(&mut self, country: Country) {
        self.top_country = Some(country);
    }

    /// Add a state.
    pub fn insert_state(&mut self, state: State) {
        self.states.push(state);
    }

    /// Add a city in the top-level country.
    pub fn insert_city(&mut self, name: &str, state_id: Option<StateId>) -> City {
        let city = City {
            id: CityId(next_id(self.cities.iter().map(|c| c.id.0))),
            name: name.to_owned(),
            state_id,
            country_id: self.top_country.as_ref().map(|country| country.id),
        };
        self.cities.push(city.clone());
        city
    }

    /// Add a street. A missing or blank name makes it the city's empty
    /// street, flagged with the explicit marker.
    pub fn insert_street(&mut self, city_id: CityId, name: Option<&str>) -> Street {
        let street = Street {
            id: StreetId(next_id(self.streets.iter().map(|s| s.id.0))),
            city_id,
            name: name.map(str::to_owned),
            display_name: None,
            is_empty: Some(name.is_none_or(is_blank)),
        };
        self.streets.push(street.clone());
        street
    }

    /// Add or replace a venue.
    pub fn insert_venue(
        &mut self,
        id: VenueId,
        house_number: Option<&str>,
        street_id: Option<StreetId>,
        city: Option<&str>,
    ) {
        self.venues.insert(
            id,
            VenueRecord {
                house_number: house_number.map(str::to_owned),
                street_id,
                city: city.map(str::to_owned),
            },
        );
    }

    /// Replace the selection and notify listeners.
    pub fn select(&mut self, ids: Vec<VenueId>) {
        self.selection = ids;
        for listener in &mut self.listeners.0 {
            listener(&self.selection);
        }
    }

    /// Look a street up by id.
    #[must_use]
    pub fn street(&self, id: StreetId) -> Option<&Street> {
        self.streets.iter().find(|street| street.id == id)
    }

    /// Look a city up by id.
    #[must_use]
    pub fn city(&self, id: CityId) -> Option<&City> {
        self.cities.iter().find(|city| city.id == id)
    }

    fn streets_in(&self, city: CityId) -> impl Iterator<Item = &Street> {
        self.streets.iter().filter(move |street| street.city_id == city)
    }

    fn existing_empty_street(&self, city: CityId) -> Option<Street> {
        self.streets_in(city).find(|s| s.reports_empty()).cloned()
    }

    /// The city's empty street, created on first use. The host keeps one per
    /// city.
    fn empty_street_for(&mut self, city: CityId, name: Option<&str>) -> HostResult<Street> {
        self.require_city(city)?;
        if let Some(existing) = self.existing_empty_street(city) {
            return Ok(existing);
        }
        let street = Street {
            id: StreetId(next_id(self.streets.iter().map(|s| s.id.0))),
            city_id: city,
            name: name.map(str::to_owned),
            display_name: Some(String::new()),
            is_empty: Some(true),
        };
        self.streets.push(street.clone());
        Ok(street)
    }

    fn require_city(&self, city: CityId) -> HostResult<()> {
        if self.city(city).is_some() {
            Ok(())
        } else {
            Err(HostError::NotFound {
                entity: "city",
                id: city.to_string(),
            })
        }
    }
}

/// One past the highest id in use, or the lowest free positive id once the
/// highest id is `i64::MAX`.
fn next_id(existing: impl Iterator<Item = i64>) -> i64 {
    let used: BTreeSet<i64> = existing.collect();
    let Some(highest) = used.last() else {
        return 1;
    };
    highest
        .checked_add(1)
        .unwrap_or_else(|| (1..).find(|id| !used.contains(id)).unwrap_or_default())
}

const fn supported(flag: bool, capability: &'static str) -> HostResult<()> {
    if flag {
        Ok(())
    } else {
        Err(HostError::Unsupported(capability))
    }
}

impl VenueData for MemoryHost {
    fn venue_address(&self, venue: &VenueId) -> HostResult<Option<VenueAddress>> {
        let Some(record) = self.venues.get(venue) else {
            return Ok(None);
        };
        let street = record.street_id.and_then(|id| self.street(id)).cloned();
        let city = match &street {
            Some(street) => self.city(street.city_id).map(|city| AddressCity {
                id: Some(city.id),
                name: city.name.clone(),
            }),
            None => record.city.as_ref().map(|name| AddressCity {
                id: None,
                name: name.clone(),
            }),
        };
        Ok(Some(VenueAddress {
            house_number: record.house_number.clone(),
            street,
            city,
        }))
    }

    fn update_venue_address(&mut self, update: &AddressUpdate) -> HostResult<()> {
        supported(self.capabilities.venue_updates, "venue address updates")?;
        if self.locked_venues.contains(&update.venue_id) {
            return Err(HostError::Rejected(format!(
                "venue {} is locked",
                update.venue_id
            )));
        }
        if self.street(update.street_id).is_none() {
            return Err(HostError::NotFound {
                entity: "street",
                id: update.street_id.to_string(),
            });
        }
        let record = self
            .venues
            .get_mut(&update.venue_id)
            .ok_or_else(|| HostError::NotFound {
                entity: "venue",
                id: update.venue_id.to_string(),
            })?;
        record.house_number.clone_from(&update.house_number);
        record.street_id = Some(update.street_id);
        record.city = None;
        Ok(())
    }
}

impl StreetData for MemoryHost {
    fn empty_street(&self, city: CityId) -> HostResult<Option<Street>> {
        bump(&self.calls.empty_street);
        supported(self.capabilities.empty_street_getter, "empty street getter")?;
        Ok(self.existing_empty_street(city))
    }

    fn find_street(&self, query: &StreetQuery) -> HostResult<Option<Street>> {
        bump(&self.calls.find_street);
        supported(self.capabilities.street_query, "street query")?;
        if query.is_empty == Some(true) {
            supported(self.capabilities.empty_marker_filter, "empty marker filter")?;
            return Ok(self.existing_empty_street(query.city_id));
        }
        let wanted = query.name.text();
        Ok(self
            .streets_in(query.city_id)
            .find(|street| street.name.as_deref() == wanted)
            .cloned())
    }

    fn all_streets(&self) -> HostResult<Vec<Street>> {
        bump(&self.calls.all_streets);
        supported(self.capabilities.street_listing, "street listing")?;
        Ok(self.streets.clone())
    }

    fn add_empty_street(&mut self, city: CityId) -> HostResult<Option<Street>> {
        bump(&self.calls.add_empty_street);
        supported(
            self.capabilities.empty_street_constructor,
            "empty street constructor",
        )?;
        self.empty_street_for(city, Some("")).map(Some)
    }

    fn add_street(&mut self, street: &NewStreet) -> HostResult<Option<Street>> {
        bump(&self.calls.add_street);
        supported(self.capabilities.street_constructor, "street constructor")?;
        if street.name == StreetNameField::Absent {
            supported(self.capabilities.nameless_streets, "nameless streets")?;
        }
        if street.is_empty == Some(true) {
            supported(self.capabilities.empty_marker_on_create, "empty marker")?;
            return self
                .empty_street_for(street.city_id, street.name.text())
                .map(Some);
        }
        match &street.name {
            StreetNameField::Absent => Err(HostError::Rejected("street name is required".into())),
            StreetNameField::Null => {
                supported(self.capabilities.null_street_names, "null street names")?;
                self.empty_street_for(street.city_id, None).map(Some)
            }
            StreetNameField::Text(name) if is_blank(name) => {
                supported(self.capabilities.blank_street_names, "blank street names")?;
                self.empty_street_for(street.city_id, Some("")).map(Some)
            }
            StreetNameField::Text(name) => {
                self.require_city(street.city_id)?;
                let existing = self
                    .streets_in(street.city_id)
                    .find(|s| s.name.as_deref() == Some(name.as_str()))
                    .cloned();
                Ok(Some(existing.unwrap_or_else(|| {
                    self.insert_street(street.city_id, Some(name))
                })))
            }
        }
    }
}

impl CityData for MemoryHost {
    fn find_city(&self, query: &CityQuery) -> HostResult<Option<City>> {
        supported(self.capabilities.city_query, "city query")?;
        Ok(self
            .cities
            .iter()
            .find(|city| {
                city.name == query.name
                    && city.state_id == query.state_id
                    && (query.country_id.is_none() || city.country_id == query.country_id)
            })
            .cloned())
    }

    fn add_city(&mut self, city: &NewCity) -> HostResult<Option<City>> {
        supported(self.capabilities.city_creation, "city creation")?;
        let created = City {
            id: CityId(next_id(self.cities.iter().map(|c| c.id.0))),
            name: city.name.clone(),
            state_id: city.state_id,
            country_id: city.country_id,
        };
        self.cities.push(created.clone());
        Ok(Some(created))
    }
}

impl StateData for MemoryHost {
    fn states_without_default(&self) -> HostResult<Vec<State>> {
        supported(
            self.capabilities.states_without_default,
            "state listing without default",
        )?;
        Ok(self.states.clone())
    }

    fn all_states(&self) -> HostResult<Vec<State>> {
        supported(self.capabilities.all_states, "state listing")?;
        let mut states = vec![State {
            id: StateId(0),
            name: String::new(),
        }];
        states.extend(self.states.iter().cloned());
        Ok(states)
    }
}

impl CountryData for MemoryHost {
    fn top_country(&self) -> HostResult<Option<Country>> {
        supported(self.capabilities.top_country, "top country")?;
        Ok(self.top_country.clone())
    }
}

impl SelectionProvider for MemoryHost {
    fn current_selection(&self) -> HostResult<Option<Selection>> {
        supported(self.capabilities.selection_snapshot, "selection snapshot")?;
        Ok(Some(Selection::venues(self.selection.clone())))
    }

    fn selected_venue_ids(&self) -> HostResult<Vec<VenueId>> {
        Ok(self.selection.clone())
    }

    fn subscribe(&mut self, listener: SelectionListener) -> HostResult<()> {
        supported(self.capabilities.selection_events, "selection notifications")?;
        self.listeners.0.push(listener);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::resolve_selection;
    use rstest::rstest;
    use std::rc::Rc;

    #[rstest]
    fn update_moves_venue_and_drops_recorded_city() {
        let mut host = MemoryHost::default();
        let city = host.insert_city("Springfield", None);
        let street = host.insert_street(city.id, Some("Elm St"));
        let venue = VenueId::from("v1");
        host.insert_venue(venue.clone(), Some("5"), None, Some("Shelbyville"));

        host.update_venue_address(&AddressUpdate {
            venue_id: venue.clone(),
            house_number: Some("5".into()),
            street_id: street.id,
        })
        .expect("updated");

        let address = host.venue_address(&venue).expect("read").expect("present");
        assert_eq!(address.street_name(), Some("Elm St"));
        assert_eq!(address.city.map(|c| c.name).as_deref(), Some("Springfield"));
    }

    #[rstest]
    fn locked_venues_reject_updates() {
        let mut host = MemoryHost::default();
        let city = host.insert_city("Springfield", None);
        let street = host.insert_street(city.id, Some("Elm St"));
        let venue = VenueId::from("v4");
        host.insert_venue(venue.clone(), None, None, None);
        host.locked_venues.insert(venue.clone());

        let err = host
            .update_venue_address(&AddressUpdate {
                venue_id: venue,
                house_number: None,
                street_id: street.id,
            })
            .expect_err("locked");
        assert!(matches!(err, HostError::Rejected(_)));
    }

    #[rstest]
    fn empty_street_is_unique_per_city() {
        let mut host = MemoryHost::default();
        let city = host.insert_city("Springfield", None);
        let first = host.add_empty_street(city.id).expect("ok").expect("street");
        let second = host
            .add_street(&NewStreet {
                city_id: city.id,
                name: StreetNameField::Null,
                is_empty: None,
            })
            .expect("ok")
            .expect("street");
        assert_eq!(first.id, second.id);
    }

    #[rstest]
    fn with_capabilities_starts_empty() {
        let host = MemoryHost::with_capabilities(HostCapabilities::minimal());
        assert_eq!(host.capabilities, HostCapabilities::minimal());
        assert!(host.cities.is_empty());
        assert_eq!(host.calls().add_street.get(), 0);
    }

    #[rstest]
    fn ids_stay_unique_after_the_highest_id() {
        let mut host = MemoryHost::default();
        host.cities.push(City {
            id: CityId(i64::MAX),
            name: "Shelbyville".into(),
            state_id: None,
            country_id: None,
        });
        let first = host.insert_city("Springfield", None);
        let second = host.insert_city("Ogdenville", None);
        assert_eq!(first.id, CityId(1));
        assert_eq!(second.id, CityId(2));
    }

    #[rstest]
    fn nameless_requests_need_their_capability() {
        let mut host = MemoryHost::with_capabilities(HostCapabilities {
            nameless_streets: false,
            ..HostCapabilities::default()
        });
        let city = host.insert_city("Springfield", None);
        let err = host
            .add_street(&NewStreet {
                city_id: city.id,
                name: StreetNameField::Absent,
                is_empty: Some(true),
            })
            .expect_err("nameless");
        assert!(err.is_unsupported());
        let created = host
            .add_street(&NewStreet {
                city_id: city.id,
                name: StreetNameField::Text(String::new()),
                is_empty: Some(true),
            })
            .expect("ok")
            .expect("street");
        assert!(created.reports_empty());
    }

    #[rstest]
    fn full_state_listing_includes_placeholder() {
        let mut host = MemoryHost::default();
        host.insert_state(State {
            id: StateId(5),
            name: "Oregon".into(),
        });
        assert_eq!(host.all_states().expect("listed").len(), 2);
        assert_eq!(host.states_without_default().expect("listed").len(), 1);
    }

    #[rstest]
    fn listeners_see_new_selection() {
        let mut host = MemoryHost::default();
        let seen = Rc::new(Cell::new(0));
        let sink = Rc::clone(&seen);
        host.subscribe(Box::new(move |ids| sink.set(ids.len())))
            .expect("subscribed");
        host.select(vec![VenueId::from("a"), VenueId::from("b")]);
        assert_eq!(seen.get(), 2);
        assert_eq!(resolve_selection(&host).len(), 2);
    }

    #[rstest]
    fn snapshot_round_trips_through_json() {
        let mut host = MemoryHost::default();
        let city = host.insert_city("Springfield", None);
        host.insert_street(city.id, Some("Elm St"));
        host.capabilities.street_listing = false;
        let json = serde_json::to_string(&host).expect("serialise");
        let restored: MemoryHost = serde_json::from_str(&json).expect("deserialise");
        assert_eq!(restored.cities, host.cities);
        assert_eq!(restored.streets, host.streets);
        assert!(!restored.capabilities.street_listing);
    }
}
