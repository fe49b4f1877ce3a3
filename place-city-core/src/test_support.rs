//! Fixtures shared by unit, behaviour, and CLI tests.

use crate::memory::{HostCapabilities, MemoryHost};
use crate::model::{Country, CountryId, VenueId};
use crate::recents::{KeyValueStore, RecentsError};

/// City the fixture venues start in.
pub const ORIGIN_CITY: &str = "Shelbyville";
/// Street the fixture venue with a street sits on.
pub const ORIGIN_STREET: &str = "Evergreen Terrace";
/// Venue on [`ORIGIN_STREET`] with house number `742`.
pub const STREET_VENUE: &str = "venue-street";
/// Venue with no street and the origin city recorded as text.
pub const BLANK_VENUE: &str = "venue-blank";

/// Host with one named-street venue and one street-less venue in
/// [`ORIGIN_CITY`], answering only the given capabilities.
#[must_use]
pub fn origin_host(capabilities: HostCapabilities) -> MemoryHost {
    let mut host = MemoryHost::with_capabilities(capabilities);
    host.set_top_country(Country {
        id: CountryId(1),
        name: "United States".into(),
    });
    let origin = host.insert_city(ORIGIN_CITY, None);
    let street = host.insert_street(origin.id, Some(ORIGIN_STREET));
    host.insert_venue(
        VenueId::from(STREET_VENUE),
        Some("742"),
        Some(street.id),
        None,
    );
    host.insert_venue(VenueId::from(BLANK_VENUE), None, None, Some(ORIGIN_CITY));
    host
}

/// Both fixture venues, street venue first.
#[must_use]
pub fn origin_venues() -> Vec<VenueId> {
    vec![VenueId::from(STREET_VENUE), VenueId::from(BLANK_VENUE)]
}

/// Key-value store whose reads succeed empty and whose writes always fail.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadOnlyStore;

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, _key: &str) -> Result<Option<String>, RecentsError> {
        Ok(None)
    }

    fn put(&mut self, key: &str, _value: String) -> Result<(), RecentsError> {
        Err(RecentsError::Write {
            key: key.to_owned(),
            message: "store is read-only".into(),
        })
    }
}
