//! Per-venue city reassignment.
//!
//! Each venue ends in exactly one [`VenueOutcome`]. Failures stay inside the venue that raised them, so one
//! bad venue never stops the batch.

use deunicode::deunicode;
use thiserror::Error;

use crate::host::{HostDataApi, HostError};
use crate::model::{AddressUpdate, City, VenueAddress, VenueId};
use crate::report::{ApplyLog, LogLevel, OutcomeTally};
use crate::resolve::{EmptyStreetInfo, StreetResolutionError, resolve_named_street};

/// How a venue's recorded city name is compared with the target city.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CityNameMatch {
    /// Trimmed, case-insensitive exact match.
    #[default]
    CaseInsensitive,
    /// Additionally folds diacritics and ignores punctuation, so
    /// "Ciudad de México" matches "Ciudad de Mexico".
    Folded,
}

impl CityNameMatch {
    /// Whether `recorded` names the same city as `target`.
    ///
    /// A blank recorded name never matches.
    ///
    /// # Examples
    /// ```
    /// use place_city_core::CityNameMatch;
    ///
    /// assert!(CityNameMatch::CaseInsensitive.matches(" springfield ", "Springfield"));
    /// assert!(!CityNameMatch::CaseInsensitive.matches("Bogotá", "Bogota"));
    /// assert!(CityNameMatch::Folded.matches("Bogotá", "Bogota"));
    /// ```
    #[must_use]
    pub fn matches(self, recorded: &str, target: &str) -> bool {
        let recorded = self.key(recorded);
        !recorded.is_empty() && recorded == self.key(target)
    }

    fn key(self, name: &str) -> String {
        match self {
            Self::CaseInsensitive => name.trim().to_lowercase(),
            Self::Folded => deunicode(name)
                .chars()
                .filter(|c| c.is_alphanumeric() || c.is_whitespace())
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase(),
        }
    }
}

/// Terminal state of one venue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VenueOutcome {
    /// Already recorded in the target city; left untouched.
    AlreadyThere,
    /// Re-linked to the same-named street in the target city.
    MovedWithStreet {
        /// Street name kept on the venue.
        street: String,
    },
    /// Linked to the target city's empty street.
    MovedToEmptyStreet,
    /// No street and no empty street available; left untouched.
    Skipped,
    /// Processing failed.
    Failed(VenueError),
}

/// Per-venue failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VenueError {
    /// The host holds no address for the venue.
    #[error("address unavailable")]
    AddressUnavailable,
    /// Reading the address failed.
    #[error("failed to read address: {0}")]
    ReadAddress(#[source] HostError),
    /// The same-named street could not be resolved in the target city.
    #[error(transparent)]
    Street(#[from] StreetResolutionError),
    /// Writing the new address failed.
    #[error("failed to update address: {0}")]
    Update(#[source] HostError),
}

/// Moves venues into a target city one at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reassigner {
    city_match: CityNameMatch,
}

impl Reassigner {
    /// Create a reassigner with the given city-name comparison.
    #[must_use]
    pub const fn new(city_match: CityNameMatch) -> Self {
        Self { city_match }
    }

    /// Reassign every venue in `venues` to `target`.
    ///
    /// `empty_street` is resolved once by the caller and shared by every
    /// street-less venue. Updates are applied one by one as they are decided;
    /// nothing is saved.
    pub fn reassign(
        &self,
        host: &mut dyn HostDataApi,
        venues: &[VenueId],
        target: &City,
        empty_street: Option<&EmptyStreetInfo>,
        log: &mut ApplyLog,
    ) -> OutcomeTally {
        let mut tally = OutcomeTally::default();
        for venue in venues {
            let outcome = self.reassign_one(host, venue, target, empty_street, log);
            record(&mut tally, log, venue, target, &outcome);
        }
        tally
    }

    /// Decide and apply the outcome for a single venue.
    pub fn reassign_one(
        &self,
        host: &mut dyn HostDataApi,
        venue: &VenueId,
        target: &City,
        empty_street: Option<&EmptyStreetInfo>,
        log: &mut ApplyLog,
    ) -> VenueOutcome {
        match self.try_reassign(host, venue, target, empty_street, log) {
            Ok(outcome) => outcome,
            Err(err) => VenueOutcome::Failed(err),
        }
    }

    fn try_reassign(
        &self,
        host: &mut dyn HostDataApi,
        venue: &VenueId,
        target: &City,
        empty_street: Option<&EmptyStreetInfo>,
        log: &mut ApplyLog,
    ) -> Result<VenueOutcome, VenueError> {
        let address = host
            .venue_address(venue)
            .map_err(VenueError::ReadAddress)?
            .ok_or(VenueError::AddressUnavailable)?;

        if self.already_in(&address, target) {
            return Ok(VenueOutcome::AlreadyThere);
        }

        let house_number = address.house_number().map(str::to_owned);
        if let Some(name) = address.street_name() {
            let street = resolve_named_street(host, target, name, log)?;
            host.update_venue_address(&AddressUpdate {
                venue_id: venue.clone(),
                house_number,
                street_id: street.id,
            })
            .map_err(VenueError::Update)?;
            return Ok(VenueOutcome::MovedWithStreet {
                street: name.to_owned(),
            });
        }

        let Some(info) = empty_street else {
            return Ok(VenueOutcome::Skipped);
        };
        host.update_venue_address(&AddressUpdate {
            venue_id: venue.clone(),
            house_number,
            street_id: info.street.id,
        })
        .map_err(VenueError::Update)?;
        Ok(VenueOutcome::MovedToEmptyStreet)
    }

    fn already_in(&self, address: &VenueAddress, target: &City) -> bool {
        address.city.as_ref().is_some_and(|city| {
            city.id == Some(target.id) || self.city_match.matches(&city.name, &target.name)
        })
    }
}

fn record(
    tally: &mut OutcomeTally,
    log: &mut ApplyLog,
    venue: &VenueId,
    target: &City,
    outcome: &VenueOutcome,
) {
    let city = &target.name;
    match outcome {
        VenueOutcome::AlreadyThere => {
            tally.already_there += 1;
            log.venue(LogLevel::Info, venue, format!("already in {city}, skipped"));
        }
        VenueOutcome::MovedWithStreet { street } => {
            tally.changed += 1;
            log.venue(
                LogLevel::Info,
                venue,
                format!("city → {city} (street kept: \"{street}\")"),
            );
        }
        VenueOutcome::MovedToEmptyStreet => {
            tally.changed += 1;
            log.venue(
                LogLevel::Info,
                venue,
                format!("city → {city} (no street, kept blank)"),
            );
        }
        VenueOutcome::Skipped => {
            tally.skipped += 1;
            log.venue(
                LogLevel::Warn,
                venue,
                "no-street skipped (no empty street available on this deployment)",
            );
        }
        VenueOutcome::Failed(err) => {
            tally.errors += 1;
            log.venue(LogLevel::Error, venue, format!("error → {err}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::VenueData;
    use crate::memory::MemoryHost;
    use crate::model::{Street, StreetId};
    use crate::resolve::EmptyStreetResolver;
    use rstest::{fixture, rstest};

    struct Fixture {
        host: MemoryHost,
        target: City,
    }

    #[fixture]
    fn fixture() -> Fixture {
        let mut host = MemoryHost::default();
        let target = host.insert_city("Springfield", None);
        Fixture { host, target }
    }

    fn run(
        fx: &mut Fixture,
        venues: &[VenueId],
        empty: Option<&EmptyStreetInfo>,
    ) -> (OutcomeTally, ApplyLog) {
        let mut log = ApplyLog::new();
        let tally =
            Reassigner::default().reassign(&mut fx.host, venues, &fx.target, empty, &mut log);
        (tally, log)
    }

    #[rstest]
    fn keeps_street_name_and_house_number(mut fixture: Fixture) {
        let origin = fixture.host.insert_city("Shelbyville", None);
        let street = fixture.host.insert_street(origin.id, Some("Main St"));
        let venue = VenueId::from("v1");
        fixture
            .host
            .insert_venue(venue.clone(), Some("12"), Some(street.id), None);

        let (tally, _) = run(&mut fixture, std::slice::from_ref(&venue), None);

        assert_eq!(tally.changed, 1);
        let address = fixture.host.venue_address(&venue).expect("read").expect("some");
        assert_eq!(address.street_name(), Some("Main St"));
        assert_eq!(address.house_number(), Some("12"));
        let moved = address.street.expect("street");
        assert_eq!(moved.city_id, fixture.target.id);
        assert_ne!(moved.id, street.id);
    }

    #[rstest]
    fn recorded_city_name_match_is_already_there(mut fixture: Fixture) {
        let venue = VenueId::from("v2");
        fixture
            .host
            .insert_venue(venue.clone(), None, None, Some("  SPRINGFIELD"));
        let (tally, log) = run(&mut fixture, std::slice::from_ref(&venue), None);
        assert_eq!(tally.already_there, 1);
        assert_eq!(tally.changed + tally.skipped + tally.errors, 0);
        assert!(log.mentions("already in Springfield"));
    }

    #[rstest]
    fn street_less_venue_is_skipped_without_empty_street(mut fixture: Fixture) {
        let venue = VenueId::from("v3");
        fixture.host.insert_venue(venue.clone(), None, None, Some("Metropolis"));
        let (tally, log) = run(&mut fixture, std::slice::from_ref(&venue), None);
        assert_eq!(tally.skipped, 1);
        assert!(log.mentions("no-street skipped"));
    }

    #[rstest]
    fn street_less_venues_share_the_empty_street(mut fixture: Fixture) {
        let venues: Vec<VenueId> = ["a", "b", "c"].into_iter().map(VenueId::from).collect();
        for venue in &venues {
            fixture.host.insert_venue(venue.clone(), Some(""), None, Some("Elsewhere"));
        }
        let info = EmptyStreetResolver::default()
            .resolve(&mut fixture.host, fixture.target.id)
            .expect("resolved");

        let (tally, _) = run(&mut fixture, &venues, Some(&info));

        assert_eq!(tally.changed, 3);
        for venue in &venues {
            let address = fixture.host.venue_address(venue).expect("read").expect("some");
            assert_eq!(address.street.map(|s| s.id), Some(info.street.id));
            assert_eq!(address.house_number, None);
        }
    }

    #[rstest]
    fn failing_venue_does_not_stop_the_batch(mut fixture: Fixture) {
        let origin = fixture.host.insert_city("Shelbyville", None);
        let street = fixture.host.insert_street(origin.id, Some("Elm St"));
        let locked = VenueId::from("v4");
        let next = VenueId::from("v5");
        fixture.host.insert_venue(locked.clone(), None, Some(street.id), None);
        fixture.host.insert_venue(next.clone(), None, Some(street.id), None);
        fixture.host.locked_venues.insert(locked.clone());

        let (tally, log) = run(&mut fixture, &[locked.clone(), next], None);

        assert_eq!(tally.errors, 1);
        assert_eq!(tally.changed, 1);
        let entry = log.for_venue(&locked).next().expect("logged");
        assert_eq!(entry.level, LogLevel::Error);
        assert!(entry.message.contains("locked"));
    }

    #[rstest]
    fn unknown_venue_is_an_error(mut fixture: Fixture) {
        let (tally, log) = run(&mut fixture, &[VenueId::from("ghost")], None);
        assert_eq!(tally.errors, 1);
        assert!(log.mentions("address unavailable"));
    }

    #[rstest]
    fn city_id_match_wins_over_differing_text(mut fixture: Fixture) {
        let street = fixture.host.insert_street(fixture.target.id, Some("Elm St"));
        fixture.target.name = "Springfield (renamed)".into();
        let venue = VenueId::from("v6");
        fixture.host.insert_venue(venue.clone(), None, Some(street.id), None);
        let outcome = Reassigner::default().reassign_one(
            &mut fixture.host,
            &venue,
            &fixture.target,
            None,
            &mut ApplyLog::new(),
        );
        assert_eq!(outcome, VenueOutcome::AlreadyThere);
    }

    #[rstest]
    fn dangling_update_target_is_reported() {
        let mut host = MemoryHost::default();
        let target = host.insert_city("Springfield", None);
        let venue = VenueId::from("v7");
        host.insert_venue(venue.clone(), None, None, None);
        let bogus = EmptyStreetInfo {
            street: Street::named(StreetId(999), target.id, ""),
            strategy: "test",
        };
        let outcome = Reassigner::default().reassign_one(
            &mut host,
            &venue,
            &target,
            Some(&bogus),
            &mut ApplyLog::new(),
        );
        assert!(matches!(outcome, VenueOutcome::Failed(VenueError::Update(_))));
    }

    #[rstest]
    #[case(CityNameMatch::CaseInsensitive, "Ciudad de Mexico", false)]
    #[case(CityNameMatch::Folded, "Ciudad de Mexico", true)]
    #[case(CityNameMatch::Folded, "ciudad de méxico.", true)]
    #[case(CityNameMatch::CaseInsensitive, "", false)]
    fn name_matching_policies(
        #[case] policy: CityNameMatch,
        #[case] recorded: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(policy.matches(recorded, "Ciudad de México"), expected);
    }
}
