//! End-to-end apply invocation.
//!
//! [`PlaceCity::apply`] validates the operator's input, resolves the
//! destination city and its empty street once, then hands every selected
//! venue to the [`Reassigner`]. Input and city failures abort the run before
//! any venue is touched; everything after that is reported through the
//! returned [`ApplyReport`].

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use log::warn;
use serde::Serialize;
use thiserror::Error;

use crate::host::HostDataApi;
use crate::model::{City, VenueId};
use crate::reassign::{CityNameMatch, Reassigner};
use crate::recents::{KeyValueStore, RecentCities, RecentCity, RecentsStore};
use crate::report::{ApplyLog, OutcomeTally};
use crate::resolve::{
    CityResolutionError, EmptyStreetInfo, EmptyStreetResolver, find_state_by_name, resolve_city,
};

/// Operator input for one apply invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyRequest {
    /// Destination city name.
    pub city: String,
    /// Optional state name used to disambiguate the city.
    pub state: Option<String>,
}

impl ApplyRequest {
    /// Request for `city` without a state.
    pub fn new(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            state: None,
        }
    }

    /// Add a state disambiguator.
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }
}

/// Errors that abort an apply invocation.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// No destination city was entered.
    #[error("Please enter a target city.")]
    MissingCity,
    /// No venues are selected.
    #[error("Select at least one place.")]
    NoSelection,
    /// Another apply invocation is still running.
    #[error("An apply run is already in progress.")]
    InProgress,
    /// The destination city could not be found or created.
    #[error("Could not resolve or create target city.")]
    CityUnavailable(#[source] CityResolutionError),
}

/// Result of a completed apply invocation.
#[derive(Debug, Clone, Serialize)]
pub struct ApplyReport {
    /// Destination city.
    pub city: City,
    /// Empty street used for street-less venues, if one was found.
    pub empty_street: Option<EmptyStreetInfo>,
    /// Outcome counts.
    pub tally: OutcomeTally,
    /// Operator-facing log, ending with the summary line.
    pub log: ApplyLog,
}

/// Apply engine with its resolution policy and optional recents store.
///
/// Only one invocation runs at a time; a call made while another is still in
/// progress (for example from a host callback) is rejected.
pub struct PlaceCity<S = crate::recents::MemoryKeyValueStore> {
    resolver: EmptyStreetResolver,
    reassigner: Reassigner,
    recents: Option<Mutex<RecentsStore<S>>>,
    running: AtomicBool,
}

impl<S> std::fmt::Debug for PlaceCity<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaceCity")
            .field("resolver", &self.resolver)
            .field("reassigner", &self.reassigner)
            .field("recents", &self.recents.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for PlaceCity {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaceCity {
    /// Engine with default strategies and no recents store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_parts(EmptyStreetResolver::default(), None)
    }
}

impl<S: KeyValueStore> PlaceCity<S> {
    /// Engine with explicit empty-street strategies and recents store.
    #[must_use]
    pub fn with_parts(resolver: EmptyStreetResolver, recents: Option<RecentsStore<S>>) -> Self {
        Self {
            resolver,
            reassigner: Reassigner::default(),
            recents: recents.map(Mutex::new),
            running: AtomicBool::new(false),
        }
    }

    /// Engine that records destinations in `recents`.
    #[must_use]
    pub fn with_recents(recents: RecentsStore<S>) -> Self {
        Self::with_parts(EmptyStreetResolver::default(), Some(recents))
    }

    /// Use `city_match` when deciding whether a venue is already in place.
    #[must_use]
    pub fn city_match(mut self, city_match: CityNameMatch) -> Self {
        self.reassigner = Reassigner::new(city_match);
        self
    }

    /// Remembered destinations, newest first. Empty without a recents store.
    pub fn recent_cities(&self) -> RecentCities {
        self.recents
            .as_ref()
            .and_then(|recents| recents.lock().ok().map(|store| store.load()))
            .unwrap_or_default()
    }

    fn remember(&self, entry: RecentCity) {
        let Some(recents) = self.recents.as_ref() else {
            return;
        };
        let Ok(mut store) = recents.lock() else {
            warn!("recent cities store poisoned; skipping update");
            return;
        };
        if let Err(err) = store.remember(entry) {
            warn!("failed to record recent city: {err}");
        }
    }

    /// Move `venues` into the requested city.
    ///
    /// # Errors
    /// Returns [`ApplyError`] for missing input, a concurrent run, or an
    /// unresolvable city. Per-venue failures are reported in the
    /// [`ApplyReport`] instead.
    pub fn apply(
        &self,
        host: &mut dyn HostDataApi,
        request: &ApplyRequest,
        venues: &[VenueId],
    ) -> Result<ApplyReport, ApplyError> {
        let city_name = request.city.trim();
        if city_name.is_empty() {
            return Err(ApplyError::MissingCity);
        }
        if venues.is_empty() {
            return Err(ApplyError::NoSelection);
        }
        let _guard = RunGuard::acquire(&self.running)?;

        let mut log = ApplyLog::new();
        let state_name = request.state.as_deref().map(str::trim).unwrap_or_default();
        let state = find_state_by_name(host, state_name);
        if state.is_none() && !state_name.is_empty() {
            log.warn(format!(
                "  · State \"{state_name}\" not found; continuing without a state."
            ));
        }

        let city = resolve_city(host, city_name, state.as_ref(), &mut log)
            .map_err(ApplyError::CityUnavailable)?;

        self.remember(RecentCity::new(
            city_name,
            state.as_ref().map(|s| s.name.clone()).unwrap_or_default(),
        ));

        let empty_street = self.resolver.resolve(host, city.id);
        match &empty_street {
            Some(info) => log.info(format!("  · Empty street available via: {}", info.strategy)),
            None => log.warn(format!(
                "  · Could not resolve/create an empty street in {}. \
                 No-street places may be skipped on this deployment.",
                city.name
            )),
        }

        let tally = self
            .reassigner
            .reassign(host, venues, &city, empty_street.as_ref(), &mut log);
        log.info(tally.summary());
        log.info("Review your edits, then save.");

        Ok(ApplyReport {
            city,
            empty_street,
            tally,
            log,
        })
    }
}

/// Marks an apply run as active until dropped.
struct RunGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, ApplyError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ApplyError::InProgress)?;
        Ok(Self { flag })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
