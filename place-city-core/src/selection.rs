//! Selected-venue discovery and change notification.
//!
//! Selection is owned by the host. [`resolve_selection`] tries the selection
//! shapes a host may offer, and [`SelectionStatus`] turns the result into the
//! "apply enabled" indicator shown to the operator.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::host::{HostError, HostResult};
use crate::model::VenueId;

const VENUE_OBJECT_TYPE: &str = "venue";

/// A host selection snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Type of the selected objects, e.g. `venue` or `segment`.
    pub object_type: String,
    /// Identifiers of the selected objects.
    #[serde(default)]
    pub ids: Vec<VenueId>,
    /// Selected venues, for hosts that list them separately.
    #[serde(default)]
    pub venues: Vec<VenueId>,
}

impl Selection {
    /// A selection of venues by id.
    #[must_use]
    pub fn venues(ids: Vec<VenueId>) -> Self {
        Self {
            object_type: VENUE_OBJECT_TYPE.to_owned(),
            ids,
            venues: Vec::new(),
        }
    }

    /// Venue ids carried by the snapshot.
    ///
    /// Object ids count only when the selection is of venues; otherwise the
    /// separate venue list is used.
    #[must_use]
    pub fn venue_ids(&self) -> Vec<VenueId> {
        if self.object_type.eq_ignore_ascii_case(VENUE_OBJECT_TYPE) {
            let ids = non_blank(self.ids.iter().cloned());
            if !ids.is_empty() {
                return ids;
            }
        }
        non_blank(self.venues.iter().cloned())
    }
}

/// Callback invoked with the new venue selection.
pub type SelectionListener = Box<dyn FnMut(&[VenueId])>;

/// Host selection queries and change notification.
///
/// Every method is optional; hosts implement whichever shape they offer.
pub trait SelectionProvider {
    /// The current selection snapshot.
    fn current_selection(&self) -> HostResult<Option<Selection>> {
        Err(HostError::Unsupported("selection snapshot"))
    }

    /// Identifiers of the selected venue objects.
    fn selected_venues(&self) -> HostResult<Vec<VenueId>> {
        Err(HostError::Unsupported("selected venues"))
    }

    /// Identifiers of the selected venues from the venue data model.
    fn selected_venue_ids(&self) -> HostResult<Vec<VenueId>> {
        Err(HostError::Unsupported("selected venue ids"))
    }

    /// Register a listener called whenever the selection changes.
    fn subscribe(&mut self, _listener: SelectionListener) -> HostResult<()> {
        Err(HostError::Unsupported("selection notifications"))
    }
}

/// Selected venue ids, probing each selection shape in turn.
///
/// The first shape yielding a non-empty list wins; failures fall through.
pub fn resolve_selection(provider: &dyn SelectionProvider) -> Vec<VenueId> {
    let snapshot = provider
        .current_selection()
        .ok()
        .flatten()
        .map(|selection| selection.venue_ids())
        .unwrap_or_default();
    if !snapshot.is_empty() {
        return snapshot;
    }
    let venues = provider
        .selected_venues()
        .map(|ids| non_blank(ids.into_iter()))
        .unwrap_or_default();
    if !venues.is_empty() {
        return venues;
    }
    provider
        .selected_venue_ids()
        .map(|ids| non_blank(ids.into_iter()))
        .unwrap_or_default()
}

fn non_blank(ids: impl Iterator<Item = VenueId>) -> Vec<VenueId> {
    ids.filter(|id| !id.as_str().trim().is_empty()).collect()
}

/// Whether apply is currently possible, and the line shown for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionStatus {
    /// Number of selected venues.
    pub count: usize,
}

impl SelectionStatus {
    /// Status for a list of selected ids.
    #[must_use]
    pub const fn from_ids(ids: &[VenueId]) -> Self {
        Self { count: ids.len() }
    }

    /// Apply needs at least one venue.
    #[must_use]
    pub const fn apply_enabled(&self) -> bool {
        self.count > 0
    }
}

impl fmt::Display for SelectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.apply_enabled() {
            write!(f, "Selected {} place(s).", self.count)
        } else {
            f.write_str("No places selected.")
        }
    }
}
