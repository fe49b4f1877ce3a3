//! Discovery and creation of a city's empty street.
//!
//! No single host call reliably yields the blank-named street, so resolution
//! walks an ordered list of [`EmptyStreetStrategy`] implementations. The
//! first strategy to produce an acceptable street wins; every failure,
//! including missing host support, falls through to the next strategy.

use log::debug;
use serde::Serialize;

use crate::host::{HostDataApi, HostResult, NewStreet, StreetNameField, StreetQuery};
use crate::model::{CityId, Street};

/// The resolved empty street and the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyStreetInfo {
    /// The city's empty street.
    pub street: Street,
    /// Name of the winning strategy, kept for diagnostics.
    pub strategy: &'static str,
}

/// One way of obtaining a city's empty street from the host.
pub trait EmptyStreetStrategy {
    /// Stable name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Attempt the strategy.
    ///
    /// `Ok(None)` and `Err(_)` both mean "this strategy did not work here";
    /// the resolver moves on either way. Implementations return only streets
    /// they accept as the empty street.
    fn attempt(&self, host: &mut dyn HostDataApi, city: CityId) -> HostResult<Option<Street>>;
}

/// Ask the host's dedicated empty-street getter.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectGetter;

impl EmptyStreetStrategy for DirectGetter {
    fn name(&self) -> &'static str {
        "empty-street-getter"
    }

    fn attempt(&self, host: &mut dyn HostDataApi, city: CityId) -> HostResult<Option<Street>> {
        host.empty_street(city)
    }
}

/// Query streets with the explicit empty marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyMarkerQuery;

impl EmptyStreetStrategy for EmptyMarkerQuery {
    fn name(&self) -> &'static str {
        "query(is-empty)"
    }

    fn attempt(&self, host: &mut dyn HostDataApi, city: CityId) -> HostResult<Option<Street>> {
        host.find_street(&StreetQuery {
            city_id: city,
            name: StreetNameField::Absent,
            is_empty: Some(true),
        })
    }
}

/// Query streets with a blank name, keeping the result only if it reports
/// itself as empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlankNameQuery;

impl EmptyStreetStrategy for BlankNameQuery {
    fn name(&self) -> &'static str {
        "query(blank-name)"
    }

    fn attempt(&self, host: &mut dyn HostDataApi, city: CityId) -> HostResult<Option<Street>> {
        let found = host.find_street(&StreetQuery::named(city, ""))?;
        Ok(found.filter(Street::reports_empty))
    }
}

/// Scan every loaded street for the city's empty one.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreetScan;

impl EmptyStreetStrategy for StreetScan {
    fn name(&self) -> &'static str {
        "scan(all-streets)"
    }

    fn attempt(&self, host: &mut dyn HostDataApi, city: CityId) -> HostResult<Option<Street>> {
        Ok(host
            .all_streets()?
            .into_iter()
            .find(|street| street.city_id == city && street.reports_empty()))
    }
}

/// Call shapes tried when creating the empty street.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationShape {
    /// Dedicated empty-street constructor.
    EmptyConstructor,
    /// Generic constructor with the empty marker and no name.
    EmptyMarker,
    /// Generic constructor with a blank name and the empty marker.
    BlankNameWithMarker,
    /// Generic constructor with a blank name.
    BlankName,
    /// Generic constructor with a null name.
    NullName,
}

impl CreationShape {
    /// Every shape in attempt order.
    pub const ALL: [Self; 5] = [
        Self::EmptyConstructor,
        Self::EmptyMarker,
        Self::BlankNameWithMarker,
        Self::BlankName,
        Self::NullName,
    ];

    const fn label(self) -> &'static str {
        match self {
            Self::EmptyConstructor => "create(empty-street)",
            Self::EmptyMarker => "create(is-empty)",
            Self::BlankNameWithMarker => "create(blank-name,is-empty)",
            Self::BlankName => "create(blank-name)",
            Self::NullName => "create(null-name)",
        }
    }

    fn request(self, city_id: CityId) -> Option<NewStreet> {
        let (name, is_empty) = match self {
            Self::EmptyConstructor => return None,
            Self::EmptyMarker => (StreetNameField::Absent, Some(true)),
            Self::BlankNameWithMarker => (StreetNameField::Text(String::new()), Some(true)),
            Self::BlankName => (StreetNameField::Text(String::new()), None),
            Self::NullName => (StreetNameField::Null, None),
        };
        Some(NewStreet {
            city_id,
            name,
            is_empty,
        })
    }
}

/// Create the empty street with one [`CreationShape`].
///
/// The created record is accepted only if it reports itself as empty.
#[derive(Debug, Clone, Copy)]
pub struct CreateEmptyStreet(pub CreationShape);

impl EmptyStreetStrategy for CreateEmptyStreet {
    fn name(&self) -> &'static str {
        self.0.label()
    }

    fn attempt(&self, host: &mut dyn HostDataApi, city: CityId) -> HostResult<Option<Street>> {
        let created = match self.0.request(city) {
            None => host.add_empty_street(city)?,
            Some(request) => host.add_street(&request)?,
        };
        Ok(created.filter(Street::reports_empty))
    }
}

/// Ordered lookups and creations for a city's empty street.
///
/// # Examples
/// ```
/// use place_city_core::{EmptyStreetResolver, MemoryHost};
///
/// let mut host = MemoryHost::default();
/// let city = host.insert_city("Springfield", None);
/// let info = EmptyStreetResolver::default()
///     .resolve(&mut host, city.id)
///     .expect("the in-memory host supports every strategy");
/// assert!(info.street.reports_empty());
/// ```
pub struct EmptyStreetResolver {
    strategies: Vec<Box<dyn EmptyStreetStrategy>>,
}

impl Default for EmptyStreetResolver {
    /// Lookups first (getter, marker query, blank-name query, scan), then
    /// every creation shape.
    fn default() -> Self {
        let mut strategies: Vec<Box<dyn EmptyStreetStrategy>> = vec![
            Box::new(DirectGetter),
            Box::new(EmptyMarkerQuery),
            Box::new(BlankNameQuery),
            Box::new(StreetScan),
        ];
        strategies.extend(
            CreationShape::ALL
                .into_iter()
                .map(|shape| Box::new(CreateEmptyStreet(shape)) as Box<dyn EmptyStreetStrategy>),
        );
        Self { strategies }
    }
}

impl std::fmt::Debug for EmptyStreetResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.strategies.iter().map(|strategy| strategy.name()))
            .finish()
    }
}

impl EmptyStreetResolver {
    /// Build a resolver with a custom strategy order.
    #[must_use]
    pub fn with_strategies(strategies: Vec<Box<dyn EmptyStreetStrategy>>) -> Self {
        Self { strategies }
    }

    /// Strategy names in probing order.
    pub fn strategy_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.strategies.iter().map(|strategy| strategy.name())
    }

    /// Find or create the empty street of `city`.
    ///
    /// Returns `None` when no strategy succeeds, meaning the deployment offers
    /// no empty street for this city.
    pub fn resolve(&self, host: &mut dyn HostDataApi, city: CityId) -> Option<EmptyStreetInfo> {
        self.strategies.iter().find_map(|strategy| {
            match strategy.attempt(&mut *host, city) {
                Ok(Some(street)) => Some(EmptyStreetInfo {
                    street,
                    strategy: strategy.name(),
                }),
                Ok(None) => {
                    debug!("empty street strategy {} found nothing", strategy.name());
                    None
                }
                Err(err) => {
                    debug!("empty street strategy {} failed: {err}", strategy.name());
                    None
                }
            }
        })
    }
}
