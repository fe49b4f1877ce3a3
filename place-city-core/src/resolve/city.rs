use thiserror::Error;

use crate::host::{CityQuery, HostDataApi, HostError};
use crate::model::{City, State};
use crate::report::ApplyLog;

/// Errors returned by [`resolve_city`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CityResolutionError {
    /// Looking the city up failed for a reason other than missing support.
    #[error("failed to look up city {name:?}: {source}")]
    Lookup {
        /// Requested city name.
        name: String,
        /// Host failure.
        #[source]
        source: HostError,
    },
    /// The host refused to create the city.
    #[error("failed to create city {name:?}: {source}")]
    Create {
        /// Requested city name.
        name: String,
        /// Host failure.
        #[source]
        source: HostError,
    },
    /// The host accepted the creation call but returned no city.
    #[error("host returned no city for {name:?}")]
    NotCreated {
        /// Requested city name.
        name: String,
    },
}

/// Find the destination city by exact name (and state), creating it if absent.
///
/// The lookup runs within the host's top-level country. Hosts without a city
/// query are treated as having no match, so creation is attempted directly.
///
/// # Errors
/// Returns [`CityResolutionError`] when the city can be neither found nor
/// created. Callers abort the whole invocation in that case.
pub fn resolve_city(
    host: &mut dyn HostDataApi,
    name: &str,
    state: Option<&State>,
    log: &mut ApplyLog,
) -> Result<City, CityResolutionError> {
    let country_id = host.top_country().ok().flatten().map(|country| country.id);
    let query = CityQuery {
        name: name.to_owned(),
        country_id,
        state_id: state.map(|s| s.id),
    };

    match host.find_city(&query) {
        Ok(Some(city)) => return Ok(city),
        Ok(None) | Err(HostError::Unsupported(_)) => {}
        Err(source) => {
            return Err(CityResolutionError::Lookup {
                name: name.to_owned(),
                source,
            });
        }
    }

    let created = host
        .add_city(&query)
        .map_err(|source| CityResolutionError::Create {
            name: name.to_owned(),
            source,
        })?
        .ok_or_else(|| CityResolutionError::NotCreated {
            name: name.to_owned(),
        })?;
    match state {
        Some(state) => log.info(format!("  + Created city: {name} / {}", state.name)),
        None => log.info(format!("  + Created city: {name}")),
    }
    Ok(created)
}
