use thiserror::Error;

use crate::host::{HostDataApi, HostError, NewStreet, StreetNameField, StreetQuery};
use crate::model::{City, Street};
use crate::report::ApplyLog;

/// Errors returned by [`resolve_named_street`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreetResolutionError {
    /// Looking the street up failed for a reason other than missing support.
    #[error("failed to look up street {name:?}: {source}")]
    Lookup {
        /// Requested street name.
        name: String,
        /// Host failure.
        #[source]
        source: HostError,
    },
    /// The host refused to create the street.
    #[error("failed to create street {name:?}: {source}")]
    Create {
        /// Requested street name.
        name: String,
        /// Host failure.
        #[source]
        source: HostError,
    },
    /// The host accepted the creation call but returned no street.
    #[error("failed to resolve target street {name:?}")]
    NotCreated {
        /// Requested street name.
        name: String,
    },
}

/// Find the street called `name` in `city`, creating it if absent.
///
/// Only used for named streets; the empty street goes through
/// [`EmptyStreetResolver`](super::EmptyStreetResolver).
///
/// # Errors
/// Returns [`StreetResolutionError`] when the street can be neither found nor
/// created.
pub fn resolve_named_street(
    host: &mut dyn HostDataApi,
    city: &City,
    name: &str,
    log: &mut ApplyLog,
) -> Result<Street, StreetResolutionError> {
    match host.find_street(&StreetQuery::named(city.id, name)) {
        Ok(Some(street)) => return Ok(street),
        Ok(None) | Err(HostError::Unsupported(_)) => {}
        Err(source) => {
            return Err(StreetResolutionError::Lookup {
                name: name.to_owned(),
                source,
            });
        }
    }

    let request = NewStreet {
        city_id: city.id,
        name: StreetNameField::Text(name.to_owned()),
        is_empty: None,
    };
    let street = host
        .add_street(&request)
        .map_err(|source| StreetResolutionError::Create {
            name: name.to_owned(),
            source,
        })?
        .ok_or_else(|| StreetResolutionError::NotCreated {
            name: name.to_owned(),
        })?;
    log.info(format!("  + Created street \"{name}\" in {}", city.name));
    Ok(street)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{HostCapabilities, MemoryHost};
    use rstest::rstest;

    #[rstest]
    fn reuses_existing_street() {
        let mut host = MemoryHost::default();
        let city = host.insert_city("Springfield", None);
        let existing = host.insert_street(city.id, Some("Elm St"));
        let mut log = ApplyLog::new();
        let street = resolve_named_street(&mut host, &city, "Elm St", &mut log).expect("found");
        assert_eq!(street.id, existing.id);
        assert!(!log.mentions("Created street"));
    }

    #[rstest]
    fn creates_missing_street() {
        let mut host = MemoryHost::default();
        let city = host.insert_city("Springfield", None);
        let mut log = ApplyLog::new();
        let street = resolve_named_street(&mut host, &city, "Elm St", &mut log).expect("created");
        assert_eq!(street.city_id, city.id);
        assert_eq!(street.name.as_deref(), Some("Elm St"));
        assert!(log.mentions("Created street \"Elm St\" in Springfield"));
    }

    #[rstest]
    fn does_not_match_streets_of_other_cities() {
        let mut host = MemoryHost::default();
        let target = host.insert_city("Springfield", None);
        let other = host.insert_city("Shelbyville", None);
        let foreign = host.insert_street(other.id, Some("Elm St"));
        let mut log = ApplyLog::new();
        let street = resolve_named_street(&mut host, &target, "Elm St", &mut log).expect("created");
        assert_ne!(street.id, foreign.id);
        assert_eq!(street.city_id, target.id);
    }

    #[rstest]
    fn missing_constructor_is_an_error() {
        let mut host = MemoryHost::default();
        host.capabilities = HostCapabilities::minimal();
        let city = host.insert_city("Springfield", None);
        let mut log = ApplyLog::new();
        let err = resolve_named_street(&mut host, &city, "Elm St", &mut log).expect_err("failed");
        assert!(matches!(err, StreetResolutionError::Create { .. }));
    }
}
