use log::debug;

use crate::host::HostDataApi;
use crate::model::State;

/// Find a state by trimmed, case-insensitive exact name.
///
/// The listing without the host's "no state" entry is preferred; the full
/// listing is the fallback. A blank name, an unmatched name, or a host
/// failure all yield `None`.
pub fn find_state_by_name(host: &dyn HostDataApi, name: &str) -> Option<State> {
    let wanted = name.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }
    let states = host
        .states_without_default()
        .or_else(|_| host.all_states())
        .map_err(|err| debug!("state listing unavailable: {err}"))
        .ok()?;
    states
        .into_iter()
        .find(|state| state.name.trim().to_lowercase() == wanted)
}
