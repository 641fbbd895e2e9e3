//! Import helpers
//!
//! Most resources import by a single opaque id. The passthrough helper
//! seeds a state holding just that id; resources that need more than one
//! attribute add to the returned state before handing it back.

use crate::types::{Dynamic, State};

/// Seeds a state with the user-supplied import id under `attribute`.
pub fn import_state_passthrough_id(attribute: &str, id: &str) -> State {
    let mut state = State::new();
    state
        .values
        .insert(attribute.to_string(), Dynamic::String(id.to_string()));
    state
}
