use crate::context::Context;
use crate::types::{Config, Diagnostics, State};

#[derive(Clone)]
pub struct ConfigureRequest {
    pub context: Context,
    pub config: Config,
}

#[derive(Clone)]
pub struct ConfigureResponse {
    pub diagnostics: Diagnostics,
}

#[derive(Clone)]
pub struct CreateRequest {
    pub context: Context,
    pub config: Config,
    pub planned_state: State,
}

#[derive(Clone)]
pub struct CreateResponse {
    pub state: State,
    pub diagnostics: Diagnostics,
}

#[derive(Clone)]
pub struct ReadRequest {
    pub context: Context,
    pub current_state: State,
}

/// `state: None` signals that the remote object no longer exists and
/// Terraform should drop it from state.
#[derive(Clone)]
pub struct ReadResponse {
    pub state: Option<State>,
    pub diagnostics: Diagnostics,
}

#[derive(Clone)]
pub struct UpdateRequest {
    pub context: Context,
    pub config: Config,
    pub planned_state: State,
    pub current_state: State,
}

#[derive(Clone)]
pub struct UpdateResponse {
    pub state: State,
    pub diagnostics: Diagnostics,
}

#[derive(Clone)]
pub struct DeleteRequest {
    pub context: Context,
    pub current_state: State,
}

#[derive(Clone)]
pub struct DeleteResponse {
    pub diagnostics: Diagnostics,
}

/// Import carries the user-supplied id from `terraform import`.
#[derive(Clone)]
pub struct ImportRequest {
    pub context: Context,
    pub id: String,
}

#[derive(Clone)]
pub struct ImportResponse {
    pub state: Option<State>,
    pub diagnostics: Diagnostics,
}

#[derive(Clone)]
pub struct ReadDataSourceRequest {
    pub context: Context,
    pub config: Config,
}

#[derive(Clone)]
pub struct ReadDataSourceResponse {
    pub state: Option<State>,
    pub diagnostics: Diagnostics,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Config, Dynamic, State};
    use std::collections::HashMap;

    #[test]
    fn configure_request_contains_config_and_context() {
        let ctx = Context::new();
        let config = Config {
            values: HashMap::new(),
        };

        let req = ConfigureRequest {
            context: ctx.clone(),
            config: config.clone(),
        };

        assert_eq!(req.config.values.len(), 0);
    }

    #[test]
    fn create_request_contains_config_and_planned_state() {
        let ctx = Context::new();
        let config = Config {
            values: HashMap::new(),
        };
        let planned_state = State {
            values: HashMap::new(),
        };

        let req = CreateRequest {
            context: ctx,
            config,
            planned_state,
        };

        assert_eq!(req.config.values.len(), 0);
        assert_eq!(req.planned_state.values.len(), 0);
    }

    #[test]
    fn read_request_contains_current_state() {
        let ctx = Context::new();
        let mut values = HashMap::new();
        values.insert(
            "id".to_string(),
            Dynamic::String("acme/prod/web".to_string()),
        );
        let current_state = State { values };

        let req = ReadRequest {
            context: ctx,
            current_state: current_state.clone(),
        };

        assert_eq!(req.current_state.values.len(), 1);
        assert_eq!(
            req.current_state
                .values
                .get("id")
                .and_then(|v| v.as_string()),
            Some("acme/prod/web")
        );
    }

    #[test]
    fn import_request_carries_user_supplied_id() {
        let req = ImportRequest {
            context: Context::new(),
            id: "acme/prod/web".to_string(),
        };

        assert_eq!(req.id, "acme/prod/web");
    }
}
