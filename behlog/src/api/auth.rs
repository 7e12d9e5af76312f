use axum::{
    extract::{Request, State},
    http,
    middleware::Next,
    response::Response,
};
use behlog_core::authorization::Caller;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::app_state::SharedAppState;

/// Resolves the bearer token into a [`Caller`] and stores it in the request
/// extensions. Requests without a valid token continue as
/// [`Caller::Anonymous`]; rejecting them is the authorization layer's job.
pub async fn auth(State(state): State<SharedAppState>, mut req: Request, next: Next) -> Response {
    let token = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim);

    let caller = match token {
        Some(token) => match find_token_identifier(&state, token) {
            Some(identifier) => {
                debug!("Bearer token resolved to user '{}'", identifier);
                Caller::user(identifier)
            }
            None => {
                warn!(
                    "Unknown bearer token for {} {} (token starts with: {}...)",
                    req.method(),
                    req.uri(),
                    token.chars().take(4).collect::<String>()
                );
                Caller::Anonymous
            }
        },
        None => {
            debug!("No bearer token for {} {}", req.method(), req.uri());
            Caller::Anonymous
        }
    };

    req.extensions_mut().insert(caller);
    next.run(req).await
}

/// Reverse lookup of the identifier a token belongs to, comparing in
/// constant time.
fn find_token_identifier(state: &SharedAppState, token: &str) -> Option<String> {
    let mut found = None;
    for (identifier, configured_token) in &state.settings.api.bearer_tokens {
        if bool::from(token.as_bytes().ct_eq(configured_token.as_bytes())) && found.is_none() {
            found = Some(identifier.clone());
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_state::AppState;
    use crate::settings::config::Settings;
    use crate::stop_flag::StopFlag;
    use behlog_core::authorization::{PolicyDocument, PolicyStore};
    use behlog_core::settings::api_server::ApiServer;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn state_with_tokens(tokens: &[(&str, &str)]) -> SharedAppState {
        let bearer_tokens: HashMap<String, String> = tokens
            .iter()
            .map(|(id, token)| (id.to_string(), token.to_string()))
            .collect();
        let settings = Settings {
            api: ApiServer::new("127.0.0.1:0", bearer_tokens),
            ..Default::default()
        };
        AppState::from_parts(
            settings,
            StopFlag::new(),
            Arc::new(PolicyStore::in_memory(PolicyDocument::default())),
        )
    }

    #[test]
    fn test_find_token_identifier() {
        let state = state_with_tokens(&[("alice", "token-a"), ("bob", "token-b")]);

        assert_eq!(
            find_token_identifier(&state, "token-b"),
            Some("bob".to_string())
        );
        assert_eq!(find_token_identifier(&state, "token-"), None);
        assert_eq!(find_token_identifier(&state, ""), None);
    }
}
