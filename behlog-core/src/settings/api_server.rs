use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize, Clone)]
#[allow(unused)]
#[readonly::make]
pub struct ApiServer {
    pub bind_address: String,
    /// Maps an identifier (the user id the caller is resolved to) to its
    /// bearer token.
    #[serde(default)]
    pub bearer_tokens: HashMap<String, String>,
}

impl Default for ApiServer {
    fn default() -> Self {
        ApiServer {
            bind_address: "0.0.0.0:21380".to_string(),
            bearer_tokens: HashMap::new(),
        }
    }
}

impl ApiServer {
    pub fn new(bind_address: &str, bearer_tokens: HashMap<String, String>) -> Self {
        ApiServer {
            bind_address: bind_address.to_string(),
            bearer_tokens,
        }
    }
}
