//! Targetprocess REST client

use std::fmt;
use std::io::IsTerminal;
use std::sync::LazyLock;
use std::time::Duration;

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Password};
use regex::Regex;
use reqwest::blocking::Client;

use crate::api::{ApiError, SearchService};
use crate::core::config::{ConfigError, FileConfig};
use crate::core::query::{include_expression, QueryDescriptor};
use crate::core::record::EntityRecord;

const AUTH_SECTION: &str = "auth";

/// Resource queried for list and detail requests
const ASSIGNABLES: &str = "Assignables/";

const TIMEOUT: Duration = Duration::from_secs(30);

static TOKEN_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(token=)[^&\s)]+").expect("valid token pattern"));

/// Hide API tokens embedded in URLs
pub fn redact(text: &str) -> String {
    TOKEN_PARAM.replace_all(text, "${1}*****").into_owned()
}

/// How requests are authenticated
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    Token(String),
    Basic { username: String, password: String },
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::Token(_) => write!(f, "Token(*****)"),
            Auth::Basic { username, .. } => write!(f, "Basic({}, *****)", username),
        }
    }
}

/// Account details from the `[auth]` section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub subdomain: String,
    pub auth: Auth,
}

impl Credentials {
    /// Read `[auth]`, prompting for missing values when stdin is a terminal
    pub fn from_config(files: &FileConfig) -> Result<Self, ConfigError> {
        Self::resolve(files, std::io::stdin().is_terminal())
    }

    /// Read `[auth]`; without `interactive`, missing values are errors
    pub fn resolve(files: &FileConfig, interactive: bool) -> Result<Self, ConfigError> {
        let value = |key: &str| files.get_non_empty(AUTH_SECTION, key).map(str::to_string);
        let subdomain = subdomain(files, interactive)?;

        if let Some(token) = value("token") {
            return Ok(Self {
                subdomain,
                auth: Auth::Token(token),
            });
        }

        let username = match value("username") {
            Some(username) => username,
            None if interactive => prompt("username", "What is your Targetprocess user name?")?,
            None => return Err(ConfigError::MissingAuth("token or username")),
        };

        let password = match value("password") {
            Some(password) => password,
            None if interactive => Password::with_theme(&ColorfulTheme::default())
                .with_prompt("What is your Targetprocess password?")
                .interact()
                .map_err(|e| ConfigError::Prompt {
                    field: "password",
                    message: e.to_string(),
                })?,
            None => return Err(ConfigError::MissingAuth("password")),
        };

        Ok(Self {
            subdomain,
            auth: Auth::Basic { username, password },
        })
    }

    /// Web page of an entity
    pub fn entity_url(&self, id: u64) -> String {
        entity_url(&self.subdomain, id)
    }
}

/// The account subdomain, prompting for it when `interactive`
pub fn subdomain(files: &FileConfig, interactive: bool) -> Result<String, ConfigError> {
    match files.get_non_empty(AUTH_SECTION, "subdomain") {
        Some(subdomain) => Ok(subdomain.to_string()),
        None if interactive => prompt("subdomain", "What is your Targetprocess subdomain?"),
        None => Err(ConfigError::MissingAuth("subdomain")),
    }
}

/// Web page of entity `id` on `subdomain`
pub fn entity_url(subdomain: &str, id: u64) -> String {
    format!("https://{}.tpondemand.com/entity/{}", subdomain, id)
}

fn prompt(field: &'static str, text: &str) -> Result<String, ConfigError> {
    Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt(text)
        .interact_text()
        .map(|answer| answer.trim().to_string())
        .map_err(|e| ConfigError::Prompt {
            field,
            message: e.to_string(),
        })
}

/// Blocking client for the v1 REST API
pub struct TpClient {
    http: Client,
    credentials: Credentials,
}

impl TpClient {
    pub fn new(credentials: Credentials) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(TIMEOUT)
            .user_agent(concat!("tp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        Ok(Self { http, credentials })
    }

    fn host(&self) -> String {
        format!("{}.tpondemand.com", self.credentials.subdomain)
    }

    fn api_url(&self, resource: &str) -> String {
        format!("https://{}/api/v1/{}", self.host(), resource)
    }

    /// GET a collection resource and return its `Items`
    fn fetch(
        &self,
        resource: &str,
        params: &[(String, String)],
    ) -> Result<Vec<EntityRecord>, ApiError> {
        let mut request = self
            .http
            .get(self.api_url(resource))
            .query(&[("format", "json")])
            .query(params);

        request = match &self.credentials.auth {
            Auth::Token(token) => request.query(&[("token", token)]),
            Auth::Basic { username, password } => request.basic_auth(username, Some(password)),
        };

        let request = request
            .build()
            .map_err(|e| ApiError::Client(redact(&e.to_string())))?;
        tracing::debug!(url = %redact(request.url().as_str()), "GET");

        let response = self.http.execute(request).map_err(|e| {
            let message = redact(&e.to_string());
            tracing::warn!("request failed: {}", message);
            ApiError::Connection {
                host: self.host(),
                message,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let err = ApiError::from_response(status.as_u16(), status.canonical_reason(), &body);
            tracing::warn!("request rejected: {}", err);
            return Err(err);
        }

        let content: serde_json::Value = response
            .json()
            .map_err(|e| ApiError::Decode(redact(&e.to_string())))?;
        let items = decode_items(content)?;

        tracing::debug!(count = items.len(), "fetched items");
        Ok(items)
    }
}

/// Extract the records of a collection response
fn decode_items(content: serde_json::Value) -> Result<Vec<EntityRecord>, ApiError> {
    let serde_json::Value::Object(mut content) = content else {
        return Err(ApiError::Decode("expected a JSON object".to_string()));
    };
    let Some(serde_json::Value::Array(items)) = content.remove("Items") else {
        return Err(ApiError::Decode("missing 'Items' list".to_string()));
    };

    items
        .into_iter()
        .map(|item| match item {
            serde_json::Value::Object(map) => Ok(EntityRecord::from(map)),
            other => Err(ApiError::Decode(format!("expected an entity, got {}", other))),
        })
        .collect()
}

impl SearchService for TpClient {
    fn search(&self, query: &QueryDescriptor) -> Result<Vec<EntityRecord>, ApiError> {
        self.fetch(ASSIGNABLES, &query.to_params())
    }

    fn find_by_id(&self, id: u64, include: &[String]) -> Result<Vec<EntityRecord>, ApiError> {
        let mut params = vec![("where".to_string(), format!("(Id eq {})", id))];
        if let Some(include) = include_expression(include) {
            params.push(("include".to_string(), include));
        }
        self.fetch(ASSIGNABLES, &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::Value;

    fn auth(ini: &str) -> Result<Credentials, ConfigError> {
        Credentials::resolve(&FileConfig::from_ini(ini, "test.conf").unwrap(), false)
    }

    #[test]
    fn test_redact() {
        assert_eq!(
            redact("error sending request for url (https://x.tpondemand.com/api/v1/Assignables/?format=json&token=abc%3D%3D)"),
            "error sending request for url (https://x.tpondemand.com/api/v1/Assignables/?format=json&token=*****)"
        );
        assert_eq!(redact("token=abc&take=1"), "token=*****&take=1");
        assert_eq!(redact("no secrets"), "no secrets");
    }

    #[test]
    fn test_token_auth() {
        let credentials = auth("[auth]\nsubdomain = acme\ntoken = abc\nusername = ada\n").unwrap();
        assert_eq!(credentials.subdomain, "acme");
        assert_eq!(credentials.auth, Auth::Token("abc".to_string()));
        assert_eq!(credentials.entity_url(42), "https://acme.tpondemand.com/entity/42");
    }

    #[test]
    fn test_basic_auth() {
        let credentials =
            auth("[auth]\nsubdomain = acme\nusername = ada\npassword = secret\n").unwrap();
        assert_eq!(
            credentials.auth,
            Auth::Basic {
                username: "ada".to_string(),
                password: "secret".to_string()
            }
        );
        assert!(!format!("{:?}", credentials).contains("secret"));
    }

    #[test]
    fn test_missing_auth_without_terminal() {
        assert!(matches!(auth(""), Err(ConfigError::MissingAuth("subdomain"))));
        assert!(matches!(
            auth("[auth]\nsubdomain = acme\n"),
            Err(ConfigError::MissingAuth("token or username"))
        ));
        assert!(matches!(
            auth("[auth]\nsubdomain = acme\nusername = ada\n"),
            Err(ConfigError::MissingAuth("password"))
        ));
    }

    #[test]
    fn test_decode_items() {
        let content = serde_json::json!({
            "Next": "https://acme.tpondemand.com/api/v1/Assignables/?skip=25",
            "Items": [
                {"Id": 18928, "Name": "User login", "Owner": null},
                {"Id": 18929, "Name": "Logout", "Owner": {"FirstName": "Ada"}}
            ]
        });
        let items = decode_items(content).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id(), Some(18928));
        assert_eq!(items[0].get("Owner"), Some(&Value::Null));
        assert!(items[1].get("Owner").and_then(Value::as_record).is_some());
    }

    #[test]
    fn test_decode_rejects_unexpected_shapes() {
        assert!(decode_items(serde_json::json!([])).is_err());
        assert!(decode_items(serde_json::json!({"Items": 3})).is_err());
        assert!(decode_items(serde_json::json!({"Items": [1]})).is_err());
    }
}
