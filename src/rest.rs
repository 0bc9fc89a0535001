//! HTTP message store speaking the PostgREST dialect, as hosted by Supabase.
//!
//! Every request carries the project's `apikey` header and a bearer token:
//! the session's access token when signed in, else the anon key. Row-level
//! access policies on the server decide what each token may read or delete.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::StoreConfig;
use crate::error::{BoardError, Result};
use crate::models::{Cursor, MessageRow, NewMessage, PageRequest, ProfileRef};
use crate::store::MessageStore;

/// Columns read from the messages table, before the profile embed
const MESSAGE_COLUMNS: &str = "id,user_id,content,created_at";

/// Error body returned by PostgREST on non-2xx responses
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    code: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

/// A [`MessageStore`] backed by a PostgREST endpoint
pub struct RestStore {
    client: Client,
    rest_base: Url,
    api_key: String,
    bearer: String,
    messages_table: String,
    profiles_table: String,
}

impl fmt::Debug for RestStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestStore")
            .field("rest_base", &self.rest_base.as_str())
            .field("messages_table", &self.messages_table)
            .field("profiles_table", &self.profiles_table)
            .finish_non_exhaustive()
    }
}

impl RestStore {
    /// Build a store for the configured project. `access_token` is the
    /// signed-in session's token, if any.
    pub fn new(config: &StoreConfig, access_token: Option<&str>) -> Result<Self> {
        let mut base = Url::parse(&config.url).map_err(|e| BoardError::InvalidUrl(format!("{}: {e}", config.url)))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let rest_base = base
            .join("rest/v1/")
            .map_err(|e| BoardError::InvalidUrl(format!("{base}: {e}")))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            rest_base,
            api_key: config.anon_key.clone(),
            bearer: access_token.unwrap_or(&config.anon_key).to_string(),
            messages_table: config.messages_table.clone(),
            profiles_table: config.profiles_table.clone(),
        })
    }

    /// REST endpoint for `table`.
    pub fn table_url(&self, table: &str) -> Result<Url> {
        self.rest_base
            .join(table)
            .map_err(|e| BoardError::InvalidUrl(format!("{}{table}: {e}", self.rest_base)))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.bearer)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(api_error(status, &body))
    }

    fn select_with_profile(&self) -> String {
        format!("{MESSAGE_COLUMNS},profiles:{}(profile_name)", self.profiles_table)
    }
}

#[async_trait]
impl MessageStore for RestStore {
    async fn list_messages(&self, page: &PageRequest) -> Result<Vec<MessageRow>> {
        let url = self.table_url(&self.messages_table)?;
        let mut query = vec![
            ("select", self.select_with_profile()),
            ("order", "created_at.desc,id.desc".to_string()),
            ("limit", page.limit.to_string()),
        ];
        if let Some(cursor) = &page.before {
            query.push(("or", cursor_filter(cursor)));
        }

        debug!(limit = page.limit, paged = page.before.is_some(), "Listing messages");
        let response = self.send(self.request(Method::GET, url).query(&query)).await?;
        decode(response).await
    }

    async fn insert_message(&self, message: &NewMessage) -> Result<MessageRow> {
        let url = self.table_url(&self.messages_table)?;
        debug!(user_id = %message.user_id, "Inserting message");
        let response = self
            .send(
                self.request(Method::POST, url)
                    .query(&[("select", "*")])
                    .header("Prefer", "return=representation")
                    .json(&[message]),
            )
            .await?;

        let mut rows: Vec<MessageRow> = decode(response).await?;
        if rows.is_empty() {
            return Err(BoardError::UnexpectedResponse("insert returned no rows".to_string()));
        }
        Ok(rows.swap_remove(0))
    }

    async fn delete_message(&self, id: &str) -> Result<()> {
        let url = self.table_url(&self.messages_table)?;
        debug!(message_id = id, "Deleting message");
        self.send(self.request(Method::DELETE, url).query(&[("id", format!("eq.{id}"))]))
            .await?;
        Ok(())
    }

    async fn profile_name(&self, user_id: &str) -> Result<Option<String>> {
        let url = self.table_url(&self.profiles_table)?;
        let response = self
            .send(self.request(Method::GET, url).query(&[
                ("select", "profile_name".to_string()),
                ("id", format!("eq.{user_id}")),
                ("limit", "1".to_string()),
            ]))
            .await?;

        let profiles: Vec<ProfileRef> = decode(response).await?;
        Ok(profiles.into_iter().next().and_then(|p| p.profile_name))
    }
}

/// `or` filter selecting rows strictly after `cursor` in newest-first order.
fn cursor_filter(cursor: &Cursor) -> String {
    let ts = cursor.created_at.to_rfc3339_opts(SecondsFormat::Micros, true);
    let id = quote(&cursor.id);
    format!("(created_at.lt.\"{ts}\",and(created_at.eq.\"{ts}\",id.lt.{id}))")
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

fn api_error(status: StatusCode, body: &str) -> BoardError {
    let fallback = || status.canonical_reason().unwrap_or("request failed").to_string();
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => BoardError::Api {
            status,
            message: parsed.message.unwrap_or_else(fallback),
            code: parsed.code,
            details: parsed.details,
            hint: parsed.hint,
        },
        Err(_) => BoardError::Api {
            status,
            message: if body.trim().is_empty() { fallback() } else { body.trim().to_string() },
            code: None,
            details: None,
            hint: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn store_config(url: &str) -> StoreConfig {
        StoreConfig {
            url: url.to_string(),
            anon_key: "anon".to_string(),
            messages_table: "messages".to_string(),
            profiles_table: "profiles".to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn table_url_is_under_rest_v1() {
        let store = RestStore::new(&store_config("https://abc.supabase.co"), None).unwrap();
        assert_eq!(
            store.table_url("messages").unwrap().as_str(),
            "https://abc.supabase.co/rest/v1/messages"
        );

        let nested = RestStore::new(&store_config("http://localhost:8000/proxy"), None).unwrap();
        assert_eq!(
            nested.table_url("profiles").unwrap().as_str(),
            "http://localhost:8000/proxy/rest/v1/profiles"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            RestStore::new(&store_config("not a url"), None),
            Err(BoardError::InvalidUrl(_))
        ));
    }

    #[test]
    fn cursor_filter_quotes_timestamp_and_id() {
        let cursor = Cursor {
            created_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            id: "a\"b".to_string(),
        };
        assert_eq!(
            cursor_filter(&cursor),
            r#"(created_at.lt."2024-01-02T03:04:05.000000Z",and(created_at.eq."2024-01-02T03:04:05.000000Z",id.lt."a\"b"))"#
        );
    }

    #[test]
    fn api_error_parses_postgrest_body() {
        let err = api_error(
            StatusCode::FORBIDDEN,
            r#"{"message":"permission denied for table messages","code":"42501","details":null,"hint":null}"#,
        );
        match err {
            BoardError::Api { status, message, code, .. } => {
                assert_eq!(status, StatusCode::FORBIDDEN);
                assert_eq!(message, "permission denied for table messages");
                assert_eq!(code.as_deref(), Some("42501"));
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn api_error_falls_back_to_raw_body_or_reason() {
        match api_error(StatusCode::BAD_GATEWAY, "upstream down") {
            BoardError::Api { message, .. } => assert_eq!(message, "upstream down"),
            other => panic!("unexpected error: {other:?}"),
        }
        match api_error(StatusCode::BAD_GATEWAY, "") {
            BoardError::Api { message, .. } => assert_eq!(message, "Bad Gateway"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
