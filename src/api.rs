//! # API Module
//!
//! This module handles all interaction with the dashboard backend's REST API.
//!
//! One [`ApiClient`] wraps the HTTP transport, the stored credential, and
//! the cross-cutting authorization policy:
//!
//! - **Outbound**: every request funnels through [`ApiClient::authorize`],
//!   which attaches `Authorization: Bearer <token>` whenever a token is
//!   stored. There is no per-call opt-out.
//! - **Inbound**: every response funnels through [`ApiClient::send`]. A 401
//!   from *any* endpoint clears the stored credential and surfaces
//!   [`ApiError::Unauthorized`]; a single rejected token invalidates the
//!   whole session. Other error statuses have their most specific message
//!   field extracted and surfaced verbatim as [`ApiError::Api`].
//!
//! Operations that require a credential check for its presence *before*
//! building a request; acting while logged out is
//! [`ApiError::MissingCredential`], not a round-trip.
//!
//! The session and message listing endpoints return inconsistently shaped
//! payloads (a bare array, or the array wrapped under `sessions`,
//! `messages`, or `results`); [`flatten_listing`] canonicalizes all of
//! them to `Vec<T>` at this boundary so no call site branches on shape.
//!
//! # Example
//!
//! ```no_run
//! # async fn demo() -> Result<(), botdeck::error::ApiError> {
//! use botdeck::{api::ApiClient, auth::CredentialStore, config::BotdeckConfig};
//!
//! let store = CredentialStore::open()?;
//! let client = ApiClient::new(&BotdeckConfig::default(), store)?;
//! for bot in client.list_chatbots().await? {
//!     println!("{} ({})", bot.name, bot.id);
//! }
//! # Ok(()) }
//! ```

use crate::{
    auth::CredentialStore,
    config::BotdeckConfig,
    error::{ApiError, Result},
    models::{
        ChatReply, ChatSession, ChatTurn, Chatbot, ChatbotDraft, CreatedChatbot,
        KnowledgeDocument, TokenGrant, UserProfile,
    },
};
use reqwest::{
    Body, RequestBuilder, StatusCode,
    multipart::{Form, Part},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{path::Path, sync::Arc, time::Duration};
use tracing::{debug, warn};

/// Callback for upload progress: `(bytes_sent, bytes_total)`.
pub type ProgressFn = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Client for the dashboard backend.
///
/// Holds the HTTP transport, the base URL, the credential store, and the
/// extended timeout reserved for knowledge-file uploads.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
    store: CredentialStore,
    upload_timeout: Duration,
}

impl ApiClient {
    /// Creates a new API client from configuration.
    ///
    /// # Parameters
    /// - `config`: Configuration containing the API base URL and timeouts.
    /// - `store`: The credential store the client reads the token from and
    ///   clears on authorization failure.
    ///
    /// # Returns
    /// - `Result<ApiClient>`: Created client or an error if the transport
    ///   could not be initialized.
    pub fn new(config: &BotdeckConfig, store: CredentialStore) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ApiError::Unexpected(e.to_string()))?;
        debug!("API client created for {}", config.api_base);

        Ok(Self {
            http,
            base: config.api_base.trim_end_matches('/').to_string(),
            store,
            upload_timeout: config.upload_timeout(),
        })
    }

    /// The credential store this client operates against.
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Attach the bearer header when a token is stored. Applied to every
    /// outgoing request without exception.
    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.store.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Fail fast when no credential is stored. The request is never built.
    fn require_token(&self) -> Result<()> {
        if self.store.is_authenticated() {
            Ok(())
        } else {
            Err(ApiError::MissingCredential)
        }
    }

    /// Send a request and apply the inbound authorization policy.
    ///
    /// A 401 clears the stored credential, whichever endpoint produced it,
    /// and maps to [`ApiError::Unauthorized`]. Any other error status has
    /// its body mined for the most specific message and becomes
    /// [`ApiError::Api`]. Transport failures become [`ApiError::Network`].
    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response> {
        let response = self.authorize(builder).send().await.map_err(ApiError::from)?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!("credential rejected by server, clearing stored token");
            self.store.remove_token();
            return Err(ApiError::Unauthorized);
        }

        if status.is_client_error() || status.is_server_error() {
            let detail = extract_error_detail(response).await;
            return Err(ApiError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.send(builder).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Unexpected(format!("failed to decode response: {e}")))
    }

    // ── Authentication ─────────────────────────────────────────────────

    /// Create an account. Registration alone does not yield a usable
    /// session; see [`ApiClient::register_and_login`].
    ///
    /// Client-side minimums (username ≥ 3 characters, password ≥ 6) are
    /// enforced before any request is built.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<()> {
        if username.chars().count() < 3 {
            return Err(ApiError::Invalid(
                "username must be at least 3 characters".to_string(),
            ));
        }
        if password.chars().count() < 6 {
            return Err(ApiError::Invalid(
                "password must be at least 6 characters".to_string(),
            ));
        }

        let body = serde_json::json!({
            "username": username,
            "email": email,
            "password": password,
        });
        self.send(self.http.post(self.url("/users")).json(&body))
            .await?;
        Ok(())
    }

    /// Exchange email/password for a token, persist it, and validate it
    /// with one extra round-trip before declaring success.
    ///
    /// On *any* failure (exchange, a 200 without an `access_token`, or the
    /// validation trip), the credential is fully cleared so no partial or
    /// stale token is left behind.
    ///
    /// # Returns
    /// The lightweight profile cached alongside the token.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile> {
        let form = [
            ("grant_type", "password"),
            ("username", email),
            ("password", password),
        ];
        let grant: TokenGrant = match self
            .send_json(self.http.post(self.url("/auth/token")).form(&form))
            .await
        {
            Ok(grant) => grant,
            Err(e) => {
                self.store.remove_token();
                return Err(e);
            }
        };

        let token = match grant.access_token.as_deref() {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => {
                self.store.remove_token();
                return Err(ApiError::Unexpected(
                    "login response carried no access token".to_string(),
                ));
            }
        };

        self.store.set_token(&token)?;
        let profile = UserProfile {
            username: grant.username,
            email: grant.email.or_else(|| Some(email.to_string())),
        };
        self.store.set_profile(&profile)?;

        if let Err(e) = self.validate().await {
            self.store.remove_token();
            return Err(e);
        }

        Ok(profile)
    }

    /// Registration flow: create the account, then immediately log in with
    /// the same credentials. Errors from either step surface their most
    /// specific message.
    pub async fn register_and_login(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile> {
        self.register(username, email, password).await?;
        self.login(email, password).await
    }

    /// Validation round-trip against the stored token.
    pub async fn validate(&self) -> Result<()> {
        self.require_token()?;
        self.send(self.http.get(self.url("/auth/validate"))).await?;
        Ok(())
    }

    /// Fetch the current user's profile from the server.
    pub async fn current_user(&self) -> Result<UserProfile> {
        self.require_token()?;
        self.send_json(self.http.get(self.url("/users/me"))).await
    }

    // ── Chatbots ───────────────────────────────────────────────────────

    /// All chatbots owned by the current credential.
    pub async fn list_chatbots(&self) -> Result<Vec<Chatbot>> {
        self.require_token()?;
        self.send_json(self.http.get(self.url("/chatbots/"))).await
    }

    /// One chatbot record by id.
    pub async fn get_chatbot(&self, id: &str) -> Result<Chatbot> {
        self.require_token()?;
        self.send_json(self.http.get(self.url(&format!("/chatbots/{id}"))))
            .await
    }

    /// Create a chatbot in a single multipart request carrying the form
    /// fields and every accepted knowledge file.
    ///
    /// Callers screen files first (see [`crate::knowledge::screen_files`]);
    /// this method uploads whatever it is handed.
    pub async fn create_chatbot(
        &self,
        draft: &ChatbotDraft,
        files: &[std::path::PathBuf],
    ) -> Result<CreatedChatbot> {
        self.require_token()?;
        require_draft_fields(draft)?;

        let mut form = Form::new()
            .text("name", draft.name.clone())
            .text("business_name", draft.business_name.clone())
            .text("about_business", draft.about_business.clone());
        for path in files {
            form = form.part("knowledge_base", file_part(path).await?);
        }

        self.send_json(self.http.post(self.url("/chatbots/")).multipart(form))
            .await
    }

    /// Full-record update (PUT) with the same multipart shape as create,
    /// plus the optional system prompt and any newly accepted files.
    ///
    /// This is the one call that uses the extended upload timeout. When
    /// `on_progress` is given it is invoked with `(bytes_sent, total)` as
    /// file bytes stream out; form-field overhead is not counted.
    pub async fn update_chatbot(
        &self,
        id: &str,
        draft: &ChatbotDraft,
        files: &[std::path::PathBuf],
        on_progress: Option<ProgressFn>,
    ) -> Result<()> {
        self.require_token()?;
        require_draft_fields(draft)?;

        let total: u64 = {
            let mut sum = 0;
            for path in files {
                sum += tokio::fs::metadata(path).await?.len();
            }
            sum
        };

        let mut form = Form::new()
            .text("name", draft.name.clone())
            .text("business_name", draft.business_name.clone())
            .text("about_business", draft.about_business.clone());
        if let Some(prompt) = &draft.system_prompt {
            form = form.text("system_prompt", prompt.clone());
        }

        let sent = Arc::new(std::sync::atomic::AtomicU64::new(0));
        for path in files {
            let part = match &on_progress {
                Some(progress) => {
                    streaming_file_part(path, total, Arc::clone(&sent), Arc::clone(progress))
                        .await?
                }
                None => file_part(path).await?,
            };
            form = form.part("knowledge_base", part);
        }

        self.send(
            self.http
                .put(self.url(&format!("/chatbots/{id}")))
                .timeout(self.upload_timeout)
                .multipart(form),
        )
        .await?;
        Ok(())
    }

    /// Delete a chatbot by id. Confirmation is the caller's responsibility.
    pub async fn delete_chatbot(&self, id: &str) -> Result<()> {
        self.require_token()?;
        self.send(self.http.delete(self.url(&format!("/chatbots/{id}"))))
            .await?;
        Ok(())
    }

    // ── Knowledge documents ────────────────────────────────────────────

    /// List a chatbot's uploaded knowledge documents.
    pub async fn list_files(&self, chatbot_id: &str) -> Result<Vec<KnowledgeDocument>> {
        self.require_token()?;
        let value: Value = self
            .send_json(self.http.get(self.url(&format!("/chatbots/{chatbot_id}/files"))))
            .await?;
        flatten_listing(value, &["files", "results"])
    }

    /// Delete one knowledge document by id.
    pub async fn delete_file(&self, chatbot_id: &str, file_id: &str) -> Result<()> {
        self.require_token()?;
        self.send(
            self.http
                .delete(self.url(&format!("/chatbots/{chatbot_id}/files/{file_id}"))),
        )
        .await?;
        Ok(())
    }

    // ── Chat ───────────────────────────────────────────────────────────

    /// Send one chat message. The text and, when known, the session id
    /// travel as query parameters with an empty body; the reply carries the
    /// full answer and the session id the server filed it under.
    pub async fn send_message(
        &self,
        chatbot_id: &str,
        query: &str,
        session_id: Option<&str>,
    ) -> Result<ChatReply> {
        self.require_token()?;

        let mut params = vec![("query", query.to_string())];
        if let Some(sid) = session_id {
            params.push(("session_id", sid.to_string()));
        }

        self.send_json(
            self.http
                .post(self.url(&format!("/chatbots/{chatbot_id}/chat")))
                .query(&params),
        )
        .await
    }

    /// Sessions recorded for a chatbot, whatever shape the server wraps
    /// them in.
    pub async fn list_sessions(&self, chatbot_id: &str) -> Result<Vec<ChatSession>> {
        self.require_token()?;
        let value: Value = self
            .send_json(
                self.http
                    .get(self.url("/sessions/"))
                    .query(&[("chatbot_id", chatbot_id)]),
            )
            .await?;
        flatten_listing(value, &["sessions", "results"])
    }

    /// Messages recorded for a session, whatever shape the server wraps
    /// them in.
    pub async fn list_messages(&self, session_id: &str) -> Result<Vec<ChatTurn>> {
        self.require_token()?;
        let value: Value = self
            .send_json(
                self.http
                    .get(self.url("/messages/"))
                    .query(&[("session_id", session_id)]),
            )
            .await?;
        flatten_listing(value, &["messages", "results"])
    }
}

fn require_draft_fields(draft: &ChatbotDraft) -> Result<()> {
    for (field, value) in [
        ("name", &draft.name),
        ("business name", &draft.business_name),
        ("business description", &draft.about_business),
    ] {
        if value.trim().is_empty() {
            return Err(ApiError::Invalid(format!("{field} is required")));
        }
    }
    Ok(())
}

/// Pull the most specific message out of an error response body.
///
/// Handles, in order of preference: a `detail` string; a `detail` array of
/// field-level validation objects (flattened to one display string); a
/// `message` field; the raw body; and finally the bare status.
async fn extract_error_detail(response: reqwest::Response) -> String {
    let status = response.status();
    let raw = response.text().await.unwrap_or_default();

    if let Ok(value) = serde_json::from_str::<Value>(&raw) {
        match value.get("detail") {
            Some(Value::String(s)) => return s.clone(),
            Some(Value::Array(items)) => {
                let flattened: Vec<String> = items
                    .iter()
                    .map(|item| {
                        let field = item
                            .get("loc")
                            .and_then(|loc| loc.as_array())
                            .and_then(|loc| loc.last())
                            .and_then(|f| f.as_str())
                            .unwrap_or("field");
                        let msg = item
                            .get("msg")
                            .and_then(|m| m.as_str())
                            .unwrap_or("invalid");
                        format!("{field}: {msg}")
                    })
                    .collect();
                if !flattened.is_empty() {
                    return flattened.join("; ");
                }
            }
            _ => {}
        }
        if let Some(msg) = value.get("message").and_then(|m| m.as_str()) {
            return msg.to_string();
        }
    }

    if !raw.trim().is_empty() {
        raw.trim().to_string()
    } else {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    }
}

/// Canonicalize a listing payload: a bare array passes through, and any of
/// the known wrapper keys is unwrapped. Every call site gets a plain
/// `Vec<T>` no matter which shape the server chose.
fn flatten_listing<T: DeserializeOwned>(value: Value, keys: &[&str]) -> Result<Vec<T>> {
    match value {
        Value::Array(_) => Ok(serde_json::from_value(value)?),
        Value::Object(mut map) => {
            for key in keys {
                if let Some(inner) = map.remove(*key) {
                    return Ok(serde_json::from_value(inner)?);
                }
            }
            Err(ApiError::Unexpected(format!(
                "unrecognized listing shape (expected an array or one of: {})",
                keys.join(", ")
            )))
        }
        other => Err(ApiError::Unexpected(format!(
            "unrecognized listing payload: {other}"
        ))),
    }
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("md") => "text/markdown",
        _ => "text/plain",
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string())
}

/// Build a multipart part by reading the whole file. Screened files are at
/// most 10 MB, so buffering is fine here.
async fn file_part(path: &Path) -> Result<Part> {
    let bytes = tokio::fs::read(path).await?;
    Part::bytes(bytes)
        .file_name(file_name_of(path))
        .mime_str(mime_for(path))
        .map_err(|e| ApiError::Unexpected(format!("invalid MIME type: {e}")))
}

const UPLOAD_CHUNK_BYTES: usize = 64 * 1024;

/// Build a multipart part that streams the file in fixed chunks, bumping
/// the shared sent-byte counter and invoking the progress callback as each
/// chunk leaves.
async fn streaming_file_part(
    path: &Path,
    total: u64,
    sent: Arc<std::sync::atomic::AtomicU64>,
    on_progress: ProgressFn,
) -> Result<Part> {
    use std::sync::atomic::Ordering;

    let bytes = tokio::fs::read(path).await?;
    let len = bytes.len() as u64;

    let chunks: Vec<Vec<u8>> = bytes
        .chunks(UPLOAD_CHUNK_BYTES)
        .map(|c| c.to_vec())
        .collect();

    let stream = futures::stream::iter(chunks.into_iter().map(move |chunk| {
        let so_far = sent.fetch_add(chunk.len() as u64, Ordering::Relaxed) + chunk.len() as u64;
        on_progress(so_far, total);
        Ok::<Vec<u8>, std::io::Error>(chunk)
    }));

    Part::stream_with_length(Body::wrap_stream(stream), len)
        .file_name(file_name_of(path))
        .mime_str(mime_for(path))
        .map_err(|e| ApiError::Unexpected(format!("invalid MIME type: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use tempfile::tempdir;

    fn client_for(server: &MockServer) -> (tempfile::TempDir, ApiClient) {
        let dir = tempdir().unwrap();
        let store = CredentialStore::open_at(dir.path()).unwrap();
        let config = BotdeckConfig {
            api_base: server.base_url(),
            ..BotdeckConfig::default()
        };
        let client = ApiClient::new(&config, store).unwrap();
        (dir, client)
    }

    fn logged_in(client: &ApiClient) {
        client.store().set_token("tok-abc").unwrap();
    }

    #[tokio::test]
    async fn login_stores_token_and_profile_after_validation() {
        let server = MockServer::start_async().await;
        let (_dir, client) = client_for(&server);

        let token = server.mock(|when, then| {
            when.method(POST)
                .path("/auth/token")
                .body_includes("grant_type=password")
                .body_includes("username=alice%40x.com");
            then.status(200).json_body(serde_json::json!({
                "access_token": "tok-abc",
                "username": "alice",
                "email": "alice@x.com"
            }));
        });
        let validate = server.mock(|when, then| {
            when.method(GET)
                .path("/auth/validate")
                .header("authorization", "Bearer tok-abc");
            then.status(200);
        });

        let profile = client.login("alice@x.com", "secret1").await.unwrap();
        token.assert();
        validate.assert();
        assert_eq!(profile.username.as_deref(), Some("alice"));
        assert_eq!(client.store().token().as_deref(), Some("tok-abc"));
        assert!(client.store().is_authenticated());
    }

    #[tokio::test]
    async fn login_without_access_token_leaves_store_empty() {
        let server = MockServer::start_async().await;
        let (_dir, client) = client_for(&server);

        server.mock(|when, then| {
            when.method(POST).path("/auth/token");
            then.status(200)
                .json_body(serde_json::json!({ "username": "alice" }));
        });

        let result = client.login("alice@x.com", "secret1").await;
        assert!(result.is_err());
        assert!(!client.store().is_authenticated());
    }

    #[tokio::test]
    async fn failed_validation_clears_the_fresh_token() {
        let server = MockServer::start_async().await;
        let (_dir, client) = client_for(&server);

        server.mock(|when, then| {
            when.method(POST).path("/auth/token");
            then.status(200)
                .json_body(serde_json::json!({ "access_token": "tok-bad" }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/auth/validate");
            then.status(401);
        });

        let result = client.login("alice@x.com", "secret1").await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
        assert!(!client.store().is_authenticated());
    }

    #[tokio::test]
    async fn any_unauthorized_response_clears_the_credential() {
        let server = MockServer::start_async().await;
        let (_dir, client) = client_for(&server);
        logged_in(&client);

        server.mock(|when, then| {
            when.method(GET).path("/chatbots/");
            then.status(401);
        });

        let result = client.list_chatbots().await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
        assert!(!client.store().is_authenticated());
    }

    #[tokio::test]
    async fn operations_without_a_token_never_hit_the_network() {
        let server = MockServer::start_async().await;
        let (_dir, client) = client_for(&server);

        let any = server.mock(|when, then| {
            when.any_request();
            then.status(200).json_body(serde_json::json!([]));
        });

        assert!(matches!(
            client.list_chatbots().await,
            Err(ApiError::MissingCredential)
        ));
        assert!(matches!(
            client.send_message("b1", "hi", None).await,
            Err(ApiError::MissingCredential)
        ));
        any.assert_calls(0);
    }

    #[tokio::test]
    async fn register_enforces_minimums_client_side() {
        let server = MockServer::start_async().await;
        let (_dir, client) = client_for(&server);

        let users = server.mock(|when, then| {
            when.method(POST).path("/users");
            then.status(201);
        });

        assert!(matches!(
            client.register("al", "al@x.com", "secret1").await,
            Err(ApiError::Invalid(_))
        ));
        assert!(matches!(
            client.register("alice", "alice@x.com", "short").await,
            Err(ApiError::Invalid(_))
        ));
        users.assert_calls(0);

        client.register("alice", "alice@x.com", "secret1").await.unwrap();
        users.assert_calls(1);
    }

    #[tokio::test]
    async fn register_and_login_yields_a_usable_session() {
        let server = MockServer::start_async().await;
        let (_dir, client) = client_for(&server);

        server.mock(|when, then| {
            when.method(POST).path("/users");
            then.status(201);
        });
        server.mock(|when, then| {
            when.method(POST).path("/auth/token");
            then.status(200)
                .json_body(serde_json::json!({ "access_token": "tok-new" }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/auth/validate");
            then.status(200);
        });

        let profile = client
            .register_and_login("alice", "alice@x.com", "secret1")
            .await
            .unwrap();
        assert_eq!(client.store().token().as_deref(), Some("tok-new"));
        assert_eq!(profile.email.as_deref(), Some("alice@x.com"));
    }

    #[tokio::test]
    async fn validation_errors_are_flattened_to_one_string() {
        let server = MockServer::start_async().await;
        let (_dir, client) = client_for(&server);

        server.mock(|when, then| {
            when.method(POST).path("/users");
            then.status(422).json_body(serde_json::json!({
                "detail": [
                    { "loc": ["body", "email"], "msg": "value is not a valid email address" },
                    { "loc": ["body", "username"], "msg": "already taken" }
                ]
            }));
        });

        let err = client
            .register("alice", "nope", "secret1")
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("email: value is not a valid email address"));
        assert!(msg.contains("username: already taken"));
    }

    #[tokio::test]
    async fn send_message_carries_query_and_session_parameters() {
        let server = MockServer::start_async().await;
        let (_dir, client) = client_for(&server);
        logged_in(&client);

        let chat = server.mock(|when, then| {
            when.method(POST)
                .path("/chatbots/b1/chat")
                .query_param("query", "hello")
                .query_param("session_id", "s1");
            then.status(200).json_body(serde_json::json!({
                "answer": "hi there",
                "session_id": "s1"
            }));
        });

        let reply = client.send_message("b1", "hello", Some("s1")).await.unwrap();
        chat.assert();
        assert_eq!(reply.answer, "hi there");
        assert_eq!(reply.session_id.as_deref(), Some("s1"));
    }

    #[tokio::test]
    async fn create_chatbot_posts_multipart_and_returns_id() {
        let server = MockServer::start_async().await;
        let (_dir, client) = client_for(&server);
        logged_in(&client);

        let dir = tempdir().unwrap();
        let doc = dir.path().join("guide.md");
        std::fs::write(&doc, "# guide").unwrap();

        let create = server.mock(|when, then| {
            when.method(POST)
                .path("/chatbots/")
                .header_includes("content-type", "multipart/form-data");
            then.status(200).json_body(serde_json::json!({
                "chatbot_id": "b9",
                "message": "created"
            }));
        });

        let draft = ChatbotDraft {
            name: "Bot1".into(),
            business_name: "Biz".into(),
            about_business: "desc".into(),
            system_prompt: None,
        };
        let created = client.create_chatbot(&draft, &[doc]).await.unwrap();
        create.assert();
        assert_eq!(created.chatbot_id, "b9");
    }

    #[tokio::test]
    async fn create_chatbot_requires_the_three_form_fields() {
        let server = MockServer::start_async().await;
        let (_dir, client) = client_for(&server);
        logged_in(&client);

        let draft = ChatbotDraft {
            name: "Bot1".into(),
            business_name: "  ".into(),
            about_business: "desc".into(),
            system_prompt: None,
        };
        assert!(matches!(
            client.create_chatbot(&draft, &[]).await,
            Err(ApiError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn update_chatbot_reports_byte_progress() {
        let server = MockServer::start_async().await;
        let (_dir, client) = client_for(&server);
        logged_in(&client);

        let dir = tempdir().unwrap();
        let doc = dir.path().join("notes.txt");
        std::fs::write(&doc, vec![b'x'; 200_000]).unwrap();

        server.mock(|when, then| {
            when.method(PUT).path("/chatbots/b1");
            then.status(200)
                .json_body(serde_json::json!({ "message": "updated" }));
        });

        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let draft = ChatbotDraft {
            name: "Bot1".into(),
            business_name: "Biz".into(),
            about_business: "desc".into(),
            system_prompt: Some("be nice".into()),
        };
        client
            .update_chatbot(
                "b1",
                &draft,
                &[doc],
                Some(Arc::new(move |sent, total| {
                    sink.lock().unwrap().push((sent, total));
                })),
            )
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert!(!seen.is_empty());
        let (last_sent, total) = *seen.last().unwrap();
        assert_eq!(last_sent, 200_000);
        assert_eq!(total, 200_000);
    }

    #[tokio::test]
    async fn listings_are_canonicalized_from_every_known_shape() {
        let bare = serde_json::json!([{ "id": "s1" }]);
        let keyed = serde_json::json!({ "sessions": [{ "id": "s1" }] });
        let results = serde_json::json!({ "results": [{ "id": "s1" }] });

        for value in [bare, keyed, results] {
            let sessions: Vec<ChatSession> =
                flatten_listing(value, &["sessions", "results"]).unwrap();
            assert_eq!(sessions.len(), 1);
            assert_eq!(sessions[0].id, "s1");
        }

        let unknown = serde_json::json!({ "items": [] });
        assert!(flatten_listing::<ChatSession>(unknown, &["sessions"]).is_err());
    }

    #[tokio::test]
    async fn delete_chatbot_issues_the_destructive_call() {
        let server = MockServer::start_async().await;
        let (_dir, client) = client_for(&server);
        logged_in(&client);

        let delete = server.mock(|when, then| {
            when.method(DELETE)
                .path("/chatbots/b1")
                .header("authorization", "Bearer tok-abc");
            then.status(204);
        });

        client.delete_chatbot("b1").await.unwrap();
        delete.assert();
    }

    #[tokio::test]
    async fn structured_error_detail_string_is_surfaced_verbatim() {
        let server = MockServer::start_async().await;
        let (_dir, client) = client_for(&server);
        logged_in(&client);

        server.mock(|when, then| {
            when.method(GET).path("/chatbots/b404");
            then.status(404)
                .json_body(serde_json::json!({ "detail": "Chatbot not found" }));
        });

        let err = client.get_chatbot("b404").await.unwrap_err();
        match err {
            ApiError::Api { status, detail } => {
                assert_eq!(status, 404);
                assert_eq!(detail, "Chatbot not found");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
