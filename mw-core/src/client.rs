//! MediaWiki client implementation.
//!
//! [`MediaWiki`] wraps one `api.php` endpoint. [`MediaWiki::call`] is the
//! whole protocol: parameters in, decoded JSON out. On top of that the
//! client keeps a small amount of session-derived state:
//!
//! - whether the current user has the `apihighlimits` right ([`MediaWiki::limits`])
//! - the wiki's namespace table ([`MediaWiki::namespaces`])
//!
//! Both are fetched lazily and dropped whenever the session changes through
//! [`MediaWiki::login`] or [`MediaWiki::logout`], since a different user can
//! see different rights and namespaces.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cookies::CookieJar;
use crate::error::{MwError, MwResult, ProtocolError, TransportError};
use crate::fetch::{self, Params, RequestOptions};
use crate::transport::{http::HttpTransport, ClientConfig, HttpAuth, Transport, TransportInfo};
use crate::user_agent::DEFAULT_USER_AGENT;

/// Right that unlocks the larger per-request batch sizes.
const HIGH_LIMITS_RIGHT: &str = "apihighlimits";

/// Namespaces of a wiki, split by sign of their id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceTable {
    /// Namespaces that hold pages (id >= 0)
    pub content: BTreeMap<i64, String>,
    /// Virtual namespaces such as Special and Media (id < 0)
    pub pseudo: BTreeMap<i64, String>,
}

impl NamespaceTable {
    /// Build the table from a `query.namespaces` object.
    fn from_siteinfo(namespaces: &serde_json::Map<String, Value>) -> MwResult<Self> {
        let mut table = Self::default();

        for (key, entry) in namespaces {
            let id: i64 = key.trim().parse().map_err(|_| ProtocolError::InvalidNamespaceId {
                id: key.clone(),
            })?;

            // "*" in the legacy format, "name" with formatversion=2
            let name = entry
                .get("*")
                .or_else(|| entry.get("name"))
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    MwError::missing_field("siteinfo", format!("query.namespaces.{}.*", key))
                })?;

            if id >= 0 {
                table.content.insert(id, name.to_string());
            } else {
                table.pseudo.insert(id, name.to_string());
            }
        }

        Ok(table)
    }

    /// Content namespaces, plus pseudo-namespaces when `include_pseudo` is set.
    pub fn select(&self, include_pseudo: bool) -> BTreeMap<i64, String> {
        let mut selected = self.content.clone();
        if include_pseudo {
            selected.extend(self.pseudo.iter().map(|(id, name)| (*id, name.clone())));
        }
        selected
    }
}

/// Client for a single MediaWiki API endpoint.
///
/// All operations take `&mut self`: the caches and cookie file are updated
/// in place, so one client must not be driven from several tasks at once.
/// Each operation finishes its network round-trips before returning.
///
/// # Example
///
/// ```rust,no_run
/// use mw_core::MediaWiki;
///
/// # async fn example() -> mw_core::MwResult<()> {
/// let mut wiki = MediaWiki::new("https://en.wikipedia.org/w/api.php")?;
/// let page = wiki
///     .call([("action", "query"), ("prop", "revisions"), ("titles", "Main Page")])
///     .await?;
/// println!("{}", page["query"]["pages"]);
/// # Ok(())
/// # }
/// ```
pub struct MediaWiki {
    endpoint: String,
    transport: Box<dyn Transport>,
    options: RequestOptions,
    cookies: CookieJar,
    high_limits: Option<bool>,
    namespaces: Option<NamespaceTable>,
}

impl MediaWiki {
    /// Create a client for `endpoint` with default settings and in-memory cookies.
    pub fn new(endpoint: impl Into<String>) -> MwResult<Self> {
        MediaWikiBuilder::new(endpoint).build()
    }

    /// Start building a client for `endpoint`.
    pub fn builder(endpoint: impl Into<String>) -> MediaWikiBuilder {
        MediaWikiBuilder::new(endpoint)
    }

    /// Create a client from a [`ClientConfig`].
    pub fn from_config(config: ClientConfig) -> MwResult<Self> {
        config.validate()?;

        let mut builder = MediaWikiBuilder::new(config.endpoint.as_str())
            .user_agent(config.user_agent);
        if let Some(auth) = config.http_auth {
            builder = builder.http_auth(auth.username, auth.password);
        }
        if let Some(path) = config.cookie_file {
            builder = builder.cookie_file(path);
        }
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        builder.build()
    }

    /// Current API endpoint (may have been corrected by [`MediaWiki::normalize_endpoint`]).
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Cookie jar handed to the default HTTP transport.
    ///
    /// Custom transports installed with [`MediaWikiBuilder::transport`]
    /// manage their own cookies and ignore this jar.
    pub fn cookie_jar(&self) -> &CookieJar {
        &self.cookies
    }

    /// Statistics of the underlying transport.
    pub fn transport_info(&self) -> TransportInfo {
        self.transport.get_info()
    }

    /// Make an API call and decode the JSON response.
    ///
    /// `format` is always sent as `json`, overriding any caller value. The
    /// parameters travel in a POST body.
    ///
    /// # Errors
    ///
    /// * `MwError::Transport` - the request failed or returned a non-2xx status
    /// * `MwError::Decode` - the body is not JSON
    pub async fn call<I, K, V>(&mut self, params: I) -> MwResult<Value>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.call_params(fetch::to_params(params)).await
    }

    /// Send `params` to an arbitrary `url` and return the body text undecoded.
    ///
    /// Applies the same request decoration as [`MediaWiki::call`]. With
    /// `force_get` the parameters are sent as a GET query string.
    pub async fn fetch<I, K, V>(&mut self, url: &str, params: I, force_get: bool) -> MwResult<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.fetch_raw(url, fetch::to_params(params), force_get)
            .await
    }

    async fn call_params(&mut self, params: Params) -> MwResult<Value> {
        let endpoint = self.endpoint.clone();
        let text = self.fetch_raw(&endpoint, params, false).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Send one request and return the decoded body text.
    async fn fetch_raw(&mut self, url: &str, params: Params, force_get: bool) -> MwResult<String> {
        debug!(
            "API request to {} ({}), params: {:?}",
            url,
            if force_get { "GET" } else { "POST" },
            params.keys().collect::<Vec<_>>()
        );

        let request = fetch::build_request(url, params, force_get, &self.options);
        let response = self.transport.send(request).await?;

        debug!(
            "API response: status {}, content-encoding {:?}, {} bytes",
            response.status,
            response.header("content-encoding"),
            response.body.len()
        );

        fetch::decode_response(response)
    }

    /// Check that the endpoint really is `api.php`, correcting it if possible.
    ///
    /// Probes the configured URL with a `siteinfo` query. If that does not
    /// yield JSON and the URL contains `index.php`, the sibling `api.php` is
    /// tried and, on success, becomes the client's endpoint.
    ///
    /// Returns the working endpoint, or `None` if no candidate answered. A
    /// probe that returns an HTTP error status or a non-JSON body counts as
    /// failed; only lower-level transport failures are returned as errors.
    pub async fn normalize_endpoint(&mut self) -> MwResult<Option<String>> {
        let configured = self.endpoint.clone();
        if self.probe(&configured).await? {
            return Ok(Some(configured));
        }

        if let Some(index) = configured.find("index.php") {
            let candidate = format!("{}api.php", &configured[..index]);
            if self.probe(&candidate).await? {
                info!("Corrected API endpoint from {} to {}", configured, candidate);
                self.endpoint = candidate.clone();
                return Ok(Some(candidate));
            }
        }

        warn!("Could not find a working API endpoint for {}", configured);
        Ok(None)
    }

    async fn probe(&mut self, url: &str) -> MwResult<bool> {
        let params = fetch::to_params([("action", "query"), ("meta", "siteinfo")]);

        match self.fetch_raw(url, params, true).await {
            Ok(text) => {
                let is_api = serde_json::from_str::<Value>(&text)
                    .map(|value| value.is_object())
                    .unwrap_or(false);
                debug!("Probe of {}: api response = {}", url, is_api);
                Ok(is_api)
            }
            Err(MwError::Decode(e)) => {
                debug!("Probe of {} returned undecodable body: {}", url, e);
                Ok(false)
            }
            Err(MwError::Transport(TransportError::HttpError { status_code, .. })) => {
                debug!("Probe of {} failed with HTTP {}", url, status_code);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Log in as `user`.
    ///
    /// Handles the token handshake: if the wiki answers `NeedToken`, the
    /// login is resent once with the supplied `lgtoken`. Returns `Ok(true)`
    /// on `Success` and `Ok(false)` for any other outcome, including a
    /// second `NeedToken`.
    pub async fn login(
        &mut self,
        user: &str,
        password: &str,
        domain: Option<&str>,
    ) -> MwResult<bool> {
        let mut token: Option<String> = None;

        loop {
            let mut params =
                fetch::to_params([("action", "login"), ("lgname", user), ("lgpassword", password)]);
            if let Some(domain) = domain.filter(|d| !d.is_empty()) {
                params.insert("lgdomain".to_string(), domain.to_string());
            }
            if let Some(token) = &token {
                params.insert("lgtoken".to_string(), token.clone());
            }

            let response = self.call_params(params).await?;
            let result = response
                .pointer("/login/result")
                .and_then(Value::as_str)
                .ok_or_else(|| MwError::missing_field("login", "login.result"))?;

            match result {
                "Success" => {
                    info!("Logged in to {} as {}", self.endpoint, user);
                    self.invalidate_session_cache();
                    return Ok(true);
                }
                "NeedToken" if token.is_none() => {
                    let issued = response
                        .pointer("/login/token")
                        .and_then(Value::as_str)
                        .ok_or_else(|| MwError::missing_field("login", "login.token"))?;
                    debug!("Login requires a token, resending once");
                    token = Some(issued.to_string());
                }
                other => {
                    warn!("Login to {} as {} failed: {}", self.endpoint, user, other);
                    return Ok(false);
                }
            }
        }
    }

    /// Log out. Always returns `true` once the request completed.
    pub async fn logout(&mut self) -> MwResult<bool> {
        self.call_params(fetch::to_params([("action", "logout")]))
            .await?;
        info!("Logged out of {}", self.endpoint);
        self.invalidate_session_cache();
        Ok(true)
    }

    /// Pick a batch size: `high` if the session has `apihighlimits`, else `low`.
    ///
    /// The user's rights are fetched on first use and cached until the next
    /// login or logout.
    pub async fn limits<T>(&mut self, low: T, high: T) -> MwResult<T> {
        let high_limits = match self.high_limits {
            Some(cached) => cached,
            None => {
                let response = self
                    .call([("action", "query"), ("meta", "userinfo"), ("uiprop", "rights")])
                    .await?;
                let rights = response
                    .pointer("/query/userinfo/rights")
                    .and_then(Value::as_array)
                    .ok_or_else(|| MwError::missing_field("userinfo", "query.userinfo.rights"))?;
                let has_right = rights
                    .iter()
                    .any(|right| right.as_str() == Some(HIGH_LIMITS_RIGHT));
                debug!("Session has {}: {}", HIGH_LIMITS_RIGHT, has_right);
                self.high_limits = Some(has_right);
                has_right
            }
        };

        Ok(if high_limits { high } else { low })
    }

    /// Namespace ids and names of this wiki.
    ///
    /// Pseudo-namespaces (negative ids such as Special and Media) are
    /// included when `include_pseudo` is set. The table is fetched once and
    /// cached until the next login or logout, whatever `include_pseudo` is.
    pub async fn namespaces(&mut self, include_pseudo: bool) -> MwResult<BTreeMap<i64, String>> {
        let table = match self.namespaces.take() {
            Some(table) => table,
            None => self.fetch_namespaces().await?,
        };

        let selected = table.select(include_pseudo);
        self.namespaces = Some(table);
        Ok(selected)
    }

    async fn fetch_namespaces(&mut self) -> MwResult<NamespaceTable> {
        let response = self
            .call([("action", "query"), ("meta", "siteinfo"), ("siprop", "namespaces")])
            .await?;
        let namespaces = response
            .pointer("/query/namespaces")
            .and_then(Value::as_object)
            .ok_or_else(|| MwError::missing_field("siteinfo", "query.namespaces"))?;

        let table = NamespaceTable::from_siteinfo(namespaces)?;
        debug!(
            "Loaded {} content and {} pseudo namespaces",
            table.content.len(),
            table.pseudo.len()
        );
        Ok(table)
    }

    /// Forget the cached rights and namespace table.
    ///
    /// Called automatically on login and logout; call it yourself if the
    /// session changes some other way (for example through a shared cookie jar).
    pub fn invalidate_session_cache(&mut self) {
        debug!("Invalidating session cache");
        self.high_limits = None;
        self.namespaces = None;
    }
}

impl std::fmt::Debug for MediaWiki {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaWiki")
            .field("endpoint", &self.endpoint)
            .field("user_agent", &self.options.user_agent)
            .field("cookies", &self.cookies)
            .field("high_limits", &self.high_limits)
            .field("namespaces_cached", &self.namespaces.is_some())
            .finish()
    }
}

/// Builder for creating clients with custom configuration.
pub struct MediaWikiBuilder {
    endpoint: String,
    user_agent: String,
    http_auth: Option<HttpAuth>,
    cookie_jar: Option<CookieJar>,
    cookie_file: Option<PathBuf>,
    timeout: Option<Duration>,
    transport: Option<Box<dyn Transport>>,
}

impl MediaWikiBuilder {
    /// Create a new builder for `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            http_auth: None,
            cookie_jar: None,
            cookie_file: None,
            timeout: None,
            transport: None,
        }
    }

    /// Set the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Send HTTP basic-auth credentials with every request.
    pub fn http_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.http_auth = Some(HttpAuth::new(username, password));
        self
    }

    /// Use an existing cookie jar. Takes precedence over [`Self::cookie_file`].
    pub fn cookie_jar(mut self, jar: CookieJar) -> Self {
        self.cookie_jar = Some(jar);
        self
    }

    /// Persist cookies to `path`, creating it if needed.
    pub fn cookie_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cookie_file = Some(path.into());
        self
    }

    /// Set the request timeout of the default transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replace the default reqwest transport.
    pub fn transport(mut self, transport: Box<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client.
    pub fn build(self) -> MwResult<MediaWiki> {
        let mut config = ClientConfig::new(&self.endpoint)?.user_agent(self.user_agent);
        if let Some(auth) = self.http_auth {
            config = config.http_auth(auth);
        }
        config.validate()?;

        let cookies = match (self.cookie_jar, self.cookie_file) {
            (Some(jar), _) => jar,
            (None, Some(path)) => CookieJar::load(path)?,
            (None, None) => CookieJar::in_memory(),
        };

        let transport = match self.transport {
            Some(transport) => transport,
            None => Box::new(HttpTransport::new(cookies.clone(), self.timeout)?),
        };

        Ok(MediaWiki {
            endpoint: self.endpoint,
            transport,
            options: RequestOptions {
                user_agent: config.user_agent,
                http_auth: config.http_auth,
            },
            cookies,
            high_limits: None,
            namespaces: None,
        })
    }
}
