//! Blocking wrapper around the async client.
//!
//! Each [`MediaWiki`] owns a single-threaded tokio runtime and drives the
//! async client on it, so every method returns only after its network
//! round-trips have completed.
//!
//! Do not use this from inside an async context; blocking on a runtime from
//! within another runtime panics. Use [`crate::MediaWiki`] there instead.

use std::collections::BTreeMap;

use serde_json::Value;
use tokio::runtime::{Builder, Runtime};

use crate::client::MediaWiki as AsyncMediaWiki;
use crate::cookies::CookieJar;
use crate::error::MwResult;
use crate::transport::{ClientConfig, TransportInfo};

/// Blocking MediaWiki client.
pub struct MediaWiki {
    inner: AsyncMediaWiki,
    runtime: Runtime,
}

impl MediaWiki {
    /// Create a client for `endpoint` with default settings.
    pub fn new(endpoint: impl Into<String>) -> MwResult<Self> {
        Self::from_async(AsyncMediaWiki::new(endpoint)?)
    }

    /// Create a client from a [`ClientConfig`].
    pub fn from_config(config: ClientConfig) -> MwResult<Self> {
        Self::from_async(AsyncMediaWiki::from_config(config)?)
    }

    /// Wrap an async client, e.g. one made with [`crate::MediaWikiBuilder`].
    pub fn from_async(inner: AsyncMediaWiki) -> MwResult<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self { inner, runtime })
    }

    /// Unwrap the async client.
    pub fn into_inner(self) -> AsyncMediaWiki {
        self.inner
    }

    /// See [`crate::MediaWiki::endpoint`].
    pub fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }

    /// See [`crate::MediaWiki::cookie_jar`].
    pub fn cookie_jar(&self) -> &CookieJar {
        self.inner.cookie_jar()
    }

    /// See [`crate::MediaWiki::transport_info`].
    pub fn transport_info(&self) -> TransportInfo {
        self.inner.transport_info()
    }

    /// See [`crate::MediaWiki::call`].
    pub fn call<I, K, V>(&mut self, params: I) -> MwResult<Value>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.runtime.block_on(self.inner.call(params))
    }

    /// See [`crate::MediaWiki::fetch`].
    pub fn fetch<I, K, V>(&mut self, url: &str, params: I, force_get: bool) -> MwResult<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.runtime
            .block_on(self.inner.fetch(url, params, force_get))
    }

    /// See [`crate::MediaWiki::normalize_endpoint`].
    pub fn normalize_endpoint(&mut self) -> MwResult<Option<String>> {
        self.runtime.block_on(self.inner.normalize_endpoint())
    }

    /// See [`crate::MediaWiki::login`].
    pub fn login(&mut self, user: &str, password: &str, domain: Option<&str>) -> MwResult<bool> {
        self.runtime
            .block_on(self.inner.login(user, password, domain))
    }

    /// See [`crate::MediaWiki::logout`].
    pub fn logout(&mut self) -> MwResult<bool> {
        self.runtime.block_on(self.inner.logout())
    }

    /// See [`crate::MediaWiki::limits`].
    pub fn limits<T>(&mut self, low: T, high: T) -> MwResult<T> {
        self.runtime.block_on(self.inner.limits(low, high))
    }

    /// See [`crate::MediaWiki::namespaces`].
    pub fn namespaces(&mut self, include_pseudo: bool) -> MwResult<BTreeMap<i64, String>> {
        self.runtime.block_on(self.inner.namespaces(include_pseudo))
    }

    /// See [`crate::MediaWiki::invalidate_session_cache`].
    pub fn invalidate_session_cache(&mut self) {
        self.inner.invalidate_session_cache();
    }
}

impl std::fmt::Debug for MediaWiki {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MediaWiki").field(&self.inner).finish()
    }
}
