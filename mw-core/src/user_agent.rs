//! `User-Agent` strings.
//!
//! Wikimedia wikis reject or throttle clients without an identifying user
//! agent, so applications should build their own with [`build_user_agent`].

/// User agent sent when the application does not provide one.
pub const DEFAULT_USER_AGENT: &str = concat!("mw-core/", env!("CARGO_PKG_VERSION"));

/// Build a user agent that lets wiki operators identify and contact the
/// application, e.g. `WikiBot/2.1 mw-core/0.1.0 (+https://example.org/bot)`.
pub fn build_user_agent(application: &str, version: &str, contact_url: &str) -> String {
    format!(
        "{}/{} {} (+{})",
        application, version, DEFAULT_USER_AGENT, contact_url
    )
}
