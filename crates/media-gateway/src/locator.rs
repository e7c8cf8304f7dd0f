//! Stream locator parsing.
//!
//! Media servers hand out play URLs in several dialects (`rtmp://`,
//! `webrtc://`, `rtc://`, plain `http(s)://`). [`parse`] decomposes any of
//! them into a [`CanonicalLocator`] without performing I/O. Odd locators never
//! abort a playback attempt here: anything that cannot be split yields a
//! record with empty application and stream fields, and the signaling round
//! trip surfaces the real failure.

use std::net::Ipv4Addr;
use tracing::debug;
use url::Url;

/// Virtual host used when the locator names its server by IPv4 literal.
pub const DEFAULT_VHOST: &str = "__defaultVhost__";

/// Path marker some players embed in the application segment to carry a vhost.
const VHOST_MARKER: &str = "...vhost...";

/// Pseudo-schemes rewritten to `http://` before splitting, in rewrite order.
const PSEUDO_SCHEMES: [&str; 3] = ["rtmp://", "webrtc://", "rtc://"];

/// Schema assumed when the locator carries none.
const DEFAULT_SCHEMA: &str = "rtmp";

/// Query parameters in first-seen key order.
///
/// A repeated key keeps its original position and takes the later value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Split a raw query string (with or without the leading `?`).
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let query = query.split_once('?').map_or(query, |(_, rest)| rest);
        let mut params = Self::default();
        for elem in query.split('&').filter(|e| !e.is_empty()) {
            let mut parts = elem.split('=');
            let key = parts.next().unwrap_or_default();
            let value = parts.next().unwrap_or_default();
            params.insert(key, value);
        }
        params
    }

    /// Set `key` to `value`, keeping the key's position if it already exists.
    pub fn insert(&mut self, key: &str, value: &str) {
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.0.push((key.to_string(), value.to_string())),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Like [`QueryParams::get`] but treats an empty value as absent.
    #[must_use]
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Normalised decomposition of a stream locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalLocator {
    /// The locator exactly as given.
    pub url: String,
    /// Scheme token of the original locator (`rtmp`, `webrtc`, `https`, ...).
    pub schema: String,
    /// Host that serves signaling for this stream.
    pub server: String,
    /// Port from the locator, or the scheme default for http/https/rtmp.
    pub port: Option<u16>,
    pub vhost: String,
    /// Path between the leading slash and the final slash.
    pub app: String,
    /// Path segment after the final slash.
    pub stream: String,
    pub query: QueryParams,
}

/// Parse a stream locator. Pure; never fails.
#[must_use]
pub fn parse(locator: &str) -> CanonicalLocator {
    let schema = locator
        .split_once("://")
        .map(|(scheme, _)| scheme)
        .filter(|scheme| !scheme.is_empty())
        .unwrap_or(DEFAULT_SCHEMA)
        .to_string();

    let splittable = rewrite_pseudo_scheme(locator);

    let (server, explicit_port, path, raw_query) = match Url::parse(&splittable) {
        Ok(url) => (
            url.host_str().unwrap_or_default().to_string(),
            url.port(),
            url.path().to_string(),
            url.query().unwrap_or_default().to_string(),
        ),
        Err(e) => {
            debug!(target: "mg.locator", error = %e, locator = %locator, "Locator could not be split, using best-effort record");
            let raw_query = locator
                .split_once('?')
                .map(|(_, q)| q.to_string())
                .unwrap_or_default();
            (String::new(), None, String::new(), raw_query)
        }
    };

    let (mut app, stream) = split_path(&path);
    let query = QueryParams::from_query(&raw_query);

    let mut vhost = server.clone();

    if app.contains(VHOST_MARKER) {
        let rewritten = app.replacen(VHOST_MARKER, "?vhost=", 1);
        if let Some((bare_app, params)) = rewritten.split_once('?') {
            if let Some(marker_vhost) = QueryParams::from_query(params).get_non_empty("vhost") {
                vhost = marker_vhost.to_string();
            }
            app = bare_app.to_string();
        }
    }

    if let Some(query_vhost) = query.get_non_empty("vhost") {
        vhost = query_vhost.to_string();
    }
    if let Some(domain) = query.get_non_empty("domain") {
        vhost = domain.to_string();
    }

    if vhost == server && server.parse::<Ipv4Addr>().is_ok() {
        vhost = DEFAULT_VHOST.to_string();
    }

    let port = explicit_port
        .or_else(|| pseudo_scheme_port(locator, &schema))
        .or_else(|| default_port(&schema));

    let parsed = CanonicalLocator {
        url: locator.to_string(),
        schema,
        server,
        port,
        vhost,
        app,
        stream,
        query,
    };

    debug!(
        target: "mg.locator",
        schema = %parsed.schema,
        server = %parsed.server,
        port = ?parsed.port,
        vhost = %parsed.vhost,
        app = %parsed.app,
        stream = %parsed.stream,
        "Parsed stream locator"
    );

    parsed
}

/// Rewrite the first pseudo-scheme occurrence to `http://` so a standard URL
/// splitter accepts it. Scheme-less locators get `http://` prepended.
fn rewrite_pseudo_scheme(locator: &str) -> String {
    if !locator.contains("://") {
        return format!("http://{locator}");
    }
    PSEUDO_SCHEMES
        .iter()
        .fold(locator.to_string(), |acc, scheme| {
            acc.replacen(scheme, "http://", 1)
        })
}

fn split_path(path: &str) -> (String, String) {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    match trimmed.rsplit_once('/') {
        Some((app, stream)) => (app.to_string(), stream.to_string()),
        None => (String::new(), trimmed.to_string()),
    }
}

/// Explicit port of a non-http locator. The `http://` rewrite hides `:80`
/// because `Url` drops a scheme's default port; non-special schemes keep it.
fn pseudo_scheme_port(locator: &str, schema: &str) -> Option<u16> {
    if schema == "http" || schema == "https" {
        return None;
    }
    Url::parse(locator).ok().and_then(|url| url.port())
}

fn default_port(schema: &str) -> Option<u16> {
    match schema {
        "http" => Some(80),
        "https" => Some(443),
        "rtmp" => Some(1935),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rtmp_locator_with_vhost_query() {
        let parsed = parse("rtmp://10.0.0.5/live/cam1?vhost=site.example");

        assert_eq!(parsed.schema, "rtmp");
        assert_eq!(parsed.server, "10.0.0.5");
        assert_eq!(parsed.app, "live");
        assert_eq!(parsed.stream, "cam1");
        assert_eq!(parsed.vhost, "site.example");
        assert_eq!(parsed.port, Some(1935));
        assert_eq!(parsed.url, "rtmp://10.0.0.5/live/cam1?vhost=site.example");
    }

    #[test]
    fn test_ipv4_host_without_override_uses_default_vhost() {
        for locator in [
            "rtmp://10.0.0.5/live/cam1",
            "webrtc://192.168.1.20/live/livestream",
            "rtc://127.0.0.1:1985/app/stream?foo=bar",
            "http://172.16.0.1:8080/live/s.flv",
            "https://8.8.8.8/a/b",
        ] {
            assert_eq!(parse(locator).vhost, DEFAULT_VHOST, "locator {locator}");
        }
    }

    #[test]
    fn test_named_host_is_its_own_vhost() {
        let parsed = parse("webrtc://media.example.com/live/cam1");
        assert_eq!(parsed.vhost, "media.example.com");
        assert_eq!(parsed.server, "media.example.com");
    }

    #[test]
    fn test_domain_wins_over_vhost_param() {
        for locator in [
            "webrtc://10.0.0.5/live/cam1?vhost=a.example&domain=b.example",
            "webrtc://10.0.0.5/live/cam1?domain=b.example&vhost=a.example",
            "rtmp://media.example.com/live...vhost...a.example/cam1?domain=b.example",
        ] {
            assert_eq!(parse(locator).vhost, "b.example", "locator {locator}");
        }
    }

    #[test]
    fn test_vhost_param_wins_over_path_marker() {
        let parsed = parse("rtmp://h/live...vhost...a.example/s?vhost=b.example");
        assert_eq!(parsed.vhost, "b.example");
        assert_eq!(parsed.app, "live");
        assert_eq!(parsed.stream, "s");
    }

    #[test]
    fn test_vhost_marker_in_app_segment() {
        let parsed = parse("rtmp://10.0.0.5/live...vhost...site.example/cam1");

        assert_eq!(parsed.app, "live");
        assert_eq!(parsed.stream, "cam1");
        assert_eq!(parsed.vhost, "site.example");
        assert!(parsed.query.is_empty());
    }

    #[test]
    fn test_webrtc_locator_has_no_default_port() {
        let parsed = parse("webrtc://10.0.0.5/live/cam1");
        assert_eq!(parsed.schema, "webrtc");
        assert_eq!(parsed.port, None);
    }

    #[test]
    fn test_explicit_port_wins() {
        let parsed = parse("webrtc://10.0.0.5:8000/live/cam1");
        assert_eq!(parsed.port, Some(8000));
    }

    #[test]
    fn test_explicit_port_80_survives_pseudo_scheme_rewrite() {
        assert_eq!(parse("webrtc://10.0.0.5:80/live/cam1").port, Some(80));
        assert_eq!(parse("rtc://10.0.0.5:80/live/cam1").port, Some(80));
        assert_eq!(parse("rtmp://10.0.0.5:80/live/cam1").port, Some(80));
        assert_eq!(parse("rtmp://10.0.0.5:1936/live/cam1").port, Some(1936));
    }

    #[test]
    fn test_default_ports_by_schema() {
        assert_eq!(parse("http://host.example/live/s").port, Some(80));
        assert_eq!(parse("https://host.example/live/s").port, Some(443));
        assert_eq!(parse("rtmp://host.example/live/s").port, Some(1935));
    }

    #[test]
    fn test_nested_application_path() {
        let parsed = parse("webrtc://host.example/live/region/cam7");
        assert_eq!(parsed.app, "live/region");
        assert_eq!(parsed.stream, "cam7");
    }

    #[test]
    fn test_stream_without_application() {
        let parsed = parse("webrtc://host.example/cam7");
        assert_eq!(parsed.app, "");
        assert_eq!(parsed.stream, "cam7");
    }

    #[test]
    fn test_query_params_keep_order_and_last_value() {
        let parsed = parse("webrtc://host.example/live/s?b=1&a=2&b=3&flag");
        let pairs: Vec<_> = parsed.query.iter().collect();
        assert_eq!(pairs, vec![("b", "3"), ("a", "2"), ("flag", "")]);
    }

    #[test]
    fn test_override_params_are_recorded() {
        let parsed = parse("webrtc://host.example/live/s?schema=https&play=/rtc/v1/whep/");
        assert_eq!(parsed.query.get("schema"), Some("https"));
        assert_eq!(parsed.query.get("play"), Some("/rtc/v1/whep/"));
    }

    #[test]
    fn test_scheme_less_locator_defaults_to_rtmp() {
        let parsed = parse("10.0.0.5/live/cam1");
        assert_eq!(parsed.schema, "rtmp");
        assert_eq!(parsed.server, "10.0.0.5");
        assert_eq!(parsed.port, Some(1935));
        assert_eq!(parsed.stream, "cam1");
    }

    #[test]
    fn test_malformed_locator_yields_best_effort_record() {
        let parsed = parse("webrtc://:::bad/live/cam?vhost=v.example");

        assert_eq!(parsed.schema, "webrtc");
        assert_eq!(parsed.server, "");
        assert_eq!(parsed.app, "");
        assert_eq!(parsed.stream, "");
        assert_eq!(parsed.vhost, "v.example");
    }

    #[test]
    fn test_parse_is_deterministic() {
        let locator = "webrtc://10.0.0.5/live/cam1?x=1&domain=d.example";
        assert_eq!(parse(locator), parse(locator));
    }
}
