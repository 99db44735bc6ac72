use std::path::Path;

use chrono::Utc;
use tracing::debug;

use super::types::CookieEntry;

const HTTP_ONLY_PREFIX: &str = "#HttpOnly_";

pub(crate) fn parse_cookie_jar(contents: &str) -> Vec<CookieEntry> {
    contents
        .lines()
        .filter_map(|line| {
            let line = line.trim_end_matches('\r');
            let line = match line.strip_prefix(HTTP_ONLY_PREFIX) {
                Some(rest) => rest,
                None if line.starts_with('#') => return None,
                None => line,
            };
            parse_cookie_line(line)
        })
        .collect()
}

fn parse_cookie_line(line: &str) -> Option<CookieEntry> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 7 {
        return None;
    }
    Some(CookieEntry {
        domain: fields[0].trim().to_ascii_lowercase(),
        include_subdomains: fields[1].eq_ignore_ascii_case("TRUE"),
        expires_at: fields[4].trim().parse().unwrap_or(0),
        name: fields[5].to_string(),
        value: fields[6..].join("\t"),
    })
}

fn domain_matches(cookie: &CookieEntry, host: &str) -> bool {
    let domain = cookie.domain.trim_start_matches('.');
    if host == domain {
        return true;
    }
    let subdomain_allowed = cookie.include_subdomains || cookie.domain.starts_with('.');
    subdomain_allowed && host.ends_with(&format!(".{domain}"))
}

fn is_live(cookie: &CookieEntry, now: i64) -> bool {
    cookie.expires_at == 0 || cookie.expires_at > now
}

/// Looks up a cookie for `host`. Large values split into `name.0`, `name.1`,
/// ... are joined back together.
pub(crate) fn find_cookie_value(entries: &[CookieEntry], host: &str, name: &str) -> Option<String> {
    let host = host.to_ascii_lowercase();
    let now = Utc::now().timestamp();
    let lookup = |wanted: &str| {
        entries
            .iter()
            .filter(|cookie| cookie.name == wanted && domain_matches(cookie, &host))
            .find(|cookie| is_live(cookie, now))
            .map(|cookie| cookie.value.clone())
    };

    if let Some(value) = lookup(name) {
        return Some(value);
    }
    let chunks: Vec<String> = (0..)
        .map_while(|index| lookup(&format!("{name}.{index}")))
        .collect();
    if chunks.is_empty() {
        return None;
    }
    debug!(cookie = %name, chunks = chunks.len(), "joined chunked cookie");
    Some(chunks.concat())
}

pub(crate) fn read_cookie(path: &Path, host: &str, name: &str) -> anyhow::Result<Option<String>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|err| anyhow::anyhow!("failed to read cookie jar {}: {err}", path.display()))?;
    let entries = parse_cookie_jar(&contents);
    debug!(path = %path.display(), cookies = entries.len(), "parsed cookie jar");
    Ok(find_cookie_value(&entries, host, name))
}
