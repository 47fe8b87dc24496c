use tracing::warn;

use super::backend::{KeyValueBackend, Origin, WriteOptions};

const PROBE_KEY: &str = "__tld__";

/// Suffixes under which nobody may register a cookie domain.
///
/// A short, hand-picked subset of the public suffix list covering common
/// TLDs and the shared hosting platforms pages are most often served from.
const PUBLIC_SUFFIXES: &[&str] = &[
    "app",
    "co",
    "com",
    "dev",
    "edu",
    "gov",
    "io",
    "net",
    "org",
    "ac.uk",
    "co.jp",
    "co.nz",
    "co.uk",
    "com.au",
    "com.br",
    "gov.uk",
    "net.au",
    "org.uk",
    "appspot.com",
    "azurewebsites.net",
    "cloudfront.net",
    "github.io",
    "herokuapp.com",
    "netlify.app",
    "pages.dev",
    "vercel.app",
    "workers.dev",
];

pub fn is_public_suffix(domain: &str) -> bool {
    PUBLIC_SUFFIXES.contains(&domain)
}

/// Finds the widest domain `cookies` will accept a cookie for on this page.
///
/// Candidates are tried from the shortest two-label suffix upwards by writing
/// and reading back a probe cookie. IP literals, single-label hosts and pages
/// without a host yield an empty string.
pub fn registrable_domain(origin: &Origin, cookies: &dyn KeyValueBackend) -> String {
    let Some(host) = origin.host() else {
        return String::new();
    };
    if origin.is_ip_literal() {
        return String::new();
    }
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        return String::new();
    }

    for start in (0..labels.len() - 1).rev() {
        let candidate = labels[start..].join(".");
        let options = WriteOptions::persistent(Some(format!(".{candidate}")));
        if let Err(err) = cookies.set(origin, PROBE_KEY, Some("1"), &options) {
            warn!(%err, %candidate, "domain probe write failed");
            continue;
        }
        let accepted = matches!(cookies.get(origin, PROBE_KEY), Ok(Some(_)));
        if accepted {
            if let Err(err) = cookies.set(origin, PROBE_KEY, None, &options) {
                warn!(%err, %candidate, "domain probe cleanup failed");
            }
            return candidate;
        }
    }
    String::new()
}
