//! Resolve PyTorch minor lines to their latest published release.

use serde::de::IgnoredAny;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::error::{Error, Result};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Substrings that mark an identifier as a pre-release.
///
/// Matched anywhere in the identifier, so this also drops any release that
/// happens to contain one of these letters elsewhere.
const PRERELEASE_MARKERS: [&str; 3] = ["a", "b", "rc"];

/// Major.minor line -> greatest release observed for that line.
pub type VersionMap = BTreeMap<String, String>;

#[derive(Deserialize)]
struct ReleaseIndex {
    releases: HashMap<String, IgnoredAny>,
}

/// Fetch every release of the package and reduce it to one version per line.
pub fn fetch_latest_versions(index_url: &str) -> Result<VersionMap> {
    let releases = fetch_releases(index_url)?;
    Ok(latest_by_line(releases.iter().map(String::as_str)))
}

/// Fetch the release identifiers listed by a PyPI-style JSON endpoint.
pub fn fetch_releases(index_url: &str) -> Result<Vec<String>> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(format!("torchdock/{}", VERSION))
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| Error::internal_io(e.to_string(), Some("create HTTP client".to_string())))?;

    let response = client
        .get(index_url)
        .send()
        .map_err(|e| Error::index_request_failed(index_url, None, e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::index_request_failed(
            index_url,
            Some(status.as_u16()),
            status.to_string(),
        ));
    }

    let body = response
        .text()
        .map_err(|e| Error::index_request_failed(index_url, Some(status.as_u16()), e.to_string()))?;

    parse_releases(&body).map_err(|e| Error::index_invalid_response(index_url, e.to_string()))
}

/// Extract the release identifiers (the keys of `releases`) from an index document.
pub fn parse_releases(body: &str) -> serde_json::Result<Vec<String>> {
    let index: ReleaseIndex = serde_json::from_str(body)?;
    Ok(index.releases.into_keys().collect())
}

pub fn is_prerelease(version: &str) -> bool {
    PRERELEASE_MARKERS
        .iter()
        .any(|marker| version.contains(marker))
}

/// First two dot-separated components, e.g. "2.9" for "2.9.0".
pub fn major_minor(version: &str) -> String {
    version.split('.').take(2).collect::<Vec<_>>().join(".")
}

/// Keep the greatest identifier per major.minor line, skipping pre-releases.
///
/// "Greatest" is plain string ordering, not numeric: within "1.9",
/// "1.9.9" wins over "1.9.10".
pub fn latest_by_line<'a, I>(releases: I) -> VersionMap
where
    I: IntoIterator<Item = &'a str>,
{
    let mut latest = VersionMap::new();

    for version in releases {
        if is_prerelease(version) {
            continue;
        }

        latest
            .entry(major_minor(version))
            .and_modify(|current: &mut String| {
                if version > current.as_str() {
                    *current = version.to_string();
                }
            })
            .or_insert_with(|| version.to_string());
    }

    latest
}
