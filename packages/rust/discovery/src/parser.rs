//! Annotation value parsers: tag lists, ordered links, and namespace filtering.
//!
//! Link annotations look like:
//! - `backstage.gitops.pro/link-0: https://example.com/user,Example Users,user`
//! - `backstage.gitops.pro/link-1: https://example.com/group,Example Groups,group`
//!
//! Parsing is two stages: [`link_entries`] turns matching keys into
//! `(sequence, raw value)` pairs, [`order_links`] sorts them and splits each
//! value into a [`Link`].

use std::collections::BTreeMap;

use peanut_shared::{Link, PeanutError, Result};

use crate::labels::LINK_ANNOTATION_PREFIX;

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// Split a comma-separated tag list, trimming whitespace and dropping empty
/// segments.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

// ---------------------------------------------------------------------------
// Namespaced keys
// ---------------------------------------------------------------------------

/// Whether `key` lives under `namespace`, i.e. `<namespace>/<name>`.
pub fn in_namespace(key: &str, namespace: &str) -> bool {
    key.split_once('/')
        .is_some_and(|(domain, _)| domain == namespace)
}

/// Copy the entries of `src` whose key lives under `namespace`.
pub fn namespaced(src: &BTreeMap<String, String>, namespace: &str) -> BTreeMap<String, String> {
    src.iter()
        .filter(|(k, _)| in_namespace(k, namespace))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

// ---------------------------------------------------------------------------
// Links
// ---------------------------------------------------------------------------

/// A link annotation whose key has been parsed but whose value has not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkEntry<'a> {
    /// Sequence number from the key suffix; only used for ordering.
    pub seq: u64,
    /// The unparsed `url,title,icon` value.
    pub raw: &'a str,
}

/// Parse all ordered links out of an annotation map.
pub fn parse_links(annotations: &BTreeMap<String, String>) -> Result<Vec<Link>> {
    Ok(order_links(link_entries(annotations)?))
}

/// Collect every link annotation as a [`LinkEntry`].
///
/// Fails on the first key whose suffix is not a non-negative integer.
pub fn link_entries(annotations: &BTreeMap<String, String>) -> Result<Vec<LinkEntry<'_>>> {
    annotations
        .iter()
        .filter_map(|(key, value)| {
            key.strip_prefix(LINK_ANNOTATION_PREFIX)
                .map(|suffix| (key, suffix, value))
        })
        .map(|(key, suffix, value)| {
            let seq = suffix
                .parse::<u64>()
                .map_err(|e| PeanutError::link_parse(key.as_str(), e))?;
            Ok(LinkEntry {
                seq,
                raw: value.as_str(),
            })
        })
        .collect()
}

/// Sort entries by sequence number and split them into links.
///
/// Entries that do not split into three non-empty parts are dropped.
/// Equal sequence numbers keep their input order.
pub fn order_links(mut entries: Vec<LinkEntry<'_>>) -> Vec<Link> {
    entries.sort_by_key(|e| e.seq);
    entries.into_iter().filter_map(|e| split_link(e.raw)).collect()
}

/// Split `url,title,icon`. The icon takes everything after the second comma.
fn split_link(raw: &str) -> Option<Link> {
    let mut parts = raw.splitn(3, ',').map(str::trim);
    let (url, title, icon) = (parts.next()?, parts.next()?, parts.next()?);
    if url.is_empty() || title.is_empty() || icon.is_empty() {
        return None;
    }
    Some(Link {
        url: url.to_string(),
        title: title.to_string(),
        icon: icon.to_string(),
    })
}
