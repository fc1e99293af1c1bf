// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Format-independent distinguished name comparison.
//!
//! Certificates render names in RFC 2253 form (`CN=X,C=FR`) while many
//! directory exports use the OpenSSL slash form (`/C=FR/CN=X`). Both are
//! reduced to the same canonical key:
//!
//! - components are split on the format's separator (quotes and backslash
//!   escapes are honoured),
//! - keys and values are trimmed and lowercased,
//! - escapes are resolved and the separators `,` `|` `\` `"` re-escaped,
//! - components are sorted and joined with `|`.
//!
//! ```
//! use icao_x509::dn;
//!
//! assert_eq!(dn::normalize("CN=X,C=FR"), "c=fr|cn=x");
//! assert!(dn::equal("/C=FR/CN=X", "CN=X,C=FR"));
//! ```
//!
//! A canonical key is itself accepted as input, so normalizing twice is a
//! no-op. Input is only read as a canonical key when it is all lowercase and
//! every `|`-separated part is a `key=value` pair; anything else with a `|`
//! is an RFC 2253 value containing a literal pipe. A component without `=`
//! is keyed by the empty string (`=value`) so that rule holds for every key
//! this module produces.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

/// Input syntax detected for a DN string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DnFormat {
    /// OpenSSL oneline form, `/C=FR/CN=X`
    Slash,
    /// Output of [`normalize`], `c=fr|cn=x`
    Canonical,
    /// RFC 2253 / RFC 4514 form, `CN=X,C=FR`
    Comma,
}

impl DnFormat {
    fn separator(self) -> char {
        match self {
            DnFormat::Slash => '/',
            DnFormat::Canonical => '|',
            DnFormat::Comma => ',',
        }
    }

    fn detect(dn: &str) -> Self {
        if dn.starts_with('/') {
            DnFormat::Slash
        } else if is_canonical(dn) {
            DnFormat::Canonical
        } else {
            DnFormat::Comma
        }
    }
}

/// Splits `input` on `sep`, ignoring separators that are escaped or quoted.
fn split_unescaped(input: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    let mut quoted = false;
    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => quoted = !quoted,
            c if c == sep && !quoted => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn contains_unescaped(input: &str, needle: char) -> bool {
    split_unescaped(input, needle).len() > 1
}

fn is_canonical(dn: &str) -> bool {
    let parts = split_unescaped(dn, '|');
    parts.len() > 1
        && !contains_unescaped(dn, ',')
        && dn.chars().all(|c| !c.is_uppercase())
        && parts.iter().all(|part| contains_unescaped(part, '='))
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Resolves quotes, `\c` escapes and `\XX` hex pairs.
fn unescape(value: &str) -> String {
    let value = value.trim();
    let value = if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    };

    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 1 < bytes.len() {
            let pair = bytes
                .get(i + 2)
                .and_then(|&lo| Some((hex_value(bytes[i + 1])?, hex_value(lo)?)));
            match pair {
                Some((hi, lo)) => {
                    out.push(hi << 4 | lo);
                    i += 3;
                }
                None => {
                    out.push(bytes[i + 1]);
                    i += 2;
                }
            }
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn escape_canonical(value: &str, out: &mut String) {
    for c in value.chars() {
        if matches!(c, ',' | '|' | '\\' | '"') {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Reduces one `key=value` component to its canonical form.
fn canonical_component(component: &str) -> Option<String> {
    let component = component.trim();
    if component.is_empty() {
        return None;
    }
    let mut out = String::with_capacity(component.len());
    match split_unescaped(component, '=').split_first() {
        Some((key, rest)) if !rest.is_empty() => {
            let value = &component[key.len() + 1..];
            out.push_str(&key.trim().to_lowercase());
            out.push('=');
            escape_canonical(unescape(value).trim().to_lowercase().as_str(), &mut out);
        }
        _ => {
            out.push('=');
            escape_canonical(unescape(component).to_lowercase().as_str(), &mut out);
        }
    }
    Some(out)
}

fn components(dn: &str) -> (DnFormat, Vec<&str>) {
    let dn = dn.trim();
    let format = DnFormat::detect(dn);
    let body = match format {
        DnFormat::Slash => &dn[1..],
        _ => dn,
    };
    (format, split_unescaped(body, format.separator()))
}

/// Produces the canonical comparison key of a DN.
///
/// Empty or whitespace-only input yields an empty string.
pub fn normalize(dn: &str) -> String {
    let (_, parts) = components(dn);
    let mut canonical: Vec<String> = parts
        .into_iter()
        .filter_map(canonical_component)
        .collect();
    canonical.sort();
    canonical.join("|")
}

/// Returns true when both DNs have the same canonical key.
pub fn equal(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// Extracts the value of attribute `key` (case-insensitive), lowercased.
///
/// Matching is done on whole attribute names, so asking for `C` never
/// matches `CN`. Returns an empty string when the attribute is absent.
pub fn extract_attribute(dn: &str, key: &str) -> String {
    let key = key.trim();
    let (_, parts) = components(dn);
    for part in parts {
        let part = part.trim();
        if let Some((name, rest)) = split_unescaped(part, '=').split_first() {
            if !rest.is_empty() && name.trim().eq_ignore_ascii_case(key) {
                return unescape(&part[name.len() + 1..]).trim().to_lowercase();
            }
        }
    }
    String::new()
}
