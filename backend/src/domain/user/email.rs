//! Email address syntax rules.
//!
//! The address splits at its last `@`. The local part is a dot-separated run
//! of atoms (UTF-8 letters allowed) or a quoted string; the domain must be a
//! fully qualified name whose top-level label is alphabetic or punycode.

use std::sync::LazyLock;

use regex::Regex;

/// Longest accepted address, in UTF-16 code units.
const MAX_EMAIL_LENGTH: usize = 254;
/// Longest accepted local part, in bytes.
const MAX_LOCAL_BYTES: usize = 64;
/// Longest accepted domain, in bytes.
const MAX_DOMAIN_BYTES: usize = 254;
/// Longest accepted domain label, in UTF-16 code units.
const MAX_LABEL_LENGTH: usize = 63;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|error| panic!("email pattern {pattern:?}: {error}"))
}

static LOCAL_ATOM: LazyLock<Regex> = LazyLock::new(|| {
    compile(concat!(
        r"(?i)^[a-z0-9!#$%\&'*+\-/=?^_`\{\|\}\~",
        r"\x{00A1}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}]+$",
    ))
});

static QUOTED_LOCAL: LazyLock<Regex> = LazyLock::new(|| {
    compile(concat!(
        r"(?i)^(?:[\s\x01-\x08\x0B\x0C\x0E-\x1F\x7F\x21\x23-\x5B\x5D-\x7E",
        r"\x{00A1}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}]",
        r"|\\[\x01-\x09\x0B\x0C\x0D-\x7F\x{00A1}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}])*$",
    ))
});

static TOP_LEVEL_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    compile(concat!(
        r"(?i)^(?:[a-z\x{00A1}-\x{00A8}\x{00AA}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}]{2,}",
        r"|xn[a-z0-9\-]{2,})$",
    ))
});

static DOMAIN_LABEL: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)^[a-z0-9_\-\x{00A1}-\x{D7FF}\x{E000}-\x{10FFFF}]+$"));

fn utf16_len(value: &str) -> usize {
    value.encode_utf16().count()
}

fn is_fully_qualified(domain: &str) -> bool {
    let labels: Vec<&str> = domain.split('.').collect();
    let Some(top_level) = labels.last() else {
        return false;
    };
    if labels.len() < 2 || !TOP_LEVEL_LABEL.is_match(top_level) {
        return false;
    }
    labels.iter().all(|label| {
        utf16_len(label) <= MAX_LABEL_LENGTH
            && DOMAIN_LABEL.is_match(label)
            && !label.contains('_')
            && !label.starts_with('-')
            && !label.ends_with('-')
            && !label.chars().any(|c| ('\u{FF01}'..='\u{FF5E}').contains(&c))
    })
}

fn is_valid_local_part(local: &str) -> bool {
    match local.strip_prefix('"') {
        Some(rest) => {
            // The outer characters are dropped whatever they are.
            let inner = rest
                .char_indices()
                .last()
                .map_or(rest, |(index, _)| &rest[..index]);
            QUOTED_LOCAL.is_match(inner)
        }
        None => local.split('.').all(|atom| LOCAL_ATOM.is_match(atom)),
    }
}

/// Whether `candidate` is a syntactically valid email address.
pub(super) fn is_valid(candidate: &str) -> bool {
    if utf16_len(candidate) > MAX_EMAIL_LENGTH {
        return false;
    }
    let Some((local, domain)) = candidate.rsplit_once('@') else {
        return false;
    };
    local.len() <= MAX_LOCAL_BYTES
        && domain.len() <= MAX_DOMAIN_BYTES
        && is_fully_qualified(domain)
        && is_valid_local_part(local)
}
