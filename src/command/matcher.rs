//! Token matching: longest-title-first prefix consumption
//!
//! The query is consumed from the left. First a location title, then command
//! titles, each compared case-insensitively against the start of what is
//! left. Candidates are tried longest title first so that "add all & commit"
//! wins over "commit" whenever both could apply.

use crate::model::Location;
use std::cmp::Reverse;

/// Strip `title` off the front of `text`, ignoring case
///
/// Returns the rest of `text` with its original casing.
pub fn strip_title_prefix<'s>(text: &'s str, title: &str) -> Option<&'s str> {
    if title.is_empty() {
        return None;
    }

    let mut text_chars = text.char_indices();
    for title_char in title.chars() {
        let (_, text_char) = text_chars.next()?;
        if !text_char.to_lowercase().eq(title_char.to_lowercase()) {
            return None;
        }
    }

    Some(match text_chars.next() {
        Some((idx, _)) => &text[idx..],
        None => "",
    })
}

fn by_title_length<T>(candidates: &mut [(T, &str)]) {
    candidates.sort_by_key(|(_, title)| Reverse(title.chars().count()));
}

/// Match at most one location at the start of `input`
///
/// Returns the matched location (if any) and the trimmed remainder.
pub fn match_location<'l, 's>(
    input: &'s str,
    locations: &'l [Location],
) -> (Option<&'l Location>, &'s str) {
    let text = input.trim();

    let mut sorted: Vec<(&'l Location, &str)> = locations
        .iter()
        .map(|loc| (loc, loc.title.as_str()))
        .collect();
    by_title_length(&mut sorted);

    for (location, title) in sorted {
        if let Some(rest) = strip_title_prefix(text, title) {
            return (Some(location), rest.trim());
        }
    }

    (None, text)
}

/// Consume up to `limit` command titles from the front of `text`
///
/// Each step picks the longest title that prefixes the remaining text. The
/// same candidate list is used for every step.
pub fn match_commands<'s, T: Copy>(
    text: &'s str,
    candidates: &[(T, &str)],
    limit: usize,
) -> (Vec<T>, &'s str) {
    let mut sorted = candidates.to_vec();
    by_title_length(&mut sorted);

    let mut matched = Vec::new();
    let mut rest = text.trim();

    while matched.len() < limit {
        let hit = sorted
            .iter()
            .find_map(|(id, title)| strip_title_prefix(rest, title).map(|r| (*id, r)));

        match hit {
            Some((id, remainder)) => {
                matched.push(id);
                rest = remainder.trim();
            }
            None => break,
        }
    }

    (matched, rest)
}
