/*!
# Delimiter Balancing

Finds the true end of a top-level balanced region without a parser. Given the
text that follows an opening delimiter, the scanner walks it once, keeping a
stack of the closers it still owes, and stops at the first closing delimiter
seen at depth zero. Marker strings (usually `,`) are reported only where they
occur at depth zero, so `a, f(b, c), d` splits into three arguments, not four.
*/

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::error::Unbalanced;

/// An open/close character pair whose nesting is tracked while scanning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelimiterPair {
    pub open: char,
    pub close: char,
}

impl DelimiterPair {
    pub const fn new(open: char, close: char) -> Self {
        Self { open, close }
    }
}

impl fmt::Display for DelimiterPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.open, self.close)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidDelimiters {
    #[error("delimiter pair {0} uses the same character to open and close")]
    SameCharacter(DelimiterPair),

    #[error("delimiter character '{0}' appears in more than one pair")]
    Shared(char),

    #[error("delimiter list must give open/close characters in pairs, got {0:?}")]
    OddLength(String),
}

/// A validated set of delimiter pairs.
///
/// No character may be shared between pairs, and no pair may open and close
/// with the same character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DelimiterSet {
    pairs: Vec<DelimiterPair>,
}

impl DelimiterSet {
    pub fn new(pairs: impl IntoIterator<Item = DelimiterPair>) -> Result<Self, InvalidDelimiters> {
        let pairs: Vec<DelimiterPair> = pairs.into_iter().collect();
        let mut seen = Vec::with_capacity(pairs.len() * 2);

        for pair in &pairs {
            if pair.open == pair.close {
                return Err(InvalidDelimiters::SameCharacter(*pair));
            }
            for ch in [pair.open, pair.close] {
                if seen.contains(&ch) {
                    return Err(InvalidDelimiters::Shared(ch));
                }
                seen.push(ch);
            }
        }

        Ok(Self { pairs })
    }

    /// Parse a compact pair list such as `"()[]{}"`
    pub fn parse(pairs: &str) -> Result<Self, InvalidDelimiters> {
        let chars: Vec<char> = pairs.chars().filter(|c| !c.is_whitespace()).collect();
        if chars.len() % 2 != 0 {
            return Err(InvalidDelimiters::OddLength(pairs.to_string()));
        }
        Self::new(chars.chunks(2).map(|pair| DelimiterPair::new(pair[0], pair[1])))
    }

    pub fn pairs(&self) -> &[DelimiterPair] {
        &self.pairs
    }

    /// The closer owed for `open`, if `open` starts a pair
    pub fn closer_for(&self, open: char) -> Option<char> {
        self.pairs.iter().find(|p| p.open == open).map(|p| p.close)
    }

    pub fn is_closer(&self, ch: char) -> bool {
        self.pairs.iter().any(|p| p.close == ch)
    }

    pub fn contains(&self, ch: char) -> bool {
        self.pairs.iter().any(|p| p.open == ch || p.close == ch)
    }

    /// Compact form accepted by [`DelimiterSet::parse`]
    pub fn compact(&self) -> String {
        self.pairs.iter().map(|p| p.to_string()).collect()
    }
}

impl TryFrom<String> for DelimiterSet {
    type Error = InvalidDelimiters;

    fn try_from(pairs: String) -> Result<Self, Self::Error> {
        Self::parse(&pairs)
    }
}

impl From<DelimiterSet> for String {
    fn from(set: DelimiterSet) -> Self {
        set.compact()
    }
}

impl Default for DelimiterSet {
    fn default() -> Self {
        Self {
            pairs: vec![
                DelimiterPair::new('(', ')'),
                DelimiterPair::new('[', ']'),
                DelimiterPair::new('{', '}'),
            ],
        }
    }
}

/// Result of a nested scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedScan<'a> {
    /// Text up to, not including, the first top-level closing delimiter
    pub interior: &'a str,
    /// Byte offsets into `interior` of every top-level occurrence of each marker
    pub markers: BTreeMap<String, Vec<usize>>,
    /// Text after the consumed closing delimiter, or `None` if it was never found
    pub extra: Option<&'a str>,
}

impl<'a> NestedScan<'a> {
    pub fn offsets(&self, marker: &str) -> &[usize] {
        self.markers.get(marker).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_closed(&self) -> bool {
        self.extra.is_some()
    }

    /// Split the interior at the top-level occurrences of `marker`
    pub fn split(&self, marker: &str) -> Vec<&'a str> {
        let mut pieces = Vec::with_capacity(self.offsets(marker).len() + 1);
        let mut start = 0;
        for &offset in self.offsets(marker) {
            if offset < start {
                continue;
            }
            pieces.push(&self.interior[start..offset]);
            start = offset + marker.len();
        }
        pieces.push(&self.interior[start..]);
        pieces
    }
}

/// Scan `text`, which begins just after `open`, for the matching `close`.
///
/// Nested regions of any configured pair are skipped over, and markers inside
/// them are not reported. A closer that does not match the innermost open
/// delimiter, or an open delimiter left unclosed at the end of the text, is a
/// balance violation. Markers containing a delimiter character are never
/// reported.
pub fn scan_nested<'a>(
    delimiters: &DelimiterSet,
    open: &str,
    close: &str,
    text: &'a str,
    markers: &[&str],
) -> Result<NestedScan<'a>, Unbalanced> {
    let searchable: Vec<&str> = markers
        .iter()
        .copied()
        .filter(|m| !m.is_empty() && !m.chars().any(|c| delimiters.contains(c)))
        .collect();
    let mut found: BTreeMap<String, Vec<usize>> = markers
        .iter()
        .map(|m| (m.to_string(), Vec::new()))
        .collect();

    // `open` only needs tracking by hand when the set does not already balance it
    let track_open = !open.is_empty() && !is_single_delimiter(delimiters, open);
    let mut stray_open = false;

    let mut owed: Vec<char> = Vec::new();
    let mut end = None;

    for (i, ch) in text.char_indices() {
        if owed.is_empty() {
            let rest = &text[i..];
            if !close.is_empty() && rest.starts_with(close) {
                end = Some(i);
                break;
            }
            if track_open && rest.starts_with(open) {
                stray_open = true;
            }
            for marker in &searchable {
                if rest.starts_with(marker) {
                    if let Some(offsets) = found.get_mut(*marker) {
                        offsets.push(i);
                    }
                }
            }
        }

        if let Some(closer) = delimiters.closer_for(ch) {
            owed.push(closer);
        } else if delimiters.is_closer(ch) {
            match owed.last() {
                Some(&expected) if expected == ch => {
                    owed.pop();
                }
                Some(&expected) => return Err(Unbalanced::new(expected.to_string())),
                // A stray closer at the top level is not ours to judge.
                None => {}
            }
        }
    }

    if let Some(&expected) = owed.last() {
        return Err(Unbalanced::new(expected.to_string()));
    }
    if stray_open {
        return Err(Unbalanced::new(close));
    }

    let interior_end = end.unwrap_or(text.len());
    Ok(NestedScan {
        interior: &text[..interior_end],
        markers: found,
        extra: end.map(|e| &text[e + close.len()..]),
    })
}

fn is_single_delimiter(delimiters: &DelimiterSet, literal: &str) -> bool {
    let mut chars = literal.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if delimiters.contains(c))
}
