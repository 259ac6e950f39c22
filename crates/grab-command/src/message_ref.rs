//! Message references used by the `range` subcommand.

use url::Url;

use crate::error::{CommandError, Result};

/// Number of fractional digits in a chat timestamp.
const TS_FRACTION_DIGITS: usize = 6;

/// A reference to one message in a thread, normalized to its timestamp.
///
/// Accepts either a raw timestamp (`1700000000.000100`) or a message link
/// (`https://team.slack.com/archives/C123/p1700000000000100`). Links pasted
/// into chat arrive wrapped as `<url>` or `<url|label>`; both forms work.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageRef {
    ts: String,
}

impl MessageRef {
    /// Parses a token into a message reference.
    pub fn parse(raw: &str) -> Result<Self> {
        let unwrapped = raw
            .trim()
            .trim_start_matches('<')
            .trim_end_matches('>');
        let unwrapped = unwrapped.split('|').next().unwrap_or(unwrapped);

        if is_timestamp(unwrapped) {
            return Ok(Self {
                ts: unwrapped.to_string(),
            });
        }

        let url = Url::parse(unwrapped)
            .map_err(|_| CommandError::InvalidMessageRef(raw.to_string()))?;
        let last_segment = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default();

        permalink_ts(last_segment)
            .map(|ts| Self { ts })
            .ok_or_else(|| CommandError::InvalidMessageRef(raw.to_string()))
    }

    /// The referenced message's timestamp.
    pub fn ts(&self) -> &str {
        &self.ts
    }
}

fn is_timestamp(value: &str) -> bool {
    match value.split_once('.') {
        Some((secs, fraction)) => {
            !secs.is_empty()
                && !fraction.is_empty()
                && secs.bytes().all(|b| b.is_ascii_digit())
                && fraction.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

/// Converts a permalink segment like `p1700000000000100` to `1700000000.000100`.
fn permalink_ts(segment: &str) -> Option<String> {
    let digits = segment.strip_prefix('p')?;
    if digits.len() <= TS_FRACTION_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (secs, fraction) = digits.split_at(digits.len() - TS_FRACTION_DIGITS);
    Some(format!("{}.{}", secs, fraction))
}
