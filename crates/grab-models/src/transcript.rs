//! Transcript type.

use serde::{Deserialize, Serialize};

/// A readable rendition of a filtered thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    /// Text of the first kept message, used when no title is given.
    pub generated_title: String,

    /// Article body: header line followed by one line per message.
    pub body: String,
}

impl Transcript {
    /// Creates a new transcript.
    pub fn new(generated_title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            generated_title: generated_title.into(),
            body: body.into(),
        }
    }
}
