//! Chat command parsing for Grab.
//!
//! A command arrives as free text in a chat message that mentions the bot:
//!
//! ```text
//! @grab                                   save the thread, title = first message
//! @grab "Meeting notes" decisions         save under a title and section
//! @grab append "Meeting notes" [section]  append to an existing article
//! @grab range <first> <last> [title] [section]
//! @grab summarize
//! @grab help
//! ```
//!
//! Parsing happens in two steps: [`tokenize`] splits the text into
//! quote-aware tokens, and [`interpret`] maps the tokens to a
//! [`ParsedCommand`].
//!
//! # Example
//!
//! ```
//! use grab_command::{interpret, tokenize, Subcommand};
//!
//! let tokens = tokenize(r#"<@U0BOT> append "Meeting notes""#);
//! let command = interpret(&tokens).unwrap();
//! assert_eq!(command.subcommand, Subcommand::Append);
//! assert_eq!(command.title.as_deref(), Some("Meeting notes"));
//! ```

pub mod error;
pub mod interpreter;
pub mod message_ref;
pub mod tokenizer;

pub use error::{CommandError, Result};
pub use interpreter::{interpret, usage, ParsedCommand, Subcommand, SUBCOMMAND_KEYWORDS};
pub use message_ref::MessageRef;
pub use tokenizer::{tokenize, trim_quotes};
