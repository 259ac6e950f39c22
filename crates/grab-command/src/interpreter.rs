//! Command interpreter: maps tokens to a [`ParsedCommand`].
//!
//! The grammar is a fixed verb set parsed with clap. The first token is the
//! bot mention and plays the role of the binary name.

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use crate::error::{CommandError, Result};
use crate::message_ref::MessageRef;
use crate::tokenizer::trim_quotes;

/// Keywords recognized as subcommands.
pub const SUBCOMMAND_KEYWORDS: [&str; 4] = ["append", "range", "help", "summarize"];

/// Which command the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Subcommand {
    /// No keyword: save the thread.
    #[default]
    Default,
    Help,
    Append,
    Range,
    Summarize,
}

/// A fully interpreted chat command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedCommand {
    pub subcommand: Subcommand,
    /// Overwrite existing content.
    pub clobber: bool,
    /// Summarize the thread before saving.
    pub summarize: bool,
    pub title: Option<String>,
    pub section: Option<String>,
    pub range_start: Option<MessageRef>,
    pub range_end: Option<MessageRef>,
}

impl ParsedCommand {
    /// Both range endpoints, when this is a `range` command.
    pub fn range(&self) -> Option<(&MessageRef, &MessageRef)> {
        match (&self.range_start, &self.range_end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }
}

/// Grab - save chat threads to the wiki
#[derive(Parser, Debug)]
#[command(name = "@grab")]
#[command(about = "Save this thread to the wiki")]
#[command(disable_help_subcommand = true, disable_version_flag = true)]
struct GrabArgs {
    /// Overwrite possibly existing content
    #[arg(short, long, global = true)]
    clobber: bool,

    /// Summarize content
    #[arg(short, long, global = true)]
    summarize: bool,

    #[command(subcommand)]
    command: Option<GrabCommand>,

    /// Article title (defaults to the first message of the thread)
    title: Option<String>,

    /// Section title
    section: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum GrabCommand {
    /// Append this thread as new content to an existing article
    Append {
        /// Title
        title: String,
        /// Section
        section: Option<String>,
    },

    /// Save the messages between the given links, inclusive
    Range {
        /// First chronological message to be saved
        first: String,
        /// Last chronological message to be saved
        last: String,
        /// Title
        title: Option<String>,
        /// Section
        section: Option<String>,
    },

    /// Summarize the thread before saving
    Summarize {
        /// Title
        title: Option<String>,
        /// Section
        section: Option<String>,
    },

    /// Show this help
    Help,
}

/// Interprets a tokenized command.
///
/// `tokens[0]` is the bot mention and is skipped. Tokens are trimmed of
/// their quotes before parsing.
pub fn interpret(tokens: &[String]) -> Result<ParsedCommand> {
    let argv = tokens.iter().map(|t| trim_quotes(t).to_string());

    let args = match GrabArgs::try_parse_from(argv) {
        Ok(args) => args,
        Err(e) if e.kind() == ErrorKind::DisplayHelp => {
            return Ok(ParsedCommand {
                subcommand: Subcommand::Help,
                ..ParsedCommand::default()
            });
        }
        Err(e) => return Err(CommandError::Usage(e.render().to_string())),
    };

    let mut command = ParsedCommand {
        clobber: args.clobber,
        summarize: args.summarize,
        ..ParsedCommand::default()
    };

    match args.command {
        None => {
            command.title = args.title;
            command.section = args.section;
        }
        Some(GrabCommand::Append { title, section }) => {
            command.subcommand = Subcommand::Append;
            command.title = Some(title);
            command.section = section;
        }
        Some(GrabCommand::Range {
            first,
            last,
            title,
            section,
        }) => {
            command.subcommand = Subcommand::Range;
            command.range_start = Some(MessageRef::parse(&first)?);
            command.range_end = Some(MessageRef::parse(&last)?);
            command.title = title;
            command.section = section;
        }
        Some(GrabCommand::Summarize { title, section }) => {
            command.subcommand = Subcommand::Summarize;
            command.title = title;
            command.section = section;
        }
        Some(GrabCommand::Help) => command.subcommand = Subcommand::Help,
    }

    Ok(command)
}

/// Rendered usage text for the `help` reply.
pub fn usage() -> String {
    GrabArgs::command().render_help().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn parse(text: &str) -> Result<ParsedCommand> {
        interpret(&tokenize(text))
    }

    #[test]
    fn test_bare_mention_is_default() {
        let cmd = parse("<@U0BOT>").unwrap();
        assert_eq!(cmd.subcommand, Subcommand::Default);
        assert!(cmd.title.is_none());
        assert!(cmd.section.is_none());
        assert!(!cmd.clobber);
    }

    #[test]
    fn test_empty_tokens_is_default() {
        let cmd = interpret(&[]).unwrap();
        assert_eq!(cmd.subcommand, Subcommand::Default);
    }

    #[test]
    fn test_default_with_title_and_section() {
        let cmd = parse(r#"<@U0BOT> "Meeting notes" decisions"#).unwrap();
        assert_eq!(cmd.subcommand, Subcommand::Default);
        assert_eq!(cmd.title.as_deref(), Some("Meeting notes"));
        assert_eq!(cmd.section.as_deref(), Some("decisions"));
    }

    #[test]
    fn test_keyword_not_at_expected_position_is_default() {
        let cmd = parse("<@U0BOT> notes append").unwrap();
        assert_eq!(cmd.subcommand, Subcommand::Default);
        assert_eq!(cmd.title.as_deref(), Some("notes"));
        assert_eq!(cmd.section.as_deref(), Some("append"));
    }

    #[test]
    fn test_append_requires_title() {
        let err = parse("<@U0BOT> append").unwrap_err();
        match err {
            CommandError::Usage(text) => assert!(text.contains("Usage")),
            other => panic!("expected usage error, got {:?}", other),
        }
    }

    #[test]
    fn test_append_with_section() {
        let cmd = parse(r#"<@U0BOT> append "My Title" section"#).unwrap();
        assert_eq!(cmd.subcommand, Subcommand::Append);
        assert_eq!(cmd.title.as_deref(), Some("My Title"));
        assert_eq!(cmd.section.as_deref(), Some("section"));
    }

    #[test]
    fn test_flags_before_and_after_keyword() {
        let cmd = parse("<@U0BOT> -c append Notes").unwrap();
        assert_eq!(cmd.subcommand, Subcommand::Append);
        assert!(cmd.clobber);

        let cmd = parse("<@U0BOT> append --clobber Notes").unwrap();
        assert!(cmd.clobber);
        assert_eq!(cmd.title.as_deref(), Some("Notes"));

        let cmd = parse("<@U0BOT> -s").unwrap();
        assert_eq!(cmd.subcommand, Subcommand::Default);
        assert!(cmd.summarize);
    }

    #[test]
    fn test_range_requires_two_refs() {
        assert!(matches!(
            parse("<@U0BOT> range 1700000000.000100"),
            Err(CommandError::Usage(_))
        ));

        let cmd = parse("<@U0BOT> range 1700000000.000100 1700000000.000300 Notes").unwrap();
        assert_eq!(cmd.subcommand, Subcommand::Range);
        let (start, end) = cmd.range().unwrap();
        assert_eq!(start.ts(), "1700000000.000100");
        assert_eq!(end.ts(), "1700000000.000300");
        assert_eq!(cmd.title.as_deref(), Some("Notes"));
        assert!(cmd.section.is_none());
    }

    #[test]
    fn test_range_rejects_bad_ref() {
        assert!(matches!(
            parse("<@U0BOT> range yesterday today"),
            Err(CommandError::InvalidMessageRef(_))
        ));
    }

    #[test]
    fn test_help_forms() {
        assert_eq!(parse("<@U0BOT> help").unwrap().subcommand, Subcommand::Help);
        assert_eq!(parse("<@U0BOT> --help").unwrap().subcommand, Subcommand::Help);
    }

    #[test]
    fn test_summarize_subcommand() {
        let cmd = parse("<@U0BOT> summarize Notes").unwrap();
        assert_eq!(cmd.subcommand, Subcommand::Summarize);
        assert_eq!(cmd.title.as_deref(), Some("Notes"));
    }

    #[test]
    fn test_surplus_positionals_are_usage_errors() {
        assert!(matches!(
            parse("<@U0BOT> one two three"),
            Err(CommandError::Usage(_))
        ));
    }

    #[test]
    fn test_usage_lists_subcommands() {
        let text = usage();
        for keyword in SUBCOMMAND_KEYWORDS {
            assert!(text.contains(keyword), "usage is missing {}", keyword);
        }
    }
}
