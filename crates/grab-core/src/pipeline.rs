//! Mention handling: command in, wiki write or prompt out.

use grab_command::{interpret, tokenize, usage, ParsedCommand, Subcommand};
use grab_models::{MentionEvent, PendingOverwrite, PublishDecision, ThreadRef, WriteTarget};
use tracing::{info, warn};

use crate::context::GrabContext;
use crate::decision::{decide, gather_facts, PublishIntent, PublishRequest, SectionChoice};
use crate::error::{GrabError, Result};
use crate::gateway::{publish, Notice};
use crate::messages;
use crate::packager::{NameCache, PackagedThread};

/// What happened in response to a mention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MentionOutcome {
    /// The wiki was written.
    Published { target: WriteTarget, url: String },
    /// The user was asked to confirm an overwrite.
    Prompted {
        existing_url: String,
        target: WriteTarget,
    },
    Rejected { reason: String },
    Help,
    SummarizeUnavailable,
    /// The command failed and the user was told why.
    Failed { error: String },
}

impl GrabContext {
    /// Handle one mention of the bot.
    ///
    /// Never fails: errors are reported to the user as an ephemeral reply
    /// and returned as [`MentionOutcome::Failed`].
    pub async fn handle_mention(&self, event: &MentionEvent) -> MentionOutcome {
        let thread = event.thread();
        info!(
            channel = %thread.channel_id,
            thread_ts = %thread.thread_ts,
            user = %event.user_id,
            "Handling mention"
        );

        match self.run_mention(event, &thread).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(channel = %thread.channel_id, user = %event.user_id, error = %e, "Command failed");
                let error = e.to_string();
                self.notify(&thread, &event.user_id, Notice::text(error.clone()))
                    .await;
                MentionOutcome::Failed { error }
            }
        }
    }

    async fn run_mention(&self, event: &MentionEvent, thread: &ThreadRef) -> Result<MentionOutcome> {
        let command = interpret(&tokenize(&event.text))?;

        match command.subcommand {
            Subcommand::Help => {
                self.notify(thread, &event.user_id, Notice::text(usage()))
                    .await;
                Ok(MentionOutcome::Help)
            }
            Subcommand::Summarize => self.summarize_unavailable(event, thread).await,
            _ if command.summarize => self.summarize_unavailable(event, thread).await,
            Subcommand::Default | Subcommand::Range => self.save(event, thread, &command).await,
            Subcommand::Append => self.append(event, thread, &command).await,
        }
    }

    async fn summarize_unavailable(
        &self,
        event: &MentionEvent,
        thread: &ThreadRef,
    ) -> Result<MentionOutcome> {
        self.notify(
            thread,
            &event.user_id,
            Notice::text(messages::SUMMARIZE_UNAVAILABLE),
        )
        .await;
        Ok(MentionOutcome::SummarizeUnavailable)
    }

    async fn save(
        &self,
        event: &MentionEvent,
        thread: &ThreadRef,
        command: &ParsedCommand,
    ) -> Result<MentionOutcome> {
        let range = command.range().map(|(start, end)| (start.ts(), end.ts()));
        let mut names = NameCache::new();
        let packaged = self.packager().package(thread, range, &mut names).await?;

        // range takes its title and section from its own positionals
        let (title, section) = match command.subcommand {
            Subcommand::Range => (command.title.clone(), command.section.clone()),
            _ => (packaged.title.clone(), packaged.section.clone()),
        };
        let generated = &packaged.transcript.generated_title;
        let section = match section {
            Some(section) => SectionChoice::explicit(section),
            None => SectionChoice::inferred(generated),
        };
        let request = PublishRequest::new(
            title.unwrap_or_else(|| generated.clone()),
            Some(section),
        );

        self.decide_and_apply(event, thread, PublishIntent::Save, request, &packaged, range)
            .await
    }

    async fn append(
        &self,
        event: &MentionEvent,
        thread: &ThreadRef,
        command: &ParsedCommand,
    ) -> Result<MentionOutcome> {
        let title = command
            .title
            .clone()
            .ok_or_else(|| GrabError::Usage(usage()))?;
        let mut names = NameCache::new();
        let packaged = self.packager().package(thread, None, &mut names).await?;

        let request = PublishRequest::new(title, command.section.clone().map(SectionChoice::explicit));
        let intent = PublishIntent::Append {
            clobber: command.clobber,
        };
        self.decide_and_apply(event, thread, intent, request, &packaged, None)
            .await
    }

    async fn decide_and_apply(
        &self,
        event: &MentionEvent,
        thread: &ThreadRef,
        intent: PublishIntent,
        request: PublishRequest,
        packaged: &PackagedThread,
        range: Option<(&str, &str)>,
    ) -> Result<MentionOutcome> {
        let _guard = self.locks.lock(&request.title).await;
        let facts = gather_facts(self.wiki.as_ref(), &request).await;
        let decision = decide(intent, &request, &facts);
        info!(title = %request.title, ?decision, "Publish decision");

        match decision {
            PublishDecision::PublishDirect { target } => {
                let url = publish(self.wiki.as_ref(), &target, &packaged.transcript.body).await?;
                info!(title = %target.title, url = %url, "Article written");
                self.notify(
                    thread,
                    &event.user_id,
                    Notice::text(messages::published(&target, &url)),
                )
                .await;
                Ok(MentionOutcome::Published { target, url })
            }
            PublishDecision::ConfirmOverwrite {
                existing_url,
                target,
            } => {
                let mut pending = PendingOverwrite::new(thread, &event.user_id, target.clone());
                if let Some((start, end)) = range {
                    pending = pending.with_range(start, end);
                }
                let prompt_id = pending.id.clone();
                self.pending.insert(pending).await;

                let warning = messages::overwrite_warning(&existing_url, &target);
                self.notify(
                    thread,
                    &event.user_id,
                    Notice::ConfirmOverwrite { warning, prompt_id },
                )
                .await;
                Ok(MentionOutcome::Prompted {
                    existing_url,
                    target,
                })
            }
            PublishDecision::Reject { reason } => {
                self.notify(thread, &event.user_id, Notice::text(reason.clone()))
                    .await;
                Ok(MentionOutcome::Rejected { reason })
            }
        }
    }
}
