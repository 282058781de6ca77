// src/pipeline/run.rs

//! One notifier run.
//!
//! ```text
//! Init → Fetch → ExtractAll → (resolve → filter seen → dispatch → mark seen)* → Persist → Done
//! ```
//!
//! Posts are handled oldest first so notifications arrive in the order the
//! posts were published. A post is marked seen right after its notification
//! goes out, and the seen-set is saved once at the end of the run, also when
//! a dispatch fails, so a retried run never repeats a notification that was
//! already delivered.

use crate::error::Result;
use crate::models::{RawPost, RunReport, SeenSet};
use crate::pipeline::{IdentityPolicy, NotificationComposer, RunObserver, RunPhase};
use crate::services::{Notifier, PostSource};
use crate::storage::SeenStorage;

/// Everything a run needs besides the source.
pub struct Runner<'a> {
    pub storage: &'a dyn SeenStorage,
    pub notifier: &'a dyn Notifier,
    pub policy: IdentityPolicy,
    pub composer: NotificationComposer,
    pub observer: &'a dyn RunObserver,
    /// List new posts without sending or saving anything
    pub dry_run: bool,
}

impl Runner<'_> {
    /// Run once against a source.
    pub async fn run<S: PostSource>(&self, source: &S) -> Result<RunReport> {
        let observer = self.observer;
        let mut report = RunReport::start();

        observer.phase(RunPhase::Init);
        let mut seen = self.storage.load().await?;

        observer.phase(RunPhase::Fetch);
        let records = source.fetch(observer).await?;
        report.fetched = records.len();
        observer.fetched(&source.describe(), records.len());

        observer.phase(RunPhase::ExtractAll);
        let mut posts = Vec::with_capacity(records.len());
        for record in &records {
            match source.extract(record) {
                Ok(post) => posts.push(post),
                Err(skip) => {
                    report.extraction_skipped += 1;
                    observer.extraction_skipped(&skip);
                }
            }
        }
        // Sources list newest first
        posts.reverse();

        if !posts.is_empty() {
            observer.phase(RunPhase::Dispatch);
        }
        let outcome = self.process(&posts, &mut seen, &mut report).await;

        if self.dry_run {
            log::info!("Dry run: seen-set left untouched");
        } else {
            observer.phase(RunPhase::Persist);
            let saved = self.storage.save(&seen).await;
            match (&outcome, saved) {
                (_, Ok(())) => observer.persisted(&self.storage.location(), seen.len()),
                (Ok(()), Err(e)) => return Err(e),
                (Err(_), Err(e)) => log::error!("Failed to save seen-set: {e}"),
            }
        }
        outcome?;

        report.finish();
        observer.phase(RunPhase::Done);
        observer.finished(&report);
        Ok(report)
    }

    async fn process(
        &self,
        posts: &[RawPost],
        seen: &mut SeenSet,
        report: &mut RunReport,
    ) -> Result<()> {
        let observer = self.observer;

        for post in posts {
            let Some(id) = self.policy.resolve(post) else {
                report.no_identity += 1;
                observer.no_identity(post);
                continue;
            };

            if seen.contains(&id) {
                report.already_seen += 1;
                observer.already_seen(&id);
                continue;
            }

            observer.new_post(&id, post);
            let notification = self.composer.compose(post);

            if self.dry_run {
                observer.dry_run(&id, &notification.title);
            } else {
                if let Err(e) = self.notifier.send(&notification).await {
                    observer.dispatch_failed(&id, &e);
                    return Err(e);
                }
                observer.dispatched(&id, &notification.title);
            }

            seen.mark_seen(id);
            report.notified += 1;
        }

        Ok(())
    }
}
