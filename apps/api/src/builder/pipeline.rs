//! Upload → profile pipeline and its session bookkeeping.

use std::sync::Arc;

use tracing::{error, info};
use uuid::Uuid;

use crate::builder::session::{AnalysisTicket, Session};
use crate::builder::store::SessionStore;
use crate::errors::AppError;
use crate::extraction::{extract_text, ExtractionError, UploadedFile};
use crate::models::profile::Profile;
use crate::parsing::parser::ResumeParser;

/// Extraction followed by parsing. Only extraction can fail; parsing always
/// yields a profile.
pub async fn analyze_file(
    file: &UploadedFile,
    parser: &ResumeParser,
) -> Result<Profile, ExtractionError> {
    let text = extract_text(file)?;
    info!(
        "Extracted {} characters from '{}'",
        text.chars().count(),
        file.file_name
    );
    Ok(parser.parse_resume(&text).await)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisRun {
    /// The result was stored on the session.
    Completed,
    /// Nothing to do: a profile exists or a run is already in flight.
    Skipped,
    /// A newer upload or a reset arrived first; the result was dropped.
    Superseded,
}

/// Runs the pipeline for the session's current file, at most once per file.
///
/// The store lock is released while the pipeline runs. The run itself is a
/// spawned task: it finishes and records its result even if the caller's
/// future is dropped first.
pub async fn run_analysis(
    store: &SessionStore,
    parser: &Arc<ResumeParser>,
    id: Uuid,
) -> Result<AnalysisRun, AppError> {
    let ticket = store
        .update(id, Session::begin_analysis)
        .await
        .ok_or_else(|| session_not_found(id))??;
    let Some(ticket) = ticket else {
        return Ok(AnalysisRun::Skipped);
    };
    let generation = ticket.generation;

    let task = tokio::spawn(finish_analysis(
        store.clone(),
        parser.clone(),
        id,
        ticket,
    ));
    match task.await {
        Ok(result) => result,
        Err(e) => {
            error!(session_id = %id, "Analysis task ended abnormally: {e}");
            store
                .update(id, |s| s.abandon_analysis(generation))
                .await;
            Err(AppError::Internal(anyhow::anyhow!("analysis task failed: {e}")))
        }
    }
}

async fn finish_analysis(
    store: SessionStore,
    parser: Arc<ResumeParser>,
    id: Uuid,
    ticket: AnalysisTicket,
) -> Result<AnalysisRun, AppError> {
    let generation = ticket.generation;
    let applied = match analyze_file(&ticket.file, &parser).await {
        Ok(profile) => store
            .update(id, move |s| s.complete_analysis(generation, Ok(profile)))
            .await
            .ok_or_else(|| session_not_found(id))?,
        Err(e) => {
            let applied = store
                .update(id, |s| s.complete_analysis(generation, Err(&e)))
                .await
                .ok_or_else(|| session_not_found(id))?;
            if applied {
                return Err(e.into());
            }
            false
        }
    };

    Ok(if applied {
        AnalysisRun::Completed
    } else {
        AnalysisRun::Superseded
    })
}

pub fn session_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}
