//! Builder State Machine.
//!
//! A `Session` walks `upload → analyze → template → customize → preview`.
//! Moving forward passes through a guard for every step entered; moving back
//! is always allowed. All mutation goes through the methods below.
//!
//! Analysis runs outside the session: `begin_analysis` hands out an
//! `AnalysisTicket` stamped with the current generation, and
//! `complete_analysis` only applies a result whose generation still matches.
//! Accepting a new file and resetting both advance the generation, so a slow
//! analysis of an older file can never overwrite a newer one.
//!
//! Upload bytes are held only until a profile exists; afterwards the session
//! keeps the file's `FileSummary`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::extraction::{validate_file, ExtractionError, FileRejection, UploadedFile};
use crate::models::customization::{CustomizationOptions, CustomizationPatch};
use crate::models::profile::Profile;
use crate::models::template::PortfolioTemplate;
use crate::parsing::normalize::normalize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Upload,
    Analyze,
    Template,
    Customize,
    Preview,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::Upload,
        Step::Analyze,
        Step::Template,
        Step::Customize,
        Step::Preview,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Step::Upload => "upload",
            Step::Analyze => "analyze",
            Step::Template => "template",
            Step::Customize => "customize",
            Step::Preview => "preview",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A refused state-machine operation. The session is left unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransitionError {
    #[error("Upload a valid resume file first")]
    MissingFile,

    #[error("Resume analysis has not produced a profile yet")]
    MissingProfile,

    #[error("Select a template before continuing")]
    MissingTemplate,

    #[error("Files can only be uploaded from the upload step (current step: {0})")]
    UploadOutsideUploadStep(Step),

    #[error("Analysis can only run from the analyze step (current step: {0})")]
    AnalyzeOutsideAnalyzeStep(Step),

    #[error("Invalid profile edit: {0}")]
    InvalidEdit(String),
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error(transparent)]
    Rejected(#[from] FileRejection),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Work order for one pipeline run.
#[derive(Debug, Clone)]
pub struct AnalysisTicket {
    pub generation: u64,
    pub file: UploadedFile,
}

/// Read-only input of the portfolio preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewBundle {
    pub profile: Profile,
    pub template: PortfolioTemplate,
    pub customization: CustomizationOptions,
}

/// Uploaded file as reported to clients; the bytes stay server-side.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    pub file_name: String,
    pub media_type: String,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: Uuid,
    pub step: Step,
    pub file: Option<FileSummary>,
    pub profile: Option<Profile>,
    pub selected_template: Option<PortfolioTemplate>,
    pub customization: CustomizationOptions,
    pub is_processing: bool,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    step: Step,
    file: Option<FileSummary>,
    /// Bytes awaiting analysis. Cleared once a profile is stored.
    pending_upload: Option<UploadedFile>,
    profile: Option<Profile>,
    selected_template: Option<PortfolioTemplate>,
    customization: CustomizationOptions,
    is_processing: bool,
    error: Option<String>,
    generation: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            step: Step::Upload,
            file: None,
            pending_upload: None,
            profile: None,
            selected_template: None,
            customization: CustomizationOptions::default(),
            is_processing: false,
            error: None,
            generation: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn is_processing(&self) -> bool {
        self.is_processing
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Validates and stores a file, then moves `upload → analyze`.
    ///
    /// A rejected file leaves the session at `upload` with the rejection
    /// message recorded as its error.
    pub fn accept_file(&mut self, mut file: UploadedFile) -> Result<(), UploadError> {
        if self.step != Step::Upload {
            return Err(TransitionError::UploadOutsideUploadStep(self.step).into());
        }
        let media_type = match validate_file(&file) {
            Ok(media_type) => media_type,
            Err(rejection) => {
                self.error = Some(rejection.to_string());
                self.touch();
                return Err(rejection.into());
            }
        };

        file.media_type = media_type.mime().to_string();
        self.file = Some(FileSummary {
            file_name: file.file_name.clone(),
            media_type: file.media_type.clone(),
            size: file.size,
        });
        self.pending_upload = Some(file);
        self.profile = None;
        self.is_processing = false;
        self.error = None;
        self.generation += 1;
        self.step = Step::Analyze;
        self.touch();
        Ok(())
    }

    /// Claims the pipeline run for the current file.
    ///
    /// Returns `None` when there is nothing to do: a profile already exists
    /// or a run for this generation is in flight.
    pub fn begin_analysis(&mut self) -> Result<Option<AnalysisTicket>, TransitionError> {
        if self.step != Step::Analyze {
            return Err(TransitionError::AnalyzeOutsideAnalyzeStep(self.step));
        }
        if self.profile.is_some() || self.is_processing {
            return Ok(None);
        }
        let file = self
            .pending_upload
            .clone()
            .ok_or(TransitionError::MissingFile)?;

        self.is_processing = true;
        self.touch();
        Ok(Some(AnalysisTicket {
            generation: self.generation,
            file,
        }))
    }

    /// Applies a pipeline result. Returns `false` if the result was stale and
    /// has been discarded.
    ///
    /// An extraction failure clears the file and sends the session back to
    /// `upload` with the error recorded.
    pub fn complete_analysis(
        &mut self,
        generation: u64,
        outcome: Result<Profile, &ExtractionError>,
    ) -> bool {
        if generation != self.generation {
            info!(
                session_id = %self.id,
                "Discarding stale analysis result (generation {generation}, current {})",
                self.generation
            );
            return false;
        }

        self.is_processing = false;
        match outcome {
            Ok(profile) => {
                self.profile = Some(profile);
                self.pending_upload = None;
                self.error = None;
            }
            Err(e) => {
                self.error = Some(e.to_string());
                self.file = None;
                self.pending_upload = None;
                self.step = Step::Upload;
            }
        }
        self.touch();
        true
    }

    /// Releases the processing claim of a run that ended without a result.
    /// The file stays, so the next `begin_analysis` claims it again.
    pub fn abandon_analysis(&mut self, generation: u64) {
        if generation == self.generation && self.is_processing {
            self.is_processing = false;
            self.touch();
        }
    }

    /// Moves to `target`. Backward moves always succeed; forward moves must
    /// satisfy the guard of every step entered on the way.
    pub fn go_to(&mut self, target: Step) -> Result<(), TransitionError> {
        if target > self.step {
            for step in Step::ALL
                .into_iter()
                .filter(|s| *s > self.step && *s <= target)
            {
                self.guard_entry(step)?;
            }
        }
        if target != self.step {
            self.step = target;
            self.touch();
        }
        Ok(())
    }

    fn guard_entry(&self, step: Step) -> Result<(), TransitionError> {
        match step {
            Step::Upload | Step::Preview => Ok(()),
            Step::Analyze if self.file.is_none() => Err(TransitionError::MissingFile),
            Step::Template if self.profile.is_none() => Err(TransitionError::MissingProfile),
            Step::Customize if self.selected_template.is_none() => {
                Err(TransitionError::MissingTemplate)
            }
            _ => Ok(()),
        }
    }

    pub fn select_template(&mut self, template: PortfolioTemplate) {
        self.selected_template = Some(template);
        self.touch();
    }

    pub fn update_customization(&mut self, patch: CustomizationPatch) {
        self.customization.apply(patch);
        self.touch();
    }

    /// Sets one value inside the profile, addressed by a dotted path such as
    /// `personalInfo.name` or `experience.0.company`. The result is
    /// re-normalized.
    pub fn edit_profile_field(&mut self, path: &str, value: Value) -> Result<(), TransitionError> {
        let profile = self.profile.as_ref().ok_or(TransitionError::MissingProfile)?;
        if path.trim().is_empty() {
            return Err(TransitionError::InvalidEdit("field path is empty".to_string()));
        }

        let mut doc = serde_json::to_value(profile)
            .map_err(|e| TransitionError::InvalidEdit(e.to_string()))?;
        let slot = doc
            .pointer_mut(&json_pointer(path))
            .ok_or_else(|| TransitionError::InvalidEdit(format!("unknown field '{path}'")))?;
        *slot = value;

        self.profile = Some(normalize(&doc));
        self.touch();
        Ok(())
    }

    pub fn replace_profile(&mut self, raw: &Value) {
        self.profile = Some(normalize(raw));
        self.touch();
    }

    pub fn preview(&self) -> Result<PreviewBundle, TransitionError> {
        let profile = self.profile.clone().ok_or(TransitionError::MissingProfile)?;
        let template = self
            .selected_template
            .clone()
            .ok_or(TransitionError::MissingTemplate)?;
        Ok(PreviewBundle {
            profile,
            template,
            customization: self.customization,
        })
    }

    /// Back to a blank `upload` step. The id is kept and the generation keeps
    /// counting, so in-flight analysis results are dropped.
    pub fn reset(&mut self) {
        self.step = Step::Upload;
        self.file = None;
        self.pending_upload = None;
        self.profile = None;
        self.selected_template = None;
        self.customization = CustomizationOptions::default();
        self.is_processing = false;
        self.error = None;
        self.generation += 1;
        self.touch();
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id,
            step: self.step,
            file: self.file.clone(),
            profile: self.profile.clone(),
            selected_template: self.selected_template.clone(),
            customization: self.customization,
            is_processing: self.is_processing,
            error: self.error.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// `experience.0.company` → `/experience/0/company` (RFC 6901 escaping).
fn json_pointer(path: &str) -> String {
    path.split('.')
        .map(|segment| format!("/{}", segment.replace('~', "~0").replace('/', "~1")))
        .collect()
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use serde_json::json;

    use super::*;
    use crate::extraction::MAX_FILE_SIZE;
    use crate::models::customization::Theme;
    use crate::models::template::find_template;
    use crate::parsing::heuristic::build_fallback;
    use crate::parsing::normalize::DEFAULT_COMPANY;

    fn resume(body: &str) -> UploadedFile {
        UploadedFile::new("resume.txt", "text/plain", Bytes::from(body.to_string()))
    }

    fn analyzed(body: &str) -> Session {
        let mut s = Session::new();
        s.accept_file(resume(body)).unwrap();
        let ticket = s.begin_analysis().unwrap().unwrap();
        assert!(s.complete_analysis(ticket.generation, Ok(build_fallback(body))));
        s
    }

    fn template() -> PortfolioTemplate {
        find_template("technical").unwrap()
    }

    #[test]
    fn test_fresh_session() {
        let s = Session::new();
        assert_eq!(s.step(), Step::Upload);
        assert!(s.profile().is_none());
        assert!(!s.is_processing());
        assert_eq!(s.generation(), 0);
        assert_eq!(s.view().customization, CustomizationOptions::default());
    }

    #[test]
    fn test_cannot_leave_upload_without_file() {
        let mut s = Session::new();
        assert_eq!(s.go_to(Step::Analyze), Err(TransitionError::MissingFile));
        assert_eq!(s.go_to(Step::Preview), Err(TransitionError::MissingFile));
        assert_eq!(s.step(), Step::Upload);
    }

    #[test]
    fn test_accept_file_moves_to_analyze_and_clears_error() {
        let mut s = Session::new();
        let rejected = s.accept_file(UploadedFile::new("cv.png", "image/png", Bytes::new()));
        assert!(matches!(
            rejected,
            Err(UploadError::Rejected(FileRejection::InvalidFileType { .. }))
        ));
        assert_eq!(s.step(), Step::Upload);
        assert_eq!(
            s.error(),
            Some("File type not supported. Please upload PDF, DOCX, or TXT files.")
        );

        s.accept_file(resume("Jane Doe")).unwrap();
        assert_eq!(s.step(), Step::Analyze);
        assert_eq!(s.error(), None);
        assert_eq!(s.generation(), 1);
        assert_eq!(s.view().file.unwrap().file_name, "resume.txt");
    }

    #[test]
    fn test_accepted_media_type_is_canonical() {
        let mut s = Session::new();
        s.accept_file(UploadedFile::new(
            "resume.txt",
            "Text/Plain; charset=UTF-8",
            Bytes::from_static(b"Jane Doe"),
        ))
        .unwrap();
        assert_eq!(s.view().file.unwrap().media_type, "text/plain");
    }

    #[test]
    fn test_oversized_file_rejected() {
        let mut s = Session::new();
        let big = Bytes::from(vec![b'a'; MAX_FILE_SIZE as usize + 1]);
        let result = s.accept_file(UploadedFile::new("big.txt", "text/plain", big));
        assert!(matches!(
            result,
            Err(UploadError::Rejected(FileRejection::FileTooLarge { .. }))
        ));
        assert_eq!(s.error(), Some("File size must be less than 10MB"));
        assert!(s.view().file.is_none());
    }

    #[test]
    fn test_upload_only_from_upload_step() {
        let mut s = analyzed("Jane Doe");
        let result = s.accept_file(resume("John Roe"));
        assert!(matches!(
            result,
            Err(UploadError::Transition(TransitionError::UploadOutsideUploadStep(Step::Analyze)))
        ));
    }

    #[test]
    fn test_template_guard_scenario() {
        let mut s = analyzed("Jane Doe");
        s.go_to(Step::Template).unwrap();

        assert_eq!(s.go_to(Step::Customize), Err(TransitionError::MissingTemplate));
        assert_eq!(s.step(), Step::Template);

        s.select_template(template());
        s.go_to(Step::Customize).unwrap();
        assert_eq!(s.step(), Step::Customize);
        s.go_to(Step::Preview).unwrap();
        assert_eq!(s.step(), Step::Preview);
    }

    #[test]
    fn test_template_requires_profile() {
        let mut s = Session::new();
        s.accept_file(resume("Jane Doe")).unwrap();
        assert_eq!(s.go_to(Step::Template), Err(TransitionError::MissingProfile));
        assert_eq!(s.step(), Step::Analyze);
    }

    #[test]
    fn test_forward_jump_checks_every_guard() {
        let mut s = analyzed("Jane Doe");
        assert_eq!(s.go_to(Step::Preview), Err(TransitionError::MissingTemplate));
        assert_eq!(s.step(), Step::Analyze);

        s.select_template(template());
        s.go_to(Step::Preview).unwrap();
        assert_eq!(s.step(), Step::Preview);
    }

    #[test]
    fn test_backward_navigation_always_allowed() {
        let mut s = analyzed("Jane Doe");
        s.select_template(template());
        s.go_to(Step::Preview).unwrap();

        s.go_to(Step::Template).unwrap();
        assert_eq!(s.step(), Step::Template);
        s.go_to(Step::Upload).unwrap();
        assert_eq!(s.step(), Step::Upload);
        // Data survives backward moves.
        assert!(s.profile().is_some());
        s.go_to(Step::Upload).unwrap();
    }

    #[test]
    fn test_analysis_is_claimed_once() {
        let mut s = Session::new();
        s.accept_file(resume("Jane Doe")).unwrap();

        let ticket = s.begin_analysis().unwrap();
        assert!(ticket.is_some());
        assert!(s.is_processing());
        assert!(s.begin_analysis().unwrap().is_none());

        let ticket = ticket.unwrap();
        assert!(s.complete_analysis(ticket.generation, Ok(build_fallback("Jane Doe"))));
        assert!(!s.is_processing());
        assert!(s.begin_analysis().unwrap().is_none());
    }

    #[test]
    fn test_upload_bytes_released_after_profile_stored() {
        let mut s = Session::new();
        s.accept_file(resume("Jane Doe")).unwrap();
        assert!(s.pending_upload.is_some());

        let ticket = s.begin_analysis().unwrap().unwrap();
        assert!(s.complete_analysis(ticket.generation, Ok(build_fallback("Jane Doe"))));

        assert!(s.pending_upload.is_none());
        let file = s.view().file.unwrap();
        assert_eq!(file.file_name, "resume.txt");
        assert_eq!(file.size, 8);
        // The summary alone satisfies the analyze guard.
        s.go_to(Step::Upload).unwrap();
        s.go_to(Step::Template).unwrap();
    }

    #[test]
    fn test_abandoned_analysis_can_be_claimed_again() {
        let mut s = Session::new();
        s.accept_file(resume("Jane Doe")).unwrap();
        let ticket = s.begin_analysis().unwrap().unwrap();

        s.abandon_analysis(ticket.generation);

        assert!(!s.is_processing());
        let retry = s.begin_analysis().unwrap().unwrap();
        assert_eq!(retry.generation, ticket.generation);
        assert_eq!(retry.file.bytes, Bytes::from("Jane Doe"));
    }

    #[test]
    fn test_abandon_ignores_stale_generation() {
        let mut s = Session::new();
        s.accept_file(resume("Alice Adams")).unwrap();
        let stale = s.begin_analysis().unwrap().unwrap();
        s.go_to(Step::Upload).unwrap();
        s.accept_file(resume("Bob Brown")).unwrap();
        s.begin_analysis().unwrap().unwrap();

        s.abandon_analysis(stale.generation);

        assert!(s.is_processing());
    }

    #[test]
    fn test_analysis_outside_analyze_step() {
        let mut s = Session::new();
        assert_eq!(
            s.begin_analysis().unwrap_err(),
            TransitionError::AnalyzeOutsideAnalyzeStep(Step::Upload)
        );
    }

    #[test]
    fn test_newer_upload_wins_race() {
        let mut s = Session::new();
        s.accept_file(resume("Alice Adams")).unwrap();
        let ticket_a = s.begin_analysis().unwrap().unwrap();

        s.go_to(Step::Upload).unwrap();
        s.accept_file(resume("Bob Brown")).unwrap();

        // A resolves late and is dropped.
        assert!(!s.complete_analysis(ticket_a.generation, Ok(build_fallback("Alice Adams"))));
        assert!(s.profile().is_none());

        let ticket_b = s.begin_analysis().unwrap().unwrap();
        assert_eq!(ticket_b.file.bytes, Bytes::from("Bob Brown"));
        assert!(s.complete_analysis(ticket_b.generation, Ok(build_fallback("Bob Brown"))));
        assert_eq!(s.profile().unwrap().personal_info.name, "Bob Brown");
    }

    #[test]
    fn test_reset_discards_in_flight_analysis() {
        let mut s = Session::new();
        s.accept_file(resume("Jane Doe")).unwrap();
        s.update_customization(CustomizationPatch {
            theme: Some(Theme::Rose),
            ..Default::default()
        });
        let ticket = s.begin_analysis().unwrap().unwrap();
        let id = s.id();

        s.reset();
        assert_eq!(s.step(), Step::Upload);
        assert_eq!(s.id(), id);
        assert!(!s.is_processing());
        assert_eq!(s.view().customization, CustomizationOptions::default());
        assert!(s.view().file.is_none());
        assert!(s.generation() > ticket.generation);

        assert!(!s.complete_analysis(ticket.generation, Ok(build_fallback("Jane Doe"))));
        assert!(s.profile().is_none());
    }

    #[test]
    fn test_extraction_failure_returns_to_upload() {
        let mut s = Session::new();
        s.accept_file(resume("Jane Doe")).unwrap();
        let ticket = s.begin_analysis().unwrap().unwrap();

        let applied = s.complete_analysis(
            ticket.generation,
            Err(&ExtractionError::UnsupportedFormat("image/png".to_string())),
        );

        assert!(applied);
        assert_eq!(s.step(), Step::Upload);
        assert!(!s.is_processing());
        assert!(s.view().file.is_none());
        assert!(s.error().unwrap().contains("image/png"));
    }

    #[test]
    fn test_edit_profile_field() {
        let mut s = analyzed("Jane Doe");

        s.edit_profile_field("personalInfo.title", json!("Staff Engineer"))
            .unwrap();
        s.edit_profile_field("experience.0.company", json!("Acme Corp"))
            .unwrap();

        let p = s.profile().unwrap();
        assert_eq!(p.personal_info.title, "Staff Engineer");
        assert_eq!(p.experience[0].company, "Acme Corp");
    }

    #[test]
    fn test_edit_renormalizes_blank_value() {
        let mut s = analyzed("Jane Doe");
        s.edit_profile_field("experience.0.company", json!("")).unwrap();
        assert_eq!(s.profile().unwrap().experience[0].company, DEFAULT_COMPANY);
    }

    #[test]
    fn test_edit_rejects_unknown_paths() {
        let mut s = analyzed("Jane Doe");
        for path in ["nickname", "experience.7.company", "personalInfo.name.first", ""] {
            assert!(
                matches!(
                    s.edit_profile_field(path, json!("x")),
                    Err(TransitionError::InvalidEdit(_))
                ),
                "path {path:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_edit_requires_profile() {
        let mut s = Session::new();
        assert_eq!(
            s.edit_profile_field("summary", json!("x")),
            Err(TransitionError::MissingProfile)
        );
    }

    #[test]
    fn test_replace_profile_normalizes() {
        let mut s = Session::new();
        s.replace_profile(&json!({"personalInfo": {"name": "Ada Lovelace"}}));
        let p = s.profile().unwrap();
        assert_eq!(p.personal_info.name, "Ada Lovelace");
        assert_eq!(p.experience.len(), 0);
    }

    #[test]
    fn test_preview_bundle() {
        let mut s = analyzed("Jane Doe");
        assert_eq!(s.preview(), Err(TransitionError::MissingTemplate));

        s.select_template(template());
        let bundle = s.preview().unwrap();
        assert_eq!(bundle.template.id, "technical");
        assert_eq!(bundle.profile.personal_info.name, "Jane Doe");
        assert_eq!(bundle.customization, CustomizationOptions::default());
    }

    #[test]
    fn test_json_pointer_escaping() {
        assert_eq!(json_pointer("experience.0.company"), "/experience/0/company");
        assert_eq!(json_pointer("a~b/c"), "/a~0b~1c");
    }

    #[test]
    fn test_step_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Step::Customize).unwrap(), json!("customize"));
        let step: Step = serde_json::from_value(json!("preview")).unwrap();
        assert_eq!(step, Step::Preview);
    }
}
