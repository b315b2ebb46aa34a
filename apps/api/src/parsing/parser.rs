//! AI Parsing Client: résumé text → `Profile`, never failing outward.
//!
//! Flow: credential check → one completion call → decode → normalize.
//! Any failure along the way (transport, status, empty or undecodable
//! completion) is logged and answered with `build_fallback(text)` instead.
//! The remote service is called once per parse, with no retry.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::llm_client::{CompletionProvider, CompletionRequest, LlmError};
use crate::models::profile::Profile;
use crate::parsing::decode::{decode_completion, DecodeError};
use crate::parsing::heuristic::build_fallback;
use crate::parsing::normalize::normalize;
use crate::parsing::prompts::{ENHANCE_PROMPT, RESUME_PARSE_PROMPT, RESUME_PARSE_SYSTEM};

const PARSE_TEMPERATURE: f32 = 0.1;
const PARSE_MAX_TOKENS: u32 = 4000;
const ENHANCE_TEMPERATURE: f32 = 0.7;
const ENHANCE_FALLBACK: &str = "Professional summary will be generated here.";
const PARSE_TITLE: &str = "AutoFolio Resume Parser";
const ENHANCE_TITLE: &str = "AutoFolio Content Enhancer";

/// Reasons the AI path was abandoned. Logged, never surfaced.
#[derive(Debug, Error)]
enum AiParseError {
    #[error("completion request failed: {0}")]
    Llm(#[from] LlmError),

    #[error("completion could not be decoded: {0}")]
    Decode(#[from] DecodeError),
}

#[derive(Clone)]
pub struct ResumeParser {
    provider: Option<Arc<dyn CompletionProvider>>,
}

impl ResumeParser {
    /// `None` means no credential is configured; every parse then goes
    /// straight to the heuristic builder.
    pub fn new(provider: Option<Arc<dyn CompletionProvider>>) -> Self {
        Self { provider }
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Parses extracted résumé text into a fully populated profile.
    pub async fn parse_resume(&self, text: &str) -> Profile {
        let Some(provider) = &self.provider else {
            warn!("No completion credential configured, using heuristic parsing");
            return build_fallback(text);
        };

        match parse_with_ai(provider.as_ref(), text).await {
            Ok(profile) => {
                info!(
                    "AI parsing succeeded: {} experience, {} education, {} skill groups",
                    profile.experience.len(),
                    profile.education.len(),
                    profile.skills.len()
                );
                profile
            }
            Err(e) => {
                warn!("AI parsing failed, falling back to heuristic parsing: {e}");
                build_fallback(text)
            }
        }
    }

    /// Generates polished copy for one portfolio section.
    ///
    /// Falls back to the profile summary when no credential is configured or
    /// the call fails.
    pub async fn enhance_section(&self, profile: &Profile, section: &str) -> String {
        let fallback = || {
            if profile.summary.trim().is_empty() {
                ENHANCE_FALLBACK.to_string()
            } else {
                profile.summary.clone()
            }
        };

        let Some(provider) = &self.provider else {
            return fallback();
        };

        let profile_json = match serde_json::to_string(profile) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize profile for enhancement: {e}");
                return fallback();
            }
        };
        let prompt = ENHANCE_PROMPT
            .replace("{section}", section)
            .replace("{profile_json}", &profile_json);

        let request = CompletionRequest {
            title: ENHANCE_TITLE,
            system: None,
            prompt: &prompt,
            temperature: ENHANCE_TEMPERATURE,
            max_tokens: None,
        };
        match provider.complete(request).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Content enhancement for section '{section}' failed: {e}");
                fallback()
            }
        }
    }
}

async fn parse_with_ai(
    provider: &dyn CompletionProvider,
    text: &str,
) -> Result<Profile, AiParseError> {
    let prompt = RESUME_PARSE_PROMPT.replace("{resume_text}", text);
    let completion = provider
        .complete(CompletionRequest {
            title: PARSE_TITLE,
            system: Some(RESUME_PARSE_SYSTEM),
            prompt: &prompt,
            temperature: PARSE_TEMPERATURE,
            max_tokens: Some(PARSE_MAX_TOKENS),
        })
        .await?;

    let raw = decode_completion(&completion)?;
    Ok(normalize(&raw))
}
