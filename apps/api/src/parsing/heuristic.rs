//! Heuristic Profile Builder: network-free fallback extraction.
//!
//! Recovers what plain pattern matching can find reliably (email, phone,
//! name, keyword skills) and fills every other section with fixed
//! placeholder records. Confidence scores sit well below the AI path's
//! defaults so the review step flags the result for manual editing.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::profile::{
    ConfidenceScores, Education, PersonalInfo, Profile, Project, SkillGroup, WorkExperience,
};
use crate::parsing::normalize::{DEFAULT_EMAIL, DEFAULT_LOCATION, DEFAULT_NAME, DEFAULT_PHONE};

/// Searched case-insensitively as substrings, reported in this order.
pub const SKILL_KEYWORDS: &[&str] = &[
    "javascript",
    "python",
    "react",
    "node",
    "java",
    "css",
    "html",
    "sql",
    "aws",
    "docker",
];

/// Technologies spliced into placeholder experience/project records.
const MAX_SPLICED_SKILLS: usize = 3;

pub const FALLBACK_CONFIDENCE: ConfidenceScores = ConfidenceScores {
    personal_info: 0.6,
    summary: 0.5,
    experience: 0.5,
    education: 0.5,
    skills: 0.4,
    projects: 0.3,
    overall: 0.5,
};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap());
static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\+?1[-.\s]?)?\(?([0-9]{3})\)?[-.\s]?([0-9]{3})[-.\s]?([0-9]{4})").unwrap()
});
static DIGIT_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]{3}").unwrap());

/// Builds a best-effort profile from raw résumé text. Deterministic.
pub fn build_fallback(text: &str) -> Profile {
    let skills = find_skills(text);
    let spliced: Vec<String> = skills.iter().take(MAX_SPLICED_SKILLS).cloned().collect();

    Profile {
        personal_info: PersonalInfo {
            name: find_name(text).unwrap_or(DEFAULT_NAME).to_string(),
            email: first_match(&EMAIL_RE, text).unwrap_or(DEFAULT_EMAIL).to_string(),
            phone: first_match(&PHONE_RE, text).unwrap_or(DEFAULT_PHONE).to_string(),
            location: DEFAULT_LOCATION.to_string(),
            title: "Professional".to_string(),
            website: String::new(),
            linkedin: String::new(),
            github: String::new(),
        },
        summary: "Experienced professional with a proven track record of delivering results and driving innovation.".to_string(),
        experience: vec![WorkExperience {
            id: "exp-1".to_string(),
            company: "Previous Company".to_string(),
            position: "Professional Role".to_string(),
            location: DEFAULT_LOCATION.to_string(),
            start_date: "01/2020".to_string(),
            end_date: "12/2023".to_string(),
            current: false,
            description: vec![
                "Led key initiatives and delivered measurable results".to_string(),
                "Collaborated with cross-functional teams to achieve objectives".to_string(),
            ],
            technologies: spliced.clone(),
        }],
        education: vec![Education {
            id: "edu-1".to_string(),
            institution: "University".to_string(),
            degree: "Bachelor's Degree".to_string(),
            field: "Field of Study".to_string(),
            location: DEFAULT_LOCATION.to_string(),
            start_date: "09/2016".to_string(),
            end_date: "05/2020".to_string(),
            gpa: String::new(),
            achievements: Vec::new(),
        }],
        skills: vec![SkillGroup {
            category: "Technical Skills".to_string(),
            skills: if skills.is_empty() {
                vec!["Professional Skills".to_string()]
            } else {
                skills
            },
        }],
        projects: vec![Project {
            id: "proj-1".to_string(),
            name: "Professional Project".to_string(),
            description: "Significant project that demonstrates expertise and impact.".to_string(),
            technologies: spliced,
            link: String::new(),
            github: String::new(),
            featured: true,
        }],
        achievements: vec![
            "Delivered successful projects and initiatives".to_string(),
            "Recognized for professional excellence".to_string(),
        ],
        confidence: FALLBACK_CONFIDENCE,
    }
}

fn first_match<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.find(text).map(|m| m.as_str())
}

/// First non-blank line that looks like a person's name: no `@`, no run of
/// three digits, and strictly between 2 and 50 characters long.
fn find_name(text: &str) -> Option<&str> {
    text.split('\n').map(str::trim).find(|line| {
        let len = line.chars().count();
        len > 2 && len < 50 && !line.contains('@') && !DIGIT_RUN_RE.is_match(line)
    })
}

fn find_skills(text: &str) -> Vec<String> {
    let haystack = text.to_lowercase();
    SKILL_KEYWORDS
        .iter()
        .filter(|kw| haystack.contains(*kw))
        .map(|kw| kw.to_string())
        .collect()
}
