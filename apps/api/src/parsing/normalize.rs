//! Schema Normalizer: coerces an arbitrary decoded object into a fully
//! populated `Profile`.
//!
//! Never fails. Every absent, mistyped or blank field is replaced with the
//! placeholder literal defined below; downstream consumers match on these
//! exact strings, so they must not change.
//!
//! Rules:
//! - scalar text: a non-blank string, else the field's placeholder;
//!   `id`, `gpa` and dates also accept JSON numbers (rendered as text)
//! - sections (`experience`, `education`, `skills`, `projects`,
//!   `achievements`): not an array → empty; otherwise each element is
//!   normalized on its own (a non-object element becomes an all-default item)
//! - item ids: kept when present and unused so far in the section, else
//!   `<prefix>-<1-based index>`
//! - string lists: non-string and blank elements are dropped; a missing
//!   experience `description` becomes `["Professional responsibility"]`
//! - skill groups sharing a category are merged into the first one
//! - confidence: a finite number in `[0, 1]`, else the per-field default
//!
//! `normalize(to_value(normalize(x))) == normalize(x)` for every input.

use std::collections::HashSet;

use serde_json::Value;

use crate::models::profile::{
    ConfidenceScores, Education, PersonalInfo, Profile, Project, SkillGroup, WorkExperience,
};

pub const DEFAULT_NAME: &str = "Professional Name";
pub const DEFAULT_EMAIL: &str = "email@example.com";
pub const DEFAULT_PHONE: &str = "+1 (555) 123-4567";
pub const DEFAULT_LOCATION: &str = "City, State";
pub const DEFAULT_TITLE: &str = "Professional Title";
pub const DEFAULT_SUMMARY: &str =
    "Professional summary will be generated based on your experience and skills.";

pub const DEFAULT_COMPANY: &str = "Company Name";
pub const DEFAULT_POSITION: &str = "Position Title";
pub const DEFAULT_ITEM_LOCATION: &str = "Location";
pub const DEFAULT_EXPERIENCE_START: &str = "01/2020";
pub const DEFAULT_EXPERIENCE_END: &str = "12/2023";
pub const DEFAULT_DESCRIPTION: &str = "Professional responsibility";

pub const DEFAULT_INSTITUTION: &str = "Institution Name";
pub const DEFAULT_DEGREE: &str = "Degree";
pub const DEFAULT_FIELD: &str = "Field of Study";
pub const DEFAULT_EDUCATION_START: &str = "09/2016";
pub const DEFAULT_EDUCATION_END: &str = "05/2020";

pub const DEFAULT_SKILL_CATEGORY: &str = "Skills";

pub const DEFAULT_PROJECT_NAME: &str = "Project Name";
pub const DEFAULT_PROJECT_DESCRIPTION: &str = "Project description";

pub const DEFAULT_CONFIDENCE: ConfidenceScores = ConfidenceScores {
    personal_info: 0.8,
    summary: 0.7,
    experience: 0.8,
    education: 0.8,
    skills: 0.7,
    projects: 0.6,
    overall: 0.75,
};

/// Normalizes any JSON value into a `Profile`.
pub fn normalize(raw: &Value) -> Profile {
    Profile {
        personal_info: personal_info(raw.get("personalInfo")),
        summary: text_or(raw.get("summary"), DEFAULT_SUMMARY),
        experience: items(raw.get("experience"), "exp", work_experience),
        education: items(raw.get("education"), "edu", education),
        skills: skill_groups(raw.get("skills")),
        projects: items(raw.get("projects"), "proj", project),
        achievements: string_list(raw.get("achievements")),
        confidence: confidence(raw.get("confidence")),
    }
}

fn personal_info(raw: Option<&Value>) -> PersonalInfo {
    let field = |key: &str| raw.and_then(|v| v.get(key));
    PersonalInfo {
        name: text_or(field("name"), DEFAULT_NAME),
        email: text_or(field("email"), DEFAULT_EMAIL),
        phone: text_or(field("phone"), DEFAULT_PHONE),
        location: text_or(field("location"), DEFAULT_LOCATION),
        title: text_or(field("title"), DEFAULT_TITLE),
        website: text_or(field("website"), ""),
        linkedin: text_or(field("linkedin"), ""),
        github: text_or(field("github"), ""),
    }
}

fn work_experience(raw: &Value, id: String) -> WorkExperience {
    WorkExperience {
        id,
        company: text_or(raw.get("company"), DEFAULT_COMPANY),
        position: text_or(raw.get("position"), DEFAULT_POSITION),
        location: text_or(raw.get("location"), DEFAULT_ITEM_LOCATION),
        start_date: text_or_number(raw.get("startDate"), DEFAULT_EXPERIENCE_START),
        end_date: text_or_number(raw.get("endDate"), DEFAULT_EXPERIENCE_END),
        current: flag(raw.get("current")),
        description: match raw.get("description") {
            Some(v @ Value::Array(_)) => string_list(Some(v)),
            _ => vec![DEFAULT_DESCRIPTION.to_string()],
        },
        technologies: string_list(raw.get("technologies")),
    }
}

fn education(raw: &Value, id: String) -> Education {
    Education {
        id,
        institution: text_or(raw.get("institution"), DEFAULT_INSTITUTION),
        degree: text_or(raw.get("degree"), DEFAULT_DEGREE),
        field: text_or(raw.get("field"), DEFAULT_FIELD),
        location: text_or(raw.get("location"), DEFAULT_ITEM_LOCATION),
        start_date: text_or_number(raw.get("startDate"), DEFAULT_EDUCATION_START),
        end_date: text_or_number(raw.get("endDate"), DEFAULT_EDUCATION_END),
        gpa: text_or_number(raw.get("gpa"), ""),
        achievements: string_list(raw.get("achievements")),
    }
}

fn project(raw: &Value, id: String) -> Project {
    Project {
        id,
        name: text_or(raw.get("name"), DEFAULT_PROJECT_NAME),
        description: text_or(raw.get("description"), DEFAULT_PROJECT_DESCRIPTION),
        technologies: string_list(raw.get("technologies")),
        link: text_or(raw.get("link"), ""),
        github: text_or(raw.get("github"), ""),
        featured: flag(raw.get("featured")),
    }
}

/// Maps a section array through `build`, assigning section-unique ids.
fn items<T>(raw: Option<&Value>, prefix: &str, build: fn(&Value, String) -> T) -> Vec<T> {
    let Some(Value::Array(elements)) = raw else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    elements
        .iter()
        .enumerate()
        .map(|(index, element)| {
            let id = unique_id(element.get("id"), prefix, index, &mut seen);
            build(element, id)
        })
        .collect()
}

fn unique_id(raw: Option<&Value>, prefix: &str, index: usize, seen: &mut HashSet<String>) -> String {
    let mut id = scalar_text(raw)
        .filter(|id| !seen.contains(id))
        .unwrap_or_else(|| format!("{prefix}-{}", index + 1));

    let mut suffix = 2;
    while seen.contains(&id) {
        id = format!("{prefix}-{}-{suffix}", index + 1);
        suffix += 1;
    }
    seen.insert(id.clone());
    id
}

fn skill_groups(raw: Option<&Value>) -> Vec<SkillGroup> {
    let Some(Value::Array(elements)) = raw else {
        return Vec::new();
    };

    let mut groups: Vec<SkillGroup> = Vec::new();
    for element in elements {
        let category = text_or(element.get("category"), DEFAULT_SKILL_CATEGORY);
        let skills = string_list(element.get("skills"));

        let index = match groups.iter().position(|g| g.category == category) {
            Some(index) => index,
            None => {
                groups.push(SkillGroup {
                    category,
                    skills: Vec::new(),
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[index];
        for skill in skills {
            if !group.skills.contains(&skill) {
                group.skills.push(skill);
            }
        }
    }
    groups
}

fn confidence(raw: Option<&Value>) -> ConfidenceScores {
    let d = DEFAULT_CONFIDENCE;
    let score = |key: &str, default: f64| {
        raw.and_then(|v| v.get(key))
            .and_then(Value::as_f64)
            .filter(|s| s.is_finite() && (0.0..=1.0).contains(s))
            .unwrap_or(default)
    };
    ConfidenceScores {
        personal_info: score("personalInfo", d.personal_info),
        summary: score("summary", d.summary),
        experience: score("experience", d.experience),
        education: score("education", d.education),
        skills: score("skills", d.skills),
        projects: score("projects", d.projects),
        overall: score("overall", d.overall),
    }
}

fn text_or(raw: Option<&Value>, default: &str) -> String {
    match raw {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => default.to_string(),
    }
}

fn text_or_number(raw: Option<&Value>, default: &str) -> String {
    scalar_text(raw).unwrap_or_else(|| default.to_string())
}

fn scalar_text(raw: Option<&Value>) -> Option<String> {
    match raw {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn flag(raw: Option<&Value>) -> bool {
    raw.and_then(Value::as_bool).unwrap_or(false)
}

fn string_list(raw: Option<&Value>) -> Vec<String> {
    match raw {
        Some(Value::Array(elements)) => elements
            .iter()
            .filter_map(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}
