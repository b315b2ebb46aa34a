use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Indigo,
    Emerald,
    Rose,
    Amber,
    Sky,
    Violet,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Font {
    #[default]
    ModernSans,
    ClassicSerif,
    Minimal,
    Creative,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    #[default]
    Standard,
    Sidebar,
    Minimal,
    Creative,
}

/// Which portfolio sections the preview shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionVisibility {
    pub contact: bool,
    pub skills: bool,
    pub education: bool,
    pub experience: bool,
    pub projects: bool,
}

impl Default for SectionVisibility {
    fn default() -> Self {
        Self {
            contact: true,
            skills: true,
            education: true,
            experience: true,
            projects: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomizationOptions {
    pub theme: Theme,
    pub font: Font,
    pub layout: Layout,
    pub sections: SectionVisibility,
}

/// Partial update: absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomizationPatch {
    pub theme: Option<Theme>,
    pub font: Option<Font>,
    pub layout: Option<Layout>,
    #[serde(default)]
    pub sections: SectionVisibilityPatch,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SectionVisibilityPatch {
    pub contact: Option<bool>,
    pub skills: Option<bool>,
    pub education: Option<bool>,
    pub experience: Option<bool>,
    pub projects: Option<bool>,
}

impl CustomizationOptions {
    pub fn apply(&mut self, patch: CustomizationPatch) {
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        if let Some(font) = patch.font {
            self.font = font;
        }
        if let Some(layout) = patch.layout {
            self.layout = layout;
        }

        let s = patch.sections;
        let flags = [
            (s.contact, &mut self.sections.contact),
            (s.skills, &mut self.sections.skills),
            (s.education, &mut self.sections.education),
            (s.experience, &mut self.sections.experience),
            (s.projects, &mut self.sections.projects),
        ];
        for (update, flag) in flags {
            if let Some(v) = update {
                *flag = v;
            }
        }
    }
}
