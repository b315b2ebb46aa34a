use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateCategory {
    Executive,
    Creative,
    Technical,
    Academic,
    Startup,
}

/// Descriptor of a portfolio template. Rendering is done by the preview
/// consumer; the builder only stores which one was picked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: TemplateCategory,
    /// Thumbnail URL.
    pub preview: String,
    pub features: Vec<String>,
}

struct CatalogEntry {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    category: TemplateCategory,
    preview: &'static str,
    features: [&'static str; 4],
}

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        id: "executive",
        name: "Executive",
        description: "Professional template for senior executives and leaders",
        category: TemplateCategory::Executive,
        preview: "https://images.pexels.com/photos/6256/water-pier-wooden-jetty.jpg?auto=compress&cs=tinysrgb&w=400",
        features: [
            "Clean layout",
            "Professional styling",
            "Leadership focus",
            "Achievement highlights",
        ],
    },
    CatalogEntry {
        id: "creative",
        name: "Creative",
        description: "Vibrant template for designers and creative professionals",
        category: TemplateCategory::Creative,
        preview: "https://images.pexels.com/photos/1646953/pexels-photo-1646953.jpeg?auto=compress&cs=tinysrgb&w=400",
        features: [
            "Bold colors",
            "Portfolio showcase",
            "Visual storytelling",
            "Creative layouts",
        ],
    },
    CatalogEntry {
        id: "technical",
        name: "Technical",
        description: "Modern template for developers and engineers",
        category: TemplateCategory::Technical,
        preview: "https://images.pexels.com/photos/546819/pexels-photo-546819.jpeg?auto=compress&cs=tinysrgb&w=400",
        features: [
            "Code-focused",
            "Project highlights",
            "Technical skills",
            "GitHub integration",
        ],
    },
    CatalogEntry {
        id: "academic",
        name: "Academic",
        description: "Scholarly template for researchers and academics",
        category: TemplateCategory::Academic,
        preview: "https://images.pexels.com/photos/207662/pexels-photo-207662.jpeg?auto=compress&cs=tinysrgb&w=400",
        features: [
            "Research focus",
            "Publication lists",
            "Academic credentials",
            "Citation ready",
        ],
    },
    CatalogEntry {
        id: "startup",
        name: "Startup",
        description: "Dynamic template for entrepreneurs and startup founders",
        category: TemplateCategory::Startup,
        preview: "https://images.pexels.com/photos/3184360/pexels-photo-3184360.jpeg?auto=compress&cs=tinysrgb&w=400",
        features: [
            "Growth metrics",
            "Innovation focus",
            "Team leadership",
            "Vision statement",
        ],
    },
];

impl From<&CatalogEntry> for PortfolioTemplate {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            name: entry.name.to_string(),
            description: entry.description.to_string(),
            category: entry.category,
            preview: entry.preview.to_string(),
            features: entry.features.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// All built-in templates, in display order.
pub fn template_catalog() -> Vec<PortfolioTemplate> {
    CATALOG.iter().map(PortfolioTemplate::from).collect()
}

pub fn find_template(id: &str) -> Option<PortfolioTemplate> {
    CATALOG
        .iter()
        .find(|entry| entry.id == id)
        .map(PortfolioTemplate::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_one_template_per_category() {
        let catalog = template_catalog();
        assert_eq!(catalog.len(), 5);
        let ids: Vec<_> = catalog.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["executive", "creative", "technical", "academic", "startup"]
        );
    }

    #[test]
    fn test_find_template_known_id() {
        let t = find_template("technical").unwrap();
        assert_eq!(t.category, TemplateCategory::Technical);
        assert!(t.features.contains(&"GitHub integration".to_string()));
    }

    #[test]
    fn test_find_template_unknown_id() {
        assert!(find_template("brutalist").is_none());
    }

    #[test]
    fn test_category_serializes_lowercase() {
        let json = serde_json::to_string(&TemplateCategory::Academic).unwrap();
        assert_eq!(json, "\"academic\"");
    }
}
