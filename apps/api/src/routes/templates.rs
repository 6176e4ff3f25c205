//! Catalog of the resume templates the front end can render.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TemplateInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub preview: &'static str,
}

pub const TEMPLATES: &[TemplateInfo] = &[
    TemplateInfo {
        id: "modern",
        name: "Modern",
        description: "A clean, modern design with a focus on readability",
        preview: "/templates/modern-preview.png",
    },
    TemplateInfo {
        id: "classic",
        name: "Classic",
        description: "A traditional resume format that employers are familiar with",
        preview: "/templates/classic-preview.png",
    },
    TemplateInfo {
        id: "minimal",
        name: "Minimal",
        description: "A minimalist design that lets your content stand out",
        preview: "/templates/minimal-preview.png",
    },
];

/// Shown for template names the catalog does not know.
pub const FALLBACK_TEMPLATE: TemplateInfo = TemplateInfo {
    id: "default",
    name: "Default Template",
    description: "Standard resume template",
    preview: "/templates/modern-preview.png",
};

pub fn template_info(name: Option<&str>) -> TemplateInfo {
    name.and_then(|name| TEMPLATES.iter().find(|t| t.id == name))
        .copied()
        .unwrap_or(FALLBACK_TEMPLATE)
}

/// GET /templates
pub async fn handle_list_templates() -> Json<&'static [TemplateInfo]> {
    Json(TEMPLATES)
}
