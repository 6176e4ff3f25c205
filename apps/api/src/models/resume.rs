//! Resume sub-documents embedded in a user's `resumes` array.
//!
//! Two stored shapes exist: flat records, and older records that keep the
//! content under a nested `content` object. `Resume::from_stored` reads both;
//! every write goes out flat.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Template applied when a resume is created without one.
pub const DEFAULT_TEMPLATE: &str = "modern";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    pub company: String,
    pub position: String,
    pub start_date: String,
    /// Free-form; "Present" and similar mean the role is ongoing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub institution: String,
    pub degree: String,
    pub start_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The editable body of a resume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeContent {
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub summary: String,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resume {
    #[serde(alias = "_id", deserialize_with = "deserialize_identifier")]
    pub id: String,
    #[serde(default = "default_template")]
    pub template: String,
    #[serde(flatten)]
    pub content: ResumeContent,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Keys outside the typed model (e.g. a legacy `title`), carried through
    /// every write-back unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Older records: content nested one level down.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NestedResume {
    #[serde(alias = "_id", deserialize_with = "deserialize_identifier")]
    id: String,
    #[serde(default)]
    template: Option<String>,
    content: ResumeContent,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Body of a create request: content plus an optional template.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResume {
    #[serde(default)]
    pub template: Option<String>,
    #[serde(flatten)]
    pub content: ResumeContent,
}

/// Shallow patch: every key present in the body replaces the stored value,
/// absent keys are left alone. Optional fields accept `null` to clear them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumePatch {
    pub template: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    #[serde(deserialize_with = "present")]
    pub phone: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub location: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub photo_url: Option<Option<String>>,
    pub summary: Option<String>,
    pub experience: Option<Vec<Experience>>,
    pub education: Option<Vec<Education>>,
    pub skills: Option<Vec<String>>,
    #[serde(deserialize_with = "present")]
    pub interests: Option<Option<Vec<String>>>,
}

impl Resume {
    /// Builds a new record with a fresh identifier and both timestamps at `now`.
    pub fn create(draft: NewResume, now: DateTime<Utc>) -> Self {
        let template = draft
            .template
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(default_template);
        Self {
            id: Uuid::new_v4().simple().to_string(),
            template,
            content: draft.content,
            created_at: now,
            updated_at: now,
            extra: Map::new(),
        }
    }

    /// Reads one stored array entry, flattening the nested legacy shape.
    ///
    /// Nested records may keep their template either beside `content` or
    /// inside it; the outer key wins.
    pub fn from_stored(entry: &Value) -> Result<Self, serde_json::Error> {
        if entry.get("content").is_some_and(Value::is_object) {
            let inner_template = entry
                .pointer("/content/template")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .map(str::to_owned);
            let nested = NestedResume::deserialize(entry)?;
            return Ok(Self {
                id: nested.id,
                template: nested
                    .template
                    .filter(|t| !t.is_empty())
                    .or(inner_template)
                    .unwrap_or_else(default_template),
                content: nested.content,
                created_at: nested.created_at,
                updated_at: nested.updated_at,
                extra: nested.extra,
            });
        }
        Resume::deserialize(entry)
    }

    /// The canonical (flat) stored form.
    pub fn to_stored(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn apply(&mut self, patch: ResumePatch) {
        let content = &mut self.content;
        if let Some(template) = patch.template.filter(|t| !t.trim().is_empty()) {
            self.template = template;
        }
        if let Some(full_name) = patch.full_name {
            content.full_name = full_name;
        }
        if let Some(email) = patch.email {
            content.email = email;
        }
        if let Some(phone) = patch.phone {
            content.phone = phone;
        }
        if let Some(location) = patch.location {
            content.location = location;
        }
        if let Some(photo_url) = patch.photo_url {
            content.photo_url = photo_url;
        }
        if let Some(summary) = patch.summary {
            content.summary = summary;
        }
        if let Some(experience) = patch.experience {
            content.experience = experience;
        }
        if let Some(education) = patch.education {
            content.education = education;
        }
        if let Some(skills) = patch.skills {
            content.skills = skills;
        }
        if let Some(interests) = patch.interests {
            content.interests = interests;
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Identifier of a stored entry, read from `id` or the legacy `_id` key.
pub fn stored_identifier(entry: &Value) -> Option<String> {
    entry
        .get("id")
        .or_else(|| entry.get("_id"))
        .and_then(identifier_string)
}

/// String form of an identifier: plain strings, numbers, or `{"$oid": "…"}`.
pub fn identifier_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map.get("$oid").and_then(Value::as_str).map(str::to_owned),
        _ => None,
    }
}

fn deserialize_identifier<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    identifier_string(&value).ok_or_else(|| serde::de::Error::custom("unsupported identifier"))
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent key (`None`).
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn default_template() -> String {
    DEFAULT_TEMPLATE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_content() -> ResumeContent {
        ResumeContent {
            full_name: "Ann Lee".to_string(),
            email: "ann@example.com".to_string(),
            summary: "Backend engineer".to_string(),
            skills: vec!["Rust".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_create_defaults_template_to_modern() {
        let resume = Resume::create(
            NewResume {
                template: None,
                content: sample_content(),
            },
            Utc::now(),
        );
        assert_eq!(resume.template, "modern");
        assert_eq!(resume.created_at, resume.updated_at);
        assert_eq!(resume.id.len(), 32);
    }

    #[test]
    fn test_create_keeps_explicit_template() {
        let resume = Resume::create(
            NewResume {
                template: Some("classic".to_string()),
                content: sample_content(),
            },
            Utc::now(),
        );
        assert_eq!(resume.template, "classic");
    }

    #[test]
    fn test_stored_form_is_flat_camel_case() {
        let resume = Resume::create(NewResume::default(), Utc::now());
        let stored = resume.to_stored().unwrap();
        assert!(stored.get("fullName").is_some());
        assert!(stored.get("createdAt").is_some());
        assert!(stored.get("content").is_none());
        assert!(stored.get("phone").is_none());
    }

    #[test]
    fn test_from_stored_flattens_nested_content() {
        let entry = json!({
            "_id": "abc",
            "title": "My resume",
            "template": "classic",
            "content": { "fullName": "Ann Lee", "skills": ["Go"] },
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-02T00:00:00Z"
        });
        let resume = Resume::from_stored(&entry).unwrap();
        assert_eq!(resume.id, "abc");
        assert_eq!(resume.template, "classic");
        assert_eq!(resume.content.full_name, "Ann Lee");
        assert_eq!(resume.content.skills, vec!["Go".to_string()]);
    }

    #[test]
    fn test_from_stored_falls_back_to_template_inside_content() {
        let entry = json!({
            "_id": "legacy",
            "content": { "template": "classic", "fullName": "Old Shape" },
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        });
        assert_eq!(Resume::from_stored(&entry).unwrap().template, "classic");

        let mut outer_wins = entry.clone();
        outer_wins["template"] = json!("minimal");
        assert_eq!(Resume::from_stored(&outer_wins).unwrap().template, "minimal");
    }

    #[test]
    fn test_unknown_keys_survive_round_trip() {
        let entry = json!({
            "id": "abc",
            "title": "My resume",
            "fullName": "Ann Lee",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        });
        let resume = Resume::from_stored(&entry).unwrap();
        assert_eq!(resume.extra.get("title"), Some(&json!("My resume")));
        assert!(!resume.extra.contains_key("fullName"));
        assert!(!resume.extra.contains_key("id"));

        let stored = resume.to_stored().unwrap();
        assert_eq!(stored["title"], "My resume");
        assert_eq!(stored["fullName"], "Ann Lee");
    }

    #[test]
    fn test_nested_shape_keeps_outer_unknown_keys() {
        let entry = json!({
            "_id": "abc",
            "title": "My resume",
            "content": { "fullName": "Ann Lee" },
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        });
        let stored = Resume::from_stored(&entry).unwrap().to_stored().unwrap();
        assert_eq!(stored["title"], "My resume");
        assert!(stored.get("content").is_none());
        assert_eq!(stored["fullName"], "Ann Lee");
    }

    #[test]
    fn test_from_stored_reads_object_id_shape() {
        let entry = json!({
            "_id": { "$oid": "65f0c0ffee" },
            "fullName": "Ann Lee",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        });
        let resume = Resume::from_stored(&entry).unwrap();
        assert_eq!(resume.id, "65f0c0ffee");
        assert_eq!(resume.template, "modern");
    }

    #[test]
    fn test_from_stored_rejects_entry_without_id() {
        let entry = json!({ "fullName": "Nobody" });
        assert!(Resume::from_stored(&entry).is_err());
        assert_eq!(stored_identifier(&entry), None);
    }

    #[test]
    fn test_patch_overwrites_present_keys_only() {
        let mut resume = Resume::create(
            NewResume {
                template: None,
                content: ResumeContent {
                    phone: Some("555-0100".to_string()),
                    ..sample_content()
                },
            },
            Utc::now(),
        );
        let patch: ResumePatch =
            serde_json::from_value(json!({ "summary": "Staff engineer", "skills": [] })).unwrap();
        resume.apply(patch);

        assert_eq!(resume.content.summary, "Staff engineer");
        assert!(resume.content.skills.is_empty());
        assert_eq!(resume.content.full_name, "Ann Lee");
        assert_eq!(resume.content.phone.as_deref(), Some("555-0100"));
    }

    #[test]
    fn test_patch_null_clears_optional_field() {
        let mut resume = Resume::create(
            NewResume {
                template: None,
                content: ResumeContent {
                    location: Some("Berlin".to_string()),
                    ..sample_content()
                },
            },
            Utc::now(),
        );
        let patch: ResumePatch = serde_json::from_value(json!({ "location": null })).unwrap();
        resume.apply(patch);
        assert_eq!(resume.content.location, None);
    }

    #[test]
    fn test_patch_ignores_server_managed_keys() {
        let mut resume = Resume::create(NewResume::default(), Utc::now());
        let original_id = resume.id.clone();
        let patch: ResumePatch = serde_json::from_value(json!({
            "_id": "someone-else",
            "createdAt": "1999-01-01T00:00:00Z",
            "fullName": "B"
        }))
        .unwrap();
        resume.apply(patch);
        assert_eq!(resume.id, original_id);
        assert_eq!(resume.content.full_name, "B");
    }
}
