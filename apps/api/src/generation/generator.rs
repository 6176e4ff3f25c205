//! Resume drafting: prompt the model, then check the JSON it returns
//! before handing it to the client.

use serde_json::Value;
use tracing::info;

use crate::generation::prompts::{
    content_system_prompt, content_user_prompt, sample_prompt, SAMPLE_SYSTEM,
};
use crate::llm_client::{LlmClient, LlmError};
use crate::models::resume::ResumeContent;

const REQUIRED_FIELDS: &[&str] = &[
    "fullName",
    "email",
    "summary",
    "experience",
    "education",
    "skills",
];
const EXPERIENCE_FIELDS: &[&str] = &["company", "position", "startDate", "description"];
const EDUCATION_FIELDS: &[&str] = &["institution", "degree", "startDate"];

/// Drafts full resume content from a free-form description.
pub async fn generate_content(llm: &LlmClient, prompt: &str) -> Result<ResumeContent, LlmError> {
    let raw: Value = llm
        .call_json(&content_user_prompt(prompt), &content_system_prompt())
        .await?;
    let content = validate_generated(raw)?;
    info!(
        "Generated resume content: {} experience, {} education, {} skills",
        content.experience.len(),
        content.education.len(),
        content.skills.len()
    );
    Ok(content)
}

/// Drafts sample content suited to a template.
pub async fn generate_sample(llm: &LlmClient, template: &str) -> Result<ResumeContent, LlmError> {
    let raw: Value = llm.call_json(&sample_prompt(template), SAMPLE_SYSTEM).await?;
    validate_generated(raw)
}

/// Checks required fields and entry shapes, then converts to `ResumeContent`.
pub fn validate_generated(raw: Value) -> Result<ResumeContent, LlmError> {
    let object = raw
        .as_object()
        .ok_or_else(|| invalid("expected a JSON object"))?;

    for field in REQUIRED_FIELDS {
        if !is_filled(object.get(*field)) {
            return Err(invalid(&format!("missing required field: {field}")));
        }
    }

    check_entries(object.get("experience"), "experience", EXPERIENCE_FIELDS)?;
    check_entries(object.get("education"), "education", EDUCATION_FIELDS)?;
    if !object.get("skills").is_some_and(Value::is_array) {
        return Err(invalid("skills must be an array"));
    }

    serde_json::from_value(raw).map_err(LlmError::Parse)
}

fn check_entries(value: Option<&Value>, section: &str, required: &[&str]) -> Result<(), LlmError> {
    let entries = value
        .and_then(Value::as_array)
        .ok_or_else(|| invalid(&format!("{section} must be an array")))?;
    for entry in entries {
        let missing = required.iter().find(|field| !is_filled(entry.get(**field)));
        if let Some(field) = missing {
            return Err(invalid(&format!(
                "each {section} item must have {}; missing {field}",
                required.join(", ")
            )));
        }
    }
    Ok(())
}

/// Present and not null, empty string, or `false`.
fn is_filled(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

fn invalid(reason: &str) -> LlmError {
    LlmError::InvalidContent(reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_payload() -> Value {
        json!({
            "fullName": "Ann Lee",
            "email": "ann@example.com",
            "summary": "Backend engineer",
            "experience": [{
                "company": "Acme",
                "position": "Engineer",
                "startDate": "01/2020",
                "endDate": "Present",
                "description": "Built things"
            }],
            "education": [{
                "institution": "State U",
                "degree": "BSc",
                "startDate": "09/2015"
            }],
            "skills": ["Rust", "SQL"]
        })
    }

    #[test]
    fn test_valid_payload_converts() {
        let content = validate_generated(valid_payload()).unwrap();
        assert_eq!(content.full_name, "Ann Lee");
        assert_eq!(content.experience[0].end_date.as_deref(), Some("Present"));
        assert_eq!(content.skills.len(), 2);
    }

    #[test]
    fn test_missing_summary_is_rejected() {
        let mut payload = valid_payload();
        payload.as_object_mut().unwrap().remove("summary");
        let err = validate_generated(payload).unwrap_err();
        assert!(err.to_string().contains("summary"));
    }

    #[test]
    fn test_empty_experience_list_is_accepted() {
        let mut payload = valid_payload();
        payload["experience"] = json!([]);
        assert!(validate_generated(payload).is_ok());
    }

    #[test]
    fn test_experience_item_missing_position() {
        let mut payload = valid_payload();
        payload["experience"][0]
            .as_object_mut()
            .unwrap()
            .remove("position");
        let err = validate_generated(payload).unwrap_err();
        assert!(matches!(err, LlmError::InvalidContent(ref m) if m.contains("position")));
    }

    #[test]
    fn test_education_must_be_array() {
        let mut payload = valid_payload();
        payload["education"] = json!("State U");
        let err = validate_generated(payload).unwrap_err();
        assert!(err.to_string().contains("education must be an array"));
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(validate_generated(json!(["not", "an", "object"])).is_err());
    }
}
