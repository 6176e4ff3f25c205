// All LLM prompt constants for the Generation module.

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

/// JSON shape the model must produce. Mirrors `ResumeContent`.
pub const RESUME_SCHEMA: &str = r#"{
  "fullName": "string (required)",
  "email": "string (required)",
  "phone": "string",
  "location": "string, city and state/country",
  "summary": "string (required), professional summary or objective statement",
  "experience": [
    {
      "company": "string (required)",
      "position": "string (required), job title",
      "startDate": "string (required), MM/YYYY",
      "endDate": "string, MM/YYYY or \"Present\"",
      "description": "string (required), responsibilities and achievements"
    }
  ],
  "education": [
    {
      "institution": "string (required)",
      "degree": "string (required)",
      "startDate": "string (required), MM/YYYY",
      "endDate": "string, MM/YYYY or \"Present\"",
      "description": "string"
    }
  ],
  "skills": ["string"],
  "interests": ["string"]
}"#;

/// System prompt for free-form resume drafting.
pub fn content_system_prompt() -> String {
    format!(
        "You are a professional resume writer. Your task is to generate a realistic and \
        professional resume based on the user's input.\n\n\
        The resume must be a JSON object with this shape:\n{RESUME_SCHEMA}\n\n\
        Make sure to:\n\
        1. Generate realistic and professional content\n\
        2. Include specific details and achievements\n\
        3. Use action verbs and quantifiable results in experience descriptions\n\
        4. Keep the content concise and relevant\n\
        5. Include every required field\n\n\
        {JSON_ONLY_SYSTEM}"
    )
}

/// User prompt wrapping the caller's description of themselves.
pub fn content_user_prompt(user_prompt: &str) -> String {
    format!(
        "Please generate a professional resume based on the following information:\n\n\
        {user_prompt}\n\n\
        Remember to follow the schema exactly and return only valid JSON."
    )
}

pub const SAMPLE_SYSTEM: &str =
    "You are a professional resume writer. Generate realistic and professional resume content.";

/// Prompt for sample content suited to a template.
pub fn sample_prompt(template: &str) -> String {
    format!(
        "Generate professional resume content for a {template} resume template. Include:\n\
        - Full name (a professional name)\n\
        - Email (a professional email)\n\
        - Phone (a formatted phone number)\n\
        - Summary (a compelling professional summary)\n\
        - Experience (2-3 professional experiences with company, position, dates, and descriptions)\n\
        - Education (2 educational entries with institution, degree, dates, and descriptions)\n\
        - Skills (10-15 relevant professional skills)\n\n\
        Return a JSON object with this shape:\n{RESUME_SCHEMA}\n\n\
        {JSON_ONLY_SYSTEM}"
    )
}
