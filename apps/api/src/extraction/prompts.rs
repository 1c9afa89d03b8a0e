pub const PROFILE_EXTRACT_SYSTEM: &str = "You are a resume parser. \
    Extract structured information from resumes and return valid JSON only.";

/// `{resume_text}` is replaced with the document text; `{no_guessing}` with the
/// shared grounding instruction.
pub const PROFILE_EXTRACT_PROMPT_TEMPLATE: &str = r#"Parse this resume and extract the following information as a single JSON object:
{
  "name": "full name",
  "email": "email address",
  "phone": "phone number",
  "location": "location/city",
  "linkedin": "linkedin url if present",
  "skills": ["skill1", "skill2"],
  "experience_years": 0,
  "education": ["degree1", "degree2"],
  "certifications": ["cert1", "cert2"],
  "summary": "brief professional summary"
}

`experience_years` is a number (total years of professional experience).

{no_guessing}

Resume text:
{resume_text}

Return ONLY the JSON object, no additional text."#;
