// Intake LLM prompt templates: résumé profile extraction and candidate scoring.

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

pub const PROFILE_PARSE_SYSTEM: &str = "\
You are an expert CV parser. Extract structured information from resumes accurately. \
Never guess contact details that are not present in the text.";

/// Profile extraction prompt. Replace `{resume_text}` before sending.
pub const PROFILE_PARSE_PROMPT: &str = r#"Extract the following information from this CV/resume text and return it as a JSON object:
- name (string): Full name of the candidate
- email (string): Email address
- phone (string): Phone number
- linkedin (string): LinkedIn profile URL (if available)
- skills (array of strings): List of technical and professional skills
- experience_years (number): Total years of work experience
- education (string): Highest education degree and institution

CV TEXT:
{resume_text}

Return ONLY a valid JSON object with exactly the fields above.
If a field is not found, use null for strings/numbers or an empty array for skills."#;

pub const SCORING_SYSTEM: &str = "\
You are an expert recruiter who scores candidates objectively based on job requirements.";

/// Builds the full system prompt for a call, appending the JSON-only rule.
pub fn json_system(system: &str) -> String {
    format!("{system} {JSON_ONLY_SYSTEM}")
}

/// Scoring prompt with the fixed rubric. The model computes `overall_score`.
pub fn scoring_prompt(candidate_summary: &str, job_description: &str, required_skills: &str) -> String {
    format!(
        r#"Score this candidate against the job requirements.

{candidate_summary}

JOB DESCRIPTION:
{job_description}

REQUIRED SKILLS:
{required_skills}

Provide scores (0-100) for the following criteria:
1. skill_fit: How well the candidate's skills match the required skills
2. experience_fit: How well the candidate's experience level matches the job requirements
3. education_fit: How well the candidate's education matches the job requirements
4. keyword_match: How well the candidate's profile matches keywords in the job description

Also compute overall_score yourself as the weighted average:
skill_fit 40%, experience_fit 30%, education_fit 15%, keyword_match 15%.

Return ONLY a JSON object with exactly these five numeric fields, for example:
{{
  "skill_fit": 85.0,
  "experience_fit": 75.0,
  "education_fit": 90.0,
  "keyword_match": 80.0,
  "overall_score": 82.0
}}"#
    )
}
