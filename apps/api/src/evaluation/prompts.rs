pub const EVALUATION_SYSTEM: &str = "You are an experienced recruitment assistant. \
    You judge a CV strictly against the explicit criteria of a job description, \
    fairly and based only on the two documents. \
    Answer with one JSON object and nothing else.";

/// User prompt. Placeholders: {job_description}, {cv_text}.
pub const EVALUATION_PROMPT_TEMPLATE: &str = r#"Evaluate the candidate CV below against the job description.

First check every explicit eligibility criterion in the job description (required skills,
experience, education, certifications). If ANY criterion is not met, answer exactly:
{"eligible": false, "candidate_name": "<name from CV>", "reason": "<the unmet criterion>"}

Otherwise answer:
{
  "eligible": true,
  "candidate_name": "<name>",
  "degree": "<highest degree or null>",
  "course": "<major or null>",
  "cgpa": "<CGPA or percentage as written, or null>",
  "ats_score": <integer 0-100>,
  "strengths": ["<strength>", "<strength>"],
  "weaknesses": ["<weakness>", "<weakness>"],
  "feedback": "<2-3 sentences for the recruiter>",
  "detailed_feedback": "<150-200 words covering fit, gaps and suggestions>"
}

strengths and weaknesses must contain exactly two entries each.

JOB DESCRIPTION:
{job_description}

CV:
{cv_text}
"#;

/// Fills the template in one pass; placeholder-like text inside either
/// document is copied through untouched.
pub fn build_evaluation_prompt(job_description: &str, cv_text: &str) -> String {
    let mut prompt = String::with_capacity(
        EVALUATION_PROMPT_TEMPLATE.len() + job_description.len() + cv_text.len(),
    );
    let mut rest = EVALUATION_PROMPT_TEMPLATE;
    while let Some(open) = rest.find('{') {
        prompt.push_str(&rest[..open]);
        let tail = &rest[open..];
        if let Some(after) = tail.strip_prefix("{job_description}") {
            prompt.push_str(job_description.trim());
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{cv_text}") {
            prompt.push_str(cv_text.trim());
            rest = after;
        } else {
            prompt.push('{');
            rest = &tail[1..];
        }
    }
    prompt.push_str(rest);
    prompt
}
