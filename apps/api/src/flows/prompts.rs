// All LLM prompt templates for the interview flows.
// Placeholders are `{name}` and are filled with `fill_template`.

pub const ASSESS_ANSWER_PERSONA: &str = "You are an AI interview coach who grades \
    candidate answers fairly, specifically, and constructively.";

/// Replace: {role}, {question}, {user_answer}, {expected_answer_block}
pub const ASSESS_ANSWER_PROMPT_TEMPLATE: &str = r#"Your task is to assess a candidate's answer to an interview question.

Here is the role the candidate is interviewing for: {role}

Here is the interview question:
{question}

Here is the candidate's answer:
{user_answer}
{expected_answer_block}
Provide a score (0-100), strengths, and gaps based on the candidate's answer. Be specific and constructive.

Return a JSON object with this EXACT schema (no extra fields):
{
  "score": 72,
  "strengths": "A summary of the strengths of the answer.",
  "gaps": "A summary of the gaps or areas for improvement in the answer."
}"#;

/// Replace: {expected_answer}
pub const EXPECTED_ANSWER_BLOCK_TEMPLATE: &str = r#"
Here is the expected answer:
{expected_answer}
"#;

pub const LEARNING_PLAN_PERSONA: &str = "You are an expert career coach who builds \
    personalized, structured learning plans.";

/// Replace: {role_name}, {questions}, {weak_areas}
pub const LEARNING_PLAN_PROMPT_TEMPLATE: &str = r#"Your goal is to generate a personalized learning plan for the user based on their weak areas during a mock interview.

Role: {role_name}

Interview Questions:
{questions}

Weak Areas:
{weak_areas}

Based on the above information, generate a topic-wise learning plan to address the weak areas. The learning plan should be structured and easy to follow. Write the plan itself in markdown.

Return a JSON object with this EXACT schema:
{
  "learning_plan": "Markdown text with one level-3 heading per topic."
}"#;

pub const LEARNING_PATH_PERSONA: &str = "You are an expert career coach and learning \
    specialist who curates high-quality public learning resources.";

/// Replace: {role_name}, {company_name}, {questions}
pub const LEARNING_PATH_PROMPT_TEMPLATE: &str = r#"Your task is to create a structured learning path for a user preparing for an interview.

First, analyze the provided role, company, and sample questions to identify the top 5-7 most critical skills (technical and soft).

Then, for each identified skill, provide a brief one-sentence description and a list of 2-3 high-quality, publicly accessible online resources (articles, tutorials, official documentation) for learning that skill.

Role: {role_name}
Company: {company_name}
Sample Questions:
{questions}

Return a JSON object with this EXACT schema:
{
  "skills": [
    {
      "name": "Skill Name",
      "description": "A brief one-sentence description of the skill.",
      "resources": [
        {"title": "Resource Title 1", "url": "https://example.com/link1"},
        {"title": "Resource Title 2", "url": "https://example.com/link2"}
      ]
    }
  ]
}"#;

pub const STUDY_GUIDE_PERSONA: &str = "You are an expert learning and development coach \
    who writes concise study guides for job interviews.";

/// Replace: {skills}
pub const STUDY_GUIDE_PROMPT_TEMPLATE: &str = r#"Your goal is to generate a helpful study guide for a user trying to learn a set of skills for a job interview.

Skills to learn:
{skills}

For each skill, provide a brief description and a list of 2-3 high-quality, publicly accessible online resources (articles, tutorials, documentation) to learn about it. Keep the skills in the order given.

Return a JSON object with this EXACT schema:
{
  "skills": [
    {
      "name": "Skill Name",
      "description": "A brief one-sentence description of the skill.",
      "resources": [
        {"title": "Resource Title 1", "url": "https://example.com/link1"},
        {"title": "Resource Title 2", "url": "https://example.com/link2"}
      ]
    }
  ]
}"#;

pub const ROLE_SKILLS_PERSONA: &str = "You are an expert career coach and hiring manager.";

/// Replace: {role_name}, {company_name}
pub const ROLE_SKILLS_PROMPT_TEMPLATE: &str = r#"Based on the provided role and company, identify and list the top 10 most important technical and soft skills required.

Role: {role_name}
Company: {company_name}

Return only the list of skills as a JSON object with this EXACT schema:
{
  "skills": ["Skill 1", "Skill 2"]
}"#;

pub const MCQ_PERSONA: &str = "You are an expert question designer for technical interviews.";

/// Replace: {role}, {question}
pub const MCQ_PROMPT_TEMPLATE: &str = r#"Your task is to create a single, clear multiple-choice question (MCQ) based on the provided interview question and role.

Generate a relevant MCQ with 4-5 plausible options, one of which is definitively correct.
The original question might be open-ended; your job is to distill a specific concept from it and frame it as an MCQ.

Role: {role}
Original Question: {question}

Return a JSON object with this EXACT schema:
{
  "question": "The generated multiple-choice question.",
  "options": ["Option A", "Option B", "Option C", "Option D"],
  "correct_answer": "Option B"
}

HARD RULE: `correct_answer` MUST be copied character-for-character from `options`."#;
