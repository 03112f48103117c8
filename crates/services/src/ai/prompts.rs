use interview_core::model::{Difficulty, JobRole, SessionCategory};

/// System message sent with every request.
pub const SYSTEM_INSTRUCTION: &str =
    "You are an expert interview coach and technical interviewer. Always respond with valid JSON.";

/// Prompt asking for `count` questions. `guidance` is the role catalogue's
/// category prompt, when one exists.
#[must_use]
pub fn question_prompt(
    role: JobRole,
    category: SessionCategory,
    difficulty: Difficulty,
    count: usize,
    guidance: Option<&str>,
) -> String {
    let mut prompt = format!(
        r#"Generate {count} interview questions for a {role} position.

Category: {category}
Difficulty: {difficulty}

Please provide questions in the following JSON format:
[
  {{
    "question": "The actual question text",
    "type": "technical|behavioral",
    "difficulty": "easy|medium|hard",
    "timeLimit": 300,
    "sampleAnswer": "A brief sample answer outline"
  }}
]

Requirements:
- Questions should be realistic and challenging
- Technical questions should test practical knowledge
- Behavioral questions should assess soft skills
- Time limits should be appropriate for question complexity
- Include a mix of problem-solving and conceptual questions
- Make questions specific to {role} role"#
    );
    if let Some(guidance) = guidance.map(str::trim).filter(|g| !g.is_empty()) {
        prompt.push_str("\n\nAdditional guidance for this category:\n");
        prompt.push_str(guidance);
    }
    prompt
}

/// Prompt asking for a scored evaluation of one answer.
#[must_use]
pub fn evaluation_prompt(
    question: &str,
    answer: &str,
    role: JobRole,
    category: SessionCategory,
) -> String {
    format!(
        r#"Evaluate the following interview answer:

Role: {role}
Category: {category}
Question: {question}
Answer: {answer}

Please provide evaluation in this JSON format:
{{
  "score": 85,
  "feedback": "Detailed feedback on the answer",
  "strengths": ["List of strengths"],
  "improvements": ["List of areas to improve"],
  "suggestedAnswer": "A model answer for comparison"
}}

Evaluation criteria:
- Technical accuracy
- Clarity and communication
- Problem-solving approach
- Relevance to the question
- Depth of knowledge"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_prompt_names_role_and_count() {
        let prompt = question_prompt(
            JobRole::BackendDeveloper,
            SessionCategory::SystemDesign,
            Difficulty::Hard,
            3,
            None,
        );
        assert!(prompt.starts_with("Generate 3 interview questions for a Backend Developer"));
        assert!(prompt.contains("Category: System Design"));
        assert!(prompt.contains("Difficulty: Hard"));
        assert!(!prompt.contains("Additional guidance"));
    }

    #[test]
    fn question_prompt_appends_role_guidance() {
        let prompt = question_prompt(
            JobRole::BackendDeveloper,
            SessionCategory::Technical,
            Difficulty::Medium,
            5,
            Some("Focus on HTTP semantics"),
        );
        assert!(prompt.ends_with("Additional guidance for this category:\nFocus on HTTP semantics"));
    }

    #[test]
    fn blank_guidance_is_dropped() {
        let prompt = question_prompt(
            JobRole::DataScientist,
            SessionCategory::Technical,
            Difficulty::Easy,
            1,
            Some("   "),
        );
        assert!(!prompt.contains("Additional guidance"));
    }

    #[test]
    fn evaluation_prompt_embeds_question_and_answer() {
        let prompt = evaluation_prompt(
            "What is a closure?",
            "A function with its environment.",
            JobRole::FrontendDeveloper,
            SessionCategory::Technical,
        );
        assert!(prompt.contains("Question: What is a closure?"));
        assert!(prompt.contains("Answer: A function with its environment."));
        assert!(prompt.contains("\"suggestedAnswer\""));
    }
}
