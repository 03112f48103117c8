//! Static questions served when the AI backend cannot generate any.

use crate::model::{Difficulty, JobRole, QuestionSpec, QuestionType, SessionCategory};

struct BankEntry {
    question: &'static str,
    question_type: QuestionType,
    difficulty: Difficulty,
    time_limit: u32,
    sample_answer: &'static str,
}

impl BankEntry {
    fn to_spec(&self) -> QuestionSpec {
        QuestionSpec {
            question: self.question.to_string(),
            question_type: self.question_type,
            difficulty: self.difficulty,
            time_limit: self.time_limit,
            sample_answer: self.sample_answer.to_string(),
        }
    }
}

const fn technical(
    question: &'static str,
    difficulty: Difficulty,
    time_limit: u32,
    sample_answer: &'static str,
) -> BankEntry {
    BankEntry {
        question,
        question_type: QuestionType::Technical,
        difficulty,
        time_limit,
        sample_answer,
    }
}

const fn behavioral(question: &'static str, sample_answer: &'static str) -> BankEntry {
    BankEntry {
        question,
        question_type: QuestionType::Behavioral,
        difficulty: Difficulty::Medium,
        time_limit: 240,
        sample_answer,
    }
}

const FRONTEND_TECHNICAL: &[BankEntry] = &[
    technical(
        "Explain the concept of virtual DOM in React and how it improves performance.",
        Difficulty::Medium,
        300,
        "Virtual DOM is a programming concept where a virtual representation of the UI is kept in memory...",
    ),
    technical(
        "What are the key differences between let, const, and var in JavaScript?",
        Difficulty::Easy,
        180,
        "let allows reassignment and has block scope, const is for constants with block scope...",
    ),
];

const FRONTEND_BEHAVIORAL: &[BankEntry] = &[behavioral(
    "Tell me about a time you had to work with a difficult team member.",
    "In my previous project, I worked with a team member who had different coding standards...",
)];

const BACKEND_TECHNICAL: &[BankEntry] = &[
    technical(
        "How would you design idempotent endpoints for a payment API?",
        Difficulty::Medium,
        300,
        "Clients send an idempotency key, the server stores the first result under that key...",
    ),
    technical(
        "Explain the trade-offs between database indexes and write throughput.",
        Difficulty::Medium,
        240,
        "Every index speeds up matching reads but must be updated on each insert and update...",
    ),
];

const BACKEND_BEHAVIORAL: &[BankEntry] = &[behavioral(
    "Describe an incident you handled in production and what you changed afterwards.",
    "A queue consumer stalled during a deploy; I rolled back, then added a readiness check...",
)];

const FULL_STACK_TECHNICAL: &[BankEntry] = &[technical(
    "Walk through what happens from typing a URL to the page becoming interactive.",
    Difficulty::Medium,
    300,
    "DNS resolution, TCP and TLS handshakes, the HTTP request, server rendering or an API call...",
)];

const DEVOPS_TECHNICAL: &[BankEntry] = &[technical(
    "How do you roll out a configuration change safely across a fleet?",
    Difficulty::Hard,
    300,
    "Stage the change behind a flag, deploy to a canary group, watch error rates, then widen...",
)];

const DATA_SCIENCE_TECHNICAL: &[BankEntry] = &[technical(
    "How do you detect and handle data leakage when training a model?",
    Difficulty::Medium,
    300,
    "Split by time or entity before feature engineering, audit features computed from the target...",
)];

const PRODUCT_BEHAVIORAL: &[BankEntry] = &[behavioral(
    "Tell me about a feature you decided not to build and how you communicated it.",
    "Usage data showed the request came from one account, so I proposed a workaround instead...",
)];

const DESIGNER_BEHAVIORAL: &[BankEntry] = &[behavioral(
    "Describe a time user research changed your original design direction.",
    "Interviews showed users never found the settings page, so we moved the controls inline...",
)];

const SOFTWARE_DSA: &[BankEntry] = &[
    technical(
        "Find the length of the longest substring without repeating characters.",
        Difficulty::Medium,
        600,
        "Use a sliding window with a map from character to last index, moving the left edge past repeats...",
    ),
    technical(
        "Explain when you would pick a hash map over a balanced tree.",
        Difficulty::Easy,
        180,
        "Hash maps give expected constant-time lookups; trees keep keys ordered and bound the worst case...",
    ),
];

const SOFTWARE_SYSTEM_DESIGN: &[BankEntry] = &[technical(
    "Design a URL shortener that handles millions of redirects per day.",
    Difficulty::Hard,
    900,
    "Generate short keys from a counter or hash, store them in a key-value store, cache hot keys...",
)];

fn entries(role: JobRole, category: SessionCategory) -> &'static [BankEntry] {
    use JobRole as R;
    use SessionCategory as C;

    match (role, category) {
        (R::FrontendDeveloper, C::Technical) => FRONTEND_TECHNICAL,
        (R::FrontendDeveloper, C::Behavioral) => FRONTEND_BEHAVIORAL,
        (R::BackendDeveloper, C::Technical) => BACKEND_TECHNICAL,
        (R::BackendDeveloper, C::Behavioral) => BACKEND_BEHAVIORAL,
        (R::FullStackDeveloper, C::Technical) => FULL_STACK_TECHNICAL,
        (R::DevOpsEngineer, C::Technical) => DEVOPS_TECHNICAL,
        (R::DataScientist, C::Technical) => DATA_SCIENCE_TECHNICAL,
        (R::ProductManager, C::Behavioral) => PRODUCT_BEHAVIORAL,
        (R::UiUxDesigner, C::Behavioral) => DESIGNER_BEHAVIORAL,
        (R::SoftwareEngineer, C::Dsa) => SOFTWARE_DSA,
        (R::SoftwareEngineer, C::SystemDesign) => SOFTWARE_SYSTEM_DESIGN,
        _ => &[],
    }
}

/// Up to `count` stored questions for the role and category.
///
/// Returns an empty list when nothing is stored for the pair.
#[must_use]
pub fn fallback_questions(
    role: JobRole,
    category: SessionCategory,
    count: usize,
) -> Vec<QuestionSpec> {
    entries(role, category)
        .iter()
        .take(count)
        .map(BankEntry::to_spec)
        .collect()
}
