//! The six readiness-quiz questions, their option weights, and the result
//! bands.

use serde::{Deserialize, Serialize};

/// Identifier of a quiz question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionId {
    Q1,
    Q2,
    Q3,
    Q4,
    Q5,
    Q6,
}

/// Question order. Also the quiz step catalogue.
pub static QUESTION_ORDER: &[QuestionId] = &[
    QuestionId::Q1,
    QuestionId::Q2,
    QuestionId::Q3,
    QuestionId::Q4,
    QuestionId::Q5,
    QuestionId::Q6,
];

impl QuestionId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Q1 => "q1",
            Self::Q2 => "q2",
            Self::Q3 => "q3",
            Self::Q4 => "q4",
            Self::Q5 => "q5",
            Self::Q6 => "q6",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        QUESTION_ORDER.iter().copied().find(|q| q.as_str() == s)
    }

    pub fn question(&self) -> &'static Question {
        &QUESTIONS[*self as usize]
    }
}

impl std::fmt::Display for QuestionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One selectable answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizOption {
    pub value: &'static str,
    pub label: &'static str,
    #[serde(skip)]
    pub weight: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: &'static str,
    pub options: [QuizOption; 3],
}

impl Question {
    pub fn option(&self, value: &str) -> Option<&QuizOption> {
        self.options.iter().find(|o| o.value == value)
    }
}

const fn opt(value: &'static str, label: &'static str, weight: u32) -> QuizOption {
    QuizOption {
        value,
        label,
        weight,
    }
}

/// Question bank, indexed by `QuestionId as usize`.
pub static QUESTIONS: [Question; 6] = [
    Question {
        id: QuestionId::Q1,
        text: "How confident do you feel with your current math/science class?",
        options: [
            opt("high", "Very confident", 0),
            opt("medium", "Somewhat confident", 1),
            opt("low", "Not confident yet", 2),
        ],
    },
    Question {
        id: QuestionId::Q2,
        text: "How often do you complete homework on time?",
        options: [
            opt("always", "Always", 0),
            opt("usually", "Usually", 1),
            opt("rarely", "Sometimes/rarely", 2),
        ],
    },
    Question {
        id: QuestionId::Q3,
        text: "What best describes your study routine?",
        options: [
            opt("system", "I have a system and schedule", 0),
            opt("some", "I study but inconsistently", 1),
            opt("none", "I cram / not sure how to study", 2),
        ],
    },
    Question {
        id: QuestionId::Q4,
        text: "When you get stuck on a problem, what happens next?",
        options: [
            opt("strategy", "I try strategies and usually solve it", 0),
            opt("ask", "I ask a friend/teacher or look it up", 1),
            opt("stuck", "I get stuck and move on", 2),
        ],
    },
    Question {
        id: QuestionId::Q5,
        text: "Time until next test/major assignment?",
        options: [
            opt("soon", "This week", 2),
            opt("near", "Within 2–3 weeks", 1),
            opt("far", "A month or more", 0),
        ],
    },
    // Preference only; does not move the score.
    Question {
        id: QuestionId::Q6,
        text: "Biggest help you want from tutoring right now?",
        options: [
            opt("content", "Understanding content", 0),
            opt("practice", "Practice & problem-solving", 0),
            opt("skills", "Study/test strategies & planning", 0),
        ],
    },
];

/// Readiness band, ordered by increasing urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Band {
    #[serde(rename = "Explorer")]
    Explorer,
    #[serde(rename = "Momentum Builder")]
    MomentumBuilder,
    #[serde(rename = "Launch Support")]
    LaunchSupport,
}

impl Band {
    /// 0-3 Explorer, 4-7 Momentum Builder, 8+ Launch Support.
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=3 => Self::Explorer,
            4..=7 => Self::MomentumBuilder,
            _ => Self::LaunchSupport,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Explorer => "Explorer",
            Self::MomentumBuilder => "Momentum Builder",
            Self::LaunchSupport => "Launch Support",
        }
    }

    /// Recommended next step shown on the result card.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Explorer => {
                "You’re in good shape—let’s sharpen with targeted practice and a study blueprint."
            }
            Self::MomentumBuilder => {
                "You’ll benefit from consistent problem-solving reps + structured weekly goals."
            }
            Self::LaunchSupport => {
                "Let’s stabilize the foundation quickly and build confident test-day habits."
            }
        }
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
