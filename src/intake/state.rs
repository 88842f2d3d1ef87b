//! Intake wizard steps and the navigation policy.
//!
//! The wizard branches on grade level (high school / college) and on the
//! kind of help wanted (test prep, subject mastery, study skills), then
//! joins again for scheduling and contact details:
//!
//! intro → select-level → {level}-options → {level}-{test|master|study}
//!       → time-selection → final-info

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::fields::FormFields;

/// Which entry point opened the wizard. Fixed for the life of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Parent,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Student => write!(f, "student"),
            Self::Parent => write!(f, "parent"),
        }
    }
}

/// Grade band chosen on `select-level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    #[serde(rename = "High School")]
    HighSchool,
    #[serde(rename = "College")]
    College,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HighSchool => write!(f, "High School"),
            Self::College => write!(f, "College"),
        }
    }
}

/// Kind of help picked on `{level}-options`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    /// Prepare for a test.
    Test,
    /// Master a subject.
    Master,
    /// Build stronger study skills.
    Study,
}

/// A screen of the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntakeStep {
    #[serde(rename = "intro")]
    Intro,
    #[serde(rename = "select-level")]
    SelectLevel,
    #[serde(rename = "highschool-options")]
    HighSchoolOptions,
    #[serde(rename = "highschool-test")]
    HighSchoolTest,
    #[serde(rename = "highschool-master")]
    HighSchoolMaster,
    #[serde(rename = "highschool-study")]
    HighSchoolStudy,
    #[serde(rename = "college-options")]
    CollegeOptions,
    #[serde(rename = "college-test")]
    CollegeTest,
    #[serde(rename = "college-master")]
    CollegeMaster,
    #[serde(rename = "college-study")]
    CollegeStudy,
    #[serde(rename = "time-selection")]
    TimeSelection,
    #[serde(rename = "final-info")]
    FinalInfo,
}

/// Catalogue order. Drives the progress bar for both student and parent
/// sessions.
pub static INTAKE_CATALOGUE: &[IntakeStep] = &[
    IntakeStep::Intro,
    IntakeStep::SelectLevel,
    IntakeStep::HighSchoolOptions,
    IntakeStep::HighSchoolTest,
    IntakeStep::HighSchoolMaster,
    IntakeStep::HighSchoolStudy,
    IntakeStep::CollegeOptions,
    IntakeStep::CollegeTest,
    IntakeStep::CollegeMaster,
    IntakeStep::CollegeStudy,
    IntakeStep::TimeSelection,
    IntakeStep::FinalInfo,
];

impl IntakeStep {
    /// Wire identifier, e.g. `"highschool-options"`.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Intro => "intro",
            Self::SelectLevel => "select-level",
            Self::HighSchoolOptions => "highschool-options",
            Self::HighSchoolTest => "highschool-test",
            Self::HighSchoolMaster => "highschool-master",
            Self::HighSchoolStudy => "highschool-study",
            Self::CollegeOptions => "college-options",
            Self::CollegeTest => "college-test",
            Self::CollegeMaster => "college-master",
            Self::CollegeStudy => "college-study",
            Self::TimeSelection => "time-selection",
            Self::FinalInfo => "final-info",
        }
    }

    /// The `{level}-options` step.
    pub fn options(level: Level) -> Self {
        match level {
            Level::HighSchool => Self::HighSchoolOptions,
            Level::College => Self::CollegeOptions,
        }
    }

    /// The `{level}-{activity}` step.
    pub fn activity(level: Level, activity: Activity) -> Self {
        match (level, activity) {
            (Level::HighSchool, Activity::Test) => Self::HighSchoolTest,
            (Level::HighSchool, Activity::Master) => Self::HighSchoolMaster,
            (Level::HighSchool, Activity::Study) => Self::HighSchoolStudy,
            (Level::College, Activity::Test) => Self::CollegeTest,
            (Level::College, Activity::Master) => Self::CollegeMaster,
            (Level::College, Activity::Study) => Self::CollegeStudy,
        }
    }

    /// Level tag carried by the step identifier, if any.
    pub fn level(&self) -> Option<Level> {
        match self {
            Self::HighSchoolOptions
            | Self::HighSchoolTest
            | Self::HighSchoolMaster
            | Self::HighSchoolStudy => Some(Level::HighSchool),
            Self::CollegeOptions | Self::CollegeTest | Self::CollegeMaster | Self::CollegeStudy => {
                Some(Level::College)
            }
            _ => None,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, Self::FinalInfo)
    }
}

impl std::fmt::Display for IntakeStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// A discrete user action on the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum IntakeAction {
    /// "Let's get started" on the intro screen.
    Start,
    ChooseLevel { level: Level },
    ChooseActivity { activity: Activity },
    Next,
    Back,
}

impl std::fmt::Display for IntakeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::ChooseLevel { level } => write!(f, "choose_level({level})"),
            Self::ChooseActivity { activity } => write!(f, "choose_activity({activity:?})"),
            Self::Next => write!(f, "next"),
            Self::Back => write!(f, "back"),
        }
    }
}

static COLLEGE_SUBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)chem|bio|math|calc|stat|phys|org").expect("college subject pattern is valid")
});

/// Guess the grade band from free-text subject.
///
/// Used only for back-navigation out of `time-selection`. Any subject that
/// misses the keyword list is treated as high school, whatever level the
/// session actually picked. Returns `None` for an empty subject.
pub fn guess_level_from_subject(subject: &str) -> Option<Level> {
    if subject.is_empty() {
        return None;
    }
    if COLLEGE_SUBJECT.is_match(subject) {
        Some(Level::College)
    } else {
        Some(Level::HighSchool)
    }
}

/// Transition table: where `action` on `step` leads, given the answers so
/// far. `None` means the action is not offered on that screen.
pub fn navigate(step: IntakeStep, action: IntakeAction, fields: &FormFields) -> Option<IntakeStep> {
    use IntakeAction as A;
    use IntakeStep as S;

    match (step, action) {
        (S::Intro, A::Start | A::Next) => Some(S::SelectLevel),

        (S::SelectLevel, A::ChooseLevel { level }) => Some(S::options(level)),
        (S::SelectLevel, A::Back) => Some(S::Intro),

        (S::HighSchoolOptions | S::CollegeOptions, A::ChooseActivity { activity }) => {
            step.level().map(|level| S::activity(level, activity))
        }
        (S::HighSchoolOptions | S::CollegeOptions, A::Back) => Some(S::SelectLevel),

        (
            S::HighSchoolTest
            | S::HighSchoolMaster
            | S::HighSchoolStudy
            | S::CollegeTest
            | S::CollegeMaster
            | S::CollegeStudy,
            A::Next,
        ) => Some(S::TimeSelection),
        (
            S::HighSchoolTest
            | S::HighSchoolMaster
            | S::HighSchoolStudy
            | S::CollegeTest
            | S::CollegeMaster
            | S::CollegeStudy,
            A::Back,
        ) => step.level().map(S::options),

        (S::TimeSelection, A::Next) => Some(S::FinalInfo),
        (S::TimeSelection, A::Back) => Some(match guess_level_from_subject(&fields.subject) {
            Some(level) => S::activity(level, Activity::Master),
            None => S::SelectLevel,
        }),

        (S::FinalInfo, A::Back) => Some(S::TimeSelection),

        _ => None,
    }
}
