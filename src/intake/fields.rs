//! Form field store for an intake session.
//!
//! A flat record of everything the visitor has typed or ticked. Fields
//! are independently settable; the only validation is the required
//! contact check performed at submission time.

use serde::{Deserialize, Serialize};

/// Half of the day for the preferred tutoring time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Meridiem {
    #[default]
    AM,
    PM,
}

impl std::fmt::Display for Meridiem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AM => write!(f, "AM"),
            Self::PM => write!(f, "PM"),
        }
    }
}

/// One of the study-strategy checkboxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyOption {
    /// Discover new memory techniques.
    Memory,
    /// Understand my personal learning style.
    Learner,
    /// Learn to create practice tests using AI tools.
    Ai,
    /// Combine study strategies into one personalized plan.
    Combo,
    All,
}

/// Study-strategy interests. Serialized in the order the form processor
/// expects: memory, learner, ai, combo, all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyOptions {
    pub memory: bool,
    pub learner: bool,
    pub ai: bool,
    pub combo: bool,
    pub all: bool,
}

impl StudyOptions {
    /// Flip a single flag.
    pub fn toggle(&mut self, option: StudyOption) {
        let flag = match option {
            StudyOption::Memory => &mut self.memory,
            StudyOption::Learner => &mut self.learner,
            StudyOption::Ai => &mut self.ai,
            StudyOption::Combo => &mut self.combo,
            StudyOption::All => &mut self.all,
        };
        *flag = !*flag;
    }

    pub fn is_set(&self, option: StudyOption) -> bool {
        match option {
            StudyOption::Memory => self.memory,
            StudyOption::Learner => self.learner,
            StudyOption::Ai => self.ai,
            StudyOption::Combo => self.combo,
            StudyOption::All => self.all,
        }
    }
}

/// Answers collected by the wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFields {
    pub subject: String,
    pub topic_details: String,
    pub time: String,
    pub meridiem: Meridiem,
    pub days: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub can_call: bool,
    pub study_subjects: String,
    pub study_options: StudyOptions,
}

/// Partial update of [`FormFields`]. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldUpdate {
    pub subject: Option<String>,
    pub topic_details: Option<String>,
    pub time: Option<String>,
    pub meridiem: Option<Meridiem>,
    pub days: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub can_call: Option<bool>,
    pub study_subjects: Option<String>,
    pub study_options: Option<StudyOptions>,
    /// Checkboxes to flip, applied after `study_options`.
    pub toggle: Vec<StudyOption>,
}

fn overwrite<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

impl FormFields {
    /// Apply a partial update.
    pub fn apply(&mut self, update: FieldUpdate) {
        overwrite(&mut self.subject, update.subject);
        overwrite(&mut self.topic_details, update.topic_details);
        overwrite(&mut self.time, update.time);
        overwrite(&mut self.meridiem, update.meridiem);
        overwrite(&mut self.days, update.days);
        overwrite(&mut self.name, update.name);
        overwrite(&mut self.email, update.email);
        overwrite(&mut self.phone, update.phone);
        overwrite(&mut self.can_call, update.can_call);
        overwrite(&mut self.study_subjects, update.study_subjects);
        overwrite(&mut self.study_options, update.study_options);
        for option in update.toggle {
            self.study_options.toggle(option);
        }
    }

    /// Preferred time as sent to the form processor, e.g. `"4:00 PM"`.
    pub fn time_with_meridiem(&self) -> String {
        format!("{} {}", self.time, self.meridiem)
    }

    /// Names of required contact fields that are still blank.
    pub fn missing_contact_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_only_touches_provided_fields() {
        let mut fields = FormFields {
            subject: "Biology".into(),
            days: "Mondays".into(),
            ..Default::default()
        };
        fields.apply(FieldUpdate {
            subject: Some("Calculus".into()),
            can_call: Some(true),
            ..Default::default()
        });
        assert_eq!(fields.subject, "Calculus");
        assert_eq!(fields.days, "Mondays");
        assert!(fields.can_call);
    }

    #[test]
    fn toggle_flips_flags() {
        let mut fields = FormFields::default();
        fields.apply(FieldUpdate {
            toggle: vec![StudyOption::Memory, StudyOption::Ai],
            ..Default::default()
        });
        assert!(fields.study_options.memory);
        assert!(fields.study_options.ai);
        assert!(!fields.study_options.learner);

        fields.apply(FieldUpdate {
            toggle: vec![StudyOption::Memory],
            ..Default::default()
        });
        assert!(!fields.study_options.is_set(StudyOption::Memory));
        assert!(fields.study_options.is_set(StudyOption::Ai));
    }

    #[test]
    fn time_joins_value_and_meridiem() {
        let mut fields = FormFields {
            time: "4:00".into(),
            ..Default::default()
        };
        assert_eq!(fields.time_with_meridiem(), "4:00 AM");
        fields.meridiem = Meridiem::PM;
        assert_eq!(fields.time_with_meridiem(), "4:00 PM");
    }

    #[test]
    fn missing_contact_fields_treats_whitespace_as_empty() {
        let fields = FormFields {
            name: "Sam".into(),
            email: "   ".into(),
            ..Default::default()
        };
        assert_eq!(fields.missing_contact_fields(), vec!["email", "phone"]);
    }

    #[test]
    fn field_update_deserializes_partial_json() {
        let update: FieldUpdate =
            serde_json::from_str(r#"{"subject": "Stats", "meridiem": "PM", "toggle": ["combo"]}"#)
                .unwrap();
        assert_eq!(update.subject.as_deref(), Some("Stats"));
        assert_eq!(update.meridiem, Some(Meridiem::PM));
        assert_eq!(update.toggle, vec![StudyOption::Combo]);
        assert!(update.name.is_none());
    }

    #[test]
    fn study_options_serialize_in_form_order() {
        let opts = StudyOptions {
            memory: true,
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&opts).unwrap(),
            r#"{"memory":true,"learner":false,"ai":false,"combo":false,"all":false}"#
        );
    }
}
