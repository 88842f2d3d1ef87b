//! Submission gateway: forwards a finished intake session to the
//! third-party form processor.
//!
//! One click, one POST. No retries, no backoff, no timeout. The outcome is
//! surfaced to the visitor as either a redirect to the thank-you page or a
//! blocking alert; on failure the session is left as it was so the visitor
//! can press submit again.

use async_trait::async_trait;
use reqwest::multipart::Form;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::SubmissionError;

use super::session::IntakeSession;

/// Message shown when the form processor rejects a submission.
pub const FAILURE_ALERT: &str = "Something went wrong. Please try again.";

/// Flat, ordered key/value payload sent to the form processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPayload {
    fields: Vec<(&'static str, String)>,
}

impl SubmissionPayload {
    /// Build the payload from a session sitting on `final-info`.
    ///
    /// Name, email and phone must be non-blank; otherwise nothing is sent.
    pub fn from_session(session: &IntakeSession) -> Result<Self, SubmissionError> {
        if !session.step().is_final() {
            return Err(SubmissionError::NotAtFinalStep(session.step().to_string()));
        }

        let f = session.fields();
        if let Some(missing) = f.missing_contact_fields().first().copied() {
            return Err(SubmissionError::MissingField(missing));
        }

        let study_options = serde_json::to_string(&f.study_options)
            .map_err(|e| SubmissionError::Transport(format!("encode studyOptions: {e}")))?;

        let fields = vec![
            ("subject", f.subject.clone()),
            ("topicDetails", f.topic_details.clone()),
            ("time", f.time_with_meridiem()),
            ("days", f.days.clone()),
            ("name", f.name.clone()),
            ("email", f.email.clone()),
            ("phone", f.phone.clone()),
            ("studySubjects", f.study_subjects.clone()),
            ("studyOptions", study_options),
            ("role", session.role().to_string()),
            (
                "level",
                session.level().map(|l| l.to_string()).unwrap_or_default(),
            ),
            ("canCall", if f.can_call { "Yes" } else { "No" }.to_string()),
        ];

        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[(&'static str, String)] {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Encode as multipart form data.
    pub fn to_multipart(&self) -> Form {
        self.fields
            .iter()
            .fold(Form::new(), |form, (key, value)| form.text(*key, value.clone()))
    }
}

/// Outbound transport for a finished payload.
#[async_trait]
pub trait FormTransport: Send + Sync {
    /// Post the payload once. `Ok(true)` for a 2xx response, `Ok(false)` for
    /// any other status, `Err` when the request itself failed.
    async fn post_form(&self, payload: &SubmissionPayload) -> Result<bool, SubmissionError>;
}

/// Multipart POST to the form processor with `Accept: application/json`.
pub struct HttpFormTransport {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpFormTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl FormTransport for HttpFormTransport {
    async fn post_form(&self, payload: &SubmissionPayload) -> Result<bool, SubmissionError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(payload.to_multipart())
            .send()
            .await
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(%status, body = %body, "Form processor rejected submission");
            return Ok(false);
        }
        Ok(true)
    }
}

/// Where the visitor sees the result of a submission.
pub trait UserSurface: Send + Sync {
    /// Navigate the browser to `location`.
    fn redirect(&self, location: &str);
    /// Show a blocking alert.
    fn alert(&self, message: &str);
}

/// What happened to a submission attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Redirect { location: String },
    Alert { message: String },
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Redirect { .. })
    }
}

/// Sends payloads through a [`FormTransport`] and reports the result on a
/// [`UserSurface`].
pub struct SubmissionGateway {
    transport: Box<dyn FormTransport>,
    thank_you_path: String,
}

impl SubmissionGateway {
    pub fn new(transport: Box<dyn FormTransport>, thank_you_path: impl Into<String>) -> Self {
        Self {
            transport,
            thank_you_path: thank_you_path.into(),
        }
    }

    /// Perform exactly one outbound submission.
    ///
    /// A request that fails before any response arrives is reported the same
    /// way as a non-success status.
    pub async fn submit(
        &self,
        payload: &SubmissionPayload,
        surface: &dyn UserSurface,
    ) -> SubmissionOutcome {
        let ok = match self.transport.post_form(payload).await {
            Ok(ok) => ok,
            Err(e) => {
                warn!("Submission transport failed: {}", e);
                false
            }
        };

        if ok {
            info!(
                role = payload.get("role").unwrap_or_default(),
                level = payload.get("level").unwrap_or_default(),
                "Intake submitted"
            );
            surface.redirect(&self.thank_you_path);
            SubmissionOutcome::Redirect {
                location: self.thank_you_path.clone(),
            }
        } else {
            surface.alert(FAILURE_ALERT);
            SubmissionOutcome::Alert {
                message: FAILURE_ALERT.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::intake::fields::{FieldUpdate, Meridiem, StudyOption};
    use crate::intake::state::{Activity, IntakeAction, Level, Role};

    struct StubTransport {
        result: Result<bool, String>,
        calls: AtomicUsize,
    }

    impl StubTransport {
        fn new(result: Result<bool, String>) -> Self {
            Self {
                result,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl FormTransport for StubTransport {
        async fn post_form(&self, _payload: &SubmissionPayload) -> Result<bool, SubmissionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone().map_err(SubmissionError::Transport)
        }
    }

    #[async_trait]
    impl FormTransport for std::sync::Arc<StubTransport> {
        async fn post_form(&self, payload: &SubmissionPayload) -> Result<bool, SubmissionError> {
            self.as_ref().post_form(payload).await
        }
    }

    #[derive(Default)]
    struct RecordingSurface {
        redirects: Mutex<Vec<String>>,
        alerts: Mutex<Vec<String>>,
    }

    impl UserSurface for RecordingSurface {
        fn redirect(&self, location: &str) {
            self.redirects.lock().unwrap().push(location.to_string());
        }
        fn alert(&self, message: &str) {
            self.alerts.lock().unwrap().push(message.to_string());
        }
    }

    fn finished_session() -> IntakeSession {
        let mut session = IntakeSession::new(Role::Student);
        for action in [
            IntakeAction::Start,
            IntakeAction::ChooseLevel {
                level: Level::College,
            },
            IntakeAction::ChooseActivity {
                activity: Activity::Study,
            },
            IntakeAction::Next,
            IntakeAction::Next,
        ] {
            session.apply(action).unwrap();
        }
        session.update_fields(FieldUpdate {
            subject: Some("Gen Chem".into()),
            topic_details: Some("Stoichiometry".into()),
            time: Some("4:00".into()),
            meridiem: Some(Meridiem::PM),
            days: Some("Mondays and Wednesdays".into()),
            name: Some("Jordan".into()),
            email: Some("jordan@example.com".into()),
            phone: Some("555-0100".into()),
            can_call: Some(true),
            study_subjects: Some("Math, Biology".into()),
            toggle: vec![StudyOption::Memory, StudyOption::Combo],
            ..Default::default()
        });
        session
    }

    #[test]
    fn payload_has_all_fields_in_order() {
        let payload = SubmissionPayload::from_session(&finished_session()).unwrap();
        let keys: Vec<&str> = payload.fields().iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec![
                "subject",
                "topicDetails",
                "time",
                "days",
                "name",
                "email",
                "phone",
                "studySubjects",
                "studyOptions",
                "role",
                "level",
                "canCall",
            ]
        );
        assert_eq!(payload.get("time"), Some("4:00 PM"));
        assert_eq!(payload.get("role"), Some("student"));
        assert_eq!(payload.get("level"), Some("College"));
        assert_eq!(payload.get("canCall"), Some("Yes"));
        assert_eq!(
            payload.get("studyOptions"),
            Some(r#"{"memory":true,"learner":false,"ai":false,"combo":true,"all":false}"#)
        );
    }

    #[test]
    fn payload_requires_contact_fields() {
        let mut session = finished_session();
        session.update_fields(FieldUpdate {
            phone: Some(String::new()),
            ..Default::default()
        });
        let err = SubmissionPayload::from_session(&session).unwrap_err();
        assert!(matches!(err, SubmissionError::MissingField("phone")));
    }

    #[test]
    fn payload_requires_final_step() {
        let session = IntakeSession::new(Role::Parent);
        let err = SubmissionPayload::from_session(&session).unwrap_err();
        assert!(matches!(err, SubmissionError::NotAtFinalStep(ref s) if s == "intro"));
    }

    #[tokio::test]
    async fn success_redirects_once_without_alert() {
        let transport = std::sync::Arc::new(StubTransport::new(Ok(true)));
        let gateway = SubmissionGateway::new(Box::new(transport.clone()), "/thank-you.html");
        let surface = RecordingSurface::default();
        let session = finished_session();
        let payload = SubmissionPayload::from_session(&session).unwrap();

        let outcome = gateway.submit(&payload, &surface).await;

        assert!(outcome.is_success());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
        assert_eq!(*surface.redirects.lock().unwrap(), vec!["/thank-you.html"]);
        assert!(surface.alerts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejection_alerts_once_and_keeps_fields() {
        let transport = std::sync::Arc::new(StubTransport::new(Ok(false)));
        let gateway = SubmissionGateway::new(Box::new(transport.clone()), "/thank-you.html");
        let surface = RecordingSurface::default();
        let session = finished_session();
        let before = session.fields().clone();
        let payload = SubmissionPayload::from_session(&session).unwrap();

        let outcome = gateway.submit(&payload, &surface).await;

        assert_eq!(
            outcome,
            SubmissionOutcome::Alert {
                message: FAILURE_ALERT.to_string()
            }
        );
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
        assert!(surface.redirects.lock().unwrap().is_empty());
        assert_eq!(*surface.alerts.lock().unwrap(), vec![FAILURE_ALERT]);
        assert_eq!(session.fields(), &before);
    }

    #[tokio::test]
    async fn transport_error_is_reported_as_alert() {
        let transport = StubTransport::new(Err("connection refused".into()));
        let gateway = SubmissionGateway::new(Box::new(transport), "/thank-you.html");
        let surface = RecordingSurface::default();
        let payload = SubmissionPayload::from_session(&finished_session()).unwrap();

        let outcome = gateway.submit(&payload, &surface).await;

        assert!(!outcome.is_success());
        assert_eq!(surface.alerts.lock().unwrap().len(), 1);
        assert!(surface.redirects.lock().unwrap().is_empty());
    }

    #[test]
    fn outcome_json_shape() {
        let json = serde_json::to_value(SubmissionOutcome::Redirect {
            location: "/thank-you.html".into(),
        })
        .unwrap();
        assert_eq!(json["outcome"], "redirect");
        assert_eq!(json["location"], "/thank-you.html");
    }
}
