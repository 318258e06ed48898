// Integration tests for the contact form state machine.

use zodiac_core::contact::*;

fn valid_form() -> ContactForm {
    ContactForm {
        name: "Ada".into(),
        email: "ada@example.com".into(),
        subject: "Launch".into(),
        message: "When is the next window?".into(),
    }
}

#[test]
fn successful_submission_runs_through_states_on_schedule() {
    let sub = SimulatedSubmitter {
        delay_ms: 1500.0,
        ..SimulatedSubmitter::default()
    };
    let mut form = FormController::new(sub).with_status_display(3000.0);
    form.submit(&valid_form(), 1000.0).unwrap();
    assert_eq!(form.state().key(), "submitting");
    assert_eq!(form.next_deadline(), Some(2500.0));

    assert!(!form.tick(2499.0));
    assert!(form.tick(2500.0));
    assert_eq!(form.state(), &FormState::Success { until_ms: 5500.0 });

    assert!(!form.tick(5000.0));
    assert!(form.tick(5500.0));
    assert_eq!(form.state(), &FormState::Idle);
    assert_eq!(form.next_deadline(), None);
}

#[test]
fn failing_submitter_shows_error_then_idle() {
    let sub = SimulatedSubmitter {
        delay_ms: 10.0,
        fail_with: Some("relay offline".into()),
        calls: 0,
    };
    let mut form = FormController::new(sub);
    form.submit(&valid_form(), 0.0).unwrap();
    form.tick(10.0);
    match form.state() {
        FormState::Error { reason, .. } => assert!(reason.contains("relay offline")),
        other => panic!("expected error, got {other:?}"),
    }
    form.tick(10.0 + 3000.0);
    assert_eq!(form.state(), &FormState::Idle);
}

#[test]
fn invalid_forms_never_reach_the_submitter() {
    let mut form = FormController::new(SimulatedSubmitter::default());
    let mut f = valid_form();
    f.email = "not-an-address".into();
    assert_eq!(
        form.submit(&f, 0.0),
        Err(FormError::InvalidEmail("not-an-address".into()))
    );
    let mut f = valid_form();
    f.message = "   ".into();
    assert_eq!(form.submit(&f, 0.0), Err(FormError::Missing("message")));
    assert_eq!(form.submitter().calls, 0);
    assert_eq!(form.state(), &FormState::Idle);
}

#[test]
fn second_submit_while_in_flight_is_ignored() {
    let mut form = FormController::new(SimulatedSubmitter::default());
    form.submit(&valid_form(), 0.0).unwrap();
    form.submit(&valid_form(), 100.0).unwrap();
    assert_eq!(form.submitter().calls, 1);
}

#[test]
fn email_validation_edge_cases() {
    let check = |email: &str| {
        ContactForm {
            email: email.into(),
            ..valid_form()
        }
        .validate()
    };
    assert!(check("a@b.co").is_ok());
    assert!(check("@b.co").is_err());
    assert!(check("a@b").is_err());
    assert!(check("a@.co").is_err());
    assert!(check("a@b@c.co").is_err());
    assert!(check("a@b.").is_err());
}

#[test]
fn simulated_submitter_reports_delay_and_outcome() {
    let mut sub = SimulatedSubmitter {
        delay_ms: 800.0,
        fail_with: Some("mailbox full".into()),
        ..SimulatedSubmitter::default()
    };
    let pending = sub.submit(&valid_form());
    assert_eq!(
        pending,
        PendingSubmission {
            settle_after_ms: 800.0,
            outcome: Err(SubmitError::Rejected("mailbox full".into())),
        }
    );
    assert_eq!(sub.calls, 1);
}
