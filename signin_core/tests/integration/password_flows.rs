use crate::common::{TEST_LATITUDE, TEST_LONGITUDE, TestEnv, TestStore};
use signin_core::{AuthMethod, SignInOutcome};

/// A user without two-factor enabled signs in with only a password and the
/// attempt lands in the audit trail, enriched with geolocation.
#[tokio::test]
async fn test_password_only_journey() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = TestStore::new();
    store.add_user("alice", "correct horse battery staple", false);
    let env = TestEnv::new(store);

    let result = env
        .orchestrator
        .verify_password(
            "alice",
            "correct horse battery staple",
            false,
            None,
            &env.client(),
        )
        .await?;
    assert_eq!(result.outcome, SignInOutcome::Succeeded);
    assert!(result.pending_token.is_none());
    let session = result.session.expect("session should be elevated");
    assert_eq!(session.user_id, "alice");
    assert_eq!(session.method, AuthMethod::Password);
    assert!(session.amr.is_empty());

    let trail = env.audit_trail().await;
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].user_id.as_deref(), Some("alice"));
    assert_eq!(trail[0].method, AuthMethod::Password);
    assert_eq!(trail[0].outcome, SignInOutcome::Succeeded);
    let point = trail[0].geolocation.expect("attempt should be enriched");
    assert_eq!(point.latitude, TEST_LATITUDE);
    assert_eq!(point.longitude, TEST_LONGITUDE);
    Ok(())
}

#[tokio::test]
async fn test_wrong_password_is_audited_as_failed() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = TestStore::new();
    store.add_user("alice", "correct horse battery staple", false);
    let env = TestEnv::new(store);

    let result = env
        .orchestrator
        .verify_password("alice", "tr0ub4dor&3", false, None, &env.client())
        .await?;
    assert_eq!(result.outcome, SignInOutcome::Failed);
    assert!(result.session.is_none());

    let trail = env.audit_trail().await;
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].outcome, SignInOutcome::Failed);
    Ok(())
}

#[tokio::test]
async fn test_unknown_user_fails_without_detail() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestEnv::new(TestStore::new());

    let result = env
        .orchestrator
        .verify_password("nobody", "whatever", false, None, &env.client())
        .await?;
    // Unknown account and wrong password are indistinguishable to the caller.
    assert_eq!(result.outcome, SignInOutcome::Failed);
    Ok(())
}
