use crate::common::{TestEnv, TestStore, assertion_response_for};
use signin_core::{
    AuthMethod, CompletionPayload, REMEMBER_CLIENT_COOKIE, SecondFactor, SignInOutcome,
};
use tokio_util::sync::CancellationToken;

fn remember_cookie_value(headers: &http::HeaderMap) -> Option<String> {
    let prefix = format!("{}=", *REMEMBER_CLIENT_COOKIE);
    headers
        .get_all(http::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|c| c.starts_with(&prefix))
        .and_then(|c| c.split(';').next())
        .and_then(|pair| pair.split_once('='))
        .map(|(_, value)| value.to_string())
}

/// The full two-step journey: password, then an authenticator code, with the
/// audit trail showing both steps in order.
#[tokio::test]
async fn test_two_factor_totp_journey() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = TestStore::new();
    store.add_user("bob", "hunter2", true);
    store.set_totp("bob", "424242");
    let env = TestEnv::new(store);
    let cancel = CancellationToken::new();

    // Step 1: password verifies but the flow stops for the second factor.
    let first = env
        .orchestrator
        .verify_password("bob", "hunter2", false, None, &env.client())
        .await?;
    assert_eq!(first.outcome, SignInOutcome::TwoFactorRequired);
    assert!(first.session.is_none());
    let pending = first.pending_token.expect("pending token should be issued");

    // Step 2: the authenticator code completes the sign-in.
    let second = env
        .orchestrator
        .verify_second_factor(
            Some(&pending),
            SecondFactor::Authenticator {
                code: "424242".to_string(),
            },
            true,
            false,
            &cancel,
            &env.client(),
        )
        .await?;
    assert_eq!(second.outcome, SignInOutcome::Succeeded);
    let session = second.session.expect("session should be elevated");
    assert_eq!(session.user_id, "bob");
    assert_eq!(session.method, AuthMethod::Authenticator);
    assert_eq!(session.amr, vec!["mfa".to_string()]);
    assert!(session.persistent);

    let trail = env.audit_trail().await;
    assert_eq!(trail.len(), 2);
    assert_eq!(trail[0].method, AuthMethod::Password);
    assert_eq!(trail[0].outcome, SignInOutcome::TwoFactorRequired);
    assert_eq!(trail[1].method, AuthMethod::Authenticator);
    assert_eq!(trail[1].outcome, SignInOutcome::Succeeded);
    assert!(trail[1].created_at >= trail[0].created_at);
    Ok(())
}

/// Completing the second factor with "remember this client" yields a token
/// that skips the second factor on the next password sign-in, for that user
/// only.
#[tokio::test]
async fn test_remember_client_journey() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = TestStore::new();
    store.add_user("bob", "hunter2", true);
    store.set_email_code("bob", "918273");
    let env = TestEnv::new(store);
    let cancel = CancellationToken::new();

    let first = env
        .orchestrator
        .verify_password("bob", "hunter2", false, None, &env.client())
        .await?;
    let pending = first.pending_token.expect("pending token should be issued");

    let second = env
        .orchestrator
        .verify_second_factor(
            Some(&pending),
            SecondFactor::Email {
                code: "918273".to_string(),
            },
            false,
            true,
            &cancel,
            &env.client(),
        )
        .await?;
    assert_eq!(second.outcome, SignInOutcome::Succeeded);
    let session = second.session.expect("session should be elevated");
    let remember =
        remember_cookie_value(&session.headers).expect("remember cookie should be set");

    // The remembered client goes straight through on the next sign-in.
    let again = env
        .orchestrator
        .verify_password("bob", "hunter2", false, Some(&remember), &env.client())
        .await?;
    assert_eq!(again.outcome, SignInOutcome::Succeeded);
    assert_eq!(
        again.session.expect("session should be elevated").amr,
        vec!["mfa".to_string()]
    );

    let trail = env.audit_trail().await;
    let outcomes: Vec<_> = trail.iter().map(|a| a.outcome).collect();
    assert_eq!(
        outcomes,
        vec![
            SignInOutcome::TwoFactorRequired,
            SignInOutcome::Succeeded,
            SignInOutcome::Succeeded,
        ]
    );
    Ok(())
}

/// Security-key journey: the second factor runs an assertion ceremony through
/// the bridge, with the test playing the client authenticator.
#[tokio::test]
async fn test_two_factor_security_key_journey() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = TestStore::new();
    store.add_user("bob", "hunter2", true);
    store.add_credential("bob", "bobs-yubikey", false);
    let env = TestEnv::new(store);
    let cancel = CancellationToken::new();

    let first = env
        .orchestrator
        .verify_password("bob", "hunter2", false, None, &env.client())
        .await?;
    let pending = first.pending_token.expect("pending token should be issued");

    let responder = {
        let channel = env.channel.clone();
        let bridge = env.bridge.clone();
        tokio::spawn(async move {
            let request = channel.next_request().await;
            assert_eq!(request.options["allowCredentials"].as_array().unwrap().len(), 1);
            bridge
                .complete(CompletionPayload::success(
                    request.handle,
                    assertion_response_for("bobs-yubikey"),
                ))
                .await;
        })
    };

    let second = env
        .orchestrator
        .verify_second_factor(
            Some(&pending),
            SecondFactor::SecurityKey,
            false,
            false,
            &cancel,
            &env.client(),
        )
        .await?;
    responder.await?;
    assert_eq!(second.outcome, SignInOutcome::Succeeded);

    let trail = env.audit_trail().await;
    assert_eq!(trail.len(), 2);
    assert_eq!(trail[1].method, AuthMethod::SecurityKey);
    assert_eq!(trail[1].outcome, SignInOutcome::Succeeded);
    Ok(())
}

/// Repeated wrong codes lock the account, and the lockout holds even for the
/// correct code afterward.
#[tokio::test]
async fn test_lockout_journey() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = TestStore::new();
    store.add_user("bob", "hunter2", true);
    store.set_totp("bob", "424242");
    let env = TestEnv::new(store);
    let cancel = CancellationToken::new();

    let first = env
        .orchestrator
        .verify_password("bob", "hunter2", false, None, &env.client())
        .await?;
    let pending = first.pending_token.expect("pending token should be issued");

    let mut outcomes = Vec::new();
    for _ in 0..3 {
        let result = env
            .orchestrator
            .verify_second_factor(
                Some(&pending),
                SecondFactor::Authenticator {
                    code: "000000".to_string(),
                },
                false,
                false,
                &cancel,
                &env.client(),
            )
            .await?;
        outcomes.push(result.outcome);
    }
    assert_eq!(
        outcomes,
        vec![
            SignInOutcome::Failed,
            SignInOutcome::Failed,
            SignInOutcome::LockedOut,
        ]
    );

    // Even the correct code no longer helps.
    let result = env
        .orchestrator
        .verify_second_factor(
            Some(&pending),
            SecondFactor::Authenticator {
                code: "424242".to_string(),
            },
            false,
            false,
            &cancel,
            &env.client(),
        )
        .await?;
    assert_eq!(result.outcome, SignInOutcome::LockedOut);
    assert!(result.session.is_none());
    Ok(())
}

/// A consumed recovery code cannot be replayed.
#[tokio::test]
async fn test_recovery_code_journey() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = TestStore::new();
    store.add_user("bob", "hunter2", true);
    store.set_recovery_codes("bob", &["rrrr-1111", "rrrr-2222"]);
    let env = TestEnv::new(store);
    let cancel = CancellationToken::new();

    let first = env
        .orchestrator
        .verify_password("bob", "hunter2", false, None, &env.client())
        .await?;
    let pending = first.pending_token.expect("pending token should be issued");

    let factor = SecondFactor::RecoveryCode {
        code: "rrrr-1111".to_string(),
    };
    let result = env
        .orchestrator
        .verify_second_factor(
            Some(&pending),
            factor.clone(),
            false,
            false,
            &cancel,
            &env.client(),
        )
        .await?;
    assert_eq!(result.outcome, SignInOutcome::Succeeded);

    let replay = env
        .orchestrator
        .verify_second_factor(Some(&pending), factor, false, false, &cancel, &env.client())
        .await?;
    assert_eq!(replay.outcome, SignInOutcome::Failed);
    Ok(())
}
