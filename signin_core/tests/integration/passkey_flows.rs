use crate::common::{TestEnv, TestStore, assertion_response_for};
use signin_core::{
    AssertionResponse, AuthMethod, CeremonyKind, CompletionPayload, SignInOutcome,
};
use tokio_util::sync::CancellationToken;

/// End-to-end passkey journey: the ceremony runs through the bridge with the
/// test playing the client, and the resulting assertion elevates the session
/// in a single step.
#[tokio::test]
async fn test_passkey_journey() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = TestStore::new();
    store.add_user("alice", "unused-password", true);
    store.add_credential("alice", "alices-passkey", true);
    store.enable_passkey_signin("alice");
    let env = TestEnv::new(store);
    let cancel = CancellationToken::new();

    let responder = {
        let channel = env.channel.clone();
        let bridge = env.bridge.clone();
        tokio::spawn(async move {
            let request = channel.next_request().await;
            assert_eq!(request.kind, CeremonyKind::Get);
            bridge
                .complete(CompletionPayload::success(
                    request.handle,
                    assertion_response_for("alices-passkey"),
                ))
                .await;
        })
    };

    let raw = env
        .bridge
        .request_ceremony(
            CeremonyKind::Get,
            serde_json::json!({"userVerification": "required"}),
            &cancel,
        )
        .await?;
    responder.await?;
    let response: AssertionResponse = serde_json::from_value(raw)?;

    let result = env
        .orchestrator
        .verify_passkey_assertion(&response, false, &env.client())
        .await?;
    assert_eq!(result.outcome, SignInOutcome::Succeeded);
    assert_eq!(result.user_id.as_deref(), Some("alice"));
    let session = result.session.expect("session should be elevated");
    assert_eq!(session.method, AuthMethod::Passkey);
    assert_eq!(session.amr, vec!["mfa".to_string()]);

    let trail = env.audit_trail().await;
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].method, AuthMethod::Passkey);
    assert_eq!(trail[0].outcome, SignInOutcome::Succeeded);
    Ok(())
}

/// A valid assertion over a credential that is not passkey-capable does not
/// sign the user in.
#[tokio::test]
async fn test_non_passkey_credential_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = TestStore::new();
    store.add_user("alice", "unused-password", true);
    store.add_credential("alice", "alices-yubikey", false);
    store.enable_passkey_signin("alice");
    let env = TestEnv::new(store);

    let response: AssertionResponse =
        serde_json::from_value(assertion_response_for("alices-yubikey"))?;
    let result = env
        .orchestrator
        .verify_passkey_assertion(&response, false, &env.client())
        .await?;
    assert_eq!(result.outcome, SignInOutcome::Failed);
    assert!(result.session.is_none());

    let trail = env.audit_trail().await;
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].outcome, SignInOutcome::Failed);
    Ok(())
}
