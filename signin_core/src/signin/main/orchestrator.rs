use std::sync::Arc;

use http::HeaderMap;
use tokio_util::sync::CancellationToken;

use crate::audit::{AuditHandle, AuthMethod, LoginAttempt, SignInOutcome};
use crate::ceremony::{
    AllowCredential, AssertionOptions, AssertionResponse, CeremonyBridge, DecodedAssertion,
    decode_assertion,
};
use crate::signin::config::{
    EXTERNAL_LOGIN_COOKIE, REMEMBER_CLIENT_COOKIE, SIGNIN_RP_ID, TWO_FACTOR_PENDING_COOKIE,
};
use crate::signin::errors::SignInError;
use crate::signin::store::{AssertionVerdict, CredentialStore, PasswordVerdict, StoredCredential};
use crate::signin::types::{
    ClientInfo, ElevatedSession, PasskeySignIn, PasswordSignIn, SecondFactor, SecondFactorSignIn,
};
use crate::utils::{gen_random_string, header_clear_cookie, header_set_cookie};

use super::tokens::{
    issue_pending_token, issue_remember_token, remember_cookie_max_age, verify_pending_token,
    verify_remember_token,
};

use crate::ceremony::CEREMONY_CLIENT_TIMEOUT;

/// Drives authentication across one primary factor and, conditionally, one
/// secondary factor.
///
/// The orchestrator holds no per-flow state: concurrent sign-ins share only
/// the audit queue handle, and the "awaiting second factor" state travels in
/// a signed token. Construction wires in the three collaborators: the
/// external credential store, the ceremony bridge, and the audit pipeline
/// handle.
pub struct SignInOrchestrator {
    store: Arc<dyn CredentialStore>,
    bridge: Arc<CeremonyBridge>,
    audit: AuditHandle,
}

impl SignInOrchestrator {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        bridge: Arc<CeremonyBridge>,
        audit: AuditHandle,
    ) -> Self {
        Self {
            store,
            bridge,
            audit,
        }
    }

    /// Verify a password as the primary factor.
    ///
    /// On success with two-factor enabled (and no valid remember-client
    /// token) this issues a pending-two-factor token and reports
    /// `TwoFactorRequired`; on success without that requirement it elevates
    /// the session directly. Lockout bookkeeping is the store's job. Emits
    /// exactly one password-tagged login attempt.
    pub async fn verify_password(
        &self,
        user_id: &str,
        password: &str,
        persistent: bool,
        remember_token: Option<&str>,
        client: &ClientInfo,
    ) -> Result<PasswordSignIn, SignInError> {
        let verdict = self.store.verify_password(user_id, password).await?;

        let result = match verdict {
            PasswordVerdict::LockedOut => PasswordSignIn {
                outcome: SignInOutcome::LockedOut,
                pending_token: None,
                session: None,
            },
            PasswordVerdict::NotAllowed => PasswordSignIn {
                outcome: SignInOutcome::NotAllowed,
                pending_token: None,
                session: None,
            },
            PasswordVerdict::Invalid => PasswordSignIn {
                outcome: SignInOutcome::Failed,
                pending_token: None,
                session: None,
            },
            PasswordVerdict::Verified => {
                let two_factor = self.store.get_two_factor_enabled(user_id).await?;
                let remembered = match remember_token {
                    Some(token) => verify_remember_token(token, user_id)?,
                    None => false,
                };

                if two_factor && !remembered {
                    let pending_token = issue_pending_token(user_id, None)?;
                    tracing::debug!("Second factor required for {}", user_id);
                    PasswordSignIn {
                        outcome: SignInOutcome::TwoFactorRequired,
                        pending_token: Some(pending_token),
                        session: None,
                    }
                } else {
                    self.store.reset_lockout(user_id).await?;
                    let session = self.elevate(
                        user_id,
                        AuthMethod::Password,
                        if remembered { vec!["mfa".to_string()] } else { vec![] },
                        None,
                        persistent,
                        false,
                    )?;
                    PasswordSignIn {
                        outcome: SignInOutcome::Succeeded,
                        pending_token: None,
                        session: Some(session),
                    }
                }
            }
        };

        self.record_attempt(
            Some(user_id),
            AuthMethod::Password,
            result.outcome,
            client,
        );
        Ok(result)
    }

    /// Verify a passkey assertion as a combined primary-plus-secondary
    /// factor.
    ///
    /// The raw response comes from a `Get` ceremony run by the caller
    /// through the bridge. Succeeds only when the credential resolves to a
    /// user, the user has passkey sign-in enabled, and the credential itself
    /// is passkey-capable; a cryptographically valid assertion with
    /// disallowing flags resolves to `Failed`, never `NotAllowed`.
    pub async fn verify_passkey_assertion(
        &self,
        response: &AssertionResponse,
        persistent: bool,
        client: &ClientInfo,
    ) -> Result<PasskeySignIn, SignInError> {
        let decoded = match decode_assertion(response) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::debug!("Malformed passkey assertion response: {}", e);
                let result = PasskeySignIn {
                    outcome: SignInOutcome::Failed,
                    user_id: None,
                    session: None,
                };
                self.record_attempt(None, AuthMethod::Passkey, result.outcome, client);
                return Ok(result);
            }
        };

        let Some(credential) = self
            .store
            .find_credential_by_id(&decoded.credential_id)
            .await?
        else {
            let result = PasskeySignIn {
                outcome: SignInOutcome::Failed,
                user_id: None,
                session: None,
            };
            self.record_attempt(None, AuthMethod::Passkey, result.outcome, client);
            return Ok(result);
        };

        let user_id = credential.user_id.clone();
        let outcome = self
            .passkey_outcome(&credential, &decoded)
            .await?;

        let session = if outcome == SignInOutcome::Succeeded {
            self.store.reset_lockout(&user_id).await?;
            Some(self.elevate(
                &user_id,
                AuthMethod::Passkey,
                vec!["mfa".to_string()],
                None,
                persistent,
                false,
            )?)
        } else {
            None
        };

        self.record_attempt(Some(&user_id), AuthMethod::Passkey, outcome, client);
        Ok(PasskeySignIn {
            outcome,
            user_id: Some(user_id),
            session,
        })
    }

    async fn passkey_outcome(
        &self,
        credential: &StoredCredential,
        decoded: &DecodedAssertion,
    ) -> Result<SignInOutcome, SignInError> {
        // Lockout wins over every other result for this call.
        if self.store.is_locked_out(&credential.user_id).await? {
            return Ok(SignInOutcome::LockedOut);
        }
        if !self.store.is_signin_allowed(&credential.user_id).await? {
            return Ok(SignInOutcome::NotAllowed);
        }

        let verdict = self
            .store
            .verify_assertion(
                &credential.credential_id,
                &decoded.signature,
                &decoded.client_data,
                &decoded.authenticator_data,
            )
            .await?;
        let new_counter = match verdict {
            AssertionVerdict::Verified { new_counter } => new_counter,
            AssertionVerdict::Invalid => return Ok(SignInOutcome::Failed),
        };

        // The assertion is valid, but the credential may still not be usable
        // as a passkey. That ambiguity reads as a plain failure.
        if !credential.is_passkey {
            tracing::debug!(
                "Credential {} is not passkey-capable",
                credential.credential_id
            );
            return Ok(SignInOutcome::Failed);
        }
        if !self
            .store
            .is_passkey_signin_enabled(&credential.user_id)
            .await?
        {
            tracing::debug!("Passkey sign-in disabled for {}", credential.user_id);
            return Ok(SignInOutcome::Failed);
        }

        self.store
            .update_signature_counter(&credential.credential_id, new_counter)
            .await?;
        Ok(SignInOutcome::Succeeded)
    }

    /// Verify a secondary factor against a pending-two-factor token.
    ///
    /// Fails closed when the token is missing, expired, or invalid: the user
    /// is never synthesized from any other source. On success the session is
    /// elevated with an `mfa` claim, the pending and external-login cookies
    /// are cleared, and a remember-client token is issued when asked for.
    pub async fn verify_second_factor(
        &self,
        pending_token: Option<&str>,
        factor: SecondFactor,
        persistent: bool,
        remember_client: bool,
        cancel: &CancellationToken,
        client: &ClientInfo,
    ) -> Result<SecondFactorSignIn, SignInError> {
        let method = factor.method();

        let claims = match pending_token.map(verify_pending_token) {
            Some(Ok(claims)) => claims,
            // Missing or bad token both read as a plain failure, so callers
            // cannot distinguish "didn't try" from "tried wrong".
            Some(Err(_)) | None => {
                tracing::debug!("Second factor attempted without a valid pending state");
                self.record_attempt(None, method, SignInOutcome::Failed, client);
                return Ok(SecondFactorSignIn {
                    outcome: SignInOutcome::Failed,
                    session: None,
                });
            }
        };
        let user_id = claims.sub.as_str();

        if self.store.is_locked_out(user_id).await? {
            self.record_attempt(Some(user_id), method, SignInOutcome::LockedOut, client);
            return Ok(SecondFactorSignIn {
                outcome: SignInOutcome::LockedOut,
                session: None,
            });
        }
        // The account may have been disabled since the primary factor
        // verified; a correct code must not elevate it.
        if !self.store.is_signin_allowed(user_id).await? {
            self.record_attempt(Some(user_id), method, SignInOutcome::NotAllowed, client);
            return Ok(SecondFactorSignIn {
                outcome: SignInOutcome::NotAllowed,
                session: None,
            });
        }

        let verified = match &factor {
            SecondFactor::Authenticator { code } => {
                self.store.verify_totp_code(user_id, code).await?
            }
            SecondFactor::Email { code } => self.store.verify_email_code(user_id, code).await?,
            SecondFactor::RecoveryCode { code } => {
                self.store
                    .verify_and_consume_recovery_code(user_id, code)
                    .await?
            }
            SecondFactor::SecurityKey => {
                match self.verify_security_key(user_id, cancel).await {
                    Ok(verified) => verified,
                    Err(e @ SignInError::Ceremony(_)) => {
                        // Ceremony failures are not credential failures; the
                        // caller needs the distinction to offer a retry. The
                        // attempt is still audited.
                        self.record_attempt(
                            Some(user_id),
                            method,
                            SignInOutcome::Failed,
                            client,
                        );
                        return Err(e);
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        let result = if verified {
            self.store.reset_lockout(user_id).await?;
            let session = self.elevate(
                user_id,
                method,
                vec!["mfa".to_string()],
                claims.provider.clone(),
                persistent,
                remember_client,
            )?;
            SecondFactorSignIn {
                outcome: SignInOutcome::Succeeded,
                session: Some(session),
            }
        } else {
            let now_locked = self.store.record_failed_attempt(user_id).await?;
            SecondFactorSignIn {
                outcome: if now_locked {
                    SignInOutcome::LockedOut
                } else {
                    SignInOutcome::Failed
                },
                session: None,
            }
        };

        self.record_attempt(Some(user_id), method, result.outcome, client);
        Ok(result)
    }

    /// Run a security-key assertion ceremony scoped to the pending user's
    /// non-passkey credentials and verify the result through the store.
    async fn verify_security_key(
        &self,
        user_id: &str,
        cancel: &CancellationToken,
    ) -> Result<bool, SignInError> {
        let credentials = self.store.find_credentials_by_user(user_id).await?;
        let allow_credentials: Vec<AllowCredential> = credentials
            .iter()
            .filter(|c| !c.is_passkey)
            .map(|c| AllowCredential {
                type_: "public-key".to_string(),
                id: c.credential_id.clone(),
                transports: c.transports.clone(),
            })
            .collect();
        if allow_credentials.is_empty() {
            tracing::debug!("No security-key credentials registered for {}", user_id);
            return Ok(false);
        }

        let options = AssertionOptions {
            challenge: gen_random_string(32)?,
            timeout: CEREMONY_CLIENT_TIMEOUT.saturating_mul(1000),
            rp_id: SIGNIN_RP_ID.to_string(),
            allow_credentials,
            user_verification: "preferred".to_string(),
        };

        let response = self.bridge.request_assertion(&options, cancel).await?;
        let decoded = match decode_assertion(&response) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::debug!("Malformed security-key response: {}", e);
                return Ok(false);
            }
        };

        // The asserted credential must belong to the pending user and must
        // not be a passkey; a passkey would bypass this second-factor check.
        let Some(credential) = self
            .store
            .find_credential_by_id(&decoded.credential_id)
            .await?
        else {
            return Ok(false);
        };
        if credential.user_id != user_id || credential.is_passkey {
            tracing::debug!(
                "Security-key assertion for foreign or passkey credential {}",
                credential.credential_id
            );
            return Ok(false);
        }

        match self
            .store
            .verify_assertion(
                &credential.credential_id,
                &decoded.signature,
                &decoded.client_data,
                &decoded.authenticator_data,
            )
            .await?
        {
            AssertionVerdict::Verified { new_counter } => {
                self.store
                    .update_signature_counter(&credential.credential_id, new_counter)
                    .await?;
                Ok(true)
            }
            AssertionVerdict::Invalid => Ok(false),
        }
    }

    /// Build the elevated-session decision and its response cookie mutations.
    fn elevate(
        &self,
        user_id: &str,
        method: AuthMethod,
        amr: Vec<String>,
        login_provider: Option<String>,
        persistent: bool,
        remember_client: bool,
    ) -> Result<ElevatedSession, SignInError> {
        let mut headers = HeaderMap::new();
        header_clear_cookie(&mut headers, &TWO_FACTOR_PENDING_COOKIE)?;
        header_clear_cookie(&mut headers, &EXTERNAL_LOGIN_COOKIE)?;
        if remember_client {
            let token = issue_remember_token(user_id)?;
            header_set_cookie(
                &mut headers,
                &REMEMBER_CLIENT_COOKIE,
                &token,
                remember_cookie_max_age(),
            )?;
        }

        tracing::debug!("Elevating session for {} via {:?}", user_id, method);
        Ok(ElevatedSession {
            user_id: user_id.to_string(),
            method,
            amr,
            login_provider,
            persistent,
            headers,
        })
    }

    /// Hand one audit fact to the pipeline. Fire-and-forget: the sign-in
    /// decision is already made when this runs.
    fn record_attempt(
        &self,
        user_id: Option<&str>,
        method: AuthMethod,
        outcome: SignInOutcome,
        client: &ClientInfo,
    ) {
        self.audit.enqueue(LoginAttempt::new(
            user_id.map(String::from),
            method,
            outcome,
            client.ip_address,
            client.user_agent.clone(),
        ));
    }
}
