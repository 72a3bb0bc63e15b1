mod orchestrator;
mod tokens;

pub use orchestrator::SignInOrchestrator;
pub use tokens::{
    issue_pending_token, issue_remember_token, pending_token_from_cookies,
    remember_token_from_cookies, verify_pending_token, verify_remember_token,
};
