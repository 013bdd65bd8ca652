//! Credentials infrastructure
//!
//! Interactive secret input on the controlling terminal. Secrets are never
//! echoed, logged or stored.

use console::Term;

use crate::domain::ports::CredentialPrompt;

/// Prompts on stderr and reads a hidden line from the terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt;

impl CredentialPrompt for TerminalPrompt {
    fn prompt_secret(&self, label: &str) -> std::io::Result<String> {
        let term = Term::stderr();
        term.write_str(&format!("{label}: "))?;
        let secret = term.read_secure_line()?;
        Ok(secret)
    }
}

/// Returns a fixed secret; for non-interactive runs and tests
#[derive(Debug, Clone, Default)]
pub struct StaticPrompt {
    secret: String,
}

impl StaticPrompt {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl CredentialPrompt for StaticPrompt {
    fn prompt_secret(&self, _label: &str) -> std::io::Result<String> {
        Ok(self.secret.clone())
    }
}
