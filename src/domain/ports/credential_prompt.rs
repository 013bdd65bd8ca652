/// Interactive secret input
pub trait CredentialPrompt: Send + Sync {
    /// Ask for a secret without echoing it
    fn prompt_secret(&self, label: &str) -> std::io::Result<String>;
}
