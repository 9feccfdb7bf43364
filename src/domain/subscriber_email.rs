#[derive(Debug, Clone)]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    // Any non-empty address is accepted; the unique index is the only gatekeeper
    pub fn parse(email: Option<String>) -> Result<Self, String> {
        match email {
            Some(email) if !email.is_empty() => Ok(Self(email)),
            _ => Err("Email is required".into()),
        }
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriberEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
