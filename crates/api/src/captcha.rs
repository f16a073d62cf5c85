use std::fmt;

mod dummy;
mod hcaptcha;

pub use dummy::DummyVerifier;
pub use hcaptcha::HcaptchaVerifier;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptchaProviderType {
    Hcaptcha,
    Dummy,
}

impl fmt::Display for CaptchaProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptchaProviderType::Hcaptcha => write!(f, "hcaptcha"),
            CaptchaProviderType::Dummy => write!(f, "dummy"),
        }
    }
}

/// Vendor verification behind a narrow seam so handlers can be tested with
/// a fake. A transport failure counts as a failed verification; the call
/// is bounded by the provider's own timeout.
#[async_trait::async_trait]
pub trait CaptchaVerifier {
    fn provider_type(&self) -> CaptchaProviderType;
    async fn verify(&self, response: &str) -> bool;
}

/// Pick the configured provider, falling back to the always-pass dummy
/// with a warning when no vendor secret is configured.
pub fn select_verifier() -> Box<dyn CaptchaVerifier + Send + Sync> {
    if let Some(provider) = HcaptchaVerifier::from_env() {
        tracing::info!("Using CAPTCHA provider: {}", provider.provider_type());
        return Box::new(provider);
    }
    tracing::warn!("HCAPTCHA_SECRET_KEY is not set; CAPTCHA checks will always pass!");
    Box::new(DummyVerifier)
}
