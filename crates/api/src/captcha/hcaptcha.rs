use crate::captcha::{CaptchaProviderType, CaptchaVerifier};

const VERIFY_URL: &str = "https://api.hcaptcha.com/siteverify";

pub struct HcaptchaVerifier {
    secret_key: String,
}

impl HcaptchaVerifier {
    pub fn from_env() -> Option<Self> {
        let secret_key = std::env::var("HCAPTCHA_SECRET_KEY").ok()?;
        Some(Self { secret_key })
    }
}

#[async_trait::async_trait]
impl CaptchaVerifier for HcaptchaVerifier {
    fn provider_type(&self) -> CaptchaProviderType {
        CaptchaProviderType::Hcaptcha
    }

    async fn verify(&self, response: &str) -> bool {
        let result = reqwest::Client::new()
            .post(VERIFY_URL)
            .timeout(std::time::Duration::from_secs(5))
            .form(&[("secret", self.secret_key.as_str()), ("response", response)])
            .send()
            .await;

        let resp = match result {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!("hCaptcha verification request failed: {e}");
                return false;
            }
        };

        if !resp.status().is_success() {
            tracing::warn!("hCaptcha verification HTTP error: {}", resp.status());
            return false;
        }

        let json: serde_json::Value = match resp.json().await {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("hCaptcha verification returned invalid JSON: {e}");
                return false;
            }
        };

        json.get("success").and_then(|v| v.as_bool()).unwrap_or(false)
    }
}
