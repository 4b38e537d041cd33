use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: String,
    pub supabase_jwt_secret: String,
    pub resend_api_key: Option<String>,
    pub resend_base_url: String,
    pub email_from: String,
    pub cron_secret: String,
    pub app_base_url: String,
    pub video_base_url: String,
    pub prescriptions_bucket: String,
    pub server_port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let supabase_url = env::var("SUPABASE_URL")
            .unwrap_or_else(|_| {
                warn!("SUPABASE_URL not set, using empty value");
                String::new()
            });

        let config = Self {
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_service_role_key: env::var("SUPABASE_SERVICE_ROLE_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_SERVICE_ROLE_KEY not set, reminder job disabled");
                    String::new()
                }),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            resend_api_key: env::var("RESEND_API_KEY")
                .ok()
                .filter(|key| !key.is_empty())
                .or_else(|| {
                    warn!("RESEND_API_KEY not set, emails will be logged instead of sent");
                    None
                }),
            resend_base_url: env::var("RESEND_BASE_URL")
                .unwrap_or_else(|_| "https://api.resend.com".to_string()),
            email_from: env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "HealthCare Telemed <onboarding@resend.dev>".to_string()),
            cron_secret: env::var("CRON_SECRET")
                .unwrap_or_else(|_| {
                    warn!("CRON_SECRET not set, reminder endpoint will reject every call");
                    String::new()
                }),
            app_base_url: env::var("APP_BASE_URL")
                .unwrap_or_else(|_| Self::derive_app_base_url(&supabase_url)),
            video_base_url: env::var("VIDEO_BASE_URL")
                .unwrap_or_else(|_| "https://meet.jit.si".to_string()),
            prescriptions_bucket: env::var("PRESCRIPTIONS_BUCKET")
                .unwrap_or_else(|_| "prescriptions".to_string()),
            server_port: env::var("PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(3000),
            supabase_url,
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    /// The hosted frontend lives next to the database project; fall back to a
    /// local dev server when no project URL is known.
    pub fn derive_app_base_url(supabase_url: &str) -> String {
        if supabase_url.contains(".supabase.co") {
            supabase_url.replace(".supabase.co", ".vercel.app")
        } else {
            "http://localhost:3000".to_string()
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_jwt_secret.is_empty()
    }

    pub fn is_admin_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_service_role_key.is_empty()
    }

    pub fn is_email_configured(&self) -> bool {
        self.resend_api_key.is_some()
    }

    pub fn dashboard_url(&self) -> String {
        format!("{}/patient/dashboard", self.app_base_url.trim_end_matches('/'))
    }
}
