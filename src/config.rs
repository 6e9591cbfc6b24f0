use serde::Deserialize;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::UtcOffset;
use tracing::warn;

const OFFSET_FORMAT: &[FormatItem<'static>] =
    format_description!("[offset_hour sign:mandatory]:[offset_minute]");

#[derive(Debug, Clone, Deserialize)]
pub struct VisionConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    pub access_token: Option<String>,
    pub base_url: String,
    /// Monthly premium price charged by the checkout flow.
    pub amount: f64,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub diary_path: String,
    /// Local offset used for the diary's day-boundary math.
    pub utc_offset: UtcOffset,
    pub daily_calorie_goal: f64,
    pub vision: VisionConfig,
    pub payment: PaymentConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let diary_path =
            std::env::var("DIARY_PATH").unwrap_or_else(|_| "data/diary.json".into());
        let utc_offset = resolve_utc_offset(std::env::var("APP_UTC_OFFSET").ok().as_deref());
        let daily_calorie_goal = std::env::var("DAILY_CALORIE_GOAL")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(2000.0);

        let vision = VisionConfig {
            api_key: std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com".into()),
            model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".into()),
            max_tokens: std::env::var("OPENAI_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(500),
        };

        let payment = PaymentConfig {
            access_token: std::env::var("MP_ACCESS_TOKEN").ok().filter(|t| !t.is_empty()),
            base_url: std::env::var("MP_BASE_URL")
                .unwrap_or_else(|_| "https://api.mercadopago.com".into()),
            amount: std::env::var("PREMIUM_PRICE")
                .ok()
                .and_then(|v| v.parse::<f64>().ok())
                .unwrap_or(29.90),
            description: std::env::var("PREMIUM_DESCRIPTION")
                .unwrap_or_else(|_| "FitFood Premium monthly subscription".into()),
        };

        Ok(Self {
            diary_path,
            utc_offset,
            daily_calorie_goal,
            vision,
            payment,
        })
    }
}

/// Explicit `±HH:MM` from the environment wins; otherwise the system local
/// offset, falling back to UTC when it cannot be determined.
fn resolve_utc_offset(raw: Option<&str>) -> UtcOffset {
    if let Some(raw) = raw {
        match UtcOffset::parse(raw, OFFSET_FORMAT) {
            Ok(offset) => return offset,
            Err(e) => warn!(error = %e, raw, "invalid APP_UTC_OFFSET, ignoring"),
        }
    }
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}
