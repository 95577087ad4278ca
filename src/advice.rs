//! Outfit advice composition
//!
//! Builds the stylist prompt from a [`ResolvedWeather`] and asks the chat
//! model for a short recommendation. Advice is best effort: every failure
//! turns into a fixed apology instead of an error.

use crate::chat::ChatClient;
use crate::models::ResolvedWeather;
use tracing::warn;

/// Models offered to the page, in display order
pub const AVAILABLE_MODELS: [&str; 4] = [
    "llama-3.3-70b-versatile",
    "llama-3.1-8b-instant",
    "gemma2-9b-it",
    "mixtral-8x7b-32768",
];

/// Fast model used when the caller's choice is unusable
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Identifiers older pages still send
const STALE_MODELS: [&str; 1] = ["llama3.2"];

/// Reply when no chat key is configured
pub const ADVICE_DISABLED: &str = "⚠️ AI 功能未啟用，請確認已設定 GROQ_API_KEY 環境變數。";
/// Reply when the chat service fails
pub const ADVICE_UNAVAILABLE: &str = "AI 連線忙碌中，請檢查 API Key 是否正確。";

/// Pick the model to call for a requested identifier
#[must_use]
pub fn select_model(requested: Option<&str>) -> &'static str {
    let requested = requested.map(str::trim).unwrap_or_default();
    if requested.is_empty() || STALE_MODELS.contains(&requested) {
        return DEFAULT_MODEL;
    }
    AVAILABLE_MODELS
        .into_iter()
        .find(|m| *m == requested)
        .unwrap_or_else(|| {
            warn!("Unknown model '{}', using {}", requested, DEFAULT_MODEL);
            DEFAULT_MODEL
        })
}

/// Stylist prompt for the given weather
#[must_use]
pub fn build_prompt(weather: &ResolvedWeather) -> String {
    format!(
        "你是一位貼心又專業的穿搭顧問。\n\
         今日數據:\n\
         地點: {}\n\
         氣溫: {} (體感 {})\n\
         降雨機率: {}%\n\
         風力: {}\n\
         天氣狀況: {}\n\n\
         請用繁體中文給一段約80字的穿搭建議。降雨機率高要提醒帶傘，體感偏低要提醒防風。\
         語氣要非常親切，像朋友聊天一樣。",
        weather.city,
        weather.format_temperature(),
        weather.format_feels_like(),
        weather.rain_chance,
        weather.format_wind(),
        weather.description,
    )
}

/// Turns weather into advice text through an optional chat client
pub struct AdviceComposer {
    chat: Option<ChatClient>,
}

impl AdviceComposer {
    #[must_use]
    pub fn new(chat: Option<ChatClient>) -> Self {
        Self { chat }
    }

    /// Whether a chat client is configured
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.chat.is_some()
    }

    /// Advice for `weather`, or a fixed apology when the model cannot answer
    pub async fn compose(&self, weather: &ResolvedWeather, requested_model: Option<&str>) -> String {
        let Some(chat) = &self.chat else {
            return ADVICE_DISABLED.to_string();
        };

        let model = select_model(requested_model);
        let prompt = build_prompt(weather);

        match chat.complete(model, &prompt).await {
            Ok(advice) => advice,
            Err(e) => {
                warn!("Advice generation failed: {}", e);
                ADVICE_UNAVAILABLE.to_string()
            }
        }
    }
}
