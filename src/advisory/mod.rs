//! Advisory summarizer
//!
//! Turns the aggregated metrics for a location into natural-language advice
//! through a generative-text model. Models are tried in a fixed order; when
//! none answers, or the generative API was never configured, a static
//! advisory is returned instead. Nothing in here returns an error.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::AdvisoryConfig;
use crate::gateway::HttpClient;
use crate::models::{AirQualityReading, Coordinate, SafetyScore, WeatherSnapshot};

pub mod gemini;

pub use gemini::GeminiClient;

/// Request text used when the caller does not send one
pub const DEFAULT_USER_PROMPT: &str = "Provide environmental safety advice for this location.";

/// Returned whenever no model produced advice
pub const FALLBACK_ADVICE: &str = "\
Based on the data for your location, we recommend:

**For general health:**
- Enjoy fresh air in open spaces when conditions allow
- Stay hydrated by drinking water regularly
- Use sunscreen in sunny weather
- Exercise at suitable times of day

**For the environment:**
- Choose green spaces for recreation
- Help reduce pollution
- Use sustainable transport

**For safety:**
- Avoid crowded places when air quality is moderate or worse
- Keep enclosed spaces well ventilated
- Follow public safety guidance

For more personalised advice, please try again later.";

/// Text generation backend
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, model: &str, prompt: &str) -> anyhow::Result<String>;
}

/// Metrics the advice is based on
#[derive(Debug, Clone)]
pub struct AdvisoryContext {
    pub location: Coordinate,
    pub air_quality: AirQualityReading,
    pub safety: SafetyScore,
    pub weather: WeatherSnapshot,
}

impl AdvisoryContext {
    /// Full prompt: metrics, guidance, then the caller's own request
    #[must_use]
    pub fn compose_prompt(&self, user_prompt: &str) -> String {
        format!(
            "Location: latitude {lat}, longitude {lon}\n\
             Safety score: {score}/100 - {level}\n\
             Air quality: {aqi}/5 (1=excellent, 5=hazardous)\n\
             Weather: {condition}\n\
             Temperature: {temperature}\n\
             Humidity: {humidity}\n\
             Wind: {wind}\n\
             \n\
             Give practical environmental and health safety advice based on this data.\n\
             Focus on:\n\
             - advice for people with chronic illness, the elderly and children\n\
             - ways to improve air quality and cope with the temperature\n\
             - encouraging planting to reduce pollution\n\
             - dealing with traffic congestion\n\
             Be friendly and use plain, simple language.\n\
             Answer in the language the user writes in.\n\
             \n\
             {user_prompt}",
            lat = self.location.lat,
            lon = self.location.lon,
            score = self.safety.score,
            level = self.safety.level,
            aqi = self.air_quality.aqi,
            condition = self.weather.condition_text,
            temperature = self.weather.format_temperature(),
            humidity = self.weather.format_humidity(),
            wind = self.weather.format_wind(),
        )
    }
}

/// Advice text and how it was obtained
#[derive(Debug, Clone, PartialEq)]
pub enum Advice {
    Generated { model: String, text: String },
    Fallback { text: String },
}

impl Advice {
    fn fallback() -> Self {
        Self::Fallback {
            text: FALLBACK_ADVICE.to_string(),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Advice::Generated { text, .. } | Advice::Fallback { text } => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Advice::Generated { text, .. } | Advice::Fallback { text } => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Advice::Fallback { .. })
    }
}

/// Ordered model identifiers: the primary first, then the alternates
#[derive(Debug, Clone, PartialEq)]
pub struct ModelChain {
    models: Vec<String>,
}

/// Progress through a [`ModelChain`]
#[derive(Debug, Clone, PartialEq)]
enum ChainState {
    /// Next candidate to try
    Trying(usize),
    Succeeded { model: String, text: String },
    Exhausted,
}

impl ModelChain {
    pub fn new(primary: impl Into<String>, alternates: impl IntoIterator<Item = String>) -> Self {
        let mut models = vec![primary.into()];
        models.extend(alternates);
        Self { models }
    }

    pub fn from_config(config: &AdvisoryConfig) -> Self {
        Self::new(
            config.primary_model.clone(),
            config.alternate_models.iter().cloned(),
        )
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Try each model in order until one returns non-empty text
    pub async fn run(&self, generator: &dyn TextGenerator, prompt: &str) -> Option<(String, String)> {
        let mut state = ChainState::Trying(0);

        loop {
            state = match state {
                ChainState::Trying(index) => match self.models.get(index) {
                    None => ChainState::Exhausted,
                    Some(model) => match generator.generate(model, prompt).await {
                        Ok(text) if !text.trim().is_empty() => ChainState::Succeeded {
                            model: model.clone(),
                            text,
                        },
                        Ok(_) => {
                            warn!("Model {} returned no text, trying next", model);
                            ChainState::Trying(index + 1)
                        }
                        Err(e) => {
                            warn!("Model {} failed, trying next: {:#}", model, e);
                            ChainState::Trying(index + 1)
                        }
                    },
                },
                ChainState::Succeeded { model, text } => {
                    info!("Advice generated with model {}", model);
                    return Some((model, text));
                }
                ChainState::Exhausted => {
                    warn!("All {} models failed", self.models.len());
                    return None;
                }
            };
        }
    }
}

/// Generative advice with a static fallback
#[derive(Clone)]
pub struct Summarizer {
    generator: Option<Arc<dyn TextGenerator>>,
    chain: ModelChain,
}

impl Summarizer {
    /// Summarizer backed by `generator`, or a disabled one when `None`
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, chain: ModelChain) -> Self {
        Self { generator, chain }
    }

    /// Availability is fixed here: a key in the configuration enables Gemini
    pub fn from_config(config: &AdvisoryConfig, http: HttpClient) -> Self {
        let generator = config.api_key.as_ref().map(|api_key| {
            Arc::new(GeminiClient::new(http, &config.base_url, api_key)) as Arc<dyn TextGenerator>
        });
        if generator.is_none() {
            warn!("Generative API key not configured, advice will use the static text");
        }
        Self::new(generator, ModelChain::from_config(config))
    }

    pub fn is_available(&self) -> bool {
        self.generator.is_some()
    }

    pub async fn advise(&self, context: &AdvisoryContext, user_prompt: Option<&str>) -> Advice {
        let Some(generator) = &self.generator else {
            return Advice::fallback();
        };

        let user_prompt = user_prompt
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_USER_PROMPT);
        let prompt = context.compose_prompt(user_prompt);

        match self.chain.run(generator.as_ref(), &prompt).await {
            Some((model, text)) => Advice::Generated { model, text },
            None => Advice::fallback(),
        }
    }
}

impl std::fmt::Debug for Summarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Summarizer")
            .field("available", &self.is_available())
            .field("chain", &self.chain)
            .finish()
    }
}

/// Generator that answers only for the listed models and records every call
#[cfg(test)]
pub(crate) mod scripted {
    use super::*;
    use anyhow::anyhow;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct ScriptedGenerator {
        answers: Vec<(String, String)>,
        pub calls: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedGenerator {
        pub fn answering(answers: &[(&str, &str)]) -> Self {
            Self {
                answers: answers
                    .iter()
                    .map(|(m, t)| (m.to_string(), t.to_string()))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn models_called(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(m, _)| m.clone()).collect()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, model: &str, prompt: &str) -> anyhow::Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((model.to_string(), prompt.to_string()));
            self.answers
                .iter()
                .find(|(m, _)| m == model)
                .map(|(_, text)| text.clone())
                .ok_or_else(|| anyhow!("model {model} is not available"))
        }
    }
}
