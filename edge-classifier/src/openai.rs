//! Chat-completion classifier over an OpenAI-compatible endpoint

use crate::classifier::Classifier;
use crate::prompt::{market_prompt, SYSTEM_PROMPT};
use crate::validate::RawSignal;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs, ResponseFormat,
    },
    Client,
};
use async_trait::async_trait;
use edge_core::{ClassifierConfig, EdgeError, EdgeResult, MarketRecord};
use tracing::{debug, instrument};

const MAX_TOKENS: u32 = 800;

#[derive(Debug, Clone)]
pub struct LlmClassifier {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl LlmClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_base(&config.api_base)
            .with_api_key(&config.api_key);

        Self {
            client: Client::with_config(openai_config),
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Chat request for one market, asking for a bare JSON object
    fn request(&self, market: &MarketRecord) -> EdgeResult<CreateChatCompletionRequest> {
        CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(SYSTEM_PROMPT)
                    .build()
                    .map_err(|e| EdgeError::internal(e.to_string()))?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(market_prompt(market))
                    .build()
                    .map_err(|e| EdgeError::internal(e.to_string()))?
                    .into(),
            ])
            .temperature(self.temperature)
            .max_tokens(MAX_TOKENS)
            .response_format(ResponseFormat::JsonObject)
            .build()
            .map_err(|e| EdgeError::internal(e.to_string()))
    }

    /// Ask the model for a strategy and return its raw text
    #[instrument(skip(self, market), fields(slug = %market.slug))]
    pub async fn complete(&self, market: &MarketRecord) -> EdgeResult<String> {
        let request = self.request(market)?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| EdgeError::classifier(format!("LLM API error: {}", e)))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| EdgeError::parse("No response from LLM"))?;

        debug!("LLM returned {} chars", content.len());
        Ok(content)
    }
}

#[async_trait]
impl Classifier for LlmClassifier {
    async fn classify(&self, market: &MarketRecord) -> EdgeResult<RawSignal> {
        let content = self.complete(market).await?;
        RawSignal::parse(&content)
            .map_err(|e| EdgeError::parse(format!("Unusable LLM response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn config() -> ClassifierConfig {
        ClassifierConfig {
            api_base: "https://api.groq.com/openai/v1".to_string(),
            api_key: "gsk_test".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            temperature: 0.3,
            strict_schema: true,
            batch_size: 5,
            batch_delay: Duration::from_millis(500),
        }
    }

    fn market() -> MarketRecord {
        MarketRecord {
            id: "0xabc".to_string(),
            question: "Will the Fed cut rates in March?".to_string(),
            slug: "fed-cut-march".to_string(),
            volume_24h: dec!(1300000),
            liquidity: dec!(48000),
            outcome_prices: Some(r#"["0.72","0.28"]"#.to_string()),
            active: true,
            closed: false,
            accepting_orders: Some(true),
        }
    }

    #[test]
    fn test_new_uses_configured_model() {
        let classifier = LlmClassifier::new(&config());
        assert_eq!(classifier.model(), "llama-3.3-70b-versatile");
    }

    #[test]
    fn test_request_asks_for_json_object() {
        let classifier = LlmClassifier::new(&config());
        let request = classifier.request(&market()).unwrap();

        assert_eq!(request.model, "llama-3.3-70b-versatile");
        assert_eq!(request.response_format, Some(ResponseFormat::JsonObject));
        assert_eq!(request.temperature, Some(0.3));
        assert_eq!(request.messages.len(), 2);
    }
}
