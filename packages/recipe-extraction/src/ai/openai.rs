//! OpenAI implementation of the judge and the generator.
//!
//! # Example
//!
//! ```rust,ignore
//! use recipe_extraction::ai::OpenAI;
//!
//! let ai = OpenAI::new(AICredentials::new("sk-...").with_model("gpt-4o"));
//! let extractor = RecipeExtractor::new(router, ai);
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::schema::StructuredOutput;
use crate::error::{JudgeError, JudgeResult};
use crate::pipeline::prompts::{
    format_generate_prompt, format_judge_prompt, GENERATE_SYSTEM_PROMPT, JUDGE_SYSTEM_PROMPT,
    RECIPE_NAME_SYSTEM_PROMPT,
};
use crate::security::AICredentials;
use crate::traits::judge::{RecipeGenerator, RecipeJudge};
use crate::types::{
    generation::{GenerationRequest, RecipeNameExtraction},
    judgment::{JudgmentRequest, JudgmentResponse},
    recipe::StructuredRecipe,
};

/// Structured-output chat completions client.
#[derive(Clone)]
pub struct OpenAI {
    client: Client,
    credentials: AICredentials,
}

impl OpenAI {
    pub fn new(credentials: AICredentials) -> Self {
        Self {
            client: Client::new(),
            credentials,
        }
    }

    /// Use a preconfigured HTTP client (timeouts, proxies).
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn model(&self) -> &str {
        &self.credentials.model
    }

    /// Ask for a `T` under strict json_schema response format, temperature 0.
    pub async fn generate_structured<T: StructuredOutput>(
        &self,
        system: &str,
        user: &str,
        schema_name: &str,
    ) -> JudgeResult<T> {
        let request = StructuredRequest {
            model: self.credentials.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature: 0.0,
            response_format: ResponseFormat {
                format_type: "json_schema".to_string(),
                json_schema: JsonSchemaFormat {
                    name: schema_name.to_string(),
                    strict: true,
                    schema: T::openai_schema(),
                },
            },
        };

        debug!(model = %self.credentials.model, schema = schema_name, "Requesting structured output");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.credentials.base_url))
            .header(
                "Authorization",
                format!("Bearer {}", self.credentials.api_key.expose()),
            )
            .json(&request)
            .send()
            .await
            .map_err(|e| JudgeError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(JudgeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| JudgeError::Request(e.to_string()))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(JudgeError::Empty)?;

        parse_structured(&content)
    }
}

fn parse_structured<T: StructuredOutput>(content: &str) -> JudgeResult<T> {
    serde_json::from_str(content).map_err(|e| JudgeError::Schema(e.to_string()))
}

#[async_trait]
impl RecipeJudge for OpenAI {
    async fn judge(&self, request: &JudgmentRequest) -> JudgeResult<JudgmentResponse> {
        let prompt = format_judge_prompt(&request.url, request.depth, &request.content);
        self.generate_structured(JUDGE_SYSTEM_PROMPT, &prompt, "recipe_judgment")
            .await
    }
}

#[async_trait]
impl RecipeGenerator for OpenAI {
    async fn generate(&self, request: &GenerationRequest) -> JudgeResult<StructuredRecipe> {
        let partial_json = request
            .partial_recipe
            .as_ref()
            .and_then(|p| serde_json::to_string_pretty(p).ok());
        let prompt = format_generate_prompt(
            &request.recipe_name,
            request.partial_content.as_deref(),
            partial_json.as_deref(),
        );
        self.generate_structured(GENERATE_SYSTEM_PROMPT, &prompt, "generated_recipe")
            .await
    }

    async fn extract_recipe_name(&self, text: &str) -> JudgeResult<RecipeNameExtraction> {
        self.generate_structured(RECIPE_NAME_SYSTEM_PROMPT, text, "recipe_name")
            .await
    }
}

#[derive(Serialize)]
struct StructuredRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
    json_schema: JsonSchemaFormat,
}

#[derive(Serialize)]
struct JsonSchemaFormat {
    name: String,
    strict: bool,
    schema: serde_json::Value,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_builder() {
        let ai = OpenAI::new(
            AICredentials::new("sk-test")
                .with_model("gpt-4o")
                .with_base_url("https://custom.api.com/v1/"),
        );

        assert_eq!(ai.model(), "gpt-4o");
        assert_eq!(ai.credentials.base_url, "https://custom.api.com/v1");
    }

    #[test]
    fn test_parse_judgment_payload() {
        let payload = r#"{
            "is_valid_recipe": false,
            "recipe_data": null,
            "partial_recipe_data": null,
            "recipe_name": "Pad Thai",
            "has_ingredients": false,
            "has_instructions": false,
            "follow_up_url": "https://example.com/pad-thai",
            "follow_up_confidence": 0.85,
            "reason": "Caption links to the blog",
            "confidence": 0.9
        }"#;

        let parsed: JudgmentResponse = parse_structured(payload).unwrap();
        assert_eq!(parsed.follow_up_url.as_deref(), Some("https://example.com/pad-thai"));
    }

    #[test]
    fn test_schema_mismatch_is_schema_error() {
        let result: JudgeResult<JudgmentResponse> = parse_structured(r#"{"is_valid_recipe": true}"#);
        assert!(matches!(result, Err(JudgeError::Schema(_))));
    }
}
