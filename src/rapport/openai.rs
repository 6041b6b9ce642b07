// Chat completion client for the narrative generation.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::rapport::*;

#[derive(PartialEq, Debug, Clone, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(PartialEq, Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(PartialEq, Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatAnswer,
}

#[derive(PartialEq, Debug, Clone, Deserialize)]
struct ChatAnswer {
    content: Option<String>,
}

pub struct OpenAiGenerator {
    client: Client,
    endpoint: String,
    model: String,
    temperature: f64,
    api_key: String,
}

impl OpenAiGenerator {
    pub fn new(settings: &GeneratorSettings, api_key: String) -> RapportResult<OpenAiGenerator> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds()))
            .build()
            .context(HttpClientSnafu {})?;
        info!(
            "OpenAiGenerator: endpoint {:?} model {:?}",
            settings.endpoint(),
            settings.model()
        );
        Ok(OpenAiGenerator {
            client,
            endpoint: settings.endpoint(),
            model: settings.model(),
            temperature: settings.temperature(),
            api_key,
        })
    }

    fn request<'a>(&'a self, system_instruction: &'a str, prompt: &'a str, max_tokens: u32) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_instruction,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens,
        }
    }
}

impl TextGenerator for OpenAiGenerator {
    fn complete(&self, system_instruction: &str, prompt: &str, max_output_units: u32) -> Result<String, String> {
        let body = self.request(system_instruction, prompt, max_output_units);
        debug!("complete: posting {} prompt chars", prompt.len());
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| format!("Exception in OpenAI API call: {}", e))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(format!("Error calling OpenAI API: {} - {}", status.as_u16(), text));
        }
        let text = response
            .text()
            .map_err(|e| format!("Exception in OpenAI API call: {}", e))?;
        parse_answer(&text)
    }
}

fn parse_answer(text: &str) -> Result<String, String> {
    let parsed: ChatResponse = serde_json::from_str(text)
        .map_err(|e| format!("Exception in OpenAI API call: {}", e))?;
    match parsed.choices.into_iter().next() {
        Some(choice) => Ok(choice.message.content.unwrap_or_default()),
        None => Err("Exception in OpenAI API call: the response has no choices".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_body() {
        let settings = parse_config("{}").unwrap().generator();
        let generator = OpenAiGenerator::new(&settings, "sk-test".to_string()).unwrap();
        let body = generator.request("sistem", "analisis", 3000);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "model": "gpt-5-mini-2025-08-07",
                "messages": [
                    { "role": "system", "content": "sistem" },
                    { "role": "user", "content": "analisis" }
                ],
                "temperature": 0.7,
                "max_tokens": 3000
            })
        );
    }

    #[test]
    fn first_choice_is_the_answer() {
        let text = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"**Apresiasi Umum:**"}}]}"#;
        assert_eq!(parse_answer(text), Ok("**Apresiasi Umum:**".to_string()));
    }

    #[test]
    fn malformed_answers() {
        assert_eq!(
            parse_answer(r#"{"choices":[]}"#),
            Err("Exception in OpenAI API call: the response has no choices".to_string())
        );
        assert!(parse_answer("<html>")
            .unwrap_err()
            .starts_with("Exception in OpenAI API call: "));
    }

    #[test]
    fn unreachable_endpoint_is_reported() {
        let settings = parse_config(
            r#"{ "generator": { "endpoint": "http://127.0.0.1:9/v1/chat/completions", "timeoutSeconds": 2 } }"#,
        )
        .unwrap()
        .generator();
        let generator = OpenAiGenerator::new(&settings, "sk-test".to_string()).unwrap();
        let res = generator.complete("sistem", "analisis", 10);
        assert!(res.unwrap_err().starts_with("Exception in OpenAI API call: "));
    }
}
