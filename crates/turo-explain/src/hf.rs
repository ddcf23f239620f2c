use std::time::Duration;

use futures_util::StreamExt;
use kanal::AsyncSender;
use serde::{Deserialize, Serialize};
use turo_config::inference::InferenceConfig;

use crate::{ExplainError, Explainer};

/// Trailing end-of-sequence markup emitted by the model
const END_MARKER: &str = "</s>";

/// Streaming client for a Hugging Face text-generation-inference endpoint
#[derive(Clone)]
pub struct HfClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    parameters: GenerationParameters,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct GenerationParameters {
    pub max_new_tokens: u32,
    pub return_full_text: bool,
    pub temperature: f32,
    pub top_p: f32,
}

#[derive(Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
    stream: bool,
}

#[derive(Deserialize)]
struct StreamEvent {
    token: StreamToken,
}

#[derive(Deserialize)]
struct StreamToken {
    #[serde(default)]
    text: String,
}

impl HfClient {
    pub fn new(config: &InferenceConfig) -> Result<Self, ExplainError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            parameters: GenerationParameters {
                max_new_tokens: config.max_new_tokens,
                return_full_text: false,
                temperature: config.temperature,
                top_p: config.top_p,
            },
        })
    }
}

#[async_trait::async_trait]
impl Explainer for HfClient {
    async fn explain(
        &self,
        word: &str,
        _translation: &str,
        chunks: AsyncSender<String>,
    ) -> Result<String, ExplainError> {
        let prompt = build_prompt(word);
        let request = GenerationRequest {
            inputs: &prompt,
            parameters: self.parameters,
            stream: true,
        };

        let url = format!("{}/{}", self.api_url, self.model);
        let mut builder = self.client.post(&url).json(&request);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if status.as_u16() == 429 {
            return Err(ExplainError::RateLimitExceeded);
        }
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(ExplainError::AuthenticationError);
        }
        if !status.is_success() {
            return Err(ExplainError::ApiError(format!("HTTP {status}")));
        }

        let mut stream = response.bytes_stream();
        let mut pending: Vec<u8> = Vec::new();
        let mut text = String::new();
        let mut sink_open = true;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            pending.extend_from_slice(&chunk);

            // Events are newline-framed; a chunk may end mid-line, so carry
            // the remainder over to the next read.
            while let Some(newline) = pending.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = pending.drain(..=newline).collect();
                let Some(fragment) = decode_event_line(&line)? else {
                    continue;
                };

                text.push_str(&fragment);
                if sink_open && chunks.send(fragment).await.is_err() {
                    // Receiver superseded us; keep draining, stop forwarding.
                    tracing::debug!("explanation chunk receiver dropped, draining stream");
                    sink_open = false;
                }
            }
        }

        Ok(finish_text(&text))
    }
}

/// Decode one server-sent-event line into its token text, if any.
fn decode_event_line(line: &[u8]) -> Result<Option<String>, ExplainError> {
    let line = std::str::from_utf8(line)
        .map_err(|e| ExplainError::DecodeError(e.to_string()))?
        .trim();

    // Blank keep-alives, comments and non-data fields carry no tokens.
    let Some(payload) = line.strip_prefix("data:") else {
        return Ok(None);
    };
    let payload = payload.trim_start();
    if payload.is_empty() || payload == "[DONE]" {
        return Ok(None);
    }

    let event: StreamEvent = serde_json::from_str(payload)
        .map_err(|e| ExplainError::DecodeError(e.to_string()))?;

    if event.token.text.is_empty() {
        return Ok(None);
    }
    Ok(Some(event.token.text))
}

/// Strip the trailing end marker and surrounding whitespace.
fn finish_text(text: &str) -> String {
    let trimmed = text.trim_end();
    trimmed
        .strip_suffix(END_MARKER)
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}

/// Fixed prompt: literal-meaning phrase, emoji phrase, root-word phrase,
/// affix note for longer words, brief usage note, 60-word bound.
fn build_prompt(word: &str) -> String {
    format!(
        "Explain the meaning of the Tagalog word \"{word}\" concisely in English. \
         Within your response, be sure to include the phrase: \
         \"The Tagalog word {word} literally means...\", \
         \"Some emojis can be used to represent {word} in a sentence.\", \
         \"It comes from the root word...\" (if {word} doesn't have an obvious root word, just say so). \
         If {word} is a longer word, describe the purpose of any affixes that are used. \
         Don't forget to include a hyper-brief explanation of {word}'s common usage or context. \
         Limit your response to 2-3 short sentences and 60 words maximum."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_data_line() {
        let line = br#"data: {"token": {"text": "Aso"}}"#;
        assert_eq!(decode_event_line(line).unwrap().as_deref(), Some("Aso"));
    }

    #[test]
    fn ignores_blank_lines_comments_and_done_marker() {
        assert_eq!(decode_event_line(b"\n").unwrap(), None);
        assert_eq!(decode_event_line(b": keep-alive\n").unwrap(), None);
        assert_eq!(decode_event_line(b"event: message\n").unwrap(), None);
        assert_eq!(decode_event_line(b"data: [DONE]\n").unwrap(), None);
    }

    #[test]
    fn empty_token_text_yields_no_fragment() {
        let line = br#"data: {"token": {"text": ""}}"#;
        assert_eq!(decode_event_line(line).unwrap(), None);
    }

    #[test]
    fn malformed_payload_is_a_decode_error() {
        let result = decode_event_line(b"data: {nope\n");
        assert!(matches!(result, Err(ExplainError::DecodeError(_))));
    }

    #[test]
    fn finish_strips_end_marker_and_whitespace() {
        assert_eq!(finish_text(" The word aso means dog.</s> "), "The word aso means dog.");
        assert_eq!(finish_text("plain text"), "plain text");
        // Only a trailing marker is stripped.
        assert_eq!(finish_text("a</s>b"), "a</s>b");
    }

    #[test]
    fn prompt_carries_the_required_phrases() {
        let prompt = build_prompt("aso");
        assert!(prompt.contains("The Tagalog word aso literally means"));
        assert!(prompt.contains("Some emojis can be used to represent aso"));
        assert!(prompt.contains("It comes from the root word"));
        assert!(prompt.contains("60 words maximum"));
    }

    #[test]
    fn request_serializes_with_sampling_parameters() {
        let request = GenerationRequest {
            inputs: "hello",
            parameters: GenerationParameters {
                max_new_tokens: 100,
                return_full_text: false,
                temperature: 0.5,
                top_p: 0.7,
            },
            stream: true,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["parameters"]["max_new_tokens"], 100);
        assert_eq!(json["parameters"]["return_full_text"], false);
        assert_eq!(json["stream"], true);
    }
}
