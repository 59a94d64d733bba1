//! Conversion between canonical and OpenAI-style wire formats

use anyhow::anyhow;
use uuid::Uuid;

use crate::error::LlmError;
use crate::protocol::canonical::{
    CanonicalContent, CanonicalMessage, CanonicalRequest, CanonicalResponse, CanonicalStreamEvent, CanonicalUsage,
    ContentBlock, ImageSource, MessageDelta, ResponseBlock, Role, StopReason, SystemPrompt, TextDelta,
};
use crate::protocol::provider::{
    ImageUrl, ProviderContent, ProviderContentPart, ProviderMessage, ProviderRequest, ProviderResponse,
    ProviderStreamChunk, ProviderUsage,
};

/// Generate a fresh canonical message identifier
pub fn new_message_id() -> String {
    format!("msg_{}", Uuid::new_v4().simple())
}

// -- Outbound: canonical request -> provider request --

/// Build a provider request from a routed canonical request
///
/// The system prompt becomes a leading `system` message. `top_k` has no
/// chat-completions equivalent and is dropped. Image blocks are kept only
/// when `images` is set.
pub fn to_provider_request(request: &CanonicalRequest, images: bool) -> ProviderRequest {
    let system = request
        .system
        .as_ref()
        .map(SystemPrompt::to_text)
        .filter(|text| !text.is_empty())
        .map(|text| ProviderMessage {
            role: "system".to_owned(),
            content: ProviderContent::Text(text),
        });

    let messages = system
        .into_iter()
        .chain(request.messages.iter().filter_map(|message| to_provider_message(message, images)))
        .collect();

    ProviderRequest {
        model: request.model.clone(),
        messages,
        temperature: request.temperature,
        top_p: request.top_p,
        max_tokens: Some(request.max_tokens),
        stop: request.stop_sequences.clone().filter(|stop| !stop.is_empty()),
        stream: request.stream,
        stream_options: None,
    }
}

fn to_provider_message(message: &CanonicalMessage, images: bool) -> Option<ProviderMessage> {
    let content = match &message.content {
        CanonicalContent::Text(text) => ProviderContent::Text(text.clone()),
        CanonicalContent::Blocks(blocks) => {
            let parts: Vec<ProviderContentPart> = blocks
                .iter()
                .filter_map(|block| match block {
                    ContentBlock::Text { text } => Some(ProviderContentPart::Text { text: text.clone() }),
                    ContentBlock::Image { source } if images => image_url(source)
                        .map(|url| ProviderContentPart::ImageUrl { image_url: ImageUrl { url } }),
                    ContentBlock::Image { .. } | ContentBlock::Unsupported => None,
                })
                .collect();

            if parts.is_empty() {
                tracing::debug!(role = message.role.as_str(), "dropping message with no translatable content");
                return None;
            }

            flatten_parts(parts)
        }
    };

    Some(ProviderMessage {
        role: message.role.as_str().to_owned(),
        content,
    })
}

/// Collapse text-only part lists into a plain string
fn flatten_parts(parts: Vec<ProviderContentPart>) -> ProviderContent {
    if parts.iter().all(|part| matches!(part, ProviderContentPart::Text { .. })) {
        let text = parts
            .into_iter()
            .filter_map(|part| match part {
                ProviderContentPart::Text { text } => Some(text),
                ProviderContentPart::ImageUrl { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n");
        ProviderContent::Text(text)
    } else {
        ProviderContent::Parts(parts)
    }
}

fn image_url(source: &ImageSource) -> Option<String> {
    match source.source_type.as_str() {
        "base64" => {
            let data = source.data.as_deref()?;
            let media_type = source.media_type.as_deref().unwrap_or("image/png");
            Some(format!("data:{media_type};base64,{data}"))
        }
        "url" => source.url.clone(),
        _ => None,
    }
}

// -- Inbound: provider response -> canonical response --

/// Translate a complete provider response
///
/// Only the first choice is used. A missing `finish_reason` is reported as
/// `end_turn`.
pub fn to_canonical_response(response: ProviderResponse) -> Result<CanonicalResponse, LlmError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::Internal(anyhow!("provider response contained no choices")))?;

    let text = choice.message.content.unwrap_or_default();
    let stop_reason = choice
        .finish_reason
        .as_deref()
        .map_or(StopReason::EndTurn, map_finish_reason);

    Ok(CanonicalResponse {
        id: new_message_id(),
        response_type: "message".to_owned(),
        role: Role::Assistant,
        content: vec![ResponseBlock::Text { text }],
        model: response.model.unwrap_or_default(),
        stop_reason,
        stop_sequence: None,
        usage: response.usage.as_ref().map(to_canonical_usage).unwrap_or_default(),
    })
}

/// Map an OpenAI-style finish reason onto a canonical stop reason
pub fn map_finish_reason(reason: &str) -> StopReason {
    match reason {
        "stop" => StopReason::EndTurn,
        "length" => StopReason::MaxTokens,
        other => StopReason::Other(other.to_owned()),
    }
}

pub fn to_canonical_usage(usage: &ProviderUsage) -> CanonicalUsage {
    CanonicalUsage {
        input_tokens: usage.prompt_tokens.unwrap_or(0),
        output_tokens: usage.completion_tokens.unwrap_or(0),
    }
}

// -- Inbound: provider stream chunk -> canonical event --

/// Map one stream chunk to at most one canonical event
///
/// Text content takes precedence over a finish reason carried in the same
/// chunk. Chunks with neither (role announcements, usage-only trailers)
/// produce nothing.
pub fn to_canonical_event(chunk: &ProviderStreamChunk) -> Option<CanonicalStreamEvent> {
    let choice = chunk.choices.first()?;

    if let Some(text) = choice.delta.content.as_ref().filter(|text| !text.is_empty()) {
        return Some(CanonicalStreamEvent::ContentBlockDelta {
            index: 0,
            delta: TextDelta::TextDelta { text: text.clone() },
        });
    }

    let reason = choice.finish_reason.as_deref()?;

    Some(CanonicalStreamEvent::MessageDelta {
        delta: MessageDelta {
            stop_reason: map_finish_reason(reason),
            stop_sequence: None,
        },
        usage: chunk.usage.as_ref().map(to_canonical_usage).unwrap_or_default(),
    })
}
