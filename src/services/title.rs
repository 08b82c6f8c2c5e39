use tracing::{debug, warn};

use crate::llm::{ChatMessage, CompletionRequest, GenerationConfig, LlmError, LlmProvider};
use crate::services::prompts::CHAT_TITLE_PROMPT;

/// Stored in place of a title that ran past [`MAX_TITLE_WORDS`]
pub const LONG_TITLE_ERROR: &str = "-- LONG TITLE ERROR --";
pub const MAX_TITLE_WORDS: usize = 8;
pub const DEFAULT_TITLE: &str = "New Chat";

/// Ask a model for a short title describing the first message of a chat
pub async fn generate_title(
    provider: &dyn LlmProvider,
    model: &str,
    initial_message: &str,
) -> Result<String, LlmError> {
    let request = CompletionRequest::new(
        model,
        vec![
            ChatMessage::system(CHAT_TITLE_PROMPT),
            ChatMessage::user(initial_message),
        ],
    )
    .with_config(GenerationConfig::new(32).with_temperature(0.2));

    let completion = provider.complete(request).await?;
    let title = clean_title(&completion.content);
    debug!(%title, "Generated chat title");
    Ok(title)
}

fn clean_title(raw: &str) -> String {
    let mut title = raw.trim();
    for quote in ['"', '\'', '`'] {
        if title.len() >= 2 && title.starts_with(quote) && title.ends_with(quote) {
            title = title[1..title.len() - 1].trim();
        }
    }

    if title.is_empty() {
        return DEFAULT_TITLE.to_string();
    }
    if title.split_whitespace().count() > MAX_TITLE_WORDS {
        warn!(raw, "Model returned an overlong title");
        return LONG_TITLE_ERROR.to_string();
    }
    title.to_string()
}
