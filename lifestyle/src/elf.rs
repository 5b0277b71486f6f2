//! The elf assistant: a single chat-completion call with a local canned
//! fallback. Callers of [`ElfClient::reply`] always get text back.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::settings::ChatSettings;

pub const SYSTEM_PROMPT: &str = "You are a warm, friendly little elf assistant who keeps a couple \
company and offers caring advice. Reply gently and kindly, keep answers practical and under 100 \
words, avoid formal or technical language, feel free to use an emoji or two, and tailor your \
suggestions to couples.";

/// Returned when the service answers without any content.
pub const APOLOGY: &str = "Sorry, I can't answer right now. Please try again later.";

const FALLBACK_SUFFIX: &str =
    " Still, the best advice I have is to trust your own judgement and do what feels right!";

#[derive(Debug, Clone, Error)]
pub enum ChatError {
    #[error("missing api key: {0} is not set")]
    MissingApiKey(String),
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("invalid api key")]
    InvalidApiKey,
    #[error("rate limited")]
    RateLimited,
    #[error("json error: {0}")]
    Serde(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    fn content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct ElfClient {
    http: Client,
    endpoint: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    api_key: Option<String>,
    api_key_env: String,
}

impl ElfClient {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Reads the bearer key from the environment variable the settings name.
    /// A missing key is not an error here; calls fall back instead.
    pub fn from_settings(settings: &ChatSettings) -> Result<Self, ChatError> {
        let api_key = std::env::var(&settings.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        Self::new(settings, api_key)
    }

    pub fn new(settings: &ChatSettings, api_key: Option<String>) -> Result<Self, ChatError> {
        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("companion/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: settings.endpoint.clone(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            api_key,
            api_key_env: settings.api_key_env.clone(),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// One request, no retries. `Ok(None)` means the service answered but
    /// said nothing.
    pub async fn complete(&self, message: &str) -> Result<Option<String>, ChatError> {
        let Some(api_key) = &self.api_key else {
            return Err(ChatError::MissingApiKey(self.api_key_env.clone()));
        };
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(message)],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let res = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        match res.status() {
            s if s.is_success() => {
                let body = res
                    .json::<ChatResponse>()
                    .await
                    .map_err(|e| ChatError::Serde(e.to_string()))?;
                Ok(body.content())
            }
            StatusCode::UNAUTHORIZED => Err(ChatError::InvalidApiKey),
            StatusCode::TOO_MANY_REQUESTS => Err(ChatError::RateLimited),
            s => {
                let status = s.as_u16();
                let body = res.text().await.unwrap_or_default();
                Err(ChatError::Http { status, body })
            }
        }
    }

    /// Never fails: any error becomes a canned reply.
    pub async fn reply(&self, message: &str) -> String {
        match self.complete(message).await {
            Ok(Some(content)) => {
                debug!(chars = content.chars().count(), "elf replied");
                content
            }
            Ok(None) => {
                warn!("chat response carried no content");
                APOLOGY.to_string()
            }
            Err(err) => {
                warn!(%err, "chat call failed, using canned reply");
                fallback_reply(message)
            }
        }
    }
}

fn map_reqwest_error(e: reqwest::Error) -> ChatError {
    if e.is_timeout() {
        ChatError::Timeout
    } else {
        ChatError::Transport(e.to_string())
    }
}

const CANNED: &[(&[&str], &str)] = &[
    (
        &["天气", "温度", "weather", "temperature"],
        "The weather looks lovely today! Go for a walk and get some fresh air, and bring a jacket in case it changes.",
    ),
    (
        &["电影", "推荐", "movie", "recommend"],
        "How about Titanic or The Shawshank Redemption? Both are classics. You could also browse the movie list for something new.",
    ),
    (
        &["健康", "运动", "锻炼", "health", "exercise", "workout"],
        "Staying healthy matters! Try 30 minutes of exercise a day, drink plenty of water and get to bed early. A walk, a jog or some yoga are all great.",
    ),
    (
        &["计划", "安排", "plan", "schedule"],
        "Planning is a great habit! List what you want to do today, sort it by importance, and leave yourself some time to rest.",
    ),
    (
        &["有趣", "好玩", "fun", "bored"],
        "There's lots of fun to be had! Watch a movie, listen to music, chat with friends, or plan something fun in your schedule.",
    ),
    (
        &["谢谢", "感谢", "thank"],
        "You're welcome! Happy to help. Anything else you'd like to talk about?",
    ),
    (
        &["你好", "hello", "hi"],
        "Hi there! I'm your little elf assistant. Want to chat? I can keep you company, answer questions or give you some advice.",
    ),
];

const DEFAULT_OPENERS: [&str; 6] = [
    "That's an interesting question! Let me think...",
    "Hmm, maybe you could try this...",
    "Good question! My suggestion is...",
    "Let me help you think this through...",
    "I think you could consider...",
    "For this one I'd suggest...",
];

/// CJK keywords match anywhere. ASCII keywords match whole words, and
/// keywords of four letters or more also match as a word prefix ("thanks").
fn mentions(lowered: &str, keyword: &str) -> bool {
    if !keyword.is_ascii() {
        return lowered.contains(keyword);
    }
    lowered
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|word| word == keyword || (keyword.len() >= 4 && word.starts_with(keyword)))
}

/// Keyword-matched canned reply. Messages matching nothing get one of a
/// few generic openers, chosen by hashing the message so the pick is stable.
pub fn fallback_reply(message: &str) -> String {
    let lowered = message.to_lowercase();
    if let Some((_, reply)) = CANNED
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| mentions(&lowered, k)))
    {
        return (*reply).to_string();
    }

    let mut hasher = DefaultHasher::new();
    lowered.hash(&mut hasher);
    let pick = (hasher.finish() % DEFAULT_OPENERS.len() as u64) as usize;
    format!("{}{}", DEFAULT_OPENERS[pick], FALLBACK_SUFFIX)
}
