use async_trait::async_trait;

use crate::models::{ClassifiedIntent, Intent};
use crate::services::ai::{LlmProvider, Message};

const SYSTEM_PROMPT: &str = r#"You classify messages sent to an interview scheduling assistant.

Return ONLY valid JSON (no markdown, no explanation) with this exact structure:
{"intent": "offer_availability|schedule_meeting|reschedule|cancel_meeting|request_time_slot|unknown"}

Intent rules:
- "offer_availability": The person describes when they are free
- "schedule_meeting": The person asks to book or set up the interview
- "reschedule": The person wants to move an existing interview
- "cancel_meeting": The person wants to call off an interview
- "request_time_slot": The person asks which times or days are possible
- "unknown": None of the above
"#;

/// Fallback replier for turns the scheduling dialogue does not handle itself.
#[async_trait]
pub trait IntentResponder: Send + Sync {
    async fn respond(&self, text: &str) -> String;
}

pub fn classify_keywords(text: &str) -> Intent {
    let text = text.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| text.contains(w));

    if has(&["reschedule", "move", "postpone"]) {
        Intent::Reschedule
    } else if has(&["cancel", "call off"]) {
        Intent::CancelMeeting
    } else if has(&["available", "availability", "free"]) {
        Intent::OfferAvailability
    } else if has(&["slot", "which day", "what time", "when"]) {
        Intent::RequestTimeSlot
    } else if has(&["schedule", "book", "interview", "meeting"]) {
        Intent::ScheduleMeeting
    } else {
        Intent::Unknown
    }
}

#[derive(Debug, Default, Clone)]
pub struct KeywordIntentResponder;

#[async_trait]
impl IntentResponder for KeywordIntentResponder {
    async fn respond(&self, text: &str) -> String {
        let intent = classify_keywords(text);
        tracing::debug!(?intent, "keyword intent");
        intent.reply().to_string()
    }
}

pub struct LlmIntentResponder {
    llm: Box<dyn LlmProvider>,
}

impl LlmIntentResponder {
    pub fn new(llm: Box<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    pub async fn classify(&self, text: &str) -> Intent {
        match self.llm.chat(SYSTEM_PROMPT, &[Message::user(text)]).await {
            Ok(raw) => parse_intent_response(&raw).unwrap_or_else(|| {
                tracing::warn!("failed to parse LLM intent, using keyword fallback");
                classify_keywords(text)
            }),
            Err(e) => {
                tracing::warn!(error = %e, "LLM intent classification failed, using keyword fallback");
                classify_keywords(text)
            }
        }
    }
}

#[async_trait]
impl IntentResponder for LlmIntentResponder {
    async fn respond(&self, text: &str) -> String {
        let intent = self.classify(text).await;
        tracing::debug!(?intent, "llm intent");
        intent.reply().to_string()
    }
}

fn parse_intent_response(response: &str) -> Option<Intent> {
    let parse = |s: &str| serde_json::from_str::<ClassifiedIntent>(s).ok().map(|c| c.intent);

    if let Some(intent) = parse(response) {
        return Some(intent);
    }

    // Strip markdown code fences
    let trimmed = response.trim();
    let cleaned = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let cleaned = cleaned.strip_suffix("```").unwrap_or(cleaned).trim();

    if let Some(intent) = parse(cleaned) {
        return Some(intent);
    }

    let start = cleaned.find('{')?;
    let end = cleaned.rfind('}')?;
    if start < end {
        parse(&cleaned[start..=end])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedLlm(anyhow::Result<String>);

    #[async_trait]
    impl LlmProvider for FixedLlm {
        async fn chat(&self, _system: &str, _messages: &[Message]) -> anyhow::Result<String> {
            match &self.0 {
                Ok(s) => Ok(s.clone()),
                Err(e) => Err(anyhow::anyhow!("{e}")),
            }
        }
    }

    #[test]
    fn test_parse_valid_json() {
        let parsed = parse_intent_response(r#"{"intent":"reschedule"}"#);
        assert_eq!(parsed, Some(Intent::Reschedule));
    }

    #[test]
    fn test_parse_markdown_fenced_json() {
        let raw = "```json\n{\"intent\":\"cancel_meeting\"}\n```";
        assert_eq!(parse_intent_response(raw), Some(Intent::CancelMeeting));
    }

    #[test]
    fn test_parse_embedded_json() {
        let raw = "Sure! {\"intent\": \"request_time_slot\"} hope that helps";
        assert_eq!(parse_intent_response(raw), Some(Intent::RequestTimeSlot));
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(parse_intent_response("no idea"), None);
        assert_eq!(parse_intent_response(r#"{"intent":"dance"}"#), None);
    }

    #[test]
    fn test_keyword_classification() {
        assert_eq!(classify_keywords("Can we reschedule?"), Intent::Reschedule);
        assert_eq!(classify_keywords("please cancel it"), Intent::CancelMeeting);
        assert_eq!(
            classify_keywords("I'm available between 2 and 4"),
            Intent::OfferAvailability
        );
        assert_eq!(
            classify_keywords("What time slots are open next week?"),
            Intent::RequestTimeSlot
        );
        assert_eq!(classify_keywords("Can we book the interview"), Intent::ScheduleMeeting);
        assert_eq!(classify_keywords("hello there"), Intent::Unknown);
    }

    #[tokio::test]
    async fn test_keyword_responder_reply() {
        let reply = KeywordIntentResponder.respond("hello there").await;
        assert_eq!(reply, Intent::Unknown.reply());
    }

    #[tokio::test]
    async fn test_llm_responder_uses_model_intent() {
        let responder =
            LlmIntentResponder::new(Box::new(FixedLlm(Ok(r#"{"intent":"cancel_meeting"}"#.into()))));
        assert_eq!(responder.classify("hello").await, Intent::CancelMeeting);
    }

    #[tokio::test]
    async fn test_llm_responder_falls_back_on_error() {
        let responder =
            LlmIntentResponder::new(Box::new(FixedLlm(Err(anyhow::anyhow!("offline")))));
        assert_eq!(responder.classify("please reschedule").await, Intent::Reschedule);
        assert_eq!(
            responder.respond("please reschedule").await,
            Intent::Reschedule.reply()
        );
    }

    #[tokio::test]
    async fn test_llm_responder_falls_back_on_unparseable_output() {
        let responder = LlmIntentResponder::new(Box::new(FixedLlm(Ok("hmm".into()))));
        assert_eq!(responder.classify("cancel it").await, Intent::CancelMeeting);
    }
}
