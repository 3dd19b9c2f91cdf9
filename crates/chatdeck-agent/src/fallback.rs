//! Deterministic local replies for when the completion endpoint fails.

use regex::Regex;
use std::sync::LazyLock;

/// What a message is about, as far as the fallback table can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    /// Pasted markup.
    Html,
    /// Hello and the like.
    Greeting,
    /// Plans, goals and habits.
    Goal,
    /// Tiredness, stress, rest.
    Break,
    /// Requests for a quote or motivation.
    Inspiration,
    /// Anything else.
    General,
}

// Checked in order; the first match wins.
#[allow(clippy::expect_used)]
static RULES: LazyLock<Vec<(Topic, Regex)>> = LazyLock::new(|| {
    [
        (Topic::Html, r"(?i)\bhtml\b"),
        (Topic::Greeting, r"(?i)\b(hi|hello|hey)\b"),
        (Topic::Goal, r"(?i)\bgoals?\b|🎯"),
        (Topic::Break, r"(?i)\bbreak\b|\brelax|🧘"),
        (Topic::Inspiration, r"(?i)\binspir|\bquotes?\b|💬"),
    ]
    .into_iter()
    .map(|(topic, pattern)| (topic, Regex::new(pattern).expect("fallback pattern is valid")))
    .collect()
});

/// Matches a message against the keyword table and answers from it.
#[derive(Debug, Clone)]
pub struct FallbackResponder {
    user_name: String,
}

impl FallbackResponder {
    /// Replies addressed to `user_name`.
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
        }
    }

    /// The first rule in the table that matches `message`.
    pub fn topic(message: &str) -> Topic {
        RULES
            .iter()
            .find(|(_, re)| re.is_match(message))
            .map(|(topic, _)| *topic)
            .unwrap_or(Topic::General)
    }

    /// The canned reply for `message`. Never empty.
    pub fn respond(&self, message: &str) -> String {
        let name = &self.user_name;
        match Self::topic(message) {
            Topic::Html => format!(
                "Happy to help with HTML, {name}! Every page starts from the same skeleton:\n\n\
                 ```html\n<!DOCTYPE html>\n<html>\n<head>\n    <title>My Page</title>\n</head>\n\
                 <body>\n    <h1>Hello World!</h1>\n    <p>This is a paragraph.</p>\n</body>\n</html>\n```\n\n\
                 Which elements would you like to explore next?"
            ),
            Topic::Greeting => format!(
                "Hi there, {name}! Good to see you. What can I help you with today? \
                 Coding questions, ideas, or just a chat all work."
            ),
            Topic::Goal => format!(
                "Great call, {name}! Setting a goal is the first step. Tell me what you want \
                 to achieve and we can break it into small, concrete steps."
            ),
            Topic::Break => format!(
                "Breaks matter, {name}. Try 4-7-8 breathing: inhale for 4 counts, hold for 7, \
                 exhale for 8. Or step away from the screen, stretch, or take a five-minute walk."
            ),
            Topic::Inspiration => format!(
                "Here's one for you, {name}: \"The only impossible journey is the one you never \
                 begin.\" Every expert was once a beginner. What's your next step today?"
            ),
            Topic::General => format!(
                "That's an interesting one, {name}! Could you tell me a bit more about what \
                 you're looking for? I'll do my best to help."
            ),
        }
    }
}
