//! The agency: one conversation per request, classified into a strategy.

use std::sync::Arc;

use crate::agent::{build_roster_with_reply_cap, seed_prompt, ChatSettings, ConversationError, GroupChat};
use crate::config::Config;
use crate::llm::{LlmError, OpenAiClient};
use crate::strategy::{format_strategy, Classification};
use crate::tools::{SerperClient, ToolRegistry};

pub struct Agency {
    chat: GroupChat,
    max_auto_replies: usize,
}

impl Agency {
    /// Wire the agency to the configured model API and search provider.
    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        let llm = Arc::new(OpenAiClient::new(&config.llm)?);
        let search = Arc::new(SerperClient::new(&config.search));
        let chat = GroupChat::new(llm, ToolRegistry::new(search), ChatSettings::from_config(config));
        Ok(Self::new(chat, config.conversation.max_consecutive_auto_reply))
    }

    pub fn new(chat: GroupChat, max_auto_replies: usize) -> Self {
        Self {
            chat,
            max_auto_replies,
        }
    }

    /// Run the agency conversation for a brand and a goal and classify it.
    pub async fn develop_strategy(
        &self,
        brand_task: &str,
        user_task: &str,
    ) -> Result<Classification, ConversationError> {
        tracing::info!(brand = brand_task, goal = user_task, "Starting analysis");

        let roster = build_roster_with_reply_cap(brand_task, user_task, self.max_auto_replies);
        let seed = seed_prompt(brand_task, user_task);

        let outcome = self.chat.run(&roster, &seed).await?;
        let history = outcome.transcript.history();
        tracing::info!(
            messages = history.len(),
            rounds = outcome.rounds,
            termination = ?outcome.termination,
            "Chat finished"
        );

        let classification = format_strategy(&history);
        tracing::info!(
            has_content = classification.strategy.has_content(),
            dropped = classification.dropped,
            "Strategy formatted"
        );

        Ok(classification)
    }
}
