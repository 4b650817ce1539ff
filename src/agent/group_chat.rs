//! Bounded multi-party conversation among the agency roles.
//!
//! The loop is an explicit state machine: each iteration selects a speaker,
//! lets it take one turn (a message or a decline) and then checks the two
//! terminal conditions, a sentinel in the new message or the round cap.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use super::prompt::speaker_selection_prompt;
use super::roster::{RoleKind, RoleSpec, Roster};
use super::transcript::{preview, Message, MessageKind, Transcript};
use crate::config::{Config, SpeakerSelection};
use crate::llm::{ChatMessage, LlmClient, LlmError};
use crate::tools::ToolRegistry;

#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("Model call failed for {role}: {source}")]
    Llm {
        role: String,
        #[source]
        source: LlmError,
    },

    #[error("Speaker selection failed: {0}")]
    SpeakerSelection(#[source] LlmError),
}

/// Limits and model used for one conversation.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub model: String,
    pub max_round: usize,
    /// Model calls a role may make within one turn while it keeps requesting tools.
    pub max_tool_iterations: usize,
    pub speaker_selection: SpeakerSelection,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            max_round: 20,
            max_tool_iterations: 5,
            speaker_selection: SpeakerSelection::RoundRobin,
        }
    }
}

impl ChatSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.llm.model.clone(),
            max_round: config.conversation.max_round,
            max_tool_iterations: config.conversation.max_tool_iterations,
            speaker_selection: config.conversation.speaker_selection,
        }
    }
}

/// Why a conversation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    Sentinel,
    RoundLimit,
}

#[derive(Debug)]
pub struct ConversationOutcome {
    pub transcript: Transcript,
    pub rounds: usize,
    pub termination: Termination,
}

/// Loop state between turns.
#[derive(Debug)]
struct ConversationState {
    round: usize,
    active: usize,
    termination: Option<Termination>,
    proxy_replies: usize,
}

impl ConversationState {
    fn new(seed_speaker: usize, max_round: usize, seed_terminates: bool) -> Self {
        let termination = if seed_terminates {
            Some(Termination::Sentinel)
        } else {
            (max_round == 0).then_some(Termination::RoundLimit)
        };

        Self {
            round: 0,
            active: seed_speaker,
            termination,
            proxy_replies: 0,
        }
    }

    fn begin_turn(&mut self, speaker: usize) {
        self.round += 1;
        self.active = speaker;
    }

    fn complete_turn(&mut self, sentinel_seen: bool, max_round: usize) {
        if sentinel_seen {
            self.termination = Some(Termination::Sentinel);
        } else if self.round >= max_round {
            self.termination = Some(Termination::RoundLimit);
        }
    }
}

enum Turn {
    Spoke(Message),
    Declined,
}

pub struct GroupChat {
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
    settings: ChatSettings,
}

impl GroupChat {
    pub fn new(llm: Arc<dyn LlmClient>, tools: ToolRegistry, settings: ChatSettings) -> Self {
        Self {
            llm,
            tools,
            settings,
        }
    }

    /// Run a conversation seeded by the roster's proxy with `seed`.
    pub async fn run(
        &self,
        roster: &Roster,
        seed: &str,
    ) -> Result<ConversationOutcome, ConversationError> {
        let run_id = Uuid::new_v4();
        let max_round = self.settings.max_round;
        let proxy = roster.proxy_index();

        let seed_message = Message::new(
            roster.roles()[proxy].name.clone(),
            MessageKind::User,
            Some(seed.to_string()),
        );
        let seed_terminates = seed_message.contains_sentinel();

        let mut transcript = Transcript::new();
        transcript.push(seed_message);

        tracing::info!(%run_id, roles = roster.len(), max_round, "Starting conversation");
        if seed_terminates {
            tracing::warn!(%run_id, "Seed message carries the sentinel; no turns will run");
        }

        let mut state = ConversationState::new(proxy, max_round, seed_terminates);
        while state.termination.is_none() {
            let speaker = self.select_speaker(roster, &transcript, state.active).await?;
            state.begin_turn(speaker);

            let role = &roster.roles()[speaker];
            tracing::debug!(%run_id, round = state.round, speaker = %role.name, "Turn started");

            let sentinel_seen = match self.take_turn(role, &transcript, &mut state).await? {
                Turn::Spoke(message) => {
                    tracing::debug!(
                        %run_id,
                        speaker = %role.name,
                        preview = %preview(message.content.as_deref().unwrap_or_default(), 100),
                        "Message appended"
                    );
                    let sentinel_seen = message.contains_sentinel();
                    transcript.push(message);
                    sentinel_seen
                }
                Turn::Declined => {
                    tracing::debug!(%run_id, speaker = %role.name, "Turn declined");
                    false
                }
            };

            state.complete_turn(sentinel_seen, max_round);
        }

        let termination = state.termination.unwrap_or(Termination::RoundLimit);
        tracing::info!(
            %run_id,
            rounds = state.round,
            messages = transcript.len(),
            ?termination,
            "Conversation finished"
        );

        Ok(ConversationOutcome {
            transcript,
            rounds: state.round,
            termination,
        })
    }

    async fn select_speaker(
        &self,
        roster: &Roster,
        transcript: &Transcript,
        last: usize,
    ) -> Result<usize, ConversationError> {
        let next = (last + 1) % roster.len();

        if self.settings.speaker_selection == SpeakerSelection::RoundRobin {
            return Ok(next);
        }

        let roles: Vec<(&str, &str)> = roster
            .roles()
            .iter()
            .map(|r| (r.name.as_str(), r.instruction.as_str()))
            .collect();

        let mut messages = vec![ChatMessage::system(speaker_selection_prompt(&roles))];
        messages.extend(transcript.context_for(""));

        let response = self
            .llm
            .chat_completion(&self.settings.model, &messages, None)
            .await
            .map_err(ConversationError::SpeakerSelection)?;

        let chosen = response
            .content
            .as_deref()
            .and_then(|answer| match_role(roster, answer));

        match chosen {
            Some(index) if !(roster.roles()[index].is_proxy() && roster.roles()[last].is_proxy()) => {
                Ok(index)
            }
            _ => {
                tracing::debug!(answer = ?response.content, "No usable speaker named; using round robin");
                Ok(next)
            }
        }
    }

    async fn take_turn(
        &self,
        role: &RoleSpec,
        transcript: &Transcript,
        state: &mut ConversationState,
    ) -> Result<Turn, ConversationError> {
        match &role.kind {
            RoleKind::Proxy {
                max_auto_replies,
                default_auto_reply,
            } => {
                if default_auto_reply.is_empty() || state.proxy_replies >= *max_auto_replies {
                    return Ok(Turn::Declined);
                }
                state.proxy_replies += 1;
                Ok(Turn::Spoke(Message::new(
                    role.name.clone(),
                    MessageKind::User,
                    Some(default_auto_reply.clone()),
                )))
            }
            RoleKind::Assistant => self.assistant_turn(role, transcript).await,
        }
    }

    /// Call the model for `role`, running any tools it requests, and fold the
    /// replies and tool results into a single message.
    async fn assistant_turn(
        &self,
        role: &RoleSpec,
        transcript: &Transcript,
    ) -> Result<Turn, ConversationError> {
        let mut messages = vec![ChatMessage::system(role.instruction.clone())];
        messages.extend(transcript.context_for(&role.name));

        let schemas = self.tools.schemas_for(&role.tools);
        let tools = (!schemas.is_empty()).then_some(schemas.as_slice());

        let mut parts: Vec<String> = Vec::new();

        for iteration in 0..self.settings.max_tool_iterations.max(1) {
            tracing::debug!("{} model call {}", role.name, iteration + 1);

            let response = self
                .llm
                .chat_completion(&self.settings.model, &messages, tools)
                .await
                .map_err(|source| ConversationError::Llm {
                    role: role.name.clone(),
                    source,
                })?;

            if let Some(text) = response.content.as_deref().filter(|t| !t.trim().is_empty()) {
                parts.push(text.to_string());
            }

            let calls = response.requested_tools();
            if calls.is_empty() {
                break;
            }

            messages.push(ChatMessage::assistant(
                response.content.clone(),
                Some(calls.to_vec()),
            ));

            for call in calls {
                let result = self.tools.invoke(&role.tools, call).await;
                messages.push(ChatMessage::tool_result(&call.id, result.to_string()));
                parts.push(fold_tool_result(&call.function.name, &result));
            }
        }

        if parts.is_empty() {
            return Ok(Turn::Declined);
        }

        Ok(Turn::Spoke(Message::new(
            role.name.clone(),
            MessageKind::Assistant,
            Some(parts.join("\n\n")),
        )))
    }
}

/// The role whose name appears earliest in `answer`.
fn match_role(roster: &Roster, answer: &str) -> Option<usize> {
    roster
        .roles()
        .iter()
        .enumerate()
        .filter_map(|(index, role)| answer.find(role.name.as_str()).map(|pos| (pos, index)))
        .min()
        .map(|(_, index)| index)
}

fn fold_tool_result(tool: &str, result: &Value) -> String {
    let rendered = serde_json::to_string_pretty(result).unwrap_or_else(|_| result.to_string());
    format!("***** Resultado de {} *****\n{}", tool, rendered)
}
