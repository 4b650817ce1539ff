//! Agent module - the agency conversation.
//!
//! A run goes through four steps:
//! 1. Build the roster of roles from the brand and goal descriptors
//! 2. Seed the conversation with a structured prompt from the proxy role
//! 3. Let roles take turns, running their tools, until a role signs off
//!    with the sentinel or the round cap is reached
//! 4. Hand the transcript to the strategy classifier

mod group_chat;
mod prompt;
mod roster;
mod transcript;

pub use group_chat::{ChatSettings, ConversationError, ConversationOutcome, GroupChat, Termination};
pub use prompt::seed_prompt;
pub use roster::{
    build_roster, build_roster_with_reply_cap, RoleKind, RoleSpec, Roster, RosterError,
    AGENCY_COPYWRITER, AGENCY_DIRECTOR, AGENCY_MANAGER, AGENCY_MARKETER, AGENCY_MEDIA_PLANNER,
    AGENCY_RESEARCHER, AGENCY_STRATEGIST, DEFAULT_MAX_AUTO_REPLIES, USER_PROXY, WRITING_ASSISTANT,
};
pub use transcript::{HistoryEntry, Message, MessageKind, Transcript};

/// Marker a role includes in its final message to end the conversation.
pub const SENTINEL: &str = "TERMINATE";
