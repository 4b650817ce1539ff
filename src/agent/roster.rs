//! The agency roster: who takes part in a conversation and what they may do.

use std::collections::BTreeSet;

use super::prompt;
use crate::tools::{RESEARCH, WRITE_CONTENT};

pub const USER_PROXY: &str = "user_proxy";
pub const AGENCY_MANAGER: &str = "Agency_Manager";
pub const AGENCY_RESEARCHER: &str = "Agency_Researcher";
pub const AGENCY_STRATEGIST: &str = "Agency_Strategist";
pub const AGENCY_COPYWRITER: &str = "Agency_Copywriter";
pub const WRITING_ASSISTANT: &str = "writing_assistant";
pub const AGENCY_MARKETER: &str = "Agency_Marketer";
pub const AGENCY_MEDIA_PLANNER: &str = "Agency_Media_Planner";
pub const AGENCY_DIRECTOR: &str = "Agency_Director";

/// How a role produces its turns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleKind {
    /// Backed by the model; signs off with the sentinel when done.
    Assistant,
    /// Stands in for the calling user. Never calls the model.
    Proxy {
        /// Automatic replies it will contribute per conversation.
        max_auto_replies: usize,
        /// Text of each automatic reply; empty means the proxy declines.
        default_auto_reply: String,
    },
}

/// A named participant in the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSpec {
    pub name: String,
    pub instruction: String,
    pub tools: BTreeSet<String>,
    pub kind: RoleKind,
}

impl RoleSpec {
    pub fn assistant(name: &str, instruction: String) -> Self {
        Self {
            name: name.to_string(),
            instruction,
            tools: BTreeSet::new(),
            kind: RoleKind::Assistant,
        }
    }

    pub fn proxy(name: &str, instruction: &str, max_auto_replies: usize) -> Self {
        Self {
            name: name.to_string(),
            instruction: instruction.to_string(),
            tools: BTreeSet::new(),
            kind: RoleKind::Proxy {
                max_auto_replies,
                default_auto_reply: String::new(),
            },
        }
    }

    pub fn with_tools(mut self, tools: &[&str]) -> Self {
        self.tools = tools.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Set the text a proxy sends on each automatic reply.
    pub fn with_auto_reply(mut self, reply: &str) -> Self {
        if let RoleKind::Proxy {
            default_auto_reply, ..
        } = &mut self.kind
        {
            *default_auto_reply = reply.to_string();
        }
        self
    }

    pub fn is_proxy(&self) -> bool {
        matches!(self.kind, RoleKind::Proxy { .. })
    }
}

/// Ordered, name-unique set of roles for one conversation.
#[derive(Debug, Clone)]
pub struct Roster {
    roles: Vec<RoleSpec>,
}

impl Roster {
    /// Build a roster, rejecting duplicate names or a missing proxy.
    pub fn new(roles: Vec<RoleSpec>) -> Result<Self, RosterError> {
        let mut seen = BTreeSet::new();
        for role in &roles {
            if !seen.insert(role.name.as_str()) {
                return Err(RosterError::DuplicateName(role.name.clone()));
            }
        }
        if !roles.iter().any(RoleSpec::is_proxy) {
            return Err(RosterError::MissingProxy);
        }
        Ok(Self { roles })
    }

    pub fn roles(&self) -> &[RoleSpec] {
        &self.roles
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.roles.iter().position(|r| r.name == name)
    }

    /// Index of the proxy that seeds the conversation.
    pub fn proxy_index(&self) -> usize {
        self.roles.iter().position(RoleSpec::is_proxy).unwrap_or(0)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("Duplicate role name: {0}")]
    DuplicateName(String),

    #[error("Roster has no proxy role to seed the conversation")]
    MissingProxy,
}

/// Build the nine-role agency for a brand and a goal.
///
/// Descriptors are interpolated as-is; validation happens at the API edge.
pub fn build_roster(brand_task: &str, user_task: &str) -> Roster {
    build_roster_with_reply_cap(brand_task, user_task, DEFAULT_MAX_AUTO_REPLIES)
}

/// Default cap on the proxy's automatic replies.
pub const DEFAULT_MAX_AUTO_REPLIES: usize = 10;

pub fn build_roster_with_reply_cap(
    brand_task: &str,
    user_task: &str,
    max_auto_replies: usize,
) -> Roster {
    let roles = vec![
        RoleSpec::proxy(USER_PROXY, prompt::PROXY_INSTRUCTION, max_auto_replies),
        RoleSpec::assistant(
            AGENCY_MANAGER,
            prompt::manager_instruction(brand_task, user_task),
        ),
        RoleSpec::assistant(AGENCY_RESEARCHER, prompt::researcher_instruction())
            .with_tools(&[RESEARCH]),
        RoleSpec::assistant(
            AGENCY_STRATEGIST,
            prompt::strategist_instruction(brand_task, user_task),
        ),
        RoleSpec::assistant(AGENCY_COPYWRITER, prompt::copywriter_instruction())
            .with_tools(&[WRITE_CONTENT]),
        RoleSpec::assistant(WRITING_ASSISTANT, prompt::writing_assistant_instruction())
            .with_tools(&[RESEARCH, WRITE_CONTENT]),
        RoleSpec::assistant(AGENCY_MARKETER, prompt::marketer_instruction(user_task)),
        RoleSpec::assistant(AGENCY_MEDIA_PLANNER, prompt::media_planner_instruction()),
        RoleSpec::assistant(AGENCY_DIRECTOR, prompt::director_instruction()),
    ];

    Roster { roles }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_nine_uniquely_named_roles() {
        let roster = build_roster("Acme", "Awareness");
        assert_eq!(roster.len(), 9);

        let names: BTreeSet<&str> = roster.roles().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names.len(), 9);
        assert!(names.contains(USER_PROXY));
        assert!(names.contains(AGENCY_DIRECTOR));
        assert_eq!(roster.proxy_index(), 0);
    }

    #[test]
    fn tool_bindings_match_role_duties() {
        let roster = build_roster("Acme", "Awareness");
        let tools_of = |name: &str| {
            roster.roles()[roster.position(name).unwrap()]
                .tools
                .iter()
                .cloned()
                .collect::<Vec<_>>()
        };

        assert_eq!(tools_of(AGENCY_RESEARCHER), vec![RESEARCH]);
        assert_eq!(tools_of(AGENCY_COPYWRITER), vec![WRITE_CONTENT]);
        assert_eq!(tools_of(WRITING_ASSISTANT), vec![RESEARCH, WRITE_CONTENT]);
        assert!(tools_of(AGENCY_MANAGER).is_empty());
        assert!(tools_of(USER_PROXY).is_empty());
    }

    #[test]
    fn assistants_carry_the_sentinel_and_task_descriptors() {
        let roster = build_roster("Acme", "Awareness");
        for role in roster.roles().iter().filter(|r| !r.is_proxy()) {
            assert!(role.instruction.contains("TERMINATE"), "{} lacks sentinel", role.name);
        }

        let manager = &roster.roles()[roster.position(AGENCY_MANAGER).unwrap()];
        assert!(manager.instruction.contains("Acme"));
        assert!(manager.instruction.contains("Awareness"));
    }

    #[test]
    fn proxy_is_automated_with_reply_cap() {
        let roster = build_roster("Acme", "Awareness");
        let proxy = &roster.roles()[0];
        assert_eq!(
            proxy.kind,
            RoleKind::Proxy {
                max_auto_replies: 10,
                default_auto_reply: String::new(),
            }
        );
        assert!(!proxy.instruction.contains("TERMINATE"));
    }

    #[test]
    fn empty_descriptors_are_accepted() {
        let roster = build_roster("", "");
        assert_eq!(roster.len(), 9);
    }

    #[test]
    fn custom_rosters_are_validated() {
        let dup = Roster::new(vec![
            RoleSpec::proxy("p", "", 1),
            RoleSpec::assistant("a", String::new()),
            RoleSpec::assistant("a", String::new()),
        ]);
        assert_eq!(dup.unwrap_err(), RosterError::DuplicateName("a".to_string()));

        let no_proxy = Roster::new(vec![RoleSpec::assistant("a", String::new())]);
        assert_eq!(no_proxy.unwrap_err(), RosterError::MissingProxy);
    }
}
