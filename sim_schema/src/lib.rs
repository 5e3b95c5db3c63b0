//! Plain data contracts shared between the intrigue engine and its
//! persistence/presentation collaborators.
//!
//! Nothing in here knows about ECS or gameplay rules. Tags are carried as
//! strings so save files stay readable and survive enum reordering.

use ahash::RandomState;
use serde::{Deserialize, Serialize};
use std::hash::{BuildHasher, Hasher};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct WorldHeader {
    pub turn: u64,
    pub node_count: u32,
    pub connection_count: u32,
    pub actor_count: u32,
    pub hash: u64,
}

impl WorldHeader {
    pub fn new(turn: u64, node_count: usize, connection_count: usize, actor_count: usize) -> Self {
        Self {
            turn,
            node_count: node_count as u32,
            connection_count: connection_count as u32,
            actor_count: actor_count as u32,
            hash: 0,
        }
    }
}

/// One timed modifier as stored on a node or connection ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OngoingEffectState {
    pub id: String,
    pub attribute: String,
    pub magnitude: i32,
    pub remaining_turns: i32,
    #[serde(default)]
    pub origin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeState {
    pub id: u32,
    pub name: String,
    pub stability: i32,
    pub support: i32,
    pub security: i32,
    pub team_flags: u32,
    pub effects: Vec<OngoingEffectState>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionState {
    pub id: u32,
    pub from_node: u32,
    pub to_node: u32,
    pub security_level: u8,
    #[serde(default)]
    pub saved_level: Option<u8>,
    #[serde(default)]
    pub adjusted_this_resolution: bool,
    pub effects: Vec<OngoingEffectState>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConditionState {
    pub tag: String,
    pub is_now_a: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactState {
    pub location: u32,
    pub contact_id: u32,
    pub effectiveness: u8,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryOpinionState {
    pub turn: u64,
    pub requested_change: i32,
    pub resulting_value: i32,
    pub accepted: bool,
    pub descriptor: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEventState {
    pub turn: u64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActorState {
    pub id: u32,
    pub name: String,
    pub side: u8,
    pub influence: i32,
    pub opinion: i32,
    pub discretion: i32,
    pub compatibility: i32,
    pub conditions: Vec<ConditionState>,
    #[serde(default)]
    pub traits: Vec<String>,
    pub secrets: Vec<u32>,
    pub contacts: Vec<ContactState>,
    #[serde(default)]
    pub threatening: bool,
    #[serde(default)]
    pub blackmail_timer: i32,
    pub opinion_history: Vec<HistoryOpinionState>,
    pub history: Vec<HistoryEventState>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct WorldState {
    pub header: WorldHeader,
    pub nodes: Vec<NodeState>,
    pub connections: Vec<ConnectionState>,
    pub actors: Vec<ActorState>,
}

impl WorldState {
    pub fn finalize(mut self) -> Self {
        self.header.node_count = self.nodes.len() as u32;
        self.header.connection_count = self.connections.len() as u32;
        self.header.actor_count = self.actors.len() as u32;
        self.header.hash = hash_world_state(&self);
        self
    }
}

/// Deterministic content hash. The header hash itself is excluded.
pub fn hash_world_state(state: &WorldState) -> u64 {
    let mut clone = state.clone();
    clone.header.hash = 0;
    let encoded = bincode::serialize(&clone).unwrap_or_default();
    let mut hasher = RandomState::with_seeds(0, 0, 0, 0).build_hasher();
    hasher.write(&encoded);
    hasher.finish()
}

pub fn encode_world_state(state: &WorldState) -> bincode::Result<Vec<u8>> {
    bincode::serialize(state)
}

pub fn decode_world_state(data: &[u8]) -> bincode::Result<WorldState> {
    bincode::deserialize(data)
}

pub fn encode_world_state_json(state: &WorldState) -> serde_json::Result<String> {
    serde_json::to_string(state)
}

pub fn decode_world_state_json(data: &str) -> serde_json::Result<WorldState> {
    serde_json::from_str(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> WorldState {
        WorldState {
            header: WorldHeader::new(4, 0, 0, 0),
            nodes: vec![NodeState {
                id: 1,
                name: "Harbour".to_string(),
                stability: 2,
                support: 1,
                security: 3,
                team_flags: 0b101,
                effects: vec![OngoingEffectState {
                    id: "riot".to_string(),
                    attribute: "Stability".to_string(),
                    magnitude: -1,
                    remaining_turns: 2,
                    origin: "Street riot".to_string(),
                }],
            }],
            connections: Vec::new(),
            actors: Vec::new(),
        }
        .finalize()
    }

    #[test]
    fn finalize_fills_counts_and_hash() {
        let state = sample_state();
        assert_eq!(state.header.node_count, 1);
        assert_eq!(state.header.connection_count, 0);
        assert_ne!(state.header.hash, 0, "hash should be populated");
    }

    #[test]
    fn hash_ignores_existing_header_hash() {
        let state = sample_state();
        let mut tampered = state.clone();
        tampered.header.hash = 12345;
        assert_eq!(hash_world_state(&state), hash_world_state(&tampered));
    }

    #[test]
    fn json_decoding_defaults_optional_fields() {
        let json = r#"{
            "id": "lockdown",
            "attribute": "Security",
            "magnitude": 2,
            "remaining_turns": 3
        }"#;
        let effect: OngoingEffectState = serde_json::from_str(json).expect("effect parses");
        assert_eq!(effect.origin, "");
        assert_eq!(effect.magnitude, 2);
    }

    #[test]
    fn bincode_and_json_agree() {
        let state = sample_state();
        let bytes = encode_world_state(&state).expect("encode");
        let json = encode_world_state_json(&state).expect("encode json");
        assert_eq!(decode_world_state(&bytes).expect("decode"), state);
        assert_eq!(decode_world_state_json(&json).expect("decode json"), state);
    }
}
