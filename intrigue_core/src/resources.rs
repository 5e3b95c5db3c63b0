use bevy::prelude::*;

use crate::ids::Side;

/// Current turn and the side whose player is acting. Turn 0 is level setup.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnState {
    pub turn: u64,
    pub acting_side: Side,
}

impl TurnState {
    pub fn new(acting_side: Side) -> Self {
        Self {
            turn: 0,
            acting_side,
        }
    }

    pub fn is_setup(&self) -> bool {
        self.turn == 0
    }
}
