use bevy::prelude::Resource;
use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::ids::{ActorId, ConnectionId, NodeId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    ConditionAdded,
    ConditionRemoved,
    TraitTriggered,
    OpinionChanged,
    OpinionNegated,
    EffectExpired,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeSubject {
    Actor(ActorId),
    Node(NodeId),
    Connection(ConnectionId),
}

/// Plain notification for the messaging collaborator. Final layout is not
/// the engine's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub turn: u64,
    pub kind: NoticeKind,
    pub subject: NoticeSubject,
    pub text: String,
    pub magnitude: i32,
}

#[derive(Resource, Debug, Default)]
pub struct MessageLog {
    notices: Vec<Notice>,
    subscribers: Vec<Sender<Notice>>,
}

impl MessageLog {
    pub fn push(&mut self, notice: Notice) {
        self.subscribers
            .retain(|subscriber| subscriber.send(notice.clone()).is_ok());
        self.notices.push(notice);
    }

    /// Returns a receiver that sees every notice pushed from now on.
    /// Dropped receivers are pruned on the next push.
    pub fn subscribe(&mut self) -> Receiver<Notice> {
        let (sender, receiver) = unbounded();
        self.subscribers.push(sender);
        receiver
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn notices_for_turn(&self, turn: u64) -> impl Iterator<Item = &Notice> {
        self.notices.iter().filter(move |notice| notice.turn == turn)
    }

    pub fn count_of(&self, kind: NoticeKind) -> usize {
        self.notices
            .iter()
            .filter(|notice| notice.kind == kind)
            .count()
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    pub fn clear(&mut self) {
        self.notices.clear();
    }
}
