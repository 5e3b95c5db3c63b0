/// Audit record of one opinion resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryOpinion {
    pub turn: u64,
    pub requested_change: i32,
    pub resulting_value: i32,
    pub accepted: bool,
    pub descriptor: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEvent {
    pub turn: u64,
    pub text: String,
}

/// Append-only log of what happened to an actor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActorHistory {
    pub(crate) opinions: Vec<HistoryOpinion>,
    pub(crate) events: Vec<HistoryEvent>,
}

impl ActorHistory {
    pub fn record_opinion(&mut self, record: HistoryOpinion) {
        self.opinions.push(record);
    }

    pub fn record_event(&mut self, turn: u64, text: impl Into<String>) {
        self.events.push(HistoryEvent {
            turn,
            text: text.into(),
        });
    }

    pub fn opinions(&self) -> &[HistoryOpinion] {
        &self.opinions
    }

    pub fn events(&self) -> &[HistoryEvent] {
        &self.events
    }

    pub fn last_event(&self) -> Option<&HistoryEvent> {
        self.events.last()
    }

    pub fn negated_count(&self) -> usize {
        self.opinions.iter().filter(|record| !record.accepted).count()
    }

    /// Share of recorded resolutions that were negated, or `None` with no
    /// records yet.
    pub fn negation_rate(&self) -> Option<f64> {
        if self.opinions.is_empty() {
            return None;
        }
        Some(self.negated_count() as f64 / self.opinions.len() as f64)
    }
}
