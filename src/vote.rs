use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ballot {
    Yes,
    No,
}

/// Running count sent to the room as `clearCanvasVote`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub yes: usize,
    pub no: usize,
    pub total: usize,
    pub quorum: usize,
}

impl Tally {
    /// Yes strictly ahead of no, and at least half the room has voted.
    pub fn carries(&self) -> bool {
        self.yes > self.no && self.yes + self.no >= self.quorum
    }
}

/// Half the room, rounded up. An empty room has a quorum of 0.
pub fn quorum(total: usize) -> usize {
    total.div_ceil(2)
}

/// One clear-canvas round. Membership is fixed when the round opens, so
/// joins and leaves during voting do not move the quorum.
#[derive(Debug, Clone, Default)]
pub struct VoteRound {
    ballots: HashMap<String, Ballot>,
    total: usize,
}

impl VoteRound {
    pub fn open(total: usize) -> Self {
        Self { ballots: HashMap::new(), total }
    }

    /// Records `who`'s latest ballot, replacing any earlier one.
    pub fn cast(&mut self, who: impl Into<String>, ballot: Ballot) -> Tally {
        self.ballots.insert(who.into(), ballot);
        self.tally()
    }

    pub fn tally(&self) -> Tally {
        let yes = self.ballots.values().filter(|b| **b == Ballot::Yes).count();
        Tally {
            yes,
            no: self.ballots.len() - yes,
            total: self.total,
            quorum: quorum(self.total),
        }
    }
}
