// TODO: at some point it may make sense to separate these out. For the mean
// time, however, we send all data through a single channel.

use serde::{Deserialize, Serialize};

/// A message which is sent following a modification made to a bracket. The
/// real-time collaborator (a WebSocket fan-out in the consuming
/// application) forwards these to live score displays.
#[derive(Clone, Debug)]
pub struct Msg {
    pub bracket_id: String,
    pub inner: MsgContents,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub enum MsgContents {
    MatchUpdate {
        match_id: String,
        score_athlete1: i64,
        score_athlete2: i64,
        status: String,
    },
    BracketRegenerated,
    BracketFinished,
}

pub type MsgSender = tokio::sync::broadcast::Sender<Msg>;

pub fn channel() -> (MsgSender, tokio::sync::broadcast::Receiver<Msg>) {
    tokio::sync::broadcast::channel(1000)
}
