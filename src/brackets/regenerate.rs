//! The regeneration coordinator: discards and rebuilds a pending bracket's
//! match set from the current participant seed order.

use diesel::{
    Connection, connection::LoadConnection, prelude::*, sqlite::Sqlite,
};

use crate::{
    error::BracketError,
    msg::{Msg, MsgContents, MsgSender},
    schema::{bracket_matches, brackets},
};

use super::{
    Bracket, BracketMatch, KIND_ROUND_ROBIN, KIND_SINGLE_ELIMINATION,
    elimination, progression::MatchSet, repechage, repechage::LadderShape,
    round_robin, seeding,
};

/// Rebuilds all matches for a bracket which has not started, from the
/// participants' current seed order. Deterministic: regenerating twice with
/// unchanged participants yields structurally identical match sets (row ids
/// differ, pairings and shape do not).
///
/// A bracket counts as started once any match holds a recorded score.
/// Builder-produced byes are finished matches too, but carry no result, so
/// they do not block regeneration; a bracket whose rebuilt set is entirely
/// byes moves straight to finished (and, holding no results, remains
/// rebuildable).
pub fn regenerate(
    bracket_id: &str,
    msgs: &MsgSender,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> Result<(), BracketError> {
    let span = tracing::span!(
        tracing::Level::INFO,
        "regenerate",
        bracket_id = bracket_id
    );
    let _guard = span.enter();

    let finished = conn.transaction(|conn| -> Result<bool, BracketError> {
        let bracket = Bracket::fetch(bracket_id, conn)?;

        if bracket.status == "S" {
            return Err(BracketError::BracketAlreadyStarted);
        }
        let scored: i64 = bracket_matches::table
            .filter(bracket_matches::bracket_id.eq(&bracket.id))
            .filter(bracket_matches::status.eq("F"))
            .count()
            .get_result(conn)?;
        if scored > 0 {
            return Err(BracketError::BracketAlreadyStarted);
        }

        let participants = bracket.participants(conn)?;
        let skeleton = build_skeleton(&bracket, &participants)?;

        diesel::delete(
            bracket_matches::table
                .filter(bracket_matches::bracket_id.eq(&bracket.id)),
        )
        .execute(conn)?;

        let rows: Vec<_> = skeleton
            .iter()
            .map(|m| {
                (
                    bracket_matches::id.eq(&m.id),
                    bracket_matches::bracket_id.eq(&m.bracket_id),
                    bracket_matches::round_number.eq(m.round_number),
                    bracket_matches::position.eq(m.position),
                    bracket_matches::round_type.eq(&m.round_type),
                    bracket_matches::repechage_step.eq(m.repechage_step),
                    bracket_matches::athlete1.eq(&m.athlete1),
                    bracket_matches::athlete2.eq(&m.athlete2),
                    bracket_matches::is_finished.eq(m.is_finished),
                    bracket_matches::status.eq(&m.status),
                )
            })
            .collect();
        diesel::insert_into(bracket_matches::table)
            .values(&rows)
            .execute(conn)?;

        // resolve the byes the builders leave unplayed
        let mut set = MatchSet::load(&bracket, conn)?;
        set.cascade_all()?;
        set.flush(conn)?;

        // a set that is all byes will never see a submission, so the
        // status transition happens here
        let finished = set.all_finished();
        let status = if finished { "F" } else { "P" };
        if bracket.status != status {
            diesel::update(
                brackets::table.filter(brackets::id.eq(&bracket.id)),
            )
            .set(brackets::status.eq(status))
            .execute(conn)?;
        }

        tracing::debug!(matches = skeleton.len(), "bracket regenerated");
        Ok(finished)
    })?;

    let _ = msgs.send(Msg {
        bracket_id: bracket_id.to_string(),
        inner: MsgContents::BracketRegenerated,
    });
    if finished {
        let _ = msgs.send(Msg {
            bracket_id: bracket_id.to_string(),
            inner: MsgContents::BracketFinished,
        });
    }

    Ok(())
}

fn build_skeleton(
    bracket: &Bracket,
    participants: &[super::Participant],
) -> Result<Vec<BracketMatch>, BracketError> {
    match bracket.kind.as_str() {
        KIND_SINGLE_ELIMINATION => {
            let slots = seeding::seed_slots(participants)?;
            let mut matches = elimination::skeleton(&bracket.id, &slots);
            if bracket.repechage
                && let Some(shape) =
                    LadderShape::of(elimination::total_rounds(slots.len()))
            {
                matches.extend(repechage::skeleton(&bracket.id, shape));
            }
            Ok(matches)
        }
        KIND_ROUND_ROBIN => round_robin::schedule(&bracket.id, participants),
        other => Err(BracketError::Internal(format!(
            "unknown bracket kind `{other}`"
        ))),
    }
}
