use std::collections::HashSet;

use crate::program::{Program, Session, Week};

/// Uid of a session, synthesized from its position when absent.
///
/// An existing non-blank uid is returned unchanged.
pub fn ensure_uid(week: &Week, session: &Session) -> String {
    if has_uid(session) {
        return session.uid.clone();
    }
    positional_uid(week.week, session.session)
}

pub fn positional_uid(week: u32, session: u32) -> String {
    format!("w{week}s{session}")
}

fn has_uid(session: &Session) -> bool {
    !session.uid.trim().is_empty()
}

/// Fill every blank uid, leaving existing ones untouched.
///
/// Sessions are visited in (week, session) order. A synthesized uid that is
/// already taken gets a `-2`, `-3`, ... suffix, so the result is both unique
/// and reproducible for the same input.
pub fn assign_missing_uids(program: &Program) -> Program {
    let mut updated = program.clone();
    assign_missing_uids_in_place(&mut updated);
    updated
}

pub(crate) fn assign_missing_uids_in_place(program: &mut Program) -> usize {
    let mut taken: HashSet<String> = program
        .sessions()
        .filter(|(_, s)| has_uid(s))
        .map(|(_, s)| s.uid.clone())
        .collect();

    let mut assigned = 0;
    for (week_idx, session_idx) in program.chronological_positions() {
        let week = &program.weeks[week_idx];
        let session = &week.sessions[session_idx];
        if has_uid(session) {
            continue;
        }
        let base = ensure_uid(week, session);
        let uid = unique_variant(&base, &taken);
        taken.insert(uid.clone());
        program.weeks[week_idx].sessions[session_idx].uid = uid;
        assigned += 1;
    }
    assigned
}

fn unique_variant(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (2usize..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}
