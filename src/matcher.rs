//! League-gated team matching.
//!
//! Every favorite carries its own `TeamRule`; nothing here knows about
//! particular teams. A participant matches when the league agrees and either
//! its display name contains one of the rule's fragments or its abbreviation
//! equals one of the rule's codes (both case-insensitive).

use crate::sports::{FavoriteTeam, RawParticipant};

/// Leagues are compared as ESPN paths ("baseball/mlb"), ignoring case and stray slashes.
pub fn league_matches(event_league: &str, favorite_league: &str) -> bool {
    let a = event_league.trim().trim_matches('/');
    let b = favorite_league.trim().trim_matches('/');
    !a.is_empty() && a.eq_ignore_ascii_case(b)
}

pub fn matches(participant: &RawParticipant, favorite: &FavoriteTeam, league_id: &str) -> bool {
    if !league_matches(league_id, &favorite.league_id) {
        return false;
    }

    let name = participant.display_name.trim().to_lowercase();
    let abbr = participant.abbreviation.trim().to_uppercase();

    let name_hit = !name.is_empty()
        && favorite
            .rule
            .name_fragments
            .iter()
            .any(|fragment| {
                let fragment = fragment.trim().to_lowercase();
                !fragment.is_empty() && name.contains(&fragment)
            });

    // Rules may come from serde rather than TeamRule::new, so fold case here too
    let abbr_hit = !abbr.is_empty()
        && favorite
            .rule
            .abbreviations
            .iter()
            .any(|code| code.trim().eq_ignore_ascii_case(&abbr));

    name_hit || abbr_hit
}

/// Index of the first participant that matches `favorite`, if any.
pub fn first_match(participants: &[RawParticipant], favorite: &FavoriteTeam, league_id: &str) -> Option<usize> {
    participants
        .iter()
        .position(|p| matches(p, favorite, league_id))
}
