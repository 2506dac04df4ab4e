use crate::matcher;
use crate::sports::{Candidate, FavoriteTeam, RawEvent};
use crate::window::ViewingWindow;
use chrono_tz::Tz;

/// Every (favorite, event) pairing that passes both the team match and the
/// window overlap. An event is attributed only to the best-ranked favorite
/// that plays in it.
pub fn collect_candidates(
    events: &[RawEvent],
    favorites: &[FavoriteTeam],
    window: &ViewingWindow,
    tz: Tz,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for event in events {
        for fav in favorites {
            if !matcher::league_matches(&event.league_id, &fav.league_id) {
                continue;
            }
            if matcher::first_match(&event.participants, fav, &event.league_id).is_none() {
                continue;
            }
            if window.overlaps(event.start, tz) {
                candidates.push(Candidate {
                    favorite: fav.clone(),
                    event: event.clone(),
                });
                break;
            }
        }
    }

    candidates
}

/// Best candidate for one day: lowest rank, then earliest start.
pub fn select_winner(
    events: &[RawEvent],
    favorites: &[FavoriteTeam],
    window: &ViewingWindow,
    tz: Tz,
) -> Option<Candidate> {
    let mut candidates = collect_candidates(events, favorites, window, tz);
    candidates.sort_by(|a, b| a.rank().cmp(&b.rank()).then(a.event.start.cmp(&b.event.start)));
    candidates.into_iter().next()
}
