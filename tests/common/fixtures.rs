//! Response bodies for the fake `currently-playing` endpoint

use serde_json::{json, Value};

/// A playing track by the given artist ids, first artist first.
pub fn playing_track(track_id: &str, artist_ids: &[&str]) -> Value {
    let artists: Vec<Value> = artist_ids
        .iter()
        .map(|id| {
            json!({
                "id": id,
                "name": format!("Artist {}", id),
                "uri": format!("spotify:artist:{}", id),
                "type": "artist",
            })
        })
        .collect();

    json!({
        "timestamp": 1700000000000u64,
        "progress_ms": 1000,
        "is_playing": true,
        "currently_playing_type": "track",
        "item": {
            "id": track_id,
            "name": format!("Track {}", track_id),
            "uri": format!("spotify:track:{}", track_id),
            "type": "track",
            "artists": artists,
        },
    })
}

/// A podcast episode, which has no artists.
pub fn playing_episode(episode_id: &str) -> Value {
    json!({
        "is_playing": true,
        "currently_playing_type": "episode",
        "item": {
            "id": episode_id,
            "name": "An episode",
            "uri": format!("spotify:episode:{}", episode_id),
            "type": "episode",
        },
    })
}
