//! Snapshot data model mirrored from the daemon's wire protocol.
//!
//! Sentinel conventions are inherited verbatim from the daemon and must not
//! be redesigned: a negative ratio means "infinite", and -1 for a speed,
//! connection, or slot cap means "unlimited".

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Hex-encoded infohash uniquely naming a torrent.
///
/// Stable for the lifetime of the torrent and never reused after removal;
/// serves as the primary key of every snapshot mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InfoHash(String);

impl InfoHash {
    /// Creates an InfoHash from its hex string form.
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Returns the underlying hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InfoHash {
    fn from(hash: &str) -> Self {
        Self(hash.to_string())
    }
}

/// Lifecycle state of a torrent as reported by the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TorrentState {
    Allocating,
    Checking,
    Downloading,
    Seeding,
    Paused,
    Error,
    Queued,
    Moving,
}

impl TorrentState {
    /// Returns the wire string for this state.
    pub fn as_str(self) -> &'static str {
        match self {
            TorrentState::Allocating => "Allocating",
            TorrentState::Checking => "Checking",
            TorrentState::Downloading => "Downloading",
            TorrentState::Seeding => "Seeding",
            TorrentState::Paused => "Paused",
            TorrentState::Error => "Error",
            TorrentState::Queued => "Queued",
            TorrentState::Moving => "Moving",
        }
    }
}

impl fmt::Display for TorrentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State facet usable in a list filter.
///
/// `All` and `Active` are pseudo-states understood only by the filter
/// layer; `All` means "unrestricted" and is never sent to the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterState {
    #[default]
    All,
    Active,
    Downloading,
    Seeding,
    Paused,
    Checking,
    Error,
    Queued,
}

impl FilterState {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterState::All => "All",
            FilterState::Active => "Active",
            FilterState::Downloading => "Downloading",
            FilterState::Seeding => "Seeding",
            FilterState::Paused => "Paused",
            FilterState::Checking => "Checking",
            FilterState::Error => "Error",
            FilterState::Queued => "Queued",
        }
    }
}

/// Server-side list filter: zero or more exact-match facets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FilterCriteria {
    pub state: FilterState,
    pub tracker_host: Option<String>,
    pub label: Option<String>,
}

impl FilterCriteria {
    /// Builds the filter dictionary sent to `web.update_ui`.
    ///
    /// The `All` sentinel means "unset" and is omitted entirely rather
    /// than serialized.
    pub fn to_filter_dict(&self) -> Map<String, Value> {
        let mut dict = Map::new();
        if self.state != FilterState::All {
            dict.insert("state".to_string(), Value::from(self.state.as_str()));
        }
        if let Some(tracker) = &self.tracker_host {
            dict.insert("tracker_host".to_string(), Value::from(tracker.as_str()));
        }
        if let Some(label) = &self.label {
            dict.insert("label".to_string(), Value::from(label.as_str()));
        }
        dict
    }
}

/// Status keys requested from the daemon for every torrent entry.
pub const TORRENT_FIELDS: &[&str] = &[
    "hash",
    "name",
    "state",
    "progress",
    "total_size",
    "download_payload_rate",
    "upload_payload_rate",
    "eta",
    "ratio",
    "num_seeds",
    "total_seeds",
    "num_peers",
    "total_peers",
    "save_path",
    "time_added",
    "tracker_host",
    "label",
    "is_auto_managed",
    "max_download_speed",
    "max_upload_speed",
    "max_connections",
    "max_upload_slots",
    "total_done",
    "total_uploaded",
    "total_wanted",
    "completed_time",
    "active_time",
    "seeding_time",
    "comment",
    "message",
    "queue",
];

/// Full per-torrent record, replaced wholesale on every poll.
///
/// Entries are never partially merged: a hash's entry is a full replace,
/// and a hash absent from a poll result is an implicit deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TorrentStatus {
    #[serde(default)]
    pub hash: String,
    pub name: String,
    pub state: TorrentState,
    /// Completion percentage, 0-100
    pub progress: f64,
    pub total_size: u64,
    pub download_payload_rate: f64,
    pub upload_payload_rate: f64,
    /// Seconds remaining; non-positive means unknown
    #[serde(default)]
    pub eta: f64,
    /// Uploaded / downloaded; negative means infinite
    pub ratio: f64,
    pub num_seeds: i64,
    pub total_seeds: i64,
    pub num_peers: i64,
    pub total_peers: i64,
    pub save_path: String,
    #[serde(default)]
    pub time_added: i64,
    #[serde(default)]
    pub tracker_host: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub is_auto_managed: bool,
    /// KiB/s cap; -1 means unlimited
    #[serde(default = "unlimited")]
    pub max_download_speed: f64,
    /// KiB/s cap; -1 means unlimited
    #[serde(default = "unlimited")]
    pub max_upload_speed: f64,
    /// -1 means unlimited
    #[serde(default = "unlimited_count")]
    pub max_connections: i64,
    /// -1 means unlimited
    #[serde(default = "unlimited_count")]
    pub max_upload_slots: i64,
    #[serde(default)]
    pub total_done: u64,
    #[serde(default)]
    pub total_uploaded: u64,
    #[serde(default)]
    pub total_wanted: u64,
    #[serde(default)]
    pub completed_time: i64,
    #[serde(default)]
    pub active_time: i64,
    #[serde(default)]
    pub seeding_time: i64,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub message: String,
    /// Queue position; -1 means not queued
    #[serde(default = "unlimited_count")]
    pub queue: i64,
}

fn unlimited() -> f64 {
    -1.0
}

fn unlimited_count() -> i64 {
    -1
}

/// Aggregate daemon state, fully replaced each poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalStats {
    pub upload_rate: f64,
    pub download_rate: f64,
    /// KiB/s cap; -1 means unlimited
    #[serde(default = "unlimited")]
    pub max_upload: f64,
    /// KiB/s cap; -1 means unlimited
    #[serde(default = "unlimited")]
    pub max_download: f64,
    #[serde(default)]
    pub num_connections: i64,
    #[serde(default = "unlimited_count")]
    pub max_num_connections: i64,
    #[serde(default)]
    pub upload_protocol_rate: f64,
    #[serde(default)]
    pub download_protocol_rate: f64,
    #[serde(default)]
    pub dht_nodes: i64,
    #[serde(default)]
    pub free_space: i64,
    #[serde(default)]
    pub has_incoming_connections: bool,
}

/// Per-facet (label, count) listings reported alongside a poll.
///
/// Order follows the daemon's reply and is kept only for stable
/// iteration; it carries no correctness meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterFacets {
    #[serde(default)]
    pub state: Vec<(String, i64)>,
    #[serde(default)]
    pub tracker_host: Vec<(String, i64)>,
    #[serde(default)]
    pub label: Option<Vec<(String, i64)>>,
}

/// The unit exchanged per poll: connectivity flag, full torrent mapping,
/// optional filter facets, and global stats. Immutable once produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncSnapshot {
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub torrents: HashMap<InfoHash, TorrentStatus>,
    #[serde(default)]
    pub filters: Option<FilterFacets>,
    #[serde(default)]
    pub stats: GlobalStats,
}

/// One connected peer of a torrent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerInfo {
    pub ip: String,
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub down_speed: f64,
    #[serde(default)]
    pub up_speed: f64,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub seed: i64,
}

/// One tracker of a torrent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerEntry {
    pub url: String,
    #[serde(default)]
    pub tier: i64,
}

/// Torrent creation metadata used for report generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TorrentMetaInfo {
    #[serde(default)]
    pub num_pieces: u64,
    #[serde(default)]
    pub piece_length: u64,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub creation_date: i64,
    #[serde(default)]
    pub trackers: Vec<TrackerEntry>,
}

#[cfg(test)]
mod state_tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_filter_dict_omits_all_sentinel() {
        let filter = FilterCriteria::default();
        assert!(filter.to_filter_dict().is_empty());

        let filter = FilterCriteria {
            state: FilterState::Downloading,
            tracker_host: Some("tracker.example.com".to_string()),
            label: None,
        };
        let dict = filter.to_filter_dict();
        assert_eq!(dict.get("state"), Some(&json!("Downloading")));
        assert_eq!(dict.get("tracker_host"), Some(&json!("tracker.example.com")));
        assert!(!dict.contains_key("label"));
    }

    #[test]
    fn test_snapshot_deserializes_update_ui_result() {
        let body = json!({
            "connected": true,
            "torrents": {
                "abc123": {
                    "hash": "abc123",
                    "name": "debian-12.iso",
                    "state": "Downloading",
                    "progress": 42.5,
                    "total_size": 4_000_000_000u64,
                    "download_payload_rate": 1_500_000.0,
                    "upload_payload_rate": 64_000.0,
                    "eta": 1740.0,
                    "ratio": -1.0,
                    "num_seeds": 12,
                    "total_seeds": 80,
                    "num_peers": 4,
                    "total_peers": 30,
                    "save_path": "/data/torrents",
                    "tracker_host": "tracker.example.com",
                    "queue": 0
                }
            },
            "filters": {
                "state": [["All", 1], ["Downloading", 1]],
                "tracker_host": [["All", 1], ["tracker.example.com", 1]]
            },
            "stats": {
                "upload_rate": 64_000.0,
                "download_rate": 1_500_000.0,
                "max_upload": -1.0,
                "max_download": -1.0,
                "num_connections": 16,
                "max_num_connections": 200,
                "dht_nodes": 312,
                "free_space": 900_000_000,
                "has_incoming_connections": true
            }
        });

        let snapshot: SyncSnapshot = serde_json::from_value(body).unwrap();
        assert!(snapshot.connected);
        let torrent = &snapshot.torrents[&InfoHash::from("abc123")];
        assert_eq!(torrent.state, TorrentState::Downloading);
        assert_eq!(torrent.progress, 42.5);
        assert_eq!(torrent.ratio, -1.0);
        // Defaults fill fields the daemon omitted
        assert_eq!(torrent.max_download_speed, -1.0);
        assert_eq!(torrent.max_upload_slots, -1);
        let facets = snapshot.filters.unwrap();
        assert_eq!(facets.state[0], ("All".to_string(), 1));
        assert_eq!(snapshot.stats.dht_nodes, 312);
    }

    #[test]
    fn test_torrent_state_round_trips_wire_strings() {
        for state in [
            TorrentState::Downloading,
            TorrentState::Seeding,
            TorrentState::Paused,
            TorrentState::Checking,
            TorrentState::Error,
            TorrentState::Queued,
        ] {
            let wire = serde_json::to_value(state).unwrap();
            assert_eq!(wire, json!(state.as_str()));
        }
    }

    #[test]
    fn test_info_hash_display() {
        let hash = InfoHash::from("0123456789abcdef0123456789abcdef01234567");
        assert_eq!(hash.to_string(), "0123456789abcdef0123456789abcdef01234567");
    }
}
