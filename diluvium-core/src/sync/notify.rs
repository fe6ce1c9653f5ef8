//! Download completion detection across successive snapshots.

use std::collections::HashMap;

use super::state::{InfoHash, TorrentState, TorrentStatus};

/// Returns hashes whose state transitioned Downloading -> Seeding between
/// two successive torrent mappings.
///
/// Hashes absent from the previous mapping never fire. The result is
/// sorted for stable consumption.
pub fn detect_completions(
    previous: &HashMap<InfoHash, TorrentState>,
    current: &HashMap<InfoHash, TorrentStatus>,
) -> Vec<InfoHash> {
    let mut completed: Vec<InfoHash> = current
        .iter()
        .filter(|(hash, torrent)| {
            torrent.state == TorrentState::Seeding
                && previous.get(hash) == Some(&TorrentState::Downloading)
        })
        .map(|(hash, _)| hash.clone())
        .collect();
    completed.sort();
    completed
}

/// Stateful edge detector fed once per applied poll.
///
/// The very first observation after (re)initialization only records the
/// baseline and reports nothing, so torrents that were already seeding
/// when the client started do not produce spurious completion signals.
#[derive(Debug, Default)]
pub struct CompletionDetector {
    previous: HashMap<InfoHash, TorrentState>,
    primed: bool,
}

impl CompletionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observes the latest torrent mapping and returns newly completed hashes.
    pub fn observe(&mut self, torrents: &HashMap<InfoHash, TorrentStatus>) -> Vec<InfoHash> {
        let snapshot: HashMap<InfoHash, TorrentState> = torrents
            .iter()
            .map(|(hash, torrent)| (hash.clone(), torrent.state))
            .collect();

        if !self.primed {
            self.previous = snapshot;
            self.primed = true;
            return Vec::new();
        }

        let completed = detect_completions(&self.previous, torrents);
        self.previous = snapshot;
        completed
    }

    /// Discards the baseline, as on a full client reload.
    pub fn reset(&mut self) {
        self.previous.clear();
        self.primed = false;
    }
}

#[cfg(test)]
mod notify_tests {
    use super::*;

    fn torrent(state: TorrentState) -> TorrentStatus {
        TorrentStatus {
            hash: String::new(),
            name: "t".to_string(),
            state,
            progress: 100.0,
            total_size: 1,
            download_payload_rate: 0.0,
            upload_payload_rate: 0.0,
            eta: 0.0,
            ratio: 0.0,
            num_seeds: 0,
            total_seeds: 0,
            num_peers: 0,
            total_peers: 0,
            save_path: String::new(),
            time_added: 0,
            tracker_host: String::new(),
            label: String::new(),
            is_auto_managed: false,
            max_download_speed: -1.0,
            max_upload_speed: -1.0,
            max_connections: -1,
            max_upload_slots: -1,
            total_done: 0,
            total_uploaded: 0,
            total_wanted: 0,
            completed_time: 0,
            active_time: 0,
            seeding_time: 0,
            comment: String::new(),
            message: String::new(),
            queue: -1,
        }
    }

    fn mapping(entries: &[(&str, TorrentState)]) -> HashMap<InfoHash, TorrentStatus> {
        entries
            .iter()
            .map(|(hash, state)| (InfoHash::from(*hash), torrent(*state)))
            .collect()
    }

    #[test]
    fn test_first_observation_reports_nothing() {
        let mut detector = CompletionDetector::new();
        let completed = detector.observe(&mapping(&[("abc", TorrentState::Seeding)]));
        assert!(completed.is_empty());
    }

    #[test]
    fn test_downloading_to_seeding_edge_fires() {
        let mut detector = CompletionDetector::new();
        detector.observe(&mapping(&[("abc", TorrentState::Downloading)]));
        let completed = detector.observe(&mapping(&[("abc", TorrentState::Seeding)]));
        assert_eq!(completed, vec![InfoHash::from("abc")]);
    }

    #[test]
    fn test_steady_seeding_does_not_refire() {
        let mut detector = CompletionDetector::new();
        detector.observe(&mapping(&[("abc", TorrentState::Downloading)]));
        detector.observe(&mapping(&[("abc", TorrentState::Seeding)]));
        let completed = detector.observe(&mapping(&[("abc", TorrentState::Seeding)]));
        assert!(completed.is_empty());
    }

    #[test]
    fn test_other_transitions_ignored() {
        let mut detector = CompletionDetector::new();
        detector.observe(&mapping(&[
            ("a", TorrentState::Paused),
            ("b", TorrentState::Checking),
        ]));
        let completed = detector.observe(&mapping(&[
            ("a", TorrentState::Seeding),
            ("b", TorrentState::Downloading),
        ]));
        assert!(completed.is_empty());
    }

    #[test]
    fn test_removed_hashes_tolerated() {
        let mut detector = CompletionDetector::new();
        detector.observe(&mapping(&[
            ("a", TorrentState::Downloading),
            ("b", TorrentState::Downloading),
        ]));
        let completed = detector.observe(&mapping(&[("b", TorrentState::Seeding)]));
        assert_eq!(completed, vec![InfoHash::from("b")]);
    }

    #[test]
    fn test_reset_rearms_baseline() {
        let mut detector = CompletionDetector::new();
        detector.observe(&mapping(&[("abc", TorrentState::Downloading)]));
        detector.reset();
        let completed = detector.observe(&mapping(&[("abc", TorrentState::Seeding)]));
        assert!(completed.is_empty());
    }
}
