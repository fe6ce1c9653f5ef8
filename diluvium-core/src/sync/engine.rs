//! Polling sync engine and optimistic-invalidation mutation layer.
//!
//! The engine keeps a client-local view of daemon state fresh by polling
//! and exposes every daemon mutation behind one dispatcher. It never
//! synthesizes post-mutation state: success marks the affected queries
//! stale and the next poll reflects the change (last poll wins).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use parking_lot::Mutex;
use serde_json::{Map, Value, json};

use super::files::FileTreeNode;
use super::session::{SessionAccumulator, SessionTotals};
use super::state::{
    FilterCriteria, GlobalStats, InfoHash, PeerInfo, SyncSnapshot, TORRENT_FIELDS, TorrentMetaInfo,
    TorrentStatus, TrackerEntry,
};
use crate::config::PollConfig;
use crate::rpc::{RpcError, RpcTransport};

/// Identity of one logical polling query.
///
/// Stale-response rejection and invalidation both operate per key:
/// responses for one key apply in request order, and a mutation marks
/// exactly the keys whose results it could have changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    TorrentList(FilterCriteria),
    TorrentDetail(InfoHash),
}

/// One daemon-side mutation, dispatched by kind.
///
/// Destructive kinds (remove) are confirmed by the caller before they
/// reach the engine; the engine performs no confirmation of its own.
#[derive(Debug, Clone)]
pub enum TorrentAction {
    Pause { hashes: Vec<InfoHash> },
    Resume { hashes: Vec<InfoHash> },
    Remove { hashes: Vec<InfoHash>, remove_data: bool },
    Recheck { hashes: Vec<InfoHash> },
    QueueTop { hashes: Vec<InfoHash> },
    QueueUp { hashes: Vec<InfoHash> },
    QueueDown { hashes: Vec<InfoHash> },
    QueueBottom { hashes: Vec<InfoHash> },
    SetOptions { hash: InfoHash, options: Map<String, Value> },
    SetFilePriorities { hash: InfoHash, priorities: Vec<i64> },
    SetTrackers { hash: InfoHash, trackers: Vec<TrackerEntry> },
    MoveStorage { hashes: Vec<InfoHash>, destination: String },
    AddMagnet { uri: String, options: Map<String, Value> },
    AddUrl { url: String, options: Map<String, Value> },
    AddFile { filename: String, content: Vec<u8>, options: Map<String, Value> },
}

impl TorrentAction {
    fn hashes(&self) -> &[InfoHash] {
        match self {
            TorrentAction::Pause { hashes }
            | TorrentAction::Resume { hashes }
            | TorrentAction::Remove { hashes, .. }
            | TorrentAction::Recheck { hashes }
            | TorrentAction::QueueTop { hashes }
            | TorrentAction::QueueUp { hashes }
            | TorrentAction::QueueDown { hashes }
            | TorrentAction::QueueBottom { hashes }
            | TorrentAction::MoveStorage { hashes, .. } => hashes,
            TorrentAction::SetOptions { hash, .. }
            | TorrentAction::SetFilePriorities { hash, .. }
            | TorrentAction::SetTrackers { hash, .. } => std::slice::from_ref(hash),
            TorrentAction::AddMagnet { .. }
            | TorrentAction::AddUrl { .. }
            | TorrentAction::AddFile { .. } => &[],
        }
    }
}

/// Result of a successful mutation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationOutcome {
    /// Hash assigned by the daemon for add operations
    pub added: Option<InfoHash>,
}

struct EngineState {
    snapshot: Option<SyncSnapshot>,
    details: HashMap<InfoHash, TorrentStatus>,
    dispatched: HashMap<QueryKey, u64>,
    applied: HashMap<QueryKey, u64>,
    /// Keys invalidated by a mutation, mapped to the generation that had
    /// been dispatched when the mutation succeeded. Only a response from
    /// a later generation carries post-mutation data and may clear the
    /// entry.
    stale: HashMap<QueryKey, u64>,
    session: SessionAccumulator,
}

/// Client-local view of daemon state with polling and mutations.
///
/// Shared-state writes happen only in poll/mutate completion paths;
/// external callers read through cloning accessors. The generation
/// counters implement stale-response rejection: a response whose request
/// was superseded by a later one for the same key is discarded, never
/// applied.
pub struct SyncEngine<T: RpcTransport> {
    transport: Arc<T>,
    state: Mutex<EngineState>,
}

impl<T: RpcTransport> SyncEngine<T> {
    pub fn new(transport: Arc<T>, config: PollConfig) -> Self {
        Self {
            transport,
            state: Mutex::new(EngineState {
                snapshot: None,
                details: HashMap::new(),
                dispatched: HashMap::new(),
                applied: HashMap::new(),
                stale: HashMap::new(),
                session: SessionAccumulator::new(config.session_elapsed_cap),
            }),
        }
    }

    /// Returns the last applied snapshot, if any poll has succeeded yet.
    pub fn snapshot(&self) -> Option<SyncSnapshot> {
        self.state.lock().snapshot.clone()
    }

    /// Returns the last applied detail record for a torrent.
    pub fn cached_detail(&self, hash: &InfoHash) -> Option<TorrentStatus> {
        self.state.lock().details.get(hash).cloned()
    }

    /// Reports whether a query's last applied result predates a mutation.
    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.state.lock().stale.contains_key(key)
    }

    fn begin_request(&self, key: &QueryKey) -> u64 {
        let mut state = self.state.lock();
        let generation = state.dispatched.entry(key.clone()).or_insert(0);
        *generation += 1;
        *generation
    }

    /// Records a completed request for `key`, rejecting stale responses.
    ///
    /// Returns false when a response to a later request for the same key
    /// has already been applied, in which case the caller must discard
    /// its result. An applied response clears the key's staleness only
    /// when its request was dispatched after the invalidating mutation;
    /// an earlier response carries pre-mutation data and leaves the key
    /// stale.
    fn finish_request(state: &mut EngineState, key: &QueryKey, generation: u64) -> bool {
        let applied = state.applied.entry(key.clone()).or_insert(0);
        if generation <= *applied {
            tracing::warn!("Discarding stale response for {:?} (gen {})", key, generation);
            return false;
        }
        *applied = generation;
        if state.stale.get(key).is_some_and(|&barrier| generation > barrier) {
            state.stale.remove(key);
        }
        true
    }

    // -----------------------------------------------------------------
    // Polling queries
    // -----------------------------------------------------------------

    /// Fetches a full snapshot, filtered server-side.
    ///
    /// On success the snapshot replaces the engine's current one wholesale
    /// (unless superseded by a later request for the same filter). On
    /// failure the last-known-good snapshot stays in place: stale data is
    /// preferred over a blank view.
    ///
    /// # Errors
    /// - `RpcError::MalformedResponse` - Result did not match the snapshot shape
    /// - Any transport error from the underlying call
    pub async fn poll(&self, filter: &FilterCriteria) -> Result<SyncSnapshot, RpcError> {
        let key = QueryKey::TorrentList(filter.clone());
        let generation = self.begin_request(&key);

        let params = vec![json!(TORRENT_FIELDS), Value::Object(filter.to_filter_dict())];
        let result = self.transport.call("web.update_ui", params).await?;
        let snapshot: SyncSnapshot = serde_json::from_value(result)
            .map_err(|e| RpcError::malformed(format!("invalid update_ui result: {e}")))?;

        let mut state = self.state.lock();
        if Self::finish_request(&mut state, &key, generation) {
            state.snapshot = Some(snapshot.clone());
            Ok(snapshot)
        } else {
            // A discarded response still returns whatever is current.
            Ok(state.snapshot.clone().unwrap_or(snapshot))
        }
    }

    /// Fetches the full status record of one torrent.
    ///
    /// Applied into the per-hash detail cache under the same
    /// stale-response rule as list polls.
    pub async fn poll_detail(&self, hash: &InfoHash) -> Result<TorrentStatus, RpcError> {
        let key = QueryKey::TorrentDetail(hash.clone());
        let generation = self.begin_request(&key);

        let params = vec![json!(hash.as_str()), json!(TORRENT_FIELDS)];
        let result = self
            .transport
            .call("web.get_torrent_status", params)
            .await?;
        let status: TorrentStatus = serde_json::from_value(result)
            .map_err(|e| RpcError::malformed(format!("invalid torrent status: {e}")))?;

        let mut state = self.state.lock();
        if Self::finish_request(&mut state, &key, generation) {
            state.details.insert(hash.clone(), status.clone());
        }
        Ok(state.details.get(hash).cloned().unwrap_or(status))
    }

    /// Fetches and validates a torrent's content tree.
    pub async fn torrent_files(&self, hash: &InfoHash) -> Result<FileTreeNode, RpcError> {
        let result = self
            .transport
            .call("web.get_torrent_files", vec![json!(hash.as_str())])
            .await?;
        FileTreeNode::from_value(&result)
    }

    /// Fetches the peers currently attached to a torrent.
    pub async fn torrent_peers(&self, hash: &InfoHash) -> Result<Vec<PeerInfo>, RpcError> {
        let params = vec![json!(hash.as_str()), json!(["peers"])];
        let result = self
            .transport
            .call("core.get_torrent_status", params)
            .await?;
        let peers = result
            .get("peers")
            .cloned()
            .ok_or_else(|| RpcError::malformed("torrent status missing peers"))?;
        serde_json::from_value(peers)
            .map_err(|e| RpcError::malformed(format!("invalid peer list: {e}")))
    }

    /// Fetches torrent creation metadata used for report generation.
    pub async fn torrent_meta(&self, hash: &InfoHash) -> Result<TorrentMetaInfo, RpcError> {
        let params = vec![
            json!(hash.as_str()),
            json!(["num_pieces", "piece_length", "creator", "creation_date", "trackers"]),
        ];
        let result = self
            .transport
            .call("core.get_torrent_status", params)
            .await?;
        serde_json::from_value(result)
            .map_err(|e| RpcError::malformed(format!("invalid torrent metadata: {e}")))
    }

    /// Fetches the daemon's external IP address.
    pub async fn external_ip(&self) -> Result<String, RpcError> {
        let result = self.transport.call("core.get_external_ip", vec![]).await?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| RpcError::malformed("external IP is not a string"))
    }

    /// Fetches the daemon configuration dictionary.
    pub async fn daemon_config(&self) -> Result<Map<String, Value>, RpcError> {
        let result = self.transport.call("core.get_config", vec![]).await?;
        match result {
            Value::Object(config) => Ok(config),
            _ => Err(RpcError::malformed("daemon config is not an object")),
        }
    }

    /// Applies changed daemon configuration keys.
    pub async fn set_daemon_config(&self, config: Map<String, Value>) -> Result<(), RpcError> {
        self.transport
            .call("core.set_config", vec![Value::Object(config)])
            .await?;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------

    /// Invokes one daemon mutation and invalidates affected queries.
    ///
    /// On success every torrent list query and the detail queries of the
    /// affected hashes are marked stale; the post-mutation state is never
    /// synthesized client-side. On failure the local snapshot is left
    /// untouched and the error propagates. No automatic retry.
    ///
    /// # Errors
    /// - `RpcError::Daemon` - Daemon rejected the operation
    /// - Any transport error from the underlying call
    pub async fn mutate(&self, action: TorrentAction) -> Result<MutationOutcome, RpcError> {
        let outcome = self.dispatch_action(&action).await?;
        self.invalidate_after(&action);
        Ok(outcome)
    }

    async fn dispatch_action(&self, action: &TorrentAction) -> Result<MutationOutcome, RpcError> {
        let hash_strings =
            |hashes: &[InfoHash]| -> Value { json!(hashes.iter().map(InfoHash::as_str).collect::<Vec<_>>()) };

        match action {
            TorrentAction::Pause { hashes } => {
                self.transport
                    .call("core.pause_torrents", vec![hash_strings(hashes)])
                    .await?;
            }
            TorrentAction::Resume { hashes } => {
                self.transport
                    .call("core.resume_torrents", vec![hash_strings(hashes)])
                    .await?;
            }
            TorrentAction::Remove { hashes, remove_data } => {
                self.transport
                    .call(
                        "core.remove_torrents",
                        vec![hash_strings(hashes), json!(remove_data)],
                    )
                    .await?;
            }
            TorrentAction::Recheck { hashes } => {
                self.transport
                    .call("core.force_recheck", vec![hash_strings(hashes)])
                    .await?;
            }
            TorrentAction::QueueTop { hashes } => {
                self.transport
                    .call("core.queue_top", vec![hash_strings(hashes)])
                    .await?;
            }
            TorrentAction::QueueUp { hashes } => {
                self.transport
                    .call("core.queue_up", vec![hash_strings(hashes)])
                    .await?;
            }
            TorrentAction::QueueDown { hashes } => {
                self.transport
                    .call("core.queue_down", vec![hash_strings(hashes)])
                    .await?;
            }
            TorrentAction::QueueBottom { hashes } => {
                self.transport
                    .call("core.queue_bottom", vec![hash_strings(hashes)])
                    .await?;
            }
            TorrentAction::SetOptions { hash, options } => {
                self.transport
                    .call(
                        "core.set_torrent_options",
                        vec![json!([hash.as_str()]), Value::Object(options.clone())],
                    )
                    .await?;
            }
            TorrentAction::SetFilePriorities { hash, priorities } => {
                self.transport
                    .call(
                        "core.set_torrent_file_priorities",
                        vec![json!(hash.as_str()), json!(priorities)],
                    )
                    .await?;
            }
            TorrentAction::SetTrackers { hash, trackers } => {
                let trackers: Vec<Value> = trackers
                    .iter()
                    .map(|t| json!({"url": t.url, "tier": t.tier}))
                    .collect();
                self.transport
                    .call(
                        "core.set_torrent_trackers",
                        vec![json!(hash.as_str()), Value::Array(trackers)],
                    )
                    .await?;
            }
            TorrentAction::MoveStorage { hashes, destination } => {
                self.transport
                    .call(
                        "core.move_storage",
                        vec![hash_strings(hashes), json!(destination)],
                    )
                    .await?;
            }
            TorrentAction::AddMagnet { uri, options } => {
                let result = self
                    .transport
                    .call(
                        "core.add_torrent_magnet",
                        vec![json!(uri), Value::Object(options.clone())],
                    )
                    .await?;
                return Ok(MutationOutcome {
                    added: result.as_str().map(InfoHash::from),
                });
            }
            TorrentAction::AddUrl { url, options } => {
                let result = self
                    .transport
                    .call(
                        "core.add_torrent_url",
                        vec![json!(url), Value::Object(options.clone())],
                    )
                    .await?;
                return Ok(MutationOutcome {
                    added: result.as_str().map(InfoHash::from),
                });
            }
            TorrentAction::AddFile {
                filename,
                content,
                options,
            } => {
                return self.add_torrent_file(filename, content, options).await;
            }
        }
        Ok(MutationOutcome::default())
    }

    /// Adds a torrent file, preferring the upload endpoint.
    ///
    /// When the upload endpoint fails, the content is base64-encoded and
    /// passed through the ordinary `core.add_torrent_file` dump path.
    async fn add_torrent_file(
        &self,
        filename: &str,
        content: &[u8],
        options: &Map<String, Value>,
    ) -> Result<MutationOutcome, RpcError> {
        match self.transport.upload_file(content.to_vec(), filename).await {
            Ok(paths) if !paths.is_empty() => {
                let entries: Vec<Value> = paths
                    .iter()
                    .map(|path| json!({"path": path, "options": options}))
                    .collect();
                self.transport
                    .call("web.add_torrents", vec![Value::Array(entries)])
                    .await?;
                Ok(MutationOutcome::default())
            }
            Ok(_) => Err(RpcError::malformed("upload returned no file paths")),
            Err(upload_error) => {
                tracing::warn!(
                    "Upload endpoint failed ({}), falling back to filedump",
                    upload_error
                );
                let dump = BASE64.encode(content);
                let result = self
                    .transport
                    .call(
                        "core.add_torrent_file",
                        vec![json!(filename), json!(dump), Value::Object(options.clone())],
                    )
                    .await?;
                Ok(MutationOutcome {
                    added: result.as_str().map(InfoHash::from),
                })
            }
        }
    }

    fn invalidate_after(&self, action: &TorrentAction) {
        let mut state = self.state.lock();
        // Requests in flight at this point were dispatched before the
        // mutation took effect; their generation becomes the barrier a
        // clearing response must exceed.
        let list_keys: Vec<QueryKey> = state
            .dispatched
            .keys()
            .filter(|key| matches!(key, QueryKey::TorrentList(_)))
            .cloned()
            .collect();
        for key in list_keys {
            let barrier = state.dispatched.get(&key).copied().unwrap_or(0);
            state.stale.insert(key, barrier);
        }
        for hash in action.hashes() {
            let key = QueryKey::TorrentDetail(hash.clone());
            let barrier = state.dispatched.get(&key).copied().unwrap_or(0);
            state.stale.insert(key, barrier);
        }
    }

    // -----------------------------------------------------------------
    // Session accounting
    // -----------------------------------------------------------------

    /// Advances session totals; call once per successfully applied poll.
    pub fn accumulate_session(&self, stats: &GlobalStats) -> SessionTotals {
        self.state.lock().session.advance(stats, Instant::now())
    }

    /// Returns the running session totals.
    pub fn session_totals(&self) -> SessionTotals {
        self.state.lock().session.totals()
    }
}
