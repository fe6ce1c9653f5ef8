//! Polling-based state synchronization with the daemon.
//!
//! The engine holds at most one current snapshot, replaced wholesale per
//! applied poll. Mutations follow an optimistic-invalidation contract:
//! invalidate and re-poll, never merge or synthesize client-side state.

pub mod engine;
pub mod files;
pub mod notify;
pub mod scheduler;
pub mod session;
pub mod state;

pub use engine::{MutationOutcome, QueryKey, SyncEngine, TorrentAction};
pub use files::{FileTreeNode, TorrentFileEntry};
pub use notify::{CompletionDetector, detect_completions};
pub use scheduler::{PollScheduler, SyncEvent};
pub use session::{SessionAccumulator, SessionTotals};
pub use state::{
    FilterCriteria, FilterFacets, FilterState, GlobalStats, InfoHash, PeerInfo, SyncSnapshot,
    TORRENT_FIELDS, TorrentMetaInfo, TorrentState, TorrentStatus, TrackerEntry,
};
