//! CLI command implementations

use std::path::PathBuf;
use std::sync::Arc;

use clap::Subcommand;
use diluvium_core::config::{DiluviumConfig, RpcConfig};
use diluvium_core::{DiluviumError, Result};
use diluvium_core::report::{
    ReportFile, ReportInput, TemplateId, format_eta, format_ratio, format_speed, human_size,
    sanitize_filename,
};
use diluvium_core::rpc::DelugeRpcClient;
use diluvium_core::sync::{
    FilterCriteria, FilterState, InfoHash, PollScheduler, SyncEngine, TorrentAction,
};
use tokio::fs;
use tokio::sync::mpsc;

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// List torrents known to the daemon
    List {
        /// Restrict to one state (e.g. Downloading, Seeding, Active)
        #[arg(short, long)]
        state: Option<String>,
    },
    /// Pause torrents
    Pause {
        /// Torrent hashes
        hashes: Vec<String>,
    },
    /// Resume torrents
    Resume {
        /// Torrent hashes
        hashes: Vec<String>,
    },
    /// Remove torrents from the session
    Remove {
        /// Torrent hashes
        hashes: Vec<String>,
        /// Also delete downloaded data
        #[arg(long)]
        data: bool,
    },
    /// Force a recheck of torrent data
    Recheck {
        /// Torrent hashes
        hashes: Vec<String>,
    },
    /// Move torrents within the download queue
    Queue {
        /// Direction: top, up, down, or bottom
        direction: String,
        /// Torrent hashes
        hashes: Vec<String>,
    },
    /// Add a torrent from a magnet link, URL, or file
    Add {
        /// Magnet link, HTTP URL, or path to a torrent file
        source: String,
        /// Download directory override
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Poll the daemon and print live transfer activity
    Watch {
        /// Poll interval in seconds
        #[arg(short, long, default_value = "3")]
        interval: u64,
    },
    /// Generate an NFO report for a torrent
    Nfo {
        /// Torrent hash
        hash: String,
        /// Template: minimal, detailed, or fancy
        #[arg(short, long, default_value = "detailed")]
        template: TemplateId,
        /// Free-text notes appended to the report
        #[arg(long, default_value = "")]
        notes: String,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Handle the CLI command
///
/// # Errors
/// Returns appropriate error based on the command that fails
pub async fn handle_command(
    url: String,
    password: Option<String>,
    command: Commands,
) -> Result<()> {
    let config = DiluviumConfig {
        rpc: RpcConfig {
            base_url: url,
            ..RpcConfig::default()
        },
        ..DiluviumConfig::default()
    };
    let client = Arc::new(DelugeRpcClient::new(config.rpc.clone()));

    if let Some(password) = password {
        let authenticated = client.login(&password).await?;
        if !authenticated {
            return Err(DiluviumError::Configuration {
                reason: "daemon rejected the password".to_string(),
            });
        }
    }

    let engine = Arc::new(SyncEngine::new(Arc::clone(&client), config.poll.clone()));

    match command {
        Commands::List { state } => list_torrents(&engine, state).await,
        Commands::Pause { hashes } => {
            run_action(&engine, TorrentAction::Pause { hashes: parse_hashes(hashes) }).await
        }
        Commands::Resume { hashes } => {
            run_action(&engine, TorrentAction::Resume { hashes: parse_hashes(hashes) }).await
        }
        Commands::Remove { hashes, data } => {
            run_action(
                &engine,
                TorrentAction::Remove {
                    hashes: parse_hashes(hashes),
                    remove_data: data,
                },
            )
            .await
        }
        Commands::Recheck { hashes } => {
            run_action(&engine, TorrentAction::Recheck { hashes: parse_hashes(hashes) }).await
        }
        Commands::Queue { direction, hashes } => queue_move(&engine, direction, hashes).await,
        Commands::Add { source, output } => add_torrent(&engine, source, output).await,
        Commands::Watch { interval } => watch(engine, interval).await,
        Commands::Nfo {
            hash,
            template,
            notes,
            output,
        } => generate_nfo(&engine, hash, template, notes, output).await,
    }
}

fn parse_hashes(hashes: Vec<String>) -> Vec<InfoHash> {
    hashes.into_iter().map(InfoHash::new).collect()
}

async fn list_torrents(
    engine: &SyncEngine<DelugeRpcClient>,
    state: Option<String>,
) -> Result<()> {
    let filter = FilterCriteria {
        state: match state.as_deref() {
            None | Some("All") => FilterState::All,
            Some("Active") => FilterState::Active,
            Some("Downloading") => FilterState::Downloading,
            Some("Seeding") => FilterState::Seeding,
            Some("Paused") => FilterState::Paused,
            Some("Checking") => FilterState::Checking,
            Some("Error") => FilterState::Error,
            Some("Queued") => FilterState::Queued,
            Some(other) => {
                return Err(DiluviumError::Configuration {
                    reason: format!("unknown state filter: {other}"),
                });
            }
        },
        ..FilterCriteria::default()
    };

    let snapshot = engine.poll(&filter).await?;
    if !snapshot.connected {
        println!("Web interface is not connected to a daemon");
        return Ok(());
    }

    let mut torrents: Vec<_> = snapshot.torrents.iter().collect();
    torrents.sort_by(|(_, a), (_, b)| a.name.cmp(&b.name));

    for (hash, torrent) in torrents {
        println!(
            "{}  {:>6.1}%  {:<12} dl {:<12} ul {:<12} ratio {:<6} eta {:<8}  {}",
            hash,
            torrent.progress,
            torrent.state.as_str(),
            format_speed(torrent.download_payload_rate),
            format_speed(torrent.upload_payload_rate),
            format_ratio(torrent.ratio),
            format_eta(torrent.eta),
            torrent.name,
        );
    }
    println!(
        "down {} up {} | {} connections | free space {}",
        format_speed(snapshot.stats.download_rate),
        format_speed(snapshot.stats.upload_rate),
        snapshot.stats.num_connections,
        human_size(snapshot.stats.free_space as f64),
    );
    Ok(())
}

async fn run_action(
    engine: &SyncEngine<DelugeRpcClient>,
    action: TorrentAction,
) -> Result<()> {
    engine.mutate(action).await?;
    println!("Done; next poll will reflect the change");
    Ok(())
}

async fn queue_move(
    engine: &SyncEngine<DelugeRpcClient>,
    direction: String,
    hashes: Vec<String>,
) -> Result<()> {
    let hashes = parse_hashes(hashes);
    let action = match direction.as_str() {
        "top" => TorrentAction::QueueTop { hashes },
        "up" => TorrentAction::QueueUp { hashes },
        "down" => TorrentAction::QueueDown { hashes },
        "bottom" => TorrentAction::QueueBottom { hashes },
        other => {
            return Err(DiluviumError::Configuration {
                reason: format!("unknown queue direction: {other}"),
            });
        }
    };
    run_action(engine, action).await
}

async fn add_torrent(
    engine: &SyncEngine<DelugeRpcClient>,
    source: String,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut options = serde_json::Map::new();
    if let Some(output) = &output {
        options.insert(
            "download_location".to_string(),
            serde_json::Value::from(output.display().to_string()),
        );
    }

    let action = if source.starts_with("magnet:") {
        TorrentAction::AddMagnet { uri: source, options }
    } else if source.starts_with("http://") || source.starts_with("https://") {
        TorrentAction::AddUrl { url: source, options }
    } else {
        let content = fs::read(&source).await?;
        let filename = PathBuf::from(&source)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.clone());
        TorrentAction::AddFile {
            filename,
            content,
            options,
        }
    };

    let outcome = engine.mutate(action).await?;
    match outcome.added {
        Some(hash) => println!("Added torrent {hash}"),
        None => println!("Torrent submitted"),
    }
    Ok(())
}

async fn watch(engine: Arc<SyncEngine<DelugeRpcClient>>, interval: u64) -> Result<()> {
    let scheduler = PollScheduler::new(
        Arc::clone(&engine),
        FilterCriteria::default(),
        std::time::Duration::from_secs(interval),
    );
    let (sender, mut receiver) = mpsc::channel(8);
    tokio::spawn(scheduler.run(sender));

    while let Some(event) = receiver.recv().await {
        for hash in &event.completed {
            let name = event
                .snapshot
                .torrents
                .get(hash)
                .map(|t| t.name.as_str())
                .unwrap_or("unknown");
            println!("Download complete: {name}");
        }
        println!(
            "{} torrents | down {} up {} | session down {} up {}",
            event.snapshot.torrents.len(),
            format_speed(event.snapshot.stats.download_rate),
            format_speed(event.snapshot.stats.upload_rate),
            human_size(event.session.downloaded),
            human_size(event.session.uploaded),
        );
    }
    Ok(())
}

async fn generate_nfo(
    engine: &SyncEngine<DelugeRpcClient>,
    hash: String,
    template: TemplateId,
    notes: String,
    output: Option<PathBuf>,
) -> Result<()> {
    let hash = InfoHash::new(hash);
    let status = engine.poll_detail(&hash).await?;
    let tree = engine.torrent_files(&hash).await?;
    let meta = engine.torrent_meta(&hash).await?;

    let input = ReportInput {
        name: status.name.clone(),
        hash: hash.to_string(),
        total_size: status.total_size,
        files: tree.flatten().iter().map(ReportFile::from).collect(),
        tracker: status.tracker_host.clone(),
        date_added: status.time_added,
        piece_size: meta.piece_length,
        num_pieces: meta.num_pieces,
        creator: meta.creator.clone(),
        comment: status.comment.clone(),
        notes,
    };

    let report = diluvium_core::generate(&input, template);
    match output {
        Some(path) => {
            let path = match path.file_name() {
                Some(name) => {
                    path.with_file_name(sanitize_filename(&name.to_string_lossy()))
                }
                None => path,
            };
            fs::write(&path, &report).await?;
            println!("Wrote {}", path.display());
        }
        None => println!("{report}"),
    }
    Ok(())
}
