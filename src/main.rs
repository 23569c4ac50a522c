use media_uploader::catalog::Catalogs;
use media_uploader::classifier::FileProcessingRouter;
use media_uploader::config::Config;
use media_uploader::grouping::GroupingAdvisor;
use media_uploader::model::ItemEdit;
use media_uploader::path::ContentPathResolver;
use media_uploader::session::{Collaborators, SessionEvent, SessionService};
use media_uploader::transfer::TransferClient;
use media_uploader::wav::WavMetadataReader;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() {
    // Reads from RUST_LOG env var, defaults to info level
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <file or folder>...", args[0]);
        eprintln!("Example: {} recordings/ en_ulb_b19_psa_c001.wav", args[0]);
        std::process::exit(1);
    }

    let paths = args[1..].iter().map(PathBuf::from).collect();

    match run(paths).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Import, assign unambiguous groupings, upload. Returns false when nothing
/// was uploaded and at least one file failed.
async fn run(paths: Vec<PathBuf>) -> Result<bool, String> {
    let config = Config::load().map_err(|e| e.to_string())?;
    let transfer = TransferClient::from_config(&config)
        .await
        .map_err(|e| e.to_string())?;
    let catalogs = Catalogs::load(&config.catalog_dir).await;

    let collaborators = Collaborators {
        classifier: Arc::new(FileProcessingRouter::new()),
        advisor: GroupingAdvisor::new(Arc::new(WavMetadataReader::new())),
        resolver: Arc::new(ContentPathResolver::new()),
        transfer,
        catalogs,
    };

    let handle = SessionService::start(tokio::runtime::Handle::current(), collaborators);

    let mut errors = handle.subscribe_errors();
    let printer = tokio::spawn(async move {
        let mut count = 0usize;
        while let Some(event) = errors.recv().await {
            if let SessionEvent::Error(message) = event {
                eprintln!("{}", message);
                count += 1;
            }
        }
        count
    });

    let imported = handle
        .import_paths_and_wait(paths)
        .await
        .map_err(|e| e.to_string())?;
    info!(
        "{} file(s) staged, {} duplicate(s), {} rejected, {} unreadable",
        imported.accepted, imported.duplicates, imported.rejected, imported.unreadable
    );

    let snapshot = handle.snapshot().await.map_err(|e| e.to_string())?;
    for item in &snapshot.items {
        let allowed = handle
            .allowed_groupings(item.id)
            .await
            .map_err(|e| e.to_string())?;
        if let [only] = allowed.as_slice() {
            handle
                .edit_item(item.id, ItemEdit::Grouping(*only))
                .await
                .map_err(|e| e.to_string())?;
        } else {
            info!(
                "{}: grouping left unset, allowed: {:?}",
                item.file_name(),
                allowed
            );
        }
    }

    let uploaded = handle.upload_and_wait().await.map_err(|e| e.to_string())?;
    println!(
        "Uploaded {} file(s), {} failed",
        uploaded.uploaded, uploaded.failed
    );

    handle.shutdown().map_err(|e| e.to_string())?;
    drop(handle);
    let error_count = printer.await.unwrap_or(0);

    Ok(uploaded.uploaded > 0 || error_count == 0)
}
