use api_client::paths::format_similarity;
use api_client::{ApiClient, SearchOutcome};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[path = "../config.rs"]
mod config;
#[path = "../logging.rs"]
mod logging;

#[derive(Parser)]
#[command(
    name = "gallery_cli",
    author,
    version,
    about = "FaceGallery command-line client"
)]
struct Cli {
    /// Backend base URL (e.g. http://localhost:8000)
    #[arg(long)]
    backend_url: Option<String>,
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override log level (e.g. info, debug)
    #[arg(long)]
    log_level: Option<String>,
    /// Request timeout in seconds, 0 disables it
    #[arg(long)]
    request_timeout_secs: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List folders with their image counts
    Folders,
    /// List the image paths of a folder
    Images {
        /// Folder name
        folder: String,
        /// Maximum number of paths to display
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List the face crops detected in an image
    Faces {
        /// Image path relative to the backend
        image_path: String,
    },
    /// Search a folder for the faces in a local image
    Search {
        #[arg(long)]
        folder: String,
        /// Image file to upload
        #[arg(long)]
        file: PathBuf,
    },
    /// Search a folder using a face crop known to the backend
    SearchFace {
        #[arg(long)]
        folder: String,
        #[arg(long)]
        image_path: String,
    },
    /// Detect faces in every image of a folder
    Detect {
        #[arg(long)]
        folder: String,
    },
    /// Calculate embeddings for the faces of a folder
    Embed {
        #[arg(long)]
        folder: String,
    },
    /// Write the effective configuration to the config file
    InitConfig,
}

fn print_outcome(outcome: SearchOutcome) {
    match outcome {
        SearchOutcome::Matches(groups) => {
            for (i, group) in groups.iter().enumerate() {
                match &group.face_path {
                    Some(face) => println!("Face {} ({})", i, face),
                    None => println!("Face {}", i),
                }
                for m in &group.matches {
                    println!(
                        "  {}  {} -> {}",
                        format_similarity(m.similarity),
                        m.matched_face.as_deref().unwrap_or("-"),
                        m.origin_image.as_deref().unwrap_or("-"),
                    );
                }
            }
        }
        SearchOutcome::NoMatches { warning } => {
            println!("No matches found.");
            if let Some(w) = warning {
                println!("{}", w);
            }
        }
    }
}

#[cfg_attr(feature = "trace-spans", tracing::instrument)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let overrides = config::AppConfigOverrides {
        backend_url: cli.backend_url.clone(),
        log_level: cli.log_level.clone(),
        request_timeout_secs: cli.request_timeout_secs,
        ..Default::default()
    };
    let cfg = config::AppConfig::load_from(cli.config.clone()).apply_overrides(&overrides);
    let _guard = logging::init(&cfg.cache_path, &cfg.log_level)?;

    let client = ApiClient::with_timeout(cfg.backend_url.clone(), cfg.request_timeout())?;

    match cli.command {
        Commands::Folders => {
            let catalog = client.list_folders().await?;
            if catalog.is_empty() {
                println!("No folders found");
            }
            for (name, images) in &catalog {
                println!("{} ({} images)", name, images.len());
            }
        }
        Commands::Images { folder, limit } => {
            let catalog = client.list_folders().await?;
            let Some(images) = catalog.get(&folder) else {
                return Err(format!("Folder not found: {}", folder).into());
            };
            for path in images.iter().take(limit.unwrap_or(usize::MAX)) {
                println!("{}", path);
            }
        }
        Commands::Faces { image_path } => {
            let faces = client.list_faces(&client.normalize(&image_path)).await?;
            if faces.is_empty() {
                println!("No faces found");
            }
            for face in faces {
                println!("{}", face);
            }
        }
        Commands::Search { folder, file } => {
            let outcome = client.search_by_upload_path(&file, &folder).await?;
            print_outcome(outcome);
        }
        Commands::SearchFace { folder, image_path } => {
            let outcome = client
                .search_by_face(&client.normalize(&image_path), &folder)
                .await?;
            print_outcome(outcome);
        }
        Commands::Detect { folder } => {
            println!("{}", client.detect_folder(&folder).await?);
        }
        Commands::Embed { folder } => {
            println!("{}", client.calculate_embedding(&folder).await?);
        }
        Commands::InitConfig => {
            let path = cli.config.unwrap_or_else(config::default_path);
            cfg.save_to(Some(path.clone()))?;
            println!("Config written to {}", path.display());
        }
    }

    Ok(())
}
