use std::path::PathBuf;
use std::process::ExitCode;

use analyzers::{Backend, MockBackend};
use clap::Parser;
use steganoshield_api::ServerConfig;

use steganoshield::intake::{DEFAULT_MAX_UPLOAD_MB, IntakePolicy, SelectedFile};
use steganoshield::report;
use steganoshield::service::{ClassifyService, LocalClassifier, RemoteClassifier};
use steganoshield::session::ClientSession;

#[derive(Parser)]
#[command(
    name = "steganoshield",
    version = "0.1.0",
    about = "Classify an image for potential steganography or malware artifacts"
)]
struct Args {
    /// Path to the image to analyze
    #[arg(short, long, required = true)]
    file: PathBuf,

    /// Base URL of a running SteganoShield API; classifies in-process when omitted
    #[arg(short, long, env = "STEGANOSHIELD_SERVER")]
    server: Option<String>,

    /// Use random mock results instead of the model
    #[arg(long, conflicts_with = "server")]
    mock: bool,

    /// Largest accepted upload, in megabytes
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_MB)]
    max_size_mb: u64,

    /// Print the analysis as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

async fn run<S: ClassifyService>(
    session: &mut ClientSession,
    service: &S,
    json: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    if let Err(err) = session.submit(service).await {
        let notice = err.notice();
        eprintln!("{}: {}", notice.title, notice.description);
        return Ok(ExitCode::FAILURE);
    }

    if let Some(result) = session.state().result() {
        if json {
            println!("{}", report::render_json(result)?);
        } else {
            print!("{}", report::render_text(result));
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let args = Args::parse();

    let file = SelectedFile::from_path(&args.file)?;
    if args.verbose {
        log::info!(
            "\nScanning file Details: Path: {:?}, Size: {} bytes, Type: {}",
            args.file,
            file.size,
            file.mime_type,
        );
    }

    let mut session = ClientSession::new(IntakePolicy::with_max_mb(args.max_size_mb));
    if let Err(err) = session.select_file(file) {
        let notice = err.notice();
        eprintln!("{}: {}", notice.title, notice.description);
        return Ok(ExitCode::FAILURE);
    }

    let code = match args.server.as_deref() {
        Some(server) => {
            let service = RemoteClassifier::new(server);
            log::info!("Sending image to {}", service.endpoint());
            run(&mut session, &service, args.json).await?
        }
        None => {
            let backend = if args.mock {
                Backend::Mock(MockBackend::new())
            } else {
                ServerConfig::from_env()?.build_backend()
            };
            run(&mut session, &LocalClassifier::new(backend), args.json).await?
        }
    };

    session.clear();
    Ok(code)
}
