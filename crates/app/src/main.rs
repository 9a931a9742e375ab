use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use services::{Clock, ProgressService};
use storage::JsonFileStore;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidAddr { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidAddr { raw } => write!(f, "invalid --addr value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct Args {
    addr: SocketAddr,
    data_path: PathBuf,
    assets_dir: PathBuf,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--addr <ip:port>] [--data <file>] [--assets <dir>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --addr 127.0.0.1:3000");
    eprintln!("  --data data.json");
    eprintln!("  --assets public");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  LESSONS_ADDR, LESSONS_DATA, LESSONS_ASSETS");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut addr = std::env::var("LESSONS_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".into());
        let mut data_path = std::env::var("LESSONS_DATA")
            .map_or_else(|_| PathBuf::from("data.json"), PathBuf::from);
        let mut assets_dir = std::env::var("LESSONS_ASSETS")
            .map_or_else(|_| PathBuf::from("public"), PathBuf::from);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--addr" => addr = require_value(args, "--addr")?,
                "--data" => data_path = PathBuf::from(require_value(args, "--data")?),
                "--assets" => assets_dir = PathBuf::from(require_value(args, "--assets")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let addr = addr
            .parse()
            .map_err(|_| ArgsError::InvalidAddr { raw: addr })?;

        Ok(Self {
            addr,
            data_path,
            assets_dir,
        })
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse(&mut std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let store = Arc::new(JsonFileStore::new(&args.data_path));
    let service = Arc::new(ProgressService::load(Clock::default_clock(), store).await);

    let router = api::with_static_assets(api::router(service), &args.assets_dir);

    let listener = tokio::net::TcpListener::bind(args.addr).await?;
    info!(
        addr = %args.addr,
        data = %args.data_path.display(),
        "lesson progress server listening"
    );
    axum::serve(listener, router).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
