use artifact_index::{ArtifactsQuery, ArtifactsService, Config, SortKey, SortOrder, SupportStatus};
use clap::{Parser, Subcommand};
use color_eyre::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "artifact-index")]
#[command(about = "Query FiveM server artifacts built from GitHub release tags")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/artifact-index/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Filter, sort and paginate artifacts
  List {
    /// windows, linux or all
    #[arg(short, long)]
    platform: Option<String>,

    /// Exact build number
    #[arg(long = "build", value_name = "VERSION")]
    version: Option<String>,

    /// recommended, latest, active, deprecated or eol
    #[arg(short, long)]
    status: Option<SupportStatus>,

    /// version, date or size
    #[arg(long, default_value = "version")]
    sort_by: String,

    /// asc or desc
    #[arg(long, default_value = "desc")]
    sort_order: String,

    /// Page size (0 = 50)
    #[arg(short, long, default_value_t = 0)]
    limit: usize,

    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    offset: i64,

    /// Keep end-of-life builds
    #[arg(long)]
    include_eol: bool,

    /// Print pagination and per-platform stats alongside the artifacts
    #[arg(long)]
    summary: bool,
  },

  /// Print raw repository tags
  Tags {
    /// Skip the cache and always ask GitHub
    #[arg(long)]
    no_cache: bool,
  },

  /// Print raw repository issues
  Issues {
    /// Skip the cache and always ask GitHub
    #[arg(long)]
    no_cache: bool,
  },
}

fn init_tracing(log_file: Option<&Path>) -> Option<WorkerGuard> {
  let filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("artifact_index=info"));

  match log_file {
    Some(path) => {
      let dir = path.parent().unwrap_or_else(|| Path::new("."));
      let name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "artifact-index.log".into());
      let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
      tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
      Some(guard)
    }
    None => {
      tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
      None
    }
  }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = Config::load(args.config.as_deref())?;
  let _guard = init_tracing(config.log_file.as_deref());

  let service = ArtifactsService::from_config(&config)?;

  match args.command {
    Command::List {
      platform,
      version,
      status,
      sort_by,
      sort_order,
      limit,
      offset,
      include_eol,
      summary,
    } => {
      let query = ArtifactsQuery {
        platform,
        version,
        status,
        include_eol,
        sort_by: SortKey::from(sort_by.as_str()),
        sort_order: SortOrder::from(sort_order.as_str()),
        limit,
        offset,
      };

      if summary {
        print_json(&service.get_artifact_page(&query).await?)?;
      } else {
        print_json(&service.get_artifacts(&query).await?)?;
      }
    }
    Command::Tags { no_cache } => {
      print_json(&service.fetch_github_tags(!no_cache).await?)?;
    }
    Command::Issues { no_cache } => {
      print_json(&service.fetch_github_issues(!no_cache).await?)?;
    }
  }

  let limit = service.rate_limit();
  if let Some(remaining) = limit.remaining {
    info!(remaining, reset_at = ?limit.reset_at, "GitHub rate limit");
  }

  Ok(())
}
