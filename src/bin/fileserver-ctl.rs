use std::io::Write;

use clap::{Parser, Subcommand};
use futures_util::StreamExt;

#[derive(Parser)]
#[command(name = "fileserver-ctl")]
#[command(about = "Client for a running fileserver", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether the server is running
    Health,
    /// Ask the server to shut down
    Shutdown,
    /// Stream a directory listing
    List {
        /// any, file, or dir
        #[arg(long = "type", default_value = "file")]
        file_type: String,
        /// yes or no
        #[arg(long, default_value = "yes")]
        recursive: String,
        /// Directory under the served root to start from
        #[arg(long, default_value = "")]
        startswith: String,
    },
    /// Download a file to stdout
    Get {
        /// Path relative to the served root
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Health => client.get(format!("{}/health", base)).send().await?,
        Commands::Shutdown => client.post(format!("{}/shutdown", base)).send().await?,
        Commands::List {
            file_type,
            recursive,
            startswith,
        } => {
            client
                .get(format!("{}/filelist", base))
                .query(&[
                    ("type", file_type.as_str()),
                    ("recursive", recursive.as_str()),
                    ("startswith", startswith.as_str()),
                ])
                .send()
                .await?
        }
        Commands::Get { path } => {
            client
                .get(format!("{}/files/{}", base, path.trim_start_matches('/')))
                .send()
                .await?
        }
    };

    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Ok(text) = res.text().await {
            if !text.is_empty() {
                eprint!("{}", text);
            }
        }
        std::process::exit(1);
    }

    stream_body(res).await
}

async fn stream_body(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = std::io::stdout().lock();
    let mut body = res.bytes_stream();
    while let Some(chunk) = body.next().await {
        stdout.write_all(&chunk?)?;
    }
    stdout.flush()?;
    Ok(())
}
