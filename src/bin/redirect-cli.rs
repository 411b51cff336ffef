use std::path::PathBuf;

use axum::http::{Method, Request};
use clap::{Parser, Subcommand};
use serde_json::json;
use url::Url;

use redirector::config::load_config;
use redirector::routing::RedirectResolver;

#[derive(Parser)]
#[command(name = "redirect-cli")]
#[command(about = "Offline checks for redirector rule files", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "redirects.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and summarize the rule set
    Check,
    /// Show how a URL would be resolved
    Resolve {
        /// Absolute URL on the old site, e.g. https://old.example/posts?x=1#top
        url: String,

        /// Request method passed to pattern rules
        #[arg(short, long, default_value = "GET")]
        method: String,
    },
}

fn main() {
    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&cli.config)?;
    let resolver = RedirectResolver::from_config(&config.redirect)?;

    match cli.command {
        Commands::Check => {
            let (exact, gone, patterns) = resolver.rule_counts();
            let summary = json!({
                "new_origin": resolver.origin().to_string(),
                "permanent_code": resolver.permanent_code().as_u16(),
                "normalization": resolver.policy(),
                "rules": { "exact": exact, "gone": gone, "patterns": patterns },
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Resolve { url, method } => {
            let url = Url::parse(&url)?;
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())?;
            let (parts, ()) = Request::builder()
                .method(method)
                .uri(url.path())
                .body(())?
                .into_parts();

            let resolution = resolver.resolve_with_stage(&parts, &url);
            let mut output = serde_json::to_value(&resolution.result)?;
            output["stage"] = json!(resolution.stage);
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
