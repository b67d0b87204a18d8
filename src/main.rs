use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use html_json_config::{BuildContext, Deferred, FileConfig, JsonConfigPlugin, DEFAULT_PLUGIN_NAME};

#[derive(Parser)]
#[command(
    name = "html-json-config",
    about = "Summarize a built HTML page's assets as JSON"
)]
struct Cli {
    /// TOML config file (JSON_CONFIG_* env vars override it)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Build output directory, absolute or relative to the project root
    #[arg(short, long)]
    dist_dir: Option<PathBuf>,

    /// Base for a relative dist dir (default: current directory)
    #[arg(short, long)]
    project_root: Option<PathBuf>,

    /// Input file name or glob inside the dist dir
    #[arg(short, long)]
    input: Option<String>,

    /// Output file name inside the dist dir
    #[arg(short, long)]
    output: Option<String>,

    /// JSON blueprint that replaces the built-in one
    #[arg(short, long)]
    blueprint: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut file = FileConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(input) = cli.input {
        file.file_input_pattern = input;
    }
    if let Some(output) = cli.output {
        file.file_output_pattern = output;
    }
    if cli.blueprint.is_some() {
        file.blueprint_path = cli.blueprint;
    }
    let dist_dir = cli.dist_dir.or_else(|| file.dist_dir.clone());
    let project_root = cli.project_root.or_else(|| file.project_root.clone());

    let mut config = file.into_plugin_config()?;
    config.dist_dir = dist_dir.map(Deferred::Literal);
    config.project_root = project_root.map(Deferred::Literal);

    let cwd = std::env::current_dir().context("reading current directory")?;
    let context = BuildContext::new(cwd.join("dist"), cwd);

    let mut plugin = JsonConfigPlugin::new(DEFAULT_PLUGIN_NAME, config);
    plugin.configure(&context)?;
    let result = plugin.did_build(&context).await?;

    for file in &result.dist_files {
        println!("{file}");
    }
    Ok(())
}
