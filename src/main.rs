mod cli;

use crate::cli::{ApiArgs, Cli, Commands, DetailArgs, ParseArgs};
use clap::Parser;
use derive_more::{Display, Error};
use exn::{OptionExt, ResultExt};
use paldeck_config::Config;
use paldeck_extract::models::PalDetail;
use paldeck_fetch::{ApiClient, WikiClient};
use serde::Serialize;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, exn::Exn<ErrorKind>>;

#[derive(Debug, Display, Error)]
enum ErrorKind {
    #[display("configuration error")]
    Config,
    #[display("could not fetch {_0}")]
    Fetch(#[error(not(source))] String),
    #[display("could not read {_0}")]
    Read(#[error(not(source))] String),
    #[display("could not extract {_0}")]
    Extract(#[error(not(source))] String),
    #[display("could not write output")]
    Output,
}

/// A detail record with its derived flags, as printed.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DetailOutput<'a> {
    #[serde(flatten)]
    detail: &'a PalDetail,
    is_alpha: bool,
    is_variant: bool,
}
impl<'a> From<&'a PalDetail> for DetailOutput<'a> {
    fn from(detail: &'a PalDetail) -> Self {
        Self { detail, is_alpha: detail.is_alpha(), is_variant: detail.is_variant() }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:?}");
            ExitCode::FAILURE
        },
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(env_filter).with_target(false).with_writer(std::io::stderr).init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    match cli.command {
        Commands::List(args) => {
            let client = wiki_client(&config)?;
            let list = client.list(args.force).await.or_raise(|| ErrorKind::Fetch("the list page".to_string()))?;
            print_json(list.as_ref())
        },
        Commands::Detail(DetailArgs { slug, fetch }) => {
            let client = wiki_client(&config)?;
            let detail = client.detail(&slug, fetch.force).await.or_raise(|| ErrorKind::Fetch(slug.clone()))?;
            print_json(&DetailOutput::from(detail.as_ref()))
        },
        Commands::Parse(args) => parse(&config, args),
        Commands::Api(ApiArgs { path, fetch }) => {
            let base_url = config.api.base_url.as_deref().ok_or_raise(|| ErrorKind::Config)?;
            let client = ApiClient::new(base_url, &config.fetch_options()).or_raise(|| ErrorKind::Config)?;
            let value: serde_json::Value =
                client.fetch(&path, fetch.force).await.or_raise(|| ErrorKind::Fetch(client.url(&path)))?;
            print_json(&value)
        },
    }
}

fn wiki_client(config: &Config) -> Result<WikiClient> {
    WikiClient::new(config.site(), &config.fetch_options()).or_raise(|| ErrorKind::Config)
}

fn parse(config: &Config, ParseArgs { file, slug }: ParseArgs) -> Result<()> {
    let display = file.display().to_string();
    let html = std::fs::read_to_string(&file).or_raise(|| ErrorKind::Read(display.clone()))?;
    let slug = slug
        .or_else(|| file.file_stem().and_then(|stem| stem.to_str()).map(str::to_string))
        .ok_or_raise(|| ErrorKind::Extract(display.clone()))?;
    let detail = paldeck_extract::extract_detail(&html, &slug, &config.site()).or_raise(|| ErrorKind::Extract(display))?;
    print_json(&DetailOutput::from(&detail))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).or_raise(|| ErrorKind::Output)?;
    println!("{json}");
    Ok(())
}
