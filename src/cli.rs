use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "paldeck", version, about = "Structured pal data from the Palworld wiki")]
pub struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Every pal on the list page
    List(FetchArgs),
    /// The full record of one pal
    Detail(DetailArgs),
    /// Extract a pal record from a saved HTML page
    Parse(ParseArgs),
    /// Raw JSON from the configured data provider
    Api(ApiArgs),
}

#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// Ignore cached data
    #[arg(long, default_value_t = false)]
    pub force: bool,
}

#[derive(Args, Debug, Clone)]
pub struct DetailArgs {
    /// Page slug, e.g. `Lamball`
    pub slug: String,

    #[command(flatten)]
    pub fetch: FetchArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    pub file: PathBuf,

    /// Page slug; defaults to the file name without its extension
    #[arg(long)]
    pub slug: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ApiArgs {
    /// Path relative to `api.base_url`
    pub path: String,

    #[command(flatten)]
    pub fetch: FetchArgs,
}
