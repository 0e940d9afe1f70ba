use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "phongtro",
    about = "Room-rental catalog service: browse, create, and delete listings",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the catalog HTTP server
    Serve(ServeArgs),
    /// Upload the local rooms.json to the configured object store
    PushCollection(PushCollectionArgs),
    /// Probe the configured storage backend: write, read back, delete
    CheckStore(CheckStoreArgs),
    /// Check that every listing's image locators resolve to stored blobs
    VerifyImages(VerifyImagesArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Override BIND_ADDR from the environment
    #[arg(long)]
    pub bind: Option<String>,
}

#[derive(Args)]
pub struct PushCollectionArgs {
    /// Local collection file to upload
    #[arg(long, default_value = "data/rooms.json")]
    pub file: String,
}

#[derive(Args)]
pub struct CheckStoreArgs {}

#[derive(Args)]
pub struct VerifyImagesArgs {}
