use anyhow::Context;
use colored::Colorize;
use phongtro_server::{CatalogServer, ServerConfig, StorageConfig};
use phongtro_store::{BlobStore, CollectionStore};
use phongtro_types::Listing;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args).await,
        Command::PushCollection(args) => cmd_push_collection(args).await,
        Command::CheckStore(_) => cmd_check_store().await,
        Command::VerifyImages(_) => cmd_verify_images().await,
    }
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = ServerConfig::from_env()?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind.parse().context("invalid --bind address")?;
    }
    CatalogServer::new(config)?.serve().await?;
    Ok(())
}

async fn cmd_push_collection(args: PushCollectionArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("cannot read {}", args.file))?;
    let rooms: Vec<Listing> =
        serde_json::from_str(&text).with_context(|| format!("{} is not a room array", args.file))?;

    let storage = StorageConfig::from_env()?;
    anyhow::ensure!(
        matches!(storage, StorageConfig::S3 { .. }),
        "push-collection requires STORAGE_BACKEND=s3"
    );
    let (_, collection) = storage.build_stores()?;

    println!("Uploading {} ({} rooms)...", args.file.bold(), rooms.len());
    collection.save(&rooms).await?;

    let stored = collection.load().await?;
    println!(
        "{} Verified: {} rooms in the object store",
        "✓".green().bold(),
        stored.len()
    );
    Ok(())
}

async fn cmd_check_store() -> anyhow::Result<()> {
    let storage = StorageConfig::from_env()?;
    match &storage {
        StorageConfig::Local {
            media_root,
            rooms_file,
            ..
        } => println!(
            "Backend: {} (media {}, collection {})",
            "local".bold(),
            media_root.display(),
            rooms_file.display()
        ),
        StorageConfig::S3 { bucket, region } => {
            println!("Backend: {} (bucket {}, region {})", "s3".bold(), bucket.bold(), region)
        }
    }
    let (blobs, collection) = storage.build_stores()?;

    let probe_path = "diagnostics/check.txt";
    let probe_body = bytes::Bytes::from_static(b"phongtro store check");

    print!("Write... ");
    let locator = blobs.put(probe_path, probe_body, "text/plain").await?;
    println!("{} ({locator})", "✓".green());

    print!("List... ");
    let listed = blobs.list("diagnostics").await?;
    anyhow::ensure!(
        listed.contains(&probe_path.to_string()),
        "probe object missing from listing"
    );
    println!("{}", "✓".green());

    print!("Delete... ");
    blobs.delete(probe_path).await?;
    println!("{}", "✓".green());

    print!("Collection... ");
    match collection.load().await {
        Ok(rooms) => println!("{} ({} rooms)", "✓".green(), rooms.len()),
        Err(err) => println!("{} {err}", "✗".red()),
    }
    Ok(())
}

async fn cmd_verify_images() -> anyhow::Result<()> {
    let storage = StorageConfig::from_env()?;
    let (blobs, collection) = storage.build_stores()?;
    let rooms = collection.load().await?;

    let mut checked = 0usize;
    let mut missing = 0usize;
    for room in &rooms {
        let present = blobs.list(room.storage_prefix()).await?;
        for locator in &room.images {
            checked += 1;
            let resolves = blobs
                .key_for(locator)
                .map(|key| present.contains(&key))
                .unwrap_or(false);
            if !resolves {
                missing += 1;
                println!("{} {} -> {}", "✗".red(), room.room_id.bold(), locator);
            }
        }
    }

    if missing == 0 {
        println!(
            "{} All {checked} image references across {} rooms resolve",
            "✓".green().bold(),
            rooms.len()
        );
        Ok(())
    } else {
        anyhow::bail!("{missing} of {checked} image references are missing");
    }
}
