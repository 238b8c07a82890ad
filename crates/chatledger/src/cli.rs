//! Command line interface.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use chatledger_core::{
    Account, AvatarResolver, MemoryAvatarCache, StorageConfig, resolve_all, validate_identity,
};

#[derive(Parser, Debug)]
#[command(name = "chatledger")]
#[command(about = "Inspect chat accounts and their on-device avatars", long_about = None)]
pub struct Cli {
    /// Config file (defaults to the user config directory).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the owner directory and, with an id, the avatar paths.
    Paths(PathsArgs),
    /// Show name, kind, paths and avatar status of one account.
    Inspect(InspectArgs),
    /// Resolve the avatars of several accounts concurrently.
    Avatars(AvatarsArgs),
}

#[derive(Debug, Args)]
pub struct PathsArgs {
    /// UIN of the local user.
    #[arg(long)]
    pub owner_uin: String,
    /// Account id.
    #[arg(long)]
    pub id: Option<String>,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// UIN of the local user.
    #[arg(long)]
    pub owner_uin: String,
    /// Account id.
    #[arg(long)]
    pub id: String,
    /// Nickname, if known.
    #[arg(long)]
    pub nickname: Option<String>,
    /// Alias, if known.
    #[arg(long)]
    pub alias: Option<String>,
    /// Write the avatar to this file (format from extension).
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct AvatarsArgs {
    /// UIN of the local user.
    #[arg(long)]
    pub owner_uin: String,
    /// Account ids.
    #[arg(long = "id", required = true)]
    pub ids: Vec<String>,
}

impl Cli {
    /// Load the storage config named on the command line, or the default one.
    pub fn storage_config(&self) -> anyhow::Result<StorageConfig> {
        let path = self.config.clone().unwrap_or_else(StorageConfig::default_path);
        StorageConfig::load(&path).with_context(|| format!("loading config {}", path.display()))
    }

    /// Run the selected command.
    pub async fn run(self) -> anyhow::Result<()> {
        let config = self.storage_config()?;
        match self.command {
            Commands::Paths(args) => paths(&config, &args),
            Commands::Inspect(args) => inspect(&config, args),
            Commands::Avatars(args) => avatars(&config, args).await,
        }
    }
}

fn resolver(config: &StorageConfig) -> anyhow::Result<AvatarResolver> {
    config
        .ensure_backup_root()
        .context("creating avatar backup directory")?;
    Ok(AvatarResolver::new(
        Arc::new(MemoryAvatarCache::new()),
        config.copier(),
    ))
}

fn paths(config: &StorageConfig, args: &PathsArgs) -> anyhow::Result<()> {
    let mut account = Account::try_new(config, args.owner_uin.as_str())?;
    println!("owner dir:       {}", account.owner_dir_path().display());

    if let Some(id) = &args.id {
        account.try_endow_identity(id.as_str())?;
        if let Some(paths) = account.avatar_paths() {
            println!("original avatar: {}", paths.original.display());
            println!("backup avatar:   {}", paths.backup.display());
        }
    }
    Ok(())
}

fn inspect(config: &StorageConfig, args: InspectArgs) -> anyhow::Result<()> {
    validate_identity(&args.owner_uin, &args.id)
        .map_err(chatledger_core::Error::from)?;

    let mut account = Account::with_identity(config, args.owner_uin, args.id);
    account.nickname = args.nickname;
    account.alias = args.alias;

    println!("name:            {}", account.name());
    if let Some(kind) = account.kind() {
        println!("kind:            {kind}");
    }
    println!("owner dir:       {}", account.owner_dir_path().display());
    if let Some(paths) = account.avatar_paths() {
        println!("original avatar: {}", paths.original.display());
        println!("backup avatar:   {}", paths.backup.display());
    }

    let resolver = resolver(config)?;
    match account.avatar(&resolver) {
        Some(avatar) => {
            println!("avatar:          {}x{}", avatar.width(), avatar.height());
            if let Some(export) = &args.export {
                avatar
                    .save(export)
                    .with_context(|| format!("writing {}", export.display()))?;
                tracing::info!("Avatar written to {}", export.display());
            }
        }
        None => println!("avatar:          none"),
    }
    Ok(())
}

async fn avatars(config: &StorageConfig, args: AvatarsArgs) -> anyhow::Result<()> {
    let resolver = resolver(config)?;
    let mut accounts = Vec::with_capacity(args.ids.len());
    for id in args.ids {
        validate_identity(&args.owner_uin, &id).map_err(chatledger_core::Error::from)?;
        accounts.push(Arc::new(Account::with_identity(
            config,
            args.owner_uin.as_str(),
            id,
        )));
    }

    let results = resolve_all(&resolver, &accounts).await;
    for (account, avatar) in accounts.iter().zip(results) {
        let id = account.id().unwrap_or_default();
        match avatar {
            Some(avatar) => println!("{id}\t{}x{}", avatar.width(), avatar.height()),
            None => println!("{id}\tnone"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_inspect() {
        let cli = Cli::parse_from([
            "chatledger",
            "--config",
            "/tmp/c.json",
            "inspect",
            "--owner-uin",
            "42",
            "--id",
            "wxid_a",
            "--nickname",
            "Alice",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.json")));
        match cli.command {
            Commands::Inspect(args) => {
                assert_eq!(args.owner_uin, "42");
                assert_eq!(args.id, "wxid_a");
                assert_eq!(args.nickname.as_deref(), Some("Alice"));
                assert!(args.export.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn avatars_collects_repeated_ids() {
        let cli = Cli::parse_from([
            "chatledger", "avatars", "--owner-uin", "1", "--id", "a", "--id", "b@chatroom",
        ]);
        match cli.command {
            Commands::Avatars(args) => assert_eq!(args.ids, ["a", "b@chatroom"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn avatars_requires_an_id() {
        assert!(Cli::try_parse_from(["chatledger", "avatars", "--owner-uin", "1"]).is_err());
    }

    #[test]
    fn command_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
