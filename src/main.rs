use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use mcpkg::catalog::{Catalog, CurseForge, ModLoader};
use mcpkg::commands;
use mcpkg::commands::install::{InstallOptions, InstallOutcome};
use mcpkg::http::HttpClient;
use mcpkg::runtime::{RealRuntime, Runtime};

/// mcpkg - Minecraft mod package manager
///
/// Installs mods and their dependencies from CurseForge into ./mods and
/// tracks them in mcpkg.json.
///
/// The CURSEFORGE_KEY environment variable must hold a CurseForge API key
/// for any command that talks to the catalog.
///
/// Examples:
///   mcpkg init 1.19.2 forge
///   mcpkg install jei sodium
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project directory holding mcpkg.json and mods/ (defaults to the
    /// current directory; also via MCPKG_DIR)
    #[arg(
        long = "dir",
        short = 'C',
        env = "MCPKG_DIR",
        value_name = "PATH",
        global = true
    )]
    pub project_dir: Option<PathBuf>,

    /// CurseForge API URL (defaults to https://api.curseforge.com)
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Create a new mcpkg.json in the project directory
    Init(InitArgs),

    /// Install mods and their required dependencies
    Install(InstallArgs),

    /// Remove mods and the dependencies nothing else needs
    Remove(RemoveArgs),

    /// Re-install every user-requested mod at its latest version
    Update,

    /// Remove dependency mods no user-requested mod needs any more
    #[command(alias = "prune")]
    Autoremove,

    /// Search the catalog for mods
    Search(SearchArgs),
}

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Minecraft version, e.g. 1.19.2
    #[arg(value_name = "VERSION")]
    pub version: String,

    /// Mod loader: forge or fabric
    #[arg(value_name = "LOADER")]
    pub loader: String,
}

#[derive(clap::Args, Debug)]
pub struct InstallArgs {
    /// Mod slugs to install
    #[arg(value_name = "SLUG")]
    pub slugs: Vec<String>,

    /// Resolve against this Minecraft version instead of the indexed one
    #[arg(long, short = 'v', value_name = "VERSION")]
    pub version: Option<String>,

    /// Resolve against this mod loader instead of the indexed one
    #[arg(long, short = 'l', value_name = "LOADER")]
    pub loader: Option<String>,

    /// Read additional slugs from a file, one per line
    #[arg(long, short = 'r', value_name = "FILE")]
    pub requirements: Option<PathBuf>,

    /// Also install optional dependencies
    #[arg(long)]
    pub optional: bool,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Mod slugs to remove
    #[arg(value_name = "SLUG")]
    pub slugs: Vec<String>,

    /// Read additional slugs from a file, one per line
    #[arg(long, short = 'r', value_name = "FILE")]
    pub requirements: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Search terms
    #[arg(value_name = "QUERY", required = true)]
    pub query: Vec<String>,
}

fn catalog_from_env(
    runtime: &RealRuntime,
    api_url: Option<String>,
) -> Result<(CurseForge, HttpClient)> {
    let key = runtime
        .env_var("CURSEFORGE_KEY")
        .context("missing env variable CURSEFORGE_KEY")?;
    let http = HttpClient::new(CurseForge::client(&key)?);
    let catalog = CurseForge::new(http.clone(), api_url);
    Ok((catalog, http))
}

fn check(outcome: InstallOutcome) -> Result<()> {
    if outcome.is_success() {
        Ok(())
    } else {
        anyhow::bail!("some mods could not be installed");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = RealRuntime;

    let project_dir = match cli.project_dir {
        Some(dir) => dir,
        None => runtime.current_dir()?,
    };

    match cli.command {
        Commands::Init(args) => {
            let loader: ModLoader = args.loader.parse()?;
            commands::init::init(&runtime, &project_dir, &args.version, loader)
        }
        Commands::Install(args) => {
            let (catalog, http) = catalog_from_env(&runtime, cli.api_url)?;
            let options = InstallOptions {
                version: args.version,
                loader: args.loader.as_deref().map(str::parse).transpose()?,
                requirements: args.requirements,
                include_optional: args.optional,
            };
            let outcome = commands::install::install(
                &runtime,
                &catalog as &dyn Catalog,
                &http,
                &project_dir,
                args.slugs,
                options,
            )
            .await?;
            check(outcome)
        }
        Commands::Remove(args) => {
            commands::remove::remove(&runtime, &project_dir, args.slugs, args.requirements)
        }
        Commands::Update => {
            let (catalog, http) = catalog_from_env(&runtime, cli.api_url)?;
            let outcome =
                commands::update::update(&runtime, &catalog as &dyn Catalog, &http, &project_dir)
                    .await?;
            check(outcome)
        }
        Commands::Autoremove => commands::autoremove::autoremove(&runtime, &project_dir),
        Commands::Search(args) => {
            let (catalog, _) = catalog_from_env(&runtime, cli.api_url)?;
            commands::search::search(&catalog as &dyn Catalog, &args.query.join(" ")).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_init_parsing() {
        let cli = Cli::try_parse_from(["mcpkg", "init", "1.19.2", "forge"]).unwrap();
        match cli.command {
            Commands::Init(args) => {
                assert_eq!(args.version, "1.19.2");
                assert_eq!(args.loader, "forge");
            }
            _ => panic!("Expected Init command"),
        }
        assert_eq!(cli.project_dir, None);
    }

    #[test]
    fn test_cli_install_parsing() {
        let cli = Cli::try_parse_from(["mcpkg", "install", "jei", "sodium", "--optional"]).unwrap();
        match cli.command {
            Commands::Install(args) => {
                assert_eq!(args.slugs, vec!["jei", "sodium"]);
                assert!(args.optional);
                assert_eq!(args.requirements, None);
            }
            _ => panic!("Expected Install command"),
        }
    }

    #[test]
    fn test_cli_install_overrides_parsing() {
        let cli = Cli::try_parse_from([
            "mcpkg", "install", "jei", "-v", "1.20.1", "-l", "fabric", "-r", "mods.txt",
        ])
        .unwrap();
        match cli.command {
            Commands::Install(args) => {
                assert_eq!(args.version.as_deref(), Some("1.20.1"));
                assert_eq!(args.loader.as_deref(), Some("fabric"));
                assert_eq!(args.requirements, Some(PathBuf::from("mods.txt")));
            }
            _ => panic!("Expected Install command"),
        }
    }

    #[test]
    fn test_cli_global_dir_parsing() {
        let cli = Cli::try_parse_from(["mcpkg", "--dir", "/tmp/pack", "update"]).unwrap();
        assert_eq!(cli.project_dir, Some(PathBuf::from("/tmp/pack")));

        let cli = Cli::try_parse_from(["mcpkg", "install", "jei", "-C", "/tmp/pack"]).unwrap();
        assert_eq!(cli.project_dir, Some(PathBuf::from("/tmp/pack")));
    }

    #[test]
    fn test_cli_autoremove_alias() {
        let cli = Cli::try_parse_from(["mcpkg", "prune"]).unwrap();
        assert!(matches!(cli.command, Commands::Autoremove));
    }

    #[test]
    fn test_cli_search_requires_a_query() {
        assert!(Cli::try_parse_from(["mcpkg", "search"]).is_err());
        let cli = Cli::try_parse_from(["mcpkg", "search", "just", "enough"]).unwrap();
        match cli.command {
            Commands::Search(args) => assert_eq!(args.query, vec!["just", "enough"]),
            _ => panic!("Expected Search command"),
        }
    }

    #[test]
    fn test_cli_no_subcommand_fails() {
        assert!(Cli::try_parse_from(["mcpkg", "jei"]).is_err());
    }
}
