use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the symlink synchronizer.
#[derive(Parser, Debug)]
#[command(
    name = "lnsync",
    about = "Deploy a package of files into a target tree as relative symlinks",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Directory holding the packages and the lnsync.ini config
    /// (default: $LNSYNC_ROOT, then the current directory)
    #[arg(long, global = true)]
    pub package_root: Option<std::path::PathBuf>,

    /// Directory to install links into (default: $HOME)
    #[arg(short, long, global = true)]
    pub target: Option<std::path::PathBuf>,

    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Exit status when the run changed something
    #[arg(long, global = true, default_value_t = 0)]
    pub changed_status: u8,

    /// Exit status when the run changed nothing
    #[arg(long, global = true, default_value_t = 0)]
    pub unchanged_status: u8,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Mirror a package into the target tree
    Install(InstallOpts),
    /// Remove the links a package installed into the target tree
    Uninstall(UninstallOpts),
    /// Print version information
    Version,
}

/// Options for the `install` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct InstallOpts {
    /// Package to install (subdirectory of the package root)
    pub package: String,
}

/// Options for the `uninstall` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct UninstallOpts {
    /// Package to uninstall (subdirectory of the package root)
    pub package: String,
}
