use clap::Parser;
use std::path::PathBuf;

/// Console marketplace over fixed-width flat-file stores
#[derive(Parser, Debug)]
#[command(name = "marketplace")]
#[command(about = "Console marketplace simulator over flat-file record stores", long_about = None)]
pub struct CliArgs {
    /// User accounts store file
    #[arg(value_name = "ACCOUNTS", help = "Path to the user accounts file")]
    pub accounts_file: PathBuf,

    /// Game inventory store file
    #[arg(value_name = "INVENTORY", help = "Path to the game inventory file")]
    pub inventory_file: PathBuf,

    /// Games-collection (ownership) store file
    #[arg(value_name = "OWNERSHIP", help = "Path to the games collection file")]
    pub ownership_file: PathBuf,

    /// Daily transaction log file
    #[arg(value_name = "LOG", help = "Path to the daily transaction log file")]
    pub log_file: PathBuf,
}
