pub mod archive;
pub mod bmp;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Handle archive files
    Archive {
        #[command(subcommand)]
        command: archive::ArchiveCommands,
    },
    /// Handle BMP images
    Bmp {
        #[command(subcommand)]
        command: bmp::BmpCommands,
    },
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Archive { command } => command.handle(),
            Commands::Bmp { command } => command.handle(),
        }
    }
}
