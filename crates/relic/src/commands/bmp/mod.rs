pub mod info;

#[derive(clap::Subcommand)]
pub enum BmpCommands {
    /// Show the headers and palette of a BMP file
    Info(info::InfoArgs),
}

impl BmpCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            BmpCommands::Info(info) => info.handle(),
        }
    }
}
