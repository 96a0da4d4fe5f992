use clap::Args;
use miette::{Context, Result};
use owo_colors::{OwoColorize, Stream::Stdout};
use relic_bmp::{Bitmap, PixelFormat};
use relic_stream::{FileReader, SeekableReader};
use std::path::PathBuf;

#[derive(Args)]
pub struct InfoArgs {
    /// An input BMP file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Print every palette entry
    #[arg(long, default_value_t = false)]
    palette: bool,
}

impl InfoArgs {
    pub fn handle(&self) -> Result<()> {
        let reader = FileReader::open(&self.file)
            .context(format!("path: {}", &self.file.display()))?;
        let bitmap = Bitmap::read(&reader).context(format!("reading {}", &self.file.display()))?;
        let (_, info) = bitmap.headers()?;

        let depth = match bitmap.format() {
            PixelFormat::Indexed8 => "8 bit indexed",
            PixelFormat::Rgb24 => "24 bit RGB",
        };

        println!("file:       {}", self.file.display());
        println!("size:       {} bytes", reader.length());
        println!("dimensions: {}x{}", bitmap.width(), bitmap.height());
        println!("format:     {}", depth);
        println!("row stride: {} bytes", info.row_stride());
        println!("palette:    {} colors", bitmap.palette().len());

        if self.palette {
            for (index, entry) in bitmap.palette().iter().enumerate() {
                let [red, green, blue] = entry.to_rgb();
                println!(
                    "{:>3}: #{:02X}{:02X}{:02X} {}",
                    index,
                    red,
                    green,
                    blue,
                    "    ".if_supports_color(Stdout, |t| t.on_truecolor(red, green, blue))
                );
            }
        }

        Ok(())
    }
}
