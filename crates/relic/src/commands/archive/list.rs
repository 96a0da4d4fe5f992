use clap::Args;
use miette::{Context, Result};
use owo_colors::{OwoColorize, Stream::Stdout};
use relic_arc::{Archive, CompressionMethod};
use relic_stream::FileReader;
use std::path::PathBuf;

#[derive(Args)]
pub struct ListArgs {
    /// An input archive file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        let reader = FileReader::open(&self.file)
            .context(format!("path: {}", &self.file.display()))?;
        let archive = Archive::new(reader).context(format!("reading {}", &self.file.display()))?;

        println!(
            "{:>10}  {:>10}  {:>6}  {:<8}  {:<10}  name",
            "size", "stored", "ratio", "method", "crc32"
        );

        let mut stored_total = 0u64;
        for i in 0..archive.len() {
            let entry = archive.by_index(i)?;
            stored_total += entry.stored_size();

            let ratio = if entry.size() == 0 {
                100.0
            } else {
                entry.stored_size() as f64 * 100.0 / entry.size() as f64
            };

            let method = format!("{:<8}", entry.compression_method());
            let method = match entry.compression_method() {
                CompressionMethod::None => method
                    .if_supports_color(Stdout, |t| t.dimmed())
                    .to_string(),
                CompressionMethod::Huffman => method
                    .if_supports_color(Stdout, |t| t.green())
                    .to_string(),
            };

            println!(
                "{:>10}  {:>10}  {:>5.1}%  {}  {:#010x}  {}",
                entry.size(),
                entry.stored_size(),
                ratio,
                method,
                entry.crc32(),
                entry.name()
            );
        }

        println!(
            "{} entries, {} bytes stored, {} bytes decompressed",
            archive.len(),
            stored_total,
            archive
                .decompressed_size()
                .map_or_else(|| "too many".to_owned(), |size| size.to_string())
        );

        Ok(())
    }
}
