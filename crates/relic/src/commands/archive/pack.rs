use clap::Args;
use miette::miette;
use miette::{Context, IntoDiagnostic, Result};
use relic_arc::{ArchiveWriter, ArchiveWriterOptions, CompressionMethod};
use std::{
    fs::File,
    io::BufWriter,
    path::{Component, Path, PathBuf},
};
use tracing::info;
use walkdir::WalkDir;

#[derive(Args)]
pub struct PackArgs {
    /// An input directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// A target archive file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,

    /// Store every entry without compressing it
    #[arg(long, default_value_t = false)]
    store: bool,
}

/// Entry name for a path relative to the packed directory, always using `/`
fn entry_name(relative: &Path) -> Result<String> {
    let parts = relative
        .components()
        .map(|component| match component {
            Component::Normal(part) => part
                .to_str()
                .ok_or(miette!("unable to convert {} to a string", relative.display())),
            _ => Err(miette!("unexpected path component in {}", relative.display())),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(parts.join("/"))
}

impl PackArgs {
    pub fn handle(&self) -> Result<()> {
        info!("creating {}", &self.file.display());

        let files = WalkDir::new(&self.directory)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| !e.file_type().is_dir())
            .collect::<Vec<_>>();

        if files.is_empty() {
            return Err(miette!("directory is empty"));
        }

        let out = if !self.overwrite {
            File::create_new(&self.file)
                .into_diagnostic()
                .context(format!("creating {}", &self.file.display()))?
        } else {
            File::create(&self.file)
                .into_diagnostic()
                .context(format!("creating {}", &self.file.display()))?
        };

        let compression = if self.store {
            CompressionMethod::None
        } else {
            CompressionMethod::Huffman
        };

        let mut archive = ArchiveWriter::new(
            BufWriter::new(out),
            ArchiveWriterOptions::builder()
                .store_incompressible(true)
                .build(),
        );

        for file in &files {
            let name = entry_name(
                file.path()
                    .strip_prefix(&self.directory)
                    .into_diagnostic()?,
            )?;
            info!("packing {}", name);

            archive
                .start_file(&name, compression)
                .context(format!("starting entry for {}", name))?;

            let mut f = File::open(file.path())
                .into_diagnostic()
                .context(format!("opening {}", file.path().display()))?;

            std::io::copy(&mut f, &mut archive)
                .into_diagnostic()
                .context(format!("copying {}", file.path().display()))?;
        }

        archive.finish().context("finalizing archive")?;
        info!("packed {} files", files.len());

        Ok(())
    }
}
