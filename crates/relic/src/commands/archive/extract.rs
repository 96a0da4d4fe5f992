use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use relic_arc::Archive;
use relic_stream::FileReader;
use std::{
    fs::File,
    path::{Component, Path, PathBuf},
};
use tracing::{info, warn};

#[derive(Args)]
pub struct ExtractArgs {
    /// An input archive file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

/// Relative path an entry may be extracted to, if its name stays inside the target directory
fn enclosed_name(name: &str) -> Option<PathBuf> {
    let name = name.replace('\\', "/");
    let mut path = PathBuf::new();
    for component in Path::new(&name).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if path.as_os_str().is_empty() {
        None
    } else {
        Some(path)
    }
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let reader = FileReader::open(&self.file)
            .context(format!("path: {}", &self.file.display()))?;
        let archive = Archive::new(reader).context(format!("reading {}", &self.file.display()))?;

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;

            let Some(relative) = enclosed_name(entry.name()) else {
                warn!("skipping {:?}, it would be written outside of the target", entry.name());
                continue;
            };

            let p = self.directory.join(relative);
            info!("writing {}", p.display());

            if let Some(parent) = p.parent() {
                std::fs::create_dir_all(parent)
                    .into_diagnostic()
                    .context(format!("creating {}", parent.display()))?;
            }
            let mut out = if !self.overwrite {
                File::create_new(&p)
                    .into_diagnostic()
                    .context(format!("creating {}", &p.display()))?
            } else {
                File::create(&p)
                    .into_diagnostic()
                    .context(format!("creating {}", &p.display()))?
            };

            std::io::copy(&mut entry, &mut out)
                .into_diagnostic()
                .context(format!("extracting {}", entry.name()))?;
        }
        Ok(())
    }
}
