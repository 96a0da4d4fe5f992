use std::io::{Read, Write};

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use relic_arc::error::{Error, Result};
use relic_arc::{Archive, ArchiveWriter, ArchiveWriterOptions, CompressionMethod};
use relic_stream::{ByteReader, FileReader};
use tracing::info;
use tracing_test::traced_test;

fn sample_entries() -> Vec<(String, Vec<u8>)> {
    let text = b"Harvest the crystal fields before the enemy scouts arrive. "
        .iter()
        .copied()
        .cycle()
        .take(4000)
        .collect::<Vec<_>>();

    let noise = (0..1024u32)
        .map(|i| (i.wrapping_mul(2_654_435_761) >> 24) as u8)
        .collect::<Vec<_>>();

    vec![
        ("scripts/mission01.txt".to_owned(), text),
        ("art/noise.raw".to_owned(), noise),
        ("empty.dat".to_owned(), Vec::new()),
        ("single.bin".to_owned(), vec![0x2A]),
    ]
}

fn build_archive(
    entries: &[(String, Vec<u8>)],
    compression: CompressionMethod,
    options: ArchiveWriterOptions,
) -> Result<Vec<u8>> {
    let mut writer = ArchiveWriter::new(Vec::new(), options);
    for (name, data) in entries {
        writer.start_file(name, compression)?;
        writer.write_all(data)?;
    }
    writer.finish()
}

#[traced_test]
#[test]
fn huffman_archive_round_trips() -> Result<()> {
    let entries = sample_entries();
    let bytes = build_archive(
        &entries,
        CompressionMethod::Huffman,
        ArchiveWriterOptions::default(),
    )?;
    info!(size = bytes.len(), "built archive");

    let archive = Archive::new(ByteReader::new(bytes))?;
    assert_eq!(archive.len(), entries.len());
    assert_eq!(
        archive.file_names().collect::<Vec<_>>(),
        entries.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>()
    );
    assert_eq!(
        archive.decompressed_size(),
        Some(entries.iter().map(|(_, d)| d.len() as u128).sum())
    );

    for (name, data) in &entries {
        let entry = archive.by_name(name)?;
        assert_eq!(entry.size(), data.len() as u64);
        assert_eq!(entry.contents()?, *data);
    }

    Ok(())
}

#[traced_test]
#[test]
fn text_is_compressed_and_noise_never_grows() -> Result<()> {
    let entries = sample_entries();
    let bytes = build_archive(
        &entries,
        CompressionMethod::Huffman,
        ArchiveWriterOptions::default(),
    )?;
    let archive = Archive::new(ByteReader::new(bytes))?;

    let text = archive.by_name("scripts/mission01.txt")?;
    assert_eq!(text.compression_method(), CompressionMethod::Huffman);
    assert!(text.stored_size() < text.size() * 3 / 4);

    let noise = archive.by_name("art/noise.raw")?;
    assert!(noise.stored_size() <= noise.size());
    if noise.compression_method() == CompressionMethod::None {
        assert_eq!(noise.stored_size(), noise.size());
    }

    let empty = archive.by_name("empty.dat")?;
    assert_eq!(empty.stored_size(), 0);
    assert_eq!(empty.contents()?, Vec::<u8>::new());

    Ok(())
}

#[traced_test]
#[test]
fn streamed_reads_match_contents() -> Result<()> {
    let entries = sample_entries();
    let bytes = build_archive(
        &entries,
        CompressionMethod::Huffman,
        ArchiveWriterOptions::builder()
            .store_incompressible(false)
            .build(),
    )?;
    let archive = Archive::new(ByteReader::new(bytes))?;

    for i in 0..archive.len() {
        let mut streamed = Vec::new();
        archive.by_index(i)?.read_to_end(&mut streamed)?;
        assert_eq!(streamed, entries[i].1);
    }

    Ok(())
}

#[traced_test]
#[test]
fn archive_reads_from_a_file() -> Result<()> {
    let entries = sample_entries();
    let bytes = build_archive(
        &entries,
        CompressionMethod::Huffman,
        ArchiveWriterOptions::default(),
    )?;

    let path = std::env::temp_dir().join(format!("relic_arc_{}.rlca", std::process::id()));
    std::fs::write(&path, &bytes)?;

    let archive = Archive::new(FileReader::open(&path)?)?;
    for (name, data) in &entries {
        assert_eq!(archive.by_name(name)?.contents()?, *data);
    }
    drop(archive);
    std::fs::remove_file(&path)?;

    Ok(())
}

#[test]
fn corrupt_payload_is_rejected() -> Result<()> {
    let entries = vec![("a.txt".to_owned(), b"aaaaaaaaaaaaaaaaaaaaaaaabbbb".to_vec())];
    let mut bytes = build_archive(
        &entries,
        CompressionMethod::Huffman,
        ArchiveWriterOptions::default(),
    )?;

    // flip every bit of the first coded byte
    bytes[20] ^= 0xFF;

    let archive = Archive::new(ByteReader::new(bytes))?;
    let entry = archive.by_index(0)?;
    assert_eq!(entry.compression_method(), CompressionMethod::Huffman);

    let result = entry.contents();
    assert!(
        matches!(
            result,
            Err(Error::CorruptData(_))
                | Err(Error::ChecksumMismatch { .. })
                | Err(Error::HuffmanError(_))
        ),
        "{result:?}"
    );

    Ok(())
}

#[test]
fn truncated_archive_is_invalid() -> Result<()> {
    let bytes = build_archive(
        &sample_entries(),
        CompressionMethod::Huffman,
        ArchiveWriterOptions::default(),
    )?;

    let truncated = bytes[..bytes.len() - 3].to_vec();
    assert!(matches!(
        Archive::new(ByteReader::new(truncated)),
        Err(Error::InvalidArchive)
    ));

    Ok(())
}

proptest! {
    #[test]
    fn any_entries_round_trip(
        entries in prop::collection::vec(
            ("[a-z]{1,12}", prop::collection::vec(any::<u8>(), 0..300)),
            0..6,
        ),
        store in any::<bool>(),
    ) {
        // later duplicates replace earlier ones on read
        let mut unique = Vec::<(String, Vec<u8>)>::new();
        for (name, data) in entries {
            unique.retain(|(n, _)| *n != name);
            unique.push((name, data));
        }

        let compression = if store { CompressionMethod::None } else { CompressionMethod::Huffman };
        let bytes = build_archive(&unique, compression, ArchiveWriterOptions::default()).unwrap();
        let archive = Archive::new(ByteReader::new(bytes)).unwrap();

        prop_assert_eq!(archive.len(), unique.len());
        for (name, data) in &unique {
            prop_assert_eq!(&archive.by_name(name).unwrap().contents().unwrap(), data);
        }
    }
}
