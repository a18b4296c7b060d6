use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use flate2::{write::GzEncoder, Compression};
use log::debug;
use tar::Builder;

/// Write a gzip-compressed copy of `source` to `dest`.
///
/// The source is streamed through the encoder, so memory use does not grow
/// with file size. Decompressing `dest` yields the source bytes exactly.
///
/// # Returns
///
/// Number of bytes read from `source`
pub fn gzip_file(source: &Path, dest: &Path) -> Result<u64> {
    let start = Instant::now();

    let input = File::open(source)
        .context(format!("Failed to open {} for compression", source.display()))?;
    let output = File::create(dest)
        .context(format!("Failed to create {}", dest.display()))?;

    let mut reader = BufReader::new(input);
    let mut encoder = GzEncoder::new(BufWriter::new(output), Compression::default());

    let bytes = io::copy(&mut reader, &mut encoder)
        .context(format!("Failed to compress {}", source.display()))?;

    let mut writer = encoder.finish()
        .context(format!("Failed to finish gzip stream for {}", dest.display()))?;
    writer.flush()
        .context(format!("Failed to flush {}", dest.display()))?;

    debug!("Gzipped {} ({} bytes) in {:?}", source.display(), bytes, start.elapsed());
    Ok(bytes)
}

/// Write a gzip-compressed tar archive holding `source` as its only member.
///
/// The member is stored under the source's base name, never its full path.
pub fn tar_gz_file(source: &Path, dest: &Path) -> Result<()> {
    let start = Instant::now();

    let member_name = source.file_name()
        .ok_or_else(|| anyhow!("Invalid file path - no filename component: {}", source.display()))?;

    let output = File::create(dest)
        .context(format!("Failed to create {}", dest.display()))?;
    let encoder = GzEncoder::new(BufWriter::new(output), Compression::default());
    let mut builder = Builder::new(encoder);

    builder.append_path_with_name(source, member_name)
        .context(format!("Failed to add {} to tar archive", source.display()))?;

    let encoder = builder.into_inner()
        .context(format!("Failed to finish tar archive {}", dest.display()))?;
    let mut writer = encoder.finish()
        .context(format!("Failed to finish gzip stream for {}", dest.display()))?;
    writer.flush()
        .context(format!("Failed to flush {}", dest.display()))?;

    debug!("Archived {} into {} in {:?}", source.display(), dest.display(), start.elapsed());
    Ok(())
}
