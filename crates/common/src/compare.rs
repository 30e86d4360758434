//! Byte-exact comparison of program output against a reference file

use std::fs::Metadata;
use std::io::ErrorKind;
use std::path::Path;

use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, BufReader};

use crate::verdict::OutputCheck;

const CHUNK_SIZE: usize = 1 << 20;

/// Compare `output` with `reference` without loading either into memory.
///
/// A missing file on either side yields [`OutputCheck::Missing`]. An output
/// path that is not a regular file never matches. Other I/O failures are
/// returned as errors.
pub async fn compare_files(output: &Path, reference: &Path) -> std::io::Result<OutputCheck> {
    let Some(output_meta) = stat(output).await? else {
        return Ok(OutputCheck::Missing);
    };
    if !output_meta.is_file() {
        tracing::debug!(output = %output.display(), "Output is not a regular file");
        return Ok(OutputCheck::Differs);
    }
    let output_len = output_meta.len();
    let Some(reference_len) = file_len(reference).await? else {
        tracing::warn!(reference = %reference.display(), "Reference file is missing");
        return Ok(OutputCheck::Missing);
    };

    if output_len != reference_len {
        return Ok(OutputCheck::Differs);
    }

    let mut left = BufReader::with_capacity(CHUNK_SIZE, File::open(output).await?);
    let mut right = BufReader::with_capacity(CHUNK_SIZE, File::open(reference).await?);
    let mut left_buf = vec![0u8; CHUNK_SIZE];
    let mut right_buf = vec![0u8; CHUNK_SIZE];

    loop {
        let n = read_full(&mut left, &mut left_buf).await?;
        let m = read_full(&mut right, &mut right_buf).await?;
        if n != m || left_buf[..n] != right_buf[..m] {
            return Ok(OutputCheck::Differs);
        }
        if n == 0 {
            return Ok(OutputCheck::Matches);
        }
    }
}

/// Byte length of `path`, or `None` when it does not exist
pub async fn file_len(path: &Path) -> std::io::Result<Option<u64>> {
    Ok(stat(path).await?.map(|meta| meta.len()))
}

async fn stat(path: &Path) -> std::io::Result<Option<Metadata>> {
    match fs::metadata(path).await {
        Ok(meta) => Ok(Some(meta)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Fill `buf` as far as the reader allows; returns bytes read (0 at EOF)
async fn read_full(reader: &mut BufReader<File>, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
