//! parallel.rs - Chunked parallel sanitization of an in-memory input.
//!
//! The input is cut into byte ranges that always end just after a `\n`, each
//! range is sanitized on a rayon worker into its own buffer, and the buffers
//! are written out in the original chunk order. `RecordSanitizer` has no
//! cross-record state, so the result is byte-identical to a sequential run.
//!
//! License: MIT OR APACHE 2.0

use std::io::Write;

use log::debug;
use rayon::prelude::*;

use crate::engine::RecordSanitizer;
use crate::errors::FieldScrubError;
use crate::report::RunStats;
use crate::stream::{sanitize_stream, StreamOptions};

/// Chunks scheduled per worker thread, so uneven lines still balance out.
pub const CHUNKS_PER_JOB: usize = 4;

/// Below this size the input is processed as a single chunk.
pub const MIN_CHUNK_BYTES: usize = 64 * 1024;

/// Splits `input` into at most roughly `target` slices, each ending on a line
/// boundary (or at the end of input). Concatenating the slices yields `input`.
pub fn split_chunks(input: &[u8], target: usize) -> Vec<&[u8]> {
    if input.is_empty() {
        return Vec::new();
    }
    let chunk_size = input.len().div_ceil(target.max(1)).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < input.len() {
        let tentative = start + chunk_size;
        let end = if tentative >= input.len() {
            input.len()
        } else {
            match input[tentative - 1..].iter().position(|&b| b == b'\n') {
                Some(offset) => tentative + offset,
                None => input.len(),
            }
        };
        chunks.push(&input[start..end]);
        start = end;
    }
    chunks
}

/// Sanitizes `input` on `jobs` threads and writes the result to `writer` in
/// input order.
pub fn sanitize_parallel<W: Write>(
    sanitizer: &RecordSanitizer,
    input: &[u8],
    mut writer: W,
    jobs: usize,
    options: &StreamOptions,
) -> Result<RunStats, FieldScrubError> {
    let jobs = jobs.max(1);
    let target = if input.len() < MIN_CHUNK_BYTES {
        1
    } else {
        (jobs * CHUNKS_PER_JOB).min(input.len() / MIN_CHUNK_BYTES).max(1)
    };
    let chunks = split_chunks(input, target);
    debug!("Sanitizing {} bytes in {} chunk(s) on {} thread(s)", input.len(), chunks.len(), jobs);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| FieldScrubError::Fatal(format!("Failed to build worker pool: {}", e)))?;

    let results: Vec<Result<(Vec<u8>, RunStats), FieldScrubError>> = pool.install(|| {
        chunks
            .par_iter()
            .map(|chunk| {
                let mut out = Vec::with_capacity(chunk.len());
                let stats = sanitize_stream(sanitizer, *chunk, &mut out, options)?;
                Ok((out, stats))
            })
            .collect()
    });

    let mut total = RunStats::new(sanitizer.rules());
    for result in results {
        let (out, stats) = result?;
        writer.write_all(&out)?;
        total.merge(&stats);
    }
    writer.flush()?;
    Ok(total)
}
