//! Monte-Carlo BER/WER simulation driver.
//!
//! Runs one `(code length, rate, SNR)` configuration at a time: generates
//! random messages, encodes, modulates, adds AWGN, decodes, and accumulates
//! bit- and word-error statistics until either the frame-error budget or the
//! word budget is exhausted. [`run_many`] fans independent configurations out
//! across a `rayon` thread pool, each seeded deterministically so that
//! results do not depend on scheduling order.

use crate::{
    channel::{AwgnChannel, BpskModulator},
    decoder::Decoder,
    encoder::{bits_to_gf2, Encoder},
    tables::CodeTables,
};
use crate::rand::{Rng as ChaChaRng, SeedableRng};
use rand::Rng as _;
use rayon::prelude::*;
use std::{
    collections::hash_map::DefaultHasher,
    fmt,
    hash::{Hash, Hasher},
    io,
    time::Instant,
};
use thiserror::Error;

/// Error running a simulation configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to load or expand the code tables for the requested rate/length.
    #[error(transparent)]
    Tables(#[from] crate::tables::Error),
    /// Failed to build the systematic encoder for the expanded matrix.
    #[error(transparent)]
    Encoder(#[from] crate::encoder::Error),
}

/// One `(code length, rate)` Monte-Carlo configuration, to be run across a
/// sweep of SNR points.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Code length in bits.
    pub n: usize,
    /// Rate label (e.g. `"1/2"`).
    pub rate: String,
    /// Linear SNR points to simulate (`sigma = sqrt(1 / (2 * rate * snr))`).
    pub snrs: Vec<f64>,
    /// Maximum sum-product iterations per word.
    pub max_iterations: usize,
    /// Stop a given SNR point once this many word errors have accumulated.
    pub max_frame_errors: u64,
    /// Stop a given SNR point after this many words regardless of errors
    /// (bounds runtime at high SNR, where frame errors may never occur).
    pub max_words: u64,
}

/// Accumulated statistics for one SNR point.
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    /// Linear SNR for this point.
    pub snr: f64,
    /// Number of words simulated.
    pub frames: u64,
    /// Total bit errors across all words.
    pub bit_errors: u64,
    /// Total word errors (words with at least one residual bit error).
    pub word_errors: u64,
    /// `bit_errors / (frames * k)`.
    pub ber: f64,
    /// `word_errors / frames`.
    pub wer: f64,
    /// Wall-clock time spent on this SNR point.
    pub elapsed_secs: f64,
}

/// Runs every SNR point of `config` for a single `(n, rate)` code,
/// sequentially, returning one [`Statistics`] per SNR point.
///
/// # Errors
/// Returns [`Error`] if the code tables cannot be loaded/expanded for
/// `config.rate` at `config.n`, or if the resulting parity-check matrix has
/// no systematic encoder.
pub fn run_configuration(
    config: &Config,
    tables: &impl CodeTables,
    mut on_progress: Option<&mut dyn FnMut(&Statistics)>,
) -> Result<Vec<Statistics>, Error> {
    let h = tables.expanded_h(config.n, &config.rate)?;
    let k = h.num_cols() - h.num_rows();
    let encoder = Encoder::from_h(&h)?;
    let modulator = BpskModulator::new();
    let mut decoder = Decoder::new(h);

    let mut results = Vec::with_capacity(config.snrs.len());
    for &snr in &config.snrs {
        let seed = seed_for(config.n, &config.rate, snr);
        let mut rng = ChaChaRng::seed_from_u64(seed);

        let rate = k as f64 / config.n as f64;
        let sigma = (1.0 / (2.0 * rate * snr)).sqrt();
        let channel = AwgnChannel::new(sigma);

        let start = Instant::now();
        let mut frames = 0u64;
        let mut bit_errors = 0u64;
        let mut word_errors = 0u64;

        while word_errors < config.max_frame_errors && frames < config.max_words {
            let message: Vec<u8> = (0..k).map(|_| rng.gen_range(0u8..=1u8)).collect();
            let codeword = encoder.encode(&bits_to_gf2(&message));
            let mut symbols = modulator.modulate(&codeword);
            channel.add_noise(&mut rng, &mut symbols);

            let outcome = decoder.decode(&symbols, sigma, config.max_iterations);
            let decoded = match &outcome {
                Ok(out) => &out.message,
                Err(out) => &out.message,
            };

            let errors = message
                .iter()
                .zip(decoded.iter())
                .filter(|(a, b)| a != b)
                .count() as u64;
            bit_errors += errors;
            if errors > 0 {
                word_errors += 1;
            }
            frames += 1;
        }

        let stats = Statistics {
            snr,
            frames,
            bit_errors,
            word_errors,
            ber: bit_errors as f64 / (frames as f64 * k as f64),
            wer: word_errors as f64 / frames as f64,
            elapsed_secs: start.elapsed().as_secs_f64(),
        };
        if let Some(callback) = on_progress.as_deref_mut() {
            callback(&stats);
        }
        results.push(stats);
    }
    Ok(results)
}

/// Runs several `(n, rate, snrs)` configurations in parallel across a
/// `rayon` thread pool sized to `processes`, returning one entry per input
/// configuration in the same order (not necessarily the order of
/// completion).
pub fn run_many(
    configs: Vec<(usize, String, Vec<f64>)>,
    tables: &(impl CodeTables + Sync),
    processes: usize,
    max_iterations: usize,
    max_frame_errors: u64,
    max_words: u64,
) -> Vec<(usize, String, Result<Vec<Statistics>, Error>)> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(processes.max(1))
        .build()
        .expect("failed to build simulation thread pool");

    pool.install(|| {
        configs
            .into_par_iter()
            .map(|(n, rate, snrs)| {
                let config = Config {
                    n,
                    rate: rate.clone(),
                    snrs,
                    max_iterations,
                    max_frame_errors,
                    max_words,
                };
                let result = run_configuration(&config, tables, None);
                (n, rate, result)
            })
            .collect()
    })
}

/// Derives a deterministic RNG seed from a `(n, rate, snr)` triple, so that
/// results are reproducible independent of `rayon`'s scheduling order.
fn seed_for(n: usize, rate: &str, snr: f64) -> u64 {
    let mut hasher = DefaultHasher::new();
    n.hash(&mut hasher);
    rate.hash(&mut hasher);
    snr.to_bits().hash(&mut hasher);
    hasher.finish()
}

/// Writes a CSV of per-SNR-point statistics for a single `(n, rate)` code,
/// with header `n,rate,snr,frames,bit_errors,word_errors,ber,wer,elapsed_secs`.
pub fn write_csv<W: io::Write>(
    mut w: W,
    n: usize,
    rate: &str,
    stats: &[Statistics],
    write_header: bool,
) -> io::Result<()> {
    if write_header {
        writeln!(w, "n,rate,snr,frames,bit_errors,word_errors,ber,wer,elapsed_secs")?;
    }
    for s in stats {
        writeln!(
            w,
            "{n},{rate},{},{},{},{},{},{},{}",
            s.snr, s.frames, s.bit_errors, s.word_errors, s.ber, s.wer, s.elapsed_secs
        )?;
    }
    Ok(())
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:6.2} | {:8} frames | ber {:.3e} | wer {:.3e}",
            self.snr, self.frames, self.ber, self.wer
        )
    }
}
