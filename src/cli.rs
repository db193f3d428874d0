//! Implementation of the CLI application of `ldpc-wimax`.

use crate::{
    encoder::{bits_to_gf2, gf2_to_bits, Encoder},
    simulation::{self, Config, Statistics},
    tables::{CodeTables, FileCodeTables},
};
use crate::rand::{Rng as ChaChaRng, SeedableRng};
use clap::{Parser, Subcommand};
use console::Term;
use rand::Rng as _;
use std::{
    error::Error,
    path::PathBuf,
    sync::mpsc::{self, Receiver},
    time::Duration,
};

/// Trait implemented by each CLI subcommand.
pub trait Run {
    /// Runs the subcommand.
    fn run(&self) -> Result<(), Box<dyn Error>>;
}

/// `ldpc-wimax` command-line interface.
#[derive(Debug, Parser)]
#[command(name = "ldpc-wimax", about = "IEEE 802.16e-style LDPC encoding and decoding")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Encodes a random message and checks the result against H.
    Encode(EncodeArgs),
    /// Runs a Monte-Carlo BER/WER simulation over an SNR sweep.
    Simulate(SimulateArgs),
}

impl Run for Args {
    fn run(&self) -> Result<(), Box<dyn Error>> {
        match &self.command {
            Command::Encode(args) => args.run(),
            Command::Simulate(args) => args.run(),
        }
    }
}

/// `encode` subcommand arguments.
#[derive(Debug, Parser)]
#[command(about = "Encodes a random message with a systematic LDPC encoder")]
pub struct EncodeArgs {
    /// Code rate label (e.g. "1/2").
    #[arg(long)]
    pub rate: String,
    /// Code length in bits.
    #[arg(long)]
    pub length: usize,
    /// Directory containing the H-<digits>/block-size-<digits> table files.
    #[arg(long = "tables-dir")]
    pub tables_dir: PathBuf,
    /// Seed for the random message.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

impl Run for EncodeArgs {
    fn run(&self) -> Result<(), Box<dyn Error>> {
        let tables = FileCodeTables::load(&self.tables_dir)?;
        let h = tables.expanded_h(self.length, &self.rate)?;
        let k = h.num_cols() - h.num_rows();
        let encoder = Encoder::from_h(&h)?;

        let mut rng = ChaChaRng::seed_from_u64(self.seed);
        let message: Vec<u8> = (0..k).map(|_| rng.gen_range(0u8..=1u8)).collect();
        let codeword = encoder.encode(&bits_to_gf2(&message));
        let codeword_bits = gf2_to_bits(&codeword);

        let satisfies = (0..h.num_rows()).all(|i| {
            h.iter_row(i).filter(|&&j| codeword_bits[j] == 1).count() % 2 == 0
        });

        println!(
            "message:  {}",
            message.iter().map(|b| b.to_string()).collect::<String>()
        );
        println!(
            "codeword: {}",
            codeword_bits.iter().map(|b| b.to_string()).collect::<String>()
        );
        println!("parity check satisfied: {satisfies}");
        Ok(())
    }
}

/// `simulate` subcommand arguments.
#[derive(Debug, Parser)]
#[command(about = "Runs a Monte-Carlo BER/WER simulation")]
pub struct SimulateArgs {
    /// Code rate label (e.g. "1/2").
    #[arg(long)]
    pub rate: String,
    /// Code length in bits.
    #[arg(long)]
    pub length: usize,
    /// Directory containing the H-<digits>/block-size-<digits> table files.
    #[arg(long = "tables-dir")]
    pub tables_dir: PathBuf,
    /// Minimum linear SNR.
    #[arg(long = "min-snr")]
    pub min_snr: f64,
    /// Maximum linear SNR.
    #[arg(long = "max-snr")]
    pub max_snr: f64,
    /// Linear SNR step.
    #[arg(long = "step-snr")]
    pub step_snr: f64,
    /// Maximum number of decoder iterations per word.
    #[arg(long = "max-iter", default_value_t = 100)]
    pub max_iter: usize,
    /// Number of word errors to collect per SNR point before moving on.
    #[arg(long = "frame-errors", default_value_t = 100)]
    pub frame_errors: u64,
    /// Maximum number of words simulated per SNR point regardless of errors.
    #[arg(long = "max-words", default_value_t = 10_000_000)]
    pub max_words: u64,
    /// Number of worker threads (default: number of CPUs).
    #[arg(long, default_value_t = num_cpus::get())]
    pub processes: usize,
    /// Output CSV file.
    #[arg(long, default_value = "SNRvsPe.csv")]
    pub output: PathBuf,
}

impl Run for SimulateArgs {
    fn run(&self) -> Result<(), Box<dyn Error>> {
        let tables = FileCodeTables::load(&self.tables_dir)?;
        let snrs = snr_sweep(self.min_snr, self.max_snr, self.step_snr);

        let (report_tx, report_rx) = mpsc::channel();
        let progress = Progress::new(report_rx);
        let progress = std::thread::spawn(move || progress.run());

        let config = Config {
            n: self.length,
            rate: self.rate.clone(),
            snrs,
            max_iterations: self.max_iter,
            max_frame_errors: self.frame_errors,
            max_words: self.max_words,
        };
        let mut on_progress = |stats: &Statistics| {
            let _ = report_tx.send(Report::Statistics(stats.clone()));
        };
        let stats = simulation::run_configuration(&config, &tables, Some(&mut on_progress))?;
        let _ = report_tx.send(Report::Done);

        #[allow(clippy::question_mark)]
        if let Err(e) = progress.join().unwrap() {
            return Err(e);
        }

        let file = std::fs::File::create(&self.output)?;
        simulation::write_csv(file, self.length, &self.rate, &stats, true)?;
        Ok(())
    }
}

fn snr_sweep(min_snr: f64, max_snr: f64, step_snr: f64) -> Vec<f64> {
    let num = ((max_snr - min_snr) / step_snr).floor() as usize + 1;
    (0..num).map(|i| min_snr + i as f64 * step_snr).collect()
}

/// Progress messages sent from the simulation thread to the terminal reporter.
enum Report {
    Statistics(Statistics),
    Done,
}

/// Live terminal progress reporter, architecturally identical to the
/// teacher's `cli/ber.rs` `Progress`: a dedicated thread drains an `mpsc`
/// channel and redraws the current SNR point's row in place, with a
/// `Ctrl-C` handler that restores the cursor before exiting.
struct Progress {
    rx: Receiver<Report>,
    term: Term,
}

impl Progress {
    fn new(rx: Receiver<Report>) -> Progress {
        Progress {
            rx,
            term: Term::stdout(),
        }
    }

    fn run(&self) -> Result<(), Box<dyn Error + Send + Sync + 'static>> {
        ctrlc::set_handler({
            let term = self.term.clone();
            move || {
                let _ = term.write_line("");
                let _ = term.show_cursor();
                std::process::exit(0);
            }
        })?;

        let ret = self.work();
        self.term.write_line("")?;
        self.term.show_cursor()?;
        ret
    }

    fn work(&self) -> Result<(), Box<dyn Error + Send + Sync + 'static>> {
        self.term.set_title("ldpc-wimax simulate");
        self.term.hide_cursor()?;
        self.term.write_line(Self::format_header())?;
        loop {
            match self.rx.recv().unwrap() {
                Report::Statistics(stats) => {
                    self.term.write_line(&Self::format_progress(&stats))?;
                }
                Report::Done => return Ok(()),
            }
        }
    }

    fn format_header() -> &'static str {
        "    SNR |   Frames | Bit errs | Word errs |     BER |     WER | Elapsed\n\
         --------|----------|----------|-----------|---------|---------|----------"
    }

    fn format_progress(stats: &Statistics) -> String {
        format!(
            "{:7.2} | {:8} | {:8} | {:9} | {:7.2e} | {:7.2e} | {}",
            stats.snr,
            stats.frames,
            stats.bit_errors,
            stats.word_errors,
            stats.ber,
            stats.wer,
            humantime::format_duration(Duration::from_secs(stats.elapsed_secs as u64))
        )
    }
}
