use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use dft_offload::bench::{format_seconds, run_amplitudes, run_combine, Measurement};
use dft_offload::signal::{audio_clip, ramp_pair, AUDIO_SAMPLES, AUDIO_SAMPLE_RATE};
use dft_offload::utils::{
    calculate_one_sided_frequencies, find_dominant_frequencies, max_relative_deviation,
};
use dft_offload::{offload_backend, SerialBackend};

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    let outcome = match cli.command {
        Command::Dft(args) => run_dft(&args),
        Command::Combine(args) => run_vector_combine(&args),
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("dft-bench: {err}");
            ExitCode::FAILURE
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Compare serial and accelerator amplitude-spectrum computation."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Amplitude spectrum of a synthetic audio clip.
    Dft(DftArgs),
    /// Element-wise addition of two vectors.
    Combine(CombineArgs),
}

#[derive(Args, Debug)]
struct DftArgs {
    /// Number of samples in the clip.
    #[arg(long, default_value_t = AUDIO_SAMPLES)]
    samples: usize,
    /// Frequency bins to compute. Defaults to one per sample.
    #[arg(long)]
    bins: Option<usize>,
    /// Sample rate of the clip in Hz.
    #[arg(long, default_value_t = AUDIO_SAMPLE_RATE)]
    sample_rate: f32,
    /// How many leading amplitudes to print.
    #[arg(long, default_value_t = 100)]
    print: usize,
    /// Skip the accelerator run.
    #[arg(long)]
    serial_only: bool,
    /// Maximum accepted deviation between the two runs, relative to the peak.
    #[arg(long, default_value_t = 1e-3)]
    tolerance: f64,
}

#[derive(Args, Debug)]
struct CombineArgs {
    /// Vector length.
    #[arg(long, default_value_t = 100_000)]
    len: usize,
    /// How many leading results to print.
    #[arg(long, default_value_t = 100)]
    print: usize,
}

fn run_dft(args: &DftArgs) -> dft_offload::Result<()> {
    let signal = audio_clip(args.samples, args.sample_rate);
    let bins = args.bins.unwrap_or(signal.len());
    println!(
        "Running DFT on a {:.1} second clip with {} samples, {} bins",
        args.samples as f32 / args.sample_rate,
        signal.len(),
        bins
    );

    let serial = run_amplitudes(&SerialBackend, &signal, bins)?;
    report(&serial, args.print);

    let frequencies = calculate_one_sided_frequencies(signal.len(), args.sample_rate);
    let one_sided = &serial.values[..serial.values.len().min(frequencies.len())];
    let peak = one_sided.iter().fold(0.0f64, |acc, &a| acc.max(a));
    for (frequency, amplitude) in find_dominant_frequencies(one_sided, &frequencies, peak / 10.0) {
        println!("dominant: {frequency:.1} Hz (amplitude {amplitude:.1})");
    }

    if args.serial_only {
        return Ok(());
    }

    let offload = run_amplitudes(&offload_backend(), &signal, bins)?;
    report(&offload, args.print);

    let deviation = max_relative_deviation(&serial.values, &offload.values);
    println!("max deviation relative to peak: {deviation:.3e}");
    if deviation > args.tolerance {
        log::warn!(
            "{} deviates from serial by {deviation:.3e} (tolerance {:.1e})",
            offload.backend,
            args.tolerance
        );
    }
    Ok(())
}

fn run_vector_combine(args: &CombineArgs) -> dft_offload::Result<()> {
    let (a, b) = ramp_pair(args.len);

    let serial = run_combine(&SerialBackend, &a, &b)?;
    report(&serial, args.print);

    let offload = run_combine(&offload_backend(), &a, &b)?;
    report(&offload, args.print);
    Ok(())
}

fn report<T: std::fmt::Display>(run: &Measurement<T>, print: usize) {
    println!(
        "{} ran in {} seconds (wall {} seconds)",
        run.backend,
        format_seconds(run.elapsed),
        format_seconds(run.wall)
    );
    let shown: Vec<String> = run.values.iter().take(print).map(ToString::to_string).collect();
    if !shown.is_empty() {
        println!("{}", shown.join(" "));
    }
    println!();
}
