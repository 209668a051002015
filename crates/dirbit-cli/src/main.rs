use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use dirbit_codec::{run_read, run_scan, run_write, InputBitStream, OutputBitStream};
use dirbit_decode::DecodeMode;
use dirbit_elf::{locate_text, MachineMode, TextWindow};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage: dirbit [-s | -w | -r N] [-o PATH] <elf_file>

  -s          scan: count carrier instructions and print a capacity report
  -w          write: embed stdin into a copy of <elf_file>
  -r N        read: extract N bytes from <elf_file> to stdout (N=0: until .text ends)
  -o PATH     output file for write mode (default: out)
  -h          print this message and exit
";

#[derive(Parser, Debug)]
#[command(name = "dirbit", disable_help_flag = true)]
#[command(group(ArgGroup::new("mode").args(["scan", "write", "read"]).required(true)))]
struct Cli {
    /// Scan mode: count carriers and print a capacity report.
    #[arg(short = 's', group = "mode")]
    scan: bool,

    /// Write mode: embed stdin into a copy of the input ELF.
    #[arg(short = 'w', group = "mode")]
    write: bool,

    /// Read mode: extract N bytes from the input ELF to stdout.
    #[arg(short = 'r', value_name = "N", group = "mode")]
    read: Option<u32>,

    /// Override the default output file (pairs with -w).
    #[arg(short = 'o', value_name = "PATH")]
    output: Option<PathBuf>,

    /// Raise logging verbosity; repeatable.
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    elf_file: PathBuf,
}

fn main() -> Result<()> {
    // clap's generated `-h`/`--help` exits 0; the documented contract here
    // is "print usage and exit nonzero", so -h/--help is handled before
    // clap ever sees the argument list.
    if std::env::args().skip(1).any(|a| a == "-h" || a == "--help") {
        eprint!("{USAGE}");
        std::process::exit(1);
    }

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(&cli) {
        tracing::error!("{err:#}");
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn mode_for(machine: MachineMode) -> DecodeMode {
    match machine {
        MachineMode::I386 => DecodeMode::Bits32,
        MachineMode::X86_64 => DecodeMode::Bits64,
    }
}

fn run(cli: &Cli) -> Result<()> {
    if cli.scan {
        scan(&cli.elf_file)
    } else if cli.write {
        write(&cli.elf_file, cli.output.as_deref())
    } else if let Some(n) = cli.read {
        read(&cli.elf_file, n)
    } else {
        unreachable!("the \"mode\" arg group guarantees exactly one of -s/-w/-r is set")
    }
}

fn scan(path: &Path) -> Result<()> {
    let loc = locate_text(path).with_context(|| format!("locating .text in {}", path.display()))?;
    let mode = mode_for(loc.machine);
    let window = TextWindow::open_read_only(path, loc)?;
    let report = run_scan(&window, mode)?;

    println!(
        "Scan summary:\n{} bytes available ({} patchable / {} total, {}%)",
        report.capacity_bytes(),
        report.carrier_inst,
        report.total_inst,
        report.percent(),
    );
    Ok(())
}

fn write(path: &Path, output: Option<&Path>) -> Result<()> {
    let output = output.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("out"));
    let loc = locate_text(path).with_context(|| format!("locating .text in {}", path.display()))?;
    let mode = mode_for(loc.machine);
    let mut window = TextWindow::open_copy_for_write(path, &output, loc)
        .with_context(|| format!("writing carrier copy to {}", output.display()))?;

    let stdin = io::stdin();
    let input = InputBitStream::new(stdin.lock());
    let report = run_write(&mut window, mode, input)?;
    window.flush()?;

    println!(
        "{} bits written ({} bytes)",
        report.bits_written,
        report.bytes_written()
    );
    if report.capacity_shortfall {
        eprintln!("warning: input longer than carrier capacity; payload was truncated");
    }
    Ok(())
}

fn read(path: &Path, requested_bytes: u32) -> Result<()> {
    let loc = locate_text(path).with_context(|| format!("locating .text in {}", path.display()))?;
    let mode = mode_for(loc.machine);
    let window = TextWindow::open_read_only(path, loc)?;

    let requested = if requested_bytes == 0 {
        None
    } else {
        Some(requested_bytes)
    };
    let stdout = io::stdout();
    let output = OutputBitStream::new(stdout.lock());
    run_read(&window, mode, requested, output)?;
    Ok(())
}
