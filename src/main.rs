use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};

use fraq::{
    Error, LengthStats, OutputFormat, RecordReader, SequenceRecord, Tag, TrimPolicy, extract_into,
    write_fragment,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Fasta,
    Fastq,
}

#[derive(Parser)]
#[command(name = "fraq")]
#[command(version, about = "Trim reads by quality and emit the retained fragments", long_about = None)]
struct Cli {
    /// Interleaved FASTQ input (sequence and quality together)
    #[arg(
        short = 'F',
        long,
        value_name = "FILE",
        conflicts_with_all = ["fasta", "qual"],
        required_unless_present = "fasta"
    )]
    fastq: Option<PathBuf>,

    /// Sequence-only FASTA input, paired with --qual
    #[arg(long, value_name = "FILE", requires = "qual")]
    fasta: Option<PathBuf>,

    /// Quality-only QUAL input, paired with --fasta
    #[arg(long, value_name = "FILE", requires = "fasta")]
    qual: Option<PathBuf>,

    /// Output file (absent or '-': stdout)
    #[arg(short = 'o', long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Minimum acceptable per-base quality score
    #[arg(short = 'q', long, value_name = "INT", default_value_t = 20)]
    min_qscore: i32,

    /// Minimum retained fragment length
    #[arg(short = 'l', long, value_name = "INT", default_value_t = 50,
          value_parser = clap::value_parser!(u64).range(1..))]
    min_length: u64,

    /// Emit every acceptable fragment instead of stopping at the first
    #[arg(short = 's', long)]
    split: bool,

    /// Tolerate low-quality homopolymer runs
    #[arg(short = 'P', long)]
    homopolymers: bool,

    /// Tolerate ambiguous bases (N); excluded from length accounting
    #[arg(short = 'N', long)]
    ambigs: bool,

    /// 5' tag to match against each read's prefix
    #[arg(short = 'T', long, value_name = "SEQ")]
    tag: Option<String>,

    /// Maximum tag mismatches tolerated
    #[arg(short = 'm', long, value_name = "INT", default_value_t = 0, requires = "tag")]
    tag_mismatch: usize,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = Format::Fasta)]
    format: Format,
}

fn main() {
    env_logger::Builder::from_default_env().init();
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("\nERROR: {err}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let policy = TrimPolicy {
        min_qscore: cli.min_qscore,
        min_length: cli.min_length as usize,
        split: cli.split,
        tolerate_homopolymers: cli.homopolymers,
        tolerate_ambigs: cli.ambigs,
        tag: cli.tag.as_ref().map(|t| Tag {
            bases: t.clone().into_bytes(),
            max_mismatch: cli.tag_mismatch,
        }),
    };

    let mut reader = match (&cli.fastq, &cli.fasta, &cli.qual) {
        (Some(fastq), None, None) => RecordReader::from_path(fastq)?,
        (None, Some(fasta), Some(qual)) => RecordReader::from_paths(fasta, qual)?,
        _ => unreachable!("clap enforces the input pairing"),
    };

    let mut out: Box<dyn Write> = match &cli.output {
        Some(path) if path.as_os_str() != "-" => {
            let f = File::create(path).map_err(|e| Error::Open {
                path: path.clone(),
                source: e,
            })?;
            Box::new(BufWriter::new(f))
        }
        _ => Box::new(BufWriter::new(io::stdout())),
    };
    let write_err = |source: io::Error| Error::Write { source };

    let format = match cli.format {
        Format::Fasta => OutputFormat::Fasta,
        Format::Fastq => OutputFormat::Fastq,
    };

    let mut rec = SequenceRecord::new();
    let mut fragments = Vec::new();
    let mut read_lengths = LengthStats::new();
    let mut fragment_lengths = LengthStats::new();
    let mut ncontrib = 0u64;

    while reader.read_into(&mut rec)? {
        read_lengths.record(rec.len());
        extract_into(&rec, &policy, &mut fragments);
        if !fragments.is_empty() {
            ncontrib += 1;
        }
        for (i, frag) in fragments.iter().enumerate() {
            write_fragment(&mut out, &rec, frag, i, format).map_err(write_err)?;
            fragment_lengths.record(frag.retained_len());
        }
    }
    out.flush().map_err(write_err)?;

    report(cli, &policy, ncontrib, &mut read_lengths, &mut fragment_lengths).map_err(write_err)
}

/// Run settings, run summary and length distributions, on stderr.
fn report(
    cli: &Cli,
    policy: &TrimPolicy,
    ncontrib: u64,
    read_lengths: &mut LengthStats,
    fragment_lengths: &mut LengthStats,
) -> io::Result<()> {
    let mut err = io::stderr().lock();

    writeln!(err, "run settings:")?;
    if let (Some(fasta), Some(qual)) = (&cli.fasta, &cli.qual) {
        writeln!(err, "    input fasta:         {}", fasta.display())?;
        writeln!(err, "    input qual:          {}", qual.display())?;
    } else if let Some(fastq) = &cli.fastq {
        writeln!(err, "    input fastq:         {}", fastq.display())?;
    }
    writeln!(err, "    min q-score:         {}", policy.min_qscore)?;
    writeln!(err, "    min fragment length: {}", policy.min_length)?;
    let mode = (policy.split as u8)
        | ((policy.tolerate_homopolymers as u8) << 1)
        | ((policy.tolerate_ambigs as u8) << 2);
    writeln!(
        err,
        "    run mode:            {} ({}/{}/{})",
        mode,
        if policy.split { "split" } else { "truncate" },
        if policy.tolerate_homopolymers {
            "tolerate homopolymers"
        } else {
            "don't tolerate homopolymers"
        },
        if policy.tolerate_ambigs {
            "tolerate ambigs"
        } else {
            "don't tolerate ambigs"
        }
    )?;
    if let Some(tag) = &policy.tag {
        writeln!(
            err,
            "    5' tag:              {}",
            String::from_utf8_lossy(&tag.bases)
        )?;
        writeln!(err, "    max tag mismatches:  {}", tag.max_mismatch)?;
    }

    writeln!(err)?;
    writeln!(err, "run summary:")?;
    writeln!(err, "    original reads:      {}", read_lengths.count())?;
    writeln!(err, "    contributing reads:  {ncontrib}")?;
    writeln!(err, "    retained fragments:  {}", fragment_lengths.count())?;

    read_lengths.report(&mut err, "\noriginal read length distribution:")?;
    fragment_lengths.report(&mut err, "\nretained fragment length distribution:")?;
    Ok(())
}
