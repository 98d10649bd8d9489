use std::io::{self, Write};

use crate::record::SequenceRecord;
use crate::trim::Fragment;

/// Output record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Fasta,
    Fastq,
}

const WRAP_COLS: usize = 60;

/// Render one retained fragment of `rec`.
///
/// `index` is the zero-based fragment number within the record; fragments
/// after the first carry a ` fragment=N` header suffix so split output stays
/// attributable to its read. FASTA bodies wrap at 60 columns; FASTQ output
/// re-encodes scores as `score + 33` bytes.
pub fn write_fragment(
    w: &mut impl Write,
    rec: &SequenceRecord,
    frag: &Fragment,
    index: usize,
    format: OutputFormat,
) -> io::Result<()> {
    let header = match format {
        OutputFormat::Fasta => '>',
        OutputFormat::Fastq => '@',
    };
    if index > 0 {
        writeln!(w, "{header}{} fragment={}", rec.id, index + 1)?;
    } else {
        writeln!(w, "{header}{}", rec.id)?;
    }

    let seq = &rec.seq[frag.start..frag.end];
    match format {
        OutputFormat::Fasta => {
            for chunk in seq.chunks(WRAP_COLS) {
                w.write_all(chunk)?;
                w.write_all(b"\n")?;
            }
        }
        OutputFormat::Fastq => {
            w.write_all(seq)?;
            w.write_all(b"\n+\n")?;
            let quals: Vec<u8> = rec.quals[frag.start..frag.end]
                .iter()
                .map(|&q| (q + 33) as u8)
                .collect();
            w.write_all(&quals)?;
            w.write_all(b"\n")?;
        }
    }
    Ok(())
}
