use std::io::{self, Write};

/// Length-distribution accumulator for the end-of-run report.
#[derive(Debug, Default)]
pub struct LengthStats {
    lengths: Vec<u64>,
}

impl LengthStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, len: usize) {
        self.lengths.push(len as u64);
    }

    pub fn count(&self) -> usize {
        self.lengths.len()
    }

    /// Write the distribution block under `header`. Sorts the sample.
    ///
    /// Variance uses the sample (n - 1) denominator and is reported as 0
    /// for fewer than two observations.
    pub fn report(&mut self, w: &mut impl Write, header: &str) -> io::Result<()> {
        self.lengths.sort_unstable();
        let n = self.lengths.len();

        let mut sum = 0.0f64;
        let mut sumsq = 0.0f64;
        for &v in &self.lengths {
            let v = v as f64;
            sum += v;
            sumsq += v * v;
        }

        let mut mean = 0.0;
        let mut median = 0.0;
        let mut var = 0.0;
        let (mut min, mut two5, mut ninetyseven5, mut max) = (0u64, 0u64, 0u64, 0u64);
        if n > 0 {
            mean = sum / n as f64;
            median = if n % 2 == 1 {
                self.lengths[n / 2] as f64
            } else {
                0.5 * (self.lengths[n / 2] + self.lengths[n / 2 - 1]) as f64
            };
            if n > 1 {
                var = (sumsq - sum * sum / n as f64) / (n - 1) as f64;
            }
            min = self.lengths[0];
            two5 = self.lengths[(0.025 * n as f64) as usize];
            ninetyseven5 = self.lengths[(0.975 * n as f64) as usize];
            max = self.lengths[n - 1];
        }

        writeln!(w, "{header}")?;
        writeln!(w, "    mean:                {mean}")?;
        writeln!(w, "    median:              {median}")?;
        writeln!(w, "    variance:            {var}")?;
        writeln!(w, "    standard deviation:  {}", var.sqrt())?;
        writeln!(w, "    min:                 {min}")?;
        writeln!(w, "    2.5%:                {two5}")?;
        writeln!(w, "    97.5%:               {ninetyseven5}")?;
        writeln!(w, "    max:                 {max}")?;
        Ok(())
    }
}
