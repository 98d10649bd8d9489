/// 5' tag gate: records whose prefix strays too far from `bases` are dropped.
#[derive(Debug, Clone)]
pub struct Tag {
    pub bases: Vec<u8>,
    pub max_mismatch: usize,
}

/// Trimming policy consumed by the fragment extractor.
#[derive(Debug, Clone)]
pub struct TrimPolicy {
    /// Minimum acceptable per-base quality score.
    pub min_qscore: i32,
    /// Minimum retained fragment length, after ambiguous bases are excluded.
    /// Must be at least 1.
    pub min_length: usize,
    /// Emit every acceptable fragment instead of stopping at the first.
    pub split: bool,
    /// Keep low-quality bases that repeat the previous retained base.
    pub tolerate_homopolymers: bool,
    /// Keep low-quality `N`/`n` bases; they do not count toward `min_length`.
    pub tolerate_ambigs: bool,
    /// Optional 5' tag with an allowed mismatch count.
    pub tag: Option<Tag>,
}

impl Default for TrimPolicy {
    fn default() -> Self {
        Self {
            min_qscore: 20,
            min_length: 50,
            split: false,
            tolerate_homopolymers: false,
            tolerate_ambigs: false,
            tag: None,
        }
    }
}
