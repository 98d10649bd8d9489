use crate::policy::TrimPolicy;
use crate::record::SequenceRecord;

/// A retained sub-range of one record, end-exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    pub start: usize,
    pub end: usize,
    /// Ambiguous bases kept inside the range under ambiguity tolerance.
    pub ambigs: usize,
}

impl Fragment {
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
    /// Range length counted toward the minimum-length policy: ambiguous
    /// bases occupy positions but do not count.
    #[inline]
    pub fn retained_len(&self) -> usize {
        self.end - self.start - self.ambigs
    }
}

/// Extract the retained fragments of `rec` under `policy` into `out`.
///
/// `out` is cleared first; a record that fails the tag gate or yields no
/// acceptable range leaves it empty. Pure over its inputs: identical record
/// and policy give identical fragment lists.
///
/// Expects a parsed record, i.e. one quality score per base.
pub fn extract_into(rec: &SequenceRecord, policy: &TrimPolicy, out: &mut Vec<Fragment>) {
    debug_assert_eq!(rec.seq.len(), rec.quals.len());
    debug_assert!(policy.min_length >= 1);
    out.clear();
    let len = rec.len();

    let mut cursor = 0usize;
    if let Some(tag) = &policy.tag {
        let mut mismatch = 0usize;
        for (i, t) in tag.bases.iter().enumerate() {
            match rec.seq.get(i) {
                Some(b) if b.eq_ignore_ascii_case(t) => {}
                // positions past the end of a short read count as mismatches
                _ => mismatch += 1,
            }
        }
        if mismatch > tag.max_mismatch {
            return;
        }
        cursor = tag.bases.len();
    }

    // latest permissible fragment start
    let Some(max_start) = len.checked_sub(policy.min_length) else {
        return;
    };

    loop {
        // candidate-start search
        while cursor <= max_start && rec.quals[cursor] < policy.min_qscore {
            cursor += 1;
        }
        if cursor > max_start {
            return;
        }

        let start = cursor;
        let mut ambigs = 0usize;
        let mut last_retained: Option<u8> = None;
        while cursor < len {
            let curr = rec.seq[cursor];
            if rec.quals[cursor] < policy.min_qscore {
                if policy.tolerate_homopolymers
                    && last_retained.is_some_and(|last| last.eq_ignore_ascii_case(&curr))
                {
                    // low-quality repeat of the previous retained base
                } else if policy.tolerate_ambigs && matches!(curr, b'N' | b'n') {
                    ambigs += 1;
                } else {
                    break;
                }
            } else {
                last_retained = Some(curr);
            }
            cursor += 1;
        }

        // too short once ambiguous positions are excluded: drop the
        // candidate and resume searching past it
        if cursor - start - ambigs < policy.min_length {
            continue;
        }
        out.push(Fragment {
            start,
            end: cursor,
            ambigs,
        });
        if !policy.split {
            return;
        }
    }
}
