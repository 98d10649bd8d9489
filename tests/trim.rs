use fraq::{Fragment, SequenceRecord, Tag, TrimPolicy, extract_into};

fn rec(seq: &str, quals: Vec<i32>) -> SequenceRecord {
    assert_eq!(seq.len(), quals.len());
    SequenceRecord {
        id: "r1".into(),
        seq: seq.as_bytes().to_vec(),
        quals,
    }
}

fn policy(min_length: usize) -> TrimPolicy {
    TrimPolicy {
        min_qscore: 20,
        min_length,
        ..TrimPolicy::default()
    }
}

fn extract(rec: &SequenceRecord, policy: &TrimPolicy) -> Vec<Fragment> {
    let mut out = Vec::new();
    extract_into(rec, policy, &mut out);
    out
}

#[test]
fn clean_record_yields_one_full_fragment() {
    let r = rec("ACGTACGT", vec![40; 8]);
    let frags = extract(&r, &policy(4));
    assert_eq!(
        frags,
        vec![Fragment {
            start: 0,
            end: 8,
            ambigs: 0
        }]
    );
}

#[test]
fn low_quality_base_splits_when_asked() {
    // one low-quality base between two 4-base stretches
    let r = rec("ACGTCACGT", vec![40, 40, 40, 40, 2, 40, 40, 40, 40]);

    let split = TrimPolicy {
        split: true,
        ..policy(4)
    };
    let frags = extract(&r, &split);
    assert_eq!(
        frags,
        vec![
            Fragment {
                start: 0,
                end: 4,
                ambigs: 0
            },
            Fragment {
                start: 5,
                end: 9,
                ambigs: 0
            },
        ]
    );

    // without splitting, exactly the first
    let frags = extract(&r, &policy(4));
    assert_eq!(frags.len(), 1);
    assert_eq!(frags[0].start, 0);
    assert_eq!(frags[0].end, 4);
}

#[test]
fn short_candidates_are_dropped() {
    let r = rec("ACGTCAC", vec![40, 40, 40, 40, 2, 40, 40]);
    let split = TrimPolicy {
        split: true,
        ..policy(4)
    };
    // the trailing stretch is only 2 bases
    let frags = extract(&r, &split);
    assert_eq!(frags.len(), 1);
    assert_eq!((frags[0].start, frags[0].end), (0, 4));
}

#[test]
fn record_shorter_than_min_length_yields_nothing() {
    let r = rec("ACG", vec![40, 40, 40]);
    assert!(extract(&r, &policy(4)).is_empty());
}

#[test]
fn ambiguous_bases_are_tolerated_but_not_counted() {
    let r = rec("ACGTNACGT", vec![40, 40, 40, 40, 2, 40, 40, 40, 40]);
    let tolerant = TrimPolicy {
        tolerate_ambigs: true,
        ..policy(4)
    };
    let frags = extract(&r, &tolerant);
    assert_eq!(
        frags,
        vec![Fragment {
            start: 0,
            end: 9,
            ambigs: 1
        }]
    );
    assert_eq!(frags[0].retained_len(), 8);
}

#[test]
fn ambiguous_run_does_not_satisfy_min_length() {
    // raw span 6, but only 4 unambiguous positions
    let r = rec("ACNNCA", vec![40, 40, 2, 2, 40, 40]);
    let tolerant = TrimPolicy {
        tolerate_ambigs: true,
        ..policy(5)
    };
    assert!(extract(&r, &tolerant).is_empty());
}

#[test]
fn good_quality_ambigs_need_no_tolerance() {
    let r = rec("ACGTN", vec![40; 5]);
    let frags = extract(&r, &policy(4));
    assert_eq!((frags[0].start, frags[0].end, frags[0].ambigs), (0, 5, 0));
}

#[test]
fn homopolymer_run_extends_fragment() {
    // the low-quality G repeats the previous retained base
    let r = rec("ACGGGT", vec![40, 40, 40, 2, 40, 40]);
    let tolerant = TrimPolicy {
        tolerate_homopolymers: true,
        ..policy(4)
    };
    let frags = extract(&r, &tolerant);
    assert_eq!(
        frags,
        vec![Fragment {
            start: 0,
            end: 6,
            ambigs: 0
        }]
    );

    // case-insensitive on both sides
    let r = rec("ACGgGT", vec![40, 40, 40, 2, 40, 40]);
    assert_eq!(extract(&r, &tolerant).len(), 1);
}

#[test]
fn homopolymer_tolerance_off_splits() {
    let r = rec("ACGGGT", vec![40, 40, 40, 2, 40, 40]);
    assert!(extract(&r, &policy(4)).is_empty());
}

#[test]
fn low_quality_non_repeat_stops_the_scan() {
    let r = rec("ACGTGT", vec![40, 40, 40, 2, 40, 40]);
    let tolerant = TrimPolicy {
        tolerate_homopolymers: true,
        ..policy(3)
    };
    // 'T' does not repeat the retained 'G': the fragment stops before it
    let frags = extract(&r, &tolerant);
    assert_eq!((frags[0].start, frags[0].end), (0, 3));
}

#[test]
fn homopolymer_checked_before_ambig() {
    // a low-quality 'n' after a retained 'N' counts as a homopolymer, so
    // it must not inflate the ambig count
    let r = rec("ACNnCA", vec![40, 40, 40, 2, 40, 40]);
    let both = TrimPolicy {
        tolerate_homopolymers: true,
        tolerate_ambigs: true,
        ..policy(4)
    };
    let frags = extract(&r, &both);
    assert_eq!(
        frags,
        vec![Fragment {
            start: 0,
            end: 6,
            ambigs: 0
        }]
    );
}

#[test]
fn tag_mismatch_discards_record() {
    let r = rec("TTTTACGT", vec![40; 8]);
    let gated = TrimPolicy {
        tag: Some(Tag {
            bases: b"ACGT".to_vec(),
            max_mismatch: 0,
        }),
        ..policy(4)
    };
    assert!(extract(&r, &gated).is_empty());
}

#[test]
fn tag_match_starts_scan_after_prefix() {
    let r = rec("ACGTACGT", vec![40; 8]);
    let gated = TrimPolicy {
        tag: Some(Tag {
            bases: b"acgt".to_vec(),
            max_mismatch: 0,
        }),
        ..policy(4)
    };
    let frags = extract(&r, &gated);
    assert_eq!(
        frags,
        vec![Fragment {
            start: 4,
            end: 8,
            ambigs: 0
        }]
    );
}

#[test]
fn tag_tolerates_allowed_mismatches() {
    let r = rec("AAGTACGT", vec![40; 8]);
    let gated = TrimPolicy {
        tag: Some(Tag {
            bases: b"ACGT".to_vec(),
            max_mismatch: 1,
        }),
        ..policy(4)
    };
    assert_eq!(extract(&r, &gated).len(), 1);
}

#[test]
fn tag_longer_than_read_discards_without_panicking() {
    let r = rec("ACGT", vec![40; 4]);
    let gated = TrimPolicy {
        tag: Some(Tag {
            bases: b"ACGTACGTACGT".to_vec(),
            max_mismatch: 0,
        }),
        ..policy(4)
    };
    assert!(extract(&r, &gated).is_empty());
}

#[test]
fn extraction_is_idempotent() {
    let r = rec("ACGTCACGT", vec![40, 40, 40, 40, 2, 40, 40, 40, 40]);
    let split = TrimPolicy {
        split: true,
        ..policy(4)
    };
    let mut out = Vec::new();
    extract_into(&r, &split, &mut out);
    let first = out.clone();
    extract_into(&r, &split, &mut out);
    assert_eq!(out, first);
}

#[test]
fn emitted_fragments_satisfy_bounds() {
    let quals = vec![
        40, 2, 40, 40, 40, 2, 2, 40, 40, 40, 40, 2, 40, 40, 40, 40, 40, 2, 40, 2,
    ];
    let r = rec("ACGTACGTACGTACGTACGT", quals);
    let split = TrimPolicy {
        split: true,
        ..policy(3)
    };
    let frags = extract(&r, &split);
    assert!(!frags.is_empty());
    let max_start = r.len() - 3;
    for f in &frags {
        assert!(f.retained_len() >= 3);
        assert!(f.start <= max_start);
        assert!(f.end <= r.len());
    }
}
