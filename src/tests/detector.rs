use crate::{
    find_all_matches, ContextScorer, Detector, BASE_SCORE_CAP, DETECTION_FLOOR,
};

fn confidence_or_zero(detector: &Detector, text: &str) -> f64 {
    detector.analyze(text).map_or(0.0, |result| result.confidence)
}

fn detectors() -> Vec<Detector> {
    vec![
        Detector::new(),
        Detector::with_scorer(ContextScorer::disabled()),
    ]
}

#[test]
fn analyze_is_deterministic() {
    let text = "Congratulations! You found it. Email us at a@b.com to claim your $50 prize.";
    for detector in detectors() {
        let first = detector.analyze(text).unwrap();
        let second = detector.analyze(text).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn scores_are_bit_identical_across_calls() {
    // Four weak and medium rules against two penalties lands right on the floor.
    let text = "Join the sweepstakes for a prize. Easter egg inside. Act now. \
                Contest rules apply. Open to residents of Ohio.";
    let detector = Detector::with_scorer(ContextScorer::disabled());

    let breakdown = detector.score_breakdown(text).unwrap();
    assert_eq!(breakdown.base, 0.3 + 0.2 + 0.1 + 0.1);
    assert_eq!(breakdown.penalty, -0.3 + -0.3);
    assert_eq!(breakdown.score, (breakdown.base - 0.3 - 0.3).clamp(0.0, 1.0));

    let expected = detector.analyze(text);
    for _ in 0..200 {
        assert_eq!(detector.score_breakdown(text), Some(breakdown));
        assert_eq!(detector.analyze(text), expected);
    }
}

#[test]
fn repeated_rule_counts_once() {
    let detector = Detector::with_scorer(ContextScorer::disabled());
    let once = detector.score_breakdown("Join the sweepstakes.").unwrap();
    let many = detector
        .score_breakdown("sweepstakes sweepstakes sweepstakes sweepstakes sweepstakes")
        .unwrap();
    assert_eq!(once.base, 0.3);
    assert_eq!(many.base, once.base);
}

#[test]
fn every_strong_rule_is_capped() {
    let text = "If you've read this far, congratulations, you found it. \
                The first person to email us wins the hidden prize. \
                Email us at win@acme.com to claim your prize. \
                A $500 gift card awaits one of the very few who read the terms.";
    let detector = Detector::new();
    let result = detector.analyze(text).unwrap();
    for id in [
        "read_this_far",
        "first_person_to",
        "hidden_reward",
        "congratulations_found",
        "claim_instruction",
        "email_to_win",
        "dollar_prize",
        "few_who_read",
    ] {
        assert!(result.pattern_names.contains(id), "missing {}", id);
    }

    let breakdown = detector.score_breakdown(text).unwrap();
    assert_eq!(breakdown.base, BASE_SCORE_CAP);
}

#[test]
fn official_rules_lower_the_score() {
    let base = "If you've read this far, email us at prize@company.com to claim your prize.";
    let with_rules = format!(
        "OFFICIAL RULES: No purchase necessary to enter or win. {}",
        base
    );
    for detector in detectors() {
        let plain = confidence_or_zero(&detector, base);
        let penalized = confidence_or_zero(&detector, &with_rules);
        assert!(penalized < plain, "{} !< {}", penalized, plain);
    }
}

#[test]
fn below_floor_is_no_detection() {
    let text = "Easter egg hunt. Official rules apply.";
    assert!(!find_all_matches(text).is_empty());
    for detector in detectors() {
        assert!(detector.analyze(text).is_none());
        let breakdown = detector.score_breakdown(text).unwrap();
        assert!(breakdown.base + breakdown.penalty < 0.0);
        assert_eq!(breakdown.score, 0.0);
    }
}

#[test]
fn floor_is_inclusive() {
    let detector = Detector::new();
    let result = detector.analyze("An easter egg.").unwrap();
    assert_eq!(result.confidence, DETECTION_FLOOR);
}

#[test]
fn confidence_is_bounded() {
    let texts = [
        "prize",
        "OFFICIAL RULES. No purchase necessary. Contest rules. Open to residents. prize",
        "If you've read this far, email us at x@y.com for a $1,000 prize. If you call us, \
         congratulations, you are one of the very few who actually read the fine print.",
    ];
    for detector in detectors() {
        for text in texts {
            if let Some(result) = detector.analyze(text) {
                assert!((0.0..=1.0).contains(&result.confidence), "{}", text);
            }
        }
    }
}

#[test]
fn best_match_ties_follow_match_order() {
    // Both rules weigh 0.8; read_this_far is declared first, so it wins even
    // though the congratulations text comes earlier in the document.
    let text = "Congratulations, you found it! If you've read this far, hello.";
    let result = Detector::new().analyze(text).unwrap();
    assert_eq!(result.matched_text, "If you've read this far");

    let text = "There is a hidden offer here and a hidden prize there.";
    let result = Detector::new().analyze(text).unwrap();
    assert_eq!(result.matched_text, "hidden offer");
}

#[test]
fn pattern_names_are_distinct() {
    let text = "prize prize prize and a raffle";
    let result = Detector::new().analyze(text).unwrap();
    assert_eq!(result.matches.len(), 4);
    let names: Vec<_> = result.pattern_names.iter().copied().collect();
    assert_eq!(names, vec!["contest_words", "reward_mention"]);
}

#[test]
fn disabled_scorer_reports_base_plus_penalty() {
    let detector = Detector::with_scorer(ContextScorer::disabled());
    let breakdown = detector
        .score_breakdown("If you've read this far, call us. Official rules apply.")
        .unwrap();
    assert_eq!(breakdown.bonus, 0.0);
    assert!((breakdown.score - 0.4).abs() < 1e-9);
}

#[test]
fn linguistic_bonus_raises_confidence() {
    let text = "Section 9. If you find this, email us for a reward.";
    let active = Detector::new().analyze(text).unwrap();
    let disabled = Detector::with_scorer(ContextScorer::disabled())
        .analyze(text)
        .unwrap();
    assert!(active.confidence > disabled.confidence);
}

#[test]
fn detector_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Detector>();

    let detector = Detector::new();
    let text = "If you've read this far, email us at prize@company.com";
    let expected = detector.analyze(text);
    let shared = &detector;
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(move || shared.analyze(text)))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
