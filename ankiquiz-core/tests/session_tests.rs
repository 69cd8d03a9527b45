use ankiquiz_core::{CoreError, DeckSession, MemoryCollection, Note};
use rand::{rngs::StdRng, SeedableRng};
use std::collections::BTreeSet;

fn sample() -> MemoryCollection {
    let mut c = MemoryCollection::default();
    c.add_question("Geo", &["Capital of France?", "Paris", "Rome", "Lyon", "A"])
        .add_question("Geo", &["Rivers in Poland?", "Vistula", "Danube", "Oder", "a c"])
        .add_question("Geo", &["Largest ocean?", "Pacific", "Atlantic", "A"]);
    c
}

fn set(v: &[usize]) -> BTreeSet<usize> {
    v.iter().copied().collect()
}

#[tokio::test]
async fn unknown_deck_is_not_found() {
    let c = sample();
    let mut s = DeckSession::new("History");
    assert_eq!(s.load(&c).await, Err(CoreError::DeckNotFound("History".into())));
    assert!(!s.is_loaded());
}

#[tokio::test]
async fn deck_without_matching_notes_is_empty() {
    let mut c = sample();
    c.add_deck("Blank");
    c.add_note("Other", Note::new(99, "Basic", vec!["front".into(), "back".into()]));

    let mut s = DeckSession::new("Blank");
    assert_eq!(s.load(&c).await, Err(CoreError::DeckEmpty("Blank".into())));
    let mut s = DeckSession::new("Other");
    assert_eq!(s.load(&c).await, Err(CoreError::DeckEmpty("Other".into())));
}

#[tokio::test]
async fn all_notes_malformed_is_empty_with_diagnostics() {
    let mut c = MemoryCollection::default();
    c.add_question("Bad", &["", "a", "A"]).add_question("Bad", &["q", "a", ""]);
    let mut s = DeckSession::new("Bad");
    assert_eq!(s.load(&c).await, Err(CoreError::DeckEmpty("Bad".into())));
    assert_eq!(s.errors(), ["Unknown, cannot show question", "q"]);
}

#[tokio::test]
async fn load_skips_malformed_and_keeps_order() {
    let mut c = sample();
    c.add_question("Geo", &["No answers?", "", "", "A"]);
    let mut s = DeckSession::new("Geo");
    s.load(&c).await.unwrap();

    assert_eq!(s.len(), 3);
    assert_eq!(s.errors(), ["No answers?"]);
    assert_eq!(s.question(), "Capital of France?");
    assert_eq!(s.entries()[1].correct, set(&[0, 2]));
    assert_eq!(s.position(), 0);
}

#[tokio::test]
async fn subdecks_are_included() {
    let mut c = sample();
    c.add_question("Geo::Europe", &["Capital of Spain?", "Madrid", "Porto", "A"]);
    let mut s = DeckSession::new("Geo");
    s.load(&c).await.unwrap();
    assert_eq!(s.len(), 4);
}

#[tokio::test]
async fn exact_set_scoring() {
    let c = sample();
    let mut s = DeckSession::new("Geo");
    s.load(&c).await.unwrap();

    assert_eq!(s.record_answer(&set(&[0])), Ok(true));
    s.advance().unwrap();
    // correct = {0, 2}
    assert_eq!(s.record_answer(&set(&[0])), Ok(false));
    assert_eq!(s.score(), 1);
    assert_eq!(s.wrong_questions(), ["Rivers in Poland?"]);

    s.advance().unwrap();
    assert_eq!(s.record_answer(&set(&[0, 1])), Ok(false));
    assert_eq!(s.wrong_questions().len(), 2);
    assert!(s.is_finished());
}

#[tokio::test]
async fn superset_and_exact_match() {
    let c = sample();
    let mut s = DeckSession::new("Geo");
    s.load(&c).await.unwrap();
    s.advance().unwrap();
    assert_eq!(s.record_answer(&set(&[2, 0])), Ok(true));

    let mut s = DeckSession::new("Geo");
    s.load(&c).await.unwrap();
    s.advance().unwrap();
    assert_eq!(s.record_answer(&set(&[0, 1, 2])), Ok(false));
    assert_eq!(s.score(), 0);
}

#[tokio::test]
async fn empty_selection_scores_zero() {
    let c = sample();
    let mut s = DeckSession::new("Geo");
    s.load(&c).await.unwrap();
    assert_eq!(s.record_answer(&BTreeSet::new()), Ok(false));
    assert_eq!(s.wrong_questions(), ["Capital of France?"]);
}

#[tokio::test]
async fn answering_twice_is_refused() {
    let c = sample();
    let mut s = DeckSession::new("Geo");
    s.load(&c).await.unwrap();
    s.record_answer(&set(&[0])).unwrap();
    assert_eq!(s.record_answer(&set(&[0])), Err(CoreError::AlreadyAnswered));
    assert_eq!(s.score(), 1);
}

#[tokio::test]
async fn advance_stops_at_last() {
    let c = sample();
    let mut s = DeckSession::new("Geo");
    s.load(&c).await.unwrap();
    s.advance().unwrap();
    s.advance().unwrap();
    assert_eq!(s.position(), 2);
    assert_eq!(s.advance(), Err(CoreError::Exhausted));
    assert_eq!(s.position(), 2);
}

#[test]
fn unloaded_session_accessors() {
    let mut s = DeckSession::new("Geo");
    assert_eq!(s.advance(), Err(CoreError::NotLoaded));
    assert_eq!(s.record_answer(&set(&[0])), Err(CoreError::NotLoaded));
    assert_eq!(s.question(), "");
    assert!(s.answers().is_empty());
    assert!(s.images().is_empty());
    assert_eq!(s.percentage(), 0.0);
    s.shuffle_current();
    assert!(s.entries().is_empty());
}

#[tokio::test]
async fn percentage_rounds_to_two_places() {
    let c = sample();
    let mut s = DeckSession::new("Geo");
    s.load(&c).await.unwrap();
    s.record_answer(&set(&[0])).unwrap();
    assert_eq!(s.max_score(), 3);
    assert_eq!(s.percentage(), 33.33);

    let report = s.report();
    assert_eq!(report.score, 1);
    assert_eq!(report.percentage, 33.33);
}

#[tokio::test]
async fn shuffle_is_a_permutation_keeping_correct_values() {
    let c = sample();
    let mut s = DeckSession::new("Geo");
    s.load(&c).await.unwrap();
    s.advance().unwrap();

    let before = s.current_question().unwrap().clone();
    let correct_before: BTreeSet<String> =
        before.correct.iter().map(|&i| before.answers[i].clone()).collect();

    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        s.shuffle_current_with(&mut rng);
        let after = s.current_question().unwrap();

        let mut a = after.answers.clone();
        let mut b = before.answers.clone();
        a.sort();
        b.sort();
        assert_eq!(a, b);

        let correct_after: BTreeSet<String> =
            after.correct.iter().map(|&i| after.answers[i].clone()).collect();
        assert_eq!(correct_after, correct_before);
    }
}

#[tokio::test]
async fn images_resolved_by_suffix() {
    let mut c = MemoryCollection::default();
    c.add_media("nested-cat.png", vec![0x89, 0x50])
        .add_question("Pics", &[r#"What is it?<img src="cat.png">"#, "cat", "dog", "A"])
        .add_question("Pics", &[r#"And this?<img src="missing.png">"#, "cat", "dog", "B"]);
    let mut s = DeckSession::new("Pics");
    s.load(&c).await.unwrap();

    assert_eq!(s.question(), "What is it?");
    assert_eq!(s.images(), ["iVA=".to_string()]);
    s.advance().unwrap();
    assert!(s.images().is_empty());
    assert_eq!(s.entries()[1].images, None);
}

#[tokio::test]
async fn report_serializes_with_stable_field_names() {
    let c = sample();
    let mut s = DeckSession::new("Geo");
    s.load(&c).await.unwrap();
    s.record_answer(&set(&[1])).unwrap();

    let v = serde_json::to_value(s.report()).unwrap();
    assert_eq!(v["deck"], "Geo");
    assert_eq!(v["score"], 0);
    assert_eq!(v["max_score"], 3);
    assert_eq!(v["percentage"], 0.0);
    assert_eq!(v["wrong_questions"], serde_json::json!(["Capital of France?"]));

    let back: ankiquiz_core::ScoreReport = serde_json::from_value(v).unwrap();
    assert_eq!(back, s.report());
}
