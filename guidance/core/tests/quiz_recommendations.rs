//! Quiz engine behaviour across whole question banks

use std::collections::HashSet;

use guidance_core::quiz::{rank_tags, DEFAULT_TOP_N};
use guidance_core::CareerTag::{
    self, DataScientist, Doctor, Lawyer, SoftwareEngineer, Teacher,
};
use guidance_core::{
    Question, QuestionBank, QuizEngine, QuizOption, QuizState, Recommendation, StaticCatalog,
};
use pretty_assertions::assert_eq;

fn option(id: &str, tags: &[CareerTag]) -> QuizOption {
    QuizOption {
        id: id.to_string(),
        label: id.to_string(),
        tags: tags.to_vec(),
    }
}

fn question(id: u32, options: Vec<QuizOption>) -> Question {
    Question {
        id,
        prompt: format!("Question {id}"),
        options,
    }
}

fn rec(tag: CareerTag, frequency: usize) -> Recommendation {
    Recommendation { tag, frequency }
}

#[test]
fn test_accumulator_length_matches_selected_tag_counts() {
    let catalog = StaticCatalog::builtin().unwrap();
    let bank = QuestionBank::builtin().unwrap();

    // A few deterministic walks through the built-in bank
    for shift in 0..4 {
        let mut engine = QuizEngine::new(bank.clone(), &catalog);
        engine.start();
        let mut expected = 0;
        for (index, q) in bank.questions().iter().enumerate() {
            let chosen = &q.options[(index + shift) % q.options.len()];
            expected += chosen.tags.len();
            engine.advance(&chosen.id).unwrap();
            assert_eq!(engine.accumulator().len(), expected);
        }
        assert_eq!(engine.state(), QuizState::ShowingResults);
    }
}

#[test]
fn test_reset_after_any_number_of_answers() {
    let catalog = StaticCatalog::builtin().unwrap();
    let bank = QuestionBank::builtin().unwrap();

    for answered in 0..=bank.len() {
        let mut engine = QuizEngine::new(bank.clone(), &catalog);
        engine.start();
        for q in bank.questions().iter().take(answered) {
            engine.advance(&q.options[0].id).unwrap();
        }
        engine.reset();
        assert!(engine.accumulator().is_empty());
        assert_eq!(engine.answered(), 0);
        assert_eq!(engine.state(), QuizState::Answering(0));
    }
}

#[test]
fn test_go_back_removes_exactly_the_previous_batch() {
    let bank = QuestionBank::new(vec![
        question(1, vec![option("three", &[Doctor, Teacher, Lawyer])]),
        question(
            2,
            vec![option(
                "four",
                &[SoftwareEngineer, DataScientist, Doctor, Teacher],
            )],
        ),
        question(3, vec![option("one", &[Lawyer])]),
    ])
    .unwrap();
    let mut engine = QuizEngine::with_known(bank, CareerTag::ALL.into_iter().collect());
    engine.start();

    engine.advance("three").unwrap();
    let after_first = engine.accumulator().to_vec();
    engine.advance("four").unwrap();
    assert_eq!(engine.accumulator().len(), 7);

    assert!(engine.go_back());
    assert_eq!(engine.state(), QuizState::Answering(1));
    assert_eq!(engine.accumulator(), after_first.as_slice());

    assert!(engine.go_back());
    assert_eq!(engine.state(), QuizState::Answering(0));
    assert!(engine.accumulator().is_empty());
    assert!(!engine.go_back());
}

#[test]
fn test_go_back_from_results_reopens_last_question() {
    let catalog = StaticCatalog::builtin().unwrap();
    let bank = QuestionBank::builtin().unwrap();
    let mut engine = QuizEngine::new(bank.clone(), &catalog);
    engine.start();
    for q in bank.questions() {
        engine.advance(&q.options[1].id).unwrap();
    }
    let last_batch = bank.questions()[bank.len() - 1].options[1].tags.len();
    let before_last = engine.accumulator().len() - last_batch;

    assert!(engine.go_back());
    assert_eq!(engine.state(), QuizState::Answering(bank.len() - 1));
    assert_eq!(engine.accumulator().len(), before_last);
    assert_eq!(engine.results(), None);
}

#[test]
fn test_ties_keep_encounter_order_and_unknown_tags_drop() {
    // a = software engineer, b = data scientist, c = doctor, d = lawyer (unknown)
    let bank = QuestionBank::new(vec![
        question(1, vec![option("x", &[])]),
        question(2, vec![option("y", &[])]),
    ])
    .unwrap();
    let known: HashSet<CareerTag> = [SoftwareEngineer, DataScientist, Doctor].into_iter().collect();
    let mut engine = QuizEngine::with_known(bank, known);
    engine.start();

    engine
        .advance_tags(&[SoftwareEngineer, DataScientist, Lawyer, SoftwareEngineer])
        .unwrap();
    engine
        .advance_tags(&[Doctor, SoftwareEngineer, DataScientist, Doctor])
        .unwrap();

    assert_eq!(
        engine.results(),
        Some(vec![
            rec(SoftwareEngineer, 3),
            rec(DataScientist, 2),
            rec(Doctor, 2),
        ])
    );
}

#[test]
fn test_five_identical_answers() {
    let catalog = StaticCatalog::builtin().unwrap();
    let questions = (1..=5)
        .map(|id| question(id, vec![option("code", &[SoftwareEngineer])]))
        .collect();
    let mut engine = QuizEngine::new(QuestionBank::new(questions).unwrap(), &catalog);
    engine.start();
    for _ in 0..5 {
        engine.advance("code").unwrap();
    }

    let results = engine.results().unwrap();
    assert_eq!(results, vec![rec(SoftwareEngineer, 5)]);
}

#[test]
fn test_truncation_happens_before_filtering() {
    let known: HashSet<CareerTag> = [SoftwareEngineer, DataScientist].into_iter().collect();
    let tags = [Lawyer, Lawyer, Lawyer, SoftwareEngineer, SoftwareEngineer, DataScientist];

    assert_eq!(rank_tags(&tags, &known, 2), vec![rec(SoftwareEngineer, 2)]);
    assert_eq!(
        rank_tags(&tags, &known, DEFAULT_TOP_N),
        vec![rec(SoftwareEngineer, 2), rec(DataScientist, 1)]
    );
}

#[test]
fn test_builtin_bank_tags_all_exist_in_builtin_catalog() {
    let catalog = StaticCatalog::builtin().unwrap();
    let bank = QuestionBank::builtin().unwrap();
    assert!(bank.unmatched_tags(&catalog).is_empty());
}
