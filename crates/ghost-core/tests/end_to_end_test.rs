//! Full flow: questionnaire, ghost genesis, candidate search, simulation.

mod support;

use ghost_core::questionnaire::{compile, AnswerSet, QuestionBank};
use ghost_core::{
    GhostProtocol, PersonaStore, SimulationStore, MATCH_LIMIT, MATCH_THRESHOLD,
    MAX_DIALOGUE_TURNS, MAX_SCORE, MIN_DIALOGUE_TURNS,
};
use support::{profile_json, protocol, simulation_json, ScriptedModel};

const BANK: &str = r#"[
  {"title": "Core Drive", "description": "", "questions": [
    {"id": "weekend", "q": "Friday night, phone off. What are you doing?",
     "options": [{"value": "party", "text": "Going out"}, {"value": "custom", "text": "Other"}]}
  ]},
  {"title": "Conflict", "description": "", "questions": [
    {"id": "fight", "q": "Mid-argument you...",
     "options": [{"value": "walk", "text": "Walk away"}, {"value": "custom", "text": "Other"}]}
  ]},
  {"title": "Resources", "description": "", "questions": [
    {"id": "money", "q": "Who pays on the first date?",
     "options": [{"value": "split", "text": "Split it"}, {"value": "custom", "text": "Other"}]}
  ]}
]"#;

fn with_bank(protocol: GhostProtocol) -> GhostProtocol {
    protocol.with_question_bank(QuestionBank::from_json(BANK).expect("test bank"))
}

#[tokio::test]
async fn questionnaire_to_recorded_simulation() {
    let model = ScriptedModel::new();
    let (protocol, store, _dir) = protocol(model.clone(), 11);
    let protocol = with_bank(protocol);

    let answers = AnswerSet::from_raw([
        ("weekend", "custom:likes hiking"),
        ("fight", "walk"),
        ("money", "split"),
    ]);

    let document = compile(&answers, protocol.question_bank());
    assert_eq!(document.as_str().matches("=== ").count(), 3);
    assert!(document.as_str().contains("A: (Custom Answer): likes hiking\n"));
    assert_eq!(compile(&answers, protocol.question_bank()), document);

    // Same digest for both users, so they are guaranteed neighbours.
    model.push(profile_json("Earnest", "I am outdoorsy. I walk it off."));
    model.push(profile_json("Earnest", "I am outdoorsy. I walk it off."));
    model.push(profile_json("Cold", "Ledger. Spreadsheet. Audit."));

    let alice = protocol.genesis("alice", &answers).await.expect("alice");
    protocol.genesis("bob", &answers).await.expect("bob");
    protocol.genesis("carol", &AnswerSet::new()).await.expect("carol");

    assert_eq!(model.requests()[0].prompt, document.as_str());
    assert_eq!(alice.profile.traits.len(), 5);
    assert!((0.0..=10.0).contains(&alice.profile.mating_value));
    assert!(store.get_ghost("alice").unwrap().is_some());

    let candidates = protocol.find_candidates("alice").await.expect("candidates");
    assert!(candidates.len() <= MATCH_LIMIT);
    assert!(candidates.iter().all(|c| c.similarity >= MATCH_THRESHOLD));
    assert!(candidates.iter().all(|c| c.ghost_id != "alice"));
    assert_eq!(candidates[0].ghost_id, "bob");

    model.push(simulation_json(58, 10));
    let outcome = protocol
        .run_simulation("alice", &candidates[0].ghost_id, "phone_check")
        .await
        .expect("simulation");
    assert!(outcome.result.score <= MAX_SCORE);
    assert!((MIN_DIALOGUE_TURNS..=MAX_DIALOGUE_TURNS).contains(&outcome.result.dialogue.len()));
    assert!(outcome
        .result
        .dialogue
        .windows(2)
        .all(|w| w[0].speaker != w[1].speaker));

    let run = store.get_run(&outcome.run_id).unwrap().expect("run persisted");
    assert_eq!(run.target_ghost_id, "bob");
    assert_eq!(run.result, outcome.result);
}
