use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use tempfile::tempdir;

use super::*;
use crate::combat::{CombatAction, CombatStats, Side};
use crate::messages::MessageCatalog;
use crate::replay::replay_combat;
use crate::session::CombatSession;

fn hero() -> Combatant {
    let stats = CombatStats { max_hp: 120, attack: 25, defense: 12, speed: 30, ..Default::default() };
    Combatant::new("hero", "Hero", Side::Player, 3, stats)
}

fn goblins() -> Vec<Combatant> {
    let stats = CombatStats { max_hp: 30, attack: 7, defense: 3, speed: 10, ..Default::default() };
    vec![
        Combatant::new("g1", "Goblin", Side::Enemy, 1, stats.clone()),
        Combatant::new("g2", "Goblin", Side::Enemy, 1, stats),
    ]
}

fn id(raw: &str) -> CombatantId {
    CombatantId::new(raw)
}

fn empty_recording(path: &Path) -> CombatRecorder {
    CombatRecorder::create(path, &CombatJournal::new(11, hero(), goblins())).unwrap()
}

fn rewrite_lines(path: &Path, edit: impl FnOnce(&mut Vec<String>)) {
    let mut lines: Vec<String> = fs::read_to_string(path).unwrap().lines().map(String::from).collect();
    edit(&mut lines);
    fs::write(path, lines.join("\n") + "\n").unwrap();
}

#[test]
fn recorded_session_reads_back_and_replays_to_the_same_state() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fights/goblins.jsonl");

    let mut session =
        CombatSession::new(hero(), goblins(), 31, Arc::new(MessageCatalog::default())).unwrap();
    session.record_to(&path).unwrap();
    session.begin().unwrap();
    for _ in 0..3 {
        if session.is_over() {
            break;
        }
        let target = session.combat().living_enemies().next().unwrap().id.clone();
        session.execute_player_action(CombatAction::attack(id("hero"), target)).unwrap();
    }

    let journal = read_recording(&path).unwrap();
    assert_eq!(&journal, session.journal());
    let replayed = replay_combat(&journal).unwrap();
    assert_eq!(replayed.final_snapshot_hash, session.combat().snapshot_hash());
}

#[test]
fn existing_inputs_are_written_when_a_recording_starts() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("late.jsonl");
    let mut journal = CombatJournal::new(4, hero(), goblins());
    journal.append(JournalPayload::PlayerAction(CombatAction::defend(id("hero"))));
    journal.append(JournalPayload::EnemyTurn);

    let recorder = CombatRecorder::create(&path, &journal).unwrap();
    assert_eq!(recorder.next_seq(), 2);
    assert_eq!(read_recording(&path).unwrap(), journal);
}

#[test]
fn boosting_the_hero_in_the_roster_line_breaks_the_chain() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("boosted.jsonl");
    let mut recorder = empty_recording(&path);
    recorder.record(&JournalPayload::PlayerAction(CombatAction::defend(id("hero")))).unwrap();

    rewrite_lines(&path, |lines| {
        assert!(lines[0].contains("\"current_hp\":120,\"max_hp\":120"));
        lines[0] = lines[0].replace("\"current_hp\":120,\"max_hp\":120", "\"current_hp\":999,\"max_hp\":999");
    });

    let result = read_recording(&path);
    assert!(
        matches!(result, Err(RecordingError::DigestMismatch { line: 2 })),
        "a roster edit must invalidate the first input, got {result:?}"
    );
}

#[test]
fn altered_action_fails_its_digest() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("altered.jsonl");
    let mut recorder = empty_recording(&path);
    recorder.record(&JournalPayload::EnemyTurn).unwrap();
    recorder.record(&JournalPayload::PlayerAction(CombatAction::defend(id("hero")))).unwrap();

    rewrite_lines(&path, |lines| lines[2] = lines[2].replace("\"Defend\"", "\"Flee\""));

    let result = read_recording(&path);
    assert!(matches!(result, Err(RecordingError::DigestMismatch { line: 3 })), "got {result:?}");
}

#[test]
fn attack_on_a_combatant_outside_the_roster_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dragon.jsonl");
    let mut recorder = empty_recording(&path);
    recorder.record(&JournalPayload::PlayerAction(CombatAction::attack(id("hero"), id("dragon")))).unwrap();

    let result = read_recording(&path);
    assert!(
        matches!(&result, Err(RecordingError::ForeignCombatant { line: 2, id: who }) if who.as_str() == "dragon"),
        "got {result:?}"
    );
}

#[test]
fn player_action_issued_by_an_enemy_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("impostor.jsonl");
    let mut recorder = empty_recording(&path);
    recorder.record(&JournalPayload::EnemyTurn).unwrap();
    recorder.record(&JournalPayload::PlayerAction(CombatAction::flee(id("g2")))).unwrap();

    let result = read_recording(&path);
    assert!(
        matches!(&result, Err(RecordingError::NotThePlayer { line: 3, id: who }) if who.as_str() == "g2"),
        "got {result:?}"
    );
}

#[test]
fn reordered_inputs_are_reported_out_of_sequence() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("shuffled.jsonl");
    let mut recorder = empty_recording(&path);
    recorder.record(&JournalPayload::PlayerAction(CombatAction::attack(id("hero"), id("g1")))).unwrap();
    recorder.record(&JournalPayload::EnemyTurn).unwrap();

    rewrite_lines(&path, |lines| lines.swap(1, 2));

    let result = read_recording(&path);
    assert!(
        matches!(result, Err(RecordingError::OutOfSequence { line: 2, expected: 0, found: 1 })),
        "got {result:?}"
    );
}

#[test]
fn recording_cut_off_mid_line_is_unterminated() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cut.jsonl");
    let mut recorder = empty_recording(&path);
    recorder.record(&JournalPayload::EnemyTurn).unwrap();
    drop(recorder);

    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    write!(file, "{{\"seq\":1,\"input\":").unwrap();

    let result = read_recording(&path);
    assert!(matches!(result, Err(RecordingError::Unterminated { line: 3 })), "got {result:?}");
}

#[test]
fn reopened_recording_continues_the_chain() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("resumed.jsonl");
    let mut recorder = empty_recording(&path);
    recorder.record(&JournalPayload::PlayerAction(CombatAction::defend(id("hero")))).unwrap();
    let head = recorder.head_digest().to_string();
    drop(recorder);

    let mut resumed = CombatRecorder::reopen(&path).unwrap();
    assert_eq!(resumed.next_seq(), 1);
    assert_eq!(resumed.head_digest(), head);
    resumed.record(&JournalPayload::EnemyTurn).unwrap();

    let journal = read_recording(&path).unwrap();
    let seqs: Vec<u64> = journal.inputs.iter().map(|record| record.seq).collect();
    assert_eq!(seqs, vec![0, 1]);
    assert_eq!(journal.inputs[1].payload, JournalPayload::EnemyTurn);
}

#[test]
fn roster_only_recording_has_no_inputs() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fresh.jsonl");
    let recorder = empty_recording(&path);
    assert_eq!(recorder.next_seq(), 0);

    let journal = read_recording(&path).unwrap();
    assert_eq!(journal.seed, 11);
    assert_eq!(journal.enemies.len(), 2);
    assert!(journal.inputs.is_empty());
}

#[test]
fn empty_missing_and_malformed_files_are_errors() {
    let dir = tempdir().unwrap();

    let empty = dir.path().join("empty.jsonl");
    fs::write(&empty, "").unwrap();
    assert!(matches!(read_recording(&empty), Err(RecordingError::Empty)));

    let missing = dir.path().join("absent.jsonl");
    assert!(matches!(read_recording(&missing), Err(RecordingError::Io(_))));

    let malformed = dir.path().join("malformed.jsonl");
    fs::write(&malformed, "{\"seed\":1}\n").unwrap();
    assert!(matches!(read_recording(&malformed), Err(RecordingError::BadRoster { .. })));
}
