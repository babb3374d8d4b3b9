//! Combat recordings on disk.
//!
//! A recording is JSON lines: the first line names the seed and starting
//! roster, every later line holds one combat input. Each input line carries a
//! SHA-256 digest chained from the roster line, so editing the roster or any
//! earlier input invalidates everything after it. Reading also checks that
//! every player action only names combatants from the roster.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::combat::{Combatant, CombatantId};
use crate::journal::{CombatJournal, JournalPayload, JournalRecord};

const ROSTER_DOMAIN: &[u8] = b"crawler-recording/roster";

#[derive(Serialize, Deserialize)]
struct RosterLine {
    format_version: u16,
    build_id: String,
    seed: u64,
    player: Combatant,
    enemies: Vec<Combatant>,
}

#[derive(Serialize, Deserialize)]
struct InputLine {
    seq: u64,
    input: JournalPayload,
    digest: String,
}

fn roster_digest(roster_json: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ROSTER_DOMAIN);
    hasher.update(roster_json.as_bytes());
    format!("{:064x}", hasher.finalize())
}

fn input_digest(previous: &str, seq: u64, input: &JournalPayload) -> io::Result<String> {
    let input_json = serde_json::to_string(input).map_err(io::Error::other)?;
    let mut hasher = Sha256::new();
    hasher.update(previous.as_bytes());
    hasher.update(seq.to_le_bytes());
    hasher.update(input_json.as_bytes());
    Ok(format!("{:064x}", hasher.finalize()))
}

/// Appends inputs to a recording, one flushed line per input.
#[derive(Debug)]
pub struct CombatRecorder {
    out: BufWriter<File>,
    head: String,
    next_seq: u64,
}

impl CombatRecorder {
    /// Starts a recording at `path` with the journal's roster followed by the
    /// inputs it already holds.
    pub fn create(path: &Path, journal: &CombatJournal) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let roster = RosterLine {
            format_version: journal.format_version,
            build_id: journal.build_id.clone(),
            seed: journal.seed,
            player: journal.player.clone(),
            enemies: journal.enemies.clone(),
        };
        let roster_json = serde_json::to_string(&roster).map_err(io::Error::other)?;

        let mut recorder = Self::append_to(File::create(path)?, roster_digest(&roster_json), 0);
        writeln!(recorder.out, "{roster_json}")?;
        recorder.out.flush()?;
        for record in &journal.inputs {
            recorder.record(&record.payload)?;
        }
        Ok(recorder)
    }

    /// Verifies the recording at `path` and continues it after its last input.
    pub fn reopen(path: &Path) -> Result<Self, RecordingError> {
        let verified = verify(path)?;
        let file = OpenOptions::new().append(true).open(path)?;
        Ok(Self::append_to(file, verified.head, verified.journal.next_seq()))
    }

    /// Wraps an already positioned file whose chain currently ends at `head`.
    pub(crate) fn append_to(file: File, head: String, next_seq: u64) -> Self {
        Self { out: BufWriter::new(file), head, next_seq }
    }

    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// Digest of the last line written; the roster digest while no input is recorded.
    pub fn head_digest(&self) -> &str {
        &self.head
    }

    pub fn record(&mut self, input: &JournalPayload) -> io::Result<()> {
        let digest = input_digest(&self.head, self.next_seq, input)?;
        let line = InputLine { seq: self.next_seq, input: input.clone(), digest };
        let line_json = serde_json::to_string(&line).map_err(io::Error::other)?;
        writeln!(self.out, "{line_json}")?;
        self.out.flush()?;

        self.head = line.digest;
        self.next_seq += 1;
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum RecordingError {
    #[error("recording I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("recording is empty")]
    Empty,
    #[error("line {line} is not terminated; the recording was cut off")]
    Unterminated { line: usize },
    #[error("roster line is malformed: {reason}")]
    BadRoster { reason: String },
    #[error("input on line {line} is malformed: {reason}")]
    BadInput { line: usize, reason: String },
    #[error("line {line} holds input {found}, expected input {expected}")]
    OutOfSequence { line: usize, expected: u64, found: u64 },
    #[error("digest mismatch on line {line}; the roster or an earlier input was altered")]
    DigestMismatch { line: usize },
    #[error("line {line} names `{id}`, who is not part of the roster")]
    ForeignCombatant { line: usize, id: CombatantId },
    #[error("line {line} is a player action issued by `{id}`")]
    NotThePlayer { line: usize, id: CombatantId },
}

struct Verified {
    journal: CombatJournal,
    head: String,
}

/// Reads and verifies the recording at `path`.
pub fn read_recording(path: &Path) -> Result<CombatJournal, RecordingError> {
    verify(path).map(|verified| verified.journal)
}

fn verify(path: &Path) -> Result<Verified, RecordingError> {
    let content = fs::read_to_string(path)?;
    let lines: Vec<&str> = content.lines().collect();
    if lines.is_empty() {
        return Err(RecordingError::Empty);
    }
    if !content.ends_with('\n') {
        return Err(RecordingError::Unterminated { line: lines.len() });
    }

    let roster: RosterLine = serde_json::from_str(lines[0])
        .map_err(|e| RecordingError::BadRoster { reason: e.to_string() })?;
    let mut head = roster_digest(lines[0]);
    let mut journal = CombatJournal {
        format_version: roster.format_version,
        build_id: roster.build_id,
        seed: roster.seed,
        player: roster.player,
        enemies: roster.enemies,
        inputs: Vec::new(),
    };

    for (offset, raw) in lines.iter().enumerate().skip(1) {
        let line = offset + 1;
        let parsed: InputLine = serde_json::from_str(raw)
            .map_err(|e| RecordingError::BadInput { line, reason: e.to_string() })?;

        let expected = journal.next_seq();
        if parsed.seq != expected {
            return Err(RecordingError::OutOfSequence { line, expected, found: parsed.seq });
        }
        if input_digest(&head, parsed.seq, &parsed.input)? != parsed.digest {
            return Err(RecordingError::DigestMismatch { line });
        }
        check_roster_membership(&journal, &parsed.input, line)?;

        head = parsed.digest;
        journal.inputs.push(JournalRecord { seq: parsed.seq, payload: parsed.input });
    }

    Ok(Verified { journal, head })
}

fn check_roster_membership(
    journal: &CombatJournal,
    input: &JournalPayload,
    line: usize,
) -> Result<(), RecordingError> {
    let JournalPayload::PlayerAction(action) = input else {
        return Ok(());
    };
    let in_roster = |id: &CombatantId| {
        journal.player.id == *id || journal.enemies.iter().any(|enemy| enemy.id == *id)
    };

    if !in_roster(&action.actor_id) {
        return Err(RecordingError::ForeignCombatant { line, id: action.actor_id.clone() });
    }
    if action.actor_id != journal.player.id {
        return Err(RecordingError::NotThePlayer { line, id: action.actor_id.clone() });
    }
    match &action.target_id {
        Some(target) if !in_roster(target) => {
            Err(RecordingError::ForeignCombatant { line, id: target.clone() })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests;
