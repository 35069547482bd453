//! Gomocup ("pbrain") engine driven over stdin/stdout
//!
//! Protocol subset used here:
//! - `START <size>` -> `OK`
//! - `INFO <key> <value>` (no reply)
//! - `TURN <x>,<y>` -> `<x>,<y>` (the engine's move)
//! - `RESTART` -> `OK`
//! - `END` (no reply, engine exits)
//!
//! `x` is the column and `y` the row. Engines may emit `MESSAGE ...` and
//! `DEBUG ...` lines at any time; those are skipped.

use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::{MoveSuggester, SessionService};
use crate::board::Pos;
use crate::error::CollaboratorError;

const SERVICE: &str = "gomocup engine";

/// One parsed line from the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Reply {
    Ok,
    Move(Pos),
    Error(String),
    /// MESSAGE/DEBUG chatter or anything unrecognised
    Other,
}

pub(crate) fn parse_reply(line: &str) -> Reply {
    let line = line.trim();
    if line == "OK" {
        return Reply::Ok;
    }
    if line.starts_with("ERROR") || line.starts_with("UNKNOWN") {
        return Reply::Error(line.to_string());
    }
    if let Some((x, y)) = line.split_once(',') {
        if let (Ok(x), Ok(y)) = (x.trim().parse::<u8>(), y.trim().parse::<u8>()) {
            return Reply::Move(Pos::new(y, x));
        }
    }
    Reply::Other
}

/// Engine output, fed by the reader thread
struct ReplyReader {
    lines: Receiver<String>,
    /// Answers still owed to `TURN`s that timed out
    late_moves: usize,
}

impl ReplyReader {
    fn new(lines: Receiver<String>) -> Self {
        Self { lines, late_moves: 0 }
    }

    /// Read lines until one answers the last command. Moves owed to earlier
    /// timed-out `TURN`s are dropped on the way.
    fn next(&mut self, timeout: Duration) -> Result<Reply, CollaboratorError> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.lines.recv_timeout(remaining) {
                Ok(line) => {
                    debug!(line = %line, "<- engine");
                    match parse_reply(&line) {
                        Reply::Other => continue,
                        Reply::Move(pos) if self.late_moves > 0 => {
                            self.late_moves -= 1;
                            debug!(%pos, "dropping late move");
                        }
                        reply => return Ok(reply),
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    return Err(CollaboratorError::unavailable(
                        SERVICE,
                        format!("no reply within {} ms", timeout.as_millis()),
                    ));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(CollaboratorError::unavailable(SERVICE, "engine exited"));
                }
            }
        }
    }

    /// Answer to a `TURN`. If none arrives in time, the engine still owes it.
    fn answer_turn(&mut self, timeout: Duration) -> Result<Reply, CollaboratorError> {
        let reply = self.next(timeout);
        if reply.is_err() {
            self.late_moves += 1;
        }
        reply
    }
}

struct Running {
    child: Child,
    stdin: ChildStdin,
    replies: ReplyReader,
}

/// External engine process acting as move suggester and session service
pub struct PbrainEngine {
    path: PathBuf,
    board_size: usize,
    timeout: Duration,
    running: Option<Running>,
}

impl PbrainEngine {
    pub fn new(path: impl Into<PathBuf>, board_size: usize, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            board_size,
            timeout,
            running: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    fn spawn(&mut self) -> Result<(), CollaboratorError> {
        if !self.path.exists() {
            return Err(CollaboratorError::unavailable(
                SERVICE,
                format!("engine not found: {}", self.path.display()),
            ));
        }

        let mut child = Command::new(&self.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| CollaboratorError::unavailable(SERVICE, e.to_string()))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| CollaboratorError::unavailable(SERVICE, "no stdin pipe"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| CollaboratorError::unavailable(SERVICE, "no stdout pipe"))?;

        let (tx, rx) = channel();
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

        self.running = Some(Running {
            child,
            stdin,
            replies: ReplyReader::new(rx),
        });
        Ok(())
    }

    fn send(&mut self, command: &str) -> Result<(), CollaboratorError> {
        let running = self
            .running
            .as_mut()
            .ok_or_else(|| CollaboratorError::unavailable(SERVICE, "engine is not running"))?;
        debug!(command, "-> engine");
        writeln!(running.stdin, "{command}")?;
        running.stdin.flush()?;
        Ok(())
    }

    fn replies(&mut self) -> Result<&mut ReplyReader, CollaboratorError> {
        self.running
            .as_mut()
            .map(|running| &mut running.replies)
            .ok_or_else(|| CollaboratorError::unavailable(SERVICE, "engine is not running"))
    }

    fn expect_ok(&mut self, command: &str) -> Result<(), CollaboratorError> {
        self.send(command)?;
        let timeout = self.timeout;
        match self.replies()?.next(timeout)? {
            Reply::Ok => Ok(()),
            Reply::Error(reply) => Err(CollaboratorError::Protocol {
                service: SERVICE,
                reply,
            }),
            other => Err(CollaboratorError::Protocol {
                service: SERVICE,
                reply: format!("{other:?} in answer to {command}"),
            }),
        }
    }

    fn kill(&mut self) {
        if let Some(mut running) = self.running.take() {
            let _ = running.child.kill();
            let _ = running.child.wait();
        }
    }
}

impl SessionService for PbrainEngine {
    fn start_session(&mut self) -> Result<(), CollaboratorError> {
        if self.running.is_some() {
            // Same process, new game. Late moves arrive before the OK.
            self.expect_ok("RESTART")?;
            self.replies()?.late_moves = 0;
            return Ok(());
        }

        self.spawn()?;
        let size = self.board_size;
        if let Err(err) = self.expect_ok(&format!("START {size}")) {
            self.kill();
            return Err(err);
        }

        let turn_ms = self.timeout.as_millis();
        self.send(&format!("INFO timeout_turn {turn_ms}"))?;
        self.send(&format!("INFO timeout_match {}", turn_ms * 100))?;
        self.send("INFO rule 1")?;
        info!(path = %self.path.display(), size, "engine session started");
        Ok(())
    }

    fn stop_session(&mut self) -> Result<(), CollaboratorError> {
        if self.running.is_none() {
            return Ok(());
        }
        let result = self.send("END");

        if let Some(running) = self.running.as_mut() {
            let deadline = Instant::now() + Duration::from_millis(500);
            while Instant::now() < deadline {
                if let Ok(Some(_)) = running.child.try_wait() {
                    break;
                }
                thread::sleep(Duration::from_millis(20));
            }
        }
        self.kill();
        info!("engine session stopped");
        result
    }
}

impl MoveSuggester for PbrainEngine {
    fn suggest_move(&mut self, last_move: Pos) -> Result<Pos, CollaboratorError> {
        if self.running.is_none() {
            self.start_session()?;
        }
        self.send(&format!("TURN {},{}", last_move.col, last_move.row))?;
        let timeout = self.timeout;
        match self.replies()?.answer_turn(timeout)? {
            Reply::Move(pos) => {
                info!(%last_move, reply = %pos, "engine move");
                Ok(pos)
            }
            Reply::Error(reply) => {
                warn!(reply = %reply, "engine refused move");
                Err(CollaboratorError::Protocol {
                    service: SERVICE,
                    reply,
                })
            }
            other => Err(CollaboratorError::Protocol {
                service: SERVICE,
                reply: format!("{other:?} in answer to TURN"),
            }),
        }
    }
}

impl Drop for PbrainEngine {
    fn drop(&mut self) {
        let _ = self.stop_session();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_move_swaps_axes() {
        // Gomocup x is the column
        assert_eq!(parse_reply("3,10"), Reply::Move(Pos::new(10, 3)));
        assert_eq!(parse_reply(" 7 , 8 \r"), Reply::Move(Pos::new(8, 7)));
    }

    #[test]
    fn test_parse_status_lines() {
        assert_eq!(parse_reply("OK"), Reply::Ok);
        assert_eq!(parse_reply("ERROR bad size"), Reply::Error("ERROR bad size".to_string()));
        assert_eq!(parse_reply("UNKNOWN command"), Reply::Error("UNKNOWN command".to_string()));
        assert_eq!(parse_reply("MESSAGE thinking 3,4"), Reply::Other);
        assert_eq!(parse_reply("DEBUG depth 6"), Reply::Other);
        assert_eq!(parse_reply("-1,4"), Reply::Other);
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        let mut engine = PbrainEngine::new("/nonexistent/pbrain-engine", 15, Duration::from_millis(100));
        let err = engine.start_session().unwrap_err();
        assert!(matches!(err, CollaboratorError::Unavailable { .. }));
        assert!(!engine.is_running());

        let err = engine.suggest_move(Pos::new(7, 7)).unwrap_err();
        assert!(matches!(err, CollaboratorError::Unavailable { .. }));
    }

    #[test]
    fn test_stop_without_session_is_ok() {
        let mut engine = PbrainEngine::new("/nonexistent/pbrain-engine", 15, Duration::from_millis(100));
        assert!(engine.stop_session().is_ok());
    }

    #[test]
    fn test_late_move_is_not_taken_as_next_answer() {
        let (tx, rx) = channel();
        let mut replies = ReplyReader::new(rx);

        // First TURN gets no answer in time
        assert!(replies.answer_turn(Duration::from_millis(10)).is_err());
        assert_eq!(replies.late_moves, 1);

        // Then the late answer shows up ahead of the real one
        for line in ["1,1", "MESSAGE next", "2,2"] {
            tx.send(line.to_string()).unwrap();
        }
        let reply = replies.answer_turn(Duration::from_millis(500)).unwrap();
        assert_eq!(reply, Reply::Move(Pos::new(2, 2)));
        assert_eq!(replies.late_moves, 0);
    }

    #[test]
    fn test_reader_reports_exit() {
        let (tx, rx) = channel::<String>();
        let mut replies = ReplyReader::new(rx);
        drop(tx);
        let err = replies.next(Duration::from_millis(500)).unwrap_err();
        assert!(err.to_string().contains("engine exited"));
    }
}
