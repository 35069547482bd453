//! Live match state for the GUI: the engine plus the bot worker

use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::{Arc, Mutex, TryLockError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::BotConfig;
use crate::error::CollaboratorError;
use crate::game::{GameMode, GameStatus, LiveGame, MoveOutcome};
use crate::service::{BotService, MoveSuggester, RecordStore, SessionService};
use crate::Pos;

/// Bot shared between the UI thread (sessions) and request workers
pub type SharedBot = Arc<Mutex<Box<dyn BotService>>>;

/// Bot request progress
pub enum BotState {
    Idle,
    /// Bot is to move; the request goes out after the configured delay
    Scheduled { due: Instant },
    Thinking {
        receiver: Receiver<Result<Pos, CollaboratorError>>,
        start_time: Instant,
    },
    /// Last request failed; waits for [`PlaySession::retry_bot`]
    Failed,
}

/// A match being played in the GUI
pub struct PlaySession {
    pub game: LiveGame,
    bot: Option<SharedBot>,
    bot_state: BotState,
    /// Stop/start owed to the bot session. Runs once no worker holds the bot,
    /// and no request goes out before it has.
    restart_pending: bool,
    delay: Duration,
    timeout: Duration,
    pub message: Option<String>,
    pub save_name: String,
    pub saved: bool,
}

impl PlaySession {
    pub fn new(mode: GameMode, size: usize, bot: Option<SharedBot>, config: &BotConfig) -> Self {
        let bot = if mode == GameMode::PvBot { bot } else { None };
        let mut session = Self {
            game: LiveGame::new(mode, size),
            restart_pending: bot.is_some(),
            bot,
            bot_state: BotState::Idle,
            delay: config.delay(),
            timeout: config.timeout(),
            message: None,
            save_name: String::new(),
            saved: false,
        };
        // The previous match may have left the engine running
        session.run_pending_restart();
        session
    }

    /// Stop then start the bot session, unless a worker still holds the bot
    fn run_pending_restart(&mut self) {
        if !self.restart_pending {
            return;
        }
        let Some(bot) = self.bot.clone() else {
            self.restart_pending = false;
            return;
        };
        let errors = match bot.try_lock() {
            Ok(mut bot) => self.game.restart_session(&mut **bot),
            Err(TryLockError::WouldBlock) => {
                debug!("bot busy, session restart deferred");
                return;
            }
            Err(TryLockError::Poisoned(_)) => {
                vec![CollaboratorError::unavailable("bot session", "bot lock poisoned")]
            }
        };
        self.restart_pending = false;
        if !errors.is_empty() {
            let text: Vec<String> = errors.iter().map(ToString::to_string).collect();
            self.message = Some(text.join("; "));
        }
    }

    pub fn is_bot_thinking(&self) -> bool {
        matches!(self.bot_state, BotState::Thinking { .. }) || self.game.awaiting_bot()
    }

    pub fn bot_thinking_elapsed(&self) -> Option<Duration> {
        match &self.bot_state {
            BotState::Thinking { start_time, .. } => Some(start_time.elapsed()),
            _ => None,
        }
    }

    /// Human click on the board
    pub fn click(&mut self, pos: Pos) {
        match self.game.play_human(pos) {
            MoveOutcome::Ignored(_) => {}
            _ => self.message = None,
        }
    }

    /// Drive the bot; call once per frame
    pub fn update_bot(&mut self) {
        if self.restart_pending {
            self.run_pending_restart();
            if self.restart_pending {
                return;
            }
        }

        match &self.bot_state {
            BotState::Idle => {
                if self.game.bot_request().is_some() {
                    self.bot_state = BotState::Scheduled {
                        due: Instant::now() + self.delay,
                    };
                }
            }
            BotState::Scheduled { due } => {
                if Instant::now() >= *due {
                    self.dispatch_bot_request();
                }
            }
            BotState::Thinking { receiver, start_time } => {
                let reply = match receiver.try_recv() {
                    Ok(reply) => reply,
                    Err(TryRecvError::Empty) if start_time.elapsed() < self.timeout => return,
                    Err(TryRecvError::Empty) => Err(CollaboratorError::unavailable(
                        "move suggestion",
                        format!("no answer within {} ms", self.timeout.as_millis()),
                    )),
                    Err(TryRecvError::Disconnected) => {
                        Err(CollaboratorError::unavailable("move suggestion", "bot worker stopped"))
                    }
                };
                self.bot_state = match self.game.finish_bot_request(reply) {
                    Ok(MoveOutcome::Ignored(reason)) => {
                        self.message = Some(format!("Bot move rejected: {reason:?}"));
                        BotState::Failed
                    }
                    Ok(_) => BotState::Idle,
                    Err(err) => {
                        self.message = Some(format!("Bot move failed: {err}"));
                        BotState::Failed
                    }
                };
            }
            BotState::Failed => {}
        }
    }

    pub fn bot_failed(&self) -> bool {
        matches!(self.bot_state, BotState::Failed)
    }

    /// Ask the bot again after a failed request
    pub fn retry_bot(&mut self) {
        if self.bot_failed() {
            self.bot_state = BotState::Idle;
            self.message = None;
        }
    }

    /// Something bot-side is pending and the UI should keep repainting
    pub fn bot_pending(&self) -> bool {
        if self.restart_pending {
            return true;
        }
        match self.bot_state {
            BotState::Idle => self.game.bot_request().is_some(),
            BotState::Scheduled { .. } | BotState::Thinking { .. } => true,
            BotState::Failed => false,
        }
    }

    fn dispatch_bot_request(&mut self) {
        self.bot_state = BotState::Idle;
        let Some(request) = self.game.begin_bot_request() else {
            return;
        };
        let Some(bot) = self.bot.as_ref().map(Arc::clone) else {
            let err = CollaboratorError::unavailable("move suggestion", "no bot configured");
            if let Err(err) = self.game.finish_bot_request(Err(err)) {
                self.message = Some(err.to_string());
            }
            self.bot_state = BotState::Failed;
            return;
        };

        let (tx, rx) = channel();
        thread::spawn(move || {
            let reply = match bot.lock() {
                Ok(mut bot) => bot.suggest_move(request.last_move),
                Err(_) => Err(CollaboratorError::unavailable("move suggestion", "bot lock poisoned")),
            };
            let _ = tx.send(reply);
        });

        self.bot_state = BotState::Thinking {
            receiver: rx,
            start_time: Instant::now(),
        };
    }

    /// New game in the same mode; restarts the bot session in bot mode
    pub fn reset(&mut self) {
        // Drop any outstanding request; its reply goes nowhere
        self.bot_state = BotState::Idle;
        self.message = None;
        self.saved = false;
        self.game.reset();

        if self.bot.is_some() {
            self.restart_pending = true;
            self.run_pending_restart();
        }
    }

    /// Save is only offered once someone has won
    pub fn can_save(&self) -> bool {
        matches!(self.game.status(), GameStatus::Won(_)) && !self.saved
    }

    pub fn save(&mut self, store: &mut dyn RecordStore) {
        let name = self.save_name.trim();
        if name.is_empty() {
            self.message = Some("Enter a name for the match".to_string());
            return;
        }
        match self.game.save(name, store) {
            Ok(_) => {
                self.saved = true;
                self.message = Some("Match saved".to_string());
            }
            Err(err) => self.message = Some(format!("Save failed: {err}")),
        }
    }
}

impl Drop for PlaySession {
    fn drop(&mut self) {
        // A busy bot is left alone; the next session restarts it anyway
        if let Some(bot) = &self.bot {
            if let Ok(mut bot) = bot.try_lock() {
                let _ = bot.stop_session();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Stone;
    use std::collections::VecDeque;
    use std::sync::mpsc::Sender;

    /// Bot that logs every call and answers from a script.
    ///
    /// With `gate` set, each `suggest_move` reports on `entered` and then
    /// blocks until the test sends on (or drops) the gate's sender.
    struct ScriptedBot {
        calls: Arc<Mutex<Vec<&'static str>>>,
        replies: VecDeque<Pos>,
        entered: Option<Sender<()>>,
        gate: Option<Receiver<()>>,
    }

    impl MoveSuggester for ScriptedBot {
        fn suggest_move(&mut self, _last_move: Pos) -> Result<Pos, CollaboratorError> {
            self.calls.lock().unwrap().push("turn");
            if let Some(entered) = &self.entered {
                let _ = entered.send(());
            }
            if let Some(gate) = &self.gate {
                let _ = gate.recv();
            }
            self.replies
                .pop_front()
                .ok_or_else(|| CollaboratorError::unavailable("move suggestion", "script exhausted"))
        }
    }

    impl SessionService for ScriptedBot {
        fn start_session(&mut self) -> Result<(), CollaboratorError> {
            self.calls.lock().unwrap().push("start");
            Ok(())
        }

        fn stop_session(&mut self) -> Result<(), CollaboratorError> {
            self.calls.lock().unwrap().push("stop");
            Ok(())
        }
    }

    struct Harness {
        calls: Arc<Mutex<Vec<&'static str>>>,
        entered: Receiver<()>,
        release: Sender<()>,
    }

    impl Harness {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn config(delay_ms: u64, timeout_ms: u64) -> BotConfig {
        BotConfig {
            engine_path: None,
            timeout_ms,
            delay_ms,
        }
    }

    fn bot_session(replies: &[Pos], gated: bool, config: &BotConfig) -> (PlaySession, Harness) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let (entered_tx, entered_rx) = channel();
        let (release_tx, release_rx) = channel();
        let bot = ScriptedBot {
            calls: Arc::clone(&calls),
            replies: replies.iter().copied().collect(),
            entered: Some(entered_tx),
            gate: gated.then_some(release_rx),
        };
        let boxed: Box<dyn BotService> = Box::new(bot);
        let shared: SharedBot = Arc::new(Mutex::new(boxed));
        let session = PlaySession::new(GameMode::PvBot, 15, Some(shared), config);
        let harness = Harness {
            calls,
            entered: entered_rx,
            release: release_tx,
        };
        (session, harness)
    }

    /// Poll like the frame loop until `done` holds
    fn pump(session: &mut PlaySession, done: impl Fn(&PlaySession) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !done(session) {
            assert!(Instant::now() < deadline, "bot never settled");
            session.update_bot();
            thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn test_new_bot_game_restarts_session() {
        let (session, harness) = bot_session(&[], false, &config(0, 1000));
        assert_eq!(harness.calls(), vec!["stop", "start"]);
        assert!(!session.bot_pending());
    }

    #[test]
    fn test_pvp_has_no_bot() {
        let boxed: Box<dyn BotService> = Box::new(crate::service::FirstEmptyBot::new(15));
        let bot: SharedBot = Arc::new(Mutex::new(boxed));
        let mut session = PlaySession::new(GameMode::PvP, 15, Some(bot), &config(0, 1000));
        session.click(Pos::new(7, 7));
        session.update_bot();
        assert!(!session.bot_pending());
        assert_eq!(session.game.current_turn(), Stone::White);
    }

    #[test]
    fn test_bot_reply_is_played() {
        let (mut session, harness) = bot_session(&[Pos::new(8, 8)], false, &config(0, 1000));
        session.click(Pos::new(7, 7));
        assert!(session.bot_pending());

        pump(&mut session, |s| s.game.current_turn() == Stone::Black);
        assert_eq!(session.game.board().get(Pos::new(8, 8)), Stone::White);
        assert_eq!(harness.calls(), vec!["stop", "start", "turn"]);
        assert!(!session.bot_pending());
        assert!(session.message.is_none());
    }

    #[test]
    fn test_request_waits_for_delay() {
        let (mut session, harness) = bot_session(&[Pos::new(8, 8)], false, &config(60_000, 1000));
        session.click(Pos::new(7, 7));
        for _ in 0..5 {
            session.update_bot();
        }
        assert!(session.bot_pending());
        assert!(!session.is_bot_thinking());
        assert_eq!(harness.calls(), vec!["stop", "start"]);
    }

    #[test]
    fn test_hung_bot_times_out_and_stops_asking() {
        let (mut session, harness) = bot_session(&[Pos::new(8, 8)], true, &config(0, 30));
        session.click(Pos::new(7, 7));
        pump(&mut session, |s| s.bot_failed());

        let msg = session.message.clone().unwrap_or_default();
        assert!(msg.contains("no answer within 30 ms"), "{msg}");
        assert_eq!(session.game.current_turn(), Stone::White);
        assert_eq!(session.game.move_log().len(), 1);
        assert!(!session.game.awaiting_bot());
        assert!(!session.bot_pending());

        // Failed stays failed until the user retries
        session.update_bot();
        assert!(session.bot_failed());

        session.retry_bot();
        assert!(!session.bot_failed());
        assert!(session.message.is_none());
        assert!(session.bot_pending());

        drop(harness.release);
    }

    #[test]
    fn test_rejected_reply_then_retry() {
        // First answer lands on the human's stone
        let (mut session, harness) = bot_session(&[Pos::new(7, 7), Pos::new(8, 8)], false, &config(0, 1000));
        session.click(Pos::new(7, 7));
        pump(&mut session, |s| s.bot_failed());

        assert!(session.message.as_deref().unwrap_or_default().contains("rejected"));
        assert_eq!(session.game.move_log().len(), 1);
        for _ in 0..5 {
            session.update_bot();
        }
        assert_eq!(harness.calls(), vec!["stop", "start", "turn"]);

        session.retry_bot();
        pump(&mut session, |s| s.game.current_turn() == Stone::Black);
        assert_eq!(session.game.board().get(Pos::new(8, 8)), Stone::White);
        assert_eq!(harness.calls(), vec!["stop", "start", "turn", "turn"]);
    }

    #[test]
    fn test_reset_while_thinking_restarts_after_reply() {
        let (mut session, harness) = bot_session(&[Pos::new(8, 8)], true, &config(0, 60_000));
        session.click(Pos::new(7, 7));
        session.update_bot();
        session.update_bot();
        // Worker is inside suggest_move and holds the bot
        harness.entered.recv().unwrap();
        assert!(session.is_bot_thinking());

        session.reset();
        assert!(session.game.board().is_board_empty());
        assert!(session.message.is_none());
        assert!(session.bot_pending());
        session.update_bot();
        assert_eq!(harness.calls(), vec!["stop", "start", "turn"]);

        harness.release.send(()).unwrap();
        pump(&mut session, |s| !s.bot_pending());
        assert_eq!(harness.calls(), vec!["stop", "start", "turn", "stop", "start"]);

        // The stale reply never reaches the new game
        assert!(session.game.board().is_board_empty());
        assert_eq!(session.game.current_turn(), Stone::Black);
    }

    #[test]
    fn test_human_may_move_while_restart_is_pending() {
        let (mut session, harness) = bot_session(&[Pos::new(8, 8), Pos::new(9, 9)], true, &config(0, 60_000));
        session.click(Pos::new(7, 7));
        session.update_bot();
        session.update_bot();
        harness.entered.recv().unwrap();

        session.reset();
        session.click(Pos::new(3, 3));
        for _ in 0..5 {
            session.update_bot();
        }
        // No new request before the session has restarted
        assert_eq!(harness.calls(), vec!["stop", "start", "turn"]);
        assert!(!session.game.awaiting_bot());

        harness.release.send(()).unwrap();
        pump(&mut session, |_| harness.calls().len() == 6);
        assert_eq!(harness.calls(), vec!["stop", "start", "turn", "stop", "start", "turn"]);

        harness.release.send(()).unwrap();
        pump(&mut session, |s| s.game.current_turn() == Stone::Black);
        assert_eq!(session.game.board().get(Pos::new(9, 9)), Stone::White);
    }
}
