//! Main application for the Gomoku GUI

use eframe::egui;
use egui::{CentralPanel, Context, CornerRadius, Frame, RichText, ScrollArea, SidePanel, TopBottomPanel, Vec2};
use tracing::{info, warn};

use super::board_view::{BoardView, Overlay};
use super::game_state::{PlaySession, SharedBot};
use super::theme::*;
use crate::config::AppConfig;
use crate::game::{GameMode, GameStatus, ReplayEngine};
use crate::record::RecordSummary;
use crate::service::{JsonRecordStore, RecordStore};
use crate::Stone;

/// What the central area shows
enum Screen {
    Play(PlaySession),
    Records {
        list: Vec<RecordSummary>,
        error: Option<String>,
    },
    Replay(ReplayEngine),
}

/// User intent collected while drawing, applied once the frame's borrows end
enum Action {
    NewGame(GameMode),
    Reset,
    Save,
    RetryBot,
    OpenRecords,
    OpenReplay(String),
    StepForward,
    StepBackward,
    Rewind,
    FastForward,
}

/// Main Gomoku application
pub struct GomokuApp {
    config: AppConfig,
    store: Option<JsonRecordStore>,
    bot: SharedBot,
    screen: Screen,
    board_view: BoardView,
}

impl GomokuApp {
    pub fn new(config: AppConfig, store: Option<JsonRecordStore>, bot: SharedBot) -> Self {
        let session = PlaySession::new(GameMode::default(), config.board.size, Some(bot.clone()), &config.bot);
        Self {
            config,
            store,
            bot,
            screen: Screen::Play(session),
            board_view: BoardView::default(),
        }
    }

    /// Open straight into a replay
    pub fn with_replay(mut self, replay: ReplayEngine) -> Self {
        self.screen = Screen::Replay(replay);
        self
    }

    fn start_game(&mut self, mode: GameMode) {
        // Stop the running session before the new one starts
        self.screen = Screen::Records {
            list: Vec::new(),
            error: None,
        };
        let session = PlaySession::new(mode, self.config.board.size, Some(self.bot.clone()), &self.config.bot);
        info!(?mode, "new game");
        self.screen = Screen::Play(session);
    }

    fn open_records(&mut self) {
        let (list, error) = match &self.store {
            Some(store) => match store.list() {
                Ok(list) => (list, None),
                Err(err) => {
                    warn!(%err, "failed to list records");
                    (Vec::new(), Some(err.to_string()))
                }
            },
            None => (Vec::new(), Some("No record store available".to_string())),
        };
        self.screen = Screen::Records { list, error };
    }

    fn open_replay(&mut self, id: &str) {
        let Some(store) = &self.store else { return };
        let loaded = store
            .load(id)
            .map_err(|err| err.to_string())
            .and_then(|record| ReplayEngine::new(&record, self.config.board.size).map_err(|err| err.to_string()));

        match loaded {
            Ok(replay) => {
                info!(id, moves = replay.len(), "replay opened");
                self.screen = Screen::Replay(replay);
            }
            Err(err) => {
                warn!(id, %err, "replay unavailable");
                if let Screen::Records { error, .. } = &mut self.screen {
                    *error = Some(err);
                }
            }
        }
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::NewGame(mode) => self.start_game(mode),
            Action::OpenRecords => self.open_records(),
            Action::OpenReplay(id) => self.open_replay(&id),
            action => match &mut self.screen {
                Screen::Play(session) => match action {
                    Action::Reset => session.reset(),
                    Action::RetryBot => session.retry_bot(),
                    Action::Save => match self.store.as_mut() {
                        Some(store) => session.save(store),
                        None => session.message = Some("No record store available".to_string()),
                    },
                    _ => {}
                },
                Screen::Replay(replay) => match action {
                    Action::StepForward => {
                        replay.step_forward();
                    }
                    Action::StepBackward => {
                        replay.step_backward();
                    }
                    Action::Rewind => replay.rewind(),
                    Action::FastForward => replay.fast_forward(),
                    _ => {}
                },
                Screen::Records { .. } => {}
            },
        }
    }

    /// Render the top menu bar
    fn render_menu_bar(&self, ctx: &Context, actions: &mut Vec<Action>) {
        TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("Game", |ui| {
                    if ui.button("New Game (PvP)").clicked() {
                        actions.push(Action::NewGame(GameMode::PvP));
                        ui.close_menu();
                    }
                    if ui.button("New Game (vs Bot)").clicked() {
                        actions.push(Action::NewGame(GameMode::PvBot));
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Saved Matches").clicked() {
                        actions.push(Action::OpenRecords);
                        ui.close_menu();
                    }
                });

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let mode_text = match &self.screen {
                        Screen::Play(session) => match session.game.mode() {
                            GameMode::PvP => "PvP - Hotseat".to_string(),
                            GameMode::PvBot => "vs Bot - You: Black".to_string(),
                        },
                        Screen::Records { .. } => "Saved matches".to_string(),
                        Screen::Replay(replay) => format!("Replay - {}", replay.name()),
                    };
                    ui.label(mode_text);
                });
            });
        });
    }

    /// Render the side panel for the current screen
    fn render_side_panel(&mut self, ctx: &Context, actions: &mut Vec<Action>) {
        SidePanel::right("info_panel")
            .min_width(240.0)
            .max_width(280.0)
            .frame(Frame::new().fill(PANEL_BG))
            .show(ctx, |ui| {
                ui.add_space(12.0);
                Self::render_title_card(ui);
                ui.add_space(12.0);

                match &mut self.screen {
                    Screen::Play(session) => Self::render_play_cards(ui, session, actions),
                    Screen::Replay(replay) => Self::render_replay_card(ui, replay, actions),
                    Screen::Records { error, .. } => {
                        Self::card_frame().show(ui, |ui| {
                            ui.label(RichText::new("SAVED MATCHES").size(10.0).color(TEXT_MUTED));
                            ui.add_space(6.0);
                            ui.label(RichText::new("Pick a match to watch it again.").size(12.0).color(TEXT_SECONDARY));
                        });
                        if let Some(msg) = error {
                            ui.add_space(10.0);
                            Self::render_message_card(ui, msg);
                        }
                    }
                }
            });
    }

    /// Helper to create a card frame
    fn card_frame() -> Frame {
        Frame::new().fill(CARD_BG).corner_radius(CornerRadius::same(8)).inner_margin(12.0)
    }

    fn button(ui: &mut egui::Ui, text: &str, enabled: bool) -> bool {
        let color = if enabled { TEXT_PRIMARY } else { TEXT_MUTED };
        let mut clicked = false;
        Frame::new()
            .fill(BUTTON_BG)
            .corner_radius(CornerRadius::same(6))
            .inner_margin(8.0)
            .show(ui, |ui| {
                let label = egui::Label::new(RichText::new(text).size(12.0).color(color)).sense(egui::Sense::click());
                clicked = ui.add_enabled(enabled, label).clicked();
            });
        clicked
    }

    fn render_title_card(ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.add_space(8.0);
            ui.label(RichText::new("●○").size(20.0).color(TEXT_SECONDARY));
            ui.add_space(4.0);
            ui.label(RichText::new("GOMOKU").size(22.0).strong().color(TEXT_PRIMARY));
        });
    }

    fn render_play_cards(ui: &mut egui::Ui, session: &mut PlaySession, actions: &mut Vec<Action>) {
        Self::render_turn_card(ui, session);
        ui.add_space(10.0);

        Self::card_frame().show(ui, |ui| {
            ui.label(RichText::new("ACTIONS").size(10.0).color(TEXT_MUTED));
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if Self::button(ui, "New Game (N)", true) {
                    actions.push(Action::Reset);
                }
                if session.bot_failed() && Self::button(ui, "Retry Bot", true) {
                    actions.push(Action::RetryBot);
                }
            });
            ui.add_space(8.0);
            ui.label(
                RichText::new(format!("Move #{}", session.game.move_log().len()))
                    .size(11.0)
                    .color(TEXT_SECONDARY),
            );
        });

        match session.game.status() {
            GameStatus::Won(winner) => {
                ui.add_space(10.0);
                Self::render_result_card(ui, &format!("Player {} Wins!", winner.symbol()));
            }
            GameStatus::Draw => {
                ui.add_space(10.0);
                Self::render_result_card(ui, "Draw");
            }
            GameStatus::InProgress => {}
        }

        if session.can_save() {
            ui.add_space(10.0);
            Self::card_frame().show(ui, |ui| {
                ui.label(RichText::new("SAVE MATCH").size(10.0).color(TEXT_MUTED));
                ui.add_space(6.0);
                ui.text_edit_singleline(&mut session.save_name);
                ui.add_space(6.0);
                let ready = !session.save_name.trim().is_empty();
                if Self::button(ui, "Save", ready) {
                    actions.push(Action::Save);
                }
            });
        }

        if let Some(msg) = &session.message {
            ui.add_space(10.0);
            Self::render_message_card(ui, msg);
        }
    }

    fn render_turn_card(ui: &mut egui::Ui, session: &PlaySession) {
        Self::card_frame().show(ui, |ui| {
            let turn = session.game.current_turn();
            let (stone_char, accent, stone_color) = if turn == Stone::Black {
                ("●", BUTTON_BG, TEXT_PRIMARY)
            } else {
                ("○", TEXT_SECONDARY, CARD_BG)
            };

            ui.horizontal(|ui| {
                let (rect, _) = ui.allocate_exact_size(Vec2::new(48.0, 48.0), egui::Sense::hover());
                ui.painter().circle_filled(rect.center(), 22.0, accent);
                ui.painter().text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    stone_char,
                    egui::FontId::proportional(28.0),
                    stone_color,
                );

                ui.add_space(12.0);

                ui.vertical(|ui| {
                    ui.add_space(4.0);
                    ui.label(
                        RichText::new(format!("PLAYER {}", turn.symbol()))
                            .size(18.0)
                            .strong()
                            .color(TEXT_PRIMARY),
                    );

                    let status = if let Some(elapsed) = session.bot_thinking_elapsed() {
                        (format!("Bot thinking... {:.1}s", elapsed.as_secs_f32()), STATUS_WAIT)
                    } else if session.game.is_bot_turn() {
                        ("Bot to move".to_string(), STATUS_WAIT)
                    } else if session.game.is_over() {
                        ("Game Over".to_string(), WIN_HIGHLIGHT)
                    } else {
                        ("Your turn".to_string(), STATUS_OK)
                    };
                    ui.label(RichText::new(status.0).size(12.0).color(status.1));
                });
            });
        });
    }

    fn render_replay_card(ui: &mut egui::Ui, replay: &ReplayEngine, actions: &mut Vec<Action>) {
        Self::card_frame().show(ui, |ui| {
            ui.label(RichText::new("REPLAY").size(10.0).color(TEXT_MUTED));
            ui.add_space(6.0);
            ui.label(RichText::new(replay.name()).size(16.0).strong().color(TEXT_PRIMARY));
            ui.add_space(6.0);
            ui.label(RichText::new(replay.move_info()).size(12.0).color(TEXT_SECONDARY));
            ui.add_space(8.0);

            ui.horizontal(|ui| {
                if Self::button(ui, "|<", replay.can_step_backward()) {
                    actions.push(Action::Rewind);
                }
                if Self::button(ui, "< Prev", replay.can_step_backward()) {
                    actions.push(Action::StepBackward);
                }
                if Self::button(ui, "Next >", replay.can_step_forward()) {
                    actions.push(Action::StepForward);
                }
                if Self::button(ui, ">|", replay.can_step_forward()) {
                    actions.push(Action::FastForward);
                }
            });
        });

        if !replay.highlighted_win().is_empty() {
            ui.add_space(10.0);
            let winner = replay.current_move().map(|mv| mv.stone).unwrap_or(Stone::Empty);
            Self::render_result_card(ui, &format!("Player {} Wins!", winner.symbol()));
        }

        ui.add_space(10.0);
        if Self::button(ui, "Back to saved matches", true) {
            actions.push(Action::OpenRecords);
        }
    }

    fn render_result_card(ui: &mut egui::Ui, text: &str) {
        Frame::new()
            .fill(WIN_BG)
            .corner_radius(CornerRadius::same(8))
            .inner_margin(16.0)
            .show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label(RichText::new("GAME OVER").size(12.0).color(TEXT_SECONDARY));
                    ui.add_space(6.0);
                    ui.label(RichText::new(text).size(18.0).strong().color(WIN_HIGHLIGHT));
                });
            });
    }

    /// Render status message card
    fn render_message_card(ui: &mut egui::Ui, msg: &str) {
        Frame::new()
            .fill(NOTICE_BG)
            .corner_radius(CornerRadius::same(8))
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new("⚠").size(14.0));
                    ui.add_space(4.0);
                    ui.label(RichText::new(msg).size(11.0).color(TEXT_PRIMARY));
                });
            });
    }

    /// Render the board, or the match list on the records screen
    fn render_central(&mut self, ctx: &Context, actions: &mut Vec<Action>) {
        CentralPanel::default().show(ctx, |ui| match &mut self.screen {
            Screen::Play(session) => {
                let input_open = !session.game.is_over() && !session.game.is_bot_turn() && !session.is_bot_thinking();
                let overlay = Overlay {
                    last_move: session.game.last_move(),
                    win_cells: session.game.win_line().map(|line| line.cells()).unwrap_or(&[]),
                    turn: input_open.then(|| session.game.current_turn()),
                };
                if let Some(pos) = self.board_view.show(ui, session.game.board(), overlay) {
                    session.click(pos);
                }
            }
            Screen::Replay(replay) => {
                let overlay = Overlay {
                    last_move: replay.move_highlight(),
                    win_cells: replay.highlighted_win(),
                    turn: None,
                };
                self.board_view.show(ui, replay.board(), overlay);
            }
            Screen::Records { list, .. } => {
                ui.heading("Saved matches");
                ui.add_space(8.0);
                if list.is_empty() {
                    ui.label(RichText::new("No saved matches yet").color(TEXT_MUTED));
                }
                ScrollArea::vertical().show(ui, |ui| {
                    for summary in list.iter() {
                        ui.horizontal(|ui| {
                            if ui.button(summary.name.as_str()).clicked() {
                                actions.push(Action::OpenReplay(summary.id.clone()));
                            }
                            if let Some(saved) = summary.time_saved {
                                let stamp = saved.format("%Y-%m-%d %H:%M").to_string();
                                ui.label(RichText::new(stamp).size(11.0).color(TEXT_MUTED));
                            }
                        });
                    }
                });
            }
        });
    }

    /// Handle keyboard shortcuts
    fn handle_input(&self, ctx: &Context, actions: &mut Vec<Action>) {
        // Typing a match name must not trigger shortcuts
        if ctx.wants_keyboard_input() {
            return;
        }
        ctx.input(|i| match &self.screen {
            Screen::Play(_) => {
                // N - New game
                if i.key_pressed(egui::Key::N) {
                    actions.push(Action::Reset);
                }
            }
            Screen::Replay(_) => {
                if i.key_pressed(egui::Key::ArrowRight) {
                    actions.push(Action::StepForward);
                }
                if i.key_pressed(egui::Key::ArrowLeft) {
                    actions.push(Action::StepBackward);
                }
                if i.key_pressed(egui::Key::Home) {
                    actions.push(Action::Rewind);
                }
                if i.key_pressed(egui::Key::End) {
                    actions.push(Action::FastForward);
                }
            }
            Screen::Records { .. } => {}
        });
    }
}

impl eframe::App for GomokuApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut actions = Vec::new();
        self.handle_input(ctx, &mut actions);

        if let Screen::Play(session) = &mut self.screen {
            session.update_bot();
        }

        self.render_menu_bar(ctx, &mut actions);
        self.render_side_panel(ctx, &mut actions);
        self.render_central(ctx, &mut actions);

        for action in actions {
            self.apply(action);
        }

        // Keep polling while the bot is scheduled or thinking
        if let Screen::Play(session) = &self.screen {
            if session.bot_pending() {
                ctx.request_repaint();
            }
        }
    }
}
