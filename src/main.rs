use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use t20_terminal::api::ApiClient;
use t20_terminal::auth::{CredentialProvider, FileTokenStore, StaticToken};
use t20_terminal::feed;
use t20_terminal::model::{MatchStatus, RiskTier, Roster, ScoringMeta};
use t20_terminal::session::{PredictionSession, SessionMode};
use t20_terminal::state::{apply_delta, AppState, Delta, MatchView, ProviderCommand, Screen};
use t20_terminal::xf_picker::XfPicker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormRow {
    TossWinner,
    MatchWinner,
    TopWicketTaker,
    TopRunScorer,
    HighestRuns,
    PowerplayRuns,
    TotalWickets,
    XFactors,
    Submit,
}

const FORM_ROWS: [FormRow; 9] = [
    FormRow::TossWinner,
    FormRow::MatchWinner,
    FormRow::TopWicketTaker,
    FormRow::TopRunScorer,
    FormRow::HighestRuns,
    FormRow::PowerplayRuns,
    FormRow::TotalWickets,
    FormRow::XFactors,
    FormRow::Submit,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModalStep {
    Risk,
    Condition,
    Player,
    Confirm,
}

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: mpsc::Sender<ProviderCommand>,
    form_focus: usize,
    xf_selected: usize,
    picker: XfPicker,
    modal_step: ModalStep,
    modal_condition_sel: usize,
    modal_player_sel: usize,
    matches_refresh: Duration,
    last_matches_refresh: Instant,
}

impl App {
    fn new(cmd_tx: mpsc::Sender<ProviderCommand>) -> Self {
        let poll_secs = std::env::var("T20_POLL_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(60)
            .max(10);
        App {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
            form_focus: 0,
            xf_selected: 0,
            picker: XfPicker::default(),
            modal_step: ModalStep::Risk,
            modal_condition_sel: 0,
            modal_player_sel: 0,
            matches_refresh: Duration::from_secs(poll_secs),
            last_matches_refresh: Instant::now(),
        }
    }

    fn send(&mut self, cmd: ProviderCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Provider unavailable");
        }
    }

    fn request_matches(&mut self) {
        self.state.matches_loading = true;
        self.send(ProviderCommand::FetchMatches {
            view: MatchView::Upcoming,
        });
        self.send(ProviderCommand::FetchMatches {
            view: MatchView::Completed,
        });
        self.last_matches_refresh = Instant::now();
    }

    fn request_leaderboard(&mut self) {
        self.state.leaderboard_loading = true;
        self.send(ProviderCommand::FetchLeaderboard);
    }

    fn open_selected_match(&mut self) {
        let Some(match_id) = self.state.selected_match().map(|m| m.id) else {
            self.state.push_log("[INFO] No match selected");
            return;
        };
        self.state.open_match(match_id);
        self.form_focus = 0;
        self.xf_selected = 0;
        self.picker = XfPicker::default();
        self.send(ProviderCommand::FetchMatchDetail { match_id });
        self.send(ProviderCommand::FetchRoster { match_id });
        self.send(ProviderCommand::FetchMyPrediction { match_id });
        if !self.state.catalog_loaded {
            self.send(ProviderCommand::FetchCatalog);
        }
        if self.state.scoring_meta.is_none() {
            self.send(ProviderCommand::FetchScoringMeta);
        }
    }

    fn submit_prediction(&mut self) {
        let Some(session) = &mut self.state.session else {
            return;
        };
        if session.is_submitting() {
            return;
        }
        match session.build_payload() {
            Ok(payload) => {
                let match_id = session.match_id();
                let update = session.is_update();
                session.submit_started();
                self.send(ProviderCommand::Submit {
                    match_id,
                    payload,
                    update,
                });
            }
            Err(msg) => {
                session.message = Some(msg.to_string());
            }
        }
    }

    fn tick(&mut self) {
        if let Some(session) = &mut self.state.session {
            session.advisor.poll(Instant::now());
        }
        if matches!(self.state.screen, Screen::Pulse)
            && self.last_matches_refresh.elapsed() >= self.matches_refresh
        {
            self.request_matches();
        }
    }

    // ---- key handling --------------------------------------------------

    fn on_key(&mut self, key: KeyEvent) {
        if self.picker.is_open() {
            self.on_modal_key(key);
            return;
        }
        match self.state.screen {
            Screen::Pulse => self.on_pulse_key(key),
            Screen::Prediction => self.on_prediction_key(key),
            Screen::Leaderboard => self.on_leaderboard_key(key),
        }
    }

    fn on_pulse_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('u') => self.state.toggle_view(),
            KeyCode::Char('r') => self.request_matches(),
            KeyCode::Char('L') => {
                self.state.screen = Screen::Leaderboard;
                self.request_leaderboard();
            }
            KeyCode::Enter | KeyCode::Char('d') => self.open_selected_match(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn on_leaderboard_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('b') | KeyCode::Esc => self.state.screen = Screen::Pulse,
            KeyCode::Char('r') => self.request_leaderboard(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn on_prediction_key(&mut self, key: KeyEvent) {
        let mode = self
            .state
            .session
            .as_ref()
            .map(PredictionSession::mode)
            .unwrap_or(SessionMode::Loading);

        // Text-entry rows consume printable characters; everything else
        // falls through to the command keys below.
        if mode == SessionMode::Form && self.on_form_input(key) {
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('b') | KeyCode::Esc => self.state.close_match(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Char('e') if mode == SessionMode::Locked => {
                if let Some(session) = &mut self.state.session {
                    if session.request_edit() {
                        self.form_focus = 0;
                    }
                }
            }
            KeyCode::Char('j') | KeyCode::Down if mode == SessionMode::Form => {
                self.form_focus = (self.form_focus + 1) % FORM_ROWS.len();
            }
            KeyCode::Char('k') | KeyCode::Up if mode == SessionMode::Form => {
                self.form_focus = self
                    .form_focus
                    .checked_sub(1)
                    .unwrap_or(FORM_ROWS.len() - 1);
            }
            KeyCode::Char('x') if mode == SessionMode::Form => {
                if self.state.catalog.is_empty() {
                    self.state.push_log("[INFO] X-Factor catalog not loaded yet");
                } else {
                    self.picker.open();
                    self.modal_step = ModalStep::Risk;
                    self.modal_condition_sel = 0;
                    self.modal_player_sel = 0;
                    if let Some(session) = &mut self.state.session {
                        session.message = None;
                    }
                }
            }
            _ => {}
        }
    }

    /// Focus-dependent editing inside the form. Returns true when the key
    /// was consumed as input for the focused row.
    fn on_form_input(&mut self, key: KeyEvent) -> bool {
        let row = FORM_ROWS[self.form_focus];
        let manual_roster = self.state.roster.as_ref().is_none_or(Roster::is_empty);
        let Some(session) = &mut self.state.session else {
            return false;
        };
        let now = Instant::now();

        match row {
            FormRow::TossWinner | FormRow::MatchWinner => {
                let Some(m) = session.match_detail() else {
                    return false;
                };
                let [home, away] = [m.home_team.clone(), m.away_team.clone()];
                match key.code {
                    KeyCode::Left | KeyCode::Char('h') => {
                        if row == FormRow::TossWinner {
                            session.set_toss_winner(&home);
                        } else {
                            session.set_match_winner(&home);
                        }
                        true
                    }
                    KeyCode::Right | KeyCode::Char('l') => {
                        if row == FormRow::TossWinner {
                            session.set_toss_winner(&away);
                        } else {
                            session.set_match_winner(&away);
                        }
                        true
                    }
                    _ => false,
                }
            }
            FormRow::TopWicketTaker | FormRow::TopRunScorer => {
                let current = if row == FormRow::TopWicketTaker {
                    session.draft.top_wicket_taker.clone()
                } else {
                    session.draft.top_run_scorer.clone()
                };
                let next = if manual_roster {
                    match key.code {
                        KeyCode::Char(c) if !c.is_control() => Some(format!("{current}{c}")),
                        KeyCode::Backspace => {
                            let mut value = current;
                            value.pop();
                            Some(value)
                        }
                        _ => None,
                    }
                } else {
                    match key.code {
                        KeyCode::Left | KeyCode::Right => {
                            let players: Vec<String> = self
                                .state
                                .roster
                                .as_ref()
                                .map(|r| {
                                    r.all_players().iter().map(|p| p.to_string()).collect()
                                })
                                .unwrap_or_default();
                            cycle_player(&players, &current, key.code == KeyCode::Right)
                        }
                        KeyCode::Backspace => Some(String::new()),
                        _ => None,
                    }
                };
                let Some(next) = next else {
                    return false;
                };
                let session = self.state.session.as_mut().expect("session checked above");
                if row == FormRow::TopWicketTaker {
                    session.set_top_wicket_taker(&next);
                } else {
                    session.set_top_run_scorer(&next);
                }
                true
            }
            FormRow::HighestRuns | FormRow::PowerplayRuns | FormRow::TotalWickets => {
                let current = match row {
                    FormRow::HighestRuns => session.draft.highest_runs.clone(),
                    FormRow::PowerplayRuns => session.draft.powerplay_runs.clone(),
                    _ => session.draft.total_wickets.clone(),
                };
                let next = match key.code {
                    KeyCode::Char(c) if c.is_ascii_digit() => Some(format!("{current}{c}")),
                    KeyCode::Backspace => {
                        let mut value = current;
                        value.pop();
                        Some(value)
                    }
                    _ => None,
                };
                let Some(next) = next else {
                    return false;
                };
                match row {
                    FormRow::HighestRuns => session.set_highest_runs(&next, now),
                    FormRow::PowerplayRuns => session.set_powerplay_runs(&next),
                    _ => session.set_total_wickets(&next, now),
                };
                true
            }
            FormRow::XFactors => match key.code {
                KeyCode::Left => {
                    self.xf_selected = self.xf_selected.saturating_sub(1);
                    true
                }
                KeyCode::Right => {
                    let count = session.draft.x_factors.len();
                    if count > 0 && self.xf_selected + 1 < count {
                        self.xf_selected += 1;
                    }
                    true
                }
                KeyCode::Char('d') | KeyCode::Delete => {
                    if session.remove_x_factor(self.xf_selected) {
                        self.xf_selected = self
                            .xf_selected
                            .min(session.draft.x_factors.len().saturating_sub(1));
                    }
                    true
                }
                _ => false,
            },
            FormRow::Submit => match key.code {
                KeyCode::Enter => {
                    self.submit_prediction();
                    true
                }
                _ => false,
            },
        }
    }

    fn on_modal_key(&mut self, key: KeyEvent) {
        let manual_roster = self.state.roster.as_ref().is_none_or(Roster::is_empty);
        match key.code {
            KeyCode::Esc => {
                self.picker.close();
                return;
            }
            KeyCode::Tab => {
                self.modal_step = match self.modal_step {
                    ModalStep::Risk => ModalStep::Condition,
                    ModalStep::Condition => ModalStep::Player,
                    ModalStep::Player => ModalStep::Confirm,
                    ModalStep::Confirm => ModalStep::Risk,
                };
                return;
            }
            _ => {}
        }

        match self.modal_step {
            ModalStep::Risk => {
                let tier = match key.code {
                    KeyCode::Char('1') => Some(RiskTier::Low),
                    KeyCode::Char('2') => Some(RiskTier::Medium),
                    KeyCode::Char('3') => Some(RiskTier::High),
                    KeyCode::Left | KeyCode::Right => {
                        Some(cycle_tier(self.picker.risk(), key.code == KeyCode::Right))
                    }
                    _ => None,
                };
                if let Some(tier) = tier {
                    self.picker.set_risk(tier);
                    self.modal_condition_sel = 0;
                }
            }
            ModalStep::Condition => {
                let Some(risk) = self.picker.risk() else {
                    return;
                };
                let count = self.state.catalog.tier(risk).len();
                match key.code {
                    KeyCode::Down | KeyCode::Char('j') => {
                        if count > 0 {
                            self.modal_condition_sel = (self.modal_condition_sel + 1) % count;
                        }
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        if count > 0 {
                            self.modal_condition_sel = self
                                .modal_condition_sel
                                .checked_sub(1)
                                .unwrap_or(count - 1);
                        }
                    }
                    KeyCode::Enter => {
                        let id = self
                            .state
                            .catalog
                            .tier(risk)
                            .get(self.modal_condition_sel)
                            .map(|def| def.id.clone());
                        if let Some(id) = id {
                            self.picker.set_condition(&id, &self.state.catalog);
                            self.modal_step = ModalStep::Player;
                        }
                    }
                    _ => {}
                }
            }
            ModalStep::Player => {
                if !self.picker.player_step_ready() {
                    return;
                }
                if manual_roster {
                    match key.code {
                        KeyCode::Char(c) if !c.is_control() => {
                            let value = format!("{}{c}", self.picker.player());
                            self.picker.set_player(value);
                        }
                        KeyCode::Backspace => {
                            let mut value = self.picker.player().to_string();
                            value.pop();
                            self.picker.set_player(value);
                        }
                        KeyCode::Enter => self.modal_step = ModalStep::Confirm,
                        _ => {}
                    }
                    return;
                }
                let players: Vec<String> = self
                    .state
                    .roster
                    .as_ref()
                    .map(|r| r.all_players().iter().map(|p| p.to_string()).collect())
                    .unwrap_or_default();
                match key.code {
                    KeyCode::Down | KeyCode::Char('j') => {
                        if !players.is_empty() {
                            self.modal_player_sel = (self.modal_player_sel + 1) % players.len();
                        }
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        if !players.is_empty() {
                            self.modal_player_sel = self
                                .modal_player_sel
                                .checked_sub(1)
                                .unwrap_or(players.len() - 1);
                        }
                    }
                    KeyCode::Enter => {
                        if let Some(player) = players.get(self.modal_player_sel) {
                            self.picker.set_player(player.clone());
                            self.modal_step = ModalStep::Confirm;
                        }
                    }
                    _ => {}
                }
            }
            ModalStep::Confirm => {
                if key.code == KeyCode::Enter && self.picker.can_confirm() {
                    if let Some((xf_id, player)) = self.picker.confirm() {
                        if let Some(session) = &mut self.state.session {
                            if let Err(msg) =
                                session.add_x_factor(&xf_id, &player, &self.state.catalog)
                            {
                                session.message = Some(msg.to_string());
                            }
                        }
                    }
                }
            }
        }
    }
}

fn cycle_player(players: &[String], current: &str, forward: bool) -> Option<String> {
    if players.is_empty() {
        return None;
    }
    let pos = players.iter().position(|p| p == current);
    let next = match (pos, forward) {
        (None, _) => 0,
        (Some(idx), true) => (idx + 1) % players.len(),
        (Some(idx), false) => idx.checked_sub(1).unwrap_or(players.len() - 1),
    };
    players.get(next).cloned()
}

fn cycle_tier(current: Option<RiskTier>, forward: bool) -> RiskTier {
    let tiers = RiskTier::ALL;
    let pos = current.and_then(|tier| tiers.iter().position(|t| *t == tier));
    let next = match (pos, forward) {
        (None, _) => 0,
        (Some(idx), true) => (idx + 1) % tiers.len(),
        (Some(idx), false) => idx.checked_sub(1).unwrap_or(tiers.len() - 1),
    };
    tiers[next]
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let store = FileTokenStore;
    if std::env::args().nth(1).as_deref() == Some("logout") {
        match store.clear() {
            Ok(()) => println!("Logged out."),
            Err(err) => eprintln!("logout failed: {err}"),
        }
        return Ok(());
    }

    let mut startup_logs = vec!["[INFO] T20 terminal starting".to_string()];
    bootstrap_login(&store, &mut startup_logs);

    let api = ApiClient::from_env(Box::new(FileTokenStore));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    feed::spawn_provider(api, tx, cmd_rx);

    let mut app = App::new(cmd_tx);
    for line in startup_logs {
        app.state.push_log(line);
    }
    app.send(ProviderCommand::HealthCheck);
    app.request_matches();
    app.send(ProviderCommand::FetchCatalog);
    app.send(ProviderCommand::FetchScoringMeta);

    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

/// If no token is stored and env credentials are present, log in once and
/// persist the token. Failures degrade to unauthenticated mode; the API
/// will answer 401s that surface per-screen.
fn bootstrap_login(store: &FileTokenStore, logs: &mut Vec<String>) {
    if store.token().is_some() {
        return;
    }
    let (Ok(username), Ok(password)) =
        (std::env::var("T20_USERNAME"), std::env::var("T20_PASSWORD"))
    else {
        logs.push("[INFO] No stored token and no T20_USERNAME/T20_PASSWORD set".to_string());
        return;
    };
    let api = ApiClient::from_env(Box::new(StaticToken(None)));
    match api.login(&username, &password) {
        Ok(token) => match store.save(&token) {
            Ok(()) => logs.push(format!("[INFO] Logged in as {username}")),
            Err(err) => logs.push(format!("[WARN] Token save failed: {err}")),
        },
        Err(err) => logs.push(format!("[WARN] Login failed: {err}")),
    }
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        app.tick();

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

// ---- rendering ---------------------------------------------------------

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(4),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Pulse => render_pulse(frame, chunks[1], app),
        Screen::Prediction => render_prediction(frame, chunks[1], app),
        Screen::Leaderboard => render_leaderboard(frame, chunks[1], app),
    }

    render_console(frame, chunks[2], &app.state);

    let footer = Paragraph::new(footer_text(&app.state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if app.picker.is_open() {
        render_xf_modal(frame, frame.size(), app);
    }
    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    match state.screen {
        Screen::Pulse => format!("T20 PREDICTOR | Matches: {}", state.view.label()),
        Screen::Prediction => "T20 PREDICTOR | Prediction".to_string(),
        Screen::Leaderboard => "T20 PREDICTOR | Leaderboard".to_string(),
    }
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Pulse => {
            "Enter Open | j/k Move | u Upcoming/Completed | r Refresh | L Leaderboard | ? Help | q Quit"
                .to_string()
        }
        Screen::Prediction => {
            "j/k Row | \u{2190}/\u{2192} Value | x Add X-Factor | e Edit | b Back | q Quit"
                .to_string()
        }
        Screen::Leaderboard => "r Refresh | b Back | q Quit".to_string(),
    }
}

fn render_console(frame: &mut Frame, area: Rect, state: &AppState) {
    let lines: Vec<Line> = state
        .logs
        .iter()
        .rev()
        .take(area.height.saturating_sub(1) as usize)
        .rev()
        .map(|msg| Line::from(msg.as_str()))
        .collect();
    let console = Paragraph::new(lines)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::TOP).title("console"));
    frame.render_widget(console, area);
}

fn render_pulse(frame: &mut Frame, area: Rect, app: &App) {
    let matches = app.state.visible_matches();
    if matches.is_empty() {
        let msg = if app.state.matches_loading {
            "Loading matches\u{2026}"
        } else {
            "No matches"
        };
        frame.render_widget(
            Paragraph::new(msg).style(Style::default().fg(Color::DarkGray)),
            area,
        );
        return;
    }

    let mut lines = Vec::with_capacity(matches.len());
    for (idx, m) in matches.iter().enumerate() {
        let when = m.start_time.format("%b %d %H:%M");
        let text = format!(
            "{when}  {:<18} vs {:<18}  {}",
            m.home_team, m.away_team, m.venue
        );
        let style = if idx == app.state.selected {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(text, style)));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_leaderboard(frame: &mut Frame, area: Rect, app: &App) {
    if app.state.leaderboard.is_empty() {
        let msg = if app.state.leaderboard_loading {
            "Loading leaderboard\u{2026}"
        } else {
            "No scored predictions yet"
        };
        frame.render_widget(
            Paragraph::new(msg).style(Style::default().fg(Color::DarkGray)),
            area,
        );
        return;
    }
    let mut lines = vec![Line::from(Span::styled(
        format!("{:>4}  {:<20} {:>8} {:>8}", "#", "Player", "Points", "Played"),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    for entry in &app.state.leaderboard {
        lines.push(Line::from(format!(
            "{:>4}  {:<20} {:>8} {:>8}",
            entry.rank, entry.username, entry.total_points, entry.matches_played
        )));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_prediction(frame: &mut Frame, area: Rect, app: &App) {
    let Some(session) = &app.state.session else {
        frame.render_widget(Paragraph::new("No match selected"), area);
        return;
    };

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    render_banner(frame, sections[0], session);

    match session.mode() {
        SessionMode::Loading => {
            frame.render_widget(
                Paragraph::new("Loading\u{2026}").style(Style::default().fg(Color::DarkGray)),
                sections[1],
            );
        }
        SessionMode::Form => render_form(frame, sections[1], app, session),
        SessionMode::Locked => render_locked(frame, sections[1], session),
        SessionMode::Result => render_result(frame, sections[1], app, session),
    }
}

fn render_banner(frame: &mut Frame, area: Rect, session: &PredictionSession) {
    let lines = match session.match_detail() {
        Some(m) => {
            let status = match m.status {
                MatchStatus::Upcoming => "upcoming",
                MatchStatus::Completed => "completed",
            };
            vec![
                Line::from(Span::styled(
                    format!("{} vs {}", m.home_team, m.away_team),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(format!(
                    "{} | {} | {status}",
                    m.venue,
                    m.start_time.format("%Y-%m-%d %H:%M")
                )),
            ]
        }
        None => vec![Line::from("Loading match\u{2026}")],
    };
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::BOTTOM)),
        area,
    );
}

fn points_hint(meta: Option<&ScoringMeta>, row: FormRow) -> String {
    let Some(meta) = meta else {
        return String::new();
    };
    let points = match row {
        FormRow::TossWinner => meta.toss_winner.correct,
        FormRow::MatchWinner => meta.match_winner.correct,
        FormRow::TopWicketTaker => meta.top_wicket_taker.correct,
        FormRow::TopRunScorer => meta.top_run_scorer.correct,
        FormRow::HighestRuns => meta.highest_run_scored.correct,
        FormRow::PowerplayRuns => meta.powerplay_runs.correct,
        FormRow::TotalWickets => meta.total_wickets.correct,
        _ => return String::new(),
    };
    format!("  (+{points})")
}

fn form_row_label(row: FormRow) -> &'static str {
    match row {
        FormRow::TossWinner => "Toss winner",
        FormRow::MatchWinner => "Match winner",
        FormRow::TopWicketTaker => "Top wicket taker",
        FormRow::TopRunScorer => "Top run scorer",
        FormRow::HighestRuns => "Highest team total",
        FormRow::PowerplayRuns => "Highest powerplay total",
        FormRow::TotalWickets => "Total wickets in match",
        FormRow::XFactors => "X-Factors",
        FormRow::Submit => "Submit",
    }
}

fn render_form(frame: &mut Frame, area: Rect, app: &App, session: &PredictionSession) {
    let draft = &session.draft;
    let meta = app.state.scoring_meta.as_ref();
    let mut lines = Vec::new();

    if session.prior_unverified() {
        lines.push(Line::from(Span::styled(
            "Could not verify your earlier prediction \u{2014} submitting may update or create",
            Style::default().fg(Color::Yellow),
        )));
    }

    for (idx, row) in FORM_ROWS.iter().enumerate() {
        let focused = idx == app.form_focus;
        let marker = if focused { "> " } else { "  " };
        let style = if focused {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        match row {
            FormRow::XFactors => {
                lines.push(Line::from(Span::styled(
                    format!("{marker}{} ({}):", form_row_label(*row), draft.x_factors.len()),
                    style,
                )));
                for (pick_idx, pick) in draft.x_factors.iter().enumerate() {
                    let def = app.state.catalog.get(&pick.xf_id);
                    let desc = def.map(|d| d.description.as_str()).unwrap_or("Condition");
                    let risk = def.map(|d| d.risk.label()).unwrap_or("?");
                    let selected = focused && pick_idx == app.xf_selected;
                    let pick_style = if selected {
                        Style::default().fg(Color::Black).bg(Color::Cyan)
                    } else {
                        Style::default().fg(Color::Gray)
                    };
                    lines.push(Line::from(Span::styled(
                        format!("    {} \u{2014} {desc} [{risk}]", pick.player_name),
                        pick_style,
                    )));
                }
                if focused {
                    lines.push(Line::from(Span::styled(
                        "    x add | \u{2190}/\u{2192} select | d remove",
                        Style::default().fg(Color::DarkGray),
                    )));
                }
            }
            FormRow::Submit => {
                let label = if session.is_submitting() {
                    "Submitting\u{2026}"
                } else if session.is_update() {
                    "[ UPDATE PREDICTION ]"
                } else {
                    "[ SUBMIT PREDICTION ]"
                };
                lines.push(Line::from(Span::styled(
                    format!("{marker}{label}"),
                    style.fg(Color::Cyan),
                )));
            }
            _ => {
                let value = match row {
                    FormRow::TossWinner => draft.toss_winner.clone().unwrap_or_default(),
                    FormRow::MatchWinner => draft.match_winner.clone().unwrap_or_default(),
                    FormRow::TopWicketTaker => draft.top_wicket_taker.clone(),
                    FormRow::TopRunScorer => draft.top_run_scorer.clone(),
                    FormRow::HighestRuns => draft.highest_runs.clone(),
                    FormRow::PowerplayRuns => draft.powerplay_runs.clone(),
                    FormRow::TotalWickets => draft.total_wickets.clone(),
                    _ => String::new(),
                };
                let shown = if value.is_empty() {
                    "\u{2014}"
                } else {
                    value.as_str()
                };
                lines.push(Line::from(Span::styled(
                    format!(
                        "{marker}{:<24} {shown}{}",
                        form_row_label(*row),
                        points_hint(meta, *row)
                    ),
                    style,
                )));
            }
        }
    }

    if let Some(hint) = &app.state.roster_hint {
        lines.push(Line::from(Span::styled(
            format!("{hint} \u{2014} type player names manually"),
            Style::default().fg(Color::DarkGray),
        )));
    }
    if let Some(warning) = session.advisor.advisory() {
        lines.push(Line::from(Span::styled(
            format!("\u{26a0} {warning}"),
            Style::default().fg(Color::Yellow),
        )));
    }
    if let Some(message) = &session.message {
        let color = if message.contains("submitted") {
            Color::Green
        } else {
            Color::Red
        };
        lines.push(Line::from(Span::styled(
            message.clone(),
            Style::default().fg(color),
        )));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_locked(frame: &mut Frame, area: Rect, session: &PredictionSession) {
    let Some(stored) = session.stored() else {
        frame.render_widget(Paragraph::new("No prediction"), area);
        return;
    };
    let mut lines = vec![Line::from(Span::styled(
        "You have already submitted a prediction for this match.",
        Style::default().fg(Color::Green),
    ))];
    let rows = [
        ("Toss winner", stored.toss_winner.clone()),
        ("Match winner", stored.match_winner.clone()),
        (
            "Top wicket taker",
            stored.top_wicket_taker.clone().unwrap_or_default(),
        ),
        (
            "Top run scorer",
            stored.top_run_scorer.clone().unwrap_or_default(),
        ),
        (
            "Highest team total",
            stored
                .highest_run_scored
                .map(|n| n.to_string())
                .unwrap_or_default(),
        ),
        (
            "Powerplay runs",
            stored
                .powerplay_runs
                .map(|n| n.to_string())
                .unwrap_or_default(),
        ),
        (
            "Total wickets",
            stored
                .total_wickets
                .map(|n| n.to_string())
                .unwrap_or_default(),
        ),
    ];
    for (label, value) in rows {
        let shown = if value.is_empty() {
            "\u{2014}".to_string()
        } else {
            value
        };
        lines.push(Line::from(format!("  {label:<24} {shown}")));
    }
    if !stored.x_factors.is_empty() {
        lines.push(Line::from("  X-Factors:"));
        for pick in &stored.x_factors {
            lines.push(Line::from(format!(
                "    {} \u{2014} {}",
                pick.player_name, pick.xf_id
            )));
        }
    }
    lines.push(Line::from(Span::styled(
        "Press e to edit",
        Style::default().fg(Color::Cyan),
    )));
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_result(frame: &mut Frame, area: Rect, app: &App, session: &PredictionSession) {
    let stored = session.stored();
    let m = session.match_detail();
    let mut lines = Vec::new();

    match stored {
        None => lines.push(Line::from(Span::styled(
            "You did not make a prediction for this match.",
            Style::default().fg(Color::Yellow),
        ))),
        Some(stored) => {
            lines.push(Line::from(Span::styled(
                "You have already submitted a prediction for this match.",
                Style::default().fg(Color::Green),
            )));
            if let Some(points) = stored.points_earned {
                lines.push(Line::from(Span::styled(
                    format!("Total points: {points}"),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )));
            }
        }
    }

    let dash = || "\u{2014}".to_string();
    let you = |value: Option<String>| value.filter(|v| !v.is_empty()).unwrap_or_else(dash);
    let rows = [
        (
            "Toss winner",
            you(stored.map(|s| s.toss_winner.clone())),
            you(m.and_then(|m| m.actual_toss_winner.clone())),
        ),
        (
            "Match winner",
            you(stored.map(|s| s.match_winner.clone())),
            you(m.and_then(|m| m.actual_match_winner.clone())),
        ),
        (
            "Top wicket taker",
            you(stored.and_then(|s| s.top_wicket_taker.clone())),
            m.map(|m| m.actual_top_wicket_takers().join(", "))
                .filter(|v| !v.is_empty())
                .unwrap_or_else(dash),
        ),
        (
            "Top run scorer",
            you(stored.and_then(|s| s.top_run_scorer.clone())),
            you(m.and_then(|m| m.actual_top_run_scorer.clone())),
        ),
        (
            "Highest team total",
            you(stored.and_then(|s| s.highest_run_scored.map(|n| n.to_string()))),
            you(m.and_then(|m| m.actual_highest_run_scored.map(|n| n.to_string()))),
        ),
        (
            "Powerplay runs",
            you(stored.and_then(|s| s.powerplay_runs.map(|n| n.to_string()))),
            you(m.and_then(|m| m.actual_powerplay_runs.map(|n| n.to_string()))),
        ),
        (
            "Total wickets",
            you(stored.and_then(|s| s.total_wickets.map(|n| n.to_string()))),
            you(m.and_then(|m| m.actual_total_wickets.map(|n| n.to_string()))),
        ),
    ];
    for (label, predicted, actual) in rows {
        lines.push(Line::from(format!(
            "  {label:<24} You: {predicted:<20} Result: {actual}"
        )));
    }

    if let Some(stored) = stored {
        if !stored.x_factors.is_empty() {
            lines.push(Line::from("  X-Factors:"));
            for pick in &stored.x_factors {
                let desc = app
                    .state
                    .catalog
                    .get(&pick.xf_id)
                    .map(|d| d.description.clone())
                    .unwrap_or_else(|| pick.xf_id.clone());
                let verdict = match pick.correct {
                    Some(true) => Span::styled("\u{2713}", Style::default().fg(Color::Green)),
                    Some(false) => Span::styled("\u{2717}", Style::default().fg(Color::Red)),
                    None => Span::styled("\u{2026}", Style::default().fg(Color::DarkGray)),
                };
                lines.push(Line::from(vec![
                    Span::raw(format!("    {} \u{2014} {desc} ", pick.player_name)),
                    verdict,
                ]));
            }
        }
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_xf_modal(frame: &mut Frame, area: Rect, app: &App) {
    let modal = centered_rect(70, 70, area);
    frame.render_widget(Clear, modal);

    let mut lines = vec![Line::from(Span::styled(
        "X-Factor Prediction",
        Style::default().add_modifier(Modifier::BOLD),
    ))];

    let step_style = |step: ModalStep| {
        if app.modal_step == step {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        }
    };

    // 1. Risk
    let mut risk_spans = vec![Span::styled("1. Risk  ", step_style(ModalStep::Risk))];
    for tier in RiskTier::ALL {
        let chosen = app.picker.risk() == Some(tier);
        let points = app
            .state
            .scoring_meta
            .as_ref()
            .map(|meta| {
                let p = meta.x_factor.tier(tier);
                format!(" (+{}/{})", p.correct, p.wrong)
            })
            .unwrap_or_default();
        let style = if chosen {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default()
        };
        risk_spans.push(Span::styled(format!(" {}{points} ", tier.label()), style));
    }
    lines.push(Line::from(risk_spans));

    // 2. Condition
    lines.push(Line::from(Span::styled(
        "2. Condition",
        step_style(ModalStep::Condition),
    )));
    match app.picker.risk() {
        None => lines.push(Line::from(Span::styled(
            "   Select risk first.",
            Style::default().fg(Color::DarkGray),
        ))),
        Some(risk) => {
            for (idx, def) in app.state.catalog.tier(risk).iter().enumerate() {
                let chosen = app.picker.condition() == Some(def.id.as_str());
                let cursor = app.modal_step == ModalStep::Condition && idx == app.modal_condition_sel;
                let style = if chosen || cursor {
                    Style::default().fg(Color::Black).bg(Color::Cyan)
                } else {
                    Style::default()
                };
                lines.push(Line::from(Span::styled(
                    format!("   {} ({})", def.description, def.category),
                    style,
                )));
            }
        }
    }

    // 3. Player
    lines.push(Line::from(Span::styled(
        "3. Player",
        step_style(ModalStep::Player),
    )));
    if !app.picker.player_step_ready() {
        lines.push(Line::from(Span::styled(
            "   Select condition to choose player.",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        let manual = app.state.roster.as_ref().is_none_or(Roster::is_empty);
        if manual {
            lines.push(Line::from(format!("   Type name: {}_", app.picker.player())));
        } else if let Some(roster) = &app.state.roster {
            match roster {
                Roster::Sectioned(sections) => {
                    let mut flat_idx = 0usize;
                    for section in sections {
                        lines.push(Line::from(Span::styled(
                            format!("   {}", section.title),
                            Style::default().fg(Color::DarkGray),
                        )));
                        for player in &section.players {
                            lines.push(player_line(app, player, flat_idx));
                            flat_idx += 1;
                        }
                    }
                }
                Roster::Flat(players) => {
                    for (idx, player) in players.iter().enumerate() {
                        lines.push(player_line(app, player, idx));
                    }
                }
            }
        }
    }

    let confirm = if app.picker.can_confirm() {
        Span::styled(
            "[ Add ]",
            step_style(ModalStep::Confirm).fg(Color::Green),
        )
    } else {
        Span::styled("[ Add ] (pick risk, condition, player)", Style::default().fg(Color::DarkGray))
    };
    lines.push(Line::from(vec![confirm, Span::raw("   Esc Cancel | Tab Next step")]));

    let body = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    frame.render_widget(body, modal);
}

fn player_line(app: &App, player: &str, flat_idx: usize) -> Line<'static> {
    let chosen = app.picker.player() == player;
    let cursor = app.modal_step == ModalStep::Player && flat_idx == app.modal_player_sel;
    let style = if chosen || cursor {
        Style::default().fg(Color::Black).bg(Color::Cyan)
    } else {
        Style::default()
    };
    Line::from(Span::styled(format!("     {player}"), style))
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let modal = centered_rect(60, 50, area);
    frame.render_widget(Clear, modal);
    let lines = vec![
        Line::from(Span::styled("Keys", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("Enter      open match / choose / submit"),
        Line::from("j/k \u{2191}/\u{2193}  move"),
        Line::from("\u{2190}/\u{2192}       cycle value on focused row"),
        Line::from("u          toggle upcoming/completed"),
        Line::from("x          add X-Factor (form)"),
        Line::from("d          remove selected X-Factor"),
        Line::from("e          edit locked prediction"),
        Line::from("L          leaderboard"),
        Line::from("r          refresh"),
        Line::from("b/Esc      back"),
        Line::from("q          quit"),
    ];
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("help")),
        modal,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}
