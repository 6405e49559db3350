use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph};

use matchedge::context::{Location, SpreadSide};
use matchedge::predict::{self, AnalysisCommand, AnalysisDelta};
use matchedge::state::{AppState, InputField, Screen, apply_delta};
use matchedge::store::MatchCategory;
use matchedge::{export, persist};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: mpsc::Sender<AnalysisCommand>,
    export_path: PathBuf,
}

impl App {
    fn new(cmd_tx: mpsc::Sender<AnalysisCommand>) -> Self {
        let export_path = std::env::var("MATCHEDGE_EXPORT_PATH")
            .unwrap_or_else(|_| "matchedge_report.xlsx".to_string());

        let mut state = AppState::new();
        if let Some((store, context)) = persist::load_session() {
            state.store = store;
            state.context = context;
            state.sync_inputs_from_context();
            state.push_log(format!(
                "[INFO] Restored {} matches from the previous session",
                state.store.total_matches()
            ));
        }

        Self {
            state,
            should_quit: false,
            cmd_tx,
            export_path: PathBuf::from(export_path),
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        // The thin-data confirmation intercepts everything until answered.
        if self.state.pending_confirmation {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.state.pending_confirmation = false;
                    self.send_analysis();
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.state.pending_confirmation = false;
                    self.state.push_log("[INFO] Analysis cancelled");
                }
                _ => {}
            }
            return;
        }

        if self.state.help_overlay {
            match key.code {
                KeyCode::F(1) | KeyCode::Esc => self.state.help_overlay = false,
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::F(1) => self.state.help_overlay = true,
            KeyCode::F(2) => self.state.toggle_catboost(),
            KeyCode::F(3) => self.state.toggle_xgboost(),
            KeyCode::F(4) => self.state.toggle_lightgbm(),
            KeyCode::F(5) => self.request_analysis(),
            KeyCode::F(6) => self.export_report(),
            KeyCode::F(8) => {
                self.state.clear_all();
                persist::clear_session();
            }
            KeyCode::Esc => match self.state.screen {
                Screen::Results => self.state.screen = Screen::Entry,
                Screen::Entry => self.should_quit = true,
            },
            KeyCode::Tab | KeyCode::Down => self.state.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.state.focus_prev(),
            KeyCode::Left | KeyCode::Right => {
                self.state.cycle_focused_option();
                self.state.apply_context_inputs();
            }
            KeyCode::Enter => {
                if self.state.commit_focused_scores() {
                    persist::save_session(&self.state.store, &self.state.context);
                }
            }
            KeyCode::Backspace => {
                if let Some(buffer) = self.state.focused_buffer_mut() {
                    buffer.pop();
                    self.state.apply_context_inputs();
                }
            }
            KeyCode::Char(c) => {
                if let Some(buffer) = self.state.focused_buffer_mut() {
                    buffer.push(c);
                    self.state.apply_context_inputs();
                }
            }
            _ => {}
        }
    }

    fn request_analysis(&mut self) {
        if self.state.analysis_busy {
            self.state
                .push_log("[WARN] Analysis already running; request ignored");
            return;
        }
        self.state.apply_context_inputs();

        let snapshot = self.state.snapshot();
        if let Err(err) = predict::validate_snapshot(&snapshot) {
            self.state.push_log(format!("[ERROR] {err}"));
            return;
        }
        if predict::needs_confirmation(&snapshot.store) {
            self.state.pending_confirmation = true;
            self.state.push_log(format!(
                "[WARN] Only {} matches entered; accuracy may suffer. Continue? (y/n)",
                snapshot.store.total_matches()
            ));
            return;
        }
        self.send_analysis();
    }

    fn send_analysis(&mut self) {
        let snapshot = self.state.snapshot();
        if self.cmd_tx.send(AnalysisCommand::Run(snapshot)).is_err() {
            self.state.push_log("[ERROR] Analysis worker unavailable");
            return;
        }
        self.state.analysis_busy = true;
        self.state.push_log("[INFO] Analysis started");
    }

    fn export_report(&mut self) {
        let Some(outcome) = self.state.last_outcome.clone() else {
            self.state.push_log("[WARN] Run an analysis before exporting");
            return;
        };
        let snapshot = self.state.snapshot();
        match export::export_outcome(&self.export_path, &snapshot, &outcome) {
            Ok(report) => self.state.push_log(format!(
                "[INFO] Exported {} matches to {}",
                report.matches,
                self.export_path.display()
            )),
            Err(err) => self.state.push_log(format!("[ERROR] Export failed: {err}")),
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (delta_tx, delta_rx) = mpsc::channel();
    predict::spawn_analysis_worker(cmd_rx, delta_tx);

    let mut app = App::new(cmd_tx);
    let res = run_app(&mut terminal, &mut app, delta_rx);

    persist::save_session(&app.state.store, &app.state.context);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    delta_rx: mpsc::Receiver<AnalysisDelta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = delta_rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

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

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header =
        Paragraph::new(header_text(&app.state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Entry => render_entry(frame, chunks[1], &app.state),
        Screen::Results => render_results(frame, chunks[1], &app.state),
    }

    let footer =
        Paragraph::new(footer_text(&app.state)).block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    if app.state.pending_confirmation {
        render_confirmation_overlay(frame, frame.size(), &app.state);
    }
    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let busy = if state.analysis_busy { " | ANALYZING..." } else { "" };
    let title = match state.screen {
        Screen::Entry => format!(
            "MATCHEDGE | {} vs {} | {} matches{busy}",
            state.context.team1_name,
            state.context.team2_name,
            state.store.total_matches()
        ),
        Screen::Results => format!(
            "MATCHEDGE RESULTS | {} vs {}{busy}",
            state.context.team1_name, state.context.team2_name
        ),
    };
    let line1 = format!("  /\\  {}", title);
    let line2 = " /--\\".to_string();
    let line3 = format!("  ||   {}", state.data_quality_line());
    format!("{line1}\n{line2}\n{line3}")
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Entry => {
            "Tab/↑/↓ Field | ←/→ Option | Enter Add scores | F5 Analyze | F6 Export | F2-F4 Models | F8 Clear | F1 Help | Esc Quit"
                .to_string()
        }
        Screen::Results => {
            "Esc Back | F5 Re-analyze | F6 Export | F1 Help".to_string()
        }
    }
}

fn render_entry(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(40),
            Constraint::Min(40),
            Constraint::Length(36),
        ])
        .split(area);

    let context_form = Paragraph::new(context_form_text(state))
        .block(Block::default().title("Match Setup").borders(Borders::ALL));
    frame.render_widget(context_form, columns[0]);

    render_score_entry(frame, columns[1], state);
    render_side_panel(frame, columns[2], state);
}

fn field_line(label: &str, value: &str, focused: bool) -> String {
    let marker = if focused { "> " } else { "  " };
    let cursor = if focused { "_" } else { "" };
    format!("{marker}{label}: {value}{cursor}")
}

fn context_form_text(state: &AppState) -> String {
    let ctx = &state.context;
    let inputs = &state.inputs;
    let location_label = match ctx.location {
        Location::Home => format!("Home ({})", ctx.team1_name),
        Location::Away => format!("Away ({})", ctx.team1_name),
        Location::Neutral => "Neutral".to_string(),
    };
    let spread_label = match ctx.spread_direction {
        SpreadSide::Team1 => ctx.team1_name.clone(),
        SpreadSide::Team2 => ctx.team2_name.clone(),
    };

    [
        field_line(
            "Team 1 name",
            &inputs.team1_name,
            state.focus == InputField::Team1Name,
        ),
        field_line(
            "Team 2 name",
            &inputs.team2_name,
            state.focus == InputField::Team2Name,
        ),
        field_line(
            "Team 1 ranking",
            &inputs.team1_ranking,
            state.focus == InputField::Team1Ranking,
        ),
        field_line(
            "Team 2 ranking",
            &inputs.team2_ranking,
            state.focus == InputField::Team2Ranking,
        ),
        field_line(
            "Importance (1 = neutral)",
            &inputs.importance,
            state.focus == InputField::Importance,
        ),
        field_line(
            "Venue",
            &location_label,
            state.focus == InputField::Location,
        ),
        field_line(
            "Total line",
            &inputs.total_line,
            state.focus == InputField::TotalLine,
        ),
        field_line(
            "Point spread",
            &inputs.point_spread,
            state.focus == InputField::PointSpread,
        ),
        field_line(
            "Spread favors",
            &spread_label,
            state.focus == InputField::SpreadDirection,
        ),
    ]
    .join("\n")
}

fn render_score_entry(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Min(1),
        ])
        .split(area);

    let ctx = &state.context;
    let h2h = Paragraph::new(
        [
            field_line(
                &format!("{} scores", ctx.team1_name),
                &state.inputs.h2h_team1,
                state.focus == InputField::H2hTeam1,
            ),
            field_line(
                &format!("{} scores", ctx.team2_name),
                &state.inputs.h2h_team2,
                state.focus == InputField::H2hTeam2,
            ),
            summary_line(state, MatchCategory::H2h),
        ]
        .join("\n"),
    )
    .block(
        Block::default()
            .title("Head-to-Head (comma separated)")
            .borders(Borders::ALL),
    );
    frame.render_widget(h2h, sections[0]);

    let team1 = Paragraph::new(
        [
            field_line(
                &format!("{} scores", ctx.team1_name),
                &state.inputs.team1_scores,
                state.focus == InputField::Team1Scores,
            ),
            field_line(
                "Opponent scores",
                &state.inputs.team1_opponent,
                state.focus == InputField::Team1Opponent,
            ),
            summary_line(state, MatchCategory::Team1),
        ]
        .join("\n"),
    )
    .block(
        Block::default()
            .title(format!("{} Recent Matches", ctx.team1_name))
            .borders(Borders::ALL),
    );
    frame.render_widget(team1, sections[1]);

    let team2 = Paragraph::new(
        [
            field_line(
                &format!("{} scores", ctx.team2_name),
                &state.inputs.team2_scores,
                state.focus == InputField::Team2Scores,
            ),
            field_line(
                "Opponent scores",
                &state.inputs.team2_opponent,
                state.focus == InputField::Team2Opponent,
            ),
            summary_line(state, MatchCategory::Team2),
        ]
        .join("\n"),
    )
    .block(
        Block::default()
            .title(format!("{} Recent Matches", ctx.team2_name))
            .borders(Borders::ALL),
    );
    frame.render_widget(team2, sections[2]);

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, sections[3]);
}

fn summary_line(state: &AppState, category: MatchCategory) -> String {
    let records = state.store.records(category);
    if records.is_empty() {
        return "  (no matches added)".to_string();
    }
    let line = records
        .iter()
        .take(8)
        .map(|m| format!("{}-{}", m.team1_score, m.team2_score))
        .collect::<Vec<_>>()
        .join("  ");
    format!("  {} matches: {}", records.len(), line)
}

fn render_side_panel(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(1)])
        .split(area);

    let caps = &state.capabilities;
    let model_lines = [
        format!("[F2] CatBoost   {}", on_off(caps.catboost)),
        format!("[F3] XGBoost    {}", on_off(caps.xgboost)),
        format!("[F4] LightGBM   {}", on_off(caps.lightgbm)),
        "     Statistical always on".to_string(),
    ]
    .join("\n");
    let models = Paragraph::new(model_lines)
        .block(Block::default().title("Models").borders(Borders::ALL));
    frame.render_widget(models, sections[0]);

    let counts = [
        format!("H2H:    {} matches", state.store.h2h.len()),
        format!(
            "{}: {} matches",
            state.context.team1_name,
            state.store.team1.len()
        ),
        format!(
            "{}: {} matches",
            state.context.team2_name,
            state.store.team2.len()
        ),
        String::new(),
        state.data_quality_line(),
    ]
    .join("\n");
    let data = Paragraph::new(counts)
        .block(Block::default().title("Data").borders(Borders::ALL));
    frame.render_widget(data, sections[1]);
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "ON" } else { "OFF" }
}

fn render_results(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(outcome) = &state.last_outcome else {
        let empty = Paragraph::new("No analysis yet. Press F5 on the entry screen.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(34),
            Constraint::Length(40),
            Constraint::Length(32),
        ])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(1)])
        .split(columns[0]);

    let probs = &outcome.result.probs;
    let winner_text = [
        format!("{}: {:>5.1}%", state.context.team1_name, probs.team1),
        format!("Draw: {:>5.1}%", probs.draw),
        format!("{}: {:>5.1}%", state.context.team2_name, probs.team2),
    ]
    .join("\n");
    let winner = Paragraph::new(winner_text).block(
        Block::default()
            .title("Win Probability")
            .borders(Borders::ALL),
    );
    frame.render_widget(winner, left[0]);

    let bar_area = Block::default().title("Split").borders(Borders::ALL);
    let inner = bar_area.inner(left[1]);
    frame.render_widget(bar_area, left[1]);
    frame.render_widget(probability_bar(probs), inner);

    let score_text = [
        format!(
            "Projected: {} {} - {} {}",
            state.context.team1_name,
            outcome.team1_projected,
            outcome.team2_projected,
            state.context.team2_name
        ),
        format!("Total: {:.2}", outcome.result.projected_total),
        format!("Margin: {:+.2}", outcome.result.projected_margin),
        String::new(),
        format!("O/U edge: {:+.1}%", outcome.over_under_edge),
        format!("O/U call: {}", outcome.total_recommendation),
        format!("Spread edge: {:+.1}%", outcome.spread_edge),
        format!("Spread call: {}", outcome.spread_recommendation),
        over_line_text(state),
    ]
    .join("\n");
    let score = Paragraph::new(score_text).block(
        Block::default()
            .title("Score & Betting")
            .borders(Borders::ALL),
    );
    frame.render_widget(score, columns[1]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(1)])
        .split(columns[2]);

    let weights = &outcome.result.weights;
    let weight_text = [
        format!("CatBoost:    {:>3.0}", weights.catboost),
        format!("XGBoost:     {:>3.0}", weights.xgboost),
        format!("LightGBM:    {:>3.0}", weights.lightgbm),
        format!("Statistical: {:>3.0}", weights.statistical),
    ]
    .join("\n");
    let weight_panel = Paragraph::new(weight_text).block(
        Block::default()
            .title("Model Weights")
            .borders(Borders::ALL),
    );
    frame.render_widget(weight_panel, right[0]);

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, right[1]);
}

fn over_line_text(state: &AppState) -> String {
    match state.store.over_line_percentage(state.context.total_line) {
        Some(pct) => format!("History over the line: {pct}%"),
        None => String::new(),
    }
}

fn probability_bar(probs: &matchedge::statistical::WinProbs) -> BarChart<'static> {
    let team1 = Bar::default()
        .value(probs.team1.round() as u64)
        .text_value(String::new())
        .style(Style::default().fg(Color::Green));
    let draw = Bar::default()
        .value(probs.draw.round() as u64)
        .text_value(String::new())
        .style(Style::default().fg(Color::Yellow));
    let team2 = Bar::default()
        .value(probs.team2.round() as u64)
        .text_value(String::new())
        .style(Style::default().fg(Color::Red));

    BarChart::default()
        .data(BarGroup::default().bars(&[team1, draw, team2]))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .group_gap(0)
        .max(100)
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(6)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_confirmation_overlay(frame: &mut Frame, area: Rect, state: &AppState) {
    let popup_area = centered_rect(50, 20, area);
    frame.render_widget(Clear, popup_area);

    let text = format!(
        "Only {} matches entered.\nThe analysis may not be accurate.\n\nContinue anyway? (y/n)",
        state.store.total_matches()
    );
    let popup = Paragraph::new(text)
        .block(Block::default().title("Thin Data").borders(Borders::ALL))
        .style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(popup, popup_area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "matchedge - Help",
        "",
        "Entry:",
        "  Tab / Shift-Tab   Next/previous field",
        "  ↑ / ↓             Move between fields",
        "  ← / →             Cycle venue / spread side",
        "  Enter             Add the focused score list pair",
        "  F5                Run the analysis",
        "  F6                Export report to .xlsx",
        "  F2 / F3 / F4      Toggle CatBoost / XGBoost / LightGBM",
        "  F8                Clear all match data",
        "",
        "Results:",
        "  Esc               Back to entry",
        "",
        "  Esc on entry quits; the session is saved automatically.",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
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
