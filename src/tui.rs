use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::stdout;

use jobtrack::filter::ScoredJob;
use jobtrack::models::{ApplicationStatus, Job};
use jobtrack::scoring::MatchTier;
use jobtrack::session::{Intent, Route, Session};
use jobtrack::Tracker;

struct Row<'a> {
    scored: ScoredJob<'a>,
    status: ApplicationStatus,
    saved: bool,
}

struct AppState<'a> {
    tracker: &'a Tracker,
    session: Session,
    rows: Vec<Row<'a>>,
    selected: usize,
    scroll_offset: u16,
    notice: Option<String>,
}

impl<'a> AppState<'a> {
    fn new(tracker: &'a Tracker, session: Session) -> Result<Self> {
        let mut state = Self {
            tracker,
            session,
            rows: Vec::new(),
            selected: 0,
            scroll_offset: 0,
            notice: None,
        };
        state.refresh()?;
        Ok(state)
    }

    /// Re-runs the filter pipeline, keeping the same job selected when it
    /// is still listed.
    fn refresh(&mut self) -> Result<()> {
        let current = self.current_job().map(|job| job.id);
        let tracker = self.tracker;
        self.rows = tracker
            .apply_filters(&self.session.filters)?
            .into_iter()
            .map(|scored| -> Result<Row<'a>> {
                let id = scored.job.id;
                Ok(Row {
                    status: tracker.status_of(id)?,
                    saved: tracker.is_saved(id)?,
                    scored,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        self.selected = current
            .and_then(|id| self.rows.iter().position(|r| r.scored.job.id == id))
            .unwrap_or(0)
            .min(self.rows.len().saturating_sub(1));
        Ok(())
    }

    fn current_row(&self) -> Option<&Row<'a>> {
        self.rows.get(self.selected)
    }

    fn current_job(&self) -> Option<&'a Job> {
        self.current_row().map(|r| r.scored.job)
    }

    /// Runs an intent and shows its outcome; failures become the notice
    /// instead of ending the session.
    fn apply(&mut self, intent: Intent) {
        let outcome = self
            .tracker
            .dispatch(&mut self.session, intent)
            .map_err(anyhow::Error::from)
            .and_then(|notice| {
                self.refresh()?;
                Ok(notice)
            });
        match outcome {
            Ok(notice) => self.notice = notice,
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    fn set_status(&mut self, status: ApplicationStatus) {
        if let Some(id) = self.current_job().map(|job| job.id) {
            self.apply(Intent::SetStatus(id, status));
        }
    }

    fn toggle_save(&mut self) {
        if let Some(id) = self.current_job().map(|job| job.id) {
            self.apply(Intent::ToggleSave(id));
        }
    }

    fn toggle_matches(&mut self) {
        let on = !self.session.filters.show_only_matches;
        self.apply(Intent::ShowOnlyMatches(on));
    }

    fn cycle_sort(&mut self) {
        let next = self.session.filters.sort.next();
        self.apply(Intent::SetSort(next));
        self.notice = Some(format!("Sorted by {}", next));
    }

    fn next(&mut self) {
        if !self.rows.is_empty() && self.selected < self.rows.len() - 1 {
            self.selected += 1;
            self.scroll_offset = 0;
        }
    }

    fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.scroll_offset = 0;
        }
    }

    fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(3);
    }

    fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(3);
    }
}

pub fn run_browse(tracker: &Tracker, mut session: Session) -> Result<()> {
    tracker.dispatch(&mut session, Intent::Navigate(Route::Dashboard))?;
    let mut state = AppState::new(tracker, session)?;
    if tracker.preferences()?.is_none() {
        state.notice = Some("Set your preferences to activate intelligent matching".to_string());
    }

    enable_raw_mode()?;
    let _restore = RestoreOnDrop(restore_terminal);
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    run_loop(&mut terminal, &mut state)
}

/// Runs the wrapped closure when dropped, so every exit path after raw mode
/// is enabled puts the terminal back.
struct RestoreOnDrop<F: FnMut()>(F);

impl<F: FnMut()> Drop for RestoreOnDrop<F> {
    fn drop(&mut self) {
        (self.0)()
    }
}

fn restore_terminal() {
    // Nothing useful to do with a failure here.
    let _ = disable_raw_mode();
    let _ = stdout().execute(LeaveAlternateScreen);
}

fn run_loop(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, state: &mut AppState) -> Result<()> {
    let mut list_state = ListState::default();
    list_state.select(Some(state.selected));

    loop {
        terminal.draw(|frame| draw(frame, state, &mut list_state))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Down | KeyCode::Char('j') => state.next(),
                KeyCode::Up | KeyCode::Char('k') => state.prev(),
                KeyCode::Char('J') | KeyCode::PageDown => state.scroll_down(),
                KeyCode::Char('K') | KeyCode::PageUp => state.scroll_up(),
                KeyCode::Char('s') => state.toggle_save(),
                KeyCode::Char('a') => state.set_status(ApplicationStatus::Applied),
                KeyCode::Char('x') => state.set_status(ApplicationStatus::Rejected),
                KeyCode::Char('o') => state.set_status(ApplicationStatus::Selected),
                KeyCode::Char('n') => state.set_status(ApplicationStatus::NotApplied),
                KeyCode::Char('m') => state.toggle_matches(),
                KeyCode::Char('S') => state.cycle_sort(),
                KeyCode::Char('c') => state.apply(Intent::ClearFilters),
                _ => {}
            }
            list_state.select(Some(state.selected));
        }
    }
    Ok(())
}

fn status_style(status: ApplicationStatus) -> Style {
    match status {
        ApplicationStatus::NotApplied => Style::default(),
        ApplicationStatus::Applied => Style::default().fg(Color::Cyan),
        ApplicationStatus::Rejected => Style::default().fg(Color::Red),
        ApplicationStatus::Selected => Style::default().fg(Color::Green),
    }
}

fn tier_style(score: u8) -> Style {
    match MatchTier::from_score(score) {
        MatchTier::Strong => Style::default().fg(Color::Green),
        MatchTier::Good => Style::default().fg(Color::Yellow),
        MatchTier::Fair => Style::default().fg(Color::Blue),
        MatchTier::Weak => Style::default().fg(Color::DarkGray),
    }
}

fn draw(frame: &mut Frame, state: &AppState, list_state: &mut ListState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[0]);

    // Left panel: job list
    let items: Vec<ListItem> = state
        .rows
        .iter()
        .map(|row| {
            let job = row.scored.job;
            let status_icon = match row.status {
                ApplicationStatus::NotApplied => " ",
                ApplicationStatus::Applied => "+",
                ApplicationStatus::Rejected => "x",
                ApplicationStatus::Selected => "!",
            };
            let saved_icon = if row.saved { "*" } else { " " };
            let title: String = if job.title.chars().count() > 30 {
                format!("{}...", job.title.chars().take(27).collect::<String>())
            } else {
                job.title.clone()
            };
            ListItem::new(Line::from(vec![
                Span::styled(status_icon, status_style(row.status)),
                Span::raw(saved_icon),
                Span::styled(format!("{:>3}% ", row.scored.score), tier_style(row.scored.score)),
                Span::raw(format!("#{:<3} {} | {}", job.id, title, job.company)),
            ]))
        })
        .collect();

    let filters = &state.session.filters;
    let mut list_title = format!(" Jobs ({}) sort: {} ", state.rows.len(), filters.sort);
    if filters.show_only_matches {
        list_title.push_str("| matches only ");
    }

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(list_title))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[0], list_state);

    // Right panel: job detail
    let detail = build_detail(state);
    let detail_widget = Paragraph::new(detail)
        .block(Block::default().borders(Borders::ALL).title(" Detail "))
        .wrap(Wrap { trim: false })
        .scroll((state.scroll_offset, 0));

    frame.render_widget(detail_widget, chunks[1]);

    // Footer: last notice, else key help
    let footer = match &state.notice {
        Some(notice) => Paragraph::new(format!(" {}", notice)).style(Style::default().fg(Color::Yellow)),
        None => Paragraph::new(
            " j/k:navigate  J/K:scroll  s:save  a:applied x:rejected o:selected n:reset  m:matches S:sort c:clear  q:quit",
        )
        .style(Style::default().fg(Color::DarkGray)),
    };
    frame.render_widget(footer, rows[1]);
}

fn build_detail<'a>(state: &'a AppState) -> Text<'a> {
    let Some(row) = state.current_row() else {
        let message = if state.session.filters.show_only_matches {
            "No roles match your criteria. Adjust filters or lower threshold."
        } else {
            "No jobs match your search."
        };
        return Text::raw(message);
    };
    let job = row.scored.job;

    let mut lines: Vec<Line> = Vec::new();

    // Header
    lines.push(Line::from(Span::styled(
        job.title.as_str(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(format!("at {}", job.company)));
    lines.push(Line::from(Span::styled(
        format!("Match: {}%", row.scored.score),
        tier_style(row.scored.score),
    )));
    lines.push(Line::from(Span::styled(
        format!("Status: {}", row.status),
        status_style(row.status),
    )));
    if row.saved {
        lines.push(Line::from("Saved"));
    }
    lines.push(Line::from(""));

    lines.push(Line::from(format!("Location: {} ({})", job.location, job.mode)));
    lines.push(Line::from(format!("Experience: {}", job.experience)));
    lines.push(Line::from(format!("Salary: {}", job.salary_range)));
    lines.push(Line::from(format!("Source: {}  {}", job.source, job.posted_label())));
    lines.push(Line::from(format!("Apply: {}", job.apply_url)));
    lines.push(Line::from(""));

    if !job.skills.is_empty() {
        lines.push(Line::from(Span::styled(
            "Skills",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for line in textwrap::fill(&job.skills.join(", "), 70).lines() {
            lines.push(Line::from(format!("  {}", line)));
        }
        lines.push(Line::from(""));
    }

    if job.description.is_empty() {
        lines.push(Line::from(Span::styled(
            "(No description)",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Description",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for line in textwrap::fill(&job.description, 70).lines() {
            lines.push(Line::from(line.to_string()));
        }
    }

    Text::from(lines)
}
