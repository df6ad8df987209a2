use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Utc;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::stdout;

use crate::api::ApiClient;
use crate::apply::{ApplyFlow, ApplyForm};
use crate::cache::{CacheState, EntityCache, PollPolicy};
use crate::fetcher::{FetchOutcome, FetchRequest, Fetcher, RefreshScope};
use crate::models::{ApplicationStatus, Role, Session};

const TICK: Duration = Duration::from_millis(250);
const EMPLOYER_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    // Job seeker
    Matches,
    Applied,
    Profile,
    // Employer
    Dashboard,
    Applications,
    Jobs,
    // Admin
    Overview,
}

impl View {
    fn label(&self) -> &'static str {
        match self {
            View::Matches => "Job Matches",
            View::Applied => "Applied Jobs",
            View::Profile => "Profile",
            View::Dashboard => "Dashboard",
            View::Applications => "Applications",
            View::Jobs => "Jobs",
            View::Overview => "Overview",
        }
    }
}

fn views_for(role: Role) -> &'static [View] {
    match role {
        Role::Candidate => &[View::Matches, View::Applied, View::Profile],
        Role::Employer => &[View::Dashboard, View::Applications, View::Jobs],
        Role::Admin => &[View::Overview, View::Applications],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ApplyField {
    CoverLetter,
    Ref1Name,
    Ref1Email,
    Ref2Name,
    Ref2Email,
}

impl ApplyField {
    fn next(self) -> Self {
        match self {
            ApplyField::CoverLetter => ApplyField::Ref1Name,
            ApplyField::Ref1Name => ApplyField::Ref1Email,
            ApplyField::Ref1Email => ApplyField::Ref2Name,
            ApplyField::Ref2Name => ApplyField::Ref2Email,
            ApplyField::Ref2Email => ApplyField::CoverLetter,
        }
    }
}

struct DashState {
    session: Session,
    views: &'static [View],
    view_index: usize,
    selected: usize,
    scroll_offset: u16,
    cache: EntityCache,
    apply: ApplyFlow,
    apply_focus: ApplyField,
    policy: PollPolicy,
    last_refresh: Option<Instant>,
    notice: Option<String>,
}

impl DashState {
    fn new(session: Session) -> Self {
        let policy = match session.role {
            Role::Employer => PollPolicy::Every(EMPLOYER_POLL_INTERVAL),
            Role::Candidate | Role::Admin => PollPolicy::Once,
        };
        Self {
            views: views_for(session.role),
            session,
            view_index: 0,
            selected: 0,
            scroll_offset: 0,
            cache: EntityCache::new(),
            apply: ApplyFlow::new(),
            apply_focus: ApplyField::CoverLetter,
            policy,
            last_refresh: None,
            notice: None,
        }
    }

    fn view(&self) -> View {
        self.views[self.view_index]
    }

    fn scope(&self) -> RefreshScope {
        match self.session.role {
            Role::Candidate => RefreshScope::Seeker {
                email: self.session.email.clone(),
            },
            Role::Employer => RefreshScope::Employer,
            Role::Admin => RefreshScope::Admin,
        }
    }

    fn list_len(&self) -> usize {
        match self.view() {
            View::Matches | View::Jobs => self.cache.jobs.len(),
            View::Applied | View::Applications | View::Dashboard => self.cache.applications.len(),
            View::Profile | View::Overview => 0,
        }
    }

    fn next_row(&mut self) {
        let len = self.list_len();
        if len > 0 && self.selected < len - 1 {
            self.selected += 1;
            self.scroll_offset = 0;
        }
    }

    fn prev_row(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.scroll_offset = 0;
        }
    }

    /// Notices describe the previous action; any new input dismisses them.
    fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    fn switch_view(&mut self, index: usize) {
        if index < self.views.len() && index != self.view_index {
            self.view_index = index;
            self.selected = 0;
            self.scroll_offset = 0;
        }
    }
}

/// Run the dashboard for the already-routed session. The caller (the role
/// router in main) guarantees the session role matches.
pub fn run_dashboard(session: Session, api_url: &str) -> Result<()> {
    let api = ApiClient::new(api_url)?;
    let fetcher = Fetcher::spawn(api);
    let mut state = DashState::new(session);

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state, &fetcher);

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    // Dropping the fetcher shuts the worker down and joins it.
    drop(fetcher);

    result
}

fn request_refresh(state: &mut DashState, fetcher: &Fetcher) {
    let seq = state.cache.begin_refresh();
    fetcher.send(FetchRequest::Refresh {
        seq,
        scope: state.scope(),
    });
    state.last_refresh = Some(Instant::now());
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut DashState,
    fetcher: &Fetcher,
) -> Result<()> {
    let mut list_state = ListState::default();
    list_state.select(Some(0));

    loop {
        if state.policy.due(state.last_refresh) {
            request_refresh(state, fetcher);
        }

        while let Some(outcome) = fetcher.try_recv() {
            handle_outcome(state, fetcher, outcome);
        }

        // A refresh can shrink the list under the cursor.
        state.selected = state.selected.min(state.list_len().saturating_sub(1));
        list_state.select(Some(state.selected));
        terminal.draw(|frame| draw(frame, state, &mut list_state))?;

        if !event::poll(TICK)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            state.dismiss_notice();
            if state.apply.form().is_some() {
                handle_modal_key(state, fetcher, key.code, key.modifiers);
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Tab => {
                    let next = (state.view_index + 1) % state.views.len();
                    state.switch_view(next);
                }
                KeyCode::Char(c @ '1'..='9') => {
                    state.switch_view(c as usize - '1' as usize);
                }
                KeyCode::Down | KeyCode::Char('j') => state.next_row(),
                KeyCode::Up | KeyCode::Char('k') => state.prev_row(),
                KeyCode::Char('J') | KeyCode::PageDown => {
                    state.scroll_offset = state.scroll_offset.saturating_add(3);
                }
                KeyCode::Char('K') | KeyCode::PageUp => {
                    state.scroll_offset = state.scroll_offset.saturating_sub(3);
                }
                KeyCode::Char('r') => request_refresh(state, fetcher),
                KeyCode::Char('a') | KeyCode::Enter => handle_action(state, fetcher),
                KeyCode::Char('x') => handle_reject(state, fetcher),
                _ => {}
            }
        }
    }
    Ok(())
}

fn handle_outcome(state: &mut DashState, fetcher: &Fetcher, outcome: FetchOutcome) {
    match outcome {
        FetchOutcome::Snapshot { seq, result } => match result {
            Ok(snapshot) => {
                state.cache.apply(seq, snapshot);
            }
            Err(message) => state.cache.fail(seq, &message),
        },
        FetchOutcome::Submitted {
            result,
            referee_warning,
        } => match result {
            Ok(application) => {
                state.cache.push_application(application);
                state.apply.submitted();
                state.notice = Some(
                    referee_warning
                        .unwrap_or_else(|| "Application submitted. Referees notified.".to_string()),
                );
            }
            Err(message) => {
                state.apply.submit_failed(message);
            }
        },
        FetchOutcome::Mutated { id, action, result } => match result {
            // Full refresh rather than an optimistic patch, so stats stay
            // consistent with the server.
            Ok(()) => {
                state.notice = Some(format!("Application {id} {action}d."));
                request_refresh(state, fetcher);
            }
            Err(message) => state.notice = Some(format!("Could not {action} {id}: {message}")),
        },
    }
}

/// 'a'/Enter: open the apply modal (seeker) or approve (employer/admin).
fn handle_action(state: &mut DashState, fetcher: &Fetcher) {
    match (state.session.role, state.view()) {
        (Role::Candidate, View::Matches) => {
            let Some(job) = state.cache.jobs.get(state.selected) else {
                return;
            };
            if state.cache.is_applied(&job.id) || state.apply.in_flight_for(&job.id) {
                return;
            }
            let job = job.clone();
            state.apply.open(&job, state.cache.profile.as_ref());
            state.apply_focus = ApplyField::CoverLetter;
        }
        (Role::Employer | Role::Admin, View::Applications | View::Dashboard) => {
            if let Some(app) = state.cache.applications.get(state.selected) {
                fetcher.send(FetchRequest::Approve { id: app.id.clone() });
            }
        }
        _ => {}
    }
}

fn handle_reject(state: &mut DashState, fetcher: &Fetcher) {
    if !matches!(state.session.role, Role::Employer | Role::Admin) {
        return;
    }
    if !matches!(state.view(), View::Applications | View::Dashboard) {
        return;
    }
    if let Some(app) = state.cache.applications.get(state.selected) {
        fetcher.send(FetchRequest::Reject { id: app.id.clone() });
    }
}

fn focused_field(form: &mut ApplyForm, focus: ApplyField) -> &mut String {
    match focus {
        ApplyField::CoverLetter => &mut form.cover_letter,
        ApplyField::Ref1Name => &mut form.referee1_name,
        ApplyField::Ref1Email => &mut form.referee1_email,
        ApplyField::Ref2Name => &mut form.referee2_name,
        ApplyField::Ref2Email => &mut form.referee2_email,
    }
}

fn handle_modal_key(
    state: &mut DashState,
    fetcher: &Fetcher,
    code: KeyCode,
    modifiers: KeyModifiers,
) {
    // Ctrl-S submits; Esc cancels unless a submit is in flight.
    if code == KeyCode::Char('s') && modifiers.contains(KeyModifiers::CONTROL) {
        let Some(profile) = state.cache.profile.clone() else {
            if let Some(form) = state.apply.form_mut() {
                form.error = Some("Register a profile before applying.".to_string());
            }
            return;
        };
        if let Some((payload, notify)) = state.apply.begin_submit(&profile) {
            fetcher.send(FetchRequest::Submit { payload, notify });
        }
        return;
    }

    match code {
        KeyCode::Esc => {
            if !state.apply.is_submitting() {
                state.apply.close();
            }
        }
        KeyCode::Tab => state.apply_focus = state.apply_focus.next(),
        KeyCode::Enter => {
            if state.apply_focus == ApplyField::CoverLetter {
                if let Some(form) = state.apply.form_mut() {
                    form.cover_letter.push('\n');
                }
            } else {
                state.apply_focus = state.apply_focus.next();
            }
        }
        KeyCode::Backspace => {
            let focus = state.apply_focus;
            if let Some(form) = state.apply.form_mut() {
                focused_field(form, focus).pop();
            }
        }
        KeyCode::Char(c) => {
            let focus = state.apply_focus;
            if let Some(form) = state.apply.form_mut() {
                focused_field(form, focus).push(c);
            }
        }
        _ => {}
    }
}

// --- Rendering ---

fn draw(frame: &mut Frame, state: &DashState, list_state: &mut ListState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_tabs(frame, state, chunks[0]);

    match state.view() {
        View::Matches | View::Jobs => draw_jobs(frame, state, chunks[1], list_state),
        View::Applied => draw_applied(frame, state, chunks[1], list_state),
        View::Profile => draw_profile(frame, state, chunks[1]),
        View::Dashboard => draw_employer_dashboard(frame, state, chunks[1], list_state),
        View::Applications => draw_applications(frame, state, chunks[1], list_state),
        View::Overview => draw_admin_overview(frame, state, chunks[1]),
    }

    draw_status(frame, state, chunks[2]);
    draw_help(frame, state, chunks[3]);

    if state.apply.form().is_some() {
        draw_apply_modal(frame, state);
    }
}

fn draw_tabs(frame: &mut Frame, state: &DashState, area: Rect) {
    let mut spans: Vec<Span> = vec![Span::styled(
        format!(" {} ", state.session.role.display_name()),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    for (i, view) in state.views.iter().enumerate() {
        let style = if i == state.view_index {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" [{}] {} ", i + 1, view.label()), style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn status_style(status: ApplicationStatus) -> Style {
    match status {
        ApplicationStatus::Pending => Style::default().fg(Color::Yellow),
        ApplicationStatus::Interviewing => Style::default().fg(Color::Cyan),
        ApplicationStatus::Approved | ApplicationStatus::Hired => {
            Style::default().fg(Color::Green)
        }
        ApplicationStatus::Rejected => Style::default().fg(Color::Red),
    }
}

fn draw_jobs(frame: &mut Frame, state: &DashState, area: Rect, list_state: &mut ListState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let items: Vec<ListItem> = state
        .cache
        .jobs
        .iter()
        .map(|job| {
            let hot = if job.hot { "!" } else { " " };
            let marker = if state.session.role == Role::Candidate && state.cache.is_applied(&job.id)
            {
                "+"
            } else {
                " "
            };
            let company = job.company_name.as_deref().unwrap_or("?");
            ListItem::new(format!("{}{} {} | {}", hot, marker, truncate(&job.title, 30), company))
        })
        .collect();

    let title = match state.cache.state() {
        CacheState::Loading | CacheState::Idle => " Jobs (loading...) ".to_string(),
        _ => format!(" Jobs ({}) ", state.cache.jobs.len()),
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, chunks[0], list_state);

    let detail = build_job_detail(state, chunks[1].width.saturating_sub(4) as usize);
    let widget = Paragraph::new(detail)
        .block(Block::default().borders(Borders::ALL).title(" Detail "))
        .wrap(Wrap { trim: false })
        .scroll((state.scroll_offset, 0));
    frame.render_widget(widget, chunks[1]);
}

fn build_job_detail(state: &DashState, width: usize) -> Text<'static> {
    let Some(job) = state.cache.jobs.get(state.selected) else {
        return Text::raw("No job selected");
    };

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(
        job.title.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    if let Some(company) = &job.company_name {
        lines.push(Line::from(format!("at {}", company)));
    }
    if job.hot {
        lines.push(Line::from(Span::styled(
            "Hot job",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }
    if let Some(location) = &job.location {
        let job_type = job.job_type.as_deref().unwrap_or("Full-time");
        lines.push(Line::from(format!("{} | {}", location, job_type)));
    }
    lines.push(Line::from(format!("Salary: {}", job.salary_display())));
    if let Some(skills) = &job.skills_required {
        lines.push(Line::from(format!("Skills: {}", skills)));
    }
    lines.push(Line::from(""));

    if let Some(description) = &job.description {
        for line in textwrap::fill(description, width.max(20)).lines() {
            lines.push(Line::from(line.to_string()));
        }
    } else {
        lines.push(Line::from(Span::styled(
            "(No description)",
            Style::default().fg(Color::DarkGray),
        )));
    }

    if state.session.role == Role::Candidate {
        lines.push(Line::from(""));
        if state.cache.is_applied(&job.id) {
            lines.push(Line::from(Span::styled(
                "Applied",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Press 'a' to apply",
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    Text::from(lines)
}

fn draw_applied(frame: &mut Frame, state: &DashState, area: Rect, list_state: &mut ListState) {
    let items: Vec<ListItem> = state
        .cache
        .applications
        .iter()
        .map(|app| {
            let title = state
                .cache
                .job(&app.job_id)
                .map(|j| j.title.clone())
                .unwrap_or_else(|| "Unknown Position".to_string());
            ListItem::new(Line::from(vec![
                Span::raw(format!("{:<40} ", truncate(&title, 38))),
                Span::styled(app.status.as_str(), status_style(app.status)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Applied Jobs ({}) ", state.cache.applications.len())),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, list_state);
}

fn draw_profile(frame: &mut Frame, state: &DashState, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    match &state.cache.profile {
        Some(profile) => {
            lines.push(Line::from(Span::styled(
                profile.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(profile.email.clone()));
            lines.push(Line::from(""));
            lines.push(Line::from(format!(
                "Skills:     {}",
                profile.skills.as_deref().unwrap_or("Not specified")
            )));
            lines.push(Line::from(format!(
                "Education:  {}",
                profile.education.as_deref().unwrap_or("Not specified")
            )));
            lines.push(Line::from(format!(
                "Experience: {}",
                profile.experience.as_deref().unwrap_or("Not specified")
            )));
            if let Some(portfolio) = &profile.portfolio {
                lines.push(Line::from(format!("Portfolio:  {}", portfolio)));
            }
        }
        None => {
            lines.push(Line::from("No profile found for this account."));
            lines.push(Line::from(
                "Run `joblink register candidate` to create one.",
            ));
        }
    }
    let widget = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(" Profile "))
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

fn draw_employer_dashboard(
    frame: &mut Frame,
    state: &DashState,
    area: Rect,
    list_state: &mut ListState,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    let stats = state.cache.stats(Utc::now());
    let cards = [
        ("Active Jobs", stats.active_jobs),
        ("Total Applications", stats.total_applications),
        ("Interviews Scheduled", stats.interviews_scheduled),
        ("Hired This Month", stats.hired_this_month),
    ];
    let card_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25); 4])
        .split(chunks[0]);
    for ((label, value), card_area) in cards.iter().zip(card_areas.iter()) {
        let card = Paragraph::new(Text::from(vec![
            Line::from(Span::styled(
                value.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(*label, Style::default().fg(Color::DarkGray))),
        ]))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(card, *card_area);
    }

    let items: Vec<ListItem> = state
        .cache
        .applications
        .iter()
        .map(|app| {
            let title = state
                .cache
                .job(&app.job_id)
                .map(|j| j.title.clone())
                .unwrap_or_else(|| format!("job {}", app.job_id));
            ListItem::new(Line::from(vec![
                Span::raw(format!(
                    "{:<12} {:<32} ",
                    truncate(&app.candidate_id, 10),
                    truncate(&title, 30)
                )),
                Span::styled(app.status.as_str(), status_style(app.status)),
            ]))
        })
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Recent Applications "),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, chunks[1], list_state);
}

fn draw_applications(frame: &mut Frame, state: &DashState, area: Rect, list_state: &mut ListState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let items: Vec<ListItem> = state
        .cache
        .applications
        .iter()
        .map(|app| {
            let title = state
                .cache
                .job(&app.job_id)
                .map(|j| j.title.clone())
                .unwrap_or_else(|| format!("job {}", app.job_id));
            ListItem::new(Line::from(vec![
                Span::raw(format!("{:<28} ", truncate(&title, 26))),
                Span::styled(app.status.as_str(), status_style(app.status)),
            ]))
        })
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Applications ({}) ", state.cache.applications.len())),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, chunks[0], list_state);

    let mut lines: Vec<Line> = Vec::new();
    if let Some(app) = state.cache.applications.get(state.selected) {
        lines.push(Line::from(format!("Candidate: {}", app.candidate_id)));
        lines.push(Line::from(vec![
            Span::raw("Status: "),
            Span::styled(app.status.as_str(), status_style(app.status)),
        ]));
        if let (Some(name), Some(email)) = (&app.referee1_name, &app.referee1_email) {
            lines.push(Line::from(format!("Referee 1: {} ({})", name, email)));
        }
        if let (Some(name), Some(email)) = (&app.referee2_name, &app.referee2_email) {
            lines.push(Line::from(format!("Referee 2: {} ({})", name, email)));
        }
        lines.push(Line::from(""));
        if let Some(letter) = &app.cover_letter {
            let width = chunks[1].width.saturating_sub(4) as usize;
            for line in textwrap::fill(letter, width.max(20)).lines() {
                lines.push(Line::from(line.to_string()));
            }
        }
    } else {
        lines.push(Line::from("No application selected"));
    }
    let widget = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(" Cover Letter "))
        .wrap(Wrap { trim: false })
        .scroll((state.scroll_offset, 0));
    frame.render_widget(widget, chunks[1]);
}

fn draw_admin_overview(frame: &mut Frame, state: &DashState, area: Rect) {
    let stats = state.cache.stats(Utc::now());
    let rows = [
        ("Registered job seekers", state.cache.candidates.len()),
        ("Jobs posted", stats.active_jobs),
        ("Total applications", stats.total_applications),
        ("Awaiting decision", state.cache.pending().len()),
        ("Approved", state.cache.approved().len()),
        ("Interviews scheduled", stats.interviews_scheduled),
        ("Hired this month", stats.hired_this_month),
    ];
    let mut lines: Vec<Line> = Vec::new();
    for (label, value) in rows {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:>8}  ", value),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(label),
        ]));
    }
    let widget = Paragraph::new(Text::from(lines)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Platform Overview "),
    );
    frame.render_widget(widget, area);
}

fn draw_status(frame: &mut Frame, state: &DashState, area: Rect) {
    let (message, style) = if let Some(banner) = state.cache.banner() {
        (banner.to_string(), Style::default().fg(Color::Red))
    } else if let Some(notice) = &state.notice {
        (notice.clone(), Style::default().fg(Color::Yellow))
    } else {
        let status = match state.cache.state() {
            CacheState::Idle | CacheState::Loading => "loading...",
            CacheState::Ready => "up to date",
            CacheState::Error => "unavailable",
        };
        (
            format!("{} | {}", state.session.email, status),
            Style::default().fg(Color::DarkGray),
        )
    };
    frame.render_widget(Paragraph::new(message).style(style), area);
}

fn draw_help(frame: &mut Frame, state: &DashState, area: Rect) {
    let help = if state.apply.form().is_some() {
        " Tab:next field  Ctrl-s:submit  Esc:cancel"
    } else {
        match state.session.role {
            Role::Candidate => " 1-3:views  j/k:navigate  J/K:scroll  a:apply  r:refresh  q:quit",
            Role::Employer | Role::Admin => {
                " Tab:views  j/k:navigate  a:approve  x:reject  r:refresh  q:quit"
            }
        }
    };
    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        area,
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
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn draw_apply_modal(frame: &mut Frame, state: &DashState) {
    let Some(form) = state.apply.form() else { return };
    let area = centered_rect(80, 80, frame.area());
    frame.render_widget(Clear, area);

    let title = if state.apply.is_submitting() {
        format!(" Apply for {} (submitting...) ", form.job_title)
    } else {
        format!(" Apply for {} at {} ", form.job_title, form.company_name)
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(6),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .split(inner);

    let letter_style = if state.apply_focus == ApplyField::CoverLetter {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let letter = Paragraph::new(form.cover_letter.clone())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Cover Letter ")
                .border_style(letter_style),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(letter, chunks[0]);

    let ref1 = field_line(
        "Referee 1",
        &form.referee1_name,
        &form.referee1_email,
        state.apply_focus == ApplyField::Ref1Name,
        state.apply_focus == ApplyField::Ref1Email,
    );
    frame.render_widget(Paragraph::new(ref1), chunks[1]);

    let ref2 = field_line(
        "Referee 2",
        &form.referee2_name,
        &form.referee2_email,
        state.apply_focus == ApplyField::Ref2Name,
        state.apply_focus == ApplyField::Ref2Email,
    );
    frame.render_widget(Paragraph::new(ref2), chunks[2]);

    if let Some(error) = &form.error {
        frame.render_widget(
            Paragraph::new(error.clone()).style(Style::default().fg(Color::Red)),
            chunks[3],
        );
    }
}

fn field_line(
    label: &str,
    name: &str,
    email: &str,
    name_focused: bool,
    email_focused: bool,
) -> Line<'static> {
    let focus = Style::default().fg(Color::Cyan);
    let plain = Style::default();
    Line::from(vec![
        Span::styled(format!("{}: ", label), Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("[{:<24}]", truncate(name, 24)),
            if name_focused { focus } else { plain },
        ),
        Span::raw(" "),
        Span::styled(
            format!("[{:<28}]", truncate(email, 28)),
            if email_focused { focus } else { plain },
        ),
    ])
}

// Cuts on char boundaries; titles and names are not always ASCII.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Développeur Front-End", 5), "Dé...");
        assert_eq!(truncate("日本語のタイトルです", 6), "日本語...");
    }

    #[test]
    fn notice_is_dismissed_by_input() {
        let mut state = DashState::new(Session {
            email: "hr@technova.com".into(),
            role: Role::Employer,
        });
        state.notice = Some("Application a1 approved.".into());
        state.dismiss_notice();
        assert!(state.notice.is_none());
    }
}
