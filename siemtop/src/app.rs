//! App state and main loop: routing, input handling, background fetches and drawing.

use std::{
    io,
    time::{Duration, Instant},
};

use chrono::Utc;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event as TermEvent, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers, MouseEvent,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    widgets::TableState,
    Terminal,
};
use tokio::sync::{mpsc, watch};
use tokio::time::sleep;
use tracing::{debug, info};

use crate::api::ApiClient;
use crate::auth::Auth;
use crate::dashboard::{await_chart_backend, Dashboard, CHART_READY_TIMEOUT};
use crate::error::ApiError;
use crate::events::EventsState;
use crate::nav::{Navigator, Route};
use crate::types::{EventsPage, StatsSnapshot};
use crate::ui::{
    dashboard::draw_dashboard,
    detail::draw_detail,
    events::{
        draw_events, events_handle_key, events_handle_mouse, EventsAction, EventsLayout,
    },
    header::draw_header,
    login::{draw_login, login_handle_key, LoginAction, LoginForm},
};

const TICK: Duration = Duration::from_millis(50);

/// Results of background work, delivered back to the UI task.
enum Fetched {
    Login(bool),
    Events(Result<EventsPage, ApiError>),
    Stats(Result<StatsSnapshot, ApiError>),
}

struct Msg {
    // results from before a logout are dropped
    epoch: u64,
    fetched: Fetched,
}

pub struct App {
    api: ApiClient,
    auth: Auth,
    nav: Navigator,
    routes: watch::Receiver<Route>,
    route: Route,
    server: String,

    login: LoginForm,

    events: EventsState,
    events_requested: bool,
    search_focused: bool,
    table_state: TableState,
    events_layout: EventsLayout,
    detail_area: Option<Rect>,

    dashboard: Dashboard,
    charts_ready: watch::Sender<bool>,

    tx: mpsc::UnboundedSender<Msg>,
    rx: mpsc::UnboundedReceiver<Msg>,
    epoch: u64,

    should_quit: bool,
}

impl App {
    pub fn new(api: ApiClient, username: Option<String>) -> Self {
        let nav = api.navigator().clone();
        let routes = nav.subscribe();
        let (tx, rx) = mpsc::unbounded_channel();
        let (charts_ready, _) = watch::channel(false);
        Self {
            server: api.base_url().to_string(),
            auth: Auth::new(api.clone()),
            api,
            route: nav.current(),
            routes,
            nav,
            login: LoginForm::with_username(username),
            events: EventsState::new(),
            events_requested: false,
            search_focused: false,
            table_state: TableState::default(),
            events_layout: EventsLayout::default(),
            detail_area: None,
            dashboard: Dashboard::new(),
            charts_ready,
            tx,
            rx,
            epoch: 0,
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        // Terminal setup
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        // Charts draw through the terminal, so they are usable from here on.
        self.charts_ready.send_replace(true);

        // Main loop
        let res = self.event_loop(&mut terminal).await;

        // Teardown
        disable_raw_mode()?;
        let backend = terminal.backend_mut();
        execute!(backend, DisableMouseCapture, LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        res
    }

    async fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> anyhow::Result<()> {
        let initial = self.route;
        self.enter_route(initial).await;

        loop {
            // Route changes pushed by the API client (401) or the auth guard
            if self.routes.has_changed().unwrap_or(false) {
                let next = *self.routes.borrow_and_update();
                self.enter_route(next).await;
            }

            // Input (non-blocking)
            while event::poll(Duration::from_millis(10))? {
                match event::read()? {
                    TermEvent::Key(k) if k.kind == KeyEventKind::Press => self.on_key(k),
                    TermEvent::Mouse(m) => self.on_mouse(m),
                    _ => {}
                }
            }
            if self.should_quit {
                break;
            }

            // Finished background work
            while let Ok(msg) = self.rx.try_recv() {
                self.apply(msg);
            }

            // Timers: search debounce and dashboard refresh
            let now = Instant::now();
            self.events.tick(now);
            if self.route == Route::Dashboard && self.dashboard.is_due(now) {
                self.refresh_dashboard(now);
            }

            // Draw
            terminal.draw(|f| self.draw(f))?;

            sleep(TICK).await;
        }

        Ok(())
    }

    async fn enter_route(&mut self, route: Route) {
        if route.is_protected() && !self.auth.require_auth() {
            // require_auth pushed Route::Login; the next loop turn picks it up
            return;
        }
        debug!(?route, "entering screen");
        self.route = route;
        match route {
            Route::Login => self.reset_session_state(),
            Route::Dashboard => {
                if self.dashboard.view.last_refresh.is_none() && !self.dashboard.is_refreshing() {
                    await_chart_backend(self.charts_ready.subscribe(), CHART_READY_TIMEOUT).await;
                    self.refresh_dashboard(Instant::now());
                }
            }
            Route::Events => {
                if !self.events_requested {
                    self.events_requested = true;
                    self.load_events();
                }
            }
        }
    }

    // Everything a page visit owned goes away with the session.
    fn reset_session_state(&mut self) {
        self.epoch += 1;
        self.login.reset();
        self.events = EventsState::new();
        self.events_requested = false;
        self.search_focused = false;
        self.table_state = TableState::default();
        self.detail_area = None;
        self.dashboard = Dashboard::new();
    }

    fn sender(&self) -> impl Fn(Fetched) + Send + 'static {
        let tx = self.tx.clone();
        let epoch = self.epoch;
        move |fetched| {
            let _ = tx.send(Msg { epoch, fetched });
        }
    }

    fn load_events(&mut self) {
        let send = self.sender();
        self.events
            .load_events(&self.api, move |r| send(Fetched::Events(r)));
    }

    fn refresh_dashboard(&mut self, now: Instant) {
        let send = self.sender();
        self.dashboard
            .start_refresh(&self.api, now, move |r| send(Fetched::Stats(r)));
    }

    fn submit_login(&mut self) {
        self.login.pending = true;
        self.login.error = None;
        let auth = self.auth.clone();
        let user = self.login.username.clone();
        let pass = self.login.password.clone();
        let send = self.sender();
        tokio::spawn(async move {
            let ok = auth.login(&user, &pass).await;
            send(Fetched::Login(ok));
        });
    }

    fn apply(&mut self, msg: Msg) {
        if msg.epoch != self.epoch {
            debug!("dropping result from a previous session");
            return;
        }
        match msg.fetched {
            Fetched::Login(true) => {
                self.login.reset();
                self.nav.goto(Route::Dashboard);
            }
            Fetched::Login(false) => {
                self.login.pending = false;
                self.login.password.clear();
                self.login.error = Some("Invalid username or password".into());
            }
            Fetched::Events(outcome) => {
                if matches!(outcome, Err(ApiError::Unauthenticated)) {
                    self.auth.require_auth();
                }
                self.events.finish_load(outcome);
            }
            Fetched::Stats(outcome) => {
                if matches!(outcome, Err(ApiError::Unauthenticated)) {
                    self.auth.require_auth();
                }
                self.dashboard.finish_refresh(outcome, Utc::now());
            }
        }
    }

    // ---------- input ----------

    fn on_key(&mut self, k: KeyEvent) {
        if k.modifiers.contains(KeyModifiers::CONTROL) && matches!(k.code, KeyCode::Char('c')) {
            self.should_quit = true;
            return;
        }

        if self.route == Route::Login {
            if login_handle_key(&mut self.login, k) == LoginAction::Submit {
                self.submit_login();
            }
            return;
        }

        if self.route == Route::Events && (self.events.detail().is_some() || self.search_focused) {
            self.events_key(k);
            return;
        }

        match k.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Tab | KeyCode::BackTab => {
                let next = match self.route {
                    Route::Dashboard => Route::Events,
                    _ => Route::Dashboard,
                };
                self.nav.goto(next);
            }
            KeyCode::Char('L') => self.auth.logout(),
            _ if self.route == Route::Dashboard => self.dashboard_handle_key(k),
            _ => self.events_key(k),
        }
    }

    fn dashboard_handle_key(&mut self, k: KeyEvent) {
        if let KeyCode::Char('r') = k.code {
            info!("manual dashboard refresh");
            self.refresh_dashboard(Instant::now());
        }
    }

    fn events_key(&mut self, k: KeyEvent) {
        let now = Instant::now();
        let action = events_handle_key(&mut self.events, &mut self.search_focused, k, now);
        self.run_events_action(action);
    }

    fn run_events_action(&mut self, action: EventsAction) {
        if self.events.detail().is_none() {
            self.detail_area = None;
        }
        match action {
            EventsAction::None => {}
            EventsAction::Reload => self.load_events(),
            EventsAction::PrevPage => self.prev_page(),
            EventsAction::NextPage => self.next_page(),
        }
    }

    fn prev_page(&mut self) {
        let send = self.sender();
        self.events
            .prev_page(&self.api, move |r| send(Fetched::Events(r)));
    }

    fn next_page(&mut self) {
        let send = self.sender();
        self.events
            .next_page(&self.api, move |r| send(Fetched::Events(r)));
    }

    fn on_mouse(&mut self, m: MouseEvent) {
        if self.route != Route::Events {
            return;
        }
        let action = events_handle_mouse(
            &mut self.events,
            &self.events_layout,
            self.table_state.offset(),
            self.detail_area,
            m,
        );
        self.run_events_action(action);
    }

    // ---------- drawing ----------

    pub fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let area = f.area();
        if self.route == Route::Login {
            draw_login(f, area, &self.login, &self.server);
            return;
        }

        // Root rows: header, screen body
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(5)])
            .split(area);

        let busy = self.dashboard.is_refreshing() || self.events.is_loading();
        draw_header(
            f,
            rows[0],
            &self.server,
            self.route,
            self.dashboard.view.last_refresh,
            busy,
        );

        match self.route {
            Route::Dashboard => draw_dashboard(f, rows[1], &self.dashboard.view),
            Route::Events => {
                self.events_layout = draw_events(
                    f,
                    rows[1],
                    &self.events,
                    &mut self.table_state,
                    self.search_focused,
                );
                self.detail_area = self.events.detail().map(|d| draw_detail(f, area, d));
            }
            Route::Login => {}
        }
    }
}
