//! Application core: event loop, action dispatch, header and status bar.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use guardian_config::Preferences;
use guardian_core::{Command, CommandResult, ConnectionState, Controller, WifiStatus};

use crate::action::{Action, Notification};
use crate::component::Component;
use crate::data_bridge::spawn_data_bridge;
use crate::event::{Event, EventReader};
use crate::screens::DevicesScreen;
use crate::theme::Theme;
use crate::tui::Tui;
use crate::widgets::popup;
use crate::widgets::toast::Toast;

/// Top-level application state and event loop.
#[allow(clippy::struct_excessive_bools)]
pub struct App {
    running: bool,
    help_visible: bool,
    theme: Theme,
    preferences: Preferences,
    screen: DevicesScreen,
    connection: ConnectionState,
    wifi: WifiStatus,
    auto_refresh: bool,
    busy: bool,
    last_refresh: Option<DateTime<Utc>>,
    throbber_state: throbber_widgets_tui::ThrobberState,
    toast: Option<Toast>,
    controller: Controller,
    /// Stops the data bridge on quit.
    data_cancel: CancellationToken,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
}

impl App {
    pub fn new(controller: Controller, preferences: Preferences) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let theme = Theme::from(preferences);
        let config = controller.config();
        let screen = DevicesScreen::new(config.page_size, config.block_duration, theme);

        Self {
            running: true,
            help_visible: false,
            theme,
            preferences,
            screen,
            connection: ConnectionState::Disconnected,
            wifi: WifiStatus::Fetching,
            auto_refresh: false,
            busy: false,
            last_refresh: None,
            throbber_state: throbber_widgets_tui::ThrobberState::default(),
            toast: None,
            controller,
            data_cancel: CancellationToken::new(),
            action_tx,
            action_rx,
        }
    }

    /// Run the main event loop until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.screen.init(self.action_tx.clone())?;

        tokio::spawn(spawn_data_bridge(
            self.controller.clone(),
            self.action_tx.clone(),
            self.data_cancel.clone(),
        ));

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!(url = %self.controller.config().url, "TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        events.stop();
        self.data_cancel.cancel();
        tui.exit();
        info!("TUI event loop ended");
        Ok(())
    }

    /// Global keys first, then the devices screen. While the screen owns
    /// the keyboard (search or duration prompt) only Ctrl-C is global.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?' | 'q') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        if !self.screen.captures_input() {
            match key.code {
                KeyCode::Char('q') => return Ok(Some(Action::Quit)),
                KeyCode::Char('?') => return Ok(Some(Action::ToggleHelp)),
                KeyCode::Char('r') => return Ok(Some(Action::Refresh)),
                KeyCode::Char('a') => return Ok(Some(Action::ToggleAutoRefresh)),
                KeyCode::Char('t') => return Ok(Some(Action::ToggleTheme)),
                KeyCode::Esc if self.toast.is_some() => {
                    return Ok(Some(Action::DismissNotification));
                }
                _ => {}
            }
        }

        self.screen.handle_key_event(key)
    }

    fn process_action(&mut self, action: &Action) -> Result<()> {
        if let Some(follow_up) = self.screen.update(action)? {
            self.action_tx.send(follow_up)?;
        }

        match action {
            Action::Quit => {
                self.running = false;
                self.data_cancel.cancel();
            }
            Action::Tick => {
                if self
                    .toast
                    .as_ref()
                    .is_some_and(|t| t.expired_at(Instant::now()))
                {
                    self.toast = None;
                }
                if self.busy {
                    self.throbber_state.calc_next();
                }
            }
            Action::ConnectionChanged(state) => {
                debug!(?state, "connection state changed");
                self.connection = *state;
            }
            Action::WifiUpdated(status) => self.wifi = status.clone(),
            Action::AutoRefreshChanged(enabled) => self.auto_refresh = *enabled,
            Action::BusyChanged(busy) => self.busy = *busy,
            Action::LastRefresh(at) => self.last_refresh = *at,

            Action::Block { mac, duration } => self.spawn_mutation(Command::Block {
                mac: mac.clone(),
                duration: *duration,
            }),
            Action::Unblock(mac) => self.spawn_mutation(Command::Unblock { mac: mac.clone() }),

            Action::Refresh => self.spawn_refresh(),
            Action::ToggleAutoRefresh => {
                let controller = self.controller.clone();
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    let enabled = controller.toggle_auto_refresh().await;
                    let state = if enabled { "on" } else { "off" };
                    let _ = tx.send(Action::Notify(Notification::info(format!(
                        "Auto-refresh {state}"
                    ))));
                });
            }
            Action::ToggleTheme => {
                self.preferences.dark_mode = !self.preferences.dark_mode;
                let theme = Theme::from(self.preferences);
                if let Err(e) = self.preferences.save() {
                    warn!(error = %e, "failed to save preferences");
                    self.action_tx.send(Action::Notify(Notification::error(format!(
                        "Theme not saved: {e}"
                    ))))?;
                }
                self.action_tx.send(Action::ThemeChanged(theme))?;
            }
            Action::ThemeChanged(theme) => self.theme = *theme,
            Action::ToggleHelp => self.help_visible = !self.help_visible,

            Action::Notify(notification) => self.toast = Some(Toast::new(notification.clone())),
            Action::DismissNotification => self.toast = None,

            _ => {}
        }
        Ok(())
    }

    /// Run a block/unblock in the background. The controller rejects a
    /// second mutation while one is in flight.
    fn spawn_mutation(&self, cmd: Command) {
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let description = cmd.describe();
            let notification = match controller.execute(cmd).await {
                Ok(CommandResult::Device(device)) => Notification::success(format!(
                    "{description} ({} is now {})",
                    device.display_name(),
                    device.status
                )),
                Ok(CommandResult::Ok) => Notification::success(description),
                Err(e) => {
                    warn!(error = %e, "mutation failed");
                    Notification::error(e.to_string())
                }
            };
            let _ = tx.send(Action::Notify(notification));
        });
    }

    fn spawn_refresh(&self) {
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let notification = match controller.refresh_devices().await {
                Ok(count) => {
                    let _ = controller.refresh_wifi().await;
                    Notification::info(format!("Refreshed {count} devices"))
                }
                Err(e) => Notification::error(e.to_string()),
            };
            let _ = tx.send(Action::Notify(notification));
        });
    }

    // ── Rendering ───────────────────────────────────────────────

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(self.theme.base()), area);

        let [header, body, status] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .areas(area);

        self.render_header(frame, header);
        self.screen.render(frame, body);
        self.render_status_bar(frame, status);

        if self.help_visible {
            self.render_help_overlay(frame, area);
        }
        if let Some(toast) = &self.toast {
            toast.render(frame, area, &self.theme);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let t = &self.theme;
        let block = Block::default()
            .title(" Router Guardian ")
            .title_style(t.title())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(t.border_focused());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let wifi_style = match self.wifi {
            WifiStatus::Connected(_) => Style::default().fg(t.palette.success),
            WifiStatus::Fetching => t.key_hint(),
            WifiStatus::Unavailable => Style::default().fg(t.palette.warning),
        };
        let (auto_label, auto_style) = if self.auto_refresh {
            (
                format!(
                    "on, every {}",
                    humantime::format_duration(self.controller.config().refresh_interval)
                ),
                Style::default().fg(t.palette.success),
            )
        } else {
            ("off".to_owned(), t.key_hint())
        };

        let line = Line::from(vec![
            Span::styled(" Connected Wi-Fi: ", t.key_hint()),
            Span::styled(self.wifi.to_string(), wifi_style),
            Span::styled("   Auto-refresh: ", t.key_hint()),
            Span::styled(auto_label, auto_style),
            Span::styled("   Theme: ", t.key_hint()),
            Span::styled(t.name(), Style::default().fg(t.palette.secondary)),
        ]);
        frame.render_widget(Paragraph::new(line), inner);
    }

    fn render_status_bar(&mut self, frame: &mut Frame, area: Rect) {
        let t = self.theme;
        let connection = match self.connection {
            ConnectionState::Connected => {
                Span::styled("● connected", Style::default().fg(t.palette.success))
            }
            ConnectionState::Connecting => {
                Span::styled("◐ connecting", Style::default().fg(t.palette.warning))
            }
            ConnectionState::Unreachable => {
                Span::styled("✗ service unreachable", Style::default().fg(t.palette.error))
            }
            ConnectionState::Disconnected => {
                Span::styled("○ disconnected", Style::default().fg(t.palette.error))
            }
        };

        let refreshed = match self.last_refresh {
            Some(at) => {
                let secs = u64::try_from((Utc::now() - at).num_seconds()).unwrap_or(0);
                format!(
                    " │ refreshed {} ago",
                    humantime::format_duration(Duration::from_secs(secs))
                )
            }
            None => " │ not refreshed yet".to_owned(),
        };

        let [left, right] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(18)]).areas(area);

        let line = Line::from(vec![
            Span::raw(" "),
            connection,
            Span::styled(refreshed, t.key_hint()),
            Span::styled(
                " │ r refresh  a auto  t theme  ? help  q quit",
                t.key_hint(),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), left);

        if self.busy {
            let throbber = throbber_widgets_tui::Throbber::default()
                .label(" Working...")
                .style(Style::default().fg(t.palette.secondary))
                .throbber_style(Style::default().fg(t.palette.accent));
            frame.render_stateful_widget(throbber, right, &mut self.throbber_state);
        }
    }

    fn render_help_overlay(&self, frame: &mut Frame, area: Rect) {
        let t = &self.theme;
        let help_area = popup::centered(area, 56, 19);
        frame.render_widget(Clear, help_area);

        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .title_style(t.title())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(t.border_focused())
            .style(t.base());
        let inner = block.inner(help_area);
        frame.render_widget(block, help_area);

        let entry = |keys: &'static str, what: &'static str| {
            Line::from(vec![
                Span::styled(format!("  {keys:<10}"), t.key_hint_key()),
                Span::styled(what, t.key_hint()),
            ])
        };
        let section = |name: &'static str| {
            Line::from(Span::styled(
                format!("  {name}"),
                Style::default().fg(t.palette.secondary),
            ))
        };

        let lines = vec![
            section("Table"),
            entry("j/k ↑/↓", "Move selection"),
            entry("n/→ p/←", "Next / previous page"),
            entry("1-5", "Sort by column (again to reverse)"),
            entry("/", "Search (Enter keeps, Esc clears)"),
            Line::from(""),
            section("Devices"),
            entry("b", "Block selected device"),
            entry("u", "Unblock selected device"),
            entry("Enter", "Run the row action"),
            Line::from(""),
            section("Global"),
            entry("r", "Refresh now"),
            entry("a", "Toggle auto-refresh"),
            entry("t", "Toggle dark/light theme"),
            entry("?", "Toggle this help"),
            entry("q Ctrl-C", "Quit"),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }
}
