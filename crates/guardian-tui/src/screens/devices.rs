//! Devices screen: searchable, sortable, paginated table with block and
//! unblock actions.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Position, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, TableState};
use strum::IntoEnumIterator;
use tui_input::{Input, InputRequest};

use guardian_core::{
    BlockDuration, BlockDurationPolicy, Device, DeviceAction, DeviceView, SortKey, ViewState,
};

use crate::action::{Action, Notification};
use crate::component::Component;
use crate::theme::Theme;
use crate::widgets::popup;

const EMPTY_MESSAGE: &str = "No devices found.";

/// Duration prompt shown when the block policy is `prompt`.
struct BlockPrompt {
    device: Arc<Device>,
    input: Input,
    error: Option<String>,
}

pub struct DevicesScreen {
    devices: Arc<Vec<Arc<Device>>>,
    view: ViewState,
    derived: DeviceView,
    table_state: TableState,
    search: Option<Input>,
    prompt: Option<BlockPrompt>,
    policy: BlockDurationPolicy,
    busy: bool,
    theme: Theme,
}

impl DevicesScreen {
    pub fn new(page_size: usize, policy: BlockDurationPolicy, theme: Theme) -> Self {
        let view = ViewState::new(page_size);
        let derived = view.derive(&[]);
        Self {
            devices: Arc::new(Vec::new()),
            view,
            derived,
            table_state: TableState::default(),
            search: None,
            prompt: None,
            policy,
            busy: false,
            theme,
        }
    }

    /// Re-run filter, sort and paginate, then pull the page and the
    /// selection back into range.
    fn recompute(&mut self) {
        self.derived = self.view.derive(&self.devices);
        self.view.clamp_to(self.derived.total_pages);
        let rows = self.derived.rows.len();
        let selected = match self.table_state.selected() {
            _ if rows == 0 => None,
            Some(i) => Some(i.min(rows - 1)),
            None => Some(0),
        };
        self.table_state.select(selected);
    }

    fn reset_selection(&mut self) {
        self.table_state.select(None);
        self.recompute();
    }

    fn selected_device(&self) -> Option<&Arc<Device>> {
        self.table_state
            .selected()
            .and_then(|i| self.derived.rows.get(i))
    }

    fn move_selection(&mut self, delta: isize) {
        let rows = self.derived.rows.len();
        if rows == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        let next = current.saturating_add_signed(delta).min(rows - 1);
        self.table_state.select(Some(next));
    }

    // ── Mutations ───────────────────────────────────────────────

    fn request_block(&mut self) -> Option<Action> {
        if self.busy {
            return None;
        }
        let device = Arc::clone(self.selected_device()?);
        if device.is_blocked() {
            return Some(Action::Notify(Notification::info(format!(
                "{} is already blocked",
                device.display_name()
            ))));
        }
        match self.policy {
            BlockDurationPolicy::Prompt => {
                self.prompt = Some(BlockPrompt {
                    device,
                    input: Input::default(),
                    error: None,
                });
                None
            }
            BlockDurationPolicy::Indefinite => Some(Action::Block {
                mac: device.mac.clone(),
                duration: None,
            }),
            BlockDurationPolicy::Fixed(d) => Some(Action::Block {
                mac: device.mac.clone(),
                duration: Some(d),
            }),
        }
    }

    fn request_unblock(&self) -> Option<Action> {
        if self.busy {
            return None;
        }
        let device = self.selected_device()?;
        if !device.is_blocked() {
            return Some(Action::Notify(Notification::info(format!(
                "{} is not blocked",
                device.display_name()
            ))));
        }
        Some(Action::Unblock(device.mac.clone()))
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) -> Option<Action> {
        let prompt = self.prompt.as_mut()?;
        match key.code {
            KeyCode::Esc => {
                self.prompt = None;
                None
            }
            KeyCode::Enter => {
                let raw = prompt.input.value().trim().to_owned();
                if raw.is_empty() {
                    self.prompt = None;
                    return Some(Action::Notify(Notification::info("Block cancelled")));
                }
                match raw.parse::<BlockDuration>() {
                    Ok(duration) => {
                        let mac = prompt.device.mac.clone();
                        self.prompt = None;
                        Some(Action::Block {
                            mac,
                            duration: Some(duration),
                        })
                    }
                    Err(_) => {
                        prompt.error = Some(format!("'{raw}' is not like 1h or 30m"));
                        None
                    }
                }
            }
            _ => {
                if edit_input(&mut prompt.input, key) {
                    prompt.error = None;
                }
                None
            }
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Option<Action> {
        let input = self.search.as_mut()?;
        match key.code {
            KeyCode::Esc => {
                self.search = None;
                Some(Action::SearchChanged(String::new()))
            }
            KeyCode::Enter => {
                let value = input.value().to_owned();
                self.search = None;
                Some(Action::SearchChanged(value))
            }
            _ => edit_input(input, key).then(|| Action::SearchChanged(input.value().to_owned())),
        }
    }

    // ── Rendering ───────────────────────────────────────────────

    fn render_search_line(&self, frame: &mut Frame, area: Rect) {
        let t = &self.theme;
        let line = match &self.search {
            Some(input) => {
                let prefix = " Search: ";
                let x = area.x
                    + u16::try_from(prefix.len() + input.visual_cursor()).unwrap_or(area.width);
                frame.set_cursor_position(Position::new(x.min(area.right()), area.y));
                Line::from(vec![
                    Span::styled(prefix, t.key_hint_key()),
                    Span::styled(input.value(), Style::default().fg(t.palette.text)),
                ])
            }
            None if self.view.search().is_empty() => Line::from(vec![
                Span::styled(" / ", t.key_hint_key()),
                Span::styled("search hostname, IP, MAC or status", t.key_hint()),
            ]),
            None => Line::from(vec![
                Span::styled(" Search: ", t.key_hint()),
                Span::styled(
                    self.view.search(),
                    Style::default().fg(t.palette.secondary),
                ),
                Span::styled("  (/ to edit, empty to clear)", t.key_hint()),
            ]),
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn header_cell(&self, key: SortKey) -> Cell<'static> {
        let label = if key == self.view.sort_key() {
            format!("{} {}", key.label(), self.view.sort_direction().arrow())
        } else {
            key.label().to_owned()
        };
        Cell::from(label).style(self.theme.table_header())
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let t = &self.theme;
        if self.derived.is_empty() {
            let msg = Paragraph::new(Span::styled(EMPTY_MESSAGE, t.key_hint()))
                .alignment(Alignment::Center);
            let [_, middle, _] = Layout::vertical([
                Constraint::Fill(1),
                Constraint::Length(1),
                Constraint::Fill(1),
            ])
            .areas(area);
            frame.render_widget(msg, middle);
            return;
        }

        let mut header: Vec<Cell> = SortKey::iter().map(|k| self.header_cell(k)).collect();
        header.push(Cell::from("Blocked").style(t.table_header()));
        header.push(Cell::from("Action").style(t.table_header()));

        let rows: Vec<Row> = self
            .derived
            .rows
            .iter()
            .map(|d| {
                let action = match d.action() {
                    DeviceAction::Block => "Block",
                    DeviceAction::Unblock => "Unblock",
                };
                let action_style = if self.busy {
                    t.key_hint()
                } else {
                    t.key_hint_key()
                };
                Row::new(vec![
                    Cell::from(d.display_name().to_owned()),
                    Cell::from(d.ip.clone().unwrap_or_else(|| "-".into())),
                    Cell::from(d.mac.to_string()),
                    Cell::from(d.status.to_string()),
                    Cell::from(d.online_duration_display()),
                    Cell::from(if d.is_blocked() { "Yes" } else { "No" }),
                    Cell::from(format!("[{action}]")).style(action_style),
                ])
                .style(t.row(d.row_class()))
            })
            .collect();

        let widths = [
            Constraint::Min(14),
            Constraint::Length(15),
            Constraint::Length(17),
            Constraint::Length(10),
            Constraint::Length(20),
            Constraint::Length(9),
            Constraint::Length(10),
        ];

        let table = Table::new(rows, widths)
            .header(Row::new(header))
            .row_highlight_style(t.table_selected())
            .highlight_symbol("▸ ");

        let mut state = self.table_state.clone();
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let t = &self.theme;
        let d = &self.derived;
        let counts = if d.matched == d.total {
            format!("{} devices", d.total)
        } else {
            format!("{} of {} devices", d.matched, d.total)
        };
        let line = Line::from(vec![
            Span::styled(format!(" {}", d.page_label()), t.title()),
            Span::styled(format!("  ·  {counts}   "), t.key_hint()),
            Span::styled("p/←", t.key_hint_key()),
            Span::styled(" prev  ", t.key_hint()),
            Span::styled("n/→", t.key_hint_key()),
            Span::styled(" next  ", t.key_hint()),
            Span::styled("1-5", t.key_hint_key()),
            Span::styled(" sort  ", t.key_hint()),
            Span::styled("b/u", t.key_hint_key()),
            Span::styled(" block/unblock", t.key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_prompt(&self, frame: &mut Frame, area: Rect, prompt: &BlockPrompt) {
        let t = &self.theme;
        let box_area = popup::centered(area, 52, 7);
        frame.render_widget(Clear, box_area);

        let block = Block::default()
            .title(format!(" Block {} ", prompt.device.display_name()))
            .title_style(t.title())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(t.border_focused())
            .style(t.base());
        let inner = block.inner(box_area);
        frame.render_widget(block, box_area);

        let [hint, field, error] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(2),
        ])
        .areas(inner);

        frame.render_widget(
            Paragraph::new(Span::styled(
                " Duration (e.g. 1h, 30m). Empty cancels.",
                t.key_hint(),
            )),
            hint,
        );
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(" > ", t.key_hint_key()),
                Span::raw(prompt.input.value()),
            ])),
            field,
        );
        let cursor_x = field.x + 3 + u16::try_from(prompt.input.visual_cursor()).unwrap_or(0);
        frame.set_cursor_position(Position::new(cursor_x.min(field.right()), field.y));

        if let Some(msg) = &prompt.error {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!(" {msg}"),
                    Style::default().fg(t.palette.error),
                )),
                error,
            );
        }
    }
}

/// Apply an editing key to a text input. Returns whether the value changed.
fn edit_input(input: &mut Input, key: KeyEvent) -> bool {
    let request = match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            InputRequest::InsertChar(c)
        }
        KeyCode::Backspace => InputRequest::DeletePrevChar,
        KeyCode::Delete => InputRequest::DeleteNextChar,
        KeyCode::Left => InputRequest::GoToPrevChar,
        KeyCode::Right => InputRequest::GoToNextChar,
        KeyCode::Home => InputRequest::GoToStart,
        KeyCode::End => InputRequest::GoToEnd,
        _ => return false,
    };
    input
        .handle(request)
        .is_some_and(|change| change.value)
}

impl Component for DevicesScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.prompt.is_some() {
            return Ok(self.handle_prompt_key(key));
        }
        if self.search.is_some() {
            return Ok(self.handle_search_key(key));
        }

        let action = match key.code {
            KeyCode::Char('/') => {
                self.search = Some(Input::default().with_value(self.view.search().to_owned()));
                None
            }
            KeyCode::Char(c @ '1'..='5') => SortKey::iter()
                .zip('1'..='5')
                .find(|&(_, digit)| digit == c)
                .map(|(key, _)| Action::ToggleSort(key)),
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(-1);
                None
            }
            KeyCode::Char('n') | KeyCode::Right => Some(Action::NextPage),
            KeyCode::Char('p') | KeyCode::Left => Some(Action::PrevPage),
            KeyCode::Char('b') => self.request_block(),
            KeyCode::Char('u') => self.request_unblock(),
            KeyCode::Enter => match self.selected_device().map(|d| d.action()) {
                Some(DeviceAction::Block) => self.request_block(),
                Some(DeviceAction::Unblock) => self.request_unblock(),
                None => None,
            },
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::DevicesUpdated(devices) => {
                self.devices = Arc::clone(devices);
                self.recompute();
            }
            Action::SearchChanged(query) => {
                self.view.set_search(query.clone());
                self.reset_selection();
            }
            Action::ToggleSort(key) => {
                self.view.toggle_sort(*key);
                self.reset_selection();
            }
            Action::NextPage => {
                self.view.next_page(self.derived.total_pages);
                self.reset_selection();
            }
            Action::PrevPage => {
                self.view.prev_page();
                self.reset_selection();
            }
            Action::BusyChanged(busy) => self.busy = *busy,
            Action::ThemeChanged(theme) => self.theme = *theme,
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let t = &self.theme;
        let block = Block::default()
            .title(" Devices ")
            .title_style(t.title())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(t.border());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [search, table, footer] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        self.render_search_line(frame, search);
        self.render_table(frame, table);
        self.render_footer(frame, footer);

        if let Some(prompt) = &self.prompt {
            self.render_prompt(frame, area, prompt);
        }
    }

    fn captures_input(&self) -> bool {
        self.search.is_some() || self.prompt.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use guardian_core::{DeviceStatus, MacAddress};
    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend};

    fn device(mac: &str, hostname: &str, status: &str) -> Arc<Device> {
        Arc::new(Device {
            mac: MacAddress::new(mac),
            ip: Some("192.168.1.2".into()),
            hostname: Some(hostname.into()),
            status: DeviceStatus::from(status),
            online_duration: Some("2 days, 3:15:00".into()),
            blocked: None,
            first_seen: None,
            last_seen: None,
        })
    }

    fn screen_with(policy: BlockDurationPolicy) -> DevicesScreen {
        let mut screen = DevicesScreen::new(2, policy, Theme::dark());
        let devices = vec![
            device("aa:aa:aa:aa:aa:01", "laptop", "online"),
            device("aa:aa:aa:aa:aa:02", "camera", "blocked"),
            device("aa:aa:aa:aa:aa:03", "tv", "scheduled"),
        ];
        screen.update(&Action::DevicesUpdated(Arc::new(devices))).unwrap();
        screen
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    /// Feed a key and apply any returned view action, the way the app
    /// loop routes it back to the screen.
    fn press(screen: &mut DevicesScreen, code: KeyCode) -> Option<Action> {
        let action = screen.handle_key_event(key(code)).unwrap();
        if let Some(
            a @ (Action::SearchChanged(_)
            | Action::ToggleSort(_)
            | Action::NextPage
            | Action::PrevPage),
        ) = &action
        {
            screen.update(a).unwrap();
        }
        action
    }

    fn render_text(screen: &DevicesScreen) -> String {
        let mut terminal = Terminal::new(TestBackend::new(110, 14)).unwrap();
        terminal.draw(|f| screen.render(f, f.area())).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn sorts_by_hostname_and_pages() {
        let mut screen = screen_with(BlockDurationPolicy::Indefinite);
        let names: Vec<_> = screen.derived.rows.iter().map(|d| d.display_name()).collect();
        assert_eq!(names, vec!["camera", "laptop"]);
        assert_eq!(screen.derived.page_label(), "Page 1 of 2");

        press(&mut screen, KeyCode::Char('n'));
        assert_eq!(screen.derived.page_label(), "Page 2 of 2");
        press(&mut screen, KeyCode::Char('n'));
        assert_eq!(screen.derived.page, 2);
    }

    #[test]
    fn number_key_toggles_sort_direction() {
        let mut screen = screen_with(BlockDurationPolicy::Indefinite);
        press(&mut screen, KeyCode::Char('1'));
        let first = screen.derived.rows[0].display_name().to_owned();
        assert_eq!(first, "tv");
        press(&mut screen, KeyCode::Char('4'));
        assert_eq!(screen.view.sort_key(), SortKey::Status);
    }

    #[test]
    fn live_search_filters_and_resets_page() {
        let mut screen = screen_with(BlockDurationPolicy::Indefinite);
        press(&mut screen, KeyCode::Char('n'));
        press(&mut screen, KeyCode::Char('/'));
        assert!(screen.captures_input());
        press(&mut screen, KeyCode::Char('T'));
        press(&mut screen, KeyCode::Char('V'));
        assert_eq!(screen.derived.matched, 1);
        assert_eq!(screen.derived.page, 1);

        press(&mut screen, KeyCode::Esc);
        assert!(!screen.captures_input());
        assert_eq!(screen.derived.matched, 3);
    }

    #[test]
    fn block_follows_policy() {
        let fixed = BlockDuration::hours(1).unwrap();
        let mut screen = screen_with(BlockDurationPolicy::Fixed(fixed));
        // Select laptop (second row, online).
        press(&mut screen, KeyCode::Char('j'));
        match press(&mut screen, KeyCode::Char('b')) {
            Some(Action::Block { mac, duration }) => {
                assert_eq!(mac.as_str(), "aa:aa:aa:aa:aa:01");
                assert_eq!(duration, Some(fixed));
            }
            other => panic!("expected Block, got {other:?}"),
        }
    }

    #[test]
    fn prompt_validates_and_cancels() {
        let mut screen = screen_with(BlockDurationPolicy::Prompt);
        press(&mut screen, KeyCode::Char('j'));
        assert!(press(&mut screen, KeyCode::Char('b')).is_none());
        assert!(screen.captures_input());

        press(&mut screen, KeyCode::Char('2'));
        press(&mut screen, KeyCode::Char('d'));
        assert!(press(&mut screen, KeyCode::Enter).is_none());
        assert!(screen.prompt.as_ref().unwrap().error.is_some());

        press(&mut screen, KeyCode::Backspace);
        press(&mut screen, KeyCode::Char('m'));
        match press(&mut screen, KeyCode::Enter) {
            Some(Action::Block { duration, .. }) => {
                assert_eq!(duration, Some(BlockDuration::minutes(2).unwrap()));
            }
            other => panic!("expected Block, got {other:?}"),
        }

        press(&mut screen, KeyCode::Char('b'));
        assert!(matches!(
            press(&mut screen, KeyCode::Enter),
            Some(Action::Notify(_))
        ));
        assert!(!screen.captures_input());
    }

    #[test]
    fn mutations_ignored_while_busy() {
        let mut screen = screen_with(BlockDurationPolicy::Indefinite);
        screen.update(&Action::BusyChanged(true)).unwrap();
        assert!(press(&mut screen, KeyCode::Char('u')).is_none());
        assert!(press(&mut screen, KeyCode::Char('b')).is_none());

        screen.update(&Action::BusyChanged(false)).unwrap();
        assert!(matches!(
            press(&mut screen, KeyCode::Char('u')),
            Some(Action::Unblock(_))
        ));
    }

    #[test]
    fn renders_headers_arrow_and_rows() {
        let screen = screen_with(BlockDurationPolicy::Indefinite);
        let text = render_text(&screen);
        assert!(text.contains("Hostname ▲"));
        assert!(text.contains("Online Duration"));
        assert!(text.contains("2 days 03:15:00"));
        assert!(text.contains("[Unblock]"));
        assert!(text.contains("Page 1 of 2"));
    }

    #[test]
    fn renders_empty_message() {
        let mut screen = DevicesScreen::new(5, BlockDurationPolicy::Prompt, Theme::light());
        screen.update(&Action::DevicesUpdated(Arc::new(Vec::new()))).unwrap();
        let text = render_text(&screen);
        assert!(text.contains(EMPTY_MESSAGE));
        assert!(text.contains("Page 1 of 1"));
    }
}
