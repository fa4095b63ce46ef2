//! Login form: username/password inputs with a masked password and inline error.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::ui::theme;
use crate::ui::util::centered;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Username,
    Password,
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub focus: LoginField,
    pub error: Option<String>,
    pub pending: bool,
}

impl LoginForm {
    pub fn with_username(username: Option<String>) -> Self {
        let focus = if username.is_some() {
            LoginField::Password
        } else {
            LoginField::Username
        };
        Self {
            username: username.unwrap_or_default(),
            focus,
            ..Self::default()
        }
    }

    /// Forget the password and any in-flight state, keep the username.
    pub fn reset(&mut self) {
        self.password.clear();
        self.pending = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginAction {
    None,
    Submit,
}

pub fn login_handle_key(form: &mut LoginForm, key: KeyEvent) -> LoginAction {
    if form.pending {
        return LoginAction::None;
    }
    match key.code {
        KeyCode::Tab | KeyCode::Down | KeyCode::Up | KeyCode::BackTab => {
            form.focus = match form.focus {
                LoginField::Username => LoginField::Password,
                LoginField::Password => LoginField::Username,
            };
        }
        KeyCode::Enter => {
            if form.focus == LoginField::Username && form.password.is_empty() {
                form.focus = LoginField::Password;
            } else if !form.username.is_empty() {
                return LoginAction::Submit;
            }
        }
        KeyCode::Backspace => {
            match form.focus {
                LoginField::Username => form.username.pop(),
                LoginField::Password => form.password.pop(),
            };
        }
        KeyCode::Char(c) => {
            form.error = None;
            match form.focus {
                LoginField::Username => form.username.push(c),
                LoginField::Password => form.password.push(c),
            }
        }
        _ => {}
    }
    LoginAction::None
}

pub fn draw_login(f: &mut ratatui::Frame<'_>, area: Rect, form: &LoginForm, server: &str) {
    let popup = centered(area, 50, 40);
    f.render_widget(Clear, popup);
    f.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::BORDER))
            .title(format!("siemtop — sign in to {server}")),
        popup,
    );

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(popup);

    let field = |title: &'static str, value: String, focused: bool| {
        let style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(theme::BORDER)
        };
        Paragraph::new(value).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(style)
                .title(title),
        )
    };

    let cursor = |focused: bool| if focused { "▏" } else { "" };
    let user_focused = form.focus == LoginField::Username;
    f.render_widget(
        field(
            "Username",
            format!("{}{}", form.username, cursor(user_focused)),
            user_focused,
        ),
        rows[0],
    );
    f.render_widget(
        field(
            "Password",
            format!("{}{}", "•".repeat(form.password.chars().count()), cursor(!user_focused)),
            !user_focused,
        ),
        rows[1],
    );

    let status = if form.pending {
        Line::from(Span::styled("Signing in...", Style::default().fg(theme::MUTED)))
    } else if let Some(err) = &form.error {
        Line::from(Span::styled(
            err.clone(),
            Style::default().fg(theme::DANGER).add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(Span::styled(
            "Enter to sign in, Tab to switch field, Ctrl-C to quit",
            Style::default().fg(theme::MUTED),
        ))
    };
    f.render_widget(Paragraph::new(status), rows[2]);
}
