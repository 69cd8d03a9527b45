use ratatui::style::Stylize;
use ratatui::style::{Color, Style};

pub fn title_style() -> Style { Style::default().fg(Color::Cyan).bold() }
pub fn hint_style() -> Style { Style::default().fg(Color::DarkGray) }
pub fn selected_style() -> Style { Style::default().fg(Color::Yellow).bold() }
pub fn footer_style() -> Style { Style::default().fg(Color::Gray) }
pub fn notice_style() -> Style { Style::default().fg(Color::White).bg(Color::Red) }
pub fn wrong_style() -> Style { Style::default().fg(Color::Red).bold() }
pub fn gauge_style() -> Style { Style::default().fg(Color::Green).bg(Color::Black) }
