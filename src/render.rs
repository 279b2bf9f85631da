//! Clicker screen rendering. Reads derived values from the engine and
//! registers a click target for every actionable row.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use rebirth_clicker::{format_number, Clock, Storage, UpgradeKind};

use crate::app::{App, InputMode};
use crate::click::{is_narrow_layout, ClickState};

pub fn render<S: Storage, C: Clock>(
    f: &mut Frame,
    app: &App<S, C>,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let size = f.area();
    {
        let mut cs = click_state.borrow_mut();
        cs.terminal_cols = size.width;
        cs.terminal_rows = size.height;
        cs.clear_targets();
    }

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(size);

    render_title(f, main_chunks[0]);

    if is_narrow_layout(size.width) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(8),
                Constraint::Length(6),
                Constraint::Min(3),
            ])
            .split(main_chunks[1]);
        render_stats(f, app, chunks[0], click_state);
        render_actions(f, app, chunks[1], click_state);
        render_log(f, app, chunks[2]);
    } else {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(main_chunks[1]);
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Min(6)])
            .split(columns[0]);
        render_stats(f, app, left[0], click_state);
        render_actions(f, app, left[1], click_state);
        render_log(f, app, columns[1]);
    }

    render_help(f, app, main_chunks[2], click_state);
}

fn render_title(f: &mut Frame, area: Rect) {
    let title = Paragraph::new(Line::from(Span::styled(
        "Rebirth Clicker",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    )
    .alignment(Alignment::Center);
    f.render_widget(title, area);
}

/// Score and rates. The whole panel is the big click button.
fn render_stats<S: Storage, C: Clock>(
    f: &mut Frame,
    app: &App<S, C>,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let engine = &app.engine;
    let state = engine.state();
    let label = Style::default().fg(Color::Gray);
    let value = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);

    let lines = vec![
        Line::from(vec![
            Span::styled(" スコア: ", label),
            Span::styled(
                format_number(state.score),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled(" クリック: ", label),
            Span::styled(format!("+{}", format_number(engine.total_per_click())), value),
            Span::styled("   毎秒: ", label),
            Span::styled(format!("+{}", format_number(engine.auto_rate_per_second())), value),
        ]),
        Line::from(vec![
            Span::styled(" 転生: ", label),
            Span::styled(
                format!("{} x{}", state.rebirths, format_number(state.multiplier)),
                value,
            ),
        ]),
        Line::from(vec![
            Span::styled(" ブースト: ", label),
            Span::styled(
                format!(
                    "クリック x{}  オート x{}",
                    format_number(state.permanent_click_boost),
                    format_number(state.permanent_auto_boost)
                ),
                Style::default().fg(Color::Magenta),
            ),
        ]),
        Line::from(Span::styled(
            " ▶ ここをタップしてクリック",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green))
                .title(" [C] クリック "),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);

    if app.input_mode == InputMode::Play {
        click_state
            .borrow_mut()
            .add_area_target(area.y, area.height, 'c');
    }
}

/// Upgrades, rebirth, code entry and reset, one row each.
fn render_actions<S: Storage, C: Clock>(
    f: &mut Frame,
    app: &App<S, C>,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let engine = &app.engine;
    let state = engine.state();
    let key_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let enabled = Style::default().fg(Color::White);
    let disabled = Style::default().fg(Color::DarkGray);

    let mut rows: Vec<(char, Line)> = Vec::new();

    for (i, kind) in UpgradeKind::all().iter().enumerate() {
        let key = char::from(b'1' + i as u8);
        let upgrade = state.upgrade(*kind);
        let effect = match kind {
            UpgradeKind::Power => format!("クリック +{}", format_number(upgrade.add)),
            UpgradeKind::Auto => format!("毎秒 +{}", format_number(upgrade.add)),
        };
        let style = if engine.can_afford(*kind) { enabled } else { disabled };
        rows.push((
            key,
            Line::from(vec![
                Span::styled(format!(" [{}] ", key), key_style),
                Span::styled(
                    format!(
                        "{} Lv{} ({}) 費用 {}",
                        kind.name(),
                        upgrade.level,
                        effect,
                        format_number(engine.upgrade_cost(*kind))
                    ),
                    style,
                ),
            ]),
        ));
    }

    let rebirth_style = if engine.can_rebirth() { enabled } else { disabled };
    rows.push((
        'r',
        Line::from(vec![
            Span::styled(" [R] ", key_style),
            Span::styled(
                format!("転生 (必要 {})", format_number(engine.rebirth_requirement())),
                rebirth_style,
            ),
        ]),
    ));

    let code_text = if app.input_mode == InputMode::EnterCode {
        format!("コード: {}_", app.code_buffer)
    } else {
        "コードを入力".to_string()
    };
    rows.push((
        'g',
        Line::from(vec![
            Span::styled(" [G] ", key_style),
            Span::styled(code_text, Style::default().fg(Color::Magenta)),
        ]),
    ));
    rows.push((
        'x',
        Line::from(vec![
            Span::styled(" [X] ", key_style),
            Span::styled("リセット", Style::default().fg(Color::Red)),
        ]),
    ));

    let items: Vec<ListItem> = rows
        .iter()
        .map(|(_, line)| ListItem::new(line.clone()))
        .collect();
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" ▶ アクション（タップで選択） "),
    );
    f.render_widget(list, area);

    if app.input_mode == InputMode::Play {
        // Each row starts at area.y + 1 (border)
        let mut cs = click_state.borrow_mut();
        let last_row = area.y + area.height.saturating_sub(1);
        for (i, (key, _)) in rows.iter().enumerate() {
            let row = area.y + 1 + i as u16;
            if row < last_row {
                cs.add_target(row, *key);
            }
        }
    }
}

fn render_log<S: Storage, C: Clock>(f: &mut Frame, app: &App<S, C>, area: Rect) {
    let visible_height = area.height.saturating_sub(2) as usize;
    let start = app.log.len().saturating_sub(visible_height);

    let log_lines: Vec<Line> = app.log[start..]
        .iter()
        .map(|entry| {
            let style = if entry.is_important {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(Span::styled(entry.text.as_str(), style))
        })
        .collect();

    let widget = Paragraph::new(log_lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue))
                .title(" ログ "),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

/// Context help. In confirm modes the bar itself is the "yes" button.
fn render_help<S: Storage, C: Clock>(
    f: &mut Frame,
    app: &App<S, C>,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let (text, key) = match app.input_mode {
        InputMode::Play => ("[Space] クリック  [1][2] 購入  [R] 転生  [G] コード", None),
        InputMode::EnterCode => ("[Enter] 決定  [Esc] キャンセル", None),
        InputMode::ConfirmRebirth => ("[Y] 転生する  [N] やめる（ここをタップで実行）", Some('y')),
        InputMode::ConfirmReset => ("[Y] リセットする  [N] やめる（ここをタップで実行）", Some('y')),
    };
    let help = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(Color::DarkGray),
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    )
    .alignment(Alignment::Center);
    f.render_widget(help, area);

    if let Some(key) = key {
        click_state
            .borrow_mut()
            .add_area_target(area.y, area.height, key);
    }
}
