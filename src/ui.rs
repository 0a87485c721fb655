use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, TableState},
};

use crate::domain::{DashConfig, HELP_TEXT};
use crate::model::{Model, UiData};
use crate::pipeline::Field;
use crate::record::{Plan, Status};

pub struct TableUi {
    config: DashConfig,
}

impl TableUi {
    pub fn new(config: &DashConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn draw(&self, model: &Model, frame: &mut Frame) {
        let data = model.uidata();
        let [title_area, search_area, table_area, footer_area, status_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        frame.render_widget(Paragraph::new(title_line(data)), title_area);
        frame.render_widget(Paragraph::new(search_line(data)), search_area);
        self.draw_table(data, frame, table_area);
        self.draw_footer(data, frame, footer_area);
        frame.render_widget(Paragraph::new(self.status_line(data)), status_area);

        if data.show_help {
            let area = popup_area(frame.area(), 60, 90);
            frame.render_widget(Clear, area);
            frame.render_widget(
                Paragraph::new(HELP_TEXT).block(Block::bordered().title(" Help ")),
                area,
            );
        }
    }

    fn draw_table(&self, data: &UiData, frame: &mut Frame, area: Rect) {
        let rows: Vec<Row> = data
            .rows
            .iter()
            .map(|r| {
                Row::new(vec![
                    Cell::from(r.name.clone()),
                    Cell::from(r.email.clone()),
                    badge(r.plan.label(), plan_color(r.plan)),
                    badge(r.status.label(), status_color(r.status)),
                    Cell::from(r.signup.clone()),
                    Cell::from(Text::from(r.spend.clone()).right_aligned()),
                ])
            })
            .collect();

        let widths = [
            Constraint::Min(16),
            Constraint::Min(22),
            Constraint::Length(10),
            Constraint::Length(9),
            Constraint::Length(13),
            Constraint::Length(12),
        ];

        let table = Table::new(rows, widths)
            .header(header_row(data))
            .block(Block::bordered().title(Line::from(format!(" {} ", data.title)).bold()))
            .row_highlight_style(Style::new().add_modifier(Modifier::REVERSED))
            .column_spacing(1);

        let mut state = TableState::default();
        state.select(data.selected_row);
        frame.render_stateful_widget(table, area, &mut state);

        if data.rows.is_empty() && area.height > 4 && area.width > 6 {
            let empty_line = Rect::new(area.x + 2, area.y + 3, area.width - 4, 1);
            frame.render_widget(
                Paragraph::new("No customers match the search.")
                    .style(Style::new().dim())
                    .centered(),
                empty_line,
            );
        }
    }

    fn draw_footer(&self, data: &UiData, frame: &mut Frame, area: Rect) {
        let [left, right] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(area);

        let showing = format!(" Showing {} of {}", data.rows.len(), data.filtered);
        frame.render_widget(Paragraph::new(showing), left);

        let step_style = |enabled: bool| {
            if enabled {
                Style::new()
            } else {
                Style::new().dim()
            }
        };
        let pager = Line::from(vec![
            Span::styled("p Prev", step_style(data.has_prev)),
            Span::raw(format!("  Page {} of {}", data.page, data.total_pages)),
            Span::raw(format!("  {}/page  ", data.page_size)),
            Span::styled("n Next ", step_style(data.has_next)),
        ]);
        frame.render_widget(Paragraph::new(pager).right_aligned(), right);
    }

    fn status_line(&self, data: &UiData) -> Line<'static> {
        let ttl = Duration::from_millis(self.config.status_ttl_ms);
        if !data.status_message.is_empty() && data.status_at.elapsed() < ttl {
            Line::from(Span::styled(
                format!(" {}", data.status_message),
                Style::new().fg(Color::Yellow),
            ))
        } else {
            Line::from(Span::styled(
                " q quit  / search  s sort  n/p page  +/- size  y copy  ? help",
                Style::new().dim(),
            ))
        }
    }
}

fn title_line(data: &UiData) -> Line<'static> {
    Line::from(vec![
        Span::styled(" custdash ", Style::new().bold().reversed()),
        Span::raw(" "),
        Span::styled(data.title.clone(), Style::new().bold()),
        Span::styled(format!("  {} accounts", data.total), Style::new().dim()),
    ])
}

fn search_line(data: &UiData) -> Line<'static> {
    let mut spans = vec![Span::styled(" Search: ", Style::new().bold())];
    if data.editing {
        let chars: Vec<char> = data.query.chars().collect();
        let pos = std::cmp::min(data.cursor_pos, chars.len());
        let before: String = chars[..pos].iter().collect();
        let under: String = chars
            .get(pos)
            .map(|c| c.to_string())
            .unwrap_or_else(|| " ".to_string());
        let after: String = chars
            .get(pos + 1..)
            .map(|rest| rest.iter().collect())
            .unwrap_or_default();
        spans.push(Span::raw(before));
        spans.push(Span::styled(under, Style::new().add_modifier(Modifier::REVERSED)));
        spans.push(Span::raw(after));
    } else if data.query.is_empty() {
        spans.push(Span::styled(
            "press / to search name, email, plan, status",
            Style::new().dim(),
        ));
    } else {
        spans.push(Span::raw(data.query.clone()));
    }
    Line::from(spans)
}

fn header_row(data: &UiData) -> Row<'static> {
    let cells: Vec<Cell> = Field::ALL
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let mut label = field.title().to_string();
            let mut style = Style::new().bold();
            if *field == data.sort_key {
                label.push(' ');
                label.push_str(data.sort_dir.arrow());
                style = style.fg(Color::Cyan);
            }
            if i == data.selected_col {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            Cell::from(Span::styled(label, style))
        })
        .collect();
    Row::new(cells)
}

fn badge(label: &'static str, color: Color) -> Cell<'static> {
    Cell::from(Span::styled(label, Style::new().fg(color).bold()))
}

fn plan_color(plan: Plan) -> Color {
    match plan {
        Plan::Business => Color::Magenta,
        Plan::Pro => Color::Green,
        Plan::Free => Color::Gray,
    }
}

fn status_color(status: Status) -> Color {
    match status {
        Status::Active => Color::Green,
        Status::Trial => Color::Yellow,
        Status::Churned => Color::Red,
    }
}

fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [area] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(area);
    area
}
