use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::Marker,
    text::{Line, Span, Text},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Cell, Chart, Clear, Dataset, GraphType, Paragraph,
        Row, Table, Tabs, Wrap,
    },
};

use crate::charts::ChartSet;
use crate::domain::DashConfig;
use crate::explorer::{Overview, STAT_LABELS};
use crate::indicators::Indicators;
use crate::model::{Model, UIData};
use crate::navigation::{Mode, View};
use crate::table::{EchoColumn, TableEcho};

pub const TABS_HEIGHT: usize = 3;
pub const STATUSLINE_HEIGHT: usize = 1;
// Block borders plus the table header row
pub const BODY_CHROME_HEIGHT: usize = 3;
pub const COLUMN_WIDTH_MARGIN: usize = 1;

const INDEX_COLOR: Color = Color::DarkGray;
const STATUS_MESSAGE_FADE: Duration = Duration::from_secs(5);
const HEADER_STYLE: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);

#[derive(Debug)]
pub struct TableUI {
    max_column_width: usize,
}

impl TableUI {
    pub fn new(cfg: &DashConfig) -> Self {
        Self {
            max_column_width: cfg.max_column_width,
        }
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();
        let [tabs_area, body_area, status_area] = Layout::vertical([
            Constraint::Length(TABS_HEIGHT as u16),
            Constraint::Min(0),
            Constraint::Length(STATUSLINE_HEIGHT as u16),
        ])
        .areas(frame.area());

        Self::render_tabs(frame, uidata.mode, tabs_area);

        let block =
            Block::bordered().title(Line::from(format!(" {} ", uidata.mode.header())).bold());
        match model.view() {
            View::Warning(message) => {
                let warning = Paragraph::new(message.as_str())
                    .style(Style::default().fg(Color::LightRed))
                    .wrap(Wrap { trim: true })
                    .block(block);
                frame.render_widget(warning, body_area);
            }
            View::Load(None) => {
                let text = Text::from(vec![
                    Line::from("Elige un archivo CSV"),
                    Line::from(vec![
                        "Presiona ".into(),
                        "<o>".blue().bold(),
                        " e introduce la ruta del archivo.".into(),
                    ]),
                ]);
                frame.render_widget(Paragraph::new(text).block(block), body_area);
            }
            View::Load(Some(echo)) => self.render_echo(frame, echo, &uidata, block, body_area),
            View::Explore(overview) => self.render_overview(frame, overview, block, body_area),
            View::Indicators(indicators) => {
                Self::render_indicators(frame, indicators, block, body_area)
            }
            View::Charts(charts) => Self::render_charts(frame, charts, block, body_area),
        }

        Self::render_statusline(frame, &uidata, status_area);

        if uidata.show_popup {
            Self::render_popup(frame, &uidata.popup_message);
        }
    }

    fn render_tabs(frame: &mut Frame, mode: Mode, area: Rect) {
        let titles = Mode::ALL
            .iter()
            .enumerate()
            .map(|(idx, m)| format!("{} {}", idx + 1, m.label()));
        let tabs = Tabs::new(titles)
            .block(Block::bordered().title(" Dashboard de Ventas de Videojuegos ".bold()))
            .select(mode.index())
            .highlight_style(HEADER_STYLE);
        frame.render_widget(tabs, area);
    }

    fn column_width(&self, column: &EchoColumn) -> u16 {
        (column.max_width.min(self.max_column_width) + COLUMN_WIDTH_MARGIN) as u16
    }

    /// Renders rows `first..first + nrows` of `columns` with a row index.
    fn string_table<'a>(
        &self,
        columns: &'a [EchoColumn],
        first: usize,
        nrows: usize,
        block: Block<'a>,
    ) -> Table<'a> {
        let total = columns.first().map(|c| c.data.len()).unwrap_or(0);
        let last = std::cmp::min(first + nrows, total);
        let index_width = last.to_string().len() as u16 + 1;

        let header = Row::new(
            std::iter::once(Cell::from(""))
                .chain(columns.iter().map(|c| Cell::from(c.name.as_str()))),
        )
        .style(HEADER_STYLE);

        let rows = (first..last).map(|ridx| {
            Row::new(
                std::iter::once(Cell::from((ridx + 1).to_string()).fg(INDEX_COLOR))
                    .chain(columns.iter().map(|c| Cell::from(c.data[ridx].as_str()))),
            )
        });

        let widths = std::iter::once(Constraint::Length(index_width))
            .chain(columns.iter().map(|c| Constraint::Length(self.column_width(c))));

        Table::new(rows, widths).header(header).block(block)
    }

    fn render_echo(
        &self,
        frame: &mut Frame,
        echo: &TableEcho,
        uidata: &UIData,
        block: Block,
        area: Rect,
    ) {
        let block = block.title_bottom(
            Line::from(format!(
                " {} | filas {}-{} de {} ",
                echo.name,
                (uidata.scroll + 1).min(echo.nrows),
                (uidata.scroll + uidata.layout.visible_rows).min(echo.nrows),
                echo.nrows
            ))
            .right_aligned(),
        );
        let table = self.string_table(
            &echo.columns,
            uidata.scroll,
            uidata.layout.visible_rows,
            block,
        );
        frame.render_widget(table, area);
    }

    fn render_overview(&self, frame: &mut Frame, overview: &Overview, block: Block, area: Rect) {
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let preview_height = overview.preview.first().map(|c| c.data.len()).unwrap_or(0) + 3;
        let stats_height = 8 + 3;
        let [shape_area, preview_area, stats_area] = Layout::vertical([
            Constraint::Length(4),
            Constraint::Length(preview_height as u16),
            Constraint::Length(stats_height),
        ])
        .areas(inner);

        let shape = Text::from(vec![
            Line::from(vec![
                "Dimensiones del dataset: ".bold(),
                "Filas: ".into(),
                Span::from(overview.nrows.to_string()).yellow().bold(),
                ", Columnas: ".into(),
                Span::from(overview.ncols.to_string()).yellow().bold(),
            ]),
            Line::from(vec![
                "Nombres de las columnas: ".bold(),
                format!("{:?}", overview.columns).into(),
            ]),
        ]);
        frame.render_widget(Paragraph::new(shape).wrap(Wrap { trim: true }), shape_area);

        let preview = self.string_table(
            &overview.preview,
            0,
            overview.preview.first().map(|c| c.data.len()).unwrap_or(0),
            Block::bordered().title(" Primeras filas "),
        );
        frame.render_widget(preview, preview_area);

        let header = Row::new(
            std::iter::once(Cell::from(""))
                .chain(overview.stats.iter().map(|s| Cell::from(s.name.as_str()))),
        )
        .style(HEADER_STYLE);
        let rows = STAT_LABELS.iter().enumerate().map(|(ridx, label)| {
            Row::new(
                std::iter::once(Cell::from(*label).fg(INDEX_COLOR)).chain(
                    overview
                        .stats
                        .iter()
                        .map(|s| Cell::from(format_stat(label, s.values()[ridx]))),
                ),
            )
        });
        let widths = std::iter::once(Constraint::Length(6)).chain(
            overview
                .stats
                .iter()
                .map(|s| Constraint::Length((s.name.chars().count().max(10) + 1) as u16)),
        );
        let stats = Table::new(rows, widths)
            .header(header)
            .block(Block::bordered().title(" Estadísticas descriptivas "));
        frame.render_widget(stats, stats_area);
    }

    fn render_indicators(frame: &mut Frame, indicators: &Indicators, block: Block, area: Rect) {
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let metrics = indicators.metrics();
        let areas = Layout::vertical(metrics.iter().map(|_| Constraint::Length(4))).split(inner);
        for ((label, value, caption), area) in metrics.into_iter().zip(areas.iter()) {
            let text = Text::from(vec![
                Line::from(Span::from(value).bold().light_green()),
                Line::from(Span::from(caption).dark_gray()),
            ]);
            let metric = Paragraph::new(text).block(Block::bordered().title(format!(" {label} ")));
            frame.render_widget(metric, *area);
        }
    }

    fn render_charts(frame: &mut Frame, charts: &ChartSet, block: Block, area: Rect) {
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [top, bottom] =
            Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(inner);
        let [left, right] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(bottom);

        Self::render_genre_chart(frame, &charts.sales_by_genre, top);
        Self::render_top_na_chart(frame, &charts.top_na_sales, left);
        Self::render_year_chart(frame, &charts.sales_by_year, right);
    }

    fn render_genre_chart(frame: &mut Frame, series: &[(String, f64)], area: Rect) {
        let block = Block::bordered()
            .title(" Ventas Globales por Género ")
            .title_bottom(Line::from(" x: Género | y: Ventas Globales (millones) ").centered());
        let bars: Vec<Bar> = series
            .iter()
            .map(|(genre, sales)| {
                Bar::default()
                    .value(scaled(*sales))
                    .label(Line::from(genre.clone()))
                    .text_value(format!("{sales:.1}"))
            })
            .collect();
        let slots = series.len().max(1) as u16;
        let bar_width = (area.width.saturating_sub(2) / slots).saturating_sub(1).clamp(1, 12);
        let chart = BarChart::default()
            .block(block)
            .data(BarGroup::default().bars(&bars))
            .bar_width(bar_width)
            .bar_gap(1)
            .bar_style(Style::default().fg(Color::Cyan))
            .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));
        frame.render_widget(chart, area);
    }

    fn render_top_na_chart(frame: &mut Frame, series: &[(String, f64)], area: Rect) {
        let block = Block::bordered()
            .title(format!(" Top {} Juegos por Ventas en Norteamérica ", series.len()))
            .title_bottom(Line::from(" Ventas NA (millones) ").centered());
        let bars: Vec<Bar> = series
            .iter()
            .map(|(name, sales)| {
                Bar::default()
                    .value(scaled(*sales))
                    .label(Line::from(name.clone()))
                    .text_value(format!("{sales:.2}"))
            })
            .collect();
        let chart = BarChart::default()
            .block(block)
            .direction(Direction::Horizontal)
            .data(BarGroup::default().bars(&bars))
            .bar_width(1)
            .bar_gap(0)
            .bar_style(Style::default().fg(Color::Magenta))
            .value_style(Style::default().fg(Color::Black).bg(Color::Magenta));
        frame.render_widget(chart, area);
    }

    fn render_year_chart(frame: &mut Frame, series: &[(i64, f64)], area: Rect) {
        let block = Block::bordered().title(" Evolución de Ventas Globales por Año ");
        if series.is_empty() {
            frame.render_widget(Paragraph::new("Sin datos").block(block), area);
            return;
        }

        let points: Vec<(f64, f64)> = series.iter().map(|(y, s)| (*y as f64, *s)).collect();
        let x_min = points.first().map(|(x, _)| *x).unwrap_or(0.0);
        let mut x_max = points.last().map(|(x, _)| *x).unwrap_or(x_min + 1.0);
        if (x_max - x_min).abs() < f64::EPSILON {
            x_max = x_min + 1.0;
        }
        let y_max = points.iter().map(|(_, y)| *y).fold(0.0, f64::max).max(1.0) * 1.1;

        let chart = Chart::new(vec![
            Dataset::default()
                .name("Ventas")
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::LightGreen))
                .data(&points),
            Dataset::default()
                .marker(Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(Color::Yellow))
                .data(&points),
        ])
        .block(block)
        .x_axis(
            Axis::default()
                .title("Año")
                .bounds([x_min, x_max])
                .labels(vec![
                    format!("{x_min:.0}"),
                    format!("{:.0}", (x_min + x_max) / 2.0),
                    format!("{x_max:.0}"),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("Ventas Globales (millones)")
                .bounds([0.0, y_max])
                .labels(vec![
                    "0".to_string(),
                    format!("{:.0}", y_max / 2.0),
                    format!("{y_max:.0}"),
                ]),
        );
        frame.render_widget(chart, area);
    }

    fn render_statusline(frame: &mut Frame, uidata: &UIData, area: Rect) {
        if uidata.active_cmdinput {
            let prompt = "Abrir archivo: ";
            let line = Line::from(vec![
                Span::styled(prompt, HEADER_STYLE),
                Span::raw(uidata.cmdinput.input.as_str()),
            ]);
            frame.render_widget(Paragraph::new(line), area);
            let x = area.x + (prompt.chars().count() + uidata.cmdinput.cursor_pos) as u16;
            frame.set_cursor_position((x.min(area.right().saturating_sub(1)), area.y));
        } else {
            let line = Line::from(vec![
                Span::styled(
                    uidata.status_message.as_str(),
                    status_style(uidata.last_status_message_update.elapsed()),
                ),
                Span::raw("  "),
                "<?> ayuda <q> salir".dark_gray(),
            ]);
            frame.render_widget(Paragraph::new(line), area);
        }
    }

    fn render_popup(frame: &mut Frame, message: &str) {
        let area = centered_rect(60, 60, frame.area());
        let popup = Paragraph::new(message)
            .block(Block::bordered().title(" Ayuda ".bold()))
            .wrap(Wrap { trim: false });
        frame.render_widget(Clear, area);
        frame.render_widget(popup, area);
    }
}

/// Bars only take integers, keep two decimals of the sales figures.
fn scaled(sales: f64) -> u64 {
    (sales.max(0.0) * 100.0).round() as u64
}

// Older status messages fade out.
fn status_style(age: Duration) -> Style {
    if age > STATUS_MESSAGE_FADE {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    }
}

fn format_stat(label: &str, value: Option<f64>) -> String {
    match value {
        Some(v) if label == "count" => format!("{v:.0}"),
        Some(v) => format!("{v:.2}"),
        None => "NaN".to_string(),
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(area);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(middle);
    center
}
