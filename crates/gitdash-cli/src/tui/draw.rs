use super::*;

impl TuiApp {
    pub(in crate::tui) fn draw(&mut self, frame: &mut Frame) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(LOG_PANEL_HEIGHT),
                Constraint::Length(3),
            ])
            .split(frame.size());

        let summary = state_summary(&self.rows);
        let header_text = if summary.is_empty() {
            self.root.display().to_string()
        } else {
            format!("{}  |  {summary}", self.root.display())
        };
        let header =
            Paragraph::new(header_text).block(Block::default().borders(Borders::ALL).title("gitdash"));
        frame.render_widget(header, layout[0]);

        match self.view {
            View::Repos => self.draw_repos(frame, layout[1]),
            View::BaseDir => self.draw_form(frame, layout[1], "Base Directory"),
            View::Credentials => self.draw_form(frame, layout[1], "Origin Credential"),
        }

        self.draw_log_panel(frame, layout[2]);

        let footer = Paragraph::new(vec![Line::from(Span::raw(self.message.as_str()))])
            .block(Block::default().borders(Borders::ALL).title(help_text(self.view)));
        frame.render_widget(footer, layout[3]);
    }

    fn draw_repos(&mut self, frame: &mut Frame, area: Rect) {
        let title = if self.scanning {
            format!("Repositories ({}) scanning...", self.rows.len())
        } else {
            format!("Repositories ({})", self.rows.len())
        };
        let block = Block::default().borders(Borders::ALL).title(title);

        if self.rows.is_empty() {
            let text = if self.scanning {
                "Scanning..."
            } else {
                "No repositories found. Press b to choose a base directory."
            };
            frame.render_widget(Paragraph::new(text).block(block), area);
            return;
        }

        let height = area.height.saturating_sub(2) as usize;
        self.scroll = adjust_scroll(self.selected, self.scroll, height, self.rows.len());
        let items: Vec<ListItem> = self
            .rows
            .iter()
            .enumerate()
            .skip(self.scroll)
            .take(height)
            .map(|(index, row)| {
                let (label, style) = state_display(row.state);
                let mut spans = vec![
                    Span::styled(format!("{label:<10}"), style),
                    Span::raw(format!(" {}", display_name(&row.path, &self.root))),
                ];
                if !row.message.is_empty() {
                    spans.push(Span::styled(
                        format!("  {}", row.message),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                let line = Line::from(spans);
                if index == self.selected {
                    ListItem::new(line).style(Style::default().add_modifier(Modifier::REVERSED))
                } else {
                    ListItem::new(line)
                }
            })
            .collect();
        frame.render_widget(List::new(items).block(block), area);
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect, title: &str) {
        let mut lines = Vec::new();
        for (index, field) in self.input_fields.iter().enumerate() {
            let marker = if index == self.input_index { ">" } else { " " };
            let style = if index == self.input_index {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(
                format!("{marker} {}: {}", field.label, field.display_value()),
                style,
            )));
        }
        let widget = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(title.to_string()));
        frame.render_widget(widget, area);
    }

    fn draw_log_panel(&self, frame: &mut Frame, area: Rect) {
        let max_lines = area.height.saturating_sub(LOG_PANEL_BORDER_HEIGHT) as usize;
        if max_lines == 0 {
            return;
        }
        let entries = self.log_buffer.tail(max_lines);
        let lines: Vec<Line> = if entries.is_empty() {
            vec![Line::from(Span::raw("No log messages yet."))]
        } else {
            entries
                .iter()
                .map(|entry| {
                    let style = if entry.level == tracing::Level::ERROR {
                        Style::default().fg(Color::Red)
                    } else if entry.level == tracing::Level::WARN {
                        Style::default().fg(Color::Yellow)
                    } else {
                        Style::default()
                    };
                    Line::from(Span::styled(entry.format_compact(), style))
                })
                .collect()
        };
        let widget = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Logs"));
        frame.render_widget(widget, area);
    }
}
