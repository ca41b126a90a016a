use ecospotter_core::profile::{NO_SUBMISSIONS_NOTICE, PROFILE_NOT_FOUND};
use ecospotter_core::store::{Tree, TreeStatus};
use ecospotter_core::ChatRole;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::app::{App, FormField, Screen};

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, tabs, body, footer
    let [header_area, tabs_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_tabs(app, frame, tabs_area);

    match app.screen {
        Screen::Trees => render_trees_screen(app, frame, body_area),
        Screen::Submit => render_submit_screen(app, frame, body_area),
        Screen::Community => render_community_screen(app, frame, body_area),
        Screen::Chat => render_chat_screen(app, frame, body_area),
        Screen::Profile => render_profile_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let user = match app.identity.user() {
        Some(user) => format!(
            " [{}] {} · {} pkt ",
            user.initials(),
            user.display_name,
            user.points
        ),
        None => " niezalogowany ".to_string(),
    };

    let title = Line::from(vec![
        Span::styled(" EcoSpotter ", Style::default().fg(Color::Green).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
        Span::raw(" "),
        Span::styled(user, Style::default().fg(Color::White)),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_tabs(app: &App, frame: &mut Frame, area: Rect) {
    let mut screens = Screen::all().to_vec();
    if app.screen == Screen::Profile {
        screens.push(Screen::Profile);
    }
    let selected = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
    let tabs = Tabs::new(screens.iter().map(|s| s.title()))
        .select(selected)
        .highlight_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        .divider("|");
    frame.render_widget(tabs, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    if let Some(status) = &app.status {
        let notice = Paragraph::new(Span::styled(
            format!(" {} ", status),
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ));
        frame.render_widget(notice, area);
        return;
    }

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let keys: &[(&str, &str)] = match app.screen {
        Screen::Trees => &[
            ("j/k", "nav"),
            ("m", "moje"),
            ("L", "zaloguj/wyloguj"),
            ("p/P", "profil"),
            ("a", "asystent"),
            ("Tab", "ekran"),
            ("q", "wyjdź"),
        ],
        Screen::Submit => &[
            ("↑/↓", "pole"),
            ("Enter", "dalej"),
            ("Ctrl+A", "rozpoznaj"),
            ("Ctrl+S", "wyślij"),
            ("Tab", "ekran"),
        ],
        Screen::Community => &[
            ("j/k", "nav"),
            ("u", "za"),
            ("d", "przeciw"),
            ("Tab", "ekran"),
            ("q", "wyjdź"),
        ],
        Screen::Profile => &[
            ("j/k", "nav"),
            ("c", "komentarze"),
            ("r", "zgłoś"),
            ("Esc", "wróć"),
            ("q", "wyjdź"),
        ],
        Screen::Chat => &[
            ("Enter", "wyślij"),
            ("PgUp/PgDn", "przewiń"),
            ("Esc", "wróć"),
            ("Ctrl+C", "wyjdź"),
        ],
    };

    let mut hints = Vec::with_capacity(keys.len() * 2);
    for (key, label) in keys {
        hints.push(Span::styled(format!(" {} ", key), key_style));
        hints.push(Span::styled(format!(" {} ", label), label_style));
    }
    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}

fn render_trees_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [list_area, detail_area] =
        Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)]).areas(area);

    let title = if app.mine_only {
        format!(" Moje drzewa ({}) ", app.trees.len())
    } else {
        format!(" Wszystkie drzewa ({}) ", app.trees.len())
    };

    let items: Vec<ListItem> = app.trees.iter().map(tree_item).collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, list_area, &mut app.tree_state);

    let detail = match app.selected_tree() {
        Some(tree) => {
            let mut lines = vec![
                Line::from(Span::styled(tree.species.clone(), Style::default().bold())),
                Line::default(),
                Line::from(format!("Średnica: {} cm", tree.diameter)),
                Line::from(format!("Status: {}", tree.status.label())),
                Line::from(format!(
                    "Położenie: {:.5}, {:.5}",
                    tree.location.lat, tree.location.lng
                )),
                Line::from(format!("Zgłoszone przez: {}", app.display_name(&tree.submitted_by))),
                Line::from(format!("Dodano: {}", tree.created_at.format("%Y-%m-%d"))),
            ];
            if tree.is_monument {
                lines.push(Line::from(Span::styled(
                    "Pomnik przyrody",
                    Style::default().fg(Color::Magenta),
                )));
            }
            lines.push(Line::default());
            lines.push(Line::from(tree.description.clone()));
            Text::from(lines)
        }
        None => Text::from(Span::styled(
            "Brak drzew do wyświetlenia.",
            Style::default().fg(Color::DarkGray),
        )),
    };

    let detail = Paragraph::new(detail)
        .block(Block::default().borders(Borders::ALL).title(" Szczegóły "))
        .wrap(Wrap { trim: true });
    frame.render_widget(detail, detail_area);
}

fn tree_item(tree: &Tree) -> ListItem<'static> {
    let status_color = match tree.status {
        TreeStatus::Verified => Color::Green,
        TreeStatus::Pending => Color::Yellow,
    };
    let mut spans = vec![
        Span::raw(tree.species.clone()),
        Span::styled(
            format!(" {} cm", tree.diameter),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(" "),
        Span::styled(tree.status.label(), Style::default().fg(status_color)),
    ];
    if tree.is_monument {
        spans.push(Span::styled(" ★", Style::default().fg(Color::Magenta)));
    }
    ListItem::new(Line::from(spans))
}

fn render_submit_screen(app: &App, frame: &mut Frame, area: Rect) {
    let [form_area, assist_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(6)]).areas(area);

    let mut lines = Vec::new();
    for field in FormField::all() {
        let focused = field == app.form_field;
        let value = match field {
            FormField::Photo => {
                let loaded = if app.form.photo_data_uri.is_some() { " ✓" } else { "" };
                format!("{}{}", app.photo_path, loaded)
            }
            FormField::Species => app.form.species.clone(),
            FormField::Diameter => app.diameter_input.clone(),
            FormField::Description => app.form.description.clone(),
            FormField::Monument => {
                if app.form.is_monument { "[x]" } else { "[ ]" }.to_string()
            }
        };
        let label_style = if focused {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let cursor = if focused && field != FormField::Monument { "▏" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(format!("{:<20}", field.label()), label_style),
            Span::raw(value),
            Span::styled(cursor, Style::default().fg(Color::Green)),
        ]));
        lines.push(Line::default());
    }
    lines.push(Line::from(Span::styled(
        format!(
            "Lokalizacja: {:.5}, {:.5}",
            app.form.location.lat, app.form.location.lng
        ),
        Style::default().fg(Color::DarkGray),
    )));

    let form = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(" Zgłoś nowe drzewo "))
        .wrap(Wrap { trim: false });
    frame.render_widget(form, form_area);

    let assist_text = if app.assist_task.is_some() {
        Text::from(thinking_line(app.animation_frame))
    } else if let Some(characteristics) = &app.characteristics {
        Text::from(characteristics.as_str())
    } else {
        Text::from(Span::styled(
            "Wybierz zdjęcie i naciśnij Ctrl+A, aby rozpoznać gatunek.",
            Style::default().fg(Color::DarkGray),
        ))
    };
    let assist = Paragraph::new(assist_text)
        .block(Block::default().borders(Borders::ALL).title(" Asystent AI "))
        .wrap(Wrap { trim: true });
    frame.render_widget(assist, assist_area);
}

fn render_community_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = app
        .moderation
        .submissions()
        .iter()
        .map(|submission| {
            ListItem::new(Line::from(vec![
                Span::styled(submission.species.clone(), Style::default().bold()),
                Span::styled(
                    format!(" od {}", submission.submitted_by),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!("  ▲ {}", submission.upvotes),
                    Style::default().fg(Color::Green),
                ),
                Span::styled(
                    format!("  ▼ {}", submission.downvotes),
                    Style::default().fg(Color::Red),
                ),
            ]))
        })
        .collect();

    let title = format!(" Do weryfikacji ({}) ", items.len());
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, &mut app.moderation_state);
}

fn render_profile_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let can_report = app.can_report_profile();
    let Some(profile) = &app.profile else {
        let missing = Paragraph::new(Text::from(vec![
            Line::from(Span::styled(PROFILE_NOT_FOUND, Style::default().bold())),
            Line::from(Span::styled(
                "Żądany użytkownik nie istnieje.",
                Style::default().fg(Color::DarkGray),
            )),
        ]))
        .block(Block::default().borders(Borders::ALL).title(" Profil "));
        frame.render_widget(missing, area);
        return;
    };

    let [card_area, trees_area] =
        Layout::vertical([Constraint::Length(5), Constraint::Min(0)]).areas(area);

    let user = &profile.user;
    let card = Paragraph::new(Text::from(vec![
        Line::from(vec![
            Span::styled(format!("[{}] ", user.initials()), Style::default().fg(Color::Green)),
            Span::styled(user.display_name.clone(), Style::default().bold()),
        ]),
        Line::from(Span::styled(user.email.clone(), Style::default().fg(Color::DarkGray))),
        Line::from(format!(
            "{} Punktów · {} Zgłoszonych drzew",
            user.points,
            profile.submitted_count()
        )),
    ]))
    .block(Block::default().borders(Borders::ALL).title(" Profil "));
    frame.render_widget(card, card_area);

    let title = format!(" Zgłoszenia użytkownika {} ", user.display_name);
    if profile.trees.is_empty() {
        let empty = Paragraph::new(Span::styled(
            NO_SUBMISSIONS_NOTICE,
            Style::default().fg(Color::DarkGray),
        ))
        .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(empty, trees_area);
        return;
    }

    let items: Vec<ListItem> = profile.trees.iter().map(tree_item).collect();
    let title = if can_report {
        title
    } else {
        format!("{}(zgłaszanie niedostępne) ", title)
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, trees_area, &mut app.profile_state);
}

fn thinking_line(frame: u8) -> Line<'static> {
    // Animated ellipsis: cycles through ".", "..", "..."
    let dots = ".".repeat(frame as usize + 1);
    Line::from(Span::styled(
        format!("Myślę{}", dots),
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    ))
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(area);

    let context_path = app.route_context().current_path.unwrap_or_default();

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(format!(
            " {} ({}): {} · {} · limit {} s ",
            app.provider.display_name(),
            app.assistant.provider_name(),
            app.model_name,
            context_path,
            app.assistant.guard().deadline().as_secs()
        ));

    let mut lines: Vec<Line> = Vec::new();
    if app.conversation.transcript().is_empty() && !app.conversation.is_pending() {
        lines.push(Line::from(Span::styled(
            "Zapytaj o drzewa lub ekologię. Napisz \"znajdź drzewa\", aby poszukać drzew w okolicy.",
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(Span::styled(
            format!("Domyślna lokalizacja: {}", app.default_location),
            Style::default().fg(Color::DarkGray),
        )));
    }
    for message in app.conversation.transcript() {
        let (label, color) = match message.sender {
            ChatRole::User => ("Ty:", Color::Cyan),
            ChatRole::Assistant => ("AI:", Color::Yellow),
        };
        lines.push(Line::from(Span::styled(
            label,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        for line in message.text.lines() {
            lines.push(Line::from(line.to_string()));
        }
        lines.push(Line::default());
    }
    if app.conversation.is_pending() {
        lines.push(Line::from(Span::styled(
            "AI:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        lines.push(thinking_line(app.animation_frame));
    }

    // Clamp scroll so "bottom" stays at the last line after wrapping.
    let width = chat_area.width.saturating_sub(2).max(1) as usize;
    let height = chat_area.height.saturating_sub(2);
    let wrapped: usize = lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(width))
        .sum();
    let max_scroll = (wrapped as u16).saturating_sub(height);
    app.chat_scroll = app.chat_scroll.min(max_scroll);

    let chat = Paragraph::new(Text::from(lines))
        .block(chat_block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, chat_area);

    let input_style = if app.conversation.is_pending() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White)
    };
    let input = Paragraph::new(Line::from(vec![
        Span::styled(app.conversation.input().to_string(), input_style),
        Span::styled("▏", Style::default().fg(Color::Green)),
    ]))
    .block(Block::default().borders(Borders::ALL).title(" Wiadomość "));
    frame.render_widget(input, input_area);
}
