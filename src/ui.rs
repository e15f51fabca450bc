use anyhow::Result;
use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use expense_tracker::{
    distinct_categories, distinct_payment_methods, filter_expenses, monthly_totals,
    parse_calendar_date, summarize, Expense, ExpenseDraft, ExpenseStore, FilterCriteria,
    KeyValueStore, PaymentMethod,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Ledger,
    Statistics,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Ledger => Page::Statistics,
            Page::Statistics => Page::Ledger,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Ledger => "Expenses",
            Page::Statistics => "Statistics",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Form,
    DateRange,
}

// ============================================================================
// ENTRY FORM
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Amount,
    Description,
    Date,
    Category,
    Payment,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::Amount,
        FormField::Description,
        FormField::Date,
        FormField::Category,
        FormField::Payment,
    ];

    pub fn label(&self) -> &str {
        match self {
            FormField::Amount => "Amount",
            FormField::Description => "Description",
            FormField::Date => "Date",
            FormField::Category => "Category",
            FormField::Payment => "Payment",
        }
    }
}

/// Add/edit form state
pub struct EntryForm {
    /// Id of the record being edited, `None` when adding
    pub editing: Option<String>,
    pub draft: ExpenseDraft,
    pub focus: usize,
    pub error: Option<String>,
}

impl EntryForm {
    fn new(editing: Option<String>, draft: ExpenseDraft) -> Self {
        EntryForm {
            editing,
            draft,
            focus: 0,
            error: None,
        }
    }

    pub fn focused(&self) -> FormField {
        FormField::ALL[self.focus]
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Amount => &self.draft.amount,
            FormField::Description => &self.draft.description,
            FormField::Date => &self.draft.date,
            FormField::Category => &self.draft.category,
            FormField::Payment => &self.draft.payment_method,
        }
    }

    fn value_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Amount => &mut self.draft.amount,
            FormField::Description => &mut self.draft.description,
            FormField::Date => &mut self.draft.date,
            FormField::Category => &mut self.draft.category,
            FormField::Payment => &mut self.draft.payment_method,
        }
    }

    fn next_field(&mut self) {
        self.focus = (self.focus + 1) % FormField::ALL.len();
    }

    fn previous_field(&mut self) {
        self.focus = (self.focus + FormField::ALL.len() - 1) % FormField::ALL.len();
    }

    /// Step through the well-known payment methods
    fn cycle_payment(&mut self) {
        let current = PaymentMethod::from(self.draft.payment_method.as_str());
        self.draft.payment_method = current.next_known().to_string();
    }
}

/// Start/end date buffers, applied to the criteria on Enter
#[derive(Debug, Clone, Default)]
pub struct DateRangeInput {
    pub start: String,
    pub end: String,
    pub editing_end: bool,
    pub error: Option<String>,
}

impl DateRangeInput {
    fn active_mut(&mut self) -> &mut String {
        if self.editing_end {
            &mut self.end
        } else {
            &mut self.start
        }
    }
}

pub struct App<S: KeyValueStore> {
    pub store: ExpenseStore<S>,
    pub criteria: FilterCriteria,
    pub filtered: Vec<Expense>,
    pub state: TableState,
    pub current_page: Page,
    pub input_mode: InputMode,
    pub show_detail: bool,
    pub today: NaiveDate,
    pub status: Option<String>,
    pub form: Option<EntryForm>,
    pub date_input: Option<DateRangeInput>,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(store: ExpenseStore<S>, today: NaiveDate) -> Self {
        let mut app = Self {
            store,
            criteria: FilterCriteria::default(),
            filtered: Vec::new(),
            state: TableState::default(),
            current_page: Page::Ledger,
            input_mode: InputMode::Normal,
            show_detail: false,
            today,
            status: None,
            form: None,
            date_input: None,
        };
        app.refresh();
        app
    }

    /// Recompute the filtered view after the store or the criteria changed
    pub fn refresh(&mut self) {
        self.filtered = filter_expenses(self.store.list_expenses(), &self.criteria);

        let selected = match self.state.selected() {
            _ if self.filtered.is_empty() => None,
            Some(i) => Some(i.min(self.filtered.len() - 1)),
            None => Some(0),
        };
        self.state.select(selected);
    }

    pub fn selected_expense(&self) -> Option<&Expense> {
        self.state.selected().and_then(|i| self.filtered.get(i))
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    /// Step to the next category in first-seen order; past the last one, back to "all"
    pub fn cycle_category(&mut self) {
        let options = distinct_categories(self.store.list_expenses());
        self.criteria.category = cycle(&options, &self.criteria.category);
        self.refresh();
    }

    pub fn cycle_payment_method(&mut self) {
        let options = distinct_payment_methods(self.store.list_expenses());
        self.criteria.payment_method = cycle(&options, &self.criteria.payment_method);
        self.refresh();
    }

    pub fn clear_filter(&mut self) {
        self.criteria = FilterCriteria::default();
        self.refresh();
    }

    pub fn push_search_char(&mut self, c: char) {
        self.criteria.search_term.push(c);
        self.refresh();
    }

    pub fn pop_search_char(&mut self) {
        self.criteria.search_term.pop();
        self.refresh();
    }

    /// Delete the highlighted expense from the store
    pub fn delete_selected(&mut self) -> Result<()> {
        let id = match self.selected_expense() {
            Some(expense) => expense.id.clone(),
            None => return Ok(()),
        };

        if self.store.delete_expense(&id)? {
            self.status = Some(format!("Deleted expense {}", id));
        }
        self.refresh();
        Ok(())
    }

    pub fn open_add_form(&mut self) {
        self.current_page = Page::Ledger;
        self.form = Some(EntryForm::new(None, ExpenseDraft::new(self.today)));
        self.input_mode = InputMode::Form;
    }

    pub fn open_edit_form(&mut self) {
        let form = match self.selected_expense() {
            Some(expense) => EntryForm::new(
                Some(expense.id.clone()),
                ExpenseDraft::from_expense(expense),
            ),
            None => return,
        };
        self.form = Some(form);
        self.input_mode = InputMode::Form;
    }

    pub fn close_form(&mut self) {
        self.form = None;
        self.input_mode = InputMode::Normal;
    }

    /// Validate the form and hand the result to the store.
    /// A rejected draft keeps the form open with the reason shown.
    pub fn submit_form(&mut self) -> Result<()> {
        let (editing, checked) = match &self.form {
            None => return Ok(()),
            Some(form) => {
                let existing = form
                    .editing
                    .as_deref()
                    .and_then(|id| self.store.get_expense(id));
                let checked = match existing {
                    Some(existing) => form.draft.apply_to(existing),
                    None => form.draft.to_candidate(),
                };
                (form.editing.clone(), checked)
            }
        };

        let record = match checked {
            Ok(record) => record,
            Err(e) => {
                if let Some(form) = self.form.as_mut() {
                    form.error = Some(e.to_string());
                }
                return Ok(());
            }
        };

        let message = match editing {
            None => format!("Added expense {}", self.store.add_expense(record)?.id),
            Some(id) => {
                if self.store.update_expense(record)? {
                    format!("Updated expense {}", id)
                } else {
                    format!("Expense {} no longer exists", id)
                }
            }
        };

        self.close_form();
        self.status = Some(message);
        self.refresh();
        Ok(())
    }

    pub fn open_date_range(&mut self) {
        self.current_page = Page::Ledger;
        self.date_input = Some(DateRangeInput {
            start: self.criteria.start_date.clone(),
            end: self.criteria.end_date.clone(),
            ..Default::default()
        });
        self.input_mode = InputMode::DateRange;
    }

    /// Copy the typed bounds into the criteria; blank means unbounded
    pub fn apply_date_range(&mut self) {
        let input = match self.date_input.as_mut() {
            Some(input) => input,
            None => return,
        };

        for bound in [&input.start, &input.end] {
            if !bound.trim().is_empty() && parse_calendar_date(bound).is_none() {
                input.error = Some(format!("'{}' is not a date (YYYY-MM-DD)", bound));
                return;
            }
        }

        self.criteria.start_date = input.start.trim().to_string();
        self.criteria.end_date = input.end.trim().to_string();
        self.date_input = None;
        self.input_mode = InputMode::Normal;
        self.refresh();
    }

    pub fn next(&mut self) {
        self.move_selection(1);
    }

    pub fn previous(&mut self) {
        self.move_selection(-1);
    }

    pub fn page_down(&mut self) {
        self.jump(20);
    }

    pub fn page_up(&mut self) {
        self.jump(-20);
    }

    /// Wrap-around step
    fn move_selection(&mut self, delta: isize) {
        let len = self.filtered.len() as isize;
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => (i as isize + delta).rem_euclid(len),
            None => 0,
        };
        self.state.select(Some(i as usize));
    }

    /// Clamped jump
    fn jump(&mut self, delta: isize) {
        let len = self.filtered.len() as isize;
        if len == 0 {
            return;
        }
        let i = self.state.selected().unwrap_or(0) as isize + delta;
        self.state.select(Some(i.clamp(0, len - 1) as usize));
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        self.status = None;

        match self.input_mode {
            InputMode::Search => {
                match key.code {
                    KeyCode::Enter | KeyCode::Esc => self.input_mode = InputMode::Normal,
                    KeyCode::Backspace => self.pop_search_char(),
                    KeyCode::Char(c) => self.push_search_char(c),
                    _ => {}
                }
                return Ok(false);
            }
            InputMode::Form => {
                self.handle_form_key(key)?;
                return Ok(false);
            }
            InputMode::DateRange => {
                self.handle_date_key(key);
                return Ok(false);
            }
            InputMode::Normal => {}
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Tab => self.next_page(),
            KeyCode::Enter => self.toggle_detail(),
            KeyCode::Char('/') => {
                self.current_page = Page::Ledger;
                self.input_mode = InputMode::Search;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(true),
            KeyCode::Char('c') => self.cycle_category(),
            KeyCode::Char('p') => self.cycle_payment_method(),
            KeyCode::Char('x') => self.clear_filter(),
            KeyCode::Char('d') if self.current_page == Page::Ledger => self.delete_selected()?,
            KeyCode::Char('a') => self.open_add_form(),
            KeyCode::Char('e') if self.current_page == Page::Ledger => self.open_edit_form(),
            KeyCode::Char('r') => self.open_date_range(),
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::PageDown => self.page_down(),
            KeyCode::PageUp => self.page_up(),
            KeyCode::Home => self.jump(isize::MIN / 2),
            KeyCode::End => self.jump(isize::MAX / 2),
            _ => {}
        }
        Ok(false)
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.close_form();
                return Ok(());
            }
            KeyCode::Enter => return self.submit_form(),
            _ => {}
        }

        let form = match self.form.as_mut() {
            Some(form) => form,
            None => {
                self.input_mode = InputMode::Normal;
                return Ok(());
            }
        };

        match key.code {
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Left | KeyCode::Right if form.focused() == FormField::Payment => {
                form.cycle_payment()
            }
            KeyCode::Backspace => {
                let field = form.focused();
                form.value_mut(field).pop();
            }
            KeyCode::Char(c) => {
                let field = form.focused();
                form.value_mut(field).push(c);
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_date_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.date_input = None;
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => self.apply_date_range(),
            _ => {
                let input = match self.date_input.as_mut() {
                    Some(input) => input,
                    None => return,
                };
                match key.code {
                    KeyCode::Tab | KeyCode::BackTab => input.editing_end = !input.editing_end,
                    KeyCode::Backspace => {
                        input.active_mut().pop();
                    }
                    KeyCode::Char(c) => input.active_mut().push(c),
                    _ => {}
                }
            }
        }
    }
}

fn cycle(options: &[String], current: &str) -> String {
    if current.is_empty() {
        return options.first().cloned().unwrap_or_default();
    }
    match options.iter().position(|o| o == current) {
        Some(i) if i + 1 < options.len() => options[i + 1].clone(),
        _ => String::new(),
    }
}

pub fn run_ui<S: KeyValueStore>(app: &mut App<S>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: ratatui::backend::Backend, S: KeyValueStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if app.handle_key(key)? {
                return Ok(());
            }
        }
    }
}

fn ui<S: KeyValueStore>(f: &mut Frame, app: &mut App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Length(3), // Filter bar
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);
    render_filter_bar(f, chunks[1], app);

    match app.current_page {
        Page::Ledger if app.form.is_some() => {
            let content_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(chunks[2]);

            render_table(f, content_chunks[0], app);
            if let Some(form) = &app.form {
                render_form(f, content_chunks[1], form);
            }
        }
        Page::Ledger if app.show_detail => {
            let content_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(chunks[2]);

            render_table(f, content_chunks[0], app);
            render_detail_panel(f, content_chunks[1], app);
        }
        Page::Ledger => render_table(f, chunks[2], app),
        Page::Statistics => render_statistics(f, chunks[2], app),
    }

    render_status_bar(f, chunks[3], app);
}

fn render_header<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let mut tab_spans = vec![];
    for (i, page) in [Page::Ledger, Page::Statistics].iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    let shown_total: f64 = app.filtered.iter().map(|e| e.amount).sum();

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("{} of {} expenses", app.filtered.len(), app.store.len()),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Σ {:.2}", shown_total),
        Style::default().fg(Color::Red),
    ));

    let header = Paragraph::new(Line::from(tab_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn render_filter_bar<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let or_all = |value: &str| {
        if value.is_empty() {
            "All".to_string()
        } else {
            value.to_string()
        }
    };

    let search_style = if app.input_mode == InputMode::Search {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    let cursor = if app.input_mode == InputMode::Search { "▏" } else { "" };

    let mut spans = vec![
        Span::styled(" Search: ", label),
        Span::styled(format!("{}{}", app.criteria.search_term, cursor), search_style),
        Span::raw("   "),
        Span::styled("Category: ", label),
        Span::raw(or_all(&app.criteria.category)),
        Span::raw("   "),
        Span::styled("Payment: ", label),
        Span::raw(or_all(&app.criteria.payment_method)),
        Span::raw("   "),
    ];

    match &app.date_input {
        Some(input) => {
            let editing = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
            let (start_cursor, end_cursor) = if input.editing_end { ("", "▏") } else { ("▏", "") };
            spans.push(Span::styled("From: ", label));
            spans.push(Span::styled(format!("{}{}", input.start, start_cursor), editing));
            spans.push(Span::styled("  To: ", label));
            spans.push(Span::styled(format!("{}{}", input.end, end_cursor), editing));
            if let Some(error) = &input.error {
                spans.push(Span::styled(format!("  ✗ {}", error), Style::default().fg(Color::Red)));
            }
        }
        None => {
            let or_open = |value: &str| {
                if value.is_empty() {
                    "…".to_string()
                } else {
                    value.to_string()
                }
            };
            spans.push(Span::styled("Dates: ", label));
            spans.push(Span::raw(format!(
                "{} → {}",
                or_open(&app.criteria.start_date),
                or_open(&app.criteria.end_date)
            )));
        }
    }

    let bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Filter "),
    );

    f.render_widget(bar, area);
}

fn render_table<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &mut App<S>) {
    let header_cells = ["Date", "Description", "Category", "Payment", "Amount"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.filtered.iter().map(|expense| {
        let cells = vec![
            Cell::from(expense.date.clone()),
            Cell::from(truncate(&expense.description, 30)),
            Cell::from(truncate(&expense.category, 18)),
            Cell::from(expense.payment_method.to_string()),
            Cell::from(format!("{:>10.2}", expense.amount)).style(Style::default().fg(Color::Red)),
        ];

        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Length(32),
            Constraint::Length(20),
            Constraint::Length(15),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Expenses "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_detail_panel<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Expense Details ");

    let expense = match app.selected_expense() {
        Some(e) => e,
        None => {
            f.render_widget(Paragraph::new("No expense selected").block(block), area);
            return;
        }
    };

    let field = |name: &str, value: String| {
        Line::from(vec![
            Span::styled(
                format!("  {}: ", name),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(value),
        ])
    };

    let mut content = vec![
        Line::from(""),
        field("Date", expense.date.clone()),
        field("Amount", format!("{:.2}", expense.amount)),
        field("Category", expense.category.clone()),
        field("Payment", expense.payment_method.to_string()),
        field("Id", expense.id.clone()),
        Line::from(""),
        Line::from("  ─────────────────────────────────────"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "  DESCRIPTION",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )]),
        Line::from(""),
    ];

    for line in wrap_text(&expense.description, 35) {
        content.push(Line::from(Span::styled(
            format!("  {}", line),
            Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
        )));
    }

    if !expense.metadata.is_empty() {
        content.push(Line::from(""));
        let mut keys: Vec<_> = expense.metadata.keys().cloned().collect();
        keys.sort();
        content.push(field("Extra fields", keys.join(", ")));
    }

    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        "  Enter close · e edit · d delete",
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    )));

    f.render_widget(Paragraph::new(content).block(block), area);
}

fn render_form(f: &mut Frame, area: Rect, form: &EntryForm) {
    let title = if form.editing.is_some() {
        " Edit Expense "
    } else {
        " Add Expense "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(title);

    let hint = Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::ITALIC);

    let mut content = vec![Line::from("")];
    for (i, field) in FormField::ALL.iter().enumerate() {
        let focused = i == form.focus;
        let label_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        };
        let cursor = if focused { "▏" } else { "" };

        content.push(Line::from(vec![
            Span::styled(format!("  {:<13}", field.label()), label_style),
            Span::raw(format!("{}{}", form.value(*field), cursor)),
        ]));
    }

    let choices: Vec<&str> = PaymentMethod::KNOWN.iter().map(|m| m.as_str()).collect();
    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        format!("  ←/→ on Payment: {}", choices.join(" · ")),
        hint,
    )));

    if let Some(error) = &form.error {
        content.push(Line::from(""));
        content.push(Line::from(Span::styled(
            format!("  ✗ {}", error),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }

    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        "  Tab next field · Enter save · Esc cancel",
        hint,
    )));

    f.render_widget(Paragraph::new(content).block(block), area);
}

fn render_statistics<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let summary = summarize(&app.filtered, app.today);
    let monthly = monthly_totals(&app.filtered);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(0)])
        .split(columns[0]);

    let trend_color = if summary.trend > 0.0 {
        Color::Red
    } else if summary.trend < 0.0 {
        Color::Green
    } else {
        Color::White
    };
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let overview = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw("  Total this month:  "),
            Span::styled(format!("{:.2}", summary.current_month_total), bold),
        ]),
        Line::from(vec![
            Span::raw("  Last month:        "),
            Span::raw(format!("{:.2}", summary.previous_month_total)),
        ]),
        Line::from(vec![
            Span::raw("  Spending trend:    "),
            Span::styled(format!("{:+.2}%", summary.trend), bold.fg(trend_color)),
            Span::styled(" vs last month", Style::default().fg(Color::DarkGray)),
        ]),
    ];

    f.render_widget(
        Paragraph::new(overview).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", app.today.format("%B %Y"))),
        ),
        left[0],
    );

    let category_rows = summary.category_ranking.iter().map(|c| {
        Row::new(vec![
            Cell::from(truncate(&c.category, 18)),
            Cell::from(format!("{:>10.2}", c.total)),
            Cell::from(format!("{:>6.2}%", c.percentage)),
            Cell::from(bar(c.percentage, 20)).style(Style::default().fg(Color::Cyan)),
        ])
    });

    let categories = Table::new(
        category_rows,
        [
            Constraint::Length(20),
            Constraint::Length(12),
            Constraint::Length(9),
            Constraint::Min(10),
        ],
    )
    .header(Row::new(vec!["Category", "Total", "Share", ""]).style(Style::default().fg(Color::Yellow)))
    .block(Block::default().borders(Borders::ALL).title(" Category Breakdown "));

    f.render_widget(categories, left[1]);

    let peak = monthly.iter().map(|m| m.total).fold(0.0, f64::max);
    let month_rows = monthly.iter().map(|m| {
        let share = if peak > 0.0 { m.total / peak * 100.0 } else { 0.0 };
        Row::new(vec![
            Cell::from(m.label.clone()),
            Cell::from(format!("{:>10.2}", m.total)),
            Cell::from(bar(share, 24)).style(Style::default().fg(Color::Magenta)),
        ])
    });

    let months = Table::new(
        month_rows,
        [Constraint::Length(10), Constraint::Length(12), Constraint::Min(10)],
    )
    .header(Row::new(vec!["Month", "Total", ""]).style(Style::default().fg(Color::Yellow)))
    .block(Block::default().borders(Borders::ALL).title(" Monthly Expenses "));

    f.render_widget(months, columns[1]);
}

fn render_status_bar<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);
    let key = Style::default().fg(Color::Yellow);

    let mut status_spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, app.filtered.len()),
        Style::default().fg(Color::Cyan),
    )];

    if let Some(message) = &app.status {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(message.clone(), Style::default().fg(Color::Green)));
    }

    for (k, label) in [
        ("/", " Search"),
        ("c", " Category"),
        ("p", " Payment"),
        ("r", " Dates"),
        ("x", " Clear"),
        ("a", " Add"),
        ("e", " Edit"),
        ("Tab", " Page"),
        ("Enter", " Details"),
    ] {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(k, key));
        status_spans.push(Span::raw(label));
    }
    status_spans.push(Span::raw(" | "));
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(Line::from(status_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn bar(percent: f64, width: usize) -> String {
    let filled = ((percent / 100.0) * width as f64).round().clamp(0.0, width as f64) as usize;
    "█".repeat(filled)
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if !current_line.is_empty() && current_line.len() + word.len() + 1 > width {
            lines.push(std::mem::take(&mut current_line));
        }
        if !current_line.is_empty() {
            current_line.push(' ');
        }
        current_line.push_str(word);
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }
    lines
}
