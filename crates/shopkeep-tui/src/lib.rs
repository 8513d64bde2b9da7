// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use shopkeep_app::{
    AppCommand, AppEvent, AppMode, AppState, CreateProductForm, CreateProductInput,
    EditProductForm, EditProductInput, FormKind, PAGE_SIZE_OPTIONS, Product, ProductId,
    ProductTable, SortDirection, SortKey, export_file_name, page_csv, page_status, price_label,
    row_descriptor, row_descriptors,
};
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::OffsetDateTime;

const COLUMNS: [&str; 5] = ["id", "image", "title", "price", "category"];
const SORT_MARK_ASC: &str = " ↑";
const SORT_MARK_DESC: &str = " ↓";
const IMAGE_CELL_CHARS: usize = 40;

/// Resolution of one catalog call. Results cross the internal channel as
/// plain strings because the UI only ever displays them.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEvent {
    Fetched {
        request_id: u64,
        result: Result<Vec<Product>, String>,
    },
    Created {
        request_id: u64,
        result: Result<Product, String>,
    },
    Updated {
        request_id: u64,
        result: Result<Product, String>,
    },
}

impl CatalogEvent {
    const fn request_id(&self) -> u64 {
        match self {
            Self::Fetched { request_id, .. }
            | Self::Created { request_id, .. }
            | Self::Updated { request_id, .. } => *request_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    Catalog(CatalogEvent),
}

/// Seam between the event loop and the remote catalog. The `spawn_*`
/// defaults run the call inline and deliver the resolution through the
/// channel, which keeps test runtimes deterministic; the HTTP runtime
/// overrides them to run on a worker thread so the loop stays responsive.
pub trait CatalogRuntime {
    fn fetch_products(&mut self) -> Result<Vec<Product>>;
    fn create_product(&mut self, input: &CreateProductInput) -> Result<Product>;
    fn update_product(&mut self, id: ProductId, input: &EditProductInput) -> Result<Product>;
    fn export_csv(&mut self, file_name: &str, contents: &str) -> Result<PathBuf>;

    fn spawn_fetch(&mut self, request_id: u64, tx: Sender<InternalEvent>) -> Result<()> {
        let result = self.fetch_products().map_err(|error| error.to_string());
        tx.send(InternalEvent::Catalog(CatalogEvent::Fetched {
            request_id,
            result,
        }))
        .map_err(|_| anyhow::anyhow!("catalog event channel closed"))?;
        Ok(())
    }

    fn spawn_create(
        &mut self,
        request_id: u64,
        input: &CreateProductInput,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let result = self.create_product(input).map_err(|error| error.to_string());
        tx.send(InternalEvent::Catalog(CatalogEvent::Created {
            request_id,
            result,
        }))
        .map_err(|_| anyhow::anyhow!("catalog event channel closed"))?;
        Ok(())
    }

    fn spawn_update(
        &mut self,
        request_id: u64,
        id: ProductId,
        input: &EditProductInput,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let result = self
            .update_product(id, input)
            .map_err(|error| error.to_string());
        tx.send(InternalEvent::Catalog(CatalogEvent::Updated {
            request_id,
            result,
        }))
        .map_err(|_| anyhow::anyhow!("catalog event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct FormUiState {
    create: CreateProductForm,
    edit: EditProductForm,
    field_index: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct NoticeUiState {
    visible: bool,
    title: String,
    text: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct PreviewUiState {
    visible: bool,
    title: String,
    text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableCommand {
    MoveRow(isize),
    MoveColumn(isize),
    JumpFirstRow,
    JumpLastRow,
    NextPage,
    PrevPage,
    CycleSort,
    CyclePageSize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TableStatus {
    SortUnavailable,
    SortAsc(&'static str),
    SortDesc(&'static str),
    AlreadyFirstPage,
    AlreadyLastPage,
    PageSize(usize),
}

impl TableStatus {
    fn message(self) -> String {
        match self {
            Self::SortUnavailable => "image column is not sortable".to_owned(),
            Self::SortAsc(column) => format!("sort {column} asc"),
            Self::SortDesc(column) => format!("sort {column} desc"),
            Self::AlreadyFirstPage => "already on page 1".to_owned(),
            Self::AlreadyLastPage => "already on the last page".to_owned(),
            Self::PageSize(size) => format!("page size {size}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TableEvent {
    CursorUpdated,
    Status(TableStatus),
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ViewData {
    table: ProductTable,
    selected_row: usize,
    selected_col: usize,
    form: FormUiState,
    detail: Option<Product>,
    notice: NoticeUiState,
    preview: PreviewUiState,
    help_visible: bool,
    status_token: u64,
    next_request_id: u64,
    pending_fetch: Option<u64>,
    pending_submit: Option<u64>,
    last_fetched_at: Option<OffsetDateTime>,
}

impl ViewData {
    fn with_page_size(page_size: usize) -> Self {
        Self {
            table: ProductTable::with_page_size(page_size),
            ..Self::default()
        }
    }
}

pub fn run_app<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    page_size: usize,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::with_page_size(page_size);
    let (internal_tx, internal_rx) = mpsc::channel();

    request_fetch(state, runtime, &mut view_data, &internal_tx, "loading catalog");

    let mut result = Ok(());
    loop {
        process_internal_events(state, runtime, &mut view_data, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::Catalog(event) => {
                handle_catalog_event(state, runtime, view_data, tx, event);
            }
        }
    }
}

// Resolutions are applied in delivery order; when submissions overlap, the
// last one to resolve wins. Request ids only release the pending markers.
fn handle_catalog_event<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    event: CatalogEvent,
) {
    if view_data.pending_fetch == Some(event.request_id()) {
        view_data.pending_fetch = None;
    }
    if view_data.pending_submit == Some(event.request_id()) {
        view_data.pending_submit = None;
    }

    match event {
        CatalogEvent::Fetched { result, .. } => match result {
            Ok(products) => {
                let count = products.len();
                view_data.table.set_source(products);
                clamp_row_cursor(view_data);
                view_data.last_fetched_at = Some(OffsetDateTime::now_utc());
                emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("loaded {count} products"),
                );
            }
            // The table keeps the last successfully fetched collection.
            Err(error) => open_notice(view_data, "load failed", error),
        },
        CatalogEvent::Created { result, .. } => match result {
            Ok(product) => {
                if state.mode == AppMode::Form(FormKind::Create) {
                    view_data.form.create = CreateProductForm::default();
                    dispatch_command(state, view_data, internal_tx, AppCommand::ExitToNav);
                }
                open_notice(
                    view_data,
                    "product created",
                    format!("{} saved as id {}", product.title, product.id.get()),
                );
                request_fetch(state, runtime, view_data, internal_tx, "reloading catalog");
            }
            Err(error) => open_notice(view_data, "create failed", error),
        },
        CatalogEvent::Updated { result, .. } => match result {
            Ok(product) => {
                if state.mode == AppMode::Form(FormKind::Edit) {
                    view_data.detail = None;
                    dispatch_command(state, view_data, internal_tx, AppCommand::ExitToNav);
                }
                open_notice(
                    view_data,
                    "product updated",
                    format!("{} saved", product.title),
                );
                request_fetch(state, runtime, view_data, internal_tx, "reloading catalog");
            }
            Err(error) => open_notice(view_data, "update failed", error),
        },
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn dispatch_command(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    let events = state.dispatch(command);
    if events
        .iter()
        .any(|event| matches!(event, AppEvent::StatusUpdated(_)))
    {
        view_data.status_token = view_data.status_token.saturating_add(1);
        schedule_status_clear(internal_tx, view_data.status_token);
    }
}

fn next_request_id(view_data: &mut ViewData) -> u64 {
    view_data.next_request_id = view_data.next_request_id.wrapping_add(1);
    view_data.next_request_id
}

fn handle_key_event<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.notice.visible {
        view_data.notice = NoticeUiState::default();
        return false;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
            emit_status(state, view_data, internal_tx, "help hidden");
        }
        return false;
    }

    if view_data.preview.visible {
        view_data.preview = PreviewUiState::default();
        return false;
    }

    match state.mode {
        AppMode::Nav => return handle_nav_key(state, runtime, view_data, internal_tx, key),
        AppMode::Search => handle_search_key(state, view_data, internal_tx, key),
        AppMode::Detail => handle_detail_key(state, view_data, internal_tx, key),
        AppMode::Form(kind) => handle_form_key(state, runtime, view_data, internal_tx, kind, key),
    }

    false
}

fn handle_nav_key<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if handle_table_key(state, view_data, internal_tx, key) {
        return false;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => return true,
        (KeyCode::Char('/'), KeyModifiers::NONE) => {
            dispatch_command(state, view_data, internal_tx, AppCommand::EnterSearch);
        }
        (KeyCode::Char('a'), KeyModifiers::NONE) => {
            view_data.form = FormUiState::default();
            dispatch_command(
                state,
                view_data,
                internal_tx,
                AppCommand::OpenForm(FormKind::Create),
            );
        }
        (KeyCode::Char('e'), KeyModifiers::NONE) => {
            export_current_page(state, runtime, view_data, internal_tx);
        }
        (KeyCode::Char('r'), KeyModifiers::NONE) => {
            request_fetch(state, runtime, view_data, internal_tx, "reloading catalog");
        }
        (KeyCode::Char('v'), KeyModifiers::NONE) => {
            open_preview_for_selection(state, view_data, internal_tx);
        }
        (KeyCode::Char('?'), KeyModifiers::NONE) => {
            view_data.help_visible = true;
            emit_status(state, view_data, internal_tx, "help open");
        }
        (KeyCode::Enter, _) => {
            open_detail_for_selection(state, view_data, internal_tx);
        }
        (KeyCode::Esc, _) => {
            state.dispatch(AppCommand::ClearStatus);
        }
        _ => {}
    }

    false
}

fn handle_search_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) | (KeyCode::Enter, _) => {
            dispatch_command(state, view_data, internal_tx, AppCommand::ExitToNav);
            if !view_data.table.keyword().is_empty() {
                let summary = format!(
                    "filter \"{}\": {} of {}",
                    view_data.table.keyword(),
                    view_data.table.view_len(),
                    view_data.table.source_len(),
                );
                emit_status(state, view_data, internal_tx, summary);
            }
        }
        (KeyCode::Backspace, _) => {
            let mut keyword = view_data.table.keyword().to_owned();
            keyword.pop();
            view_data.table.apply_filter(&keyword);
            clamp_row_cursor(view_data);
        }
        (KeyCode::Char(ch), modifiers) => {
            if modifiers.is_empty() || modifiers == KeyModifiers::SHIFT {
                let mut keyword = view_data.table.keyword().to_owned();
                keyword.push(ch);
                view_data.table.apply_filter(&keyword);
                clamp_row_cursor(view_data);
            }
        }
        _ => {}
    }
}

fn handle_detail_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => {
            view_data.detail = None;
            dispatch_command(state, view_data, internal_tx, AppCommand::ExitToNav);
        }
        // The record opens read-only; `e` is the explicit unlock. The id is
        // not an edit field anywhere.
        (KeyCode::Char('e'), KeyModifiers::NONE) => {
            let Some(product) = view_data.detail.clone() else {
                emit_status(state, view_data, internal_tx, "nothing to edit");
                return;
            };
            view_data.form.edit = EditProductForm::from_product(&product);
            view_data.form.field_index = 0;
            dispatch_command(
                state,
                view_data,
                internal_tx,
                AppCommand::OpenForm(FormKind::Edit),
            );
            emit_status(state, view_data, internal_tx, "edit unlocked");
        }
        (KeyCode::Char('v'), KeyModifiers::NONE) => {
            let Some(row) = view_data.detail.as_ref().map(row_descriptor) else {
                return;
            };
            view_data.preview = PreviewUiState {
                visible: true,
                title: row.title,
                text: row.description,
            };
        }
        _ => {}
    }
}

fn handle_form_key<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    kind: FormKind,
    key: KeyEvent,
) {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => match kind {
            FormKind::Create => {
                dispatch_command(state, view_data, internal_tx, AppCommand::ExitToNav);
            }
            FormKind::Edit => {
                dispatch_command(state, view_data, internal_tx, AppCommand::OpenDetail);
                emit_status(state, view_data, internal_tx, "edit canceled");
            }
        },
        (KeyCode::Enter, _) | (KeyCode::Char('s'), KeyModifiers::CONTROL) => {
            submit_form(state, runtime, view_data, internal_tx, kind);
        }
        (KeyCode::Tab, KeyModifiers::NONE) | (KeyCode::Down, _) => {
            let status = move_form_field_cursor(kind, view_data, 1);
            emit_status(state, view_data, internal_tx, status);
        }
        (KeyCode::BackTab, _) | (KeyCode::Up, _) => {
            let status = move_form_field_cursor(kind, view_data, -1);
            emit_status(state, view_data, internal_tx, status);
        }
        (KeyCode::Backspace, _) => {
            active_form_field_mut(view_data, kind).pop();
        }
        (KeyCode::Char(ch), modifiers) => {
            if modifiers.is_empty() || modifiers == KeyModifiers::SHIFT {
                active_form_field_mut(view_data, kind).push(ch);
            }
        }
        _ => {}
    }
}

// Local validation runs first; nothing reaches the runtime until the typed
// input exists.
fn submit_form<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    kind: FormKind,
) {
    match kind {
        FormKind::Create => {
            let input = match view_data.form.create.validate() {
                Ok(input) => input,
                Err(error) => {
                    emit_status(
                        state,
                        view_data,
                        internal_tx,
                        format!("form invalid: {error}"),
                    );
                    return;
                }
            };
            let request_id = next_request_id(view_data);
            view_data.pending_submit = Some(request_id);
            if let Err(error) = runtime.spawn_create(request_id, &input, internal_tx.clone()) {
                view_data.pending_submit = None;
                open_notice(view_data, "create failed", error.to_string());
                return;
            }
            emit_status(state, view_data, internal_tx, "creating product");
        }
        FormKind::Edit => {
            let Some(id) = view_data.detail.as_ref().map(|product| product.id) else {
                emit_status(state, view_data, internal_tx, "nothing to edit");
                return;
            };
            let input = match view_data.form.edit.validate() {
                Ok(input) => input,
                Err(error) => {
                    emit_status(
                        state,
                        view_data,
                        internal_tx,
                        format!("form invalid: {error}"),
                    );
                    return;
                }
            };
            let request_id = next_request_id(view_data);
            view_data.pending_submit = Some(request_id);
            if let Err(error) = runtime.spawn_update(request_id, id, &input, internal_tx.clone()) {
                view_data.pending_submit = None;
                open_notice(view_data, "update failed", error.to_string());
                return;
            }
            emit_status(state, view_data, internal_tx, "saving product");
        }
    }
}

fn request_fetch<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    status: &str,
) {
    let request_id = next_request_id(view_data);
    view_data.pending_fetch = Some(request_id);
    if let Err(error) = runtime.spawn_fetch(request_id, internal_tx.clone()) {
        view_data.pending_fetch = None;
        open_notice(view_data, "load failed", error.to_string());
        return;
    }
    emit_status(state, view_data, internal_tx, status);
}

fn export_current_page<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    if view_data.table.current_page_slice().is_empty() {
        open_notice(view_data, "export skipped", "no data to export");
        return;
    }

    let contents = page_csv(view_data.table.current_page_slice());
    let file_name = export_file_name(view_data.table.page());
    match runtime.export_csv(&file_name, &contents) {
        Ok(path) => emit_status(
            state,
            view_data,
            internal_tx,
            format!("exported {}", path.display()),
        ),
        Err(error) => open_notice(view_data, "export failed", error.to_string()),
    }
}

fn handle_table_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    let Some(command) = table_command_for_key(key) else {
        return false;
    };

    let event = apply_table_command(view_data, command);
    if let TableEvent::Status(status) = event {
        emit_status(state, view_data, internal_tx, status.message());
    }
    true
}

fn table_command_for_key(key: KeyEvent) -> Option<TableCommand> {
    match (key.code, key.modifiers) {
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => Some(TableCommand::MoveRow(1)),
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => Some(TableCommand::MoveRow(-1)),
        (KeyCode::Char('h'), _) | (KeyCode::Left, _) => Some(TableCommand::MoveColumn(-1)),
        (KeyCode::Char('l'), _) | (KeyCode::Right, _) => Some(TableCommand::MoveColumn(1)),
        (KeyCode::Char('g'), _) => Some(TableCommand::JumpFirstRow),
        (KeyCode::Char('G'), _) => Some(TableCommand::JumpLastRow),
        (KeyCode::Char('n'), KeyModifiers::NONE) | (KeyCode::PageDown, _) => {
            Some(TableCommand::NextPage)
        }
        (KeyCode::Char('p'), KeyModifiers::NONE) | (KeyCode::PageUp, _) => {
            Some(TableCommand::PrevPage)
        }
        (KeyCode::Char('s'), KeyModifiers::NONE) => Some(TableCommand::CycleSort),
        (KeyCode::Char('z'), KeyModifiers::NONE) => Some(TableCommand::CyclePageSize),
        _ => None,
    }
}

fn apply_table_command(view_data: &mut ViewData, command: TableCommand) -> TableEvent {
    match command {
        TableCommand::MoveRow(delta) => {
            move_row(view_data, delta);
            TableEvent::CursorUpdated
        }
        TableCommand::MoveColumn(delta) => {
            move_col(view_data, delta);
            TableEvent::CursorUpdated
        }
        TableCommand::JumpFirstRow => {
            view_data.selected_row = 0;
            TableEvent::CursorUpdated
        }
        TableCommand::JumpLastRow => {
            view_data.selected_row = view_data
                .table
                .current_page_slice()
                .len()
                .saturating_sub(1);
            TableEvent::CursorUpdated
        }
        TableCommand::NextPage => {
            if view_data.table.go_to_page(1) {
                clamp_row_cursor(view_data);
                TableEvent::CursorUpdated
            } else {
                TableEvent::Status(TableStatus::AlreadyLastPage)
            }
        }
        TableCommand::PrevPage => {
            if view_data.table.go_to_page(-1) {
                clamp_row_cursor(view_data);
                TableEvent::CursorUpdated
            } else {
                TableEvent::Status(TableStatus::AlreadyFirstPage)
            }
        }
        TableCommand::CycleSort => TableEvent::Status(cycle_sort(view_data)),
        TableCommand::CyclePageSize => {
            let next = next_page_size(view_data.table.page_size());
            view_data.table.set_page_size(next);
            clamp_row_cursor(view_data);
            TableEvent::Status(TableStatus::PageSize(next))
        }
    }
}

fn cycle_sort(view_data: &mut ViewData) -> TableStatus {
    let Some(key) = sort_key_for_column(view_data.selected_col) else {
        return TableStatus::SortUnavailable;
    };

    view_data.table.apply_sort(key);
    clamp_row_cursor(view_data);
    match view_data.table.sort().map(|sort| sort.direction) {
        Some(SortDirection::Desc) => TableStatus::SortDesc(key.label()),
        _ => TableStatus::SortAsc(key.label()),
    }
}

// The image column carries no comparable value.
fn sort_key_for_column(column: usize) -> Option<SortKey> {
    match column {
        0 => Some(SortKey::Id),
        2 => Some(SortKey::Title),
        3 => Some(SortKey::Price),
        4 => Some(SortKey::Category),
        _ => None,
    }
}

fn next_page_size(current: usize) -> usize {
    match PAGE_SIZE_OPTIONS.iter().position(|&size| size == current) {
        Some(index) => PAGE_SIZE_OPTIONS[(index + 1) % PAGE_SIZE_OPTIONS.len()],
        None => PAGE_SIZE_OPTIONS[0],
    }
}

fn move_row(view_data: &mut ViewData, delta: isize) {
    let len = view_data.table.current_page_slice().len();
    if len == 0 {
        view_data.selected_row = 0;
        return;
    }
    let next = (view_data.selected_row as isize + delta).clamp(0, len as isize - 1);
    view_data.selected_row = next as usize;
}

fn move_col(view_data: &mut ViewData, delta: isize) {
    let max = COLUMNS.len() as isize - 1;
    let next = (view_data.selected_col as isize + delta).clamp(0, max);
    view_data.selected_col = next as usize;
}

fn clamp_row_cursor(view_data: &mut ViewData) {
    let len = view_data.table.current_page_slice().len();
    view_data.selected_row = view_data.selected_row.min(len.saturating_sub(1));
}

fn selected_product(view_data: &ViewData) -> Option<&Product> {
    view_data
        .table
        .current_page_slice()
        .get(view_data.selected_row)
}

fn open_detail_for_selection(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(product) = selected_product(view_data).cloned() else {
        emit_status(state, view_data, internal_tx, "no row selected");
        return;
    };
    view_data.detail = Some(product);
    dispatch_command(state, view_data, internal_tx, AppCommand::OpenDetail);
}

fn open_preview_for_selection(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(row) = selected_product(view_data).map(row_descriptor) else {
        emit_status(state, view_data, internal_tx, "no row selected");
        return;
    };
    view_data.preview = PreviewUiState {
        visible: true,
        title: row.title,
        text: row.description,
    };
}

fn open_notice(view_data: &mut ViewData, title: impl Into<String>, text: impl Into<String>) {
    view_data.notice = NoticeUiState {
        visible: true,
        title: title.into(),
        text: text.into(),
    };
}

fn move_form_field_cursor(kind: FormKind, view_data: &mut ViewData, delta: isize) -> String {
    let len = form_field_labels(kind).len() as isize;
    let next = (view_data.form.field_index as isize + delta).rem_euclid(len) as usize;
    view_data.form.field_index = next;
    format_form_field_status(kind, next)
}

fn active_form_field_mut(view_data: &mut ViewData, kind: FormKind) -> &mut String {
    let index = view_data.form.field_index;
    match kind {
        FormKind::Create => view_data.form.create.field_mut(index),
        FormKind::Edit => view_data.form.edit.field_mut(index),
    }
}

fn form_field_labels(kind: FormKind) -> &'static [&'static str] {
    match kind {
        FormKind::Create => &CreateProductForm::FIELD_LABELS,
        FormKind::Edit => &EditProductForm::FIELD_LABELS,
    }
}

fn format_form_field_status(kind: FormKind, index: usize) -> String {
    let fields = form_field_labels(kind);
    let label = fields[index.min(fields.len().saturating_sub(1))];
    format!("field {} ({}/{})", label, index + 1, fields.len())
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(header_text(state, view_data))
        .block(Block::default().title("shopkeep").borders(Borders::ALL));
    frame.render_widget(header, layout[0]);

    render_table(frame, layout[1], view_data);

    let status_widget = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[2]);

    if state.mode == AppMode::Detail {
        let area = centered_rect(70, 60, frame.area());
        frame.render_widget(Clear, area);
        let title = view_data
            .detail
            .as_ref()
            .map(|product| format!("product {}", product.id.get()))
            .unwrap_or_else(|| "product".to_owned());
        let detail = Paragraph::new(render_detail_text(view_data))
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(detail, area);
    }

    if let AppMode::Form(kind) = state.mode {
        let area = centered_rect(62, 55, frame.area());
        frame.render_widget(Clear, area);
        let title = match (kind, &view_data.detail) {
            (FormKind::Create, _) => "create product".to_owned(),
            (FormKind::Edit, Some(product)) => format!("edit product {}", product.id.get()),
            (FormKind::Edit, None) => "edit product".to_owned(),
        };
        let form = Paragraph::new(render_form_text(kind, view_data))
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(form, area);
    }

    if view_data.preview.visible {
        let area = centered_rect(70, 52, frame.area());
        frame.render_widget(Clear, area);
        let preview = Paragraph::new(render_preview_text(&view_data.preview)).block(
            Block::default()
                .title(view_data.preview.title.clone())
                .borders(Borders::ALL),
        );
        frame.render_widget(preview, area);
    }

    if view_data.notice.visible {
        let area = centered_rect(54, 36, frame.area());
        frame.render_widget(Clear, area);
        let notice = Paragraph::new(render_notice_text(&view_data.notice)).block(
            Block::default()
                .title(view_data.notice.title.clone())
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(notice, area);
    }

    if view_data.help_visible {
        let area = centered_rect(80, 72, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_table(frame: &mut ratatui::Frame<'_>, area: Rect, view_data: &ViewData) {
    let rows_data = row_descriptors(view_data.table.current_page_slice());
    let widths = [
        Constraint::Length(6),
        Constraint::Min(24),
        Constraint::Min(20),
        Constraint::Length(10),
        Constraint::Min(12),
    ];

    let header_cells = COLUMNS.iter().enumerate().map(|(column_index, label)| {
        Cell::from(header_label_for_column(&view_data.table, column_index, label)).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    });
    let header = Row::new(header_cells);

    let rows = rows_data.iter().enumerate().map(|(row_index, row)| {
        let selected_row = row_index == view_data.selected_row;
        let cells = [
            row.id.get().to_string(),
            truncate_label(&row.image_url, IMAGE_CELL_CHARS),
            row.title.clone(),
            price_label(row.price),
            row.category_name.clone(),
        ]
        .into_iter()
        .enumerate()
        .map(|(column_index, text)| {
            let mut style = Style::default();
            if selected_row {
                style = style.bg(Color::DarkGray);
            }
            if selected_row && column_index == view_data.selected_col {
                style = Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD);
            }
            Cell::from(text).style(style)
        })
        .collect::<Vec<_>>();

        Row::new(cells)
    });

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(table_title(&view_data.table))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn table_title(table: &ProductTable) -> String {
    format!(
        "products | {}",
        page_status(table.page(), table.total_pages(), table.view_len())
    )
}

fn header_label_for_column(table: &ProductTable, column_index: usize, label: &str) -> String {
    let mut label = label.to_owned();
    if let Some(sort) = table.sort()
        && sort_key_for_column(column_index) == Some(sort.key)
    {
        let marker = match sort.direction {
            SortDirection::Asc => SORT_MARK_ASC,
            SortDirection::Desc => SORT_MARK_DESC,
        };
        label.push_str(marker);
    }
    label
}

fn header_text(state: &AppState, view_data: &ViewData) -> String {
    let table = &view_data.table;
    let mut parts = vec![format!("{} products", table.source_len())];
    if state.mode == AppMode::Search {
        parts.push(format!("search: {}▌", table.keyword()));
    } else if !table.keyword().is_empty() {
        parts.push(format!(
            "filter \"{}\" ({} of {})",
            table.keyword(),
            table.view_len(),
            table.source_len(),
        ));
    }
    if let Some(sort) = table.sort() {
        parts.push(format!(
            "sort {} {}",
            sort.key.label(),
            sort.direction.label()
        ));
    }
    if let Some(fetched_at) = view_data.last_fetched_at {
        parts.push(format!(
            "fetched {:02}:{:02}:{:02} UTC",
            fetched_at.hour(),
            fetched_at.minute(),
            fetched_at.second(),
        ));
    }
    parts.join(" | ")
}

fn render_detail_text(view_data: &ViewData) -> String {
    let Some(product) = &view_data.detail else {
        return "no product selected".to_owned();
    };
    let row = row_descriptor(product);
    format!(
        "id: {}\ntitle: {}\nprice: {}\ncategory: {}\nimage: {}\n\n{}\n\ne edit | v description | esc close",
        row.id.get(),
        row.title,
        price_label(row.price),
        row.category_name,
        row.image_url,
        row.description,
    )
}

fn render_form_text(kind: FormKind, view_data: &ViewData) -> String {
    let mut lines = Vec::new();
    if kind == FormKind::Edit
        && let Some(product) = &view_data.detail
    {
        lines.push(format!("  id: {} (read-only)", product.id.get()));
    }

    for (index, label) in form_field_labels(kind).iter().enumerate() {
        let value = match kind {
            FormKind::Create => view_data.form.create.field(index),
            FormKind::Edit => view_data.form.edit.field(index),
        };
        if index == view_data.form.field_index {
            lines.push(format!("> {label}: {value}▌"));
        } else {
            lines.push(format!("  {label}: {value}"));
        }
    }

    lines.push(String::new());
    lines.push("tab/shift+tab field | enter submit | esc cancel".to_owned());
    lines.join("\n")
}

fn render_preview_text(preview: &PreviewUiState) -> String {
    format!("{}\n\nany key to close", preview.text)
}

fn render_notice_text(notice: &NoticeUiState) -> String {
    format!("{}\n\nany key to close", notice.text)
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    // Overlays suppress the keybinding bar.
    if status_hidden_by_overlay(view_data) {
        return String::new();
    }

    let mode = match state.mode {
        AppMode::Nav => "NAV",
        AppMode::Search => "SEARCH",
        AppMode::Detail => "DETAIL",
        AppMode::Form(FormKind::Create) => "CREATE",
        AppMode::Form(FormKind::Edit) => "EDIT",
    };
    let mut default = hint_line(state.mode).to_owned();
    if let AppMode::Form(kind) = state.mode {
        default = format!(
            "{} | {default}",
            format_form_field_status(kind, view_data.form.field_index)
        );
    }
    if view_data.pending_submit.is_some() {
        default = format!("saving | {default}");
    }
    if view_data.pending_fetch.is_some() {
        default = format!("fetching | {default}");
    }
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {default}"),
        None => format!("{mode} | {default}"),
    }
}

fn status_hidden_by_overlay(view_data: &ViewData) -> bool {
    view_data.notice.visible || view_data.preview.visible || view_data.help_visible
}

fn hint_line(mode: AppMode) -> &'static str {
    match mode {
        AppMode::Nav => {
            "j/k/h/l move | n/p page | z size | s sort | / search | enter view | a add | e export | r reload | ? help | q quit"
        }
        AppMode::Search => "type to filter | backspace erase | enter/esc done",
        AppMode::Detail => "e edit | v description | esc close",
        AppMode::Form(_) => "tab/shift+tab field | enter submit | esc cancel",
    }
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | ? help\n\
nav: j/k or up/down row | h/l or left/right column | g/G first/last row\n\
nav: n/p or pgdn/pgup page | z cycle page size | s sort by selected column\n\
nav: / search titles | enter view product | a add product | e export page csv\n\
nav: r reload catalog | v description preview | q quit\n\
search: type to filter | backspace erase | enter/esc done\n\
detail: e unlock edit | v description | esc close\n\
form: tab/shift+tab field | type to edit | enter submit | esc cancel\n\
notice: any key close"
}

fn truncate_label(value: &str, max_chars: usize) -> String {
    let mut chars = value.chars();
    let truncated: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{truncated}…")
    } else {
        truncated
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
