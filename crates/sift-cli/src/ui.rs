//! TUI implementation for sift

use std::cell::Cell as StdCell;
use std::time::Instant;

use tokio::sync::mpsc;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::Paragraph,
};
use sift_chat::{
    ChatWorkflow, EntryBody, EntryId, MessageEntry, Renderer, Session, Transcript,
};
use sift_tui::{
    App, Theme,
    input::Action,
    widgets::{InputBox, MessageLog, spinner_frame},
};

/// Requests sent from UI to the workflow task
#[derive(Debug)]
enum UiRequest {
    /// User submitted a question
    Submit(String),
    /// User requested a conversation reset
    Reset,
}

/// Updates sent from the workflow task back to the UI
#[derive(Debug)]
enum UiEvent {
    Append(MessageEntry),
    Remove(EntryId),
    Clear,
    /// The current submission finished (any outcome)
    Idle,
}

/// Renderer that mirrors the log locally and forwards every change to the UI
struct ForwardingRenderer {
    log: Transcript,
    tx: mpsc::UnboundedSender<UiEvent>,
}

impl ForwardingRenderer {
    fn new(tx: mpsc::UnboundedSender<UiEvent>) -> Self {
        Self {
            log: Transcript::new(),
            tx,
        }
    }
}

impl Renderer for ForwardingRenderer {
    fn append(&mut self, entry: MessageEntry) {
        let _ = self.tx.send(UiEvent::Append(entry.clone()));
        self.log.append(entry);
    }

    fn remove(&mut self, id: &EntryId) -> bool {
        let removed = self.log.remove(id);
        if removed {
            let _ = self.tx.send(UiEvent::Remove(id.clone()));
        }
        removed
    }

    fn clear(&mut self) {
        self.log.clear();
        let _ = self.tx.send(UiEvent::Clear);
    }
}

/// Workflow task: owns the session and serves one request at a time
async fn run_workflow(
    workflow: ChatWorkflow,
    mut renderer: ForwardingRenderer,
    mut requests: mpsc::UnboundedReceiver<UiRequest>,
) {
    let mut session = Session::new();
    while let Some(request) = requests.recv().await {
        match request {
            UiRequest::Submit(text) => {
                workflow.submit(&mut session, &mut renderer, &text).await;
            }
            UiRequest::Reset => {
                workflow.reset(&mut session, &mut renderer);
            }
        }
        let _ = renderer.tx.send(UiEvent::Idle);
    }
}

/// TUI application state
struct ChatState {
    /// Local copy of the message log
    entries: Vec<MessageEntry>,
    /// Input box
    input: InputBox,
    /// Manual scroll offset; ignored while following the newest entry
    scroll: usize,
    /// Whether the view sticks to the newest entry
    follow: bool,
    /// Whether a submission is in flight
    processing: bool,
    /// Theme
    theme: Theme,
    /// Backend base URL, shown in the status line
    base_url: String,
    /// Empty-state example questions
    examples: Vec<String>,
    request_tx: mpsc::UnboundedSender<UiRequest>,
    events_rx: mpsc::UnboundedReceiver<UiEvent>,
    /// Spinner start time for animation
    spinner_start: Instant,
    /// Message area size from the last render, for scroll clamping
    viewport: StdCell<(u16, u16)>,
}

impl ChatState {
    fn new(
        request_tx: mpsc::UnboundedSender<UiRequest>,
        events_rx: mpsc::UnboundedReceiver<UiEvent>,
        base_url: String,
        examples: Vec<String>,
    ) -> Self {
        Self {
            entries: vec![],
            input: InputBox::new().with_placeholder("Ask a question about your data..."),
            scroll: 0,
            follow: true,
            processing: false,
            theme: Theme::dark(),
            base_url,
            examples,
            request_tx,
            events_rx,
            spinner_start: Instant::now(),
            viewport: StdCell::new((80, 24)),
        }
    }

    /// Apply pending updates from the workflow task
    fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                UiEvent::Append(entry) => {
                    self.entries.push(entry);
                    self.follow = true;
                }
                UiEvent::Remove(id) => {
                    self.entries.retain(|e| e.id != id);
                }
                UiEvent::Clear => {
                    self.entries.clear();
                    self.scroll = 0;
                    self.follow = true;
                }
                UiEvent::Idle => {
                    self.processing = false;
                }
            }
        }
    }

    fn submit(&mut self, text: String) {
        if text.trim().is_empty() || self.processing {
            return;
        }
        self.processing = true;
        self.follow = true;
        let _ = self.request_tx.send(UiRequest::Submit(text));
    }

    /// The list a bare digit key selects from: empty-state examples, or the
    /// follow-up suggestions if they are the newest entry
    fn selectable_questions(&self) -> Option<Vec<String>> {
        if self.entries.is_empty() {
            if self.examples.is_empty() {
                return None;
            }
            return Some(self.examples.clone());
        }
        match &self.entries.last()?.body {
            EntryBody::FollowUps { questions } => Some(questions.clone()),
            _ => None,
        }
    }

    fn handle_action(&mut self, action: Action) -> bool {
        self.drain_events();
        let (width, height) = self.viewport.get();

        match action {
            Action::Quit => return false,
            Action::Reset => {
                self.processing = false;
                let _ = self.request_tx.send(UiRequest::Reset);
            }
            Action::Submit => {
                let text = self.input.content().to_string();
                self.input.clear();
                self.submit(text);
            }
            Action::Char(c) => {
                // A bare digit picks an example or follow-up question
                if self.input.is_empty() {
                    if let (Some(questions), Some(digit)) =
                        (self.selectable_questions(), c.to_digit(10))
                    {
                        if digit >= 1 {
                            if let Some(question) = questions.get(digit as usize - 1) {
                                self.submit(question.clone());
                                return true;
                            }
                        }
                    }
                }
                self.input.handle_action(&Action::Char(c), width);
            }
            Action::Up => self.scroll_by(-1, height),
            Action::Down => self.scroll_by(1, height),
            Action::PageUp => self.scroll_by(-(height as i64), height),
            Action::PageDown => self.scroll_by(height as i64, height),
            other => {
                self.input.handle_action(&other, width);
            }
        }
        true
    }

    fn scroll_by(&mut self, delta: i64, height: u16) {
        let (width, _) = self.viewport.get();
        let max_scroll = self.max_scroll(width as usize, height as usize);
        let current = if self.follow { max_scroll } else { self.scroll };
        let next = (current as i64 + delta).clamp(0, max_scroll as i64) as usize;
        self.scroll = next;
        self.follow = next >= max_scroll;
    }

    fn max_scroll(&self, width: usize, height: usize) -> usize {
        self.message_log().line_count(width).saturating_sub(height)
    }

    fn message_log(&self) -> MessageLog<'_> {
        MessageLog::new(&self.entries, &self.theme)
            .spinner(spinner_frame(self.spinner_start.elapsed()))
            .examples(&self.examples)
    }

    fn status_line(&self) -> Line<'static> {
        let state = if self.processing {
            Span::styled(
                format!("{} working", spinner_frame(self.spinner_start.elapsed())),
                self.theme.warning_style(),
            )
        } else {
            Span::styled("● ready".to_string(), self.theme.success_style())
        };
        Line::from(vec![
            Span::raw(" "),
            state,
            Span::styled(
                format!("  {}  ctrl+r reset · ctrl+c quit", self.base_url),
                self.theme.dim_style(),
            ),
        ])
    }
}

impl sift_tui::app::AppState for ChatState {
    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let messages_area = chunks[0];
        self.viewport.set((messages_area.width, messages_area.height));

        let log = self.message_log();
        let scroll = if self.follow {
            self.max_scroll(messages_area.width as usize, messages_area.height as usize)
        } else {
            self.scroll
        };
        frame.render_widget(log.scroll(scroll), messages_area);

        self.input
            .render(chunks[1], frame.buffer_mut(), &self.theme);

        frame.render_widget(Paragraph::new(self.status_line()), chunks[2]);
    }

    fn tick(&mut self) {
        self.drain_events();
    }
}

/// Run the interactive TUI against the given workflow
pub async fn run_tui(
    workflow: ChatWorkflow,
    base_url: String,
    examples: Vec<String>,
) -> anyhow::Result<()> {
    let (request_tx, request_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let renderer = ForwardingRenderer::new(event_tx);
    let worker = tokio::spawn(run_workflow(workflow, renderer, request_rx));

    let mut app = App::new()?;
    let mut state = ChatState::new(request_tx, event_rx, base_url, examples);
    let result = app
        .run_async(&mut state, |state, action| {
            let keep_going = state.handle_action(action);
            async move { keep_going }
        })
        .await;

    // The UI is gone; an in-flight poll has nothing left to render into
    worker.abort();
    result?;
    Ok(())
}
