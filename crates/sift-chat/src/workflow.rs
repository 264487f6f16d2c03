//! The conversation workflow: input gate, session dispatch, polling, rendering

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use sift_api::{AssistantClient, ConversationStarted, MessageSent, ReplyPayload, ReplyStatus};

use crate::{
    entry::MessageEntry,
    interpret::{MAX_FOLLOW_UPS, display_text, follow_up_questions},
    poll::{PollOutcome, PollPolicy, poll_until_terminal},
    renderer::Renderer,
    session::Session,
    table::build_table,
};

/// Label on the transient entry shown while polling
pub const LOADING_TEXT: &str = "Thinking...";
/// Shown when the assistant reports a FAILED reply
pub const FAILED_TEXT: &str = "Sorry, I encountered an error processing your request.";
/// Shown when the poll attempt budget runs out
pub const TIMEOUT_TEXT: &str = "Request timed out. Please try again.";
/// Fallback when conversation creation fails without a server message
pub const START_FAILURE_TEXT: &str = "Failed to start conversation";
/// Fallback when a follow-up message fails without a server message
pub const SEND_FAILURE_TEXT: &str = "Failed to send message";

/// Backend collaborator the workflow talks to.
///
/// `AssistantClient` is the production implementation; tests supply a mock.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn start_conversation(&self, content: &str) -> sift_api::Result<ConversationStarted>;

    async fn continue_conversation(
        &self,
        conversation_id: &str,
        content: &str,
    ) -> sift_api::Result<MessageSent>;

    async fn message_status(
        &self,
        conversation_id: &str,
        message_id: &str,
    ) -> sift_api::Result<ReplyPayload>;

    async fn query_result(
        &self,
        conversation_id: &str,
        message_id: &str,
        attachment_id: &str,
    ) -> sift_api::Result<Value>;
}

#[async_trait]
impl Backend for AssistantClient {
    async fn start_conversation(&self, content: &str) -> sift_api::Result<ConversationStarted> {
        AssistantClient::start_conversation(self, content).await
    }

    async fn continue_conversation(
        &self,
        conversation_id: &str,
        content: &str,
    ) -> sift_api::Result<MessageSent> {
        AssistantClient::continue_conversation(self, conversation_id, content).await
    }

    async fn message_status(
        &self,
        conversation_id: &str,
        message_id: &str,
    ) -> sift_api::Result<ReplyPayload> {
        AssistantClient::message_status(self, conversation_id, message_id).await
    }

    async fn query_result(
        &self,
        conversation_id: &str,
        message_id: &str,
        attachment_id: &str,
    ) -> sift_api::Result<Value> {
        AssistantClient::query_result(self, conversation_id, message_id, attachment_id).await
    }
}

/// How a `submit` call was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The message was accepted and the workflow ran to a terminal outcome
    Completed,
    /// The trimmed message was empty; nothing happened
    IgnoredEmpty,
    /// A submission was already in flight; nothing happened
    IgnoredBusy,
}

/// Drives one conversational query cycle per accepted submission.
///
/// Owns no conversation state itself: the `Session` and `Renderer` are
/// passed into each call, so the same workflow can serve a fresh session
/// after a reset.
pub struct ChatWorkflow {
    backend: Arc<dyn Backend>,
    policy: PollPolicy,
}

impl ChatWorkflow {
    /// Create a workflow against a backend with the default poll policy
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            policy: PollPolicy::default(),
        }
    }

    /// Override the poll policy
    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Submit one user message through the input gate.
    ///
    /// Empty (after trimming) and concurrent submissions are silently
    /// ignored. The gate is released on every exit path; failures surface
    /// as one error entry in the log instead of a returned error.
    pub async fn submit(
        &self,
        session: &mut Session,
        log: &mut dyn Renderer,
        message: &str,
    ) -> SubmitOutcome {
        let content = message.trim();
        if content.is_empty() {
            return SubmitOutcome::IgnoredEmpty;
        }
        if !session.begin_processing() {
            tracing::debug!("submission refused, another is in flight");
            return SubmitOutcome::IgnoredBusy;
        }

        log.append(MessageEntry::user(content));

        let result = self.dispatch(session, log, content).await;
        session.finish_processing();

        if let Err(text) = result {
            log.append(MessageEntry::error(text));
        }
        SubmitOutcome::Completed
    }

    /// Explicit reset: forget the conversation and clear the log
    pub fn reset(&self, session: &mut Session, log: &mut dyn Renderer) {
        session.reset();
        log.clear();
    }

    /// Start or continue the conversation, then poll for the reply.
    /// Returns the user-facing failure text on error.
    async fn dispatch(
        &self,
        session: &mut Session,
        log: &mut dyn Renderer,
        content: &str,
    ) -> Result<(), String> {
        let (conversation_id, message_id) = match session.conversation_id() {
            None => {
                let started = self
                    .backend
                    .start_conversation(content)
                    .await
                    .map_err(|e| failure_text(&e, START_FAILURE_TEXT))?;
                session.activate(started.conversation_id.clone());
                tracing::debug!(conversation = %started.conversation_id, "conversation started");
                (started.conversation_id, started.message_id)
            }
            Some(id) => {
                let id = id.to_string();
                // The conversation id survives a failed follow-up
                let sent = self
                    .backend
                    .continue_conversation(&id, content)
                    .await
                    .map_err(|e| failure_text(&e, SEND_FAILURE_TEXT))?;
                (id, sent.message_id)
            }
        };

        self.poll_reply(log, &conversation_id, &message_id).await;
        Ok(())
    }

    /// Poll for the reply and render exactly one terminal outcome
    async fn poll_reply(&self, log: &mut dyn Renderer, conversation_id: &str, message_id: &str) {
        let loading = MessageEntry::loading(LOADING_TEXT);
        let loading_id = loading.id.clone();
        log.append(loading);

        let backend = self.backend.clone();
        let conversation = conversation_id.to_string();
        let message = message_id.to_string();
        let outcome = poll_until_terminal(
            &self.policy,
            |reply: &ReplyPayload| reply.status.is_terminal(),
            move || {
                let backend = backend.clone();
                let conversation = conversation.clone();
                let message = message.clone();
                async move { backend.message_status(&conversation, &message).await }
            },
        )
        .await;

        log.remove(&loading_id);

        match outcome {
            PollOutcome::Resolved(reply) if reply.status == ReplyStatus::Completed => {
                self.render_reply(log, conversation_id, message_id, &reply)
                    .await;
            }
            PollOutcome::Resolved(_) => {
                log.append(MessageEntry::error(FAILED_TEXT));
            }
            PollOutcome::Exhausted => {
                log.append(MessageEntry::error(TIMEOUT_TEXT));
            }
        }
    }

    /// Interpret a completed reply: text, then one table per query
    /// attachment, then at most `MAX_FOLLOW_UPS` follow-up suggestions.
    /// Secondary fetch failures degrade gracefully; the text is already out.
    async fn render_reply(
        &self,
        log: &mut dyn Renderer,
        conversation_id: &str,
        message_id: &str,
        reply: &ReplyPayload,
    ) {
        log.append(MessageEntry::assistant(display_text(reply)));

        for attachment in &reply.attachments {
            if !attachment.has_query_result() {
                continue;
            }
            let Some(attachment_id) = attachment.result_id() else {
                tracing::warn!("query attachment without an id, skipping result fetch");
                continue;
            };
            match self
                .backend
                .query_result(conversation_id, message_id, attachment_id)
                .await
            {
                Ok(result) => {
                    if let Some(table) = build_table(&result) {
                        log.append(MessageEntry::table(table));
                    }
                }
                Err(e) => {
                    tracing::warn!(attachment = attachment_id, error = %e, "query result fetch failed");
                }
            }
        }

        let questions = follow_up_questions(reply);
        if !questions.is_empty() {
            let shown: Vec<String> = questions.into_iter().take(MAX_FOLLOW_UPS).collect();
            log.append(MessageEntry::follow_ups(shown));
        }
    }
}

/// Server-supplied message if the backend sent one, else the fixed fallback
fn failure_text(error: &sift_api::Error, fallback: &str) -> String {
    error
        .server_message()
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryBody, Role};
    use crate::renderer::Transcript;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Scripted backend. Responses are consumed in order; an empty status
    /// queue reports a pending reply, so an unscripted poll never resolves.
    #[derive(Default)]
    struct MockBackend {
        starts: Mutex<VecDeque<sift_api::Result<ConversationStarted>>>,
        continues: Mutex<VecDeque<sift_api::Result<MessageSent>>>,
        statuses: Mutex<VecDeque<sift_api::Result<ReplyPayload>>>,
        results: Mutex<HashMap<String, sift_api::Result<Value>>>,
        start_calls: AtomicU32,
        continue_calls: AtomicU32,
        status_calls: AtomicU32,
        result_requests: Mutex<Vec<String>>,
    }

    impl MockBackend {
        fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn script_start(&self, conversation_id: &str, message_id: &str) {
            self.starts.lock().push_back(Ok(serde_json::from_value(
                json!({"conversation_id": conversation_id, "message_id": message_id}),
            )
            .unwrap()));
        }

        fn script_start_error(&self, error: sift_api::Error) {
            self.starts.lock().push_back(Err(error));
        }

        fn script_continue(&self, message_id: &str) {
            self.continues.lock().push_back(Ok(serde_json::from_value(
                json!({"message_id": message_id}),
            )
            .unwrap()));
        }

        fn script_continue_error(&self, error: sift_api::Error) {
            self.continues.lock().push_back(Err(error));
        }

        fn script_status(&self, reply: Value) {
            self.statuses
                .lock()
                .push_back(Ok(serde_json::from_value(reply).unwrap()));
        }

        fn script_status_error(&self) {
            self.statuses
                .lock()
                .push_back(Err(sift_api::Error::api("connection reset")));
        }

        fn script_result(&self, attachment_id: &str, result: Value) {
            self.results
                .lock()
                .insert(attachment_id.to_string(), Ok(result));
        }

        fn script_result_error(&self, attachment_id: &str) {
            self.results.lock().insert(
                attachment_id.to_string(),
                Err(sift_api::Error::api("statement expired")),
            );
        }
    }

    #[async_trait]
    impl Backend for MockBackend {
        async fn start_conversation(
            &self,
            _content: &str,
        ) -> sift_api::Result<ConversationStarted> {
            self.start_calls.fetch_add(1, Ordering::Relaxed);
            self.starts
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(sift_api::Error::UnexpectedResponse("unscripted".into())))
        }

        async fn continue_conversation(
            &self,
            _conversation_id: &str,
            _content: &str,
        ) -> sift_api::Result<MessageSent> {
            self.continue_calls.fetch_add(1, Ordering::Relaxed);
            self.continues
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(sift_api::Error::UnexpectedResponse("unscripted".into())))
        }

        async fn message_status(
            &self,
            _conversation_id: &str,
            _message_id: &str,
        ) -> sift_api::Result<ReplyPayload> {
            self.status_calls.fetch_add(1, Ordering::Relaxed);
            self.statuses
                .lock()
                .pop_front()
                .unwrap_or_else(|| Ok(ReplyPayload::default()))
        }

        async fn query_result(
            &self,
            _conversation_id: &str,
            _message_id: &str,
            attachment_id: &str,
        ) -> sift_api::Result<Value> {
            self.result_requests.lock().push(attachment_id.to_string());
            self.results
                .lock()
                .remove(attachment_id)
                .unwrap_or_else(|| Err(sift_api::Error::api("no result scripted")))
        }
    }

    fn completed_reply(description: &str) -> Value {
        json!({
            "status": "COMPLETED",
            "attachments": [{"query": {"description": description}}]
        })
    }

    fn texts(log: &Transcript) -> Vec<&str> {
        log.entries().iter().filter_map(|e| e.text()).collect()
    }

    fn loading_entries(log: &Transcript) -> usize {
        log.entries().iter().filter(|e| e.is_loading()).count()
    }

    // --- Input gate ---

    #[tokio::test(start_paused = true)]
    async fn test_empty_message_is_ignored() {
        let backend = MockBackend::new();
        let workflow = ChatWorkflow::new(backend.clone());
        let mut session = Session::new();
        let mut log = Transcript::new();

        for input in ["", "   ", "\n\t "] {
            let outcome = workflow.submit(&mut session, &mut log, input).await;
            assert_eq!(outcome, SubmitOutcome::IgnoredEmpty);
        }
        assert!(log.is_empty());
        assert!(!session.is_processing());
        assert_eq!(backend.start_calls.load(Ordering::Relaxed), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submission_refused_while_processing() {
        let backend = MockBackend::new();
        let workflow = ChatWorkflow::new(backend.clone());
        let mut session = Session::new();
        let mut log = Transcript::new();

        session.begin_processing();
        let outcome = workflow.submit(&mut session, &mut log, "hello").await;
        assert_eq!(outcome, SubmitOutcome::IgnoredBusy);
        assert!(log.is_empty());
        assert_eq!(backend.start_calls.load(Ordering::Relaxed), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gate_released_after_success_and_failure() {
        let backend = MockBackend::new();
        backend.script_start("c-1", "m-1");
        backend.script_status(completed_reply("done"));
        let workflow = ChatWorkflow::new(backend.clone());
        let mut session = Session::new();
        let mut log = Transcript::new();

        workflow.submit(&mut session, &mut log, "first").await;
        assert!(!session.is_processing());

        // Unscripted continue fails; the gate must still reopen
        workflow.submit(&mut session, &mut log, "second").await;
        assert!(!session.is_processing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_message_is_trimmed() {
        let backend = MockBackend::new();
        backend.script_start("c-1", "m-1");
        backend.script_status(completed_reply("ok"));
        let workflow = ChatWorkflow::new(backend.clone());
        let mut session = Session::new();
        let mut log = Transcript::new();

        workflow.submit(&mut session, &mut log, "  top stores  ").await;
        assert_eq!(log.entries()[0].text(), Some("top stores"));
    }

    // --- Session state machine ---

    #[tokio::test(start_paused = true)]
    async fn test_first_submit_creates_conversation_then_reuses_it() {
        let backend = MockBackend::new();
        backend.script_start("c-1", "m-1");
        backend.script_status(completed_reply("first answer"));
        backend.script_continue("m-2");
        backend.script_status(completed_reply("second answer"));
        let workflow = ChatWorkflow::new(backend.clone());
        let mut session = Session::new();
        let mut log = Transcript::new();

        workflow.submit(&mut session, &mut log, "one").await;
        assert_eq!(session.conversation_id(), Some("c-1"));

        workflow.submit(&mut session, &mut log, "two").await;
        assert_eq!(session.conversation_id(), Some("c-1"));
        assert_eq!(backend.start_calls.load(Ordering::Relaxed), 1);
        assert_eq!(backend.continue_calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_failure_surfaces_server_message() {
        let backend = MockBackend::new();
        backend.script_start_error(sift_api::Error::api("Assistant API error: 403"));
        let workflow = ChatWorkflow::new(backend.clone());
        let mut session = Session::new();
        let mut log = Transcript::new();

        workflow.submit(&mut session, &mut log, "hello").await;

        assert_eq!(session.conversation_id(), None);
        let last = log.entries().last().unwrap();
        assert_eq!(last.role, Role::Error);
        assert_eq!(last.text(), Some("Assistant API error: 403"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_transport_failure_uses_fallback_text() {
        let backend = MockBackend::new();
        backend.script_start_error(sift_api::Error::UnexpectedResponse("garbage".into()));
        let workflow = ChatWorkflow::new(backend.clone());
        let mut session = Session::new();
        let mut log = Transcript::new();

        workflow.submit(&mut session, &mut log, "hello").await;
        assert_eq!(log.entries().last().unwrap().text(), Some(START_FAILURE_TEXT));
    }

    #[tokio::test(start_paused = true)]
    async fn test_continue_failure_preserves_conversation_id() {
        let backend = MockBackend::new();
        backend.script_start("c-1", "m-1");
        backend.script_status(completed_reply("ok"));
        backend.script_continue_error(sift_api::Error::UnexpectedResponse("boom".into()));
        let workflow = ChatWorkflow::new(backend.clone());
        let mut session = Session::new();
        let mut log = Transcript::new();

        workflow.submit(&mut session, &mut log, "one").await;
        workflow.submit(&mut session, &mut log, "two").await;

        assert_eq!(session.conversation_id(), Some("c-1"));
        assert_eq!(log.entries().last().unwrap().text(), Some(SEND_FAILURE_TEXT));
    }

    // --- Poller ---

    #[tokio::test(start_paused = true)]
    async fn test_loading_entry_removed_on_every_terminal_path() {
        // COMPLETED
        let backend = MockBackend::new();
        backend.script_start("c-1", "m-1");
        backend.script_status(completed_reply("done"));
        let workflow = ChatWorkflow::new(backend);
        let mut session = Session::new();
        let mut log = Transcript::new();
        workflow.submit(&mut session, &mut log, "q").await;
        assert_eq!(loading_entries(&log), 0);

        // FAILED
        let backend = MockBackend::new();
        backend.script_start("c-1", "m-1");
        backend.script_status(json!({"status": "FAILED"}));
        let workflow = ChatWorkflow::new(backend);
        let mut session = Session::new();
        let mut log = Transcript::new();
        workflow.submit(&mut session, &mut log, "q").await;
        assert_eq!(loading_entries(&log), 0);
        assert_eq!(log.entries().last().unwrap().text(), Some(FAILED_TEXT));

        // Timeout (statuses unscripted: pending forever)
        let backend = MockBackend::new();
        backend.script_start("c-1", "m-1");
        let workflow = ChatWorkflow::new(backend);
        let mut session = Session::new();
        let mut log = Transcript::new();
        workflow.submit(&mut session, &mut log, "q").await;
        assert_eq!(loading_entries(&log), 0);
        assert_eq!(log.entries().last().unwrap().text(), Some(TIMEOUT_TEXT));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_after_thirty_pending_polls() {
        let backend = MockBackend::new();
        backend.script_start("c-1", "m-1");
        let workflow = ChatWorkflow::new(backend.clone());
        let mut session = Session::new();
        let mut log = Transcript::new();

        workflow.submit(&mut session, &mut log, "q").await;

        assert_eq!(backend.status_calls.load(Ordering::Relaxed), 30);
        let texts = texts(&log);
        assert_eq!(texts, vec!["q", TIMEOUT_TEXT]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_fetch_errors_are_soft_retries() {
        let backend = MockBackend::new();
        backend.script_start("c-1", "m-1");
        backend.script_status_error();
        backend.script_status_error();
        backend.script_status(completed_reply("recovered"));
        let workflow = ChatWorkflow::new(backend.clone());
        let mut session = Session::new();
        let mut log = Transcript::new();

        workflow.submit(&mut session, &mut log, "q").await;

        assert_eq!(backend.status_calls.load(Ordering::Relaxed), 3);
        assert_eq!(texts(&log), vec!["q", "recovered"]);
    }

    // --- Response interpretation ---

    #[tokio::test(start_paused = true)]
    async fn test_assistant_text_from_description() {
        let backend = MockBackend::new();
        backend.script_start("c-1", "m-1");
        backend.script_status(completed_reply("Revenue is $1,234"));
        let workflow = ChatWorkflow::new(backend);
        let mut session = Session::new();
        let mut log = Transcript::new();

        workflow.submit(&mut session, &mut log, "revenue?").await;

        let assistant = &log.entries()[1];
        assert_eq!(assistant.role, Role::Assistant);
        assert_eq!(assistant.text(), Some("Revenue is $1,234"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_query_attachment_yields_a_table_in_order() {
        let backend = MockBackend::new();
        backend.script_start("c-1", "m-1");
        backend.script_status(json!({
            "status": "COMPLETED",
            "attachments": [
                {
                    "attachment_id": "a-1",
                    "query": {"description": "Two tables", "statement_id": "s-1"}
                },
                {"query": {"description": "no statement id, skipped"}},
                {
                    "id": "legacy-2",
                    "query": {"statement_id": "s-2"}
                }
            ]
        }));
        backend.script_result(
            "a-1",
            json!({"columns": ["alpha"], "data_array": [[1]]}),
        );
        backend.script_result(
            "legacy-2",
            json!({"columns": ["beta"], "data_array": [[2]]}),
        );
        let workflow = ChatWorkflow::new(backend.clone());
        let mut session = Session::new();
        let mut log = Transcript::new();

        workflow.submit(&mut session, &mut log, "q").await;

        // Fetched by attachment_id first, then by the legacy id fallback
        assert_eq!(*backend.result_requests.lock(), vec!["a-1", "legacy-2"]);

        let tables: Vec<_> = log
            .entries()
            .iter()
            .filter_map(|e| match &e.body {
                EntryBody::Table { table } => Some(table),
                _ => None,
            })
            .collect();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].columns, vec!["Alpha"]);
        assert_eq!(tables[1].columns, vec!["Beta"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_fetch_failure_degrades_gracefully() {
        let backend = MockBackend::new();
        backend.script_start("c-1", "m-1");
        backend.script_status(json!({
            "status": "COMPLETED",
            "attachments": [{
                "attachment_id": "a-1",
                "query": {"description": "text survives", "statement_id": "s-1"}
            }]
        }));
        backend.script_result_error("a-1");
        let workflow = ChatWorkflow::new(backend);
        let mut session = Session::new();
        let mut log = Transcript::new();

        workflow.submit(&mut session, &mut log, "q").await;

        assert_eq!(texts(&log), vec!["q", "text survives"]);
        assert!(!session.is_processing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_at_most_three_follow_ups_rendered() {
        let backend = MockBackend::new();
        backend.script_start("c-1", "m-1");
        backend.script_status(json!({
            "status": "COMPLETED",
            "attachments": [{"query": {"description": "here"}}],
            "suggested_followups": ["Q1", "Q2", "Q3", "Q4"]
        }));
        let workflow = ChatWorkflow::new(backend);
        let mut session = Session::new();
        let mut log = Transcript::new();

        workflow.submit(&mut session, &mut log, "q").await;

        let follow_ups = log
            .entries()
            .iter()
            .find_map(|e| match &e.body {
                EntryBody::FollowUps { questions } => Some(questions.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(follow_ups, vec!["Q1", "Q2", "Q3"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_follow_up_resubmission_continues_conversation() {
        let backend = MockBackend::new();
        backend.script_start("c-1", "m-1");
        backend.script_status(json!({
            "status": "COMPLETED",
            "attachments": [{"query": {"description": "first"}}],
            "suggested_followups": ["And by region?"]
        }));
        backend.script_continue("m-2");
        backend.script_status(completed_reply("by region"));
        let workflow = ChatWorkflow::new(backend.clone());
        let mut session = Session::new();
        let mut log = Transcript::new();

        workflow.submit(&mut session, &mut log, "totals?").await;
        let question = log
            .entries()
            .iter()
            .find_map(|e| match &e.body {
                EntryBody::FollowUps { questions } => Some(questions[0].clone()),
                _ => None,
            })
            .unwrap();

        // A follow-up button feeds its question back through the gate
        workflow.submit(&mut session, &mut log, &question).await;

        assert_eq!(backend.continue_calls.load(Ordering::Relaxed), 1);
        assert!(texts(&log).contains(&"And by region?"));
        assert!(texts(&log).contains(&"by region"));
    }

    // --- Reset ---

    #[tokio::test(start_paused = true)]
    async fn test_reset_clears_session_and_log() {
        let backend = MockBackend::new();
        backend.script_start("c-1", "m-1");
        backend.script_status(completed_reply("hello"));
        backend.script_start("c-2", "m-9");
        backend.script_status(completed_reply("fresh"));
        let workflow = ChatWorkflow::new(backend.clone());
        let mut session = Session::new();
        let mut log = Transcript::new();

        workflow.submit(&mut session, &mut log, "one").await;
        workflow.reset(&mut session, &mut log);

        assert_eq!(session.conversation_id(), None);
        assert!(log.is_empty());

        // Next submission creates a brand-new conversation
        workflow.submit(&mut session, &mut log, "two").await;
        assert_eq!(session.conversation_id(), Some("c-2"));
        assert_eq!(backend.start_calls.load(Ordering::Relaxed), 2);
    }
}
