//! Interaction routing.
//!
//! Components register in a fixed order. Commands are routed by name to the
//! component that declares them; every other interaction goes to the first
//! component whose `claims` accepts it. Errors never cross the router: they
//! are logged and turned into an ephemeral failure reply.
//!
//! Handlers that do slow work declare a [`Deferral`]; [`Router::respond`]
//! acknowledges those before running the handler and edits the original
//! response with the result.

use crate::interaction::{Deferral, Interaction, InteractionKind, Responder, Response};
use crate::platform::IncomingMessage;
use async_trait::async_trait;
use federal_error::{ModerationError, ModerationResult};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// A slash command a component owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDefinition {
    /// Command name without the slash
    pub name: String,
    /// Description shown in the client
    pub description: String,
    /// Restrict the command to administrators by default
    pub admin_only: bool,
}

impl CommandDefinition {
    /// Command available to everyone.
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            admin_only: false,
        }
    }

    /// Command hidden from non-administrators.
    pub fn admin(name: &str, description: &str) -> Self {
        Self {
            admin_only: true,
            ..Self::new(name, description)
        }
    }
}

/// A component that owns a namespace of interactions.
///
/// # Tracing
///
/// Implementations should instrument `handle` and log state transitions at
/// `info!` and tolerated side-effect failures at `warn!`.
#[async_trait]
pub trait InteractionHandler: Send + Sync {
    /// Component name used in logs.
    fn name(&self) -> &str;

    /// Slash commands the component owns.
    fn commands(&self) -> Vec<CommandDefinition> {
        Vec::new()
    }

    /// Whether the component owns this non-command interaction.
    fn claims(&self, interaction: &Interaction) -> bool;

    /// How to acknowledge an owned interaction before handling it. `None`
    /// answers directly with the handler's response.
    fn deferral(&self, _interaction: &Interaction) -> Option<Deferral> {
        None
    }

    /// Handle an owned interaction and produce its single acknowledgement.
    async fn handle(&self, interaction: &Interaction) -> ModerationResult<Response>;
}

/// A component that observes guild messages.
#[async_trait]
pub trait MessageListener: Send + Sync {
    /// Component name used in logs.
    fn name(&self) -> &str;

    /// Observe a message. Returns whether the component consumed it.
    async fn on_message(&self, message: &IncomingMessage) -> ModerationResult<bool>;
}

/// Ordered registry of interaction handlers and message listeners.
#[derive(Default)]
pub struct Router {
    handlers: Vec<Arc<dyn InteractionHandler>>,
    listeners: Vec<Arc<dyn MessageListener>>,
}

impl Router {
    /// Create an empty router.
    pub fn new() -> Self {
        debug!("Creating new Router");
        Self::default()
    }

    /// Register a handler after those already registered.
    pub fn register(&mut self, handler: Arc<dyn InteractionHandler>) -> &mut Self {
        info!(
            handler = handler.name(),
            commands = handler.commands().len(),
            position = self.handlers.len(),
            "Registering interaction handler"
        );
        self.handlers.push(handler);
        self
    }

    /// Register a message listener after those already registered.
    pub fn listen(&mut self, listener: Arc<dyn MessageListener>) -> &mut Self {
        info!(listener = listener.name(), "Registering message listener");
        self.listeners.push(listener);
        self
    }

    /// Every slash command across all handlers.
    pub fn command_definitions(&self) -> Vec<CommandDefinition> {
        self.handlers.iter().flat_map(|h| h.commands()).collect()
    }

    /// Names of registered handlers in dispatch order.
    pub fn handler_names(&self) -> Vec<String> {
        self.handlers.iter().map(|h| h.name().to_string()).collect()
    }

    fn owner(&self, interaction: &Interaction) -> Option<&Arc<dyn InteractionHandler>> {
        match &interaction.kind {
            InteractionKind::Command { name } => self
                .handlers
                .iter()
                .find(|h| h.commands().iter().any(|c| &c.name == name)),
            _ => self.handlers.iter().find(|h| h.claims(interaction)),
        }
    }

    /// Dispatch an interaction. `None` when no component owns it.
    #[instrument(skip(self, interaction), fields(user = %interaction.user, id = ?interaction.custom_id(), command = ?interaction.command_name()))]
    pub async fn dispatch(&self, interaction: &Interaction) -> Option<Response> {
        let Some(handler) = self.owner(interaction) else {
            debug!("No handler claimed interaction");
            return None;
        };
        debug!(handler = handler.name(), "Interaction claimed");
        Some(run(handler.as_ref(), interaction).await)
    }

    /// Dispatch an interaction and deliver its acknowledgement through
    /// `responder`. Returns whether a component owned it.
    #[instrument(skip(self, interaction, responder), fields(user = %interaction.user, id = ?interaction.custom_id(), command = ?interaction.command_name()))]
    pub async fn respond(&self, interaction: &Interaction, responder: &dyn Responder) -> bool {
        let Some(handler) = self.owner(interaction) else {
            debug!("No handler claimed interaction");
            return false;
        };
        let deferral = handler.deferral(interaction);
        if let Some(deferral) = deferral {
            debug!(handler = handler.name(), ?deferral, "Deferring interaction");
            if let Err(e) = responder.defer(deferral).await {
                error!(handler = handler.name(), error = %e, "Failed to defer interaction");
            }
        }
        let response = run(handler.as_ref(), interaction).await;
        let delivered = match (deferral, &response) {
            (None, response) => responder.respond(response).await,
            (Some(_), Response::Message(reply) | Response::Update(reply)) => {
                responder.edit_original(reply).await
            }
            (Some(_), Response::Modal(modal)) => {
                error!(handler = handler.name(), modal = %modal.custom_id, "Modal cannot follow a deferred acknowledgement");
                Ok(())
            }
        };
        if let Err(e) = delivered {
            error!(handler = handler.name(), error = %e, "Failed to acknowledge interaction");
        }
        true
    }

    /// Offer a message to every listener. Returns whether any consumed it.
    ///
    /// A listener consuming or failing on a message does not hide it from the
    /// listeners after it.
    #[instrument(skip(self, message), fields(channel = %message.channel, author = %message.author))]
    pub async fn dispatch_message(&self, message: &IncomingMessage) -> bool {
        if message.author_bot {
            return false;
        }
        let mut consumed = false;
        for listener in &self.listeners {
            match listener.on_message(message).await {
                Ok(true) => {
                    debug!(listener = listener.name(), "Message consumed");
                    consumed = true;
                }
                Ok(false) => {}
                Err(e) => {
                    error!(listener = listener.name(), error = %e, "Message listener failed");
                }
            }
        }
        consumed
    }
}

async fn run(handler: &dyn InteractionHandler, interaction: &Interaction) -> Response {
    match handler.handle(interaction).await {
        Ok(response) => response,
        Err(e) => failure_response(handler.name(), &e),
    }
}

fn failure_response(handler: &str, err: &ModerationError) -> Response {
    if err.kind().is_internal() {
        error!(handler, error = %err, "Interaction failed");
    } else {
        warn!(handler, error = %err, "Interaction rejected");
    }
    Response::ephemeral(err.kind().user_message())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{ChannelId, MessageId, UserId};
    use crate::interaction::{ActorPermissions, Reply};
    use crate::testing::{Acknowledgement, RecordingResponder};
    use chrono::Utc;
    use federal_error::ModerationErrorKind;
    use parking_lot::Mutex;

    struct Fixed {
        name: &'static str,
        prefix: &'static str,
        fail: bool,
    }

    #[async_trait]
    impl InteractionHandler for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        fn commands(&self) -> Vec<CommandDefinition> {
            vec![CommandDefinition::new(self.name, "test")]
        }

        fn claims(&self, interaction: &Interaction) -> bool {
            interaction
                .custom_id()
                .is_some_and(|id| id.starts_with(self.prefix))
        }

        async fn handle(&self, _interaction: &Interaction) -> ModerationResult<Response> {
            if self.fail {
                return Err(ModerationError::new(ModerationErrorKind::PlatformCall(
                    "boom".to_string(),
                )));
            }
            Ok(Response::ephemeral(self.name))
        }
    }

    fn button(id: &str) -> Interaction {
        Interaction {
            kind: InteractionKind::Button {
                custom_id: id.to_string(),
            },
            user: UserId::from(1),
            username: "ana".to_string(),
            user_tag: "ana".to_string(),
            roles: Vec::new(),
            permissions: ActorPermissions::default(),
            channel: ChannelId::from(5),
            token: "t".to_string(),
        }
    }

    fn router() -> Router {
        let mut router = Router::new();
        router
            .register(Arc::new(Fixed {
                name: "first",
                prefix: "shared",
                fail: false,
            }))
            .register(Arc::new(Fixed {
                name: "second",
                prefix: "shared_more",
                fail: false,
            }))
            .register(Arc::new(Fixed {
                name: "broken",
                prefix: "broken",
                fail: true,
            }));
        router
    }

    #[tokio::test]
    async fn test_first_claim_wins() {
        let response = router().dispatch(&button("shared_more")).await;
        assert_eq!(response.unwrap().content(), Some("first"));
    }

    #[tokio::test]
    async fn test_unclaimed_returns_none() {
        assert!(router().dispatch(&button("other")).await.is_none());
    }

    #[tokio::test]
    async fn test_commands_route_by_name() {
        let mut interaction = button("x");
        interaction.kind = InteractionKind::Command {
            name: "second".to_string(),
        };
        let response = router().dispatch(&interaction).await;
        assert_eq!(response.unwrap().content(), Some("second"));
    }

    #[tokio::test]
    async fn test_internal_errors_become_generic_reply() {
        let response = router().dispatch(&button("broken")).await.unwrap();
        let content = response.content().unwrap();
        assert!(content.starts_with("❌"));
        assert!(!content.contains("boom"));
    }

    /// Records what had been acknowledged by the time it ran.
    struct Slow {
        responder: Arc<RecordingResponder>,
        seen: Mutex<Vec<Acknowledgement>>,
        modal: bool,
    }

    #[async_trait]
    impl InteractionHandler for Slow {
        fn name(&self) -> &str {
            "slow"
        }

        fn claims(&self, _interaction: &Interaction) -> bool {
            true
        }

        fn deferral(&self, _interaction: &Interaction) -> Option<Deferral> {
            Some(Deferral::Reply { ephemeral: true })
        }

        async fn handle(&self, _interaction: &Interaction) -> ModerationResult<Response> {
            *self.seen.lock() = self.responder.acknowledgements();
            if self.modal {
                return Ok(Response::Modal(crate::interaction::Modal {
                    custom_id: "late".to_string(),
                    title: "Late".to_string(),
                    inputs: Vec::new(),
                }));
            }
            Ok(Response::ephemeral("done"))
        }
    }

    fn slow(responder: &Arc<RecordingResponder>, modal: bool) -> (Router, Arc<Slow>) {
        let handler = Arc::new(Slow {
            responder: Arc::clone(responder),
            seen: Mutex::new(Vec::new()),
            modal,
        });
        let mut router = Router::new();
        router.register(handler.clone());
        (router, handler)
    }

    #[tokio::test]
    async fn test_slow_handler_is_deferred_before_it_runs() {
        let responder = Arc::new(RecordingResponder::new());
        let (router, handler) = slow(&responder, false);

        assert!(router.respond(&button("anything"), responder.as_ref()).await);

        let deferred = Acknowledgement::Deferred(Deferral::Reply { ephemeral: true });
        assert_eq!(*handler.seen.lock(), vec![deferred.clone()]);
        assert_eq!(
            responder.acknowledgements(),
            vec![deferred, Acknowledgement::Edited(Reply::ephemeral("done"))]
        );
    }

    #[tokio::test]
    async fn test_fast_handler_answers_directly() {
        let responder = RecordingResponder::new();
        assert!(router().respond(&button("shared"), &responder).await);
        assert_eq!(
            responder.acknowledgements(),
            vec![Acknowledgement::Responded(Response::ephemeral("first"))]
        );
    }

    #[tokio::test]
    async fn test_unclaimed_interaction_is_not_acknowledged() {
        let responder = RecordingResponder::new();
        assert!(!router().respond(&button("other"), &responder).await);
        assert!(responder.acknowledgements().is_empty());
    }

    #[tokio::test]
    async fn test_failed_deferral_still_runs_handler() {
        let responder = Arc::new(RecordingResponder::new());
        responder.fail("defer");
        let (router, handler) = slow(&responder, false);

        assert!(router.respond(&button("anything"), responder.as_ref()).await);

        assert!(handler.seen.lock().is_empty());
        assert_eq!(
            responder.acknowledgements(),
            vec![Acknowledgement::Edited(Reply::ephemeral("done"))]
        );
    }

    #[tokio::test]
    async fn test_modal_after_deferral_is_dropped() {
        let responder = Arc::new(RecordingResponder::new());
        let (router, _handler) = slow(&responder, true);

        router.respond(&button("anything"), responder.as_ref()).await;

        assert_eq!(
            responder.acknowledgements(),
            vec![Acknowledgement::Deferred(Deferral::Reply { ephemeral: true })]
        );
    }

    struct Counting {
        name: &'static str,
        outcome: Result<bool, ()>,
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl MessageListener for Counting {
        fn name(&self) -> &str {
            self.name
        }

        async fn on_message(&self, _message: &IncomingMessage) -> ModerationResult<bool> {
            *self.calls.lock() += 1;
            self.outcome.map_err(|()| {
                ModerationError::new(ModerationErrorKind::Persistence("disk".to_string()))
            })
        }
    }

    fn counting(name: &'static str, outcome: Result<bool, ()>) -> Arc<Counting> {
        Arc::new(Counting {
            name,
            outcome,
            calls: Mutex::new(0),
        })
    }

    fn incoming(author_bot: bool) -> IncomingMessage {
        IncomingMessage {
            id: MessageId::from(7),
            channel: ChannelId::from(5),
            author: UserId::from(1),
            author_tag: "ana".to_string(),
            author_bot,
            content: "oi <#9>".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_every_listener_sees_a_consumed_message() {
        let first = counting("first", Ok(true));
        let failing = counting("failing", Err(()));
        let last = counting("last", Ok(true));
        let mut router = Router::new();
        router
            .listen(first.clone())
            .listen(failing.clone())
            .listen(last.clone());

        assert!(router.dispatch_message(&incoming(false)).await);
        assert_eq!(*first.calls.lock(), 1);
        assert_eq!(*failing.calls.lock(), 1);
        assert_eq!(*last.calls.lock(), 1);
    }

    #[tokio::test]
    async fn test_unconsumed_and_bot_messages() {
        let only = counting("only", Ok(false));
        let mut router = Router::new();
        router.listen(only.clone());

        assert!(!router.dispatch_message(&incoming(false)).await);
        assert!(!router.dispatch_message(&incoming(true)).await);
        assert_eq!(*only.calls.lock(), 1);
    }
}
