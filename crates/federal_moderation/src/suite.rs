//! Assembly of every moderation component behind one router.

use crate::access::AccessPanel;
use crate::blacklist::{BLACKLIST_FILE, Blacklist};
use crate::config::ModerationConfig;
use crate::embeds::{EMBEDS_FILE, EmbedManager};
use crate::interaction::{Interaction, Responder, Response};
use crate::panel::{PanelOutcome, PanelReconciler};
use crate::platform::{IncomingMessage, Platform};
use crate::punishment::{PUNISHMENTS_FILE, PunishmentHandler, PunishmentRegistry};
use crate::router::{CommandDefinition, Router};
use crate::ticket::{TICKETS_FILE, TicketDesk, TicketHandler};
use federal_error::ModerationResult;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// The moderation core wired to a platform.
pub struct Moderation {
    router: Router,
    tickets: Arc<TicketHandler>,
    punishments: Arc<PunishmentHandler>,
    blacklist: Arc<Blacklist>,
    access: Arc<AccessPanel>,
    embeds: Arc<EmbedManager>,
}

impl Moderation {
    /// Build every component from `config`.
    ///
    /// Interactions are offered to components in the order tickets,
    /// punishments, blacklist, access, embeds.
    pub fn new(config: &ModerationConfig, platform: Arc<dyn Platform>) -> Self {
        let guild = config.guild.guild_id;
        let panels = PanelReconciler::new(Arc::clone(&platform));

        let desk = Arc::new(TicketDesk::new(
            config.data_file(TICKETS_FILE),
            Arc::clone(&platform),
            config.tickets.clone(),
            guild,
            config.guild.staff_role,
        ));
        let tickets = Arc::new(TicketHandler::new(
            desk,
            Arc::clone(&platform),
            panels.clone(),
        ));
        let registry = Arc::new(PunishmentRegistry::new(
            config.data_file(PUNISHMENTS_FILE),
            Arc::clone(&platform),
            config.punishments.clone(),
            guild,
        ));
        let punishments = Arc::new(PunishmentHandler::new(registry, panels.clone()));
        let blacklist = Arc::new(Blacklist::new(
            config.data_file(BLACKLIST_FILE),
            panels.clone(),
            config.blacklist.clone(),
        ));
        let access = Arc::new(AccessPanel::new(
            Arc::clone(&platform),
            panels,
            config.access.clone(),
        ));
        let embeds = Arc::new(EmbedManager::new(
            config.data_file(EMBEDS_FILE),
            platform,
            config.embeds.collector_timeout(),
        ));

        let mut router = Router::new();
        router
            .register(tickets.clone())
            .register(punishments.clone())
            .register(blacklist.clone())
            .register(access.clone())
            .register(embeds.clone());
        router.listen(tickets.clone()).listen(embeds.clone());
        info!(handlers = ?router.handler_names(), "Moderation components ready");

        Self {
            router,
            tickets,
            punishments,
            blacklist,
            access,
            embeds,
        }
    }

    /// The interaction router.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Ticket desk handler.
    pub fn tickets(&self) -> &Arc<TicketHandler> {
        &self.tickets
    }

    /// Punishment panel handler.
    pub fn punishments(&self) -> &Arc<PunishmentHandler> {
        &self.punishments
    }

    /// Blacklist.
    pub fn blacklist(&self) -> &Arc<Blacklist> {
        &self.blacklist
    }

    /// Access panel.
    pub fn access(&self) -> &Arc<AccessPanel> {
        &self.access
    }

    /// User embed manager.
    pub fn embeds(&self) -> &Arc<EmbedManager> {
        &self.embeds
    }

    /// Slash commands to register with the platform.
    pub fn command_definitions(&self) -> Vec<CommandDefinition> {
        self.router.command_definitions()
    }

    /// Route an interaction to its owning component.
    pub async fn dispatch(&self, interaction: &Interaction) -> Option<Response> {
        self.router.dispatch(interaction).await
    }

    /// Route an interaction and deliver its acknowledgement, deferring first
    /// when the owning component does slow work.
    pub async fn respond(&self, interaction: &Interaction, responder: &dyn Responder) -> bool {
        self.router.respond(interaction, responder).await
    }

    /// Offer a guild message to the listeners.
    pub async fn dispatch_message(&self, message: &IncomingMessage) -> bool {
        self.router.dispatch_message(message).await
    }

    /// Make sure every panel exists. Failures are logged and the remaining
    /// panels are still attempted.
    #[instrument(skip(self))]
    pub async fn reconcile_panels(&self) -> Vec<(&'static str, ModerationResult<PanelOutcome>)> {
        let results = vec![
            ("punishments", self.punishments.ensure_panel().await),
            ("blacklist", self.blacklist.ensure_panel().await),
            ("tickets", self.tickets.ensure_panel().await),
            ("access", self.access.ensure_panel().await),
        ];
        for (panel, result) in &results {
            match result {
                Ok(outcome) => info!(panel, ?outcome, "Panel reconciled"),
                Err(e) => warn!(panel, error = %e, "Failed to reconcile panel"),
            }
        }
        results
    }
}
