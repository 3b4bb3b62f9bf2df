//! Pinned panel reconciliation.

mod test_utils;

use federal_moderation::message::{Embed, OutgoingMessage};
use federal_moderation::{ChannelId, PanelOutcome, PanelReconciler, Platform};
use test_utils::Guild;

fn panel(title: &str) -> OutgoingMessage {
    OutgoingMessage::embed(Embed::new().title(title))
}

#[tokio::test]
async fn test_ensure_panel_is_idempotent() {
    let guild = Guild::new();
    let panels = PanelReconciler::new(guild.platform.clone());
    let channel = ChannelId(100);

    let first = panels
        .ensure_panel(channel, "PAINEL", || panel("PAINEL DE TESTE"))
        .await
        .unwrap();
    let second = panels
        .ensure_panel(channel, "PAINEL", || panel("PAINEL DE TESTE"))
        .await
        .unwrap();

    assert!(matches!(first, PanelOutcome::Created(_)));
    assert_eq!(second, PanelOutcome::Existing(first.message()));
    assert_eq!(guild.platform.pinned(channel).len(), 1);
    assert_eq!(guild.platform.messages(channel).len(), 1);
}

#[tokio::test]
async fn test_refresh_edits_in_place() {
    let guild = Guild::new();
    let panels = PanelReconciler::new(guild.platform.clone());
    let channel = ChannelId(110);
    let created = panels
        .ensure_panel(channel, "LISTA", || panel("LISTA v1"))
        .await
        .unwrap();

    let refreshed = panels
        .refresh_panel(channel, "LISTA", panel("LISTA v2"))
        .await
        .unwrap();

    assert_eq!(refreshed, PanelOutcome::Refreshed(created.message()));
    let pinned = guild.platform.pinned(channel);
    assert_eq!(pinned.len(), 1);
    assert_eq!(pinned[0].content.embeds[0].title.as_deref(), Some("LISTA v2"));
}

#[tokio::test]
async fn test_refresh_creates_missing_panel() {
    let guild = Guild::new();
    let panels = PanelReconciler::new(guild.platform.clone());

    let outcome = panels
        .refresh_panel(ChannelId(130), "Acesso", panel("Acesso Restrito"))
        .await
        .unwrap();

    assert!(matches!(outcome, PanelOutcome::Created(_)));
    assert_eq!(guild.platform.pinned(ChannelId(130)).len(), 1);
}

#[tokio::test]
async fn test_unpinned_or_foreign_messages_are_ignored() {
    let guild = Guild::new();
    let panels = PanelReconciler::new(guild.platform.clone());
    let channel = ChannelId(120);
    guild
        .platform
        .send_message(channel, panel("PAINEL antigo"))
        .await
        .unwrap();

    let found = panels.find_panel(channel, "PAINEL").await.unwrap();

    assert_eq!(found, None, "only pinned messages count");
}
