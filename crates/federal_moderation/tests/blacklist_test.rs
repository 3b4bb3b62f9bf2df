//! Blacklist registry and its pinned summary.

mod test_utils;

use federal_error::ModerationErrorKind;
use federal_moderation::blacklist::{BLACKLIST_FILE, PANEL_MARKER};
use federal_moderation::interaction::Response;
use federal_moderation::{Blacklist, InteractionHandler, PanelReconciler};
use test_utils::{Guild, button, command, modal, select, with_admin};

fn blacklist(guild: &Guild) -> Blacklist {
    Blacklist::new(
        guild.config.data_file(BLACKLIST_FILE),
        PanelReconciler::new(guild.platform.clone()),
        guild.config.blacklist.clone(),
    )
}

fn listing(guild: &Guild) -> String {
    let pinned = guild.platform.pinned(guild.config.blacklist.panel_channel);
    assert_eq!(pinned.len(), 1);
    let embed = &pinned[0].content.embeds[0];
    assert!(embed.title.as_deref().unwrap().contains(PANEL_MARKER));
    embed
        .field_value("Membros Atualmente na Blacklist:")
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_duplicate_id_is_rejected() {
    let guild = Guild::new();
    let list = blacklist(&guild);

    list.add("X", "123", None).await.unwrap();
    let err = list.add("Y", "123", Some("outra")).await.unwrap_err();

    assert!(matches!(err.kind(), ModerationErrorKind::AlreadyPresent(_)));
    assert_eq!(list.entries().len(), 1);
    assert_eq!(list.entries()[0].name, "X");
}

#[tokio::test]
async fn test_non_numeric_id_is_invalid() {
    let guild = Guild::new();
    let list = blacklist(&guild);

    for id in ["abc", "12a", "", "  "] {
        let err = list.add("X", id, None).await.unwrap_err();
        assert!(matches!(err.kind(), ModerationErrorKind::InvalidInput(_)));
    }
    assert!(list.entries().is_empty());
}

#[tokio::test]
async fn test_panel_follows_entries() {
    let guild = Guild::new();
    let list = blacklist(&guild);

    list.add("Fulano", "123", Some("Traição")).await.unwrap();
    list.add("Ciclano", "456", None).await.unwrap();
    assert_eq!(
        listing(&guild),
        "``1.`` **Nome:** Fulano | **ID:** 123 | **Motivo:** Traição\n``2.`` **Nome:** Ciclano | **ID:** 456"
    );

    list.remove("123").await.unwrap();
    assert_eq!(listing(&guild), "``1.`` **Nome:** Ciclano | **ID:** 456");

    list.remove("456").await.unwrap();
    assert_eq!(listing(&guild), "Nenhum membro na blacklist no momento.");
}

#[tokio::test]
async fn test_remove_unknown_id() {
    let guild = Guild::new();
    let list = blacklist(&guild);

    let err = list.remove("999").await.unwrap_err();

    assert!(matches!(err.kind(), ModerationErrorKind::NotFound(_)));
}

#[tokio::test]
async fn test_panel_failure_does_not_lose_entry() {
    let guild = Guild::new();
    guild.platform.fail("send_message");
    let list = blacklist(&guild);

    list.add("X", "123", None).await.unwrap();

    assert_eq!(list.entries().len(), 1);
}

#[tokio::test]
async fn test_entries_survive_restart() {
    let guild = Guild::new();
    blacklist(&guild).add("X", "123", None).await.unwrap();

    assert_eq!(blacklist(&guild).entries()[0].id, "123");
}

#[tokio::test]
async fn test_panel_interactions() {
    let guild = Guild::new();
    let list = blacklist(&guild);
    let staff = guild.member(500, "delegado", &[guild.staff_role()]);
    let channel = guild.config.blacklist.panel_channel;

    let empty = list.handle(&button(&staff, channel, "blacklist_remove")).await.unwrap();
    assert_eq!(
        empty.content(),
        Some("A blacklist está vazia. Não há membros para remover.")
    );

    let form = list.handle(&button(&staff, channel, "blacklist_add")).await.unwrap();
    assert!(matches!(form, Response::Modal(_)));

    let submit = modal(
        &staff,
        channel,
        "blacklist_add_modal",
        &[("blacklist_name", "X"), ("blacklist_id", " 123 "), ("blacklist_reason", "")],
    );
    assert!(list.claims(&submit));
    list.handle(&submit).await.unwrap();
    assert_eq!(list.entries()[0].id, "123");
    assert_eq!(list.entries()[0].reason, None);

    let pick = select(&staff, channel, "blacklist_remove_select", "123");
    let Response::Update(reply) = list.handle(&pick).await.unwrap() else {
        panic!("expected picker update");
    };
    assert_eq!(reply.content, "✅ Membro com ID `123` removido da blacklist.");

    let Response::Update(reply) = list.handle(&pick).await.unwrap() else {
        panic!("expected picker update");
    };
    assert_eq!(reply.content, "❌ Membro não encontrado na blacklist.");
}

#[tokio::test]
async fn test_refresh_command_requires_admin() {
    let guild = Guild::new();
    let list = blacklist(&guild);
    let staff = guild.member(500, "delegado", &[guild.staff_role()]);
    let channel = guild.config.blacklist.panel_channel;

    let err = list
        .handle(&command(&staff, channel, "setblacklist"))
        .await
        .unwrap_err();
    assert!(matches!(err.kind(), ModerationErrorKind::Permission(_)));
    assert!(guild.platform.pinned(channel).is_empty());

    list.handle(&with_admin(command(&staff, channel, "setblacklist")))
        .await
        .unwrap();
    assert_eq!(guild.platform.pinned(channel).len(), 1);

    let definitions = list.commands();
    assert!(definitions[0].admin_only);
}
