//! Punishment registry behaviour against the mock platform.

mod test_utils;

use chrono::Duration;
use federal_moderation::interaction::Response;
use federal_moderation::punishment::{PUNISHMENTS_FILE, PunishmentHandler, RoleRevocation};
use federal_moderation::testing::RoleChange;
use federal_moderation::{
    InteractionHandler, PanelReconciler, PunishmentCategory, PunishmentRegistry, RoleId, UserId,
};
use federal_error::ModerationErrorKind;
use std::sync::Arc;
use test_utils::{Guild, modal, select, with_manage_roles};

const ISSUER: UserId = UserId(500);

fn registry(guild: &Guild) -> PunishmentRegistry {
    PunishmentRegistry::new(
        guild.config.data_file(PUNISHMENTS_FILE),
        guild.platform.clone(),
        guild.config.punishments.clone(),
        guild.config.guild.guild_id,
    )
}

#[tokio::test]
async fn test_leve_scenario() {
    let guild = Guild::new();
    let member = guild.member(42, "Agente Silva #77", &[]);
    let registry = registry(&guild);

    let applied = registry.apply("42", "leve", "R1", ISSUER).await.unwrap();
    let record = applied.record;

    assert!(applied.role_sync_error.is_none());
    assert_eq!(record.punishment_type, PunishmentCategory::Leve);
    assert_eq!(record.expires_at, Some(record.punished_at + Duration::days(3)));
    assert_eq!(guild.platform.roles_of(member.id), vec![guild.config.punishments.roles.leve]);

    let log = guild.platform.messages(guild.config.punishments.log_channel);
    assert_eq!(log.len(), 1);
    let audit = &log[0].content.embeds[0];
    assert_eq!(audit.field_value("QRA do Punido:"), Some("<@42>"));
    assert_eq!(audit.field_value("Motivo:"), Some("R1"));
    assert_eq!(audit.field_value("Expira em:"), Some("Em 3 dias"));
    assert_eq!(audit.field_value("ID do Punido:"), Some("`77`"));

    let stored = registry.punishments();
    assert_eq!(stored[0].log_message_id, Some(log[0].id));
}

#[tokio::test]
async fn test_apply_then_remove_clears_role() {
    let guild = Guild::new();
    let member = guild.member(42, "Agente Silva", &[]);
    let registry = registry(&guild);

    let record = registry.apply("<@42>", "grave", "R", ISSUER).await.unwrap().record;
    let (removed, revocation) = registry.remove(&record.id, ISSUER).await.unwrap();

    assert_eq!(removed.id, record.id);
    assert!(matches!(revocation, RoleRevocation::Revoked));
    assert!(guild.platform.roles_of(member.id).is_empty());
    assert!(registry.punishments().is_empty());

    let log = guild.platform.messages(guild.config.punishments.log_channel);
    let audit = &log[0].content.embeds[0];
    assert_eq!(audit.title.as_deref(), Some("🚫 Punição Removida"));
    assert_eq!(audit.field_value("Quem Removeu:"), Some("<@500>"));
    assert_eq!(audit.field_value("Expira em:"), Some("Originalmente em 7 dias"));
}

#[tokio::test]
async fn test_no_stacking() {
    let guild = Guild::new();
    let roles = guild.config.punishments.roles;
    let member = guild.member(42, "Agente Silva", &[roles.grave]);
    let registry = registry(&guild);

    registry.apply("42", "leve", "R", ISSUER).await.unwrap();

    assert_eq!(guild.platform.roles_of(member.id), vec![roles.leve]);
}

#[tokio::test]
async fn test_exoneracao_is_not_removable() {
    let guild = Guild::new();
    let other = RoleId::from(77);
    let member = guild.member(42, "Agente Silva", &[other]);
    guild.member(43, "Agente Souza", &[]);
    let registry = registry(&guild);

    let exonerated = registry
        .apply("42", "Exoneração", "R", ISSUER)
        .await
        .unwrap()
        .record;
    registry.apply("43", "media", "R", ISSUER).await.unwrap();

    let removable = registry.list_removable();
    assert_eq!(removable.len(), 1);
    assert!(removable.iter().all(|p| p.id != exonerated.id));
    assert_eq!(exonerated.expires_at, None);
    assert_eq!(
        guild.platform.roles_of(member.id),
        vec![guild.config.punishments.roles.exoneracao]
    );

    let err = registry.remove(&exonerated.id, ISSUER).await.unwrap_err();
    assert!(matches!(err.kind(), ModerationErrorKind::Permission(_)));
    assert_eq!(registry.punishments().len(), 2);
}

#[tokio::test]
async fn test_unknown_target_and_token() {
    let guild = Guild::new();
    let registry = registry(&guild);

    let err = registry.apply("ninguem", "leve", "R", ISSUER).await.unwrap_err();
    assert!(matches!(err.kind(), ModerationErrorKind::Resolution(_)));

    let err = registry.apply("42", "advertencia", "R", ISSUER).await.unwrap_err();
    assert!(matches!(err.kind(), ModerationErrorKind::InvalidInput(_)));

    let err = registry.remove("nope", ISSUER).await.unwrap_err();
    assert!(matches!(err.kind(), ModerationErrorKind::NotFound(_)));
}

#[tokio::test]
async fn test_audit_failure_keeps_record() {
    let guild = Guild::new();
    let member = guild.member(42, "Agente Silva", &[]);
    guild.platform.fail("send_message");
    let registry = registry(&guild);

    let applied = registry.apply("42", "media", "R", ISSUER).await.unwrap();

    assert_eq!(applied.record.log_message_id, None);
    assert_eq!(registry.punishments().len(), 1);
    assert_eq!(
        guild.platform.roles_of(member.id),
        vec![guild.config.punishments.roles.media]
    );
}

#[tokio::test]
async fn test_role_failure_reported_but_record_kept() {
    let guild = Guild::new();
    guild.member(42, "Agente Silva", &[]);
    guild.platform.fail("add_role");
    let registry = registry(&guild);

    let applied = registry.apply("42", "leve", "R", ISSUER).await.unwrap();

    assert!(applied.role_sync_error.is_some());
    assert_eq!(registry.punishments().len(), 1);
}

#[tokio::test]
async fn test_remove_after_member_left() {
    let guild = Guild::new();
    let member = guild.member(42, "Agente Silva", &[]);
    let registry = registry(&guild);
    let record = registry.apply("42", "leve", "R", ISSUER).await.unwrap().record;

    guild.platform.kick(member.id);
    let (_, revocation) = registry.remove(&record.id, ISSUER).await.unwrap();

    assert!(matches!(revocation, RoleRevocation::MemberGone));
    assert!(
        !guild
            .platform
            .role_changes()
            .contains(&RoleChange::Removed(member.id, guild.config.punishments.roles.leve))
    );
}

#[tokio::test]
async fn test_handler_requires_manage_roles() {
    let guild = Guild::new();
    let staff = guild.member(500, "Delegado Costa", &[]);
    guild.member(42, "Agente Silva", &[]);
    let registry = Arc::new(registry(&guild));
    let handler = PunishmentHandler::new(
        Arc::clone(&registry),
        PanelReconciler::new(guild.platform.clone()),
    );
    let panel = guild.config.punishments.panel_channel;
    let fields = [
        ("punish_qra", "42"),
        ("punish_reason", "Atraso"),
        ("punish_type", "leve"),
    ];

    let denied = handler
        .handle(&modal(&staff, panel, "punish_apply_modal", &fields))
        .await
        .unwrap_err();
    assert!(matches!(denied.kind(), ModerationErrorKind::Permission(_)));
    assert!(registry.punishments().is_empty());

    let applied = handler
        .handle(&with_manage_roles(modal(
            &staff,
            panel,
            "punish_apply_modal",
            &fields,
        )))
        .await
        .unwrap();
    assert!(applied.content().unwrap().starts_with("✅ Punição de **Advertência Leve**"));

    let token = registry.punishments()[0].id.clone();
    let removed = handler
        .handle(&with_manage_roles(select(
            &staff,
            panel,
            "punish_remove_select",
            &token,
        )))
        .await
        .unwrap();
    assert!(matches!(removed, Response::Update(_)));
    assert!(registry.punishments().is_empty());
}
