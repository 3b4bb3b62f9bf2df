//! User embed drafts, collection and maintenance.

mod test_utils;

use federal_error::ModerationErrorKind;
use federal_moderation::embeds::EMBEDS_FILE;
use federal_moderation::interaction::Response;
use federal_moderation::{ChannelId, EmbedDraft, EmbedManager, InteractionHandler, MessageListener};
use std::time::Duration;
use test_utils::{Guild, button, command, message, modal, select};

const ORIGIN: ChannelId = ChannelId(131);
const TARGET: ChannelId = ChannelId(130);

fn manager(guild: &Guild) -> EmbedManager {
    EmbedManager::new(
        guild.config.data_file(EMBEDS_FILE),
        guild.platform.clone(),
        guild.config.embeds.collector_timeout(),
    )
}

fn draft(title: &str) -> EmbedDraft {
    EmbedDraft::from_input(title, "Descrição", Some("#ff0000"), None, Some("Rodapé"))
}

#[tokio::test]
async fn test_mention_sends_and_records_embed() {
    let guild = Guild::new();
    let embeds = manager(&guild);
    let author = guild.member(42, "maria", &[]);

    embeds.begin_draft(author.id, ORIGIN, "token-42", draft("Aviso"));
    assert!(embeds.has_pending(author.id));

    let consumed = embeds
        .collect(&message(&author, ORIGIN, "envie em <#130> por favor"))
        .await
        .unwrap();

    assert!(consumed);
    assert!(!embeds.has_pending(author.id));
    let sent = guild.platform.messages(TARGET);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].content.embeds[0].title.as_deref(), Some("Aviso"));

    let recorded = embeds.embeds_of(author.id);
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].channel_id, TARGET);
    assert_eq!(recorded[0].message_id, sent[0].id);
    assert_eq!(recorded[0].embed_data.color, "#ff0000");
    assert_eq!(
        guild.platform.follow_ups(),
        vec![(
            "token-42".to_string(),
            "✅ Embed enviada com sucesso para <#130>!".to_string()
        )]
    );
}

#[tokio::test]
async fn test_collector_ignores_unrelated_messages() {
    let guild = Guild::new();
    let embeds = manager(&guild);
    let author = guild.member(42, "maria", &[]);
    let other = guild.member(43, "joao", &[]);
    embeds.begin_draft(author.id, ORIGIN, "token-42", draft("Aviso"));

    let no_mention = message(&author, ORIGIN, "sem canal");
    let wrong_author = message(&other, ORIGIN, "<#130>");
    let wrong_channel = message(&author, ChannelId(120), "<#130>");
    for msg in [no_mention, wrong_author, wrong_channel] {
        assert!(!embeds.collect(&msg).await.unwrap());
    }

    assert!(embeds.has_pending(author.id));
    assert!(guild.platform.messages(TARGET).is_empty());
}

#[tokio::test]
async fn test_send_failure_is_reported_and_not_recorded() {
    let guild = Guild::new();
    let embeds = manager(&guild);
    let author = guild.member(42, "maria", &[]);
    embeds.begin_draft(author.id, ORIGIN, "token-42", draft("Aviso"));

    let consumed = embeds
        .collect(&message(&author, ORIGIN, "<#999>"))
        .await
        .unwrap();

    assert!(consumed);
    assert!(embeds.embeds_of(author.id).is_empty());
    let (_, notice) = &guild.platform.follow_ups()[0];
    assert!(notice.starts_with("❌"));
}

#[tokio::test]
async fn test_unrecorded_embed_is_still_reported() {
    let guild = Guild::new();
    let embeds = manager(&guild);
    let author = guild.member(42, "maria", &[]);
    std::fs::create_dir_all(guild.config.data_file(EMBEDS_FILE)).unwrap();
    embeds.begin_draft(author.id, ORIGIN, "token-42", draft("Aviso"));

    let err = embeds
        .collect(&message(&author, ORIGIN, "envie em <#130>"))
        .await
        .unwrap_err();

    assert!(matches!(err.kind(), ModerationErrorKind::Persistence(_)));
    assert_eq!(guild.platform.messages(TARGET).len(), 1);
    assert!(!embeds.has_pending(author.id));
    let follow_ups = guild.platform.follow_ups();
    assert_eq!(follow_ups.len(), 1);
    assert_eq!(follow_ups[0].0, "token-42");
    assert!(follow_ups[0].1.starts_with("⚠️"), "{}", follow_ups[0].1);
    assert!(follow_ups[0].1.contains("<#130>"));
}

#[tokio::test(start_paused = true)]
async fn test_draft_expires_without_mention() {
    let guild = Guild::new();
    let embeds = manager(&guild);
    let author = guild.member(42, "maria", &[]);
    embeds.begin_draft(author.id, ORIGIN, "token-42", draft("Aviso"));

    tokio::time::sleep(Duration::from_secs(61)).await;

    assert!(!embeds.has_pending(author.id));
    assert_eq!(
        guild.platform.follow_ups(),
        vec![(
            "token-42".to_string(),
            "⌛ Tempo esgotado! Você não mencionou um canal. A criação da embed foi cancelada."
                .to_string()
        )]
    );
    assert!(!embeds.collect(&message(&author, ORIGIN, "<#130>")).await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_new_draft_outlives_previous_timer() {
    let guild = Guild::new();
    let embeds = manager(&guild);
    let author = guild.member(42, "maria", &[]);

    embeds.begin_draft(author.id, ORIGIN, "token-a", draft("Primeira"));
    tokio::time::sleep(Duration::from_secs(30)).await;
    embeds.begin_draft(author.id, ORIGIN, "token-b", draft("Segunda"));
    tokio::time::sleep(Duration::from_secs(31)).await;

    assert!(embeds.has_pending(author.id), "first timer must not cancel the second draft");
    assert!(guild.platform.follow_ups().is_empty());

    embeds.collect(&message(&author, ORIGIN, "<#130>")).await.unwrap();
    let sent = guild.platform.messages(TARGET);
    assert_eq!(sent[0].content.embeds[0].title.as_deref(), Some("Segunda"));
}

#[tokio::test]
async fn test_edit_and_delete() {
    let guild = Guild::new();
    let embeds = manager(&guild);
    let author = guild.member(42, "maria", &[]);
    for title in ["Um", "Dois"] {
        embeds.begin_draft(author.id, ORIGIN, "token-42", draft(title));
        embeds.collect(&message(&author, ORIGIN, "<#130>")).await.unwrap();
    }

    let edited = embeds.edit(author.id, 1, draft("Dois editada")).await.unwrap();
    assert_eq!(edited.embed_data.title, "Dois editada");
    let stored = guild.platform.messages(TARGET);
    assert_eq!(stored[1].content.embeds[0].title.as_deref(), Some("Dois editada"));

    let err = embeds.edit(author.id, 5, draft("x")).await.unwrap_err();
    assert!(matches!(err.kind(), ModerationErrorKind::InvalidInput(_)));

    let removed = embeds.delete(author.id, 0).await.unwrap();
    assert_eq!(removed.embed_data.title, "Um");
    assert_eq!(guild.platform.messages(TARGET).len(), 1);
    assert_eq!(embeds.embeds_of(author.id).len(), 1);

    embeds.delete(author.id, 0).await.unwrap();
    assert!(embeds.embeds_of(author.id).is_empty());
    let err = embeds.delete(author.id, 0).await.unwrap_err();
    assert!(matches!(err.kind(), ModerationErrorKind::InvalidInput(_)));
}

#[tokio::test]
async fn test_delete_survives_missing_message() {
    let guild = Guild::new();
    let embeds = manager(&guild);
    let author = guild.member(42, "maria", &[]);
    embeds.begin_draft(author.id, ORIGIN, "token-42", draft("Um"));
    embeds.collect(&message(&author, ORIGIN, "<#130>")).await.unwrap();
    guild.platform.fail("delete_message");

    embeds.delete(author.id, 0).await.unwrap();

    assert!(embeds.embeds_of(author.id).is_empty());
}

#[tokio::test]
async fn test_command_flow() {
    let guild = Guild::new();
    let embeds = manager(&guild);
    let author = guild.member(42, "maria", &[]);

    let menu = embeds.handle(&command(&author, ORIGIN, "setupembed")).await.unwrap();
    assert_eq!(menu.content(), Some("Selecione uma ação:"));

    let empty = embeds
        .handle(&button(&author, ORIGIN, "setupembed_delete"))
        .await
        .unwrap();
    assert_eq!(
        empty,
        Response::Update(federal_moderation::interaction::Reply::ephemeral(
            "❌ Você não tem embeds enviadas para excluir."
        ))
    );

    let Response::Modal(form) = embeds
        .handle(&button(&author, ORIGIN, "setupembed_create"))
        .await
        .unwrap()
    else {
        panic!("expected create form");
    };
    assert_eq!(form.inputs.len(), 5);

    let submit = modal(
        &author,
        ORIGIN,
        "setupembed_createEmbedModal",
        &[("embedTitle", "Aviso"), ("embedDesc", "Texto"), ("embedColor", "azul")],
    );
    assert!(embeds.claims(&submit));
    embeds.handle(&submit).await.unwrap();
    assert!(embeds.has_pending(author.id));
    assert!(embeds.on_message(&message(&author, ORIGIN, "<#130>")).await.unwrap());
    assert_eq!(embeds.embeds_of(author.id)[0].embed_data.color, "#3498DB");

    let pick = select(&author, ORIGIN, "setupembed_editEmbedSelect", "0");
    let Response::Modal(edit_form) = embeds.handle(&pick).await.unwrap() else {
        panic!("expected edit form");
    };
    assert_eq!(edit_form.custom_id, "setupembed_editEmbedModal_0");
    assert_eq!(edit_form.inputs[0].value.as_deref(), Some("Aviso"));
}
