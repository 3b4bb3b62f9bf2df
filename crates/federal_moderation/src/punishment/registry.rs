use super::audit::{applied_embed, removed_embed};
use super::record::generate_token;
use super::{Punishment, PunishmentCategory};
use crate::config::PunishmentConfig;
use crate::ids::{GuildId, UserId};
use crate::message::OutgoingMessage;
use crate::platform::{Member, Platform};
use crate::resolver::resolve_member;
use chrono::Utc;
use federal_error::{ModerationError, ModerationErrorKind, ModerationResult, PlatformError};
use federal_storage::JsonStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Punishment record file name inside the data directory.
pub const PUNISHMENTS_FILE: &str = "punicoes.json";

/// Outcome of a successful `apply`.
#[derive(Debug, Clone)]
pub struct AppliedPunishment {
    /// The persisted record
    pub record: Punishment,
    /// Role synchronisation failure, if any. The record is kept regardless.
    pub role_sync_error: Option<PlatformError>,
}

/// What happened to the category role on `remove`.
#[derive(Debug, Clone)]
pub enum RoleRevocation {
    /// The role was revoked
    Revoked,
    /// The member no longer held the role
    NotHeld,
    /// The member left the guild
    MemberGone,
    /// The revocation call failed
    Failed(PlatformError),
}

/// Owns the punishment records and keeps category roles in step with them.
pub struct PunishmentRegistry {
    store: JsonStore<Vec<Punishment>>,
    platform: Arc<dyn Platform>,
    config: PunishmentConfig,
    guild: GuildId,
}

impl PunishmentRegistry {
    /// Create a registry persisting to `path`.
    pub fn new(
        path: impl Into<PathBuf>,
        platform: Arc<dyn Platform>,
        config: PunishmentConfig,
        guild: GuildId,
    ) -> Self {
        Self {
            store: JsonStore::new(path),
            platform,
            config,
            guild,
        }
    }

    /// Registry configuration.
    pub fn config(&self) -> &PunishmentConfig {
        &self.config
    }

    /// Every active punishment, in issue order.
    pub fn punishments(&self) -> Vec<Punishment> {
        self.store.load()
    }

    /// Active punishments staff may lift (never the non-revocable tier).
    pub fn list_removable(&self) -> Vec<Punishment> {
        self.store
            .load()
            .into_iter()
            .filter(Punishment::is_revocable)
            .collect()
    }

    /// Apply a punishment to the member named by `target`.
    ///
    /// The record is persisted before any platform side effect. A failed audit
    /// post is logged; a failed role sync is returned in the outcome.
    #[instrument(skip(self, reason))]
    pub async fn apply(
        &self,
        target: &str,
        category_tag: &str,
        reason: &str,
        issuer: UserId,
    ) -> ModerationResult<AppliedPunishment> {
        let category = PunishmentCategory::parse(category_tag).ok_or_else(|| {
            ModerationError::new(ModerationErrorKind::InvalidInput(
                "Tipo de punição inválido. Use Leve, Media, Grave ou Exoneração.".to_string(),
            ))
        })?;
        let member = resolve_member(self.platform.as_ref(), target).await?;

        let now = Utc::now();
        let mut record = Punishment {
            id: generate_token(now),
            member_id: member.id,
            member_name: member.display_name.clone(),
            punishment_type: category,
            role_id: category.role(&self.config.roles),
            reason: reason.to_string(),
            punisher_id: issuer,
            punished_at: now,
            expires_at: category.validity().map(|validity| now + validity),
            log_message_id: None,
        };
        self.store.update(|records| records.push(record.clone()))?;
        info!(id = %record.id, member = %member.id, %category, "Punishment recorded");

        let audit = applied_embed(&record, self.config.image_url.as_deref(), now);
        match self
            .platform
            .send_message(self.config.log_channel, OutgoingMessage::embed(audit))
            .await
        {
            Ok(message) => {
                record.log_message_id = Some(message);
                let id = record.id.clone();
                let backfill = self.store.modify(|records| {
                    let stored = records.iter_mut().find(|p| p.id == id)?;
                    stored.log_message_id = Some(message);
                    Some(())
                });
                if let Err(e) = backfill {
                    warn!(error = %e, "Failed to backfill audit message id");
                }
            }
            Err(e) => warn!(error = %e, "Failed to post punishment audit message"),
        }

        let role_sync_error = self.sync_roles(&member, category).await.err();
        if let Some(e) = &role_sync_error {
            error!(error = %e, "Punishment recorded but role sync failed");
        }

        Ok(AppliedPunishment {
            record,
            role_sync_error,
        })
    }

    async fn sync_roles(
        &self,
        member: &Member,
        category: PunishmentCategory,
    ) -> Result<(), PlatformError> {
        let category_roles = PunishmentCategory::all_roles(&self.config.roles);
        for role in category_roles.iter().filter(|r| member.has_role(**r)) {
            self.platform
                .remove_role(
                    member.id,
                    *role,
                    "Removendo cargos de punição antigos para aplicar novo.",
                )
                .await?;
        }

        let role = category.role(&self.config.roles);
        self.platform
            .add_role(member.id, role, &format!("Punição: {}", category.label()))
            .await?;

        if category == PunishmentCategory::Exoneracao && !member.bot {
            let everyone = self.guild.everyone_role();
            for held in member
                .roles
                .iter()
                .filter(|r| **r != everyone && !category_roles.contains(r))
            {
                self.platform
                    .remove_role(member.id, *held, "Exoneração: Removendo todos os cargos")
                    .await?;
            }
        }
        debug!(member = %member.id, %role, "Roles synchronised");
        Ok(())
    }

    /// Lift the punishment identified by `token`.
    ///
    /// The record is deleted first. Revoking the role and editing the audit
    /// message are best-effort.
    #[instrument(skip(self))]
    pub async fn remove(
        &self,
        token: &str,
        remover: UserId,
    ) -> ModerationResult<(Punishment, RoleRevocation)> {
        let record = self.store.try_update(|records| {
            let index = records.iter().position(|p| p.id == token).ok_or_else(|| {
                ModerationError::new(ModerationErrorKind::NotFound(
                    "Punição não encontrada ou já removida.".to_string(),
                ))
            })?;
            if !records[index].is_revocable() {
                return Err(ModerationError::new(ModerationErrorKind::Permission(
                    "Punições de Exoneração não podem ser removidas.".to_string(),
                )));
            }
            Ok::<_, ModerationError>(records.remove(index))
        })?;
        info!(id = %record.id, member = %record.member_id, "Punishment removed from registry");

        let revocation = self.revoke_role(&record).await;

        if let Some(message) = record.log_message_id {
            let embed = removed_embed(&record, remover, self.config.image_url.as_deref(), Utc::now());
            if let Err(e) = self
                .platform
                .edit_message(self.config.log_channel, message, OutgoingMessage::embed(embed))
                .await
            {
                warn!(error = %e, %message, "Failed to edit punishment audit message");
            }
        }

        Ok((record, revocation))
    }

    async fn revoke_role(&self, record: &Punishment) -> RoleRevocation {
        let member = match self.platform.member(record.member_id).await {
            Ok(Some(member)) => member,
            Ok(None) => return RoleRevocation::MemberGone,
            Err(e) => {
                warn!(error = %e, "Failed to fetch punished member");
                return RoleRevocation::Failed(e);
            }
        };
        if !member.has_role(record.role_id) {
            return RoleRevocation::NotHeld;
        }
        match self
            .platform
            .remove_role(member.id, record.role_id, "Punição removida manualmente.")
            .await
        {
            Ok(()) => RoleRevocation::Revoked,
            Err(e) => {
                error!(error = %e, "Failed to revoke punishment role");
                RoleRevocation::Failed(e)
            }
        }
    }
}
