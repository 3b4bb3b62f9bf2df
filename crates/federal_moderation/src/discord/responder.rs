//! Interaction acknowledgements over serenity's HTTP client.

use super::conversions;
use crate::interaction::{Deferral, Reply, Responder, Response};
use async_trait::async_trait;
use federal_error::{PlatformError, PlatformResult};
use serenity::all as sy;
use std::sync::Arc;

/// Answers one gateway interaction.
pub struct SerenityResponder<'a> {
    http: &'a Arc<sy::Http>,
    interaction: &'a sy::Interaction,
}

impl<'a> SerenityResponder<'a> {
    /// Responder for `interaction`.
    pub fn new(http: &'a Arc<sy::Http>, interaction: &'a sy::Interaction) -> Self {
        Self { http, interaction }
    }

    async fn create(
        &self,
        operation: &str,
        builder: sy::CreateInteractionResponse,
    ) -> PlatformResult<()> {
        let result = match self.interaction {
            sy::Interaction::Command(i) => i.create_response(self.http, builder).await,
            sy::Interaction::Component(i) => i.create_response(self.http, builder).await,
            sy::Interaction::Modal(i) => i.create_response(self.http, builder).await,
            _ => return Err(PlatformError::new(operation, "Unsupported interaction type")),
        };
        result.map_err(|e| PlatformError::new(operation, e.to_string()))
    }
}

#[async_trait]
impl Responder for SerenityResponder<'_> {
    async fn defer(&self, deferral: Deferral) -> PlatformResult<()> {
        self.create("defer", conversions::deferral(deferral)).await
    }

    async fn respond(&self, response: &Response) -> PlatformResult<()> {
        self.create("respond", conversions::response(response)).await
    }

    async fn edit_original(&self, reply: &Reply) -> PlatformResult<()> {
        let builder = conversions::edit_original(reply);
        let result = match self.interaction {
            sy::Interaction::Command(i) => i.edit_response(self.http, builder).await,
            sy::Interaction::Component(i) => i.edit_response(self.http, builder).await,
            sy::Interaction::Modal(i) => i.edit_response(self.http, builder).await,
            _ => {
                return Err(PlatformError::new(
                    "edit_original",
                    "Unsupported interaction type",
                ));
            }
        };
        result
            .map(|_| ())
            .map_err(|e| PlatformError::new("edit_original", e.to_string()))
    }
}
