use std::sync::Arc;

use tracing::{debug, error};

use crate::bot::data::Data;
use crate::handlers::admin;
use crate::messaging::types::{ChatKind, Update};
use crate::services::moderation::decision;

pub async fn event_handler(data: &Arc<Data>, update: Update) {
    let Some(message) = update.message else {
        debug!("Update {} carries no message, skipping", update.update_id);
        return;
    };

    match message.chat.kind {
        ChatKind::Private => {
            if let Err(e) = admin::handle_private_message(data, &message).await {
                error!("Operator message handler error: {:?}", e);
            }
        }

        kind if kind.is_group() => {
            let decision = decision::handle_group_message(data, &message).await;
            debug!(
                "Message {} in chat {}: {:?}",
                message.message_id, message.chat.id, decision
            );
        }

        _ => {}
    }
}
