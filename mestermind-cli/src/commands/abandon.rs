use mestermind_forms::{QuestionSetResolution, RequestContext};

use super::AppContext;
use crate::error::CliError;

/// Deletes the draft remembered for this service and place, if it is still a
/// draft, and drops any submission left waiting for sign-in.
pub async fn abandon_draft(app: &AppContext, context: RequestContext) -> Result<(), CliError> {
    discard_draft(app, &context).await?;
    app.finalizer().clear_pending(&context).await;
    Ok(())
}

async fn discard_draft(app: &AppContext, context: &RequestContext) -> Result<(), CliError> {
    let drafts = app.drafts();
    let question_set_id = match drafts.resolve_question_set(context.service_id).await? {
        QuestionSetResolution::Published(set) => Some(set.id),
        QuestionSetResolution::NonePublished => None,
    };

    let Some(draft_id) = drafts.stored_draft_id(context, question_set_id).await? else {
        println!("No draft to discard.");
        return Ok(());
    };

    match app.api.get_customer_request(draft_id).await {
        Ok(request) if request.is_draft() => {
            if drafts.delete_on_abandon(context, &request).await {
                println!("Draft #{draft_id} discarded.");
            } else {
                println!("Draft #{draft_id} forgotten; the backend could not delete it.");
            }
        }
        Ok(request) => {
            tracing::info!(request_id = request.id, status = ?request.status, "Not deleting submitted request");
            drafts.forget(context, question_set_id).await;
            println!("Request #{draft_id} was already submitted; nothing discarded.");
        }
        Err(e) if e.is_not_found() => {
            drafts.forget(context, question_set_id).await;
            println!("Draft #{draft_id} no longer exists.");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::request_context;
    use crate::config::MestermindConfig;
    use mestermind_client::HttpMarketplaceClient;
    use mestermind_forms::{InMemorySessionStore, SessionStore};
    use serde_json::json;
    use std::sync::Arc;

    fn app_with_store(url: String, store: &InMemorySessionStore) -> AppContext {
        AppContext {
            config: MestermindConfig::default(),
            api: Arc::new(HttpMarketplaceClient::new(url).unwrap()),
            store: Arc::new(store.clone()),
        }
    }

    #[tokio::test]
    async fn test_abandon_deletes_draft_and_clears_pending_submission() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/question-sets")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;
        server
            .mock("GET", "/customer-requests/101")
            .with_status(200)
            .with_body(
                json!({
                    "id": 101,
                    "service_id": 4,
                    "question_set_id": null,
                    "place_id": 12,
                    "current_step": 2,
                    "answers": {},
                    "status": "draft"
                })
                .to_string(),
            )
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/customer-requests/101")
            .with_status(204)
            .create_async()
            .await;

        let store = InMemorySessionStore::new();
        let app = app_with_store(server.url(), &store);
        let context = request_context(4, Some(12));
        let keys = app.config.flow_settings().keys;
        store
            .set(&keys.render(&context.draft_key(None)), "101")
            .await
            .unwrap();
        store
            .set(
                &keys.render(&context.pending_submission_key()),
                &json!({"request_id": 101, "return_to": "/services/4?place=12"}).to_string(),
            )
            .await
            .unwrap();

        abandon_draft(&app, context).await.unwrap();

        delete.assert_async().await;
        assert!(store.keys().is_empty());
    }

    #[tokio::test]
    async fn test_abandon_without_draft_still_clears_pending_submission() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/question-sets")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let store = InMemorySessionStore::new();
        let app = app_with_store(server.url(), &store);
        let context = request_context(4, None);
        let marker = app
            .config
            .flow_settings()
            .keys
            .render(&context.pending_submission_key());
        store
            .set(&marker, r#"{"request_id":77,"return_to":"/services/4"}"#)
            .await
            .unwrap();

        abandon_draft(&app, context).await.unwrap();

        assert_eq!(store.get(&marker).await.unwrap(), None);
    }
}
