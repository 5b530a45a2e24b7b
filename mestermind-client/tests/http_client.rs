use mestermind_client::{ApiError, HttpMarketplaceClient, MarketplaceApi};
use mestermind_types::{
    AnswerValue, Answers, CustomerRequestUpdate, NewCustomerRequest, QuestionSetStatus,
    QuestionType, RequestStatus,
};
use mockito::Matcher;
use serde_json::json;

fn draft_json(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "service_id": 4,
        "question_set_id": 9,
        "place_id": 12,
        "current_step": 0,
        "answers": {},
        "status": "draft"
    })
}

#[tokio::test]
async fn test_list_question_sets_sends_service_filter() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/question-sets")
        .match_query(Matcher::UrlEncoded("service_id".into(), "4".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!([
                {"id": 1, "service_id": 4, "name": "v1", "status": "published", "version": 1},
                {"id": 2, "service_id": 4, "name": "v2", "status": "draft", "is_active": true, "version": 2}
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let client = HttpMarketplaceClient::new(server.url()).unwrap();
    let sets = client.list_question_sets(4).await.unwrap();

    mock.assert_async().await;
    assert_eq!(sets.len(), 2);
    assert_eq!(sets[0].status, QuestionSetStatus::Published);
    assert_eq!(sets[1].is_active, Some(true));
}

#[tokio::test]
async fn test_get_question_set_parses_questions() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/question-sets/9")
        .with_status(200)
        .with_body(
            json!({
                "id": 9,
                "service_id": 4,
                "name": "Bathroom renovation",
                "status": "published",
                "version": 3,
                "questions": [
                    {"id": 1, "key": "size", "label": "Size in m2", "question_type": "number", "is_required": true, "sort_order": 1, "min_value": 1.0},
                    {"id": 2, "key": "extras", "label": "Extras", "question_type": "multi_select", "options": ["tiling", "plumbing"], "sort_order": 2}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = HttpMarketplaceClient::new(server.url()).unwrap();
    let set = client.get_question_set(9).await.unwrap();

    assert_eq!(set.version, 3);
    assert_eq!(set.questions.len(), 2);
    assert_eq!(set.questions[0].question_type, QuestionType::Number);
    assert_eq!(set.questions[0].min_value, Some(1.0));
    assert_eq!(set.questions[1].options.as_ref().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_create_customer_request_posts_draft() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/customer-requests")
        .match_header("authorization", "Bearer secret")
        .match_body(Matcher::Json(json!({
            "service_id": 4,
            "question_set_id": 9,
            "place_id": 12,
            "answers": {},
            "current_step": 0,
            "status": "draft"
        })))
        .with_status(201)
        .with_body(draft_json(77).to_string())
        .create_async()
        .await;

    let client = HttpMarketplaceClient::new(server.url())
        .unwrap()
        .with_token(Some("secret".to_string()));
    let created = client
        .create_customer_request(&NewCustomerRequest::draft(4, Some(9)).place(Some(12)))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(created.id, 77);
    assert!(created.is_draft());
}

#[tokio::test]
async fn test_update_sends_partial_body() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("PATCH", "/customer-requests/77")
        .match_body(Matcher::Json(json!({
            "answers": {"size": "40"},
            "current_step": 1
        })))
        .with_status(200)
        .with_body(
            json!({
                "id": 77,
                "service_id": 4,
                "question_set_id": 9,
                "current_step": 1,
                "answers": {"size": "40"},
                "status": "draft"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let mut answers = Answers::new();
    answers.insert("size".to_string(), AnswerValue::text("40"));

    let client = HttpMarketplaceClient::new(server.url()).unwrap();
    let updated = client
        .update_customer_request(77, &CustomerRequestUpdate::new().answers(answers).current_step(1))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(updated.current_step, 1);
    assert_eq!(updated.status, RequestStatus::Draft);
}

#[tokio::test]
async fn test_delete_accepts_no_content() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("DELETE", "/customer-requests/77")
        .with_status(204)
        .create_async()
        .await;

    let client = HttpMarketplaceClient::new(server.url()).unwrap();
    client.delete_customer_request(77).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_error_statuses_are_mapped() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/customer-requests/5")
        .with_status(404)
        .with_body("Customer request not found")
        .create_async()
        .await;
    server
        .mock("GET", "/customer-requests/6")
        .with_status(401)
        .with_body("Token expired")
        .create_async()
        .await;
    server
        .mock("GET", "/customer-requests/7")
        .with_status(503)
        .with_body("maintenance")
        .create_async()
        .await;

    let client = HttpMarketplaceClient::new(server.url()).unwrap();

    let err = client.get_customer_request(5).await.unwrap_err();
    assert!(err.is_not_found());

    match client.get_customer_request(6).await.unwrap_err() {
        ApiError::Authentication { message } => assert_eq!(message, "Token expired"),
        other => panic!("Expected authentication error, got {other:?}"),
    }

    match client.get_customer_request(7).await.unwrap_err() {
        ApiError::Api { status, .. } => assert_eq!(status, 503),
        other => panic!("Expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/question-sets/1")
        .with_status(200)
        .with_body("{not json")
        .create_async()
        .await;

    let client = HttpMarketplaceClient::new(server.url()).unwrap();
    let err = client.get_question_set(1).await.unwrap_err();
    assert!(matches!(err, ApiError::Parse { .. }));
}
