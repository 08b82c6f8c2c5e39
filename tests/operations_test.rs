mod common;

use labmise::db::{ChatTurn, Error, NewChat, NewMessage};
use labmise::models::ChatRole;
use testcontainers::clients::Cli;
use uuid::Uuid;

// Macro to set up test environment
// Note: This keeps _docker and _container alive for the duration of the test
macro_rules! setup_test {
    ($docker:ident, $container:ident, $db:ident) => {
        let $docker = Cli::default();
        let $container = $docker.run(common::create_postgres_container());
        let host_port = $container.get_host_port_ipv4(common::POSTGRES_PORT);
        let $db = common::connect_and_migrate(host_port).await;
    };
}

fn new_chat(user_id: Uuid, model_id: Uuid, title: &str) -> NewChat {
    NewChat {
        user_id,
        model_id,
        title: title.to_string(),
        workspace_id: None,
        folder_id: None,
    }
}

// ============================================================================
// users and models
// ============================================================================

#[tokio::test]
async fn test_get_or_create_user_is_idempotent() {
    setup_test!(_docker, _container, db);

    let first = db.get_or_create_user("ada@example.com", "Ada").await.unwrap();
    let second = db
        .get_or_create_user("ada@example.com", "Ada Lovelace")
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.username, "Ada");

    let found = db.get_user_by_email("ada@example.com").await.unwrap();
    assert_eq!(found, Some(first));
    assert!(db.get_user_by_email("nobody@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_models_and_lookup() {
    setup_test!(_docker, _container, db);

    let groq = common::seed_model(&db, "llama-3.3-70b-versatile", "groq").await;
    let openai = common::seed_model(&db, "gpt-4o-mini", "openai").await;

    let models = db.list_models().await.unwrap();
    assert_eq!(models.len(), 2);
    assert_eq!(models[0].model_id, openai);
    assert_eq!(models[1].model_name, "llama-3.3-70b-versatile");

    let route = db.get_model_name_and_service(groq).await.unwrap().unwrap();
    assert_eq!(route.service, "groq");
    assert!(db
        .get_model_name_and_service(Uuid::new_v4())
        .await
        .unwrap()
        .is_none());
}

// ============================================================================
// chats
// ============================================================================

#[tokio::test]
async fn test_insert_chat_with_messages() {
    setup_test!(_docker, _container, db);
    let user = common::seed_user(&db, "writer").await;
    let model_id = common::seed_model(&db, "gpt-4o-mini", "openai").await;

    let chat = db
        .insert_chat_with_messages(
            new_chat(user.id, model_id, "Borrow Checker"),
            &[
                NewMessage::user("What is a borrow?"),
                NewMessage::assistant(model_id, "A reference to a value."),
            ],
        )
        .await
        .unwrap();

    assert_eq!(chat.title, "Borrow Checker");
    assert_eq!(chat.current_model_id, model_id);
    assert_eq!(chat.messages.len(), 2);
    assert_eq!(chat.messages[0].role, ChatRole::User);
    assert!(chat.messages[0].model_id.is_none());
    assert_eq!(chat.messages[1].model_id, Some(model_id));

    let loaded = db
        .select_chat(user.id, chat.conversation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.messages, chat.messages);
}

#[tokio::test]
async fn test_insert_chat_with_unknown_model_stores_nothing() {
    setup_test!(_docker, _container, db);
    let user = common::seed_user(&db, "writer").await;

    let result = db
        .insert_chat_with_messages(
            new_chat(user.id, Uuid::new_v4(), "Ghost"),
            &[NewMessage::user("Hello")],
        )
        .await;
    assert!(matches!(result, Err(Error::ValidationError(_))));

    let page = db.select_user_chat_titles(user.id, 10, 0).await.unwrap();
    assert_eq!(page.total_count, 0);
}

#[tokio::test]
async fn test_chat_context_orders_history() {
    setup_test!(_docker, _container, db);
    let user = common::seed_user(&db, "reader").await;
    let model_id = common::seed_model(&db, "deepseek-chat", "deepseek").await;

    let chat = db
        .insert_chat_with_messages(
            new_chat(user.id, model_id, "History"),
            &[
                NewMessage::user("one"),
                NewMessage::assistant(model_id, "two"),
            ],
        )
        .await
        .unwrap();

    db.insert_chat_messages(
        user.id,
        chat.conversation_id,
        &[
            NewMessage::user("three"),
            NewMessage::assistant(model_id, "four"),
        ],
        None,
    )
    .await
    .unwrap();

    let context = db
        .select_chat_context(user.id, chat.conversation_id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(context.current_model_id, model_id);
    assert_eq!(
        context.turns,
        vec![
            ChatTurn::new(ChatRole::User, "one"),
            ChatTurn::new(ChatRole::Assistant, "two"),
            ChatTurn::new(ChatRole::User, "three"),
            ChatTurn::new(ChatRole::Assistant, "four"),
        ]
    );
}

#[tokio::test]
async fn test_chats_are_private_to_their_owner() {
    setup_test!(_docker, _container, db);
    let owner = common::seed_user(&db, "owner").await;
    let other = common::seed_user(&db, "other").await;
    let model_id = common::seed_model(&db, "gpt-4o-mini", "openai").await;

    let chat = db
        .insert_chat_with_messages(new_chat(owner.id, model_id, "Mine"), &[NewMessage::user("hi")])
        .await
        .unwrap();
    let id = chat.conversation_id;

    assert!(db.select_chat(other.id, id).await.unwrap().is_none());
    assert!(db.select_chat_context(other.id, id).await.unwrap().is_none());
    assert!(db.update_chat_title(other.id, id, "Stolen").await.unwrap().is_none());
    assert!(!db.delete_chat(other.id, id).await.unwrap());

    let result = db
        .insert_chat_messages(other.id, id, &[NewMessage::user("sneaky")], None)
        .await;
    assert!(matches!(result, Err(Error::NotFoundError(_))));
}

#[tokio::test]
async fn test_chat_titles_pagination() {
    setup_test!(_docker, _container, db);
    let user = common::seed_user(&db, "pager").await;
    let model_id = common::seed_model(&db, "gpt-4o-mini", "openai").await;

    let mut ids = Vec::new();
    for i in 0..3 {
        let chat = db
            .insert_chat_with_messages(
                new_chat(user.id, model_id, &format!("Chat {}", i)),
                &[NewMessage::user("hi")],
            )
            .await
            .unwrap();
        ids.push(chat.conversation_id);
    }

    // Touching the oldest chat moves it to the front
    db.insert_chat_messages(user.id, ids[0], &[NewMessage::user("again")], None)
        .await
        .unwrap();

    let page = db.select_user_chat_titles(user.id, 2, 0).await.unwrap();
    assert_eq!(page.total_count, 3);
    assert_eq!(page.conversations.len(), 2);
    assert_eq!(page.conversations[0].conversation_id, ids[0]);

    let rest = db.select_user_chat_titles(user.id, 2, 2).await.unwrap();
    assert_eq!(rest.conversations.len(), 1);
}

#[tokio::test]
async fn test_chat_titles_exclude_workspace_chats() {
    setup_test!(_docker, _container, db);
    let user = common::seed_user(&db, "organizer").await;
    let model_id = common::seed_model(&db, "gpt-4o-mini", "openai").await;
    let workspace = db.create_workspace(user.id, "Research", None).await.unwrap();

    db.insert_chat_with_messages(new_chat(user.id, model_id, "Loose"), &[NewMessage::user("a")])
        .await
        .unwrap();
    db.insert_chat_with_messages(
        NewChat {
            workspace_id: Some(workspace.workspace_id),
            ..new_chat(user.id, model_id, "Filed")
        },
        &[NewMessage::user("b")],
    )
    .await
    .unwrap();

    let page = db.select_user_chat_titles(user.id, 10, 0).await.unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.conversations[0].title, "Loose");
}

#[tokio::test]
async fn test_update_title_model_and_delete() {
    setup_test!(_docker, _container, db);
    let user = common::seed_user(&db, "editor").await;
    let first = common::seed_model(&db, "gpt-4o-mini", "openai").await;
    let second = common::seed_model(&db, "llama-3.3-70b-versatile", "groq").await;

    let chat = db
        .insert_chat_with_messages(new_chat(user.id, first, "Draft"), &[NewMessage::user("hi")])
        .await
        .unwrap();
    let id = chat.conversation_id;

    let renamed = db.update_chat_title(user.id, id, "Final").await.unwrap().unwrap();
    assert_eq!(renamed.title, "Final");

    let switched = db
        .update_conversation_model(user.id, id, second)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(switched.current_model_id, second);

    let unknown = db.update_conversation_model(user.id, id, Uuid::new_v4()).await;
    assert!(matches!(unknown, Err(Error::ValidationError(_))));

    assert!(db.delete_chat(user.id, id).await.unwrap());
    assert!(db.select_chat(user.id, id).await.unwrap().is_none());
    assert!(!db.delete_chat(user.id, id).await.unwrap());
}

#[tokio::test]
async fn test_model_switch_is_stored_with_messages() {
    setup_test!(_docker, _container, db);
    let user = common::seed_user(&db, "switcher").await;
    let first = common::seed_model(&db, "gpt-4o-mini", "openai").await;
    let second = common::seed_model(&db, "deepseek-chat", "deepseek").await;

    let chat = db
        .insert_chat_with_messages(new_chat(user.id, first, "Switch"), &[NewMessage::user("hi")])
        .await
        .unwrap();
    let id = chat.conversation_id;

    db.insert_chat_messages(
        user.id,
        id,
        &[
            NewMessage::user("use the other one"),
            NewMessage::assistant(second, "done"),
        ],
        Some(second),
    )
    .await
    .unwrap();

    let context = db.select_chat_context(user.id, id).await.unwrap().unwrap();
    assert_eq!(context.current_model_id, second);
    assert_eq!(context.turns.len(), 3);

    // A switch to an unknown model rolls the messages back as well
    let result = db
        .insert_chat_messages(
            user.id,
            id,
            &[NewMessage::user("and again")],
            Some(Uuid::new_v4()),
        )
        .await;
    assert!(matches!(result, Err(Error::ValidationError(_))));

    let context = db.select_chat_context(user.id, id).await.unwrap().unwrap();
    assert_eq!(context.current_model_id, second);
    assert_eq!(context.turns.len(), 3);
}
