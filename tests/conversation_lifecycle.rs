//! End-to-end conversation flows against a sled store on disk

mod common;

use std::sync::Arc;

use common::{create_temp_store, ScriptedProvider};
use emobuddy::chat::{
    ConversationController, ConversationStore, Role, APOLOGY_MESSAGE, FIRST_CONVERSATION_GREETING,
    FIRST_CONVERSATION_TITLE, NEW_CONVERSATION_GREETING, NEW_CONVERSATION_TITLE,
};
use emobuddy::providers::ChatTurn;
use emobuddy::storage::KeyValueStore;

fn controller_over(
    kv: Arc<dyn KeyValueStore>,
    provider: Arc<ScriptedProvider>,
) -> ConversationController {
    let mut controller = ConversationController::new(ConversationStore::load(kv), provider);
    controller.initialize();
    controller
}

#[tokio::test]
async fn test_first_run_then_first_message() {
    let (kv, _tmp) = create_temp_store();
    let provider = Arc::new(ScriptedProvider::new());
    provider.reply("It's okay to feel anxious. What's on your mind?");
    let mut controller = controller_over(kv, provider.clone());

    let first = controller.active_conversation().unwrap();
    assert_eq!(first.id(), "1");
    assert_eq!(first.title(), FIRST_CONVERSATION_TITLE);
    assert_eq!(first.messages()[0].content, FIRST_CONVERSATION_GREETING);
    assert!(provider.opened()[0].is_empty());

    let reply = controller.send_message("I feel anxious today").await.unwrap();
    assert_eq!(reply.content, "It's okay to feel anxious. What's on your mind?");

    let conversation = controller.active_conversation().unwrap();
    let roles: Vec<Role> = conversation.messages().iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::Assistant, Role::User, Role::Assistant]);
    assert_eq!(conversation.messages()[1].content, "I feel anxious today");
    assert_eq!(conversation.title(), FIRST_CONVERSATION_TITLE);
    assert_eq!(provider.sent(), vec!["I feel anxious today".to_string()]);
}

#[tokio::test]
async fn test_new_conversation_gets_title_from_first_message() {
    let (kv, _tmp) = create_temp_store();
    let provider = Arc::new(ScriptedProvider::new());
    let mut controller = controller_over(kv, provider.clone());

    let id = controller.start_new_conversation();
    let conversation = controller.active_conversation().unwrap();
    assert_eq!(conversation.id(), id);
    assert_eq!(conversation.title(), NEW_CONVERSATION_TITLE);
    assert_eq!(conversation.messages()[0].content, NEW_CONVERSATION_GREETING);

    controller
        .send_message("Work has been overwhelming lately and I can't switch off")
        .await;
    assert_eq!(
        controller.active_conversation().unwrap().title(),
        "Work has been overwhelming lat..."
    );
}

#[tokio::test]
async fn test_failure_records_apology_and_keeps_going() {
    let (kv, _tmp) = create_temp_store();
    let provider = Arc::new(ScriptedProvider::new());
    provider.fail();
    provider.reply("Glad you're back.");
    let mut controller = controller_over(kv, provider.clone());

    let apology = controller.send_message("hello?").await.unwrap();
    assert_eq!(apology.role, Role::Assistant);
    assert_eq!(apology.content, APOLOGY_MESSAGE);
    assert!(!controller.is_typing());

    let reply = controller.send_message("trying again").await.unwrap();
    assert_eq!(reply.content, "Glad you're back.");
    assert_eq!(controller.active_conversation().unwrap().messages().len(), 5);
}

#[tokio::test]
async fn test_switching_restores_context() {
    let (kv, _tmp) = create_temp_store();
    let provider = Arc::new(ScriptedProvider::new());
    provider.reply("Tell me more.");
    let mut controller = controller_over(kv, provider.clone());

    controller.send_message("I had a fight with my sister").await;
    let second = controller.start_new_conversation();
    controller.send_message("Different topic").await;

    controller.switch_conversation("1").unwrap();
    let restored = provider.opened().pop().unwrap();
    assert_eq!(
        restored,
        vec![
            ChatTurn::user("I had a fight with my sister"),
            ChatTurn::model("Tell me more."),
        ]
    );

    controller.switch_conversation(&second).unwrap();
    let restored = provider.opened().pop().unwrap();
    assert_eq!(restored.len(), 2);
    assert_eq!(restored[0], ChatTurn::user("Different topic"));
}

#[tokio::test]
async fn test_switch_to_unknown_keeps_active_conversation() {
    let (kv, _tmp) = create_temp_store();
    let provider = Arc::new(ScriptedProvider::new());
    let mut controller = controller_over(kv, provider);

    let id = controller.start_new_conversation();
    assert!(controller.switch_conversation("does-not-exist").is_err());
    assert_eq!(controller.active_id(), id);

    controller.send_message("still here").await;
    assert_eq!(controller.active_conversation().unwrap().messages().len(), 3);
}

#[tokio::test]
async fn test_delete_flows() {
    let (kv, _tmp) = create_temp_store();
    let provider = Arc::new(ScriptedProvider::new());
    let mut controller = controller_over(kv.clone(), provider);

    let second = controller.start_new_conversation();
    let third = controller.start_new_conversation();

    assert!(controller.delete_conversation(&third));
    assert_eq!(controller.active_id(), "1");

    assert!(controller.delete_conversation("1"));
    assert_eq!(controller.active_id(), second);

    assert!(controller.delete_conversation(&second));
    assert_eq!(controller.conversations().len(), 1);
    let fresh = controller.active_conversation().unwrap().clone();
    assert_eq!(fresh.title(), NEW_CONVERSATION_TITLE);
    assert_eq!(fresh.messages()[0].content, NEW_CONVERSATION_GREETING);

    assert!(!controller.delete_conversation("1"));

    let reloaded = ConversationStore::load(kv);
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded.active_id(), fresh.id());
}

#[tokio::test]
async fn test_state_round_trips_through_store() {
    let (kv, _tmp) = create_temp_store();
    let provider = Arc::new(ScriptedProvider::new());
    provider.reply("Breathing exercises can help.");

    let (expected, active) = {
        let mut controller = controller_over(kv.clone(), provider.clone());
        let id = controller.start_new_conversation();
        controller.send_message("How do I calm down quickly?").await;
        (controller.conversations().to_vec(), id)
    };

    let fresh_provider = Arc::new(ScriptedProvider::new());
    let controller = controller_over(kv, fresh_provider.clone());
    assert_eq!(controller.conversations(), expected.as_slice());
    assert_eq!(controller.active_id(), active);
    assert_eq!(
        fresh_provider.opened()[0],
        vec![
            ChatTurn::user("How do I calm down quickly?"),
            ChatTurn::model("Breathing exercises can help."),
        ]
    );
}

#[tokio::test]
async fn test_blank_input_changes_nothing() {
    let (kv, _tmp) = create_temp_store();
    let provider = Arc::new(ScriptedProvider::new());
    let mut controller = controller_over(kv, provider.clone());

    assert!(controller.send_message("").await.is_none());
    assert!(controller.send_message("   ").await.is_none());
    assert!(provider.sent().is_empty());
    assert_eq!(controller.active_conversation().unwrap().messages().len(), 1);
}
