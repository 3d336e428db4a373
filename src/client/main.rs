/**
 * chat-sync headless client
 *
 * Lists conversation partners, and optionally prints (and appends to) the
 * history with one of them:
 *
 *   chat-sync                     list partners
 *   chat-sync <user-id>           print the conversation with <user-id>
 *   chat-sync <user-id> <text..>  send <text> first, then print
 *
 * Set CHAT_SYNC_TOKEN to send a bearer token.
 */
use std::sync::Arc;

use chat_sync::client::{fixed_channel, Config, HttpClient, MessageStore, TracingNotifier};
use chat_sync::shared::{AppConfig, OutgoingMessage};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    let mut config = Config::from_env(AppConfig::load_default()?)?;
    config.set_token(std::env::var("CHAT_SYNC_TOKEN").ok());
    tracing::info!("Using server {}", config.server_url());

    // Headless: no realtime channel, the subscription stays off.
    let store = MessageStore::new(
        Arc::new(HttpClient::new(config.clone())),
        Arc::new(fixed_channel(None)),
        Arc::new(TracingNotifier),
        &config,
    );

    store.get_users().await;

    let mut args = std::env::args().skip(1);
    let Some(partner_id) = args.next() else {
        for user in &store.snapshot().users {
            println!("{}\t{}", user.id, user.display_name());
        }
        return Ok(());
    };

    let Some(partner) = store
        .snapshot()
        .users
        .into_iter()
        .find(|u| u.id == partner_id)
    else {
        eprintln!("Unknown conversation partner: {}", partner_id);
        std::process::exit(1);
    };

    store.open_conversation(partner).await;

    let text = args.collect::<Vec<_>>().join(" ");
    if !text.is_empty() {
        store.send_message(OutgoingMessage::text(text)).await;
    }

    for message in &store.snapshot().messages {
        let direction = if message.sender_id == partner_id { "<" } else { ">" };
        println!("{} {}", direction, message.content);
    }

    store.close_conversation();
    Ok(())
}
