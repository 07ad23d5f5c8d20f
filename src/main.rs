//! Entry point: load config, then print a channel-auth or trigger body for manual checks.
//!
//! ```text
//! notif-client auth <socket_id> <channel> [user_id]
//! notif-client trigger <channel> <event> <json-data> [socket_id]
//! ```

use notif_client::config::Config;
use notif_client::{ChannelAuthenticator, Event, PresenceUser, TriggerBuilder, UserId};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const USAGE: &str = "usage:
  notif-client auth <socket_id> <channel> [user_id]
  notif-client trigger <channel> <event> <json-data> [socket_id]";

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| {
        if e.is_fatal() {
            anyhow::anyhow!("fatal: {}", e)
        } else {
            anyhow::anyhow!("config: {}", e)
        }
    })?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let output = match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["auth", socket_id, channel] => {
            let auth = ChannelAuthenticator::new(&config.app_key, &config.app_secret)?;
            serde_json::to_string(&auth.authenticate(socket_id, channel)?)?
        }
        ["auth", socket_id, channel, user_id] => {
            let auth = ChannelAuthenticator::new(&config.app_key, &config.app_secret)?;
            let user = PresenceUser::new(parse_user_id(user_id), None);
            serde_json::to_string(&auth.authenticate_presence(socket_id, channel, &user)?)?
        }
        ["trigger", channel, event, data, rest @ ..] if rest.len() <= 1 => {
            let data: serde_json::Value = serde_json::from_str(data)?;
            let mut event = Event::new(*channel, *event, data);
            if let Some(socket_id) = rest.first() {
                event = event.with_socket_id(*socket_id);
            }
            let builder =
                TriggerBuilder::new(&config.app_id).max_payload_bytes(config.max_payload_bytes);
            let request = builder.build(&event.into())?;
            tracing::info!(host = %config.host, path = %request.path, "trigger ready");
            serde_json::to_string(&request.body)?
        }
        _ => anyhow::bail!(USAGE),
    };

    println!("{}", output);
    Ok(())
}

/// Integer ids become numeric user ids; anything else stays a string.
fn parse_user_id(raw: &str) -> UserId {
    if let Ok(id) = raw.parse::<u64>() {
        UserId::from(id)
    } else if let Ok(id) = raw.parse::<i64>() {
        UserId::from(id)
    } else {
        UserId::from(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_user_ids_are_numeric() {
        assert_eq!(parse_user_id("42"), UserId::from(42u64));
        assert_eq!(parse_user_id("-7"), UserId::from(-7i64));
        assert_eq!(parse_user_id("user-42"), UserId::from("user-42"));
        assert_eq!(parse_user_id("4.2"), UserId::from("4.2"));
    }
}
