//! Bot entry point: load configuration, warm up the league catalog, then
//! long-poll the gateway forever. Updates are handled strictly one at a
//! time, so per-chat sessions need no locking.

use std::collections::HashMap;
use std::fs;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, error, info, warn};

use footbot::catalog::LeagueCatalog;
use footbot::config::Config;
use footbot::controller::{Controller, Session};
use footbot::stats_fetch::ApiFootball;
use footbot::telegram::TelegramGateway;

/// Pause before retrying after a failed poll, so a dead network does not
/// spin the loop.
const POLL_RETRY_SECS: u64 = 3;

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = Config::from_env()?;
    fs::create_dir_all(&cfg.images_dir)
        .with_context(|| format!("create images dir {}", cfg.images_dir.display()))?;
    if let Some(dir) = cfg.league_store.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("create league store dir {}", dir.display()))?;
    }

    let provider = ApiFootball::new(cfg.rapidapi_token.clone());
    let leagues = match LeagueCatalog::load(&cfg.league_store, &provider) {
        Ok(catalog) => {
            info!("league catalog ready: {} leagues", catalog.len());
            catalog
        }
        Err(err) => {
            warn!("league catalog unavailable, starting empty: {err}");
            LeagueCatalog::empty()
        }
    };

    let controller = Controller::new(provider, leagues, &cfg.images_dir);
    let gateway = TelegramGateway::new(cfg.tele_token.clone());

    // Anything queued up while the bot was down is stale conversation.
    let mut offset = match gateway.skip_pending() {
        Ok(offset) => offset,
        Err(err) => {
            warn!("could not skip pending updates: {err}");
            0
        }
    };

    let mut sessions: HashMap<i64, Session> = HashMap::new();
    info!("polling for messages");

    loop {
        let batch = match gateway.poll(&mut offset) {
            Ok(batch) => batch,
            Err(err) => {
                warn!("poll failed: {err}");
                thread::sleep(Duration::from_secs(POLL_RETRY_SECS));
                continue;
            }
        };
        for incoming in batch {
            debug!("update {} from chat {}", incoming.update_id, incoming.chat_id);
            let session = sessions.entry(incoming.chat_id).or_default();
            for reply in controller.handle(session, &incoming.text) {
                if let Err(err) = gateway.deliver(incoming.chat_id, &reply) {
                    error!("reply to chat {} not delivered: {err}", incoming.chat_id);
                }
            }
        }
    }
}
