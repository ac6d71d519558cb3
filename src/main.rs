use teloxide::prelude::*;

use campus_quick::{ui, Config, Db, Directory};
use campus_quick::error::Error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Starting bot...");

    let config = Config::load()?;
    let db = Db::new(&config).await?;
    let directory = Directory::from_config(&config);
    let bot = Bot::new(config.bot_token()?).auto_send();

    Dispatcher::builder(bot, ui::schema())
        .dependencies(dptree::deps![ui::MyStorage::new(), db, directory, config])
        .build()
        .dispatch()
        .await;

    Ok(())
}
