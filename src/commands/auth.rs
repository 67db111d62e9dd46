use crate::config::Config;
use crate::models::Output;
use crate::rest::{MailService, OutlookClient};

pub async fn auth(token: &str) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let client = OutlookClient::new(token.to_string(), config.rest_url());
    client.list_root_folders().await?;

    config.set_token(token.to_string());
    config.save()?;

    Output::<()>::success_msg("Token verified and saved").print();

    Ok(())
}
