use super::context;
use crate::models::Output;

pub async fn refresh() -> anyhow::Result<()> {
    let ctx = context()?;
    let folders = ctx.store.load(&ctx.client, true).await?;
    Output::<()>::success_msg(format!("Refreshed {} folders", folders.len())).print();

    Ok(())
}
