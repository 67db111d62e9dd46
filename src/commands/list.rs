use super::context;
use crate::models::Output;
use crate::search::FolderIndex;

pub async fn list_folders(refresh: bool) -> anyhow::Result<()> {
    let ctx = context()?;
    let folders = ctx.store.load(&ctx.client, refresh).await?;
    Output::success(folders).print();

    Ok(())
}

pub async fn list_recent() -> anyhow::Result<()> {
    let ctx = context()?;
    let folders = ctx.store.load(&ctx.client, false).await?;
    let index = FolderIndex::build(folders);
    let recents = ctx.recents.load(&index.live_ids());
    Output::success(recents).print();

    Ok(())
}
