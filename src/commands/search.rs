use super::context;
use crate::models::Output;
use crate::search::FolderIndex;

pub async fn search(query: &str) -> anyhow::Result<()> {
    let ctx = context()?;
    let folders = ctx.store.load(&ctx.client, false).await?;
    let index = FolderIndex::build(folders);
    let matches = index.matches(query);
    Output::success(matches).print();

    Ok(())
}
