use super::context;
use crate::error::Error;
use crate::models::Output;
use crate::panel::{ConsoleNotifier, ConsolePanel};
use crate::search::FolderIndex;
use crate::session::MoveOrchestrator;

pub async fn move_email(item_id: &str, to: &str) -> anyhow::Result<()> {
    let ctx = context()?;
    let folders = ctx.store.load(&ctx.client, false).await?;
    let index = FolderIndex::build(folders);

    // Exact folder id wins, otherwise the best fuzzy match by name/path.
    let folder = index
        .get(to)
        .cloned()
        .or_else(|| index.query(to).into_iter().next())
        .ok_or_else(|| Error::FolderNotFound(to.to_string()))?;

    let orchestrator = MoveOrchestrator {
        service: &ctx.client,
        recents: &ctx.recents,
        notifier: &ConsoleNotifier,
        panel: &ConsolePanel,
    };
    orchestrator.move_message(item_id, &folder).await?;

    Output::<()>::success_msg(format!("Moved email to {}", folder.path)).print();

    Ok(())
}
