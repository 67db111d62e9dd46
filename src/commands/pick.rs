use super::context;
use crate::panel::{ConsoleNotifier, ConsolePanel};
use crate::search::{DEBOUNCE_DELAY, Debouncer};
use crate::session::PickerSession;
use tokio::io::{AsyncBufReadExt, BufReader};

const VISIBLE_ROWS: usize = 20;

/// Line-driven picker: type to search (applied after the debounce
/// window), `:n`/`:p` to navigate, `:go` to move the open email into
/// the selected folder, `:r` to force-refresh, `:q` to quit.
pub async fn pick(item_id: &str) -> anyhow::Result<()> {
    let ctx = context()?;
    let mut session = PickerSession::initialize(
        ctx.client,
        ctx.store,
        ctx.recents,
        ConsoleNotifier,
        ConsolePanel,
        item_id,
    )
    .await?;

    let (mut debouncer, mut queries) = Debouncer::new(DEBOUNCE_DELAY);
    render(&session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    ":q" => break,
                    ":n" => {
                        session.next();
                        render(&session);
                    }
                    ":p" => {
                        session.previous();
                        render(&session);
                    }
                    ":r" => match session.refresh().await {
                        Ok(()) => render(&session),
                        Err(err) => eprintln!("✗ Failed to refresh folders: {}", err),
                    },
                    // A failed move keeps the picker open with the
                    // selection intact; the error status is already shown.
                    ":go" => {
                        if session.selected_folder().is_some()
                            && session.activate().await.is_ok()
                        {
                            break;
                        }
                    }
                    text => debouncer.submit(text),
                }
            }
            Some(query) = queries.recv() => {
                session.set_query(query);
                render(&session);
            }
        }
    }

    Ok(())
}

fn render<M, K, N, P>(session: &PickerSession<M, K, N, P>) {
    let selected = session.selected();
    let mut row = 0usize;

    let recents = session.visible_recents();
    if !recents.is_empty() {
        eprintln!("-- Recent --");
        for entry in recents {
            print_row(row, selected, &entry.display_name, &entry.path);
            row += 1;
        }
        eprintln!("-- Folders --");
    }

    for folder in session.results().iter().take(VISIBLE_ROWS) {
        print_row(row, selected, &folder.display_name, &folder.path);
        row += 1;
    }
    let hidden = session.results().len().saturating_sub(VISIBLE_ROWS);
    if hidden > 0 {
        eprintln!("   … {} more", hidden);
    }
    if session.total_items() == 0 {
        eprintln!("   (no matching folders)");
    }
}

fn print_row(row: usize, selected: Option<usize>, name: &str, path: &str) {
    let marker = if selected == Some(row) { "▸" } else { " " };
    eprintln!("{} {:2} {}  [{}]", marker, row, name, path);
}
