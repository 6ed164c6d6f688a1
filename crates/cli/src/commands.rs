use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, bail};
use colored::Colorize;

use labinv_core::{ItemId, StorageId, Timestamp};
use labinv_infra::{AppConfig, JsonFileGateway, QrSvgRenderer};
use labinv_inventory::{
    AddItem, AddTaxonomyValue, CodeRenderer, CreateStorage, InventoryCommand, InventoryStore,
    InventorySummary, ItemFilter, ItemPatch, NewItem, NewStorage, RemoveTaxonomyValue, Storage, StoragePatch,
    TaxonomyKind, UpdateItem, UpdateStorage, list_items, storage_from_link, storage_link,
};

use crate::cli::*;
use crate::session::{Applied, DeleteTarget, Session};

type FileSession = Session<JsonFileGateway>;

pub fn run_command(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    let gateway = JsonFileGateway::new(&config.data_file);

    if let Command::Init = cli.command {
        return cmd_init(&gateway);
    }

    let mut session = Session::open(gateway);
    match cli.command {
        Command::Init => Ok(()),
        Command::Dashboard => cmd_dashboard(&session),
        Command::Storage(cmd) => cmd_storage(&mut session, &config, cmd),
        Command::Item(cmd) => cmd_item(&mut session, cmd),
        Command::Items(args) => cmd_items(&session, args),
        Command::Taxonomy(cmd) => cmd_taxonomy(&mut session, cmd),
        Command::Link(args) => cmd_link(&session, &config, args),
        Command::Qr(args) => cmd_qr(&mut session, &config, args),
    }
}

fn cmd_init(gateway: &JsonFileGateway) -> anyhow::Result<()> {
    let path = gateway.path().display().to_string();
    if gateway
        .ensure_document()
        .with_context(|| format!("writing seed document to {path}"))?
    {
        println!("{} Wrote seed inventory to {}", "✓".green().bold(), path.bold());
    } else {
        println!("Inventory already exists at {}", path.bold());
    }
    Ok(())
}

fn cmd_dashboard(session: &FileSession) -> anyhow::Result<()> {
    let state = session.store().state();
    let summary = InventorySummary::of(state);

    println!("{}", "Lab inventory".bold());
    println!(
        "  Storage units: {}   Items: {}   Available: {}",
        summary.storage_count.to_string().bold(),
        summary.item_count.to_string().bold(),
        summary.available_count.to_string().green().bold()
    );

    let counts = |title: &str, map: &indexmap::IndexMap<String, usize>| {
        let line = map
            .iter()
            .filter(|(_, n)| **n > 0)
            .map(|(k, n)| format!("{k} {n}"))
            .collect::<Vec<_>>()
            .join(", ");
        if !line.is_empty() {
            println!("  {title}: {line}");
        }
    };
    counts("By status", &summary.by_status);
    counts("By category", &summary.by_category);

    println!();
    print_storage_table(state.storages());
    Ok(())
}

fn cmd_storage(
    session: &mut FileSession,
    config: &AppConfig,
    cmd: StorageCommand,
) -> anyhow::Result<()> {
    match cmd {
        StorageCommand::List => {
            print_storage_table(session.store().storages());
            Ok(())
        }
        StorageCommand::Show(args) => {
            let storage_id = resolve_storage(&args.storage)?;
            print_storage_details(session.store().storage(&storage_id)?, &config.app_url)?;
            if let Some(path) = args.qr {
                write_storage_code(session, config, &storage_id, &path)?;
            }
            Ok(())
        }
        StorageCommand::Add(args) => {
            let applied = session.apply(InventoryCommand::CreateStorage(CreateStorage {
                storage: NewStorage::new(args.name, args.location, args.storage_type)
                    .description(args.description),
                occurred_at: Timestamp::now(),
            }))?;
            let storage_id = applied
                .outcome
                .storage_id()
                .map(StorageId::to_string)
                .unwrap_or_default();
            println!("{} Created storage {}", "✓".green().bold(), storage_id.yellow());
            finish(session, &applied)
        }
        StorageCommand::Edit(args) => {
            let storage_id = resolve_storage(&args.storage)?;
            let patch = StoragePatch {
                name: args.name,
                location: args.location,
                storage_type: args.storage_type,
                description: args.description,
            };
            if patch.is_empty() {
                bail!("nothing to change (pass --name, --location, --type or --description)");
            }
            let applied = session.apply(InventoryCommand::UpdateStorage(UpdateStorage {
                storage_id: storage_id.clone(),
                patch,
                occurred_at: Timestamp::now(),
            }))?;
            println!("{} Updated storage {}", "✓".green().bold(), storage_id.to_string().yellow());
            finish(session, &applied)
        }
        StorageCommand::Rm(args) => {
            let storage_id = resolve_storage(&args.storage)?;
            delete(session, DeleteTarget::Storage(storage_id), args.yes)
        }
    }
}

fn cmd_item(session: &mut FileSession, cmd: ItemCommand) -> anyhow::Result<()> {
    match cmd {
        ItemCommand::Add(args) => {
            let storage_id = resolve_storage(&args.storage)?;
            let mut item = NewItem::new(args.name, args.quantity);
            item.category = args.category;
            item.status = args.status;
            item.specs = args.specs;
            item.notes = args.notes;

            let applied = session.apply(InventoryCommand::AddItem(AddItem {
                storage_id: storage_id.clone(),
                item,
                occurred_at: Timestamp::now(),
            }))?;
            println!(
                "{} Added item to {}",
                "✓".green().bold(),
                storage_id.to_string().yellow()
            );
            finish(session, &applied)
        }
        ItemCommand::Edit(args) => {
            let storage_id = resolve_storage(&args.storage)?;
            let item_id = resolve_item(session.store(), &storage_id, &args.item)?;
            let patch = ItemPatch {
                name: args.name,
                quantity: args.quantity,
                category: args.category,
                status: args.status,
                specs: args.specs,
                notes: args.notes,
            };
            if patch.is_empty() {
                bail!("nothing to change (pass at least one field option)");
            }
            let applied = session.apply(InventoryCommand::UpdateItem(UpdateItem {
                storage_id,
                item_id,
                patch,
                occurred_at: Timestamp::now(),
            }))?;
            println!("{} Updated item {}", "✓".green().bold(), item_id.to_string().dimmed());
            finish(session, &applied)
        }
        ItemCommand::Rm(args) => {
            let storage_id = resolve_storage(&args.storage)?;
            let item_id = resolve_item(session.store(), &storage_id, &args.item)?;
            delete(
                session,
                DeleteTarget::Item {
                    storage_id,
                    item_id,
                },
                args.yes,
            )
        }
    }
}

fn cmd_items(session: &FileSession, args: ItemsArgs) -> anyhow::Result<()> {
    let filter = ItemFilter {
        storage_id: args.storage.as_deref().map(resolve_storage).transpose()?,
        category: args.category,
        status: args.status,
        text: args.search,
    };
    let rows = list_items(session.store().state(), &filter);
    if rows.is_empty() {
        println!("No matching items.");
        return Ok(());
    }
    for row in &rows {
        println!(
            "{}  {:>3}. {}  {}  [{}]  {}",
            row.storage.storage_id().to_string().yellow(),
            row.position + 1,
            row.item.name().bold(),
            row.item.quantity(),
            row.item.category().cyan(),
            status_label(row.item.status()),
        );
    }
    println!("\n{} item(s)", rows.len());
    Ok(())
}

fn cmd_taxonomy(session: &mut FileSession, cmd: TaxonomyCommand) -> anyhow::Result<()> {
    match cmd {
        TaxonomyCommand::List => {
            let taxonomies = session.store().taxonomies();
            for kind in TaxonomyKind::ALL {
                let values = taxonomies.get(kind).iter().collect::<Vec<_>>().join(", ");
                println!("{}: {}", kind.as_str().bold(), values);
            }
            Ok(())
        }
        TaxonomyCommand::Add(args) => {
            let kind = TaxonomyKind::from(args.kind);
            let applied = session.apply(InventoryCommand::AddTaxonomyValue(AddTaxonomyValue {
                kind,
                value: args.value.clone(),
            }))?;
            if applied.outcome.changed_state() {
                println!("{} Added {} {}", "✓".green().bold(), kind.member_label(), args.value.yellow());
            } else {
                println!("{} {} is already listed", kind.member_label(), args.value.yellow());
            }
            finish(session, &applied)
        }
        TaxonomyCommand::Rm(args) => {
            let kind = TaxonomyKind::from(args.kind);
            let applied = session.apply(InventoryCommand::RemoveTaxonomyValue(RemoveTaxonomyValue {
                kind,
                value: args.value.clone(),
            }))?;
            println!("{} Removed {} {}", "✓".green().bold(), kind.member_label(), args.value.yellow());
            finish(session, &applied)
        }
    }
}

fn cmd_link(session: &FileSession, config: &AppConfig, args: LinkArgs) -> anyhow::Result<()> {
    match args.storage {
        Some(storage) => {
            let storage_id = resolve_storage(&storage)?;
            session.store().storage(&storage_id)?;
            println!("{}", storage_link(&config.app_url, &storage_id)?);
        }
        None => println!("{}", config.app_url),
    }
    Ok(())
}

fn cmd_qr(session: &mut FileSession, config: &AppConfig, args: QrArgs) -> anyhow::Result<()> {
    match args.storage {
        Some(storage) => {
            let storage_id = resolve_storage(&storage)?;
            write_storage_code(session, config, &storage_id, &args.output)
        }
        None => {
            let rendered = QrSvgRenderer::default()
                .render(&config.app_url)
                .context("rendering app QR code")?;
            write_code_file(&args.output, &rendered.bytes)?;
            println!(
                "{} Wrote QR code for {} to {}",
                "✓".green().bold(),
                config.app_url.blue(),
                args.output.display()
            );
            Ok(())
        }
    }
}

fn delete(session: &mut FileSession, target: DeleteTarget, assume_yes: bool) -> anyhow::Result<()> {
    let prompt = session.request_delete(target)?;
    let question = match &prompt.target {
        DeleteTarget::Storage(storage_id) => format!(
            "Delete storage {} ({}) and its {} item(s)?",
            prompt.name.bold(),
            storage_id,
            prompt.cascaded_items
        ),
        DeleteTarget::Item { storage_id, .. } => {
            format!("Delete item {} from {}?", prompt.name.bold(), storage_id)
        }
    };

    if !assume_yes && !confirm(&question)? {
        session.cancel_delete();
        println!("Cancelled.");
        return Ok(());
    }

    let applied = session.confirm_delete(Timestamp::now())?;
    println!("{} Deleted {}", "✓".green().bold(), prompt.name.yellow());
    finish(session, &applied)
}

/// Report the save result; a change that did not reach disk is an error exit.
fn finish(session: &FileSession, applied: &Applied) -> anyhow::Result<()> {
    if applied.saved {
        return Ok(());
    }
    eprintln!(
        "{} Change was not saved to {}; it is lost when this command exits.",
        "⚠".yellow().bold(),
        session.gateway().path().display()
    );
    bail!("failed to save inventory document")
}

fn confirm(question: &str) -> anyhow::Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush().context("writing prompt")?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("reading confirmation")?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Accept either a bare storage id or a deep link that carries one.
fn resolve_storage(arg: &str) -> anyhow::Result<StorageId> {
    if arg.contains("://") {
        return storage_from_link(arg)
            .with_context(|| format!("no storage reference in link {arg}"));
    }
    Ok(arg.parse::<StorageId>()?)
}

fn resolve_item(
    store: &InventoryStore,
    storage_id: &StorageId,
    item: &ItemRefArgs,
) -> anyhow::Result<ItemId> {
    match (&item.id, item.position) {
        (Some(id), _) => Ok(id.parse::<ItemId>().with_context(|| format!("invalid item id {id}"))?),
        (None, Some(0)) => bail!("positions start at 1"),
        (None, Some(position)) => Ok(store.item_id_at(storage_id, position - 1)?),
        (None, None) => bail!("pass --id or --position"),
    }
}

fn write_storage_code(
    session: &mut FileSession,
    config: &AppConfig,
    storage_id: &StorageId,
    path: &Path,
) -> anyhow::Result<()> {
    let renderer = QrSvgRenderer::default();
    let rendered = session
        .storage_code(&renderer, &config.app_url, storage_id)
        .with_context(|| format!("rendering QR code for {storage_id}"))?;
    write_code_file(path, &rendered.bytes)?;
    println!(
        "{} Wrote QR code for {} to {}",
        "✓".green().bold(),
        storage_id.to_string().yellow(),
        path.display()
    );
    Ok(())
}

fn write_code_file(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}

fn print_storage_table<'a>(storages: impl ExactSizeIterator<Item = &'a Storage>) {
    if storages.len() == 0 {
        println!("No storage units yet. Create one with `labinv storage add`.");
        return;
    }
    for storage in storages {
        println!(
            "{}  {}  {} @ {}  {} item(s)  updated {}",
            storage.storage_id().to_string().yellow(),
            storage.name().bold(),
            storage.storage_type().cyan(),
            storage.location(),
            storage.items().len(),
            storage.last_updated().to_string().dimmed()
        );
    }
}

fn print_storage_details(storage: &Storage, app_url: &str) -> anyhow::Result<()> {
    println!("{}  {}", storage.name().bold(), storage.storage_id().to_string().yellow());
    println!("  Type: {}", storage.storage_type().cyan());
    println!("  Location: {}", storage.location());
    if !storage.description().is_empty() {
        println!("  Description: {}", storage.description());
    }
    println!(
        "  Created: {}   Updated: {}",
        storage.created_date(),
        storage.last_updated()
    );
    println!("  Link: {}", storage_link(app_url, storage.storage_id())?.blue());

    if storage.items().is_empty() {
        println!("\n  No items.");
        return Ok(());
    }
    println!();
    for (position, item) in storage.items().iter().enumerate() {
        println!(
            "  {:>3}. {}  {}  [{}]  {}  {}",
            position + 1,
            item.name().bold(),
            item.quantity(),
            item.category().cyan(),
            status_label(item.status()),
            item.item_id().to_string().dimmed()
        );
        if let Some(specs) = item.specs() {
            println!("       specs: {specs}");
        }
        if let Some(notes) = item.notes() {
            println!("       notes: {notes}");
        }
    }
    Ok(())
}

fn status_label(status: &str) -> colored::ColoredString {
    match status {
        "Available" => status.green(),
        "In Use" | "Reserved" => status.yellow(),
        "Maintenance" => status.blue(),
        "Broken" => status.red(),
        _ => status.normal(),
    }
}
