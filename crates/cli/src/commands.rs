use std::io::Write;

use anyhow::Context;
use serde_json::{Value as JsonValue, json};

use supplies_core::{InventoryError, InventoryResult};
use supplies_inventory::{InventoryRepository, InventoryStore, Item, ItemAttributes, ItemKind};

use crate::cli::{AddCommand, Command, ItemArgs, ListCommand, OutputFormat};

/// Execute one command against `repository`, writing results to `out`.
///
/// Inventory errors are returned untouched (wrapped in `anyhow`) so the binary
/// can print them; only output failures get extra context.
pub fn run_command<S: InventoryStore>(
    command: Command,
    repository: &mut InventoryRepository<S>,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    match command {
        Command::Add(add) => cmd_add(add, repository, out),
        Command::Remove { item_id } => {
            repository.remove(&item_id)?;
            writeln!(out, "Removed item with ID: {item_id}")?;
            Ok(())
        }
        Command::View { item_id } => cmd_view(&item_id, repository, format, out),
        Command::Restock { item_id, amount } => {
            let quantity = repository.restock(&item_id, amount)?;
            writeln!(
                out,
                "Restocked {amount} unit(s) of {item_id}. New quantity: {quantity}"
            )?;
            Ok(())
        }
        Command::Sell { item_id, amount } => {
            let quantity = repository.sell(&item_id, amount)?;
            writeln!(
                out,
                "Sold {amount} unit(s) of {item_id}. Remaining quantity: {quantity}"
            )?;
            Ok(())
        }
        Command::List(ListCommand::All) => {
            let items: Vec<&Item> = repository.list_all().collect();
            render_list(&items, "Current Inventory", "Inventory is empty.", format, out)
        }
        Command::List(ListCommand::Type { item_type }) => {
            let items: Vec<&Item> = match item_type.parse::<ItemKind>() {
                Ok(kind) => repository.list_by_type(kind).collect(),
                Err(_) => {
                    tracing::debug!(%item_type, "not a known item type; nothing can match");
                    Vec::new()
                }
            };
            let empty = format!("No {item_type} items found.");
            render_list(&items, &item_type, &empty, format, out)
        }
        Command::TotalValue => {
            let total = repository.total_value();
            match format {
                OutputFormat::Text => writeln!(out, "Total inventory value: ${total:.2}")?,
                OutputFormat::Json => write_json(out, &json!({ "total_value": total }))?,
            }
            Ok(())
        }
    }
}

fn cmd_add<S: InventoryStore>(
    add: AddCommand,
    repository: &mut InventoryRepository<S>,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let item = build_item(add)?;
    let (name, id) = (item.name().to_string(), item.id().clone());
    repository.add(item)?;
    writeln!(out, "Added item: {name} (ID: {id})")?;
    Ok(())
}

fn cmd_view<S: InventoryStore>(
    item_id: &str,
    repository: &InventoryRepository<S>,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let item = repository
        .find(item_id)
        .ok_or_else(|| InventoryError::not_found(item_id))?;
    match format {
        OutputFormat::Text => item.describe(out)?,
        OutputFormat::Json => write_json(out, &item.to_record())?,
    }
    Ok(())
}

/// Turn parsed `add` arguments into a validated item.
pub fn build_item(add: AddCommand) -> InventoryResult<Item> {
    let (common, attributes) = match add {
        AddCommand::Cpu(args) => (
            args.item,
            ItemAttributes::Cpu {
                socket_type: args.socket_type,
            },
        ),
        AddCommand::Ram(args) => (
            args.item,
            ItemAttributes::Ram {
                capacity_gb: args.capacity_gb,
            },
        ),
        AddCommand::Monitor(args) => (
            args.item,
            ItemAttributes::Monitor {
                screen_size_inches: args.screen_size_inches,
            },
        ),
        AddCommand::Storage(args) => (
            args.item,
            ItemAttributes::Storage {
                capacity_gb: args.capacity_gb,
            },
        ),
        AddCommand::Peripheral(args) => (
            args.item,
            ItemAttributes::Peripheral {
                device_type: args.device_type,
            },
        ),
    };
    let ItemArgs {
        id,
        name,
        qty,
        price,
    } = common;
    Item::new(id, name, qty, price, attributes)
}

fn render_list(
    items: &[&Item],
    title: &str,
    empty_message: &str,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        let records: Vec<JsonValue> = items.iter().map(|item| item.to_record()).collect();
        return write_json(out, &JsonValue::Array(records));
    }

    if items.is_empty() {
        writeln!(out, "{empty_message}")?;
        return Ok(());
    }

    let banner = format!("--- {title} Items ---");
    writeln!(out)?;
    writeln!(out, "{banner}")?;
    for item in items {
        item.describe(out)?;
        writeln!(out)?;
    }
    writeln!(out, "{}", "-".repeat(banner.len()))?;
    Ok(())
}

fn write_json(out: &mut dyn Write, value: &JsonValue) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("failed to encode JSON output")?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{CapacityArgs, CpuArgs, MonitorArgs};
    use supplies_inventory::InMemoryStore;

    fn repository() -> InventoryRepository<InMemoryStore> {
        InventoryRepository::open(InMemoryStore::new()).0
    }

    fn run(
        repository: &mut InventoryRepository<InMemoryStore>,
        command: Command,
        format: OutputFormat,
    ) -> anyhow::Result<String> {
        let mut out = Vec::new();
        run_command(command, repository, format, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn add_cpu(id: &str, qty: i64, price: f64) -> Command {
        Command::Add(AddCommand::Cpu(CpuArgs {
            item: ItemArgs {
                id: id.to_string(),
                name: "Ryzen 5".to_string(),
                qty,
                price,
            },
            socket_type: "AM5".to_string(),
        }))
    }

    #[test]
    fn add_sell_restock_total_scenario() {
        let mut repo = repository();
        let text = OutputFormat::Text;

        let added = run(&mut repo, add_cpu("C1", 10, 150.0), text).unwrap();
        assert_eq!(added, "Added item: Ryzen 5 (ID: C1)\n");

        let sold = run(
            &mut repo,
            Command::Sell {
                item_id: "C1".into(),
                amount: 4,
            },
            text,
        )
        .unwrap();
        assert!(sold.contains("Remaining quantity: 6"));

        let err = run(
            &mut repo,
            Command::Sell {
                item_id: "C1".into(),
                amount: 100,
            },
            text,
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InventoryError>(),
            Some(InventoryError::Validation(_))
        ));
        assert_eq!(repo.find("C1").unwrap().quantity(), 6);

        let restocked = run(
            &mut repo,
            Command::Restock {
                item_id: "C1".into(),
                amount: 5,
            },
            text,
        )
        .unwrap();
        assert!(restocked.contains("New quantity: 11"));

        let total = run(&mut repo, Command::TotalValue, text).unwrap();
        assert_eq!(total, "Total inventory value: $1650.00\n");
    }

    #[test]
    fn add_with_invalid_values_is_a_validation_error() {
        let mut repo = repository();
        let err = run(&mut repo, add_cpu("C1", -1, 150.0), OutputFormat::Text).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InventoryError>(),
            Some(InventoryError::Validation(_))
        ));
        assert!(repo.is_empty());
    }

    #[test]
    fn view_missing_item_is_not_found() {
        let mut repo = repository();
        let err = run(
            &mut repo,
            Command::View {
                item_id: "X9".into(),
            },
            OutputFormat::Text,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "item with ID 'X9' not found");
    }

    #[test]
    fn list_messages_for_empty_results() {
        let mut repo = repository();
        let all = run(&mut repo, Command::List(ListCommand::All), OutputFormat::Text).unwrap();
        assert_eq!(all, "Inventory is empty.\n");

        let by_type = run(
            &mut repo,
            Command::List(ListCommand::Type {
                item_type: "GPU".into(),
            }),
            OutputFormat::Text,
        )
        .unwrap();
        assert_eq!(by_type, "No GPU items found.\n");
    }

    #[test]
    fn list_type_matches_case_insensitively() {
        let mut repo = repository();
        run(&mut repo, add_cpu("C1", 1, 10.0), OutputFormat::Text).unwrap();
        run(
            &mut repo,
            Command::Add(AddCommand::Monitor(MonitorArgs {
                item: ItemArgs {
                    id: "M1".into(),
                    name: "UltraSharp".into(),
                    qty: 1,
                    price: 300.0,
                },
                screen_size_inches: 27.0,
            })),
            OutputFormat::Text,
        )
        .unwrap();

        let listed = run(
            &mut repo,
            Command::List(ListCommand::Type {
                item_type: "monitor".into(),
            }),
            OutputFormat::Text,
        )
        .unwrap();
        assert!(listed.contains("--- monitor Items ---"));
        assert!(listed.contains("ID: M1"));
        assert!(!listed.contains("ID: C1"));
    }

    #[test]
    fn json_output_uses_record_format() {
        let mut repo = repository();
        run(
            &mut repo,
            Command::Add(AddCommand::Storage(CapacityArgs {
                item: ItemArgs {
                    id: "S1".into(),
                    name: "NVMe".into(),
                    qty: 2,
                    price: 100.0,
                },
                capacity_gb: 2000,
            })),
            OutputFormat::Text,
        )
        .unwrap();

        let listed = run(&mut repo, Command::List(ListCommand::All), OutputFormat::Json).unwrap();
        let parsed: JsonValue = serde_json::from_str(&listed).unwrap();
        assert_eq!(parsed[0]["type"], "Storage");
        assert_eq!(parsed[0]["capacity_gb"], 2000);

        let total = run(&mut repo, Command::TotalValue, OutputFormat::Json).unwrap();
        let parsed: JsonValue = serde_json::from_str(&total).unwrap();
        assert_eq!(parsed["total_value"], 200.0);
    }

    #[test]
    fn remove_reports_and_deletes() {
        let mut repo = repository();
        run(&mut repo, add_cpu("C1", 1, 10.0), OutputFormat::Text).unwrap();

        let removed = run(
            &mut repo,
            Command::Remove {
                item_id: "C1".into(),
            },
            OutputFormat::Text,
        )
        .unwrap();

        assert_eq!(removed, "Removed item with ID: C1\n");
        assert!(repo.find("C1").is_none());
    }
}
