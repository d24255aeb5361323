use anyhow::{anyhow, Context};
use clap::Subcommand;
use serde_json::{json, Map, Value};
use std::io::Read;
use std::sync::Arc;

use crate::cli::utils::{output_error, output_notifications, output_success, text_table};
use crate::cli::OutputFormat;
use crate::config;
use crate::form::{form_text, posted_fields, DeleteOutcome, FormController, SubmitOutcome};
use crate::notify::CollectingSink;
use crate::resource::{ResourceClient, ResourceRegistry};
use crate::schema::EntityKind;
use crate::table::TableController;

#[derive(Subcommand)]
pub enum RecordsCommands {
    #[command(about = "List records, optionally searched and filtered")]
    List {
        #[arg(help = "Entity: staff, trainer, cage, area or news")]
        entity: EntityKind,
        #[arg(long, help = "Case-insensitive search on the entity's search field")]
        search: Option<String>,
        #[arg(long, help = "Facet value (status 0/1, or a news tag)")]
        facet: Option<String>,
    },

    #[command(about = "Show one record")]
    Get {
        #[arg(help = "Entity: staff, trainer, cage, area or news")]
        entity: EntityKind,
        #[arg(help = "Record ID")]
        id: String,
    },

    #[command(about = "Create record from stdin")]
    Create {
        #[arg(help = "Entity: staff, trainer, cage, area or news")]
        entity: EntityKind,
    },

    #[command(about = "Update record from stdin")]
    Update {
        #[arg(help = "Entity: staff, trainer, cage, area or news")]
        entity: EntityKind,
        #[arg(help = "Record ID to update")]
        id: String,
    },

    #[command(about = "Delete a record")]
    Delete {
        #[arg(help = "Entity: staff, trainer, cage, area or news")]
        entity: EntityKind,
        #[arg(help = "Record ID to delete")]
        id: String,
        #[arg(long, help = "Confirm the delete; without it nothing is removed")]
        yes: bool,
    },
}

fn client_for(kind: EntityKind) -> anyhow::Result<Arc<dyn ResourceClient>> {
    let registry = ResourceRegistry::from_config(&config::config().remote)?;
    registry
        .client(kind)
        .ok_or_else(|| anyhow!("no remote client configured for {}", kind))
}

fn read_stdin_object() -> anyhow::Result<Map<String, Value>> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;

    match serde_json::from_str(&input).context("stdin is not valid JSON")? {
        Value::Object(map) => Ok(map),
        _ => Err(anyhow!("stdin must contain a JSON object")),
    }
}

pub async fn handle(cmd: RecordsCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        RecordsCommands::List { entity, search, facet } => {
            let sink = Arc::new(CollectingSink::new());
            let mut table = TableController::new(client_for(entity)?, sink.clone());
            let loaded = table.load().await.map(|_| ());
            output_notifications(output_format, &sink.take());
            loaded?;

            table.search(search.as_deref().unwrap_or_default());
            table.filter(facet.as_deref());
            let rows = table.visible_rows();

            match output_format {
                OutputFormat::Json => output_success(
                    output_format,
                    &table.heading(),
                    Some(json!({ "records": rows, "facets": table.facet_options() })),
                ),
                OutputFormat::Text => {
                    let schema = table.schema();
                    let mut headers = vec!["id", schema.search_key];
                    if schema.search_key != "isDeleted" && schema.field("isDeleted").is_some() {
                        headers.push("isDeleted");
                    }
                    let cells: Vec<Vec<String>> = rows
                        .iter()
                        .map(|record| {
                            headers
                                .iter()
                                .map(|h| record.get(h).map(|v| form_text(&v)).unwrap_or_default())
                                .collect()
                        })
                        .collect();

                    println!("{}", table.heading());
                    println!("{}", text_table(&headers, &cells));
                    Ok(())
                }
            }
        }
        RecordsCommands::Get { entity, id } => {
            let record = client_for(entity)?.get(&id).await?;
            output_success(output_format, &format!("{} '{}'", entity, record.id), Some(json!(record)))?;
            if output_format == OutputFormat::Text {
                println!("{}", serde_json::to_string_pretty(&record)?);
            }
            Ok(())
        }
        RecordsCommands::Create { entity } => {
            let values = read_stdin_object()?;
            let sink = Arc::new(CollectingSink::new());
            let form = FormController::create(client_for(entity)?, sink.clone());
            form.set_fields(posted_fields(entity, None, &values)).await?;
            finish_submit(form.submit().await?, &form, &sink, output_format).await
        }
        RecordsCommands::Update { entity, id } => {
            let values = read_stdin_object()?;
            let client = client_for(entity)?;
            let record = client.get(&id).await?;
            let sink = Arc::new(CollectingSink::new());
            let form = FormController::edit(record.clone(), client, sink.clone());
            form.set_fields(posted_fields(entity, Some(&record), &values)).await?;
            finish_submit(form.submit().await?, &form, &sink, output_format).await
        }
        RecordsCommands::Delete { entity, id, yes } => {
            let client = client_for(entity)?;
            let record = client.get(&id).await?;
            let sink = Arc::new(CollectingSink::new());
            let form = FormController::edit(record, client, sink.clone());

            form.request_delete().await?;
            if !yes {
                form.cancel_delete().await?;
                return output_error(
                    output_format,
                    &format!("Not deleting {} '{}' without --yes", entity, id),
                    None,
                );
            }

            let outcome = form.confirm_delete().await?;
            output_notifications(output_format, &sink.snapshot());
            match outcome {
                DeleteOutcome::Deleted => output_success(output_format, &format!("Deleted {} '{}'", entity, id), None),
                DeleteOutcome::Failed(e) => Err(e.into()),
            }
        }
    }
}

async fn finish_submit(
    outcome: SubmitOutcome,
    form: &FormController,
    sink: &CollectingSink,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let effects = sink.take();
    output_notifications(output_format, &effects);

    match outcome {
        SubmitOutcome::Saved(record) => output_success(
            output_format,
            &format!("Saved {} '{}'", form.kind(), record.id),
            Some(json!({ "record": record, "redirect": effects.redirect() })),
        ),
        SubmitOutcome::Invalid(errors) => {
            output_error(output_format, "Validation failed", Some(json!(errors)))?;
            Err(anyhow!("{} field(s) failed validation", errors.len()))
        }
        SubmitOutcome::Failed(e) => {
            let errors = form.draft().await.validation_errors;
            if !errors.is_empty() {
                output_error(output_format, "Remote store rejected the record", Some(json!(errors)))?;
            }
            Err(e.into())
        }
    }
}
