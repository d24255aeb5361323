use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::notify::{Effects, NotificationKind};

/// Output a success message in the appropriate format
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(data_value) = data {
                response["data"] = data_value;
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: OutputFormat, message: &str, details: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(details) = details {
                response["details"] = details;
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
            if let Some(Value::Object(fields)) = details {
                for (field, problem) in fields {
                    eprintln!("  {}: {}", field, problem.as_str().unwrap_or_default());
                }
            }
        }
    }
    Ok(())
}

/// Print the toasts a controller raised; JSON output carries them in its body instead
pub fn output_notifications(output_format: OutputFormat, effects: &Effects) {
    if output_format == OutputFormat::Json {
        return;
    }
    for notification in &effects.notifications {
        match notification.kind {
            NotificationKind::Success => println!("✓ {}", notification.message),
            NotificationKind::Error => eprintln!("✗ {}", notification.message),
        }
    }
}

/// Render rows as aligned text columns
pub fn text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.len()))
                .max()
                .unwrap_or_default()
        })
        .collect();

    let render = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![render(headers.to_vec())];
    for row in rows {
        lines.push(render(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}
