use clap::Subcommand;
use serde_json::json;

use crate::access::RouteGuard;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;
use crate::types::AuthenticatedSession;

#[derive(Subcommand)]
pub enum GuardCommands {
    #[command(about = "Show the guard decision for a path")]
    Check {
        #[arg(help = "Request path, e.g. /admin/manage-staffs")]
        path: String,
        #[arg(long, help = "Role claim to test with; omit for a session without a role")]
        role: Option<String>,
    },

    #[command(about = "List the configured route rules")]
    Rules,
}

pub fn handle(cmd: GuardCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let guard = RouteGuard::from_config(&config::config().guard);

    match cmd {
        GuardCommands::Check { path, role } => {
            let session = AuthenticatedSession::from_claim(None, role.clone());
            let decision = guard.evaluate(&path, &session);
            let who = role.as_deref().unwrap_or("no role");

            let message = if decision.is_allowed() {
                format!("{} may open {}", who, path)
            } else {
                format!("{} is sent to {} for {}", who, guard.denied_path(), path)
            };

            output_success(
                output_format,
                &message,
                Some(json!({ "path": path, "role": role, "decision": decision })),
            )
        }
        GuardCommands::Rules => {
            let rules: Vec<_> = guard
                .rules()
                .iter()
                .map(|rule| json!({ "prefix": rule.prefix, "allowed": rule.allowed }))
                .collect();

            match output_format {
                OutputFormat::Json => output_success(output_format, "Route rules", Some(json!({ "rules": rules }))),
                OutputFormat::Text => {
                    for rule in guard.rules() {
                        let allowed: Vec<_> = rule.allowed.iter().map(|r| r.as_str()).collect();
                        println!("{:<10} {}", rule.prefix, allowed.join(", "));
                    }
                    Ok(())
                }
            }
        }
    }
}
