use clap::Subcommand;
use serde_json::json;

use crate::auth::{decode_jwt, generate_jwt, Claims};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;
use crate::types::Role;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Mint a session token for a role")]
    Issue {
        #[arg(long, help = "Role claim (admin, staff or trainer)")]
        role: Role,
        #[arg(long, default_value = "operator", help = "Subject claim")]
        subject: String,
        #[arg(long, help = "Lifetime in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
        hours: Option<u64>,
    },

    #[command(about = "Verify a token and show its claims")]
    Inspect {
        #[arg(help = "Encoded JWT")]
        token: String,
    },
}

pub fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let security = &config::config().security;

    match cmd {
        TokenCommands::Issue { role, subject, hours } => {
            let hours = hours.unwrap_or(security.jwt_expiry_hours);
            let claims = Claims::new(subject, Some(role.to_string()), hours);
            let token = generate_jwt(&claims, &security.jwt_secret)?;

            match output_format {
                OutputFormat::Json => output_success(
                    output_format,
                    &format!("Issued {} token", role),
                    Some(json!({ "token": token, "claims": claims })),
                ),
                // Bare token so it can be captured by a shell
                OutputFormat::Text => {
                    println!("{}", token);
                    Ok(())
                }
            }
        }
        TokenCommands::Inspect { token } => {
            let claims = decode_jwt(token.trim(), &security.jwt_secret)?;
            let session = claims.clone().into_session();
            let role = session
                .role
                .map(|r| r.to_string())
                .unwrap_or_else(|| "none".to_string());

            output_success(
                output_format,
                &format!("Token for '{}' with role {}", claims.sub, role),
                Some(json!({ "claims": claims, "recognised_role": session.role })),
            )
        }
    }
}
