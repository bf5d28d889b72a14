//! Account CLI commands: register, show, confirm, password, token, avatar.

use anyhow::{anyhow, bail, Result};
use clap::{ArgGroup, Subcommand};
use console::style;
use dialoguer::Password;

use contacts_core::avatar::AvatarResolver;
use contacts_core::repository::users;
use contacts_infra::crypto::password::{hash_password, verify_password};
use contacts_types::user::{User, UserSchema};

use crate::state::AppState;

#[derive(Subcommand)]
pub enum UserCommand {
    /// Register a new account.
    Register {
        /// Display name (3-50 characters).
        #[arg(long)]
        username: String,

        /// Login email address.
        #[arg(long)]
        email: String,

        /// Password (prompted for when omitted).
        #[arg(long)]
        password: Option<String>,
    },

    /// Show an account.
    Show {
        /// Account email.
        email: String,
    },

    /// Mark an account's email address as confirmed.
    Confirm {
        /// Account email.
        email: String,
    },

    /// Change an account's password.
    Password {
        /// Account email.
        email: String,

        /// Current password (prompted for when omitted).
        #[arg(long)]
        current: Option<String>,

        /// New password (prompted for when omitted).
        #[arg(long)]
        password: Option<String>,
    },

    /// Store or clear an account's refresh token.
    #[command(group(ArgGroup::new("value").required(true).args(["token", "clear"])))]
    Token {
        /// Account email.
        email: String,

        /// Token to store.
        #[arg(long)]
        token: Option<String>,

        /// Clear the stored token.
        #[arg(long)]
        clear: bool,
    },

    /// Set an account's avatar URL.
    Avatar {
        /// Account email.
        email: String,

        /// Avatar URL (re-derived from Gravatar when omitted).
        #[arg(long)]
        url: Option<String>,
    },
}

pub async fn run(state: &AppState, action: UserCommand, json: bool) -> Result<()> {
    match action {
        UserCommand::Register {
            username,
            email,
            password,
        } => register(state, username, email, password, json).await,
        UserCommand::Show { email } => show(state, &email, json).await,
        UserCommand::Confirm { email } => confirm(state, &email, json).await,
        UserCommand::Password {
            email,
            current,
            password,
        } => change_password(state, &email, current, password, json).await,
        UserCommand::Token { email, token, clear } => {
            let token = if clear { None } else { token };
            set_token(state, &email, token, json).await
        }
        UserCommand::Avatar { email, url } => set_avatar(state, &email, url, json).await,
    }
}

/// Register an account, hashing the password before it is stored.
///
/// # Examples
///
/// ```bash
/// # Prompt for the password
/// contacts user register --username alice --email alice@example.com
/// ```
async fn register(
    state: &AppState,
    username: String,
    email: String,
    password: Option<String>,
    json: bool,
) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => prompt_new_password()?,
    };

    let schema = registration_schema(&username, &email, password);
    schema.validate()?;

    let hashed = UserSchema {
        password: hash_password(&schema.password)
            .map_err(|e| anyhow!("failed to hash password: {e}"))?,
        ..schema
    };

    let mut session = state.session();
    let user = users::create_user(&hashed, &state.avatars, &mut session).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
        return Ok(());
    }

    println!();
    println!("  {} Account registered!", style("✓").green().bold());
    println!();
    print_user(&user);
    println!();
    println!(
        "  Confirm it with: {}",
        style(format!("contacts user confirm {}", user.email)).yellow()
    );
    println!();

    Ok(())
}

async fn show(state: &AppState, email: &str, json: bool) -> Result<()> {
    let mut session = state.session();
    let user = state.acting_user(&mut session, email).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
        return Ok(());
    }

    println!();
    print_user(&user);
    println!();
    Ok(())
}

async fn confirm(state: &AppState, email: &str, json: bool) -> Result<()> {
    let mut session = state.session();
    let Some(user) = users::confirmed_email(email, &mut session).await? else {
        bail!("no account registered under '{email}'");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
    } else {
        println!(
            "  {} Email {} confirmed.",
            style("✓").green().bold(),
            style(&user.email).cyan()
        );
    }
    Ok(())
}

async fn change_password(
    state: &AppState,
    email: &str,
    current: Option<String>,
    password: Option<String>,
    json: bool,
) -> Result<()> {
    let mut session = state.session();
    let mut user = state.acting_user(&mut session, email).await?;

    let current = match current {
        Some(c) => c,
        None => Password::new().with_prompt("Current password").interact()?,
    };
    if !verify_password(&current, &user.password) {
        bail!("current password does not match");
    }

    let password = match password {
        Some(p) => p,
        None => prompt_new_password()?,
    };
    UserSchema {
        username: user.username.clone(),
        password: password.clone(),
        email: user.email.clone(),
    }
    .validate()?;

    let hashed = hash_password(&password).map_err(|e| anyhow!("failed to hash password: {e}"))?;
    users::change_password(&mut user, &hashed, &mut session).await?;

    if json {
        println!("{}", serde_json::json!({"updated": true, "email": user.email}));
    } else {
        println!("  {} Password changed.", style("✓").green().bold());
    }
    Ok(())
}

async fn set_token(state: &AppState, email: &str, token: Option<String>, json: bool) -> Result<()> {
    let mut session = state.session();
    let mut user = state.acting_user(&mut session, email).await?;

    let cleared = token.is_none();
    users::update_token(&mut user, token, &mut session).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"email": user.email, "has_refresh_token": !cleared})
        );
    } else if cleared {
        println!("  {} Refresh token cleared.", style("✓").green().bold());
    } else {
        println!("  {} Refresh token stored.", style("✓").green().bold());
    }
    Ok(())
}

async fn set_avatar(state: &AppState, email: &str, url: Option<String>, json: bool) -> Result<()> {
    let url = resolve_avatar_url(&state.avatars, email, url)?;

    let mut session = state.session();
    let Some(user) = users::update_avatar_url(email, Some(&url), &mut session).await? else {
        bail!("no account registered under '{email}'");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
        return Ok(());
    }

    println!(
        "  {} Avatar set to {}",
        style("✓").green().bold(),
        style(&url).dim()
    );
    Ok(())
}

/// Registration input with surrounding whitespace stripped from the
/// username and email.
fn registration_schema(username: &str, email: &str, password: String) -> UserSchema {
    UserSchema {
        username: username.trim().to_string(),
        password,
        email: email.trim().to_string(),
    }
}

/// The explicit `--url`, else the resolver's URL. Never clears the avatar.
fn resolve_avatar_url(
    avatars: &impl AvatarResolver,
    email: &str,
    url: Option<String>,
) -> Result<String> {
    match url.or_else(|| avatars.avatar_url(email)) {
        Some(url) => Ok(url),
        None => bail!("avatars are disabled in config.toml; pass --url to set one"),
    }
}

fn prompt_new_password() -> Result<String> {
    Ok(Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?)
}

fn print_user(user: &User) {
    let confirmed = if user.confirmed {
        style("yes").green()
    } else {
        style("no").yellow()
    };

    println!("  {}  {}", style("Username:").bold(), style(&user.username).cyan());
    println!("  {}     {}", style("Email:").bold(), user.email);
    println!("  {} {}", style("Confirmed:").bold(), confirmed);
    println!(
        "  {}    {}",
        style("Avatar:").bold(),
        user.avatar.as_deref().unwrap_or("-")
    );
    println!(
        "  {}   {}",
        style("Created:").bold(),
        user.created_at.format("%Y-%m-%d %H:%M")
    );
    println!("  {}        {}", style("ID:").bold(), style(user.id.to_string()).dim());
}

#[cfg(test)]
mod tests {
    use super::*;
    use contacts_core::avatar::NoAvatar;
    use contacts_infra::avatar::gravatar::GravatarResolver;

    #[test]
    fn registration_schema_trims_username_and_email() {
        let schema = registration_schema(" alice ", "alice@example.com ", " secret1".to_string());
        assert_eq!(schema.username, "alice");
        assert_eq!(schema.email, "alice@example.com");
        assert_eq!(schema.password, " secret1");
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn avatar_without_url_fails_when_resolver_has_none() {
        let err = resolve_avatar_url(&NoAvatar, "bob@example.com", None).unwrap_err();
        assert!(err.to_string().contains("--url"));
    }

    #[test]
    fn avatar_prefers_explicit_url() {
        let url = resolve_avatar_url(
            &GravatarResolver::default(),
            "bob@example.com",
            Some("https://img/bob.png".to_string()),
        )
        .unwrap();
        assert_eq!(url, "https://img/bob.png");
    }

    #[test]
    fn avatar_falls_back_to_gravatar() {
        let url = resolve_avatar_url(&GravatarResolver::default(), "bob@example.com", None).unwrap();
        assert!(url.starts_with("https://www.gravatar.com/avatar/"));
    }
}
