//! Contact CLI commands: add, list, show, update, delete, search, birthdays.
//!
//! Every command acts on behalf of the account named by `--as`.

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;
use dialoguer::Confirm;

use contacts_core::birthday::{days_to_birthday_from, today, BirthdayWindow};
use contacts_core::repository::contacts;
use contacts_infra::config::resolve_page_limit;
use contacts_types::contact::{Contact, ContactId, ContactSchema};

use crate::state::AppState;

#[derive(Subcommand)]
pub enum ContactCommand {
    /// Add a contact.
    Add {
        /// Email of the acting account.
        #[arg(long = "as", value_name = "EMAIL", env = "CONTACTS_USER")]
        acting_as: String,

        #[command(flatten)]
        fields: ContactFields,
    },

    /// List contacts, one page at a time.
    #[command(alias = "ls")]
    List {
        /// Email of the acting account.
        #[arg(long = "as", value_name = "EMAIL", env = "CONTACTS_USER")]
        acting_as: String,

        /// Page size (defaults to `default_page_limit` from config.toml).
        #[arg(long)]
        limit: Option<i64>,

        /// Number of contacts to skip.
        #[arg(long, default_value = "0")]
        offset: i64,
    },

    /// Show one contact.
    Show {
        /// Email of the acting account.
        #[arg(long = "as", value_name = "EMAIL", env = "CONTACTS_USER")]
        acting_as: String,

        /// Contact ID.
        id: ContactId,
    },

    /// Overwrite every field of a contact.
    Update {
        /// Email of the acting account.
        #[arg(long = "as", value_name = "EMAIL", env = "CONTACTS_USER")]
        acting_as: String,

        /// Contact ID.
        id: ContactId,

        #[command(flatten)]
        fields: ContactFields,
    },

    /// Delete a contact.
    #[command(alias = "rm")]
    Delete {
        /// Email of the acting account.
        #[arg(long = "as", value_name = "EMAIL", env = "CONTACTS_USER")]
        acting_as: String,

        /// Contact ID.
        id: ContactId,

        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// Find contacts matching every given field (case-insensitive, exact).
    Search {
        /// Email of the acting account.
        #[arg(long = "as", value_name = "EMAIL", env = "CONTACTS_USER")]
        acting_as: String,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        #[arg(long)]
        email: Option<String>,
    },

    /// Contacts with a birthday coming up.
    Birthdays {
        /// Email of the acting account.
        #[arg(long = "as", value_name = "EMAIL", env = "CONTACTS_USER")]
        acting_as: String,

        /// Window length in days (defaults to `upcoming_birthdays_days` from config.toml).
        #[arg(long)]
        days: Option<u32>,

        /// Page size.
        #[arg(long)]
        limit: Option<i64>,

        /// Number of contacts to skip.
        #[arg(long, default_value = "0")]
        offset: i64,
    },
}

/// Every field of a contact, as given on the command line.
#[derive(Args)]
pub struct ContactFields {
    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    #[arg(long)]
    pub email: String,

    /// Phone number (digits, spaces and `+ - ( )`).
    #[arg(long = "phone")]
    pub phone_number: String,

    /// Date of birth (YYYY-MM-DD).
    #[arg(long)]
    pub birthday: NaiveDate,

    /// Free-form notes.
    #[arg(long = "extra")]
    pub extra_data: Option<String>,
}

impl ContactFields {
    /// Surrounding whitespace is stripped here; repositories store what they get.
    pub fn into_schema(self) -> ContactSchema {
        ContactSchema {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
            birthday: self.birthday,
            extra_data: self.extra_data,
        }
    }
}

pub async fn run(state: &AppState, action: ContactCommand, json: bool) -> Result<()> {
    match action {
        ContactCommand::Add { acting_as, fields } => {
            add_contact(state, &acting_as, fields.into_schema(), json).await
        }
        ContactCommand::List {
            acting_as,
            limit,
            offset,
        } => list_contacts(state, &acting_as, limit, offset, json).await,
        ContactCommand::Show { acting_as, id } => show_contact(state, &acting_as, &id, json).await,
        ContactCommand::Update {
            acting_as,
            id,
            fields,
        } => update_contact(state, &acting_as, &id, fields.into_schema(), json).await,
        ContactCommand::Delete {
            acting_as,
            id,
            force,
        } => delete_contact(state, &acting_as, &id, force, json).await,
        ContactCommand::Search {
            acting_as,
            first_name,
            last_name,
            email,
        } => {
            search_contacts(
                state,
                &acting_as,
                first_name.as_deref(),
                last_name.as_deref(),
                email.as_deref(),
                json,
            )
            .await
        }
        ContactCommand::Birthdays {
            acting_as,
            days,
            limit,
            offset,
        } => upcoming_birthdays(state, &acting_as, days, limit, offset, json).await,
    }
}

/// Add a contact for the acting account.
///
/// # Examples
///
/// ```bash
/// contacts contact add --as alice@example.com \
///     --first-name John --last-name Doe --email john@example.com \
///     --phone "+380 12 345 6789" --birthday 1990-05-17
/// ```
async fn add_contact(state: &AppState, acting_as: &str, body: ContactSchema, json: bool) -> Result<()> {
    body.validate(today())?;

    let mut session = state.session();
    let user = state.acting_user(&mut session, acting_as).await?;
    let contact = contacts::create_contact(&body, &mut session, &user).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&contact)?);
        return Ok(());
    }

    println!();
    println!("  {} Contact added!", style("✓").green().bold());
    println!();
    print_contact(&contact);
    println!();
    Ok(())
}

async fn list_contacts(
    state: &AppState,
    acting_as: &str,
    limit: Option<i64>,
    offset: i64,
    json: bool,
) -> Result<()> {
    let limit = resolve_page_limit(&state.config, limit);

    let mut session = state.session();
    let user = state.acting_user(&mut session, acting_as).await?;
    let found = contacts::get_contacts(limit, offset, &mut session, &user).await?;

    render_contacts(&found, json, "No contacts yet. Add one with: contacts contact add")
}

async fn show_contact(state: &AppState, acting_as: &str, id: &ContactId, json: bool) -> Result<()> {
    let mut session = state.session();
    let user = state.acting_user(&mut session, acting_as).await?;
    let Some(contact) = contacts::get_contact(id, &mut session, &user).await? else {
        bail!("contact '{id}' not found");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&contact)?);
        return Ok(());
    }

    println!();
    print_contact(&contact);
    println!();
    Ok(())
}

async fn update_contact(
    state: &AppState,
    acting_as: &str,
    id: &ContactId,
    body: ContactSchema,
    json: bool,
) -> Result<()> {
    body.validate(today())?;

    let mut session = state.session();
    let user = state.acting_user(&mut session, acting_as).await?;
    let Some(contact) = contacts::update_contact(&body, id, &mut session, &user).await? else {
        bail!("contact '{id}' not found");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&contact)?);
        return Ok(());
    }

    println!();
    println!("  {} Contact updated.", style("✓").green().bold());
    println!();
    print_contact(&contact);
    println!();
    Ok(())
}

async fn delete_contact(
    state: &AppState,
    acting_as: &str,
    id: &ContactId,
    force: bool,
    json: bool,
) -> Result<()> {
    let mut session = state.session();
    let user = state.acting_user(&mut session, acting_as).await?;

    if !force && !json {
        let Some(contact) = contacts::get_contact(id, &mut session, &user).await? else {
            bail!("contact '{id}' not found");
        };
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Permanently delete contact '{}'?",
                style(contact.full_name()).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let Some(contact) = contacts::delete_contact(id, &mut session, &user).await? else {
        bail!("contact '{id}' not found");
    };

    if json {
        println!("{}", serde_json::json!({"deleted": true, "id": contact.id}));
    } else {
        println!(
            "  {} Contact '{}' deleted.",
            style("✓").red().bold(),
            contact.full_name()
        );
    }
    Ok(())
}

async fn search_contacts(
    state: &AppState,
    acting_as: &str,
    first_name: Option<&str>,
    last_name: Option<&str>,
    email: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut session = state.session();
    let user = state.acting_user(&mut session, acting_as).await?;
    let found =
        contacts::search_contacts(first_name, last_name, email, &mut session, &user).await?;

    render_contacts(&found, json, "No contacts match.")
}

async fn upcoming_birthdays(
    state: &AppState,
    acting_as: &str,
    days: Option<u32>,
    limit: Option<i64>,
    offset: i64,
    json: bool,
) -> Result<()> {
    let days = days.unwrap_or(state.config.upcoming_birthdays_days);
    let limit = resolve_page_limit(&state.config, limit);
    let window = BirthdayWindow::from_today(days);

    let mut session = state.session();
    let user = state.acting_user(&mut session, acting_as).await?;
    let found =
        contacts::get_upcoming_birthdays_within(window, limit, offset, &mut session, &user).await?;

    render_contacts(
        &found,
        json,
        &format!("No birthdays in the next {days} days."),
    )
}

fn render_contacts(found: &[Contact], json: bool, empty_message: &str) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(found)?);
        return Ok(());
    }

    if found.is_empty() {
        println!();
        println!("  {} {}", style("i").blue().bold(), empty_message);
        println!();
        return Ok(());
    }

    println!();
    println!("{}", contacts_table(found, today()));
    println!();
    println!(
        "  {} contact{}",
        style(found.len()).bold(),
        if found.len() == 1 { "" } else { "s" }
    );
    println!();
    Ok(())
}

fn contacts_table(found: &[Contact], today: NaiveDate) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("Email").fg(Color::White),
        Cell::new("Phone").fg(Color::White),
        Cell::new("Birthday").fg(Color::White),
        Cell::new("ID").fg(Color::White),
    ]);

    for contact in found {
        table.add_row(vec![
            Cell::new(contact.full_name()).fg(Color::Cyan),
            Cell::new(&contact.email),
            Cell::new(&contact.phone_number),
            birthday_cell(contact.birthday, today),
            Cell::new(contact.id.to_string()).fg(Color::DarkGrey),
        ]);
    }

    table
}

fn birthday_cell(birthday: NaiveDate, today: NaiveDate) -> Cell {
    let label = birthday_label(birthday, today);
    match days_to_birthday_from(birthday, today) {
        0 => Cell::new(label).fg(Color::Green),
        1..=7 => Cell::new(label).fg(Color::Yellow),
        _ => Cell::new(label),
    }
}

fn birthday_label(birthday: NaiveDate, today: NaiveDate) -> String {
    let date = birthday.format("%Y-%m-%d");
    match days_to_birthday_from(birthday, today) {
        0 => format!("{date} (today!)"),
        1 => format!("{date} (tomorrow)"),
        n => format!("{date} (in {n} days)"),
    }
}

fn print_contact(contact: &Contact) {
    println!("  {}     {}", style("Name:").bold(), style(contact.full_name()).cyan());
    println!("  {}    {}", style("Email:").bold(), contact.email);
    println!("  {}    {}", style("Phone:").bold(), contact.phone_number);
    println!(
        "  {} {}",
        style("Birthday:").bold(),
        birthday_label(contact.birthday, today())
    );
    if let Some(extra) = &contact.extra_data {
        println!("  {}    {}", style("Notes:").bold(), extra);
    }
    println!("  {}       {}", style("ID:").bold(), style(contact.id.to_string()).dim());
}
