use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::{fmt, EnvFilter};

mod catalog;
mod cli;
mod config;
mod consultation;
mod identity;
mod models;
mod navigation;
mod storefront;
mod validation;
mod views;

use catalog::{Catalog, CatalogQuery};
use cli::{Cli, Commands};
use config::Config;
use identity::{FirebaseIdentity, SessionRelay};
use storefront::Storefront;
use validation::{ConsultationForm, PasswordResetForm, ProfileForm, SignupForm};

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", report(&e));
            ExitCode::FAILURE
        }
    }
}

/// Logs the full error chain and returns the line shown to the user.
fn report(e: &anyhow::Error) -> String {
    error!(error = %format_args!("{e:#}"), "command failed");
    format!("Error: {e}")
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let catalog = Catalog::bundled()?;

    match cli.command {
        Commands::Home => print!("{}", views::home(&catalog)),
        Commands::Plants(args) => {
            let query = CatalogQuery {
                search: args.search,
                category: args.category,
                difficulty: args.difficulty,
                light: args.light,
                sort: args.sort,
            };
            let plants = catalog.query(&query);
            print!("{}", views::plant_list(&plants, &query, &catalog.categories()));
        }
        Commands::Plant { id } => print!("{}", views::plant_details(catalog.plant(&id), &id)),
        Commands::Book(args) => {
            let Some(plant) = catalog.plant(&args.id) else {
                print!("{}", views::plant_details(None, &args.id));
                return Ok(());
            };
            let form = ConsultationForm {
                name: args.name,
                email: args.email,
                phone: args.phone,
            };
            let booking = consultation::book(plant, &form)?;
            println!("{}", booking.confirmation());
        }
        Commands::Signup(args) => {
            let form = SignupForm {
                name: args.name,
                email: args.email,
                password: args.password,
                photo_url: args.photo_url,
            }
            .validate()?;
            let relay = connect(&config)?;
            relay
                .sign_up(&form.name, &form.email, &form.password, form.photo_url.as_deref())
                .await?;
            println!("Account created successfully! Welcome to GreenNest, {}", form.name);
        }
        Commands::Login(args) => {
            let relay = connect(&config)?;
            let mut store = Storefront::new(&catalog, Some(&relay));
            let (session, back) = store.sign_in(&args.credentials()).await?;
            print!("{}", storefront::welcome(&session));
            println!("Continue at {}", back.path());
            relay.sign_out();
        }
        Commands::ResetPassword { email } => {
            let form = PasswordResetForm { email }.validate()?;
            let relay = connect(&config)?;
            relay.reset_password(&form.email).await?;
            println!("Password reset email sent! Check your inbox");
        }
        Commands::Profile(args) => {
            let relay = connect(&config)?;
            let update = ProfileForm {
                name: args.name,
                photo_url: args.photo_url,
            };
            let mut store = Storefront::new(&catalog, Some(&relay));
            print!("{}", store.open("/profile", &args.login.credentials(), &update).await?);
            relay.sign_out();
        }
        Commands::Open { path, login } => {
            let credentials = login.credentials();
            // Only gated pages need the identity service.
            let relay = if navigation::Route::parse(&path).requires_session() {
                Some(connect(&config)?)
            } else {
                None
            };
            let mut store = Storefront::new(&catalog, relay.as_ref());
            print!("{}", store.open(&path, &credentials, &ProfileForm::default()).await?);
            if let Some(relay) = &relay {
                relay.sign_out();
            }
        }
        Commands::About => print!("{}", views::about()),
    }

    Ok(())
}

/// Builds the relay over the configured identity service. Sessions are not
/// persisted, every run starts signed out and signs out before exiting.
fn connect(config: &Config) -> Result<SessionRelay> {
    let provider = FirebaseIdentity::new(&config.identity)?;
    let relay = SessionRelay::new(Arc::new(provider));

    let mut sessions = relay.subscribe();
    tokio::spawn(async move {
        while sessions.changed().await.is_ok() {
            let signed_in = sessions.borrow_and_update().session().is_some();
            debug!(signed_in, "session changed");
        }
    });

    relay.restore(None);
    info!(base_url = %config.identity.base_url, "identity service ready");
    Ok(relay)
}

#[cfg(test)]
mod tests {
    use anyhow::Context;
    use tracing_test::traced_test;

    use super::*;
    use crate::validation::ValidationError;

    #[test]
    #[traced_test]
    fn failures_are_reported_once_with_user_message() {
        let e = anyhow::Error::from(ValidationError::InvalidEmail);
        assert_eq!(report(&e), format!("Error: {}", ValidationError::InvalidEmail));
        assert!(logs_contain("command failed"));
    }

    #[test]
    #[traced_test]
    fn log_keeps_the_cause_chain() {
        let e = Err::<(), _>(ValidationError::InvalidEmail)
            .context("signup failed")
            .unwrap_err();
        assert_eq!(report(&e), "Error: signup failed");
        assert!(logs_contain(&ValidationError::InvalidEmail.to_string()));
    }
}
