use clap::{Args, Parser, Subcommand};

use crate::catalog::SortOrder;
use crate::models::{Difficulty, Light};
use crate::storefront::Credentials;

#[derive(Parser)]
#[command(name = "green-nest")]
#[command(about = "Browse GreenNest plants, book a consultation and manage your account")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Home page with the top rated plants
    Home,
    /// Browse the catalog (search, filter, sort)
    Plants(PlantsArgs),
    /// Show one plant's details
    Plant {
        /// Plant ID
        #[arg(long)]
        id: String,
    },
    /// Book a free consultation about a plant
    Book(BookArgs),
    /// Create an account
    Signup(SignupArgs),
    /// Log in with email/password or a Google ID token
    Login(LoginArgs),
    /// Send a password reset email
    ResetPassword {
        #[arg(long)]
        email: String,
    },
    /// View (and optionally update) your profile; requires logging in
    Profile(ProfileArgs),
    /// Open any storefront path, e.g. /plants or /plant/3
    Open {
        path: String,
        #[command(flatten)]
        login: LoginArgs,
    },
    /// About GreenNest
    About,
}

#[derive(Args, Debug, Default)]
pub struct PlantsArgs {
    /// Case-insensitive search over name and scientific name
    #[arg(short, long)]
    pub search: Option<String>,
    /// Category, e.g. Indoor or Succulent
    #[arg(short, long)]
    pub category: Option<String>,
    #[arg(short, long, value_enum)]
    pub difficulty: Option<Difficulty>,
    #[arg(short, long, value_enum)]
    pub light: Option<Light>,
    #[arg(long, value_enum, default_value_t = SortOrder::Default)]
    pub sort: SortOrder,
}

#[derive(Args, Debug)]
pub struct BookArgs {
    /// Plant ID
    #[arg(long)]
    pub id: String,
    #[arg(short, long)]
    pub name: String,
    #[arg(short, long)]
    pub email: String,
    #[arg(short, long)]
    pub phone: String,
}

#[derive(Args, Debug)]
pub struct SignupArgs {
    #[arg(short, long)]
    pub name: String,
    #[arg(short, long)]
    pub email: String,
    #[arg(short, long)]
    pub password: String,
    /// Profile photo URL (optional)
    #[arg(long)]
    pub photo_url: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct LoginArgs {
    #[arg(short, long, requires = "password", conflicts_with = "google_id_token")]
    pub email: Option<String>,
    #[arg(short, long, requires = "email")]
    pub password: Option<String>,
    /// ID token from a Google sign-in
    #[arg(long)]
    pub google_id_token: Option<String>,
}

impl LoginArgs {
    pub fn credentials(&self) -> Credentials {
        match (&self.email, &self.password, &self.google_id_token) {
            (_, _, Some(token)) => Credentials::Google(token.clone()),
            (Some(email), Some(password), None) => Credentials::Password {
                email: email.clone(),
                password: password.clone(),
            },
            _ => Credentials::None,
        }
    }
}

#[derive(Args, Debug)]
pub struct ProfileArgs {
    #[command(flatten)]
    pub login: LoginArgs,
    /// New display name (optional)
    #[arg(long)]
    pub name: Option<String>,
    /// New photo URL (optional)
    #[arg(long)]
    pub photo_url: Option<String>,
}
