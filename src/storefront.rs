use anyhow::{anyhow, bail, Context, Result};
use tracing::info;

use crate::catalog::{Catalog, CatalogQuery};
use crate::identity::{FederatedCredential, ProfileUpdate, SessionRelay};
use crate::models::{Session, SessionState};
use crate::navigation::{Navigation, Navigator, Route};
use crate::validation::{LoginForm, ProfileForm};
use crate::views;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Credentials {
    #[default]
    None,
    Password { email: String, password: String },
    Google(String),
}

/// One visit to the storefront: the catalog, an optional identity relay and
/// the navigator that remembers redirects.
pub struct Storefront<'a> {
    catalog: &'a Catalog,
    relay: Option<&'a SessionRelay>,
    navigator: Navigator,
}

impl<'a> Storefront<'a> {
    pub fn new(catalog: &'a Catalog, relay: Option<&'a SessionRelay>) -> Self {
        Self {
            catalog,
            relay,
            navigator: Navigator::new(),
        }
    }

    fn session_state(&self) -> SessionState {
        self.relay
            .map_or(SessionState::SignedOut, SessionRelay::current)
    }

    fn relay(&self) -> Result<&'a SessionRelay> {
        self.relay
            .ok_or_else(|| anyhow!("account features are unavailable without an identity service"))
    }

    /// Navigates to `path`. A gated page sends the visitor through sign-in
    /// with `credentials` and then back to the page they asked for.
    pub async fn open(
        &mut self,
        path: &str,
        credentials: &Credentials,
        update: &ProfileForm,
    ) -> Result<String> {
        let mut out = String::new();
        let mut target = Route::parse(path);
        let mut attempted_login = false;

        loop {
            let state = self.session_state();
            match self.navigator.visit(target, &state) {
                Navigation::Render(route) => {
                    out.push_str(&self.render(route, update).await?);
                    return Ok(out);
                }
                Navigation::Loading => {
                    out.push_str(&views::loading());
                    return Ok(out);
                }
                Navigation::Redirect { to, from } => {
                    if attempted_login {
                        bail!("still signed out after logging in");
                    }
                    attempted_login = true;
                    out.push_str(&format!(
                        "{} requires an account, redirecting to {}\n",
                        from.path(),
                        to.path()
                    ));
                    let (session, back) = self.sign_in(credentials).await?;
                    out.push_str(&welcome(&session));
                    target = back;
                }
            }
        }
    }

    /// Signs in and returns the session with the page to go back to.
    pub async fn sign_in(&mut self, credentials: &Credentials) -> Result<(Session, Route)> {
        let relay = self.relay()?;
        let session = match credentials {
            Credentials::None => bail!("{}", views::login_prompt().trim_end()),
            Credentials::Password { email, password } => {
                let form = LoginForm {
                    email: email.clone(),
                    password: password.clone(),
                }
                .validate()?;
                relay.sign_in(&form.email, &form.password).await?
            }
            Credentials::Google(token) => {
                relay
                    .sign_in_federated(&FederatedCredential::google(token.clone()))
                    .await?
            }
        };
        Ok((session, self.navigator.after_login()))
    }

    async fn render(&self, route: Route, update: &ProfileForm) -> Result<String> {
        let page = match route {
            Route::Home => views::home(self.catalog),
            Route::Plants => {
                let query = CatalogQuery::default();
                views::plant_list(&self.catalog.query(&query), &query, &self.catalog.categories())
            }
            Route::PlantDetail(id) => views::plant_details(self.catalog.plant(&id), &id),
            Route::Login => views::login_prompt(),
            Route::Signup => views::signup_prompt(),
            Route::ForgotPassword => views::forgot_password_prompt(),
            Route::Profile => self.profile(update).await?,
            Route::About => views::about(),
            Route::NotFound(path) => views::not_found(&path),
        };
        Ok(page)
    }

    async fn profile(&self, update: &ProfileForm) -> Result<String> {
        let relay = self.relay()?;
        let update = update.validate()?;

        if update.is_empty() {
            let state = relay.current();
            let session = state.session().context("no active session")?;
            return Ok(views::profile(session));
        }

        let session = relay
            .update_profile(&ProfileUpdate {
                display_name: update.name,
                photo_url: update.photo_url,
            })
            .await?;
        info!(uid = %session.uid, "profile saved");
        Ok(format!("Profile updated successfully!\n\n{}", views::profile(&session)))
    }
}

pub fn welcome(session: &Session) -> String {
    let name = session.display_name.as_deref().unwrap_or(&session.email);
    format!("Login successful! Welcome back, {name}\n")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::identity::tests::FakeProvider;

    fn relay() -> SessionRelay {
        let relay = SessionRelay::new(Arc::new(FakeProvider::with_account(
            "ana@leaf.io",
            "Secret1",
        )));
        relay.restore(None);
        relay
    }

    fn password() -> Credentials {
        Credentials::Password {
            email: "ana@leaf.io".into(),
            password: "Secret1".into(),
        }
    }

    #[tokio::test]
    async fn open_pages_render_without_identity_service() {
        let catalog = Catalog::bundled().unwrap();
        let mut store = Storefront::new(&catalog, None);
        let none = ProfileForm::default();

        let out = store.open("/plants", &Credentials::None, &none).await.unwrap();
        assert!(out.starts_with("Showing 12 plant(s)"));

        let out = store.open("/plant/99", &Credentials::None, &none).await.unwrap();
        assert!(out.starts_with("Plant not found."));

        let out = store.open("/garden", &Credentials::None, &none).await.unwrap();
        assert!(out.starts_with("404"));
    }

    #[tokio::test]
    async fn profile_redirects_to_login_and_comes_back() {
        let catalog = Catalog::bundled().unwrap();
        let relay = relay();
        let mut store = Storefront::new(&catalog, Some(&relay));

        let out = store
            .open("/profile", &password(), &ProfileForm::default())
            .await
            .unwrap();

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "/profile requires an account, redirecting to /login");
        assert_eq!(lines[1], "Login successful! Welcome back, ana@leaf.io");
        assert_eq!(lines[2], "My Profile");
        assert!(out.contains("Email: ana@leaf.io"));
    }

    #[tokio::test]
    async fn profile_without_credentials_is_refused() {
        let catalog = Catalog::bundled().unwrap();
        let relay = relay();
        let mut store = Storefront::new(&catalog, Some(&relay));

        let err = store
            .open("/profile", &Credentials::None, &ProfileForm::default())
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Please log in to continue"));
        assert_eq!(relay.current(), SessionState::SignedOut);
    }

    #[tokio::test]
    async fn wrong_password_surfaces_provider_message() {
        let catalog = Catalog::bundled().unwrap();
        let relay = relay();
        let mut store = Storefront::new(&catalog, Some(&relay));

        let bad = Credentials::Password {
            email: "ana@leaf.io".into(),
            password: "nope".into(),
        };
        let err = store
            .open("/profile", &bad, &ProfileForm::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password");
    }

    #[tokio::test]
    async fn profile_update_after_redirect() {
        let catalog = Catalog::bundled().unwrap();
        let relay = relay();
        let mut store = Storefront::new(&catalog, Some(&relay));

        let update = ProfileForm {
            name: Some("Ana B".into()),
            photo_url: None,
        };
        let out = store.open("/profile", &password(), &update).await.unwrap();
        assert!(out.contains("Profile updated successfully!"));
        assert!(out.contains("Name: Ana B"));
        assert_eq!(
            relay.current().session().and_then(|s| s.display_name.clone()),
            Some("Ana B".to_string())
        );
    }

    #[tokio::test]
    async fn gated_page_shows_loading_until_session_settles() {
        let catalog = Catalog::bundled().unwrap();
        let relay = SessionRelay::new(Arc::new(FakeProvider::default()));
        let mut store = Storefront::new(&catalog, Some(&relay));

        let out = store
            .open("/profile", &password(), &ProfileForm::default())
            .await
            .unwrap();
        assert_eq!(out, "Loading...\n");
    }

    #[tokio::test]
    async fn plain_login_returns_home() {
        let catalog = Catalog::bundled().unwrap();
        let relay = relay();
        let mut store = Storefront::new(&catalog, Some(&relay));

        let (session, back) = store.sign_in(&password()).await.unwrap();
        assert_eq!(session.email, "ana@leaf.io");
        assert_eq!(back, Route::Home);
    }
}
