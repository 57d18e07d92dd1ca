use tracing::debug;

use crate::models::SessionState;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    Plants,
    PlantDetail(String),
    Login,
    Signup,
    ForgotPassword,
    Profile,
    About,
    NotFound(String),
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim();
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["plants"] => Route::Plants,
            ["plant", id] => Route::PlantDetail((*id).to_string()),
            ["login"] => Route::Login,
            ["signup"] => Route::Signup,
            ["forgot-password"] => Route::ForgotPassword,
            ["profile"] => Route::Profile,
            ["about"] => Route::About,
            _ => Route::NotFound(trimmed.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Plants => "/plants".to_string(),
            Route::PlantDetail(id) => format!("/plant/{id}"),
            Route::Login => "/login".to_string(),
            Route::Signup => "/signup".to_string(),
            Route::ForgotPassword => "/forgot-password".to_string(),
            Route::Profile => "/profile".to_string(),
            Route::About => "/about".to_string(),
            Route::NotFound(path) => path.clone(),
        }
    }

    pub fn requires_session(&self) -> bool {
        matches!(self, Route::Profile)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    /// The session has not settled yet, nothing gated can be decided.
    Loading,
    Redirect { to: Route, from: Route },
}

/// Tracks where a redirected visitor wanted to go.
#[derive(Debug, Default)]
pub struct Navigator {
    return_to: Option<Route>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visit(&mut self, route: Route, session: &SessionState) -> Navigation {
        if !route.requires_session() {
            return Navigation::Render(route);
        }

        match session {
            SessionState::SignedIn(_) => Navigation::Render(route),
            SessionState::Loading => Navigation::Loading,
            SessionState::SignedOut => {
                debug!(from = %route.path(), "redirecting to login");
                self.return_to = Some(route.clone());
                Navigation::Redirect {
                    to: Route::Login,
                    from: route,
                }
            }
        }
    }

    /// Where to go once sign-in succeeds. Consumes the remembered route.
    pub fn after_login(&mut self) -> Route {
        self.return_to.take().unwrap_or(Route::Home)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::tests::session;

    #[test]
    fn parses_known_paths() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/plants/"), Route::Plants);
        assert_eq!(Route::parse("/plant/7"), Route::PlantDetail("7".into()));
        assert_eq!(Route::parse("/forgot-password"), Route::ForgotPassword);
        assert_eq!(Route::parse("/profile"), Route::Profile);
        assert_eq!(Route::parse("/plant"), Route::NotFound("/plant".into()));
        assert_eq!(Route::parse("/garden/shed"), Route::NotFound("/garden/shed".into()));
    }

    #[test]
    fn path_round_trips_for_every_route() {
        let routes = [
            Route::Home,
            Route::Plants,
            Route::PlantDetail("3".into()),
            Route::Login,
            Route::Signup,
            Route::ForgotPassword,
            Route::Profile,
            Route::About,
        ];
        for route in routes {
            assert_eq!(Route::parse(&route.path()), route);
        }
    }

    #[test]
    fn only_profile_is_gated() {
        let mut navigator = Navigator::new();
        for path in ["/", "/plants", "/plant/1", "/login", "/signup", "/about", "/nope"] {
            let route = Route::parse(path);
            assert_eq!(
                navigator.visit(route.clone(), &SessionState::SignedOut),
                Navigation::Render(route)
            );
        }
    }

    #[test]
    fn gated_route_redirects_then_returns_after_login() {
        let mut navigator = Navigator::new();

        let outcome = navigator.visit(Route::Profile, &SessionState::SignedOut);
        assert_eq!(
            outcome,
            Navigation::Redirect {
                to: Route::Login,
                from: Route::Profile
            }
        );

        let signed_in = SessionState::SignedIn(session("u1", "ana@leaf.io"));
        let back = navigator.after_login();
        assert_eq!(back, Route::Profile);
        assert_eq!(navigator.visit(back, &signed_in), Navigation::Render(Route::Profile));
    }

    #[test]
    fn login_without_redirect_goes_home() {
        let mut navigator = Navigator::new();
        assert_eq!(navigator.after_login(), Route::Home);

        navigator.visit(Route::Profile, &SessionState::SignedOut);
        navigator.after_login();
        assert_eq!(navigator.after_login(), Route::Home);
    }

    #[test]
    fn gated_route_waits_while_loading() {
        let mut navigator = Navigator::new();
        assert_eq!(
            navigator.visit(Route::Profile, &SessionState::Loading),
            Navigation::Loading
        );
        assert_eq!(navigator.after_login(), Route::Home);
    }
}
