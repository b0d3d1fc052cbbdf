//! Route classification for the web frontend the session serves.

/// Sign-in page.
pub const LOGIN_PATH: &str = "/login";

/// Where a freshly signed-in user lands when no destination was requested.
pub const DEFAULT_DESTINATION: &str = "/dashboard";

const ONBOARDING_PREFIX: &str = "/onboarding";

const PUBLIC_ROUTES: &[&str] = &["/", "/login", "/about", "/privacy", "/terms", "/auth/callback"];

const ONBOARDING_REQUIRED_ROUTES: &[&str] =
    &["/dashboard", "/poems", "/collections", "/profile", "/bookmarks"];

/// Sign-in page, remembering `return_to` so the user comes back afterwards.
///
/// ```
/// use stanza::routing::sign_in_path;
///
/// assert_eq!(sign_in_path(Some("/poems/7")), "/login?redirectTo=%2Fpoems%2F7");
/// assert_eq!(sign_in_path(None), "/login");
/// ```
pub fn sign_in_path(return_to: Option<&str>) -> String {
    match return_to.filter(|path| !path.is_empty()) {
        Some(path) => format!("{LOGIN_PATH}?redirectTo={}", urlencoding::encode(path)),
        None => LOGIN_PATH.to_string(),
    }
}

/// Destination after a successful sign-in.
pub fn post_auth_redirect(intended: Option<&str>) -> String {
    intended
        .filter(|path| !path.is_empty())
        .unwrap_or(DEFAULT_DESTINATION)
        .to_string()
}

/// Redirect for a signed-in user sitting on `current_path`, if any.
///
/// Onboarding is skipped entirely: anyone landing on an onboarding page is
/// sent on to `intended` (or the dashboard).
pub fn auth_redirect(current_path: &str, intended: Option<&str>) -> Option<String> {
    is_onboarding_route(current_path).then(|| post_auth_redirect(intended))
}

/// Reachable without a session.
///
/// `/` only matches itself; every other public route also covers its
/// sub-paths.
pub fn is_public_route(path: &str) -> bool {
    PUBLIC_ROUTES.iter().any(|route| {
        if *route == "/" {
            path == "/"
        } else {
            matches_prefix(path, route)
        }
    })
}

pub fn requires_onboarding(path: &str) -> bool {
    ONBOARDING_REQUIRED_ROUTES
        .iter()
        .any(|route| path.starts_with(route))
}

pub fn is_onboarding_route(path: &str) -> bool {
    path.starts_with(ONBOARDING_PREFIX)
}

fn matches_prefix(path: &str, route: &str) -> bool {
    match path.strip_prefix(route) {
        Some(rest) => rest.is_empty() || rest.starts_with(['/', '?', '#']),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_path_encodes_query_and_fragment() {
        assert_eq!(
            sign_in_path(Some("/poems?tab=new&page=2")),
            "/login?redirectTo=%2Fpoems%3Ftab%3Dnew%26page%3D2"
        );
        assert_eq!(sign_in_path(Some("")), "/login");
    }

    #[test]
    fn post_auth_redirect_defaults_to_dashboard() {
        assert_eq!(post_auth_redirect(None), "/dashboard");
        assert_eq!(post_auth_redirect(Some("")), "/dashboard");
        assert_eq!(post_auth_redirect(Some("/poems/3")), "/poems/3");
    }

    #[test]
    fn root_is_public_but_does_not_make_everything_public() {
        assert!(is_public_route("/"));
        assert!(!is_public_route("/dashboard"));
        assert!(!is_public_route("/poems/12"));
    }

    #[test]
    fn public_routes_cover_their_sub_paths() {
        assert!(is_public_route("/login"));
        assert!(is_public_route("/login?redirectTo=%2Fpoems"));
        assert!(is_public_route("/auth/callback?access_token=a"));
        assert!(is_public_route("/about/team"));
        assert!(!is_public_route("/aboutness"));
    }

    #[test]
    fn onboarding_tables() {
        assert!(requires_onboarding("/dashboard"));
        assert!(requires_onboarding("/collections/4"));
        assert!(!requires_onboarding("/about"));
        assert!(is_onboarding_route("/onboarding/interests"));
        assert!(!is_onboarding_route("/dashboard"));
    }

    #[test]
    fn onboarding_pages_redirect_onward() {
        assert_eq!(auth_redirect("/onboarding", None).as_deref(), Some("/dashboard"));
        assert_eq!(
            auth_redirect("/onboarding/step-2", Some("/poems")).as_deref(),
            Some("/poems")
        );
        assert_eq!(auth_redirect("/poems", None), None);
    }
}
