use crate::types::Session;

/// Application routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Notes,
    Users,
}

/// Per-route requirement flags. Static and immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutePolicy {
    pub requires_auth: bool,
    pub requires_admin: bool,
}

impl Route {
    /// Where an authenticated user lands by default.
    pub const DEFAULT: Route = Route::Notes;

    pub fn policy(self) -> RoutePolicy {
        match self {
            Route::Login => RoutePolicy {
                requires_auth: false,
                requires_admin: false,
            },
            Route::Notes => RoutePolicy {
                requires_auth: true,
                requires_admin: false,
            },
            Route::Users => RoutePolicy {
                requires_auth: true,
                requires_admin: true,
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Route::Login => "login",
            Route::Notes => "notes",
            Route::Users => "users",
        }
    }
}

/// Outcome of evaluating a single transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    Allow,
    Redirect(Route),
}

/// Decides one transition. Synchronous and free of I/O so it can run before
/// any screen-level fetch begins.
pub fn evaluate(target: Route, session: &Session) -> NavigationDecision {
    let policy = target.policy();
    if policy.requires_auth && !session.is_authenticated() {
        NavigationDecision::Redirect(Route::Login)
    } else if policy.requires_admin && !session.is_admin() {
        NavigationDecision::Redirect(Route::DEFAULT)
    } else if target == Route::Login && session.is_authenticated() {
        NavigationDecision::Redirect(Route::DEFAULT)
    } else {
        NavigationDecision::Allow
    }
}

/// Follows redirects until a transition is allowed.
pub fn resolve(mut target: Route, session: &Session) -> Route {
    loop {
        match evaluate(target, session) {
            NavigationDecision::Allow => return target,
            NavigationDecision::Redirect(next) => target = next,
        }
    }
}
