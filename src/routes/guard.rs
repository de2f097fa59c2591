use super::{Layout, Location, RouteMeta, RouteName, EMAIL_QUERY_KEY};
use crate::auth::Session;

/// Outcome of the pre-navigation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Redirect(Location),
}

/// Decides whether navigation to `to` may proceed given the current session.
///
/// Rules, first match wins:
/// 1. protected view while signed out: go to `Login`;
/// 2. auth-layout view or `Home` while signed in: go to `Dashboard`;
/// 3. `VerifyOtp`/`ResetPassword` without an `email` query: go to `ForgotPassword`;
/// 4. role-restricted view and the user's role is not listed: go to `Dashboard`;
/// 5. otherwise proceed.
pub fn evaluate(to: &Location, meta: &RouteMeta, session: &Session) -> GuardDecision {
    let authenticated = session.is_authenticated();

    if meta.requires_auth && !authenticated {
        return GuardDecision::Redirect(Location::named(RouteName::Login));
    }

    if !meta.requires_auth
        && authenticated
        && (meta.layout == Some(Layout::Auth) || to.name == RouteName::Home)
    {
        return GuardDecision::Redirect(Location::named(RouteName::Dashboard));
    }

    if matches!(to.name, RouteName::VerifyOtp | RouteName::ResetPassword)
        && to
            .query_value(EMAIL_QUERY_KEY)
            .map_or(true, |email| email.trim().is_empty())
    {
        return GuardDecision::Redirect(Location::named(RouteName::ForgotPassword));
    }

    if let Some(roles) = meta.roles {
        if authenticated {
            let allowed = session
                .user_role()
                .map_or(false, |role| roles.contains(&role));
            if !allowed {
                return GuardDecision::Redirect(Location::named(RouteName::Dashboard));
            }
        }
    }

    GuardDecision::Proceed
}
