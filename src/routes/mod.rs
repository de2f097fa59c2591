//! Client-side route table.
//!
//! Maps paths to named views with the metadata the navigation guard consults:
//! whether a view requires authentication, which roles may open it, and its layout.

pub mod guard;
pub mod router;

use crate::{error::AppError, models::Role};
use lazy_static::lazy_static;
use reqwest::Url;
use std::collections::BTreeMap;
use std::fmt;

pub use guard::{evaluate, GuardDecision};
pub use router::{Navigator, Router};

/// Query parameter carrying the email through the password-reset views.
pub const EMAIL_QUERY_KEY: &str = "email";

/// Every view the application knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteName {
    Home,
    Login,
    Register,
    ForgotPassword,
    ResetPassword,
    VerifyOtp,
    Dashboard,
    Projects,
    CreateProject,
    ProjectDetails,
    AcceptedProjects,
    Tasks,
    CreateTask,
    TaskDetails,
    Vendors,
    Users,
    Profile,
    Materials,
    MaterialDetail,
    CreateMaterial,
    Documents,
}

impl RouteName {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteName::Home => "Home",
            RouteName::Login => "Login",
            RouteName::Register => "Register",
            RouteName::ForgotPassword => "ForgotPassword",
            RouteName::ResetPassword => "ResetPassword",
            RouteName::VerifyOtp => "VerifyOtp",
            RouteName::Dashboard => "Dashboard",
            RouteName::Projects => "Projects",
            RouteName::CreateProject => "CreateProject",
            RouteName::ProjectDetails => "ProjectDetails",
            RouteName::AcceptedProjects => "AcceptedProjects",
            RouteName::Tasks => "Tasks",
            RouteName::CreateTask => "CreateTask",
            RouteName::TaskDetails => "TaskDetails",
            RouteName::Vendors => "Vendors",
            RouteName::Users => "Users",
            RouteName::Profile => "Profile",
            RouteName::Materials => "Materials",
            RouteName::MaterialDetail => "MaterialDetail",
            RouteName::CreateMaterial => "CreateMaterial",
            RouteName::Documents => "Documents",
        }
    }
}

impl fmt::Display for RouteName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// The bare layout used by the login/register/password-reset views.
    Auth,
}

/// Static per-route metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteMeta {
    pub requires_auth: bool,
    /// Roles allowed to open the view; `None` means any authenticated or anonymous user
    /// that passes `requires_auth`.
    pub roles: Option<&'static [Role]>,
    pub layout: Option<Layout>,
}

impl RouteMeta {
    const fn public() -> Self {
        Self {
            requires_auth: false,
            roles: None,
            layout: None,
        }
    }

    const fn auth_layout() -> Self {
        Self {
            requires_auth: false,
            roles: None,
            layout: Some(Layout::Auth),
        }
    }

    const fn protected() -> Self {
        Self {
            requires_auth: true,
            roles: None,
            layout: None,
        }
    }

    const fn restricted(roles: &'static [Role]) -> Self {
        Self {
            requires_auth: true,
            roles: Some(roles),
            layout: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment {
    Static(&'static str),
    Param(&'static str),
}

/// One entry of the route table.
#[derive(Debug)]
pub struct RouteRecord {
    pub name: RouteName,
    /// Path template, with `:param` placeholders.
    pub path: &'static str,
    pub meta: RouteMeta,
    segments: Vec<Segment>,
}

impl RouteRecord {
    fn new(name: RouteName, path: &'static str, meta: RouteMeta) -> Self {
        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s.strip_prefix(':') {
                Some(param) => Segment::Param(param),
                None => Segment::Static(s),
            })
            .collect();
        Self {
            name,
            path,
            meta,
            segments,
        }
    }

    /// Matches `parts` against the template, returning the captured params and the
    /// number of static segments (used to rank competing matches).
    fn capture(&self, parts: &[&str]) -> Option<(BTreeMap<String, String>, usize)> {
        if parts.len() != self.segments.len() {
            return None;
        }
        let mut params = BTreeMap::new();
        let mut statics = 0;
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Static(s) if s == part => statics += 1,
                Segment::Static(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.to_string(), part.to_string());
                }
            }
        }
        Some((params, statics))
    }
}

const CREATE_PROJECT_ROLES: &[Role] = &[Role::Admin, Role::Client];
const SITE_CREW_ROLES: &[Role] = &[Role::SiteEngineer, Role::Contractor];
const DOCUMENT_ROLES: &[Role] = &[
    Role::Admin,
    Role::SiteEngineer,
    Role::Contractor,
    Role::Client,
];

lazy_static! {
    static ref ROUTES: Vec<RouteRecord> = vec![
        RouteRecord::new(RouteName::Home, "/", RouteMeta::public()),
        RouteRecord::new(RouteName::Login, "/login", RouteMeta::auth_layout()),
        RouteRecord::new(RouteName::Register, "/register", RouteMeta::auth_layout()),
        RouteRecord::new(RouteName::ForgotPassword, "/forgot-password", RouteMeta::auth_layout()),
        RouteRecord::new(RouteName::ResetPassword, "/reset-password", RouteMeta::auth_layout()),
        RouteRecord::new(RouteName::VerifyOtp, "/verify-otp", RouteMeta::auth_layout()),
        RouteRecord::new(RouteName::Dashboard, "/dashboard", RouteMeta::protected()),
        RouteRecord::new(RouteName::Projects, "/projects", RouteMeta::protected()),
        RouteRecord::new(
            RouteName::CreateProject,
            "/projects/create",
            RouteMeta::restricted(CREATE_PROJECT_ROLES),
        ),
        RouteRecord::new(RouteName::ProjectDetails, "/projects/:id", RouteMeta::protected()),
        // No auth requirement.
        RouteRecord::new(RouteName::AcceptedProjects, "/projects/accepted", RouteMeta::public()),
        RouteRecord::new(RouteName::Tasks, "/projects/:projectId/tasks", RouteMeta::protected()),
        RouteRecord::new(
            RouteName::CreateTask,
            "/projects/:projectId/tasks/create",
            RouteMeta::restricted(SITE_CREW_ROLES),
        ),
        RouteRecord::new(
            RouteName::TaskDetails,
            "/projects/:projectId/tasks/:id",
            RouteMeta::protected(),
        ),
        RouteRecord::new(RouteName::Vendors, "/vendors", RouteMeta::protected()),
        RouteRecord::new(RouteName::Users, "/users", RouteMeta::protected()),
        RouteRecord::new(RouteName::Profile, "/profile", RouteMeta::protected()),
        RouteRecord::new(
            RouteName::Materials,
            "/projects/:projectId/materials",
            RouteMeta::protected(),
        ),
        RouteRecord::new(
            RouteName::MaterialDetail,
            "/projects/:projectId/materials/:id",
            RouteMeta::protected(),
        ),
        RouteRecord::new(
            RouteName::CreateMaterial,
            "/projects/:projectId/materials/create",
            RouteMeta::restricted(SITE_CREW_ROLES),
        ),
        RouteRecord::new(
            RouteName::Documents,
            "/projects/:projectId/documents",
            RouteMeta::restricted(DOCUMENT_ROLES),
        ),
    ];

    static ref ORIGIN: Url = Url::parse("http://localhost/").unwrap();
}

/// The full route table, in declaration order.
pub fn routes() -> &'static [RouteRecord] {
    &ROUTES
}

pub fn record(name: RouteName) -> Option<&'static RouteRecord> {
    ROUTES.iter().find(|r| r.name == name)
}

/// Metadata of a named route; unknown names get the permissive default.
pub fn meta(name: RouteName) -> RouteMeta {
    record(name).map(|r| r.meta).unwrap_or_default()
}

/// Finds the route matching `path`. When several templates match, the one with the
/// most static segments wins, so `/projects/create` is not read as `/projects/:id`.
pub fn match_path(path: &str) -> Option<(&'static RouteRecord, BTreeMap<String, String>)> {
    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let mut best: Option<(&'static RouteRecord, BTreeMap<String, String>, usize)> = None;
    for route in ROUTES.iter() {
        if let Some((params, statics)) = route.capture(&parts) {
            if best.as_ref().map_or(true, |(_, _, s)| statics > *s) {
                best = Some((route, params, statics));
            }
        }
    }
    best.map(|(route, params, _)| (route, params))
}

/// A navigation target: a route name with its path params and query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub name: RouteName,
    pub params: BTreeMap<String, String>,
    pub query: BTreeMap<String, String>,
}

impl Location {
    pub fn named(name: RouteName) -> Self {
        Self {
            name,
            params: BTreeMap::new(),
            query: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Resolves an href such as `/verify-otp?email=a%40b.com` against the route table.
    ///
    /// Only same-origin hrefs resolve; `//host/...` and absolute URLs elsewhere are
    /// rejected. Path params come back percent-decoded.
    pub fn parse(href: &str) -> Result<Self, AppError> {
        let url = ORIGIN
            .join(href)
            .map_err(|e| AppError::Navigation(format!("invalid path {:?}: {}", href, e)))?;
        if url.origin() != ORIGIN.origin() {
            return Err(AppError::Navigation(format!(
                "{:?} points outside the application",
                href
            )));
        }

        let (route, params) = match_path(url.path())
            .ok_or_else(|| AppError::Navigation(format!("no route matches {}", url.path())))?;

        Ok(Self {
            name: route.name,
            params: params
                .into_iter()
                .map(|(key, raw)| (key, decode_segment(&raw)))
                .collect(),
            query: url.query_pairs().into_owned().collect(),
        })
    }

    /// The concrete path, with params substituted into the route's template.
    pub fn path(&self) -> String {
        let template = record(self.name).map(|r| r.path).unwrap_or("/");
        let segments: Vec<&str> = template
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s.strip_prefix(':') {
                Some(param) => self.params.get(param).map(String::as_str).unwrap_or(s),
                None => s,
            })
            .collect();
        format!("/{}", segments.join("/"))
    }

    /// Percent-encoded path plus URL-encoded query string.
    pub fn href(&self) -> String {
        let mut url = ORIGIN.clone();
        url.set_path(&self.path());
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }
        match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        }
    }
}

/// Percent-decodes one path segment. `+` stays literal, unlike in a query string.
fn decode_segment(raw: &str) -> String {
    let escaped = raw
        .replace('+', "%2B")
        .replace('&', "%26")
        .replace('=', "%3D");
    let mut url = ORIGIN.clone();
    url.set_query(Some(&format!("v={}", escaped)));
    url.query_pairs()
        .next()
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.href())
    }
}
