mod common;

use buildforge::models::{LoginCredentials, Role};
use buildforge::routes::{Location, Navigator, RouteName};
use buildforge::toast::ToastKind;
use buildforge::AppError;
use common::{signed_in, spawn_backend, CLIENT_EMAIL, PASSWORD};
use pretty_assertions::assert_eq;

#[test_log::test(actix_rt::test)]
async fn test_anonymous_navigation() {
    let server = spawn_backend();
    let (app, _) = server.app();

    assert_eq!(app.navigate("/projects/7").unwrap().name, RouteName::Login);
    assert_eq!(app.navigate("/").unwrap().name, RouteName::Home);
    // Public despite living under /projects.
    assert_eq!(
        app.navigate("/projects/accepted").unwrap().name,
        RouteName::AcceptedProjects
    );

    assert_eq!(
        app.navigate("/verify-otp").unwrap().name,
        RouteName::ForgotPassword
    );
    let otp = app.navigate("/verify-otp?email=site%40example.com").unwrap();
    assert_eq!(otp.name, RouteName::VerifyOtp);
    assert_eq!(otp.query_value("email"), Some("site@example.com"));

    let err = app.navigate("/nowhere").unwrap_err();
    assert!(matches!(err, AppError::Navigation(_)));
    // A failed resolution leaves the current view alone.
    assert_eq!(app.router().current(), Some(RouteName::VerifyOtp));
}

#[test_log::test(actix_rt::test)]
async fn test_signed_in_navigation_by_role() {
    let server = spawn_backend();
    let (app, _) = signed_in(&server).await;
    assert_eq!(app.session().user_role(), Some(Role::SiteEngineer));

    for path in ["/login", "/register", "/"] {
        assert_eq!(
            app.navigate(path).unwrap().name,
            RouteName::Dashboard,
            "{} should bounce to the dashboard",
            path
        );
    }

    let task = app.navigate("/projects/3/tasks/create").unwrap();
    assert_eq!(task.name, RouteName::CreateTask);
    assert_eq!(task.params.get("projectId").map(String::as_str), Some("3"));

    // Site engineers may not create projects: dashboard, not login.
    assert_eq!(
        app.navigate("/projects/create").unwrap().name,
        RouteName::Dashboard
    );

    let details = app
        .navigate_to(
            Location::named(RouteName::TaskDetails)
                .with_param("projectId", "3")
                .with_param("id", "t-9"),
        )
        .unwrap();
    assert_eq!(details.path(), "/projects/3/tasks/t-9");
}

#[test_log::test(actix_rt::test)]
async fn test_client_role_table() {
    let server = spawn_backend();
    let (app, _) = server.app();
    app.session()
        .login(&LoginCredentials {
            email: CLIENT_EMAIL.into(),
            password: PASSWORD.into(),
            remember_me: None,
        })
        .await;
    assert_eq!(
        app.process_navigation().unwrap().map(|l| l.name),
        Some(RouteName::Dashboard)
    );

    assert_eq!(
        app.navigate("/projects/create").unwrap().name,
        RouteName::CreateProject
    );
    assert_eq!(
        app.navigate("/projects/1/materials/create").unwrap().name,
        RouteName::Dashboard
    );
    assert_eq!(
        app.navigate("/projects/1/documents").unwrap().name,
        RouteName::Documents
    );
}

#[test_log::test(actix_rt::test)]
async fn test_restored_session_guards_navigation() {
    let server = spawn_backend();
    let (first, storage) = signed_in(&server).await;
    first.shutdown();

    let app = server.app_with(storage);
    assert!(app.restore_session().await);
    assert_eq!(app.navigate("/profile").unwrap().name, RouteName::Profile);

    app.session().logout();
    assert_eq!(app.process_navigation().unwrap().map(|l| l.name), Some(RouteName::Home));
    assert_eq!(app.navigate("/profile").unwrap().name, RouteName::Login);

    let names: Vec<RouteName> = app.router().history().iter().map(|l| l.name).collect();
    assert_eq!(
        names,
        vec![RouteName::Profile, RouteName::Home, RouteName::Login]
    );
}

#[test_log::test(actix_rt::test)]
async fn test_shutdown_keeps_shown_toasts() {
    let server = spawn_backend();
    let (app, _) = server.app();

    app.toasts().error("Login failed", None);
    app.toasts().info("Sticky", Some(std::time::Duration::ZERO));
    let kinds: Vec<ToastKind> = app.toasts().toasts().iter().map(|t| t.kind).collect();
    assert_eq!(kinds, vec![ToastKind::Error, ToastKind::Info]);

    let toasts = app.toasts().clone();
    app.shutdown();
    assert_eq!(toasts.toasts().len(), 2);
    toasts.clear_all();
    assert!(toasts.toasts().is_empty());
}
