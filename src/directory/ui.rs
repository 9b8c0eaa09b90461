//! Sign-in, registration and account settings screens.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use log::error;

use crate::core::shared::models::Department;
use crate::core::shared::state::AppState;
use crate::core::urls::PageUrls;
use crate::directory::accounts::{self, AccountError, SignedIn};
use crate::directory::forms::{LoginForm, RegisterForm, SettingsForm};
use crate::security::auth_api::{
    clear_session_cookie, session_cookie, token_from_headers, AuthenticatedUser, SessionState,
};
use crate::web::{html_escape, redirect_with_error, redirect_with_notice, render_page, Flash};

fn department_select(departments: &[Department], selected: Option<uuid::Uuid>, placeholder: &str) -> String {
    let mut options = format!(
        "<option value=\"\"{}>{}</option>",
        if selected.is_none() { " selected" } else { "" },
        html_escape(placeholder)
    );
    for department in departments {
        options.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>",
            department.id,
            if selected == Some(department.id) { " selected" } else { "" },
            html_escape(&department.name)
        ));
    }
    format!("<select name=\"department_id\">{}</select>", options)
}

fn account_failure(context: &str, err: &AccountError) -> String {
    if let AccountError::Store(store) = err {
        if store.is_server_error() {
            error!("{context}: {store}");
        }
    }
    err.public_message()
}

/// Sets the session cookie and sends the user to their home screen.
fn enter(state: &AppState, signed_in: &SignedIn) -> Response {
    (
        [(
            header::SET_COOKIE,
            session_cookie(&state.auth_config, &signed_in.session.token),
        )],
        Redirect::to(signed_in.user.role.home_path()),
    )
        .into_response()
}

pub async fn login_page(session: SessionState, Query(flash): Query<Flash>) -> Response {
    if let Some(user) = session.user() {
        return Redirect::to(user.role.home_path()).into_response();
    }
    let body = format!(
        "<section class=\"card auth-card\">\
            <h1>Sign in</h1>\
            <form class=\"stacked\" method=\"post\" action=\"{login}\">\
                <label>Email<input type=\"email\" name=\"email\" autocomplete=\"email\" required></label>\
                <label>Password<input type=\"password\" name=\"password\" autocomplete=\"current-password\" required></label>\
                <button type=\"submit\" class=\"btn btn-primary\">Sign in</button>\
            </form>\
            <p class=\"muted\">No account yet? <a href=\"{register}\">Register</a></p>\
        </section>",
        login = PageUrls::LOGIN,
        register = PageUrls::REGISTER,
    );
    render_page("Sign in", None, &flash, &body).into_response()
}

pub async fn submit_login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    match accounts::login(&state, &form).await {
        Ok(signed_in) => enter(&state, &signed_in),
        Err(e) => redirect_with_error(PageUrls::LOGIN, &account_failure("Login failed", &e)),
    }
}

pub async fn register_page(
    State(state): State<AppState>,
    session: SessionState,
    Query(flash): Query<Flash>,
) -> Response {
    if let Some(user) = session.user() {
        return Redirect::to(user.role.home_path()).into_response();
    }
    let (departments, flash) = match state.directory.list_departments().await {
        Ok(departments) => (departments, flash),
        Err(e) => {
            error!("Failed to load departments: {e}");
            (Vec::new(), Flash::error(e.public_message()))
        }
    };
    let body = format!(
        "<section class=\"card auth-card\">\
            <h1>Create an account</h1>\
            <form class=\"stacked\" method=\"post\" action=\"{register}\">\
                <label>Full name<input type=\"text\" name=\"name\" autocomplete=\"name\" required></label>\
                <label>Email<input type=\"email\" name=\"email\" autocomplete=\"email\" required></label>\
                <label>Department{departments}</label>\
                <label>Password<input type=\"password\" name=\"password\" minlength=\"6\" autocomplete=\"new-password\" required></label>\
                <label>Confirm password<input type=\"password\" name=\"confirm_password\" minlength=\"6\" autocomplete=\"new-password\" required></label>\
                <button type=\"submit\" class=\"btn btn-primary\">Register</button>\
            </form>\
            <p class=\"muted\">Already registered? <a href=\"{login}\">Sign in</a></p>\
        </section>",
        register = PageUrls::REGISTER,
        departments = department_select(&departments, None, "Select your department"),
        login = PageUrls::LOGIN,
    );
    render_page("Register", None, &flash, &body).into_response()
}

pub async fn submit_register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Response {
    match accounts::register(&state, &form).await {
        Ok(signed_in) => enter(&state, &signed_in),
        Err(e) => redirect_with_error(PageUrls::REGISTER, &account_failure("Registration failed", &e)),
    }
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let token = token_from_headers(&headers, &state.auth_config);
    accounts::logout(&state, token.as_deref()).await;
    (
        [(header::SET_COOKIE, clear_session_cookie(&state.auth_config))],
        Redirect::to(PageUrls::LOGIN),
    )
        .into_response()
}

pub async fn settings_page(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(flash): Query<Flash>,
) -> Response {
    let departments = match state.directory.list_departments().await {
        Ok(departments) => departments,
        Err(e) => {
            error!("Failed to load departments: {e}");
            Vec::new()
        }
    };
    let body = format!(
        "<div class=\"page-header\"><h1>Settings</h1></div>\
        <section class=\"card\">\
            <form class=\"stacked\" method=\"post\" action=\"{action}\">\
                <label>Display name<input type=\"text\" name=\"name\" value=\"{name}\" required></label>\
                <label>Email<input type=\"email\" value=\"{email}\" disabled></label>\
                <label>Department{departments}</label>\
                <p class=\"muted\">Role: {role}</p>\
                <button type=\"submit\" class=\"btn btn-primary\">Save changes</button>\
            </form>\
        </section>",
        action = PageUrls::SETTINGS,
        name = html_escape(&user.name),
        email = html_escape(&user.email),
        departments = department_select(&departments, user.department_id, "No department"),
        role = user.role,
    );
    render_page("Settings", Some(&user), &flash, &body).into_response()
}

pub async fn submit_settings(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Form(form): Form<SettingsForm>,
) -> Response {
    let result = match form.validate() {
        Ok((name, department_id)) => state
            .directory
            .update_profile(user.user_id, &name, department_id)
            .await
            .map_err(AccountError::from),
        Err(e) => Err(AccountError::from(e)),
    };
    match result {
        Ok(_) => redirect_with_notice(PageUrls::SETTINGS, "Profile updated"),
        Err(e) => redirect_with_error(PageUrls::SETTINGS, &account_failure("Failed to update profile", &e)),
    }
}
