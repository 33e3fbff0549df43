use askama::Template;
use axum::{
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use cookie::Cookie;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate;

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate;

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    message: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    email: String,
    password: String,
}

#[derive(Deserialize)]
pub struct RegisterForm {
    name: String,
    email: String,
    password: String,
}

#[derive(Deserialize, Serialize)]
struct AuthResponse {
    access_token: String,
    refresh_token: String,
}

#[derive(Deserialize)]
struct AuthServiceResponse {
    #[serde(rename = "success")]
    _success: bool,
    data: AuthResponse,
}

fn auth_service_base_url() -> String {
    std::env::var("AUTH_SERVICE_URL").unwrap_or_else(|_| "http://auth.localhost:8080".to_string())
}

pub async fn login_page() -> Html<String> {
    let template = LoginTemplate;
    Html(template.render().unwrap())
}

pub async fn register_page() -> Html<String> {
    let template = RegisterTemplate;
    Html(template.render().unwrap())
}

pub async fn login_handler(Form(form): Form<LoginForm>) -> Result<Response, Html<String>> {
    let payload = json!({
        "email": form.email,
        "password": form.password,
    });
    submit_auth_request("/api/v1/auth/login", payload).await
}

pub async fn register_handler(Form(form): Form<RegisterForm>) -> Result<Response, Html<String>> {
    let payload = json!({
        "full_name": form.name,
        "email": form.email,
        "password": form.password,
    });
    submit_auth_request("/api/v1/auth/register", payload).await
}

async fn submit_auth_request(
    path: &str,
    payload: serde_json::Value,
) -> Result<Response, Html<String>> {
    let url = format!("{}{}", auth_service_base_url().trim_end_matches('/'), path);

    let client = reqwest::Client::new();
    let response = client.post(&url).json(&payload).send().await;

    match response {
        Ok(resp) => {
            let status = resp.status();
            if status.is_success() {
                let body_text = resp.text().await.unwrap_or_default();
                let auth_resp: AuthResponse =
                    match serde_json::from_str::<AuthServiceResponse>(&body_text) {
                        Ok(wrapper) => wrapper.data,
                        Err(e) => {
                            error!("Failed to parse auth response: {}", e);
                            let template = ErrorTemplate {
                                message: format!("Parse error: {}", e),
                            };
                            return Err(Html(template.render().unwrap()));
                        }
                    };

                let mut response = Redirect::to("/rides").into_response();
                response.headers_mut().append(
                    header::SET_COOKIE,
                    session_cookie("access_token", &auth_resp.access_token)
                        .to_string()
                        .parse()
                        .unwrap(),
                );
                response.headers_mut().append(
                    header::SET_COOKIE,
                    session_cookie("refresh_token", &auth_resp.refresh_token)
                        .to_string()
                        .parse()
                        .unwrap(),
                );
                Ok(response)
            } else {
                error!("Auth service error: {}", status);
                let template = ErrorTemplate {
                    message: format!("Sign-in failed: {}", status),
                };
                Err(Html(template.render().unwrap()))
            }
        }
        Err(e) => {
            error!("Request to auth service failed: {}", e);
            let template = ErrorTemplate {
                message: format!("Connection error: {}", e),
            };
            Err(Html(template.render().unwrap()))
        }
    }
}

fn session_cookie(name: &str, value: &str) -> Cookie<'static> {
    let mut cookie = Cookie::new(name.to_string(), value.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(cookie::SameSite::Lax);
    cookie
}

pub async fn logout_handler() -> Response {
    // Clear cookies
    let access_cookie = session_cookie("access_token", "");
    let refresh_cookie = session_cookie("refresh_token", "");

    let mut response = Redirect::to("/").into_response();
    response.headers_mut().append(
        header::SET_COOKIE,
        access_cookie.to_string().parse().unwrap(),
    );
    response.headers_mut().append(
        header::SET_COOKIE,
        refresh_cookie.to_string().parse().unwrap(),
    );

    response
}
