// tests/http_routes.rs

use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use painel::{
    config::{AppState, Settings},
    routes::build_router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

async fn app(api_url: &str) -> Router {
    let settings = Settings {
        api_url: api_url.to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        session_secret: "segredo-de-teste".to_string(),
        session_ttl: chrono::Duration::hours(1),
        query_stale: Duration::from_secs(30),
        http_timeout: Duration::from_secs(5),
        session_store_path: None,
    };
    build_router(AppState::new(settings).await.unwrap())
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "accessToken": "a1", "refreshToken": "r1" })),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u1",
            "name": "Ana Souza",
            "email": "ana@empresa.com.br",
            "role": "ADMIN",
            "organizationId": "o1"
        })))
        .mount(server)
        .await;
}

/// Faz login e devolve o par `nome=valor` do cookie de sessão.
async fn login(app: &Router) -> String {
    let request = Request::post("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "email": "ana@empresa.com.br", "password": "segredo123" }).to_string(),
        ))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("painel_session="));
    assert!(cookie.contains("HttpOnly"));

    cookie.split(';').next().unwrap().to_string()
}

fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::get(uri).header(header::COOKIE, cookie).body(Body::empty()).unwrap()
}

fn request_with_cookie(method: &str, uri: &str, cookie: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri).header(header::COOKIE, cookie);
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Espera os refetches disparados em segundo plano pela invalidação.
async fn wait_for_calls(server: &MockServer, verb: &str, route: &str, expected: usize) -> usize {
    let mut seen = 0;
    for _ in 0..50 {
        let requests = server.received_requests().await.unwrap_or_default();
        seen = requests
            .iter()
            .filter(|r| r.method.as_str() == verb && r.url.path() == route)
            .count();
        if seen >= expected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    seen
}

async fn mount_tree(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/sectors/tree"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn health_responde_ok() {
    let server = MockServer::start().await;
    let app = app(&server.uri()).await;

    let response = app
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn rota_protegida_sem_cookie_vai_para_o_login() {
    let server = MockServer::start().await;
    let app = app(&server.uri()).await;

    let response = app
        .oneshot(Request::get("/api/sectors/tree").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/auth/login");
}

#[tokio::test]
async fn cookie_forjado_vai_para_o_login() {
    let server = MockServer::start().await;
    let app = app(&server.uri()).await;

    let response = app
        .oneshot(get_with_cookie("/api/auth/me", "painel_session=nao-e-um-jwt"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn login_abre_a_sessao_e_logout_encerra() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    let app = app(&server.uri()).await;

    let cookie = login(&app).await;

    let response = app.clone().oneshot(get_with_cookie("/api/auth/me", &cookie)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["name"], "Ana Souza");

    let logout = Request::post("/api/auth/logout")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(logout).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.oneshot(get_with_cookie("/api/auth/me", &cookie)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn arvore_vazia_mostra_o_estado_vazio() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/sectors/tree"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    let app = app(&server.uri()).await;
    let cookie = login(&app).await;

    let response = app.oneshot(get_with_cookie("/api/sectors/tree", &cookie)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "empty");
    assert_eq!(body["title"], "Nenhum setor criado");
}

#[tokio::test]
async fn desativar_sem_confirmacao_nao_chama_a_api() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/sectors/s1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let app = app(&server.uri()).await;
    let cookie = login(&app).await;

    let request = Request::delete("/api/sectors/s1")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PRECONDITION_REQUIRED);
}

#[tokio::test]
async fn login_recusado_nao_define_cookie() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Credenciais inválidas" })),
        )
        .mount(&server)
        .await;
    let app = app(&server.uri()).await;

    let request = Request::post("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "email": "ana@empresa.com.br", "password": "errada123" }).to_string(),
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(json_body(response).await["error"], "Credenciais inválidas");
}

#[tokio::test]
async fn falha_passageira_no_auth_me_mantem_a_sessao() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "accessToken": "a1", "refreshToken": "r1" })),
        )
        .mount(&server)
        .await;
    let user = json!({
        "id": "u1",
        "name": "Ana Souza",
        "email": "ana@empresa.com.br",
        "role": "ADMIN",
        "organizationId": "o1"
    });
    // Só o login enxerga o /auth/me saudável
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user.clone()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user))
        .mount(&server)
        .await;
    mount_tree(&server).await;
    let app = app(&server.uri()).await;
    let cookie = login(&app).await;

    let profile = json!({ "name": "Ana Souza Lima", "email": "ana@empresa.com.br" });
    let response = app
        .clone()
        .oneshot(request_with_cookie("PATCH", "/api/settings/profile", &cookie, Some(profile)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = app.oneshot(get_with_cookie("/api/sectors/tree", &cookie)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn refresh_recusado_derruba_o_cookie() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/sectors/tree"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    let app = app(&server.uri()).await;
    let cookie = login(&app).await;

    let response = app.clone().oneshot(get_with_cookie("/api/sectors/tree", &cookie)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    // A sessão já saiu do store: o mesmo cookie não chega mais à API
    let response = app.oneshot(get_with_cookie("/api/sectors/tree", &cookie)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(wait_for_calls(&server, "GET", "/sectors/tree", 1).await, 1);
}

#[tokio::test]
async fn criar_e_revogar_token_recarregam_a_lista() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api-tokens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "t1",
            "name": "Integração ERP",
            "lastUsedAt": null,
            "expiresAt": null,
            "isActive": true,
            "createdAt": "2026-01-10T12:00:00Z"
        }])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api-tokens"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "id": "t2", "token": "sig_abc123" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api-tokens/t1/revoke"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let app = app(&server.uri()).await;
    let cookie = login(&app).await;

    let response = app.clone().oneshot(get_with_cookie("/api/api-tokens", &cookie)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await[0]["name"], "Integração ERP");

    let response = app
        .clone()
        .oneshot(request_with_cookie("POST", "/api/api-tokens", &cookie, Some(json!({ "name": "CI" }))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(json_body(response).await["token"], "sig_abc123");
    assert_eq!(wait_for_calls(&server, "GET", "/api-tokens", 2).await, 2);

    let response = app
        .oneshot(request_with_cookie("POST", "/api/api-tokens/t1/revoke", &cookie, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(wait_for_calls(&server, "GET", "/api-tokens", 3).await, 3);
}

#[tokio::test]
async fn excluir_token_exige_confirmacao() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/api-tokens/t1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let app = app(&server.uri()).await;
    let cookie = login(&app).await;

    let response = app
        .clone()
        .oneshot(request_with_cookie("DELETE", "/api/api-tokens/t1", &cookie, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PRECONDITION_REQUIRED);
    assert_eq!(wait_for_calls(&server, "DELETE", "/api-tokens/t1", 0).await, 0);

    let response = app
        .oneshot(request_with_cookie("DELETE", "/api/api-tokens/t1?confirm=true", &cookie, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn token_sem_nome_nao_chega_a_api() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/api-tokens"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;
    let app = app(&server.uri()).await;
    let cookie = login(&app).await;

    let response = app
        .oneshot(request_with_cookie("POST", "/api/api-tokens", &cookie, Some(json!({ "name": "   " }))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["details"]["name"][0], "Nome é obrigatório");
}

#[tokio::test]
async fn remover_membro_exige_confirmacao_e_recarrega_os_setores() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_tree(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/organizations/me/members/m1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let app = app(&server.uri()).await;
    let cookie = login(&app).await;

    let response = app.clone().oneshot(get_with_cookie("/api/sectors/tree", &cookie)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request_with_cookie("DELETE", "/api/organization/members/m1", &cookie, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PRECONDITION_REQUIRED);

    let response = app
        .oneshot(request_with_cookie(
            "DELETE",
            "/api/organization/members/m1?confirm=true",
            &cookie,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    // O membro some das listas de setor: a árvore é buscada de novo
    assert_eq!(wait_for_calls(&server, "GET", "/sectors/tree", 2).await, 2);
}

#[tokio::test]
async fn membro_com_senha_curta_nao_chega_a_api() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/organizations/me/members"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;
    let app = app(&server.uri()).await;
    let cookie = login(&app).await;

    let member = json!({
        "name": "Bruno Lima",
        "email": "bruno@empresa.com.br",
        "password": "curta",
        "role": "MEMBER"
    });
    let response = app
        .oneshot(request_with_cookie("POST", "/api/organization/members", &cookie, Some(member)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await["details"]["password"][0],
        "Senha deve ter no mínimo 8 caracteres"
    );
}

#[tokio::test]
async fn excluir_modelo_exige_confirmacao() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/document-templates/tp1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let app = app(&server.uri()).await;
    let cookie = login(&app).await;

    let response = app
        .clone()
        .oneshot(request_with_cookie("DELETE", "/api/templates/tp1", &cookie, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PRECONDITION_REQUIRED);

    let response = app
        .oneshot(request_with_cookie("DELETE", "/api/templates/tp1?confirm=true", &cookie, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn cancelar_envelope_sem_confirmacao_nao_chama_a_api() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/envelopes/e1/cancel"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let app = app(&server.uri()).await;
    let cookie = login(&app).await;

    let response = app
        .oneshot(request_with_cookie("POST", "/api/envelopes/e1/cancel", &cookie, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PRECONDITION_REQUIRED);
}

#[tokio::test]
async fn envelope_com_signatario_invalido_aponta_o_campo() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/envelopes"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;
    let app = app(&server.uri()).await;
    let cookie = login(&app).await;

    let envelope = json!({
        "name": "Contrato de prestação",
        "signers": [
            { "name": "Ana Souza", "email": "ana@empresa.com.br" },
            { "name": "Bruno Lima", "email": "bruno-sem-arroba" }
        ]
    });
    let response = app
        .oneshot(request_with_cookie("POST", "/api/envelopes", &cookie, Some(envelope)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["details"]["signers[1].email"][0], "Email inválido");
}
