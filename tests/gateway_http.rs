//! HTTP gateway against a mocked ticket backend.

use ticketdesk::config::ApiConfig;
use ticketdesk::gateway::{HttpGateway, TicketGateway};
use ticketdesk::models::{
    Credentials, NewTicket, Priority, Role, Status, TicketUpdate, UserScope,
};
use ticketdesk::views::{filter_tickets, Assignment, TicketCriteria};
use wiremock::{
    matchers::{body_json, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn gateway(server: &MockServer) -> HttpGateway {
    HttpGateway::new(&ApiConfig {
        base_url: format!("{}/api/", server.uri()),
        timeout_secs: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn test_verify_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/verify"))
        .and(body_json(serde_json::json!({
            "email": "tech@example.com",
            "mot_de_passe": "secret"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 2,
            "nom": "Theo",
            "email": "tech@example.com",
            "role": "Technicien"
        })))
        .mount(&server)
        .await;

    let user = gateway(&server)
        .verify_credentials(&Credentials {
            email: "tech@example.com".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(user.id, 2);
    assert_eq!(user.name, "Theo");
    assert_eq!(user.role, Role::Technician);
}

#[tokio::test]
async fn test_rejected_credentials_are_401() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/verify"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({ "message": "Identifiants invalides" })),
        )
        .mount(&server)
        .await;

    let failure = gateway(&server)
        .verify_credentials(&Credentials {
            email: "tech@example.com".to_string(),
            password: "nope".to_string(),
        })
        .await
        .unwrap_err();
    assert!(failure.is_unauthorized());
    assert_eq!(failure.message, "Identifiants invalides");
}

#[tokio::test]
async fn test_list_tickets_decodes_backend_keys() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tickets"))
        .and(query_param("status", "Ouvert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "id": 1,
                "titre": "Printer jammed",
                "statut": "Ouvert",
                "priorité": "Élevée",
                "id_employe": 1,
                "id_technicien": null
            },
            {
                "id": 2,
                "titre": "VPN drops",
                "statut": "Ouvert",
                "priorite": "Moyenne",
                "id_employe": 1,
                "id_technicien": 4,
                "technicien_nom": "Theo"
            }
        ])))
        .mount(&server)
        .await;

    let criteria = TicketCriteria {
        status: Some(Status::Open),
        technician: Some(Assignment::Unassigned),
        ..Default::default()
    };
    let tickets = gateway(&server)
        .list_tickets(&criteria.to_query())
        .await
        .unwrap();
    assert_eq!(tickets.len(), 2);
    assert_eq!(tickets[0].priority, Priority::High);
    assert_eq!(tickets[1].technician_name.as_deref(), Some("Theo"));

    let unassigned = filter_tickets(&tickets, &criteria);
    assert_eq!(unassigned.len(), 1);
    assert_eq!(unassigned[0].id, 1);
}

#[tokio::test]
async fn test_server_error_keeps_status_and_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tickets/7"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(serde_json::json!({ "error": "db down" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tickets/8"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    let failure = gateway.get_ticket(7).await.unwrap_err();
    assert_eq!(failure.status_code, Some(500));
    assert_eq!(failure.message, "db down");

    let failure = gateway.get_ticket(8).await.unwrap_err();
    assert!(failure.is_not_found());
    assert_eq!(failure.message, "Not Found");
}

#[tokio::test]
async fn test_create_ticket_reads_new_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/tickets"))
        .and(body_json(serde_json::json!({
            "titre": "Broken mouse",
            "description": "Left button",
            "priorite": "Critique",
            "statut": "Ouvert",
            "id_employe": 1
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(serde_json::json!({ "message": "Ticket créé", "ticketId": 42 })),
        )
        .mount(&server)
        .await;

    let id = gateway(&server)
        .create_ticket(&NewTicket {
            title: "Broken mouse".to_string(),
            description: "Left button".to_string(),
            priority: Priority::Critical,
            status: Status::Open,
            employee_id: 1,
        })
        .await
        .unwrap();
    assert_eq!(id, 42);
}

#[tokio::test]
async fn test_update_ticket_accepts_bare_acknowledgement() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/tickets/3"))
        .and(body_json(serde_json::json!({ "statut": "Résolu" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "message": "Ticket mis à jour" })),
        )
        .mount(&server)
        .await;

    let echoed = gateway(&server)
        .update_ticket(
            3,
            &TicketUpdate {
                status: Some(Status::Resolved),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(echoed.is_none());
}

#[tokio::test]
async fn test_role_scoped_user_listing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users/technicians"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": 2, "nom": "Theo", "email": "tech@example.com", "role": "Technicien" }
        ])))
        .mount(&server)
        .await;

    let users = gateway(&server)
        .list_users(UserScope::Only(Role::Technician))
        .await
        .unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].role, Role::Technician);
}

#[tokio::test]
async fn test_statistics_with_string_counts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/statistics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "stats_par_statut": {
                "total_ouverts": "3",
                "total_en_cours": 1,
                "total_resolus": null,
                "total_fermes": "0"
            },
            "tickets_par_priorite": [
                { "priorite": "Faible", "nombre": 2 }
            ]
        })))
        .mount(&server)
        .await;

    let stats = gateway(&server).statistics().await.unwrap();
    let counts = stats.stats_by_status.unwrap();
    assert_eq!(counts.open, 3);
    assert_eq!(counts.in_progress, 1);
    assert_eq!(counts.resolved, 0);
    assert!(stats.mean_resolution_by_technician.is_none());
    assert_eq!(stats.tickets_by_priority.unwrap()[0].total, 2);
}

#[tokio::test]
async fn test_unreachable_backend_has_no_status() {
    // Nothing listens on the discard port
    let gateway = HttpGateway::new(&ApiConfig {
        base_url: "http://127.0.0.1:9/api".to_string(),
        timeout_secs: 2,
    })
    .unwrap();

    let failure = gateway.statistics().await.unwrap_err();
    assert_eq!(failure.status_code, None);
}
