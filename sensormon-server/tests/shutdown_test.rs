use tokio::net::TcpStream;

use sensormon_server::app::create_listener;
use sensormon_server::models::{AuditChannel, EquipmentState};
use sensormon_server::shutdown;
use sensormon_server::tests::read_lines;

mod common;
use common::mock_app::MockApp;

#[tokio::test]
async fn test_shutdown_order() {
    let app = MockApp::new().await;
    let listener = create_listener(&app.settings, &app.app).unwrap().start().await.unwrap();
    let addr = listener.local_addr();

    assert_eq!(app.app.gate.toggle_equipment().await, EquipmentState::Running);
    assert!(app.app.gate.is_refreshing().await);

    shutdown(listener, &app.app).await;

    assert!(TcpStream::connect(addr).await.is_err());
    assert!(!app.app.gate.is_refreshing().await);

    let operations = read_lines(app.app.audit.path(AuditChannel::Operation));
    assert_eq!(operations.len(), 2);
    assert!(operations[0].ends_with("[OPERATION] equipment started"));
    assert!(operations[1].ends_with("[OPERATION] application stopped"));
}

#[tokio::test]
async fn test_shutdown_while_stopped() {
    let app = MockApp::new().await;
    let listener = create_listener(&app.settings, &app.app).unwrap().start().await.unwrap();
    let addr = listener.local_addr();

    shutdown(listener, &app.app).await;

    assert!(TcpStream::connect(addr).await.is_err());
    assert_eq!(app.app.gate.state().await, EquipmentState::Stopped);

    let operations = read_lines(app.app.audit.path(AuditChannel::Operation));
    assert_eq!(operations.len(), 1);
    assert!(operations[0].ends_with("[OPERATION] application stopped"));
}
